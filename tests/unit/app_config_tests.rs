/*!
 * Tests for application configuration
 */

use anyhow::Result;
use script_aligner::app_config::{Config, LogLevel};
use crate::common;

/// Test saving and loading a configuration keeps every setting
#[test]
fn test_config_saveAndLoad_shouldPreserveSettings() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.layout.ltol = Some(12);
    config.layout.rtol = Some(4);
    config.layout.auto_tolerance = 0.05;
    config.alignment.show_progress = false;
    config.log_level = LogLevel::Debug;
    config.save(&path)?;

    let loaded = Config::from_file(&path)?;
    assert_eq!(loaded.layout, config.layout);
    assert_eq!(loaded.alignment, config.alignment);
    assert_eq!(loaded.log_level, LogLevel::Debug);
    Ok(())
}

/// Test a partial configuration file falls back to defaults for the rest
#[test]
fn test_config_partialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{ "layout": { "ltol": 9 }, "log_level": "warn" }"#,
    )?;

    let config = Config::from_file(&path)?;
    assert_eq!(config.layout.ltol, Some(9));
    assert_eq!(config.layout.rtol, Some(6));
    assert_eq!(config.layout.auto_tolerance, 0.01);
    assert_eq!(config.alignment.normalizer_cache_capacity, 65_536);
    assert_eq!(config.log_level, LogLevel::Warn);
    assert!(config.validate().is_ok());
    Ok(())
}

/// Test malformed JSON is reported with the file path
#[test]
fn test_config_malformedFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    let error = Config::from_file(&path).unwrap_err();
    assert!(format!("{:#}", error).contains("conf.json"));
    Ok(())
}

/// Test log levels map onto the log facade
#[test]
fn test_logLevel_toLevelFilter_shouldMatch() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
