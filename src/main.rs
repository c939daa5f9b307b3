// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use script_aligner::app_config::{self, Config};
use script_aligner::app_controller::{AlignOptions, Controller};
use script_aligner::file_utils::FileManager;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Options shared by every command that reads a configuration
#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Write the effective configuration to the config path if it does not exist
    #[arg(long)]
    write_default_config: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Left tolerance for block alignment (auto-calibrated when omitted)
    #[arg(long)]
    script_ltol: Option<usize>,

    /// Right tolerance for block alignment
    #[arg(long)]
    script_rtol: Option<usize>,

    /// Minimum line fraction for a leading-whitespace count during auto-calibration
    #[arg(long)]
    auto_aligner_tolerance: Option<f64>,
}

#[derive(Parser, Debug)]
struct AlignArgs {
    /// Subtitle file (SRT)
    #[arg(value_name = "INPUT_SRT")]
    input_srt: PathBuf,

    /// Screenplay text file, or event JSONL with --events
    #[arg(value_name = "INPUT_SCRIPT")]
    input_script: PathBuf,

    /// HTML report path
    #[arg(short, long, default_value = "output.html")]
    output: PathBuf,

    /// Also write the aligned script events as JSONL
    #[arg(long, value_name = "PATH")]
    save_script_events: Option<PathBuf>,

    /// Read INPUT_SCRIPT as pre-parsed JSONL events
    #[arg(long)]
    events: bool,

    /// Do not show the alignment progress bar
    #[arg(long)]
    no_progress: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct ParseArgs {
    /// Screenplay text file
    #[arg(value_name = "INPUT_SCRIPT")]
    input_script: PathBuf,

    /// Event JSONL output path (defaults to the script path with a .jsonl extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Align a screenplay with its subtitles and write an HTML report
    Align(AlignArgs),

    /// Parse a screenplay into typed events without aligning
    Parse(ParseArgs),

    /// Generate shell completions for script-aligner
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// script-aligner - align screenplay dialogue with subtitles
///
/// Parses a plain-text screenplay into typed events and pairs every line of
/// dialogue with the subtitle that speaks it.
#[derive(Parser, Debug)]
#[command(name = "script-aligner")]
#[command(version)]
#[command(about = "Align screenplay dialogue with subtitle captions")]
#[command(long_about = "script-aligner parses a plain-text screenplay into scenes, directions and dialogue,
then globally aligns the dialogue with the captions of an SRT file.

EXAMPLES:
    script-aligner align movie.srt movie.txt                       # Write output.html
    script-aligner align movie.srt movie.txt -o report.html \\
        --save-script-events movie.jsonl                           # Also keep the aligned events
    script-aligner align --script-ltol 10 movie.srt movie.txt      # Fix the left tolerance
    script-aligner parse movie.txt -o movie.jsonl                  # Parse only
    script-aligner completions bash > script-aligner.bash          # Generate bash completions

CONFIGURATION:
    Configuration is read from conf.json by default. You can specify a different
    config file with --config-path. If the file doesn't exist, defaults are used;
    pass --write-default-config to save them.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // The max level set via log::set_max_level is the effective filter
        metadata.level() <= self.level.max(log::max_level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "script-aligner", &mut std::io::stdout());
            Ok(())
        }
        Commands::Align(args) => run_align(args),
        Commands::Parse(args) => run_parse(args),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run_align(args: AlignArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    if args.no_progress {
        config.alignment.show_progress = false;
    }

    let controller = Controller::with_config(config)?;
    let options = AlignOptions {
        output_html: args.output,
        save_events: args.save_script_events,
        events_input: args.events,
    };

    controller.run_align(&args.input_srt, &args.input_script, &options)?;
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let controller = Controller::with_config(config)?;

    let output = args
        .output
        .unwrap_or_else(|| FileManager::with_extension(&args.input_script, "jsonl"));
    let events = controller.run_parse(&args.input_script, &output)?;
    info!("Parsed {} events into {:?}", events.len(), output);

    Ok(())
}

/// Load the configuration file (or defaults), apply CLI overrides and set the log level
fn load_config(options: &ConfigArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config_path = Path::new(&options.config_path);
    let mut config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', using defaults.", options.config_path);
        Config::default()
    };

    // Override config with CLI options if provided
    if let Some(ltol) = options.script_ltol {
        config.layout.ltol = Some(ltol);
    }
    if let Some(rtol) = options.script_rtol {
        config.layout.rtol = Some(rtol);
    }
    if let Some(tolerance) = options.auto_aligner_tolerance {
        config.layout.auto_tolerance = tolerance;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;

    if options.write_default_config && !config_path.exists() {
        config.save(config_path)?;
        info!("Wrote default configuration to '{}'", options.config_path);
    }

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}
