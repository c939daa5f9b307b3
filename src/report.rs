/*!
 * HTML side-by-side report of an alignment.
 *
 * Every alignment pair becomes one table row with the script line on the
 * left and the caption on the right. Rows where either side is missing are
 * highlighted.
 */

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use log::info;

use crate::alignment::AlignmentOutcome;
use crate::file_utils::FileManager;

const STYLE: &str = "body { font-family: sans-serif; margin: 2em; }\n\
table { border-collapse: collapse; width: 100%; }\n\
th, td { border: 1px solid #ccc; padding: 4px 8px; vertical-align: top; width: 50%; }\n\
th { background: #eee; }\n\
tr.unmatched td { background: #f8d0d0; }\n";

/// Escape text for use inside HTML element content or attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render the alignment as a standalone HTML document
pub fn render_html(outcome: &AlignmentOutcome) -> String {
    let mut html = String::new();
    let summary = outcome.summary();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Script alignment</title>\n");
    let _ = write!(html, "<style>\n{}</style>\n", STYLE);
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(
        html,
        "<p class=\"summary\">{} (score {:.2})</p>",
        escape_html(&summary.to_string()),
        outcome.alignment.score
    );
    html.push_str("<table>\n<tr><th>Script</th><th>Subtitle</th></tr>\n");

    for pair in &outcome.alignment.pairs {
        let script = pair
            .dialogue_index
            .and_then(|i| outcome.dialogue.get(i))
            .map(|line| escape_html(&line.text))
            .unwrap_or_default();
        let subtitle = pair
            .caption_index
            .and_then(|j| outcome.captions.get(j))
            .map(|text| escape_html(text))
            .unwrap_or_default();

        if pair.is_match() {
            let _ = writeln!(html, "<tr><td>{}</td><td>{}</td></tr>", script, subtitle);
        } else {
            let _ = writeln!(
                html,
                "<tr class=\"unmatched\"><td>{}</td><td>{}</td></tr>",
                script, subtitle
            );
        }
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}

/// Render the report and write it to `path`
pub fn save_html<P: AsRef<Path>>(outcome: &AlignmentOutcome, path: P) -> Result<()> {
    FileManager::write_to_file(&path, &render_html(outcome))?;
    info!("Alignment report written to {:?}", path.as_ref());
    Ok(())
}
