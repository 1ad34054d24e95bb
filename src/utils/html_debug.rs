// src/utils/html_debug.rs
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::document::{Block, Document};
use crate::extractors::report::{ExtractionResult, Mode};
use crate::utils::error::AppError;

/// Saves the converted document as HTML, highlighting every block that
/// contributed to an extraction result. Open it in a browser to see what the
/// engine anchored on.
pub fn save_annotated_blocks(
    document: &Document,
    results: &[(String, ExtractionResult)],
    filename: &Path,
) -> Result<(), AppError> {
    let html = render_annotated_blocks(document, results);
    let mut file = File::create(filename)?;
    file.write_all(html.as_bytes())?;

    tracing::info!("Saved annotated debug HTML to {}", filename.display());
    Ok(())
}

/// Builds the annotated HTML page for `save_annotated_blocks`.
pub fn render_annotated_blocks(document: &Document, results: &[(String, ExtractionResult)]) -> String {
    // block index -> (target, mode) pairs that used it
    let mut usage: BTreeMap<usize, Vec<(&str, Mode)>> = BTreeMap::new();
    for (target, result) in results {
        for block in &result.source_blocks {
            usage.entry(*block).or_default().push((target.as_str(), result.mode));
        }
    }

    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n");
    // CSS for highlight colors
    debug_html.push_str(".highlight-strict { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-scan { background-color: #FFFF00; }\n");
    debug_html.push_str(".block-index { color: #888; font-size: small; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    for (idx, block) in document.blocks().iter().enumerate() {
        let users = usage.get(&idx);
        let open = match users {
            Some(users) => {
                let class = if users.iter().any(|(_, mode)| *mode == Mode::Strict) {
                    "highlight-strict"
                } else {
                    "highlight-scan"
                };
                let title = users
                    .iter()
                    .map(|(target, mode)| format!("{} ({:?})", target, mode))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("<div class=\"{}\" title=\"{}\">", class, escape(&title))
            }
            None => "<div>".to_string(),
        };

        debug_html.push_str(&open);
        debug_html.push_str(&format!("<span class=\"block-index\">#{}</span>\n", idx));
        render_block(block, &mut debug_html);
        debug_html.push_str("</div>\n");
    }

    debug_html.push_str("</body>\n</html>");
    debug_html
}

fn render_block(block: &Block, out: &mut String) {
    match block {
        Block::Heading { level, text } => {
            let level = (*level).clamp(1, 6);
            out.push_str(&format!("<h{0}>{1}</h{0}>\n", level, escape(text)));
        }
        Block::Paragraph { text } => {
            out.push_str(&format!("<p>{}</p>\n", escape(text)));
        }
        Block::Table { rows } => {
            out.push_str("<table border=\"1\">\n");
            for row in rows {
                out.push_str("<tr>");
                for cell in row {
                    out.push_str(&format!("<td>{}</td>", escape(cell)));
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</table>\n");
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
