// src/document/html.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{Block, Row};

// --- CSS Selectors (Lazy Static) ---
// Everything that can become a top-level block, in document order
static BLOCK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, p, li, table")
        .expect("Failed to compile BLOCK_SELECTOR")
});

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Failed to compile ROW_SELECTOR"));

static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("Failed to compile PARAGRAPH_SELECTOR"));

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RE"));

/// Converts converter-produced HTML (e.g. a .docx rendered to HTML) into blocks.
///
/// Best effort: headings, paragraphs, list items and tables survive, everything
/// else (images, comments, styling) is dropped. Paragraphs inside table cells
/// belong to the table, not to the free text.
pub fn blocks_from_html(html: &str) -> Vec<Block> {
    let document = Html::parse_document(html);
    let mut blocks = Vec::new();

    for element in document.select(&BLOCK_SELECTOR) {
        let name = element.value().name();

        if name == "table" {
            let rows = table_rows(element);
            tracing::trace!("Converted <table> with {} rows", rows.len());
            blocks.push(Block::Table { rows });
            continue;
        }

        // Cell content is part of its table block
        if has_table_ancestor(element) {
            continue;
        }

        // A list item wrapping paragraphs is emitted through those paragraphs
        if name == "li" && element.select(&PARAGRAPH_SELECTOR).next().is_some() {
            continue;
        }

        let text = element_text(element);
        if text.is_empty() {
            continue;
        }

        match heading_level(name) {
            Some(level) => blocks.push(Block::Heading { level, text }),
            None => blocks.push(Block::Paragraph { text }),
        }
    }

    tracing::debug!("Converted HTML into {} blocks", blocks.len());
    blocks
}

fn heading_level(name: &str) -> Option<u8> {
    name.strip_prefix('h')
        .and_then(|digits| digits.parse::<u8>().ok())
        .filter(|level| (1..=6).contains(level))
}

fn element_text(element: ElementRef) -> String {
    let raw = element.text().collect::<Vec<_>>().join(" ");
    WHITESPACE_RE.replace_all(raw.trim(), " ").into_owned()
}

fn has_table_ancestor(element: ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "table")
}

/// Rows owned directly by `table`; rows of nested tables become their own block.
fn table_rows(table: ElementRef) -> Vec<Row> {
    table
        .select(&ROW_SELECTOR)
        .filter(|tr| nearest_table(*tr).map(|t| t.id()) == Some(table.id()))
        .map(|tr| {
            tr.children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                .map(element_text)
                .collect::<Row>()
        })
        .collect()
}

fn nearest_table(element: ElementRef) -> Option<ElementRef> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_headings_paragraphs_and_tables() {
        let html = r#"
            <html><body>
            <h2>Talep   Bilgileri</h2>
            <p>Aşağıdaki tablo talebi özetler.</p>
            <table>
              <tr><th>Alan</th><th>Değer</th></tr>
              <tr><td><p>Talep No</p></td><td>123</td></tr>
            </table>
            <ul><li>Birinci madde</li><li><p>İkinci madde</p></li></ul>
            <p>   </p>
            </body></html>
        "#;

        let blocks = blocks_from_html(html);
        assert_eq!(
            blocks,
            vec![
                Block::heading(2, "Talep Bilgileri"),
                Block::paragraph("Aşağıdaki tablo talebi özetler."),
                Block::table([["Alan", "Değer"], ["Talep No", "123"]]),
                Block::paragraph("Birinci madde"),
                Block::paragraph("İkinci madde"),
            ]
        );
    }

    #[test]
    fn test_nested_table_becomes_its_own_block() {
        let html = r#"<table>
            <tr><td>Dış</td><td><table><tr><td>İç</td><td>1</td></tr></table></td></tr>
        </table>"#;

        let blocks = blocks_from_html(html);
        assert_eq!(blocks.len(), 2, "outer and inner tables expected: {:?}", blocks);
        match &blocks[0] {
            Block::Table { rows } => assert_eq!(rows.len(), 1, "outer table must not absorb inner rows"),
            other => panic!("expected table, got {:?}", other),
        }
        assert_eq!(blocks[1], Block::table([["İç", "1"]]));
    }
}
