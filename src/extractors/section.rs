// src/extractors/section.rs

// --- Imports ---
use super::config::EngineConfig;
use super::normalize::{contains_either, normalize};
use crate::document::Block;

// --- Data Structures ---
/// Free text collected under a heading anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedSection {
    pub text: String,
    /// Indices of the accepted paragraph blocks.
    pub blocks: Vec<usize>,
}

impl CollectedSection {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Finds the heading that anchors a section (strict mode).
///
/// Headings are tested in document order against every (normalized) title
/// variant, containment in either direction. Returns the block index of the
/// first match, `None` when the document has no such heading.
pub fn locate_section(blocks: &[Block], titles: &[String], min_containment_len: usize) -> Option<usize> {
    for (idx, block) in blocks.iter().enumerate() {
        let Block::Heading { text, level } = block else {
            continue;
        };

        let heading = normalize(text);
        if heading.is_empty() {
            continue;
        }

        if let Some(title) = titles
            .iter()
            .find(|title| contains_either(&heading, title, min_containment_len))
        {
            tracing::debug!("Anchored on h{} '{}' (block {}) via title '{}'", level, text, idx, title);
            return Some(idx);
        }
    }

    tracing::debug!("No heading matched titles {:?}", titles);
    None
}

/// Collects the paragraphs following `anchor` until the section visibly ends.
///
/// Ends at a real heading, at an upper-case pseudo-heading paragraph, once
/// `max_paragraphs` are accepted, or after `max_window` blocks. Tables and
/// very short blocks are skipped, not collected.
pub fn collect_section(blocks: &[Block], anchor: usize, config: &EngineConfig) -> CollectedSection {
    let mut accepted: Vec<(usize, &str)> = Vec::new();

    for (idx, block) in blocks.iter().enumerate().skip(anchor + 1).take(config.max_window) {
        if accepted.len() >= config.max_paragraphs {
            break;
        }
        match block {
            Block::Heading { text, .. } => {
                if text.trim().chars().count() >= config.min_block_len {
                    tracing::trace!("Section ends at heading '{}' (block {})", text, idx);
                    break;
                }
            }
            // Tables belong to the table matcher
            Block::Table { .. } => continue,
            Block::Paragraph { text } => {
                let text = text.trim();
                if text.chars().count() < config.min_block_len {
                    continue;
                }
                if is_pseudo_heading(text, config.pseudo_heading_max_len) {
                    tracing::trace!("Section ends at pseudo-heading '{}' (block {})", text, idx);
                    break;
                }
                accepted.push((idx, text));
            }
        }
    }

    CollectedSection {
        text: accepted.iter().map(|(_, text)| *text).collect::<Vec<_>>().join("\n\n"),
        blocks: accepted.iter().map(|(idx, _)| *idx).collect(),
    }
}

/// A short, fully upper-case line without sentence punctuation reads as a
/// heading even when the converter emitted it as a paragraph.
pub fn is_pseudo_heading(text: &str, max_len: usize) -> bool {
    let text = text.trim();
    if text.chars().count() >= max_len {
        return false;
    }
    if text.contains(['.', '!', '?']) {
        return false;
    }
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(char::is_uppercase)
}
