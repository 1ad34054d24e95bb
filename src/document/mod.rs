// src/document/mod.rs
pub mod client;
pub mod html;

use serde::{Deserialize, Serialize};

use crate::utils::error::ConvertError;

/// One table cell. Converters hand us plain text per cell.
pub type Cell = String;
/// One table row, cells in visual order.
pub type Row = Vec<Cell>;

/// A top-level block of a converted document.
///
/// Serialized as `{"type": "heading", "level": 2, "text": "..."}` etc, which is
/// also the shape accepted from an external converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    Table { rows: Vec<Row> },
}

impl Block {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading { level, text: text.into() }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph { text: text.into() }
    }

    pub fn table<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Block::Table {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }
}

/// An immutable, converted document. Shared read-only between extractions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Parses a JSON block list as produced by an external converter.
    pub fn from_json(json: &str) -> Result<Self, ConvertError> {
        serde_json::from_str(json).map_err(|e| ConvertError::Parse(e.to_string()))
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Table blocks with their block index, in document order.
    pub fn tables(&self) -> impl Iterator<Item = (usize, &[Row])> {
        self.blocks.iter().enumerate().filter_map(|(idx, block)| match block {
            Block::Table { rows } => Some((idx, rows.as_slice())),
            _ => None,
        })
    }
}

impl From<Vec<Block>> for Document {
    fn from(blocks: Vec<Block>) -> Self {
        Self::new(blocks)
    }
}
