// src/lib.rs
//! Recovers form sections and table fields from converted office documents.
//!
//! A document arrives as a flat list of [`document::Block`]s (headings,
//! paragraphs, tables). Each form target is described by a
//! [`extractors::FieldSet`]; the [`extractors::Extractor`] anchors on the
//! target's heading or table and falls back to a keyword scan when the
//! document has no anchor.

pub mod document;
pub mod extractors;
pub mod storage;
pub mod utils;

pub use document::{Block, Document};
pub use extractors::{Catalog, EngineConfig, ExtractionResult, Extractor, FieldSet, Mode};
