// src/extractors/mod.rs
pub mod catalog;
pub mod config;
pub mod dictionary;
pub mod engine;
pub mod field_set;
pub mod normalize;
pub mod report;
pub mod scan;
pub mod section;
pub mod table;
pub mod template;

// Re-export key extraction types for convenience
pub use config::EngineConfig;
pub use dictionary::LabelDictionary;
pub use engine::Extractor;
pub use field_set::{Catalog, FieldSet, KeywordTier};
pub use normalize::normalize;
pub use report::{ExtractionResult, Issue, IssueCode, Mode, TableRecord};
pub use template::{CellRole, TableShapeTemplate};
