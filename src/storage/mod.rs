// src/storage/mod.rs
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::extractors::report::ExtractionResult;
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// `/base_dir/<document stem>/`, created on demand
    pub fn document_dir(&self, document_name: &str) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(sanitize(document_name));
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    /// Saves one extraction result as pretty JSON
    pub fn save_result(&self, document_name: &str, result: &ExtractionResult) -> Result<PathBuf, StorageError> {
        let file_path = self
            .document_dir(document_name)?
            .join(format!("{}.json", sanitize(&result.target)));

        let json = serde_json::to_string_pretty(result)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let mut file = fs::File::create(&file_path).map_err(StorageError::IoError)?;
        file.write_all(json.as_bytes()).map_err(StorageError::IoError)?;

        tracing::info!("Saved result to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves a short summary of the result next to it
    pub fn save_result_metadata(
        &self,
        document_name: &str,
        result: &ExtractionResult,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self
            .document_dir(document_name)?
            .join(format!("{}_meta.json", sanitize(&result.target)));

        let metadata = serde_json::json!({
            "document": document_name,
            "target": result.target,
            "found": result.found,
            "mode": result.mode,
            "field_count": result.fields.len(),
            "content_length": result.content.len(),
            "error_codes": result.errors.iter().map(|issue| issue.code).collect::<Vec<_>>(),
            "warning_count": result.warnings.len(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves the converted block list, useful when a converter misbehaves
    pub fn save_blocks(&self, document_name: &str, document: &Document) -> Result<PathBuf, StorageError> {
        let file_path = self.document_dir(document_name)?.join("blocks.json");

        let json = serde_json::to_string_pretty(document)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, json).map_err(StorageError::IoError)?;

        tracing::info!("Saved converted blocks to {}", file_path.display());
        Ok(file_path)
    }
}

/// Keeps names usable as single path components.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned.to_string()
    }
}
