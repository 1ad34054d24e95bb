// src/extractors/report.rs
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::error::ConvertError;

/// Which path produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Strict,
    Scan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    ConversionError,
    SectionNotFound,
    EmptySection,
    TableNotFound,
    AmbiguousTable,
    UnexpectedRowShape,
    DuplicateField,
    BlankValue,
    NotFound,
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            IssueCode::ConversionError => "CONVERSION_ERROR",
            IssueCode::SectionNotFound => "SECTION_NOT_FOUND",
            IssueCode::EmptySection => "EMPTY_SECTION",
            IssueCode::TableNotFound => "TABLE_NOT_FOUND",
            IssueCode::AmbiguousTable => "AMBIGUOUS_TABLE",
            IssueCode::UnexpectedRowShape => "UNEXPECTED_ROW_SHAPE",
            IssueCode::DuplicateField => "DUPLICATE_FIELD",
            IssueCode::BlankValue => "BLANK_VALUE",
            IssueCode::NotFound => "NOT_FOUND",
        };
        f.write_str(code)
    }
}

/// A non-fatal finding, shown to the user as a banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub code: IssueCode,
    pub message: String,
}

impl Issue {
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A table row as extracted: its position, cleaned cells and the keys it filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRecord {
    pub row_index: usize,
    pub cells: Vec<String>,
    pub keys: Vec<String>,
}

/// Outcome of one extraction call. Built once, never mutated after return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub target: String,
    pub found: bool,
    pub mode: Mode,
    /// Section text (strict text targets or scan mode).
    pub content: String,
    pub fields: BTreeMap<String, String>,
    pub table_rows: Vec<TableRecord>,
    pub matched_labels: Vec<String>,
    /// Block indices the result was taken from.
    pub source_blocks: Vec<usize>,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl ExtractionResult {
    /// Result for a document the converter could not turn into blocks.
    /// The conversion error is the only entry; there was nothing to search.
    pub fn conversion_failed(target: &str, error: &ConvertError) -> Self {
        let errors = vec![Issue::new(IssueCode::ConversionError, error.to_string())];
        Self::not_found(target.to_string(), Mode::Strict, errors, Vec::new())
    }

    fn not_found(target: String, mode: Mode, errors: Vec<Issue>, warnings: Vec<Issue>) -> Self {
        Self {
            target,
            found: false,
            mode,
            content: String::new(),
            fields: BTreeMap::new(),
            table_rows: Vec::new(),
            matched_labels: Vec::new(),
            source_blocks: Vec::new(),
            errors,
            warnings,
        }
    }

    pub fn has_error(&self, code: IssueCode) -> bool {
        self.errors.iter().any(|issue| issue.code == code)
    }

    pub fn has_warning(&self, code: IssueCode) -> bool {
        self.warnings.iter().any(|issue| issue.code == code)
    }

    pub fn warning_count(&self, code: IssueCode) -> usize {
        self.warnings.iter().filter(|issue| issue.code == code).count()
    }
}

/// What a strict or scan pass produced for the reporter.
#[derive(Debug, Default)]
pub struct Extracted {
    pub content: String,
    pub fields: BTreeMap<String, String>,
    pub table_rows: Vec<TableRecord>,
    pub matched_labels: Vec<String>,
    pub source_blocks: Vec<usize>,
    pub warnings: Vec<Issue>,
}

impl Extracted {
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty() && self.fields.is_empty()
    }
}

/// Aggregates the passes of one extraction into an `ExtractionResult`.
#[derive(Debug)]
pub struct Reporter {
    target: String,
    mode: Mode,
    extracted: Extracted,
    errors: Vec<Issue>,
    warnings: Vec<Issue>,
}

impl Reporter {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            mode: Mode::Strict,
            extracted: Extracted::default(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn error(&mut self, code: IssueCode, message: impl Into<String>) {
        self.errors.push(Issue::new(code, message));
    }

    pub fn warning(&mut self, code: IssueCode, message: impl Into<String>) {
        self.warnings.push(Issue::new(code, message));
    }

    /// Records the output of a pass. Calling it with `Mode::Scan` is only
    /// valid after strict anchoring failed.
    pub fn record(&mut self, mode: Mode, extracted: Extracted) {
        self.mode = mode;
        self.extracted = extracted;
    }

    pub fn finish(self) -> ExtractionResult {
        let Reporter { target, mode, extracted, mut errors, mut warnings } = self;
        let found = !extracted.is_empty();

        warnings.extend(extracted.warnings);

        if !found {
            errors.push(Issue::new(IssueCode::NotFound, format!("no content found for '{}'", target)));
            return ExtractionResult::not_found(target, mode, errors, warnings);
        }

        ExtractionResult {
            target,
            found,
            mode,
            content: extracted.content,
            fields: extracted.fields,
            table_rows: extracted.table_rows,
            matched_labels: extracted.matched_labels,
            source_blocks: extracted.source_blocks,
            errors,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_not_found() {
        let result = Reporter::new("amac").finish();
        assert!(!result.found);
        assert!(result.fields.is_empty());
        assert!(result.has_error(IssueCode::NotFound));
    }

    #[test]
    fn test_fields_make_result_found() {
        let mut reporter = Reporter::new("talep");
        let mut extracted = Extracted::default();
        extracted.fields.insert("talep_no".to_string(), "123".to_string());
        extracted.warnings.push(Issue::new(IssueCode::BlankValue, "talep_adi is blank"));
        reporter.record(Mode::Strict, extracted);

        let result = reporter.finish();
        assert!(result.found);
        assert!(result.errors.is_empty());
        assert!(result.has_warning(IssueCode::BlankValue));
    }

    #[test]
    fn test_conversion_failure() {
        let err = ConvertError::Parse("bad json".to_string());
        let result = ExtractionResult::conversion_failed("talep", &err);
        assert!(!result.found);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, IssueCode::ConversionError);
        assert!(result.errors[0].message.contains("bad json"));
        assert!(result.fields.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let mut reporter = Reporter::new("amac");
        reporter.record(
            Mode::Scan,
            Extracted { content: "Metin".to_string(), ..Extracted::default() },
        );
        let json = serde_json::to_value(reporter.finish()).unwrap();
        assert_eq!(json["mode"], "scan");
        assert_eq!(json["found"], true);
        assert!(json.get("matchedLabels").is_some());
        assert!(json.get("tableRows").is_some());

        let issue = serde_json::to_value(Issue::new(IssueCode::DuplicateField, "x")).unwrap();
        assert_eq!(issue["code"], "DUPLICATE_FIELD");
    }
}
