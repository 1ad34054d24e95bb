// src/extractors/table.rs
use std::collections::{BTreeMap, HashSet};

use super::field_set::FieldSet;
use super::normalize::{contains_either, normalize};
use super::report::{Extracted, Issue, IssueCode, TableRecord};
use super::template::Slot;
use crate::document::{Document, Row};

/// A table the classifier attributed to a field set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableAssignment {
    /// Block index of the table.
    pub block: usize,
    pub field_set: String,
    pub score: usize,
    /// Other field sets that reached the same score on this table.
    pub tied_with: Vec<String>,
}

/// Number of the dictionary's synonym labels found among the table's cells.
pub fn score_table(rows: &[Row], field_set: &FieldSet, min_containment_len: usize) -> usize {
    let cells: HashSet<String> = rows
        .iter()
        .flatten()
        .map(|cell| normalize(cell))
        .filter(|cell| !cell.is_empty())
        .collect();

    field_set
        .dictionary
        .synonyms()
        .filter(|(_, label)| cells.iter().any(|cell| contains_either(cell, label, min_containment_len)))
        .count()
}

/// Assigns every table of the document to at most one competing field set.
///
/// The highest score wins; on equal scores the field set declared first wins.
/// Tables whose best score is under the winner's threshold are left unassigned.
pub fn classify_tables<'a, I>(document: &Document, field_sets: I, min_containment_len: usize) -> Vec<TableAssignment>
where
    I: IntoIterator<Item = &'a FieldSet>,
{
    let field_sets: Vec<&FieldSet> = field_sets.into_iter().collect();
    let mut assignments = Vec::new();

    for (block, rows) in document.tables() {
        let scores: Vec<(&FieldSet, usize)> = field_sets
            .iter()
            .map(|field_set| (*field_set, score_table(rows, field_set, min_containment_len)))
            .collect();

        let mut best: Option<(&FieldSet, usize)> = None;
        for (field_set, score) in &scores {
            if best.map_or(true, |(_, best_score)| *score > best_score) {
                best = Some((*field_set, *score));
            }
        }

        let Some((winner, score)) = best else {
            continue;
        };

        if score == 0 || score < winner.table_threshold() {
            tracing::debug!(
                "Table at block {} unassigned (best '{}' scored {}, threshold {})",
                block,
                winner.id,
                score,
                winner.table_threshold()
            );
            continue;
        }

        let tied_with: Vec<String> = scores
            .iter()
            .filter(|(field_set, other)| *other == score && field_set.id != winner.id)
            .map(|(field_set, _)| field_set.id.clone())
            .collect();

        tracing::debug!("Table at block {} assigned to '{}' (score {})", block, winner.id, score);
        assignments.push(TableAssignment {
            block,
            field_set: winner.id.clone(),
            score,
            tied_with,
        });
    }

    assignments
}

/// Extracts field values from a table assigned to `field_set`, row by row,
/// dispatching on the cell count to the matching shape template.
pub fn match_rows(rows: &[Row], field_set: &FieldSet, min_containment_len: usize) -> Extracted {
    let header_tokens = field_set.header_token_set();
    let mut matcher = RowMatcher {
        field_set,
        min_containment_len,
        fields: BTreeMap::new(),
        matched_labels: Vec::new(),
        warnings: Vec::new(),
    };
    let mut records = Vec::new();
    let mut seen_data_row = false;

    for (row_index, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row.iter().map(|cell| clean_cell(cell)).collect();
        if cells.iter().all(String::is_empty) {
            continue;
        }

        let first_row = !seen_data_row;
        seen_data_row = true;
        if first_row && is_header_row(&cells, &header_tokens) {
            tracing::debug!("Skipping header row {} of '{}': {:?}", row_index, field_set.id, cells);
            continue;
        }

        let Some(template) = field_set.templates.iter().find(|t| t.arity == cells.len()) else {
            matcher.warn(
                IssueCode::UnexpectedRowShape,
                format!("row {} has {} cells, no template for that shape", row_index, cells.len()),
            );
            continue;
        };

        let slots = match template.slots() {
            Ok(slots) => slots,
            Err(reason) => {
                matcher.warn(IssueCode::UnexpectedRowShape, format!("row {}: {}", row_index, reason));
                continue;
            }
        };

        let mut keys = Vec::new();
        for slot in slots {
            keys.extend(matcher.apply(&cells, slot));
        }
        records.push(TableRecord { row_index, cells, keys });
    }

    Extracted {
        fields: matcher.fields,
        table_rows: records,
        matched_labels: matcher.matched_labels,
        warnings: matcher.warnings,
        ..Extracted::default()
    }
}

struct RowMatcher<'a> {
    field_set: &'a FieldSet,
    min_containment_len: usize,
    fields: BTreeMap<String, String>,
    matched_labels: Vec<String>,
    warnings: Vec<Issue>,
}

impl RowMatcher<'_> {
    fn warn(&mut self, code: IssueCode, message: String) {
        tracing::debug!("{} in '{}': {}", code, self.field_set.id, message);
        self.warnings.push(Issue::new(code, message));
    }

    fn resolve(&mut self, label: &str) -> Option<String> {
        let key = self
            .field_set
            .dictionary
            .lookup(&normalize(label), self.min_containment_len)
            .map(str::to_string);
        match &key {
            Some(key) => {
                tracing::trace!("Label '{}' -> {}", label, key);
                self.matched_labels.push(label.to_string());
            }
            None if !label.is_empty() => tracing::debug!("Unknown label '{}' in '{}'", label, self.field_set.id),
            None => {}
        }
        key
    }

    /// Fills the keys of one slot, returning those actually written.
    fn apply(&mut self, cells: &[String], slot: Slot) -> Vec<String> {
        match slot {
            Slot::Pair { label, value } => {
                let Some(key) = self.resolve(&cells[label]) else {
                    return Vec::new();
                };
                self.assign(key, &cells[value]).into_iter().collect()
            }
            Slot::Question { question, answer, explanation } => {
                let Some(key) = self.resolve(&cells[question]) else {
                    return Vec::new();
                };
                let base = key.strip_suffix("-answer").unwrap_or(&key).to_string();
                let mut written: Vec<String> = self
                    .assign(format!("{}-answer", base), &cells[answer])
                    .into_iter()
                    .collect();
                if let Some(explanation) = explanation {
                    written.extend(self.assign(format!("{}-explanation", base), &cells[explanation]));
                }
                written
            }
        }
    }

    /// First assignment wins; blanks are written but flagged.
    fn assign(&mut self, key: String, value: &str) -> Option<String> {
        if let Some(existing) = self.fields.get(&key) {
            let message = format!("'{}' already set to '{}', discarding '{}'", key, existing, value);
            self.warn(IssueCode::DuplicateField, message);
            return None;
        }
        if value.is_empty() {
            self.warn(IssueCode::BlankValue, format!("'{}' is blank in the document", key));
        }
        self.fields.insert(key.clone(), value.to_string());
        Some(key)
    }
}

/// Trims and collapses internal whitespace.
fn clean_cell(cell: &str) -> String {
    cell.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A first row made only of column captions ("Alan | Değer", key names), at
/// least two of them, is a header. Any data-shaped cell (digits, or text that
/// is not a caption such as a person's name) makes it a data row.
fn is_header_row(cells: &[String], header_tokens: &HashSet<String>) -> bool {
    if cells.iter().any(|cell| cell.chars().any(|c| c.is_ascii_digit())) {
        return false;
    }
    let filled: Vec<String> = cells
        .iter()
        .map(|cell| normalize(cell))
        .filter(|cell| !cell.is_empty())
        .collect();
    filled.len() >= 2 && filled.iter().all(|cell| header_tokens.contains(cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Block;
    use crate::extractors::dictionary::LabelDictionary;
    use crate::extractors::template::TableShapeTemplate;

    fn request_set() -> FieldSet {
        FieldSet::new("talep", ["Talep Bilgileri"])
            .with_dictionary(
                LabelDictionary::new()
                    .with("talep_no", ["Talep No"])
                    .with("talep_adi", ["Talep Adı"])
                    .with("talep_eden", ["Talep Eden"])
                    .with("talep_tarihi", ["Talep Tarihi"]),
            )
            .with_template(TableShapeTemplate::label_value())
            .with_template(TableShapeTemplate::double_label_value())
    }

    fn risk_set() -> FieldSet {
        FieldSet::new("risk", ["Risk Değerlendirmesi"])
            .with_dictionary(
                LabelDictionary::new()
                    .with("kisisel_veri", ["Kişisel veri işleniyor mu"])
                    .with("dis_servis-answer", ["Dış servis kullanılıyor mu"]),
            )
            .with_template(TableShapeTemplate::question_answer())
    }

    fn rows(raw: &[&[&str]]) -> Vec<Row> {
        raw.iter().map(|row| row.iter().map(|c| c.to_string()).collect()).collect()
    }

    #[test]
    fn test_two_cell_rows() {
        let table = rows(&[&["Talep No", "123"], &["Talep  Adı ", " Kampanya   X"]]);
        let out = match_rows(&table, &request_set(), 3);
        assert_eq!(out.fields.get("talep_no").map(String::as_str), Some("123"));
        assert_eq!(out.fields.get("talep_adi").map(String::as_str), Some("Kampanya X"));
        assert_eq!(out.matched_labels, vec!["Talep No", "Talep Adı"]);
        assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.warnings);
        assert_eq!(out.table_rows[1].keys, vec!["talep_adi"]);
    }

    #[test]
    fn test_header_row_skipped() {
        let table = rows(&[&["Alan", "Değer"], &["Talep No", "123"]]);
        let out = match_rows(&table, &request_set(), 3);
        assert_eq!(out.table_rows.len(), 1);
        assert_eq!(out.table_rows[0].row_index, 1);
    }

    #[test]
    fn test_label_only_first_row_with_values_is_data() {
        // key names double as captions, but the names next to them are data
        let table = rows(&[&["Talep Eden", "Ayşe Yılmaz", "Talep Adı", "Kampanya"]]);
        let out = match_rows(&table, &request_set(), 3);
        assert_eq!(out.fields["talep_eden"], "Ayşe Yılmaz");
        assert_eq!(out.fields["talep_adi"], "Kampanya");
    }

    #[test]
    fn test_four_cell_rows_are_two_pairs() {
        let table = rows(&[&["Talep No", "123", "Talep Tarihi", "01.02.2024"]]);
        let out = match_rows(&table, &request_set(), 3);
        assert_eq!(out.fields.len(), 2);
        assert_eq!(out.fields["talep_tarihi"], "01.02.2024");
    }

    #[test]
    fn test_question_rows() {
        let table = rows(&[
            &["Kişisel veri işleniyor mu?", "Evet", "Müşteri adı ve telefon"],
            &["Dış servis kullanılıyor mu?", "Hayır", ""],
        ]);
        let out = match_rows(&table, &risk_set(), 3);
        assert_eq!(out.fields["kisisel_veri-answer"], "Evet");
        assert_eq!(out.fields["kisisel_veri-explanation"], "Müşteri adı ve telefon");
        assert_eq!(out.fields["dis_servis-answer"], "Hayır");
        assert_eq!(out.fields["dis_servis-explanation"], "");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].code, IssueCode::BlankValue);
    }

    #[test]
    fn test_duplicate_label_keeps_first_value() {
        let table = rows(&[&["Talep No", "123"], &["Talep Adı", "X"], &["Talep No", "999"]]);
        let out = match_rows(&table, &request_set(), 3);
        assert_eq!(out.fields["talep_no"], "123");
        let duplicates: Vec<_> = out.warnings.iter().filter(|w| w.code == IssueCode::DuplicateField).collect();
        assert_eq!(duplicates.len(), 1);
    }

    #[test]
    fn test_unexpected_shape_and_empty_rows() {
        let table = rows(&[&["", ""], &["Talep No", "123"], &["tek hücre"], &["a", "b", "c"]]);
        let out = match_rows(&table, &request_set(), 3);
        assert_eq!(out.fields.len(), 1);
        let shapes = out.warnings.iter().filter(|w| w.code == IssueCode::UnexpectedRowShape).count();
        assert_eq!(shapes, 2);
    }

    #[test]
    fn test_blank_value_is_written() {
        let table = rows(&[&["Talep No", ""], &["Talep Adı", "X"]]);
        let out = match_rows(&table, &request_set(), 3);
        assert_eq!(out.fields["talep_no"], "");
        assert_eq!(out.warnings[0].code, IssueCode::BlankValue);
    }

    #[test]
    fn test_classifier_picks_best_field_set() {
        let doc = Document::new(vec![
            Block::table([["Talep No", "1"], ["Talep Adı", "X"], ["Talep Eden", "Y"]]),
            Block::table([["Kişisel veri işleniyor mu", "Evet", ""], ["Dış servis kullanılıyor mu", "Hayır", ""]]),
            Block::table([["Bütçe", "100"]]),
        ]);
        let sets = [request_set(), risk_set()];
        let assignments = classify_tables(&doc, sets.iter(), 3);

        assert_eq!(assignments.len(), 2, "{:?}", assignments);
        assert_eq!((assignments[0].block, assignments[0].field_set.as_str()), (0, "talep"));
        assert_eq!(assignments[0].score, 3);
        assert_eq!((assignments[1].block, assignments[1].field_set.as_str()), (1, "risk"));
    }

    #[test]
    fn test_classifier_tie_goes_to_first_declared() {
        let twin = FieldSet::new("talep_kopya", ["Kopya"])
            .with_dictionary(LabelDictionary::new().with("a", ["Talep No"]).with("b", ["Talep Adı"]))
            .with_template(TableShapeTemplate::label_value());
        let doc = Document::new(vec![Block::table([["Talep No", "1"], ["Talep Adı", "X"]])]);
        let sets = [twin.clone(), request_set()];

        let assignments = classify_tables(&doc, sets.iter(), 3);
        assert_eq!(assignments[0].field_set, "talep_kopya");
        assert_eq!(assignments[0].tied_with, vec!["talep"]);
    }

    #[test]
    fn test_classifier_threshold() {
        let doc = Document::new(vec![Block::table([["Talep No", "1"], ["Bütçe", "100"]])]);
        let sets = [request_set()];
        assert!(classify_tables(&doc, sets.iter(), 3).is_empty());
    }

    #[test]
    fn test_repeated_label_scores_once() {
        let set = FieldSet::new("talep", ["Talep Bilgileri"])
            .with_dictionary(LabelDictionary::new().with("talep_no", ["Talep No", "Talep Kodu", "TALEP NO"]))
            .with_template(TableShapeTemplate::label_value());
        let table = rows(&[&["Talep No", "1"]]);
        assert_eq!(score_table(&table, &set, 3), 1);

        let doc = Document::new(vec![Block::table([["Talep No", "1"]])]);
        let sets = [set];
        assert!(classify_tables(&doc, sets.iter(), 3).is_empty());
    }
}
