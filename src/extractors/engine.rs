// src/extractors/engine.rs
use super::config::EngineConfig;
use super::field_set::{Catalog, FieldSet};
use super::report::{Extracted, ExtractionResult, IssueCode, Mode, Reporter};
use super::scan::scan_blocks;
use super::section::{collect_section, locate_section};
use super::table::{classify_tables, match_rows, TableAssignment};
use crate::document::{Block, Document};
use crate::utils::error::ConfigError;

/// Runs field-set extractions against converted documents.
///
/// Stateless per call: the same document and field set always give the same
/// result, so calls may run in any order or in parallel.
#[derive(Debug, Clone)]
pub struct Extractor {
    catalog: Catalog,
    config: EngineConfig,
}

impl Extractor {
    pub fn new(catalog: Catalog, config: EngineConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Extracts the catalog target `target_id`. An unknown id is a
    /// configuration mistake, not a "not found".
    pub fn extract(&self, document: &Document, target_id: &str) -> Result<ExtractionResult, ConfigError> {
        let field_set = self
            .catalog
            .get(target_id)
            .ok_or_else(|| ConfigError::UnknownTarget(target_id.to_string()))?;
        Ok(self.extract_field_set(document, field_set))
    }

    /// Every catalog target, in catalog order.
    pub fn extract_all(&self, document: &Document) -> Vec<(String, ExtractionResult)> {
        self.catalog
            .iter()
            .map(|field_set| (field_set.id.clone(), self.extract_field_set(document, field_set)))
            .collect()
    }

    /// Strict anchoring first, scan mode only when no anchor exists.
    /// Never fails: absence is reported inside the result.
    pub fn extract_field_set(&self, document: &Document, field_set: &FieldSet) -> ExtractionResult {
        let blocks = document.blocks();
        let mut reporter = Reporter::new(&field_set.id);
        let anchor = locate_section(blocks, &field_set.titles, self.config.min_containment_len);

        let strict_done = if field_set.is_table() {
            self.try_strict_table(document, field_set, anchor, &mut reporter)
        } else {
            self.try_strict_text(blocks, field_set, anchor, &mut reporter)
        };

        if !strict_done {
            self.try_scan(blocks, field_set, &mut reporter);
        }

        let result = reporter.finish();
        tracing::info!(
            "Extraction '{}': found={} mode={:?} fields={} errors={} warnings={}",
            result.target,
            result.found,
            result.mode,
            result.fields.len(),
            result.errors.len(),
            result.warnings.len()
        );
        result
    }

    /// Returns true when strict anchoring succeeded (whatever it extracted).
    fn try_strict_text(
        &self,
        blocks: &[Block],
        field_set: &FieldSet,
        anchor: Option<usize>,
        reporter: &mut Reporter,
    ) -> bool {
        let Some(anchor) = anchor else {
            return false;
        };

        let section = collect_section(blocks, anchor, &self.config);
        if section.is_empty() {
            reporter.error(
                IssueCode::EmptySection,
                format!("heading for '{}' found at block {} but no content follows it", field_set.id, anchor),
            );
        }

        reporter.record(
            Mode::Strict,
            Extracted {
                content: section.text,
                source_blocks: section.blocks,
                ..Extracted::default()
            },
        );
        true
    }

    fn try_strict_table(
        &self,
        document: &Document,
        field_set: &FieldSet,
        anchor: Option<usize>,
        reporter: &mut Reporter,
    ) -> bool {
        let mut competitors: Vec<&FieldSet> = self.catalog.table_sets().collect();
        if !competitors.iter().any(|competitor| competitor.id == field_set.id) {
            competitors.push(field_set);
        }

        let assignments = classify_tables(document, competitors, self.config.min_containment_len);
        let owned: Vec<&TableAssignment> = assignments
            .iter()
            .filter(|assignment| assignment.field_set == field_set.id)
            .collect();

        let chosen = match anchor {
            Some(anchor) => owned
                .iter()
                .find(|assignment| assignment.block > anchor)
                .or_else(|| owned.first()),
            None => owned.first(),
        };

        let Some(chosen) = chosen else {
            if anchor.is_some() {
                reporter.error(
                    IssueCode::TableNotFound,
                    format!("heading for '{}' found but no table matched its labels", field_set.id),
                );
                reporter.record(Mode::Strict, Extracted::default());
                return true;
            }
            return false;
        };

        if owned.len() > 1 {
            tracing::debug!(
                "'{}' matched {} tables, using block {}",
                field_set.id,
                owned.len(),
                chosen.block
            );
        }

        if !chosen.tied_with.is_empty() {
            reporter.warning(
                IssueCode::AmbiguousTable,
                format!(
                    "table at block {} scored {} for '{}' and also for {:?}",
                    chosen.block, chosen.score, field_set.id, chosen.tied_with
                ),
            );
        }

        let rows = match &document.blocks()[chosen.block] {
            Block::Table { rows } => rows.as_slice(),
            _ => &[],
        };
        let mut extracted = match_rows(rows, field_set, self.config.min_containment_len);
        extracted.source_blocks = vec![chosen.block];
        reporter.record(Mode::Strict, extracted);
        true
    }

    fn try_scan(&self, blocks: &[Block], field_set: &FieldSet, reporter: &mut Reporter) {
        let soft_code = if field_set.is_table() {
            IssueCode::TableNotFound
        } else {
            IssueCode::SectionNotFound
        };
        let soft_message = format!("no heading or table anchors '{}'", field_set.id);

        tracing::debug!("Strict anchoring failed for '{}', scanning", field_set.id);
        let outcome = scan_blocks(blocks, field_set, &self.config);

        if outcome.is_empty() {
            reporter.error(soft_code, soft_message);
            reporter.record(Mode::Scan, Extracted::default());
            return;
        }

        // A table target that fell back to text still lost its fields
        if field_set.is_table() {
            reporter.warning(soft_code, soft_message);
        }

        let source_blocks = outcome.blocks();
        reporter.record(
            Mode::Scan,
            Extracted {
                content: outcome.text,
                source_blocks,
                ..Extracted::default()
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::dictionary::LabelDictionary;
    use crate::extractors::template::TableShapeTemplate;

    fn request_set() -> FieldSet {
        FieldSet::new("talep", ["Talep Bilgileri"])
            .with_dictionary(
                LabelDictionary::new()
                    .with("talep_no", ["talep no"])
                    .with("talep_adi", ["talep adi"]),
            )
            .with_template(TableShapeTemplate::label_value())
    }

    fn purpose_set() -> FieldSet {
        FieldSet::new("amac", ["Talebin Amacı"])
            .with_tier(10.0, ["iş hedefi"])
            .with_tier(3.0, ["amaç", "hedef"])
    }

    fn extractor() -> Extractor {
        let catalog = Catalog::new(vec![request_set(), purpose_set()]).unwrap();
        Extractor::new(catalog, EngineConfig::default())
    }

    #[test]
    fn test_request_table_example() {
        let doc = Document::new(vec![
            Block::heading(1, "Talep Bilgileri"),
            Block::table([["Talep No", "123"], ["Talep Adı", "Kampanya X"]]),
        ]);
        let result = extractor().extract(&doc, "talep").unwrap();

        assert!(result.found);
        assert_eq!(result.mode, Mode::Strict);
        assert_eq!(result.fields.len(), 2);
        assert_eq!(result.fields["talep_no"], "123");
        assert_eq!(result.fields["talep_adi"], "Kampanya X");
        assert_eq!(result.source_blocks, vec![1]);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_table_found_without_heading_is_still_strict() {
        let doc = Document::new(vec![
            Block::paragraph("Giriş metni."),
            Block::table([["Talep No", "9"], ["Talep Adı", "Y"]]),
        ]);
        let result = extractor().extract(&doc, "talep").unwrap();
        assert!(result.found);
        assert_eq!(result.mode, Mode::Strict);
    }

    #[test]
    fn test_table_after_anchor_preferred() {
        let doc = Document::new(vec![
            Block::table([["Talep No", "1"], ["Talep Adı", "Eski"]]),
            Block::heading(2, "Talep Bilgileri"),
            Block::table([["Talep No", "2"], ["Talep Adı", "Yeni"]]),
        ]);
        let result = extractor().extract(&doc, "talep").unwrap();
        assert_eq!(result.fields["talep_adi"], "Yeni");
        assert_eq!(result.source_blocks, vec![2]);
    }

    #[test]
    fn test_heading_without_table_is_table_not_found() {
        let doc = Document::new(vec![
            Block::heading(1, "Talep Bilgileri"),
            Block::table([["Bütçe", "100"], ["Süre", "3 ay"]]),
        ]);
        let result = extractor().extract(&doc, "talep").unwrap();
        assert!(!result.found);
        assert_eq!(result.mode, Mode::Strict);
        assert!(result.has_error(IssueCode::TableNotFound));
        assert!(result.has_error(IssueCode::NotFound));
        assert!(result.fields.is_empty());
    }

    #[test]
    fn test_text_section_strict() {
        let doc = Document::new(vec![
            Block::heading(2, "Talebin Amacı"),
            Block::paragraph("Fatura onay sürecini kısaltmak."),
            Block::heading(2, "Kapsam"),
        ]);
        let result = extractor().extract(&doc, "amac").unwrap();
        assert!(result.found);
        assert_eq!(result.mode, Mode::Strict);
        assert_eq!(result.content, "Fatura onay sürecini kısaltmak.");
    }

    #[test]
    fn test_empty_anchor_does_not_scan() {
        let doc = Document::new(vec![
            Block::heading(2, "Talebin Amacı"),
            Block::heading(2, "Kapsam"),
            Block::paragraph("Bu paragraf iş hedefi ve amaç kelimelerini içeren uzun bir metindir."),
        ]);
        let result = extractor().extract(&doc, "amac").unwrap();
        assert!(!result.found);
        assert_eq!(result.mode, Mode::Strict);
        assert!(result.has_error(IssueCode::EmptySection));
    }

    #[test]
    fn test_scan_fallback() {
        let doc = Document::new(vec![
            Block::heading(2, "Genel"),
            Block::paragraph("Bu paragraf iş hedefi ve amaç kelimelerini içeren uzun bir metindir."),
        ]);
        let result = extractor().extract(&doc, "amac").unwrap();
        assert!(result.found);
        assert_eq!(result.mode, Mode::Scan);
        assert!(result.errors.is_empty(), "section-not-found must stay hidden: {:?}", result.errors);
        assert_eq!(result.source_blocks, vec![1]);
    }

    #[test]
    fn test_nothing_found_anywhere() {
        let doc = Document::new(vec![Block::paragraph("İlgisiz ama yeterince uzun bir paragraf burada.")]);
        let result = extractor().extract(&doc, "amac").unwrap();
        assert!(!result.found);
        assert_eq!(result.mode, Mode::Scan);
        assert!(result.has_error(IssueCode::SectionNotFound));
        assert!(result.has_error(IssueCode::NotFound));
    }

    #[test]
    fn test_tied_table_goes_to_first_declared_with_warning() {
        let twin = FieldSet::new("talep_kopya", ["Talep Kopyası"])
            .with_dictionary(LabelDictionary::new().with("no", ["talep no"]).with("adi", ["talep adi"]))
            .with_template(TableShapeTemplate::label_value());
        let catalog = Catalog::new(vec![request_set(), twin]).unwrap();
        let extractor = Extractor::new(catalog, EngineConfig::default());
        let doc = Document::new(vec![Block::table([["Talep No", "123"], ["Talep Adı", "Kampanya X"]])]);

        let first = extractor.extract(&doc, "talep").unwrap();
        assert!(first.found);
        assert_eq!(first.mode, Mode::Strict);
        assert_eq!(first.fields["talep_no"], "123");
        assert!(first.has_warning(IssueCode::AmbiguousTable));
        assert!(first.errors.is_empty());

        let second = extractor.extract(&doc, "talep_kopya").unwrap();
        assert!(!second.found);
        assert!(second.fields.is_empty());
        assert!(second.has_error(IssueCode::TableNotFound));
    }

    #[test]
    fn test_unknown_target() {
        let err = extractor().extract(&Document::default(), "yok").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTarget(id) if id == "yok"));
    }

    #[test]
    fn test_extract_all_in_catalog_order() {
        let results = extractor().extract_all(&Document::default());
        let ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["talep", "amac"]);
        assert!(results.iter().all(|(_, result)| !result.found));
    }
}
