// src/extractors/scan.rs
use std::cmp::Ordering;

use super::config::EngineConfig;
use super::field_set::FieldSet;
use super::normalize::{is_non_textual, normalize, occurrences};
use crate::document::Block;

/// A paragraph that made it into scan-mode content.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanHit {
    pub block: usize,
    pub score: f64,
    pub text: String,
}

/// Result of scanning a document for one field set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    /// Best hits joined by blank lines, highest score first.
    pub text: String,
    pub hits: Vec<ScanHit>,
}

impl ScanOutcome {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn blocks(&self) -> Vec<usize> {
        self.hits.iter().map(|hit| hit.block).collect()
    }
}

/// Weighted keyword score of a normalized paragraph, without the length bonus.
pub fn keyword_score(normalized: &str, field_set: &FieldSet) -> f64 {
    field_set
        .lexicon
        .iter()
        .map(|tier| {
            let hits: usize = tier.keywords.iter().map(|keyword| occurrences(normalized, keyword)).sum();
            hits as f64 * tier.weight
        })
        .sum()
}

/// Scores every paragraph against the field set's keyword tiers and keeps the
/// best `scan_top_k` above the acceptance score.
///
/// Used only when no heading anchor exists. Paragraphs that are too short,
/// contain blacklisted vocabulary or carry no letters are never candidates,
/// nor (unless `scan_require_keyword` is off) those matching no keyword.
/// Table cells are never scanned.
pub fn scan_blocks(blocks: &[Block], field_set: &FieldSet, config: &EngineConfig) -> ScanOutcome {
    let threshold = field_set.scan_min_score.unwrap_or(config.scan_min_score);
    let mut hits = Vec::new();

    for (idx, block) in blocks.iter().enumerate() {
        let Block::Paragraph { text } = block else {
            continue;
        };
        let text = text.trim();
        let length = text.chars().count();
        if length < config.scan_min_len {
            continue;
        }

        let normalized = normalize(text);
        if is_non_textual(&normalized) {
            continue;
        }
        if let Some(term) = field_set.blacklist.iter().find(|term| normalized.contains(term.as_str())) {
            tracing::trace!("Block {} rejected for '{}': blacklisted '{}'", idx, field_set.id, term);
            continue;
        }

        let keywords = keyword_score(&normalized, field_set);
        if config.scan_require_keyword && keywords <= 0.0 {
            continue;
        }

        let length_bonus = (length as f64 / config.scan_length_divisor as f64).min(config.scan_length_cap);
        let score = keywords + length_bonus;
        tracing::trace!("Block {} scored {:.1} for '{}'", idx, score, field_set.id);

        if score > threshold {
            hits.push(ScanHit { block: idx, score, text: text.to_string() });
        }
    }

    // Stable sort: equal scores keep document order
    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    hits.truncate(config.scan_top_k);

    tracing::debug!("Scan for '{}' kept {} paragraphs", field_set.id, hits.len());

    ScanOutcome {
        text: hits.iter().map(|hit| hit.text.as_str()).collect::<Vec<_>>().join("\n\n"),
        hits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purpose_set() -> FieldSet {
        FieldSet::new("amac", ["Talebin Amacı"])
            .with_tier(10.0, ["iş hedefi", "talebin amacı"])
            .with_tier(3.0, ["amaç", "hedef"])
            .with_tier(1.0, ["süreç"])
            .with_blacklist(["risk analizi"])
    }

    #[test]
    fn test_keyword_score_uses_tier_weights() {
        let set = purpose_set();
        // "hedef" also occurs inside "is hedefi"
        let score = keyword_score(&normalize("İş hedefi, süreç ve süreç"), &set);
        assert_eq!(score, 10.0 + 3.0 + 2.0);
    }

    #[test]
    fn test_scan_ranks_and_filters() {
        let blocks = vec![
            Block::paragraph("Talebin amacı, iş hedefi doğrultusunda satış sürecini sadeleştirmektir."),
            Block::paragraph("Bu bölüm risk analizi kapsamında hedef ve amaç bilgilerini içerir."),
            Block::paragraph("Kısa amaç."),
            Block::table([["Talebin amacı iş hedefi", "çok uzun bir tablo hücresi metni burada"]]),
            Block::paragraph("Hedef: yeni süreç ile onay süresini yarıya indirmek; bu amaç için süreç adımları sadeleştirilecek."),
            Block::paragraph("Bu paragraf tamamen alakasız bir konudan, sunucu bakımından bahseder."),
            Block::paragraph("12.05.2024 - 13.05.2024 / 14.05.2024 - 15.05.2024 ..."),
        ];
        let outcome = scan_blocks(&blocks, &purpose_set(), &EngineConfig::default());

        assert_eq!(outcome.blocks(), vec![0, 4]);
        assert!(outcome.hits[0].score > outcome.hits[1].score);
        assert!(outcome.text.starts_with("Talebin amacı"));
        assert!(outcome.text.contains("\n\nHedef:"));
    }

    #[test]
    fn test_top_k_limit() {
        let blocks: Vec<Block> = (0..8)
            .map(|i| Block::paragraph(format!("Paragraf {} talebin amacı ve iş hedefi hakkında bilgi verir.", i)))
            .collect();
        let config = EngineConfig { scan_top_k: 3, ..EngineConfig::default() };
        let outcome = scan_blocks(&blocks, &purpose_set(), &config);
        assert_eq!(outcome.blocks(), vec![0, 1, 2]);
    }

    #[test]
    fn test_no_candidates_is_empty_not_error() {
        let blocks = vec![Block::paragraph("Tamamen ilgisiz ama yeterince uzun olan bir paragraf metni.")];
        let outcome = scan_blocks(&blocks, &purpose_set(), &EngineConfig::default());
        assert!(outcome.is_empty());
        assert!(outcome.text.is_empty());
    }

    #[test]
    fn test_length_alone_needs_keyword_rule_off() {
        let text = "Sunucu bakımı gece yapılacak ve yedekler kontrol edilecek. ".repeat(5);
        let blocks = vec![Block::paragraph(text)];
        assert!(scan_blocks(&blocks, &purpose_set(), &EngineConfig::default()).is_empty());

        let config = EngineConfig { scan_require_keyword: false, ..EngineConfig::default() };
        let outcome = scan_blocks(&blocks, &purpose_set(), &config);
        assert_eq!(outcome.blocks(), vec![0]);
        assert!(outcome.hits[0].score > 10.0);
    }

    #[test]
    fn test_field_set_threshold_override() {
        let blocks = vec![Block::paragraph("Bu çalışmada temel hedef ve amaç, mevcut onay sürecinin belirgin biçimde iyileştirilmesidir.")];
        let strict = purpose_set().with_scan_min_score(50.0);
        assert!(scan_blocks(&blocks, &strict, &EngineConfig::default()).is_empty());
        assert!(!scan_blocks(&blocks, &purpose_set(), &EngineConfig::default()).is_empty());
    }
}
