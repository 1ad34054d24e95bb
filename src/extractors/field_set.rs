// src/extractors/field_set.rs
use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::dictionary::LabelDictionary;
use super::normalize::normalize;
use super::template::TableShapeTemplate;
use crate::utils::error::ConfigError;

/// Generic column captions that mark a header row rather than data.
const GENERIC_HEADER_TOKENS: &[&str] = &[
    "alan", "deger", "aciklama", "soru", "cevap", "yanit", "bilgi", "baslik",
    "field", "value", "question", "answer", "explanation", "label", "description",
];

/// Keywords sharing a weight in scan mode. Compound keywords sit in the
/// heaviest tier, generic single words in the lightest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordTier {
    pub weight: f64,
    pub keywords: Vec<String>,
}

/// Complete configuration of one extractable target (form section or table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSet {
    pub id: String,
    /// Heading variants for strict anchoring.
    pub titles: Vec<String>,
    #[serde(default)]
    pub dictionary: LabelDictionary,
    /// Row shapes; a field set with templates is a table target.
    #[serde(default)]
    pub templates: Vec<TableShapeTemplate>,
    #[serde(default)]
    pub lexicon: Vec<KeywordTier>,
    /// Vocabulary of other sections; a paragraph containing any of it is never scanned in.
    #[serde(default)]
    pub blacklist: Vec<String>,
    #[serde(default)]
    pub header_tokens: Vec<String>,
    #[serde(default)]
    pub min_table_score: Option<usize>,
    #[serde(default)]
    pub scan_min_score: Option<f64>,
}

impl FieldSet {
    pub fn new<I, S>(id: &str, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            id: id.to_string(),
            titles: normalize_all(titles),
            dictionary: LabelDictionary::new(),
            templates: Vec::new(),
            lexicon: Vec::new(),
            blacklist: Vec::new(),
            header_tokens: Vec::new(),
            min_table_score: None,
            scan_min_score: None,
        }
    }

    pub fn with_dictionary(mut self, dictionary: LabelDictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    pub fn with_template(mut self, template: TableShapeTemplate) -> Self {
        self.templates.push(template);
        self
    }

    pub fn with_tier<I, S>(mut self, weight: f64, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.lexicon.push(KeywordTier { weight, keywords: normalize_all(keywords) });
        self
    }

    pub fn with_blacklist<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.blacklist.extend(normalize_all(terms));
        self
    }

    pub fn with_header_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.header_tokens.extend(normalize_all(tokens));
        self
    }

    pub fn with_min_table_score(mut self, score: usize) -> Self {
        self.min_table_score = Some(score);
        self
    }

    pub fn with_scan_min_score(mut self, score: f64) -> Self {
        self.scan_min_score = Some(score);
        self
    }

    pub fn is_table(&self) -> bool {
        !self.templates.is_empty()
    }

    /// Minimum classifier score for a table to count as this target's table.
    pub fn table_threshold(&self) -> usize {
        self.min_table_score.unwrap_or(if self.dictionary.synonym_count() <= 12 { 2 } else { 3 })
    }

    /// Captions that make a first row a header: explicit tokens, the generic
    /// ones and the dictionary's own key names ("talep_no" -> "talep no").
    pub fn header_token_set(&self) -> HashSet<String> {
        self.header_tokens
            .iter()
            .cloned()
            .chain(GENERIC_HEADER_TOKENS.iter().map(|token| token.to_string()))
            .chain(self.dictionary.keys().map(normalize))
            .collect()
    }

    /// Re-normalizes every term. Needed after deserializing hand-written JSON.
    fn normalize_terms(&mut self) {
        self.titles = normalize_all(&self.titles);
        self.blacklist = normalize_all(&self.blacklist);
        self.header_tokens = normalize_all(&self.header_tokens);
        for tier in &mut self.lexicon {
            tier.keywords = normalize_all(&tier.keywords);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let fail = |reason: String| ConfigError::InvalidFieldSet { id: self.id.clone(), reason };

        if self.id.trim().is_empty() {
            return Err(fail("id is empty".to_string()));
        }
        if self.titles.is_empty() {
            return Err(fail("no title variants".to_string()));
        }
        if self.is_table() && self.dictionary.is_empty() {
            return Err(fail("table target without a label dictionary".to_string()));
        }
        for template in &self.templates {
            template.slots().map_err(fail)?;
        }
        if let Some(tier) = self.lexicon.iter().find(|tier| !(tier.weight > 0.0)) {
            return Err(fail(format!("keyword tier weight must be positive, got {}", tier.weight)));
        }
        Ok(())
    }
}

fn normalize_all<I, S>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    terms
        .into_iter()
        .map(|term| normalize(term.as_ref()))
        .filter(|term| !term.is_empty())
        .collect()
}

/// The field sets one extraction session works with, in declaration order.
/// Declaration order breaks classifier ties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    field_sets: Vec<FieldSet>,
}

impl Catalog {
    pub fn new(field_sets: Vec<FieldSet>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let mut prepared = Vec::with_capacity(field_sets.len());

        for mut field_set in field_sets {
            field_set.normalize_terms();
            field_set.validate()?;
            if !seen.insert(field_set.id.clone()) {
                return Err(ConfigError::DuplicateId(field_set.id));
            }
            prepared.push(field_set);
        }

        Ok(Self { field_sets: prepared })
    }

    /// Parses a JSON array of field sets.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let field_sets: Vec<FieldSet> = serde_json::from_str(json)?;
        Self::new(field_sets)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&json)?;
        tracing::info!("Loaded {} field sets from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&FieldSet> {
        self.field_sets.iter().find(|field_set| field_set.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSet> {
        self.field_sets.iter()
    }

    /// Field sets competing for tables during classification.
    pub fn table_sets(&self) -> impl Iterator<Item = &FieldSet> {
        self.field_sets.iter().filter(|field_set| field_set.is_table())
    }

    pub fn len(&self) -> usize {
        self.field_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_sets.is_empty()
    }
}
