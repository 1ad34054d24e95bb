// src/extractors/dictionary.rs
use serde::{Deserialize, Serialize};

use super::normalize::{contains_either, normalize};

/// One canonical field key and the labels a document may use for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub key: String,
    pub labels: Vec<String>,
}

/// Ordered synonym table: canonical field key -> normalized label variants.
///
/// Declaration order matters: it breaks ties during fuzzy lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LabelEntry>", into = "Vec<LabelEntry>")]
pub struct LabelDictionary {
    entries: Vec<LabelEntry>,
}

impl From<Vec<LabelEntry>> for LabelDictionary {
    fn from(raw: Vec<LabelEntry>) -> Self {
        raw.into_iter().fold(Self::new(), |dict, entry| dict.with(&entry.key, entry.labels))
    }
}

impl From<LabelDictionary> for Vec<LabelEntry> {
    fn from(dict: LabelDictionary) -> Self {
        dict.entries
    }
}

impl LabelDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or extends) a key. Labels are normalized here, once.
    pub fn with<I, S>(mut self, key: &str, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let idx = match self.entries.iter().position(|entry| entry.key == key) {
            Some(idx) => idx,
            None => {
                self.entries.push(LabelEntry { key: key.to_string(), labels: Vec::new() });
                self.entries.len() - 1
            }
        };

        // Each normalized label counts once per key, wherever it was repeated
        let entry = &mut self.entries[idx];
        for label in labels.into_iter().map(|label| normalize(label.as_ref())) {
            if !label.is_empty() && !entry.labels.contains(&label) {
                entry.labels.push(label);
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    /// Every (key, label) pair in declaration order.
    pub fn synonyms(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|entry| entry.labels.iter().map(move |label| (entry.key.as_str(), label.as_str())))
    }

    pub fn synonym_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.labels.len()).sum()
    }

    /// Resolves a normalized label to its field key.
    ///
    /// Exact matches win over everything. Otherwise the first synonym (in
    /// declaration order) contained in the input, or containing it, wins.
    pub fn lookup(&self, normalized: &str, min_len: usize) -> Option<&str> {
        if normalized.is_empty() {
            return None;
        }

        if let Some((key, _)) = self.synonyms().find(|(_, label)| *label == normalized) {
            return Some(key);
        }

        self.synonyms()
            .find(|(_, label)| contains_either(normalized, label, min_len))
            .map(|(key, _)| key)
    }
}
