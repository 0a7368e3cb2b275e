//! An in-process search index.

use crate::error::SearchError;
use crate::index::{SearchHit, SearchIndex};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

const EXACT_WORD: f64 = 2.0;
const PARTIAL_WORD: f64 = 1.0;
const NEAR_WORD: f64 = 0.5;
/// Shortest query word that may match with a single typo.
const MIN_FUZZY_LEN: usize = 4;

type Documents = BTreeMap<(String, String), Value>;

/// A [`SearchIndex`] keeping parsed documents in memory.
#[derive(Debug, Default)]
pub struct MemorySearchIndex {
    indices: RwLock<HashMap<String, Documents>>,
}

impl MemorySearchIndex {
    /// Creates an index with no versions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of documents indexed for a version.
    pub fn document_count(&self, version: &str) -> usize {
        self.read().get(version).map_or(0, BTreeMap::len)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Documents>> {
        self.indices.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Documents>> {
        self.indices.write().unwrap_or_else(|e| e.into_inner())
    }

    fn search<F>(&self, version: &str, doc_type: &str, score: F) -> Result<Vec<SearchHit>, SearchError>
    where
        F: Fn(&Value) -> f64,
    {
        let indices = self.read();
        let docs = indices
            .get(version)
            .ok_or_else(|| SearchError::NoSuchIndex(version.to_string()))?;
        let mut hits: Vec<SearchHit> = docs
            .iter()
            .filter(|((t, _), _)| t == doc_type)
            .filter_map(|((_, id), doc)| {
                let score = score(doc);
                (score > 0.0).then(|| SearchHit {
                    id: id.clone(),
                    score,
                })
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        Ok(hits)
    }
}

impl SearchIndex for MemorySearchIndex {
    fn has_index(&self, version: &str) -> bool {
        self.read().contains_key(version)
    }

    fn create_index(&self, version: &str) -> Result<(), SearchError> {
        self.write().entry(version.to_string()).or_default();
        Ok(())
    }

    fn index_document(
        &self,
        version: &str,
        doc_type: &str,
        json: &str,
        id: &str,
    ) -> Result<(), SearchError> {
        let doc: Value = serde_json::from_str(json).map_err(|e| SearchError::InvalidDocument {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        self.write()
            .entry(version.to_string())
            .or_default()
            .insert((doc_type.to_string(), id.to_string()), doc);
        Ok(())
    }

    fn expunge_index(&self, version: &str) -> bool {
        let existed = self.write().remove(version).is_some();
        if existed {
            debug!(version, "expunged search index");
        }
        existed
    }

    fn expunge_all(&self) {
        self.write().clear();
    }

    fn term_search(
        &self,
        version: &str,
        doc_type: &str,
        field: &str,
        terms: &[String],
    ) -> Result<Vec<SearchHit>, SearchError> {
        self.search(version, doc_type, |doc| {
            let matches = |v: &Value| v.as_str().is_some_and(|s| terms.iter().any(|t| t == s));
            let matched = match doc.get(field) {
                Some(Value::Array(items)) => items.iter().filter(|v| matches(v)).count(),
                Some(v) if matches(v) => 1,
                _ => 0,
            };
            matched as f64
        })
    }

    fn fuzzy_search(
        &self,
        version: &str,
        doc_type: &str,
        query: &str,
        fields: &[&str],
    ) -> Result<Vec<SearchHit>, SearchError> {
        let query_words = words(query);
        if query_words.is_empty() {
            return Ok(Vec::new());
        }
        self.search(version, doc_type, |doc| {
            let mut doc_words = Vec::new();
            for field in fields {
                if let Some(v) = doc.get(*field) {
                    collect_words(v, &mut doc_words);
                }
            }
            query_words
                .iter()
                .map(|q| {
                    doc_words
                        .iter()
                        .map(|w| word_score(q, w))
                        .fold(0.0, f64::max)
                })
                .sum()
        })
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Gathers the words of every string nested anywhere under `value`.
fn collect_words(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(words(s)),
        Value::Array(items) => items.iter().for_each(|v| collect_words(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_words(v, out)),
        _ => {}
    }
}

fn word_score(query: &str, word: &str) -> f64 {
    if query == word {
        EXACT_WORD
    } else if word.contains(query) {
        PARTIAL_WORD
    } else if query.chars().count() >= MIN_FUZZY_LEN && edit_distance(query, word) <= 1 {
        NEAR_WORD
    } else {
        0.0
    }
}

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut cur = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != *cb);
            cur[j + 1] = substitution.min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        prev = cur;
    }
    prev[b.len()]
}
