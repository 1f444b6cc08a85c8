//! Keyword classifier.
//!
//! A transaction belongs to the category whose keyword exactly equals its
//! normalized details (no substring matching). Lookups go through a reverse
//! index built once per dictionary version; nothing about a classification
//! is cached between dictionary changes.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use fintrack_core::{CategoryDictionary, Transaction, UNCATEGORIZED, is_fallback, normalize_keyword};
use tracing::{debug, warn};

/// Reverse index: normalized keyword -> owning category
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    lookup: HashMap<String, String>,
}

impl KeywordIndex {
    /// Index every keyword in `dict`.
    ///
    /// The store keeps keywords one-to-one, but a hand-edited document can
    /// list a keyword twice; the category that comes first in dictionary
    /// order keeps it.
    pub fn build(dict: &CategoryDictionary) -> Self {
        let mut lookup = HashMap::new();
        for (category, keywords) in dict.iter() {
            if is_fallback(category) {
                continue;
            }
            for kw in keywords {
                match lookup.entry(normalize_keyword(kw)) {
                    Entry::Vacant(slot) => {
                        slot.insert(category.to_string());
                    }
                    Entry::Occupied(slot) if slot.get() != category => {
                        warn!(
                            keyword = %slot.key(),
                            kept = %slot.get(),
                            ignored = category,
                            "Keyword listed under two categories"
                        );
                    }
                    Entry::Occupied(_) => {}
                }
            }
        }
        Self { lookup }
    }

    /// Category whose keyword equals `details`, if any
    pub fn lookup(&self, details: &str) -> Option<&str> {
        self.lookup.get(&normalize_keyword(details)).map(String::as_str)
    }

    /// Category for `txn`: the matching keyword's owner, else the fallback
    pub fn classify(&self, txn: &Transaction) -> &str {
        self.lookup(&txn.details).unwrap_or(UNCATEGORIZED)
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}

/// Classify a single transaction against `dict`.
pub fn classify(txn: &Transaction, dict: &CategoryDictionary) -> String {
    KeywordIndex::build(dict).classify(txn).to_string()
}

/// Re-run classification over a whole batch, overwriting every category.
/// Returns how many rows matched a keyword.
pub fn classify_batch(txns: &mut [Transaction], dict: &CategoryDictionary) -> usize {
    let index = KeywordIndex::build(dict);
    let matched = txns
        .iter_mut()
        .map(|txn| {
            txn.category = index.classify(txn).to_string();
            !txn.is_uncategorized()
        })
        .filter(|&hit| hit)
        .count();
    debug!(rows = txns.len(), matched, keywords = index.len(), "Classified batch");
    matched
}
