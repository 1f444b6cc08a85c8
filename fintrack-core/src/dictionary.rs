//! The category dictionary: category name -> learned keywords.
//!
//! Categories keep insertion order, which is also the order they are
//! persisted in. The reserved `Uncategorized` bucket always exists and never
//! holds keywords. Every mutation here is in-memory only; durability is the
//! category store's job.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Fallback category for transactions no keyword matches
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Normalize a keyword or transaction details string for matching
pub fn normalize_keyword(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether `name` is the reserved fallback category
pub fn is_fallback(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(UNCATEGORIZED)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDictionary {
    entries: Vec<(String, Vec<String>)>,
}

impl Default for CategoryDictionary {
    fn default() -> Self {
        Self {
            entries: vec![(UNCATEGORIZED.to_string(), Vec::new())],
        }
    }
}

impl CategoryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(category, keywords)` pairs in order. Keywords are
    /// normalized and de-duplicated. Any spelling of the fallback folds into
    /// `Uncategorized`, which is added if missing and keeps no keywords.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, K)>,
        K: IntoIterator<Item = String>,
    {
        let mut dict = Self { entries: Vec::new() };
        for (name, keywords) in entries {
            let name = match name.trim() {
                "" => continue,
                n if is_fallback(n) => UNCATEGORIZED.to_string(),
                n => n.to_string(),
            };
            let idx = match dict.position(&name) {
                Some(idx) => idx,
                None => {
                    dict.entries.push((name.clone(), Vec::new()));
                    dict.entries.len() - 1
                }
            };
            if is_fallback(&name) {
                continue;
            }
            let slot = &mut dict.entries[idx].1;
            for kw in keywords {
                let kw = normalize_keyword(&kw);
                if !kw.is_empty() && !slot.contains(&kw) {
                    slot.push(kw);
                }
            }
        }
        if !dict.contains(UNCATEGORIZED) {
            dict.entries.insert(0, (UNCATEGORIZED.to_string(), Vec::new()));
        }
        dict
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Number of categories, fallback included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Category names in iteration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// `(category, keywords)` pairs in iteration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(n, k)| (n.as_str(), k.as_slice()))
    }

    pub fn keywords(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|idx| self.entries[idx].1.as_slice())
    }

    /// The first category (in iteration order) that lists `keyword`
    pub fn owner_of(&self, keyword: &str) -> Option<&str> {
        let kw = normalize_keyword(keyword);
        self.entries
            .iter()
            .find(|(_, kws)| kws.contains(&kw))
            .map(|(n, _)| n.as_str())
    }

    /// Add an empty category. Returns `false` if it already exists.
    pub fn insert_category(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() || is_fallback(name) {
            return Err(Error::InvalidCategory(name.to_string()));
        }
        if self.contains(name) {
            return Ok(false);
        }
        self.entries.push((name.to_string(), Vec::new()));
        Ok(true)
    }

    /// Drop a category and its keywords
    pub fn remove_category(&mut self, name: &str) -> Result<()> {
        if is_fallback(name) {
            return Err(Error::InvalidCategory(name.to_string()));
        }
        let idx = self
            .position(name)
            .ok_or_else(|| Error::UnknownCategory(name.to_string()))?;
        self.entries.remove(idx);
        Ok(())
    }

    /// Register `keyword` under `category`. Returns whether the dictionary
    /// changed.
    ///
    /// A keyword belongs to at most one category: if another category
    /// already lists it, it is moved here. Blank keywords are ignored.
    pub fn insert_keyword(&mut self, category: &str, keyword: &str) -> Result<bool> {
        if is_fallback(category) {
            return Err(Error::InvalidCategory(category.to_string()));
        }
        let idx = self
            .position(category)
            .ok_or_else(|| Error::UnknownCategory(category.to_string()))?;

        let kw = normalize_keyword(keyword);
        if kw.is_empty() || self.entries[idx].1.contains(&kw) {
            return Ok(false);
        }

        for (i, (_, kws)) in self.entries.iter_mut().enumerate() {
            if i != idx {
                kws.retain(|k| k != &kw);
            }
        }
        self.entries[idx].1.push(kw);
        Ok(true)
    }

    /// Remove `keyword` from every category listing it. Returns the first
    /// previous owner, if any.
    pub fn remove_keyword(&mut self, keyword: &str) -> Option<String> {
        let kw = normalize_keyword(keyword);
        let mut owner = None;
        for (name, kws) in self.entries.iter_mut() {
            let before = kws.len();
            kws.retain(|k| k != &kw);
            if kws.len() != before && owner.is_none() {
                owner = Some(name.clone());
            }
        }
        owner
    }
}

impl Serialize for CategoryDictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, keywords) in &self.entries {
            map.serialize_entry(name, keywords)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryDictionary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct DictionaryVisitor;

        impl<'de> Visitor<'de> for DictionaryVisitor {
            type Value = CategoryDictionary;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category name to keyword list")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, Vec<String>)> = Vec::new();
                while let Some((name, keywords)) = access.next_entry::<String, Vec<String>>()? {
                    entries.push((name, keywords));
                }
                Ok(CategoryDictionary::from_entries(entries))
            }
        }

        deserializer.deserialize_map(DictionaryVisitor)
    }
}
