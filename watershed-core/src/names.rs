//! Name-by-code table shipped alongside the boundary dataset.
//!
//! A truncated ancestor code carries no name of its own; display names for
//! ancestor levels come from this table. Missing entries are expected and
//! surface as a level with no name.

use rustc_hash::FxHashMap;

/// Lookup table from a hydrologic code string to its display name.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    entries: FxHashMap<String, String>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a name. Empty names are ignored.
    pub fn insert(&mut self, code: impl Into<String>, name: impl Into<String>) {
        let name = name.into();
        if name.trim().is_empty() {
            return;
        }
        self.entries.insert(code.into(), name);
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NameTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = NameTable::new();
        for (code, name) in iter {
            table.insert(code, name);
        }
        table
    }
}
