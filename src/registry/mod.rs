//! Test registry
//!
//! Stores test definitions under a normalized id derived from their display
//! name, together with the archive of results each test has produced.
//!
//! The id is the name lowercased with every character outside `[a-z0-9_]`
//! removed, so `"My Test!"` and `"mytest"` share an entry while `"my_test"`
//! does not. Adding under an id that already exists replaces the entry.

use std::collections::HashMap;

use crate::models::{ArchivedResult, TestDefinition};

/// A registered test and its archived results
#[derive(Clone, Debug)]
pub struct RegistryEntry {
    pub name: String,
    pub test: TestDefinition,
    /// Append-only, oldest first
    pub results: Vec<ArchivedResult>,
}

/// Normalized id for a display name
pub fn normalize_id(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

/// Id → entry map owned by a suite
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<String, RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a test, replacing any entry with the same normalized id.
    /// The definition is not validated here.
    pub fn add(&mut self, name: impl Into<String>, test: TestDefinition) {
        let name = name.into();
        let id = normalize_id(&name);
        self.entries.insert(
            id,
            RegistryEntry {
                name,
                test,
                results: Vec::new(),
            },
        );
    }

    /// Look up an entry by any name that normalizes to its id
    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(&normalize_id(name))
    }

    /// Display names of every entry, in no particular order
    pub fn get_list(&self) -> Vec<String> {
        self.entries
            .values()
            .filter(|entry| !entry.name.is_empty())
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// Append a result to an entry's archive. Returns `false` if the entry
    /// no longer exists.
    pub fn archive(&mut self, name: &str, result: ArchivedResult) -> bool {
        match self.entries.get_mut(&normalize_id(name)) {
            Some(entry) => {
                entry.results.push(result);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
