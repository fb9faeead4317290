//! In-memory [`RecordStore`] for tests and embedding.
//!
//! Records live in a `BTreeMap` per period behind a `std::sync::RwLock`.
//! Keys are file names, so iteration is already in file-name order.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::error::{LookupError, Result};
use crate::models::CatalogEntry;
use crate::period::Period;

use super::RecordStore;

/// In-memory record store.
pub struct MemoryStore {
    periods: RwLock<BTreeMap<Period, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            periods: RwLock::new(BTreeMap::new()),
        }
    }

    /// Creates `period` with no records (an existing, empty directory).
    pub fn add_period(&self, period: Period) {
        let mut periods = self.periods.write().unwrap_or_else(|e| e.into_inner());
        periods.entry(period).or_default();
    }

    /// Stores `record` under `file_name` in `period`, creating the period.
    ///
    /// Malformed file names are accepted and later skipped by listings,
    /// the same way stray files in a directory are.
    pub fn insert(&self, period: Period, file_name: impl Into<String>, record: Value) {
        let mut periods = self.periods.write().unwrap_or_else(|e| e.into_inner());
        periods
            .entry(period)
            .or_default()
            .insert(file_name.into(), record);
    }

    fn location(period: Period, file_name: &str) -> String {
        format!("memory://{}/{}/{}", period.year, period.quarter_dir(), file_name)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    fn list_period(&self, period: Period) -> Result<Arc<[CatalogEntry]>> {
        let periods = self.periods.read().unwrap_or_else(|e| e.into_inner());
        let files = periods.get(&period).ok_or_else(|| LookupError::PathNotFound {
            period,
            path: PathBuf::from(format!("memory://{}/{}", period.year, period.quarter_dir())),
        })?;

        Ok(files
            .keys()
            .filter_map(|name| CatalogEntry::from_file_name(name, Self::location(period, name)))
            .collect::<Vec<_>>()
            .into())
    }

    fn load(&self, entry: &CatalogEntry) -> Result<Value> {
        let periods = self.periods.read().unwrap_or_else(|e| e.into_inner());
        periods
            .iter()
            .find_map(|(period, files)| {
                if Self::location(*period, &entry.file_name) == entry.location {
                    files.get(&entry.file_name).cloned()
                } else {
                    None
                }
            })
            .ok_or_else(|| LookupError::Io {
                path: PathBuf::from(&entry.location),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "record not in store"),
            })
    }

    fn periods(&self) -> Vec<Period> {
        let periods = self.periods.read().unwrap_or_else(|e| e.into_inner());
        periods.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn q1() -> Period {
        Period::new(2025, 1).unwrap()
    }

    #[test]
    fn test_missing_period_is_path_not_found() {
        let store = MemoryStore::new();
        let err = store.list_period(q1()).unwrap_err();
        assert!(matches!(err, LookupError::PathNotFound { .. }));
    }

    #[test]
    fn test_empty_period_lists_nothing() {
        let store = MemoryStore::new();
        store.add_period(q1());
        assert!(store.list_period(q1()).unwrap().is_empty());
        assert_eq!(store.periods(), vec![q1()]);
    }

    #[test]
    fn test_listing_sorted_and_filtered() {
        let store = MemoryStore::new();
        store.insert(q1(), "323410_카카오뱅크.json", json!({}));
        store.insert(q1(), "035720_카카오.json", json!({}));
        store.insert(q1(), "progress.json", json!({}));

        let names: Vec<String> = store
            .list_period(q1())
            .unwrap()
            .iter()
            .map(|e| e.file_name.clone())
            .collect();
        assert_eq!(names, vec!["035720_카카오.json", "323410_카카오뱅크.json"]);
    }

    #[test]
    fn test_load_roundtrip() {
        let store = MemoryStore::new();
        store.insert(q1(), "000010_신한은행.json", json!({"metadata": {"corp_name": "신한은행"}}));
        let entry = store.list_period(q1()).unwrap()[0].clone();
        let raw = store.load(&entry).unwrap();
        assert_eq!(raw["metadata"]["corp_name"], "신한은행");
    }
}
