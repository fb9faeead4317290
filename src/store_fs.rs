//! On-disk record store.
//!
//! Records live under `{base_path}/{year}/Q{quarter}/companies/` as
//! `{stock_code}_{company_name}.json`. A period directory is listed one level
//! deep; files that do not follow the naming convention are skipped.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use dartdex_core::error::Result;
use dartdex_core::models::CatalogEntry;
use dartdex_core::store::RecordStore;
use dartdex_core::{LookupError, Period};

/// Subdirectory of each period that holds the record files.
pub const COMPANIES_DIR: &str = "companies";

#[derive(Debug, Clone)]
pub struct FsStore {
    base_path: PathBuf,
}

impl FsStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn period_dir(&self, period: Period) -> PathBuf {
        self.base_path
            .join(period.year.to_string())
            .join(period.quarter_dir())
            .join(COMPANIES_DIR)
    }
}

impl RecordStore for FsStore {
    fn list_period(&self, period: Period) -> Result<Arc<[CatalogEntry]>> {
        let dir = self.period_dir(period);
        if !dir.is_dir() {
            return Err(LookupError::PathNotFound { period, path: dir });
        }

        let mut entries = Vec::new();
        let walker = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true);
        for entry in walker {
            let entry = entry.map_err(|e| walk_error(&dir, e))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            let location = entry.path().to_string_lossy().to_string();
            match CatalogEntry::from_file_name(&name, location) {
                Some(e) => entries.push(e),
                None => tracing::debug!(file = %name, "skipping malformed record file name"),
            }
        }

        // Sort for deterministic ordering
        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        Ok(entries.into())
    }

    fn load(&self, entry: &CatalogEntry) -> Result<Value> {
        let path = PathBuf::from(&entry.location);
        let content = std::fs::read_to_string(&path).map_err(|source| LookupError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| LookupError::Json { path, source })
    }

    fn periods(&self) -> Vec<Period> {
        let mut found = Vec::new();
        let years = match std::fs::read_dir(&self.base_path) {
            Ok(rd) => rd,
            Err(_) => return found,
        };

        for year_dir in years.flatten() {
            let year: i32 = match year_dir.file_name().to_string_lossy().parse() {
                Ok(y) => y,
                Err(_) => continue,
            };
            for quarter in 1..=4u8 {
                if let Ok(period) = Period::new(year, quarter) {
                    if self.period_dir(period).is_dir() {
                        found.push(period);
                    }
                }
            }
        }

        found.sort();
        found
    }
}

fn walk_error(dir: &Path, err: walkdir::Error) -> LookupError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop while listing period"));
    LookupError::Io { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn q(year: i32, quarter: u8) -> Period {
        Period::new(year, quarter).unwrap()
    }

    fn seed(tmp: &TempDir, period: Period, files: &[&str]) -> FsStore {
        let store = FsStore::new(tmp.path());
        let dir = store.period_dir(period);
        fs::create_dir_all(&dir).unwrap();
        for f in files {
            fs::write(dir.join(f), r#"{"metadata": {}, "api_data": {}}"#).unwrap();
        }
        store
    }

    #[test]
    fn test_period_dir_layout() {
        let store = FsStore::new("/data");
        assert_eq!(
            store.period_dir(q(2025, 3)),
            PathBuf::from("/data/2025/Q3/companies")
        );
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let tmp = TempDir::new().unwrap();
        let store = seed(
            &tmp,
            q(2025, 1),
            &[
                "323410_카카오뱅크.json",
                "035720_카카오.json",
                "notes.txt",
                "nounderscore.json",
                "000000_.json",
            ],
        );
        fs::create_dir_all(store.period_dir(q(2025, 1)).join("999999_서브디렉터리.json")).unwrap();

        let entries = store.list_period(q(2025, 1)).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.company_name.as_str()).collect();
        assert_eq!(names, vec!["카카오", "카카오뱅크"]);
        assert_eq!(entries[0].stock_code, "035720");
    }

    #[test]
    fn test_missing_period_is_path_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = FsStore::new(tmp.path());
        let err = store.list_period(q(2024, 2)).unwrap_err();
        assert!(matches!(err, LookupError::PathNotFound { .. }));
    }

    #[test]
    fn test_empty_period_is_empty_list() {
        let tmp = TempDir::new().unwrap();
        let store = seed(&tmp, q(2025, 2), &[]);
        assert!(store.list_period(q(2025, 2)).unwrap().is_empty());
    }

    #[test]
    fn test_load_and_parse_errors() {
        let tmp = TempDir::new().unwrap();
        let store = seed(&tmp, q(2025, 1), &["005930_삼성전자.json"]);
        let dir = store.period_dir(q(2025, 1));
        fs::write(dir.join("000660_SK하이닉스.json"), "{ not json").unwrap();

        let entries = store.list_period(q(2025, 1)).unwrap();
        let bad = entries.iter().find(|e| e.company_name == "SK하이닉스").unwrap();
        let good = entries.iter().find(|e| e.company_name == "삼성전자").unwrap();

        assert!(store.load(good).unwrap().get("api_data").is_some());
        assert!(matches!(store.load(bad), Err(LookupError::Json { .. })));
    }

    #[test]
    fn test_periods_scan() {
        let tmp = TempDir::new().unwrap();
        seed(&tmp, q(2025, 1), &[]);
        seed(&tmp, q(2024, 4), &[]);
        fs::create_dir_all(tmp.path().join("README")).unwrap();
        fs::create_dir_all(tmp.path().join("2023").join("Q1")).unwrap();

        let store = FsStore::new(tmp.path());
        assert_eq!(store.periods(), vec![q(2024, 4), q(2025, 1)]);
    }
}
