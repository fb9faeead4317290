//! Multi-period report enumeration.
//!
//! Given a company name that is not yet pinned to a period, walks a bounded
//! set of periods and returns a lightweight reference to the matching
//! record in each, newest first. Matching uses tiers 1 and 2 of the
//! resolver only (exact or substring, no fuzzy ranking), and only the
//! first matching file in listing order is taken per period.

use serde::Serialize;

use crate::error::{LookupError, Result};
use crate::models::CatalogEntry;
use crate::period::Period;
use crate::resolve::{is_name_match, validate_query};
use crate::store::RecordStore;

/// A matching record in one period. Not loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRef {
    pub period: Period,
    pub company_name: String,
    pub file_name: String,
    #[serde(skip)]
    pub location: String,
    /// True when `period` equals the caller's target period.
    pub is_target: bool,
}

/// Every period with a matching record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportListing {
    /// The query as given (trimmed).
    pub company_name: String,
    /// Newest period first.
    pub reports: Vec<RecordRef>,
    pub total_count: usize,
}

impl ReportListing {
    /// The reference for the target period, if it was found.
    pub fn target(&self) -> Option<&RecordRef> {
        self.reports.iter().find(|r| r.is_target)
    }
}

/// A period directory that exists but could not be listed.
#[derive(Debug)]
pub struct SkippedPeriod {
    pub period: Period,
    pub error: LookupError,
}

/// First entry in `entries` matching `query` exactly or by substring.
pub fn first_name_match<'a>(query: &str, entries: &'a [CatalogEntry]) -> Option<&'a CatalogEntry> {
    entries.iter().find(|e| is_name_match(query, &e.company_name))
}

/// Enumerates `periods` in `store` for `query`.
///
/// Periods without a directory are skipped silently. Periods whose listing
/// fails for any other reason are skipped and returned in the second
/// element so the caller can report them. Fails with
/// [`LookupError::NotFound`] when no period has a match.
pub fn enumerate_reports<S: RecordStore + ?Sized>(
    store: &S,
    query: &str,
    periods: &[Period],
    target: Option<Period>,
) -> Result<(ReportListing, Vec<SkippedPeriod>)> {
    let query = validate_query(query)?;

    let mut reports = Vec::new();
    let mut skipped = Vec::new();

    for &period in periods {
        let entries = match store.list_period(period) {
            Ok(entries) => entries,
            Err(LookupError::PathNotFound { .. }) => continue,
            Err(error) => {
                skipped.push(SkippedPeriod { period, error });
                continue;
            }
        };

        if let Some(entry) = first_name_match(query, &entries) {
            reports.push(RecordRef {
                period,
                company_name: entry.company_name.clone(),
                file_name: entry.file_name.clone(),
                location: entry.location.clone(),
                is_target: target == Some(period),
            });
        }
    }

    if reports.is_empty() {
        return Err(LookupError::not_found(query, None));
    }

    reports.sort_by(|a, b| b.period.cmp(&a.period));
    let total_count = reports.len();

    Ok((
        ReportListing {
            company_name: query.to_string(),
            reports,
            total_count,
        },
        skipped,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use serde_json::json;

    fn p(year: i32, quarter: u8) -> Period {
        Period::new(year, quarter).unwrap()
    }

    fn grid() -> Vec<Period> {
        Period::grid(&[2022, 2023, 2024, 2025], &[1, 2, 3, 4])
    }

    #[test]
    fn test_newest_first_and_target_flag() {
        let store = MemoryStore::new();
        store.insert(p(2024, 2), "035720_카카오.json", json!({}));
        store.insert(p(2025, 1), "035720_카카오.json", json!({}));
        store.insert(p(2023, 4), "035720_카카오.json", json!({}));

        let (listing, skipped) =
            enumerate_reports(&store, "카카오", &grid(), Some(p(2024, 2))).unwrap();
        assert!(skipped.is_empty());
        assert_eq!(listing.total_count, 3);
        let periods: Vec<String> = listing.reports.iter().map(|r| r.period.to_string()).collect();
        assert_eq!(periods, vec!["2025Q1", "2024Q2", "2023Q4"]);
        assert_eq!(listing.target().unwrap().period, p(2024, 2));
        assert_eq!(listing.reports.iter().filter(|r| r.is_target).count(), 1);
    }

    #[test]
    fn test_one_match_per_period_in_listing_order() {
        let store = MemoryStore::new();
        store.insert(p(2025, 1), "000001_카카오뱅크.json", json!({}));
        store.insert(p(2025, 1), "035720_카카오.json", json!({}));

        let (listing, _) = enumerate_reports(&store, "카카오", &grid(), None).unwrap();
        assert_eq!(listing.total_count, 1);
        // First in file-name order, not shortest.
        assert_eq!(listing.reports[0].company_name, "카카오뱅크");
        assert!(!listing.reports[0].is_target);
    }

    #[test]
    fn test_no_fuzzy_tier() {
        let store = MemoryStore::new();
        store.insert(p(2025, 1), "005380_현대자동차.json", json!({}));
        let err = enumerate_reports(&store, "현대차", &grid(), None).unwrap_err();
        assert!(matches!(err, LookupError::NotFound { .. }));
    }

    #[test]
    fn test_periods_outside_range_ignored() {
        let store = MemoryStore::new();
        store.insert(p(2019, 1), "035720_카카오.json", json!({}));
        let err = enumerate_reports(&store, "카카오", &grid(), None).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_empty_query_rejected() {
        let store = MemoryStore::new();
        let err = enumerate_reports(&store, "", &grid(), None).unwrap_err();
        assert!(matches!(err, LookupError::InvalidQuery { .. }));
    }
}
