//! Three-tier company-name resolution.
//!
//! Maps a free-text company name to at most one record file of a period.
//! The tiers are strictly ordered and mutually exclusive:
//!
//! 1. **Exact**: a file whose company name equals the query. The first one
//!    in listing order wins and the scan stops.
//! 2. **Partial**: every name that contains the query or is contained in
//!    it. The shortest name wins, so `카카오` beats `카카오뱅크` for the
//!    query `카카오`. Equal lengths keep listing order.
//! 3. **Fuzzy**: names whose [`ratio`] with the query exceeds the
//!    threshold, best score first. Equal scores keep listing order.
//!
//! Listing order is file-name order (see [`RecordStore::list_period`]), so
//! every tie-break above is deterministic.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use crate::error::{LookupError, Result};
use crate::models::CatalogEntry;
use crate::period::Period;
use crate::similarity::ratio;
use crate::store::RecordStore;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.5;
pub const DEFAULT_FUZZY_CANDIDATES: usize = 5;

/// Resolver tuning, decoupled from application config.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Minimum similarity (exclusive) for a fuzzy candidate.
    pub fuzzy_threshold: f64,
    /// Size of the fuzzy shortlist (chosen candidate + alternatives).
    pub fuzzy_candidates: usize,
    /// When false, resolution stops after the partial tier.
    pub allow_fuzzy: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            fuzzy_candidates: DEFAULT_FUZZY_CANDIDATES,
            allow_fuzzy: true,
        }
    }
}

impl ResolveOptions {
    /// Same options with the fuzzy tier disabled.
    pub fn direct(&self) -> Self {
        Self {
            allow_fuzzy: false,
            ..self.clone()
        }
    }
}

/// Which tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Partial,
    Fuzzy,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchTier::Exact => "exact",
            MatchTier::Partial => "partial",
            MatchTier::Fuzzy => "fuzzy",
        };
        f.write_str(s)
    }
}

/// A scored fuzzy candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuzzyCandidate {
    pub company_name: String,
    pub file_name: String,
    pub score: f64,
}

/// Outcome of resolving one query.
///
/// Generic over the payload so the same shape carries a bare
/// [`CatalogEntry`] out of the resolver and a loaded record out of the
/// lookup service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum Resolution<R> {
    Exact {
        record: R,
    },
    Partial {
        record: R,
        matched_name: String,
    },
    Fuzzy {
        record: R,
        score: f64,
        alternatives: Vec<FuzzyCandidate>,
    },
    NotFound {
        query: String,
    },
}

impl<R> Resolution<R> {
    pub fn tier(&self) -> Option<MatchTier> {
        match self {
            Resolution::Exact { .. } => Some(MatchTier::Exact),
            Resolution::Partial { .. } => Some(MatchTier::Partial),
            Resolution::Fuzzy { .. } => Some(MatchTier::Fuzzy),
            Resolution::NotFound { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, Resolution::NotFound { .. })
    }

    pub fn record(&self) -> Option<&R> {
        match self {
            Resolution::Exact { record }
            | Resolution::Partial { record, .. }
            | Resolution::Fuzzy { record, .. } => Some(record),
            Resolution::NotFound { .. } => None,
        }
    }

    pub fn into_record(self) -> Option<R> {
        match self {
            Resolution::Exact { record }
            | Resolution::Partial { record, .. }
            | Resolution::Fuzzy { record, .. } => Some(record),
            Resolution::NotFound { .. } => None,
        }
    }

    /// Converts `NotFound` into [`LookupError::NotFound`] for `period`.
    pub fn into_found(self, period: Option<Period>) -> Result<R> {
        match self {
            Resolution::Exact { record }
            | Resolution::Partial { record, .. }
            | Resolution::Fuzzy { record, .. } => Ok(record),
            Resolution::NotFound { query } => Err(LookupError::not_found(query, period)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> Resolution<U> {
        match self {
            Resolution::Exact { record } => Resolution::Exact { record: f(record) },
            Resolution::Partial {
                record,
                matched_name,
            } => Resolution::Partial {
                record: f(record),
                matched_name,
            },
            Resolution::Fuzzy {
                record,
                score,
                alternatives,
            } => Resolution::Fuzzy {
                record: f(record),
                score,
                alternatives,
            },
            Resolution::NotFound { query } => Resolution::NotFound { query },
        }
    }

    pub fn try_map<U, E>(
        self,
        f: impl FnOnce(R) -> std::result::Result<U, E>,
    ) -> std::result::Result<Resolution<U>, E> {
        Ok(match self {
            Resolution::Exact { record } => Resolution::Exact { record: f(record)? },
            Resolution::Partial {
                record,
                matched_name,
            } => Resolution::Partial {
                record: f(record)?,
                matched_name,
            },
            Resolution::Fuzzy {
                record,
                score,
                alternatives,
            } => Resolution::Fuzzy {
                record: f(record)?,
                score,
                alternatives,
            },
            Resolution::NotFound { query } => Resolution::NotFound { query },
        })
    }
}

/// Trims the query and rejects it if nothing is left.
pub fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(LookupError::InvalidQuery {
            reason: "company name must not be empty".to_string(),
        });
    }
    Ok(trimmed)
}

/// Exact or substring match in either direction (tiers 1 and 2).
pub fn is_name_match(query: &str, name: &str) -> bool {
    query == name || name.contains(query) || query.contains(name)
}

/// Resolves `query` against an already-listed period.
pub fn resolve_entries(
    query: &str,
    entries: &[CatalogEntry],
    opts: &ResolveOptions,
) -> Resolution<CatalogEntry> {
    let mut partial: Vec<&CatalogEntry> = Vec::new();

    for entry in entries {
        let name = entry.company_name.as_str();
        if name == query {
            return Resolution::Exact {
                record: entry.clone(),
            };
        }
        if is_name_match(query, name) {
            partial.push(entry);
        }
    }

    // sort_by_key is stable: equal lengths keep listing order
    partial.sort_by_key(|e| e.company_name.chars().count());
    if let Some(best) = partial.first() {
        return Resolution::Partial {
            record: (*best).clone(),
            matched_name: best.company_name.clone(),
        };
    }

    if opts.allow_fuzzy {
        let mut ranked = rank_fuzzy(query, entries, opts.fuzzy_threshold);
        ranked.truncate(opts.fuzzy_candidates.max(1));
        if let Some(((best, score), rest)) = ranked.split_first() {
            let alternatives = rest
                .iter()
                .map(|(e, s)| FuzzyCandidate {
                    company_name: e.company_name.clone(),
                    file_name: e.file_name.clone(),
                    score: *s,
                })
                .collect();
            return Resolution::Fuzzy {
                record: (*best).clone(),
                score: *score,
                alternatives,
            };
        }
    }

    Resolution::NotFound {
        query: query.to_string(),
    }
}

/// Entries scoring above `threshold`, best first. Ties keep listing order.
fn rank_fuzzy<'a>(
    query: &str,
    entries: &'a [CatalogEntry],
    threshold: f64,
) -> Vec<(&'a CatalogEntry, f64)> {
    let mut scored: Vec<(&CatalogEntry, f64)> = entries
        .iter()
        .map(|e| (e, ratio(query, &e.company_name)))
        .filter(|(_, score)| *score > threshold)
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored
}

/// Fuzzy shortlist for `query` without resolving (used for "did you mean").
pub fn fuzzy_candidates(
    query: &str,
    entries: &[CatalogEntry],
    threshold: f64,
    limit: usize,
) -> Vec<FuzzyCandidate> {
    rank_fuzzy(query, entries, threshold)
        .into_iter()
        .take(limit)
        .map(|(e, score)| FuzzyCandidate {
            company_name: e.company_name.clone(),
            file_name: e.file_name.clone(),
            score,
        })
        .collect()
}

/// Lists `period` in `store` and resolves `query` against it.
///
/// Fails with [`LookupError::InvalidQuery`] for an empty query and
/// [`LookupError::PathNotFound`] when the period does not exist. A period
/// with no matching company yields `Ok(Resolution::NotFound)`.
pub fn resolve<S: RecordStore + ?Sized>(
    store: &S,
    query: &str,
    period: Period,
    opts: &ResolveOptions,
) -> Result<Resolution<CatalogEntry>> {
    let query = validate_query(query)?;
    let entries = store.list_period(period)?;
    Ok(resolve_entries(query, &entries, opts))
}
