//! Disclosure lookup service.
//!
//! [`DisclosureLookup`] is the one entry point the CLI and the HTTP server
//! share: resolve a company name in a period, load and post-process the
//! record, or enumerate every period that has one.
//!
//! A query that finds nothing invalidates the period's cached listing and is
//! retried once, so files written after the index was built are still found.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use dartdex_core::error::Result;
use dartdex_core::models::{CatalogEntry, CompanyRecord};
use dartdex_core::postprocess::{PostProcessor, ProcessedReport};
use dartdex_core::reports::{enumerate_reports, ReportListing};
use dartdex_core::resolve::{fuzzy_candidates, resolve, FuzzyCandidate, Resolution, ResolveOptions};
use dartdex_core::store::RecordStore;
use dartdex_core::{LookupError, Period};

use crate::config::Config;
use crate::index::IndexedStore;
use crate::store_fs::FsStore;

/// A resolved, loaded and processed record.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedDisclosure {
    pub period: Period,
    pub entry: CatalogEntry,
    #[serde(skip)]
    pub raw: Value,
    #[serde(skip)]
    pub record: CompanyRecord,
    pub processed: ProcessedReport,
}

impl LoadedDisclosure {
    /// Company name as the collector recorded it, falling back to the file name.
    pub fn company_name(&self) -> &str {
        self.record.corp_name().unwrap_or(&self.entry.company_name)
    }
}

/// Presence and size of one configured period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: Period,
    pub present: bool,
    pub records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct DisclosureLookup<S> {
    store: S,
    options: ResolveOptions,
    processor: PostProcessor,
    periods: Vec<Period>,
}

impl DisclosureLookup<Arc<dyn RecordStore>> {
    /// Builds the on-disk store described by `config`, indexed unless
    /// `[index].enabled` is false.
    pub fn from_config(config: &Config) -> Self {
        let fs = FsStore::new(&config.data.base_path);
        let store: Arc<dyn RecordStore> = if config.index.enabled {
            Arc::new(IndexedStore::with_ttl_secs(fs, config.index.ttl_secs))
        } else {
            Arc::new(fs)
        };

        Self::new(
            store,
            config.resolve_options(),
            PostProcessor::new(config.resolver.header_mode),
            config.period_grid(),
        )
    }
}

impl<S: RecordStore> DisclosureLookup<S> {
    pub fn new(
        store: S,
        options: ResolveOptions,
        processor: PostProcessor,
        periods: Vec<Period>,
    ) -> Self {
        Self {
            store,
            options,
            processor,
            periods,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Periods scanned by [`quarterly_reports`](Self::quarterly_reports), oldest first.
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Resolves `query` in one period through all three tiers.
    pub fn resolve(&self, query: &str, year: i32, quarter: u8) -> Result<Resolution<CatalogEntry>> {
        let period = Period::new(year, quarter)?;
        self.resolve_in(query, period, &self.options)
    }

    fn resolve_in(
        &self,
        query: &str,
        period: Period,
        opts: &ResolveOptions,
    ) -> Result<Resolution<CatalogEntry>> {
        let resolution = resolve(&self.store, query, period, opts)?;
        if resolution.is_found() {
            log_resolution(query, period, &resolution);
            return Ok(resolution);
        }

        self.store.invalidate(period);
        let resolution = resolve(&self.store, query, period, opts)?;
        log_resolution(query, period, &resolution);
        Ok(resolution)
    }

    /// Resolves `query` and loads the matching record.
    pub fn find_and_load(
        &self,
        query: &str,
        year: i32,
        quarter: u8,
    ) -> Result<Resolution<LoadedDisclosure>> {
        let period = Period::new(year, quarter)?;
        self.resolve_in(query, period, &self.options)?
            .try_map(|entry| self.load(period, entry))
    }

    /// Exact or substring lookup only. Fails with [`LookupError::NotFound`]
    /// rather than falling back to a fuzzy guess, so the returned resolution
    /// is always an exact or partial match.
    pub fn company_data(
        &self,
        query: &str,
        year: i32,
        quarter: u8,
    ) -> Result<Resolution<LoadedDisclosure>> {
        let period = Period::new(year, quarter)?;
        match self.resolve_in(query, period, &self.options.direct())? {
            Resolution::NotFound { query } => Err(LookupError::not_found(query, Some(period))),
            found => found.try_map(|entry| self.load(period, entry)),
        }
    }

    /// Loads and processes one catalog entry.
    pub fn load(&self, period: Period, entry: CatalogEntry) -> Result<LoadedDisclosure> {
        let raw = self.store.load(&entry)?;
        let record = CompanyRecord::from_value(&raw)?;
        let processed = self.processor.process_record(&record);
        tracing::info!(
            %period,
            file = %entry.file_name,
            sections = record.sections.len(),
            "loaded record"
        );
        Ok(LoadedDisclosure {
            period,
            entry,
            raw,
            record,
            processed,
        })
    }

    /// Closest names in `period` regardless of the fuzzy threshold, for
    /// "did you mean" hints after a miss. Empty if the period is unreadable.
    pub fn suggestions(&self, query: &str, period: Period, limit: usize) -> Vec<FuzzyCandidate> {
        match self.store.list_period(period) {
            Ok(entries) => fuzzy_candidates(query.trim(), &entries, 0.0, limit),
            Err(_) => Vec::new(),
        }
    }

    /// Every configured period with a record for `query`, newest first.
    pub fn quarterly_reports(&self, query: &str, target: Option<Period>) -> Result<ReportListing> {
        match self.enumerate(query, target) {
            Err(LookupError::NotFound { .. }) => {
                for &period in &self.periods {
                    self.store.invalidate(period);
                }
                self.enumerate(query, target)
            }
            other => other,
        }
    }

    fn enumerate(&self, query: &str, target: Option<Period>) -> Result<ReportListing> {
        let (listing, skipped) = enumerate_reports(&self.store, query, &self.periods, target)?;
        for s in &skipped {
            tracing::warn!(period = %s.period, error = %s.error, "skipped unreadable period");
        }
        tracing::debug!(query, found = listing.total_count, "enumerated reports");
        Ok(listing)
    }

    /// One row per configured period.
    pub fn period_summaries(&self) -> Vec<PeriodSummary> {
        self.periods
            .iter()
            .map(|&period| match self.store.list_period(period) {
                Ok(entries) => PeriodSummary {
                    period,
                    present: true,
                    records: entries.len(),
                    error: None,
                },
                Err(LookupError::PathNotFound { .. }) => PeriodSummary {
                    period,
                    present: false,
                    records: 0,
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(%period, error = %e, "failed to list period");
                    PeriodSummary {
                        period,
                        present: true,
                        records: 0,
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect()
    }
}

fn log_resolution(query: &str, period: Period, resolution: &Resolution<CatalogEntry>) {
    match resolution.record() {
        Some(entry) => tracing::debug!(
            query,
            %period,
            tier = ?resolution.tier(),
            file = %entry.file_name,
            "resolved company"
        ),
        None => tracing::debug!(query, %period, "no match"),
    }
}
