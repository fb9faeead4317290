//! Storage abstraction for record lookup.
//!
//! The [`RecordStore`] trait is everything the resolver and the report
//! enumerator need from storage: list one period, load one record. The
//! application crate implements it over the on-disk layout; [`memory`]
//! provides an in-memory store for tests and embedding.
//!
//! Listings must be returned sorted by file name. The resolver's "first
//! match wins" rules depend on a stable enumeration order, and raw
//! directory order differs across platforms.

pub mod memory;

use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;
use crate::models::CatalogEntry;
use crate::period::Period;

/// Read-only access to records grouped by period.
pub trait RecordStore: Send + Sync {
    /// All well-formed record files in `period`, sorted by file name.
    ///
    /// Listings are shared slices so caching stores can hand out the same
    /// snapshot to every caller.
    ///
    /// Fails with [`LookupError::PathNotFound`](crate::LookupError::PathNotFound)
    /// when the period has no directory at all. An existing but empty
    /// period returns an empty list.
    fn list_period(&self, period: Period) -> Result<Arc<[CatalogEntry]>>;

    /// Loads the raw JSON document behind `entry`.
    fn load(&self, entry: &CatalogEntry) -> Result<Value>;

    /// Periods that currently exist in the store, oldest first.
    fn periods(&self) -> Vec<Period>;

    /// Drops any cached listing for `period`. Stores without a cache ignore it.
    fn invalidate(&self, _period: Period) {}
}

impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    fn list_period(&self, period: Period) -> Result<Arc<[CatalogEntry]>> {
        (**self).list_period(period)
    }

    fn load(&self, entry: &CatalogEntry) -> Result<Value> {
        (**self).load(entry)
    }

    fn periods(&self) -> Vec<Period> {
        (**self).periods()
    }

    fn invalidate(&self, period: Period) {
        (**self).invalidate(period)
    }
}
