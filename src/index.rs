//! Per-period listing index.
//!
//! Wraps any [`RecordStore`] and caches each period's sorted listing after
//! the first access, so repeated lookups do not re-walk the directory.
//! Listings are immutable snapshots replaced wholesale on refresh. Records
//! themselves are never cached.
//!
//! A cached listing is only rebuilt when its TTL runs out or when it is
//! invalidated. [`DisclosureLookup`](crate::lookup::DisclosureLookup)
//! invalidates on a miss, but a stale listing that still yields a match is
//! used as is: if `카카오` is added after the index was built, the query
//! `카카오` resolves to a partial match on `카카오뱅크` until the listing
//! expires. Use a short `ttl_secs` when files change under a running server.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use dartdex_core::error::Result;
use dartdex_core::models::CatalogEntry;
use dartdex_core::store::RecordStore;
use dartdex_core::Period;

struct CachedListing {
    entries: Arc<[CatalogEntry]>,
    built_at: Instant,
}

pub struct IndexedStore<S> {
    inner: S,
    ttl: Option<Duration>,
    listings: RwLock<HashMap<Period, CachedListing>>,
}

impl<S: RecordStore> IndexedStore<S> {
    /// `ttl` of `None` keeps listings until [`RecordStore::invalidate`] is called.
    pub fn new(inner: S, ttl: Option<Duration>) -> Self {
        Self {
            inner,
            ttl,
            listings: RwLock::new(HashMap::new()),
        }
    }

    /// Builds from the `[index].ttl_secs` setting, where `0` means no expiry.
    pub fn with_ttl_secs(inner: S, ttl_secs: u64) -> Self {
        let ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs));
        Self::new(inner, ttl)
    }

    /// Number of periods currently indexed.
    pub fn indexed_periods(&self) -> usize {
        self.listings.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn fresh(&self, period: Period) -> Option<Arc<[CatalogEntry]>> {
        let listings = self.listings.read().unwrap_or_else(|e| e.into_inner());
        let cached = listings.get(&period)?;
        match self.ttl {
            Some(ttl) if cached.built_at.elapsed() >= ttl => None,
            _ => Some(cached.entries.clone()),
        }
    }
}

impl<S: RecordStore> RecordStore for IndexedStore<S> {
    fn list_period(&self, period: Period) -> Result<Arc<[CatalogEntry]>> {
        if let Some(entries) = self.fresh(period) {
            return Ok(entries);
        }

        // Missing periods are not cached; the directory may appear later.
        let entries = self.inner.list_period(period)?;
        tracing::debug!(%period, records = entries.len(), "indexed period");

        let mut listings = self.listings.write().unwrap_or_else(|e| e.into_inner());
        listings.insert(
            period,
            CachedListing {
                entries: entries.clone(),
                built_at: Instant::now(),
            },
        );
        Ok(entries)
    }

    fn load(&self, entry: &CatalogEntry) -> Result<Value> {
        self.inner.load(entry)
    }

    fn periods(&self) -> Vec<Period> {
        self.inner.periods()
    }

    fn invalidate(&self, period: Period) {
        let removed = self
            .listings
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&period)
            .is_some();
        if removed {
            tracing::debug!(%period, "invalidated period index");
        }
        self.inner.invalidate(period);
    }
}
