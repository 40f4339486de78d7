//! Cache-aside fire data service.
//!
//! Owns the read path (cache hit or upstream fill) and the statistics
//! write-back cycle: full read, full compute, full replace — never a
//! partial-field cache update, so a report can never mix series
//! generations.

use tracing::{debug, info};

use common::{CacheEntry, Mode, Result, SeriesProvider, StatisticsReport, TerritoryKey};

use crate::cache::SharedCache;
use crate::engine::StatsEngine;
use crate::metrics::SeriesView;

/// Fire data access and statistics coordination for one cache.
pub struct FireDataService<P> {
    provider: P,
    cache: SharedCache,
    engine: StatsEngine,
}

impl<P: SeriesProvider> FireDataService<P> {
    pub fn new(provider: P, cache: SharedCache, engine: StatsEngine) -> Self {
        Self {
            provider,
            cache,
            engine,
        }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Raw series for a territory, from cache when live, otherwise
    /// fetched upstream and cached. Upstream failure is fatal for the
    /// request and nothing is cached.
    pub async fn get_raw(&self, key: &TerritoryKey) -> Result<CacheEntry> {
        if let Some(entry) = self.cache.get(key) {
            debug!("cache hit for {}", key);
            return Ok(entry);
        }

        info!("cache miss for {}, fetching upstream", key);
        let raw = self.provider.fetch_raw_series(key).await?;
        let entry = CacheEntry::new(raw.local_name, key.clone(), raw.annual, raw.monthly);
        self.cache.put(entry.clone());
        Ok(entry)
    }

    /// Run the statistics catalog for one mode and attach the merged
    /// report to the cache entry it was derived from.
    ///
    /// The replacement entry carries the same raw series and fetch
    /// timestamp; only the report changes, and the other mode's
    /// sub-report survives.
    pub async fn run_statistics(
        &self,
        key: &TerritoryKey,
        mode: Mode,
    ) -> Result<StatisticsReport> {
        let entry = self.get_raw(key).await?;

        let view = SeriesView::from_entry(&entry, mode);
        let mode_report = self.engine.compute(key, view).await?;

        let mut report = entry.report.clone().unwrap_or_default();
        report.set_mode(mode, mode_report);
        self.cache.put(entry.with_report(report.clone()));

        info!("statistics ready for {} ({} mode)", key, mode);
        Ok(report)
    }

    /// The last computed report for a territory, if the entry is still
    /// live. Absent means not yet computed or expired, not an error.
    pub fn report(&self, key: &TerritoryKey) -> Option<StatisticsReport> {
        self.cache.get(key).and_then(|entry| entry.report)
    }
}
