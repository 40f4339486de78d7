//! The caller-supplied fetch capability that fills the cache.

use async_trait::async_trait;

use crate::error::Error;
use crate::types::{AnnualPoint, MonthlyPoint, TerritoryKey};

/// Raw series for one territory as delivered by the upstream provider,
/// already enriched with the territory's display name.
#[derive(Debug, Clone)]
pub struct RawSeries {
    pub local_name: String,
    pub annual: Vec<AnnualPoint>,
    pub monthly: Vec<MonthlyPoint>,
}

/// Source of raw burned-area series.
///
/// Implementations fail with [`Error::Upstream`] on network, timeout, or
/// invalid-payload conditions; the core treats that as fatal for the
/// current request and does not retry.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    async fn fetch_raw_series(&self, key: &TerritoryKey) -> Result<RawSeries, Error>;
}
