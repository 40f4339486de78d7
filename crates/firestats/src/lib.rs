//! Statistics core: expiring cache, metric catalog, and the engine that
//! fans the catalog out over raw burned-area series.

pub mod cache;
pub mod engine;
pub mod metrics;
pub mod service;

pub use cache::{new_cache, ExpiringCache, SharedCache};
pub use engine::StatsEngine;
pub use metrics::{MetricDescriptor, MetricValue, SeriesView};
pub use service::FireDataService;
