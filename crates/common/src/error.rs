//! Unified error type for firemetrics.
//!
//! A cache miss is not an error — it is modelled as `Option::None`
//! throughout the codebase.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The upstream fire-data API could not deliver a usable payload
    /// (network failure, timeout, non-2xx status, invalid or empty JSON).
    /// Fatal for the enclosing request; not retried here.
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    /// A single metric function failed. Non-fatal for the statistics
    /// batch — the metric's fields stay absent from the report.
    #[error("metric '{metric}' failed: {message}")]
    Metric {
        metric: &'static str,
        message: String,
    },

    /// Two catalog entries claimed the same report slot, or a metric
    /// produced a value of the wrong shape for its slot. Indicates a
    /// programming defect; fails the batch fast.
    #[error("metric catalog misconfigured: {0}")]
    Catalog(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
