//! Service configuration types.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Upstream MapBiomas Fogo API settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Cache expiry settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Statistics engine parameters.
    #[serde(default)]
    pub stats: StatsConfig,
}

/// Upstream API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the MapBiomas Fogo API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Cache expiry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entries older than this are treated as absent on read.
    #[serde(default = "default_ttl_days")]
    pub ttl_days: i64,
}

/// Statistics engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Max metric computations in flight at once.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Rolling-mean window, in periods.
    #[serde(default = "default_rolling_window")]
    pub rolling_window: usize,

    /// A period is an anomaly when |value - mean| / std exceeds this.
    #[serde(default = "default_anomaly_z")]
    pub anomaly_z_threshold: f64,

    /// Ascending bin edges for event-size counts, in hectares. Edges
    /// [10, 100] produce bins "<10", "10-100", ">=100".
    #[serde(default = "default_bin_edges")]
    pub size_bin_edges: Vec<f64>,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://plataforma.monitorfogo.mapbiomas.org/api".into()
}

fn default_timeout() -> u64 {
    10
}

fn default_ttl_days() -> i64 {
    30
}

fn default_workers() -> usize {
    4
}

fn default_rolling_window() -> usize {
    3
}

fn default_anomaly_z() -> f64 {
    2.0
}

fn default_bin_edges() -> Vec<f64> {
    vec![10.0, 100.0, 1000.0, 10_000.0]
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_days: default_ttl_days(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            rolling_window: default_rolling_window(),
            anomaly_z_threshold: default_anomaly_z(),
            size_bin_edges: default_bin_edges(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            cache: CacheConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}
