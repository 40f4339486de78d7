//! Domain types shared across the service.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Territory identity ────────────────────────────────────────────────

/// Compound identifier for one cached territory series.
///
/// Equality is exact and case-sensitive on all three fields. Using the
/// struct itself as the map key avoids the separator-collision problem a
/// joined string key would have (`("a-b","c")` vs `("a","b-c")`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerritoryKey {
    /// Territory type (e.g., "state", "municipality").
    pub local_type: String,
    /// Territory code as delivered by the upstream API.
    pub local_id: String,
    /// Aggregation dimension (e.g., "biome").
    pub grouping: String,
}

impl TerritoryKey {
    pub fn new(
        local_type: impl Into<String>,
        local_id: impl Into<String>,
        grouping: impl Into<String>,
    ) -> Self {
        Self {
            local_type: local_type.into(),
            local_id: local_id.into(),
            grouping: grouping.into(),
        }
    }
}

impl fmt::Display for TerritoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.local_type, self.local_id, self.grouping)
    }
}

// ── Raw series points ─────────────────────────────────────────────────

/// One year of burned area, in hectares.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualPoint {
    pub year: i32,
    #[serde(rename = "areaHa")]
    pub area_ha: f64,
}

/// One month of burned area, in hectares.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    #[serde(rename = "areaHa")]
    pub area_ha: f64,
}

/// Which raw series a statistics run is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Annual,
    Monthly,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Annual => "annual",
            Mode::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Cache entry ───────────────────────────────────────────────────────

/// Everything cached for one territory key.
///
/// Entries are replaced wholesale, never mutated field-by-field.
/// `fetched_at` is set once per fetch cycle; attaching a statistics
/// report keeps the original timestamp so the TTL clock keeps running
/// from the upstream fetch, not the last recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub local_name: String,
    pub key: TerritoryKey,
    pub annual: Vec<AnnualPoint>,
    pub monthly: Vec<MonthlyPoint>,
    #[serde(default)]
    pub report: Option<StatisticsReport>,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Build a fresh entry from an upstream fetch. `fetched_at` is now.
    pub fn new(
        local_name: impl Into<String>,
        key: TerritoryKey,
        annual: Vec<AnnualPoint>,
        monthly: Vec<MonthlyPoint>,
    ) -> Self {
        Self {
            local_name: local_name.into(),
            key,
            annual,
            monthly,
            report: None,
            fetched_at: Utc::now(),
        }
    }

    /// Replacement entry carrying the same raw series and timestamp but a
    /// new report.
    pub fn with_report(mut self, report: StatisticsReport) -> Self {
        self.report = Some(report);
        self
    }

    /// Whether the series selected by `mode` has any points.
    pub fn has_series(&self, mode: Mode) -> bool {
        match mode {
            Mode::Annual => !self.annual.is_empty(),
            Mode::Monthly => !self.monthly.is_empty(),
        }
    }
}

// ── Statistics report ─────────────────────────────────────────────────

/// Merged statistics for one territory, one sub-report per mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual: Option<ModeReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly: Option<ModeReport>,
}

impl StatisticsReport {
    pub fn for_mode(&self, mode: Mode) -> Option<&ModeReport> {
        match mode {
            Mode::Annual => self.annual.as_ref(),
            Mode::Monthly => self.monthly.as_ref(),
        }
    }

    pub fn set_mode(&mut self, mode: Mode, report: ModeReport) {
        match mode {
            Mode::Annual => self.annual = Some(report),
            Mode::Monthly => self.monthly = Some(report),
        }
    }
}

/// One mode's statistics, in three groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic: Option<BasicStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptive: Option<DescriptiveStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_series: Option<TimeSeriesStats>,
}

/// One-pass summary statistics over the per-period burned areas.
///
/// Every numeric field is `None` rather than computed on a degenerate
/// series (variance and quartiles need n >= 2, CV needs a nonzero mean).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicStats {
    pub sample_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_deviation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficient_of_variation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_quartile: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub third_quartile: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cumulative_sum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_period_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonzero_period_fraction: Option<f64>,
}

/// Distribution-shape statistics, not tied to period ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficient_of_variation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomaly_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concentration_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_event_proportion: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_counts_by_size_bin: Option<BTreeMap<String, usize>>,
}

/// Order-dependent statistics over the period sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesStats {
    /// Per-step growth between consecutive annual points; a step whose
    /// previous value is zero is individually absent. Length is always
    /// one less than the number of annual points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yearly_growth_rate: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linear_trend_slope: Option<f64>,
    /// Per-month mean divided by the overall mean, keyed by zero-padded
    /// month number ("01".."12"). Monthly mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal_index: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_mean: Option<Vec<f64>>,
    /// Per-period deviation from the all-period mean.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_comparison: Option<Vec<f64>>,
}

// ── Upstream lookup types ─────────────────────────────────────────────

/// A territory as returned by the upstream search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Territory {
    pub name: String,
    /// Upstream delivers codes as either numbers or strings.
    #[serde(deserialize_with = "de_code_as_string")]
    pub code: String,
    #[serde(rename = "type")]
    pub territory_type: String,
    #[serde(default)]
    pub uf: Option<String>,
}

/// One grouping option's label translations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Translation {
    pub pt: String,
    pub es: String,
    pub en: String,
}

fn de_code_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "territory code must be a string or number, got {other}"
        ))),
    }
}
