//! The fixed metric catalog and its pure computation functions.
//!
//! Every function is a pure computation over a [`SeriesView`]; territory
//! identity never reaches them. Numeric conventions (documented here and
//! applied uniformly):
//!
//! - variance is the sample variance (n − 1 denominator)
//! - quartiles use linear interpolation at position q·(n − 1) on the
//!   sorted sample
//! - "large event" means a period strictly above Q3
//! - event size bins come from `StatsConfig::size_bin_edges` (hectares)
//!
//! Degenerate inputs never panic: an empty series yields an absent
//! result, and any metric needing two or more points is absent for a
//! single-point series. Zero-area periods are kept in the sample.

use std::collections::BTreeMap;

use common::config::StatsConfig;
use common::{BasicStats, CacheEntry, Error, Mode, Result};

// ── Series view ───────────────────────────────────────────────────────

/// The mode-selected series a statistics run computes over.
///
/// `months` parallels `values` in monthly mode and is empty otherwise.
#[derive(Debug, Clone)]
pub struct SeriesView {
    pub mode: Mode,
    pub values: Vec<f64>,
    pub months: Vec<u32>,
}

impl SeriesView {
    pub fn from_entry(entry: &CacheEntry, mode: Mode) -> Self {
        match mode {
            Mode::Annual => Self {
                mode,
                values: entry.annual.iter().map(|p| p.area_ha).collect(),
                months: Vec::new(),
            },
            Mode::Monthly => Self {
                mode,
                values: entry.monthly.iter().map(|p| p.area_ha).collect(),
                months: entry.monthly.iter().map(|p| p.month).collect(),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ── Catalog types ─────────────────────────────────────────────────────

/// Report group a metric writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Basic,
    Descriptive,
    TimeSeries,
}

/// A metric's computed value, shaped for its report slot.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Scalar(f64),
    Count(usize),
    Series(Vec<f64>),
    /// Sequence with individually-absent steps (zero denominators).
    SteppedSeries(Vec<Option<f64>>),
    IndexMap(BTreeMap<String, f64>),
    CountMap(BTreeMap<String, usize>),
}

pub type MetricFn = fn(&SeriesView, &StatsConfig) -> Result<Option<MetricValue>>;

/// One catalog entry: a named pure function targeting one report slot.
#[derive(Debug)]
pub struct MetricDescriptor {
    pub name: &'static str,
    pub group: Group,
    pub field: &'static str,
    pub run: MetricFn,
}

/// The fixed, ordered metric catalog. Slots are disjoint; the engine
/// fails fast if that ever stops being true.
pub static CATALOG: &[MetricDescriptor] = &[
    MetricDescriptor {
        name: "yearly_growth_rate",
        group: Group::TimeSeries,
        field: "yearly_growth_rate",
        run: yearly_growth_rate,
    },
    MetricDescriptor {
        name: "linear_trend",
        group: Group::TimeSeries,
        field: "linear_trend_slope",
        run: linear_trend,
    },
    MetricDescriptor {
        name: "detect_anomalies",
        group: Group::Descriptive,
        field: "anomaly_count",
        run: detect_anomalies,
    },
    MetricDescriptor {
        name: "seasonal_index",
        group: Group::TimeSeries,
        field: "seasonal_index",
        run: seasonal_index,
    },
    MetricDescriptor {
        name: "rolling_mean",
        group: Group::TimeSeries,
        field: "rolling_mean",
        run: rolling_mean,
    },
    MetricDescriptor {
        name: "concentration_index",
        group: Group::Descriptive,
        field: "concentration_index",
        run: concentration_index,
    },
    MetricDescriptor {
        name: "large_event_proportion",
        group: Group::Descriptive,
        field: "large_event_proportion",
        run: large_event_proportion,
    },
    MetricDescriptor {
        name: "event_counts_by_size_bin",
        group: Group::Descriptive,
        field: "event_counts_by_size_bin",
        run: event_counts_by_size_bin,
    },
    MetricDescriptor {
        name: "coefficient_of_variation",
        group: Group::Descriptive,
        field: "coefficient_of_variation",
        run: coefficient_of_variation,
    },
    MetricDescriptor {
        name: "compare_to_historical_average",
        group: Group::TimeSeries,
        field: "historical_comparison",
        run: compare_to_historical_average,
    },
];

// ── Basic summary ─────────────────────────────────────────────────────

/// One-pass summary of the per-period burned areas. `None` for an empty
/// series; multi-point fields stay `None` at n = 1.
pub fn basic_stats(view: &SeriesView) -> Option<BasicStats> {
    let values = &view.values;
    if values.is_empty() {
        return None;
    }

    let n = values.len();
    let total: f64 = values.iter().sum();
    let mean = total / n as f64;

    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let min = sorted[0];
    let max = sorted[n - 1];
    let median = quantile(&sorted, 0.5);

    let variance = sample_variance(values, mean);
    let std_dev = variance.map(f64::sqrt);
    let cv = std_dev.and_then(|s| if mean != 0.0 { Some(s / mean) } else { None });

    let (q1, q3) = if n >= 2 {
        (Some(quantile(&sorted, 0.25)), Some(quantile(&sorted, 0.75)))
    } else {
        (None, None)
    };

    let zero_count = values.iter().filter(|v| **v == 0.0).count();

    Some(BasicStats {
        sample_size: n,
        total: Some(total),
        mean: Some(mean),
        median: Some(median),
        min: Some(min),
        max: Some(max),
        range: Some(max - min),
        variance,
        standard_deviation: std_dev,
        coefficient_of_variation: cv,
        first_quartile: q1,
        third_quartile: q3,
        cumulative_sum: Some(total),
        zero_period_count: Some(zero_count),
        nonzero_period_fraction: Some((n - zero_count) as f64 / n as f64),
    })
}

// ── Time-series metrics ───────────────────────────────────────────────

/// Per-step growth between consecutive annual points. A step whose
/// previous value is zero is individually absent. Annual mode only.
fn yearly_growth_rate(view: &SeriesView, _cfg: &StatsConfig) -> Result<Option<MetricValue>> {
    if view.mode != Mode::Annual || view.len() < 2 {
        return Ok(None);
    }

    let steps = view
        .values
        .windows(2)
        .map(|w| {
            if w[0] == 0.0 {
                None
            } else {
                Some((w[1] - w[0]) / w[0])
            }
        })
        .collect();

    Ok(Some(MetricValue::SteppedSeries(steps)))
}

/// Ordinary least squares slope of value against 0-based period index.
fn linear_trend(view: &SeriesView, _cfg: &StatsConfig) -> Result<Option<MetricValue>> {
    let n = view.len();
    if n < 2 {
        return Ok(None);
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = view.values.iter().sum::<f64>() / n as f64;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in view.values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }

    Ok(Some(MetricValue::Scalar(num / den)))
}

/// Per-month mean divided by the overall mean, over whatever months are
/// present. Monthly mode only; absent when the overall mean is zero.
fn seasonal_index(view: &SeriesView, _cfg: &StatsConfig) -> Result<Option<MetricValue>> {
    if view.mode != Mode::Monthly || view.is_empty() {
        return Ok(None);
    }
    if view.months.len() != view.values.len() {
        return Err(Error::Metric {
            metric: "seasonal_index",
            message: "month labels do not parallel the value series".into(),
        });
    }

    let overall_mean = view.values.iter().sum::<f64>() / view.len() as f64;
    if overall_mean == 0.0 {
        return Ok(None);
    }

    let mut sums: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for (month, value) in view.months.iter().zip(&view.values) {
        let slot = sums.entry(*month).or_insert((0.0, 0));
        slot.0 += value;
        slot.1 += 1;
    }

    let index = sums
        .into_iter()
        .map(|(month, (sum, count))| {
            let month_mean = sum / count as f64;
            (format!("{month:02}"), month_mean / overall_mean)
        })
        .collect();

    Ok(Some(MetricValue::IndexMap(index)))
}

/// Rolling mean over the configured window. Output length is
/// n − window + 1; absent when the series is shorter than the window.
fn rolling_mean(view: &SeriesView, cfg: &StatsConfig) -> Result<Option<MetricValue>> {
    let window = cfg.rolling_window;
    if window == 0 {
        return Err(Error::Metric {
            metric: "rolling_mean",
            message: "rolling window must be at least 1".into(),
        });
    }
    if view.len() < window {
        return Ok(None);
    }

    let means = view
        .values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect();

    Ok(Some(MetricValue::Series(means)))
}

/// Per-period deviation from the all-period mean.
fn compare_to_historical_average(
    view: &SeriesView,
    _cfg: &StatsConfig,
) -> Result<Option<MetricValue>> {
    if view.len() < 2 {
        return Ok(None);
    }

    let mean = view.values.iter().sum::<f64>() / view.len() as f64;
    let deviations = view.values.iter().map(|v| v - mean).collect();

    Ok(Some(MetricValue::Series(deviations)))
}

// ── Descriptive metrics ───────────────────────────────────────────────

/// Count of periods whose |z| exceeds the configured threshold, using
/// the sample standard deviation. A flat series has no anomalies.
fn detect_anomalies(view: &SeriesView, cfg: &StatsConfig) -> Result<Option<MetricValue>> {
    let n = view.len();
    if n < 2 {
        return Ok(None);
    }

    let mean = view.values.iter().sum::<f64>() / n as f64;
    let std_dev = sample_variance(&view.values, mean)
        .map(f64::sqrt)
        .unwrap_or(0.0);
    if std_dev == 0.0 {
        return Ok(Some(MetricValue::Count(0)));
    }

    let count = view
        .values
        .iter()
        .filter(|v| ((**v - mean) / std_dev).abs() > cfg.anomaly_z_threshold)
        .count();

    Ok(Some(MetricValue::Count(count)))
}

/// Gini coefficient of the per-period burned areas: 0 when every period
/// burned equally, approaching 1 when a few periods hold the total.
fn concentration_index(view: &SeriesView, _cfg: &StatsConfig) -> Result<Option<MetricValue>> {
    let n = view.len();
    if n < 2 {
        return Ok(None);
    }

    let total: f64 = view.values.iter().sum();
    if total <= 0.0 {
        return Ok(None);
    }

    let mut sorted = view.values.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, v)| (i + 1) as f64 * v)
        .sum();

    let gini = (2.0 * weighted) / (n as f64 * total) - (n as f64 + 1.0) / n as f64;
    Ok(Some(MetricValue::Scalar(gini)))
}

/// Fraction of periods strictly above the third quartile.
fn large_event_proportion(view: &SeriesView, _cfg: &StatsConfig) -> Result<Option<MetricValue>> {
    let n = view.len();
    if n < 2 {
        return Ok(None);
    }

    let mut sorted = view.values.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let q3 = quantile(&sorted, 0.75);

    let large = view.values.iter().filter(|v| **v > q3).count();
    Ok(Some(MetricValue::Scalar(large as f64 / n as f64)))
}

/// Counts of periods per configured size bin. Edges [a, b] produce bins
/// "<a", "a-b", ">=b".
fn event_counts_by_size_bin(view: &SeriesView, cfg: &StatsConfig) -> Result<Option<MetricValue>> {
    if view.is_empty() {
        return Ok(None);
    }
    let edges = &cfg.size_bin_edges;
    if edges.is_empty() {
        return Err(Error::Metric {
            metric: "event_counts_by_size_bin",
            message: "size_bin_edges must not be empty".into(),
        });
    }

    let labels = bin_labels(edges);
    let mut counts: BTreeMap<String, usize> = labels.iter().map(|l| (l.clone(), 0)).collect();

    for value in &view.values {
        let idx = edges.iter().position(|e| value < e).unwrap_or(edges.len());
        *counts.get_mut(&labels[idx]).expect("label exists") += 1;
    }

    Ok(Some(MetricValue::CountMap(counts)))
}

/// Standard deviation over mean; absent when the mean is zero.
fn coefficient_of_variation(view: &SeriesView, _cfg: &StatsConfig) -> Result<Option<MetricValue>> {
    let n = view.len();
    if n < 2 {
        return Ok(None);
    }

    let mean = view.values.iter().sum::<f64>() / n as f64;
    if mean == 0.0 {
        return Ok(None);
    }

    let std_dev = sample_variance(&view.values, mean)
        .map(f64::sqrt)
        .unwrap_or(0.0);

    Ok(Some(MetricValue::Scalar(std_dev / mean)))
}

// ── Numeric helpers ───────────────────────────────────────────────────

/// Sample variance (n − 1 denominator); `None` for n < 2.
fn sample_variance(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some(ss / (n - 1) as f64)
}

/// Linear-interpolation quantile at position q·(n − 1) of a sorted,
/// non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

fn bin_labels(edges: &[f64]) -> Vec<String> {
    let mut labels = Vec::with_capacity(edges.len() + 1);
    labels.push(format!("<{}", edges[0]));
    for pair in edges.windows(2) {
        labels.push(format!("{}-{}", pair[0], pair[1]));
    }
    labels.push(format!(">={}", edges[edges.len() - 1]));
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annual_view(values: &[f64]) -> SeriesView {
        SeriesView {
            mode: Mode::Annual,
            values: values.to_vec(),
            months: Vec::new(),
        }
    }

    fn monthly_view(points: &[(u32, f64)]) -> SeriesView {
        SeriesView {
            mode: Mode::Monthly,
            values: points.iter().map(|p| p.1).collect(),
            months: points.iter().map(|p| p.0).collect(),
        }
    }

    fn cfg() -> StatsConfig {
        StatsConfig::default()
    }

    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    // ── basic summary ─────────────────────────────────────────────────

    #[test]
    fn test_basic_stats_full_series() {
        let stats = basic_stats(&annual_view(&[1.0, 2.0, 3.0, 4.0])).unwrap();
        assert_eq!(stats.sample_size, 4);
        approx(stats.total.unwrap(), 10.0);
        approx(stats.mean.unwrap(), 2.5);
        approx(stats.median.unwrap(), 2.5);
        approx(stats.min.unwrap(), 1.0);
        approx(stats.max.unwrap(), 4.0);
        approx(stats.range.unwrap(), 3.0);
        // Sample variance of 1..4 is 5/3.
        approx(stats.variance.unwrap(), 5.0 / 3.0);
        // Linear-interpolation quartiles.
        approx(stats.first_quartile.unwrap(), 1.75);
        approx(stats.third_quartile.unwrap(), 3.25);
        assert_eq!(stats.zero_period_count.unwrap(), 0);
        approx(stats.nonzero_period_fraction.unwrap(), 1.0);
    }

    #[test]
    fn test_basic_stats_counts_zero_periods() {
        let stats = basic_stats(&annual_view(&[0.0, 0.0, 5.0])).unwrap();
        assert_eq!(stats.sample_size, 3);
        assert_eq!(stats.zero_period_count.unwrap(), 2);
        approx(stats.nonzero_period_fraction.unwrap(), 1.0 / 3.0);
    }

    #[test]
    fn test_basic_stats_empty_and_single_point() {
        assert!(basic_stats(&annual_view(&[])).is_none());

        let stats = basic_stats(&annual_view(&[7.0])).unwrap();
        assert_eq!(stats.sample_size, 1);
        approx(stats.mean.unwrap(), 7.0);
        approx(stats.range.unwrap(), 0.0);
        assert!(stats.variance.is_none());
        assert!(stats.standard_deviation.is_none());
        assert!(stats.coefficient_of_variation.is_none());
        assert!(stats.first_quartile.is_none());
        assert!(stats.third_quartile.is_none());
    }

    #[test]
    fn test_basic_stats_cv_absent_for_zero_mean() {
        let stats = basic_stats(&annual_view(&[0.0, 0.0])).unwrap();
        assert!(stats.coefficient_of_variation.is_none());
        assert!(stats.variance.is_some());
    }

    // ── growth rate ───────────────────────────────────────────────────

    #[test]
    fn test_growth_rate_example() {
        // Years 2019:10, 2020:15, 2021:12.
        let out = yearly_growth_rate(&annual_view(&[10.0, 15.0, 12.0]), &cfg()).unwrap();
        let MetricValue::SteppedSeries(steps) = out.unwrap() else {
            panic!("wrong value shape");
        };
        assert_eq!(steps.len(), 2);
        approx(steps[0].unwrap(), 0.5);
        approx(steps[1].unwrap(), -0.2);
    }

    #[test]
    fn test_growth_rate_zero_denominator_step_is_absent() {
        let out = yearly_growth_rate(&annual_view(&[0.0, 5.0, 10.0]), &cfg()).unwrap();
        let MetricValue::SteppedSeries(steps) = out.unwrap() else {
            panic!("wrong value shape");
        };
        assert_eq!(steps.len(), 2);
        assert!(steps[0].is_none());
        approx(steps[1].unwrap(), 1.0);
    }

    #[test]
    fn test_growth_rate_declines_monthly_mode_and_short_series() {
        assert!(yearly_growth_rate(&monthly_view(&[(1, 10.0), (2, 15.0)]), &cfg())
            .unwrap()
            .is_none());
        assert!(yearly_growth_rate(&annual_view(&[10.0]), &cfg())
            .unwrap()
            .is_none());
        assert!(yearly_growth_rate(&annual_view(&[]), &cfg())
            .unwrap()
            .is_none());
    }

    // ── linear trend ──────────────────────────────────────────────────

    #[test]
    fn test_linear_trend_slope() {
        let out = linear_trend(&annual_view(&[1.0, 2.0, 3.0]), &cfg()).unwrap();
        let MetricValue::Scalar(slope) = out.unwrap() else {
            panic!("wrong value shape");
        };
        approx(slope, 1.0);

        let out = linear_trend(&annual_view(&[3.0, 2.0, 1.0]), &cfg()).unwrap();
        let MetricValue::Scalar(slope) = out.unwrap() else {
            panic!("wrong value shape");
        };
        approx(slope, -1.0);
    }

    #[test]
    fn test_linear_trend_needs_two_points() {
        assert!(linear_trend(&annual_view(&[5.0]), &cfg()).unwrap().is_none());
    }

    // ── seasonal index ────────────────────────────────────────────────

    #[test]
    fn test_seasonal_index_monthly_only() {
        assert!(seasonal_index(&annual_view(&[1.0, 2.0]), &cfg())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_seasonal_index_per_month_ratio() {
        // August burns twice the overall mean, February nothing.
        let view = monthly_view(&[(8, 20.0), (2, 0.0), (8, 20.0), (2, 0.0)]);
        let out = seasonal_index(&view, &cfg()).unwrap();
        let MetricValue::IndexMap(index) = out.unwrap() else {
            panic!("wrong value shape");
        };
        approx(index["08"], 2.0);
        approx(index["02"], 0.0);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_seasonal_index_partial_year_does_not_crash() {
        let view = monthly_view(&[(7, 4.0)]);
        let out = seasonal_index(&view, &cfg()).unwrap();
        let MetricValue::IndexMap(index) = out.unwrap() else {
            panic!("wrong value shape");
        };
        approx(index["07"], 1.0);
    }

    #[test]
    fn test_seasonal_index_absent_for_all_zero_series() {
        let view = monthly_view(&[(1, 0.0), (2, 0.0)]);
        assert!(seasonal_index(&view, &cfg()).unwrap().is_none());
    }

    // ── rolling mean ──────────────────────────────────────────────────

    #[test]
    fn test_rolling_mean_window_three() {
        let view = monthly_view(&[(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0), (5, 5.0)]);
        let out = rolling_mean(&view, &cfg()).unwrap();
        let MetricValue::Series(means) = out.unwrap() else {
            panic!("wrong value shape");
        };
        assert_eq!(means.len(), 3);
        approx(means[0], 2.0);
        approx(means[1], 3.0);
        approx(means[2], 4.0);
    }

    #[test]
    fn test_rolling_mean_absent_when_shorter_than_window() {
        assert!(rolling_mean(&annual_view(&[1.0, 2.0]), &cfg())
            .unwrap()
            .is_none());
    }

    // ── anomalies ─────────────────────────────────────────────────────

    #[test]
    fn test_anomaly_detection() {
        let mut values = vec![1.0; 10];
        values.push(100.0);
        let out = detect_anomalies(&annual_view(&values), &cfg()).unwrap();
        assert_eq!(out.unwrap(), MetricValue::Count(1));
    }

    #[test]
    fn test_flat_series_has_no_anomalies() {
        let out = detect_anomalies(&annual_view(&[5.0, 5.0, 5.0]), &cfg()).unwrap();
        assert_eq!(out.unwrap(), MetricValue::Count(0));
    }

    // ── concentration / large events / bins ───────────────────────────

    #[test]
    fn test_concentration_index_extremes() {
        let out = concentration_index(&annual_view(&[5.0, 5.0, 5.0, 5.0]), &cfg()).unwrap();
        let MetricValue::Scalar(gini) = out.unwrap() else {
            panic!("wrong value shape");
        };
        approx(gini, 0.0);

        let out = concentration_index(&annual_view(&[0.0, 0.0, 0.0, 10.0]), &cfg()).unwrap();
        let MetricValue::Scalar(gini) = out.unwrap() else {
            panic!("wrong value shape");
        };
        approx(gini, 0.75);
    }

    #[test]
    fn test_concentration_index_absent_for_zero_total() {
        assert!(concentration_index(&annual_view(&[0.0, 0.0]), &cfg())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_large_event_proportion_upper_quartile() {
        // Q3 of [1,2,3,4] is 3.25; only 4.0 lies strictly above.
        let out = large_event_proportion(&annual_view(&[1.0, 2.0, 3.0, 4.0]), &cfg()).unwrap();
        let MetricValue::Scalar(p) = out.unwrap() else {
            panic!("wrong value shape");
        };
        approx(p, 0.25);
    }

    #[test]
    fn test_event_counts_by_size_bin() {
        let view = annual_view(&[5.0, 50.0, 500.0, 5000.0, 50000.0]);
        let out = event_counts_by_size_bin(&view, &cfg()).unwrap();
        let MetricValue::CountMap(counts) = out.unwrap() else {
            panic!("wrong value shape");
        };
        assert_eq!(counts["<10"], 1);
        assert_eq!(counts["10-100"], 1);
        assert_eq!(counts["100-1000"], 1);
        assert_eq!(counts["1000-10000"], 1);
        assert_eq!(counts[">=10000"], 1);
    }

    #[test]
    fn test_bin_edges_are_inclusive_on_the_left() {
        let view = annual_view(&[10.0, 100.0]);
        let out = event_counts_by_size_bin(&view, &cfg()).unwrap();
        let MetricValue::CountMap(counts) = out.unwrap() else {
            panic!("wrong value shape");
        };
        assert_eq!(counts["10-100"], 1);
        assert_eq!(counts["100-1000"], 1);
        assert_eq!(counts["<10"], 0);
    }

    // ── coefficient of variation / historical comparison ──────────────

    #[test]
    fn test_coefficient_of_variation() {
        let out = coefficient_of_variation(&annual_view(&[2.0, 4.0]), &cfg()).unwrap();
        let MetricValue::Scalar(cv) = out.unwrap() else {
            panic!("wrong value shape");
        };
        // std = sqrt(2), mean = 3.
        approx(cv, 2.0_f64.sqrt() / 3.0);
    }

    #[test]
    fn test_cv_absent_for_zero_mean() {
        assert!(coefficient_of_variation(&annual_view(&[0.0, 0.0]), &cfg())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_historical_comparison_deviations() {
        let out = compare_to_historical_average(&annual_view(&[1.0, 2.0, 3.0]), &cfg()).unwrap();
        let MetricValue::Series(devs) = out.unwrap() else {
            panic!("wrong value shape");
        };
        approx(devs[0], -1.0);
        approx(devs[1], 0.0);
        approx(devs[2], 1.0);
    }

    // ── degenerate inputs across the whole catalog ────────────────────

    #[test]
    fn test_no_catalog_metric_panics_on_empty_or_single_point() {
        for view in [annual_view(&[]), annual_view(&[3.0])] {
            for descriptor in CATALOG {
                let result = (descriptor.run)(&view, &cfg());
                assert!(
                    result.is_ok(),
                    "metric '{}' errored on degenerate input",
                    descriptor.name
                );
            }
        }
    }

    #[test]
    fn test_catalog_slots_are_disjoint() {
        let mut seen = std::collections::HashSet::new();
        for descriptor in CATALOG {
            assert!(
                seen.insert((descriptor.group, descriptor.field)),
                "duplicate slot {:?}.{}",
                descriptor.group,
                descriptor.field
            );
        }
        assert_eq!(CATALOG.len(), 10);
    }
}
