//! Statistics orchestrator: bounded parallel fan-out over the metric
//! catalog, single-threaded fan-in merge.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use common::config::StatsConfig;
use common::{DescriptiveStats, Error, ModeReport, Result, TerritoryKey, TimeSeriesStats};

use crate::metrics::{self, Group, MetricDescriptor, MetricValue, SeriesView};

/// Runs the metric catalog against one series view and merges the
/// outputs into a [`ModeReport`].
pub struct StatsEngine {
    config: StatsConfig,
    catalog: &'static [MetricDescriptor],
}

impl StatsEngine {
    pub fn new(config: StatsConfig) -> Self {
        Self {
            config,
            catalog: metrics::CATALOG,
        }
    }

    #[cfg(test)]
    fn with_catalog(config: StatsConfig, catalog: &'static [MetricDescriptor]) -> Self {
        Self { config, catalog }
    }

    /// Compute one mode's report.
    ///
    /// The basic summary runs first in a single pass; the catalog then
    /// fans out with at most `workers` computations in flight, each over
    /// the same immutable view. The merge waits for every worker — a
    /// join barrier, so no partial batch ever escapes. A metric that
    /// errors or panics is logged against `key` and skipped; the
    /// remaining fields still populate. `key` is attribution only and
    /// never influences any computation.
    pub async fn compute(&self, key: &TerritoryKey, view: SeriesView) -> Result<ModeReport> {
        let mode = view.mode;
        let mut report = ModeReport {
            basic: metrics::basic_stats(&view),
            ..ModeReport::default()
        };

        let view = Arc::new(view);
        let cfg = Arc::new(self.config.clone());
        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));

        let mut handles = Vec::with_capacity(self.catalog.len());
        for descriptor in self.catalog {
            let view = view.clone();
            let cfg = cfg.clone();
            let semaphore = semaphore.clone();
            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("metric semaphore closed");
                (descriptor.run)(&view, &cfg)
            });
            handles.push((descriptor, handle));
        }

        let mut outputs: Vec<(&MetricDescriptor, MetricValue)> = Vec::new();
        let mut failed = 0usize;
        for (descriptor, handle) in handles {
            match handle.await {
                Ok(Ok(Some(value))) => outputs.push((descriptor, value)),
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    failed += 1;
                    warn!(
                        "metric '{}' failed for {} ({} mode): {}",
                        descriptor.name, key, mode, e
                    );
                }
                Err(e) => {
                    failed += 1;
                    warn!(
                        "metric '{}' panicked for {} ({} mode): {}",
                        descriptor.name, key, mode, e
                    );
                }
            }
        }
        if failed > 0 {
            debug!(
                "{} of {} metrics missing from {} report for {}",
                failed,
                self.catalog.len(),
                mode,
                key
            );
        }

        let mut occupied: HashSet<(Group, &'static str)> = HashSet::new();
        for (descriptor, value) in outputs {
            if !occupied.insert((descriptor.group, descriptor.field)) {
                return Err(Error::Catalog(format!(
                    "two metrics claim slot {:?}.{}",
                    descriptor.group, descriptor.field
                )));
            }
            merge_value(&mut report, descriptor, value)?;
        }

        Ok(report)
    }
}

/// Place one metric output into its report slot. A value of the wrong
/// shape, or an unknown slot, is a catalog defect.
fn merge_value(
    report: &mut ModeReport,
    descriptor: &MetricDescriptor,
    value: MetricValue,
) -> Result<()> {
    match (descriptor.group, descriptor.field, value) {
        (Group::Descriptive, "coefficient_of_variation", MetricValue::Scalar(v)) => {
            descriptive(report).coefficient_of_variation = Some(v);
        }
        (Group::Descriptive, "anomaly_count", MetricValue::Count(v)) => {
            descriptive(report).anomaly_count = Some(v);
        }
        (Group::Descriptive, "concentration_index", MetricValue::Scalar(v)) => {
            descriptive(report).concentration_index = Some(v);
        }
        (Group::Descriptive, "large_event_proportion", MetricValue::Scalar(v)) => {
            descriptive(report).large_event_proportion = Some(v);
        }
        (Group::Descriptive, "event_counts_by_size_bin", MetricValue::CountMap(v)) => {
            descriptive(report).event_counts_by_size_bin = Some(v);
        }
        (Group::TimeSeries, "yearly_growth_rate", MetricValue::SteppedSeries(v)) => {
            time_series(report).yearly_growth_rate = Some(v);
        }
        (Group::TimeSeries, "linear_trend_slope", MetricValue::Scalar(v)) => {
            time_series(report).linear_trend_slope = Some(v);
        }
        (Group::TimeSeries, "seasonal_index", MetricValue::IndexMap(v)) => {
            time_series(report).seasonal_index = Some(v);
        }
        (Group::TimeSeries, "rolling_mean", MetricValue::Series(v)) => {
            time_series(report).rolling_mean = Some(v);
        }
        (Group::TimeSeries, "historical_comparison", MetricValue::Series(v)) => {
            time_series(report).historical_comparison = Some(v);
        }
        (group, field, value) => {
            return Err(Error::Catalog(format!(
                "metric '{}' produced {:?} for unknown or mismatched slot {:?}.{}",
                descriptor.name, value, group, field
            )));
        }
    }
    Ok(())
}

fn descriptive(report: &mut ModeReport) -> &mut DescriptiveStats {
    report.descriptive.get_or_insert_with(Default::default)
}

fn time_series(report: &mut ModeReport) -> &mut TimeSeriesStats {
    report.time_series.get_or_insert_with(Default::default)
}
