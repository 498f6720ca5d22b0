//! Prometheus metrics collection for Roastmaster
//!
//! Tracks roast outcomes by level and the end-to-end duration of each roast.
//! Metrics are exposed via the `/metrics` endpoint in Prometheus text format.

use crate::roast::{OutcomeKind, RoastLevel};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Metrics label for a raw level string
///
/// Unknown levels collapse to `"other"` so arbitrary user input cannot
/// inflate label cardinality.
pub fn level_label(level: &str) -> &'static str {
    RoastLevel::parse(level)
        .map(|level| level.as_str())
        .unwrap_or("other")
}

/// Operation labels used for `roastmaster_metrics_recording_failures_total`
const RECORDED_OPERATIONS: [&str; 2] = ["record_roast", "record_roast_duration"];

/// Metrics collector for Roastmaster
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
    roasts_total: IntCounterVec,
    roast_duration: HistogramVec,
    metrics_recording_failures: IntCounterVec,
}

impl Metrics {
    /// Create a new Metrics instance
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Cardinality: 4 levels (3 + other) × 6 outcomes = 24 series
        let roasts_total = IntCounterVec::new(
            Opts::new(
                "roastmaster_roasts_total",
                "Total roast attempts by roast level and outcome",
            ),
            &["level", "outcome"],
        )?;

        let roast_duration = HistogramVec::new(
            HistogramOpts::new(
                "roastmaster_roast_duration_ms",
                "End-to-end roast latency in milliseconds, provider call included",
            )
            .buckets(vec![
                10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0,
            ]),
            &["outcome"],
        )?;

        let metrics_recording_failures = IntCounterVec::new(
            Opts::new(
                "roastmaster_metrics_recording_failures_total",
                "Total number of metrics recording failures by operation",
            ),
            &["operation"],
        )?;

        registry.register(Box::new(roasts_total.clone()))?;
        registry.register(Box::new(roast_duration.clone()))?;
        registry.register(Box::new(metrics_recording_failures.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            roasts_total,
            roast_duration,
            metrics_recording_failures,
        })
    }

    /// Record one finished roast attempt
    pub fn record_roast(&self, level: &str, outcome: OutcomeKind, duration_ms: f64) {
        match self
            .roasts_total
            .get_metric_with_label_values(&[level_label(level), outcome.as_str()])
        {
            Ok(counter) => counter.inc(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to record roast counter");
                self.metrics_recording_failure("record_roast");
            }
        }

        match self
            .roast_duration
            .get_metric_with_label_values(&[outcome.as_str()])
        {
            Ok(histogram) => histogram.observe(duration_ms),
            Err(e) => {
                tracing::error!(error = %e, "Failed to record roast duration");
                self.metrics_recording_failure("record_roast_duration");
            }
        }
    }

    /// Current count for a level/outcome pair
    pub fn roasts_count(&self, level: &str, outcome: OutcomeKind) -> u64 {
        self.roasts_total
            .get_metric_with_label_values(&[level_label(level), outcome.as_str()])
            .map(|counter| counter.get())
            .unwrap_or(0)
    }

    /// Total recording failures across the operations this type records
    pub fn recording_failures_count(&self) -> u64 {
        RECORDED_OPERATIONS
            .iter()
            .filter_map(|op| {
                self.metrics_recording_failures
                    .get_metric_with_label_values(&[op])
                    .ok()
            })
            .map(|counter| counter.get())
            .sum()
    }

    pub fn metrics_recording_failure(&self, operation: &str) {
        if let Ok(counter) = self
            .metrics_recording_failures
            .get_metric_with_label_values(&[operation])
        {
            counter.inc();
        }
    }

    /// Encode all metrics in Prometheus text exposition format
    ///
    /// # Errors
    ///
    /// Returns an error if metric encoding fails.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        encoder.encode(&metric_families, &mut buffer)?;

        String::from_utf8(buffer).map_err(|e| {
            tracing::error!(
                invalid_byte_index = e.utf8_error().valid_up_to(),
                "Prometheus encoder produced invalid UTF-8"
            );
            prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new_creates_registry() {
        let metrics = Metrics::new().expect("should create metrics");
        metrics.record_roast("savage", OutcomeKind::Success, 12.0);
        let output = metrics.gather().expect("should gather");
        assert!(output.contains("roastmaster_roasts_total"));
        assert!(output.contains("roastmaster_roast_duration_ms"));
    }

    #[test]
    fn test_record_roast_increments_counter() {
        let metrics = Metrics::new().expect("should create metrics");
        metrics.record_roast("brutal", OutcomeKind::RateLimited, 5.0);
        metrics.record_roast("BRUTAL", OutcomeKind::RateLimited, 5.0);

        assert_eq!(metrics.roasts_count("brutal", OutcomeKind::RateLimited), 2);
        assert_eq!(metrics.roasts_count("brutal", OutcomeKind::Success), 0);
    }

    #[test]
    fn test_unknown_levels_share_other_label() {
        let metrics = Metrics::new().expect("should create metrics");
        metrics.record_roast("nuclear", OutcomeKind::Success, 1.0);
        metrics.record_roast("volcanic", OutcomeKind::Success, 1.0);

        assert_eq!(metrics.roasts_count("anything", OutcomeKind::Success), 2);
        let output = metrics.gather().expect("should gather");
        assert!(output.contains("level=\"other\""));
        assert!(!output.contains("nuclear"));
    }

    #[test]
    fn test_level_label() {
        assert_eq!(level_label("Light"), "light");
        assert_eq!(level_label(""), "other");
    }

    #[test]
    fn test_recording_failures_are_summed() {
        let metrics = Metrics::new().expect("should create metrics");
        assert_eq!(metrics.recording_failures_count(), 0);

        metrics.metrics_recording_failure("record_roast");
        metrics.metrics_recording_failure("record_roast_duration");
        assert_eq!(metrics.recording_failures_count(), 2);
    }

    #[test]
    fn test_metrics_is_clonable() {
        let metrics = Metrics::new().expect("should create metrics");
        let clone = metrics.clone();
        clone.record_roast("light", OutcomeKind::Success, 1.0);
        assert_eq!(metrics.roasts_count("light", OutcomeKind::Success), 1);
    }
}
