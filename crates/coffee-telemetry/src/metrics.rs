//! Prometheus metrics for the Coffee crates.
//!
//! All metrics follow the naming convention: `coffee_<component>_<metric>_<unit>`
//!
//! Counters are usable before [`register_metrics`] runs; registration only
//! makes them visible to [`gather_metrics`].

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Metrics registry shared by every Coffee crate
    pub static ref REGISTRY: Registry = Registry::new();

    /// Notifications emitted on the bus (commands and listeners alike)
    pub static ref NOTIFICATIONS_EMITTED: IntCounter = IntCounter::new(
        "coffee_bus_notifications_emitted_total",
        "Total notifications emitted on the notification bus"
    ).expect("metric creation failed");

    /// Handlers that returned an error during dispatch
    pub static ref HANDLER_FAILURES: IntCounter = IntCounter::new(
        "coffee_bus_handler_failures_total",
        "Total handler failures during dispatch"
    ).expect("metric creation failed");

    /// Queries by outcome: single, many, empty, timeout, error
    pub static ref QUERIES: IntCounterVec = IntCounterVec::new(
        Opts::new("coffee_facade_queries_total", "Total facade queries by outcome"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Time from query start to settlement
    pub static ref QUERY_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "coffee_facade_query_duration_seconds",
            "Time spent collecting query results"
        ).buckets(exponential_buckets(0.0001, 2.0, 16).expect("valid buckets"))
    ).expect("metric creation failed");

    /// Container resolutions by scope: transient, singleton
    pub static ref CONTAINER_RESOLUTIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("coffee_ioc_resolutions_total", "Total container resolutions by scope"),
        &["scope"]
    ).expect("metric creation failed");
}

/// Handle for the registered metrics.
#[derive(Debug, Clone, Copy)]
pub struct MetricsHandle {
    /// Number of collectors registered by this call.
    pub newly_registered: usize,
}

/// Register all metrics with [`REGISTRY`].
///
/// Collectors that are already registered are skipped, so this may be
/// called from several entry points.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(NOTIFICATIONS_EMITTED.clone()),
        Box::new(HANDLER_FAILURES.clone()),
        Box::new(QUERIES.clone()),
        Box::new(QUERY_DURATION.clone()),
        Box::new(CONTAINER_RESOLUTIONS.clone()),
    ];

    let mut newly_registered = 0;
    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) => newly_registered += 1,
            Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { newly_registered })
}

/// Encode all registered metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics_twice() {
        register_metrics().unwrap();
        let second = register_metrics().unwrap();
        assert_eq!(second.newly_registered, 0);
    }

    #[test]
    fn test_counter_increment() {
        NOTIFICATIONS_EMITTED.inc();
        assert!(NOTIFICATIONS_EMITTED.get() >= 1);
    }

    #[test]
    fn test_gather_contains_registered_names() {
        register_metrics().unwrap();
        QUERIES.with_label_values(&["single"]).inc();

        let text = gather_metrics().unwrap();
        assert!(text.contains("coffee_facade_queries_total"));
    }
}
