//! Metrics collection for observability

use std::sync::Arc;

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_vec_with_registry, Counter, CounterVec, HistogramVec, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> =
    Lazy::new(|| Arc::new(Metrics::new().expect("Failed to initialize metrics")));

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    pub ingest_requests: CounterVec,
    pub query_requests: CounterVec,
    pub request_duration: HistogramVec,

    pub fragments_added: Counter,
    pub triples_added: Counter,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let registry = Registry::new();

        let ingest_requests = register_counter_vec_with_registry!(
            Opts::new("ingest_requests_total", "Total ingest requests"),
            &["status"],
            registry
        )?;

        let query_requests = register_counter_vec_with_registry!(
            Opts::new("query_requests_total", "Total query requests"),
            &["status"],
            registry
        )?;

        let request_duration = register_histogram_vec_with_registry!(
            "request_duration_seconds",
            "Request duration in seconds",
            &["endpoint"],
            registry
        )?;

        let fragments_added = register_counter_with_registry!(
            Opts::new(
                "fragments_added_total",
                "Fragments appended to the vector store"
            ),
            registry
        )?;

        let triples_added = register_counter_with_registry!(
            Opts::new("triples_added_total", "Triples inserted into the fact graph"),
            registry
        )?;

        Ok(Self {
            registry,
            ingest_requests,
            query_requests,
            request_duration,
            fragments_added,
            triples_added,
        })
    }

    /// Render the registry in prometheus text exposition format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        encoder
            .encode_to_string(&self.registry.gather())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_render() {
        METRICS.ingest_requests.with_label_values(&["ok"]).inc();
        METRICS.fragments_added.inc_by(3.0);
        let text = METRICS.render();
        assert!(text.contains("ingest_requests_total"));
        assert!(text.contains("fragments_added_total"));
    }
}
