//! Observability configuration

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub tracing: TracingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Distributed tracing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TracingConfig {
    /// Enable OpenTelemetry tracing export
    #[serde(default)]
    pub enabled: bool,
    /// OTLP endpoint (e.g., http://localhost:4317)
    #[serde(default = "default_otlp_endpoint")]
    pub otlp_endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Sampling ratio (0.0 to 1.0)
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

/// Prometheus metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_metrics_path")]
    pub path: String,
    /// Histogram buckets for `rag_pipeline_duration_seconds`. Pipelines chain
    /// several LLM calls, so the exporter defaults are far too fine.
    #[serde(default = "default_pipeline_buckets")]
    pub pipeline_buckets: Vec<f64>,
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "pmp-rag-api".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_pipeline_buckets() -> Vec<f64> {
    vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 40.0, 80.0, 120.0]
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            otlp_endpoint: default_otlp_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_metrics_path(),
            pipeline_buckets: default_pipeline_buckets(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_observability_config() {
        let config = ObservabilityConfig::default();

        assert!(!config.tracing.enabled);
        assert_eq!(config.tracing.otlp_endpoint, "http://localhost:4317");
        assert_eq!(config.tracing.service_name, "pmp-rag-api");
        assert_eq!(config.tracing.sampling_ratio, 1.0);

        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.path, "/metrics");
        assert_eq!(config.metrics.pipeline_buckets.last(), Some(&120.0));
    }

    #[test]
    fn test_partial_tracing_section() {
        let config: TracingConfig =
            serde_json::from_str(r#"{"enabled": true, "sampling_ratio": 0.25}"#).unwrap();

        assert!(config.enabled);
        assert_eq!(config.sampling_ratio, 0.25);
        assert_eq!(config.service_name, "pmp-rag-api");
    }

    #[test]
    fn test_custom_pipeline_buckets() {
        let config: MetricsConfig =
            serde_json::from_str(r#"{"pipeline_buckets": [1.0, 10.0]}"#).unwrap();

        assert!(config.enabled);
        assert_eq!(config.pipeline_buckets, vec![1.0, 10.0]);
    }
}
