//! Prometheus metrics infrastructure for the ocean-routing microservices.
//!
//! This module provides:
//! - [`MetricsConfig`]: Configuration for the metrics system
//! - [`init_metrics`]: Initialize the Prometheus metrics recorder
//! - [`metrics_handler`]: Axum handler for `/metrics` endpoint
//! - Business metric helpers for the routing service
//!
//! # Example
//!
//! ```no_run
//! use voyage_service_shared::metrics::{MetricsConfig, init_metrics, metrics_handler};
//! use axum::{Router, routing::get};
//!
//! // Initialize metrics at startup
//! let config = MetricsConfig::default();
//! init_metrics(&config).expect("failed to initialize metrics");
//!
//! // Add metrics endpoint to router
//! let app: Router = Router::new()
//!     .route("/metrics", get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Configuration for the metrics system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether metrics collection is enabled.
    pub enabled: bool,
    /// Path for the metrics endpoint (e.g., "/metrics").
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Create configuration from environment variables.
    ///
    /// - `METRICS_ENABLED`: "true" or "false" (default: true)
    /// - `METRICS_PATH`: Path for metrics endpoint (default: "/metrics")
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let path = std::env::var("METRICS_PATH").unwrap_or_else(|_| "/metrics".to_string());

        Self { enabled, path }
    }
}

/// Initialize the Prometheus metrics recorder.
///
/// This must be called once at application startup before any metrics are recorded.
/// Subsequent calls will return an error.
///
/// # Errors
///
/// Returns an error if:
/// - Metrics are disabled in configuration
/// - The recorder has already been installed
/// - The Prometheus builder fails to install
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)?;

    Ok(())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if [`init_metrics`] has not been called.
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Axum handler for the `/metrics` endpoint.
///
/// Returns Prometheus exposition format text.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

/// Errors that can occur during metrics initialization.
#[derive(Debug, Clone)]
pub enum MetricsError {
    /// Metrics are disabled in configuration.
    Disabled,
    /// The recorder has already been installed.
    AlreadyInitialized,
    /// The Prometheus builder failed to install.
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => {
                write!(f, "failed to install metrics recorder: {}", e)
            }
        }
    }
}

impl std::error::Error for MetricsError {}

// =============================================================================
// Business Metrics Helpers
// =============================================================================

/// Record a successful route calculation.
///
/// Increments the `voyage_routes_calculated_total` counter.
///
/// # Arguments
///
/// * `mode` - The routing mode used (e.g., "fuel", "optimal", "safe")
/// * `service` - The service name (e.g., "voyage-service")
pub fn record_route_calculated(mode: &str, service: &str) {
    metrics::counter!(
        "voyage_routes_calculated_total",
        "mode" => mode.to_string(),
        "service" => service.to_string()
    )
    .increment(1);
}

/// Record a failed route calculation.
///
/// Increments the `voyage_routes_failed_total` counter.
///
/// # Arguments
///
/// * `reason` - The failure reason (e.g., "off_grid", "no_path", "validation_error")
/// * `service` - The service name (e.g., "voyage-service")
pub fn record_route_failed(reason: &str, service: &str) {
    metrics::counter!(
        "voyage_routes_failed_total",
        "reason" => reason.to_string(),
        "service" => service.to_string()
    )
    .increment(1);
}

/// Record the total distance of a successful route.
///
/// Records to the `voyage_route_distance_km` histogram.
///
/// # Arguments
///
/// * `distance_km` - The route's total distance in kilometers
/// * `mode` - The routing mode used (e.g., "fuel", "optimal", "safe")
pub fn record_route_distance_km(distance_km: f64, mode: &str) {
    metrics::histogram!(
        "voyage_route_distance_km",
        "mode" => mode.to_string()
    )
    .record(distance_km);
}

/// Record a weather-sampling pass along a computed route.
///
/// Records to the `voyage_weather_samples` histogram, distinguishing
/// successful from failed fetches so partial-coverage routes are visible
/// without failing the request.
///
/// # Arguments
///
/// * `sampled` - Number of waypoints whose weather was fetched successfully
/// * `failed` - Number of waypoints whose weather fetch failed
pub fn record_weather_samples(sampled: usize, failed: usize) {
    metrics::histogram!("voyage_weather_samples", "outcome" => "sampled").record(sampled as f64);
    metrics::histogram!("voyage_weather_samples", "outcome" => "failed").record(failed as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_config_default() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.path, "/metrics");
    }

    #[test]
    fn test_metrics_config_from_env_defaults() {
        // Clear any existing env vars
        std::env::remove_var("METRICS_ENABLED");
        std::env::remove_var("METRICS_PATH");

        let config = MetricsConfig::from_env();
        assert!(config.enabled);
        assert_eq!(config.path, "/metrics");
    }

    // T014: Test that metrics endpoint returns Prometheus format
    // This test validates the metrics_handler returns valid Prometheus exposition format
    #[test]
    fn test_metrics_handler_returns_prometheus_format() {
        // When metrics are not initialized, should return a comment
        // Note: We can't test full initialization in unit tests due to global state
        let rt = tokio::runtime::Runtime::new().unwrap();
        let output = rt.block_on(async { metrics_handler().await });

        // Should return either proper metrics or "not initialized" message
        assert!(
            output.contains("#") || output.is_empty(),
            "Metrics output should be Prometheus format or indicate not initialized"
        );
    }

    // T015: Test that http_request_counter can be incremented
    // This validates the counter! macro works correctly
    #[test]
    fn test_http_request_counter_increments() {
        // This test verifies the metrics macros compile and execute without panic
        // Full integration testing requires the Prometheus recorder to be installed
        metrics::counter!(
            "http_requests_total",
            "method" => "POST",
            "path" => "/route",
            "status" => "2xx"
        )
        .increment(1);
        // If we get here without panic, the counter works
    }

    // T016: Test that http_request_duration histogram records
    #[test]
    fn test_http_request_duration_histogram_records() {
        // This test verifies the histogram! macro works correctly
        metrics::histogram!(
            "http_request_duration_seconds",
            "method" => "POST",
            "path" => "/route"
        )
        .record(0.05);
        // If we get here without panic, the histogram works
    }

    #[test]
    fn test_business_metric_routes_calculated() {
        record_route_calculated("fuel", "voyage-service");
        record_route_calculated("optimal", "voyage-service");
        record_route_calculated("safe", "voyage-service");
        // If we get here without panic, the helpers work
    }

    #[test]
    fn test_business_metric_route_failed() {
        record_route_failed("off_grid", "voyage-service");
        record_route_failed("no_path", "voyage-service");
        record_route_failed("validation_error", "voyage-service");
    }

    #[test]
    fn test_business_metric_route_distance_km() {
        record_route_distance_km(1234.5, "fuel");
        record_route_distance_km(987.6, "optimal");
    }

    #[test]
    fn test_business_metric_weather_samples() {
        record_weather_samples(18, 2);
        record_weather_samples(0, 0);
    }

    #[test]
    fn test_metrics_error_display() {
        let disabled = MetricsError::Disabled;
        assert_eq!(disabled.to_string(), "metrics are disabled");

        let already_init = MetricsError::AlreadyInitialized;
        assert_eq!(
            already_init.to_string(),
            "metrics recorder already initialized"
        );

        let failed = MetricsError::InstallFailed("test error".to_string());
        assert!(failed.to_string().contains("test error"));
    }
}
