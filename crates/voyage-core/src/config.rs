//! Ambient routing configuration, read from the environment keys the
//! external interface contract names. Mirrors the `from_env()` pattern
//! used for logging and metrics configuration in the service crate.

use std::time::Duration;

use crate::fuel::FuelModelConfig;
use crate::grid::DEFAULT_RESOLUTION;

/// Top-level routing configuration, aggregating the grid, weather, and
/// search limits exposed to operators.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub grid_resolution: f64,
    pub grid_store_uri: String,
    pub weather_sample_rate: f64,
    pub weather_api_delay_ms: u64,
    pub enable_route_weather_update: bool,
    pub max_astar_nodes: usize,
    pub max_astar_ms: u64,
    pub region_cache_ttl_ms: u64,
    pub fuel_model: FuelModelConfig,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            grid_resolution: DEFAULT_RESOLUTION,
            grid_store_uri: "grid.db".to_string(),
            weather_sample_rate: 0.2,
            weather_api_delay_ms: 300,
            enable_route_weather_update: true,
            max_astar_nodes: crate::fine_planner::MAX_ASTAR_NODES,
            max_astar_ms: crate::fine_planner::MAX_ASTAR_DURATION.as_millis() as u64,
            region_cache_ttl_ms: 3_600_000,
            fuel_model: FuelModelConfig::default(),
        }
    }
}

impl RoutingConfig {
    /// Reads overrides from the environment, falling back to
    /// [`Default`] for any unset key.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            grid_resolution: env_f64("GRID_RESOLUTION", default.grid_resolution),
            grid_store_uri: std::env::var("GRID_STORE_URI").unwrap_or(default.grid_store_uri),
            weather_sample_rate: env_f64("WEATHER_SAMPLE_RATE", default.weather_sample_rate),
            weather_api_delay_ms: env_u64("WEATHER_API_DELAY_MS", default.weather_api_delay_ms),
            enable_route_weather_update: env_bool(
                "ENABLE_ROUTE_WEATHER_UPDATE",
                default.enable_route_weather_update,
            ),
            max_astar_nodes: env_u64("MAX_ASTAR_NODES", default.max_astar_nodes as u64) as usize,
            max_astar_ms: env_u64("MAX_ASTAR_MS", default.max_astar_ms),
            region_cache_ttl_ms: env_u64("REGION_CACHE_TTL_MS", default.region_cache_ttl_ms),
            fuel_model: default.fuel_model,
        }
    }

    pub fn region_cache_ttl(&self) -> Duration {
        Duration::from_millis(self.region_cache_ttl_ms)
    }

    pub fn max_astar_duration(&self) -> Duration {
        Duration::from_millis(self.max_astar_ms)
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let config = RoutingConfig::default();
        assert_eq!(config.grid_resolution, 0.2);
        assert_eq!(config.weather_api_delay_ms, 300);
        assert!(config.enable_route_weather_update);
    }

    #[test]
    fn region_cache_ttl_converts_millis() {
        let config = RoutingConfig::default();
        assert_eq!(config.region_cache_ttl().as_secs(), 3600);
    }
}
