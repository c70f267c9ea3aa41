//! Fuel and metric engine: duration, fuel burn (main + auxiliary), cost,
//! and weather alerts for a computed route.
//!
//! The cubic speed-factor / piecewise weather-factor formula below
//! replaces the linear mass-based fuel model this module's validation
//! and output-shape conventions were adapted from; the structure (a
//! config struct with `Default`, a pure calculation function returning a
//! `Result`, and a summary type aggregating per-hop figures) carries
//! over directly.

use serde::{Deserialize, Serialize};

use crate::cost::Mode;
use crate::error::{Error, Result};
use crate::grid::Weather;
use crate::route::RoutePoint;

/// Vessel profile and fuel-model constants. Exposed as configuration
/// rather than hard-coded literals, resolving the open question over the
/// `weather_factor` boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VesselProfile {
    pub service_speed_knots: f64,
    pub main_engine_tons_per_day: f64,
    pub auxiliary_tons_per_day: f64,
    pub fuel_price_usd_per_ton: f64,
}

impl Default for VesselProfile {
    fn default() -> Self {
        Self {
            service_speed_knots: 20.0,
            main_engine_tons_per_day: 35.0,
            auxiliary_tons_per_day: 3.0,
            fuel_price_usd_per_ton: 600.0,
        }
    }
}

/// Weather-factor piecewise boundaries, keyed by a `weather_index` in
/// `[0, 100]`. See Open Question 3: these must be configuration, not
/// hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelModelConfig {
    pub vessel: VesselProfile,
    pub weather_factor_low_threshold: f64,
    pub weather_factor_mid_threshold: f64,
    pub weather_factor_high_threshold: f64,
    pub weather_factor_mid: f64,
    pub weather_factor_high: f64,
    pub weather_factor_severe: f64,
}

impl Default for FuelModelConfig {
    fn default() -> Self {
        Self {
            vessel: VesselProfile::default(),
            weather_factor_low_threshold: 50.0,
            weather_factor_mid_threshold: 60.0,
            weather_factor_high_threshold: 70.0,
            weather_factor_mid: 1.05,
            weather_factor_high: 1.15,
            weather_factor_severe: 1.30,
        }
    }
}

impl FuelModelConfig {
    fn weather_factor(&self, weather_index: f64) -> f64 {
        if weather_index >= self.weather_factor_high_threshold {
            self.weather_factor_severe
        } else if weather_index >= self.weather_factor_mid_threshold {
            self.weather_factor_high
        } else if weather_index >= self.weather_factor_low_threshold {
            self.weather_factor_mid
        } else {
            1.0
        }
    }
}

/// Combines a cell's weather into a single `[0, 100]` severity index
/// used by the fuel model's weather factor.
pub fn weather_index(weather: &Weather) -> f64 {
    let wind = (weather.wind_speed / 35.0 * 100.0).min(100.0);
    let wave = (weather.wave_height / 6.0 * 100.0).min(100.0);
    (wind + wave) / 2.0
}

/// Breakdown of a fuel computation, returned alongside the totals so API
/// consumers can show their work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelBreakdown {
    pub speed_factor: f64,
    pub weather_factor: f64,
    pub load_factor: f64,
}

/// Aggregate fuel and duration metrics for a full route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelMetrics {
    pub duration_hours: f64,
    pub main_engine_tons: f64,
    pub auxiliary_tons: f64,
    pub total_tons: f64,
    pub total_cost_usd: f64,
    pub breakdown: FuelBreakdown,
}

/// Computes the cubic fuel/duration model for a route of `distance_km`
/// sailed in `mode`, with an average `weather_index` in `[0, 100]`
/// (0 = calm).
pub fn compute_fuel_metrics(
    config: &FuelModelConfig,
    distance_km: f64,
    mode: Mode,
    avg_weather_index: f64,
) -> Result<FuelMetrics> {
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(Error::InvalidRequest {
            message: format!("distance_km must be finite and non-negative, got {distance_km}"),
        });
    }
    if !(0.0..=100.0).contains(&avg_weather_index) {
        return Err(Error::InvalidRequest {
            message: format!("avg_weather_index must be in [0, 100], got {avg_weather_index}"),
        });
    }

    let speed_knots = mode.speed_knots();
    let distance_nm = distance_km / 1.852;
    let duration_hours = if speed_knots > 0.0 {
        distance_nm / speed_knots
    } else {
        0.0
    };
    let days = duration_hours / 24.0;

    let speed_factor = (speed_knots / config.vessel.service_speed_knots).powi(3);
    let weather_factor = config.weather_factor(avg_weather_index);
    let load_factor = mode.load_factor();

    let main_engine_tons =
        config.vessel.main_engine_tons_per_day * speed_factor * weather_factor * load_factor * days;
    let auxiliary_tons = config.vessel.auxiliary_tons_per_day * days;
    let total_tons = main_engine_tons + auxiliary_tons;
    let total_cost_usd = total_tons * config.vessel.fuel_price_usd_per_ton;

    Ok(FuelMetrics {
        duration_hours,
        main_engine_tons,
        auxiliary_tons,
        total_tons,
        total_cost_usd,
        breakdown: FuelBreakdown {
            speed_factor,
            weather_factor,
            load_factor,
        },
    })
}

/// Alert severity tiers for wind, wave, and visibility thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLevel {
    Moderate,
    High,
    Critical,
}

/// A single per-waypoint weather alert.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub point_index: usize,
    pub level: AlertLevel,
}

/// Aggregated alert counts for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertSummary {
    pub critical: usize,
    pub high: usize,
    pub moderate: usize,
}

impl AlertSummary {
    pub fn total_count(&self) -> usize {
        self.critical + self.high + self.moderate
    }
    pub fn has_critical(&self) -> bool {
        self.critical > 0
    }
    pub fn has_high(&self) -> bool {
        self.high > 0
    }
}

/// Classifies a single point's weather into an alert, if any threshold
/// is crossed. Wind thresholds are in knots, wave in metres, visibility
/// in kilometres.
fn classify_point(weather: &Weather) -> Option<AlertLevel> {
    let wind_knots = weather.wind_speed * 1.943_844; // m/s -> knots
    if wind_knots >= 35.0 || weather.wave_height >= 6.0 || weather.visibility <= 2.0 {
        return Some(AlertLevel::Critical);
    }
    if wind_knots >= 25.0 || weather.wave_height >= 4.0 || weather.visibility <= 5.0 {
        return Some(AlertLevel::High);
    }
    if wind_knots >= 15.0 || weather.wave_height >= 2.5 {
        return Some(AlertLevel::Moderate);
    }
    None
}

/// Builds the alert list and aggregate summary for a path's sampled
/// weather.
pub fn build_alerts(
    _path: &[RoutePoint],
    weather_by_index: &std::collections::HashMap<usize, Weather>,
) -> (Vec<Alert>, AlertSummary) {
    let mut alerts = Vec::new();
    let mut summary = AlertSummary::default();
    let mut indices: Vec<_> = weather_by_index.keys().copied().collect();
    indices.sort_unstable();
    for idx in indices {
        let weather = &weather_by_index[&idx];
        if let Some(level) = classify_point(weather) {
            match level {
                AlertLevel::Critical => summary.critical += 1,
                AlertLevel::High => summary.high += 1,
                AlertLevel::Moderate => summary.moderate += 1,
            }
            alerts.push(Alert {
                point_index: idx,
                level,
            });
        }
    }
    (alerts, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuel_algebra_distance_doubling_doubles_tons() {
        let config = FuelModelConfig::default();
        let a = compute_fuel_metrics(&config, 1000.0, Mode::Optimal, 0.0).unwrap();
        let b = compute_fuel_metrics(&config, 2000.0, Mode::Optimal, 0.0).unwrap();
        assert!((b.main_engine_tons / a.main_engine_tons - 2.0).abs() < 1e-9);
        assert!((b.auxiliary_tons / a.auxiliary_tons - 2.0).abs() < 1e-9);
    }

    #[test]
    fn fuel_algebra_speed_cubed() {
        let config = FuelModelConfig::default();
        // Compare two modes at a fixed distance; speed differs (20 vs some
        // hypothetical 2x), check cubic scaling directly via speed_factor.
        let half_speed_factor = (10.0_f64 / 20.0).powi(3);
        let full_speed_factor = (20.0_f64 / 20.0).powi(3);
        assert!((full_speed_factor / half_speed_factor - 8.0).abs() < 1e-9);
        let metrics = compute_fuel_metrics(&config, 500.0, Mode::Optimal, 0.0).unwrap();
        assert_eq!(metrics.breakdown.speed_factor, full_speed_factor);
    }

    #[test]
    fn weather_factor_boundaries_configurable() {
        let mut config = FuelModelConfig::default();
        config.weather_factor_low_threshold = 10.0;
        let a = compute_fuel_metrics(&config, 500.0, Mode::Optimal, 20.0).unwrap();
        assert_eq!(a.breakdown.weather_factor, config.weather_factor_mid);
    }

    #[test]
    fn rejects_out_of_range_weather_index() {
        let config = FuelModelConfig::default();
        let err = compute_fuel_metrics(&config, 500.0, Mode::Optimal, 150.0).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));
    }

    #[test]
    fn alerts_escalate_with_severity() {
        let mut w = std::collections::HashMap::new();
        w.insert(
            0,
            Weather {
                temperature: 25.0,
                wind_speed: 20.0, // ~38.9 kn -> critical
                wind_direction: 0.0,
                wind_gusts: 0.0,
                wave_height: 1.0,
                wave_direction: 0.0,
                wave_period: 5.0,
                visibility: 10.0,
                cloud_cover: 0.0,
                precipitation: 0.0,
                timestamp: 0,
            },
        );
        let (alerts, summary) = build_alerts(&[], &w);
        assert_eq!(alerts.len(), 1);
        assert_eq!(summary.critical, 1);
        assert!(summary.has_critical());
    }
}
