//! Routing mode and the per-edge cost model.

use serde::{Deserialize, Serialize};

use crate::geo::{haversine, turn_penalty, Point};
use crate::grid::Cell;

/// Routing mode: governs cost weights, speed, corridor width, and
/// waypoint perturbation. Three canonical modes, one extended profile
/// (`ulcv`, for ultra-large container vessels with draft and channel-width
/// constraints), plus accepted aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Fuel,
    Optimal,
    Safe,
    Ulcv,
}

impl Mode {
    /// Parses a mode string, accepting the documented aliases
    /// (`fuel_efficient`, `normal`) in addition to the canonical names.
    pub fn parse(s: &str) -> Option<Mode> {
        match s.to_ascii_lowercase().as_str() {
            "fuel" | "fuel_efficient" => Some(Mode::Fuel),
            "optimal" | "normal" => Some(Mode::Optimal),
            "safe" => Some(Mode::Safe),
            "ulcv" => Some(Mode::Ulcv),
            _ => None,
        }
    }

    pub fn weights(self) -> ModeWeights {
        match self {
            Mode::Fuel => ModeWeights {
                w_distance: 10.0,
                w_safety: 0.1,
                w_weather: 0.1,
                w_coastal: 0.0,
                turn_multiplier: 3.0,
                open_water_factor: 1.00,
            },
            Mode::Optimal => ModeWeights {
                w_distance: 5.0,
                w_safety: 3.0,
                w_weather: 2.0,
                w_coastal: 1.0,
                turn_multiplier: 1.0,
                open_water_factor: 0.80,
            },
            Mode::Safe => ModeWeights {
                w_distance: 1.0,
                w_safety: 15.0,
                w_weather: 10.0,
                w_coastal: 5.0,
                turn_multiplier: 1.0,
                open_water_factor: 0.60,
            },
            // Draft and beam constraints dominate for an ultra-large
            // vessel, so coastal/safety weigh even more than `safe` mode;
            // the draft/channel-width term itself is applied separately
            // (see `draft_channel_penalty`), scaled by `UlcvConfig`.
            Mode::Ulcv => ModeWeights {
                w_distance: 1.0,
                w_safety: 15.0,
                w_weather: 10.0,
                w_coastal: 8.0,
                turn_multiplier: 1.5,
                open_water_factor: 0.55,
            },
        }
    }

    /// Corridor half-width used by the corridor loader, in degrees.
    pub fn corridor_width_deg(self) -> f64 {
        match self {
            Mode::Fuel => 1.5,
            Mode::Optimal => 2.0,
            Mode::Safe => 3.0,
            Mode::Ulcv => 3.5,
        }
    }

    /// Service speed limit for this mode, in knots.
    pub fn speed_knots(self) -> f64 {
        match self {
            Mode::Fuel => 15.0,
            Mode::Optimal => 20.0,
            Mode::Safe => 18.0,
            Mode::Ulcv => 14.0,
        }
    }

    /// Engine load factor used by the fuel engine.
    pub fn load_factor(self) -> f64 {
        match self {
            Mode::Fuel => 0.75,
            Mode::Optimal => 0.82,
            Mode::Safe => 0.85,
            Mode::Ulcv => 0.88,
        }
    }
}

/// Draft and channel-width penalty factors for the `ulcv` extended
/// profile, overridable via `DRAFT_PENALTY_FACTOR` and
/// `CHANNEL_WIDTH_PENALTY_FACTOR`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UlcvConfig {
    pub draft_penalty_factor: f64,
    pub channel_width_penalty_factor: f64,
}

impl Default for UlcvConfig {
    fn default() -> Self {
        Self {
            draft_penalty_factor: 2.0,
            channel_width_penalty_factor: 1.5,
        }
    }
}

impl UlcvConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            draft_penalty_factor: std::env::var("DRAFT_PENALTY_FACTOR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.draft_penalty_factor),
            channel_width_penalty_factor: std::env::var("CHANNEL_WIDTH_PENALTY_FACTOR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.channel_width_penalty_factor),
        }
    }
}

/// Additional draft/channel-width penalty applied to cells within 7 cells
/// of land, for the `ulcv` extended profile only. Ramps linearly from the
/// combined factor at the coast to zero at 7 cells out.
pub fn draft_channel_penalty(distance_to_land_cells: u32, config: UlcvConfig) -> f64 {
    if distance_to_land_cells > 7 {
        return 0.0;
    }
    let proximity = (8 - distance_to_land_cells.min(8)) as f64;
    proximity * (config.draft_penalty_factor + config.channel_width_penalty_factor)
}

/// Fixed weight vector for a mode's edge cost function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeWeights {
    pub w_distance: f64,
    pub w_safety: f64,
    pub w_weather: f64,
    pub w_coastal: f64,
    pub turn_multiplier: f64,
    pub open_water_factor: f64,
}

/// Coastal penalty ramp keyed by distance-to-land in cells. Cells at
/// distance <= 2 are impassable and filtered before reaching the cost
/// model; this ramp covers the remainder.
pub fn coastal_penalty(distance_to_land_cells: u32, near_port: bool) -> f64 {
    let base = match distance_to_land_cells {
        0..=2 => 100.0,
        3 => 40.0,
        4 => 20.0,
        5 => 10.0,
        6 => 4.0,
        7 => 1.0,
        _ => 0.0,
    };
    if near_port {
        base / 2.0
    } else {
        base
    }
}

/// Per-cell safety score in `[0, 1]`, combining wind/wave severity with
/// multiplicative degradation for poor visibility and extreme conditions.
pub fn safety_score(cell: &Cell) -> f64 {
    let Some(w) = &cell.weather else {
        return 1.0;
    };
    let mut score = 1.0 / (1.0 + (w.wind_speed + w.wave_height) / 20.0);
    if w.visibility < 1.0 {
        score *= 0.5;
    } else if w.visibility < 5.0 {
        score *= 0.8;
    }
    if w.wind_speed > 25.0 || w.wave_height > 6.0 {
        score *= 0.3;
    }
    score.clamp(0.0, 1.0)
}

/// Per-cell fuel-efficiency score in `[0, 1]`: analogous to the safety
/// score but penalises adverse wind/wave without the visibility term,
/// since visibility does not affect main-engine fuel burn.
pub fn fuel_efficiency_score(cell: &Cell) -> f64 {
    let Some(w) = &cell.weather else {
        return 1.0;
    };
    let mut score = 1.0 / (1.0 + (w.wind_speed + w.wave_height) / 25.0);
    if w.wind_speed > 25.0 || w.wave_height > 6.0 {
        score *= 0.5;
    }
    score.clamp(0.0, 1.0)
}

/// Edge cost from `u` to neighbour `v`, given the previous cell (for the
/// turn penalty), the routing mode, its weight vector, and `v`'s
/// coastal/safety context. The draft/channel-width term only applies
/// under [`Mode::Ulcv`]; every other mode adds zero.
#[allow(clippy::too_many_arguments)]
pub fn edge_cost(
    prev: Option<Point>,
    u: Point,
    v: &Cell,
    mode: Mode,
    weights: ModeWeights,
    distance_to_land_cells: u32,
    near_port: bool,
) -> f64 {
    let v_point = Point::new(v.lat, v.lon);
    let dist = haversine(u.lat, u.lon, v.lat, v.lon);
    let safety = safety_score(v);
    let fuel_eff = fuel_efficiency_score(v);
    let coastal = coastal_penalty(distance_to_land_cells, near_port);
    let turn = turn_penalty(prev, u, v_point) * weights.turn_multiplier;
    let open_water_bonus = if distance_to_land_cells > 7 {
        dist * (1.0 - weights.open_water_factor)
    } else {
        0.0
    };
    let draft_channel = if mode == Mode::Ulcv {
        draft_channel_penalty(distance_to_land_cells, UlcvConfig::from_env())
    } else {
        0.0
    };

    dist * weights.w_distance
        + (1.0 - safety) * weights.w_safety * 100.0
        + (1.0 - fuel_eff) * weights.w_weather * 50.0
        + coastal * weights.w_coastal
        + turn
        + draft_channel
        - open_water_bonus
}

/// Heuristic estimate from `v` to the goal, scaled for long oceanic
/// crossings to keep the search tractable (it gives up strict
/// admissibility past ~1500 km, trading it for bounded node counts).
pub fn heuristic(v: Point, goal: Point, weights: ModeWeights) -> f64 {
    let dist = haversine(v.lat, v.lon, goal.lat, goal.lon);
    let factor = match dist {
        d if d > 3000.0 => 3.0,
        d if d > 1500.0 => 2.0,
        _ => 1.0,
    };
    dist * weights.w_distance / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Weather;

    fn calm_cell() -> Cell {
        Cell::water(10.0, 80.0)
    }

    fn stormy_cell() -> Cell {
        let mut c = Cell::water(10.0, 80.0);
        c.weather = Some(Weather {
            temperature: 25.0,
            wind_speed: 30.0,
            wind_direction: 0.0,
            wind_gusts: 35.0,
            wave_height: 7.0,
            wave_direction: 0.0,
            wave_period: 8.0,
            visibility: 0.5,
            cloud_cover: 1.0,
            precipitation: 10.0,
            timestamp: 0,
        });
        c
    }

    #[test]
    fn mode_parse_accepts_aliases() {
        assert_eq!(Mode::parse("fuel_efficient"), Some(Mode::Fuel));
        assert_eq!(Mode::parse("normal"), Some(Mode::Optimal));
        assert_eq!(Mode::parse("SAFE"), Some(Mode::Safe));
        assert_eq!(Mode::parse("bogus"), None);
    }

    #[test]
    fn safety_score_degrades_with_weather() {
        let calm = safety_score(&calm_cell());
        let stormy = safety_score(&stormy_cell());
        assert!(stormy < calm);
        assert!((0.0..=1.0).contains(&stormy));
    }

    #[test]
    fn coastal_penalty_ramps_to_zero() {
        assert!(coastal_penalty(3, false) > coastal_penalty(7, false));
        assert_eq!(coastal_penalty(8, false), 0.0);
    }

    #[test]
    fn coastal_penalty_halved_near_port() {
        assert_eq!(coastal_penalty(3, true), coastal_penalty(3, false) / 2.0);
    }

    #[test]
    fn edge_cost_higher_for_safe_mode_in_bad_weather() {
        let weights_fuel = Mode::Fuel.weights();
        let weights_safe = Mode::Safe.weights();
        let u = Point::new(10.0, 80.0);
        let v = stormy_cell();
        let cost_fuel = edge_cost(None, u, &v, Mode::Fuel, weights_fuel, 10, false);
        let cost_safe = edge_cost(None, u, &v, Mode::Safe, weights_safe, 10, false);
        assert!(cost_safe > cost_fuel);
    }

    #[test]
    fn ulcv_mode_adds_draft_channel_penalty_near_coast() {
        let weights = Mode::Ulcv.weights();
        let u = Point::new(10.0, 80.0);
        let v = calm_cell();
        let near_coast = edge_cost(None, u, &v, Mode::Ulcv, weights, 3, false);
        let open_water = edge_cost(None, u, &v, Mode::Ulcv, weights, 8, false);
        assert!(near_coast > open_water);

        let safe_weights = Mode::Safe.weights();
        let safe_cost = edge_cost(None, u, &v, Mode::Safe, safe_weights, 3, false);
        assert!(near_coast > safe_cost);
    }

    #[test]
    fn draft_channel_penalty_ramps_to_zero_past_seven_cells() {
        let config = UlcvConfig::default();
        assert!(draft_channel_penalty(0, config) > draft_channel_penalty(6, config));
        assert_eq!(draft_channel_penalty(8, config), 0.0);
    }

    #[test]
    fn mode_parse_accepts_ulcv() {
        assert_eq!(Mode::parse("ulcv"), Some(Mode::Ulcv));
        assert_eq!(Mode::parse("ULCV"), Some(Mode::Ulcv));
    }

    #[test]
    fn heuristic_scales_down_for_long_crossings() {
        let weights = Mode::Optimal.weights();
        let v = Point::new(0.0, 0.0);
        let near = Point::new(1.0, 1.0);
        let far = Point::new(40.0, 40.0);
        let h_near = heuristic(v, near, weights);
        let h_far = heuristic(v, far, weights);
        // far heuristic divides by a larger factor, so it underestimates
        // proportionally more than the near one.
        assert!(h_far / haversine(v.lat, v.lon, far.lat, far.lon) < h_near / haversine(v.lat, v.lon, near.lat, near.lon));
    }
}
