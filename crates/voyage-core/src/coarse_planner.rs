//! Coarse planning: selects an ordered list of strategic waypoints that
//! bypass large land masses, before the fine planner threads a path
//! between each consecutive pair.

use crate::cost::Mode;
use crate::geo::{haversine, unit_perpendicular, Point};

/// A named waypoint from the static strategic-waypoint table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategicWaypoint {
    pub lat: f64,
    pub lon: f64,
}

impl StrategicWaypoint {
    const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Coarse region, used to pick a named waypoint set for a start/end pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    WestIndia,
    EastIndia,
    SriLanka,
    Bangladesh,
    MiddleEast,
    Singapore,
    EastAfrica,
    Other,
}

fn classify(lat: f64, lon: f64) -> Region {
    match (lat, lon) {
        (lat, lon) if (17.0..24.0).contains(&lat) && (68.0..74.0).contains(&lon) => {
            Region::WestIndia
        }
        (lat, lon) if (8.0..22.0).contains(&lat) && (80.0..92.0).contains(&lon) => {
            Region::EastIndia
        }
        (lat, lon) if (5.0..10.5).contains(&lat) && (79.0..82.5).contains(&lon) => {
            Region::SriLanka
        }
        (lat, lon) if (20.0..27.0).contains(&lat) && (88.0..93.0).contains(&lon) => {
            Region::Bangladesh
        }
        (lat, lon) if (10.0..30.0).contains(&lat) && (48.0..62.0).contains(&lon) => {
            Region::MiddleEast
        }
        (lat, lon) if (-2.0..8.0).contains(&lat) && (95.0..106.0).contains(&lon) => {
            Region::Singapore
        }
        (lat, lon) if (-12.0..2.0).contains(&lat) && (38.0..52.0).contains(&lon) => {
            Region::EastAfrica
        }
        _ => Region::Other,
    }
}

/// Hub ports used to route subcontinent-crossing pairs.
const CHENNAI: StrategicWaypoint = StrategicWaypoint::new(13.08, 80.27);
const KOCHI: StrategicWaypoint = StrategicWaypoint::new(9.93, 76.26);
const TUTICORIN: StrategicWaypoint = StrategicWaypoint::new(8.80, 78.15);

/// Bay-of-Bengal corridor set used for West-India <-> East-India legs
/// (the Mumbai <-> Visakhapatnam canonical case). Counts intentionally
/// differ per mode: `fuel` takes the most direct line, `safe` strings
/// together the most intermediate points further from the coast.
fn bay_of_bengal_set(mode: Mode) -> Vec<StrategicWaypoint> {
    match mode {
        Mode::Fuel => vec![
            StrategicWaypoint::new(16.5, 75.0),
            StrategicWaypoint::new(14.0, 78.0),
            StrategicWaypoint::new(12.5, 80.0),
            StrategicWaypoint::new(13.0, 81.5),
            StrategicWaypoint::new(14.5, 82.0),
            StrategicWaypoint::new(16.0, 82.5),
        ],
        Mode::Optimal => vec![
            StrategicWaypoint::new(17.5, 74.0),
            StrategicWaypoint::new(15.5, 76.5),
            StrategicWaypoint::new(13.5, 79.0),
            StrategicWaypoint::new(11.8, 80.8),
            StrategicWaypoint::new(12.2, 81.8),
            StrategicWaypoint::new(13.8, 82.2),
            StrategicWaypoint::new(15.3, 82.6),
            StrategicWaypoint::new(16.8, 83.0),
        ],
        Mode::Safe => vec![
            StrategicWaypoint::new(18.0, 73.5),
            StrategicWaypoint::new(16.5, 75.5),
            StrategicWaypoint::new(14.8, 77.5),
            StrategicWaypoint::new(12.8, 79.2),
            StrategicWaypoint::new(10.8, 80.5),
            StrategicWaypoint::new(10.6, 81.5),
            StrategicWaypoint::new(11.8, 82.0),
            StrategicWaypoint::new(13.2, 82.4),
            StrategicWaypoint::new(14.8, 82.8),
            StrategicWaypoint::new(16.2, 83.1),
            StrategicWaypoint::new(17.2, 83.2),
            StrategicWaypoint::new(17.5, 83.25),
        ],
        // Ultra-large vessels favour the same cautious line as `safe`,
        // draft/beam constraints are handled by the cost penalty, not
        // by routing further from the coast than `safe` already does.
        Mode::Ulcv => bay_of_bengal_set(Mode::Safe),
    }
}

/// Named pair lookup for the region sets this crate ships with. Returns
/// `None` when no named set applies.
fn named_set(start_region: Region, end_region: Region, mode: Mode) -> Option<Vec<StrategicWaypoint>> {
    match (start_region, end_region) {
        (Region::WestIndia, Region::EastIndia) | (Region::EastIndia, Region::WestIndia) => {
            Some(bay_of_bengal_set(mode))
        }
        _ => None,
    }
}

/// True when the pair plausibly crosses the Indian subcontinent and
/// should be routed via a hub rather than a direct line.
fn crosses_subcontinent(start_region: Region, end_region: Region) -> bool {
    matches!(
        (start_region, end_region),
        (Region::WestIndia, Region::Bangladesh)
            | (Region::Bangladesh, Region::WestIndia)
            | (Region::MiddleEast, Region::EastIndia)
            | (Region::EastIndia, Region::MiddleEast)
    )
}

fn closest_hub(lat: f64, lon: f64) -> StrategicWaypoint {
    [CHENNAI, KOCHI, TUTICORIN]
        .into_iter()
        .min_by(|a, b| {
            haversine(lat, lon, a.lat, a.lon).total_cmp(&haversine(lat, lon, b.lat, b.lon))
        })
        .unwrap()
}

/// Synthesises `n` evenly spaced waypoints between start and end,
/// `n = round(distance_km / 500)`, used when no named set or hub applies
/// and the crossing is long enough to need intermediate guidance.
fn synthesize_waypoints(start: Point, end: Point) -> Vec<StrategicWaypoint> {
    let distance = haversine(start.lat, start.lon, end.lat, end.lon);
    let n = (distance / 500.0).round() as usize;
    if n == 0 {
        return Vec::new();
    }
    (1..=n)
        .map(|i| {
            let t = i as f64 / (n + 1) as f64;
            StrategicWaypoint::new(
                start.lat + (end.lat - start.lat) * t,
                start.lon + (end.lon - start.lon) * t,
            )
        })
        .collect()
}

/// Perturbs interior waypoints per the mode's rule: `fuel` pulls 30%
/// toward the straight line, `safe` pushes 0.5 degrees off to one side
/// along the (planar) perpendicular, `optimal` is unchanged. This is the
/// acknowledged non-geodesic approximation for `safe` (see design notes).
fn perturb(mut waypoints: Vec<StrategicWaypoint>, start: Point, end: Point, mode: Mode) -> Vec<StrategicWaypoint> {
    if waypoints.is_empty() {
        return waypoints;
    }
    match mode {
        Mode::Optimal => waypoints,
        Mode::Fuel => {
            for wp in &mut waypoints {
                let t = projection_fraction(start, end, Point::new(wp.lat, wp.lon));
                let line_lat = start.lat + (end.lat - start.lat) * t;
                let line_lon = start.lon + (end.lon - start.lon) * t;
                wp.lat += (line_lat - wp.lat) * 0.3;
                wp.lon += (line_lon - wp.lon) * 0.3;
            }
            waypoints
        }
        Mode::Safe | Mode::Ulcv => {
            let (px, py) = unit_perpendicular(start, end);
            for wp in &mut waypoints {
                wp.lon += px * 0.5;
                wp.lat += py * 0.5;
            }
            waypoints
        }
    }
}

fn projection_fraction(a: Point, b: Point, p: Point) -> f64 {
    let (dx, dy) = (b.lon - a.lon, b.lat - a.lat);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return 0.0;
    }
    (((p.lon - a.lon) * dx + (p.lat - a.lat) * dy) / len_sq).clamp(0.0, 1.0)
}

/// Reverses the waypoint set if its last endpoint is closer to `start`
/// than its first, so the coarse list always runs start-to-end.
fn orient(mut waypoints: Vec<StrategicWaypoint>, start: Point) -> Vec<StrategicWaypoint> {
    if waypoints.len() < 2 {
        return waypoints;
    }
    let first_dist = haversine(start.lat, start.lon, waypoints[0].lat, waypoints[0].lon);
    let last = waypoints[waypoints.len() - 1];
    let last_dist = haversine(start.lat, start.lon, last.lat, last.lon);
    if last_dist < first_dist {
        waypoints.reverse();
    }
    waypoints
}

/// Selects and mode-adjusts the ordered coarse waypoint list for a
/// `(start, end, mode)` request. Always includes `start` and `end` as
/// the first and last entries.
pub fn plan_coarse(start: Point, end: Point, mode: Mode) -> Vec<Point> {
    let start_region = classify(start.lat, start.lon);
    let end_region = classify(end.lat, end.lon);

    let interior: Vec<StrategicWaypoint> = if let Some(set) = named_set(start_region, end_region, mode) {
        orient(set, start)
    } else if crosses_subcontinent(start_region, end_region) {
        vec![closest_hub(start.lat, start.lon)]
    } else {
        let distance = haversine(start.lat, start.lon, end.lat, end.lon);
        if distance > 500.0 {
            synthesize_waypoints(start, end)
        } else {
            Vec::new()
        }
    };

    let interior = perturb(interior, start, end, mode);

    let mut path = vec![start];
    path.extend(interior.into_iter().map(|wp| Point::new(wp.lat, wp.lon)));
    path.push(end);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hop_returns_start_and_end_only() {
        let start = Point::new(18.97, 72.87);
        let end = Point::new(18.50, 73.00);
        let coarse = plan_coarse(start, end, Mode::Optimal);
        assert_eq!(coarse, vec![start, end]);
    }

    #[test]
    fn mumbai_to_vizag_mode_waypoint_counts_are_monotonic() {
        let start = Point::new(18.97, 72.87);
        let end = Point::new(17.68, 83.30);
        let fuel = plan_coarse(start, end, Mode::Fuel);
        let optimal = plan_coarse(start, end, Mode::Optimal);
        let safe = plan_coarse(start, end, Mode::Safe);
        assert!(fuel.len() <= optimal.len());
        assert!(optimal.len() <= safe.len());
        assert_eq!(fuel.len(), 8);
        assert_eq!(optimal.len(), 10);
        assert_eq!(safe.len(), 14);
    }

    #[test]
    fn long_crossing_without_named_set_synthesises_waypoints() {
        let start = Point::new(13.08, 80.27);
        let end = Point::new(1.28, 103.85);
        let coarse = plan_coarse(start, end, Mode::Optimal);
        assert!(coarse.len() > 2);
        assert_eq!(coarse.first(), Some(&start));
        assert_eq!(coarse.last(), Some(&end));
    }

    #[test]
    fn orient_reverses_when_last_is_closer_to_start() {
        let reversed_first = vec![
            StrategicWaypoint::new(1.0, 1.0),
            StrategicWaypoint::new(10.0, 80.0),
        ];
        let start = Point::new(10.1, 80.1);
        let oriented = orient(reversed_first, start);
        assert_eq!(oriented[0], StrategicWaypoint::new(10.0, 80.0));
    }
}
