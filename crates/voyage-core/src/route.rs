//! The route orchestrator: stitches the coarse waypoint list into a full
//! path by running the fine planner segment by segment, mirroring the
//! numbered-step orchestration this crate's routing entry point was
//! built from (resolve inputs, build per-segment search context, run the
//! planner, validate, assemble the final plan).

use serde::{Deserialize, Serialize};

use crate::coarse_planner::plan_coarse;
use crate::cost::Mode;
use crate::corridor::load_corridor;
use crate::error::{Error, Result};
use crate::fine_planner::find_path;
use crate::geo::{douglas_peucker, haversine, Point};
use crate::grid::GridStore;

/// A single resolved point on the final route, with weather sampled in
/// later by the weather updater.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lon: f64,
}

/// Smoothing tolerance applied to each fine segment and to the final
/// concatenated path, in degrees.
pub const SMOOTHING_EPSILON_DEG: f64 = 0.1;

/// A planned route: ordered points plus the raw distance sum used by the
/// fuel and metric engine.
#[derive(Debug, Clone)]
pub struct Route {
    pub mode: Mode,
    pub points: Vec<RoutePoint>,
    pub distance_km: f64,
    /// Number of coarse segments that failed and were skipped (only
    /// non-final segments can be skipped; see [`plan_route`]).
    pub skipped_segments: usize,
}

/// Runs the two-stage planner for `(start, end, mode)` against `store`.
///
/// A request with no intermediate strategic waypoints (the coarse list
/// collapses to `[start, end]`) degenerates naturally into a single
/// direct fine-planner call; that is the "single-stage" special case
/// referenced in the design notes, not a separately maintained code path.
pub fn plan_route(store: &GridStore, start: Point, end: Point, mode: Mode) -> Result<Route> {
    if !store.bounds.contains(start.lat, start.lon) {
        return Err(Error::OffGrid {
            point: crate::error::OffGridPoint::Start,
            lat: start.lat,
            lon: start.lon,
        });
    }
    if !store.bounds.contains(end.lat, end.lon) {
        return Err(Error::OffGrid {
            point: crate::error::OffGridPoint::End,
            lat: end.lat,
            lon: end.lon,
        });
    }

    let coarse = plan_coarse(start, end, mode);
    let width = mode.corridor_width_deg();

    let mut points: Vec<RoutePoint> = Vec::new();
    let mut skipped_segments = 0usize;
    let segment_count = coarse.len() - 1;

    for (i, pair) in coarse.windows(2).enumerate() {
        let (from, to) = (pair[0], pair[1]);
        let result = plan_segment(store, from, to, mode, width);
        let is_final = i == segment_count - 1;

        match result {
            Ok(mut segment_points) => {
                if !points.is_empty() {
                    segment_points.remove(0); // drop the duplicated join point
                }
                points.extend(segment_points);
            }
            Err(err) if !is_final => {
                tracing::warn!(segment = i, error = %err, "coarse segment failed, skipping");
                skipped_segments += 1;
                continue;
            }
            Err(err) => {
                return Err(Error::SegmentFailed {
                    index: i,
                    source: Box::new(err),
                });
            }
        }
    }

    if points.is_empty() {
        return Err(Error::NoPath {
            from_lat: start.lat,
            from_lon: start.lon,
            to_lat: end.lat,
            to_lon: end.lon,
            cause: crate::error::NoPathCause::CorridorEmpty,
        });
    }

    let smoothed = smooth(&points);
    let distance_km = total_distance(&smoothed);

    Ok(Route {
        mode,
        points: smoothed,
        distance_km,
        skipped_segments,
    })
}

fn plan_segment(
    store: &GridStore,
    from: Point,
    to: Point,
    mode: Mode,
    width: f64,
) -> Result<Vec<RoutePoint>> {
    let corridor = load_corridor(store, from.lat, from.lon, to.lat, to.lon, width)?;
    let raw = find_path(&corridor, mode, from.lat, from.lon, to.lat, to.lon)?;
    let as_geo: Vec<_> = raw.iter().map(|(lat, lon)| crate::geo::Point::new(*lat, *lon)).collect();
    let smoothed = douglas_peucker(&as_geo, SMOOTHING_EPSILON_DEG);
    Ok(smoothed
        .into_iter()
        .map(|p| RoutePoint { lat: p.lat, lon: p.lon })
        .collect())
}

fn smooth(points: &[RoutePoint]) -> Vec<RoutePoint> {
    let as_geo: Vec<Point> = points.iter().map(|p| Point::new(p.lat, p.lon)).collect();
    douglas_peucker(&as_geo, SMOOTHING_EPSILON_DEG)
        .into_iter()
        .map(|p| RoutePoint { lat: p.lat, lon: p.lon })
        .collect()
}

fn total_distance(points: &[RoutePoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine(pair[0].lat, pair[0].lon, pair[1].lat, pair[1].lon))
        .sum()
}
