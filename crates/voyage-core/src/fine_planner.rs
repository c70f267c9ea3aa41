//! The fine planner: weighted A* over a loaded corridor of grid cells.
//!
//! The priority-queue / `g_score` / parent-map skeleton below mirrors the
//! A* implementation this crate's pathfinding stack was built from, with
//! `FloatOrd` giving `f64` a total order so it can sit in a `BinaryHeap`.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};

use crate::coast::{distance_to_land, narrow_passage, segment_crosses_land, DEFAULT_LAND_SEARCH_RADIUS, DEFAULT_NARROW_PASSAGE_DEPTH};
use crate::cost::{edge_cost, heuristic, Mode};
use crate::error::{Error, NoPathCause};
use crate::geo::Point;
use crate::grid::CellIndex;

/// Hard cap on expanded nodes per segment.
pub const MAX_ASTAR_NODES: usize = 100_000;

/// Hard wall-clock cap per segment.
pub const MAX_ASTAR_DURATION: Duration = Duration::from_secs(180);

/// How far a start/goal point may be snapped to reach navigable water.
pub const SNAP_RADIUS_DEG: f64 = 1.0;

/// Total ordering wrapper over `f64` using `total_cmp`, so costs can be
/// compared inside a max-heap used as a min-heap (reversed `Ord`).
#[derive(Debug, Clone, Copy, PartialEq)]
struct FloatOrd(f64);

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueEntry {
    node: (i64, i64),
    estimate: FloatOrd,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the lowest f-score pops first.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 8-directional neighbour offsets in fixed iteration order (N, NE, E,
/// SE, S, SW, W, NW). Re-implementers must not rely on any stronger
/// ordering guarantee than this.
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

fn node_key(lat: f64, lon: f64, resolution: f64) -> (i64, i64) {
    (
        (lat / resolution).round() as i64,
        (lon / resolution).round() as i64,
    )
}

fn key_to_point(key: (i64, i64), resolution: f64) -> Point {
    Point::new(key.0 as f64 * resolution, key.1 as f64 * resolution)
}

/// Snaps `(lat, lon)` to the nearest non-blocked cell within
/// [`SNAP_RADIUS_DEG`], preferring the exact cell if it is already water.
fn snap_to_water(index: &CellIndex, lat: f64, lon: f64) -> Option<(i64, i64)> {
    let resolution = index.resolution;
    if let Some(cell) = index.get(lat, lon) {
        if !cell.is_blocked() {
            return Some(node_key(lat, lon, resolution));
        }
    }
    let max_ring = (SNAP_RADIUS_DEG / resolution).ceil() as i32;
    let mut best: Option<((i64, i64), f64)> = None;
    for dy in -max_ring..=max_ring {
        for dx in -max_ring..=max_ring {
            let probe_lat = lat + dy as f64 * resolution;
            let probe_lon = lon + dx as f64 * resolution;
            if let Some(cell) = index.get(probe_lat, probe_lon) {
                if !cell.is_blocked() {
                    let dist = crate::geo::haversine(lat, lon, probe_lat, probe_lon);
                    if best.map(|(_, d)| dist < d).unwrap_or(true) {
                        best = Some((node_key(probe_lat, probe_lon, resolution), dist));
                    }
                }
            }
        }
    }
    best.map(|(key, _)| key)
}

/// Runs weighted A* from `(start_lat, start_lon)` to `(goal_lat,
/// goal_lon)` over `index`, returning the raw (unsmoothed) list of
/// `(lat, lon)` points on success.
pub fn find_path(
    index: &CellIndex,
    mode: Mode,
    start_lat: f64,
    start_lon: f64,
    goal_lat: f64,
    goal_lon: f64,
) -> Result<Vec<(f64, f64)>, Error> {
    if index.is_empty() {
        return Err(Error::NoPath {
            from_lat: start_lat,
            from_lon: start_lon,
            to_lat: goal_lat,
            to_lon: goal_lon,
            cause: NoPathCause::CorridorEmpty,
        });
    }

    let start = snap_to_water(index, start_lat, start_lon).ok_or(Error::OffGrid {
        point: crate::error::OffGridPoint::Start,
        lat: start_lat,
        lon: start_lon,
    })?;
    let goal = snap_to_water(index, goal_lat, goal_lon).ok_or(Error::OffGrid {
        point: crate::error::OffGridPoint::End,
        lat: goal_lat,
        lon: goal_lon,
    })?;

    let resolution = index.resolution;
    let weights = mode.weights();
    let goal_point = key_to_point(goal, resolution);

    let mut open = BinaryHeap::new();
    let mut g_score: HashMap<(i64, i64), f64> = HashMap::new();
    let mut parents: HashMap<(i64, i64), (i64, i64)> = HashMap::new();

    g_score.insert(start, 0.0);
    open.push(QueueEntry {
        node: start,
        estimate: FloatOrd(heuristic(key_to_point(start, resolution), goal_point, weights)),
    });

    let deadline = Instant::now() + MAX_ASTAR_DURATION;
    let mut expanded = 0usize;

    while let Some(QueueEntry { node, .. }) = open.pop() {
        if node == goal {
            return Ok(reconstruct(&parents, node, resolution));
        }

        expanded += 1;
        if expanded > MAX_ASTAR_NODES {
            return Err(Error::NoPath {
                from_lat: start_lat,
                from_lon: start_lon,
                to_lat: goal_lat,
                to_lon: goal_lon,
                cause: NoPathCause::NodeLimitExceeded,
            });
        }
        if expanded % 10_000 == 0 && Instant::now() > deadline {
            return Err(Error::NoPath {
                from_lat: start_lat,
                from_lon: start_lon,
                to_lat: goal_lat,
                to_lon: goal_lon,
                cause: NoPathCause::TimedOut,
            });
        }

        let current_point = key_to_point(node, resolution);
        let current_g = *g_score.get(&node).unwrap_or(&f64::INFINITY);
        let prev_point = parents.get(&node).map(|p| key_to_point(*p, resolution));

        for (dx, dy) in NEIGHBOUR_OFFSETS {
            let neighbour_lat = current_point.lat + dy as f64 * resolution;
            let neighbour_lon = current_point.lon + dx as f64 * resolution;
            let neighbour_key = node_key(neighbour_lat, neighbour_lon, resolution);

            let Some(cell) = index.get(neighbour_lat, neighbour_lon) else {
                continue;
            };
            if cell.is_blocked() {
                continue;
            }

            // diagonal moves require both orthogonal intermediates to be
            // clear and the direct segment not to clip land.
            if dx != 0 && dy != 0 {
                let ortho_a = index.get(current_point.lat, neighbour_lon);
                let ortho_b = index.get(neighbour_lat, current_point.lon);
                if !ortho_a.is_some_and(|c| !c.is_blocked())
                    || !ortho_b.is_some_and(|c| !c.is_blocked())
                {
                    continue;
                }
                if segment_crosses_land(
                    index,
                    current_point.lat,
                    current_point.lon,
                    neighbour_lat,
                    neighbour_lon,
                ) {
                    continue;
                }
            }

            if narrow_passage(index, neighbour_lat, neighbour_lon, DEFAULT_NARROW_PASSAGE_DEPTH) {
                continue;
            }

            let land_distance = distance_to_land(
                index,
                neighbour_lat,
                neighbour_lon,
                DEFAULT_LAND_SEARCH_RADIUS,
            );
            let near_port = matches!(cell.zone, Some(crate::grid::Zone::Port));

            let step_cost = edge_cost(
                prev_point,
                current_point,
                cell,
                mode,
                weights,
                land_distance,
                near_port,
            );
            let tentative_g = current_g + step_cost;

            if tentative_g < *g_score.get(&neighbour_key).unwrap_or(&f64::INFINITY) {
                g_score.insert(neighbour_key, tentative_g);
                parents.insert(neighbour_key, node);
                let neighbour_point = key_to_point(neighbour_key, resolution);
                let f = tentative_g + heuristic(neighbour_point, goal_point, weights);
                open.push(QueueEntry {
                    node: neighbour_key,
                    estimate: FloatOrd(f),
                });
            }
        }
    }

    Err(Error::NoPath {
        from_lat: start_lat,
        from_lon: start_lon,
        to_lat: goal_lat,
        to_lon: goal_lon,
        cause: NoPathCause::DisconnectedBasin,
    })
}

fn reconstruct(
    parents: &HashMap<(i64, i64), (i64, i64)>,
    goal: (i64, i64),
    resolution: f64,
) -> Vec<(f64, f64)> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(parent) = parents.get(&current) {
        path.push(*parent);
        current = *parent;
    }
    path.reverse();
    path.into_iter()
        .map(|key| {
            let p = key_to_point(key, resolution);
            (p.lat, p.lon)
        })
        .collect()
}
