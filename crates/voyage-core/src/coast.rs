//! Land/coast analysis: distance-to-land, coastal proximity, narrow
//! passages, and land-crossing checks, all operating on a loaded
//! [`CellIndex`] rather than touching the persistent store directly.

use crate::geo::haversine;
use crate::grid::CellIndex;

/// Default ring radius searched for the nearest land cell.
pub const DEFAULT_LAND_SEARCH_RADIUS: u32 = 5;

/// Default narrow-passage search depth.
pub const DEFAULT_NARROW_PASSAGE_DEPTH: u32 = 3;

/// Sentinel distance returned when no land is found within the search
/// radius.
pub const FAR_FROM_LAND: u32 = u32::MAX;

const RING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Ring-by-ring breadth scan outward from `(lat, lon)` up to `radius`
/// cells, returning the ring index of the first land cell encountered,
/// or [`FAR_FROM_LAND`] if none was found within `radius`.
pub fn distance_to_land(index: &CellIndex, lat: f64, lon: f64, radius: u32) -> u32 {
    let r = index.resolution;
    for ring in 1..=radius {
        let ring = ring as i32;
        for dx in -ring..=ring {
            for dy in -ring..=ring {
                if dx.abs() != ring && dy.abs() != ring {
                    continue; // only the outer ring of this radius
                }
                let probe_lat = lat + dy as f64 * r;
                let probe_lon = lon + dx as f64 * r;
                match index.get(probe_lat, probe_lon) {
                    Some(cell) if cell.is_land => return ring as u32,
                    None => return ring as u32, // treat missing coverage as land-like
                    _ => {}
                }
            }
        }
    }
    FAR_FROM_LAND
}

/// True iff any of the 8 immediate neighbours of `(lat, lon)` is land.
pub fn is_near_coast(index: &CellIndex, lat: f64, lon: f64) -> bool {
    let r = index.resolution;
    RING_OFFSETS.iter().any(|(dx, dy)| {
        let probe_lat = lat + *dy as f64 * r;
        let probe_lon = lon + *dx as f64 * r;
        match index.get(probe_lat, probe_lon) {
            Some(cell) => cell.is_land,
            None => true,
        }
    })
}

/// True iff land (or missing coverage) is present in two opposite
/// directions within `depth` cells: large vessels cannot transit a
/// strait narrower than this.
pub fn narrow_passage(index: &CellIndex, lat: f64, lon: f64, depth: u32) -> bool {
    let opposite_pairs: [[(i32, i32); 2]; 4] = [
        [(0, -1), (0, 1)],   // N / S
        [(-1, 0), (1, 0)],   // W / E
        [(-1, -1), (1, 1)],  // NW / SE
        [(-1, 1), (1, -1)],  // NE / SW
    ];
    let r = index.resolution;
    opposite_pairs.iter().any(|pair| {
        pair.iter().all(|(dx, dy)| {
            (1..=depth as i32).any(|step| {
                let probe_lat = lat + (*dy * step) as f64 * r;
                let probe_lon = lon + (*dx * step) as f64 * r;
                match index.get(probe_lat, probe_lon) {
                    Some(cell) => cell.is_land,
                    None => true,
                }
            })
        })
    })
}

/// Samples the great-circle segment `(lat1, lon1) -> (lat2, lon2)` at
/// evenly spaced points and returns whether any sample falls on land or
/// uncovered grid.
pub fn segment_crosses_land(
    index: &CellIndex,
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
) -> bool {
    let dist = haversine(lat1, lon1, lat2, lon2);
    let samples = (3.0_f64).max((dist / index.resolution.max(0.01)).ceil() * 3.0) as usize;
    for i in 0..=samples {
        let t = i as f64 / samples as f64;
        let lat = lat1 + (lat2 - lat1) * t;
        let lon = lon1 + (lon2 - lon1) * t;
        match index.get(lat, lon) {
            Some(cell) if cell.is_land => return true,
            None => return true,
            _ => {}
        }
    }
    false
}
