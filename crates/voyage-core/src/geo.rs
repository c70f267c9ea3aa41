//! Geodesy helpers shared by the corridor loader, cost model, and fine
//! planner: great-circle distance, bearing, turn penalty, and a cheap
//! planar line-simplification pass for smoothing raw A* output.

/// Mean Earth radius in kilometres, matching the value used throughout the
/// cost model and fuel engine.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two lat/lon points, in kilometres.
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Initial bearing from `(lat1, lon1)` to `(lat2, lon2)`, in degrees `[0, 360)`.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lat2) = (lat1.to_radians(), lat2.to_radians());
    let dlon = (lon2 - lon1).to_radians();
    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    let theta = y.atan2(x).to_degrees();
    (theta + 360.0) % 360.0
}

/// A point the turn penalty and smoothing routines operate on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Penalty, in kilometre-equivalent cost units, for the turn at `curr` when
/// travelling `prev -> curr -> next`. Absent a previous point (the first
/// hop of a segment) the turn is free.
pub fn turn_penalty(prev: Option<Point>, curr: Point, next: Point) -> f64 {
    let Some(prev) = prev else {
        return 0.0;
    };
    let incoming = bearing(prev.lat, prev.lon, curr.lat, curr.lon);
    let outgoing = bearing(curr.lat, curr.lon, next.lat, next.lon);
    let mut delta = (outgoing - incoming).abs();
    if delta > 180.0 {
        delta = 360.0 - delta;
    }
    match delta {
        d if d <= 10.0 => 0.0,
        d if d <= 30.0 => 2.0,
        d if d <= 60.0 => 5.0,
        d if d <= 90.0 => 10.0,
        _ => 16.0,
    }
}

/// Planar (non-geodesic) perpendicular distance from `p` to the line
/// segment `a -> b`, in degrees. Acceptable at the sub-continental scale
/// this is used at (coastal coarse-waypoint perturbation, smoothing).
pub fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.lon - a.lon, b.lat - a.lat);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((p.lon - a.lon).powi(2) + (p.lat - a.lat).powi(2)).sqrt();
    }
    let num = (dy * p.lon - dx * p.lat + b.lon * a.lat - b.lat * a.lon).abs();
    num / len_sq.sqrt()
}

/// Unit vector perpendicular to `a -> b`, consistently rotated 90 degrees
/// counter-clockwise. Used by the coarse planner's `safe`-mode
/// perturbation (a planar approximation, see design notes).
pub fn unit_perpendicular(a: Point, b: Point) -> (f64, f64) {
    let (dx, dy) = (b.lon - a.lon, b.lat - a.lat);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return (0.0, 0.0);
    }
    (-dy / len, dx / len)
}

/// Ramer-Douglas-Peucker simplification: keeps the endpoints and any
/// interior point whose perpendicular distance to its chord exceeds
/// `epsilon` degrees, recursing on both halves.
pub fn douglas_peucker(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let (first, last) = (points[0], points[points.len() - 1]);
    let mut max_dist = 0.0;
    let mut max_index = 0;
    for (i, p) in points.iter().enumerate().take(points.len() - 1).skip(1) {
        let dist = perpendicular_distance(*p, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }
    if max_dist > epsilon {
        let mut left = douglas_peucker(&points[..=max_index], epsilon);
        let right = douglas_peucker(&points[max_index..], epsilon);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_known_distance() {
        // Mumbai to Visakhapatnam, roughly 1450 km great-circle.
        let d = haversine(18.97, 72.87, 17.68, 83.30);
        assert!((1400.0..1550.0).contains(&d), "got {d}");
    }

    #[test]
    fn haversine_zero_for_same_point() {
        assert_eq!(haversine(10.0, 80.0, 10.0, 80.0), 0.0);
    }

    #[test]
    fn bearing_is_in_range() {
        let b = bearing(18.97, 72.87, 17.68, 83.30);
        assert!((0.0..360.0).contains(&b));
    }

    #[test]
    fn turn_penalty_free_without_prev() {
        let curr = Point::new(10.0, 80.0);
        let next = Point::new(11.0, 81.0);
        assert_eq!(turn_penalty(None, curr, next), 0.0);
    }

    #[test]
    fn turn_penalty_escalates_with_angle() {
        let a = Point::new(10.0, 80.0);
        let b = Point::new(10.0, 81.0);
        // straight ahead
        let straight = Point::new(10.0, 82.0);
        assert_eq!(turn_penalty(Some(a), b, straight), 0.0);
        // sharp reversal
        let reversal = Point::new(10.0, 80.0);
        assert_eq!(turn_penalty(Some(a), b, reversal), 16.0);
    }

    #[test]
    fn douglas_peucker_keeps_endpoints() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(0.001, 1.0),
            Point::new(0.0, 2.0),
        ];
        let simplified = douglas_peucker(&points, 0.5);
        assert_eq!(simplified.first(), Some(&points[0]));
        assert_eq!(simplified.last(), Some(&points[2]));
        assert_eq!(simplified.len(), 2);
    }

    #[test]
    fn douglas_peucker_idempotent() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 1.0),
        ];
        let once = douglas_peucker(&points, 0.1);
        let twice = douglas_peucker(&once, 0.1);
        assert_eq!(once, twice);
    }
}
