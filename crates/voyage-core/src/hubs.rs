//! Named cargo hubs the route cache keys on.
//!
//! A small fixed set of major Indian Ocean ports, used by both the
//! routing service (to decide when a request can hit the precomputed
//! [`crate::RouteCache`](crate::cache::RouteCache)) and the CLI's
//! `cache warm` subcommand (to decide which pairs to precompute).

/// `(name, lat, lon)` for each recognised hub.
pub const HUBS: &[(&str, f64, f64)] = &[
    ("mumbai", 18.96, 72.82),
    ("chennai", 13.08, 80.27),
    ("visakhapatnam", 17.68, 83.30),
    ("colombo", 6.93, 79.84),
    ("singapore", 1.29, 103.85),
    ("jebel_ali", 25.01, 55.06),
    ("mombasa", -4.04, 39.66),
    ("durban", -29.87, 31.02),
];

/// A request endpoint counts as "at" a hub when within half a degree of
/// its published coordinates, the tolerance the route cache's design
/// assumes.
pub fn nearest_hub(lat: f64, lon: f64) -> Option<&'static str> {
    HUBS.iter()
        .find(|(_, hub_lat, hub_lon)| (lat - hub_lat).abs() <= 0.5 && (lon - hub_lon).abs() <= 0.5)
        .map(|(name, _, _)| *name)
}

/// Coordinates of a named hub, if recognised.
pub fn hub_coords(name: &str) -> Option<(f64, f64)> {
    HUBS.iter()
        .find(|(hub_name, _, _)| *hub_name == name)
        .map(|(_, lat, lon)| (*lat, *lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_hub_matches_within_tolerance() {
        assert_eq!(nearest_hub(18.9, 72.8), Some("mumbai"));
    }

    #[test]
    fn nearest_hub_none_far_from_any_hub() {
        assert_eq!(nearest_hub(0.0, 0.0), None);
    }

    #[test]
    fn hub_coords_round_trips_nearest_hub() {
        let (lat, lon) = hub_coords("chennai").unwrap();
        assert_eq!(nearest_hub(lat, lon), Some("chennai"));
    }

    #[test]
    fn all_hubs_are_pairwise_distinguishable() {
        for (name, lat, lon) in HUBS {
            assert_eq!(nearest_hub(*lat, *lon), Some(*name));
        }
    }
}
