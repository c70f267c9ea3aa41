//! Test utilities for microservice handler testing.
//!
//! This module provides fixtures and helpers for testing HTTP handlers
//! against a synthetic in-memory grid, built the same way
//! `voyage-core`'s own integration tests build one: there is no bundled
//! fixture database in this repository.

use voyage_core::{Cell, GridStore, RoutingConfig};

use crate::state::AppState;

/// Build a small all-water grid covering the Mumbai / Visakhapatnam
/// corridor, wide enough to exercise the coarse and fine planners.
pub fn region_store() -> GridStore {
    let mut cells = Vec::new();
    let mut lat = 0.0;
    while lat <= 20.0 {
        let mut lon = 70.0;
        while lon <= 95.0 {
            cells.push(Cell::water(
                (lat * 10.0).round() / 10.0,
                (lon * 10.0).round() / 10.0,
            ));
            lon += 0.2;
        }
        lat += 0.2;
    }
    GridStore::from_cells(0.2, cells).expect("synthetic region grid builds")
}

/// Build a fresh [`AppState`] over [`region_store`] with default routing
/// configuration. Each call builds its own grid store and caches, since
/// `AppState` is cheap to construct and handler tests should not share
/// cache state across cases.
pub fn test_state() -> AppState {
    AppState::from_components(region_store(), RoutingConfig::default())
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test-{}", timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_loads_successfully() {
        let state = test_state();
        assert!(state.is_ready());
    }

    #[test]
    fn test_state_covers_expected_region() {
        let state = test_state();
        assert!(state.grid().bounds.contains(19.0, 72.8));
        assert!(state.grid().bounds.contains(17.6, 83.2));
    }

    #[test]
    fn test_request_id_unique() {
        let id1 = test_request_id();
        let id2 = test_request_id();
        assert_ne!(id1, id2);
    }
}
