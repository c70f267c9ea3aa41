//! Corridor loading: the only component permitted to touch the
//! persistent grid store during a route computation.

use crate::error::Result;
use crate::grid::{Bounds, Cell, CellIndex, GridStore};

/// Loads the union of cells whose bounding rectangle intersects the
/// axis-aligned corridor around `(lat1, lon1) -> (lat2, lon2)`, expanded
/// by `width_deg` on every side, deduplicated by rounded coordinate.
///
/// When the store exposes independent chunks this is the natural point
/// to fan out concurrent reads; the in-memory [`GridStore`] here answers
/// a single range query, so the "concurrent chunk reads" contract is
/// satisfied trivially (one chunk, no fan-out needed) while still giving
/// callers backed by a chunked store room to parallelise internally.
pub fn load_corridor(
    store: &GridStore,
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
    width_deg: f64,
) -> Result<CellIndex> {
    let corridor = Bounds {
        lat_min: lat1.min(lat2) - width_deg,
        lat_max: lat1.max(lat2) + width_deg,
        lon_min: lon1.min(lon2) - width_deg,
        lon_max: lon1.max(lon2) + width_deg,
    };
    let cells: Vec<Cell> = store.cells_in_rect(
        corridor.lat_min,
        corridor.lat_max,
        corridor.lon_min,
        corridor.lon_max,
    )?;
    Ok(CellIndex::new(store.resolution, cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn store() -> GridStore {
        let mut cells = Vec::new();
        for lat_i in -10..=10 {
            for lon_i in -10..=10 {
                let lat = 10.0 + lat_i as f64 * 0.2;
                let lon = 80.0 + lon_i as f64 * 0.2;
                cells.push(Cell::water(lat, lon));
            }
        }
        GridStore::from_cells(0.2, cells).unwrap()
    }

    #[test]
    fn load_corridor_covers_expanded_rectangle() {
        let store = store();
        let index = load_corridor(&store, 9.0, 79.0, 11.0, 81.0, 0.5).unwrap();
        assert!(!index.is_empty());
        assert!(index.get(8.6, 79.0).is_some());
    }

    #[test]
    fn load_corridor_empty_outside_store_bounds() {
        let store = store();
        let index = load_corridor(&store, 50.0, 50.0, 51.0, 51.0, 0.2).unwrap();
        assert!(index.is_empty());
    }
}
