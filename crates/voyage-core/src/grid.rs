//! The grid model: cells, the grid rectangle, and the persistent store.
//!
//! The grid is generated offline by an external collaborator and loaded
//! once at process start; this module only consumes it.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Grid resolution in degrees. Overridable via `GRID_RESOLUTION`.
pub const DEFAULT_RESOLUTION: f64 = 0.2;

/// Weather observed or cached for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub temperature: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub wind_gusts: f64,
    pub wave_height: f64,
    pub wave_direction: f64,
    pub wave_period: f64,
    pub visibility: f64,
    pub cloud_cover: f64,
    pub precipitation: f64,
    pub timestamp: i64,
}

/// Coarse classification of a water cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    OpenWater,
    Coastal,
    Port,
}

/// A single grid cell, keyed by `(lat, lon)` at the grid's resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub lat: f64,
    pub lon: f64,
    pub is_land: bool,
    pub obstacle: bool,
    pub zone: Option<Zone>,
    pub weather: Option<Weather>,
}

impl Cell {
    pub fn water(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            is_land: false,
            obstacle: false,
            zone: None,
            weather: None,
        }
    }

    pub fn land(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            is_land: true,
            obstacle: false,
            zone: None,
            weather: None,
        }
    }

    /// A cell can never be routed through: it is land, or explicitly
    /// flagged as an obstacle (shoal, wreck, restricted area).
    pub fn is_blocked(&self) -> bool {
        self.is_land || self.obstacle
    }
}

/// Bounding rectangle of a grid, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl Bounds {
    /// Default coverage: the Indian Ocean basin used by the canonical test
    /// scenarios.
    pub fn indian_ocean() -> Self {
        Self {
            lat_min: -38.4,
            lat_max: 30.58,
            lon_min: 22.15,
            lon_max: 142.48,
        }
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.lat_min <= other.lat_max
            && self.lat_max >= other.lat_min
            && self.lon_min <= other.lon_max
            && self.lon_max >= other.lon_min
    }
}

/// Integer cell index used as the store's primary key, giving exact
/// equality and ordered range scans independent of floating-point noise.
fn cell_index(value: f64, resolution: f64) -> i64 {
    (value / resolution).round() as i64
}

/// Persistent, chunked store of cells backed by SQLite, mirroring the
/// schema-detection discipline of the dataset loader this crate was
/// adapted from: a single `open` entry point validates the schema before
/// any query runs.
pub struct GridStore {
    conn: Connection,
    pub resolution: f64,
    pub bounds: Bounds,
}

impl GridStore {
    /// Open an existing grid database, validating that the `cells` table
    /// and its spatial index are present.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        let table_exists: bool = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='cells'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count > 0)?;
        if !table_exists {
            return Err(Error::GridUnavailable {
                reason: "grid store has no 'cells' table".to_string(),
            });
        }
        let (lat_min, lat_max, lon_min, lon_max): (f64, f64, f64, f64) = conn.query_row(
            "SELECT min(lat), max(lat), min(lon), max(lon) FROM cells",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;
        Ok(Self {
            conn,
            resolution: DEFAULT_RESOLUTION,
            bounds: Bounds {
                lat_min,
                lat_max,
                lon_min,
                lon_max,
            },
        })
    }

    /// Create an in-memory store and populate it with `cells`. Used by
    /// tests and by the grid-import CLI tool.
    pub fn from_cells(resolution: f64, cells: impl IntoIterator<Item = Cell>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        create_schema(&conn)?;
        let cells: Vec<Cell> = cells.into_iter().collect();
        insert_cells(&conn, resolution, &cells)?;
        let bounds = cells.iter().fold(None::<Bounds>, |acc, c| {
            Some(match acc {
                None => Bounds {
                    lat_min: c.lat,
                    lat_max: c.lat,
                    lon_min: c.lon,
                    lon_max: c.lon,
                },
                Some(b) => Bounds {
                    lat_min: b.lat_min.min(c.lat),
                    lat_max: b.lat_max.max(c.lat),
                    lon_min: b.lon_min.min(c.lon),
                    lon_max: b.lon_max.max(c.lon),
                },
            })
        });
        Ok(Self {
            conn,
            resolution,
            bounds: bounds.unwrap_or_else(Bounds::indian_ocean),
        })
    }

    /// Create a new grid database at `path` and populate it with `cells`.
    /// Used by the `voyage-cli grid import` subcommand; overwrites any
    /// existing file at `path`.
    pub fn create_at_path(
        path: &Path,
        resolution: f64,
        cells: impl IntoIterator<Item = Cell>,
    ) -> Result<Self> {
        if path.exists() {
            std::fs::remove_file(path).map_err(Error::Io)?;
        }
        let conn = Connection::open(path)?;
        create_schema(&conn)?;
        let cells: Vec<Cell> = cells.into_iter().collect();
        insert_cells(&conn, resolution, &cells)?;
        let bounds = cells.iter().fold(None::<Bounds>, |acc, c| {
            Some(match acc {
                None => Bounds {
                    lat_min: c.lat,
                    lat_max: c.lat,
                    lon_min: c.lon,
                    lon_max: c.lon,
                },
                Some(b) => Bounds {
                    lat_min: b.lat_min.min(c.lat),
                    lat_max: b.lat_max.max(c.lat),
                    lon_min: b.lon_min.min(c.lon),
                    lon_max: b.lon_max.max(c.lon),
                },
            })
        });
        Ok(Self {
            conn,
            resolution,
            bounds: bounds.unwrap_or_else(Bounds::indian_ocean),
        })
    }

    /// Summary counts used by `voyage-cli grid dump`.
    pub fn stats(&self) -> Result<GridStats> {
        let (total, land, obstacle, weathered): (i64, i64, i64, i64) = self.conn.query_row(
            "SELECT count(*), \
                    sum(is_land), \
                    sum(obstacle), \
                    sum(CASE WHEN weather_json IS NOT NULL THEN 1 ELSE 0 END) \
             FROM cells",
            [],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get::<_, Option<i64>>(1)?.unwrap_or(0),
                    row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                    row.get::<_, Option<i64>>(3)?.unwrap_or(0),
                ))
            },
        )?;
        Ok(GridStats {
            total_cells: total as usize,
            land_cells: land as usize,
            obstacle_cells: obstacle as usize,
            cells_with_weather: weathered as usize,
            resolution: self.resolution,
            bounds: self.bounds,
        })
    }

    /// All cells whose centre falls within the given rectangle. Every
    /// lookup costs O(k) for the returned set plus an indexed range scan.
    pub fn cells_in_rect(
        &self,
        lat_min: f64,
        lat_max: f64,
        lon_min: f64,
        lon_max: f64,
    ) -> Result<Vec<Cell>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT lat, lon, is_land, obstacle, zone, weather_json FROM cells \
             WHERE lat_idx BETWEEN ?1 AND ?2 AND lon_idx BETWEEN ?3 AND ?4",
        )?;
        let lat_lo = cell_index(lat_min, self.resolution);
        let lat_hi = cell_index(lat_max, self.resolution);
        let lon_lo = cell_index(lon_min, self.resolution);
        let lon_hi = cell_index(lon_max, self.resolution);
        let rows = stmt.query_map([lat_lo, lat_hi, lon_lo, lon_hi], row_to_cell)?;
        let mut cells = Vec::new();
        for row in rows {
            cells.push(row?);
        }
        Ok(cells)
    }

    /// Best-effort write-through for a single cell's weather. Never fails
    /// the caller's route: errors are returned for the caller to log, not
    /// propagate.
    pub fn write_weather(&self, lat: f64, lon: f64, weather: &Weather) -> Result<()> {
        let weather_json = serde_json::to_string(weather).map_err(|e| Error::SnapshotCodec {
            op: "encode_weather",
            message: e.to_string(),
        })?;
        self.conn.execute(
            "UPDATE cells SET weather_json = ?1 WHERE lat_idx = ?2 AND lon_idx = ?3",
            rusqlite::params![
                weather_json,
                cell_index(lat, self.resolution),
                cell_index(lon, self.resolution)
            ],
        )?;
        Ok(())
    }
}

/// Summary statistics over a grid store's cell table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    pub total_cells: usize,
    pub land_cells: usize,
    pub obstacle_cells: usize,
    pub cells_with_weather: usize,
    pub resolution: f64,
    pub bounds: Bounds,
}

fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE cells (
            lat_idx INTEGER NOT NULL,
            lon_idx INTEGER NOT NULL,
            lat REAL NOT NULL,
            lon REAL NOT NULL,
            is_land INTEGER NOT NULL,
            obstacle INTEGER NOT NULL,
            zone TEXT,
            weather_json TEXT,
            PRIMARY KEY (lat_idx, lon_idx)
        );
        CREATE INDEX idx_cells_lat ON cells(lat_idx);
        CREATE INDEX idx_cells_lon ON cells(lon_idx);",
    )?;
    Ok(())
}

fn insert_cells(conn: &Connection, resolution: f64, cells: &[Cell]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT OR REPLACE INTO cells (lat_idx, lon_idx, lat, lon, is_land, obstacle, zone, weather_json) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for cell in cells {
        let zone = cell.zone.map(|z| format!("{z:?}"));
        let weather_json = cell
            .weather
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| Error::SnapshotCodec {
                op: "encode_weather",
                message: e.to_string(),
            })?;
        stmt.execute(rusqlite::params![
            cell_index(cell.lat, resolution),
            cell_index(cell.lon, resolution),
            cell.lat,
            cell.lon,
            cell.is_land as i64,
            cell.obstacle as i64,
            zone,
            weather_json,
        ])?;
    }
    Ok(())
}

fn row_to_cell(row: &rusqlite::Row) -> rusqlite::Result<Cell> {
    let zone: Option<String> = row.get(4)?;
    let weather_json: Option<String> = row.get(5)?;
    Ok(Cell {
        lat: row.get(0)?,
        lon: row.get(1)?,
        is_land: row.get::<_, i64>(2)? != 0,
        obstacle: row.get::<_, i64>(3)? != 0,
        zone: zone.map(|z| match z.as_str() {
            "Coastal" => Zone::Coastal,
            "Port" => Zone::Port,
            _ => Zone::OpenWater,
        }),
        weather: weather_json.and_then(|s| serde_json::from_str(&s).ok()),
    })
}

/// Hash index over a loaded set of cells, keyed by rounded `(lat, lon)`.
/// Built by the corridor loader for each segment; never shared across
/// requests.
#[derive(Debug, Default)]
pub struct CellIndex {
    cells: HashMap<(i64, i64), Cell>,
    pub resolution: f64,
}

impl CellIndex {
    pub fn new(resolution: f64, cells: impl IntoIterator<Item = Cell>) -> Self {
        let mut index = HashMap::new();
        for cell in cells {
            index.insert(Self::key(cell.lat, cell.lon, resolution), cell);
        }
        Self {
            cells: index,
            resolution,
        }
    }

    fn key(lat: f64, lon: f64, resolution: f64) -> (i64, i64) {
        (cell_index(lat, resolution), cell_index(lon, resolution))
    }

    pub fn get(&self, lat: f64, lon: f64) -> Option<&Cell> {
        self.cells.get(&Self::key(lat, lon, self.resolution))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cells() -> Vec<Cell> {
        vec![
            Cell::water(10.0, 80.0),
            Cell::land(10.2, 80.0),
            Cell::water(10.0, 80.2),
        ]
    }

    #[test]
    fn from_cells_round_trips_via_rect_query() {
        let store = GridStore::from_cells(0.2, sample_cells()).unwrap();
        let cells = store.cells_in_rect(9.9, 10.3, 79.9, 80.3).unwrap();
        assert_eq!(cells.len(), 3);
        assert!(cells.iter().any(|c| c.is_land));
    }

    #[test]
    fn rect_query_excludes_outside_cells() {
        let store = GridStore::from_cells(0.2, sample_cells()).unwrap();
        let cells = store.cells_in_rect(0.0, 1.0, 0.0, 1.0).unwrap();
        assert!(cells.is_empty());
    }

    #[test]
    fn cell_index_blocks_land_and_obstacle() {
        let mut c = Cell::water(1.0, 1.0);
        assert!(!c.is_blocked());
        c.obstacle = true;
        assert!(c.is_blocked());
    }

    #[test]
    fn cell_index_lookup_by_rounded_coordinate() {
        let idx = CellIndex::new(0.2, sample_cells());
        assert!(idx.get(10.0, 80.0).is_some());
        assert!(idx.get(50.0, 50.0).is_none());
        assert_eq!(idx.len(), 3);
    }

    #[test]
    fn write_weather_round_trips() {
        let store = GridStore::from_cells(0.2, sample_cells()).unwrap();
        let weather = Weather {
            temperature: 28.0,
            wind_speed: 12.0,
            wind_direction: 90.0,
            wind_gusts: 15.0,
            wave_height: 1.2,
            wave_direction: 90.0,
            wave_period: 6.0,
            visibility: 10.0,
            cloud_cover: 0.3,
            precipitation: 0.0,
            timestamp: 1_700_000_000,
        };
        store.write_weather(10.0, 80.0, &weather).unwrap();
        let cells = store.cells_in_rect(9.9, 10.1, 79.9, 80.1).unwrap();
        let cell = cells.iter().find(|c| !c.is_land).unwrap();
        assert_eq!(cell.weather.as_ref().unwrap().temperature, 28.0);
    }

    #[test]
    fn create_at_path_persists_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.db");
        {
            let store = GridStore::create_at_path(&path, 0.2, sample_cells()).unwrap();
            assert_eq!(store.stats().unwrap().total_cells, 3);
        }
        let reopened = GridStore::open(&path).unwrap();
        let cells = reopened.cells_in_rect(9.9, 10.3, 79.9, 80.3).unwrap();
        assert_eq!(cells.len(), 3);
    }

    #[test]
    fn create_at_path_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.db");
        GridStore::create_at_path(&path, 0.2, sample_cells()).unwrap();
        let fewer = vec![Cell::water(0.0, 0.0)];
        let store = GridStore::create_at_path(&path, 0.2, fewer).unwrap();
        assert_eq!(store.stats().unwrap().total_cells, 1);
    }

    #[test]
    fn stats_counts_land_and_weather() {
        let store = GridStore::from_cells(0.2, sample_cells()).unwrap();
        let weather = Weather {
            temperature: 20.0,
            wind_speed: 5.0,
            wind_direction: 0.0,
            wind_gusts: 5.0,
            wave_height: 0.5,
            wave_direction: 0.0,
            wave_period: 4.0,
            visibility: 10.0,
            cloud_cover: 0.1,
            precipitation: 0.0,
            timestamp: 1_700_000_000,
        };
        store.write_weather(10.0, 80.0, &weather).unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.total_cells, 3);
        assert_eq!(stats.land_cells, 1);
        assert_eq!(stats.cells_with_weather, 1);
    }
}
