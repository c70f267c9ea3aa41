//! Core library for Indian Ocean cargo-vessel route planning.
//!
//! This crate computes navigable ocean routes between two geographic
//! points, balancing distance, fuel, and safety under current weather
//! conditions. It consumes an opaque land-water grid and a weather-fetch
//! capability; it does not generate either.
//!
//! # Quick Start
//!
//! ```no_run
//! use voyage_core::{GridStore, Mode, plan_route};
//! use voyage_core::geo::Point;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = GridStore::open(std::path::Path::new("grid.db"))?;
//! let start = Point::new(18.97, 72.87); // Mumbai
//! let end = Point::new(17.68, 83.30);   // Visakhapatnam
//! let route = plan_route(&store, start, end, Mode::Optimal)?;
//! println!("{} km over {} points", route.distance_km, route.points.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, Error>`](Result). Weather
//! fetch failures never fail a route outright ([`Error::is_weather_only`]);
//! an intermediate coarse segment failure is recovered by skipping unless
//! it is the final segment.
//!
//! # Two-stage planning
//!
//! [`plan_route`] runs the coarse planner ([`coarse_planner::plan_coarse`])
//! to select strategic waypoints, then the fine planner
//! ([`fine_planner::find_path`]) to run weighted A* between each pair. A
//! request whose coarse list collapses to `[start, end]` degenerates
//! naturally into a single direct A* call -- there is no separately
//! maintained single-stage code path.

#![deny(warnings)]

pub mod cache;
pub mod coarse_planner;
pub mod coast;
pub mod config;
pub mod corridor;
pub mod cost;
pub mod error;
pub mod fine_planner;
pub mod fuel;
pub mod geo;
pub mod grid;
pub mod hubs;
pub mod route;
pub mod snapshot;
pub mod weather;

pub use cache::{HubKey, ModeKey, RegionCache, RegionKey, RouteCache, RouteSnapshot};
pub use config::RoutingConfig;
pub use cost::{
    coastal_penalty, draft_channel_penalty, fuel_efficiency_score, safety_score, Mode,
    ModeWeights, UlcvConfig,
};
pub use error::{Error, NoPathCause, OffGridPoint, Result};
pub use fuel::{
    build_alerts, compute_fuel_metrics, weather_index, Alert, AlertLevel, AlertSummary,
    FuelBreakdown, FuelMetrics, FuelModelConfig, VesselProfile,
};
pub use grid::{Bounds, Cell, CellIndex, GridStats, GridStore, Weather, Zone, DEFAULT_RESOLUTION};
pub use hubs::{hub_coords, nearest_hub, HUBS};
pub use route::{plan_route, Route, RoutePoint};
pub use weather::{sample_path, write_through, FetchError, WeatherSource, MAX_FETCH_CONCURRENCY};
