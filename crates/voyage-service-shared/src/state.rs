//! Application state for HTTP microservices.
//!
//! This module provides the shared state structure that axum handlers use to
//! access the loaded grid store, the routing configuration, and the
//! region/route caches.

use std::path::Path;
use std::sync::{Arc, Mutex};

use voyage_core::{Error as CoreError, GridStore, RegionCache, RouteCache, RoutingConfig};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Failed to open or validate the grid store.
    GridStoreLoad(CoreError),

    /// Grid store file not found.
    GridStoreNotFound(String),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GridStoreLoad(e) => write!(f, "failed to load grid store: {}", e),
            Self::GridStoreNotFound(path) => write!(f, "grid store not found: {}", path),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::GridStoreLoad(e) => Some(e),
            Self::GridStoreNotFound(_) => None,
        }
    }
}

impl From<CoreError> for AppStateError {
    fn from(err: CoreError) -> Self {
        Self::GridStoreLoad(err)
    }
}

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::post, extract::State};
/// use voyage_service_shared::AppState;
/// use voyage_core::RoutingConfig;
///
/// async fn handler(State(state): State<AppState>) {
///     let grid = state.grid();
///     // ... use grid
/// }
///
/// let state = AppState::load("path/to/grid.db", RoutingConfig::from_env()).unwrap();
/// let app = Router::new()
///     .route("/route", post(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    grid: Mutex<GridStore>,
    config: RoutingConfig,
    region_cache: Mutex<RegionCache>,
    route_cache: Mutex<RouteCache>,
}

impl AppState {
    /// Open the grid store at `grid_path` and build state around it.
    pub fn load(grid_path: impl AsRef<Path>, config: RoutingConfig) -> Result<Self, AppStateError> {
        let grid_path = grid_path.as_ref();

        if !grid_path.exists() {
            return Err(AppStateError::GridStoreNotFound(
                grid_path.display().to_string(),
            ));
        }

        tracing::info!(path = %grid_path.display(), "opening grid store");
        let grid = GridStore::open(grid_path)?;
        tracing::info!(
            lat_range = grid.bounds.lat_max - grid.bounds.lat_min,
            lon_range = grid.bounds.lon_max - grid.bounds.lon_min,
            "grid store opened"
        );

        Ok(Self::from_components(grid, config))
    }

    /// Build application state from a pre-loaded grid store.
    ///
    /// Useful for testing, or for a grid store built in-memory via
    /// [`GridStore::from_cells`](voyage_core::GridStore::from_cells).
    pub fn from_components(grid: GridStore, config: RoutingConfig) -> Self {
        let region_cache = RegionCache::new(64, config.region_cache_ttl());
        let route_cache = RouteCache::default_config();
        Self {
            inner: Arc::new(AppStateInner {
                grid: Mutex::new(grid),
                config,
                region_cache: Mutex::new(region_cache),
                route_cache: Mutex::new(route_cache),
            }),
        }
    }

    /// Lock and access the opened grid store.
    ///
    /// A `Mutex` rather than a bare value: `rusqlite::Connection` is not
    /// `Sync`, and `AppState` must be `Sync` to live behind axum's
    /// `State` extractor. Only the weather write-through path and the
    /// planner itself hold the lock, and each holds it only for the
    /// duration of one blocking call.
    pub fn grid(&self) -> std::sync::MutexGuard<'_, GridStore> {
        self.inner.grid.lock().unwrap()
    }

    /// Access the routing configuration this state was built with.
    pub fn config(&self) -> &RoutingConfig {
        &self.inner.config
    }

    /// Access the region cache.
    pub fn region_cache(&self) -> &Mutex<RegionCache> {
        &self.inner.region_cache
    }

    /// Access the route cache.
    pub fn route_cache(&self) -> &Mutex<RouteCache> {
        &self.inner.route_cache
    }

    /// A grid store opened or built in-memory always has bounds; this is
    /// the readiness signal health checks look at.
    pub fn is_ready(&self) -> bool {
        let grid = self.grid();
        grid.bounds.lat_max > grid.bounds.lat_min
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("grid_resolution", &self.grid().resolution)
            .field("is_ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voyage_core::Cell;

    fn minimal_store() -> GridStore {
        GridStore::from_cells(
            0.2,
            vec![Cell::water(18.0, 72.0), Cell::water(18.2, 72.2)],
        )
        .unwrap()
    }

    #[test]
    fn test_app_state_from_components() {
        let state = AppState::from_components(minimal_store(), RoutingConfig::default());
        assert!(state.is_ready());
        assert_eq!(state.grid().resolution, 0.2);
    }

    #[test]
    fn test_app_state_clone() {
        let state1 = AppState::from_components(minimal_store(), RoutingConfig::default());
        let state2 = state1.clone();
        assert_eq!(state1.grid().resolution, state2.grid().resolution);
    }

    #[test]
    fn test_app_state_debug() {
        let state = AppState::from_components(minimal_store(), RoutingConfig::default());
        let debug = format!("{:?}", state);
        assert!(debug.contains("AppState"));
        assert!(debug.contains("is_ready"));
    }

    #[test]
    fn test_app_state_error_display() {
        let err = AppStateError::GridStoreNotFound("/path/to/grid.db".to_string());
        assert!(err.to_string().contains("/path/to/grid.db"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_app_state_load_nonexistent() {
        let result = AppState::load("/nonexistent/path/to/grid.db", RoutingConfig::default());
        assert!(result.is_err());

        match result.unwrap_err() {
            AppStateError::GridStoreNotFound(path) => {
                assert!(path.contains("nonexistent"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_app_state_caches_accessible() {
        let state = AppState::from_components(minimal_store(), RoutingConfig::default());
        assert_eq!(state.region_cache().lock().unwrap().len(), 0);
        assert_eq!(state.route_cache().lock().unwrap().len(), 0);
    }
}
