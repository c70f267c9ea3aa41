//! Weather updater: on-demand sampling of live weather along a planned
//! path, feeding back into reported cost metrics without altering the
//! path geometry that was already computed against cached conditions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::sleep;

use crate::error::{Error, Result};
use crate::grid::{GridStore, Weather};
use crate::route::RoutePoint;

/// Maximum concurrent in-flight weather fetches.
pub const MAX_FETCH_CONCURRENCY: usize = 4;

/// Delay between dispatching successive fetches, to respect external
/// API rate limits.
pub const DEFAULT_FETCH_DELAY: Duration = Duration::from_millis(300);

/// Per-fetch timeout.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_RETRIES: u32 = 3;

/// Abstracts the external weather API so tests and offline runs can
/// substitute a deterministic fake instead of issuing real HTTP calls —
/// the same seam the dataset downloader keeps between its GitHub client
/// and the code that consumes release metadata.
pub trait WeatherSource: Send + Sync {
    fn fetch(&self, lat: f64, lon: f64) -> std::result::Result<Weather, FetchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    RateLimited,
    Unavailable,
}

/// Deterministically selects which path indices get sampled: always the
/// quartile anchors, plus a pseudo-random subset of the remainder sized
/// by `sample_rate`. "Pseudo-random" here is a fixed hash of the index,
/// not a seeded RNG, so sampling is reproducible across runs of the same
/// path.
fn select_sample_indices(len: usize, sample_rate: f64) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let mut indices: Vec<usize> = vec![0, len / 4, len / 2, (3 * len) / 4, len - 1];
    indices.sort_unstable();
    indices.dedup();

    for i in 0..len {
        if indices.contains(&i) {
            continue;
        }
        // stable pseudo-random hash of the index in [0, 1).
        let h = ((i as u64).wrapping_mul(2654435761) % 1000) as f64 / 1000.0;
        if h < sample_rate {
            indices.push(i);
        }
    }
    indices.sort_unstable();
    indices
}

/// Samples weather along `path` at a subset of indices determined by
/// `sample_rate`, using bounded concurrency. Returns the map of sampled
/// points to weather plus, if any samples failed, a count for the
/// caller to report as [`Error::WeatherFetchPartial`].
pub async fn sample_path(
    source: Arc<dyn WeatherSource>,
    path: &[RoutePoint],
    sample_rate: f64,
) -> (HashMap<usize, Weather>, Option<Error>) {
    let indices = select_sample_indices(path.len(), sample_rate);
    let semaphore = Arc::new(Semaphore::new(MAX_FETCH_CONCURRENCY));
    let mut handles = Vec::new();

    for (order, &idx) in indices.iter().enumerate() {
        let point = path[idx];
        let source = source.clone();
        let semaphore = semaphore.clone();
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await.expect("semaphore not closed");
            sleep(DEFAULT_FETCH_DELAY * order as u32 / MAX_FETCH_CONCURRENCY as u32).await;
            (idx, fetch_with_retry(source.as_ref(), point.lat, point.lon).await)
        }));
    }

    let mut samples = HashMap::new();
    let mut attempted = 0usize;
    let mut failed = 0usize;
    for handle in handles {
        attempted += 1;
        match handle.await {
            Ok((idx, Ok(weather))) => {
                samples.insert(idx, weather);
            }
            _ => failed += 1,
        }
    }

    let error = if failed > 0 {
        Some(Error::WeatherFetchPartial { failed, attempted })
    } else {
        None
    };
    (samples, error)
}

async fn fetch_with_retry(
    source: &dyn WeatherSource,
    lat: f64,
    lon: f64,
) -> std::result::Result<Weather, FetchError> {
    let mut attempt = 0;
    loop {
        match source.fetch(lat, lon) {
            Ok(weather) => return Ok(weather),
            Err(FetchError::RateLimited) if attempt < MAX_RETRIES => {
                attempt += 1;
                sleep(Duration::from_millis(200 * 2u64.pow(attempt))).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Best-effort write-through of sampled weather back into the grid
/// store. Failures are logged, never propagated: this is a cache
/// refresh, not part of the route's correctness.
pub fn write_through(store: &GridStore, path: &[RoutePoint], samples: &HashMap<usize, Weather>) {
    for (&idx, weather) in samples {
        let Some(point) = path.get(idx) else { continue };
        if let Err(err) = store.write_weather(point.lat, point.lon, weather) {
            tracing::warn!(lat = point.lat, lon = point.lon, error = %err, "weather write-through failed");
        }
    }
}
