//! Route cache: two named services with explicit `get`/`put`/`evict`
//! interfaces, each constructed with an explicit capacity/TTL
//! configuration — never hidden module-level statics (design note 9.1).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cost::Mode;
use crate::route::Route;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Generic TTL + LRU-by-insertion-order cache. Eviction drops the oldest
/// entry by insertion order when the capacity is exceeded; this is an
/// approximation of true LRU (recency of use, not insertion) that is
/// adequate at the configured capacities (single digits to low tens).
struct TtlLruCache<K, V> {
    capacity: usize,
    ttl: Duration,
    entries: HashMap<K, Entry<V>>,
    order: Vec<K>,
}

impl<K: std::hash::Hash + Eq + Clone, V: Clone> TtlLruCache<K, V> {
    fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        let expired = self
            .entries
            .get(key)
            .map(|e| e.inserted_at.elapsed() > self.ttl)
            .unwrap_or(false);
        if expired {
            self.evict(key);
            return None;
        }
        self.entries.get(key).map(|e| e.value.clone())
    }

    fn put(&mut self, key: K, value: V) {
        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
        while self.entries.len() > self.capacity {
            let oldest = self.order.remove(0);
            self.entries.remove(&oldest);
        }
    }

    fn evict(&mut self, key: &K) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Rectangle key at 0.1-degree precision, used by the region chunk cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionKey {
    lat_min: i64,
    lat_max: i64,
    lon_min: i64,
    lon_max: i64,
}

impl RegionKey {
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        let round = |v: f64| (v * 10.0).round() as i64;
        Self {
            lat_min: round(lat_min),
            lat_max: round(lat_max),
            lon_min: round(lon_min),
            lon_max: round(lon_max),
        }
    }
}

/// Caches loaded cell rectangles. Capacity 10, TTL 1 hour by default.
pub struct RegionCache {
    inner: TtlLruCache<RegionKey, Vec<crate::grid::Cell>>,
}

impl RegionCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: TtlLruCache::new(capacity, ttl),
        }
    }

    pub fn default_config() -> Self {
        Self::new(10, Duration::from_secs(3600))
    }

    pub fn get(&mut self, key: &RegionKey) -> Option<Vec<crate::grid::Cell>> {
        self.inner.get(key)
    }

    pub fn put(&mut self, key: RegionKey, cells: Vec<crate::grid::Cell>) {
        self.inner.put(key, cells);
    }

    pub fn evict(&mut self, key: &RegionKey) {
        self.inner.evict(key);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Hub key: an ordered pair of named hubs plus mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HubKey {
    pub from_hub: String,
    pub to_hub: String,
    pub mode: ModeKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKey {
    Fuel,
    Optimal,
    Safe,
    Ulcv,
}

impl From<Mode> for ModeKey {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Fuel => ModeKey::Fuel,
            Mode::Optimal => ModeKey::Optimal,
            Mode::Safe => ModeKey::Safe,
            Mode::Ulcv => ModeKey::Ulcv,
        }
    }
}

/// Precomputed hub-to-hub route cache. When both endpoints fall within
/// 0.5 degrees of a named hub, the orchestrator can short-circuit to a
/// cached route (possibly reversed) instead of recomputing.
pub struct RouteCache {
    inner: TtlLruCache<HubKey, RouteSnapshot>,
}

/// Cheap, clonable snapshot of a route's geometry and distance, kept
/// separate from [`Route`] so the cache does not need to clone the
/// mode-carrying original on every hit.
#[derive(Debug, Clone)]
pub struct RouteSnapshot {
    pub points: Vec<crate::route::RoutePoint>,
    pub distance_km: f64,
}

impl From<&Route> for RouteSnapshot {
    fn from(route: &Route) -> Self {
        Self {
            points: route.points.clone(),
            distance_km: route.distance_km,
        }
    }
}

impl RouteCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: TtlLruCache::new(capacity, ttl),
        }
    }

    pub fn default_config() -> Self {
        Self::new(16, Duration::from_secs(3600))
    }

    pub fn get(&mut self, key: &HubKey) -> Option<RouteSnapshot> {
        self.inner.get(key)
    }

    /// Returns a snapshot reversed end-to-start, for a cache hit on the
    /// opposite direction of travel between the same hub pair.
    pub fn get_reversed(&mut self, from_hub: &str, to_hub: &str, mode: Mode) -> Option<RouteSnapshot> {
        let key = HubKey {
            from_hub: to_hub.to_string(),
            to_hub: from_hub.to_string(),
            mode: mode.into(),
        };
        self.inner.get(&key).map(|mut snapshot| {
            snapshot.points.reverse();
            snapshot
        })
    }

    pub fn put(&mut self, key: HubKey, snapshot: RouteSnapshot) {
        self.inner.put(key, snapshot);
    }

    pub fn evict(&mut self, key: &HubKey) {
        self.inner.evict(key);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    #[test]
    fn region_cache_hit_after_put() {
        let mut cache = RegionCache::default_config();
        let key = RegionKey::new(9.0, 11.0, 79.0, 81.0);
        cache.put(key, vec![Cell::water(10.0, 80.0)]);
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn region_cache_evicts_beyond_capacity() {
        let mut cache = RegionCache::new(2, Duration::from_secs(3600));
        let k1 = RegionKey::new(0.0, 1.0, 0.0, 1.0);
        let k2 = RegionKey::new(1.0, 2.0, 1.0, 2.0);
        let k3 = RegionKey::new(2.0, 3.0, 2.0, 3.0);
        cache.put(k1, vec![]);
        cache.put(k2, vec![]);
        cache.put(k3, vec![]);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&k1).is_none());
        assert!(cache.get(&k3).is_some());
    }

    #[test]
    fn region_cache_expires_by_ttl() {
        let mut cache = RegionCache::new(4, Duration::from_millis(0));
        let key = RegionKey::new(0.0, 1.0, 0.0, 1.0);
        cache.put(key, vec![]);
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn route_cache_reversed_hit_reverses_points() {
        let mut cache = RouteCache::default_config();
        let key = HubKey {
            from_hub: "chennai".to_string(),
            to_hub: "singapore".to_string(),
            mode: Mode::Optimal.into(),
        };
        let snapshot = RouteSnapshot {
            points: vec![
                crate::route::RoutePoint { lat: 13.0, lon: 80.0 },
                crate::route::RoutePoint { lat: 1.0, lon: 103.0 },
            ],
            distance_km: 2500.0,
        };
        cache.put(key, snapshot);
        let reversed = cache
            .get_reversed("chennai", "singapore", Mode::Optimal)
            .unwrap();
        assert_eq!(reversed.points[0].lat, 1.0);
    }

    #[test]
    fn explicit_evict_removes_entry() {
        let mut cache = RegionCache::default_config();
        let key = RegionKey::new(0.0, 1.0, 0.0, 1.0);
        cache.put(key, vec![]);
        cache.evict(&key);
        assert!(cache.get(&key).is_none());
    }
}
