//! In-memory cache of EDSM lookups.
//!
//! Two independent tables:
//!
//! ```text
//! systems:  "<base>/api-system-v1/<endpoint>?systemId64=<id>" → RemoteSystem
//! stations: <id>                                              → [RemoteStation]
//! ```
//!
//! Entries never expire; [`RemoteCache::flush`] clears both tables. Identical
//! concurrent misses are not coalesced: each issues its own fetch and the
//! last writer wins, which is harmless because a response for a given key
//! does not change during a run. Failed fetches are never stored.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace, warn};

use super::client::RemoteFetcher;
use super::types::{RemoteStation, RemoteSystem, StationsResponse, SystemQuery};
use super::RemoteError;

/// Default EDSM base URL.
pub const DEFAULT_BASE_URL: &str = "https://www.edsm.net";

/// Counters describing cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoteCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub fetches: u64,
    pub failures: u64,
    pub systems: usize,
    pub stations: usize,
}

impl fmt::Display for RemoteCacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hits, {} misses, {} fetches ({} failed), {} systems, {} station lists",
            self.hits, self.misses, self.fetches, self.failures, self.systems, self.stations
        )
    }
}

/// Cache over the EDSM system and station endpoints.
pub struct RemoteCache {
    fetcher: Arc<dyn RemoteFetcher>,
    base_url: String,
    systems: DashMap<String, Arc<RemoteSystem>>,
    stations: DashMap<u64, Arc<Vec<RemoteStation>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
    failures: AtomicU64,
}

impl RemoteCache {
    /// Create a cache fetching from `base_url` (without trailing slash).
    pub fn new(fetcher: Arc<dyn RemoteFetcher>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            fetcher,
            base_url,
            systems: DashMap::new(),
            stations: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            fetches: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Fully qualified request URL, also used as the cache key.
    pub fn system_url(&self, system_address: u64, query: SystemQuery) -> String {
        format!(
            "{}/{}?systemId64={}",
            self.base_url,
            query.endpoint(),
            system_address
        )
    }

    fn stations_url(&self, system_address: u64) -> String {
        format!(
            "{}/api-system-v1/stations?systemId64={}",
            self.base_url, system_address
        )
    }

    /// Resolve a system endpoint, fetching on a miss.
    ///
    /// The returned system may be empty (`has_data() == false`) when EDSM
    /// does not know the system; that answer is cached like any other.
    pub async fn resolve(
        &self,
        system_address: u64,
        query: SystemQuery,
    ) -> Result<Arc<RemoteSystem>, RemoteError> {
        let url = self.system_url(system_address, query);
        if let Some(cached) = self.systems.get(&url) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(url = %url, "EDSM cache hit");
            return Ok(Arc::clone(cached.value()));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let data = self.fetch(&url).await?;
        let system = RemoteSystem::from_slice(&data).map_err(|e| {
            self.failures.fetch_add(1, Ordering::Relaxed);
            RemoteError::Decode {
                url: url.clone(),
                message: e.to_string(),
            }
        })?;
        let system = Arc::new(system);
        self.systems.insert(url, Arc::clone(&system));
        Ok(system)
    }

    /// Body data for a system; a system EDSM does not know is an error here.
    pub async fn bodies(&self, system_address: u64) -> Result<Arc<RemoteSystem>, RemoteError> {
        let system = self.resolve(system_address, SystemQuery::Bodies).await?;
        if system.has_data() {
            Ok(system)
        } else {
            Err(RemoteError::NoData(system_address))
        }
    }

    /// Value estimates for a system.
    pub async fn system_value(
        &self,
        system_address: u64,
    ) -> Result<Arc<RemoteSystem>, RemoteError> {
        self.resolve(system_address, SystemQuery::EstimatedValue)
            .await
    }

    /// Stations in a system, fetching on a miss.
    pub async fn stations(
        &self,
        system_address: u64,
    ) -> Result<Arc<Vec<RemoteStation>>, RemoteError> {
        if let Some(cached) = self.stations.get(&system_address) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(cached.value()));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let url = self.stations_url(system_address);
        let data = self.fetch(&url).await?;
        let stations = StationsResponse::from_slice(&data).map_err(|e| {
            self.failures.fetch_add(1, Ordering::Relaxed);
            RemoteError::Decode {
                url,
                message: e.to_string(),
            }
        })?;
        let stations = Arc::new(stations);
        self.stations.insert(system_address, Arc::clone(&stations));
        Ok(stations)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        debug!(url = %url, "Requesting information from EDSM");
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.fetcher.fetch(url).await.map_err(|e| {
            self.failures.fetch_add(1, Ordering::Relaxed);
            warn!(url = %url, error = %e, "Failed to fetch EDSM info");
            e
        })
    }

    /// Populate every table for `system_address` in the background.
    ///
    /// Fire-and-forget: the only effect is a best-effort cache write. Readers
    /// still call [`resolve`](Self::resolve) and never wait on a warm-up.
    /// Outside a Tokio runtime nothing is started.
    ///
    /// Returns true if a warm-up task was spawned.
    pub fn warm_up(self: &Arc<Self>, system_address: u64) -> bool {
        if system_address == 0 {
            return false;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!(system = system_address, "No runtime, skipping EDSM warm-up");
            return false;
        };
        debug!(system = system_address, "Warming EDSM cache");
        let cache = Arc::clone(self);
        runtime.spawn(async move {
            let (bodies, value, stations) = futures::join!(
                cache.resolve(system_address, SystemQuery::Bodies),
                cache.resolve(system_address, SystemQuery::EstimatedValue),
                cache.stations(system_address),
            );
            trace!(
                system = system_address,
                bodies = bodies.is_ok(),
                value = value.is_ok(),
                stations = stations.is_ok(),
                "EDSM warm-up finished"
            );
        });
        true
    }

    /// Drop every cached entry.
    pub fn flush(&self) {
        self.systems.clear();
        self.stations.clear();
        debug!("Cached EDSM information cleared");
    }

    pub fn stats(&self) -> RemoteCacheStats {
        RemoteCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            systems: self.systems.len(),
            stations: self.stations.len(),
        }
    }
}

impl fmt::Debug for RemoteCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCache")
            .field("base_url", &self.base_url)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edsm::client::tests::MockFetcher;
    use std::time::Duration;

    const BASE: &str = "http://edsm.test";

    fn cache_with(mock: Arc<MockFetcher>) -> RemoteCache {
        RemoteCache::new(mock, format!("{}/", BASE))
    }

    fn sol_bodies() -> Vec<u8> {
        br#"{"id64":1000,"name":"Sol","bodyCount":2,"bodies":[{"bodyId":0,"name":"Sol","isMainStar":true}]}"#
            .to_vec()
    }

    #[test]
    fn test_system_url() {
        let cache = cache_with(Arc::new(MockFetcher::default()));
        assert_eq!(
            cache.system_url(1000, SystemQuery::Bodies),
            "http://edsm.test/api-system-v1/bodies?systemId64=1000"
        );
        assert_eq!(
            cache.system_url(7, SystemQuery::EstimatedValue),
            "http://edsm.test/api-system-v1/estimated-value?systemId64=7"
        );
    }

    #[tokio::test]
    async fn test_second_resolve_is_served_from_cache() {
        let mock = Arc::new(MockFetcher::default());
        let cache = cache_with(Arc::clone(&mock));
        mock.respond(&cache.system_url(1000, SystemQuery::Bodies), Ok(sol_bodies()));

        let first = cache.resolve(1000, SystemQuery::Bodies).await.unwrap();
        let second = cache.resolve(1000, SystemQuery::Bodies).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(mock.fetch_count(), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.systems, 1);
    }

    #[tokio::test]
    async fn test_flush_forces_refetch() {
        let mock = Arc::new(MockFetcher::default());
        let cache = cache_with(Arc::clone(&mock));
        mock.respond(&cache.system_url(1000, SystemQuery::Bodies), Ok(sol_bodies()));

        cache.resolve(1000, SystemQuery::Bodies).await.unwrap();
        cache.flush();
        assert_eq!(cache.stats().systems, 0);
        cache.resolve(1000, SystemQuery::Bodies).await.unwrap();
        assert_eq!(mock.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let mock = Arc::new(MockFetcher::default());
        let cache = cache_with(Arc::clone(&mock));
        let url = cache.system_url(1000, SystemQuery::Bodies);
        mock.respond(&url, Err(RemoteError::Transport("timed out".to_string())));

        assert!(cache.resolve(1000, SystemQuery::Bodies).await.is_err());
        assert_eq!(cache.stats().systems, 0);

        mock.respond(&url, Ok(sol_bodies()));
        assert!(cache.resolve(1000, SystemQuery::Bodies).await.is_ok());
        assert_eq!(mock.fetch_count(), 2);
        assert_eq!(cache.stats().failures, 1);
    }

    #[tokio::test]
    async fn test_undecodable_response_is_not_cached() {
        let mock = Arc::new(MockFetcher::default());
        let cache = cache_with(Arc::clone(&mock));
        mock.respond(
            &cache.system_url(1000, SystemQuery::Bodies),
            Ok(b"<html>busy</html>".to_vec()),
        );

        assert!(matches!(
            cache.resolve(1000, SystemQuery::Bodies).await,
            Err(RemoteError::Decode { .. })
        ));
        assert_eq!(cache.stats().systems, 0);
    }

    #[tokio::test]
    async fn test_bodies_without_data_is_an_error() {
        let mock = Arc::new(MockFetcher::default());
        let cache = cache_with(Arc::clone(&mock));
        mock.respond(&cache.system_url(5, SystemQuery::Bodies), Ok(b"[]".to_vec()));

        assert!(matches!(cache.bodies(5).await, Err(RemoteError::NoData(5))));
        assert!(matches!(cache.bodies(5).await, Err(RemoteError::NoData(5))));
        assert_eq!(mock.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_stations_are_cached_by_system() {
        let mock = Arc::new(MockFetcher::default());
        let cache = cache_with(Arc::clone(&mock));
        mock.respond(
            "http://edsm.test/api-system-v1/stations?systemId64=1000",
            Ok(br#"{"stations":[{"id":1,"name":"Abraham Lincoln","type":"Orbis Starport"}]}"#.to_vec()),
        );

        let stations = cache.stations(1000).await.unwrap();
        assert_eq!(stations[0].name, "Abraham Lincoln");
        cache.stations(1000).await.unwrap();
        assert_eq!(mock.fetch_count(), 1);
        assert_eq!(cache.stats().stations, 1);
    }

    #[tokio::test]
    async fn test_warm_up_populates_tables() {
        let mock = Arc::new(MockFetcher::default());
        let cache = Arc::new(cache_with(Arc::clone(&mock)));
        mock.respond(&cache.system_url(1000, SystemQuery::Bodies), Ok(sol_bodies()));
        mock.respond(
            &cache.system_url(1000, SystemQuery::EstimatedValue),
            Ok(br#"{"id64":1000,"name":"Sol","estimatedValue":5000}"#.to_vec()),
        );

        assert!(cache.warm_up(1000));
        for _ in 0..50 {
            if cache.stats().systems == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(cache.stats().systems, 2);
        // The station lookup failed and left nothing behind.
        assert_eq!(cache.stats().stations, 0);
    }

    #[test]
    fn test_warm_up_without_runtime_is_skipped() {
        let mock = Arc::new(MockFetcher::default());
        let cache = Arc::new(cache_with(Arc::clone(&mock)));

        assert!(!cache.warm_up(1000));
        assert!(!cache.warm_up(0));
        assert_eq!(mock.fetch_count(), 0);
    }
}
