//! Weather Client
//!
//! The per-credential instance: one cache, one fetcher and, in periodic
//! mode, one background refresher.
//!
//! Instances are normally obtained through `WeatherRegistry::resolve`, which
//! guarantees a single instance per API key.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::{CacheStats, WeatherCache};
use crate::config::Config;
use crate::error::{Result, WeatherError};
use crate::fetch::{Fetcher, WeatherSource};
use crate::models::WeatherRecord;
use crate::registry::Instances;
use crate::tasks::{spawn_refresh_task, RefreshHandle};

// == Mode ==
/// Request mode of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Fetch only on cache miss
    #[default]
    Reactive,
    /// Reactive, plus periodic background refresh of every cached location
    Periodic,
}

impl FromStr for Mode {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reactive" | "on_demand" | "on-demand" => Ok(Mode::Reactive),
            "periodic" | "polling" => Ok(Mode::Periodic),
            other => Err(WeatherError::InvalidInput(format!("Unknown mode: {other}"))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Reactive => write!(f, "reactive"),
            Mode::Periodic => write!(f, "periodic"),
        }
    }
}

// == Weather Client ==
/// Cached weather lookups for one API key.
pub struct WeatherClient {
    api_key: String,
    mode: Mode,
    cache: Arc<RwLock<WeatherCache>>,
    fetcher: Fetcher,
    refresher: Mutex<Option<RefreshHandle>>,
    /// Registry slot released on dispose
    registry: Weak<tokio::sync::Mutex<Instances>>,
}

impl WeatherClient {
    // == Constructor ==
    /// Creates an instance without registering it anywhere.
    ///
    /// Starts the background refresher when `mode` is `Periodic`, which needs
    /// a running tokio runtime.
    ///
    /// # Errors
    /// `InvalidInput` if `api_key` is blank, or if `mode` is `Periodic` and
    /// no tokio runtime is running on this thread.
    pub fn new(
        api_key: &str,
        mode: Mode,
        config: &Config,
        source: Arc<dyn WeatherSource>,
    ) -> Result<Self> {
        Self::build(api_key, mode, config, source, Weak::new())
    }

    pub(crate) fn build(
        api_key: &str,
        mode: Mode,
        config: &Config,
        source: Arc<dyn WeatherSource>,
        registry: Weak<tokio::sync::Mutex<Instances>>,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(WeatherError::InvalidInput(
                "API key cannot be empty".to_string(),
            ));
        }
        if mode == Mode::Periodic && tokio::runtime::Handle::try_current().is_err() {
            return Err(WeatherError::InvalidInput(
                "periodic mode requires a running tokio runtime".to_string(),
            ));
        }

        let cache = Arc::new(RwLock::new(WeatherCache::new(
            config.cache_capacity,
            config.freshness,
        )));
        let fetcher = Fetcher::new(source);

        let refresher = match mode {
            Mode::Periodic => Some(spawn_refresh_task(
                Arc::clone(&cache),
                fetcher.clone(),
                config,
            )),
            Mode::Reactive => None,
        };

        Ok(Self {
            api_key: api_key.to_string(),
            mode,
            cache,
            fetcher,
            refresher: Mutex::new(refresher),
            registry,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// True while a background refresher is attached.
    pub fn is_refreshing(&self) -> bool {
        self.refresher
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    // == Get Weather ==
    /// Returns the serialized record for `location`, fetching on a miss.
    pub async fn get_weather(&self, location: &str) -> Result<String> {
        self.get_record(location).await.map(|r| r.to_json())
    }

    /// Returns the record for `location`, fetching on a miss.
    ///
    /// A fresh cached record is returned without touching the network. On a
    /// miss the record is fetched outside the cache lock and stored; a failed
    /// fetch leaves the cache unchanged.
    pub async fn get_record(&self, location: &str) -> Result<WeatherRecord> {
        validate_location(location)?;

        let cached = self.cache.write().await.get_if_fresh(location);
        if let Some(record) = cached {
            debug!("Cache hit for '{}'", location);
            return Ok(record);
        }

        debug!("Cache miss for '{}'", location);
        let record = self.fetcher.fetch(location).await?;
        self.store(location, record.clone()).await;
        Ok(record)
    }

    // == Add Location ==
    /// Fetches `location` and stores it, even if a fresh record is cached.
    pub async fn add_location(&self, location: &str) -> Result<()> {
        validate_location(location)?;

        let record = self.fetcher.fetch(location).await?;
        self.store(location, record).await;
        Ok(())
    }

    // == Remove Location ==
    pub async fn remove_location(&self, location: &str) {
        self.cache.write().await.remove(location);
    }

    // == Clear Cache ==
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    // == Snapshot ==
    /// Copies every cached location and record, fresh or stale, most
    /// recently used first.
    pub async fn snapshot(&self) -> Vec<(String, WeatherRecord)> {
        self.cache.read().await.snapshot_all()
    }

    /// Cached location keys, most recently used first.
    pub async fn cached_locations(&self) -> Vec<String> {
        self.cache.read().await.keys()
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    // == Dispose ==
    /// Stops the background refresher and releases this instance's
    /// registry slot.
    ///
    /// Returns without waiting for in-flight refreshes. The slot is only
    /// released if it still holds this very instance.
    pub async fn dispose(&self) {
        self.shutdown();

        if let Some(instances) = self.registry.upgrade() {
            let mut instances = instances.lock().await;
            let owns_slot = instances
                .get(&self.api_key)
                .is_some_and(|existing| std::ptr::eq(Arc::as_ptr(existing), self));
            if owns_slot {
                instances.remove(&self.api_key);
                info!("Released registry slot for instance ({} mode)", self.mode);
            }
        }
    }

    /// Stops the background refresher, if any.
    pub(crate) fn shutdown(&self) {
        let handle = match self.refresher.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.shutdown();
            info!("Stopped background refresh");
        }
    }

    async fn store(&self, location: &str, record: WeatherRecord) {
        if let Some(evicted) = self.cache.write().await.put(location, record) {
            debug!("Evicted '{}' to make room for '{}'", evicted, location);
        }
    }
}

impl fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherClient")
            .field("mode", &self.mode)
            .field("refreshing", &self.is_refreshing())
            .finish_non_exhaustive()
    }
}

impl Drop for WeatherClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn validate_location(location: &str) -> Result<()> {
    if location.trim().is_empty() {
        return Err(WeatherError::InvalidInput(
            "Location name is required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::FakeSource;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn reactive_client(source: Arc<FakeSource>) -> WeatherClient {
        WeatherClient::new("test-key", Mode::Reactive, &Config::default(), source).unwrap()
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("reactive".parse::<Mode>().unwrap(), Mode::Reactive);
        assert_eq!("ON_DEMAND".parse::<Mode>().unwrap(), Mode::Reactive);
        assert_eq!("Polling".parse::<Mode>().unwrap(), Mode::Periodic);
        assert_eq!("periodic".parse::<Mode>().unwrap(), Mode::Periodic);
        assert!("sometimes".parse::<Mode>().is_err());
        assert_eq!(Mode::default(), Mode::Reactive);
        assert_eq!(Mode::Periodic.to_string(), "periodic");
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let source = Arc::new(FakeSource::new(&[]));
        let err = WeatherClient::new(" ", Mode::Reactive, &Config::default(), source).unwrap_err();
        assert!(matches!(err, WeatherError::InvalidInput(_)));
    }

    #[test]
    fn test_periodic_mode_outside_runtime_is_an_error() {
        let source = Arc::new(FakeSource::new(&["Paris"]));

        let err = WeatherClient::new("k", Mode::Periodic, &Config::default(), source.clone())
            .unwrap_err();
        assert!(matches!(err, WeatherError::InvalidInput(_)), "got {err:?}");

        // Reactive mode spawns nothing and works without a runtime
        let client = WeatherClient::new("k", Mode::Reactive, &Config::default(), source).unwrap();
        assert!(!client.is_refreshing());
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let source = Arc::new(FakeSource::new(&["Paris"]));
        let client = reactive_client(source.clone());

        let first = client.get_weather("Paris").await.unwrap();
        let second = client.get_weather("paris").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.calls(), 1);
        assert_eq!(client.cache_stats().await.hits, 1);
    }

    #[tokio::test]
    async fn test_get_weather_returns_nested_json() {
        let client = reactive_client(Arc::new(FakeSource::new(&["Paris"])));

        let json = client.get_weather("Paris").await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["weather"]["main"], "Clear");
        assert_eq!(value["temperature"]["temp"], 280.0);
        assert_eq!(value["name"], "paris");
    }

    #[tokio::test]
    async fn test_not_found_caches_nothing() {
        let client = reactive_client(Arc::new(FakeSource::new(&["Paris"])));

        let err = client.get_weather("Atlantis").await.unwrap_err();

        assert_eq!(err, WeatherError::NotFound("Atlantis".to_string()));
        assert!(client.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_blank_location_rejected_without_lookup() {
        let source = Arc::new(FakeSource::new(&["Paris"]));
        let client = reactive_client(source.clone());

        assert_err!(client.get_weather("").await);
        assert_err!(client.add_location("  ").await);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_add_location_always_fetches() {
        let source = Arc::new(FakeSource::new(&["Oslo"]));
        let client = reactive_client(source.clone());

        assert_ok!(client.add_location("Oslo").await);
        source.set_temperature(260.0);
        assert_ok!(client.add_location("Oslo").await);

        assert_eq!(source.calls(), 2);
        let snapshot = client.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].0, "oslo");
        assert_eq!(snapshot[0].1.temperature, 260.0);
    }

    #[tokio::test]
    async fn test_snapshot_is_most_recent_first() {
        let client = reactive_client(Arc::new(FakeSource::new(&["Oslo", "Rome", "Lima"])));

        for city in ["Oslo", "Rome", "Lima"] {
            client.add_location(city).await.unwrap();
        }
        client.get_weather("OSLO").await.unwrap();

        let keys: Vec<String> = client.snapshot().await.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["oslo", "lima", "rome"]);
        assert_eq!(keys, client.cached_locations().await);

        // Taking a snapshot does not count as a use
        client.snapshot().await;
        assert_eq!(client.cached_locations().await[0], "oslo");
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let source = Arc::new(FakeSource::new(&["Oslo", "Rome", "Lima"]));
        let client = reactive_client(source.clone());

        for city in ["Oslo", "Rome", "Lima"] {
            client.add_location(city).await.unwrap();
        }
        client.remove_location("ROME").await;
        let mut keys = client.cached_locations().await;
        keys.sort();
        assert_eq!(keys, vec!["lima".to_string(), "oslo".to_string()]);

        client.clear_cache().await;
        assert!(client.cached_locations().await.is_empty());

        client.get_weather("Oslo").await.unwrap();
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn test_capacity_bounds_cached_locations() {
        let names: Vec<String> = (0..12).map(|i| format!("city{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let client = reactive_client(Arc::new(FakeSource::new(&refs)));

        for name in &names {
            client.get_weather(name).await.unwrap();
        }

        let keys: Vec<String> = client.snapshot().await.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys.len(), 10);
        assert!(!keys.contains(&"city0".to_string()));
        assert!(!keys.contains(&"city1".to_string()));
        assert_eq!(keys[0], "city11");
        assert_eq!(keys[9], "city2");
    }

    #[tokio::test]
    async fn test_stale_entry_is_refetched() {
        let source = Arc::new(FakeSource::new(&["Paris"]));
        let config = Config {
            freshness: Duration::from_millis(50),
            ..Config::default()
        };
        let client = WeatherClient::new("k", Mode::Reactive, &config, source.clone()).unwrap();

        client.get_weather("Paris").await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        client.get_weather("Paris").await.unwrap();

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_periodic_mode_refreshes_and_dispose_stops_it() {
        let source = Arc::new(FakeSource::new(&["Paris"]));
        let config = Config {
            refresh_initial_delay: Duration::from_millis(50),
            refresh_interval: Duration::from_millis(50),
            ..Config::default()
        };
        let client = WeatherClient::new("k", Mode::Periodic, &config, source.clone()).unwrap();
        assert!(client.is_refreshing());

        client.add_location("Paris").await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(source.calls() >= 2);

        client.dispose().await;
        assert!(!client.is_refreshing());
        tokio::time::sleep(Duration::from_millis(20)).await;
        let calls = source.calls();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(source.calls(), calls);

        // Foreground calls keep working after dispose
        client.add_location("Paris").await.unwrap();
    }

    #[tokio::test]
    async fn test_reactive_mode_has_no_refresher() {
        let client = reactive_client(Arc::new(FakeSource::new(&[])));
        assert!(!client.is_refreshing());
        assert_eq!(client.mode(), Mode::Reactive);
        assert_eq!(client.api_key(), "test-key");
    }
}
