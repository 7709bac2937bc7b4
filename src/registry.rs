//! Instance Registry
//!
//! Maps each API key to exactly one `WeatherClient`, created lazily on first
//! use and shared by every caller holding that key.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::client::{Mode, WeatherClient};
use crate::config::Config;
use crate::error::{Result, WeatherError};
use crate::fetch::{OpenWeatherSource, WeatherSource};

/// API key -> live instance
pub(crate) type Instances = HashMap<String, Arc<WeatherClient>>;

/// Builds the upstream source for a new instance.
///
/// Runs with the registry table locked, so it must not block or do network
/// I/O.
pub type SourceFactory =
    Arc<dyn Fn(&str, &Config) -> Result<Arc<dyn WeatherSource>> + Send + Sync>;

// == Weather Registry ==
/// Per-credential instance table with an atomic get-or-create.
///
/// The table lock is held across construction, so concurrent first callers
/// for one key observe a single instance. While one key is being built,
/// resolves for every other key wait on the same lock, so construction is
/// kept synchronous and free of network I/O. The default factory builds one
/// `reqwest::Client` per credential, which loads the TLS roots once; that is
/// the only blocking work done under the lock. Distinct registries share
/// nothing.
pub struct WeatherRegistry {
    config: Config,
    factory: SourceFactory,
    instances: Arc<Mutex<Instances>>,
}

impl WeatherRegistry {
    // == Constructor ==
    /// Creates a registry with the default parameters and the OpenWeather
    /// HTTP source.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a registry whose instances use `config` and the OpenWeather
    /// HTTP source.
    pub fn with_config(config: Config) -> Self {
        Self::with_source_factory(config, |api_key, config| {
            let source = OpenWeatherSource::new(api_key, config)?;
            Ok(Arc::new(source) as Arc<dyn WeatherSource>)
        })
    }

    /// Creates a registry that builds each instance's source with `factory`.
    ///
    /// `factory` is called under the registry lock, once per new credential.
    /// Keep it cheap: defer connections and lookups to the first fetch.
    pub fn with_source_factory<F>(config: Config, factory: F) -> Self
    where
        F: Fn(&str, &Config) -> Result<Arc<dyn WeatherSource>> + Send + Sync + 'static,
    {
        Self {
            config,
            factory: Arc::new(factory),
            instances: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // == Resolve ==
    /// Returns the instance for `api_key`, creating it on first use.
    ///
    /// An existing instance is returned unchanged: `mode` only applies to the
    /// call that creates it, and the source factory is not called again. A
    /// failed construction registers nothing, so a later call may retry.
    ///
    /// # Errors
    /// `InvalidInput` for a blank key, or whatever the source factory reports.
    pub async fn resolve(&self, api_key: &str, mode: Mode) -> Result<Arc<WeatherClient>> {
        if api_key.trim().is_empty() {
            return Err(WeatherError::InvalidInput(
                "API key cannot be empty".to_string(),
            ));
        }

        let mut instances = self.instances.lock().await;

        if let Some(existing) = instances.get(api_key) {
            if existing.mode() != mode {
                debug!(
                    "Instance already exists in {} mode; requested {} mode ignored",
                    existing.mode(),
                    mode
                );
            }
            return Ok(Arc::clone(existing));
        }

        let source = (self.factory)(api_key, &self.config)?;
        let client = Arc::new(WeatherClient::build(
            api_key,
            mode,
            &self.config,
            source,
            Arc::downgrade(&self.instances),
        )?);
        instances.insert(api_key.to_string(), Arc::clone(&client));

        info!(
            "Created weather instance ({} mode), {} active",
            mode,
            instances.len()
        );
        Ok(client)
    }

    // == Get ==
    /// Returns the instance for `api_key` without creating one.
    pub async fn get(&self, api_key: &str) -> Option<Arc<WeatherClient>> {
        self.instances.lock().await.get(api_key).cloned()
    }

    // == Dispose ==
    /// Removes the instance for `api_key` and stops its refresher.
    ///
    /// Returns whether an instance was registered.
    pub async fn dispose(&self, api_key: &str) -> bool {
        let removed = self.instances.lock().await.remove(api_key);
        match removed {
            Some(client) => {
                client.shutdown();
                info!("Disposed weather instance ({} mode)", client.mode());
                true
            }
            None => false,
        }
    }

    /// Disposes every registered instance.
    pub async fn dispose_all(&self) {
        let drained: Vec<Arc<WeatherClient>> =
            self.instances.lock().await.drain().map(|(_, c)| c).collect();
        for client in &drained {
            client.shutdown();
        }
        if !drained.is_empty() {
            info!("Disposed {} weather instances", drained.len());
        }
    }

    pub async fn len(&self) -> usize {
        self.instances.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.instances.lock().await.is_empty()
    }
}

impl Default for WeatherRegistry {
    fn default() -> Self {
        Self::new()
    }
}
