//! Fetch Module
//!
//! The two-stage lookup (location name -> coordinates -> current conditions)
//! and the network boundary it runs against.
//!
//! `Fetcher` holds no per-call state and is safe to share across tasks.

mod http;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, WeatherError};
use crate::models::{Coordinates, CurrentConditions, WeatherRecord};

pub use http::OpenWeatherSource;

// == Weather Source ==
/// The external geocoding and current-conditions lookups.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Resolves a location name to candidate coordinates, best match first.
    async fn geocode(&self, location: &str) -> Result<Vec<Coordinates>>;

    /// Fetches current conditions at the given coordinates.
    async fn current_conditions(&self, coords: Coordinates) -> Result<CurrentConditions>;
}

// == Fetcher ==
/// Produces a `WeatherRecord` for a location name. No internal retry.
#[derive(Clone)]
pub struct Fetcher {
    source: Arc<dyn WeatherSource>,
}

impl Fetcher {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { source }
    }

    // == Fetch ==
    /// Resolves `location` and fetches its current conditions.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank name, before any network call
    /// - `NotFound` when geocoding yields no match
    /// - `Upstream` / `Network` as reported by the source
    pub async fn fetch(&self, location: &str) -> Result<WeatherRecord> {
        if location.trim().is_empty() {
            return Err(WeatherError::InvalidInput(
                "Location name is required".to_string(),
            ));
        }

        let coords = self
            .source
            .geocode(location)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::NotFound(location.to_string()))?;

        debug!(
            "Resolved '{}' to lat={} lon={}",
            location, coords.lat, coords.lon
        );

        let conditions = self.source.current_conditions(coords).await?;
        Ok(conditions.into_record(location))
    }
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher").finish_non_exhaustive()
    }
}
