//! OpenWeather HTTP transport
//!
//! reqwest implementation of `WeatherSource` against the OpenWeather
//! geocoding and current weather endpoints.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, WeatherError};
use crate::fetch::WeatherSource;
use crate::models::{Coordinates, CurrentConditions};

/// Longest slice of an error body carried into `WeatherError::Upstream`.
const MAX_ERROR_BODY: usize = 500;

/// OpenWeather API client bound to one API key.
#[derive(Clone)]
pub struct OpenWeatherSource {
    client: reqwest::Client,
    api_key: String,
    geocoding_url: String,
    current_weather_url: String,
}

impl OpenWeatherSource {
    /// Builds a client for `api_key` using the endpoints and timeout from `config`.
    pub fn new(api_key: &str, config: &Config) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(WeatherError::InvalidInput(
                "API key cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(config.request_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| WeatherError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
            geocoding_url: config.geocoding_url.clone(),
            current_weather_url: config.current_weather_url.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| transport_error(url, "request to", e))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| transport_error(url, "reading body from", e))?;

        if status != 200 {
            return Err(WeatherError::Upstream {
                status,
                message: truncate(&body, MAX_ERROR_BODY).to_string(),
            });
        }

        serde_json::from_str(&body).map_err(|e| WeatherError::Upstream {
            status,
            message: format!("malformed response from {url}: {e}"),
        })
    }
}

impl fmt::Debug for OpenWeatherSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherSource")
            .field("geocoding_url", &self.geocoding_url)
            .field("current_weather_url", &self.current_weather_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    async fn geocode(&self, location: &str) -> Result<Vec<Coordinates>> {
        debug!("Geocoding '{}' via {}", location, self.geocoding_url);

        let query = [
            ("q", location.to_string()),
            ("limit", "1".to_string()),
            ("appid", self.api_key.clone()),
        ];
        self.get_json(&self.geocoding_url, &query).await
    }

    async fn current_conditions(&self, coords: Coordinates) -> Result<CurrentConditions> {
        debug!(
            "Fetching current conditions lat={} lon={} via {}",
            coords.lat, coords.lon, self.current_weather_url
        );

        let query = [
            ("lat", coords.lat.to_string()),
            ("lon", coords.lon.to_string()),
            ("appid", self.api_key.clone()),
        ];
        self.get_json(&self.current_weather_url, &query).await
    }
}

/// Maps a reqwest failure to `Network`, dropping the request URL.
///
/// The URL reqwest reports carries the `appid` query parameter, so only the
/// bare endpoint is kept.
fn transport_error(url: &str, action: &str, e: reqwest::Error) -> WeatherError {
    WeatherError::Network(format!("{action} {url} failed: {}", e.without_url()))
}

/// Cuts `s` to at most `max` bytes on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
