//! Configuration Module
//!
//! Holds the fixed cache and refresh parameters, with optional overrides
//! from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// OpenWeather geocoding endpoint
pub const DEFAULT_GEOCODING_URL: &str = "https://api.openweathermap.org/geo/1.0/direct";

/// OpenWeather current conditions endpoint
pub const DEFAULT_CURRENT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Client configuration parameters.
///
/// `Config::default()` carries the fixed production values; every registry
/// instance created from the same `Config` shares them.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of locations the cache can hold
    pub cache_capacity: usize,
    /// Maximum age of a cached record before it is treated as absent
    pub freshness: Duration,
    /// Period between background refresh ticks (periodic mode)
    pub refresh_interval: Duration,
    /// Delay before the first background refresh tick
    pub refresh_initial_delay: Duration,
    /// Number of concurrent refresh workers
    pub refresh_workers: usize,
    /// Connect and response timeout for each upstream request
    pub request_timeout: Duration,
    /// Geocoding endpoint (name -> coordinates)
    pub geocoding_url: String,
    /// Current conditions endpoint (coordinates -> weather)
    pub current_weather_url: String,
}

impl Config {
    /// Creates a new Config, overriding defaults from environment variables.
    ///
    /// # Environment Variables
    /// - `WEATHER_CACHE_CAPACITY` - Maximum cached locations (default: 10)
    /// - `WEATHER_CACHE_FRESHNESS` - Freshness window in seconds (default: 600)
    /// - `WEATHER_REFRESH_INTERVAL` - Refresh period in seconds (default: 300)
    /// - `WEATHER_REFRESH_DELAY` - Initial refresh delay in seconds (default: 10)
    /// - `WEATHER_REFRESH_WORKERS` - Refresh worker count (default: 4)
    /// - `WEATHER_REQUEST_TIMEOUT` - Request timeout in seconds (default: 10)
    /// - `WEATHER_GEOCODING_URL` - Geocoding endpoint
    /// - `WEATHER_CURRENT_URL` - Current conditions endpoint
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_capacity: env_parse("WEATHER_CACHE_CAPACITY").unwrap_or(defaults.cache_capacity),
            freshness: env_secs("WEATHER_CACHE_FRESHNESS").unwrap_or(defaults.freshness),
            refresh_interval: env_secs("WEATHER_REFRESH_INTERVAL")
                .unwrap_or(defaults.refresh_interval),
            refresh_initial_delay: env_secs("WEATHER_REFRESH_DELAY")
                .unwrap_or(defaults.refresh_initial_delay),
            refresh_workers: env_parse("WEATHER_REFRESH_WORKERS")
                .unwrap_or(defaults.refresh_workers),
            request_timeout: env_secs("WEATHER_REQUEST_TIMEOUT")
                .unwrap_or(defaults.request_timeout),
            geocoding_url: env::var("WEATHER_GEOCODING_URL").unwrap_or(defaults.geocoding_url),
            current_weather_url: env::var("WEATHER_CURRENT_URL")
                .unwrap_or(defaults.current_weather_url),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_capacity: 10,
            freshness: Duration::from_secs(600),
            refresh_interval: Duration::from_secs(300),
            refresh_initial_delay: Duration::from_secs(10),
            refresh_workers: 4,
            request_timeout: Duration::from_secs(10),
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            current_weather_url: DEFAULT_CURRENT_WEATHER_URL.to_string(),
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_secs(name: &str) -> Option<Duration> {
    env_parse::<u64>(name).map(Duration::from_secs)
}
