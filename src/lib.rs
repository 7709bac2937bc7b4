//! Weather SDK - A cached OpenWeather client
//!
//! Resolves location names to current conditions through a bounded,
//! freshness-limited LRU cache, with optional periodic background refresh and
//! one shared instance per API key.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod registry;
pub mod tasks;

pub use client::{Mode, WeatherClient};
pub use config::Config;
pub use error::{Result, WeatherError};
pub use fetch::{Fetcher, OpenWeatherSource, WeatherSource};
pub use models::WeatherRecord;
pub use registry::WeatherRegistry;
