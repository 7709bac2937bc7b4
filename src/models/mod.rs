//! Data models for the weather client
//!
//! The normalized record handed to callers and the DTOs used to decode the
//! upstream payloads.

pub mod record;
pub mod upstream;

// Re-export commonly used types
pub use record::WeatherRecord;
pub use upstream::{Coordinates, CurrentConditions};
