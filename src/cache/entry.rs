//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with freshness tracking.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::models::WeatherRecord;

// == Cache Entry ==
/// A cached record and the time it was written.
///
/// Entries are replaced wholesale on every write; reads never refresh
/// `inserted_at`.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored record
    pub value: WeatherRecord,
    /// Write timestamp
    pub inserted_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(value: WeatherRecord) -> Self {
        Self {
            value,
            inserted_at: Utc::now(),
        }
    }

    // == Age ==
    /// Time elapsed since the entry was written, zero if the clock moved back.
    pub fn age(&self) -> Duration {
        (Utc::now() - self.inserted_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    // == Is Fresh ==
    /// Checks whether the entry is still within the freshness window.
    ///
    /// Boundary condition: an entry whose age equals `freshness` exactly is
    /// still fresh.
    pub fn is_fresh(&self, freshness: Duration) -> bool {
        self.age() <= freshness
    }
}
