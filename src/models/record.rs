//! Weather Record
//!
//! The normalized, immutable result of a successful fetch and its nested
//! JSON rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Weather Record ==
/// Current conditions for one resolved place.
///
/// Produced once by the fetcher and never mutated afterwards. Times are Unix
/// seconds; `timezone_offset` is the shift from UTC in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    /// Condition group, e.g. "Clouds"
    pub condition: String,
    /// Condition text, e.g. "scattered clouds"
    pub description: String,
    pub temperature: f64,
    pub feels_like: f64,
    /// Visibility in meters
    pub visibility: Option<i64>,
    pub wind_speed: Option<f64>,
    /// Observation time
    pub datetime: i64,
    pub sunrise: i64,
    pub sunset: i64,
    pub timezone_offset: i64,
    /// Resolved place name
    pub name: String,
}

impl WeatherRecord {
    // == To JSON ==
    /// Serializes the record into its nested JSON shape.
    ///
    /// Never fails outward: a record that cannot be serialized renders as `{}`.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&RecordView::from(self)).unwrap_or_else(|_| "{}".to_string())
    }

    /// Nested JSON value of the record.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(RecordView::from(self))
            .unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.datetime, 0)
    }

    pub fn sunrise_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.sunrise, 0)
    }

    pub fn sunset_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.sunset, 0)
    }
}

// == Serialized Shape ==
#[derive(Serialize)]
struct RecordView<'a> {
    weather: WeatherView<'a>,
    temperature: TemperatureView,
    #[serde(skip_serializing_if = "Option::is_none")]
    visibility: Option<i64>,
    wind: WindView,
    datetime: i64,
    sys: SysView,
    timezone: i64,
    name: &'a str,
}

#[derive(Serialize)]
struct WeatherView<'a> {
    main: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
struct TemperatureView {
    temp: f64,
    feels_like: f64,
}

#[derive(Serialize)]
struct WindView {
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f64>,
}

#[derive(Serialize)]
struct SysView {
    sunrise: i64,
    sunset: i64,
}

impl<'a> From<&'a WeatherRecord> for RecordView<'a> {
    fn from(record: &'a WeatherRecord) -> Self {
        Self {
            weather: WeatherView {
                main: &record.condition,
                description: &record.description,
            },
            temperature: TemperatureView {
                temp: record.temperature,
                feels_like: record.feels_like,
            },
            visibility: record.visibility,
            wind: WindView {
                speed: record.wind_speed,
            },
            datetime: record.datetime,
            sys: SysView {
                sunrise: record.sunrise,
                sunset: record.sunset,
            },
            timezone: record.timezone_offset,
            name: &record.name,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_record(name: &str) -> WeatherRecord {
    WeatherRecord {
        condition: "Clouds".to_string(),
        description: "scattered clouds".to_string(),
        temperature: 269.6,
        feels_like: 267.57,
        visibility: Some(10_000),
        wind_speed: Some(1.38),
        datetime: 1_675_744_800,
        sunrise: 1_675_751_262,
        sunset: 1_675_787_560,
        timezone_offset: 3600,
        name: name.to_string(),
    }
}
