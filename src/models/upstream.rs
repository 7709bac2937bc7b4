//! Upstream payload DTOs
//!
//! Deserialization targets for the geocoding and current conditions
//! endpoints. Every field is optional so that absent or null values map to
//! empty record fields instead of decode failures.

use serde::Deserialize;

use crate::models::WeatherRecord;

/// One geocoding match.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Current conditions payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentConditions {
    #[serde(default)]
    pub weather: Option<Vec<ConditionDto>>,
    #[serde(default)]
    pub main: Option<MainDto>,
    #[serde(default)]
    pub visibility: Option<i64>,
    #[serde(default)]
    pub wind: Option<WindDto>,
    #[serde(default)]
    pub dt: Option<i64>,
    #[serde(default)]
    pub sys: Option<SysDto>,
    #[serde(default)]
    pub timezone: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConditionDto {
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MainDto {
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub feels_like: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindDto {
    #[serde(default)]
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SysDto {
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}

impl CurrentConditions {
    // == Into Record ==
    /// Converts the payload into a record, using `requested_name` when the
    /// payload carries no place name.
    pub fn into_record(self, requested_name: &str) -> WeatherRecord {
        let first = self
            .weather
            .and_then(|conditions| conditions.into_iter().next())
            .unwrap_or_default();
        let main = self.main.unwrap_or_default();
        let sys = self.sys.unwrap_or_default();

        WeatherRecord {
            condition: first.main.unwrap_or_default(),
            description: first.description.unwrap_or_default(),
            temperature: main.temp.unwrap_or(f64::NAN),
            feels_like: main.feels_like.unwrap_or(f64::NAN),
            visibility: self.visibility,
            wind_speed: self.wind.and_then(|w| w.speed),
            datetime: self.dt.unwrap_or(0),
            sunrise: sys.sunrise.unwrap_or(0),
            sunset: sys.sunset.unwrap_or(0),
            timezone_offset: self.timezone.unwrap_or(0),
            name: self.name.unwrap_or_else(|| requested_name.to_string()),
        }
    }
}
