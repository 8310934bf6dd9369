use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::display;

/// Which part of the one-call document a slice came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceKind {
    Current,
    Hourly,
    Daily,
}

impl SliceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SliceKind::Current => "current",
            SliceKind::Hourly => "hourly",
            SliceKind::Daily => "daily",
        }
    }
}

impl std::fmt::Display for SliceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named point on the map, either from the catalog or resolved by geocoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// One normalized point in time for one location.
///
/// Built only by the normalizer; fields are read through accessors so the
/// record stays immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherObservation {
    pub(crate) kind: SliceKind,
    pub(crate) timestamp: DateTime<FixedOffset>,
    pub(crate) temperature_c: f64,
    pub(crate) feels_like_c: f64,
    pub(crate) humidity_pct: u8,
    pub(crate) pressure_hpa: i32,
    pub(crate) condition_code: Option<i32>,
    pub(crate) condition_description: String,
    pub(crate) icon_code: String,
    pub(crate) cloud_pct: Option<u8>,
    pub(crate) dew_point_c: Option<f64>,
    pub(crate) uv_index: Option<f64>,
    pub(crate) precipitation_probability: Option<f64>,
}

impl WeatherObservation {
    pub fn kind(&self) -> SliceKind {
        self.kind
    }

    /// Instant of the slice, carrying the location's UTC offset.
    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn temperature_c(&self) -> f64 {
        self.temperature_c
    }

    pub fn feels_like_c(&self) -> f64 {
        self.feels_like_c
    }

    pub fn humidity_pct(&self) -> u8 {
        self.humidity_pct
    }

    pub fn pressure_hpa(&self) -> i32 {
        self.pressure_hpa
    }

    pub fn condition_code(&self) -> Option<i32> {
        self.condition_code
    }

    pub fn condition_description(&self) -> &str {
        &self.condition_description
    }

    pub fn icon_code(&self) -> &str {
        &self.icon_code
    }

    pub fn cloud_pct(&self) -> Option<u8> {
        self.cloud_pct
    }

    pub fn dew_point_c(&self) -> Option<f64> {
        self.dew_point_c
    }

    pub fn uv_index(&self) -> Option<f64> {
        self.uv_index
    }

    pub fn precipitation_probability(&self) -> Option<f64> {
        self.precipitation_probability
    }

    /// Display label for lists: hour of day for current/hourly, date for daily.
    pub fn label(&self) -> String {
        match self.kind {
            SliceKind::Current | SliceKind::Hourly => display::hour_label(&self.timestamp),
            SliceKind::Daily => display::day_label(&self.timestamp),
        }
    }

    pub fn emoji(&self) -> &'static str {
        display::icon_emoji(&self.icon_code)
    }
}

/// Everything normalized out of one one-call document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Forecast {
    /// Seconds east of UTC for the requested location.
    pub timezone_offset: i32,
    pub current: Option<WeatherObservation>,
    pub hourly: Vec<WeatherObservation>,
    pub daily: Vec<WeatherObservation>,
    /// Slices dropped because they could not be normalized.
    pub skipped: usize,
}

impl Forecast {
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.hourly.is_empty() && self.daily.is_empty()
    }
}
