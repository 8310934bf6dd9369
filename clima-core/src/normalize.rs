//! Turns raw one-call JSON slices into [`WeatherObservation`] records.
//!
//! Current and hourly slices carry `temp`/`feels_like` as plain numbers,
//! daily slices nest them under `day`. Extraction branches on [`SliceKind`]
//! instead of guessing from the shape.
//!
//! Only `dt` is required. Every other field that is missing, null or of the
//! wrong JSON type falls back to its default.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

use crate::model::{Forecast, SliceKind, WeatherObservation};

pub const HOURLY_LIMIT: usize = 24;
pub const DAILY_LIMIT: usize = 7;

const DEFAULT_ICON: &str = "01d";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("Malformed {kind} observation: {reason}")]
    MalformedObservation { kind: SliceKind, reason: String },
}

impl NormalizeError {
    fn malformed(kind: SliceKind, reason: impl Into<String>) -> Self {
        Self::MalformedObservation {
            kind,
            reason: reason.into(),
        }
    }
}

/// Reads a field as `T`, turning a type mismatch into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// `temp` / `feels_like` as they appear across slice kinds.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTemperature {
    Scalar(f64),
    Daily {
        #[serde(default, deserialize_with = "lenient")]
        day: Option<f64>,
    },
}

impl RawTemperature {
    fn for_kind(&self, kind: SliceKind) -> Option<f64> {
        match (kind, self) {
            (SliceKind::Current | SliceKind::Hourly, RawTemperature::Scalar(v)) => Some(*v),
            (SliceKind::Daily, RawTemperature::Daily { day }) => *day,
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawCondition {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSlice {
    #[serde(default)]
    dt: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    temp: Option<RawTemperature>,
    #[serde(default, deserialize_with = "lenient")]
    feels_like: Option<RawTemperature>,
    #[serde(default, deserialize_with = "lenient")]
    humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pressure: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    clouds: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    dew_point: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    uvi: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pop: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    weather: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default, deserialize_with = "lenient")]
    timezone_offset: Option<f64>,
    #[serde(default)]
    current: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    hourly: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    daily: Option<Vec<Value>>,
}

/// Normalize one slice, stamping it in UTC.
pub fn normalize(raw: &Value, kind: SliceKind) -> Result<WeatherObservation, NormalizeError> {
    normalize_at(raw, kind, utc())
}

/// Normalize one slice, stamping it with the location's UTC offset.
pub fn normalize_at(
    raw: &Value,
    kind: SliceKind,
    offset: FixedOffset,
) -> Result<WeatherObservation, NormalizeError> {
    if !raw.is_object() {
        return Err(NormalizeError::malformed(kind, "slice is not a JSON object"));
    }

    let slice =
        RawSlice::deserialize(raw).map_err(|e| NormalizeError::malformed(kind, e.to_string()))?;

    let Some(dt) = slice.dt else {
        return Err(NormalizeError::malformed(kind, "missing `dt` timestamp"));
    };
    let Some(secs) = dt.as_i64() else {
        let reason = format!("`dt` is not an integer timestamp: {dt}");
        return Err(NormalizeError::malformed(kind, reason));
    };
    let Some(instant) = DateTime::from_timestamp(secs, 0) else {
        let reason = format!("timestamp {secs} is out of range");
        return Err(NormalizeError::malformed(kind, reason));
    };
    let timestamp = instant.with_timezone(&offset);

    let condition = slice
        .weather
        .as_deref()
        .and_then(|w| w.first())
        .and_then(|c| RawCondition::deserialize(c).ok())
        .unwrap_or_default();

    let temperature_c = slice.temp.as_ref().and_then(|t| t.for_kind(kind));
    let feels_like_c = slice.feels_like.as_ref().and_then(|t| t.for_kind(kind));

    Ok(WeatherObservation {
        kind,
        timestamp,
        temperature_c: temperature_c.unwrap_or(0.0),
        feels_like_c: feels_like_c.unwrap_or(0.0),
        humidity_pct: slice.humidity.map(percent).unwrap_or(0),
        pressure_hpa: slice.pressure.map(|p| p.round() as i32).unwrap_or(0),
        condition_code: condition.id.and_then(whole::<i32>),
        condition_description: condition.description.unwrap_or_default(),
        icon_code: condition.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
        cloud_pct: slice.clouds.map(percent),
        dew_point_c: slice.dew_point,
        uv_index: slice.uvi.map(|u| u.max(0.0)),
        precipitation_probability: slice.pop.map(|p| p.clamp(0.0, 1.0)),
    })
}

/// Normalize a whole one-call document.
///
/// Hourly and daily lists are cut to their first 24 and 7 entries before
/// normalization. A slice that fails is logged, counted and skipped; the rest
/// of the batch is still normalized.
pub fn normalize_forecast(doc: &Value) -> Forecast {
    let raw = match RawDocument::deserialize(doc) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "One-call document has an unexpected shape");
            return Forecast::default();
        }
    };

    let timezone_offset = raw.timezone_offset.and_then(whole::<i32>).unwrap_or(0);
    let offset = FixedOffset::east_opt(timezone_offset).unwrap_or_else(|| {
        tracing::warn!(timezone_offset, "Invalid timezone offset, using UTC");
        utc()
    });

    let mut forecast = Forecast {
        timezone_offset,
        ..Forecast::default()
    };

    if let Some(current) = raw.current.as_ref() {
        match normalize_at(current, SliceKind::Current, offset) {
            Ok(obs) => forecast.current = Some(obs),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping current slice");
                forecast.skipped += 1;
            }
        }
    }

    let hourly = raw.hourly.unwrap_or_default();
    forecast.hourly = normalize_batch(
        &hourly,
        HOURLY_LIMIT,
        SliceKind::Hourly,
        offset,
        &mut forecast.skipped,
    );

    let daily = raw.daily.unwrap_or_default();
    forecast.daily = normalize_batch(
        &daily,
        DAILY_LIMIT,
        SliceKind::Daily,
        offset,
        &mut forecast.skipped,
    );

    tracing::debug!(
        hourly = forecast.hourly.len(),
        daily = forecast.daily.len(),
        skipped = forecast.skipped,
        "Normalized forecast"
    );

    forecast
}

fn normalize_batch(
    slices: &[Value],
    limit: usize,
    kind: SliceKind,
    offset: FixedOffset,
    skipped: &mut usize,
) -> Vec<WeatherObservation> {
    slices
        .iter()
        .take(limit)
        .enumerate()
        .filter_map(|(index, slice)| match normalize_at(slice, kind, offset) {
            Ok(obs) => Some(obs),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping {kind} slice");
                *skipped += 1;
                None
            }
        })
        .collect()
}

fn percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Whole numbers only; `800.0` is accepted, `800.5` is not.
fn whole<T: TryFrom<i64>>(value: f64) -> Option<T> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    T::try_from(value as i64).ok()
}

fn utc() -> FixedOffset {
    Utc.fix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const T: i64 = 1_700_000_000;

    fn full_hourly() -> Value {
        json!({
            "dt": T,
            "temp": 31.0,
            "feels_like": 33.0,
            "humidity": 85,
            "pressure": 1015,
            "clouds": 10,
            "dew_point": 22.0,
            "uvi": 8,
            "pop": 0.9,
            "weather": [{ "id": 800, "description": "clear sky", "icon": "01d" }]
        })
    }

    #[test]
    fn hourly_slice_maps_every_field() {
        let obs = normalize(&full_hourly(), SliceKind::Hourly).unwrap();

        assert_eq!(obs.kind(), SliceKind::Hourly);
        assert_eq!(obs.timestamp().timestamp(), T);
        assert_eq!(obs.temperature_c(), 31.0);
        assert_eq!(obs.feels_like_c(), 33.0);
        assert_eq!(obs.humidity_pct(), 85);
        assert_eq!(obs.pressure_hpa(), 1015);
        assert_eq!(obs.condition_code(), Some(800));
        assert_eq!(obs.condition_description(), "clear sky");
        assert_eq!(obs.icon_code(), "01d");
        assert_eq!(obs.cloud_pct(), Some(10));
        assert_eq!(obs.dew_point_c(), Some(22.0));
        assert_eq!(obs.uv_index(), Some(8.0));
        assert_eq!(obs.precipitation_probability(), Some(0.9));
    }

    #[test]
    fn daily_slice_reads_nested_day_temperature() {
        let raw = json!({
            "dt": T,
            "temp": { "day": 24.5, "min": 12.0, "max": 26.0 },
            "feels_like": { "day": 24.0, "night": 13.0 },
            "humidity": 40,
            "pressure": 1018,
            "weather": [{ "id": 500, "description": "lluvia ligera", "icon": "10d" }]
        });

        let obs = normalize(&raw, SliceKind::Daily).unwrap();
        assert_eq!(obs.temperature_c(), 24.5);
        assert_eq!(obs.feels_like_c(), 24.0);
        assert_eq!(obs.label(), "Mar, 14 nov");
    }

    #[test]
    fn shape_that_does_not_match_kind_defaults() {
        // a daily-shaped temperature on an hourly slice is not a scalar
        let raw = json!({ "dt": T, "temp": { "day": 24.5 } });
        let obs = normalize(&raw, SliceKind::Hourly).unwrap();
        assert_eq!(obs.temperature_c(), 0.0);

        let raw = json!({ "dt": T, "temp": 24.5 });
        let obs = normalize(&raw, SliceKind::Daily).unwrap();
        assert_eq!(obs.temperature_c(), 0.0);
    }

    #[test]
    fn missing_fields_degrade_to_defaults() {
        for kind in [SliceKind::Current, SliceKind::Hourly, SliceKind::Daily] {
            let obs = normalize(&json!({ "dt": T }), kind).unwrap();

            assert_eq!(obs.temperature_c(), 0.0);
            assert_eq!(obs.feels_like_c(), 0.0);
            assert_eq!(obs.humidity_pct(), 0);
            assert_eq!(obs.pressure_hpa(), 0);
            assert_eq!(obs.condition_code(), None);
            assert_eq!(obs.condition_description(), "");
            assert_eq!(obs.icon_code(), "01d");
            assert_eq!(obs.cloud_pct(), None);
            assert_eq!(obs.dew_point_c(), None);
            assert_eq!(obs.uv_index(), None);
            assert_eq!(obs.precipitation_probability(), None);
        }
    }

    #[test]
    fn wrong_typed_fields_degrade_to_defaults() {
        let raw = json!({
            "dt": T, "temp": "hot", "feels_like": "warm", "humidity": "85", "pressure": "high",
            "clouds": true, "dew_point": {}, "uvi": "high", "pop": "likely", "weather": "sunny"
        });
        let obs = normalize(&raw, SliceKind::Hourly).unwrap();

        assert_eq!(obs.temperature_c(), 0.0);
        assert_eq!(obs.feels_like_c(), 0.0);
        assert_eq!(obs.humidity_pct(), 0);
        assert_eq!(obs.pressure_hpa(), 0);
        assert_eq!(obs.condition_code(), None);
        assert_eq!(obs.icon_code(), "01d");
        assert_eq!(obs.cloud_pct(), None);
        assert_eq!(obs.dew_point_c(), None);
        assert_eq!(obs.uv_index(), None);
        assert_eq!(obs.precipitation_probability(), None);
    }

    #[test]
    fn wrong_typed_condition_fields_are_dropped_one_by_one() {
        let raw = json!({ "dt": T, "weather": [{ "id": "800", "description": 5, "icon": "10n" }] });
        let obs = normalize(&raw, SliceKind::Current).unwrap();

        assert_eq!(obs.condition_code(), None);
        assert_eq!(obs.condition_description(), "");
        assert_eq!(obs.icon_code(), "10n");
    }

    #[test]
    fn whole_float_condition_code_is_accepted() {
        let raw = json!({ "dt": T, "weather": [{ "id": 800.0 }] });
        let obs = normalize(&raw, SliceKind::Hourly).unwrap();
        assert_eq!(obs.condition_code(), Some(800));

        let raw = json!({ "dt": T, "weather": [{ "id": 800.5 }] });
        let obs = normalize(&raw, SliceKind::Hourly).unwrap();
        assert_eq!(obs.condition_code(), None);
    }

    #[test]
    fn empty_weather_list_uses_defaults() {
        let raw = json!({ "dt": T, "weather": [] });
        let obs = normalize(&raw, SliceKind::Current).unwrap();
        assert_eq!(obs.condition_description(), "");
        assert_eq!(obs.icon_code(), "01d");
        assert_eq!(obs.condition_code(), None);
    }

    #[test]
    fn zero_is_kept_distinct_from_absent() {
        let raw = json!({ "dt": T, "clouds": 0, "uvi": 0, "pop": 0, "dew_point": 0.0 });
        let obs = normalize(&raw, SliceKind::Hourly).unwrap();

        assert_eq!(obs.cloud_pct(), Some(0));
        assert_eq!(obs.uv_index(), Some(0.0));
        assert_eq!(obs.precipitation_probability(), Some(0.0));
        assert_eq!(obs.dew_point_c(), Some(0.0));
    }

    #[test]
    fn explicit_nulls_count_as_absent() {
        let raw = json!({ "dt": T, "uvi": null, "weather": null, "temp": null });
        let obs = normalize(&raw, SliceKind::Hourly).unwrap();
        assert_eq!(obs.uv_index(), None);
        assert_eq!(obs.icon_code(), "01d");
        assert_eq!(obs.temperature_c(), 0.0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let raw = json!({ "dt": T, "humidity": 140, "clouds": -5, "uvi": -1.0, "pop": 1.4 });
        let obs = normalize(&raw, SliceKind::Hourly).unwrap();

        assert_eq!(obs.humidity_pct(), 100);
        assert_eq!(obs.cloud_pct(), Some(0));
        assert_eq!(obs.uv_index(), Some(0.0));
        assert_eq!(obs.precipitation_probability(), Some(1.0));
    }

    #[test]
    fn float_integers_are_accepted() {
        let raw = json!({ "dt": T, "humidity": 55.4, "pressure": 1012.6 });
        let obs = normalize(&raw, SliceKind::Current).unwrap();
        assert_eq!(obs.humidity_pct(), 55);
        assert_eq!(obs.pressure_hpa(), 1013);
    }

    #[test]
    fn missing_dt_is_malformed() {
        for kind in [SliceKind::Current, SliceKind::Hourly, SliceKind::Daily] {
            let err = normalize(&json!({ "temp": 20.0 }), kind).unwrap_err();
            let NormalizeError::MalformedObservation { kind: got, reason } = err;
            assert_eq!(got, kind);
            assert!(reason.contains("dt"));
        }
    }

    #[test]
    fn non_integer_dt_is_malformed() {
        for dt in [json!("yesterday"), json!(1.5), json!(null)] {
            let raw = json!({ "dt": dt, "temp": 20.0 });
            let err = normalize(&raw, SliceKind::Hourly).unwrap_err();
            assert!(err.to_string().contains("dt"), "{err}");
        }
    }

    #[test]
    fn non_object_slice_is_malformed() {
        let err = normalize(&json!([1, 2, 3]), SliceKind::Hourly).unwrap_err();
        assert!(err.to_string().contains("Malformed hourly observation"));
    }

    #[test]
    fn offset_is_applied_to_labels() {
        let offset = FixedOffset::east_opt(-6 * 3600).unwrap();
        let raw = full_hourly();
        let obs = normalize_at(&raw, SliceKind::Hourly, offset).unwrap();
        assert_eq!(obs.label(), "4:13 PM");
        assert_eq!(obs.timestamp().timestamp(), T);
    }

    #[test]
    fn forecast_truncates_hourly_and_daily() {
        let hourly: Vec<_> = (0..48)
            .map(|i| json!({ "dt": T + i * 3600, "temp": i }))
            .collect();
        let daily: Vec<_> = (0..8)
            .map(|i| json!({ "dt": T + i * 86_400, "temp": { "day": i } }))
            .collect();
        let doc = json!({
            "timezone_offset": -21600,
            "current": full_hourly(),
            "hourly": hourly,
            "daily": daily
        });

        let forecast = normalize_forecast(&doc);
        assert_eq!(forecast.timezone_offset, -21600);
        assert!(forecast.current.is_some());
        assert_eq!(forecast.hourly.len(), HOURLY_LIMIT);
        assert_eq!(forecast.daily.len(), DAILY_LIMIT);
        assert_eq!(forecast.hourly[23].temperature_c(), 23.0);
        assert_eq!(forecast.daily[6].temperature_c(), 6.0);
        assert_eq!(forecast.skipped, 0);
    }

    #[test]
    fn malformed_hourly_slice_does_not_stop_batch() {
        let mut hourly: Vec<_> = (0..24)
            .map(|i| json!({ "dt": T + i * 3600, "temp": i }))
            .collect();
        hourly[5] = json!({ "temp": 99.0 });

        let forecast = normalize_forecast(&json!({ "hourly": hourly }));
        assert_eq!(forecast.hourly.len(), 23);
        assert_eq!(forecast.skipped, 1);
        assert!(forecast.hourly.iter().all(|o| o.temperature_c() != 99.0));
    }

    #[test]
    fn malformed_current_is_skipped() {
        let forecast = normalize_forecast(&json!({ "current": { "temp": 10 } }));
        assert!(forecast.current.is_none());
        assert_eq!(forecast.skipped, 1);
    }

    #[test]
    fn whole_float_timezone_offset_is_accepted() {
        let doc = json!({ "timezone_offset": -21600.0, "current": full_hourly() });
        let forecast = normalize_forecast(&doc);

        assert_eq!(forecast.timezone_offset, -21600);
        let current = forecast.current.unwrap();
        assert_eq!(current.label(), "4:13 PM");
    }

    #[test]
    fn wrong_typed_document_fields_keep_good_slices() {
        let doc = json!({
            "timezone_offset": "CST",
            "current": full_hourly(),
            "hourly": "none",
            "daily": { "dt": T }
        });
        let forecast = normalize_forecast(&doc);

        assert_eq!(forecast.timezone_offset, 0);
        assert!(forecast.current.is_some());
        assert!(forecast.hourly.is_empty());
        assert!(forecast.daily.is_empty());
        assert_eq!(forecast.skipped, 0);
        assert!(!forecast.is_empty());
    }

    #[test]
    fn unexpected_document_yields_empty_forecast() {
        assert!(normalize_forecast(&json!("nope")).is_empty());
        assert!(normalize_forecast(&json!({})).is_empty());
    }
}
