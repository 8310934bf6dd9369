//! Display formatting for observations.
//!
//! Day and month names come from fixed Spanish tables rather than the host
//! locale, so labels are identical on every machine.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Weekday};
use serde::Serialize;

use crate::model::WeatherObservation;

const WEEKDAY_ABBREVS: [&str; 7] = ["lun", "mar", "mié", "jue", "vie", "sáb", "dom"];

const WEEKDAY_NAMES: [&str; 7] = [
    "lunes",
    "martes",
    "miércoles",
    "jueves",
    "viernes",
    "sábado",
    "domingo",
];

const MONTH_ABBREVS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

pub fn weekday_abbrev(weekday: Weekday) -> &'static str {
    WEEKDAY_ABBREVS[weekday.num_days_from_monday() as usize]
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAY_NAMES[weekday.num_days_from_monday() as usize]
}

/// `month0` is zero-based (January = 0), as returned by `Datelike::month0`.
pub fn month_abbrev(month0: u32) -> &'static str {
    MONTH_ABBREVS[month0 as usize % 12]
}

pub fn month_name(month0: u32) -> &'static str {
    MONTH_NAMES[month0 as usize % 12]
}

/// `9:05 AM`: 12-hour clock without a leading zero on the hour.
pub fn hour_label(ts: &DateTime<FixedOffset>) -> String {
    ts.format("%-I:%M %p").to_string()
}

/// `Mar, 14 nov`
pub fn day_label(ts: &DateTime<FixedOffset>) -> String {
    format!(
        "{}, {:02} {}",
        capitalize(weekday_abbrev(ts.weekday())),
        ts.day(),
        month_abbrev(ts.month0())
    )
}

/// `Martes, 14 nov`, used to separate hourly entries by day.
pub fn day_header(ts: &DateTime<FixedOffset>) -> String {
    format!(
        "{}, {:02} {}",
        capitalize(weekday_name(ts.weekday())),
        ts.day(),
        month_abbrev(ts.month0())
    )
}

/// `14 - noviembre - 2023 10:13 PM`
pub fn long_datetime_label(ts: &DateTime<FixedOffset>) -> String {
    format!(
        "{:02} - {} - {} {}",
        ts.day(),
        month_name(ts.month0()),
        ts.year(),
        ts.format("%I:%M %p")
    )
}

/// Emoji for an OpenWeather icon code such as `01d` or `10n`.
pub fn icon_emoji(icon_code: &str) -> &'static str {
    match icon_code {
        "01d" => "☀️",
        "01n" => "🌙",
        "02d" | "02n" => "🌤️",
        "03d" | "03n" | "04d" | "04n" => "☁️",
        "09d" | "09n" => "🌧️",
        "10d" | "10n" => "🌦️",
        "11d" | "11n" => "⛈️",
        "13d" | "13n" => "❄️",
        "50d" | "50n" => "🌫️",
        _ => "❓",
    }
}

/// Uppercases the first character, leaving the rest untouched.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Consecutive observations that fall on the same local calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    pub header: String,
    pub observations: Vec<&'a WeatherObservation>,
}

pub fn group_by_day(observations: &[WeatherObservation]) -> Vec<DayGroup<'_>> {
    let mut groups: Vec<DayGroup<'_>> = Vec::new();

    for obs in observations {
        let date = obs.timestamp().date_naive();
        match groups.last_mut() {
            Some(group) if group.date == date => group.observations.push(obs),
            _ => groups.push(DayGroup {
                date,
                header: day_header(&obs.timestamp()),
                observations: vec![obs],
            }),
        }
    }

    groups
}
