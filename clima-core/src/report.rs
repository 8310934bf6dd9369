//! HTML weather report, one section per location.
//!
//! Only produces markup; handing it to a mail transport is up to the caller.

use std::fmt::Write;

use crate::{
    advisory::{self, AdvisoryCategory},
    display::{capitalize, long_datetime_label},
    model::{Forecast, WeatherObservation},
};

pub const DEFAULT_HOURS_LIMIT: usize = 6;

pub const REPORT_SUBJECT: &str = "Informe del clima";

const CARD_STYLE: &str =
    "border:1px solid #ccc; border-radius:8px; padding:12px; margin-bottom:16px;";
const HOUR_CARD_STYLE: &str =
    "border:1px solid #eee; border-radius:6px; padding:8px; margin-bottom:8px;";
const HEADING_STYLE: &str = "color:#2d6cdf;";

/// Section for one location, or `None` when there is no current data to show.
pub fn render_location(
    location_name: &str,
    forecast: &Forecast,
    hours_limit: usize,
) -> Option<String> {
    let current = forecast.current.as_ref()?;
    let mut html = render_current(location_name, current);

    if forecast.hourly.is_empty() {
        tracing::info!(location = location_name, "No hourly data");
    } else {
        html.push_str(&render_hourly(location_name, &forecast.hourly, hours_limit));
    }

    Some(html)
}

/// Wraps sections into a document; `None` when there is nothing to send.
pub fn render_report<I>(sections: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let body: String = sections.into_iter().collect();
    if body.is_empty() {
        return None;
    }
    Some(format!("<html><body>{body}</body></html>"))
}

fn render_current(location_name: &str, obs: &WeatherObservation) -> String {
    let mut html = format!("\n<div style='{CARD_STYLE}'>");
    let _ = write!(
        html,
        "\n    <h2 style='{HEADING_STYLE}'>Clima actual en {} {}</h2>\n    <ul>",
        escape(location_name),
        long_datetime_label(&obs.timestamp())
    );

    for line in detail_lines(obs, false) {
        let _ = write!(html, "\n        <li>{line}</li>");
    }

    html.push_str("\n    </ul>\n</div>\n");
    html
}

fn render_hourly(location_name: &str, hours: &[WeatherObservation], limit: usize) -> String {
    let mut html = String::from("<div style='margin-bottom:24px;'>");
    let _ = write!(
        html,
        "<h3 style='{HEADING_STYLE}'>Pronóstico horario para {} próximas {limit} horas</h3>",
        escape(location_name)
    );

    for obs in hours.iter().take(limit) {
        let _ = write!(
            html,
            "\n<div style='{HOUR_CARD_STYLE}'>\n    <b>🕒 {}</b><br>",
            obs.label()
        );
        for line in detail_lines(obs, true) {
            let _ = write!(html, "\n    {line}<br>");
        }
        html.push_str("\n</div>\n");
    }

    html.push_str("</div>");
    html
}

fn detail_lines(obs: &WeatherObservation, with_precipitation: bool) -> Vec<String> {
    let description = match obs.condition_description() {
        "" => "Sin descripción".to_string(),
        text => capitalize(text),
    };
    let condition_label = AdvisoryCategory::Condition.label();
    let condition = advisory::condition_message(obs.condition_code());
    let spread = advisory::dew_point_spread_message(Some(obs.temperature_c()), obs.dew_point_c());
    let spread = if spread.is_empty() { "-" } else { spread };

    let mut lines = vec![
        format!(
            "🌡️ <b>Temperatura:</b> {}°C | <b>Sensación térmica:</b> {}°C",
            obs.temperature_c(),
            obs.feels_like_c()
        ),
        format!("📝 <b>Descripción:</b> {}", escape(&description)),
        format!("💡 <b>{condition_label}:</b> {condition}"),
        reading(
            "🧭 <b>Presión:</b>",
            Some(format!("{} hPa", obs.pressure_hpa())),
            advisory::pressure_message(obs.pressure_hpa()),
        ),
        reading(
            "💧 <b>Humedad:</b>",
            Some(format!("{}%", obs.humidity_pct())),
            advisory::humidity_message(obs.humidity_pct()),
        ),
        reading(
            "☀️ <b>Índice UV:</b>",
            obs.uv_index().map(|uvi| uvi.to_string()),
            obs.uv_index().map_or("", advisory::uv_message),
        ),
        reading(
            "☁️ <b>Nubes:</b>",
            obs.cloud_pct().map(|pct| format!("{pct}%")),
            obs.cloud_pct().map_or("", advisory::clouds_message),
        ),
        reading(
            "🧊 <b>Punto de rocío:</b>",
            obs.dew_point_c().map(|dew| format!("{dew}°C")),
            obs.dew_point_c().map_or("", advisory::dew_point_message),
        ),
        format!("🔎 <b>Diferencia temp/punto de rocío:</b> {spread}"),
    ];

    if with_precipitation {
        let label = "☔ <b>Prob. de precipitación:</b>";
        lines.push(match obs.precipitation_probability() {
            Some(pop) => reading(
                label,
                Some(format!("{:.0}%", pop * 100.0)),
                advisory::precipitation_message(pop),
            ),
            None => format!("{label} {}", advisory::NO_RAIN_EXPECTED),
        });
    }

    lines
}

/// `label value - message`. A missing value prints as `-`, an empty message
/// drops the separator.
fn reading(label: &str, value: Option<String>, message: &str) -> String {
    let value = value.unwrap_or_else(|| "-".to_string());
    if message.is_empty() {
        format!("{label} {value}")
    } else {
        format!("{label} {value} - {message}")
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
