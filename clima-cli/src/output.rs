//! Terminal rendering for `show`, `trend` and `locations`.

use clima_core::{
    AdvisorySet,
    Config,
    Forecast,
    Location,
    WeatherObservation,
    advise,
    display::{capitalize, group_by_day},
    trend,
};
use serde::Serialize;

const BAR_WIDTH: f64 = 30.0;

pub fn print_locations(config: &Config) {
    let default = config.default_location().ok().map(|l| l.name);

    for location in config.catalog() {
        let marker = if default.as_deref() == Some(location.name.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:<20} {:>10.6} {:>11.6}",
            location.name, location.latitude, location.longitude
        );
    }
}

pub fn print_show(location: &Location, forecast: &Forecast, daily: bool) {
    println!(
        "📍 {} ({:.4}, {:.4})",
        location.name, location.latitude, location.longitude
    );

    if let Some(current) = &forecast.current {
        println!();
        println!(
            "Ahora · {}  {} {}",
            current.label(),
            current.emoji(),
            description(current)
        );
        print_details(current);
        print_advisories(&advise(current));
    }

    println!();
    if daily {
        println!("Próximos días");
        for day in &forecast.daily {
            let (label, emoji) = (day.label(), day.emoji());
            println!("  {label} {emoji}  {:.0}°C", day.temperature_c());
        }
    } else {
        println!("Próximas horas");
        for group in group_by_day(&forecast.hourly) {
            println!("  {}", group.header);
            for hour in group.observations {
                let (label, emoji) = (hour.label(), hour.emoji());
                println!("    {label} | {:.1}°C | {emoji}", hour.temperature_c());
            }
        }
    }
}

fn print_details(obs: &WeatherObservation) {
    let (temperature, feels_like) = (obs.temperature_c(), obs.feels_like_c());
    let (humidity, pressure) = (obs.humidity_pct(), obs.pressure_hpa());
    println!("  🌡️ {temperature} °C  (sensación {feels_like} °C)");
    println!("  💧 {humidity}%  |  ⬇️ {pressure} hPa");
    println!(
        "  ☁️ Nubes: {}%  |  🧊 Punto de rocío: {}°C  |  ☀️ UV: {}",
        or_dash(obs.cloud_pct()),
        or_dash(obs.dew_point_c()),
        or_dash(obs.uv_index())
    );
}

fn print_advisories(set: &AdvisorySet) {
    for advisory in set {
        println!("  • {}: {}", advisory.category.label(), advisory.message);
    }
}

#[derive(Serialize)]
struct ShowOutput<'a> {
    location: &'a Location,
    forecast: &'a Forecast,
    advisories: Option<AdvisorySet>,
    hourly_trend: Vec<f64>,
    daily_trend: Vec<f64>,
}

pub fn print_json(location: &Location, forecast: &Forecast) -> anyhow::Result<()> {
    let out = ShowOutput {
        location,
        forecast,
        advisories: forecast.current.as_ref().map(advise),
        hourly_trend: trend(&forecast.hourly),
        daily_trend: trend(&forecast.daily),
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

pub fn print_trend(location: &Location, forecast: &Forecast, daily: bool) {
    let (title, observations) = if daily {
        ("Próximos días", &forecast.daily)
    } else {
        ("Próximas horas", &forecast.hourly)
    };

    println!("{title} · {}", location.name);

    let temps = trend(observations);
    let min = temps.iter().copied().fold(f64::INFINITY, f64::min);
    let max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    for (obs, temp) in observations.iter().zip(&temps) {
        let fill = bar(*temp, min, max);
        println!("{:>12}  {:>6.1}°C  {fill}", obs.label(), temp);
    }
}

/// Horizontal bar scaled between the series minimum and maximum.
fn bar(value: f64, min: f64, max: f64) -> String {
    let span = max - min;
    let fraction = if span > 0.0 { (value - min) / span } else { 1.0 };
    let width = 1 + (fraction * (BAR_WIDTH - 1.0)).round() as usize;
    "█".repeat(width)
}

fn description(obs: &WeatherObservation) -> String {
    capitalize(obs.condition_description())
}

fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
