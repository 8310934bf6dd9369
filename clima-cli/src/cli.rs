use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use clima_core::{
    Config,
    FetchError,
    Forecast,
    Location,
    WeatherSource,
    normalize_forecast,
    provider::source_from_config,
    report::{self, DEFAULT_HOURS_LIMIT},
};
use inquire::{Password, Select, Text};
use std::{fs, path::PathBuf};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "clima", version, about = "Weather CLI with advisories")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Which location to query.
#[derive(Debug, Args)]
pub struct Target {
    /// Catalog name, e.g. "Naucalpan". Defaults to the configured location.
    pub location: Option<String>,

    /// Free-text place to geocode instead of a catalog name.
    #[arg(long, conflicts_with = "location")]
    pub search: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, units, language and default location.
    Configure,

    /// List catalog locations.
    Locations,

    /// Show current conditions with advisories, then the hourly or daily list.
    Show {
        #[command(flatten)]
        target: Target,

        /// List the next 7 days instead of the next 24 hours.
        #[arg(long)]
        daily: bool,

        /// Print the normalized data and advisories as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the temperature trend.
    Trend {
        #[command(flatten)]
        target: Target,

        /// Daily trend instead of hourly.
        #[arg(long)]
        daily: bool,
    },

    /// Build the HTML report for one or more catalog locations.
    Report {
        /// Catalog names; all catalog locations when omitted.
        locations: Vec<String>,

        /// Hourly entries per location.
        #[arg(long, default_value_t = DEFAULT_HOURS_LIMIT)]
        hours: usize,

        /// Write the report to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Locations => {
                let config = Config::load()?;
                output::print_locations(&config);
                Ok(())
            }
            Command::Show {
                target,
                daily,
                json,
            } => {
                let config = Config::load()?;
                let source = source_from_config(&config)?;
                let location = resolve_location(&config, source.as_ref(), &target).await?;
                let forecast = fetch_forecast(source.as_ref(), &location).await?;

                if json {
                    output::print_json(&location, &forecast)
                } else {
                    output::print_show(&location, &forecast, daily);
                    Ok(())
                }
            }
            Command::Trend { target, daily } => {
                let config = Config::load()?;
                let source = source_from_config(&config)?;
                let location = resolve_location(&config, source.as_ref(), &target).await?;
                let forecast = fetch_forecast(source.as_ref(), &location).await?;

                output::print_trend(&location, &forecast, daily);
                Ok(())
            }
            Command::Report {
                locations,
                hours,
                output,
            } => {
                let config = Config::load()?;
                let source = source_from_config(&config)?;
                build_report(&config, source.as_ref(), &locations, hours, output).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Used for the One Call 3.0 and geocoding endpoints")
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key cannot be empty");
    }
    config.set_api_key(api_key.trim().to_string());

    let units = Select::new("Units:", vec!["metric", "imperial", "standard"])
        .prompt()
        .context("Failed to read units")?;
    config.units = Some(units.to_string());

    let lang = Text::new("Description language:")
        .with_default(config.lang())
        .prompt()
        .context("Failed to read language")?;
    config.lang = Some(lang.trim().to_string());

    let names: Vec<String> = config.catalog().into_iter().map(|l| l.name).collect();
    let default = Select::new("Default location:", names)
        .prompt()
        .context("Failed to read default location")?;
    config.set_default_location(&default)?;

    let path = config.save()?;
    println!("✅ Configuración guardada en {}", path.display());
    Ok(())
}

async fn resolve_location(
    config: &Config,
    source: &dyn WeatherSource,
    target: &Target,
) -> anyhow::Result<Location> {
    match (&target.search, &target.location) {
        (Some(query), _) => source.geocode(query).await.map_err(no_data),
        (None, Some(name)) => config.location(name),
        (None, None) => config.default_location(),
    }
}

async fn fetch_forecast(
    source: &dyn WeatherSource,
    location: &Location,
) -> anyhow::Result<Forecast> {
    let doc = source.fetch(location).await.map_err(no_data)?;
    let forecast = normalize_forecast(&doc);

    if forecast.is_empty() {
        return Err(anyhow!("No hay datos disponibles para {}.", location.name));
    }
    if forecast.skipped > 0 {
        tracing::warn!(
            skipped = forecast.skipped,
            location = %location.name,
            "Some slices were dropped"
        );
    }

    Ok(forecast)
}

async fn build_report(
    config: &Config,
    source: &dyn WeatherSource,
    names: &[String],
    hours: usize,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let locations = if names.is_empty() {
        config.catalog()
    } else {
        names
            .iter()
            .map(|n| config.location(n))
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    let mut sections = Vec::new();
    for location in &locations {
        let name = &location.name;
        let doc = match source.fetch(location).await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    retryable = e.is_retryable(),
                    location = %name,
                    "Fetch failed"
                );
                let message = e.user_message();
                eprintln!("❌ No se pudo obtener información para {name}. {message}");
                continue;
            }
        };

        let forecast = normalize_forecast(&doc);
        match report::render_location(name, &forecast, hours) {
            Some(section) => sections.push(section),
            None => eprintln!("❌ Información actual no disponible para {name}."),
        }
    }

    let Some(html) = report::render_report(sections) else {
        eprintln!("❌ No se pudo generar ningún informe de clima.");
        return Ok(());
    };

    match output {
        Some(path) => {
            fs::write(&path, html)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            println!(
                "✅ {} guardado en {}",
                report::REPORT_SUBJECT,
                path.display()
            );
        }
        None => println!("{html}"),
    }

    Ok(())
}

fn no_data(err: FetchError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}
