use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::{
    config::{DEFAULT_LANG, DEFAULT_UNITS},
    model::Location,
};

use super::{FetchError, WeatherSource};

const OPENWEATHER_BASE: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenWeather One Call 3.0 plus the direct geocoding endpoint.
#[derive(Debug, Clone)]
pub struct OneCallClient {
    api_key: String,
    units: String,
    lang: String,
    base_url: String,
    http: Client,
}

impl OneCallClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            units: DEFAULT_UNITS.to_string(),
            lang: DEFAULT_LANG.to_string(),
            base_url: OPENWEATHER_BASE.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Point the client at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(FetchError::InvalidApiKey);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct GeoEntry {
    name: String,
    lat: f64,
    lon: f64,
    state: Option<String>,
    country: Option<String>,
}

impl GeoEntry {
    fn display_name(&self) -> String {
        let parts = [
            Some(self.name.as_str()),
            self.state.as_deref(),
            self.country.as_deref(),
        ];
        parts
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[async_trait]
impl WeatherSource for OneCallClient {
    #[instrument(skip(self), fields(location = %location.name), level = "info")]
    async fn fetch(&self, location: &Location) -> Result<serde_json::Value, FetchError> {
        let body = self
            .get_text(
                "/data/3.0/onecall",
                &[
                    ("lat", location.latitude.to_string()),
                    ("lon", location.longitude.to_string()),
                    ("units", self.units.clone()),
                    ("exclude", "minutely".to_string()),
                    ("lang", self.lang.clone()),
                ],
            )
            .await?;

        let doc: serde_json::Value = serde_json::from_str(&body)?;
        tracing::debug!(bytes = body.len(), "Fetched one-call document");
        Ok(doc)
    }

    #[instrument(skip(self), level = "info")]
    async fn geocode(&self, query: &str) -> Result<Location, FetchError> {
        let body = self
            .get_text(
                "/geo/1.0/direct",
                &[("q", query.to_string()), ("limit", "1".to_string())],
            )
            .await?;

        let entries: Vec<GeoEntry> = serde_json::from_str(&body)?;
        let entry = entries
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::LocationNotFound(query.to_string()))?;

        let location = Location::new(entry.display_name(), entry.lat, entry.lon);
        tracing::info!(
            name = %location.name,
            lat = location.latitude,
            lon = location.longitude,
            "Geocoded"
        );
        Ok(location)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
