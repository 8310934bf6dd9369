use crate::{Config, model::Location, provider::onecall::OneCallClient};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

pub mod onecall;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    /// Message shown to the user in place of weather data.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "No hay datos disponibles: error de red. Revisa tu conexión.".to_string()
            }
            Self::InvalidApiKey => {
                "No hay datos disponibles: la API key no es válida. Ejecuta `clima configure`."
                    .to_string()
            }
            Self::Status { status, .. } => {
                format!("No hay datos disponibles: el servicio respondió {status}.")
            }
            Self::LocationNotFound(query) => {
                format!("No hay datos disponibles: no se encontró la ubicación '{query}'.")
            }
            Self::Parse(_) => {
                "No hay datos disponibles: respuesta inválida del servicio.".to_string()
            }
        }
    }

    /// Whether trying again later might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Source of raw one-call documents and geocoding results.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Raw one-call document for `location`.
    async fn fetch(&self, location: &Location) -> Result<serde_json::Value, FetchError>;

    /// Resolve free text such as "Toluca, MX" to coordinates.
    async fn geocode(&self, query: &str) -> Result<Location, FetchError>;
}

/// Construct the One Call source from config.
pub fn source_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherSource>> {
    let api_key = config.api_key()?;
    let client = OneCallClient::new(api_key.to_owned())
        .with_units(config.units())
        .with_lang(config.lang());

    Ok(Box::new(client))
}
