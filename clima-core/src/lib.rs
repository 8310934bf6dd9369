//! Core library for the `clima` CLI.
//!
//! This crate defines:
//! - Normalization of raw one-call weather JSON into observations
//! - Rule-based advisories and the temperature trend
//! - Spanish display labels and the HTML report
//! - Configuration and the One Call HTTP source
//!
//! Everything except the HTTP source is synchronous and free of I/O.

pub mod advisory;
pub mod config;
pub mod display;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod report;

pub use advisory::{Advisory, AdvisoryCategory, AdvisorySet, advise, trend};
pub use config::{Config, LocationConfig};
pub use model::{Forecast, Location, SliceKind, WeatherObservation};
pub use normalize::{NormalizeError, normalize, normalize_at, normalize_forecast};
pub use provider::{FetchError, WeatherSource};
