use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::model::Location;

pub const DEFAULT_UNITS: &str = "metric";
pub const DEFAULT_LANG: &str = "es";

/// Locations available even with an empty config file.
const BUILTIN_LOCATIONS: [(&str, f64, f64); 2] = [
    ("Naucalpan", 19.478484, -99.235030),
    ("Coacalco", 19.633914, -99.099352),
];

/// Coordinates of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// One Call API key.
    pub api_key: Option<String>,

    /// Units requested from the provider, "metric" unless set.
    pub units: Option<String>,

    /// Language for provider descriptions, "es" unless set.
    pub lang: Option<String>,

    /// Catalog entry used when no location is given.
    pub default_location: Option<String>,

    /// Example TOML:
    /// [locations.Naucalpan]
    /// latitude = 19.478484
    /// longitude = -99.23503
    #[serde(default)]
    pub locations: BTreeMap<String, LocationConfig>,
}

impl Config {
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `clima configure` and enter your OpenWeather API key."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn units(&self) -> &str {
        self.units.as_deref().unwrap_or(DEFAULT_UNITS)
    }

    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or(DEFAULT_LANG)
    }

    /// Built-in locations overlaid with the configured ones, sorted by name.
    pub fn catalog(&self) -> Vec<Location> {
        let mut merged: BTreeMap<String, LocationConfig> = BUILTIN_LOCATIONS
            .iter()
            .map(|(name, latitude, longitude)| {
                let cfg = LocationConfig {
                    latitude: *latitude,
                    longitude: *longitude,
                };
                (name.to_string(), cfg)
            })
            .collect();
        for (name, cfg) in &self.locations {
            merged.insert(name.clone(), *cfg);
        }

        merged
            .into_iter()
            .map(|(name, cfg)| Location::new(name, cfg.latitude, cfg.longitude))
            .collect()
    }

    /// Look a location up in the catalog, ignoring case.
    pub fn location(&self, name: &str) -> Result<Location> {
        self.catalog()
            .into_iter()
            .find(|loc| loc.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| {
                anyhow!(
                    "Unknown location '{name}'.\n\
                     Hint: run `clima locations` to list known names, or use `--search`."
                )
            })
    }

    /// The configured default location, falling back to the first catalog entry.
    pub fn default_location(&self) -> Result<Location> {
        match self.default_location.as_deref() {
            Some(name) => self.location(name),
            None => self
                .location(BUILTIN_LOCATIONS[0].0)
                .context("Built-in default location is missing from the catalog"),
        }
    }

    pub fn set_default_location(&mut self, name: &str) -> Result<()> {
        let location = self.location(name)?;
        self.default_location = Some(location.name);
        Ok(())
    }

    /// Add or replace a catalog entry.
    pub fn upsert_location(&mut self, location: &Location) {
        self.locations.insert(
            location.name.clone(),
            LocationConfig {
                latitude: location.latitude,
                longitude: location.longitude,
            },
        );
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "clima", "clima-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        assert!(err.to_string().contains("No API key configured"));
        assert!(err.to_string().contains("clima configure"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".into());
        assert!(cfg.api_key().is_err());

        cfg.set_api_key("KEY".into());
        assert_eq!(cfg.api_key().unwrap(), "KEY");
    }

    #[test]
    fn units_and_lang_have_defaults() {
        let mut cfg = Config::default();
        assert_eq!(cfg.units(), "metric");
        assert_eq!(cfg.lang(), "es");

        cfg.lang = Some("en".into());
        assert_eq!(cfg.lang(), "en");
    }

    #[test]
    fn catalog_includes_builtins() {
        let cfg = Config::default();
        let names: Vec<_> = cfg.catalog().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Coacalco", "Naucalpan"]);
    }

    #[test]
    fn configured_location_overrides_builtin() {
        let mut cfg = Config::default();
        cfg.upsert_location(&Location::new("Naucalpan", 1.0, 2.0));
        cfg.upsert_location(&Location::new("CDMX", 19.433050, -99.141453));

        let naucalpan = cfg.location("naucalpan").expect("lookup ignores case");
        assert_eq!((naucalpan.latitude, naucalpan.longitude), (1.0, 2.0));
        assert_eq!(cfg.catalog().len(), 3);
    }

    #[test]
    fn unknown_location_has_hint() {
        let err = Config::default().location("Atlantis").unwrap_err();
        assert!(err.to_string().contains("Unknown location 'Atlantis'"));
    }

    #[test]
    fn default_location_falls_back_to_first_builtin() {
        let mut cfg = Config::default();
        assert_eq!(cfg.default_location().unwrap().name, "Naucalpan");

        cfg.set_default_location("coacalco").unwrap();
        assert_eq!(cfg.default_location.as_deref(), Some("Coacalco"));
        assert_eq!(cfg.default_location().unwrap().name, "Coacalco");

        assert!(cfg.set_default_location("nowhere").is_err());
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.upsert_location(&Location::new("CDMX", 19.433050, -99.141453));
        cfg.set_default_location("CDMX").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
