use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::provider::ProviderId;

/// Configuration for a single geocoding provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 3001 }
    }
}

/// Burn category feature service and the jurisdiction it covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FireServiceConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub region: String,
    pub authority: String,
    pub country: String,
}

impl Default for FireServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gis-erd-der.gnb.ca/gisserver/rest/services/FireWeather/BurnCategories/MapServer/0"
                .to_string(),
            user_agent: "CanIBurnAPI/1.0".to_string(),
            timeout_secs: 10,
            region: "New Brunswick".to_string(),
            authority: "New Brunswick Department of Natural Resources and Energy Development"
                .to_string(),
            country: "Canada".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Providers tried in sequence; the first success wins.
    pub order: Vec<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub locationiq_base_url: String,
    pub openstreetmap_base_url: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            order: ProviderId::all().iter().map(|id| id.as_str().to_string()).collect(),
            user_agent: "CanIBurnAPI/1.0".to_string(),
            timeout_secs: 10,
            locationiq_base_url: "https://us1.locationiq.com".to_string(),
            openstreetmap_base_url: "https://nominatim.openstreetmap.org".to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub fire_service: FireServiceConfig,
    pub geocoding: GeocodingConfig,

    /// Example TOML:
    /// [providers.locationiq]
    /// api_key = "..."
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    /// Load config from disk (or defaults) and apply process environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.check_timeouts()?;
        Ok(cfg)
    }

    /// A zero timeout would fail every upstream request immediately.
    fn check_timeouts(&self) -> Result<()> {
        if self.fire_service.timeout_secs == 0 {
            bail!("fire_service.timeout_secs must be greater than zero");
        }
        if self.geocoding.timeout_secs == 0 {
            bail!("geocoding.timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Override settings from environment-style variables.
    ///
    /// Recognised keys: `HOST`, `PORT`, `LOCATIONIQ_API_KEY`, `FIRE_SERVICE_URL`,
    /// `UPSTREAM_TIMEOUT_SECS`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("PORT") {
            self.server.port =
                port.parse().with_context(|| format!("PORT must be a port number, got '{port}'"))?;
        }

        if let Some(key) = lookup("LOCATIONIQ_API_KEY").filter(|k| !k.is_empty()) {
            self.providers.insert(ProviderId::LocationIq.as_str().to_string(), ProviderConfig {
                api_key: key,
            });
        }

        if let Some(url) = lookup("FIRE_SERVICE_URL") {
            self.fire_service.base_url = url;
        }

        if let Some(secs) = lookup("UPSTREAM_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("UPSTREAM_TIMEOUT_SECS must be an integer, got '{secs}'"))?;
            if secs == 0 {
                bail!("UPSTREAM_TIMEOUT_SECS must be greater than zero");
            }
            self.fire_service.timeout_secs = secs;
            self.geocoding.timeout_secs = secs;
        }

        Ok(())
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "can-i-burn", "canburn")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Geocoding providers in configured order. Unknown names are an error.
    pub fn geocoder_order(&self) -> Result<Vec<ProviderId>> {
        self.geocoding.order.iter().map(|name| ProviderId::try_from(name.as_str())).collect()
    }

    /// Set or replace a provider API key.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers.get(provider_id.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        !provider_id.requires_api_key() || self.provider_api_key(provider_id).is_some()
    }
}
