/*
[INPUT]:  YAML configuration file and GEOTASK__* environment overrides
[OUTPUT]: Parsed application configuration
[POS]:    Configuration layer - backend, map and location setup
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use geotask_gateway::{ClientConfig, Coordinate, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};

/// Prefix for environment overrides, e.g. `GEOTASK__API__BASE_URL`
pub const ENV_PREFIX: &str = "GEOTASK";

/// Top-level configuration for the client
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Task backend connection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

/// Map rendering
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MapConfig {
    /// Center used when a task has no coordinate or device location fails
    #[serde(default = "default_center")]
    pub default_center: Coordinate,
    /// Longitude degrees visible across a map widget
    #[serde(default = "default_span_degrees")]
    pub span_degrees: f64,
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_center: default_center(),
            span_degrees: default_span_degrees(),
            attribution: default_attribution(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    /// Look the position up over HTTP (IP geolocation)
    Ip,
    /// Always report `location.fixed`
    Fixed,
    /// Behave like a user who denied the permission
    Disabled,
}

/// Device location lookup
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationConfig {
    #[serde(default = "default_location_source")]
    pub provider: LocationSource,
    #[serde(default = "default_location_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub fixed: Option<Coordinate>,
    #[serde(default = "default_location_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            provider: default_location_source(),
            endpoint: default_location_endpoint(),
            fixed: None,
            timeout_ms: default_location_timeout_ms(),
            high_accuracy: default_high_accuracy(),
        }
    }
}

/// Terminal UI behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    #[serde(default = "default_toast_ms")]
    pub toast_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            toast_ms: default_toast_ms(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_center() -> Coordinate {
    Coordinate::new(52.520008, 13.404954)
}

fn default_span_degrees() -> f64 {
    8.0
}

fn default_attribution() -> String {
    "Map outline: Natural Earth".to_string()
}

fn default_location_source() -> LocationSource {
    LocationSource::Ip
}

fn default_location_endpoint() -> String {
    "http://ip-api.com/json/".to_string()
}

fn default_location_timeout_ms() -> u64 {
    5000
}

fn default_high_accuracy() -> bool {
    true
}

fn default_toast_ms() -> u64 {
    2000
}

/// `<config_dir>/geotask/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("geotask").join("config.yaml"))
}

impl AppConfig {
    /// Load configuration from an optional YAML file layered with environment overrides
    ///
    /// A missing file is not an error: defaults and environment still apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(false),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build().context("build configuration")?;
        let config: Self = settings
            .try_deserialize()
            .context("deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file only
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content).context("parse config yaml")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("serialize config to yaml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(anyhow!("api.base_url cannot be empty"));
        }
        if !self.map.default_center.is_valid() {
            return Err(anyhow!(
                "map.default_center is out of range: {}",
                self.map.default_center
            ));
        }
        if !(self.map.span_degrees > 0.0 && self.map.span_degrees <= 360.0) {
            return Err(anyhow!("map.span_degrees must be in (0, 360]"));
        }
        if self.location.provider == LocationSource::Fixed {
            match self.location.fixed {
                Some(fixed) if fixed.is_valid() => {}
                Some(fixed) => return Err(anyhow!("location.fixed is out of range: {fixed}")),
                None => return Err(anyhow!("location.provider is fixed but location.fixed is missing")),
            }
        }
        Ok(())
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_millis(self.location.timeout_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.ui.toast_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.location.provider, LocationSource::Ip);
        assert_eq!(config.location_timeout(), Duration::from_secs(5));
        assert_eq!(config.toast_duration(), Duration::from_secs(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
api:
  base_url: "http://tasks.local:8080"
location:
  provider: fixed
  fixed:
    latitude: 48.137154
    longitude: 11.576124
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).expect("parse yaml");
        assert_eq!(config.api.base_url, "http://tasks.local:8080");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.location.provider, LocationSource::Fixed);
        assert_eq!(
            config.location.fixed,
            Some(Coordinate::new(48.137154, 11.576124))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fixed_provider_requires_coordinate() {
        let mut config = AppConfig::default();
        config.location.provider = LocationSource::Fixed;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_roundtrip_through_file() {
        let dir = std::env::temp_dir().join(format!("geotask-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("config.yaml");
        let mut config = AppConfig::default();
        config.map.span_degrees = 2.5;
        std::fs::write(&path, config.to_yaml().expect("yaml")).expect("write config");

        let loaded = AppConfig::from_file(&path).expect("load config");
        assert_eq!(loaded.map.span_degrees, 2.5);

        let layered = AppConfig::load(Some(&path)).expect("load layered config");
        assert_eq!(layered.map.span_degrees, 2.5);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("geotask-does-not-exist.yaml");
        let config = AppConfig::load(Some(&path)).expect("load defaults");
        assert_eq!(config.map.default_center, Coordinate::new(52.520008, 13.404954));
    }
}
