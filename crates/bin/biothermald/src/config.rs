//! Configuration loading: YAML file, add-on options, then environment
//! variable overrides.
//!
//! Every section except `homeassistant` has sensible defaults. The access
//! token is resolved from, in increasing precedence:
//! 1. `homeassistant.token` (or the legacy top-level `homeassistant_token`)
//! 2. `credential_secret` in the add-on options file `/data/options.json`
//! 3. the `BIOTHERMAL_HA_TOKEN` environment variable

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use biothermal_adapter_homeassistant::HomeAssistantConfig;
use biothermal_app::services::dashboard_service::SensorSettings;
use biothermal_app::services::thermal_control::ControlSettings;
use biothermal_domain::entity_id::EntityId;
use biothermal_domain::thermostat::ThermostatSelection;

/// Options file written by the HomeAssistant supervisor for add-ons.
pub const ADDON_OPTIONS_PATH: &str = "/data/options.json";

/// Tokens shorter than this are treated as unset.
const MIN_TOKEN_LEN: usize = 10;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub homeassistant: HomeAssistantSection,
    /// Legacy flat key, used when `homeassistant.token` is absent.
    pub homeassistant_token: Option<String>,
    pub sensors: SensorsConfig,
    /// Thermostat selected at startup.
    pub thermostat: Option<String>,
    pub classifier: ClassifierConfig,
    pub dashboard: DashboardConfig,
    pub control: ControlConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// HomeAssistant connection.
#[derive(Deserialize)]
#[serde(default)]
pub struct HomeAssistantSection {
    pub host: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for HomeAssistantSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeAssistantSection")
            .field("host", &self.host)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Smartwatch entities polled for the dashboard.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    pub wrist_temperature: String,
    pub heart_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Path of the JSON model artifact.
    pub model_path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Poll interval, also used for the page's auto-refresh.
    pub refresh_seconds: u64,
}

/// Thermal control loop.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Send HVAC commands. Dry-run (log only) when `false`.
    pub enabled: bool,
    pub history_hours: u32,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    pub port: u16,
    /// Directory served under `/assets`.
    pub assets_dir: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Subset of the add-on options file we read.
#[derive(Debug, Deserialize)]
struct AddonOptions {
    #[serde(default)]
    credential_secret: Option<String>,
}

impl Config {
    /// Load configuration from `path`, then apply the add-on options file
    /// (if present) and environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `path` does not exist, other
    /// variants when a file cannot be read or parsed, and
    /// [`ConfigError::Validation`] when the result is not usable.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path.as_ref())?;
        config.apply_addon_options(Path::new(ADDON_OPTIONS_PATH))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::Missing(path.to_path_buf()));
            }
            Err(err) => return Err(ConfigError::Io(err)),
        };
        let mut config: Self = serde_yaml::from_str(&content)?;
        let legacy = config.homeassistant_token.take();
        if config.homeassistant.token.is_none() {
            config.homeassistant.token = legacy;
        }
        Ok(config)
    }

    fn apply_addon_options(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(ConfigError::Io(err)),
        };
        let options: AddonOptions = serde_json::from_str(&content)?;
        if let Some(secret) = options
            .credential_secret
            .filter(|secret| secret.len() >= MIN_TOKEN_LEN)
        {
            self.homeassistant.token = Some(secret);
        }
        Ok(())
    }

    /// Apply overrides looked up by variable name.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("BIOTHERMAL_HA_HOST") {
            self.homeassistant.host = val;
        }
        if let Some(val) = var("BIOTHERMAL_HA_TOKEN") {
            self.homeassistant.token = Some(val);
        }
        if let Some(val) = var("BIOTHERMAL_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("BIOTHERMAL_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("BIOTHERMAL_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("BIOTHERMAL_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match &self.homeassistant.token {
            None => return Err(ConfigError::Validation("homeassistant token is missing".to_string())),
            Some(token) if token.len() < MIN_TOKEN_LEN => {
                return Err(ConfigError::Validation(format!(
                    "homeassistant token must be at least {MIN_TOKEN_LEN} characters"
                )));
            }
            Some(_) => {}
        }
        let host = &self.homeassistant.host;
        if !host.starts_with("http://") && !host.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "homeassistant host {host:?} must start with http:// or https://"
            )));
        }
        if self.homeassistant.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "homeassistant timeout must be non-zero".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.dashboard.refresh_seconds == 0 {
            return Err(ConfigError::Validation(
                "refresh interval must be non-zero".to_string(),
            ));
        }
        if self.control.history_hours == 0 {
            return Err(ConfigError::Validation(
                "control history must keep at least one hour".to_string(),
            ));
        }
        self.sensor_settings()?;
        self.thermostat_selection()?;
        Ok(())
    }

    /// Connection settings for the HomeAssistant client.
    #[must_use]
    pub fn home_assistant(&self) -> HomeAssistantConfig {
        HomeAssistantConfig {
            host: self.homeassistant.host.clone(),
            token: self.homeassistant.token.clone().unwrap_or_default(),
            timeout: Duration::from_secs(self.homeassistant.timeout_secs),
        }
    }

    /// Entities polled by the dashboard.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for malformed entity ids.
    pub fn sensor_settings(&self) -> Result<SensorSettings, ConfigError> {
        let heart_rate = self
            .sensors
            .heart_rate
            .as_deref()
            .map(parse_entity)
            .transpose()?;
        Ok(SensorSettings {
            wrist_temperature: parse_entity(&self.sensors.wrist_temperature)?,
            heart_rate,
        })
    }

    /// The thermostat selected at startup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for malformed or non-climate ids.
    pub fn thermostat_selection(&self) -> Result<ThermostatSelection, ConfigError> {
        match self.thermostat.as_deref() {
            None => Ok(ThermostatSelection::none()),
            Some(raw) => ThermostatSelection::select(parse_entity(raw)?)
                .map_err(|err| ConfigError::Validation(err.to_string())),
        }
    }

    #[must_use]
    pub fn control_settings(&self) -> ControlSettings {
        ControlSettings {
            enabled: self.control.enabled,
            history_hours: self.control.history_hours,
        }
    }

    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.dashboard.refresh_seconds)
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_entity(raw: &str) -> Result<EntityId, ConfigError> {
    EntityId::parse(raw).map_err(|err| ConfigError::Validation(err.to_string()))
}

impl Default for HomeAssistantSection {
    fn default() -> Self {
        Self {
            host: "http://homeassistant.local:8123".to_string(),
            token: None,
            timeout_secs: 10,
        }
    }
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            wrist_temperature: "sensor.wrist_temperature".to_string(),
            heart_rate: None,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("assets/model/comfort_stumps.json"),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { refresh_seconds: 5 }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            history_hours: 8,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8050,
            assets_dir: PathBuf::from("assets"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "biothermald=info,biothermal=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file {} not found", .0.display())]
    Missing(PathBuf),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// YAML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] serde_yaml::Error),
    /// The add-on options file is not valid JSON.
    #[error("failed to parse add-on options")]
    AddonOptions(#[from] serde_json::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
