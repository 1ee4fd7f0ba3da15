//! Configuration loading for the weather agent.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

use crate::envelope::Address;
use crate::error::AgentError;

/// Default OpenWeatherMap current-weather endpoint.
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Top-level agent configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub weather: WeatherConfig,
}

/// Identity and liveness settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Agent name, the last segment of its address
    pub name: String,
    /// Deployment scope (overridden by MOODRELAY_SCOPE)
    pub scope: String,
    /// Interval between health heartbeats
    pub heartbeat_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "weather_agent".to_string(),
            scope: "local".to_string(),
            heartbeat_secs: 5,
        }
    }
}

impl AgentConfig {
    /// Address this agent listens on: `moodrelay/{scope}/{name}`.
    pub fn address(&self) -> Address {
        let scope = std::env::var("MOODRELAY_SCOPE").unwrap_or_else(|_| self.scope.clone());
        Address::for_agent(&scope, &self.name)
    }
}

/// Weather provider settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_URL.to_string(),
            api_key_env: "OPENWEATHER_API_KEY".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Load configuration from a YAML file.
///
/// # Example
///
/// ```rust,ignore
/// let config: Config = load_config("config.yaml")?;
/// ```
pub fn load_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, AgentError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AgentError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

    serde_yaml::from_str(&contents)
        .map_err(|e| AgentError::Parse(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Load configuration from a file, or use default if file doesn't exist.
pub fn load_config_or_default<T: DeserializeOwned + Default>(
    path: impl AsRef<Path>,
) -> Result<T, AgentError> {
    let path = path.as_ref();

    if !path.exists() {
        log::info!("Config file not found, using defaults: {}", path.display());
        return Ok(T::default());
    }

    load_config(path)
}

/// Parse configuration from a YAML string.
pub fn parse_config<T: DeserializeOwned>(yaml: &str) -> Result<T, AgentError> {
    Ok(serde_yaml::from_str(yaml)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.agent.name, "weather_agent");
        assert_eq!(config.agent.scope, "local");
        assert_eq!(config.agent.heartbeat_secs, 5);
        assert_eq!(config.weather.base_url, DEFAULT_WEATHER_URL);
        assert_eq!(config.weather.api_key_env, "OPENWEATHER_API_KEY");
        assert_eq!(config.weather.timeout_secs, 10);
    }

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let config: Config = parse_config("agent:\n  name: weather_eu\n").unwrap();
        assert_eq!(config.agent.name, "weather_eu");
        assert_eq!(config.agent.scope, "local");
        assert_eq!(config.weather.timeout_secs, 10);
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
agent:
  name: weather_agent
  scope: lab
  heartbeat_secs: 2
weather:
  base_url: http://127.0.0.1:9000/weather
  api_key_env: TEST_WEATHER_KEY
  timeout_secs: 3
"#;
        let config: Config = parse_config(yaml).unwrap();
        assert_eq!(config.agent.scope, "lab");
        assert_eq!(config.agent.heartbeat_secs, 2);
        assert_eq!(config.weather.base_url, "http://127.0.0.1:9000/weather");
        assert_eq!(config.weather.api_key_env, "TEST_WEATHER_KEY");
        assert_eq!(config.weather.timeout_secs, 3);
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result: Result<Config, _> = parse_config("agent: [unclosed");
        assert!(matches!(result, Err(AgentError::Parse(_))));

        let result: Result<Config, _> = parse_config("agent:\n  heartbeat_secs: soon\n");
        assert!(matches!(result, Err(AgentError::Parse(_))));
    }

    #[test]
    fn test_load_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "agent:\n  heartbeat_secs: 9\n").unwrap();
        let config: Config = load_config(&path).unwrap();
        assert_eq!(config.agent.heartbeat_secs, 9);
    }

    #[test]
    fn test_load_missing_file() {
        let result: Result<Config, _> = load_config("/nonexistent/config.yaml");
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    #[test]
    fn test_load_missing_file_falls_back_to_default() {
        let config: Config = load_config_or_default("/nonexistent/config.yaml").unwrap();
        assert_eq!(config.agent.name, "weather_agent");
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "not: [valid: yaml: {{").unwrap();
        let result: Result<Config, _> = load_config(&path);
        assert!(matches!(result, Err(AgentError::Parse(_))));
    }
}
