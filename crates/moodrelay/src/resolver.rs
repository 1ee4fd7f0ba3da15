//! Weather condition lookup.
//!
//! The handler talks to [`ConditionResolver`] instead of a concrete HTTP
//! client, so request handling is testable with the mock in [`mock`].

use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

use crate::config::WeatherConfig;

/// Errors from weather lookups.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("{0} not set")]
    MissingApiKey(String),

    #[error("invalid weather URL: {0}")]
    InvalidUrl(String),

    #[error("format error: {0}")]
    Format(String),
}

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Resolves a location to the provider's current weather condition name.
pub trait ConditionResolver: Send + Sync + 'static {
    fn resolve(&self, location: &str) -> impl Future<Output = Result<String>> + Send;
}

// ── OpenWeatherMap ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    #[serde(default)]
    weather: Vec<WeatherEntry>,
}

#[derive(Debug, Deserialize)]
struct WeatherEntry {
    main: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Current-weather client for the OpenWeatherMap API.
pub struct OpenWeatherClient {
    base_url: reqwest::Url,
    api_key: String,
    client: reqwest::Client,
}

impl OpenWeatherClient {
    /// Create a client, reading the API key from the variable named by
    /// `config.api_key_env`.
    pub fn from_env(config: &WeatherConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| ResolveError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }

    pub fn new(config: &WeatherConfig, api_key: String) -> Result<Self> {
        let base_url = reqwest::Url::parse(&config.base_url)
            .map_err(|e| ResolveError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    /// Build the lookup URL. All-digit locations are US zip codes,
    /// everything else is a city query.
    fn query_url(&self, location: &str) -> reqwest::Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            if !location.is_empty() && location.chars().all(|c| c.is_ascii_digit()) {
                query.append_pair("zip", &format!("{},us", location));
            } else {
                query.append_pair("q", location);
            }
            query.append_pair("appid", &self.api_key);
        }
        url
    }
}

/// Extract `weather[0].main` from a current-weather response body.
fn parse_condition(body: &str) -> Result<String> {
    let current: CurrentWeather =
        serde_json::from_str(body).map_err(|e| ResolveError::Format(e.to_string()))?;
    current
        .weather
        .into_iter()
        .next()
        .map(|w| w.main)
        .ok_or_else(|| ResolveError::Format("no weather entries in response".to_string()))
}

/// Best-effort error message from a non-success response body.
fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.to_string())
}

impl ConditionResolver for OpenWeatherClient {
    async fn resolve(&self, location: &str) -> Result<String> {
        let response = self.client.get(self.query_url(location)).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ResolveError::Api {
                status: status.as_u16(),
                message: parse_error_message(&body),
            });
        }

        let condition = parse_condition(&body)?;
        log::debug!("Weather for '{}': {}", location, condition);
        Ok(condition)
    }
}

// ── Mock resolver for testing ───────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::mock::MockResolver;
    use super::*;

    fn client() -> OpenWeatherClient {
        OpenWeatherClient::new(&WeatherConfig::default(), "k3y".to_string()).unwrap()
    }

    #[test]
    fn test_city_query_url() {
        let url = client().query_url("Paris");
        assert_eq!(
            url.as_str(),
            "https://api.openweathermap.org/data/2.5/weather?q=Paris&appid=k3y"
        );
    }

    #[test]
    fn test_zip_query_url() {
        let url = client().query_url("94103");
        assert_eq!(
            url.as_str(),
            "https://api.openweathermap.org/data/2.5/weather?zip=94103%2Cus&appid=k3y"
        );
    }

    #[test]
    fn test_city_names_are_encoded() {
        let url = client().query_url("New York");
        assert!(url.as_str().contains("q=New+York"));
    }

    #[test]
    fn test_invalid_base_url() {
        let config = WeatherConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        let result = OpenWeatherClient::new(&config, "k".to_string());
        assert!(matches!(result, Err(ResolveError::InvalidUrl(_))));
    }

    #[test]
    fn test_missing_api_key() {
        let config = WeatherConfig {
            api_key_env: "MOODRELAY_TEST_UNSET_WEATHER_KEY".to_string(),
            ..Default::default()
        };
        let err = OpenWeatherClient::from_env(&config).err().unwrap();
        assert_eq!(err.to_string(), "MOODRELAY_TEST_UNSET_WEATHER_KEY not set");
    }

    #[test]
    fn test_parse_condition() {
        let body = r#"{"weather":[{"id":800,"main":"Clear","description":"clear sky"}],"name":"Paris"}"#;
        assert_eq!(parse_condition(body).unwrap(), "Clear");
    }

    #[test]
    fn test_parse_condition_without_entries() {
        assert!(matches!(
            parse_condition(r#"{"weather":[]}"#),
            Err(ResolveError::Format(_))
        ));
        assert!(matches!(
            parse_condition(r#"{"name":"Paris"}"#),
            Err(ResolveError::Format(_))
        ));
    }

    #[test]
    fn test_parse_error_message() {
        assert_eq!(
            parse_error_message(r#"{"cod":"404","message":"city not found"}"#),
            "city not found"
        );
        assert_eq!(parse_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_mock_resolver() {
        let resolver = MockResolver::new().with("Oslo", "Snow");
        assert_eq!(resolver.resolve("Oslo").await.unwrap(), "Snow");
        assert!(resolver.resolve("Atlantis").await.is_err());
        assert_eq!(resolver.call_count(), 2);
    }
}
