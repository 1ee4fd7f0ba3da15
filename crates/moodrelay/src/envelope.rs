//! Wire schemas and addressing for agent messages.
//!
//! Every message travels as a JSON [`Envelope`]:
//!
//! ```json
//! {"sender": "moodrelay/local/ui", "schema": "weather_request", "payload": {...}}
//! ```
//!
//! | Schema | Payload | Direction |
//! |--------|---------|-----------|
//! | `weather_request` | [`WeatherRequest`] | caller -> weather agent |
//! | `weather_response` | [`WeatherResponse`] | weather agent -> requester |
//! | `recommendations_request` | [`RecommendationsRequest`] | weather agent -> downstream |
//!
//! An [`Address`] is a Zenoh key-expression prefix. Each agent receives on
//! `{address}/inbox` and publishes liveness on `{address}/health`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use zenoh::key_expr::KeyExpr;

/// Root segment of every agent address.
pub const ADDRESS_ROOT: &str = "moodrelay";

/// Operation name carried by forwarded recommendation requests.
pub const GET_RECOMMENDATIONS: &str = "get_recommendations";

/// Errors from envelope encoding and decoding.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema mismatch: expected '{expected}', got '{actual}'")]
    SchemaMismatch {
        expected: &'static str,
        actual: String,
    },

    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
}

// ── Addressing ──────────────────────────────────────────────────────

/// Address of an agent on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Address of a named agent within a scope: `moodrelay/{scope}/{name}`.
    pub fn for_agent(scope: &str, name: &str) -> Self {
        Self(format!("{}/{}/{}", ADDRESS_ROOT, scope, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key expression the agent receives messages on.
    pub fn inbox_key(&self) -> String {
        format!("{}/inbox", self.0)
    }

    /// Key expression the agent publishes heartbeats on.
    pub fn health_key(&self) -> String {
        format!("{}/health", self.0)
    }

    /// Check that the address names exactly one agent: a valid,
    /// non-empty key expression with no wildcard chunks.
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        let invalid = |reason: String| EnvelopeError::InvalidAddress {
            address: self.0.clone(),
            reason,
        };
        if self.0.split('/').any(|chunk| chunk.contains('*')) {
            return Err(invalid("wildcards are not allowed".to_string()));
        }
        KeyExpr::try_from(self.0.as_str()).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ── Envelope ────────────────────────────────────────────────────────

/// A payload type that can travel inside an [`Envelope`].
pub trait Message: Serialize + DeserializeOwned {
    /// Schema name written to the envelope.
    const SCHEMA: &'static str;
}

/// Addressing wrapper around a typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub sender: Address,
    pub schema: String,
    pub payload: serde_json::Value,
}

impl Envelope {
    /// Wrap `message` for sending from `sender`.
    pub fn seal<M: Message>(sender: &Address, message: &M) -> Result<Self, EnvelopeError> {
        Ok(Self {
            sender: sender.clone(),
            schema: M::SCHEMA.to_string(),
            payload: serde_json::to_value(message)?,
        })
    }

    /// Decode the payload, checking that the schema matches `M`.
    pub fn open<M: Message>(&self) -> Result<M, EnvelopeError> {
        if self.schema != M::SCHEMA {
            return Err(EnvelopeError::SchemaMismatch {
                expected: M::SCHEMA,
                actual: self.schema.clone(),
            });
        }
        Ok(serde_json::from_value(self.payload.clone())?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

// ── Weather request ─────────────────────────────────────────────────

/// Operations the weather agent understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetWeatherEmotion,
    /// Alias of `GetWeatherEmotion`
    GetWeather,
}

impl Operation {
    /// Parse a wire operation name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "get_weather_emotion" => Some(Operation::GetWeatherEmotion),
            "get_weather" => Some(Operation::GetWeather),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::GetWeatherEmotion => "get_weather_emotion",
            Operation::GetWeather => "get_weather",
        }
    }
}

/// Inbound request to the weather agent.
///
/// `operation` stays a plain string so that unknown values reach the handler
/// and get an error response instead of failing to decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherRequest {
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        default,
        alias = "spotify_agent",
        skip_serializing_if = "Option::is_none"
    )]
    pub downstream_recipient: Option<Address>,
    #[serde(default, alias = "callback_id", skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,
}

impl WeatherRequest {
    /// A `get_weather_emotion` request for `location`.
    pub fn weather_emotion(location: impl Into<String>) -> Self {
        Self {
            operation: Operation::GetWeatherEmotion.as_str().to_string(),
            location: Some(location.into()),
            ..Default::default()
        }
    }
}

impl Message for WeatherRequest {
    const SCHEMA: &'static str = "weather_request";
}

// ── Weather response ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Condition and emotion resolved for a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherEmotion {
    pub location: String,
    pub weather_condition: String,
    pub emotion: String,
}

/// Reply sent back to the requester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_emotion: Option<WeatherEmotion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,
    #[serde(default, alias = "callback_id", skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl WeatherResponse {
    /// Creates a success response carrying `weather_emotion`.
    pub fn success(weather_emotion: WeatherEmotion, request: &WeatherRequest) -> Self {
        Self {
            status: ResponseStatus::Success,
            weather_emotion: Some(weather_emotion),
            error: None,
            requester: request.requester.clone(),
            correlation_id: request.correlation_id.clone(),
        }
    }

    /// Creates an error response with the given message.
    pub fn error(message: impl Into<String>, request: &WeatherRequest) -> Self {
        Self {
            status: ResponseStatus::Error,
            weather_emotion: None,
            error: Some(message.into()),
            requester: request.requester.clone(),
            correlation_id: request.correlation_id.clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

impl Message for WeatherResponse {
    const SCHEMA: &'static str = "weather_response";
}

// ── Downstream request ──────────────────────────────────────────────

/// Request forwarded to a recommendation agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationsRequest {
    pub operation: String,
    pub emotion: String,
    pub requester: String,
    #[serde(default, alias = "callback_id")]
    pub correlation_id: Option<String>,
}

impl RecommendationsRequest {
    pub fn new(emotion: String, requester: String, correlation_id: Option<String>) -> Self {
        Self {
            operation: GET_RECOMMENDATIONS.to_string(),
            emotion,
            requester,
            correlation_id,
        }
    }
}

impl Message for RecommendationsRequest {
    const SCHEMA: &'static str = "recommendations_request";
}
