//! Weather request handling.
//!
//! One inbound [`WeatherRequest`] produces one [`WeatherResponse`] to the
//! requester and, when the request names a `downstream_recipient`, one
//! [`RecommendationsRequest`] forwarded to that address:
//!
//! ```text
//! validate ──(bad op / no location)──────────────► respond(error)
//!    │
//!    ▼
//! resolve ──(lookup failed: "Unknown"/"neutral")─► respond(success)
//!    │                                                │
//!    ▼                                                ▼
//! map ───────────────────────────────────────► respond(success) ──► forward?
//! ```
//!
//! The handler keeps no state between requests.

use crate::emotion;
use crate::envelope::{
    Address, Envelope, Message, Operation, RecommendationsRequest, WeatherEmotion,
    WeatherRequest, WeatherResponse,
};
use crate::mailbox::Mailbox;
use crate::resolver::ConditionResolver;

pub const LOCATION_REQUIRED: &str = "Location is required";
pub const INVALID_OPERATION: &str = "Invalid operation";

/// Condition reported when the lookup fails.
pub const UNKNOWN_CONDITION: &str = "Unknown";

/// Handles weather requests addressed to one agent.
pub struct WeatherHandler<R: ConditionResolver, M: Mailbox> {
    address: Address,
    resolver: R,
    mailbox: M,
}

impl<R: ConditionResolver, M: Mailbox> WeatherHandler<R, M> {
    /// Create a handler that sends as `address`.
    pub fn new(address: Address, resolver: R, mailbox: M) -> Self {
        Self {
            address,
            resolver,
            mailbox,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Handle one request from `sender`, performing all sends before
    /// returning. Returns the response that was sent to the requester.
    pub async fn handle(&self, sender: &Address, request: WeatherRequest) -> WeatherResponse {
        // An empty requester or recipient counts as absent
        let reply_to = request
            .requester
            .as_deref()
            .filter(|r| !r.is_empty())
            .map(Address::from)
            .unwrap_or_else(|| sender.clone());
        let recipient = request
            .downstream_recipient
            .as_ref()
            .filter(|r| !r.as_str().is_empty());

        let Some(weather_emotion) = self.evaluate(&request).await else {
            let response = self.reject(&request);
            self.deliver(&reply_to, &response).await;
            return response;
        };

        let emotion = weather_emotion.emotion.clone();
        let response = WeatherResponse::success(weather_emotion, &request);
        self.deliver(&reply_to, &response).await;

        if let Some(recipient) = recipient {
            let forward = RecommendationsRequest::new(
                emotion,
                reply_to.to_string(),
                request.correlation_id.clone(),
            );
            log::debug!(
                "Forwarding emotion '{}' to {} (correlation_id: {:?})",
                forward.emotion,
                recipient,
                forward.correlation_id
            );
            self.deliver(recipient, &forward).await;
        }

        response
    }

    /// Validate and resolve. `None` means the request was rejected.
    async fn evaluate(&self, request: &WeatherRequest) -> Option<WeatherEmotion> {
        Operation::parse(&request.operation)?;
        let location = request.location.as_deref().filter(|l| !l.is_empty())?;
        Some(self.weather_emotion(location).await)
    }

    /// Error response for a request that `evaluate` rejected.
    fn reject(&self, request: &WeatherRequest) -> WeatherResponse {
        let message = if Operation::parse(&request.operation).is_none() {
            INVALID_OPERATION
        } else {
            LOCATION_REQUIRED
        };
        log::debug!(
            "Rejecting request (operation: '{}'): {}",
            request.operation,
            message
        );
        WeatherResponse::error(message, request)
    }

    /// Resolve and map a location. Lookup failures degrade to the
    /// "Unknown"/"neutral" sentinel instead of an error.
    pub async fn weather_emotion(&self, location: &str) -> WeatherEmotion {
        let (condition, emotion) = match self.resolver.resolve(location).await {
            Ok(condition) => {
                let emotion = emotion::map_condition(&condition);
                (condition, emotion)
            }
            Err(e) => {
                log::warn!("Error getting weather emotion for '{}': {}", location, e);
                (UNKNOWN_CONDITION.to_string(), emotion::FALLBACK_EMOTION)
            }
        };

        WeatherEmotion {
            location: location.to_string(),
            weather_condition: condition,
            emotion: emotion.to_string(),
        }
    }

    /// Seal and send, logging failures. Never retried.
    async fn deliver<T: Message>(&self, to: &Address, message: &T) {
        let envelope = match Envelope::seal(&self.address, message) {
            Ok(env) => env,
            Err(e) => {
                log::error!("Failed to encode {} for {}: {}", T::SCHEMA, to, e);
                return;
            }
        };
        if let Err(e) = self.mailbox.send(to, &envelope).await {
            log::error!("Failed to send {} to {}: {}", T::SCHEMA, to, e);
        }
    }
}
