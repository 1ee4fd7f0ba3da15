//! Caller side of the weather request protocol.
//!
//! The client listens on its own inbox, tags each request with a fresh
//! correlation id, and waits for the response carrying the same id.
//! Anything else arriving on the inbox in the meantime is skipped.

use std::sync::Arc;
use std::time::Duration;
use zenoh::handlers::FifoChannelHandler;
use zenoh::pubsub::Subscriber;
use zenoh::sample::Sample;
use zenoh::Session;

use crate::envelope::{Address, Envelope, EnvelopeError, WeatherRequest, WeatherResponse};
use crate::mailbox::{Mailbox, MailboxError, ZenohMailbox};

/// Error type for weather client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("send failed: {0}")]
    Send(#[from] MailboxError),
    #[error("Zenoh error: {0}")]
    Zenoh(String),
    #[error("invalid message: {0}")]
    Envelope(#[from] EnvelopeError),
    #[error("no response from {agent} within {timeout:?}")]
    Timeout { agent: Address, timeout: Duration },
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Sends weather requests and waits for the matching response.
pub struct WeatherClient {
    session: Arc<Session>,
    mailbox: ZenohMailbox,
    address: Address,
    agent: Address,
    timeout: Duration,
}

impl WeatherClient {
    /// Create a client that receives as `address` and queries `agent`.
    pub fn new(
        session: Arc<Session>,
        address: Address,
        agent: Address,
        timeout: Duration,
    ) -> Self {
        let mailbox = ZenohMailbox::new(session.clone());
        Self {
            session,
            mailbox,
            address,
            agent,
            timeout,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Ask the agent for the weather emotion at `location`, optionally
    /// having it forward the emotion to `downstream`.
    pub async fn request_weather_emotion(
        &self,
        location: &str,
        downstream: Option<Address>,
    ) -> Result<WeatherResponse> {
        let mut request = WeatherRequest::weather_emotion(location);
        request.downstream_recipient = downstream;
        self.request(request).await
    }

    /// Send `request` and wait for its response. A missing correlation id
    /// is filled with a UUID v4, and `requester` defaults to this client.
    pub async fn request(&self, mut request: WeatherRequest) -> Result<WeatherResponse> {
        let correlation_id = request
            .correlation_id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .clone();
        let reply_to = match &request.requester {
            Some(requester) if !requester.is_empty() => Address::from(requester.as_str()),
            _ => {
                request.requester = Some(self.address.to_string());
                self.address.clone()
            }
        };

        // Subscribe before sending so the reply cannot race past us
        let inbox_key = reply_to.inbox_key();
        let inbox = self
            .session
            .declare_subscriber(&inbox_key)
            .await
            .map_err(|e| {
                ClientError::Zenoh(format!("Failed to subscribe to {}: {}", inbox_key, e))
            })?;

        let envelope = Envelope::seal(&self.address, &request)?;
        self.mailbox.send(&self.agent, &envelope).await?;
        log::debug!(
            "Sent {} to {} (correlation_id: {})",
            request.operation,
            self.agent,
            correlation_id
        );

        tokio::time::timeout(self.timeout, wait_for_response(&inbox, &correlation_id))
            .await
            .map_err(|_| ClientError::Timeout {
                agent: self.agent.clone(),
                timeout: self.timeout,
            })?
    }
}

/// Read the inbox until the response tagged `correlation_id` shows up.
async fn wait_for_response(
    inbox: &Subscriber<FifoChannelHandler<Sample>>,
    correlation_id: &str,
) -> Result<WeatherResponse> {
    loop {
        let sample = inbox
            .recv_async()
            .await
            .map_err(|e| ClientError::Zenoh(e.to_string()))?;
        if let Some(response) = match_response(&sample.payload().to_bytes(), correlation_id) {
            return Ok(response);
        }
    }
}

/// Decode `bytes` as a weather response with `correlation_id`, or `None`.
fn match_response(bytes: &[u8], correlation_id: &str) -> Option<WeatherResponse> {
    let envelope = match Envelope::from_slice(bytes) {
        Ok(env) => env,
        Err(e) => {
            log::debug!("Skipping undecodable inbox message: {}", e);
            return None;
        }
    };
    let response: WeatherResponse = match envelope.open() {
        Ok(resp) => resp,
        Err(e) => {
            log::debug!("Skipping message from {}: {}", envelope.sender, e);
            return None;
        }
    };
    if response.correlation_id.as_deref() != Some(correlation_id) {
        log::debug!(
            "Skipping response for correlation_id {:?}",
            response.correlation_id
        );
        return None;
    }
    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{RecommendationsRequest, WeatherEmotion};

    fn response_bytes(correlation_id: Option<&str>) -> Vec<u8> {
        let mut req = WeatherRequest::weather_emotion("Paris");
        req.correlation_id = correlation_id.map(str::to_string);
        let resp = WeatherResponse::success(
            WeatherEmotion {
                location: "Paris".to_string(),
                weather_condition: "Clear".to_string(),
                emotion: "happy".to_string(),
            },
            &req,
        );
        Envelope::seal(&Address::from("moodrelay/local/weather_agent"), &resp)
            .unwrap()
            .to_bytes()
            .unwrap()
    }

    #[test]
    fn test_match_response_by_correlation_id() {
        let resp = match_response(&response_bytes(Some("abc")), "abc").unwrap();
        assert_eq!(resp.correlation_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_match_response_skips_other_ids() {
        assert!(match_response(&response_bytes(Some("other")), "abc").is_none());
        assert!(match_response(&response_bytes(None), "abc").is_none());
    }

    #[test]
    fn test_match_response_skips_other_schemas() {
        let fwd = RecommendationsRequest::new(
            "happy".to_string(),
            "moodrelay/local/ui".to_string(),
            Some("abc".to_string()),
        );
        let bytes = Envelope::seal(&Address::from("moodrelay/local/weather_agent"), &fwd)
            .unwrap()
            .to_bytes()
            .unwrap();
        assert!(match_response(&bytes, "abc").is_none());
        assert!(match_response(b"{}", "abc").is_none());
    }

    #[test]
    fn test_timeout_error_display() {
        let err = ClientError::Timeout {
            agent: Address::from("moodrelay/local/weather_agent"),
            timeout: Duration::from_secs(2),
        };
        assert_eq!(
            err.to_string(),
            "no response from moodrelay/local/weather_agent within 2s"
        );
    }
}
