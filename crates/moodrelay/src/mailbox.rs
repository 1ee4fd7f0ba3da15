//! Outbound message delivery.
//!
//! Sends are fire-and-forget: a successful `send` means the envelope was
//! handed to the transport, not that anyone received it.

use std::future::Future;
use std::sync::Arc;
use zenoh::Session;

use crate::envelope::{Address, Envelope, EnvelopeError};

/// Errors from outbound sends.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("encode error: {0}")]
    Encode(#[from] EnvelopeError),

    #[error("Zenoh error: {0}")]
    Zenoh(String),

    #[error("{0}")]
    InvalidAddress(EnvelopeError),
}

pub type MailboxResult<T> = Result<T, MailboxError>;

/// Delivers envelopes to agent addresses. Implementations refuse
/// addresses that fail [`Address::validate`].
pub trait Mailbox: Send + Sync + 'static {
    fn send(
        &self,
        to: &Address,
        envelope: &Envelope,
    ) -> impl Future<Output = MailboxResult<()>> + Send;
}

/// Mailbox that puts JSON envelopes on `{address}/inbox`.
pub struct ZenohMailbox {
    session: Arc<Session>,
}

impl ZenohMailbox {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

impl Mailbox for ZenohMailbox {
    async fn send(&self, to: &Address, envelope: &Envelope) -> MailboxResult<()> {
        to.validate().map_err(MailboxError::InvalidAddress)?;
        let bytes = envelope.to_bytes()?;
        let key = to.inbox_key();
        self.session
            .put(&key, bytes)
            .await
            .map_err(|e| MailboxError::Zenoh(format!("put on '{}' failed: {}", key, e)))?;
        log::debug!("Sent {} to {}", envelope.schema, key);
        Ok(())
    }
}

// ── RecordingMailbox for testing ────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::mock::RecordingMailbox;
    use super::*;
    use crate::envelope::WeatherRequest;

    #[tokio::test]
    async fn test_recording_mailbox() {
        let mailbox = RecordingMailbox::failing_for("moodrelay/local/gone");
        let sender = Address::from("moodrelay/local/ui");
        let env = Envelope::seal(&sender, &WeatherRequest::weather_emotion("Lima")).unwrap();

        mailbox
            .send(&Address::from("moodrelay/local/weather_agent"), &env)
            .await
            .unwrap();
        let err = mailbox
            .send(&Address::from("moodrelay/local/gone"), &env)
            .await
            .unwrap_err();

        assert!(matches!(err, MailboxError::Zenoh(_)));
        assert_eq!(mailbox.sent().len(), 1);
        assert_eq!(mailbox.sent_to("moodrelay/local/weather_agent"), vec![env]);
    }

    #[tokio::test]
    async fn test_recording_mailbox_rejects_wildcards() {
        let mailbox = RecordingMailbox::new();
        let sender = Address::from("moodrelay/local/ui");
        let env = Envelope::seal(&sender, &WeatherRequest::weather_emotion("Lima")).unwrap();

        let err = mailbox
            .send(&Address::from("moodrelay/**"), &env)
            .await
            .unwrap_err();

        assert!(matches!(err, MailboxError::InvalidAddress(_)));
        assert!(mailbox.sent().is_empty());
    }

    #[test]
    fn test_mailbox_error_display() {
        let err = MailboxError::Zenoh("boom".to_string());
        assert_eq!(err.to_string(), "Zenoh error: boom");
    }
}
