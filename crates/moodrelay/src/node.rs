//! Hosting loop for the weather agent.
//!
//! The node owns the inbox subscriber and feeds decoded requests to the
//! [`WeatherHandler`] one at a time. A request is fully handled, including
//! any forward, before the next sample is read.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use zenoh::handlers::FifoChannelHandler;
use zenoh::pubsub::Subscriber;
use zenoh::sample::Sample;
use zenoh::Session;

use crate::envelope::{Envelope, WeatherRequest};
use crate::error::AgentError;
use crate::handler::WeatherHandler;
use crate::mailbox::Mailbox;
use crate::resolver::ConditionResolver;

/// Weather agent bound to its inbox.
pub struct WeatherAgentNode<R: ConditionResolver, M: Mailbox> {
    session: Arc<Session>,
    handler: WeatherHandler<R, M>,
    inbox: Subscriber<FifoChannelHandler<Sample>>,
    heartbeat: Duration,
}

impl<R: ConditionResolver, M: Mailbox> WeatherAgentNode<R, M> {
    /// Declare the inbox subscriber for the handler's address.
    ///
    /// Messages put on the inbox after this returns are queued until
    /// [`run`](Self::run) picks them up.
    pub async fn new(
        session: Arc<Session>,
        handler: WeatherHandler<R, M>,
        heartbeat: Duration,
    ) -> Result<Self, AgentError> {
        let inbox_key = handler.address().inbox_key();
        let inbox = session
            .declare_subscriber(&inbox_key)
            .await
            .map_err(|e| {
                AgentError::Zenoh(format!("Failed to subscribe to {}: {}", inbox_key, e))
            })?;
        log::info!("Listening on {}", inbox_key);

        Ok(Self {
            session,
            handler,
            inbox,
            heartbeat,
        })
    }

    /// Process inbox messages until the shutdown signal fires.
    pub async fn run(self, mut shutdown: watch::Receiver<()>) -> Result<(), AgentError> {
        let health = spawn_health_heartbeat(
            self.session.clone(),
            self.handler.address().health_key(),
            self.heartbeat,
            shutdown.clone(),
        )
        .await?;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    log::info!("Weather agent shutting down...");
                    break;
                }
                sample = self.inbox.recv_async() => {
                    match sample {
                        Ok(sample) => self.process(&sample).await,
                        Err(e) => {
                            log::warn!("Inbox receive error: {}", e);
                            break;
                        }
                    }
                }
            }
        }

        health.abort();
        Ok(())
    }

    async fn process(&self, sample: &Sample) {
        let bytes = sample.payload().to_bytes();
        let envelope = match Envelope::from_slice(&bytes) {
            Ok(env) => env,
            Err(e) => {
                log::warn!("Dropping undecodable message on {}: {}", sample.key_expr(), e);
                return;
            }
        };
        let request: WeatherRequest = match envelope.open() {
            Ok(req) => req,
            Err(e) => {
                log::warn!("Dropping message from {}: {}", envelope.sender, e);
                return;
            }
        };

        log::debug!(
            "Request '{}' from {} (location: {:?})",
            request.operation,
            envelope.sender,
            request.location
        );
        let response = self.handler.handle(&envelope.sender, request).await;
        log::debug!("Handled request from {}: {:?}", envelope.sender, response.status);
    }
}

/// Spawn a background task that publishes `"ok"` on `health_key` every
/// `interval` until the shutdown signal fires.
pub async fn spawn_health_heartbeat(
    session: Arc<Session>,
    health_key: String,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<tokio::task::JoinHandle<()>, AgentError> {
    log::info!("Health heartbeat: {}", health_key);
    let publisher = session
        .declare_publisher(health_key)
        .await
        .map_err(|e| AgentError::Zenoh(format!("Failed to create health publisher: {}", e)))?;

    let handle = tokio::spawn(async move {
        // interval() panics on a zero period
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(100)));
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => {
                    log::debug!("Health heartbeat stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = publisher.put("ok").await {
                        log::warn!("Health heartbeat failed: {}", e);
                    }
                }
            }
        }
    });

    Ok(handle)
}
