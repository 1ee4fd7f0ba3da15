//! Weather-to-emotion relay agent.
//!
//! The weather agent receives a location, looks up the current weather
//! condition, maps it to an emotion and replies to the requester. When the
//! request names a downstream recipient, the emotion is also forwarded
//! there as a `get_recommendations` request, keeping the caller's
//! correlation id.
//!
//! Agents exchange JSON [`Envelope`]s over Zenoh; see [`envelope`] for the
//! wire schemas and addressing.

pub mod client;
pub mod config;
pub mod emotion;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod mailbox;
pub mod node;
pub mod resolver;
pub mod session;

pub use client::{ClientError, WeatherClient};
pub use config::{load_config, load_config_or_default, parse_config, Config};
pub use envelope::{
    Address, Envelope, Message, Operation, RecommendationsRequest, ResponseStatus,
    WeatherEmotion, WeatherRequest, WeatherResponse,
};
pub use error::AgentError;
pub use handler::WeatherHandler;
pub use mailbox::{Mailbox, MailboxError, ZenohMailbox};
pub use node::WeatherAgentNode;
pub use resolver::{ConditionResolver, OpenWeatherClient, ResolveError};
