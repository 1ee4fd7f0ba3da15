//! Zenoh session setup and shutdown signalling.

use std::sync::Arc;
use tokio::sync::watch;

use crate::error::AgentError;

/// Router endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "tcp/127.0.0.1:7447";

/// Pick the Zenoh endpoint.
///
/// Resolution order:
/// 1. `ZENOH_ENDPOINT` env var
/// 2. `MOODRELAY_ZENOH_ENDPOINT` env var
/// 3. Provided `endpoint` argument
/// 4. [`DEFAULT_ENDPOINT`]
pub fn resolve_endpoint(endpoint: Option<&str>) -> String {
    pick_endpoint(
        std::env::var("ZENOH_ENDPOINT").ok(),
        std::env::var("MOODRELAY_ZENOH_ENDPOINT").ok(),
        endpoint,
    )
}

fn pick_endpoint(
    zenoh_env: Option<String>,
    moodrelay_env: Option<String>,
    endpoint: Option<&str>,
) -> String {
    zenoh_env
        .or(moodrelay_env)
        .or_else(|| endpoint.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}

/// Open a Zenoh session in client mode against `endpoint`.
pub async fn open_session(endpoint: &str) -> Result<Arc<zenoh::Session>, AgentError> {
    log::info!("Connecting to Zenoh at: {}", endpoint);

    let mut config = zenoh::Config::default();
    // Client mode: all traffic goes through the router
    config
        .insert_json5("mode", r#""client""#)
        .map_err(|e| AgentError::Zenoh(format!("Failed to set Zenoh mode: {}", e)))?;
    config
        .insert_json5("connect/endpoints", &format!(r#"["{}"]"#, endpoint))
        .map_err(|e| AgentError::Zenoh(format!("Failed to set Zenoh endpoint: {}", e)))?;
    config
        .insert_json5("scouting/multicast/enabled", "false")
        .map_err(|e| AgentError::Zenoh(format!("Failed to disable multicast: {}", e)))?;
    config
        .insert_json5("scouting/gossip/enabled", "false")
        .map_err(|e| AgentError::Zenoh(format!("Failed to disable gossip: {}", e)))?;

    let session = zenoh::open(config).await?;

    log::info!("Connected to Zenoh");
    Ok(Arc::new(session))
}

/// Set up a shutdown channel triggered by SIGINT/SIGTERM.
pub fn setup_shutdown() -> Result<watch::Sender<()>, AgentError> {
    let (tx, _rx) = watch::channel(());
    let shutdown_tx = tx.clone();
    ctrlc::set_handler(move || {
        log::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    })
    .map_err(|e| AgentError::Init(format!("Failed to set signal handler: {}", e)))?;
    Ok(tx)
}
