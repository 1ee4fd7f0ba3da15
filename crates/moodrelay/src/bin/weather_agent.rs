use argh::FromArgs;
use moodrelay::{
    config::Config, load_config_or_default, session, OpenWeatherClient, WeatherAgentNode,
    WeatherHandler, ZenohMailbox,
};
use std::time::Duration;

#[derive(FromArgs)]
/// Weather-to-emotion relay agent
struct Args {
    /// path to the configuration file (optional, uses defaults when missing)
    #[argh(option, short = 'c', default = "String::from(\"config.yaml\")")]
    config: String,

    /// zenoh router endpoint to connect to
    #[argh(option, short = 'e')]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();

    let config: Config = match load_config_or_default(&args.config) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config from '{}': {}", args.config, e);
            std::process::exit(1);
        }
    };

    let resolver = match OpenWeatherClient::from_env(&config.weather) {
        Ok(r) => r,
        Err(e) => {
            log::error!("Failed to create weather client: {}", e);
            std::process::exit(1);
        }
    };

    let address = config.agent.address();
    log::info!(
        "Starting {} v{} at {}",
        config.agent.name,
        env!("CARGO_PKG_VERSION"),
        address
    );

    let shutdown_tx = session::setup_shutdown()?;

    let endpoint = session::resolve_endpoint(args.endpoint.as_deref());
    let bus = session::open_session(&endpoint).await?;

    // Built once here and handed to the node that hosts the message loop
    let handler = WeatherHandler::new(address, resolver, ZenohMailbox::new(bus.clone()));
    let heartbeat = Duration::from_secs(config.agent.heartbeat_secs);
    let node = WeatherAgentNode::new(bus, handler, heartbeat).await?;

    log::info!("Weather agent running. Press Ctrl+C to stop.");
    node.run(shutdown_tx.subscribe()).await?;

    log::info!("Weather agent shut down, exiting");
    Ok(())
}
