use argh::FromArgs;
use moodrelay::{session, Address, WeatherClient};
use std::time::Duration;

#[derive(FromArgs)]
/// Ask the weather agent for the emotion of a location and print the reply
struct Args {
    /// city name or US zip code
    #[argh(option, short = 'l')]
    location: String,

    /// address of an agent to forward the emotion to
    #[argh(option, short = 'd')]
    downstream: Option<String>,

    /// deployment scope
    #[argh(option, short = 's', default = "String::from(\"local\")")]
    scope: String,

    /// name of the weather agent
    #[argh(option, short = 'a', default = "String::from(\"weather_agent\")")]
    agent: String,

    /// seconds to wait for the reply
    #[argh(option, short = 't', default = "10")]
    timeout_secs: u64,

    /// zenoh router endpoint to connect to
    #[argh(option, short = 'e')]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = env_logger::Env::default().default_filter_or("warn");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();

    let endpoint = session::resolve_endpoint(args.endpoint.as_deref());
    let bus = session::open_session(&endpoint).await?;

    let me = Address::for_agent(&args.scope, &format!("query_{}", std::process::id()));
    let client = WeatherClient::new(
        bus,
        me,
        Address::for_agent(&args.scope, &args.agent),
        Duration::from_secs(args.timeout_secs),
    );

    let response = client
        .request_weather_emotion(&args.location, args.downstream.map(Address::from))
        .await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.is_success() {
        std::process::exit(2);
    }
    Ok(())
}
