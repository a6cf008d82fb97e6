mod commands;

use clap::Parser;
use commands::{execute_command, Commands};
use lastfm_helper::config::{API_KEY_VAR, API_SECRET_VAR, API_URL_VAR, DEFAULT_BASE_URL};
use lastfm_helper::{ClientConfig, LastFmClient};

/// Last.fm listening analytics
#[derive(Parser)]
#[command(
    name = "lastfm-helper",
    about = "Last.fm listening analytics",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    /// Last.fm API key
    #[arg(long, env = API_KEY_VAR, hide_env_values = true)]
    api_key: String,

    /// Shared secret, needed for signed requests
    #[arg(long, env = API_SECRET_VAR, hide_env_values = true, default_value = "")]
    api_secret: String,

    /// Web service endpoint
    #[arg(long, env = API_URL_VAR, default_value = DEFAULT_BASE_URL)]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = ClientConfig::new(args.api_key, args.api_secret).with_base_url(args.api_url);
    let http_client = http_client::native::NativeClient::new();

    let client = match LastFmClient::new(Box::new(http_client), &config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Failed to create client: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = execute_command(args.command, &client).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}
