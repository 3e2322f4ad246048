mod error;
mod proxy;
mod routes;
mod session;
mod state;

use std::path::PathBuf;

use clap::Parser;
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use iotda_api::{Credentials, IotdaClient};

use crate::state::AppState;

/// Web control panel for a Huawei Cloud IoTDA laundry device.
#[derive(Debug, Parser)]
#[command(name = "laundry-web", version, about)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long, default_value = "laundry.toml")]
    config: PathBuf,

    /// Check platform connectivity (device listing) and exit.
    #[arg(long)]
    probe: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] laundry_config::ConfigError),

    #[error(transparent)]
    Client(#[from] iotda_api::Error),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = laundry_config::load_settings(&cli.config)?;
    settings.validate()?;

    let client_config = laundry_config::to_client_config(&settings)?;
    let client = IotdaClient::new(&client_config)?;

    let Credentials::Token(ref token) = client_config.credentials;
    tracing::info!(
        endpoint = %settings.platform.endpoint,
        project_id = %settings.platform.project_id,
        device_id = %settings.platform.device_id,
        token = %mask_token(token.expose_secret()),
        "platform client ready"
    );

    if cli.probe {
        return probe(&client).await;
    }

    let listen = settings.server.listen.clone();
    let router = routes::build_router(AppState::new(client, &settings));

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    tracing::info!(listen = %listen, "serving control panel");
    axum::serve(listener, router).await?;
    Ok(())
}

/// Connectivity check: list devices visible to the token and print a
/// one-line summary per device.
async fn probe(client: &IotdaClient) -> Result<(), CliError> {
    let listing = client.list_devices(Some(10)).await?;

    println!("platform reachable; {} device(s) visible", listing.devices.len());
    for device in &listing.devices {
        println!(
            "  {}  {}  {}",
            device.device_id,
            device.status.as_deref().unwrap_or("-"),
            device.device_name.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

/// Shorten a token for logs. Short tokens are fully masked.
fn mask_token(token: &str) -> String {
    if token.len() < 16 {
        return "***".into();
    }
    format!("{}...{}", &token[..8], &token[token.len() - 4..])
}
