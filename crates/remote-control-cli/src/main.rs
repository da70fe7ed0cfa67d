//! Remote-control CLI
//!
//! - `remote-control serve [port]` serves a simulated vehicle until Ctrl-C
//! - `remote-control get <path> [addr]` reads one property
//! - `remote-control set <path> <value> [addr]` writes one property

use anyhow::{Result, bail};
use flight_bridge::{FlightRemote, SimulatedHost, SimulatedVehicle};
use remote_control_client::RemoteControlClient;
use remote_control_server::ServerConfig;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

const USAGE: &str = "Usage:
  remote-control serve [port]
  remote-control get <path> [addr]
  remote-control set <path> <value> [addr]";

async fn serve(port: Option<&str>) -> Result<()> {
    let mut config = ServerConfig::from_env()?;
    if let Some(port) = port {
        config.port = port
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid port: '{}'", port))?;
    }

    let host = Arc::new(SimulatedHost::new(SimulatedVehicle::default()));
    let remote = FlightRemote::start(host, config).await?;
    if let Some(addr) = remote.local_addr() {
        info!("Remote control listening on {}", addr);
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    remote.unload().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command line arguments
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["serve"] => serve(None).await,
        ["serve", port] => serve(Some(*port)).await,
        ["get", path, rest @ ..] if rest.len() <= 1 => {
            let client = RemoteControlClient::new(rest.first().copied().unwrap_or(DEFAULT_ADDR));
            println!("{}", client.get(path).await?);
            Ok(())
        }
        ["set", path, value, rest @ ..] if rest.len() <= 1 => {
            let client = RemoteControlClient::new(rest.first().copied().unwrap_or(DEFAULT_ADDR));
            client.set(path, value).await?;
            println!("OK");
            Ok(())
        }
        _ => bail!("{}", USAGE),
    }
}
