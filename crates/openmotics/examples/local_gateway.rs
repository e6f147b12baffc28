//! Talk to a local OpenMotics gateway with the password grant
//!
//! ## Usage
//!
//! ```bash
//! export OPENMOTICS_HOST=192.168.0.20
//! export OPENMOTICS_USERNAME=...
//! export OPENMOTICS_PASSWORD=...
//! # Optional: OPENMOTICS_PORT, OPENMOTICS_SSL=false
//! cargo run --example local_gateway --features full
//! ```
//!
//! Gateways usually present a self-signed certificate, so certificate
//! validation is switched off here.

use anyhow::{Context, bail};
use openmotics::{Client, ClientConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut config = ClientConfig::from_env().context("reading OPENMOTICS_* settings")?;
    if config.host.is_none() {
        bail!("OPENMOTICS_HOST must point at the gateway");
    }
    config.accept_invalid_certs = true;

    let client = Client::from_config(config)?;
    client.authenticate().await?;
    println!("Authenticated: {:?}", client.auth_state().await);

    let installations = client.installations().list(None).await?;
    let Some(installation) = installations.first() else {
        bail!("the gateway reported no installation");
    };

    for output in client.outputs().list(installation.id, None).await? {
        println!(
            "output {:>3} {:<24} on={} brightness={:?}",
            output.id,
            output.name.as_deref().unwrap_or("-"),
            output.is_on(),
            output.brightness()
        );
    }

    for shutter in client.shutters().list(installation.id, None).await? {
        println!(
            "shutter {:>3} state={:?} position={:?}",
            shutter.id,
            shutter.state(),
            shutter.position()
        );
    }

    for scene in client.group_actions().scenes(installation.id).await? {
        println!("scene {:>3} {}", scene.id, scene.name.as_deref().unwrap_or("-"));
    }

    client.close().await;
    Ok(())
}
