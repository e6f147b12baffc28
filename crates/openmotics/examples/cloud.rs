//! List installations and outputs through the OpenMotics cloud
//!
//! ## Usage
//!
//! ```bash
//! export OPENMOTICS_CLIENT_ID=...
//! export OPENMOTICS_CLIENT_SECRET=...
//! RUST_LOG=openmotics=debug cargo run --example cloud --features full
//! ```
//!
//! The variables may also live in a `.env` file in the working directory.

use anyhow::Context;
use openmotics::Client;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let client = Client::from_env().context("reading OPENMOTICS_* settings")?;

    client
        .scope(|client| async move {
            for installation in client.installations().list(None).await? {
                println!(
                    "Installation {} ({})",
                    installation.id,
                    installation.name.as_deref().unwrap_or("unnamed")
                );

                for output in client.outputs().list(installation.id, None).await? {
                    println!(
                        "  output {:>3} {:<24} {}",
                        output.id,
                        output.name.as_deref().unwrap_or("-"),
                        if output.is_on() { "on" } else { "off" }
                    );
                }
            }
            Ok(())
        })
        .await?;

    Ok(())
}
