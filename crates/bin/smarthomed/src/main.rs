//! # smarthomed: smarthome daemon
//!
//! Composition root that wires every crate together and runs the configured
//! things until interrupted.
//!
//! ## Responsibilities
//! - Parse configuration (`smarthome.toml`, env vars)
//! - Install the `tracing` subscriber
//! - Load descriptor modules (embedded bindings, addons directory) into the
//!   type registries
//! - Register binding handler factories with the thing manager
//! - Create the configured things and log every thing event
//! - Handle graceful shutdown (Ctrl-C): remove things, children first
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

use anyhow::Context;
use smarthome_domain::event::Event;
use smarthomed::config::Config;
use smarthomed::runtime::Runtime;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing_subscriber::EnvFilter;

fn log_event(event: &Event) {
    tracing::info!(
        id = %event.id,
        thing = %event.thing_uid(),
        kind = ?event.kind,
        "thing event"
    );
}

async fn log_events(mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(event) => log_event(&event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event log fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("cannot load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting smarthomed");

    let runtime = Runtime::start(&config)
        .await
        .context("cannot start runtime")?;
    let logger = tokio::spawn(log_events(runtime.subscribe()));

    let added = runtime.create_things(&config.things);
    tracing::info!(
        things = added.len(),
        configured = config.things.len(),
        "things created"
    );

    tokio::signal::ctrl_c()
        .await
        .context("cannot listen for shutdown signal")?;
    tracing::info!("shutting down");

    runtime.shutdown();
    logger.abort();
    Ok(())
}
