// src/main.rs
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pulse_beacon::{
    BadgeUrlBuilder, FileConfigStore, HeartbeatDispatcher, InstanceIdentity,
    StaticMetrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let store = FileConfigStore::from_env();
    let (mut config, created) = store.load_or_init().context("loading config")?;
    config.apply_env().context("applying PULSE_* overrides")?;
    config.validate()?;

    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
    if created {
        info!(path = %store.path().display(), "wrote default config");
    } else {
        info!(path = %store.path().display(), "config loaded");
    }

    let (identity, source) =
        InstanceIdentity::establish(&store, &mut config).context("establishing identity")?;
    info!(public_id = %identity.public_id(), ?source, "identity ready");

    let metrics = Arc::new(StaticMetrics::from_env());
    let handle = HeartbeatDispatcher::from_config(&config, &identity, metrics)?.spawn();

    let badges = BadgeUrlBuilder::new(&config.badge_url, identity.public_id().clone());
    info!("badge URLs:");
    for (kind, url) in badges.all() {
        info!("{:<9} {url}", format!("{kind}:"));
    }

    info!("pulse-beacon running");
    tokio::signal::ctrl_c().await?;

    let status = handle.status();
    handle.shutdown().await;
    info!(
        cycles = status.cycles_triggered,
        delivered = status.delivered,
        failed = status.failed,
        "pulse-beacon stopped"
    );
    Ok(())
}
