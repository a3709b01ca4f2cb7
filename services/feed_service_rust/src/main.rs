mod config;
mod managers;
mod state;

use crate::config::Config;
use crate::managers::feed_manager::FeedManager;
use anyhow::{Context, Result};
use cricket_rust_core::clients::cricbuzz::CricbuzzClient;
use cricket_rust_core::providers::CricbuzzFeed;
use cricket_rust_core::store::RedisDocumentStore;
use cricket_rust_core::{CricketFeed, DocumentStore};
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting Cricket Feed Service...");

    let config = Config::from_env();

    // Upstream
    let client = CricbuzzClient::new(config.cricbuzz.clone())
        .context("Failed to build Cricbuzz client")?;
    let feed: Arc<dyn CricketFeed> = Arc::new(CricbuzzFeed::new(client));

    // Storage
    let store: Arc<dyn DocumentStore> = Arc::new(
        RedisDocumentStore::connect(&config.redis_url)
            .await
            .context("Failed to initialize document store")?,
    );

    let feed_manager = Arc::new(FeedManager::new(feed, store, config.pacing.clone()));

    if config.run_once {
        info!("RUN_ONCE set, running a single cycle");
        let outcome = feed_manager.run_single(config.cycle_timeout).await?;
        info!("Single cycle finished: {:?}", outcome);
        return Ok(());
    }

    let scheduler = tokio::spawn(schedule(
        feed_manager.clone(),
        config.fetch_interval,
        config.cycle_timeout,
    ));

    // Wait for signal
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
        }
    }

    scheduler.abort();
    Ok(())
}

/// Start a cycle on every tick. Cycles run detached so a slow one never delays
/// the schedule; overlapping ticks are skipped by the manager.
async fn schedule(feed_manager: Arc<FeedManager>, every: Duration, limit: Duration) {
    info!("Fetch loop started (interval: {}s)", every.as_secs());

    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let fm = feed_manager.clone();
        tokio::spawn(async move {
            fm.run_bounded(limit).await;
        });
    }
}
