//! Headless display: mirrors the live event state of a running server and logs every change.

use std::sync::Arc;

use anyhow::Context;
use awards_live_back::{
    config::AppConfig,
    sync::{FactListener, HttpSnapshotSource, Poller, ScoreboardRefresher, SnapshotSource, ViewHandle},
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Scoreboard entries written to the log on each refresh.
const LOGGED_RANKS: usize = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load();
    let view = ViewHandle::new();
    let http = Arc::new(
        HttpSnapshotSource::new(&config.server_url, config.poll_timeout)
            .context("building snapshot client")?,
    );
    let source: Arc<dyn SnapshotSource> = http.clone();
    let listener = FactListener::new(&config.server_url, view.clone(), source.clone())
        .context("resolving relay address")?;
    let poller = Poller::new(source, view.clone(), config.poll_interval);
    let scoreboard = ScoreboardRefresher::new(http.clone(), view.clone());

    info!(server = %http.base_url(), "mirroring live event state");
    let listener_task = tokio::spawn(listener.run());
    let poller_task = tokio::spawn(poller.run());

    let mut changes = view.subscribe();
    let mut retry = tokio::time::interval(config.poll_interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = changes.borrow_and_update().clone();
                let state = current.state();
                info!(
                    title = %state.event_title,
                    locked = state.predictions_locked,
                    screen = ?state.active_screen,
                    winners = state.winners.len(),
                    "view updated"
                );
                refresh_scoreboard(&scoreboard).await;
            }
            // Retries a pull that failed while the view stayed unchanged.
            _ = retry.tick() => refresh_scoreboard(&scoreboard).await,
            _ = &mut shutdown => break,
        }
    }

    listener_task.abort();
    poller_task.abort();
    Ok(())
}

async fn refresh_scoreboard(scoreboard: &ScoreboardRefresher) {
    match scoreboard.refresh_if_stale().await {
        Ok(Some(ranked)) => {
            for (rank, entry) in ranked.iter().take(LOGGED_RANKS).enumerate() {
                info!(rank = rank + 1, guest = %entry.guest.name, score = entry.score, "scoreboard");
            }
        }
        // Failed pulls are logged by the refresher.
        Ok(None) | Err(_) => {}
    }
}
