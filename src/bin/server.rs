use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use portwatch::{
    api::{ApiConfig, ApiState, spawn_api_server},
    config::{Config, read_config_file},
    registry::Registry,
    storage::{JsonStore, SnapshotStore, load_or_empty},
};
use tracing::{debug, error, info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short)]
    file: Option<String>,
}

fn init() {
    let filter = filter::Targets::new().with_targets(vec![
        ("portwatch", LevelFilter::DEBUG),
        ("tower_http", LevelFilter::INFO),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = match &args.file {
        Some(path) => read_config_file(path)?,
        None => Config::default(),
    };

    let store: Arc<dyn SnapshotStore> = Arc::new(JsonStore::new(&config.data_dir));
    let registry = Arc::new(Registry::new(&config));

    // Rehydrate persisted monitors; a missing or unreadable store is an
    // empty state, not a startup failure. Restored monitors auto-start.
    let persisted = load_or_empty(store.as_ref()).await;
    registry.restore(persisted).await;

    let api_state = ApiState::new(registry.clone(), store.clone());
    let api_config = ApiConfig {
        bind_addr: config.bind_addr,
        ..Default::default()
    };
    let addr = spawn_api_server(api_config, api_state).await?;
    info!("portwatch running on http://{addr}");
    info!("state is saved to {}", config.data_dir.display());

    let saver = spawn_periodic_save(
        registry.clone(),
        store.clone(),
        Duration::from_secs(config.save_interval_secs),
    );

    shutdown_signal().await;
    info!("shutting down gracefully");

    // stop the periodic saver so the shutdown flush happens exactly once
    saver.abort();

    let state = registry.export().await;
    if let Err(e) = store.save(&state).await {
        error!("failed to save state on shutdown: {e}");
    }

    registry.shutdown().await;

    Ok(())
}

/// Periodically persist the full state so a crash loses at most one window.
fn spawn_periodic_save(
    registry: Arc<Registry>,
    store: Arc<dyn SnapshotStore>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // the first tick completes immediately; skip it
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let state = registry.export().await;
            match store.save(&state).await {
                Ok(()) => debug!("periodic save complete ({} monitors)", state.monitors.len()),
                Err(e) => warn!("periodic save failed: {e}"),
            }
        }
    })
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = match signal(SignalKind::terminate()) {
            Ok(term) => term,
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
