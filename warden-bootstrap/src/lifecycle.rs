use std::time::Duration;

use anyhow::Result;
use tokio::sync::oneshot;
use tokio::time::interval;
use tracing::info;

use warden_application::AppState;
use warden_domain::now_secs;

use crate::context::AppContext;

pub async fn run_standalone() -> Result<()> {
    let context = AppContext::new().await?;
    let state = context.state;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let sweeper = tokio::spawn(run_sweeper(state.clone(), shutdown_rx));

    info!("warden engine ready");
    shutdown_signal().await;
    info!("shutdown requested");

    let _ = shutdown_tx.send(());
    let _ = sweeper.await;
    Ok(())
}

async fn run_sweeper(state: AppState, mut shutdown_rx: oneshot::Receiver<()>) {
    let mut ticker = interval(Duration::from_secs(state.config.sweep_interval_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                state.store.sweep(now_secs()).await;
            }
            _ = &mut shutdown_rx => {
                // Drain the memory tier so nothing hot is lost across a
                // restart; a far-future clock marks every entry idle.
                let drain_point = now_secs() + state.config.memory_ttl_secs as f64 * 2.0;
                state.store.sweep(drain_point).await;
                info!("sweeper stopped");
                return;
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("sigterm handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
