use std::time::Duration;

use log::{error, info, warn};
use tokio::sync::watch;

use crate::api::binance::ws::{self, FeedExit};
use crate::config::Config;
use crate::error::Result;
use crate::monitor::alerts::AlertEngine;
use crate::monitor::notifier::{MessageSender, Notifier};
use crate::monitor::pipeline::AlertPipeline;

/// How long the feed task gets to close the socket after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Connects, spawns the feed task and waits for it to end or for a
/// shutdown signal, whichever comes first.
pub async fn run<S>(config: Config, sender: S) -> Result<()>
where
    S: MessageSender + 'static,
{
    let ws_stream = ws::connect_to_trades(&config.feed.ws_base_url, &config.targets).await?;

    let notifier = Notifier::new(sender, config.telegram.chat_ids.clone());
    let pipeline = AlertPipeline::new(
        AlertEngine::new(config.targets),
        config.alerts.cooldown(),
        notifier,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut feed_handle = tokio::spawn(ws::run_feed(ws_stream, pipeline, shutdown_rx));

    tokio::select! {
        exit = &mut feed_handle => {
            match exit {
                Ok(FeedExit::Failed) => error!("Price feed failed, shutting down"),
                Ok(exit) => info!("Price feed stopped ({:?}), shutting down", exit),
                Err(e) => error!("Price feed task panicked: {}", e),
            }
        }
        _ = shutdown_signal() => {
            info!("Shutting down...");
            let _ = shutdown_tx.send(true);
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut feed_handle).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => error!("Price feed task panicked: {}", e),
                Err(_) => {
                    warn!(
                        "Price feed did not stop within {:?}, aborting it",
                        SHUTDOWN_GRACE
                    );
                    feed_handle.abort();
                }
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received interrupt"),
        _ = terminate => info!("Received terminate signal"),
    }
}
