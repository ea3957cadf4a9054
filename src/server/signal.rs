// Signal handling module
//
// SIGTERM and SIGINT (Ctrl+C) stop the accept loop; in-flight requests
// finish in their own tasks.

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Spawn the signal listener and return the shutdown notifier the accept
/// loop waits on.
#[cfg(unix)]
pub fn spawn_shutdown_listener() -> Arc<Notify> {
    use tokio::signal::unix::{signal, SignalKind};

    let notify = Arc::new(Notify::new());
    let shutdown = Arc::clone(&notify);

    tokio::spawn(async move {
        let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
            logger::log_error("Failed to register SIGTERM handler");
            return;
        };
        let Ok(mut sigint) = signal(SignalKind::interrupt()) else {
            logger::log_error("Failed to register SIGINT handler");
            return;
        };

        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }

        logger::log_shutdown_requested();
        shutdown.notify_waiters();
    });

    notify
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn spawn_shutdown_listener() -> Arc<Notify> {
    let notify = Arc::new(Notify::new());
    let shutdown = Arc::clone(&notify);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logger::log_shutdown_requested();
            shutdown.notify_waiters();
        }
    });

    notify
}
