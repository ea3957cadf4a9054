// Accept loop module
// Runs the listener until a shutdown signal arrives

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;
use crate::server::connection::accept_connection;
use crate::server::signal::spawn_shutdown_listener;

/// Accept connections until shutdown is requested.
///
/// Each accepted connection is handed off to its own local task; the
/// loop itself never blocks on request processing.
pub async fn run(
    listener: TcpListener,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = spawn_shutdown_listener();
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => {
                logger::log_server_stopped();
                return Ok(());
            }
        }
    }
}
