// Server loop module
// Accepts connections until shutdown is signalled

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::handle_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections and hand each one to its own task.
///
/// Returns once `shutdown` is notified. Connections already being served
/// and detached notifications keep running on the runtime.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) -> std::io::Result<()> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        handle_connection(stream, peer_addr, Arc::clone(&state));
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => {
                logger::log_info("Shutdown requested, no longer accepting connections");
                return Ok(());
            }
        }
    }
}
