// Connection handling module
// Serves a single accepted TCP connection on its own task

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Serve `stream` on a spawned task.
///
/// HTTP/1.1 with optional keep-alive; the whole connection is bounded by
/// `performance.connection_timeout_secs`.
pub fn handle_connection(stream: tokio::net::TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let performance = &state.config.performance;
        let timeout = Duration::from_secs(performance.connection_timeout_secs);

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, peer_addr, Arc::clone(&service_state))),
        );

        match tokio::time::timeout(timeout, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout.as_secs()
                ));
            }
        }
    });
}
