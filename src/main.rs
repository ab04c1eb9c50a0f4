use std::sync::Arc;

mod config;
mod contact;
mod handler;
mod http;
mod logger;
mod notify;
mod server;

#[cfg(test)]
mod testing;

fn main() {
    let cfg = match config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cfg) {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}

fn run(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    logger::init(&cfg)?;

    // Build the Tokio runtime, sized by server.workers when configured
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;
    let state = Arc::new(config::AppState::from_config(cfg)?);

    logger::log_server_start(&addr, &state.config);
    logger::log_info(&format!("Message log: {}", state.store.path().display()));

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    server::start_server_loop(listener, state, Arc::clone(&signals.shutdown)).await?;
    Ok(())
}
