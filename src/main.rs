use clap::Parser; // for cli
use ollama_relay::{AppState, Args, app, logging};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // parse cli arguments
    let args = Args::parse();
    logging::init_logging();

    let state = AppState::from_args(&args);
    let upstream_url = state.upstream.base_url().to_string();
    let app = app(state);

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(addr = %addr, "relay listening");
    info!(ollama = %upstream_url, model = %args.model, "forwarding to Ollama");
    info!(
        generate = args.generate_timeout,
        pull = args.pull_timeout,
        tags = args.tags_timeout,
        "upstream timeouts (s)"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received, shutting down gracefully"),
        Err(e) => {
            warn!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await
        }
    }
}
