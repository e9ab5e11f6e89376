use anyhow::Result;
use axum::{Router, routing::get};
use clap::Parser;
use huddle_relay::{AppState, ws_handler};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Signaling relay for full-mesh huddle rooms. Forwards opaque negotiation
/// payloads between participants; never touches media.
#[derive(Parser)]
#[command(name = "huddle-relay")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "HUDDLE_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = AppState::new();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state);

    info!("Signaling relay listening on http://{}", args.bind);

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
