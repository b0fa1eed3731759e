// src/main.rs
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use votechain_backend::gateway::InMemoryGateway;
use votechain_backend::handlers::AppState;
use votechain_backend::routes;
use votechain_backend::wallet::EnvWallet;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok(); // Load environment variables from .env file

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("votechain_backend=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get the port from the environment (default to 3030 for local development)
    let port = env::var("PORT")
        .ok()
        .and_then(|port| port.parse::<u16>().ok())
        .unwrap_or(3030);

    // The in-memory gateway stands in for the chain-backed one during local
    // development; the dev wallet address comes from VOTECHAIN_WALLET_ADDR.
    let state = AppState {
        gateway: Arc::new(InMemoryGateway::new()),
        wallet: Arc::new(EnvWallet::from_env()),
    };

    let app = routes::create_routes(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "votechain backend listening");
    if let Err(err) = axum_server::bind(addr).serve(app.into_make_service()).await {
        error!(%err, "server exited with error");
    }
}
