//! The relay server.
//!
//! A stateless translation layer: one route, `POST /api/chat`, backed by a
//! process-wide provider handle shared across requests. Each request is
//! handled independently on the runtime; the relay itself keeps nothing
//! between invocations.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::provider::ChatProvider;

pub mod relay;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ChatProvider>,
}

/// Build the relay router. Split out from [`run`] so tests can drive the
/// service without binding a socket.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(relay::relay_chat))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run(
    listen_addr: &str,
    provider: Arc<dyn ChatProvider>,
) -> Result<(), Box<dyn Error>> {
    let addr: SocketAddr = listen_addr.parse()?;
    let app = router(AppState { provider });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("relay listening on http://{addr}");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
