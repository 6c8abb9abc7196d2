// Liveness responder for hosting platforms that probe an HTTP port.

use axum::{Router, routing::get};
use serde_json::json;
use std::net::SocketAddr;
use tracing::{error, info};

pub async fn health_handler() -> axum::Json<serde_json::Value> {
    axum::Json(json!({ "status": "ok" }))
}

/// Build the main router. webhook_router can be passed (via webhooks::axum_to_router)
/// or None to only serve the liveness routes (polling mode and tests).
pub fn build_router(webhook_router: Option<Router>) -> Router {
    let base = Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler));
    match webhook_router {
        Some(r) => base.merge(r),
        None => base,
    }
}

/// Serve the liveness routes on `0.0.0.0:port` in a detached task.
///
/// The task lives as long as the process; a bind failure is logged and the bot keeps running.
pub fn spawn_liveness(port: u16) -> tokio::task::JoinHandle<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tokio::spawn(async move {
        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(l) => l,
            Err(e) => {
                error!("Liveness responder could not bind {addr}: {e}");
                return;
            }
        };
        info!("Liveness responder listening on {addr}");
        if let Err(e) = axum::serve(listener, build_router(None)).await {
            error!("Liveness responder error: {e}");
        }
    })
}
