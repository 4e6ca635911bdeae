//! HTTP binding.
//!
//! Every path goes to the dispatcher; routing lives there, not in axum.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{Method, Uri},
    response::{IntoResponse, Json, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::dispatcher::{Dispatcher, GatewayRequest, GatewayResponse};

impl IntoResponse for GatewayResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        for (name, value) in self.headers {
            response.headers_mut().insert(name, value);
        }
        response
    }
}

/// Create the Axum router; the dispatcher handles every request
pub fn create_router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .fallback(handle_request)
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

async fn handle_request(
    State(dispatcher): State<Arc<Dispatcher>>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> GatewayResponse {
    let body = (!body.is_empty()).then(|| String::from_utf8_lossy(&body).into_owned());

    dispatcher
        .dispatch(GatewayRequest {
            path: uri.path().to_string(),
            method,
            query,
            body,
        })
        .await
}

/// Bind and serve until Ctrl+C / SIGTERM
pub async fn start_server(addr: SocketAddr, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let app = create_router(dispatcher);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("  /download      - download to storage, returns public URL");
    tracing::info!("  /download-url  - direct media URL");
    tracing::info!("  /info          - raw provider metadata");
    tracing::info!("  /playlist      - newest playlist entries");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
