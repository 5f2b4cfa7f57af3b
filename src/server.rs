//! HTTP front-end for the identity provider.
//!
//! Routes:
//! - `GET  /servers/{serverId}/users/{username}/config` - API Gateway style
//!   lookup: `Password` header, `protocol` and `sourceIp` query parameters
//! - `POST /authenticate` - raw invocation event as the JSON body
//! - `GET  /health`       - liveness probe
//!
//! Both login routes always answer 200 with the response JSON; a denied or
//! malformed request gets `{}` so the status never hints at the reason.

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::signal;
use tracing::warn;

use crate::error::IdpError;
use crate::handler::AuthDecisionHandler;
use crate::protocol::{AuthRequest, AuthResponse, Password, Protocol};

/// Header carrying the password on the API Gateway route (`Password`; header
/// names are case-insensitive).
pub const PASSWORD_HEADER: &str = "password";

/// Build the router over a shared handler.
pub fn create_router(handler: AuthDecisionHandler) -> Router {
    Router::new()
        .route(
            "/servers/{server_id}/users/{username}/config",
            get(handle_user_config),
        )
        .route("/authenticate", post(handle_authenticate))
        .route("/health", get(handle_health))
        .with_state(handler)
}

/// Serve until SIGINT/SIGTERM.
pub async fn serve(handler: AuthDecisionHandler, bind: SocketAddr) -> Result<(), IdpError> {
    let listener = tokio::net::TcpListener::bind(bind).await.map_err(|e| {
        IdpError::Server(format!("Failed to bind {}: {}", bind, e))
    })?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| IdpError::Server(format!("Failed to get local address: {}", e)))?;
    tracing::info!(%local_addr, "HTTP server listening");

    axum::serve(listener, create_router(handler))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| IdpError::Server(format!("HTTP server error: {}", e)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfigQuery {
    protocol: Option<String>,
    source_ip: Option<String>,
}

/// `GET /servers/{serverId}/users/{username}/config`
async fn handle_user_config(
    State(handler): State<AuthDecisionHandler>,
    Path((server_id, username)): Path<(String, String)>,
    Query(query): Query<UserConfigQuery>,
    headers: HeaderMap,
) -> Json<AuthResponse> {
    let password = match headers.get(PASSWORD_HEADER) {
        Some(value) => match value.to_str() {
            Ok(text) => Some(Password::new(text)),
            Err(_) => {
                warn!("Password header is not valid text - Denying");
                return Json(AuthResponse::deny());
            }
        },
        None => None,
    };

    let request = AuthRequest {
        username: Some(username),
        server_id: Some(server_id),
        protocol: query.protocol.map(Protocol::from),
        password,
        source_ip: query.source_ip,
    };
    Json(handler.authenticate(&request).await)
}

/// `POST /authenticate`
async fn handle_authenticate(
    State(handler): State<AuthDecisionHandler>,
    body: Bytes,
) -> Json<AuthResponse> {
    match AuthRequest::from_slice(&body) {
        Ok(request) => Json(handler.authenticate(&request).await),
        Err(err) => {
            warn!("{} - Denying", err);
            Json(AuthResponse::deny())
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    configured: bool,
}

/// `GET /health`
async fn handle_health(State(handler): State<AuthDecisionHandler>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        configured: handler.config().storage().is_ok(),
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
