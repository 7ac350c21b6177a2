//! Application router assembly and HTTP serving.
//!
//! Wires the feature routers under `/api`, applies the shared middleware
//! stack, and serves with graceful shutdown. Layer order matters here:
//! request IDs and tracing wrap everything, authentication runs innermost
//! so route handlers see the resolved user.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::catalog::{course_routes, CatalogAppState};
use super::error::ErrorResponse;
use super::middleware::{auth_middleware, AuthState};
use super::payments::{payment_routes, webhook_routes, PaymentsAppState};
use super::profile::{profile_routes, ProfileAppState};

/// Assemble the application router.
///
/// The webhook router shares the payments state: webhook deliveries and
/// buyer-facing payment requests reconcile against the same stores.
pub fn api_router(
    payments: PaymentsAppState,
    profile: ProfileAppState,
    catalog: CatalogAppState,
    auth: AuthState,
    config: &ServerConfig,
) -> Router {
    Router::new()
        .nest(
            "/api/payments",
            payment_routes().with_state(payments.clone()),
        )
        .nest("/api/webhooks", webhook_routes().with_state(payments))
        .nest("/api/users", profile_routes().with_state(profile))
        .nest("/api/courses", course_routes().with_state(catalog))
        .route("/health", get(health_check))
        .fallback(not_found)
        .layer(from_fn_with_state(auth, auth_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(cors_layer(config))
        .layer(CompressionLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Bind and serve until the process receives ctrl-c.
///
/// The shutdown sender is flipped when the signal arrives so the
/// background worker drains alongside the HTTP connection drain.
pub async fn serve(
    app: Router,
    addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
}

async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");

    tracing::info!("Shutdown signal received, draining");
    let _ = shutdown_tx.send(true);
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins = config.cors_origins_list();

    if origins.is_empty() {
        // No origins configured: open policy for local development.
        return CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::PATCH])
            .allow_headers(Any)
            .allow_origin(Any);
    }

    let list: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring malformed CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(list)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("NOT_FOUND", "Resource not found")),
    )
}
