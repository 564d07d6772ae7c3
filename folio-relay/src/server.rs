/// HTTP server implementation (Axum)
///
/// Routing, middleware and the listener loop for the relay.

use std::sync::Arc;

use axum::http::{header, Method, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use folio_core::{RelayReply, CONTACT_PATH};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::RelaySettings;
use crate::contact::{method_not_allowed, relay_contact};
use crate::mailer::SmtpMailer;
use crate::state::RelayState;

/// Build the relay router
pub fn create_router(state: RelayState) -> Router {
    Router::new()
        .route(
            CONTACT_PATH,
            post(relay_contact).fallback(method_not_allowed),
        )
        .route("/health", get(health))
        .fallback(|| async {
            tracing::debug!(target: "folio-relay", "unmatched request");
            (StatusCode::NOT_FOUND, Json(RelayReply::failure("Not found")))
        })
        .with_state(state)
        .layer(create_cors_layer())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        target: "folio-relay",
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::debug!(
                            target: "folio-relay",
                            status = response.status().as_u16(),
                            latency_ms = latency.as_millis() as u64,
                            "response"
                        );
                    },
                ),
        )
}

async fn health() -> Json<RelayReply> {
    Json(RelayReply::success())
}

/// The page may be served from another origin than the relay
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Bind and serve until ctrl-c
pub async fn serve(settings: RelaySettings) -> std::io::Result<()> {
    let addr = settings.bind_addr;
    let transport = Arc::new(SmtpMailer::new(settings.mail.clone()));
    let state = RelayState::new(settings, transport);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(target: "folio-relay", "listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(target: "folio-relay", error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!(target: "folio-relay", "shutting down");
}
