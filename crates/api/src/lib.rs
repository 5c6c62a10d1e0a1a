//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - Wallet routes under `/api/v1/wallet`
//! - Request digest authentication middleware
//! - JSON extractors and error responses

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::HeaderName;
use axum::{BoxError, Router};
use ewallet_core::auth::{ClientSecretStore, RequestAuthenticator};
use ewallet_core::ledger::{LedgerRepository, LedgerService, RetryPolicy};
use ewallet_shared::AppError;
use tower::ServiceBuilder;
use tower::timeout::error::Elapsed;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Ledger service as shared by handlers.
pub type SharedLedger = LedgerService<Arc<dyn LedgerRepository>>;

/// Request authenticator as shared by the middleware.
pub type SharedAuthenticator = RequestAuthenticator<Arc<dyn ClientSecretStore>>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Wallet ledger operations.
    pub ledger: Arc<SharedLedger>,
    /// Digest verification for inbound requests.
    pub authenticator: Arc<SharedAuthenticator>,
}

impl AppState {
    /// Wires the ledger and authenticator over their storage backends.
    pub fn new(
        repository: Arc<dyn LedgerRepository>,
        clients: Arc<dyn ClientSecretStore>,
        top_up_retry_budget: Duration,
    ) -> Self {
        Self {
            ledger: Arc::new(
                LedgerService::new(repository)
                    .with_retry_policy(RetryPolicy::with_budget(top_up_retry_budget)),
            ),
            authenticator: Arc::new(RequestAuthenticator::new(clients)),
        }
    }
}

/// Creates the main application router.
///
/// Every request is bounded by `request_timeout`; an expired request is
/// answered with a `408` error body and its in-flight work is dropped.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout),
        )
        .layer(TraceLayer::new_for_http())
        .layer(SetSensitiveRequestHeadersLayer::new([HeaderName::from_static(
            middleware::digest::DIGEST_HEADER,
        )]))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError(AppError::Timeout)
    } else {
        ApiError(AppError::Internal(err.to_string()))
    }
}
