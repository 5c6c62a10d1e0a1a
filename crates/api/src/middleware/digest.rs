//! Request digest authentication.
//!
//! Protected routes require two headers: `X-UserId` carrying the client's API
//! key and `X-Digest` carrying the hex HMAC-SHA256 of the raw request body
//! keyed with the client's secret. The body is buffered for verification and
//! handed on unchanged.

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use ewallet_shared::AppError;
use tracing::debug;

use crate::{AppState, error::ApiError};

/// Header carrying the client's API key.
pub const USER_ID_HEADER: &str = "x-userid";

/// Header carrying the hex body digest.
pub const DIGEST_HEADER: &str = "x-digest";

/// Largest request body accepted for digest verification.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Authenticates the request and stores the caller's `ClientId` in its
/// extensions.
pub async fn digest_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "Failed to read request body");
            return ApiError(AppError::Validation(
                "Request body is unreadable or too large".to_string(),
            ))
            .into_response();
        }
    };

    let authenticated = state
        .authenticator
        .authenticate(
            header_value(&parts.headers, USER_ID_HEADER),
            header_value(&parts.headers, DIGEST_HEADER),
            &bytes,
        )
        .await;

    match authenticated {
        Ok(client_id) => {
            let mut request = Request::from_parts(parts, Body::from(bytes));
            request.extensions_mut().insert(client_id);
            next.run(request).await
        }
        Err(e) => {
            debug!(error = %e, uri = %parts.uri, "Request rejected by authenticator");
            ApiError::from(e).into_response()
        }
    }
}
