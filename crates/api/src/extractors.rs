//! Request extractors.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` whose rejections are reported as [`ApiError`] validation
/// failures instead of plain-text bodies.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
