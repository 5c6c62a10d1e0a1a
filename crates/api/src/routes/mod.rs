//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::digest_middleware};

pub mod health;
pub mod wallet;

/// Creates the API router; wallet routes sit behind digest authentication.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(wallet::routes())
        .layer(middleware::from_fn_with_state(state, digest_middleware));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
