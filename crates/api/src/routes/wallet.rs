//! Wallet routes.
//!
//! All endpoints are `POST` with a JSON body naming the wallet as `walletID`.

use axum::{
    Extension, Json, Router,
    extract::State,
    routing::post,
};
use ewallet_core::ledger::MonthlyTopUpStats;
use ewallet_core::transaction::Transaction;
use ewallet_shared::types::{ClientId, PageRequest, WalletId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppState, error::ApiError, extractors::ApiJson};

/// Creates the wallet routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/wallet/exists", post(check_exists))
        .route("/wallet/top-up", post(top_up))
        .route("/wallet/stats", post(monthly_stats))
        .route("/wallet/balance", post(balance))
        .route("/wallet/transactions", post(list_transactions))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body naming a wallet.
#[derive(Debug, Deserialize)]
pub struct WalletRequest {
    /// Wallet ID.
    #[serde(rename = "walletID")]
    pub wallet_id: WalletId,
}

/// Request body for a top-up.
#[derive(Debug, Deserialize)]
pub struct TopUpRequest {
    /// Wallet ID.
    #[serde(rename = "walletID")]
    pub wallet_id: WalletId,
    /// Amount to credit, as a decimal string or JSON number.
    pub amount: Decimal,
}

/// Request body for a transaction history page.
#[derive(Debug, Deserialize)]
pub struct TransactionsRequest {
    /// Wallet ID.
    #[serde(rename = "walletID")]
    pub wallet_id: WalletId,
    /// Page selection.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// Response for an existence check.
#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    /// Whether the wallet exists.
    pub exists: bool,
}

/// Response for a committed top-up.
#[derive(Debug, Serialize)]
pub struct TopUpResponse {
    /// Confirmation message.
    pub message: &'static str,
    /// The recorded transaction.
    pub transaction: Transaction,
}

/// Response for a balance query.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Current balance.
    pub balance: Decimal,
}

/// Response for a transaction history page.
#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    /// Transactions, newest first.
    pub transactions: Vec<Transaction>,
    /// Page number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
}

// ============================================================================
// Handlers
// ============================================================================

async fn check_exists(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<WalletRequest>,
) -> Result<Json<ExistsResponse>, ApiError> {
    let exists = state.ledger.check_exists(req.wallet_id).await?;
    Ok(Json(ExistsResponse { exists }))
}

async fn top_up(
    State(state): State<AppState>,
    Extension(client_id): Extension<ClientId>,
    ApiJson(req): ApiJson<TopUpRequest>,
) -> Result<Json<TopUpResponse>, ApiError> {
    let transaction = state.ledger.top_up(req.wallet_id, req.amount).await?;

    info!(
        client_id = %client_id,
        wallet_id = %req.wallet_id,
        transaction_id = %transaction.id,
        "Top-up accepted"
    );

    Ok(Json(TopUpResponse {
        message: "Wallet topped up successfully",
        transaction,
    }))
}

async fn monthly_stats(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<WalletRequest>,
) -> Result<Json<MonthlyTopUpStats>, ApiError> {
    let stats = state.ledger.monthly_top_up_stats(req.wallet_id).await?;
    Ok(Json(stats))
}

async fn balance(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<WalletRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.ledger.get_balance(req.wallet_id).await?;
    Ok(Json(BalanceResponse { balance }))
}

async fn list_transactions(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TransactionsRequest>,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let page = PageRequest::new(req.page.page, req.page.per_page);
    let transactions = state.ledger.transactions(req.wallet_id, page).await?;

    Ok(Json(TransactionsResponse {
        transactions,
        page: page.page,
        per_page: page.per_page,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use ewallet_core::auth::{ClientCredentials, InMemoryClientStore, compute_digest};
    use ewallet_core::ledger::{InMemoryLedgerRepository, LedgerRepository};
    use ewallet_core::wallet::{Wallet, WalletType};
    use ewallet_shared::types::Currency;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::create_router;

    struct Harness {
        router: Router,
        repository: InMemoryLedgerRepository,
        clients: InMemoryClientStore,
        client: ClientCredentials,
    }

    fn harness() -> Harness {
        let repository = InMemoryLedgerRepository::new();
        let clients = InMemoryClientStore::new();
        let client = ClientCredentials {
            id: ClientId::new(),
            api_key: "merchant-key".to_string(),
            secret_key: "merchant-secret".to_string(),
        };
        clients.insert(client.clone());

        let state = AppState::new(
            Arc::new(repository.clone()),
            Arc::new(clients.clone()),
            Duration::from_secs(1),
        );

        Harness {
            router: create_router(state, Duration::from_secs(5)),
            repository,
            clients,
            client,
        }
    }

    async fn provision(harness: &Harness, wallet_type: WalletType) -> WalletId {
        let wallet = Wallet::new(wallet_type, Currency::Tjs);
        harness.repository.create(&wallet).await.unwrap();
        wallet.id()
    }

    fn signed(uri: &str, body: &Value, client: &ClientCredentials) -> Request<Body> {
        let bytes = serde_json::to_vec(body).unwrap();
        let digest = compute_digest(client.secret_key.as_bytes(), &bytes).unwrap();
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("X-UserId", client.api_key.as_str())
            .header("X-Digest", digest)
            .body(Body::from(bytes))
            .unwrap()
    }

    async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let h = harness();
        let request = Request::builder()
            .uri("/api/v1/health")
            .body(Body::empty())
            .unwrap();

        let (status, body) = call(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_missing_headers_are_rejected() {
        let h = harness();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/wallet/exists")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"walletID":"00000000-0000-0000-0000-000000000001"}"#))
            .unwrap();

        let (status, body) = call(&h.router, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_tampered_body_is_rejected() {
        let h = harness();
        let wallet_id = provision(&h, WalletType::Identified).await;

        let mut request = signed(
            "/api/v1/wallet/top-up",
            &json!({"walletID": wallet_id, "amount": "10"}),
            &h.client,
        );
        *request.body_mut() =
            Body::from(json!({"walletID": wallet_id, "amount": "9000"}).to_string());

        let (status, _) = call(&h.router, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(h.repository.transaction_count(wallet_id), 0);
    }

    #[tokio::test]
    async fn test_deactivated_client_is_rejected() {
        let h = harness();
        assert!(h.clients.deactivate(&h.client.api_key));

        let request = signed(
            "/api/v1/wallet/exists",
            &json!({"walletID": WalletId::new()}),
            &h.client,
        );
        let (status, _) = call(&h.router, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_exists() {
        let h = harness();
        let wallet_id = provision(&h, WalletType::Identified).await;

        let request = signed("/api/v1/wallet/exists", &json!({"walletID": wallet_id}), &h.client);
        let (status, body) = call(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"exists": true}));

        let request = signed(
            "/api/v1/wallet/exists",
            &json!({"walletID": WalletId::new()}),
            &h.client,
        );
        let (_, body) = call(&h.router, request).await;
        assert_eq!(body, json!({"exists": false}));
    }

    #[tokio::test]
    async fn test_top_up_then_read_balance_stats_and_history() {
        let h = harness();
        let wallet_id = provision(&h, WalletType::Identified).await;

        for amount in [json!(100), json!("50.5")] {
            let request = signed(
                "/api/v1/wallet/top-up",
                &json!({"walletID": wallet_id, "amount": amount}),
                &h.client,
            );
            let (status, body) = call(&h.router, request).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["transaction"]["transaction_type"], "TOP_UP");
        }

        let request = signed("/api/v1/wallet/balance", &json!({"walletID": wallet_id}), &h.client);
        let (status, body) = call(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balance"], "150.5");

        let request = signed("/api/v1/wallet/stats", &json!({"walletID": wallet_id}), &h.client);
        let (status, body) = call(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["sum"], "150.5");

        let request = signed(
            "/api/v1/wallet/transactions",
            &json!({"walletID": wallet_id, "per_page": 1}),
            &h.client,
        );
        let (status, body) = call(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 1);
        assert_eq!(body["per_page"], 1);
        let transactions = body["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0]["amount"], "50.5");
    }

    #[tokio::test]
    async fn test_top_up_over_ceiling_is_unprocessable() {
        let h = harness();
        let wallet_id = provision(&h, WalletType::Unidentified).await;

        let request = signed(
            "/api/v1/wallet/top-up",
            &json!({"walletID": wallet_id, "amount": "10000"}),
            &h.client,
        );
        let (status, _) = call(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);

        let request = signed(
            "/api/v1/wallet/top-up",
            &json!({"walletID": wallet_id, "amount": "0.01"}),
            &h.client,
        );
        let (status, body) = call(&h.router, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "BUSINESS_RULE_VIOLATION");
        assert_eq!(h.repository.transaction_count(wallet_id), 1);
    }

    #[tokio::test]
    async fn test_invalid_amounts_are_bad_requests() {
        let h = harness();
        let wallet_id = provision(&h, WalletType::Identified).await;

        for amount in ["0", "-5", "0.00001"] {
            let request = signed(
                "/api/v1/wallet/top-up",
                &json!({"walletID": wallet_id, "amount": amount}),
                &h.client,
            );
            let (status, body) = call(&h.router, request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "amount {amount}");
            assert_eq!(body["error"], "VALIDATION_ERROR");
        }
        assert_eq!(h.repository.transaction_count(wallet_id), 0);
    }

    #[tokio::test]
    async fn test_unknown_wallet_is_not_found() {
        let h = harness();

        let request = signed(
            "/api/v1/wallet/balance",
            &json!({"walletID": WalletId::new()}),
            &h.client,
        );
        let (status, body) = call(&h.router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_malformed_wallet_id_is_bad_request() {
        let h = harness();

        let request = signed(
            "/api/v1/wallet/balance",
            &json!({"walletID": "not-a-uuid"}),
            &h.client,
        );
        let (status, body) = call(&h.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }
}
