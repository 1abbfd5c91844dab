use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};

use crate::auth::AuthenticatedMerchant;
use crate::errors::ServiceError;
use crate::extract::Json;
use crate::handlers::AppState;
use crate::services::payments::{CreatePaymentRequest, PaymentResponse, PaymentScope};

/// Create a payment against an order (merchant-scoped).
///
/// The response carries the terminal status: the request blocks for the
/// simulated settlement delay before returning.
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment settled (success or failed)", body = PaymentResponse),
        (status = 400, description = "Invalid method or instrument", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown or not-owned order", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = [])),
    tag = "Payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    merchant: AuthenticatedMerchant,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ServiceError> {
    let payment = state
        .services
        .payments
        .create_payment(request, PaymentScope::Merchant(merchant.id))
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Create a payment from the checkout page (no credentials; the order is
/// resolved by id and the merchant derived from it)
#[utoipa::path(
    post,
    path = "/api/v1/payments/public",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment settled (success or failed)", body = PaymentResponse),
        (status = 400, description = "Invalid method or instrument", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown order", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn create_public_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ServiceError> {
    let payment = state
        .services
        .payments
        .create_payment(request, PaymentScope::Public)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Get a payment (merchant-scoped)
#[utoipa::path(
    get,
    path = "/api/v1/payments/{payment_id}",
    params(("payment_id" = String, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment details", body = PaymentResponse),
        (status = 404, description = "Unknown or not-owned payment", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = [])),
    tag = "Payments"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
    merchant: AuthenticatedMerchant,
) -> Result<Json<PaymentResponse>, ServiceError> {
    let payment = state
        .services
        .payments
        .get_payment(&payment_id, &merchant.id)
        .await?;
    Ok(Json(payment))
}

/// Get a payment by id without credentials, used by the checkout page to
/// poll until the status is terminal
#[utoipa::path(
    get,
    path = "/api/v1/payments/{payment_id}/public",
    params(("payment_id" = String, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment details", body = PaymentResponse),
        (status = 404, description = "Unknown payment", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn get_public_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> Result<Json<PaymentResponse>, ServiceError> {
    let payment = state
        .services
        .payments
        .get_public_payment(&payment_id)
        .await?;
    Ok(Json(payment))
}

/// List the merchant's payments, newest first, at most 50
#[utoipa::path(
    get,
    path = "/api/v1/payments",
    responses(
        (status = 200, description = "Payments, newest first", body = [PaymentResponse]),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = [])),
    tag = "Payments"
)]
pub async fn list_payments(
    State(state): State<AppState>,
    merchant: AuthenticatedMerchant,
) -> Result<Json<Vec<PaymentResponse>>, ServiceError> {
    let payments = state.services.payments.list_payments(&merchant.id).await?;
    Ok(Json(payments))
}

/// Payment routes
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_payment).get(list_payments))
        .route("/public", post(create_public_payment))
        .route("/:payment_id", get(get_payment))
        .route("/:payment_id/public", get(get_public_payment))
}
