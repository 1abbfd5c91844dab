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
use crate::services::orders::{CreateOrderRequest, OrderResponse, PublicOrderResponse};

/// Create an order
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Amount below minimum", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    merchant: AuthenticatedMerchant,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ServiceError> {
    let order = state
        .services
        .orders
        .create_order(&merchant.id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Get an order (merchant-scoped)
#[utoipa::path(
    get,
    path = "/api/v1/orders/{order_id}",
    params(("order_id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order details", body = OrderResponse),
        (status = 404, description = "Unknown or not-owned order", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    merchant: AuthenticatedMerchant,
) -> Result<Json<OrderResponse>, ServiceError> {
    let order = state
        .services
        .orders
        .get_order(&order_id, &merchant.id)
        .await?;
    Ok(Json(order))
}

/// Get the public subset of an order, for the checkout page
#[utoipa::path(
    get,
    path = "/api/v1/orders/{order_id}/public",
    params(("order_id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Public order fields", body = PublicOrderResponse),
        (status = 404, description = "Unknown order", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn get_public_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<PublicOrderResponse>, ServiceError> {
    let order = state.services.orders.get_public_order(&order_id).await?;
    Ok(Json(order))
}

/// Order routes
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/:order_id", get(get_order))
        .route("/:order_id/public", get(get_public_order))
}
