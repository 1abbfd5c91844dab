use axum::{extract::State, routing::get, Json, Router};

use crate::auth::AuthenticatedMerchant;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::stats::StatsResponse;

/// Merchant transaction summary
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses(
        (status = 200, description = "Totals and success rate", body = StatsResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    security(("api_key" = [])),
    tag = "Stats"
)]
pub async fn get_stats(
    State(state): State<AppState>,
    merchant: AuthenticatedMerchant,
) -> Result<Json<StatsResponse>, ServiceError> {
    let stats = state.services.stats.get_stats(&merchant.id).await?;
    Ok(Json(stats))
}

/// Stats routes
pub fn stats_routes() -> Router<AppState> {
    Router::new().route("/", get(get_stats))
}
