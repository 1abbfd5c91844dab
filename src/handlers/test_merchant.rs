//! Bootstrap endpoint for the dashboard and checkout demo: exposes the
//! seeded test merchant's credentials so local clients can authenticate
//! without manual provisioning.

use axum::{extract::State, routing::get, Json, Router};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::TEST_MERCHANT_EMAIL;
use crate::entities::merchant;
use crate::errors::ServiceError;
use crate::handlers::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TestMerchantResponse {
    pub id: String,
    pub email: String,
    pub api_key: String,
    pub api_secret: String,
    pub seeded: bool,
}

/// Credentials of the seeded test merchant
#[utoipa::path(
    get,
    path = "/api/v1/test/merchant",
    responses(
        (status = 200, description = "Seeded merchant credentials", body = TestMerchantResponse),
        (status = 404, description = "Seeding disabled or not run", body = crate::errors::ErrorResponse)
    ),
    tag = "Test"
)]
pub async fn get_test_merchant(
    State(state): State<AppState>,
) -> Result<Json<TestMerchantResponse>, ServiceError> {
    let found = merchant::Entity::find()
        .filter(merchant::Column::Email.eq(TEST_MERCHANT_EMAIL))
        .one(&*state.db)
        .await?;

    let merchant = found
        .ok_or_else(|| ServiceError::NotFound("Test merchant not found".to_string()))?;

    Ok(Json(TestMerchantResponse {
        id: merchant.id,
        email: merchant.email,
        api_key: merchant.api_key,
        api_secret: merchant.api_secret,
        seeded: true,
    }))
}

/// Test-support routes
pub fn test_routes() -> Router<AppState> {
    Router::new().route("/merchant", get(get_test_merchant))
}
