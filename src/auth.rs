//! Merchant credential gate. Merchant-scoped endpoints authenticate with the
//! `X-Api-Key` / `X-Api-Secret` header pair; public checkout endpoints skip
//! this module entirely and derive their scope from the referenced record.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::entities::merchant;
use crate::errors::ServiceError;
use crate::AppState;

pub const API_KEY_HEADER: &str = "X-Api-Key";
pub const API_SECRET_HEADER: &str = "X-Api-Secret";

const INVALID_CREDENTIALS: &str = "Invalid API credentials";

/// The merchant resolved from the request's credential headers.
#[derive(Debug, Clone)]
pub struct AuthenticatedMerchant {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<merchant::Model> for AuthenticatedMerchant {
    fn from(model: merchant::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}

/// Looks up an active merchant whose stored key and secret match exactly.
pub async fn authenticate_merchant(
    db: &crate::db::DbPool,
    api_key: &str,
    api_secret: &str,
) -> Result<AuthenticatedMerchant, ServiceError> {
    let found = merchant::Entity::find()
        .filter(merchant::Column::ApiKey.eq(api_key))
        .filter(merchant::Column::ApiSecret.eq(api_secret))
        .filter(merchant::Column::IsActive.eq(true))
        .one(db)
        .await?;

    match found {
        Some(model) => Ok(model.into()),
        None => Err(ServiceError::AuthError(INVALID_CREDENTIALS.to_string())),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedMerchant {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = |name: &str| -> Option<String> {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let (api_key, api_secret) = match (header(API_KEY_HEADER), header(API_SECRET_HEADER)) {
            (Some(key), Some(secret)) => (key, secret),
            _ => return Err(ServiceError::AuthError(INVALID_CREDENTIALS.to_string())),
        };

        authenticate_merchant(&state.db, &api_key, &api_secret).await
    }
}
