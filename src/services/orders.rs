use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::db::{generate_id, DbPool};
use crate::entities::order;
use crate::errors::ServiceError;

/// Minimum order amount in minor currency units.
pub const MIN_ORDER_AMOUNT: i64 = 100;

const DEFAULT_CURRENCY: &str = "INR";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "amount": 50000,
    "currency": "INR",
    "receipt": "rcpt-2026-0001",
    "notes": "August invoice"
}))]
pub struct CreateOrderRequest {
    /// Amount in minor currency units (e.g. paise); must be at least 100
    pub amount: i64,
    /// ISO currency code; defaults to INR
    pub currency: Option<String>,
    pub receipt: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: String,
    pub merchant_id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Order fields visible to the unauthenticated checkout page.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicOrderResponse {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

impl From<order::Model> for OrderResponse {
    fn from(model: order::Model) -> Self {
        Self {
            id: model.id,
            merchant_id: model.merchant_id,
            amount: model.amount,
            currency: model.currency,
            receipt: model.receipt,
            notes: model.notes,
            status: model.status,
            created_at: model.created_at,
        }
    }
}

impl From<order::Model> for PublicOrderResponse {
    fn from(model: order::Model) -> Self {
        Self {
            id: model.id,
            amount: model.amount,
            currency: model.currency,
            status: model.status,
        }
    }
}

/// Creates and retrieves orders, enforcing merchant ownership on private
/// reads.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
}

impl OrderService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Creates an order for the merchant. Amounts below the floor are
    /// rejected before anything touches the store.
    #[instrument(skip(self, request), fields(merchant_id = %merchant_id, amount = request.amount))]
    pub async fn create_order(
        &self,
        merchant_id: &str,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        if request.amount < MIN_ORDER_AMOUNT {
            return Err(ServiceError::ValidationError(
                "amount must be at least 100".to_string(),
            ));
        }

        let order_id = generate_id("order_");
        let model = order::ActiveModel {
            id: Set(order_id.clone()),
            merchant_id: Set(merchant_id.to_string()),
            amount: Set(request.amount),
            currency: Set(request
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())),
            receipt: Set(request.receipt),
            notes: Set(request.notes),
            status: Set("created".to_string()),
            created_at: Set(Utc::now()),
        };

        let inserted = model.insert(&*self.db).await?;
        info!(order_id = %order_id, "Order created");
        Ok(inserted.into())
    }

    /// Merchant-scoped read. An order owned by a different merchant is
    /// indistinguishable from a missing one, so existence never leaks.
    #[instrument(skip(self), fields(order_id = %order_id, merchant_id = %merchant_id))]
    pub async fn get_order(
        &self,
        order_id: &str,
        merchant_id: &str,
    ) -> Result<OrderResponse, ServiceError> {
        let found = order::Entity::find_by_id(order_id)
            .filter(order::Column::MerchantId.eq(merchant_id))
            .one(&*self.db)
            .await?;

        found
            .map(Into::into)
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))
    }

    /// Public read for the checkout page: id lookup only, subset of fields.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_public_order(
        &self,
        order_id: &str,
    ) -> Result<PublicOrderResponse, ServiceError> {
        let found = order::Entity::find_by_id(order_id).one(&*self.db).await?;

        found
            .map(Into::into)
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))
    }
}
