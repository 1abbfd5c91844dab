use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A payment attempt against an order. `amount`/`currency` are copied from
/// the order at creation and never change; `merchant_id` is denormalized
/// from the order for merchant-scoped queries. Status moves strictly
/// `processing -> success | failed`, and the error fields are set only on
/// the `failed` terminal state.
///
/// UPI payments carry `vpa`; card payments carry `card_network` and
/// `card_last4`. The CVV is never persisted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub order_id: String,
    pub merchant_id: String,
    pub amount: i64,
    pub currency: String,
    pub method: String,
    pub status: String,
    pub vpa: Option<String>,
    pub card_network: Option<String>,
    pub card_last4: Option<String>,
    pub error_code: Option<String>,
    pub error_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::merchant::Entity",
        from = "Column::MerchantId",
        to = "super::merchant::Column::Id"
    )]
    Merchant,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::merchant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Merchant.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}
