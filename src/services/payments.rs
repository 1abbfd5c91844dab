use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::db::{generate_id, DbPool};
use crate::entities::{order, payment};
use crate::errors::ServiceError;
use crate::settlement::{settle, SettlementPolicy};
use crate::validation::{
    clean_card_number, detect_network, validate_card_number, validate_expiry_at, validate_vpa,
};

/// Merchant-scoped listings return at most this many rows, newest first.
pub const LIST_PAYMENTS_LIMIT: u64 = 50;

/// Payment methods the simulator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Upi,
    Card,
}

impl PaymentMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "upi" => Some(PaymentMethod::Upi),
            "card" => Some(PaymentMethod::Card),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
        }
    }
}

/// Who is asking for the payment to be created. Merchant scope requires the
/// order to belong to that merchant; public scope resolves the order by id
/// alone and derives the merchant from it.
#[derive(Debug, Clone)]
pub enum PaymentScope {
    Merchant(String),
    Public,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CardPayload {
    pub number: Option<String>,
    pub expiry_month: Option<i32>,
    pub expiry_year: Option<i32>,
    /// Accepted for completeness but never stored or echoed back.
    pub cvv: Option<String>,
    pub holder_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "order_id": "order_4f9a1c2b8d7e6f5a",
    "method": "upi",
    "vpa": "user.name@bank"
}))]
pub struct CreatePaymentRequest {
    pub order_id: String,
    /// "upi" or "card"
    pub method: String,
    pub vpa: Option<String>,
    pub card: Option<CardPayload>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
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

impl From<payment::Model> for PaymentResponse {
    fn from(model: payment::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            merchant_id: model.merchant_id,
            amount: model.amount,
            currency: model.currency,
            method: model.method,
            status: model.status,
            vpa: model.vpa,
            card_network: model.card_network,
            card_last4: model.card_last4,
            error_code: model.error_code,
            error_description: model.error_description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A validated payment instrument, ready to persist. Card numbers and CVVs
/// never leave the validation step; only network and last4 survive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instrument {
    Upi { vpa: String },
    Card { network: &'static str, last4: String },
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).is_some_and(|s| !s.is_empty())
}

/// Validates the payment-method payload for the given method. Pure: failures
/// here abort the request before any payment row exists.
pub fn validate_instrument(
    method: PaymentMethod,
    vpa: Option<&str>,
    card: Option<&CardPayload>,
    now: DateTime<Utc>,
) -> Result<Instrument, ServiceError> {
    match method {
        PaymentMethod::Upi => {
            let vpa = vpa.unwrap_or_default();
            if !validate_vpa(vpa) {
                return Err(ServiceError::InvalidVpa("Invalid VPA format".to_string()));
            }
            Ok(Instrument::Upi {
                vpa: vpa.to_string(),
            })
        }
        PaymentMethod::Card => {
            let card = card.ok_or_else(|| {
                ServiceError::BadRequest("Missing card details".to_string())
            })?;

            // A zero expiry component counts as absent, not as an expired
            // date.
            let complete = present(&card.number)
                && card.expiry_month.is_some_and(|m| m != 0)
                && card.expiry_year.is_some_and(|y| y != 0)
                && present(&card.cvv)
                && present(&card.holder_name);
            if !complete {
                return Err(ServiceError::BadRequest(
                    "Incomplete card details".to_string(),
                ));
            }

            let number = card.number.as_deref().unwrap_or_default();
            if !validate_card_number(number) {
                return Err(ServiceError::InvalidCard(
                    "Card validation failed".to_string(),
                ));
            }

            let month = card.expiry_month.unwrap_or_default();
            let year = card.expiry_year.unwrap_or_default();
            if !validate_expiry_at(month, year, now) {
                return Err(ServiceError::ExpiredCard(
                    "Card expiry date invalid".to_string(),
                ));
            }

            let cleaned = clean_card_number(number);
            let last4 = cleaned[cleaned.len() - 4..].to_string();
            Ok(Instrument::Card {
                network: detect_network(number).as_str(),
                last4,
            })
        }
    }
}

/// The payment lifecycle engine: resolves the order, validates the
/// instrument, persists the `processing` row, runs the settlement
/// simulation, and persists the terminal state — all within one call.
#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DbPool>,
    policy: SettlementPolicy,
}

impl PaymentService {
    pub fn new(db: Arc<DbPool>, policy: SettlementPolicy) -> Self {
        Self { db, policy }
    }

    /// Creates a payment and blocks until its terminal status is known.
    /// The settlement wait happens inside this call, so the caller's request
    /// suspends for the simulated network delay.
    #[instrument(skip(self, request), fields(order_id = %request.order_id, method = %request.method))]
    pub async fn create_payment(
        &self,
        request: CreatePaymentRequest,
        scope: PaymentScope,
    ) -> Result<PaymentResponse, ServiceError> {
        let method = PaymentMethod::parse(&request.method)
            .ok_or_else(|| ServiceError::BadRequest("Invalid payment method".to_string()))?;

        let order = self.resolve_order(&request.order_id, &scope).await?;
        let merchant_id = order.merchant_id.clone();

        let instrument =
            validate_instrument(method, request.vpa.as_deref(), request.card.as_ref(), Utc::now())?;

        let (vpa, card_network, card_last4) = match instrument {
            Instrument::Upi { vpa } => (Some(vpa), None, None),
            Instrument::Card { network, last4 } => {
                (None, Some(network.to_string()), Some(last4))
            }
        };

        let payment_id = generate_id("pay_");
        let now = Utc::now();
        let processing = payment::ActiveModel {
            id: Set(payment_id.clone()),
            order_id: Set(order.id.clone()),
            merchant_id: Set(merchant_id.clone()),
            amount: Set(order.amount),
            currency: Set(order.currency.clone()),
            method: Set(method.as_str().to_string()),
            status: Set("processing".to_string()),
            vpa: Set(vpa),
            card_network: Set(card_network),
            card_last4: Set(card_last4),
            error_code: Set(None),
            error_description: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = processing.insert(&*self.db).await?;
        info!(payment_id = %payment_id, "Payment created, settling");

        let draw = self.policy.draw(method);
        tokio::time::sleep(draw.delay).await;

        let update = settle(draw.success);
        let mut finalizing: payment::ActiveModel = inserted.into();
        finalizing.status = Set(update.status.to_string());
        finalizing.error_code = Set(update.error_code);
        finalizing.error_description = Set(update.error_description);
        finalizing.updated_at = Set(Utc::now());
        let finalized = finalizing.update(&*self.db).await?;

        info!(payment_id = %payment_id, status = %finalized.status, "Payment settled");
        Ok(finalized.into())
    }

    async fn resolve_order(
        &self,
        order_id: &str,
        scope: &PaymentScope,
    ) -> Result<order::Model, ServiceError> {
        let mut query = order::Entity::find_by_id(order_id);
        if let PaymentScope::Merchant(merchant_id) = scope {
            query = query.filter(order::Column::MerchantId.eq(merchant_id.as_str()));
        }

        query
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))
    }

    /// Merchant-scoped read; a payment owned by another merchant surfaces as
    /// not found.
    #[instrument(skip(self), fields(payment_id = %payment_id, merchant_id = %merchant_id))]
    pub async fn get_payment(
        &self,
        payment_id: &str,
        merchant_id: &str,
    ) -> Result<PaymentResponse, ServiceError> {
        let found = payment::Entity::find_by_id(payment_id)
            .filter(payment::Column::MerchantId.eq(merchant_id))
            .one(&*self.db)
            .await?;

        found
            .map(Into::into)
            .ok_or_else(|| ServiceError::NotFound("Payment not found".to_string()))
    }

    /// Newest-first listing for the merchant dashboard, capped at 50 rows.
    #[instrument(skip(self), fields(merchant_id = %merchant_id))]
    pub async fn list_payments(
        &self,
        merchant_id: &str,
    ) -> Result<Vec<PaymentResponse>, ServiceError> {
        let rows = payment::Entity::find()
            .filter(payment::Column::MerchantId.eq(merchant_id))
            .order_by_desc(payment::Column::CreatedAt)
            .limit(LIST_PAYMENTS_LIMIT)
            .all(&*self.db)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Unrestricted read by id, used by the checkout page to poll for a
    /// terminal status.
    #[instrument(skip(self), fields(payment_id = %payment_id))]
    pub async fn get_public_payment(
        &self,
        payment_id: &str,
    ) -> Result<PaymentResponse, ServiceError> {
        let found = payment::Entity::find_by_id(payment_id).one(&*self.db).await?;

        found
            .map(Into::into)
            .ok_or_else(|| ServiceError::NotFound("Payment not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn future_card() -> CardPayload {
        CardPayload {
            number: Some("4111 1111 1111 1111".into()),
            expiry_month: Some(12),
            expiry_year: Some(2099),
            cvv: Some("123".into()),
            holder_name: Some("A Customer".into()),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn method_parsing_accepts_only_upi_and_card() {
        assert_eq!(PaymentMethod::parse("upi"), Some(PaymentMethod::Upi));
        assert_eq!(PaymentMethod::parse("card"), Some(PaymentMethod::Card));
        assert_eq!(PaymentMethod::parse("wallet"), None);
        assert_eq!(PaymentMethod::parse("UPI"), None);
    }

    #[test]
    fn upi_instrument_requires_a_valid_vpa() {
        let ok = validate_instrument(PaymentMethod::Upi, Some("user@bank"), None, now());
        assert_eq!(
            ok.unwrap(),
            Instrument::Upi {
                vpa: "user@bank".into()
            }
        );

        for bad in [None, Some(""), Some("bad vpa")] {
            let err = validate_instrument(PaymentMethod::Upi, bad, None, now()).unwrap_err();
            assert!(matches!(err, ServiceError::InvalidVpa(_)), "{:?}", bad);
        }
    }

    #[test]
    fn missing_card_payload_is_a_bad_request() {
        let err = validate_instrument(PaymentMethod::Card, None, None, now()).unwrap_err();
        match err {
            ServiceError::BadRequest(msg) => assert_eq!(msg, "Missing card details"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn incomplete_card_details_are_a_bad_request() {
        let mut card = future_card();
        card.cvv = None;
        let err =
            validate_instrument(PaymentMethod::Card, None, Some(&card), now()).unwrap_err();
        match err {
            ServiceError::BadRequest(msg) => assert_eq!(msg, "Incomplete card details"),
            other => panic!("unexpected error: {other:?}"),
        }

        let mut card = future_card();
        card.holder_name = Some("  ".into());
        let err =
            validate_instrument(PaymentMethod::Card, None, Some(&card), now()).unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[test]
    fn zero_expiry_components_are_incomplete_not_expired() {
        for (month, year) in [(Some(0), Some(2099)), (Some(12), Some(0))] {
            let mut card = future_card();
            card.expiry_month = month;
            card.expiry_year = year;
            let err =
                validate_instrument(PaymentMethod::Card, None, Some(&card), now()).unwrap_err();
            match err {
                ServiceError::BadRequest(msg) => assert_eq!(msg, "Incomplete card details"),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn luhn_failure_is_an_invalid_card() {
        let mut card = future_card();
        card.number = Some("4111111111111112".into());
        let err =
            validate_instrument(PaymentMethod::Card, None, Some(&card), now()).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCard(_)));
    }

    #[test]
    fn past_expiry_is_an_expired_card() {
        let mut card = future_card();
        card.expiry_year = Some(2020);
        let err =
            validate_instrument(PaymentMethod::Card, None, Some(&card), now()).unwrap_err();
        assert!(matches!(err, ServiceError::ExpiredCard(_)));
    }

    #[test]
    fn valid_card_yields_network_and_last4_only() {
        let card = future_card();
        let instrument =
            validate_instrument(PaymentMethod::Card, None, Some(&card), now()).unwrap();
        assert_eq!(
            instrument,
            Instrument::Card {
                network: "visa",
                last4: "1111".into()
            }
        );
    }

    #[test]
    fn response_never_contains_a_cvv_field() {
        let model = payment::Model {
            id: "pay_1".into(),
            order_id: "order_1".into(),
            merchant_id: "merchant_1".into(),
            amount: 500,
            currency: "INR".into(),
            method: "card".into(),
            status: "success".into(),
            vpa: None,
            card_network: Some("visa".into()),
            card_last4: Some("1111".into()),
            error_code: None,
            error_description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(PaymentResponse::from(model)).unwrap();
        assert!(json.get("cvv").is_none());
        assert_eq!(json["card_last4"], "1111");
    }
}
