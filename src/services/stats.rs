use std::sync::Arc;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::entities::payment;
use crate::errors::ServiceError;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "total_transactions": 42,
    "total_amount": 1250000,
    "success_rate": 93
}))]
pub struct StatsResponse {
    pub total_transactions: u64,
    /// Sum of amounts over successful payments, minor currency units
    pub total_amount: i64,
    /// Rounded percentage of successful payments; 0 when there are none
    pub success_rate: u32,
}

/// Folds (status, amount) pairs into the merchant summary. Success rate is
/// `round(success / total * 100)`, defined as 0 for an empty input.
pub fn compute_stats<'a, I>(rows: I) -> StatsResponse
where
    I: IntoIterator<Item = (&'a str, i64)>,
{
    let mut total = 0u64;
    let mut success_count = 0u64;
    let mut total_amount = 0i64;

    for (status, amount) in rows {
        total += 1;
        if status == "success" {
            success_count += 1;
            total_amount += amount;
        }
    }

    let success_rate = if total == 0 {
        0
    } else {
        ((success_count as f64 / total as f64) * 100.0).round() as u32
    };

    StatsResponse {
        total_transactions: total,
        total_amount,
        success_rate,
    }
}

/// Derives success-rate and volume summaries from stored payments.
#[derive(Clone)]
pub struct StatsService {
    db: Arc<DbPool>,
}

impl StatsService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(merchant_id = %merchant_id))]
    pub async fn get_stats(&self, merchant_id: &str) -> Result<StatsResponse, ServiceError> {
        let rows: Vec<(String, i64)> = payment::Entity::find()
            .select_only()
            .column(payment::Column::Status)
            .column(payment::Column::Amount)
            .filter(payment::Column::MerchantId.eq(merchant_id))
            .into_tuple()
            .all(&*self.db)
            .await?;

        Ok(compute_stats(
            rows.iter().map(|(status, amount)| (status.as_str(), *amount)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_zeroes() {
        let stats = compute_stats(std::iter::empty());
        assert_eq!(stats.total_transactions, 0);
        assert_eq!(stats.total_amount, 0);
        assert_eq!(stats.success_rate, 0);
    }

    #[test]
    fn only_successful_amounts_are_summed() {
        let stats = compute_stats(vec![
            ("success", 500),
            ("failed", 300),
            ("success", 200),
            ("processing", 1000),
        ]);
        assert_eq!(stats.total_transactions, 4);
        assert_eq!(stats.total_amount, 700);
        assert_eq!(stats.success_rate, 50);
    }

    #[test]
    fn success_rate_rounds_to_nearest_percent() {
        // 2 of 3 -> 66.67 -> 67
        let stats = compute_stats(vec![("success", 100), ("success", 100), ("failed", 100)]);
        assert_eq!(stats.success_rate, 67);

        // 1 of 3 -> 33.33 -> 33
        let stats = compute_stats(vec![("success", 100), ("failed", 100), ("failed", 100)]);
        assert_eq!(stats.success_rate, 33);
    }

    #[test]
    fn all_successful_is_one_hundred_percent() {
        let stats = compute_stats(vec![("success", 100), ("success", 250)]);
        assert_eq!(stats.total_transactions, 2);
        assert_eq!(stats.total_amount, 350);
        assert_eq!(stats.success_rate, 100);
    }
}
