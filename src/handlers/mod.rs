pub mod health;
pub mod orders;
pub mod payments;
pub mod stats;
pub mod test_merchant;

use std::sync::Arc;

use crate::db::DbPool;
use crate::settlement::SettlementPolicy;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<crate::services::orders::OrderService>,
    pub payments: Arc<crate::services::payments::PaymentService>,
    pub stats: Arc<crate::services::stats::StatsService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, settlement: SettlementPolicy) -> Self {
        Self {
            orders: Arc::new(crate::services::orders::OrderService::new(db.clone())),
            payments: Arc::new(crate::services::payments::PaymentService::new(
                db.clone(),
                settlement,
            )),
            stats: Arc::new(crate::services::stats::StatsService::new(db)),
        }
    }
}
