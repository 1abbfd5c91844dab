//! Simulated settlement: the stand-in for a real payment network.
//!
//! The simulation is split in two so the state transition stays testable
//! without real delay: [`SettlementPolicy::draw`] produces the wait duration
//! and outcome, and the pure [`settle`] function turns an outcome into the
//! terminal field values. The payment service awaits the drawn delay inline,
//! which means a payment-creation request blocks until the terminal status
//! is known.

use std::time::Duration;

use rand::Rng;

use crate::services::payments::PaymentMethod;

/// Error code recorded on payments that fail settlement.
pub const PAYMENT_FAILED_CODE: &str = "PAYMENT_FAILED";
/// Description recorded alongside [`PAYMENT_FAILED_CODE`].
pub const PAYMENT_FAILED_DESCRIPTION: &str = "Payment processing failed";

const RANDOM_DELAY_MIN_MS: u64 = 5_000;
const RANDOM_DELAY_MAX_MS: u64 = 10_000;
const UPI_SUCCESS_RATE: f64 = 0.90;
const CARD_SUCCESS_RATE: f64 = 0.95;

/// How the simulator decides settlement delay and outcome.
#[derive(Debug, Clone)]
pub enum SettlementPolicy {
    /// Fixed delay and outcome, for reproducible tests.
    Deterministic { delay: Duration, success: bool },
    /// Delay uniform in [5s, 10s]; UPI succeeds with p=0.90, card with p=0.95.
    Randomized,
}

/// One drawn settlement: how long to wait and whether the payment succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementDraw {
    pub delay: Duration,
    pub success: bool,
}

impl SettlementPolicy {
    pub fn draw(&self, method: PaymentMethod) -> SettlementDraw {
        match self {
            SettlementPolicy::Deterministic { delay, success } => SettlementDraw {
                delay: *delay,
                success: *success,
            },
            SettlementPolicy::Randomized => {
                let mut rng = rand::thread_rng();
                let delay =
                    Duration::from_millis(rng.gen_range(RANDOM_DELAY_MIN_MS..=RANDOM_DELAY_MAX_MS));
                let threshold = match method {
                    PaymentMethod::Upi => UPI_SUCCESS_RATE,
                    PaymentMethod::Card => CARD_SUCCESS_RATE,
                };
                let success = rng.gen::<f64>() < threshold;
                SettlementDraw { delay, success }
            }
        }
    }
}

/// Terminal field values for a settled payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementUpdate {
    pub status: &'static str,
    pub error_code: Option<String>,
    pub error_description: Option<String>,
}

/// Maps a settlement outcome onto the terminal payment fields. Failures are
/// business outcomes, never errors: the payment row records `PAYMENT_FAILED`.
pub fn settle(success: bool) -> SettlementUpdate {
    if success {
        SettlementUpdate {
            status: "success",
            error_code: None,
            error_description: None,
        }
    } else {
        SettlementUpdate {
            status: "failed",
            error_code: Some(PAYMENT_FAILED_CODE.to_string()),
            error_description: Some(PAYMENT_FAILED_DESCRIPTION.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_policy_returns_configured_draw() {
        let policy = SettlementPolicy::Deterministic {
            delay: Duration::from_millis(5),
            success: false,
        };
        let draw = policy.draw(PaymentMethod::Card);
        assert_eq!(draw.delay, Duration::from_millis(5));
        assert!(!draw.success);
    }

    #[test]
    fn randomized_delay_stays_in_range() {
        let policy = SettlementPolicy::Randomized;
        for _ in 0..100 {
            let draw = policy.draw(PaymentMethod::Upi);
            assert!(draw.delay >= Duration::from_millis(RANDOM_DELAY_MIN_MS));
            assert!(draw.delay <= Duration::from_millis(RANDOM_DELAY_MAX_MS));
        }
    }

    #[test]
    fn successful_settlement_has_no_error_fields() {
        let update = settle(true);
        assert_eq!(update.status, "success");
        assert!(update.error_code.is_none());
        assert!(update.error_description.is_none());
    }

    #[test]
    fn failed_settlement_records_payment_failed() {
        let update = settle(false);
        assert_eq!(update.status, "failed");
        assert_eq!(update.error_code.as_deref(), Some(PAYMENT_FAILED_CODE));
        assert_eq!(
            update.error_description.as_deref(),
            Some(PAYMENT_FAILED_DESCRIPTION)
        );
    }
}
