//! Offline processor for demos and tests.
//!
//! Outcomes are keyed on the processor's well-known test tokens so that a
//! checkout can be exercised without network access or API keys.

use crate::domain::charge::{ChargeRequest, ChargeResult};
use crate::domain::checkout::CardSource;
use crate::domain::ports::PaymentProcessor;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Percentage fee in tenths of a percent, plus a fixed fee in minor units.
const FEE_PER_MILLE: i128 = 29;
const FEE_FIXED: i128 = 30;

#[derive(Default, Clone)]
pub struct SimulatedProcessor {
    requests: Arc<Mutex<Vec<ChargeRequest>>>,
}

impl SimulatedProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<ChargeRequest> {
        self.requests.lock().await.clone()
    }

    /// 2.9% rounded half-up, plus 30. Saturates at `i64::MAX`.
    pub fn fee_for(amount: i64) -> i64 {
        let fee = (i128::from(amount) * FEE_PER_MILLE + 500) / 1000 + FEE_FIXED;
        i64::try_from(fee).unwrap_or(i64::MAX)
    }

    fn decline_for(token: &str) -> Option<ChargeResult> {
        let (category, message) = match token {
            "tok_declined" | "tok_chargeDeclined" => ("card_declined", "Your card was declined."),
            "tok_expired" | "tok_chargeDeclinedExpiredCard" => {
                ("expired_card", "Your card has expired.")
            }
            "tok_incorrect_cvc" | "tok_chargeDeclinedIncorrectCvc" => {
                ("incorrect_cvc", "Your card's security code is incorrect.")
            }
            "tok_processing_error" | "tok_chargeDeclinedProcessingError" => (
                "processing_error",
                "An error occurred while processing your card. Try again in a little bit.",
            ),
            _ => return None,
        };
        Some(ChargeResult::failure(category, message))
    }
}

#[async_trait]
impl PaymentProcessor for SimulatedProcessor {
    async fn create_charge(&self, request: &ChargeRequest) -> ChargeResult {
        let mut requests = self.requests.lock().await;
        requests.push(request.clone());
        let sequence = requests.len();

        let token = match &request.source {
            CardSource::Token(token) => token.as_str(),
            CardSource::Saved { card_id, .. } => card_id.as_str(),
        };
        if let Some(declined) = Self::decline_for(token) {
            return declined;
        }

        ChargeResult::Success {
            transaction_id: format!("ch_sim_{:06}", sequence),
            fee: Some(Self::fee_for(request.amount)),
        }
    }
}
