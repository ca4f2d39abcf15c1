#![allow(dead_code)]

use async_trait::async_trait;
use cardgate::config::GatewaySettings;
use cardgate::domain::charge::{ChargeRequest, ChargeResult};
use cardgate::domain::ports::PaymentProcessor;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

/// Processor that answers every charge with the same result and records calls.
#[derive(Clone)]
pub struct ScriptedProcessor {
    result: ChargeResult,
    calls: Arc<Mutex<Vec<ChargeRequest>>>,
}

impl ScriptedProcessor {
    pub fn new(result: ChargeResult) -> Self {
        Self {
            result,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn calls(&self) -> Vec<ChargeRequest> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl PaymentProcessor for ScriptedProcessor {
    async fn create_charge(&self, request: &ChargeRequest) -> ChargeResult {
        self.calls.lock().await.push(request.clone());
        self.result.clone()
    }
}

/// Default settings with a live key pair so the gateway is available.
pub fn live_settings() -> GatewaySettings {
    let mut settings = GatewaySettings::default();
    settings.live_credentials.secret_key = "sk_live_cardgate".to_string();
    settings.live_credentials.publishable_key = "pk_live_cardgate".to_string();
    settings
}

pub fn write_temp(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

pub const ORDERS_HEADER: &str = "id,order_key,total,currency";
pub const SUBMISSIONS_HEADER: &str =
    "order_id,user_id,card_token,customer_id,saved_card,card_number_error,card_expiry_error,card_cvc_error,form_errors,pay_page";
