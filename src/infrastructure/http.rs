use crate::domain::charge::{ChargeRequest, ChargeResult};
use crate::domain::checkout::CardSource;
use crate::domain::ports::PaymentProcessor;
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// HTTP processor client configuration
#[derive(Debug, Clone)]
pub struct HttpProcessorConfig {
    /// API origin, e.g. "https://api.stripe.com"
    pub api_base: String,
    /// Secret key of the active mode
    pub secret_key: String,
    /// Request timeout (default: 30 seconds)
    pub timeout: Duration,
}

impl HttpProcessorConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            secret_key: secret_key.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Creates charges through the processor's REST API.
pub struct HttpProcessor {
    config: HttpProcessorConfig,
    client: reqwest::Client,
}

impl HttpProcessor {
    pub fn new(config: HttpProcessorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::InternalError(Box::new(e)))?;

        Ok(Self { config, client })
    }

    fn charges_url(&self) -> String {
        format!("{}/v1/charges", self.config.api_base.trim_end_matches('/'))
    }
}

/// Form-encoded parameters for a charge-creation call.
pub fn form_params(request: &ChargeRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("amount".to_string(), request.amount.to_string()),
        ("currency".to_string(), request.currency.clone()),
        ("capture".to_string(), request.capture.to_string()),
        ("description".to_string(), request.description.clone()),
        ("expand[]".to_string(), "balance_transaction".to_string()),
    ];

    match &request.source {
        CardSource::Token(token) => params.push(("source".to_string(), token.clone())),
        CardSource::Saved {
            customer_id,
            card_id,
        } => {
            params.push(("customer".to_string(), customer_id.clone()));
            params.push(("source".to_string(), card_id.clone()));
        }
    }

    for (key, value) in &request.metadata {
        params.push((format!("metadata[{}]", key), value.clone()));
    }

    if let Some(billing) = &request.billing {
        let fields = [
            ("billing_name", billing.full_name()),
            ("billing_address_1", billing.address_1.clone()),
            ("billing_address_2", billing.address_2.clone()),
            ("billing_city", billing.city.clone()),
            ("billing_state", billing.state.clone()),
            ("billing_postcode", billing.postcode.clone()),
            ("billing_country", billing.country.clone()),
        ];
        for (key, value) in fields {
            if !value.trim().is_empty() {
                params.push((format!("metadata[{}]", key), value));
            }
        }
    }

    params
}

#[derive(Debug, Deserialize)]
struct ChargeBody {
    id: String,
    balance_transaction: Option<BalanceTransactionField>,
}

/// Either the expanded balance transaction or just its id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BalanceTransactionField {
    Expanded { fee: i64 },
    /// Unexpanded reference; carries no fee.
    Id(#[allow(dead_code)] String),
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

/// Maps a non-2xx response body to a failure result.
fn error_result(status: reqwest::StatusCode, body: &str) -> ChargeResult {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => {
            let category = error
                .code
                .or(error.kind)
                .unwrap_or_else(|| "api_error".to_string());
            let message = error
                .message
                .unwrap_or_else(|| format!("The payment processor returned status {}", status));
            ChargeResult::failure(category, message)
        }
        Err(_) => ChargeResult::failure(
            "api_error",
            format!("The payment processor returned status {}", status),
        ),
    }
}

#[async_trait]
impl PaymentProcessor for HttpProcessor {
    async fn create_charge(&self, request: &ChargeRequest) -> ChargeResult {
        if self.config.secret_key.is_empty() {
            return ChargeResult::failure("authentication_error", "No API key provided.");
        }

        let url = self.charges_url();
        debug!(%url, amount = request.amount, "creating charge");

        let response = match self
            .client
            .post(&url)
            .basic_auth(&self.config.secret_key, None::<&str>)
            .form(&form_params(request))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return ChargeResult::failure(
                    "api_connection_error",
                    format!("Could not reach the payment processor: {}", e),
                );
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return ChargeResult::failure(
                    "api_connection_error",
                    format!("Failed to read the payment processor response: {}", e),
                );
            }
        };

        if !status.is_success() {
            return error_result(status, &body);
        }

        match serde_json::from_str::<ChargeBody>(&body) {
            Ok(charge) => ChargeResult::Success {
                transaction_id: charge.id,
                fee: match charge.balance_transaction {
                    Some(BalanceTransactionField::Expanded { fee }) => Some(fee),
                    _ => None,
                },
            },
            Err(e) => ChargeResult::failure(
                "api_error",
                format!("Failed to parse the payment processor response: {}", e),
            ),
        }
    }
}
