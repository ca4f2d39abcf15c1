use crate::domain::checkout::CardSource;
use crate::domain::order::BillingAddress;
use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Whether funds are settled at checkout or only held.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChargeType {
    #[default]
    Capture,
    Authorize,
}

impl ChargeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeType::Capture => "capture",
            ChargeType::Authorize => "authorize",
        }
    }
}

impl FromStr for ChargeType {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "capture" => Ok(ChargeType::Capture),
            "authorize" => Ok(ChargeType::Authorize),
            other => Err(GatewayError::ConfigError(format!(
                "unknown charge type {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for ChargeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a single charge-creation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
    /// Amount in minor currency units.
    pub amount: i64,
    /// Lowercase ISO currency code.
    pub currency: String,
    pub source: CardSource,
    pub capture: bool,
    pub description: String,
    pub metadata: BTreeMap<String, String>,
    /// Only attached when paying for an existing order from the pay page.
    pub billing: Option<BillingAddress>,
}

/// Processor's answer to a charge request.
#[derive(Debug, Clone, PartialEq)]
pub enum ChargeResult {
    Success {
        transaction_id: String,
        /// Processing fee in minor units, when the processor reports one.
        fee: Option<i64>,
    },
    Failure(ChargeFailure),
}

impl ChargeResult {
    pub fn failure(category: impl Into<String>, message: impl Into<String>) -> Self {
        ChargeResult::Failure(ChargeFailure {
            category: category.into(),
            message: message.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargeFailure {
    /// Processor error code, e.g. `card_declined`.
    pub category: String,
    pub message: String,
}

impl fmt::Display for ChargeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.message, self.category)
    }
}
