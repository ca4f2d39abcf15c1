use crate::error::GatewayError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    OnHold,
    Completed,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::OnHold => "on-hold",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct BillingAddress {
    pub first_name: String,
    pub last_name: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
}

impl BillingAddress {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Payment fields this gateway writes on an order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct PaymentMeta {
    /// `true` when the charge settled funds, `false` for an authorize-only hold.
    pub capture: Option<bool>,
    /// Processor fee in major units, two decimals.
    pub processor_fee: Option<String>,
    pub transaction_id: Option<String>,
}

/// A purchase record owned by the host store.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub id: u64,
    pub order_key: String,
    pub total: Decimal,
    pub currency: String,
    pub billing: BillingAddress,
    pub status: OrderStatus,
    pub payment: PaymentMeta,
}

impl Order {
    pub fn new(id: u64, order_key: impl Into<String>, total: Decimal, currency: impl Into<String>) -> Self {
        Self {
            id,
            order_key: order_key.into(),
            total,
            currency: currency.into(),
            billing: BillingAddress::default(),
            status: OrderStatus::Pending,
            payment: PaymentMeta::default(),
        }
    }

    /// Only pending or previously failed orders may be charged.
    pub fn needs_payment(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Failed)
    }

    /// Order total in minor currency units, rounded half-even.
    pub fn amount_minor(&self) -> Result<i64, GatewayError> {
        let minor = self
            .total
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|minor| minor.round());
        match minor.and_then(|minor| minor.to_i64()) {
            Some(amount) if amount > 0 => Ok(amount),
            _ => Err(GatewayError::ValidationError(format!(
                "Order {} has an invalid total {}",
                self.id, self.total
            ))),
        }
    }

    /// Records a successful charge and moves the order to processing.
    pub fn mark_paid(&mut self, transaction_id: String, capture: bool, fee: Option<i64>) {
        self.payment.capture = Some(capture);
        if let Some(fee) = fee {
            self.payment.processor_fee = Some(format_fee(fee));
        }
        self.payment.transaction_id = Some(transaction_id);
        self.status = OrderStatus::Processing;
    }
}

/// Formats a minor-unit fee as a two-decimal major-unit string.
pub fn format_fee(fee: i64) -> String {
    format!("{:.2}", Decimal::new(fee, 2))
}
