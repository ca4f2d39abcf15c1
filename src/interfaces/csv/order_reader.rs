use crate::domain::order::{BillingAddress, Order, OrderStatus, PaymentMeta};
use crate::error::{GatewayError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One row of an orders export.
#[derive(Debug, Deserialize)]
struct OrderRecord {
    id: u64,
    order_key: String,
    total: Decimal,
    currency: String,
    #[serde(default)]
    status: Option<OrderStatus>,
    #[serde(default)]
    billing_first_name: Option<String>,
    #[serde(default)]
    billing_last_name: Option<String>,
    #[serde(default)]
    billing_address_1: Option<String>,
    #[serde(default)]
    billing_address_2: Option<String>,
    #[serde(default)]
    billing_city: Option<String>,
    #[serde(default)]
    billing_state: Option<String>,
    #[serde(default)]
    billing_postcode: Option<String>,
    #[serde(default)]
    billing_country: Option<String>,
}

impl From<OrderRecord> for Order {
    fn from(r: OrderRecord) -> Self {
        Order {
            id: r.id,
            order_key: r.order_key,
            total: r.total,
            currency: r.currency,
            billing: BillingAddress {
                first_name: r.billing_first_name.unwrap_or_default(),
                last_name: r.billing_last_name.unwrap_or_default(),
                address_1: r.billing_address_1.unwrap_or_default(),
                address_2: r.billing_address_2.unwrap_or_default(),
                city: r.billing_city.unwrap_or_default(),
                state: r.billing_state.unwrap_or_default(),
                postcode: r.billing_postcode.unwrap_or_default(),
                country: r.billing_country.unwrap_or_default(),
            },
            status: r.status.unwrap_or_default(),
            payment: PaymentMeta::default(),
        }
    }
}

/// Reads orders from a CSV source.
///
/// Only `id`, `order_key`, `total` and `currency` are required; `status` and
/// the `billing_*` columns may be omitted or left empty.
pub struct OrderReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OrderReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and deserializes orders, one result per row.
    pub fn orders(self) -> impl Iterator<Item = Result<Order>> {
        self.reader
            .into_deserialize::<OrderRecord>()
            .map(|result| result.map(Order::from).map_err(GatewayError::from))
    }
}
