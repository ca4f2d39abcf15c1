use super::charge::{ChargeRequest, ChargeResult};
use super::order::Order;
use crate::error::Result;
use async_trait::async_trait;

/// Host-owned order storage.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn store(&self, order: Order) -> Result<()>;
    async fn get(&self, order_id: u64) -> Result<Option<Order>>;
    async fn get_all(&self) -> Result<Vec<Order>>;
}

/// The remote card processor.
///
/// Remote failures (declines, bad keys, transport faults) are part of the
/// returned [`ChargeResult`], never an `Err`.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_charge(&self, request: &ChargeRequest) -> ChargeResult;
}

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type PaymentProcessorBox = Box<dyn PaymentProcessor>;
