use crate::domain::order::Order;
use crate::domain::ports::OrderStore;
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing orders.
pub const CF_ORDERS: &str = "orders";

/// A persistent order store using RocksDB.
///
/// Orders are stored as JSON under their big-endian id, so iteration yields
/// them in id order. `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBOrderStore {
    db: Arc<DB>,
}

impl RocksDBOrderStore {
    /// Opens or creates a RocksDB instance at the specified path, creating the
    /// orders column family if missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn orders_cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_ORDERS).ok_or_else(|| {
            GatewayError::InternalError(Box::new(std::io::Error::other(
                "Orders column family not found",
            )))
        })
    }
}

#[async_trait]
impl OrderStore for RocksDBOrderStore {
    async fn store(&self, order: Order) -> Result<()> {
        let cf = self.orders_cf()?;
        let value = serde_json::to_vec(&order)?;
        self.db.put_cf(cf, order.id.to_be_bytes(), value)?;
        Ok(())
    }

    async fn get(&self, order_id: u64) -> Result<Option<Order>> {
        let cf = self.orders_cf()?;
        match self.db.get_cf(cf, order_id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        let cf = self.orders_cf()?;
        let mut orders = Vec::new();

        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            orders.push(serde_json::from_slice(&value)?);
        }

        Ok(orders)
    }
}
