use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::errors::DomainError;
use super::order::{CreatedOrder, OrderAggregate, OrderId, PricedOrder, ShippingAddress};
use super::product::{Product, ProductId, ProductUpsert};

pub trait Catalog: Send + Sync + 'static {
    /// Looks a product up by id, whether or not it is active.
    fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, DomainError>;
    /// Looks a product up by its catalog key, whether or not it is active.
    fn product_by_key(&self, key: &str) -> Result<Option<Product>, DomainError>;
    /// Every product, ordered by name.
    fn list_products(&self) -> Result<Vec<Product>, DomainError>;
    /// Inserts or replaces products by key in a single transaction.
    fn upsert_products(
        &self,
        entries: &[ProductUpsert],
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError>;
}

pub trait OrderLedger: Send + Sync + 'static {
    /// Persists header, line items and shipping address as one atomic unit.
    fn create_order(
        &self,
        priced: &PricedOrder,
        shipping_address: &ShippingAddress,
        comment: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CreatedOrder, DomainError>;
    fn order_aggregate(&self, id: OrderId) -> Result<OrderAggregate, DomainError>;
    /// All orders, newest first.
    fn list_orders(&self) -> Result<Vec<OrderAggregate>, DomainError>;
    fn mark_payment_done(&self, id: OrderId, now: DateTime<Utc>) -> Result<(), DomainError>;
    fn mark_payment_received(&self, id: OrderId, now: DateTime<Utc>) -> Result<(), DomainError>;
}

pub type CatalogHandle = Arc<dyn Catalog>;
pub type LedgerHandle = Arc<dyn OrderLedger>;
