use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use crate::domain::errors::DomainError;
use crate::domain::order::{
    CreatedOrder, OrderAggregate, OrderHeader, OrderId, OrderLineView, PricedOrder,
    ShippingAddress,
};
use crate::domain::payment::Transition;
use crate::domain::ports::{Catalog, OrderLedger};
use crate::domain::product::{Product, ProductId, ProductUpsert};

#[derive(Debug, Clone)]
struct StoredItem {
    product_id: ProductId,
    unit_price: BigDecimal,
    quantity: i32,
}

#[derive(Default)]
struct State {
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, OrderHeader>,
    items: HashMap<OrderId, Vec<StoredItem>>,
    addresses: HashMap<OrderId, ShippingAddress>,
    next_product_id: ProductId,
    next_order_id: OrderId,
    fail_before_shipping_address: bool,
}

impl State {
    fn aggregate(&self, header: &OrderHeader) -> Result<OrderAggregate, DomainError> {
        let items: Vec<OrderLineView> = self
            .items
            .get(&header.id)
            .map(|items| {
                items
                    .iter()
                    .map(|item| {
                        let product = self.products.get(&item.product_id);
                        OrderLineView {
                            product_id: item.product_id,
                            product_key: product.map(|p| p.key.clone()),
                            product_name: product.map(|p| p.name.clone()),
                            unit_price: item.unit_price.clone(),
                            quantity: item.quantity,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let shipping_address = self.addresses.get(&header.id).cloned().ok_or_else(|| {
            DomainError::InternalInconsistency(format!(
                "order {} has no shipping address",
                header.id
            ))
        })?;

        Ok(OrderAggregate {
            header: header.clone(),
            items,
            shipping_address,
        })
    }
}

/// A thread-safe in-memory catalog and order ledger.
///
/// Every write happens under a single lock, and a failed order creation
/// removes whatever it already wrote before the lock is released, so an
/// order's header, items and address become visible together or not at all. Intended for tests and
/// local experiments where Postgres is not available.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `create_order` fail after the header and line
    /// items are written but before the shipping address is.
    #[cfg(test)]
    pub(crate) fn fail_before_shipping_address(&self, enabled: bool) {
        self.state.lock().expect("store lock").fail_before_shipping_address = enabled;
    }

    /// Number of persisted orders, line items and shipping addresses.
    #[cfg(test)]
    pub(crate) fn row_counts(&self) -> (usize, usize, usize) {
        let state = self.state.lock().expect("store lock");
        let items = state.items.values().map(Vec::len).sum();
        (state.orders.len(), items, state.addresses.len())
    }

    #[cfg(test)]
    pub(crate) fn remove_shipping_address(&self, id: OrderId) {
        self.state.lock().expect("store lock").addresses.remove(&id);
    }

    fn write_address(
        state: &mut State,
        id: OrderId,
        shipping_address: &ShippingAddress,
    ) -> Result<(), DomainError> {
        if state.fail_before_shipping_address {
            return Err(DomainError::PersistenceFailure(
                "injected fault before shipping address insert".into(),
            ));
        }
        state.addresses.insert(id, shipping_address.clone());
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::PersistenceFailure("in-memory store lock poisoned".into()))
    }
}

impl Catalog for InMemoryStore {
    fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, DomainError> {
        Ok(self.lock()?.products.get(&id).cloned())
    }

    fn product_by_key(&self, key: &str) -> Result<Option<Product>, DomainError> {
        Ok(self
            .lock()?
            .products
            .values()
            .find(|p| p.key == key)
            .cloned())
    }

    fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        let mut products: Vec<Product> = self.lock()?.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    fn upsert_products(
        &self,
        entries: &[ProductUpsert],
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let mut state = self.lock()?;
        for entry in entries {
            let existing = state.products.values_mut().find(|p| p.key == entry.key);
            match existing {
                Some(product) => {
                    product.name = entry.name.clone();
                    product.description = entry.description.clone();
                    product.price = entry.price.clone();
                    product.active = entry.active;
                    product.updated_at = now;
                }
                None => {
                    state.next_product_id += 1;
                    let id = state.next_product_id;
                    state.products.insert(
                        id,
                        Product {
                            id,
                            key: entry.key.clone(),
                            name: entry.name.clone(),
                            description: entry.description.clone(),
                            price: entry.price.clone(),
                            active: entry.active,
                            created_at: now,
                            updated_at: now,
                        },
                    );
                }
            }
        }
        Ok(entries.len())
    }
}

impl OrderLedger for InMemoryStore {
    fn create_order(
        &self,
        priced: &PricedOrder,
        shipping_address: &ShippingAddress,
        comment: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CreatedOrder, DomainError> {
        let mut state = self.lock()?;

        state.next_order_id += 1;
        let id = state.next_order_id;
        state.orders.insert(
            id,
            OrderHeader {
                id,
                total_amount: priced.total.clone(),
                payment_done: false,
                payment_done_at: None,
                payment_received: false,
                payment_received_at: None,
                comment: comment.map(str::to_string),
                created_at: now,
                updated_at: now,
            },
        );
        state.items.insert(
            id,
            priced
                .items
                .iter()
                .map(|item| StoredItem {
                    product_id: item.product_id,
                    unit_price: item.unit_price.clone(),
                    quantity: item.quantity,
                })
                .collect(),
        );

        if let Err(err) = Self::write_address(&mut state, id, shipping_address) {
            // Undo the header and items written above.
            state.orders.remove(&id);
            state.items.remove(&id);
            return Err(err);
        }

        Ok(CreatedOrder {
            id,
            total_amount: priced.total.clone(),
            created_at: now,
        })
    }

    fn order_aggregate(&self, id: OrderId) -> Result<OrderAggregate, DomainError> {
        let state = self.lock()?;
        let header = state
            .orders
            .get(&id)
            .ok_or_else(|| DomainError::order_not_found(id))?;
        state.aggregate(header)
    }

    fn list_orders(&self) -> Result<Vec<OrderAggregate>, DomainError> {
        let state = self.lock()?;
        let mut headers: Vec<&OrderHeader> = state.orders.values().collect();
        headers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        headers.into_iter().map(|h| state.aggregate(h)).collect()
    }

    fn mark_payment_done(&self, id: OrderId, now: DateTime<Utc>) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let header = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| DomainError::order_not_found(id))?;

        if let Transition::Applied(_) = header.payment_state()?.mark_paid() {
            header.payment_done = true;
            header.payment_done_at = Some(now);
            header.updated_at = now;
        }
        Ok(())
    }

    fn mark_payment_received(&self, id: OrderId, now: DateTime<Utc>) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let header = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| DomainError::order_not_found(id))?;

        if let Transition::Applied(_) = header.payment_state()?.confirm_received()? {
            header.payment_received = true;
            header.payment_received_at = Some(now);
            header.updated_at = now;
        }
        Ok(())
    }
}
