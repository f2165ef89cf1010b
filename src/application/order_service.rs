use chrono::{DateTime, Utc};

use crate::domain::errors::DomainError;
use crate::domain::order::{
    CreatedOrder, NewOrderRequest, OrderAggregate, OrderId, OrderItemRequest, PricedOrder,
};
use crate::domain::ports::{CatalogHandle, LedgerHandle};
use crate::domain::pricing;
use crate::domain::product::{Product, ProductId, ProductUpsert};

/// Orchestrates pricing, the order ledger and payment transitions.
///
/// Holds no cache of its own: every call goes to the injected stores, so
/// reads always reflect the latest commit. Retrying is left to the caller.
#[derive(Clone)]
pub struct OrderService {
    catalog: CatalogHandle,
    ledger: LedgerHandle,
}

fn log_server_error(err: &DomainError) {
    if !err.is_client_error() {
        log::error!("{}", err);
    }
}

impl OrderService {
    pub fn new(catalog: CatalogHandle, ledger: LedgerHandle) -> Self {
        Self { catalog, ledger }
    }

    pub fn price(&self, items: &[OrderItemRequest]) -> Result<PricedOrder, DomainError> {
        pricing::price(self.catalog.as_ref(), items).inspect_err(log_server_error)
    }

    /// Prices the request against the current catalog and persists it.
    ///
    /// On `PersistenceFailure` nothing was written; callers retrying should
    /// call this again rather than reuse an old price snapshot.
    pub fn create_order(
        &self,
        request: NewOrderRequest,
        now: DateTime<Utc>,
    ) -> Result<CreatedOrder, DomainError> {
        let priced = self.price(&request.items)?;
        let created = self
            .ledger
            .create_order(
                &priced,
                &request.shipping_address,
                request.comment.as_deref(),
                now,
            )
            .inspect_err(log_server_error)?;

        log::info!(
            "Created order {} with {} item(s), total {}",
            created.id,
            priced.items.len(),
            created.total_amount
        );
        Ok(created)
    }

    pub fn get_order(&self, id: OrderId) -> Result<OrderAggregate, DomainError> {
        self.ledger
            .order_aggregate(id)
            .inspect_err(log_server_error)
    }

    pub fn list_orders(&self) -> Result<Vec<OrderAggregate>, DomainError> {
        self.ledger.list_orders().inspect_err(log_server_error)
    }

    /// Buyer-side acknowledgment. Repeating it keeps the original time.
    pub fn mark_payment_done(&self, id: OrderId, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ledger
            .mark_payment_done(id, now)
            .inspect_err(log_server_error)?;
        log::info!("Order {} marked as paid by buyer", id);
        Ok(())
    }

    /// Operator-side confirmation; only valid once the buyer has paid.
    pub fn mark_payment_received(
        &self,
        id: OrderId,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ledger
            .mark_payment_received(id, now)
            .inspect_err(log_server_error)?;
        log::info!("Order {} payment confirmed as received", id);
        Ok(())
    }

    /// Active product by id.
    pub fn product(&self, id: ProductId) -> Result<Product, DomainError> {
        self.catalog
            .product_by_id(id)
            .inspect_err(log_server_error)?
            .filter(|p| p.active)
            .ok_or_else(|| DomainError::product_not_found(id))
    }

    /// Active product by catalog key.
    pub fn product_by_key(&self, key: &str) -> Result<Product, DomainError> {
        self.catalog
            .product_by_key(key)
            .inspect_err(log_server_error)?
            .filter(|p| p.active)
            .ok_or_else(|| DomainError::product_not_found(key))
    }

    pub fn list_products(&self, active_only: bool) -> Result<Vec<Product>, DomainError> {
        let products = self.catalog.list_products().inspect_err(log_server_error)?;
        Ok(products
            .into_iter()
            .filter(|p| p.active || !active_only)
            .collect())
    }

    pub fn load_catalog(
        &self,
        entries: &[ProductUpsert],
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let applied = self
            .catalog
            .upsert_products(entries, now)
            .inspect_err(log_server_error)?;
        log::info!("Loaded {} catalog entries", applied);
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use bigdecimal::BigDecimal;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::domain::order::ShippingAddress;
    use crate::domain::payment::PaymentState;
    use crate::infrastructure::in_memory::InMemoryStore;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Asha Rao".into(),
            street: "12 Lake Road".into(),
            city: "Pune".into(),
            region: "MH".into(),
            postal_code: "411001".into(),
            phone: "9800000000".into(),
        }
    }

    fn request(items: &[(&str, i32)]) -> NewOrderRequest {
        NewOrderRequest {
            items: items
                .iter()
                .map(|(key, qty)| OrderItemRequest::new(*key, *qty))
                .collect(),
            shipping_address: address(),
            comment: None,
        }
    }

    fn entry(key: &str, price: &str) -> ProductUpsert {
        ProductUpsert {
            key: key.to_string(),
            name: format!("Kit {key}"),
            description: String::new(),
            price: dec(price),
            active: true,
        }
    }

    fn setup() -> (OrderService, InMemoryStore) {
        let store = InMemoryStore::new();
        let service = OrderService::new(Arc::new(store.clone()), Arc::new(store.clone()));
        service
            .load_catalog(&[entry("a", "10.00"), entry("b", "5.50")], t0())
            .unwrap();
        (service, store)
    }

    #[test]
    fn create_order_prices_server_side() {
        let (service, _) = setup();
        let created = service
            .create_order(request(&[("a", 2), ("b", 1)]), t0())
            .unwrap();
        assert_eq!(created.total_amount, dec("25.50"));

        let order = service.get_order(created.id).unwrap();
        assert_eq!(order.header.total_amount, dec("25.50"));
        assert_eq!(order.items.len(), 2);
        assert_eq!(
            (order.items[0].quantity, order.items[0].unit_price.clone()),
            (2, dec("10.00"))
        );
        assert_eq!(
            (order.items[1].quantity, order.items[1].unit_price.clone()),
            (1, dec("5.50"))
        );
        assert_eq!(order.shipping_address, address());
        assert_eq!(order.header.payment_state().unwrap(), PaymentState::Created);
    }

    #[test]
    fn unknown_product_creates_nothing() {
        let (service, store) = setup();
        let err = service
            .create_order(request(&[("a", 1), ("z", 1)]), t0())
            .unwrap_err();

        assert!(matches!(err, DomainError::UnknownProduct(ref key) if key == "z"));
        assert_eq!(store.row_counts(), (0, 0, 0));
    }

    #[test]
    fn persistence_fault_leaves_no_partial_order() {
        let (service, store) = setup();
        store.fail_before_shipping_address(true);

        let err = service
            .create_order(request(&[("a", 1)]), t0())
            .unwrap_err();
        assert!(matches!(err, DomainError::PersistenceFailure(_)));
        assert!(!err.is_client_error());
        assert_eq!(store.row_counts(), (0, 0, 0));
        assert!(service.list_orders().unwrap().is_empty());
    }

    #[test]
    fn later_price_changes_do_not_touch_existing_orders() {
        let (service, _) = setup();
        let created = service.create_order(request(&[("a", 3)]), t0()).unwrap();

        service
            .load_catalog(&[entry("a", "99.00")], t0() + Duration::hours(1))
            .unwrap();

        let order = service.get_order(created.id).unwrap();
        assert_eq!(order.header.total_amount, dec("30.00"));
        assert_eq!(order.items[0].unit_price, dec("10.00"));

        let repriced = service.create_order(request(&[("a", 1)]), t0()).unwrap();
        assert_eq!(repriced.total_amount, dec("99.00"));
    }

    #[test]
    fn mark_payment_done_keeps_first_timestamp() {
        let (service, _) = setup();
        let id = service.create_order(request(&[("a", 1)]), t0()).unwrap().id;
        let t1 = t0() + Duration::minutes(5);
        let t2 = t1 + Duration::minutes(5);

        service.mark_payment_done(id, t1).unwrap();
        let header = service.get_order(id).unwrap().header;
        assert!(header.payment_done);
        assert_eq!(header.payment_done_at, Some(t1));

        service.mark_payment_done(id, t2).unwrap();
        let header = service.get_order(id).unwrap().header;
        assert_eq!(header.payment_done_at, Some(t1));
    }

    #[test]
    fn payment_received_only_after_payment_done() {
        let (service, _) = setup();
        let id = service.create_order(request(&[("b", 2)]), t0()).unwrap().id;

        let err = service.mark_payment_received(id, t0()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition { .. }));
        assert!(err.is_client_error());

        service.mark_payment_done(id, t0()).unwrap();
        service.mark_payment_received(id, t0()).unwrap();

        let header = service.get_order(id).unwrap().header;
        assert_eq!(
            header.payment_state().unwrap(),
            PaymentState::OperatorConfirmedReceived
        );
    }

    #[test]
    fn unknown_order_is_not_found() {
        let (service, _) = setup();
        assert!(matches!(service.get_order(99), Err(DomainError::NotFound { .. })));
        assert!(matches!(
            service.mark_payment_done(99, t0()),
            Err(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn list_orders_is_newest_first() {
        let (service, _) = setup();
        let first = service.create_order(request(&[("a", 1)]), t0()).unwrap();
        let second = service
            .create_order(request(&[("b", 1)]), t0() + Duration::seconds(1))
            .unwrap();

        let ids: Vec<OrderId> = service
            .list_orders()
            .unwrap()
            .iter()
            .map(|o| o.header.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn inactive_products_are_hidden_from_public_lookups() {
        let (service, _) = setup();
        let mut retired = entry("old", "1.00");
        retired.active = false;
        service.load_catalog(&[retired], t0()).unwrap();

        assert!(matches!(
            service.product_by_key("old"),
            Err(DomainError::NotFound { .. })
        ));
        assert_eq!(service.list_products(true).unwrap().len(), 2);
        assert_eq!(service.list_products(false).unwrap().len(), 3);

        let a = service.product_by_key("a").unwrap();
        assert_eq!(service.product(a.id).unwrap().key, "a");
    }
}
