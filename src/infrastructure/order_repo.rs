use std::collections::HashMap;

use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Timestamptz};

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    CreatedOrder, OrderAggregate, OrderHeader, OrderId, OrderLineView, PricedOrder,
    ShippingAddress,
};
use crate::domain::payment::PaymentState;
use crate::domain::ports::OrderLedger;
use crate::schema::{order_items, orders, products, shipping_addresses};

use super::models::{
    NewOrderItemRow, NewOrderRow, NewShippingAddressRow, OrderItemRow, OrderRow,
    ShippingAddressRow,
};

// Payment transitions are single conditional writes. COALESCE keeps the first
// acknowledgment time, and updated_at only moves when the flag actually flips.
const MARK_PAYMENT_DONE: &str = "UPDATE orders \
     SET payment_done = TRUE, \
         payment_done_at = COALESCE(payment_done_at, $2), \
         updated_at = CASE WHEN payment_done THEN updated_at ELSE $2 END \
     WHERE id = $1";

const MARK_PAYMENT_RECEIVED: &str = "UPDATE orders \
     SET payment_received = TRUE, \
         payment_received_at = COALESCE(payment_received_at, $2), \
         updated_at = CASE WHEN payment_received THEN updated_at ELSE $2 END \
     WHERE id = $1 AND payment_done";

pub struct DieselOrderLedger {
    pool: DbPool,
}

impl DieselOrderLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

type LineWithProduct = (OrderItemRow, Option<(String, String)>);

/// Attach line items (with display metadata) and addresses to order headers.
fn assemble(
    conn: &mut PgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<OrderAggregate>, DomainError> {
    let ids: Vec<i32> = rows.iter().map(|o| o.id).collect();

    let lines: Vec<LineWithProduct> = order_items::table
        .left_join(products::table)
        .filter(order_items::order_id.eq_any(ids.clone()))
        .select((
            OrderItemRow::as_select(),
            (products::key, products::name).nullable(),
        ))
        .order(order_items::id.asc())
        .load(conn)?;

    let addresses: Vec<ShippingAddressRow> = shipping_addresses::table
        .filter(shipping_addresses::order_id.eq_any(ids))
        .select(ShippingAddressRow::as_select())
        .load(conn)?;

    let mut lines_by_order: HashMap<i32, Vec<OrderLineView>> = HashMap::new();
    for (item, product) in lines {
        let (product_key, product_name) = product.unzip();
        lines_by_order
            .entry(item.order_id)
            .or_default()
            .push(OrderLineView {
                product_id: item.product_id,
                product_key,
                product_name,
                unit_price: item.unit_price,
                quantity: item.quantity,
            });
    }

    let mut address_by_order: HashMap<i32, ShippingAddress> = addresses
        .into_iter()
        .map(|a| (a.order_id, ShippingAddress::from(a)))
        .collect();

    rows.into_iter()
        .map(|row| {
            let shipping_address = address_by_order.remove(&row.id).ok_or_else(|| {
                DomainError::InternalInconsistency(format!(
                    "order {} has no shipping address",
                    row.id
                ))
            })?;
            Ok(OrderAggregate {
                items: lines_by_order.remove(&row.id).unwrap_or_default(),
                header: OrderHeader::from(row),
                shipping_address,
            })
        })
        .collect()
}

impl OrderLedger for DieselOrderLedger {
    fn create_order(
        &self,
        priced: &PricedOrder,
        shipping_address: &ShippingAddress,
        comment: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CreatedOrder, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order header
            let order_id: i32 = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    total_amount: &priced.total,
                    payment_done: false,
                    payment_received: false,
                    comments: comment,
                    created_at: now,
                    updated_at: now,
                })
                .returning(orders::id)
                .get_result(conn)?;

            // 2. Insert line items with the price snapshot taken by pricing
            let new_items: Vec<NewOrderItemRow> = priced
                .items
                .iter()
                .map(|item| NewOrderItemRow {
                    order_id,
                    product_id: item.product_id,
                    unit_price: &item.unit_price,
                    quantity: item.quantity,
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&new_items)
                .execute(conn)?;

            // 3. Insert the shipping address
            diesel::insert_into(shipping_addresses::table)
                .values(&NewShippingAddressRow {
                    order_id,
                    name: &shipping_address.name,
                    street: &shipping_address.street,
                    city: &shipping_address.city,
                    region: &shipping_address.region,
                    postal_code: &shipping_address.postal_code,
                    phone: &shipping_address.phone,
                })
                .execute(conn)?;

            Ok(CreatedOrder {
                id: order_id,
                total_amount: priced.total.clone(),
                created_at: now,
            })
        })
    }

    fn order_aggregate(&self, id: OrderId) -> Result<OrderAggregate, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| DomainError::order_not_found(id))?;

        assemble(&mut conn, vec![order])?
            .pop()
            .ok_or_else(|| DomainError::InternalInconsistency(format!("order {id} vanished")))
    }

    fn list_orders(&self) -> Result<Vec<OrderAggregate>, DomainError> {
        let mut conn = self.pool.get()?;

        // One snapshot for headers, lines and addresses.
        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run::<_, DomainError, _>(|conn| {
                let rows = orders::table
                    .select(OrderRow::as_select())
                    .order((orders::created_at.desc(), orders::id.desc()))
                    .load(conn)?;
                assemble(conn, rows)
            })
    }

    fn mark_payment_done(&self, id: OrderId, now: DateTime<Utc>) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let affected = diesel::sql_query(MARK_PAYMENT_DONE)
            .bind::<Integer, _>(id)
            .bind::<Timestamptz, _>(now)
            .execute(&mut conn)?;

        if affected == 0 {
            return Err(DomainError::order_not_found(id));
        }
        Ok(())
    }

    fn mark_payment_received(&self, id: OrderId, now: DateTime<Utc>) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let affected = diesel::sql_query(MARK_PAYMENT_RECEIVED)
            .bind::<Integer, _>(id)
            .bind::<Timestamptz, _>(now)
            .execute(&mut conn)?;
        if affected > 0 {
            return Ok(());
        }

        // Zero rows: either the order is missing or the buyer has not paid.
        let exists = orders::table
            .find(id)
            .select(orders::id)
            .first::<i32>(&mut conn)
            .optional()?
            .is_some();
        if !exists {
            return Err(DomainError::order_not_found(id));
        }
        Err(DomainError::InvalidStateTransition {
            from: PaymentState::Created,
            to: PaymentState::OperatorConfirmedReceived,
        })
    }
}
