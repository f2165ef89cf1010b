use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Utc};

use super::errors::DomainError;
use super::payment::PaymentState;
use super::product::ProductId;

pub type OrderId = i32;

/// Renders a rupee amount with exactly two decimals, rounding half up.
pub fn format_amount(amount: &BigDecimal) -> String {
    amount.with_scale_round(2, RoundingMode::HalfUp).to_string()
}

/// One requested line, as submitted by the buyer.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemRequest {
    pub product_key: String,
    pub quantity: i32,
}

impl OrderItemRequest {
    pub fn new(product_key: impl Into<String>, quantity: i32) -> Self {
        Self {
            product_key: product_key.into(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct NewOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub shipping_address: ShippingAddress,
    pub comment: Option<String>,
}

/// A line resolved against the catalog, carrying the price snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedItem {
    pub product_id: ProductId,
    pub product_key: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

impl PricedItem {
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * &BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub items: Vec<PricedItem>,
    pub total: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedOrder {
    pub id: OrderId,
    pub total_amount: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderHeader {
    pub id: OrderId,
    pub total_amount: BigDecimal,
    pub payment_done: bool,
    pub payment_done_at: Option<DateTime<Utc>>,
    pub payment_received: bool,
    pub payment_received_at: Option<DateTime<Utc>>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderHeader {
    pub fn payment_state(&self) -> Result<PaymentState, DomainError> {
        PaymentState::from_flags(self.payment_done, self.payment_received).ok_or_else(|| {
            DomainError::InternalInconsistency(format!(
                "order {} is marked received without being marked paid",
                self.id
            ))
        })
    }
}

/// A bought line joined with the product's current display metadata.
///
/// `product_key` and `product_name` come from today's catalog and are only
/// for presentation; `unit_price` is the snapshot taken at order time.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineView {
    pub product_id: ProductId,
    pub product_key: Option<String>,
    pub product_name: Option<String>,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderAggregate {
    pub header: OrderHeader,
    pub items: Vec<OrderLineView>,
    pub shipping_address: ShippingAddress,
}
