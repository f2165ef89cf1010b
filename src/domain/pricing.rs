use bigdecimal::BigDecimal;

use super::errors::DomainError;
use super::order::{OrderItemRequest, PricedItem, PricedOrder};
use super::ports::Catalog;

/// Largest quantity accepted for a single line item.
pub const MAX_QUANTITY: i32 = 10_000;

/// Resolve each requested item against the active catalog and snapshot its
/// price. Items are validated in submission order and the first failure is
/// returned; no partial result is ever produced.
pub fn price(catalog: &dyn Catalog, items: &[OrderItemRequest]) -> Result<PricedOrder, DomainError> {
    if items.is_empty() {
        return Err(DomainError::EmptyOrder);
    }

    let mut priced = Vec::with_capacity(items.len());
    let mut total = BigDecimal::from(0);

    for item in items {
        if !(1..=MAX_QUANTITY).contains(&item.quantity) {
            return Err(DomainError::InvalidQuantity {
                key: item.product_key.clone(),
                quantity: item.quantity,
            });
        }

        let product = catalog
            .product_by_key(&item.product_key)?
            .filter(|p| p.active)
            .ok_or_else(|| DomainError::UnknownProduct(item.product_key.clone()))?;

        let line = PricedItem {
            product_id: product.id,
            product_key: product.key,
            unit_price: product.price,
            quantity: item.quantity,
        };
        total += line.line_total();
        priced.push(line);
    }

    Ok(PricedOrder {
        items: priced,
        total,
    })
}
