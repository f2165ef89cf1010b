use bigdecimal::BigDecimal;
use comfy_table::{presets, Table};

use crate::domain::order::{format_amount, OrderAggregate};
use crate::domain::payment::PaymentState;
use crate::domain::product::Product;

fn rupees(amount: &BigDecimal) -> String {
    format!("₹{}", format_amount(amount))
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::ASCII_FULL).set_header(headers.to_vec());
    table
}

pub fn render_products(products: &[Product]) -> String {
    let mut table = new_table(&["Key", "Name", "Price"]);
    for p in products {
        table.add_row(vec![p.key.clone(), p.name.clone(), rupees(&p.price)]);
    }
    table.to_string()
}

fn payment_label(order: &OrderAggregate) -> &'static str {
    match order.header.payment_state() {
        Ok(PaymentState::Created) => "pending",
        Ok(PaymentState::BuyerMarkedPaid) => "paid",
        Ok(PaymentState::OperatorConfirmedReceived) => "received",
        Err(err) => {
            log::error!("Order {}: {}", order.header.id, err);
            "inconsistent"
        }
    }
}

pub fn render_orders(orders: &[OrderAggregate]) -> String {
    let mut table = new_table(&["ID", "Date", "Amount", "Customer", "Products", "Payment"]);
    for o in orders {
        let products = o
            .items
            .iter()
            .map(|item| {
                let key = item
                    .product_key
                    .clone()
                    .unwrap_or_else(|| format!("#{}", item.product_id));
                format!("{} x {}", key, item.quantity)
            })
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            o.header.id.to_string(),
            o.header.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            rupees(&o.header.total_amount),
            o.shipping_address.name.clone(),
            products,
            payment_label(o).to_string(),
        ]);
    }
    table.to_string()
}
