use bigdecimal::BigDecimal;

use crate::domain::order::{format_amount, OrderId};

/// Payee details rendered into the UPI payment string shown as a QR code.
#[derive(Debug, Clone)]
pub struct PaymentLinkConfig {
    pub upi_id: String,
    pub payee_name: String,
}

impl PaymentLinkConfig {
    pub fn new(upi_id: impl Into<String>, payee_name: impl Into<String>) -> Self {
        Self {
            upi_id: upi_id.into(),
            payee_name: payee_name.into(),
        }
    }

    /// `upi://pay?pa=<id>&pn=<name>&am=<amount>&tr=<order>`, amount with two decimals.
    pub fn upi_link(&self, amount: &BigDecimal, order_id: OrderId) -> String {
        format!(
            "upi://pay?pa={}&pn={}&am={}&tr={}",
            self.upi_id,
            self.payee_name.replace(' ', "%20"),
            format_amount(amount),
            order_id
        )
    }
}
