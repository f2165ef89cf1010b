use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

pub type ProductId = i32;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub key: String,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable fields of a catalog entry, matched to an existing row by `key`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpsert {
    pub key: String,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub active: bool,
}
