use thiserror::Error;

use super::payment::PaymentState;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unknown product: {0}")]
    UnknownProduct(String),
    #[error("Invalid quantity {quantity} for product {key}")]
    InvalidQuantity { key: String, quantity: i32 },
    #[error("Order must contain at least one item")]
    EmptyOrder,
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("Invalid payment transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        from: PaymentState,
        to: PaymentState,
    },
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),
    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[source] BoxError),
}

impl DomainError {
    pub fn order_not_found(id: i32) -> Self {
        DomainError::NotFound {
            entity: "Order",
            id: id.to_string(),
        }
    }

    pub fn product_not_found(id: impl ToString) -> Self {
        DomainError::NotFound {
            entity: "Product",
            id: id.to_string(),
        }
    }

    /// Errors caused by the request rather than by the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            DomainError::InternalInconsistency(_) | DomainError::PersistenceFailure(_)
        )
    }
}
