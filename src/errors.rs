use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::UnknownProduct(_)
            | DomainError::InvalidQuantity { .. }
            | DomainError::EmptyOrder => AppError::BadRequest(e.to_string()),
            DomainError::NotFound { .. } => AppError::NotFound(e.to_string()),
            DomainError::InvalidStateTransition { .. } => AppError::Conflict(e.to_string()),
            DomainError::InternalInconsistency(_) | DomainError::PersistenceFailure(_) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::NotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Conflict(_) => HttpResponse::Conflict().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Internal(_) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentState;
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;

    fn status_of(e: DomainError) -> StatusCode {
        AppError::from(e).error_response().status()
    }

    #[test]
    fn pricing_errors_are_bad_requests() {
        assert_eq!(
            status_of(DomainError::UnknownProduct("z".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::InvalidQuantity {
                key: "a".into(),
                quantity: 0
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(DomainError::EmptyOrder), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_order_returns_404() {
        assert_eq!(status_of(DomainError::order_not_found(3)), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_transition_returns_409() {
        assert_eq!(
            status_of(DomainError::InvalidStateTransition {
                from: PaymentState::Created,
                to: PaymentState::OperatorConfirmedReceived,
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn server_side_failures_return_500() {
        assert_eq!(
            status_of(DomainError::PersistenceFailure("timeout".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(DomainError::InternalInconsistency("no address".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unknown_product_message_names_the_key() {
        let app_err: AppError = DomainError::UnknownProduct("z".into()).into();
        assert_eq!(app_err.to_string(), "Unknown product: z");
    }

    #[test]
    fn internal_error_display() {
        assert_eq!(
            AppError::Internal("msg".to_string()).to_string(),
            "Internal error: msg"
        );
    }
}
