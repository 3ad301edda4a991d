use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::error::HttpError;
use crate::service::payment_gateway::GatewayError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Property {0} not found")]
    PropertyNotFound(Uuid),

    #[error("Owner not found for user {0}")]
    OwnerNotFound(Uuid),

    #[error("Plan {0} not found")]
    PlanNotFound(Uuid),

    #[error("Coupon {0} not found or already redeemed")]
    CouponUnavailable(String),

    #[error("Owner has no more ad credits for this action")]
    InsufficientAdCredits,

    #[error("Owner has no more highlight credits for this action")]
    InsufficientHighlightCredits,

    #[error("Property {0} must be active before it can be highlighted")]
    InactiveProperty(Uuid),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::PropertyNotFound(_)
            | ServiceError::OwnerNotFound(_)
            | ServiceError::PlanNotFound(_)
            | ServiceError::CouponUnavailable(_) => StatusCode::NOT_FOUND,

            ServiceError::InsufficientAdCredits | ServiceError::InsufficientHighlightCredits => {
                StatusCode::PAYMENT_REQUIRED
            }

            ServiceError::InactiveProperty(_) | ServiceError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }

            ServiceError::Gateway(_) => StatusCode::BAD_GATEWAY,

            ServiceError::Database(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        // Database errors carry internals; surface a generic message for them.
        let message = match &error {
            ServiceError::Database(e) => {
                tracing::error!("database failure: {}", e);
                "The request could not be processed".to_string()
            }
            other => other.to_string(),
        };
        HttpError::new(message, error.status_code())
    }
}
