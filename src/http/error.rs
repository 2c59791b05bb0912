//! Mapping of domain errors to HTTP responses.
//!
//! | Status | When                                                    |
//! |--------|---------------------------------------------------------|
//! | 422    | validation, wrong or expired OTP, unusable coupon       |
//! | 401    | missing or unknown bearer token or admin key            |
//! | 403    | the order belongs to someone else                       |
//! | 404    | unknown resource                                        |
//! | 409    | state conflict: out of stock, already adopted, ...      |
//! | 429    | OTP requested again inside the cooldown                 |
//! | 502    | SMS or payment provider failure                         |
//! | 500    | anything else                                           |

use crate::auth::AuthError;
use crate::catalog_actor::CatalogError;
use crate::coupon_actor::CouponError;
use crate::location_actor::LocationError;
use crate::notification_actor::NotificationError;
use crate::order_actor::OrderError;
use crate::payments::PaymentError;
use crate::services::CheckoutError;
use crate::sponsorship_actor::SponsorshipError;
use crate::user_actor::UserError;
use crate::validation::ValidationErrors;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationErrors),
    Unauthenticated,
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    TooManyRequests { message: String, retry_after: u64 },
    Upstream(String),
    Internal(String),
}

impl ApiError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation(ValidationErrors::single(field, message))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(errors) => (status, Json(errors)).into_response(),
            ApiError::TooManyRequests {
                message,
                retry_after,
            } => {
                let mut response = (status, Json(json!({ "message": message }))).into_response();
                if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                    response.headers_mut().insert("retry-after", value);
                }
                response
            }
            ApiError::Unauthenticated => {
                (status, Json(json!({ "message": "Unauthenticated." }))).into_response()
            }
            ApiError::Upstream(detail) => {
                warn!(%detail, "Upstream provider failure");
                let message = "A service we depend on failed. Please try again.";
                (status, Json(json!({ "message": message }))).into_response()
            }
            ApiError::Internal(detail) => {
                error!(%detail, "Internal error");
                (status, Json(json!({ "message": "Server error." }))).into_response()
            }
            ApiError::Forbidden(message) | ApiError::NotFound(message) | ApiError::Conflict(message) => {
                (status, Json(json!({ "message": message }))).into_response()
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(errors) => ApiError::Validation(errors),
            AuthError::InvalidOtp | AuthError::OtpExpired | AuthError::TooManyAttempts => {
                ApiError::invalid("code", e.to_string())
            }
            AuthError::TooManyRequests { retry_after } => ApiError::TooManyRequests {
                message: e.to_string(),
                retry_after,
            },
            AuthError::Delivery(detail) => ApiError::Upstream(detail),
            AuthError::Unauthenticated => ApiError::Unauthenticated,
            AuthError::User(e) => e.into(),
            AuthError::Device(e) => e.into(),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound(_) => ApiError::NotFound("User not found.".to_string()),
            UserError::PhoneTaken(_) => ApiError::invalid("phone", "The phone has already been taken."),
            UserError::ValidationError(message) => ApiError::invalid("user", message),
            UserError::ActorCommunicationError(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(_) => ApiError::NotFound(e.to_string()),
            CatalogError::InvalidInput(message) => ApiError::invalid("catalog", message),
            CatalogError::InvalidQuantity(_) => ApiError::invalid("quantity", e.to_string()),
            CatalogError::InsufficientStock { .. } | CatalogError::Conflict(_) => {
                ApiError::Conflict(e.to_string())
            }
            CatalogError::ActorCommunicationError(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<CouponError> for ApiError {
    fn from(e: CouponError) -> Self {
        match e {
            CouponError::NotFound(_) => ApiError::NotFound(e.to_string()),
            CouponError::CodeTaken(_) => ApiError::invalid("code", "The code has already been taken."),
            CouponError::Invalid(message) => ApiError::invalid("coupon", message),
            CouponError::ActorCommunicationError(detail) => ApiError::Internal(detail),
            other => ApiError::invalid("coupon_code", other.to_string()),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(_) => ApiError::NotFound(e.to_string()),
            OrderError::Forbidden(_) => ApiError::Forbidden("This order belongs to another user.".to_string()),
            OrderError::InvalidUser(_) => ApiError::invalid("user", e.to_string()),
            OrderError::InvalidVariant(_) | OrderError::Validation(_) => {
                ApiError::invalid("items", e.to_string())
            }
            OrderError::InsufficientStock { .. } | OrderError::InvalidTransition { .. } => {
                ApiError::Conflict(e.to_string())
            }
            OrderError::Coupon(e) => e.into(),
            OrderError::ActorCommunicationError(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::Order(e) => e.into(),
            CheckoutError::Payment(PaymentError::InvalidAmount(_)) => {
                ApiError::invalid("total", e.to_string())
            }
            CheckoutError::Payment(PaymentError::UnknownIntent(_)) | CheckoutError::UnknownIntent(_) => {
                ApiError::invalid("reference", e.to_string())
            }
            CheckoutError::Payment(other) => ApiError::Upstream(other.to_string()),
            CheckoutError::PaymentFailed => ApiError::invalid("reference", e.to_string()),
            CheckoutError::NotPending(_) | CheckoutError::PaymentPending => {
                ApiError::Conflict(e.to_string())
            }
        }
    }
}

impl From<SponsorshipError> for ApiError {
    fn from(e: SponsorshipError) -> Self {
        match e {
            SponsorshipError::NotFound(_) => ApiError::NotFound(e.to_string()),
            SponsorshipError::Invalid(message) => ApiError::invalid("sponsorship", message),
            SponsorshipError::InvalidAmount(_) => ApiError::invalid("amount", e.to_string()),
            SponsorshipError::NoPriceForDuration { .. } => {
                ApiError::invalid("duration_months", e.to_string())
            }
            SponsorshipError::CampaignNotActive(_)
            | SponsorshipError::CampaignEnded(_)
            | SponsorshipError::AlreadyAdopted(_)
            | SponsorshipError::NotAdopted(_)
            | SponsorshipError::Conflict(_) => ApiError::Conflict(e.to_string()),
            SponsorshipError::ActorCommunicationError(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<LocationError> for ApiError {
    fn from(e: LocationError) -> Self {
        match e {
            LocationError::NotFound(_) => ApiError::NotFound(e.to_string()),
            LocationError::Invalid(message) => ApiError::invalid("name", message),
            LocationError::InvalidParent(message) => ApiError::invalid("parent_id", message),
            LocationError::Conflict(_) => ApiError::Conflict(e.to_string()),
            LocationError::ActorCommunicationError(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<NotificationError> for ApiError {
    fn from(e: NotificationError) -> Self {
        match e {
            NotificationError::NotFound(_) => ApiError::NotFound(e.to_string()),
            NotificationError::Invalid(message) => ApiError::invalid("notification", message),
            NotificationError::Conflict(_) => ApiError::Conflict(e.to_string()),
            NotificationError::ActorCommunicationError(detail) => ApiError::Internal(detail),
        }
    }
}
