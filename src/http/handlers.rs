//! Public endpoints used by the mobile and web apps.

use super::dto::{AdoptRequest, ConfirmRequest, CouponCheckRequest, DonateRequest, LogoutRequest};
use super::{created, ok, ApiError, AppState, AuthUser, Data};
use crate::auth::{DeviceRegistration, PhoneRequest, ProfileUpdate, Session, SignUp, VerifyOtp};
use crate::model::{
    Campaign, CampaignId, Order, OrderId, Product, Tree, TreeInstance, TreeInstanceId, User,
    UserId, MAX_LINE_QUANTITY,
};
use crate::payments::PaymentIntent;
use crate::services::{CouponQuote, PlaceOrder, ProductDetail};
use crate::validation::ValidationErrors;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};

type ApiResult<T> = Result<Json<Data<T>>, ApiError>;

#[derive(Debug, Serialize)]
pub struct OtpSent {
    pub user_id: UserId,
    pub message: &'static str,
}

impl OtpSent {
    fn to(user_id: UserId) -> Self {
        Self {
            user_id,
            message: "Verification code sent.",
        }
    }
}

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUp>,
) -> Result<(StatusCode, Json<Data<OtpSent>>), ApiError> {
    let user = state.services.auth.sign_up(request).await?;
    Ok(created(OtpSent::to(user)))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<PhoneRequest>,
) -> ApiResult<OtpSent> {
    let user = state.services.auth.sign_in(request).await?;
    Ok(ok(OtpSent::to(user)))
}

pub async fn resend_otp(
    State(state): State<AppState>,
    Json(request): Json<PhoneRequest>,
) -> ApiResult<Value> {
    state.services.auth.resend_otp(request).await?;
    Ok(ok(json!({ "message": "Verification code sent." })))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtp>,
) -> ApiResult<Session> {
    Ok(ok(state.services.auth.verify_otp(request).await?))
}

/// The body is optional; `device_id` also drops that device's push token.
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
    body: Option<Json<LogoutRequest>>,
) -> ApiResult<Value> {
    let device = body.and_then(|Json(request)| request.device_id);
    state
        .services
        .auth
        .logout(&user.token, device.as_deref())
        .await?;
    Ok(ok(json!({ "message": "Logged out." })))
}

pub async fn profile(State(state): State<AppState>, user: AuthUser) -> ApiResult<User> {
    Ok(ok(state.services.auth.profile(user.id).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ProfileUpdate>,
) -> ApiResult<User> {
    Ok(ok(state.services.auth.update_profile(user.id, request).await?))
}

pub async fn register_device(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<DeviceRegistration>,
) -> ApiResult<Value> {
    state.services.auth.register_device(user.id, request).await?;
    Ok(ok(json!({ "message": "Device registered." })))
}

// -----------------------------------------------------------------------------
// Shop
// -----------------------------------------------------------------------------

pub async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    Ok(ok(state.services.catalog.list_products().await?))
}

pub async fn product_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<ProductDetail> {
    Ok(ok(state.services.catalog.product_detail(&slug).await?))
}

pub async fn check_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CouponCheckRequest>,
) -> ApiResult<CouponQuote> {
    let mut errors = ValidationErrors::new();
    let code = errors.require("code", request.code.as_deref());
    match request.subtotal {
        Some(subtotal) => errors.check(
            subtotal >= Decimal::ZERO,
            "subtotal",
            "The subtotal must be at least 0.",
        ),
        None => errors.add("subtotal", "The subtotal field is required."),
    }
    errors.into_result()?;
    let code = code.unwrap_or_default();
    let subtotal = request.subtotal.unwrap_or_default();
    let quote = state
        .services
        .orders
        .check_coupon(user.id, &code, subtotal)
        .await?;
    Ok(ok(quote))
}

pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<PlaceOrder>,
) -> Result<(StatusCode, Json<Data<Order>>), ApiError> {
    if request.items.is_empty() {
        return Err(ValidationErrors::single("items", "The items field is required.").into());
    }
    let mut errors = ValidationErrors::new();
    for (index, line) in request.items.iter().enumerate() {
        errors.check(
            (1..=MAX_LINE_QUANTITY).contains(&line.quantity),
            &format!("items.{index}.quantity"),
            format!("The quantity must be between 1 and {MAX_LINE_QUANTITY}."),
        );
    }
    errors.into_result()?;
    let order = state.services.orders.place_order(user.id, request).await?;
    Ok(created(order))
}

pub async fn list_orders(State(state): State<AppState>, user: AuthUser) -> ApiResult<Vec<Order>> {
    Ok(ok(state.services.orders.orders_of(user.id).await?))
}

pub async fn show_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<OrderId>,
) -> ApiResult<Order> {
    Ok(ok(state.services.orders.order_for(user.id, id).await?))
}

pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<OrderId>,
) -> ApiResult<PaymentIntent> {
    Ok(ok(state.services.checkout.checkout(user.id, id).await?))
}

pub async fn confirm_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<OrderId>,
    Json(request): Json<ConfirmRequest>,
) -> ApiResult<Order> {
    let mut errors = ValidationErrors::new();
    let reference = errors.require("reference", request.reference.as_deref());
    errors.into_result()?;
    let reference = reference.unwrap_or_default();
    let order = state
        .services
        .checkout
        .confirm(user.id, id, &reference)
        .await?;
    Ok(ok(order))
}

// -----------------------------------------------------------------------------
// Sponsorship
// -----------------------------------------------------------------------------

pub async fn list_campaigns(State(state): State<AppState>) -> ApiResult<Vec<Campaign>> {
    Ok(ok(state.services.sponsorship.active_campaigns().await?))
}

/// Guests may donate; a signed-in donor is thanked with a push message.
pub async fn donate(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(id): Path<CampaignId>,
    Json(request): Json<DonateRequest>,
) -> ApiResult<Campaign> {
    let amount = request.validate()?;
    let campaign = state
        .services
        .sponsorship
        .donate(id, user.map(|u| u.id), amount)
        .await?;
    Ok(ok(campaign))
}

pub async fn list_trees(State(state): State<AppState>) -> ApiResult<Vec<Tree>> {
    Ok(ok(state.services.sponsorship.list_trees().await?))
}

pub async fn adopt(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<TreeInstanceId>,
    Json(request): Json<AdoptRequest>,
) -> ApiResult<TreeInstance> {
    let mut errors = ValidationErrors::new();
    if request.plan_id.is_none() {
        errors.add("plan_id", "The plan id field is required.");
    }
    match request.duration_months {
        Some(months) => errors.check(
            months > 0,
            "duration_months",
            "The duration must be at least 1 month.",
        ),
        None => errors.add("duration_months", "The duration months field is required."),
    }
    errors.into_result()?;
    let (Some(plan), Some(months)) = (request.plan_id, request.duration_months) else {
        return Err(ValidationErrors::single("plan_id", "The plan id field is required.").into());
    };
    let adopted = state
        .services
        .sponsorship
        .adopt(id, user.id, plan, months)
        .await?;
    Ok(ok(adopted))
}
