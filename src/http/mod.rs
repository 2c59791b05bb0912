//! JSON REST API over the services.
//!
//! Successful responses wrap their payload as `{"data": ...}`; errors are
//! rendered by [`ApiError`]. Public routes live under `/api`, admin routes under
//! `/admin` behind the `x-admin-key` header.

mod admin;
pub mod dto;
mod error;
mod extract;
mod handlers;

pub use error::ApiError;
pub use extract::{AdminGuard, AuthUser, ADMIN_KEY_HEADER};

use crate::lifecycle::Services;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub admin_key: Arc<str>,
}

impl AppState {
    pub fn new(services: Services, admin_key: &str) -> Self {
        Self {
            services,
            admin_key: Arc::from(admin_key),
        }
    }
}

/// Envelope of every successful response.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

pub(crate) fn ok<T: Serialize>(data: T) -> Json<Data<T>> {
    Json(Data { data })
}

pub(crate) fn created<T: Serialize>(data: T) -> (StatusCode, Json<Data<T>>) {
    (StatusCode::CREATED, ok(data))
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        // auth and profile
        .route("/api/auth/sign-up", post(handlers::sign_up))
        .route("/api/auth/sign-in", post(handlers::sign_in))
        .route("/api/auth/verify-otp", post(handlers::verify_otp))
        .route("/api/auth/resend-otp", post(handlers::resend_otp))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/user", get(handlers::profile).put(handlers::update_profile))
        .route("/api/fcm-tokens", post(handlers::register_device))
        // shop
        .route("/api/products", get(handlers::list_products))
        .route("/api/products/:slug", get(handlers::product_detail))
        .route("/api/coupons/check", post(handlers::check_coupon))
        .route("/api/orders", get(handlers::list_orders).post(handlers::place_order))
        .route("/api/orders/:id", get(handlers::show_order))
        .route("/api/orders/:id/checkout", post(handlers::checkout))
        .route("/api/orders/:id/confirm", post(handlers::confirm_payment))
        // sponsorship
        .route("/api/campaigns", get(handlers::list_campaigns))
        .route("/api/campaigns/:id/donate", post(handlers::donate))
        .route("/api/trees", get(handlers::list_trees))
        .route("/api/tree-instances/:id/adopt", post(handlers::adopt))
        // admin
        .route("/admin/products", post(admin::create_product))
        .route("/admin/sizes", post(admin::create_size))
        .route("/admin/colors", post(admin::create_color))
        .route("/admin/planters", post(admin::create_planter))
        .route("/admin/variants/:id", patch(admin::update_variant))
        .route("/admin/coupons", post(admin::create_coupon))
        .route("/admin/campaigns", post(admin::create_campaign))
        .route("/admin/campaigns/:id/publish", post(admin::publish_campaign))
        .route("/admin/campaigns/:id/close", post(admin::close_campaign))
        .route("/admin/trees", post(admin::create_tree))
        .route("/admin/tree-instances", post(admin::plant_tree))
        .route("/admin/plans", post(admin::create_plan))
        .route("/admin/locations", get(admin::list_locations).post(admin::create_location))
        .route("/admin/locations/:id", patch(admin::rename_location))
        .route(
            "/admin/notifications",
            get(admin::list_notifications).post(admin::broadcast),
        )
        .route("/admin/orders/:id/ship", post(admin::ship_order))
        .route("/admin/orders/:id/deliver", post(admin::deliver_order))
        .route("/admin/orders/:id/cancel", post(admin::cancel_order))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
