//! Admin endpoints. Every handler takes an [`AdminGuard`].

use super::dto::{
    AttributeRequest, CampaignRequest, CouponRequest, LocationRequest, NotificationRequest,
    PlanRequest, ProductRequest, RenameRequest, TreeInstanceRequest, TreeRequest,
};
use super::{created, ok, AdminGuard, ApiError, AppState, Data};
use crate::model::{
    AdminNotification, Campaign, CampaignId, Color, Coupon, Location, LocationId, Order, OrderId,
    Plan, Planter, Product, ProductVariant, Size, Tree, TreeInstance, VariantId,
};
use crate::services::VariantChange;
use crate::validation::ValidationErrors;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use tracing::info;

type Created<T> = Result<(StatusCode, Json<Data<T>>), ApiError>;
type ApiResult<T> = Result<Json<Data<T>>, ApiError>;

// -----------------------------------------------------------------------------
// Catalog
// -----------------------------------------------------------------------------

pub async fn create_product(
    _: AdminGuard,
    State(state): State<AppState>,
    Json(request): Json<ProductRequest>,
) -> Created<Product> {
    let params = request.validate()?;
    Ok(created(state.services.catalog.create_product(params).await?))
}

pub async fn create_size(
    _: AdminGuard,
    State(state): State<AppState>,
    Json(request): Json<AttributeRequest>,
) -> Created<Size> {
    let params = request.validate()?;
    Ok(created(state.services.catalog.create_size(params).await?))
}

pub async fn create_color(
    _: AdminGuard,
    State(state): State<AppState>,
    Json(request): Json<AttributeRequest>,
) -> Created<Color> {
    let params = request.validate()?;
    Ok(created(state.services.catalog.create_color(params).await?))
}

pub async fn create_planter(
    _: AdminGuard,
    State(state): State<AppState>,
    Json(request): Json<AttributeRequest>,
) -> Created<Planter> {
    let params = request.validate()?;
    Ok(created(state.services.catalog.create_planter(params).await?))
}

pub async fn update_variant(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<VariantId>,
    Json(change): Json<VariantChange>,
) -> ApiResult<ProductVariant> {
    Ok(ok(state.services.catalog.update_variant(id, change).await?))
}

pub async fn create_coupon(
    _: AdminGuard,
    State(state): State<AppState>,
    Json(request): Json<CouponRequest>,
) -> Created<Coupon> {
    let params = request.validate()?;
    let coupons = &state.services.coupons;
    let id = coupons.create_coupon(params).await?;
    let coupon = coupons.require(id).await?;
    info!(coupon = %coupon.code, "Coupon created");
    Ok(created(coupon))
}

// -----------------------------------------------------------------------------
// Sponsorship
// -----------------------------------------------------------------------------

pub async fn create_campaign(
    _: AdminGuard,
    State(state): State<AppState>,
    Json(request): Json<CampaignRequest>,
) -> Created<Campaign> {
    let params = request.validate(Utc::now())?;
    Ok(created(state.services.sponsorship.create_campaign(params).await?))
}

pub async fn publish_campaign(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<CampaignId>,
) -> ApiResult<Campaign> {
    Ok(ok(state.services.sponsorship.publish_campaign(id).await?))
}

pub async fn close_campaign(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<CampaignId>,
) -> ApiResult<Campaign> {
    Ok(ok(state.services.sponsorship.close_campaign(id).await?))
}

pub async fn create_tree(
    _: AdminGuard,
    State(state): State<AppState>,
    Json(request): Json<TreeRequest>,
) -> Created<Tree> {
    let params = request.validate()?;
    Ok(created(state.services.sponsorship.create_tree(params).await?))
}

pub async fn plant_tree(
    _: AdminGuard,
    State(state): State<AppState>,
    Json(request): Json<TreeInstanceRequest>,
) -> Created<TreeInstance> {
    let Some(tree) = request.tree_id else {
        return Err(ValidationErrors::single("tree_id", "The tree id field is required.").into());
    };
    let instance = state
        .services
        .sponsorship
        .plant_tree(tree, request.location_id, request.planted_at)
        .await?;
    Ok(created(instance))
}

pub async fn create_plan(
    _: AdminGuard,
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> Created<Plan> {
    let params = request.validate()?;
    Ok(created(state.services.sponsorship.create_plan(params).await?))
}

// -----------------------------------------------------------------------------
// Locations
// -----------------------------------------------------------------------------

pub async fn list_locations(_: AdminGuard, State(state): State<AppState>) -> ApiResult<Vec<Location>> {
    Ok(ok(state.services.locations.list().await?))
}

pub async fn create_location(
    _: AdminGuard,
    State(state): State<AppState>,
    Json(request): Json<LocationRequest>,
) -> Created<Location> {
    let mut errors = ValidationErrors::new();
    let name = errors.require("name", request.name.as_deref());
    if request.kind.is_none() {
        errors.add("kind", "The kind field is required.");
    }
    errors.into_result()?;
    let (Some(name), Some(kind)) = (name, request.kind) else {
        return Err(ValidationErrors::single("name", "The name field is required.").into());
    };
    let location = state
        .services
        .locations
        .create(name, kind, request.parent_id)
        .await?;
    Ok(created(location))
}

pub async fn rename_location(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<LocationId>,
    Json(request): Json<RenameRequest>,
) -> ApiResult<Location> {
    let mut errors = ValidationErrors::new();
    let name = errors.require("name", request.name.as_deref());
    errors.into_result()?;
    let name = name.unwrap_or_default();
    Ok(ok(state.services.locations.rename(id, name).await?))
}

// -----------------------------------------------------------------------------
// Notifications and orders
// -----------------------------------------------------------------------------

pub async fn list_notifications(
    _: AdminGuard,
    State(state): State<AppState>,
) -> ApiResult<Vec<AdminNotification>> {
    Ok(ok(state.services.notifications.list().await?))
}

/// Stores the notification and queues its delivery.
pub async fn broadcast(
    _: AdminGuard,
    State(state): State<AppState>,
    Json(request): Json<NotificationRequest>,
) -> Created<AdminNotification> {
    let params = request.validate()?;
    Ok(created(state.services.notifications.broadcast(params).await?))
}

pub async fn ship_order(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> ApiResult<Order> {
    Ok(ok(state.services.orders.ship(id).await?))
}

pub async fn deliver_order(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> ApiResult<Order> {
    Ok(ok(state.services.orders.deliver(id).await?))
}

pub async fn cancel_order(
    _: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> ApiResult<Order> {
    Ok(ok(state.services.orders.cancel(id).await?))
}
