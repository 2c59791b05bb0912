//! Request bodies of the admin and shop endpoints.
//!
//! Every field is optional on the wire so that a missing field becomes a
//! field-level 422 message instead of a deserialization failure.

use crate::model::{
    AttributeCreate, Audience, CampaignCreate, Channel, CouponCreate, CouponKind, LocationId,
    LocationKind, NotificationCreate, PlanCreate, PlanId, PlanPrice, ProductCreate, TreeCreate,
    TreeId,
};
use crate::validation::ValidationErrors;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

fn non_negative(errors: &mut ValidationErrors, field: &str, value: Option<Decimal>) {
    if let Some(value) = value {
        errors.check(
            value >= Decimal::ZERO,
            field,
            format!("The {} must be at least 0.", field.replace('_', " ")),
        );
    }
}

fn required_amount(errors: &mut ValidationErrors, field: &str, value: Option<Decimal>) -> Decimal {
    match value {
        Some(amount) if amount > Decimal::ZERO => amount,
        Some(_) => {
            errors.add(field, format!("The {} must be greater than 0.", field.replace('_', " ")));
            Decimal::ZERO
        }
        None => {
            errors.add(field, format!("The {} field is required.", field.replace('_', " ")));
            Decimal::ZERO
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<Decimal>,
    pub is_active: Option<bool>,
}

impl ProductRequest {
    pub fn validate(self) -> Result<ProductCreate, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.require("name", self.name.as_deref());
        if self.base_price.is_none() {
            errors.add("base_price", "The base price field is required.");
        }
        non_negative(&mut errors, "base_price", self.base_price);
        errors.into_result()?;
        Ok(ProductCreate {
            name: name.unwrap_or_default(),
            slug: self.slug.filter(|s| !s.trim().is_empty()),
            description: self.description,
            base_price: self.base_price.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AttributeRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub code: Option<String>,
    pub price_delta: Option<Decimal>,
    pub hex: Option<String>,
}

impl AttributeRequest {
    pub fn validate(self) -> Result<AttributeCreate, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.require("name", self.name.as_deref());
        let code = errors.require("code", self.code.as_deref());
        if let Some(code) = &code {
            errors.check(
                code.len() <= 4 && code.chars().all(|c| c.is_ascii_alphanumeric()),
                "code",
                "The code must be at most 4 letters or digits.",
            );
        }
        errors.into_result()?;
        Ok(AttributeCreate {
            name: name.unwrap_or_default(),
            slug: self.slug.filter(|s| !s.trim().is_empty()),
            code: code.unwrap_or_default(),
            price_delta: self.price_delta,
            hex: self.hex,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CouponRequest {
    pub code: Option<String>,
    pub kind: Option<CouponKind>,
    pub max_discount: Option<Decimal>,
    pub min_order_amount: Option<Decimal>,
    pub usage_limit: Option<u32>,
    pub per_user_limit: Option<u32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl CouponRequest {
    pub fn validate(self) -> Result<CouponCreate, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let code = errors.require("code", self.code.as_deref());
        if self.kind.is_none() {
            errors.add("kind", "The kind field is required.");
        }
        non_negative(&mut errors, "max_discount", self.max_discount);
        non_negative(&mut errors, "min_order_amount", self.min_order_amount);
        errors.into_result()?;
        let (Some(code), Some(kind)) = (code, self.kind) else {
            return Err(ValidationErrors::single("code", "The code field is required."));
        };
        Ok(CouponCreate {
            code,
            kind,
            max_discount: self.max_discount,
            min_order_amount: self.min_order_amount,
            usage_limit: self.usage_limit,
            per_user_limit: self.per_user_limit,
            starts_at: self.starts_at,
            expires_at: self.expires_at,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CampaignRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub goal_amount: Option<Decimal>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl CampaignRequest {
    /// A campaign without a start date starts at `now`.
    pub fn validate(self, now: DateTime<Utc>) -> Result<CampaignCreate, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = errors.require("title", self.title.as_deref());
        let goal_amount = required_amount(&mut errors, "goal_amount", self.goal_amount);
        let starts_at = self.starts_at.unwrap_or(now);
        if let Some(ends_at) = self.ends_at {
            errors.check(
                ends_at > starts_at,
                "ends_at",
                "The end date must be after the start date.",
            );
        }
        errors.into_result()?;
        Ok(CampaignCreate {
            title: title.unwrap_or_default(),
            slug: self.slug.filter(|s| !s.trim().is_empty()),
            description: self.description,
            goal_amount,
            starts_at,
            ends_at: self.ends_at,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TreeRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub scientific_name: Option<String>,
    pub description: Option<String>,
}

impl TreeRequest {
    pub fn validate(self) -> Result<TreeCreate, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.require("name", self.name.as_deref());
        errors.into_result()?;
        Ok(TreeCreate {
            name: name.unwrap_or_default(),
            slug: self.slug.filter(|s| !s.trim().is_empty()),
            scientific_name: self.scientific_name,
            description: self.description,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TreeInstanceRequest {
    pub tree_id: Option<TreeId>,
    pub location_id: Option<LocationId>,
    pub planted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlanRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub prices: Vec<PlanPrice>,
}

impl PlanRequest {
    pub fn validate(self) -> Result<PlanCreate, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.require("name", self.name.as_deref());
        errors.check(!self.prices.is_empty(), "prices", "At least one price is required.");
        errors.into_result()?;
        Ok(PlanCreate {
            name: name.unwrap_or_default(),
            slug: self.slug.filter(|s| !s.trim().is_empty()),
            description: self.description,
            prices: self.prices,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LocationRequest {
    pub name: Option<String>,
    pub kind: Option<LocationKind>,
    pub parent_id: Option<LocationId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenameRequest {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NotificationRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub audience: Option<Audience>,
    pub channels: Vec<Channel>,
}

impl NotificationRequest {
    /// Defaults to every active user over push.
    pub fn validate(self) -> Result<NotificationCreate, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = errors.require("title", self.title.as_deref());
        let body = errors.require("body", self.body.as_deref());
        if let Some(Audience::Users(users)) = &self.audience {
            errors.check(!users.is_empty(), "audience", "Select at least one user.");
        }
        errors.into_result()?;
        let channels = if self.channels.is_empty() {
            vec![Channel::Push]
        } else {
            self.channels
        };
        Ok(NotificationCreate {
            title: title.unwrap_or_default(),
            body: body.unwrap_or_default(),
            audience: self.audience.unwrap_or(Audience::AllUsers),
            channels,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CouponCheckRequest {
    pub code: Option<String>,
    pub subtotal: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfirmRequest {
    pub reference: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DonateRequest {
    pub amount: Option<Decimal>,
}

impl DonateRequest {
    pub fn validate(self) -> Result<Decimal, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let amount = required_amount(&mut errors, "amount", self.amount);
        errors.into_result().map(|()| amount)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdoptRequest {
    pub plan_id: Option<PlanId>,
    pub duration_months: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LogoutRequest {
    pub device_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn product_request_collects_all_messages() {
        let errors = ProductRequest {
            base_price: Some(dec!(-1)),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.messages("name"), ["The name field is required."]);
        assert_eq!(errors.messages("base_price"), ["The base price must be at least 0."]);
    }

    #[test]
    fn coupon_request_parses_kinds() {
        let request: CouponRequest = serde_json::from_str(
            r#"{"code": "trees10", "kind": {"type": "percent", "value": 10}, "usage_limit": 100}"#,
        )
        .unwrap();
        let params = request.validate().unwrap();
        assert_eq!(params.kind, CouponKind::Percent(10));
        assert_eq!(params.usage_limit, Some(100));
        assert!(params.is_active);
    }

    #[test]
    fn notification_request_defaults_to_push_for_everyone() {
        let request: NotificationRequest =
            serde_json::from_str(r#"{"title": "Monsoon sale", "body": "20% off planters"}"#).unwrap();
        let params = request.validate().unwrap();
        assert_eq!(params.audience, Audience::AllUsers);
        assert_eq!(params.channels, vec![Channel::Push]);

        let empty: NotificationRequest = serde_json::from_str(
            r#"{"title": "t", "body": "b", "audience": {"type": "users", "users": []}}"#,
        )
        .unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn donations_need_a_positive_amount() {
        assert_eq!(DonateRequest { amount: Some(dec!(25)) }.validate().unwrap(), dec!(25));
        let errors = DonateRequest { amount: Some(dec!(0)) }.validate().unwrap_err();
        assert_eq!(errors.messages("amount"), ["The amount must be greater than 0."]);
    }
}
