//! ActorEntity implementations for products, variants and variant attributes.
//!
//! Creation applies the catalog codes: products get a slug and a SKU derived from
//! their name and id, attributes get a slug and an uppercase code. Slugs stay
//! stable when an entry is renamed.

use super::actions::{ProductAction, VariantAction};
use super::CatalogError;
use crate::codes::{product_sku, slugify};
use crate::model::{
    Attribute, AttributeCreate, AttributeId, AttributeKind, AttributeUpdate, Product,
    ProductCreate, ProductId, ProductUpdate, ProductVariant, StockLevel, VariantCreate,
    VariantId, VariantUpdate,
};
use async_trait::async_trait;
use canopy_actors::ActorEntity;
use chrono::Utc;
use rust_decimal::Decimal;
use std::convert::Infallible;

fn required(field: &str, value: &str) -> Result<String, CatalogError> {
    let value = value.trim();
    if value.is_empty() {
        Err(CatalogError::InvalidInput(format!("{field} is required")))
    } else {
        Ok(value.to_string())
    }
}

fn non_negative(field: &str, amount: Decimal) -> Result<Decimal, CatalogError> {
    if amount.is_sign_negative() {
        Err(CatalogError::InvalidInput(format!("{field} must not be negative")))
    } else {
        Ok(amount)
    }
}

#[async_trait]
impl ActorEntity for Product {
    type Id = ProductId;
    type Create = ProductCreate;
    type Update = ProductUpdate;
    type Action = ProductAction;
    type ActionResult = Product;
    type Context = ();
    type Error = CatalogError;

    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, Self::Error> {
        let name = required("name", &params.name)?;
        let slug = params.slug.unwrap_or_else(|| slugify(&name));
        Ok(Self {
            id,
            sku: product_sku(&name, id.0),
            name,
            slug,
            description: params.description,
            base_price: non_negative("base_price", params.base_price)?,
            selling_price: None,
            original_price: None,
            in_stock: false,
            is_active: params.is_active,
            created_at: Utc::now(),
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.slug.clone())
    }

    async fn on_update(&mut self, update: ProductUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            self.name = required("name", &name)?;
        }
        if update.description.is_some() {
            self.description = update.description;
        }
        if let Some(price) = update.base_price {
            self.base_price = non_negative("base_price", price)?;
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: ProductAction,
        _ctx: &(),
    ) -> Result<Product, Self::Error> {
        match action {
            ProductAction::ApplyPricing(pricing) => {
                self.selling_price = pricing.selling_price;
                self.original_price = pricing.original_price;
                self.in_stock = pricing.in_stock;
                Ok(self.clone())
            }
        }
    }
}

#[async_trait]
impl ActorEntity for ProductVariant {
    type Id = VariantId;
    type Create = VariantCreate;
    type Update = VariantUpdate;
    type Action = VariantAction;
    type ActionResult = StockLevel;
    type Context = ();
    type Error = CatalogError;

    fn entity_name() -> &'static str {
        "ProductVariant"
    }

    fn from_create_params(id: VariantId, params: VariantCreate) -> Result<Self, Self::Error> {
        Ok(Self {
            id,
            product_id: params.product_id,
            size_id: params.size_id,
            color_id: params.color_id,
            planter_id: params.planter_id,
            sku: required("sku", &params.sku)?,
            price: non_negative("price", params.price)?,
            compare_at_price: params.compare_at_price,
            stock: params.stock,
            reserved: 0,
            is_active: true,
        })
    }

    /// One variant per product and attribute combination.
    fn unique_key(&self) -> Option<String> {
        Some(format!(
            "{}/{}/{}/{}",
            self.product_id, self.size_id, self.color_id, self.planter_id
        ))
    }

    async fn on_update(&mut self, update: VariantUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(price) = update.price {
            self.price = non_negative("price", price)?;
        }
        if update.compare_at_price.is_some() {
            self.compare_at_price = update.compare_at_price;
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: VariantAction,
        _ctx: &(),
    ) -> Result<StockLevel, Self::Error> {
        match action {
            VariantAction::AdjustStock(delta) => {
                let stock = i64::from(self.stock)
                    .saturating_add(delta)
                    .clamp(0, i64::from(u32::MAX));
                self.stock = u32::try_from(stock).unwrap_or(u32::MAX);
            }
            VariantAction::ReserveStock(quantity) => {
                if quantity == 0 {
                    return Err(CatalogError::InvalidQuantity(quantity));
                }
                let available = self.available();
                if available < quantity {
                    return Err(CatalogError::InsufficientStock {
                        requested: quantity,
                        available,
                    });
                }
                self.reserved += quantity;
            }
            VariantAction::ReleaseStock(quantity) => {
                self.reserved = self.reserved.saturating_sub(quantity);
            }
            VariantAction::CommitStock(quantity) => {
                if quantity > self.reserved {
                    return Err(CatalogError::InvalidQuantity(quantity));
                }
                self.reserved -= quantity;
                self.stock = self.stock.saturating_sub(quantity);
            }
        }
        Ok(self.level())
    }
}

#[async_trait]
impl<K: AttributeKind> ActorEntity for Attribute<K> {
    type Id = AttributeId<K>;
    type Create = AttributeCreate;
    type Update = AttributeUpdate;
    type Action = Infallible;
    type ActionResult = ();
    type Context = ();
    type Error = CatalogError;

    fn entity_name() -> &'static str {
        K::NAME
    }

    fn from_create_params(id: AttributeId<K>, params: AttributeCreate) -> Result<Self, Self::Error> {
        let name = required("name", &params.name)?;
        let code = required("code", &params.code)?.to_ascii_uppercase();
        if params.price_delta.is_some() && !K::PRICED {
            return Err(CatalogError::InvalidInput(format!(
                "{} cannot carry a price delta",
                K::NAME
            )));
        }
        Ok(Self {
            id,
            slug: params.slug.unwrap_or_else(|| slugify(&name)),
            name,
            code,
            price_delta: params.price_delta,
            hex: params.hex,
            is_active: true,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.slug.clone())
    }

    async fn on_update(&mut self, update: AttributeUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            self.name = required("name", &name)?;
        }
        if let Some(delta) = update.price_delta {
            if !K::PRICED {
                return Err(CatalogError::InvalidInput(format!(
                    "{} cannot carry a price delta",
                    K::NAME
                )));
            }
            self.price_delta = Some(delta);
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: Infallible, _ctx: &()) -> Result<(), Self::Error> {
        match action {}
    }
}
