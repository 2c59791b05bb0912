//! Catalog records: variant attributes, products and their variants.

use super::{ProductId, VariantId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

// =============================================================================
// VARIANT ATTRIBUTES
// =============================================================================

/// Marker for one attribute axis of the variant matrix.
///
/// Sizes, colors and planters share one record shape and one actor
/// implementation; the marker keeps their ids and clients apart.
pub trait AttributeKind:
    fmt::Debug + Clone + Copy + PartialEq + Eq + Hash + PartialOrd + Ord + Send + Sync + 'static
{
    /// Name used in logs and error messages.
    const NAME: &'static str;
    /// Prefix of the displayed id (`size_3`).
    const PREFIX: &'static str;
    /// Whether this axis may add to the variant price.
    const PRICED: bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SizeKind {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorKind {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlanterKind {}

impl AttributeKind for SizeKind {
    const NAME: &'static str = "Size";
    const PREFIX: &'static str = "size";
    const PRICED: bool = true;
}

impl AttributeKind for ColorKind {
    const NAME: &'static str = "Color";
    const PREFIX: &'static str = "color";
    const PRICED: bool = false;
}

impl AttributeKind for PlanterKind {
    const NAME: &'static str = "Planter";
    const PREFIX: &'static str = "planter";
    const PRICED: bool = true;
}

/// Id of an attribute of kind `K`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeId<K: AttributeKind>(pub u32, PhantomData<K>);

impl<K: AttributeKind> AttributeId<K> {
    pub fn new(id: u32) -> Self {
        Self(id, PhantomData)
    }
}

impl<K: AttributeKind> From<u32> for AttributeId<K> {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

impl<K: AttributeKind> fmt::Display for AttributeId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", K::PREFIX, self.0)
    }
}

impl<K: AttributeKind> Serialize for AttributeId<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de, K: AttributeKind> Deserialize<'de> for AttributeId<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Self::new)
    }
}

/// One value on an attribute axis (a size, a color or a planter).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct Attribute<K: AttributeKind> {
    pub id: AttributeId<K>,
    pub name: String,
    pub slug: String,
    /// Short uppercase code used in variant SKUs.
    pub code: String,
    pub price_delta: Option<Decimal>,
    /// Display swatch, colors only.
    pub hex: Option<String>,
    pub is_active: bool,
}

pub type Size = Attribute<SizeKind>;
pub type Color = Attribute<ColorKind>;
pub type Planter = Attribute<PlanterKind>;
pub type SizeId = AttributeId<SizeKind>;
pub type ColorId = AttributeId<ColorKind>;
pub type PlanterId = AttributeId<PlanterKind>;

/// Payload for creating an attribute. `slug` is resolved by the client.
#[derive(Debug, Clone, Default)]
pub struct AttributeCreate {
    pub name: String,
    pub slug: Option<String>,
    pub code: String,
    pub price_delta: Option<Decimal>,
    pub hex: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AttributeUpdate {
    pub name: Option<String>,
    pub price_delta: Option<Decimal>,
    pub is_active: Option<bool>,
}

// =============================================================================
// PRODUCTS
// =============================================================================

/// A sellable product. Its selling price is derived from its variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub description: Option<String>,
    pub base_price: Decimal,
    pub selling_price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub in_stock: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub base_price: Decimal,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// Denormalized pricing copied onto a product from its variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pricing {
    pub selling_price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub in_stock: bool,
}

impl Pricing {
    pub fn unavailable() -> Self {
        Self {
            selling_price: None,
            original_price: None,
            in_stock: false,
        }
    }
}

// =============================================================================
// VARIANTS
// =============================================================================

/// One size x color x planter combination of a product, with its inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub size_id: SizeId,
    pub color_id: ColorId,
    pub planter_id: PlanterId,
    pub sku: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    /// Units on hand.
    pub stock: u32,
    /// Units held by pending orders.
    pub reserved: u32,
    pub is_active: bool,
}

impl ProductVariant {
    /// Units that can still be reserved.
    pub fn available(&self) -> u32 {
        self.stock.saturating_sub(self.reserved)
    }

    pub fn level(&self) -> StockLevel {
        StockLevel {
            stock: self.stock,
            reserved: self.reserved,
            available: self.available(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VariantCreate {
    pub product_id: ProductId,
    pub size_id: SizeId,
    pub color_id: ColorId,
    pub planter_id: PlanterId,
    pub sku: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub stock: u32,
}

#[derive(Debug, Clone, Default)]
pub struct VariantUpdate {
    pub price: Option<Decimal>,
    pub compare_at_price: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// Inventory of a variant after a stock action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockLevel {
    pub stock: u32,
    pub reserved: u32,
    pub available: u32,
}
