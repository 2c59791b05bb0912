//! Custom actions for the catalog actors.

use crate::model::Pricing;

/// Actions on a [`Product`](crate::model::Product).
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Copies pricing derived from the product's variants onto the product.
    /// Returns the updated product.
    ApplyPricing(Pricing),
}

/// Inventory actions on a [`ProductVariant`](crate::model::ProductVariant).
///
/// Every action returns the resulting [`StockLevel`](crate::model::StockLevel).
#[derive(Debug, Clone)]
pub enum VariantAction {
    /// Adds to (or removes from) the units on hand. Stock never drops below zero.
    AdjustStock(i64),
    /// Holds units for a pending order.
    ///
    /// # Errors
    /// Fails if the quantity is zero or exceeds the available units.
    ReserveStock(u32),
    /// Returns held units to the available pool.
    ReleaseStock(u32),
    /// Turns held units into sold units: both reserved and on-hand drop.
    CommitStock(u32),
}
