//! # Catalog Actors
//!
//! Products, their variants and the three variant attribute axes (sizes, colors,
//! planters). Each record type runs in its own actor; none of them has
//! dependencies, cross-record work (variant matrix seeding, price refresh) is done
//! by [`CatalogService`](crate::services::CatalogService) through background jobs.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](canopy_actors::ActorEntity) implementations
//! - [`error`] - [`CatalogError`] shared by all catalog actors
//! - [`actions`] - [`ProductAction`] (pricing) and [`VariantAction`] (inventory)
//! - [`pricing`] - price derivation and matrix planning
//!
//! ## Inventory
//!
//! A variant carries its own inventory: `stock` on hand and `reserved` units held
//! by pending orders.
//!
//! ```rust,ignore
//! variants.reserve_stock(id, 2).await?;  // pending order
//! variants.commit_stock(id, 2).await?;   // order paid
//! variants.adjust_stock(id, 10).await?;  // restock
//! ```

pub mod actions;
pub mod entity;
pub mod error;
pub mod pricing;

pub use actions::*;
pub use error::*;

use crate::clients::{AttributeClient, ProductClient, VariantClient};
use crate::model::{Attribute, AttributeKind, Product, ProductVariant};
use canopy_actors::ResourceActor;

/// Creates a new Product actor and its client.
pub fn new_products(buffer: usize) -> (ResourceActor<Product>, ProductClient) {
    let (actor, client) = ResourceActor::new(buffer);
    (actor, ProductClient::new(client))
}

/// Creates a new ProductVariant actor and its client.
pub fn new_variants(buffer: usize) -> (ResourceActor<ProductVariant>, VariantClient) {
    let (actor, client) = ResourceActor::new(buffer);
    (actor, VariantClient::new(client))
}

/// Creates an actor for one attribute axis.
pub fn new_attributes<K: AttributeKind>(
    buffer: usize,
) -> (ResourceActor<Attribute<K>>, AttributeClient<K>) {
    let (actor, client) = ResourceActor::new(buffer);
    (actor, AttributeClient::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AttributeCreate, ColorId, ColorKind, PlanterId, ProductCreate, ProductId, SizeId,
        SizeKind, StockLevel, VariantCreate,
    };
    use canopy_actors::ActorClient;
    use rust_decimal_macros::dec;

    fn variant_params(planter: u32, stock: u32) -> VariantCreate {
        VariantCreate {
            product_id: ProductId(1),
            size_id: SizeId::new(1),
            color_id: ColorId::new(1),
            planter_id: PlanterId::new(planter),
            sku: "ROX-00001-S-GRN-CLAY".to_string(),
            price: dec!(24.00),
            compare_at_price: None,
            stock,
        }
    }

    #[tokio::test]
    async fn test_reserve_commit_and_release() {
        let (actor, variants) = new_variants(8);
        tokio::spawn(actor.run(()));
        let id = variants.create_variant(variant_params(1, 5)).await.unwrap();

        let level = variants.reserve_stock(id, 3).await.unwrap();
        assert_eq!(level, StockLevel { stock: 5, reserved: 3, available: 2 });

        let err = variants.reserve_stock(id, 3).await.unwrap_err();
        assert_eq!(err, CatalogError::InsufficientStock { requested: 3, available: 2 });
        assert_eq!(
            variants.reserve_stock(id, 0).await.unwrap_err(),
            CatalogError::InvalidQuantity(0)
        );

        let level = variants.commit_stock(id, 2).await.unwrap();
        assert_eq!(level, StockLevel { stock: 3, reserved: 1, available: 2 });
        let level = variants.release_stock(id, 5).await.unwrap();
        assert_eq!(level.reserved, 0);

        let level = variants.adjust_stock(id, -10).await.unwrap();
        assert_eq!(level.stock, 0);
    }

    #[tokio::test]
    async fn test_extreme_stock_adjustments_saturate() {
        let (actor, variants) = new_variants(8);
        tokio::spawn(actor.run(()));
        let id = variants.create_variant(variant_params(1, 5)).await.unwrap();
        variants.reserve_stock(id, 2).await.unwrap();

        let level = variants.adjust_stock(id, i64::MAX).await.unwrap();
        assert_eq!(level.stock, u32::MAX);
        assert_eq!(level.reserved, 2);

        let level = variants.adjust_stock(id, i64::MIN).await.unwrap();
        assert_eq!(level, StockLevel { stock: 0, reserved: 2, available: 0 });

        // Still serving
        assert_eq!(variants.release_stock(id, 2).await.unwrap().reserved, 0);
    }

    #[tokio::test]
    async fn test_duplicate_combination_conflicts() {
        let (actor, variants) = new_variants(8);
        tokio::spawn(actor.run(()));
        variants.create_variant(variant_params(1, 0)).await.unwrap();
        let dup = variants.create_variant(variant_params(1, 0)).await;
        assert!(matches!(dup, Err(CatalogError::Conflict(_))));
        variants.create_variant(variant_params(2, 0)).await.unwrap();
        assert_eq!(variants.for_product(ProductId(1)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_product_gets_slug_and_sku() {
        let (actor, products) = new_products(8);
        tokio::spawn(actor.run(()));
        let params = ProductCreate {
            name: "Red Oak Sapling".to_string(),
            slug: None,
            description: None,
            base_price: dec!(20),
            is_active: true,
        };
        let first = products.create_product(params.clone()).await.unwrap();
        let second = products.create_product(params).await.unwrap();

        let first = products.get(first).await.unwrap().unwrap();
        let second = products.get(second).await.unwrap().unwrap();
        assert_eq!(first.slug, "red-oak-sapling");
        assert_eq!(first.sku, "ROS-00001");
        assert_eq!(second.slug, "red-oak-sapling-2");
        assert_eq!(first.selling_price, None);
    }

    #[tokio::test]
    async fn test_colors_reject_price_deltas() {
        let (actor, colors) = new_attributes::<ColorKind>(8);
        tokio::spawn(actor.run(()));
        let err = colors
            .create_attribute(AttributeCreate {
                name: "Green".to_string(),
                code: "grn".to_string(),
                price_delta: Some(dec!(1)),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));

        let (actor, sizes) = new_attributes::<SizeKind>(8);
        tokio::spawn(actor.run(()));
        let id = sizes
            .create_attribute(AttributeCreate {
                name: "Large".to_string(),
                code: "l".to_string(),
                price_delta: Some(dec!(6)),
                ..Default::default()
            })
            .await
            .unwrap();
        let large = sizes.get(id).await.unwrap().unwrap();
        assert_eq!(large.code, "L");
        assert_eq!(large.slug, "large");
    }
}
