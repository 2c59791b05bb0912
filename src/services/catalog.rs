//! Catalog operations that span several catalog actors.

use crate::catalog_actor::pricing::{derive_pricing, matrix_combinations, variant_price};
use crate::catalog_actor::CatalogError;
use crate::clients::{AttributeClient, ProductClient, VariantClient};
use crate::codes::variant_sku;
use crate::jobs::{Job, JobQueue};
use crate::model::{
    Attribute, AttributeCreate, AttributeKind, ColorKind, PlanterKind, Product, ProductCreate,
    ProductId, ProductVariant, SizeKind, VariantCreate, VariantId, VariantUpdate,
};
use canopy_actors::ActorClient;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Admin edit of a variant: price fields and a relative stock change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VariantChange {
    pub price: Option<Decimal>,
    pub compare_at_price: Option<Decimal>,
    pub is_active: Option<bool>,
    pub stock_delta: Option<i64>,
}

/// A product with its sellable variants.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<ProductVariant>,
}

#[derive(Clone)]
pub struct CatalogService {
    products: ProductClient,
    variants: VariantClient,
    sizes: AttributeClient<SizeKind>,
    colors: AttributeClient<ColorKind>,
    planters: AttributeClient<PlanterKind>,
    jobs: JobQueue,
}

impl CatalogService {
    pub fn new(
        products: ProductClient,
        variants: VariantClient,
        sizes: AttributeClient<SizeKind>,
        colors: AttributeClient<ColorKind>,
        planters: AttributeClient<PlanterKind>,
        jobs: JobQueue,
    ) -> Self {
        Self {
            products,
            variants,
            sizes,
            colors,
            planters,
            jobs,
        }
    }

    /// Creates the product and queues seeding of its variant matrix.
    #[instrument(skip(self, params), fields(name = %params.name))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, CatalogError> {
        let id = self.products.create_product(params).await?;
        self.jobs.dispatch(Job::SeedVariantMatrix(id));
        self.products.require(id).await
    }

    pub async fn create_size(
        &self,
        params: AttributeCreate,
    ) -> Result<Attribute<SizeKind>, CatalogError> {
        self.add_attribute(&self.sizes, params).await
    }

    pub async fn create_color(
        &self,
        params: AttributeCreate,
    ) -> Result<Attribute<ColorKind>, CatalogError> {
        self.add_attribute(&self.colors, params).await
    }

    pub async fn create_planter(
        &self,
        params: AttributeCreate,
    ) -> Result<Attribute<PlanterKind>, CatalogError> {
        self.add_attribute(&self.planters, params).await
    }

    /// A new attribute value opens new combinations for every product.
    async fn add_attribute<K: AttributeKind>(
        &self,
        client: &AttributeClient<K>,
        params: AttributeCreate,
    ) -> Result<Attribute<K>, CatalogError> {
        let id = client.create_attribute(params).await?;
        let products = self.products.list().await?;
        for product in &products {
            self.jobs.dispatch(Job::SeedVariantMatrix(product.id));
        }
        info!(kind = K::NAME, attribute = %id, products = products.len(), "Queued matrix seeding");
        client.require(id).await
    }

    /// Creates the product's missing size x color x planter variants, priced from
    /// the base price and attribute deltas and with no stock. Returns how many
    /// were created.
    #[instrument(skip(self))]
    pub async fn seed_variant_matrix(&self, id: ProductId) -> Result<usize, CatalogError> {
        let product = self.products.require(id).await?;
        let sizes = self.sizes.list().await?;
        let colors = self.colors.list().await?;
        let planters = self.planters.list().await?;
        let existing = self.variants.for_product(id).await?;

        let mut created = 0;
        for (size_id, color_id, planter_id) in
            matrix_combinations(&sizes, &colors, &planters, &existing)
        {
            let (Some(size), Some(color), Some(planter)) = (
                sizes.iter().find(|s| s.id == size_id),
                colors.iter().find(|c| c.id == color_id),
                planters.iter().find(|p| p.id == planter_id),
            ) else {
                continue;
            };
            let params = VariantCreate {
                product_id: id,
                size_id,
                color_id,
                planter_id,
                sku: variant_sku(&product.sku, &size.code, &color.code, &planter.code),
                price: variant_price(product.base_price, size, planter),
                compare_at_price: None,
                stock: 0,
            };
            match self.variants.create_variant(params).await {
                Ok(_) => created += 1,
                // Seeded by an earlier job in the meantime.
                Err(CatalogError::Conflict(key)) => debug!(%key, "Variant exists"),
                Err(e) => return Err(e),
            }
        }
        if created > 0 {
            self.refresh_price(id).await?;
        }
        Ok(created)
    }

    /// Copies the pricing derived from the product's variants onto the product.
    #[instrument(skip(self))]
    pub async fn refresh_price(&self, id: ProductId) -> Result<Product, CatalogError> {
        let variants = self.variants.for_product(id).await?;
        let pricing = derive_pricing(&variants);
        self.products.apply_pricing(id, pricing).await
    }

    /// Applies an admin edit to a variant and queues a price refresh for its
    /// product.
    #[instrument(skip(self))]
    pub async fn update_variant(
        &self,
        id: VariantId,
        change: VariantChange,
    ) -> Result<ProductVariant, CatalogError> {
        let mut variant = self.variants.require(id).await?;
        if change.price.is_some() || change.compare_at_price.is_some() || change.is_active.is_some() {
            let update = VariantUpdate {
                price: change.price,
                compare_at_price: change.compare_at_price,
                is_active: change.is_active,
            };
            variant = self.variants.update_variant(id, update).await?;
        }
        if let Some(delta) = change.stock_delta.filter(|d| *d != 0) {
            let level = self.variants.adjust_stock(id, delta).await?;
            variant.stock = level.stock;
            variant.reserved = level.reserved;
        }
        self.jobs.dispatch(Job::RefreshProductPrice(variant.product_id));
        Ok(variant)
    }

    /// Active products, in creation order.
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let mut products = self.products.list().await?;
        products.retain(|p| p.is_active);
        Ok(products)
    }

    pub async fn product_detail(&self, slug: &str) -> Result<ProductDetail, CatalogError> {
        let product = self
            .products
            .find_by_slug(slug)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| CatalogError::NotFound(slug.to_string()))?;
        let mut variants = self.variants.for_product(product.id).await?;
        variants.retain(|v| v.is_active);
        Ok(ProductDetail { product, variants })
    }
}
