//! Clients for the catalog actors.

use crate::catalog_actor::{CatalogError, ProductAction, VariantAction};
use crate::codes::{slugify, unique_slug};
use crate::model::{
    Attribute, AttributeCreate, AttributeId, AttributeKind, Pricing, Product, ProductCreate,
    ProductId, ProductUpdate, ProductVariant, StockLevel, VariantCreate, VariantId,
    VariantUpdate,
};
use async_trait::async_trait;
use canopy_actors::{ActorClient, FrameworkError, ResourceClient};
use tracing::{debug, instrument};

resource_client!(
    /// Client for interacting with the Product actor.
    ProductClient,
    Product,
    CatalogError
);

impl ProductClient {
    /// Creates a product under the first free slug derived from its name.
    #[instrument(skip(self, params), fields(name = %params.name))]
    pub async fn create_product(&self, mut params: ProductCreate) -> Result<ProductId, CatalogError> {
        let base = params.slug.take().unwrap_or_else(|| slugify(&params.name));
        let existing = self.list().await?;
        params.slug = Some(unique_slug(&base, existing.iter().map(|p| p.slug.as_str())));
        debug!(slug = ?params.slug, "Creating product");
        self.inner.create(params).await.map_err(CatalogError::from)
    }

    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, CatalogError> {
        self.inner.update(id, update).await.map_err(CatalogError::from)
    }

    pub async fn require(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.get(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, CatalogError> {
        Ok(self.list().await?.into_iter().find(|p| p.slug == slug))
    }

    #[instrument(skip(self))]
    pub async fn apply_pricing(
        &self,
        id: ProductId,
        pricing: Pricing,
    ) -> Result<Product, CatalogError> {
        debug!(?pricing, "Applying pricing");
        self.inner
            .perform_action(id, ProductAction::ApplyPricing(pricing))
            .await
            .map_err(CatalogError::from)
    }
}

resource_client!(
    /// Client for interacting with the ProductVariant actor.
    VariantClient,
    ProductVariant,
    CatalogError
);

impl VariantClient {
    #[instrument(skip(self, params), fields(sku = %params.sku))]
    pub async fn create_variant(&self, params: VariantCreate) -> Result<VariantId, CatalogError> {
        self.inner.create(params).await.map_err(CatalogError::from)
    }

    #[instrument(skip(self))]
    pub async fn update_variant(
        &self,
        id: VariantId,
        update: VariantUpdate,
    ) -> Result<ProductVariant, CatalogError> {
        self.inner.update(id, update).await.map_err(CatalogError::from)
    }

    pub async fn require(&self, id: VariantId) -> Result<ProductVariant, CatalogError> {
        self.get(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub async fn for_product(
        &self,
        product: ProductId,
    ) -> Result<Vec<ProductVariant>, CatalogError> {
        let mut variants = self.list().await?;
        variants.retain(|v| v.product_id == product);
        Ok(variants)
    }

    async fn stock_action(
        &self,
        id: VariantId,
        action: VariantAction,
    ) -> Result<StockLevel, CatalogError> {
        debug!(?action, "Sending stock action");
        self.inner
            .perform_action(id, action)
            .await
            .map_err(CatalogError::from)
    }

    #[instrument(skip(self))]
    pub async fn adjust_stock(&self, id: VariantId, delta: i64) -> Result<StockLevel, CatalogError> {
        self.stock_action(id, VariantAction::AdjustStock(delta)).await
    }

    /// Holds units for a pending order.
    #[instrument(skip(self))]
    pub async fn reserve_stock(
        &self,
        id: VariantId,
        quantity: u32,
    ) -> Result<StockLevel, CatalogError> {
        self.stock_action(id, VariantAction::ReserveStock(quantity)).await
    }

    #[instrument(skip(self))]
    pub async fn release_stock(
        &self,
        id: VariantId,
        quantity: u32,
    ) -> Result<StockLevel, CatalogError> {
        self.stock_action(id, VariantAction::ReleaseStock(quantity)).await
    }

    #[instrument(skip(self))]
    pub async fn commit_stock(
        &self,
        id: VariantId,
        quantity: u32,
    ) -> Result<StockLevel, CatalogError> {
        self.stock_action(id, VariantAction::CommitStock(quantity)).await
    }
}

/// Client for one attribute axis (sizes, colors or planters).
pub struct AttributeClient<K: AttributeKind> {
    inner: ResourceClient<Attribute<K>>,
}

impl<K: AttributeKind> Clone for AttributeClient<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

#[async_trait]
impl<K: AttributeKind> ActorClient<Attribute<K>> for AttributeClient<K> {
    type Error = CatalogError;

    fn inner(&self) -> &ResourceClient<Attribute<K>> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.into()
    }
}

impl<K: AttributeKind> AttributeClient<K> {
    pub fn new(inner: ResourceClient<Attribute<K>>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, params), fields(kind = K::NAME, name = %params.name))]
    pub async fn create_attribute(
        &self,
        mut params: AttributeCreate,
    ) -> Result<AttributeId<K>, CatalogError> {
        let base = params.slug.take().unwrap_or_else(|| slugify(&params.name));
        let existing = self.list().await?;
        params.slug = Some(unique_slug(&base, existing.iter().map(|a| a.slug.as_str())));
        self.inner.create(params).await.map_err(CatalogError::from)
    }

    pub async fn require(&self, id: AttributeId<K>) -> Result<Attribute<K>, CatalogError> {
        self.get(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }
}
