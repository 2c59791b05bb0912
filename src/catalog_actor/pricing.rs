//! Price derivation and variant matrix planning.
//!
//! Pure functions; [`CatalogService`](crate::services::CatalogService) feeds them
//! with actor state and writes the results back.

use crate::model::{
    Color, ColorId, Planter, PlanterId, Pricing, ProductVariant, Size, SizeId,
};
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Derives a product's pricing from its variants.
///
/// The selling price is the cheapest active variant with units available. When
/// nothing is available the cheapest active variant still sets the price and
/// `in_stock` is false. Without active variants the product has no price.
pub fn derive_pricing<'a>(variants: impl IntoIterator<Item = &'a ProductVariant>) -> Pricing {
    let active: Vec<&ProductVariant> = variants.into_iter().filter(|v| v.is_active).collect();

    let in_stock = cheapest(active.iter().copied().filter(|v| v.available() > 0));
    match in_stock.or_else(|| cheapest(active.iter().copied())) {
        Some(variant) => Pricing {
            selling_price: Some(variant.price),
            original_price: variant.compare_at_price,
            in_stock: in_stock.is_some(),
        },
        None => Pricing::unavailable(),
    }
}

fn cheapest<'a>(variants: impl Iterator<Item = &'a ProductVariant>) -> Option<&'a ProductVariant> {
    variants.min_by_key(|v| (v.price, v.id))
}

/// Attribute ids of one variant.
pub type Combination = (SizeId, ColorId, PlanterId);

/// Active size x color x planter combinations that a product does not have yet.
pub fn matrix_combinations(
    sizes: &[Size],
    colors: &[Color],
    planters: &[Planter],
    existing: &[ProductVariant],
) -> Vec<Combination> {
    let taken: HashSet<Combination> = existing
        .iter()
        .map(|v| (v.size_id, v.color_id, v.planter_id))
        .collect();

    let mut combinations = Vec::new();
    for size in sizes.iter().filter(|s| s.is_active) {
        for color in colors.iter().filter(|c| c.is_active) {
            for planter in planters.iter().filter(|p| p.is_active) {
                let combination = (size.id, color.id, planter.id);
                if !taken.contains(&combination) {
                    combinations.push(combination);
                }
            }
        }
    }
    combinations
}

/// Base price plus the size and planter deltas.
pub fn variant_price(base: Decimal, size: &Size, planter: &Planter) -> Decimal {
    base + size.price_delta.unwrap_or_default() + planter.price_delta.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, AttributeId, AttributeKind, ProductId, VariantId};
    use rust_decimal_macros::dec;

    fn attribute<K: AttributeKind>(id: u32, delta: Option<Decimal>) -> Attribute<K> {
        Attribute {
            id: AttributeId::new(id),
            name: format!("{} {id}", K::NAME),
            slug: format!("{}-{id}", K::PREFIX),
            code: format!("C{id}"),
            price_delta: delta,
            hex: None,
            is_active: true,
        }
    }

    fn variant(id: u32, price: Decimal, stock: u32, reserved: u32) -> ProductVariant {
        ProductVariant {
            id: VariantId(id),
            product_id: ProductId(1),
            size_id: SizeId::new(1),
            color_id: ColorId::new(1),
            planter_id: PlanterId::new(id),
            sku: format!("SKU-{id}"),
            price,
            compare_at_price: Some(price + dec!(5)),
            stock,
            reserved,
            is_active: true,
        }
    }

    #[test]
    fn cheapest_available_variant_sets_the_price() {
        let variants = vec![
            variant(1, dec!(10.00), 3, 3),
            variant(2, dec!(14.50), 2, 0),
            variant(3, dec!(12.00), 1, 0),
        ];
        let pricing = derive_pricing(&variants);
        assert_eq!(pricing.selling_price, Some(dec!(12.00)));
        assert_eq!(pricing.original_price, Some(dec!(17.00)));
        assert!(pricing.in_stock);
    }

    #[test]
    fn sold_out_products_keep_their_cheapest_price() {
        let mut inactive = variant(3, dec!(1.00), 9, 0);
        inactive.is_active = false;
        let variants = vec![variant(1, dec!(20), 0, 0), variant(2, dec!(18), 0, 0), inactive];
        let pricing = derive_pricing(&variants);
        assert_eq!(pricing.selling_price, Some(dec!(18)));
        assert!(!pricing.in_stock);

        assert_eq!(derive_pricing(Vec::<ProductVariant>::new().iter()), Pricing::unavailable());
    }

    #[test]
    fn matrix_skips_existing_and_inactive_attributes() {
        let sizes = vec![attribute(1, None), attribute(2, Some(dec!(4)))];
        let mut retired: Color = attribute(2, None);
        retired.is_active = false;
        let colors = vec![attribute(1, None), retired];
        let planters = vec![attribute(1, None), attribute(2, None)];
        let existing = vec![variant(1, dec!(10), 0, 0)];

        let combinations = matrix_combinations(&sizes, &colors, &planters, &existing);
        assert_eq!(combinations.len(), 3);
        assert!(!combinations.contains(&(SizeId::new(1), ColorId::new(1), PlanterId::new(1))));
        assert!(combinations.iter().all(|(_, color, _)| *color == ColorId::new(1)));
    }

    #[test]
    fn variant_price_adds_deltas() {
        let size: Size = attribute(1, Some(dec!(2.50)));
        let planter: Planter = attribute(1, None);
        assert_eq!(variant_price(dec!(20), &size, &planter), dec!(22.50));
    }
}
