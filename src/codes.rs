//! Slug and SKU generation.
//!
//! Entities call these from `from_create_params`; clients call [`unique_slug`]
//! before creating so that two products named alike get `tulip` and `tulip-2`.

use std::collections::HashSet;

/// Lowercase ASCII slug: alphanumeric runs joined by single dashes.
///
/// Anything that is not an ASCII letter or digit separates words. Text with no
/// usable characters becomes `"item"`.
pub fn slugify(text: &str) -> String {
    let slug = text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "item".to_string()
    } else {
        slug
    }
}

/// `base` when free, otherwise the first free `base-2`, `base-3`, ...
pub fn unique_slug<'a>(base: &str, taken: impl IntoIterator<Item = &'a str>) -> String {
    let taken: HashSet<&str> = taken.into_iter().collect();
    if !taken.contains(base) {
        return base.to_string();
    }
    (2u32..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

/// Three-letter SKU prefix from the initials of the first three words.
///
/// `"Red Oak Sapling"` gives `ROS`, `"Maple"` gives `MXX`.
pub fn sku_prefix(name: &str) -> String {
    let mut prefix: String = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter_map(|word| word.chars().next())
        .take(3)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    while prefix.len() < 3 {
        prefix.push('X');
    }
    prefix
}

/// SKU of a catalog entry (product or tree): `ROS-00042`.
pub fn product_sku(name: &str, id: u32) -> String {
    format!("{}-{id:05}", sku_prefix(name))
}

/// SKU of a product variant: the product SKU followed by the attribute codes.
pub fn variant_sku(product_sku: &str, size_code: &str, color_code: &str, planter_code: &str) -> String {
    [product_sku, size_code, color_code, planter_code]
        .join("-")
        .to_uppercase()
}

/// Code of a planted tree: `ROS-00042-T0007`.
pub fn instance_code(tree_sku: &str, id: u32) -> String {
    format!("{tree_sku}-T{id:04}")
}
