//! Product domain model and write-time normalization.
//!
//! # Invariants
//! - `id` is generated once and never reused.
//! - After `before_insert`, `slug` is non-empty whenever `title` is, is
//!   lowercase with no spaces or apostrophes, and every tag is lowercase.
//! - After `before_update`, a non-empty `slug` is lowercase with no spaces or
//!   apostrophes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a product row.
pub type ProductId = Uuid;

/// Catalog product as persisted in the `products` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Unique across the catalog.
    pub title: String,
    /// Non-negative amount; `0.0` when the caller omits it.
    pub price: f64,
    pub description: Option<String>,
    /// URL-safe alternate key, unique across the catalog.
    pub slug: String,
    pub stock: u32,
    /// Ordered size labels, e.g. `["S", "M", "L"]`.
    pub sizes: Vec<String>,
    pub gender: String,
    pub tags: Vec<String>,
}

impl Product {
    /// Creates a product with a freshly generated id and default optional
    /// fields. No normalization happens here.
    pub fn new(title: impl Into<String>, sizes: Vec<String>, gender: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            price: 0.0,
            description: None,
            slug: String::new(),
            stock: 0,
            sizes,
            gender: gender.into(),
            tags: Vec::new(),
        }
    }

    /// Insert-time hook.
    ///
    /// Derives `slug` from `title` when it is empty, otherwise normalizes the
    /// supplied slug. Lowercases every tag.
    pub fn before_insert(&mut self) {
        let source = if self.slug.is_empty() {
            &self.title
        } else {
            &self.slug
        };
        self.slug = normalize_slug(source);
        self.lowercase_tags();
    }

    /// Update-time hook.
    ///
    /// Re-normalizes the current slug in place; it is never re-derived from
    /// `title`. Tags are left untouched.
    pub fn before_update(&mut self) {
        if !self.slug.is_empty() {
            self.slug = normalize_slug(&self.slug);
        }
    }

    /// Replaces every tag with its lowercase form, keeping order.
    pub fn lowercase_tags(&mut self) {
        for tag in &mut self.tags {
            *tag = tag.to_lowercase();
        }
    }
}

/// Lowercases `value`, turns each space into `_` and drops apostrophes.
///
/// ```
/// use catalog_core::normalize_slug;
///
/// assert_eq!(normalize_slug("Men's Cool Shirt"), "mens_cool_shirt");
/// ```
pub fn normalize_slug(value: &str) -> String {
    value.to_lowercase().replace(' ', "_").replace('\'', "")
}

#[cfg(test)]
mod tests {
    use super::{normalize_slug, Product};

    fn shirt(title: &str) -> Product {
        Product::new(title, vec!["M".to_string()], "unisex")
    }

    #[test]
    fn normalize_slug_lowercases_and_replaces_separators() {
        assert_eq!(normalize_slug("Cool Shirt"), "cool_shirt");
        assert_eq!(normalize_slug("Kid's  Hoodie"), "kids__hoodie");
        assert_eq!(normalize_slug(""), "");
    }

    #[test]
    fn before_insert_derives_missing_slug_from_title() {
        let mut product = shirt("Men's Chill Crew Neck");
        product.before_insert();
        assert_eq!(product.slug, "mens_chill_crew_neck");
    }

    #[test]
    fn before_insert_normalizes_supplied_slug() {
        let mut product = shirt("Cool Shirt");
        product.slug = "Men's Cool SHIRT".to_string();
        product.before_insert();
        assert_eq!(product.slug, "mens_cool_shirt");
    }

    #[test]
    fn before_insert_lowercases_tags_in_order() {
        let mut product = shirt("Cool Shirt");
        product.tags = vec!["Shirt".to_string(), "SUMMER".to_string(), "cotton".to_string()];
        product.before_insert();
        assert_eq!(product.tags, vec!["shirt", "summer", "cotton"]);
    }

    #[test]
    fn before_update_renormalizes_slug_but_not_tags() {
        let mut product = shirt("Cool Shirt");
        product.slug = "New Cool's Slug".to_string();
        product.tags = vec!["Mixed".to_string()];
        product.before_update();
        assert_eq!(product.slug, "new_cools_slug");
        assert_eq!(product.tags, vec!["Mixed"]);
    }

    #[test]
    fn before_update_leaves_empty_slug_alone() {
        let mut product = shirt("Cool Shirt");
        product.before_update();
        assert!(product.slug.is_empty());
    }
}
