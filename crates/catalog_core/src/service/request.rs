//! Caller payloads for product create/update.
//!
//! # Invariants
//! - Payload validation runs before normalization hooks.
//! - `UpdateProductRequest` fields left as `None` keep the stored value.

use crate::model::product::Product;
use serde::{Deserialize, Deserializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected caller payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductValidationError {
    EmptyTitle,
    InvalidPrice(f64),
}

impl Display for ProductValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::InvalidPrice(price) => {
                write!(f, "price must be a non-negative number, got {price}")
            }
        }
    }
}

impl Error for ProductValidationError {}

/// Payload for creating one product.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreateProductRequest {
    pub title: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    /// Derived from `title` when absent or empty; normalized otherwise.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub stock: Option<u32>,
    pub sizes: Vec<String>,
    pub gender: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl CreateProductRequest {
    pub fn new(title: impl Into<String>, sizes: Vec<String>, gender: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sizes,
            gender: gender.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ProductValidationError> {
        validate_title(&self.title)?;
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }

    /// Builds an unsaved product with a fresh id. Hooks are not applied.
    pub fn into_product(self) -> Product {
        let mut product = Product::new(self.title, self.sizes, self.gender);
        product.price = self.price.unwrap_or(0.0);
        product.description = self.description;
        product.slug = self.slug.unwrap_or_default();
        product.stock = self.stock.unwrap_or(0);
        product.tags = self.tags.unwrap_or_default();
        product
    }
}

/// Partial payload merged onto a stored product.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub price: Option<f64>,
    /// `Some(None)` clears the description; `None` keeps it.
    #[serde(deserialize_with = "explicit_null")]
    pub description: Option<Option<String>>,
    /// An empty slug is ignored; the stored one is kept.
    pub slug: Option<String>,
    pub stock: Option<u32>,
    pub sizes: Option<Vec<String>>,
    pub gender: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl UpdateProductRequest {
    pub fn validate(&self) -> Result<(), ProductValidationError> {
        if let Some(title) = self.title.as_deref() {
            validate_title(title)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }

    /// Returns whether the payload carries a `tags` field.
    pub fn has_tags(&self) -> bool {
        self.tags.is_some()
    }

    /// Overwrites the fields present in this payload.
    pub fn merge_into(self, product: &mut Product) {
        if let Some(title) = self.title {
            product.title = title;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(slug) = self.slug.filter(|slug| !slug.is_empty()) {
            product.slug = slug;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(sizes) = self.sizes {
            product.sizes = sizes;
        }
        if let Some(gender) = self.gender {
            product.gender = gender;
        }
        if let Some(tags) = self.tags {
            product.tags = tags;
        }
    }
}

fn validate_title(title: &str) -> Result<(), ProductValidationError> {
    if title.is_empty() {
        return Err(ProductValidationError::EmptyTitle);
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), ProductValidationError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ProductValidationError::InvalidPrice(price));
    }
    Ok(())
}

// A present field (even `null`) deserializes to `Some(..)`; a missing one
// falls back to the `Default` of the container.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
