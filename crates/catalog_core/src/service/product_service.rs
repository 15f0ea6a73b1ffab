//! Product use-case service.
//!
//! # Responsibility
//! - Provide create/list/find/update/remove entry points for callers.
//! - Run normalization hooks before handing products to the repository.
//! - Translate repository failures into `ProductServiceError` categories.
//!
//! # Invariants
//! - Uniqueness is never checked up front; the service reacts to the
//!   storage `23505` code after a failed write.
//! - Internal errors never leak storage details to the caller; the cause is
//!   logged at error level instead.
//! - Each call performs at most one read plus one write/delete round trip.

use crate::model::product::{Product, ProductId};
use crate::repo::product_repo::{
    ProductListQuery, ProductLookup, ProductRepository, RepoError, UNIQUE_VIOLATION,
};
use crate::service::request::{CreateProductRequest, ProductValidationError, UpdateProductRequest};
use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Message returned for every unclassified failure.
pub const UNEXPECTED_ERROR_MESSAGE: &str =
    "Error unexpected, check the server logs for more information";

// Canonical hyphenated form, versions 1-8, plus the nil and max ids.
static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:[0-9a-f]{8}-[0-9a-f]{4}-[1-8][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}|00000000-0000-0000-0000-000000000000|ffffffff-ffff-ffff-ffff-ffffffffffff)$",
    )
    .expect("valid uuid regex")
});

pub type ServiceResult<T> = Result<T, ProductServiceError>;

/// Caller-facing error categories.
#[derive(Debug)]
pub enum ProductServiceError {
    /// Payload rejected before any storage access.
    Validation(ProductValidationError),
    /// Write hit a uniqueness constraint; carries the storage detail.
    Duplicate(String),
    /// No product matched.
    NotFound(String),
    /// Anything else. The message is safe to show to callers.
    Internal(String),
}

impl ProductServiceError {
    /// HTTP-style status code for the routing layer.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Duplicate(_) => 400,
            Self::NotFound(_) => 404,
            Self::Internal(_) => 500,
        }
    }
}

impl Display for ProductServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Duplicate(detail) => write!(f, "{detail}"),
            Self::NotFound(message) => write!(f, "{message}"),
            Self::Internal(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ProductServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProductValidationError> for ProductServiceError {
    fn from(value: ProductValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Behavior switches. `Default` keeps the historical behavior of the
/// catalog API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductServiceConfig {
    /// Report `find_one`/`remove` misses as `NotFound` instead of `Internal`.
    pub strict_not_found: bool,
    /// Match slug and title case-insensitively instead of comparing the slug
    /// to the lowercased and the title to the uppercased input.
    pub case_insensitive_lookup: bool,
    /// Lowercase tags supplied by `update`, as `create` does.
    pub lowercase_tags_on_update: bool,
}

/// Product service facade over repository implementations.
pub struct ProductService<R: ProductRepository> {
    repo: R,
    config: ProductServiceConfig,
}

impl<R: ProductRepository> ProductService<R> {
    /// Creates a service with the default configuration.
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, ProductServiceConfig::default())
    }

    pub fn with_config(repo: R, config: ProductServiceConfig) -> Self {
        Self { repo, config }
    }

    /// Validates, normalizes and inserts one product.
    ///
    /// # Errors
    /// - `Validation` for an empty title or a negative price.
    /// - `Duplicate` when title or slug is already taken.
    /// - `Internal` for any other storage failure.
    pub fn create(&self, request: CreateProductRequest) -> ServiceResult<Product> {
        request.validate()?;

        let mut product = request.into_product();
        product.before_insert();

        self.repo
            .insert_product(&product)
            .map_err(|err| self.handle_db_error(err))?;

        info!(
            "event=product_create module=service status=ok id={} slug={}",
            product.id, product.slug
        );
        Ok(product)
    }

    /// Returns one page of products in insertion order.
    ///
    /// Limit and offset are passed through unchecked.
    pub fn find_all(&self, query: &ProductListQuery) -> ServiceResult<Vec<Product>> {
        self.repo
            .list_products(query)
            .map_err(|err| self.handle_db_error(err))
    }

    /// Finds one product by id, or else by slug/title.
    ///
    /// `param` is treated as an id only when it is a canonical uuid string.
    pub fn find_one(&self, param: &str) -> ServiceResult<Product> {
        let found = match parse_product_id(param) {
            Some(id) => self.repo.get_product(id),
            None => self.repo.find_product(&self.lookup_for(param)),
        }
        .map_err(|err| self.handle_db_error(err))?;

        found.ok_or_else(|| self.lookup_miss(format!("Product with '{param}' not found")))
    }

    /// Merges `request` onto the stored product and saves it.
    ///
    /// # Errors
    /// - `NotFound` when `id` is unknown.
    /// - `Validation`, `Duplicate` and `Internal` as in `create`.
    pub fn update(&self, id: ProductId, request: UpdateProductRequest) -> ServiceResult<Product> {
        request.validate()?;

        let mut product = self
            .repo
            .get_product(id)
            .map_err(|err| self.handle_db_error(err))?
            .ok_or_else(|| {
                ProductServiceError::NotFound(format!("Product with id '{id}' not found"))
            })?;

        let tags_supplied = request.has_tags();
        request.merge_into(&mut product);
        product.before_update();
        if tags_supplied && self.config.lowercase_tags_on_update {
            product.lowercase_tags();
        }

        self.repo
            .update_product(&product)
            .map_err(|err| match err {
                RepoError::NotFound(_) => {
                    ProductServiceError::NotFound(format!("Product with id '{id}' not found"))
                }
                other => self.handle_db_error(other),
            })?;

        info!("event=product_update module=service status=ok id={id}");
        Ok(product)
    }

    /// Removes the product resolved by `find_one(id)`.
    ///
    /// Returns a confirmation message naming `id`.
    pub fn remove(&self, id: &str) -> ServiceResult<String> {
        let product = self.find_one(id)?;

        self.repo
            .delete_product(product.id)
            .map_err(|err| match err {
                RepoError::NotFound(_) => {
                    self.lookup_miss(format!("Product with '{id}' not found"))
                }
                other => self.handle_db_error(other),
            })?;

        info!(
            "event=product_remove module=service status=ok id={}",
            product.id
        );
        Ok(format!("Product with id '{id}' removed"))
    }

    fn lookup_for(&self, param: &str) -> ProductLookup {
        if self.config.case_insensitive_lookup {
            ProductLookup::SlugOrTitleNoCase(param.to_string())
        } else {
            ProductLookup::SlugOrUpperTitle {
                slug: param.to_lowercase(),
                title: param.to_uppercase(),
            }
        }
    }

    fn lookup_miss(&self, message: String) -> ProductServiceError {
        if self.config.strict_not_found {
            ProductServiceError::NotFound(message)
        } else {
            ProductServiceError::Internal(message)
        }
    }

    fn handle_db_error(&self, err: RepoError) -> ProductServiceError {
        if err.code() == Some(UNIQUE_VIOLATION) {
            let detail = err.detail().unwrap_or_default().to_string();
            return ProductServiceError::Duplicate(detail);
        }

        error!("event=product_db_error module=service status=error error={err}");
        ProductServiceError::Internal(UNEXPECTED_ERROR_MESSAGE.to_string())
    }
}

/// Returns the id when `param` is a canonical uuid string.
pub fn parse_product_id(param: &str) -> Option<ProductId> {
    if !UUID_RE.is_match(param) {
        return None;
    }
    Uuid::parse_str(param).ok()
}
