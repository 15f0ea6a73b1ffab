//! Product catalog persistence core.
//!
//! Entity normalization, SQLite storage and the product service live here;
//! routing and presentation belong to callers such as `catalog_cli`.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::product::{normalize_slug, Product, ProductId};
pub use repo::product_repo::{
    ConstraintViolation, ProductListQuery, ProductLookup, ProductRepository, RepoError,
    RepoResult, SqliteProductRepository, UNIQUE_VIOLATION,
};
pub use service::product_service::{
    parse_product_id, ProductService, ProductServiceConfig, ProductServiceError, ServiceResult,
    UNEXPECTED_ERROR_MESSAGE,
};
pub use service::request::{CreateProductRequest, ProductValidationError, UpdateProductRequest};
