//! Catalog use-case services.
//!
//! # Responsibility
//! - Turn caller payloads into normalized products and persist them.
//! - Classify repository failures into caller-facing error categories.

pub mod product_service;
pub mod request;
