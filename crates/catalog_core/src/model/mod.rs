//! Catalog domain model.
//!
//! # Responsibility
//! - Define the product record shared by repository and service layers.
//! - Own the field-normalization hooks that run before every write.
//!
//! # Invariants
//! - Every product is identified by a stable `ProductId`.
//! - Normalization hooks are pure transforms and never fail.

pub mod product;
