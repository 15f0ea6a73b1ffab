//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the product data access contract used by the service.
//! - Isolate SQLite query details and error classification from callers.
//!
//! # Invariants
//! - Uniqueness is enforced by storage constraints; repositories report
//!   violations with SQLSTATE-style codes instead of checking up front.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod product_repo;
