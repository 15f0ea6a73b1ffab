//! Product repository contract and SQLite implementation.
//!
//! # Invariants
//! - Writes never normalize; callers hand over already-normalized products.
//! - Constraint failures are classified into SQLSTATE-style codes.
//! - Read paths reject malformed persisted rows instead of masking them.
//! - List and lookup order is insertion order (`rowid`).
//! - Lookups rely on the scalar functions registered by `db::open_db*`.

use crate::db::DbError;
use crate::model::product::{Product, ProductId};
use rusqlite::types::Value;
use rusqlite::{ffi, params, params_from_iter, Connection, ErrorCode, Row};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Unique-constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";
/// Check-constraint violation.
pub const CHECK_VIOLATION: &str = "23514";
/// Not-null violation.
pub const NOT_NULL_VIOLATION: &str = "23502";
/// Any other integrity constraint violation.
pub const INTEGRITY_VIOLATION: &str = "23000";

const PRODUCT_SELECT_SQL: &str = "SELECT
    id,
    title,
    price,
    description,
    slug,
    stock,
    sizes,
    gender,
    tags
FROM products";

pub type RepoResult<T> = Result<T, RepoError>;

/// Constraint failure reported by the storage engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// SQLSTATE-style code, see the `*_VIOLATION` constants.
    pub code: &'static str,
    /// Offending column when the engine names one.
    pub column: Option<String>,
    /// Human-readable conflict detail.
    pub detail: String,
}

/// Repository error for product persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Constraint(ConstraintViolation),
    NotFound(ProductId),
    InvalidData(String),
}

impl RepoError {
    /// Returns the SQLSTATE-style code for constraint failures.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Constraint(violation) => Some(violation.code),
            _ => None,
        }
    }

    /// Returns the engine detail message for constraint failures.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Constraint(violation) => Some(violation.detail.as_str()),
            _ => None,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Constraint(violation) => {
                write!(f, "constraint violation {}: {}", violation.code, violation.detail)
            }
            Self::NotFound(id) => write!(f, "product not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted product data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Pagination window for listing products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProductListQuery {
    /// Maximum rows to return; `None` returns every remaining row.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

impl ProductListQuery {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset,
        }
    }
}

/// Non-identifier lookup strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductLookup {
    /// `slug = ?slug OR unicode_upper(title) = ?title`, values compared verbatim.
    SlugOrUpperTitle { slug: String, title: String },
    /// Case-insensitive match of `term` against `slug` or `title`.
    SlugOrTitleNoCase(String),
}

/// Repository interface for product CRUD operations.
pub trait ProductRepository {
    fn insert_product(&self, product: &Product) -> RepoResult<()>;
    fn update_product(&self, product: &Product) -> RepoResult<()>;
    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>>;
    fn find_product(&self, lookup: &ProductLookup) -> RepoResult<Option<Product>>;
    fn list_products(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>>;
    fn delete_product(&self, id: ProductId) -> RepoResult<()>;
}

/// SQLite-backed product repository.
pub struct SqliteProductRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProductRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProductRepository for SqliteProductRepository<'_> {
    fn insert_product(&self, product: &Product) -> RepoResult<()> {
        let sizes = encode_list(&product.sizes)?;
        let tags = encode_list(&product.tags)?;

        self.conn
            .execute(
                "INSERT INTO products (
                    id,
                    title,
                    price,
                    description,
                    slug,
                    stock,
                    sizes,
                    gender,
                    tags
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
                params![
                    product.id.to_string(),
                    product.title.as_str(),
                    product.price,
                    product.description.as_deref(),
                    product.slug.as_str(),
                    product.stock,
                    sizes,
                    product.gender.as_str(),
                    tags,
                ],
            )
            .map_err(|err| classify_write_error(err, product))?;

        Ok(())
    }

    fn update_product(&self, product: &Product) -> RepoResult<()> {
        let sizes = encode_list(&product.sizes)?;
        let tags = encode_list(&product.tags)?;

        let changed = self
            .conn
            .execute(
                "UPDATE products
                 SET
                    title = ?1,
                    price = ?2,
                    description = ?3,
                    slug = ?4,
                    stock = ?5,
                    sizes = ?6,
                    gender = ?7,
                    tags = ?8,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?9;",
                params![
                    product.title.as_str(),
                    product.price,
                    product.description.as_deref(),
                    product.slug.as_str(),
                    product.stock,
                    sizes,
                    product.gender.as_str(),
                    tags,
                    product.id.to_string(),
                ],
            )
            .map_err(|err| classify_write_error(err, product))?;

        if changed == 0 {
            return Err(RepoError::NotFound(product.id));
        }

        Ok(())
    }

    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRODUCT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_product_row(row)?));
        }

        Ok(None)
    }

    fn find_product(&self, lookup: &ProductLookup) -> RepoResult<Option<Product>> {
        let (filter, bind_values) = match lookup {
            ProductLookup::SlugOrUpperTitle { slug, title } => (
                "slug = ?1 OR unicode_upper(title) = ?2",
                vec![Value::Text(slug.clone()), Value::Text(title.clone())],
            ),
            ProductLookup::SlugOrTitleNoCase(term) => (
                "unicode_lower(slug) = unicode_lower(?1) OR unicode_lower(title) = unicode_lower(?1)",
                vec![Value::Text(term.clone())],
            ),
        };

        let mut stmt = self.conn.prepare(&format!(
            "{PRODUCT_SELECT_SQL} WHERE {filter} ORDER BY rowid ASC LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_product_row(row)?));
        }

        Ok(None)
    }

    fn list_products(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>> {
        let mut sql = format!("{PRODUCT_SELECT_SQL} ORDER BY rowid ASC");
        let mut bind_values: Vec<Value> = Vec::new();

        match query.limit {
            Some(limit) => {
                sql.push_str(" LIMIT ?");
                bind_values.push(Value::Integer(i64::from(limit)));
            }
            None => sql.push_str(" LIMIT -1"),
        }
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut products = Vec::new();
        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }

        Ok(products)
    }

    fn delete_product(&self, id: ProductId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<Product> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in products.id"))
    })?;

    let stock = row.get::<_, i64>("stock")?;
    let stock = u32::try_from(stock).map_err(|_| {
        RepoError::InvalidData(format!("invalid stock value `{stock}` in products.stock"))
    })?;

    Ok(Product {
        id,
        title: row.get("title")?,
        price: row.get("price")?,
        description: row.get("description")?,
        slug: row.get("slug")?,
        stock,
        sizes: decode_list(row, "sizes")?,
        gender: row.get("gender")?,
        tags: decode_list(row, "tags")?,
    })
}

fn encode_list(values: &[String]) -> RepoResult<String> {
    serde_json::to_string(values)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode list column: {err}")))
}

fn decode_list(row: &Row<'_>, column: &str) -> RepoResult<Vec<String>> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw).map_err(|err| {
        RepoError::InvalidData(format!("invalid json array in products.{column}: {err}"))
    })
}

/// Maps SQLite constraint failures onto SQLSTATE-style codes.
///
/// Unique violations get a `Key (column)=(value) already exists.` detail built
/// from the product being written.
fn classify_write_error(err: rusqlite::Error, product: &Product) -> RepoError {
    let constraint = match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            Some((failure.extended_code, message.clone()))
        }
        _ => None,
    };
    let Some((extended_code, message)) = constraint else {
        return err.into();
    };

    let message = message.unwrap_or_else(|| err.to_string());
    let column = constraint_column(&message);
    let code = match extended_code {
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => UNIQUE_VIOLATION,
        ffi::SQLITE_CONSTRAINT_CHECK => CHECK_VIOLATION,
        ffi::SQLITE_CONSTRAINT_NOTNULL => NOT_NULL_VIOLATION,
        _ => INTEGRITY_VIOLATION,
    };

    let value = match (code, column.as_deref()) {
        (UNIQUE_VIOLATION, Some("title")) => Some(product.title.clone()),
        (UNIQUE_VIOLATION, Some("slug")) => Some(product.slug.clone()),
        (UNIQUE_VIOLATION, Some("id")) => Some(product.id.to_string()),
        _ => None,
    };
    let detail = match (column.as_deref(), value) {
        (Some(column), Some(value)) => format!("Key ({column})=({value}) already exists."),
        _ => message,
    };

    RepoError::Constraint(ConstraintViolation {
        code,
        column,
        detail,
    })
}

/// Extracts `title` from messages like `UNIQUE constraint failed: products.title`.
///
/// Only `table.column` targets count; CHECK messages carry an expression.
fn constraint_column(message: &str) -> Option<String> {
    let (_, target) = message.split_once("failed: ")?;
    let first = target.split(',').next()?.trim();
    let (_, column) = first.split_once('.')?;
    if column.is_empty() || column.contains(' ') {
        return None;
    }
    Some(column.to_string())
}
