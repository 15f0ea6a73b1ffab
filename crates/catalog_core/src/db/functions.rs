//! Scalar SQL functions installed on every catalog connection.
//!
//! SQLite's built-in `UPPER`/`LOWER` only fold ASCII letters, so lookups that
//! compare against Rust-side case mapping go through these instead.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// Unicode uppercase of its single text argument; `NULL` stays `NULL`.
const UNICODE_UPPER: &str = "unicode_upper";
/// Unicode lowercase of its single text argument; `NULL` stays `NULL`.
const UNICODE_LOWER: &str = "unicode_lower";

pub(crate) fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;
    conn.create_scalar_function(UNICODE_UPPER, 1, flags, |ctx| {
        Ok(ctx.get::<Option<String>>(0)?.map(|value| value.to_uppercase()))
    })?;
    conn.create_scalar_function(UNICODE_LOWER, 1, flags, |ctx| {
        Ok(ctx.get::<Option<String>>(0)?.map(|value| value.to_lowercase()))
    })?;
    Ok(())
}
