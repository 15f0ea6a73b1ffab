//! Catalog database bootstrap.
//!
//! A connection handed out by `open_db`/`open_db_in_memory` is ready for the
//! product repository: pragmas set, `unicode_upper`/`unicode_lower` installed
//! and the `products` schema migrated to `migrations::latest_version()`.
//! Opening a file written by a newer binary fails instead of guessing.

mod functions;
pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating a catalog database.
#[derive(Debug)]
pub enum DbError {
    /// Engine-level failure (I/O, locking, bad SQL in a migration).
    Sqlite(rusqlite::Error),
    /// The file's `user_version` is ahead of the migrations compiled in.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "catalog storage error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "catalog schema version {db_version} is newer than supported {latest_supported}; upgrade the binary"
            ),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
