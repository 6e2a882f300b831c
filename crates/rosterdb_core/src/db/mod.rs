//! SQLite storage bootstrap and schema versioning.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the roster store.
//! - Upgrade the schema and gate repositories on a ready connection.
//!
//! # Invariants
//! - Members and teams must not be read or written before the schema is
//!   at [`schema::SCHEMA_VERSION`].

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory, open_db_with_config, DEFAULT_BUSY_TIMEOUT};
pub use schema::{ensure_schema_ready, SCHEMA_VERSION};

pub type DbResult<T> = Result<T, DbError>;

/// Storage-level failure.
///
/// Every variant is treated as "store unavailable" by the query layer.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Connection was not upgraded to the current schema.
    SchemaOutdated { db_version: u32, expected: u32 },
    /// `PRAGMA foreign_keys` is off on the connection.
    ForeignKeysDisabled,
    /// `open_db_with_config` was called without `db_path`.
    MissingPath,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::SchemaOutdated {
                db_version,
                expected,
            } => write!(
                f,
                "database schema version {db_version} is behind required {expected}"
            ),
            Self::ForeignKeysDisabled => write!(f, "connection does not enforce foreign keys"),
            Self::MissingPath => write!(f, "no database path configured"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::SchemaOutdated { .. }
            | Self::ForeignKeysDisabled
            | Self::MissingPath => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
