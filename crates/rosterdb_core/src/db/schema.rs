//! Roster schema versions and connection readiness checks.
//!
//! # Invariants
//! - `PRAGMA user_version` equals the last applied step.
//! - Repositories only accept connections at [`SCHEMA_VERSION`] with
//!   foreign keys enforced.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    name: &'static str,
    ddl: &'static str,
}

const STEPS: [SchemaStep; 2] = [
    SchemaStep {
        version: 1,
        name: "roster_tables",
        ddl: include_str!("sql/0001_roster_tables.sql"),
    },
    SchemaStep {
        version: 2,
        name: "search_indexes",
        ddl: include_str!("sql/0002_search_indexes.sql"),
    },
];

/// Schema version this build reads and writes.
pub const SCHEMA_VERSION: u32 = STEPS[STEPS.len() - 1].version;

/// Version range covered by one [`upgrade_schema`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaUpgrade {
    pub from: u32,
    pub to: u32,
}

impl SchemaUpgrade {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Brings the schema up to [`SCHEMA_VERSION`] inside one transaction.
///
/// # Errors
/// - [`DbError::UnsupportedSchemaVersion`] when the file was written by a
///   newer build.
pub fn upgrade_schema(conn: &mut Connection) -> DbResult<SchemaUpgrade> {
    let from = schema_version(conn)?;
    if from > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: SCHEMA_VERSION,
        });
    }

    let upgrade = SchemaUpgrade {
        from,
        to: SCHEMA_VERSION,
    };
    if upgrade.is_noop() {
        return Ok(upgrade);
    }

    let tx = conn.transaction()?;
    for step in STEPS.iter().filter(|step| step.version > from) {
        tx.execute_batch(step.ddl)?;
        tx.pragma_update(None, "user_version", step.version)?;
        debug!(
            "event=db_schema_step module=db status=ok step={} version={}",
            step.name, step.version
        );
    }
    tx.commit()?;

    info!(
        "event=db_schema_upgrade module=db status=ok from_version={} to_version={}",
        upgrade.from, upgrade.to
    );
    Ok(upgrade)
}

/// Checks that `conn` enforces foreign keys and carries the current schema.
///
/// # Errors
/// - [`DbError::ForeignKeysDisabled`] when `PRAGMA foreign_keys` is off.
/// - [`DbError::SchemaOutdated`] / [`DbError::UnsupportedSchemaVersion`]
///   when `user_version` differs from [`SCHEMA_VERSION`].
pub fn ensure_schema_ready(conn: &Connection) -> DbResult<()> {
    let foreign_keys: i64 = conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))?;
    if foreign_keys != 1 {
        return Err(DbError::ForeignKeysDisabled);
    }

    let db_version = schema_version(conn)?;
    match db_version.cmp(&SCHEMA_VERSION) {
        std::cmp::Ordering::Equal => Ok(()),
        std::cmp::Ordering::Less => Err(DbError::SchemaOutdated {
            db_version,
            expected: SCHEMA_VERSION,
        }),
        std::cmp::Ordering::Greater => Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported: SCHEMA_VERSION,
        }),
    }
}
