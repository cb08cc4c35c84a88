//! Database layer for freezer.
//!
//! Provides SQLite-backed persistence for boxes and samples. The
//! [`SqliteStore`] implements [`crate::store::InventoryStore`] on top of a
//! shared [`Database`] handle.

mod inventory;
mod schema;

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, MutexGuard};
use rusqlite::{Connection, OptionalExtension};

use freezer_shared::errors::{FreezerError, FreezerResult};

pub use inventory::SqliteStore;

/// Helper macro to convert rusqlite errors to FreezerError.
macro_rules! db_err {
    ($result:expr) => {
        $result.map_err(|e| FreezerError::Database(e.to_string()))
    };
}

pub(crate) use db_err;

/// SQLite database handle.
///
/// Thread-safe via `parking_lot::Mutex`. [`SqliteStore`] wraps this to
/// provide the inventory store API.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create the database.
    pub fn open(db_path: &Path) -> FreezerResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = db_err!(Connection::open(db_path))?;

        // - WAL mode: readers do not block the single writer
        // - FULL sync: fsync after each transaction
        // - Busy timeout: a second CLI invocation waits instead of failing
        db_err!(conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=FULL;
            PRAGMA foreign_keys=ON;
            PRAGMA busy_timeout=10000;
            "
        ))?;

        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> FreezerResult<Self> {
        let conn = db_err!(Connection::open_in_memory())?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> FreezerResult<Self> {
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Acquire the database connection.
    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    /// Initialize database schema.
    ///
    /// A new database gets the full schema. An existing database must already
    /// be at [`schema::SCHEMA_VERSION`]; there are no migrations.
    fn init_schema(conn: &Connection) -> FreezerResult<()> {
        db_err!(conn.execute_batch(schema::SCHEMA_VERSION_TABLE))?;

        let current_version: Option<i32> = db_err!(
            conn.query_row(
                "SELECT version FROM schema_version WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()
        )?;

        match current_version {
            None => Self::apply_full_schema(conn)?,
            Some(v) if v == schema::SCHEMA_VERSION => {}
            Some(v) => {
                return Err(FreezerError::Database(format!(
                    "Schema version mismatch: database has v{}, process expects v{}",
                    v,
                    schema::SCHEMA_VERSION
                )));
            }
        }

        Ok(())
    }

    /// Apply full schema for new database.
    fn apply_full_schema(conn: &Connection) -> FreezerResult<()> {
        for sql in schema::all_schemas() {
            db_err!(conn.execute_batch(sql))?;
        }

        let now = Utc::now().to_rfc3339();
        db_err!(conn.execute(
            "INSERT INTO schema_version (id, version, updated_at) VALUES (1, ?1, ?2)",
            rusqlite::params![schema::SCHEMA_VERSION, now],
        ))?;

        tracing::info!(
            "Initialized database schema version {}",
            schema::SCHEMA_VERSION
        );
        Ok(())
    }
}
