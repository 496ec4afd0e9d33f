//! SQLite-backed ant catalog
//!
//! This module provides the relational store that holds:
//! - The taxonomic hierarchy (family, subfamily, tribe, genus, species)
//! - Regions and the species distributed in them
//! - Nuptial flight sightings
//! - A ledger of imported source files
//!
//! Every write that may create more than one row runs inside a savepoint, so
//! a failure half way leaves nothing behind. Savepoints nest, which lets the
//! importers wrap a whole file in one all-or-nothing unit while each row
//! still goes through the same find-or-create operations.

mod flights;
mod biology;
mod regions;
mod schema;
mod taxa;
mod types;

pub use biology::months_from_range;
pub use flights::{validate_flight, DEFAULT_MIN_FLIGHT_COUNT};
pub use types::*;

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::core::error::{is_unique_violation, CatalogError, Result};

/// Current schema version
const SCHEMA_VERSION: i32 = 2;

/// The ant catalog backed by SQLite
pub struct Catalog {
    conn: Connection,
    path: Option<PathBuf>,
    savepoint_depth: Cell<u32>,
}

impl Catalog {
    /// Open or create a catalog database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        tracing::debug!(path = %path.display(), "opened catalog");
        Self::with_connection(conn, Some(path.to_path_buf()))
    }

    /// Open a throwaway catalog that lives only in memory
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, None)
    }

    fn with_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let catalog = Self {
            conn,
            path,
            savepoint_depth: Cell::new(0),
        };
        catalog.init_schema()?;
        Ok(catalog)
    }

    /// Location of the database file (`None` for in-memory catalogs)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` atomically
    ///
    /// All writes made by `f` are committed together when it returns `Ok`
    /// and rolled back when it returns `Err`. Calls may nest.
    pub fn atomically<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let depth = self.savepoint_depth.get();
        let name = format!("antdb_sp{}", depth);

        self.conn.execute_batch(&format!("SAVEPOINT {};", name))?;
        self.savepoint_depth.set(depth + 1);
        let result = f(self);
        self.savepoint_depth.set(depth);

        match result {
            Ok(value) => {
                self.conn.execute_batch(&format!("RELEASE {};", name))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self
                    .conn
                    .execute_batch(&format!("ROLLBACK TO {0}; RELEASE {0};", name))
                {
                    tracing::error!(error = %rollback, "rollback of {} failed", name);
                }
                Err(err)
            }
        }
    }

    /// Insert a row, treating a UNIQUE violation as "someone else created it"
    ///
    /// On a unique violation `reread` is used to fetch the existing row. Any
    /// other error is returned unchanged.
    pub(crate) fn insert_or_reread<T>(
        &self,
        insert: impl FnOnce(&Connection) -> rusqlite::Result<T>,
        reread: impl FnOnce(&Self) -> Result<Option<T>>,
        what: &'static str,
        key: &str,
    ) -> Result<(T, bool)> {
        match insert(&self.conn) {
            Ok(row) => Ok((row, true)),
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(what, key, "lost insert race, re-reading");
                let existing = reread(self)?.ok_or_else(|| CatalogError::not_found(what, key))?;
                Ok((existing, false))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Row counts for the status display
    pub fn statistics(&self) -> Result<CatalogStats> {
        let count = |sql: &str| -> Result<i64> {
            Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
        };

        Ok(CatalogStats {
            schema_version: self.schema_version()?.unwrap_or(0),
            families: count("SELECT COUNT(*) FROM families")?,
            sub_families: count("SELECT COUNT(*) FROM sub_families")?,
            tribes: count("SELECT COUNT(*) FROM tribes")?,
            genera: count("SELECT COUNT(*) FROM genera")?,
            species: count("SELECT COUNT(*) FROM species")?,
            invalid_species: count("SELECT COUNT(*) FROM species WHERE valid = 0")?,
            regions: count("SELECT COUNT(*) FROM regions")?,
            distributions: count("SELECT COUNT(*) FROM distributions")?,
            flights: count("SELECT COUNT(*) FROM flights")?,
            unreviewed_flights: count("SELECT COUNT(*) FROM flights WHERE reviewed = 0")?,
        })
    }

    /// Record a successfully imported file in the ledger
    #[allow(clippy::too_many_arguments)]
    pub fn record_import_run(
        &self,
        importer: &str,
        file_name: &str,
        sha256: &str,
        rows: u64,
        created: u64,
        updated: u64,
        skipped: u64,
    ) -> Result<i64> {
        self.conn.execute(
            r#"INSERT INTO import_runs
                 (importer, file_name, sha256, rows, created, updated, skipped, imported_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            params![
                importer,
                file_name,
                sha256,
                rows as i64,
                created as i64,
                updated as i64,
                skipped as i64,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent imports first
    pub fn import_runs(&self, limit: usize) -> Result<Vec<ImportRun>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, importer, file_name, sha256, rows, created, updated, skipped, imported_at
               FROM import_runs ORDER BY id DESC LIMIT ?1"#,
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(ImportRun {
                id: row.get(0)?,
                importer: row.get(1)?,
                file_name: row.get(2)?,
                sha256: row.get(3)?,
                rows: row.get::<_, i64>(4)? as u64,
                created: row.get::<_, i64>(5)? as u64,
                updated: row.get::<_, i64>(6)? as u64,
                skipped: row.get::<_, i64>(7)? as u64,
                imported_at: parse_datetime(row.get::<_, String>(8)?),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Remove all data and recreate an empty schema
    pub fn reset(&mut self) -> Result<()> {
        tracing::info!("resetting catalog");
        self.drop_schema()?;
        self.init_schema()
    }
}

/// Parse a stored RFC 3339 timestamp
fn parse_datetime(s: String) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}
