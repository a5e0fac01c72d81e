// Library Manager - Circulation tracking for small libraries
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! SQLite pool for the catalog
//!
//! File databases run in WAL mode with a busy timeout, so a writer that finds
//! the lock taken waits for it instead of failing. In-memory databases exist
//! for tests and live exactly as long as their single pooled connection.

use crate::error::{LibraryError, Result};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::ConnectOptions;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a writer waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on pooled connections for a file database
const MAX_FILE_CONNECTIONS: u32 = 5;

/// Handle to an open catalog database
///
/// Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    path: Option<PathBuf>,
}

impl Database {
    /// Open the catalog at `database_path`, creating the file and any missing
    /// parent directories, then apply pending migrations
    pub async fn new<P: AsRef<Path>>(database_path: P) -> Result<Self> {
        let path = database_path.as_ref();
        ensure_parent_dir(path)?;

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_FILE_CONNECTIONS)
            .acquire_timeout(BUSY_TIMEOUT)
            .connect_with(options)
            .await?;

        let db = Self {
            pool,
            path: Some(path.to_path_buf()),
        };
        db.migrate().await?;

        tracing::debug!(path = %path.display(), "Opened library database");
        Ok(db)
    }

    /// Fresh, migrated database that vanishes when dropped
    ///
    /// Each connection to `:memory:` sees its own database, so the pool holds
    /// exactly one connection and never recycles it.
    pub async fn new_in_memory() -> Result<Self> {
        let options = "sqlite::memory:"
            .parse::<SqliteConnectOptions>()?
            .synchronous(SqliteSynchronous::Normal)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool, path: None };
        db.migrate().await?;
        Ok(db)
    }

    /// Bring the schema up to date; already-applied steps are skipped
    pub async fn migrate(&self) -> Result<()> {
        crate::storage::migrations::run_migrations(&self.pool)
            .await
            .map_err(|e| LibraryError::MigrationFailed(e.to_string()))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// File backing this database, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Wait for checked-out connections to come back, then close the pool
    pub async fn close(self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }

    /// `library.db` under the user's data directory
    ///
    /// Uses `$XDG_DATA_HOME/library-manager`, then `$HOME/.local/share/library-manager`,
    /// then the working directory.
    pub fn default_path() -> PathBuf {
        default_path_from(std::env::var_os("XDG_DATA_HOME"), std::env::var_os("HOME"))
    }

    /// `true` when `PRAGMA integrity_check` reports no problems
    pub async fn check_integrity(&self) -> Result<bool> {
        let verdict: String = sqlx::query_scalar("PRAGMA integrity_check")
            .fetch_one(&self.pool)
            .await?;
        Ok(verdict == "ok")
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|e| {
                LibraryError::FileIoError(format!("Cannot create {}: {}", parent.display(), e))
            })
        }
        _ => Ok(()),
    }
}

fn default_path_from(xdg_data_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    let data_dir = xdg_data_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|home| PathBuf::from(home).join(".local").join("share")));

    match data_dir {
        Some(dir) => dir.join("library-manager").join("library.db"),
        None => PathBuf::from("library.db"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new_in_memory().await.expect("Failed to create in-memory database");

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('books', 'members', 'transactions')",
        )
        .fetch_one(db.pool())
        .await
        .expect("Failed to query schema");

        assert_eq!(tables, 3);
        assert!(db.path().is_none());
        assert!(db.check_integrity().await.expect("Failed to check integrity"));
    }

    #[tokio::test]
    async fn test_file_database_creates_parent_dirs() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("library.db");

        let db = Database::new(&path).await.expect("Failed to create database");
        assert_eq!(db.path(), Some(path.as_path()));
        assert!(path.exists());

        db.close().await.expect("Failed to close database");
    }

    #[test]
    fn test_default_path_resolution() {
        assert_eq!(
            default_path_from(Some("/data".into()), Some("/home/ada".into())),
            PathBuf::from("/data/library-manager/library.db")
        );
        assert_eq!(
            default_path_from(Some("".into()), Some("/home/ada".into())),
            PathBuf::from("/home/ada/.local/share/library-manager/library.db")
        );
        assert_eq!(default_path_from(None, None), PathBuf::from("library.db"));
    }
}
