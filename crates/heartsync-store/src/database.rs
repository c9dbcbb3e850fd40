//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use heartsync_shared::constants::APP_NAME;
use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::migrations;

const DB_FILE: &str = "heartsync.db";

/// The platform data directory for the application.
pub fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", APP_NAME, APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(StoreError::NoDataDir)
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the application database.
    ///
    /// With no `data_dir` the file is placed in the platform data directory:
    /// - Linux:   `~/.local/share/heartsync/heartsync.db`
    /// - macOS:   `~/Library/Application Support/com.HeartSync.HeartSync/heartsync.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\HeartSync\HeartSync\data\heartsync.db`
    pub fn new(data_dir: Option<&Path>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => default_data_dir()?,
        };
        std::fs::create_dir_all(&data_dir)?;

        let db_path = data_dir.join(DB_FILE);
        tracing::info!(path = %db_path.display(), "opening database");

        Self::open_at(&db_path)
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// A throwaway database, gone when dropped.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Filesystem path of the open database, `None` when in memory.
    pub fn path(&self) -> Option<PathBuf> {
        self.conn
            .path()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(Some(dir.path())).expect("should open");
        assert_eq!(db.path(), Some(dir.path().join(DB_FILE)));
    }

    #[test]
    fn reopening_keeps_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        drop(Database::open_at(&path).unwrap());

        let db = Database::open_at(&path).unwrap();
        let version: u32 = db
            .conn()
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, migrations::CURRENT_VERSION);
    }

    #[test]
    fn default_dir_is_named_after_the_app() {
        // Hosts without a home directory have no platform data dir.
        let Ok(dir) = default_data_dir() else {
            return;
        };
        let rendered = dir.to_string_lossy().to_lowercase();
        assert!(rendered.contains(&APP_NAME.to_lowercase()), "{rendered}");
    }

    #[test]
    fn in_memory_has_no_path() {
        let db = Database::in_memory().unwrap();
        assert!(db.path().is_none());
    }
}
