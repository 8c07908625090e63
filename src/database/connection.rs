//! Database connection management

use std::path::{Path, PathBuf};
use rusqlite::Connection;
use tracing::debug;
use crate::error::{VaultError, Result};
use super::schema;

/// Database connection wrapper
pub struct Database {
    /// Path to the database file
    path: PathBuf,
    /// SQLite connection
    conn: Option<Connection>,
}

impl Database {
    /// Open an existing database at the specified path
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VaultError::DatabaseNotFound(path.display().to_string()));
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        debug!(path = %path.display(), "database opened");

        Ok(Self {
            path: path.to_path_buf(),
            conn: Some(conn),
        })
    }

    /// Create a new database with all tables
    pub fn create(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;

        for sql in schema::CREATE_ALL_TABLES {
            conn.execute(sql, [])?;
        }
        debug!(path = %path.display(), "database created");

        Ok(Self {
            path: path.to_path_buf(),
            conn: Some(conn),
        })
    }

    /// Get a reference to the connection
    pub fn connection(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or_else(|| {
            VaultError::DatabaseError("Database not open".to_string())
        })
    }

    /// Get a mutable reference to the connection
    pub fn connection_mut(&mut self) -> Result<&mut Connection> {
        self.conn.as_mut().ok_or_else(|| {
            VaultError::DatabaseError("Database not open".to_string())
        })
    }

    /// Get the database path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the database connection
    pub fn close(&mut self) {
        self.conn = None;
    }

    /// Check if database is open
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    pub fn begin_transaction(&mut self) -> Result<()> {
        self.connection()?.execute_batch("BEGIN TRANSACTION")?;
        Ok(())
    }

    pub fn commit_transaction(&mut self) -> Result<()> {
        self.connection()?.execute_batch("COMMIT")?;
        Ok(())
    }

    pub fn rollback_transaction(&mut self) -> Result<()> {
        self.connection()?.execute_batch("ROLLBACK")?;
        Ok(())
    }

    /// Run `f` inside a transaction, rolling back when it fails
    pub fn in_transaction<T>(&mut self, f: impl FnOnce(&rusqlite::Connection) -> Result<T>) -> Result<T> {
        self.begin_transaction()?;
        let result = match self.connection() {
            Ok(conn) => f(conn),
            Err(e) => Err(e),
        };
        match result {
            Ok(value) => {
                self.commit_transaction()?;
                Ok(value)
            }
            Err(e) => {
                self.rollback_transaction()?;
                Err(e)
            }
        }
    }

    /// Force a WAL checkpoint so the main file holds every committed write
    ///
    /// Must run before the file is copied into a backup.
    pub fn checkpoint(&self) -> Result<()> {
        self.connection()?.execute_batch("PRAGMA wal_checkpoint(TRUNCATE)")?;
        Ok(())
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_and_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let mut db = Database::create(&db_path).unwrap();
        assert!(db.is_open());
        db.close();
        assert!(!db.is_open());
        assert!(db.connection().is_err());

        let db = Database::open(&db_path).unwrap();
        assert_eq!(db.path(), db_path.as_path());
    }

    #[test]
    fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = Database::open(&temp_dir.path().join("missing.db"));
        assert!(matches!(result, Err(VaultError::DatabaseNotFound(_))));
    }

    #[test]
    fn test_checkpoint_after_write() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let db = Database::create(&db_path).unwrap();
        db.connection().unwrap().execute_batch("PRAGMA journal_mode=WAL").unwrap();

        db.connection().unwrap().execute(
            "INSERT INTO hv_properties (database_id, version, create_timestamp, update_timestamp) VALUES (?, ?, ?, ?)",
            rusqlite::params!["test-id", "2", "2024-01-01 00:00:00", "2024-01-01 00:00:00"]
        ).unwrap();

        db.checkpoint().unwrap();

        let wal_path = temp_dir.path().join("test.db-wal");
        let wal_size = std::fs::metadata(&wal_path).map(|m| m.len()).unwrap_or(0);
        assert_eq!(wal_size, 0, "WAL should be truncated after checkpoint");
    }

    #[test]
    fn test_transaction_rollback() {
        let temp_dir = TempDir::new().unwrap();
        let mut db = Database::create(&temp_dir.path().join("test.db")).unwrap();

        let result: Result<()> = db.in_transaction(|conn| {
            conn.execute(
                "INSERT INTO hv_properties (database_id, version) VALUES ('a', '2')",
                [],
            )?;
            Err(VaultError::InvalidOperation("abort".to_string()))
        });
        assert!(result.is_err());

        let count: i64 = db.connection().unwrap()
            .query_row("SELECT COUNT(*) FROM hv_properties", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);

        db.in_transaction(|conn| {
            conn.execute("INSERT INTO hv_properties (database_id, version) VALUES ('b', '2')", [])?;
            Ok(())
        }).unwrap();
        let count: i64 = db.connection().unwrap()
            .query_row("SELECT COUNT(*) FROM hv_properties", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::create(&temp_dir.path().join("test.db")).unwrap();
        let enabled: i64 = db.connection().unwrap()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
