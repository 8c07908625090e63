//! Main Vault API
//!
//! A vault is a folder holding the database file, the settings file and
//! (by default) a `backups` sub-folder.

use std::path::{Path, PathBuf};
use std::time::Instant;
use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, info, warn};
use crate::backup::{is_backup_due, BackupKind, BackupManager};
use crate::crypto::{PasswordHashing, SecretKey};
use crate::database::{migrations, queries, Database, DbProperties};
use crate::database::queries::parse_timestamp;
use crate::error::{Result, VaultError};
use crate::settings::Settings;
use crate::utils::generate_database_id;
use crate::{DATABASE_FILENAME, DB_VERSION, SETTINGS_FILENAME};
use super::session::Session;

/// Main vault interface
pub struct Vault {
    pub(crate) folder: PathBuf,
    pub(crate) db: Option<Database>,
    pub(crate) hasher: PasswordHashing,
    pub(crate) settings: Settings,
    pub(crate) session: Option<Session>,
}

impl Vault {
    /// Create a new vault in `folder`
    ///
    /// Fails when the folder already holds a database.
    pub fn create(folder: &Path) -> Result<Self> {
        std::fs::create_dir_all(folder)?;

        let db_path = folder.join(DATABASE_FILENAME);
        if db_path.exists() {
            return Err(VaultError::InvalidOperation(
                format!("Vault already exists: {}", db_path.display())
            ));
        }

        let db = Database::create(&db_path)?;
        queries::set_properties(db.connection()?, &generate_database_id(), DB_VERSION)?;
        info!(folder = %folder.display(), "vault created");

        Self::with_database(folder, db)
    }

    /// Open an existing vault, upgrading an older database in place
    pub fn open(folder: &Path) -> Result<Self> {
        let db = Database::open(&folder.join(DATABASE_FILENAME))?;
        check_and_upgrade(db.connection()?)?;
        debug!(folder = %folder.display(), "vault opened");

        Self::with_database(folder, db)
    }

    /// Open the vault in `folder`, creating it when there is none
    pub fn open_or_create(folder: &Path) -> Result<Self> {
        if folder.join(DATABASE_FILENAME).exists() {
            Self::open(folder)
        } else {
            Self::create(folder)
        }
    }

    fn with_database(folder: &Path, db: Database) -> Result<Self> {
        let settings = Settings::load(&folder.join(SETTINGS_FILENAME))?;
        Ok(Self {
            folder: folder.to_path_buf(),
            db: Some(db),
            hasher: PasswordHashing::default(),
            settings,
            session: None,
        })
    }

    /// Replace the password hasher, e.g. with cheaper parameters
    ///
    /// Existing hashes made with other parameters are upgraded on the
    /// next successful login.
    pub fn with_hasher(mut self, hasher: PasswordHashing) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.folder.join(DATABASE_FILENAME)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.folder.join(SETTINGS_FILENAME)
    }

    /// Get a reference to the database for backup operations
    pub fn database(&self) -> Result<&Database> {
        self.db.as_ref().ok_or_else(|| VaultError::DatabaseError("Database not open".to_string()))
    }

    pub(crate) fn database_mut(&mut self) -> Result<&mut Database> {
        self.db.as_mut().ok_or_else(|| VaultError::DatabaseError("Database not open".to_string()))
    }

    pub(crate) fn conn(&self) -> Result<&Connection> {
        self.database()?.connection()
    }

    pub fn is_open(&self) -> bool {
        self.db.is_some()
    }

    /// Get database properties
    pub fn get_properties(&self) -> Result<DbProperties> {
        let raw = queries::get_properties(self.conn()?)?
            .ok_or_else(|| VaultError::DatabaseError("Properties not found".to_string()))?;

        Ok(DbProperties {
            database_id: raw.database_id,
            version: raw.version.unwrap_or_else(|| "1".to_string()),
            create_timestamp: raw.create_timestamp.as_deref().and_then(parse_timestamp),
            update_timestamp: raw.update_timestamp.as_deref().and_then(parse_timestamp),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validate, save and apply new settings
    ///
    /// A changed autoclose timeout applies to the running session too.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        settings.save(&self.settings_path())?;
        if let Some(session) = self.session.as_mut() {
            session.autoclose.set_timeout(settings.autoclose());
        }
        self.settings = settings;
        Ok(())
    }

    /// Backup manager for the configured backup folder
    pub fn backup_manager(&self) -> BackupManager {
        BackupManager::new(&self.settings.backup_folder_for(&self.folder))
    }

    /// Take a manual backup now
    pub fn backup_now(&self) -> Result<PathBuf> {
        self.backup_manager().create_backup(self.database()?, BackupKind::Manual)
    }

    /// Take an automatic backup when the schedule says one is due
    ///
    /// Old automatic backups beyond `keep_backups` are removed afterwards.
    pub fn run_scheduled_backup(&self, closing: bool) -> Result<Option<PathBuf>> {
        let manager = self.backup_manager();
        let last = manager.latest_backup()?.map(|b| b.timestamp);

        if !is_backup_due(self.settings.backup_schedule, last, Utc::now(), closing) {
            return Ok(None);
        }

        let path = manager.create_backup(self.database()?, BackupKind::Auto)?;
        manager.cleanup_auto_backups(self.settings.keep_backups)?;
        Ok(Some(path))
    }

    /// Replace the database with a backup and reopen it
    ///
    /// The current session is logged out.
    pub fn restore_backup(&mut self, backup_path: &Path) -> Result<()> {
        self.logout();

        let manager = self.backup_manager();
        if !manager.verify_backup(backup_path)? {
            return Err(VaultError::BackupError(
                format!("Not a valid backup: {}", backup_path.display())
            ));
        }

        let db_path = self.database_path();
        if let Some(mut db) = self.db.take() {
            db.close();
        }

        let restored = manager.restore_backup(backup_path, &db_path);

        // Reopen whatever is on disk now, the restored copy or the old file
        let db = Database::open(&db_path)?;
        check_and_upgrade(db.connection()?)?;
        self.db = Some(db);

        restored
    }

    /// Log out, run the on-close backup when due and close the database
    ///
    /// Returns the path of the backup taken, if any.
    pub fn close(&mut self) -> Result<Option<PathBuf>> {
        self.logout();

        if self.db.is_none() {
            return Ok(None);
        }

        let backup = self.run_scheduled_backup(true);
        if let Err(e) = &backup {
            warn!(error = %e, "automatic backup failed");
        }

        if let Some(mut db) = self.db.take() {
            db.close();
        }
        debug!(folder = %self.folder.display(), "vault closed");

        backup
    }

    /// Active session after the autoclose check
    ///
    /// An idle session is logged out and `SessionExpired` returned; any
    /// other call counts as activity.
    pub(crate) fn active_session(&mut self) -> Result<&Session> {
        let now = Instant::now();

        let expired = match self.session.as_ref() {
            None => return Err(VaultError::NotLoggedIn),
            Some(session) => session.autoclose.is_expired(now),
        };

        if expired {
            if let Some(session) = self.session.take() {
                info!(user = %session.username, "session closed after idle timeout");
            }
            return Err(VaultError::SessionExpired);
        }

        let session = self.session.as_mut().ok_or(VaultError::NotLoggedIn)?;
        session.autoclose.touch(now);
        Ok(&*session)
    }

    /// Username and key of the active session
    pub(crate) fn session_context(&mut self) -> Result<(String, SecretKey)> {
        let session = self.active_session()?;
        Ok((session.username.clone(), session.key.clone()))
    }
}

/// Refuse databases from a newer build and upgrade older ones
fn check_and_upgrade(conn: &Connection) -> Result<()> {
    let version = migrations::get_database_version(conn)?;
    if !migrations::is_version_compatible(&version) {
        return Err(VaultError::DatabaseError(format!(
            "Database version {} is newer than supported version {}",
            version, DB_VERSION
        )));
    }
    migrations::upgrade_database(conn, &version)
}

impl Drop for Vault {
    fn drop(&mut self) {
        self.session = None;
        if let Some(mut db) = self.db.take() {
            db.close();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::backup::BackupSchedule;
    use tempfile::TempDir;

    pub fn cheap_hasher() -> PasswordHashing {
        PasswordHashing::new(64, 1, 1).unwrap()
    }

    pub fn create_test_vault() -> (Vault, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let vault = Vault::create(temp_dir.path()).unwrap().with_hasher(cheap_hasher());
        (vault, temp_dir)
    }

    /// Vault with `alice` registered and logged in
    pub fn logged_in_vault() -> (Vault, TempDir) {
        let (mut vault, temp_dir) = create_test_vault();
        vault.register("alice", "alice@example.com", "Secret123").unwrap();
        vault.login("alice", "Secret123").unwrap();
        (vault, temp_dir)
    }

    #[test]
    fn test_create_and_properties() {
        let (vault, temp) = create_test_vault();
        let props = vault.get_properties().unwrap();
        assert_eq!(props.version, DB_VERSION);
        assert_eq!(props.database_id.len(), 32);
        assert!(props.create_timestamp.is_some());
        assert_eq!(vault.database_path(), temp.path().join(DATABASE_FILENAME));
        assert_eq!(vault.folder(), temp.path());
    }

    #[test]
    fn test_create_twice_fails() {
        let (vault, temp) = create_test_vault();
        drop(vault);
        assert!(matches!(Vault::create(temp.path()), Err(VaultError::InvalidOperation(_))));
        assert!(Vault::open(temp.path()).is_ok());
        assert!(Vault::open_or_create(temp.path()).is_ok());
    }

    #[test]
    fn test_open_nonexistent() {
        let result = Vault::open(Path::new("/nonexistent/path"));
        assert!(matches!(result, Err(VaultError::DatabaseNotFound(_))));
    }

    #[test]
    fn test_open_future_database_fails() {
        let (vault, temp) = create_test_vault();
        queries::set_db_version(vault.conn().unwrap(), "999").unwrap();
        drop(vault);

        assert!(matches!(Vault::open(temp.path()), Err(VaultError::DatabaseError(_))));
    }

    #[test]
    fn test_update_settings_persists() {
        let (mut vault, temp) = create_test_vault();
        let settings = Settings {
            language: "de".to_string(),
            backup_schedule: BackupSchedule::Daily,
            ..Settings::default()
        };
        vault.update_settings(settings.clone()).unwrap();
        drop(vault);

        let vault = Vault::open(temp.path()).unwrap();
        assert_eq!(vault.settings(), &settings);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let (mut vault, _temp) = create_test_vault();
        let settings = Settings { theme: "neon".to_string(), ..Settings::default() };
        assert!(matches!(vault.update_settings(settings), Err(VaultError::SettingsError(_))));
        assert_eq!(vault.settings().theme, "light");
    }

    #[test]
    fn test_close_runs_on_close_backup() {
        let (mut vault, temp) = create_test_vault();
        vault.update_settings(Settings {
            backup_schedule: BackupSchedule::OnClose,
            ..Settings::default()
        }).unwrap();

        let backup = vault.close().unwrap().unwrap();
        assert!(backup.starts_with(temp.path().join(crate::BACKUP_FOLDER_NAME)));
        assert!(!vault.is_open());

        // Closing again is a no-op
        assert!(vault.close().unwrap().is_none());
    }

    #[test]
    fn test_close_without_schedule() {
        let (mut vault, temp) = create_test_vault();
        vault.update_settings(Settings {
            backup_schedule: BackupSchedule::Never,
            ..Settings::default()
        }).unwrap();

        assert!(vault.close().unwrap().is_none());
        assert!(!temp.path().join(crate::BACKUP_FOLDER_NAME).exists());
    }

    #[test]
    fn test_weekly_backup_not_repeated() {
        let (vault, _temp) = create_test_vault();
        assert_eq!(vault.settings().backup_schedule, BackupSchedule::Weekly);

        assert!(vault.run_scheduled_backup(false).unwrap().is_some());
        assert!(vault.run_scheduled_backup(false).unwrap().is_none());
        assert!(vault.run_scheduled_backup(true).unwrap().is_none());
    }

    #[test]
    fn test_restore_backup() {
        let (mut vault, _temp) = logged_in_vault();
        vault.add_credential("example.com", "alice", "alice@example.com", "hunter22").unwrap();
        let backup = vault.backup_now().unwrap();

        vault.delete_credential("example.com").unwrap();
        vault.restore_backup(&backup).unwrap();
        assert!(vault.current_user().is_none());

        vault.login("alice", "Secret123").unwrap();
        assert_eq!(vault.get_credential("example.com").unwrap().password, "hunter22");
    }

    #[test]
    fn test_restore_invalid_backup_keeps_database() {
        let (mut vault, temp) = logged_in_vault();
        let junk = temp.path().join("junk.zip");
        std::fs::write(&junk, b"junk").unwrap();

        assert!(matches!(vault.restore_backup(&junk), Err(VaultError::BackupError(_))));
        assert!(vault.is_open());
        vault.login("alice", "Secret123").unwrap();
    }
}
