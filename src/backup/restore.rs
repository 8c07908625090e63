//! Backup restoration and version checks

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use rusqlite::{Connection, OpenFlags};
use tempfile::TempDir;
use zip::ZipArchive;
use crate::database::migrations;
use crate::error::{Result, VaultError};
use crate::DATABASE_FILENAME;

/// First bytes of every SQLite 3 database file
const SQLITE_HEADER: &[u8] = b"SQLite format 3\0";

/// Read the database entry out of a backup archive
fn read_database_entry(backup_path: &Path) -> Result<Vec<u8>> {
    let file = File::open(backup_path)
        .map_err(|e| VaultError::BackupError(format!("Failed to open backup: {}", e)))?;
    let mut archive = ZipArchive::new(file)?;

    let mut db_file = archive.by_name(DATABASE_FILENAME)
        .map_err(|e| VaultError::BackupError(format!("Database not found in backup: {}", e)))?;

    let mut db_data = Vec::new();
    db_file.read_to_end(&mut db_data)
        .map_err(|e| VaultError::BackupError(format!("Failed to read database from backup: {}", e)))?;

    Ok(db_data)
}

/// Restore a backup over the database file at `db_path`
///
/// The archive is unpacked and version-checked in a scratch folder first;
/// the target is only overwritten once the copy is known to be usable.
pub fn restore_backup(backup_path: &Path, db_path: &Path) -> Result<()> {
    let temp_dir = TempDir::new()?;
    let staged = extract_backup(backup_path, temp_dir.path())?;

    if !check_db_version(&staged)? {
        return Err(VaultError::BackupError(format!(
            "Backup {} was written by a newer version (database v{})",
            backup_path.display(),
            get_db_version(&staged)?,
        )));
    }

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(&staged, db_path)
        .map_err(|e| VaultError::BackupError(format!("Failed to write database: {}", e)))?;

    Ok(())
}

/// Extract a backup to a folder, returning the path to the extracted database
pub fn extract_backup(backup_path: &Path, target_folder: &Path) -> Result<PathBuf> {
    let db_data = read_database_entry(backup_path)?;

    fs::create_dir_all(target_folder)?;
    let db_path = target_folder.join(DATABASE_FILENAME);
    fs::write(&db_path, db_data)?;

    Ok(db_path)
}

/// True when the backup opens as a ZIP and holds a SQLite database file
pub fn verify_backup(backup_path: &Path) -> Result<bool> {
    match read_database_entry(backup_path) {
        Ok(data) => Ok(data.starts_with(SQLITE_HEADER)),
        Err(VaultError::BackupError(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Database version stored in a backup
pub fn get_backup_db_version(backup_path: &Path) -> Result<String> {
    let temp_dir = TempDir::new()?;
    let db_path = extract_backup(backup_path, temp_dir.path())?;
    get_db_version(&db_path)
}

/// True when this build can open the database in the backup
pub fn is_backup_compatible(backup_path: &Path) -> Result<bool> {
    let version = get_backup_db_version(backup_path)?;
    Ok(migrations::is_version_compatible(&version))
}

/// Database version of a database file, "1" when it has no properties row
pub fn get_db_version(db_path: &Path) -> Result<String> {
    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    migrations::get_database_version(&conn)
}

/// True when the database file is not newer than this build
pub fn check_db_version(db_path: &Path) -> Result<bool> {
    let version = get_db_version(db_path)?;
    Ok(migrations::is_version_compatible(&version))
}
