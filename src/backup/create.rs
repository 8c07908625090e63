//! Backup creation

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::io::Write;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;
use crate::error::{Result, VaultError};
use crate::DATABASE_FILENAME;
use super::{numbered_backup_filename, BackupKind};

const MAX_SEQUENCE: u32 = 1000;

/// Zip the database file at `db_path` into `backup_folder`
///
/// The archive holds a single entry named after the database file so a
/// restore does not depend on the name the vault folder uses.
pub(super) fn create_backup_from_path(
    backup_folder: &Path,
    db_path: &Path,
    kind: BackupKind,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    if !db_path.exists() {
        return Err(VaultError::BackupError(
            format!("Database file not found: {}", db_path.display()),
        ));
    }

    let db_data = fs::read(db_path)
        .map_err(|e| VaultError::BackupError(format!("Failed to read database: {}", e)))?;

    fs::create_dir_all(backup_folder)?;
    let (backup_path, zip_file) = create_unique(backup_folder, kind, now)?;
    let mut zip = ZipWriter::new(zip_file);

    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o600);

    zip.start_file(DATABASE_FILENAME, options)?;
    zip.write_all(&db_data)
        .map_err(|e| VaultError::BackupError(format!("Failed to write to zip: {}", e)))?;
    zip.finish()?;

    Ok(backup_path)
}

/// Create a backup file that does not exist yet, numbering same-second names
fn create_unique(backup_folder: &Path, kind: BackupKind, now: DateTime<Utc>) -> Result<(PathBuf, File)> {
    let mut sequence = 1;
    loop {
        let path = backup_folder.join(numbered_backup_filename(kind, now, sequence));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists && sequence < MAX_SEQUENCE => sequence += 1,
            Err(e) => {
                return Err(VaultError::BackupError(
                    format!("Failed to create backup file {}: {}", path.display(), e),
                ));
            }
        }
    }
}
