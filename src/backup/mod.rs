//! Backup and restore
//!
//! Backups are ZIP files holding a copy of the database file, named
//! `hvb-YYYYMMDD-HHMMSS-{auto|manual}.zip` so the folder listing sorts by
//! age and the kind is visible without opening the archive. A second
//! backup of the same kind within one second gets a `-2`, `-3`, ... suffix.

mod create;
mod restore;
mod schedule;

pub use restore::{get_backup_db_version, is_backup_compatible, get_db_version, check_db_version};
pub use schedule::{BackupSchedule, is_backup_due};

use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::info;
use crate::database::Database;
use crate::error::Result;

/// Backup file prefix
pub const BACKUP_PREFIX: &str = "hvb";

/// Auto backup suffix
pub const BACKUP_AUTO: &str = "auto";

/// Manual backup suffix
pub const BACKUP_MANUAL: &str = "manual";

/// Timestamp format used in backup file names
pub const BACKUP_DATE_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Who asked for a backup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    /// Taken by the schedule
    Auto,
    /// Requested by the user
    Manual,
}

impl BackupKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            BackupKind::Auto => BACKUP_AUTO,
            BackupKind::Manual => BACKUP_MANUAL,
        }
    }
}

/// Backup folder handle
pub struct BackupManager {
    folder: PathBuf,
}

impl BackupManager {
    pub fn new(folder: &Path) -> Self {
        Self {
            folder: folder.to_path_buf(),
        }
    }

    /// Get the backup folder path
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Create a backup of an open database
    ///
    /// The WAL is checkpointed first so the copied file is complete.
    pub fn create_backup(&self, db: &Database, kind: BackupKind) -> Result<PathBuf> {
        db.checkpoint()?;
        let path = create::create_backup_from_path(&self.folder, db.path(), kind, Utc::now())?;
        info!(path = %path.display(), kind = kind.suffix(), "backup created");
        Ok(path)
    }

    /// Create a backup from a database file that is not open
    pub fn create_backup_from_path(&self, db_path: &Path, kind: BackupKind) -> Result<PathBuf> {
        let path = create::create_backup_from_path(&self.folder, db_path, kind, Utc::now())?;
        info!(path = %path.display(), kind = kind.suffix(), "backup created");
        Ok(path)
    }

    /// Replace the database file at `db_path` with the one in the backup
    ///
    /// Backups written by a newer schema version are refused.
    pub fn restore_backup(&self, backup_path: &Path, db_path: &Path) -> Result<()> {
        restore::restore_backup(backup_path, db_path)?;
        info!(backup = %backup_path.display(), "backup restored");
        Ok(())
    }

    /// Extract a backup to a folder for inspection
    pub fn extract_backup(&self, backup_path: &Path, target_folder: &Path) -> Result<PathBuf> {
        restore::extract_backup(backup_path, target_folder)
    }

    /// List backups, newest first
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        let mut backups = Vec::new();

        if !self.folder.exists() {
            return Ok(backups);
        }

        for entry in fs::read_dir(&self.folder)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(info) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|name| parse_backup_filename(name, &path))
            {
                backups.push(info);
            }
        }

        backups.sort_by(|a, b| (b.timestamp, b.sequence).cmp(&(a.timestamp, a.sequence)));
        Ok(backups)
    }

    /// Check that a backup holds a SQLite database
    pub fn verify_backup(&self, backup_path: &Path) -> Result<bool> {
        restore::verify_backup(backup_path)
    }

    /// Delete all but the newest `keep_count` backups of any kind
    pub fn cleanup_old_backups(&self, keep_count: usize) -> Result<usize> {
        let backups = self.list_backups()?;
        self.delete_beyond(backups.iter(), keep_count)
    }

    /// Delete all but the newest `keep_count` automatic backups
    ///
    /// Manual backups are never touched.
    pub fn cleanup_auto_backups(&self, keep_count: usize) -> Result<usize> {
        let backups = self.list_backups()?;
        self.delete_beyond(backups.iter().filter(|b| b.kind == BackupKind::Auto), keep_count)
    }

    fn delete_beyond<'a>(&self, backups: impl Iterator<Item = &'a BackupInfo>, keep_count: usize) -> Result<usize> {
        let mut deleted = 0;
        for backup in backups.skip(keep_count) {
            fs::remove_file(&backup.path)?;
            deleted += 1;
        }
        if deleted > 0 {
            info!(deleted, kept = keep_count, "old backups removed");
        }
        Ok(deleted)
    }

    /// Newest backup, if any
    pub fn latest_backup(&self) -> Result<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().next())
    }
}

/// Information about a backup file
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub path: PathBuf,
    /// Time encoded in the file name (UTC)
    pub timestamp: DateTime<Utc>,
    pub kind: BackupKind,
    /// 1 for the first backup of its kind in a second, then 2, 3, ...
    pub sequence: u32,
    /// File size in bytes
    pub size: u64,
}

/// Build the file name for a backup taken at `now`
pub fn backup_filename(kind: BackupKind, now: DateTime<Utc>) -> String {
    numbered_backup_filename(kind, now, 1)
}

/// File name for the `sequence`-th backup of a kind within the same second
pub(crate) fn numbered_backup_filename(kind: BackupKind, now: DateTime<Utc>, sequence: u32) -> String {
    let base = format!("{}-{}-{}", BACKUP_PREFIX, now.format(BACKUP_DATE_FORMAT), kind.suffix());
    if sequence > 1 {
        format!("{}-{}.zip", base, sequence)
    } else {
        format!("{}.zip", base)
    }
}

/// Parse `hvb-YYYYMMDD-HHMMSS-{auto|manual}[-N].zip`
pub(crate) fn parse_backup_filename(filename: &str, path: &Path) -> Option<BackupInfo> {
    let stem = filename.strip_suffix(".zip")?;
    let parts: Vec<&str> = stem.split('-').collect();

    if !(parts.len() == 4 || parts.len() == 5) || parts[0] != BACKUP_PREFIX {
        return None;
    }

    let sequence = match parts.get(4) {
        None => 1,
        Some(n) if n.bytes().all(|b| b.is_ascii_digit()) => n.parse().ok().filter(|n| *n > 1)?,
        Some(_) => return None,
    };

    let timestamp = get_date_from_parts(parts[1], parts[2])?;

    let kind = match parts[3] {
        BACKUP_AUTO => BackupKind::Auto,
        BACKUP_MANUAL => BackupKind::Manual,
        _ => return None,
    };

    let size = path.metadata().ok()?.len();

    Some(BackupInfo {
        path: path.to_path_buf(),
        timestamp,
        kind,
        sequence,
        size,
    })
}

/// Parse the date from a backup file name or full path
pub fn get_date_from_backup_filename(filename: &str) -> Option<DateTime<Utc>> {
    let name = Path::new(filename).file_name().and_then(|n| n.to_str())?;
    let parts: Vec<&str> = name.split('-').collect();

    if parts.len() < 3 || parts[0] != BACKUP_PREFIX {
        return None;
    }

    get_date_from_parts(parts[1], parts[2])
}

fn get_date_from_parts(date: &str, time: &str) -> Option<DateTime<Utc>> {
    if date.len() != 8 || time.len() != 6 {
        return None;
    }
    let ndt = NaiveDateTime::parse_from_str(&format!("{}-{}", date, time), BACKUP_DATE_FORMAT).ok()?;
    Some(Utc.from_utc_datetime(&ndt))
}
