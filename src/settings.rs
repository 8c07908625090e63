//! User settings stored next to the database
//!
//! `settings.json` in the vault folder. Missing keys take their default
//! values, a missing file means all defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backup::BackupSchedule;
use crate::error::{Result, VaultError};
use crate::localization::is_language_supported;
use crate::theme::Theme;
use crate::BACKUP_FOLDER_NAME;

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Language code of the resource file to use
    pub language: String,
    /// Theme name
    pub theme: String,
    /// When automatic backups are taken
    pub backup_schedule: BackupSchedule,
    /// Idle minutes before the session is closed, 0 disables autoclose
    pub autoclose_minutes: u32,
    /// Backup folder, relative paths are resolved against the vault folder
    pub backup_folder: Option<PathBuf>,
    /// Number of automatic backups to keep
    pub keep_backups: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            theme: "light".to_string(),
            backup_schedule: BackupSchedule::Weekly,
            autoclose_minutes: 5,
            backup_folder: None,
            keep_backups: 10,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, defaults when the file is missing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "settings file missing, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

        let settings: Settings = serde_json::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Reject unknown languages, themes and a zero backup count
    pub fn validate(&self) -> Result<()> {
        if !is_language_supported(&self.language) {
            return Err(VaultError::SettingsError(
                format!("Language '{}' is not supported", self.language)
            ));
        }
        if !Theme::is_available(&self.theme) {
            return Err(VaultError::SettingsError(
                format!("Theme '{}' is not available", self.theme)
            ));
        }
        if self.keep_backups == 0 {
            return Err(VaultError::SettingsError(
                "At least one backup must be kept".to_string()
            ));
        }
        Ok(())
    }

    /// Idle timeout, `None` when autoclose is disabled
    pub fn autoclose(&self) -> Option<Duration> {
        match self.autoclose_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(u64::from(minutes) * 60)),
        }
    }

    /// Resolve the backup folder for a vault folder
    pub fn backup_folder_for(&self, vault_folder: &Path) -> PathBuf {
        match &self.backup_folder {
            Some(folder) if folder.is_absolute() => folder.clone(),
            Some(folder) => vault_folder.join(folder),
            None => vault_folder.join(BACKUP_FOLDER_NAME),
        }
    }
}
