//! When automatic backups are due

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use crate::error::VaultError;

/// Automatic backup frequency chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupSchedule {
    Daily,
    #[default]
    Weekly,
    Monthly,
    /// Every time the vault is closed
    OnClose,
    Never,
}

impl BackupSchedule {
    pub const ALL: [BackupSchedule; 5] = [
        BackupSchedule::Daily,
        BackupSchedule::Weekly,
        BackupSchedule::Monthly,
        BackupSchedule::OnClose,
        BackupSchedule::Never,
    ];

    /// Minimum time between periodic backups
    pub fn interval(&self) -> Option<Duration> {
        match self {
            BackupSchedule::Daily => Some(Duration::days(1)),
            BackupSchedule::Weekly => Some(Duration::days(7)),
            BackupSchedule::Monthly => Some(Duration::days(30)),
            BackupSchedule::OnClose | BackupSchedule::Never => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackupSchedule::Daily => "daily",
            BackupSchedule::Weekly => "weekly",
            BackupSchedule::Monthly => "monthly",
            BackupSchedule::OnClose => "on_close",
            BackupSchedule::Never => "never",
        }
    }
}

impl fmt::Display for BackupSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackupSchedule {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|schedule| schedule.as_str() == wanted)
            .ok_or_else(|| VaultError::SettingsError(format!("Unknown backup schedule '{}'", s)))
    }
}

/// Decide whether an automatic backup should be taken now
///
/// `last_backup` is the time of the newest backup of any kind; `closing`
/// is true while the vault is being closed.
pub fn is_backup_due(
    schedule: BackupSchedule,
    last_backup: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    closing: bool,
) -> bool {
    match schedule {
        BackupSchedule::Never => false,
        BackupSchedule::OnClose => closing,
        periodic => match (periodic.interval(), last_backup) {
            (Some(interval), Some(last)) => now - last >= interval,
            _ => true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_daily() {
        let last = Some(at(1, 12));
        assert!(!is_backup_due(BackupSchedule::Daily, last, at(2, 11), false));
        assert!(is_backup_due(BackupSchedule::Daily, last, at(2, 12), false));
    }

    #[test]
    fn test_weekly_and_monthly() {
        let last = Some(at(1, 0));
        assert!(!is_backup_due(BackupSchedule::Weekly, last, at(7, 23), true));
        assert!(is_backup_due(BackupSchedule::Weekly, last, at(8, 0), false));
        assert!(!is_backup_due(BackupSchedule::Monthly, last, at(30, 0), false));
        assert!(is_backup_due(BackupSchedule::Monthly, last, at(31, 0), false));
    }

    #[test]
    fn test_first_backup_is_due() {
        for schedule in [BackupSchedule::Daily, BackupSchedule::Weekly, BackupSchedule::Monthly] {
            assert!(is_backup_due(schedule, None, at(1, 0), false));
        }
    }

    #[test]
    fn test_on_close_and_never() {
        assert!(is_backup_due(BackupSchedule::OnClose, Some(at(1, 0)), at(1, 0), true));
        assert!(!is_backup_due(BackupSchedule::OnClose, None, at(1, 0), false));
        assert!(!is_backup_due(BackupSchedule::Never, None, at(1, 0), true));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("daily".parse::<BackupSchedule>().unwrap(), BackupSchedule::Daily);
        assert_eq!("On-Close".parse::<BackupSchedule>().unwrap(), BackupSchedule::OnClose);
        assert!("hourly".parse::<BackupSchedule>().is_err());
        for schedule in BackupSchedule::ALL {
            assert_eq!(schedule.to_string().parse::<BackupSchedule>().unwrap(), schedule);
        }
        assert_eq!(BackupSchedule::default(), BackupSchedule::Weekly);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&BackupSchedule::OnClose).unwrap();
        assert_eq!(json, "\"on_close\"");
        let parsed: BackupSchedule = serde_json::from_str("\"monthly\"").unwrap();
        assert_eq!(parsed, BackupSchedule::Monthly);
    }
}
