//! Integration tests for hobbyvault
//!
//! Each test works on a fresh vault in a temporary folder. A cheap Argon2
//! configuration keeps the suite fast.

use std::fs;
use std::path::Path;
use hobbyvault::{
    BackupKind, BackupManager, BackupSchedule, PasswordHashing, Settings, Translations, Vault,
    VaultError,
};
use tempfile::TempDir;

const PASSWORD: &str = "KuiperBelt30au";

fn hasher() -> PasswordHashing {
    PasswordHashing::new(64, 1, 1).unwrap()
}

fn open(folder: &Path) -> Vault {
    Vault::open(folder).expect("Failed to open vault").with_hasher(hasher())
}

/// New vault with one registered user, not logged in
fn setup_vault() -> (Vault, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut vault = Vault::create(temp_dir.path()).unwrap().with_hasher(hasher());
    vault.register("pluto", "pluto@example.com", PASSWORD).unwrap();
    (vault, temp_dir)
}

#[test]
fn test_full_session() {
    let (mut vault, temp_dir) = setup_vault();
    vault.login("pluto", PASSWORD).unwrap();

    vault.add_credential("github.com", "pluto", "pluto@example.com", "gh-pass-1").unwrap();
    vault.add_credential("mail.example.org", "pluto", "", "mail-pass").unwrap();
    vault.save_credential("github.com", "pluto", "pluto@example.com", "gh-pass-2").unwrap();

    assert_eq!(vault.list_websites().unwrap(), vec!["github.com", "mail.example.org"]);
    vault.close().unwrap();

    // Everything is still there after reopening
    let mut vault = open(temp_dir.path());
    vault.login("pluto", PASSWORD).unwrap();
    assert_eq!(vault.get_credential("github.com").unwrap().password, "gh-pass-2");
    assert_eq!(vault.search_credentials("example").unwrap().len(), 2);
}

#[test]
fn test_database_does_not_hold_plaintext() {
    let (mut vault, temp_dir) = setup_vault();
    vault.login("pluto", PASSWORD).unwrap();
    vault.add_credential("example.com", "visible-login", "hidden@example.com", "TopSecretValue").unwrap();
    vault.close().unwrap();

    let bytes = fs::read(temp_dir.path().join(hobbyvault::DATABASE_FILENAME)).unwrap();
    let haystack = String::from_utf8_lossy(&bytes);
    assert!(haystack.contains("example.com"));
    assert!(!haystack.contains("TopSecretValue"));
    assert!(!haystack.contains("visible-login"));
    assert!(!haystack.contains(PASSWORD));
}

#[test]
fn test_wrong_password_gives_no_session() {
    let (mut vault, _temp_dir) = setup_vault();
    assert!(matches!(vault.login("pluto", "Neptune2024"), Err(VaultError::InvalidCredentials)));
    assert!(matches!(vault.list_websites(), Err(VaultError::NotLoggedIn)));
}

#[test]
fn test_backup_on_close_and_restore() {
    let (mut vault, temp_dir) = setup_vault();
    vault.update_settings(Settings {
        backup_schedule: BackupSchedule::OnClose,
        keep_backups: 2,
        ..Settings::default()
    }).unwrap();

    vault.login("pluto", PASSWORD).unwrap();
    vault.add_credential("first.com", "a", "", "p1").unwrap();
    let backup = vault.close().unwrap().expect("on-close backup");

    let manager = BackupManager::new(&temp_dir.path().join(hobbyvault::BACKUP_FOLDER_NAME));
    assert!(manager.verify_backup(&backup).unwrap());
    let latest = manager.latest_backup().unwrap().unwrap();
    assert_eq!(latest.path, backup);
    assert_eq!(latest.kind, BackupKind::Auto);

    // Change the vault, then go back to the backup
    let mut vault = open(temp_dir.path());
    vault.login("pluto", PASSWORD).unwrap();
    vault.add_credential("second.com", "b", "", "p2").unwrap();
    vault.restore_backup(&backup).unwrap();

    vault.login("pluto", PASSWORD).unwrap();
    assert_eq!(vault.list_websites().unwrap(), vec!["first.com"]);
}

#[test]
fn test_manual_backups_survive_cleanup() {
    let (vault, temp_dir) = setup_vault();
    let manual = vault.backup_now().unwrap();

    let manager = vault.backup_manager();
    assert_eq!(manager.cleanup_auto_backups(0).unwrap(), 0);
    assert!(manual.exists());
    assert!(temp_dir.path().join(hobbyvault::BACKUP_FOLDER_NAME).exists());
}

#[test]
fn test_export_import_between_vaults() {
    let (mut source, source_dir) = setup_vault();
    source.login("pluto", PASSWORD).unwrap();
    source.add_credential("a.com", "u", "u@a.com", "pa").unwrap();
    source.add_credential("b.com", "v", "v@b.com", "pb").unwrap();
    let export_path = source_dir.path().join("export.json");
    source.export_to_file(&export_path).unwrap();

    let (mut target, _target_dir) = setup_vault();
    target.login("pluto", PASSWORD).unwrap();
    let summary = target.import_from_file(&export_path, false).unwrap();
    assert_eq!(summary.added, 2);
    assert_eq!(target.get_credential("a.com").unwrap().email, "u@a.com");
}

#[test]
fn test_settings_language_reaches_error_messages() {
    let (mut vault, _temp_dir) = setup_vault();
    vault.update_settings(Settings { language: "de".to_string(), ..Settings::default() }).unwrap();

    let err = vault.login("pluto", "Neptune2024").unwrap_err();
    let tr = Translations::for_language(&vault.settings().language).unwrap();
    let german = tr.error_message(&err);
    let english = Translations::new().unwrap().error_message(&err);
    assert!(!german.is_empty());
    assert_ne!(german, english);
}
