//! # HobbyVault
//!
//! A small multi-user password manager core with a utility toolbox.
//!
//! ## Features
//!
//! - Argon2id password hashing with transparent rehash on login
//! - Per-user secret keys and authenticated encryption of stored credentials
//!   (AES-128-CBC + HMAC-SHA256 tokens)
//! - SQLite storage, one row per user, one row per saved website
//! - Scheduled ZIP backups (daily, weekly, monthly or on close)
//! - Idle autoclose of the logged in session
//! - Embedded language and theme resources
//! - Toolbox: Caesar cipher, color conversion, quiz, flash cards,
//!   Pomodoro schedule and a Snakes & Ladders board
//!
//! ## Example
//!
//! ```no_run
//! use hobbyvault::Vault;
//! use std::path::Path;
//!
//! let mut vault = Vault::open(Path::new("/path/to/vault")).unwrap();
//! vault.login("alice", "Secret123").unwrap();
//!
//! vault.add_credential("example.com", "alice", "alice@example.com", "hunter22").unwrap();
//! for website in vault.list_websites().unwrap() {
//!     println!("{}", website);
//! }
//! ```

pub mod crypto;
pub mod database;
pub mod business;
pub mod backup;
pub mod localization;
pub mod settings;
pub mod theme;
pub mod toolbox;
pub mod utils;
pub mod validation;
pub mod error;

// Re-export main types
pub use error::{VaultError, ValidationError, Result};
pub use database::models::{Credential, UserProfile, DbProperties};
pub use business::{Vault, AutoClose};
pub use backup::{BackupManager, BackupKind, BackupSchedule};
pub use localization::Translations;
pub use settings::Settings;
pub use theme::Theme;
pub use crypto::{generate_password, generate_clever_password, PasswordOptions, PasswordHashing, SecretKey};

/// Database version constant
pub const DB_VERSION: &str = "2";

/// Database filename
pub const DATABASE_FILENAME: &str = "hobbyvault.db";

/// Settings filename
pub const SETTINGS_FILENAME: &str = "settings.json";

/// Default backup sub-folder name
pub const BACKUP_FOLDER_NAME: &str = "backups";

/// Minimum username length
pub const USERNAME_MIN_LENGTH: usize = 3;

/// Maximum username length
pub const USERNAME_MAX_LENGTH: usize = 20;

/// Minimum password length
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Maximum password length
pub const PASSWORD_MAX_LENGTH: usize = 64;
