//! Error types for HobbyVault

use thiserror::Error;

/// Main error type for vault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Database file not found at the specified path
    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Unknown username or wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Operation requires a logged in user
    #[error("Not logged in")]
    NotLoggedIn,

    /// The session was closed after being idle too long
    #[error("Session expired")]
    SessionExpired,

    /// Username is already taken
    #[error("User already exists: {0}")]
    UserExists(String),

    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Credential not found for a website
    #[error("Credential not found: {0}")]
    CredentialNotFound(String),

    /// Credential already stored for a website
    #[error("Credential already exists: {0}")]
    CredentialExists(String),

    /// User input rejected
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Password hashing or verification failed
    #[error("Hashing error: {0}")]
    HashingError(String),

    /// Encryption failed
    #[error("Encryption error: {0}")]
    EncryptionError(String),

    /// Decryption failed - wrong key, tampered or corrupted data
    #[error("Decryption error: {0}")]
    DecryptionError(String),

    /// Backup operation failed
    #[error("Backup error: {0}")]
    BackupError(String),

    /// Settings could not be read, written or are invalid
    #[error("Settings error: {0}")]
    SettingsError(String),

    /// Localization error
    #[error("Localization error: {0}")]
    LocalizationError(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Input validation failures, shown to the user before an action runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Email address is empty")]
    EmptyEmail,

    #[error("Email address is not valid")]
    InvalidEmail,

    #[error("Username must be at least {min} characters")]
    UsernameTooShort { min: usize },

    #[error("Username must be at most {max} characters")]
    UsernameTooLong { max: usize },

    #[error("Username may only contain letters, digits, '_', '-' and '.'")]
    UsernameInvalidChars,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Password must be at most {max} characters")]
    PasswordTooLong { max: usize },

    #[error("Password may only contain printable characters without spaces")]
    PasswordInvalidChars,

    #[error("Password must contain at least one letter and one digit")]
    PasswordTooWeak,

    #[error("Website is empty")]
    EmptyWebsite,
}

impl From<rusqlite::Error> for VaultError {
    fn from(err: rusqlite::Error) -> Self {
        VaultError::DatabaseError(err.to_string())
    }
}

impl From<zip::result::ZipError> for VaultError {
    fn from(err: zip::result::ZipError) -> Self {
        VaultError::BackupError(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        VaultError::SettingsError(err.to_string())
    }
}

/// Result type alias for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VaultError::DatabaseNotFound("/path/to/db".to_string());
        assert!(err.to_string().contains("/path/to/db"));

        let err = VaultError::InvalidCredentials;
        assert_eq!(err.to_string(), "Invalid username or password");

        let err = VaultError::SessionExpired;
        assert_eq!(err.to_string(), "Session expired");

        let err = VaultError::UserExists("alice".to_string());
        assert!(err.to_string().contains("alice"));

        let err = VaultError::CredentialNotFound("example.com".to_string());
        assert!(err.to_string().contains("example.com"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::UsernameTooShort { min: 3 };
        assert_eq!(err.to_string(), "Username must be at least 3 characters");

        let err: VaultError = ValidationError::InvalidEmail.into();
        assert_eq!(err.to_string(), "Validation error: Email address is not valid");
    }

    #[test]
    fn test_error_from_rusqlite() {
        let sqlite_err = rusqlite::Error::QueryReturnedNoRows;
        let vault_err: VaultError = sqlite_err.into();
        match vault_err {
            VaultError::DatabaseError(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected DatabaseError"),
        }
    }

    #[test]
    fn test_error_from_zip() {
        let zip_err = zip::result::ZipError::FileNotFound;
        let vault_err: VaultError = zip_err.into();
        match vault_err {
            VaultError::BackupError(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected BackupError"),
        }
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let vault_err: VaultError = json_err.into();
        assert!(matches!(vault_err, VaultError::SettingsError(_)));
    }
}
