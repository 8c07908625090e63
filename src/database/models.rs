//! Data models for HobbyVault database entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Database properties and metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbProperties {
    /// Unique database identifier (32 chars)
    pub database_id: String,
    /// Database schema version
    pub version: String,
    /// Creation timestamp
    pub create_timestamp: Option<DateTime<Utc>>,
    /// Last update timestamp
    pub update_timestamp: Option<DateTime<Utc>>,
}

impl Default for DbProperties {
    fn default() -> Self {
        Self {
            database_id: String::new(),
            version: crate::DB_VERSION.to_string(),
            create_timestamp: None,
            update_timestamp: None,
        }
    }
}

/// Public part of an account, safe to show without the password
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub create_timestamp: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Saved login for one website (decrypted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Website name or URL, unique per user
    pub website: String,
    /// Login name on the website
    pub login: String,
    /// Email registered on the website
    pub email: String,
    /// Website password
    pub password: String,
    pub create_timestamp: Option<DateTime<Utc>>,
    pub change_timestamp: Option<DateTime<Utc>>,
}

impl Credential {
    /// Create a credential without timestamps
    pub fn new(website: &str, login: &str, email: &str, password: &str) -> Self {
        Self {
            website: website.to_string(),
            login: login.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            create_timestamp: None,
            change_timestamp: None,
        }
    }

    /// Case-insensitive substring match on website, login and email
    ///
    /// The password is never searched.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.website.to_lowercase().contains(&query)
            || self.login.to_lowercase().contains(&query)
            || self.email.to_lowercase().contains(&query)
    }
}

/// Exported form of a credential: `{website: {user, email, password}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEntry {
    pub user: String,
    pub email: String,
    pub password: String,
}

impl From<&Credential> for CredentialEntry {
    fn from(c: &Credential) -> Self {
        Self {
            user: c.login.clone(),
            email: c.email.clone(),
            password: c.password.clone(),
        }
    }
}
