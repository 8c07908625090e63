//! Credential operations
//!
//! Login, email and password of each saved website are encrypted with the
//! owner's secret key; the website name stays in clear text so it can be
//! listed and used as the key.

use tracing::debug;
use crate::crypto::{self, SecretKey};
use crate::database::queries::{self, parse_timestamp, RawCredential};
use crate::database::Credential;
use crate::error::{Result, VaultError};
use crate::validation::validate_website;
use super::vault::Vault;

/// Encrypted login, email and password
pub(crate) struct SealedFields {
    pub login: String,
    pub email: String,
    pub password: String,
}

pub(crate) fn seal(key: &SecretKey, login: &str, email: &str, password: &str) -> Result<SealedFields> {
    Ok(SealedFields {
        login: crypto::encrypt(key, login)?,
        email: crypto::encrypt(key, email)?,
        password: crypto::encrypt(key, password)?,
    })
}

fn open(key: &SecretKey, raw: RawCredential) -> Result<Credential> {
    Ok(Credential {
        login: crypto::decrypt(key, &raw.login_encrypted)?,
        email: crypto::decrypt(key, &raw.email_encrypted)?,
        password: crypto::decrypt(key, &raw.password_encrypted)?,
        create_timestamp: raw.create_timestamp.as_deref().and_then(parse_timestamp),
        change_timestamp: raw.change_timestamp.as_deref().and_then(parse_timestamp),
        website: raw.website,
    })
}

/// Trimmed website key
///
/// The case is kept as typed; lookups ignore ASCII case.
pub(crate) fn website_key(website: &str) -> Result<String> {
    let website = website.trim();
    validate_website(website)?;
    Ok(website.to_string())
}

impl Vault {
    /// Save a credential for a website that has none yet
    pub fn add_credential(&mut self, website: &str, login: &str, email: &str, password: &str) -> Result<()> {
        let (username, key) = self.session_context()?;
        let website = website_key(website)?;

        let conn = self.conn()?;
        if queries::credential_exists(conn, &username, &website)? {
            return Err(VaultError::CredentialExists(website));
        }

        let sealed = seal(&key, login, email, password)?;
        queries::create_credential(conn, &username, &website, &sealed.login, &sealed.email, &sealed.password)?;

        debug!(user = %username, website = %website, "credential added");
        Ok(())
    }

    /// Replace the credential of a website
    pub fn update_credential(&mut self, website: &str, login: &str, email: &str, password: &str) -> Result<()> {
        let (username, key) = self.session_context()?;
        let website = website_key(website)?;

        let sealed = seal(&key, login, email, password)?;
        let updated = queries::update_credential(
            self.conn()?, &username, &website, &sealed.login, &sealed.email, &sealed.password,
        )?;

        if !updated {
            return Err(VaultError::CredentialNotFound(website));
        }
        debug!(user = %username, website = %website, "credential updated");
        Ok(())
    }

    /// Add or replace a credential, returns true when it was new
    pub fn save_credential(&mut self, website: &str, login: &str, email: &str, password: &str) -> Result<bool> {
        let (username, key) = self.session_context()?;
        let website = website_key(website)?;
        let sealed = seal(&key, login, email, password)?;

        let conn = self.conn()?;
        if queries::update_credential(conn, &username, &website, &sealed.login, &sealed.email, &sealed.password)? {
            return Ok(false);
        }
        queries::create_credential(conn, &username, &website, &sealed.login, &sealed.email, &sealed.password)?;
        Ok(true)
    }

    /// Get the decrypted credential of a website
    pub fn get_credential(&mut self, website: &str) -> Result<Credential> {
        let (username, key) = self.session_context()?;
        let website = website.trim().to_string();

        let raw = queries::get_credential_raw(self.conn()?, &username, &website)?
            .ok_or(VaultError::CredentialNotFound(website))?;
        open(&key, raw)
    }

    pub fn delete_credential(&mut self, website: &str) -> Result<()> {
        let (username, _) = self.session_context()?;
        let website = website.trim().to_string();

        if !queries::delete_credential(self.conn()?, &username, &website)? {
            return Err(VaultError::CredentialNotFound(website));
        }
        debug!(user = %username, website = %website, "credential deleted");
        Ok(())
    }

    /// Websites with a saved credential, sorted
    pub fn list_websites(&mut self) -> Result<Vec<String>> {
        let (username, _) = self.session_context()?;
        queries::list_websites(self.conn()?, &username)
    }

    /// All credentials of the logged in user, decrypted, sorted by website
    pub fn get_credentials(&mut self) -> Result<Vec<Credential>> {
        let (username, key) = self.session_context()?;
        queries::get_credentials_raw(self.conn()?, &username)?
            .into_iter()
            .map(|raw| open(&key, raw))
            .collect()
    }

    /// Case-insensitive substring search on website, login and email
    ///
    /// An empty query matches every credential.
    pub fn search_credentials(&mut self, query: &str) -> Result<Vec<Credential>> {
        Ok(self.get_credentials()?
            .into_iter()
            .filter(|c| c.matches(query))
            .collect())
    }

    pub fn count_credentials(&mut self) -> Result<usize> {
        let (username, _) = self.session_context()?;
        queries::count_credentials(self.conn()?, &username)
    }
}
