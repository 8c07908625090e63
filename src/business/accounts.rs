//! Account operations
//!
//! Every user has one row holding an Argon2id password hash and a random
//! secret key. The key never changes, so a password change does not touch
//! the stored credentials.

use tracing::{info, warn};
use crate::crypto::SecretKey;
use crate::database::queries::{self, parse_timestamp};
use crate::database::UserProfile;
use crate::error::{Result, VaultError};
use crate::validation::{validate_email, validate_password, validate_username};
use super::session::Session;
use super::vault::Vault;

impl Vault {
    /// Register a new user
    pub fn register(&mut self, username: &str, email: &str, password: &str) -> Result<()> {
        let username = username.trim();
        let email = email.trim();
        validate_username(username)?;
        validate_email(email)?;
        validate_password(password)?;

        let conn = self.conn()?;
        if queries::user_exists(conn, username)? {
            return Err(VaultError::UserExists(username.to_string()));
        }

        let hash = self.hasher.hash(password)?;
        let key = SecretKey::generate();
        queries::create_user(conn, username, email, &hash, &key.to_base64())?;

        info!(user = %username, "user registered");
        Ok(())
    }

    /// Log in and start a session
    ///
    /// A hash made with outdated parameters is replaced on success.
    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let username = username.trim();
        let conn = self.conn()?;

        let Some(user) = queries::get_user(conn, username)? else {
            warn!(user = %username, "login failed: unknown user");
            return Err(VaultError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            warn!(user = %username, "login failed: wrong password");
            return Err(VaultError::InvalidCredentials);
        }

        if self.hasher.needs_rehash(&user.password_hash)? {
            let hash = self.hasher.hash(password)?;
            queries::update_password_hash(conn, username, &hash)?;
            info!(user = %username, "password hash upgraded");
        }

        queries::update_last_login(conn, username)?;
        let key = SecretKey::from_base64(&user.secret_key)?;

        self.session = Some(Session::new(username, key, self.settings.autoclose()));
        info!(user = %username, "logged in");
        Ok(())
    }

    /// End the session, if any
    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!(user = %session.username, "logged out");
        }
    }

    /// Name of the logged in user
    ///
    /// Does not count as activity and does not check the idle timeout.
    pub fn current_user(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.username.as_str())
    }

    /// Profile of the logged in user
    pub fn profile(&mut self) -> Result<UserProfile> {
        let (username, _) = self.session_context()?;
        let user = queries::get_user(self.conn()?, &username)?
            .ok_or_else(|| VaultError::UserNotFound(username.clone()))?;

        Ok(UserProfile {
            username: user.username,
            email: user.email,
            create_timestamp: user.create_timestamp.as_deref().and_then(parse_timestamp),
            last_login: user.last_login.as_deref().and_then(parse_timestamp),
        })
    }

    /// Change the logged in user's password
    pub fn change_password(&mut self, old_password: &str, new_password: &str) -> Result<()> {
        let username = self.verify_current_password(old_password)?;
        validate_password(new_password)?;

        let hash = self.hasher.hash(new_password)?;
        queries::update_password_hash(self.conn()?, &username, &hash)?;

        info!(user = %username, "password changed");
        Ok(())
    }

    /// Change the logged in user's email
    pub fn change_email(&mut self, new_email: &str) -> Result<()> {
        let (username, _) = self.session_context()?;
        let new_email = new_email.trim();
        validate_email(new_email)?;

        queries::update_email(self.conn()?, &username, new_email)?;
        Ok(())
    }

    /// Delete the logged in user and all their credentials
    pub fn delete_account(&mut self, password: &str) -> Result<()> {
        let username = self.verify_current_password(password)?;

        let deleted = self.database_mut()?.in_transaction(|conn| {
            let deleted = queries::delete_credentials_for_user(conn, &username)?;
            queries::delete_user(conn, &username)?;
            Ok(deleted)
        })?;

        self.session = None;
        info!(user = %username, credentials = deleted, "account deleted");
        Ok(())
    }

    pub fn user_exists(&self, username: &str) -> Result<bool> {
        queries::user_exists(self.conn()?, username.trim())
    }

    /// All registered usernames, sorted case-insensitively
    pub fn list_usernames(&self) -> Result<Vec<String>> {
        queries::list_usernames(self.conn()?)
    }

    fn verify_current_password(&mut self, password: &str) -> Result<String> {
        let (username, _) = self.session_context()?;
        let user = queries::get_user(self.conn()?, &username)?
            .ok_or_else(|| VaultError::UserNotFound(username.clone()))?;

        if !self.hasher.verify(password, &user.password_hash)? {
            return Err(VaultError::InvalidCredentials);
        }
        Ok(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::vault::tests::{cheap_hasher, create_test_vault, logged_in_vault};
    use crate::crypto::PasswordHashing;
    use crate::error::ValidationError;

    #[test]
    fn test_register_and_login() {
        let (mut vault, _temp) = create_test_vault();
        vault.register("bob", "bob@example.com", "Passw0rdX").unwrap();
        assert!(vault.user_exists("bob").unwrap());
        assert!(vault.current_user().is_none());

        vault.login("bob", "Passw0rdX").unwrap();
        assert_eq!(vault.current_user(), Some("bob"));

        let profile = vault.profile().unwrap();
        assert_eq!(profile.email, "bob@example.com");
        assert!(profile.last_login.is_some());

        vault.logout();
        assert!(vault.current_user().is_none());
        assert!(matches!(vault.profile(), Err(VaultError::NotLoggedIn)));
    }

    #[test]
    fn test_register_validation() {
        let (mut vault, _temp) = create_test_vault();

        let err = vault.register("ab", "ab@example.com", "Secret123").unwrap_err();
        assert!(matches!(err, VaultError::Validation(ValidationError::UsernameTooShort { .. })));

        let err = vault.register("carol", "not-an-email", "Secret123").unwrap_err();
        assert!(matches!(err, VaultError::Validation(ValidationError::InvalidEmail)));

        let err = vault.register("carol", "carol@example.com", "short1").unwrap_err();
        assert!(matches!(err, VaultError::Validation(ValidationError::PasswordTooShort { .. })));

        assert!(vault.list_usernames().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_username() {
        let (mut vault, _temp) = create_test_vault();
        vault.register("dave", "dave@example.com", "Secret123").unwrap();
        let err = vault.register("dave", "other@example.com", "Secret456").unwrap_err();
        assert!(matches!(err, VaultError::UserExists(_)));
    }

    #[test]
    fn test_wrong_password_and_unknown_user() {
        let (mut vault, _temp) = create_test_vault();
        vault.register("erin", "erin@example.com", "Secret123").unwrap();

        assert!(matches!(vault.login("erin", "Secret124"), Err(VaultError::InvalidCredentials)));
        assert!(matches!(vault.login("nobody", "Secret123"), Err(VaultError::InvalidCredentials)));
        assert!(vault.current_user().is_none());
    }

    #[test]
    fn test_login_upgrades_hash() {
        let (mut vault, _temp) = create_test_vault();
        vault.register("frank", "frank@example.com", "Secret123").unwrap();
        let old_hash = queries::get_user(vault.conn().unwrap(), "frank").unwrap().unwrap().password_hash;

        let stronger = PasswordHashing::new(128, 2, 1).unwrap();
        assert!(stronger.needs_rehash(&old_hash).unwrap());

        let mut vault = vault.with_hasher(stronger.clone());
        vault.login("frank", "Secret123").unwrap();

        let new_hash = queries::get_user(vault.conn().unwrap(), "frank").unwrap().unwrap().password_hash;
        assert_ne!(old_hash, new_hash);
        assert!(!stronger.needs_rehash(&new_hash).unwrap());

        // The upgraded hash still verifies with the old hasher
        let mut vault = vault.with_hasher(cheap_hasher());
        vault.logout();
        vault.login("frank", "Secret123").unwrap();
    }

    #[test]
    fn test_change_password_keeps_credentials() {
        let (mut vault, _temp) = logged_in_vault();
        vault.add_credential("example.com", "alice", "alice@example.com", "hunter22").unwrap();

        assert!(matches!(
            vault.change_password("Wrong1234", "NewSecret9"),
            Err(VaultError::InvalidCredentials)
        ));
        assert!(vault.change_password("Secret123", "weak").is_err());
        vault.change_password("Secret123", "NewSecret9").unwrap();

        vault.logout();
        assert!(vault.login("alice", "Secret123").is_err());
        vault.login("alice", "NewSecret9").unwrap();
        assert_eq!(vault.get_credential("example.com").unwrap().password, "hunter22");
    }

    #[test]
    fn test_change_email() {
        let (mut vault, _temp) = logged_in_vault();
        assert!(vault.change_email("broken").is_err());
        vault.change_email(" new@example.com ").unwrap();
        assert_eq!(vault.profile().unwrap().email, "new@example.com");
    }

    #[test]
    fn test_delete_account() {
        let (mut vault, _temp) = logged_in_vault();
        vault.add_credential("example.com", "alice", "alice@example.com", "hunter22").unwrap();

        assert!(matches!(vault.delete_account("nope12345"), Err(VaultError::InvalidCredentials)));
        vault.delete_account("Secret123").unwrap();

        assert!(vault.current_user().is_none());
        assert!(!vault.user_exists("alice").unwrap());
        assert_eq!(queries::count_credentials(vault.conn().unwrap(), "alice").unwrap(), 0);
    }

    #[test]
    fn test_users_are_isolated() {
        let (mut vault, _temp) = logged_in_vault();
        vault.add_credential("example.com", "alice", "alice@example.com", "hunter22").unwrap();
        vault.logout();

        vault.register("grace", "grace@example.com", "Secret123").unwrap();
        vault.login("grace", "Secret123").unwrap();
        assert!(vault.list_websites().unwrap().is_empty());
        assert!(matches!(vault.get_credential("example.com"), Err(VaultError::CredentialNotFound(_))));

        assert_eq!(vault.list_usernames().unwrap(), vec!["alice", "grace"]);
    }
}
