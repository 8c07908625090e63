//! Localization and translation support
//!
//! Language resource files are embedded at compile time. Lookups fall back
//! to English, then to the key itself.

use std::collections::HashMap;
use crate::error::{Result, VaultError, ValidationError};

/// Supported languages as (code, local name, English name)
pub const SUPPORTED_LANGUAGES: &[(&str, &str, &str)] = &[
    ("en", "English", "English"),
    ("de", "Deutsch", "German"),
    ("es", "Español", "Spanish"),
];

const LANG_EN: &str = include_str!("languages/en.json");
const LANG_DE: &str = include_str!("languages/de.json");
const LANG_ES: &str = include_str!("languages/es.json");

/// Get the embedded JSON for a language code
fn get_language_json(lang: &str) -> Option<&'static str> {
    match lang {
        "en" => Some(LANG_EN),
        "de" => Some(LANG_DE),
        "es" => Some(LANG_ES),
        _ => None,
    }
}

/// Check if a language code is supported
pub fn is_language_supported(lang: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|(code, _, _)| *code == lang)
}

/// Resource key of the message shown for a validation failure
pub fn validation_message_key(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::EmptyEmail => "err_email_empty",
        ValidationError::InvalidEmail => "err_email_invalid",
        ValidationError::UsernameTooShort { .. } => "err_username_short",
        ValidationError::UsernameTooLong { .. } => "err_username_long",
        ValidationError::UsernameInvalidChars => "err_username_chars",
        ValidationError::PasswordTooShort { .. } => "err_password_short",
        ValidationError::PasswordTooLong { .. } => "err_password_long",
        ValidationError::PasswordInvalidChars => "err_password_chars",
        ValidationError::PasswordTooWeak => "err_password_weak",
        ValidationError::EmptyWebsite => "err_website_empty",
    }
}

/// Translation manager
pub struct Translations {
    /// Current language code
    current_lang: String,
    /// Current language strings
    strings: HashMap<String, String>,
    /// English strings (fallback)
    english: HashMap<String, String>,
}

impl Translations {
    /// Create a new translations instance with English as default
    pub fn new() -> Result<Self> {
        let english = Self::load_language("en")?;
        Ok(Self {
            current_lang: "en".to_string(),
            strings: english.clone(),
            english,
        })
    }

    /// Create a translations instance for a language
    pub fn for_language(lang: &str) -> Result<Self> {
        let mut tr = Self::new()?;
        tr.set_language(lang)?;
        Ok(tr)
    }

    /// Load a language from embedded JSON
    fn load_language(lang: &str) -> Result<HashMap<String, String>> {
        let json = get_language_json(lang)
            .ok_or_else(|| VaultError::LocalizationError(
                format!("Language '{}' not found", lang)
            ))?;

        let json = json.strip_prefix('\u{feff}').unwrap_or(json);

        serde_json::from_str(json)
            .map_err(|e| VaultError::LocalizationError(
                format!("Failed to parse language '{}': {}", lang, e)
            ))
    }

    /// Set the current language
    pub fn set_language(&mut self, lang: &str) -> Result<()> {
        if !is_language_supported(lang) {
            return Err(VaultError::LocalizationError(
                format!("Language '{}' is not supported", lang)
            ));
        }

        self.strings = Self::load_language(lang)?;
        self.current_lang = lang.to_string();
        Ok(())
    }

    /// Get a translated string by key
    /// Returns the key itself if not found
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.get_opt(key).unwrap_or(key)
    }

    /// Get a translated string, returning None if not found
    pub fn get_opt(&self, key: &str) -> Option<&str> {
        self.strings.get(key)
            .or_else(|| self.english.get(key))
            .map(|s| s.as_str())
    }

    /// Translated message for an error shown in a dialog
    pub fn error_message(&self, err: &VaultError) -> String {
        let key = match err {
            VaultError::Validation(v) => validation_message_key(v),
            VaultError::InvalidCredentials => "err_login_failed",
            VaultError::UserExists(_) => "err_username_taken",
            VaultError::CredentialExists(_) => "err_website_exists",
            VaultError::CredentialNotFound(_) => "err_website_missing",
            VaultError::SessionExpired => "msg_session_closed",
            other => return other.to_string(),
        };
        self.get(key).to_string()
    }

    /// Get the current language code
    pub fn get_language(&self) -> &str {
        &self.current_lang
    }

    /// Get the current language name (in its own language)
    pub fn get_language_name(&self) -> &str {
        SUPPORTED_LANGUAGES.iter()
            .find(|(code, _, _)| *code == self.current_lang)
            .map(|(_, local, _)| *local)
            .unwrap_or("Unknown")
    }

    /// Get available languages as (code, local_name, english_name) tuples
    pub fn available_languages() -> &'static [(&'static str, &'static str, &'static str)] {
        SUPPORTED_LANGUAGES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_english() {
        let tr = Translations::new().unwrap();
        assert_eq!(tr.get_language(), "en");
        assert_eq!(tr.get("app_name"), "HobbyVault");
        assert_eq!(tr.get("cancel"), "Cancel");
    }

    #[test]
    fn test_unknown_key_returns_key() {
        let tr = Translations::new().unwrap();
        assert_eq!(tr.get("unknown_key_xyz"), "unknown_key_xyz");
        assert!(tr.get_opt("unknown_key_xyz").is_none());
    }

    #[test]
    fn test_set_language() {
        let mut tr = Translations::new().unwrap();
        tr.set_language("de").unwrap();
        assert_eq!(tr.get_language(), "de");
        assert_eq!(tr.get_language_name(), "Deutsch");
        assert_eq!(tr.get("cancel"), "Abbrechen");
    }

    #[test]
    fn test_english_fallback() {
        let tr = Translations::for_language("es").unwrap();
        // Not translated in the Spanish file
        assert_eq!(tr.get("msg_confirm_save"), "Save these details?");
    }

    #[test]
    fn test_unsupported_language() {
        let mut tr = Translations::new().unwrap();
        assert!(tr.set_language("xx").is_err());
        assert_eq!(tr.get_language(), "en");
    }

    #[test]
    fn test_all_languages_parse() {
        for (code, _, _) in Translations::available_languages() {
            let tr = Translations::for_language(code).unwrap();
            assert!(tr.get_opt("login").is_some(), "missing 'login' in {}", code);
        }
    }

    #[test]
    fn test_every_validation_message_exists() {
        let tr = Translations::new().unwrap();
        let errors = [
            ValidationError::EmptyEmail,
            ValidationError::InvalidEmail,
            ValidationError::UsernameTooShort { min: 3 },
            ValidationError::UsernameTooLong { max: 20 },
            ValidationError::UsernameInvalidChars,
            ValidationError::PasswordTooShort { min: 8 },
            ValidationError::PasswordTooLong { max: 64 },
            ValidationError::PasswordInvalidChars,
            ValidationError::PasswordTooWeak,
            ValidationError::EmptyWebsite,
        ];
        for err in &errors {
            assert!(tr.get_opt(validation_message_key(err)).is_some(), "{:?}", err);
        }
    }

    #[test]
    fn test_error_message() {
        let tr = Translations::for_language("de").unwrap();
        let msg = tr.error_message(&VaultError::InvalidCredentials);
        assert_eq!(msg, "Falscher Benutzername oder falsches Passwort.");

        let msg = tr.error_message(&VaultError::NotLoggedIn);
        assert_eq!(msg, "Not logged in");
    }
}
