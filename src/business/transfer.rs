//! Plain-text JSON export and import
//!
//! Format: `{"example.com": {"user": "...", "email": "...", "password": "..."}}`.
//! The export is decrypted; it is meant for the user to keep or move to
//! another vault.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;
use crate::database::{queries, CredentialEntry};
use crate::error::{Result, VaultError};
use super::credentials::{seal, website_key};
use super::vault::Vault;

/// Counts from an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub updated: usize,
    /// Existing websites left alone because `overwrite` was off
    pub skipped: usize,
}

impl Vault {
    /// Export the logged in user's credentials as pretty JSON
    pub fn export_json(&mut self) -> Result<String> {
        let entries: BTreeMap<String, CredentialEntry> = self.get_credentials()?
            .iter()
            .map(|c| (c.website.clone(), CredentialEntry::from(c)))
            .collect();

        serde_json::to_string_pretty(&entries)
            .map_err(|e| VaultError::InvalidOperation(format!("Export failed: {}", e)))
    }

    /// Write the export to a file
    pub fn export_to_file(&mut self, path: &Path) -> Result<usize> {
        let json = self.export_json()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        let count = self.count_credentials()?;
        info!(path = %path.display(), count, "credentials exported");
        Ok(count)
    }

    /// Import credentials from export JSON
    ///
    /// Existing websites are replaced only when `overwrite` is set. The
    /// import is all or nothing.
    pub fn import_json(&mut self, json: &str, overwrite: bool) -> Result<ImportSummary> {
        let (username, key) = self.session_context()?;

        let entries: BTreeMap<String, CredentialEntry> = serde_json::from_str(json.trim_start_matches('\u{feff}'))
            .map_err(|e| VaultError::InvalidOperation(format!("Invalid import data: {}", e)))?;

        // Validate every key before touching the database
        let entries = entries
            .into_iter()
            .map(|(website, entry)| Ok((website_key(&website)?, entry)))
            .collect::<Result<Vec<_>>>()?;

        let summary = self.database_mut()?.in_transaction(|conn| {
            let mut summary = ImportSummary::default();

            for (website, entry) in &entries {
                let exists = queries::credential_exists(conn, &username, website)?;
                if exists && !overwrite {
                    summary.skipped += 1;
                    continue;
                }

                let sealed = seal(&key, &entry.user, &entry.email, &entry.password)?;
                if exists {
                    queries::update_credential(conn, &username, website, &sealed.login, &sealed.email, &sealed.password)?;
                    summary.updated += 1;
                } else {
                    queries::create_credential(conn, &username, website, &sealed.login, &sealed.email, &sealed.password)?;
                    summary.added += 1;
                }
            }

            Ok(summary)
        })?;

        info!(
            user = %username,
            added = summary.added,
            updated = summary.updated,
            skipped = summary.skipped,
            "credentials imported"
        );
        Ok(summary)
    }

    /// Import from a file written by `export_to_file`
    pub fn import_from_file(&mut self, path: &Path, overwrite: bool) -> Result<ImportSummary> {
        let json = fs::read_to_string(path)?;
        self.import_json(&json, overwrite)
    }
}
