//! SQL query operations for database access
//!
//! This module provides low-level query functions for database operations.
//! Values here are stored as-is: hashing and encryption happen in the
//! business layer. For account-level operations, use the Vault API.

use rusqlite::{Connection, OptionalExtension, params};
use rusqlite::types::{Type, ValueRef};
use chrono::{DateTime, Utc};
use crate::error::Result;

/// Timestamp format used in database
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a DateTime for database storage
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp from database
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    chrono::NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .ok()
        .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc))
}

/// Get current timestamp formatted for database
pub fn now_timestamp() -> String {
    format_timestamp(&Utc::now())
}

// ============================================================================
// Properties queries
// ============================================================================

/// Raw properties row
#[derive(Debug, Clone)]
pub struct RawProperties {
    pub database_id: String,
    pub version: Option<String>,
    pub create_timestamp: Option<String>,
    pub update_timestamp: Option<String>,
}

/// Get the properties row
pub fn get_properties(conn: &Connection) -> Result<Option<RawProperties>> {
    let props = conn.query_row(
        "SELECT database_id, version, create_timestamp, update_timestamp
         FROM hv_properties LIMIT 1",
        [],
        |row| {
            Ok(RawProperties {
                database_id: row.get(0)?,
                version: row.get(1)?,
                create_timestamp: row.get(2)?,
                update_timestamp: row.get(3)?,
            })
        },
    ).optional()?;
    Ok(props)
}

/// Set properties (insert new row)
pub fn set_properties(conn: &Connection, database_id: &str, version: &str) -> Result<()> {
    let now = now_timestamp();
    conn.execute(
        "INSERT INTO hv_properties (database_id, version, create_timestamp, update_timestamp)
         VALUES (?, ?, ?, ?)",
        params![database_id, version, now, now],
    )?;
    Ok(())
}

/// Update database version
pub fn set_db_version(conn: &Connection, version: &str) -> Result<()> {
    conn.execute(
        "UPDATE hv_properties SET version = ?, update_timestamp = ?",
        params![version, now_timestamp()],
    )?;
    Ok(())
}

// ============================================================================
// User queries
// ============================================================================

/// Raw user row
#[derive(Debug, Clone)]
pub struct RawUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub secret_key: String,
    pub create_timestamp: Option<String>,
    pub update_timestamp: Option<String>,
    pub last_login: Option<String>,
}

/// Insert a new user row
pub fn create_user(
    conn: &Connection,
    username: &str,
    email: &str,
    password_hash: &str,
    secret_key: &str,
) -> Result<()> {
    let now = now_timestamp();
    conn.execute(
        "INSERT INTO hv_users (username, email, password_hash, secret_key, create_timestamp, update_timestamp)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![username, email, password_hash, secret_key, now, now],
    )?;
    Ok(())
}

/// Get a user row by name
pub fn get_user(conn: &Connection, username: &str) -> Result<Option<RawUser>> {
    let user = conn.query_row(
        "SELECT username, email, password_hash, secret_key, create_timestamp, update_timestamp, last_login
         FROM hv_users WHERE username = ?",
        [username],
        |row| {
            Ok(RawUser {
                username: row.get(0)?,
                email: row.get(1)?,
                password_hash: row.get(2)?,
                secret_key: row.get(3)?,
                create_timestamp: row.get(4)?,
                update_timestamp: row.get(5)?,
                last_login: row.get(6)?,
            })
        },
    ).optional()?;
    Ok(user)
}

/// Check if a username is taken
pub fn user_exists(conn: &Connection, username: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM hv_users WHERE username = ?",
        [username],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// List all usernames, sorted
pub fn list_usernames(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT username FROM hv_users ORDER BY username COLLATE NOCASE")?;
    let names = stmt.query_map([], |row| row.get(0))?;
    names.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
}

/// Replace a user's password hash
pub fn update_password_hash(conn: &Connection, username: &str, password_hash: &str) -> Result<()> {
    conn.execute(
        "UPDATE hv_users SET password_hash = ?, update_timestamp = ? WHERE username = ?",
        params![password_hash, now_timestamp(), username],
    )?;
    Ok(())
}

/// Replace a user's email
pub fn update_email(conn: &Connection, username: &str, email: &str) -> Result<()> {
    conn.execute(
        "UPDATE hv_users SET email = ?, update_timestamp = ? WHERE username = ?",
        params![email, now_timestamp(), username],
    )?;
    Ok(())
}

/// Record a successful login
pub fn update_last_login(conn: &Connection, username: &str) -> Result<()> {
    conn.execute(
        "UPDATE hv_users SET last_login = ? WHERE username = ?",
        params![now_timestamp(), username],
    )?;
    Ok(())
}

/// Delete a user row
pub fn delete_user(conn: &Connection, username: &str) -> Result<()> {
    conn.execute("DELETE FROM hv_users WHERE username = ?", [username])?;
    Ok(())
}

// ============================================================================
// Credential queries
// ============================================================================

/// Raw credential row (login, email and password still encrypted)
#[derive(Debug, Clone)]
pub struct RawCredential {
    pub website: String,
    pub login_encrypted: String,
    pub email_encrypted: String,
    pub password_encrypted: String,
    pub create_timestamp: Option<String>,
    pub change_timestamp: Option<String>,
}

/// Read a token column; tokens are stored as BLOBs of their ASCII form
fn get_token(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<String> {
    match row.get_ref(idx)? {
        ValueRef::Blob(bytes) | ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec())
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Blob, Box::new(e))),
        ValueRef::Null => Ok(String::new()),
        other => Err(rusqlite::Error::InvalidColumnType(idx, "token".to_string(), other.data_type())),
    }
}

fn map_credential(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCredential> {
    Ok(RawCredential {
        website: row.get(0)?,
        login_encrypted: get_token(row, 1)?,
        email_encrypted: get_token(row, 2)?,
        password_encrypted: get_token(row, 3)?,
        create_timestamp: row.get(4)?,
        change_timestamp: row.get(5)?,
    })
}

/// Get all credentials of a user (encrypted), sorted by website
pub fn get_credentials_raw(conn: &Connection, username: &str) -> Result<Vec<RawCredential>> {
    let mut stmt = conn.prepare(
        "SELECT website, login, email, password, create_timestamp, change_timestamp
         FROM hv_credentials WHERE username = ? ORDER BY website COLLATE NOCASE"
    )?;

    let credentials = stmt.query_map([username], map_credential)?;
    credentials.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
}

/// Get a single credential (encrypted)
pub fn get_credential_raw(conn: &Connection, username: &str, website: &str) -> Result<Option<RawCredential>> {
    let credential = conn.query_row(
        "SELECT website, login, email, password, create_timestamp, change_timestamp
         FROM hv_credentials WHERE username = ? AND website = ? COLLATE NOCASE",
        [username, website],
        map_credential,
    ).optional()?;
    Ok(credential)
}

/// Check if a user has a credential for a website
pub fn credential_exists(conn: &Connection, username: &str, website: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM hv_credentials WHERE username = ? AND website = ? COLLATE NOCASE",
        [username, website],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// List the websites of a user, sorted
pub fn list_websites(conn: &Connection, username: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT website FROM hv_credentials WHERE username = ? ORDER BY website COLLATE NOCASE"
    )?;
    let sites = stmt.query_map([username], |row| row.get(0))?;
    sites.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
}

/// Insert a new credential
pub fn create_credential(
    conn: &Connection,
    username: &str,
    website: &str,
    login_encrypted: &str,
    email_encrypted: &str,
    password_encrypted: &str,
) -> Result<()> {
    let now = now_timestamp();
    conn.execute(
        "INSERT INTO hv_credentials (username, website, login, email, password, create_timestamp, change_timestamp)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            username,
            website,
            login_encrypted.as_bytes(),
            email_encrypted.as_bytes(),
            password_encrypted.as_bytes(),
            now,
            now,
        ],
    )?;
    Ok(())
}

/// Update an existing credential, returns false when no row matched
pub fn update_credential(
    conn: &Connection,
    username: &str,
    website: &str,
    login_encrypted: &str,
    email_encrypted: &str,
    password_encrypted: &str,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE hv_credentials SET login = ?, email = ?, password = ?, change_timestamp = ?
         WHERE username = ? AND website = ? COLLATE NOCASE",
        params![
            login_encrypted.as_bytes(),
            email_encrypted.as_bytes(),
            password_encrypted.as_bytes(),
            now_timestamp(),
            username,
            website,
        ],
    )?;
    Ok(changed > 0)
}

/// Delete a credential, returns false when no row matched
pub fn delete_credential(conn: &Connection, username: &str, website: &str) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM hv_credentials WHERE username = ? AND website = ? COLLATE NOCASE",
        [username, website],
    )?;
    Ok(changed > 0)
}

/// Delete all credentials of a user
pub fn delete_credentials_for_user(conn: &Connection, username: &str) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM hv_credentials WHERE username = ?", [username])?;
    Ok(deleted)
}

/// Count credentials of a user
pub fn count_credentials(conn: &Connection, username: &str) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM hv_credentials WHERE username = ?",
        [username],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::CREATE_ALL_TABLES;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        for sql in CREATE_ALL_TABLES {
            conn.execute(sql, []).unwrap();
        }
        conn
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let ts = "2024-03-05 07:08:09";
        let parsed = parse_timestamp(ts).unwrap();
        assert_eq!(format_timestamp(&parsed), ts);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_properties() {
        let conn = memory_db();
        assert!(get_properties(&conn).unwrap().is_none());

        set_properties(&conn, "abc", "1").unwrap();
        set_db_version(&conn, "2").unwrap();

        let props = get_properties(&conn).unwrap().unwrap();
        assert_eq!(props.database_id, "abc");
        assert_eq!(props.version.as_deref(), Some("2"));
    }

    #[test]
    fn test_user_crud() {
        let conn = memory_db();
        create_user(&conn, "alice", "alice@example.com", "hash", "key").unwrap();

        assert!(user_exists(&conn, "alice").unwrap());
        assert!(!user_exists(&conn, "bob").unwrap());

        update_email(&conn, "alice", "new@example.com").unwrap();
        update_password_hash(&conn, "alice", "hash2").unwrap();
        update_last_login(&conn, "alice").unwrap();

        let user = get_user(&conn, "alice").unwrap().unwrap();
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.password_hash, "hash2");
        assert!(user.last_login.is_some());

        delete_user(&conn, "alice").unwrap();
        assert!(get_user(&conn, "alice").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_user_rejected() {
        let conn = memory_db();
        create_user(&conn, "alice", "a@example.com", "h", "k").unwrap();
        assert!(create_user(&conn, "alice", "b@example.com", "h", "k").is_err());
    }

    #[test]
    fn test_list_usernames_sorted() {
        let conn = memory_db();
        create_user(&conn, "carol", "c@example.com", "h", "k").unwrap();
        create_user(&conn, "Bob", "b@example.com", "h", "k").unwrap();
        create_user(&conn, "alice", "a@example.com", "h", "k").unwrap();
        assert_eq!(list_usernames(&conn).unwrap(), vec!["alice", "Bob", "carol"]);
    }

    #[test]
    fn test_credential_crud() {
        let conn = memory_db();
        create_user(&conn, "alice", "a@example.com", "h", "k").unwrap();

        create_credential(&conn, "alice", "example.com", "l1", "e1", "p1").unwrap();
        assert!(credential_exists(&conn, "alice", "example.com").unwrap());
        assert_eq!(count_credentials(&conn, "alice").unwrap(), 1);

        assert!(update_credential(&conn, "alice", "example.com", "l2", "e2", "p2").unwrap());
        assert!(!update_credential(&conn, "alice", "missing.com", "l", "e", "p").unwrap());

        let raw = get_credential_raw(&conn, "alice", "example.com").unwrap().unwrap();
        assert_eq!(raw.login_encrypted, "l2");
        assert_eq!(raw.password_encrypted, "p2");

        assert!(delete_credential(&conn, "alice", "example.com").unwrap());
        assert!(!delete_credential(&conn, "alice", "example.com").unwrap());
    }

    #[test]
    fn test_credentials_are_per_user() {
        let conn = memory_db();
        create_user(&conn, "alice", "a@example.com", "h", "k").unwrap();
        create_user(&conn, "bob", "b@example.com", "h", "k").unwrap();

        create_credential(&conn, "alice", "zeta.org", "l", "e", "p").unwrap();
        create_credential(&conn, "alice", "Alpha.com", "l", "e", "p").unwrap();
        create_credential(&conn, "bob", "alpha.com", "l", "e", "p").unwrap();

        assert_eq!(list_websites(&conn, "alice").unwrap(), vec!["Alpha.com", "zeta.org"]);
        assert_eq!(get_credentials_raw(&conn, "bob").unwrap().len(), 1);

        assert_eq!(delete_credentials_for_user(&conn, "alice").unwrap(), 2);
        assert_eq!(count_credentials(&conn, "bob").unwrap(), 1);
    }

    #[test]
    fn test_tokens_stored_as_blobs() {
        let conn = memory_db();
        create_user(&conn, "alice", "a@example.com", "h", "k").unwrap();
        create_credential(&conn, "alice", "example.com", "l1", "e1", "gAAAAAtoken").unwrap();

        let kinds: (String, String, String) = conn.query_row(
            "SELECT typeof(login), typeof(email), typeof(password) FROM hv_credentials",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        ).unwrap();
        assert_eq!(kinds, ("blob".to_string(), "blob".to_string(), "blob".to_string()));

        update_credential(&conn, "alice", "example.com", "l2", "e2", "gAAAAAother").unwrap();
        let password_kind: String = conn.query_row(
            "SELECT typeof(password) FROM hv_credentials", [], |row| row.get(0),
        ).unwrap();
        assert_eq!(password_kind, "blob");

        let raw = get_credential_raw(&conn, "alice", "example.com").unwrap().unwrap();
        assert_eq!(raw.password_encrypted, "gAAAAAother");
    }

    #[test]
    fn test_website_keeps_case_and_matches_without_it() {
        let conn = memory_db();
        create_user(&conn, "alice", "a@example.com", "h", "k").unwrap();
        create_credential(&conn, "alice", "GitHub.com", "l", "e", "p").unwrap();

        assert!(credential_exists(&conn, "alice", "github.COM").unwrap());
        assert!(create_credential(&conn, "alice", "github.com", "l", "e", "p").is_err());

        let raw = get_credential_raw(&conn, "alice", "GITHUB.com").unwrap().unwrap();
        assert_eq!(raw.website, "GitHub.com");
        assert_eq!(list_websites(&conn, "alice").unwrap(), vec!["GitHub.com"]);

        assert!(delete_credential(&conn, "alice", "github.com").unwrap());
    }
}
