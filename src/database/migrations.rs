//! Database upgrades between schema versions
//!
//! - v1: users and credentials
//! - v2: `last_login` column on users

use rusqlite::Connection;
use tracing::info;
use crate::error::Result;
use crate::DB_VERSION;
use super::queries;

/// Upgrade database to the latest version
pub fn upgrade_database(conn: &Connection, current_version: &str) -> Result<()> {
    let version: u32 = current_version.parse().unwrap_or(1);

    if version < 2 {
        upgrade_to_v2(conn)?;
    }

    if version < current_version_number() {
        queries::set_db_version(conn, DB_VERSION)?;
        info!(from = version, to = DB_VERSION, "database upgraded");
    }

    Ok(())
}

/// Upgrade from v1 to v2
fn upgrade_to_v2(conn: &Connection) -> Result<()> {
    if !has_column(conn, "hv_users", "last_login")? {
        conn.execute("ALTER TABLE hv_users ADD COLUMN last_login TEXT", [])?;
    }
    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn current_version_number() -> u32 {
    DB_VERSION.parse().unwrap_or(2)
}

/// Check if a database version can be opened by this build
pub fn is_version_compatible(version: &str) -> bool {
    let v: u32 = version.parse().unwrap_or(0);
    v <= current_version_number()
}

/// Get the database version from properties, "1" when missing
pub fn get_database_version(conn: &Connection) -> Result<String> {
    let version = queries::get_properties(conn)?
        .and_then(|p| p.version)
        .unwrap_or_else(|| "1".to_string());
    Ok(version)
}
