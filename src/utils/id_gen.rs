//! ID generation utilities

/// Generate a database ID (32 hex characters)
pub fn generate_database_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
