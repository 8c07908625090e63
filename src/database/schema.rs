//! Database schema definitions

/// SQL to create the properties table
pub const CREATE_PROPERTIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS hv_properties (
    database_id      CHAR(32) NOT NULL PRIMARY KEY,
    version          CHAR(10),
    create_timestamp TEXT,
    update_timestamp TEXT
)
"#;

/// SQL to create the users table (one row per account)
pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS hv_users (
    username         VARCHAR(20) NOT NULL PRIMARY KEY,
    email            VARCHAR(254) NOT NULL,
    password_hash    TEXT NOT NULL,
    secret_key       CHAR(44) NOT NULL,
    create_timestamp TEXT,
    update_timestamp TEXT,
    last_login       TEXT
)
"#;

/// SQL to create the credentials table (composite primary key)
///
/// `login`, `email` and `password` hold encrypted tokens. Websites keep
/// the case they were saved with but compare case-insensitively.
pub const CREATE_CREDENTIALS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS hv_credentials (
    username         VARCHAR(20) NOT NULL,
    website          TEXT NOT NULL COLLATE NOCASE,
    login            BLOB,
    email            BLOB,
    password         BLOB,
    create_timestamp TEXT,
    change_timestamp TEXT,
    PRIMARY KEY (username, website),
    FOREIGN KEY (username) REFERENCES hv_users(username) ON DELETE CASCADE
)
"#;

/// All table creation statements in order
pub const CREATE_ALL_TABLES: &[&str] = &[
    CREATE_PROPERTIES_TABLE,
    CREATE_USERS_TABLE,
    CREATE_CREDENTIALS_TABLE,
];
