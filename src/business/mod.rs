//! Business logic layer for HobbyVault
//!
//! `Vault` is the high-level API: accounts, credentials, backups and
//! settings of one vault folder.

pub mod vault;
pub mod session;
mod accounts;
mod credentials;
mod transfer;

pub use vault::Vault;
pub use session::AutoClose;
pub use transfer::ImportSummary;
