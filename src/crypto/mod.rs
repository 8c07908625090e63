//! Cryptographic operations for HobbyVault
//!
//! - Argon2id hashing of account passwords
//! - Per-user secret keys and authenticated tokens for stored credentials
//! - Random password generation

mod hashing;
mod token;
pub mod password;

pub use hashing::PasswordHashing;
pub use token::{SecretKey, encrypt, decrypt, decrypt_with_ttl};
pub use password::{generate_password, generate_clever_password, PasswordOptions};
