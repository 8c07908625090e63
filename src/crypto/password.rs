//! Random password generation
//!
//! Backs the "generate password" action when saving a new website entry.

use rand::Rng;

const LOWER_LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPER_LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!#$%&()*+";

/// Options for password generation
///
/// Selected classes share one pool in which every letter appears three
/// times, every digit twice and every symbol once. With no class selected
/// the pool falls back to lowercase letters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordOptions {
    /// a-z
    pub lowercase: bool,
    /// A-Z
    pub uppercase: bool,
    /// 0-9
    pub digits: bool,
    /// !#$%&()*+
    pub special: bool,
    /// Number of characters
    pub length: usize,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            lowercase: true,
            uppercase: true,
            digits: true,
            special: true,
            length: 16,
        }
    }
}

impl PasswordOptions {
    /// No class selected, only the length set
    pub fn with_length(length: usize) -> Self {
        Self {
            lowercase: false,
            uppercase: false,
            digits: false,
            special: false,
            length,
        }
    }

    /// Weighted character pool for the selected classes
    pub fn pool(&self) -> Vec<char> {
        let mut pool = Vec::new();

        if self.lowercase {
            push_weighted(&mut pool, LOWER_LETTERS, 3);
        }
        if self.uppercase {
            push_weighted(&mut pool, UPPER_LETTERS, 3);
        }
        if self.digits {
            push_weighted(&mut pool, DIGITS, 2);
        }
        if self.special {
            push_weighted(&mut pool, SYMBOLS, 1);
        }
        if pool.is_empty() {
            push_weighted(&mut pool, LOWER_LETTERS, 1);
        }
        pool
    }
}

fn push_weighted(pool: &mut Vec<char>, chars: &str, weight: usize) {
    for _ in 0..weight {
        pool.extend(chars.chars());
    }
}

/// Generate a random password
///
/// # Example
/// ```
/// use hobbyvault::crypto::password::{generate_password, PasswordOptions};
///
/// let password = generate_password(&PasswordOptions { length: 12, ..Default::default() });
/// assert_eq!(password.len(), 12);
/// ```
pub fn generate_password(options: &PasswordOptions) -> String {
    let mut rng = rand::rng();
    let pool = options.pool();

    (0..options.length)
        .map(|_| pool[rng.random_range(0..pool.len())])
        .collect()
}

/// Generate a password that follows a pattern
///
/// Each pattern character is replaced by a random character of the same
/// class: lowercase, uppercase, digit or symbol. Anything else becomes a
/// random character from all classes.
///
/// # Example
/// ```
/// use hobbyvault::crypto::password::generate_clever_password;
///
/// let password = generate_clever_password("Aaaa0000");
/// assert_eq!(password.len(), 8);
/// ```
pub fn generate_clever_password(pattern: &str) -> String {
    let mut rng = rand::rng();
    let all = format!("{}{}{}{}", LOWER_LETTERS, UPPER_LETTERS, DIGITS, SYMBOLS);

    pattern
        .chars()
        .map(|ch| {
            let pool = if ch.is_ascii_lowercase() {
                LOWER_LETTERS
            } else if ch.is_ascii_uppercase() {
                UPPER_LETTERS
            } else if ch.is_ascii_digit() {
                DIGITS
            } else if SYMBOLS.contains(ch) {
                SYMBOLS
            } else {
                all.as_str()
            };
            let bytes = pool.as_bytes();
            bytes[rng.random_range(0..bytes.len())] as char
        })
        .collect()
}
