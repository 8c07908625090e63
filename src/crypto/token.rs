//! Authenticated symmetric encryption of stored credential fields
//!
//! Token layout (before URL-safe base64 encoding):
//!
//! | bytes | content                                   |
//! |-------|-------------------------------------------|
//! | 1     | version, always `0x80`                    |
//! | 8     | creation time, unix seconds, big endian   |
//! | 16    | random IV                                 |
//! | n*16  | AES-128-CBC ciphertext with PKCS7 padding |
//! | 32    | HMAC-SHA256 over all preceding bytes      |
//!
//! The 32-byte secret key is split in two: the first half signs, the
//! second half encrypts. Tokens are interchangeable with the Fernet format.

use aes::Aes128;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use block_padding::Pkcs7;
use cbc::{Encryptor, Decryptor};
use cbc::cipher::{BlockEncryptMut, BlockDecryptMut, KeyIvInit};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, VaultError};

/// Token format version byte
const VERSION: u8 = 0x80;

/// Full secret key length (signing half + encryption half)
const KEY_LENGTH: usize = 32;

/// Length of each key half
const HALF_KEY_LENGTH: usize = 16;

/// AES block and IV size
const BLOCK_SIZE: usize = 16;

/// Version byte + timestamp + IV
const HEADER_LENGTH: usize = 1 + 8 + BLOCK_SIZE;

/// HMAC-SHA256 tag length
const HMAC_LENGTH: usize = 32;

/// Tokens stamped further than this in the future are rejected by TTL checks
const MAX_CLOCK_SKEW: i64 = 60;

type Aes128CbcEnc = Encryptor<Aes128>;
type Aes128CbcDec = Decryptor<Aes128>;
type HmacSha256 = Hmac<Sha256>;

/// Per-user secret key
///
/// Stored alongside the user row as URL-safe base64. Key bytes are wiped
/// when the value is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: [u8; KEY_LENGTH],
}

impl SecretKey {
    /// Generate a fresh random key
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LENGTH];
        rand::rng().fill(&mut bytes[..]);
        Self { bytes }
    }

    /// Build a key from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Decode a key from its URL-safe base64 form
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let mut decoded = URL_SAFE
            .decode(encoded.trim())
            .map_err(|e| VaultError::DecryptionError(format!("Invalid key encoding: {}", e)))?;

        if decoded.len() != KEY_LENGTH {
            let len = decoded.len();
            decoded.zeroize();
            return Err(VaultError::DecryptionError(
                format!("Invalid key length {}, must be {} bytes", len, KEY_LENGTH),
            ));
        }

        let mut bytes = [0u8; KEY_LENGTH];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self { bytes })
    }

    /// Encode the key as URL-safe base64 (44 characters)
    pub fn to_base64(&self) -> String {
        URL_SAFE.encode(self.bytes)
    }

    fn signing_key(&self) -> &[u8] {
        &self.bytes[..HALF_KEY_LENGTH]
    }

    fn encryption_key(&self) -> [u8; HALF_KEY_LENGTH] {
        let mut key = [0u8; HALF_KEY_LENGTH];
        key.copy_from_slice(&self.bytes[HALF_KEY_LENGTH..]);
        key
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

/// Encrypt plaintext into a token stamped with the current time
pub fn encrypt(key: &SecretKey, plaintext: &str) -> Result<String> {
    let mut iv = [0u8; BLOCK_SIZE];
    rand::rng().fill(&mut iv[..]);
    encrypt_with_parts(key, plaintext.as_bytes(), Utc::now().timestamp(), &iv)
}

/// Build a token from explicit timestamp and IV
pub(crate) fn encrypt_with_parts(
    key: &SecretKey,
    data: &[u8],
    timestamp: i64,
    iv: &[u8; BLOCK_SIZE],
) -> Result<String> {
    // Calculate padded length (always at least one padding byte)
    let padded_len = ((data.len() / BLOCK_SIZE) + 1) * BLOCK_SIZE;
    let mut buffer = vec![0u8; padded_len];
    buffer[..data.len()].copy_from_slice(data);

    let mut enc_key = key.encryption_key();
    let encryptor = Aes128CbcEnc::new(&enc_key.into(), &(*iv).into());
    enc_key.zeroize();

    let ciphertext = encryptor
        .encrypt_padded_mut::<Pkcs7>(&mut buffer, data.len())
        .map_err(|e| VaultError::EncryptionError(format!("Encryption failed: {:?}", e)))?;

    let mut token = Vec::with_capacity(HEADER_LENGTH + ciphertext.len() + HMAC_LENGTH);
    token.push(VERSION);
    token.extend_from_slice(&(timestamp as u64).to_be_bytes());
    token.extend_from_slice(iv);
    token.extend_from_slice(ciphertext);

    let mut mac = <HmacSha256 as Mac>::new_from_slice(key.signing_key())
        .map_err(|e| VaultError::EncryptionError(format!("HMAC init failed: {}", e)))?;
    mac.update(&token);
    token.extend_from_slice(&mac.finalize().into_bytes());

    Ok(URL_SAFE.encode(&token))
}

/// Decrypt a token, ignoring its age
pub fn decrypt(key: &SecretKey, token: &str) -> Result<String> {
    let (_, plaintext) = open_token(key, token)?;
    Ok(plaintext)
}

/// Decrypt a token that must not be older than `ttl_seconds` at `now`
pub fn decrypt_with_ttl(key: &SecretKey, token: &str, ttl_seconds: i64, now: i64) -> Result<String> {
    let (timestamp, plaintext) = open_token(key, token)?;

    if now.saturating_sub(timestamp) > ttl_seconds {
        return Err(VaultError::DecryptionError("Token expired".to_string()));
    }
    if timestamp.saturating_sub(now) > MAX_CLOCK_SKEW {
        return Err(VaultError::DecryptionError("Token timestamp is in the future".to_string()));
    }

    Ok(plaintext)
}

/// Verify and decrypt, returning the embedded timestamp and the plaintext
fn open_token(key: &SecretKey, token: &str) -> Result<(i64, String)> {
    let data = URL_SAFE
        .decode(token.trim())
        .map_err(|_| VaultError::DecryptionError("Invalid token encoding".to_string()))?;

    if data.len() < HEADER_LENGTH + BLOCK_SIZE + HMAC_LENGTH {
        return Err(VaultError::DecryptionError("Token too short".to_string()));
    }
    if data[0] != VERSION {
        return Err(VaultError::DecryptionError(format!("Unknown token version 0x{:02x}", data[0])));
    }

    let (signed, tag) = data.split_at(data.len() - HMAC_LENGTH);

    let mut mac = <HmacSha256 as Mac>::new_from_slice(key.signing_key())
        .map_err(|e| VaultError::DecryptionError(format!("HMAC init failed: {}", e)))?;
    mac.update(signed);
    mac.verify_slice(tag)
        .map_err(|_| VaultError::DecryptionError("Signature mismatch".to_string()))?;

    let mut ts_bytes = [0u8; 8];
    ts_bytes.copy_from_slice(&signed[1..9]);
    let timestamp = u64::from_be_bytes(ts_bytes) as i64;

    let mut iv = [0u8; BLOCK_SIZE];
    iv.copy_from_slice(&signed[9..HEADER_LENGTH]);

    let ciphertext = &signed[HEADER_LENGTH..];
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(VaultError::DecryptionError("Ciphertext is not block aligned".to_string()));
    }

    let mut buffer = ciphertext.to_vec();
    let mut dec_key = key.encryption_key();
    let decryptor = Aes128CbcDec::new(&dec_key.into(), &iv.into());
    dec_key.zeroize();

    let decrypted = decryptor
        .decrypt_padded_mut::<Pkcs7>(&mut buffer)
        .map_err(|e| VaultError::DecryptionError(format!("Decryption failed: {:?}", e)))?;

    let plaintext = String::from_utf8(decrypted.to_vec())
        .map_err(|e| VaultError::DecryptionError(format!("Invalid UTF-8: {}", e)))?;

    Ok((timestamp, plaintext))
}
