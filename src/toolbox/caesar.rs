//! Caesar cipher
//!
//! Shifts ASCII letters through the alphabet, keeping case. Everything
//! else (digits, spaces, punctuation, non-ASCII) passes through unchanged.

const ALPHABET_LEN: i32 = 26;

/// Direction of a cipher run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encode,
    Decode,
}

fn shift_char(c: char, shift: i32) -> char {
    let base = match c {
        'a'..='z' => b'a',
        'A'..='Z' => b'A',
        _ => return c,
    };
    let offset = (c as u8 - base) as i32;
    let shifted = (offset + shift).rem_euclid(ALPHABET_LEN);
    (base + shifted as u8) as char
}

/// Run the cipher in either direction
pub fn caesar(text: &str, shift: i32, direction: Direction) -> String {
    let shift = shift.rem_euclid(ALPHABET_LEN);
    let shift = match direction {
        Direction::Encode => shift,
        Direction::Decode => -shift,
    };
    text.chars().map(|c| shift_char(c, shift)).collect()
}

/// Encrypt text, shift taken modulo 26 (negative shifts allowed)
pub fn encrypt(text: &str, shift: i32) -> String {
    caesar(text, shift, Direction::Encode)
}

/// Decrypt text produced by [`encrypt`] with the same shift
pub fn decrypt(text: &str, shift: i32) -> String {
    caesar(text, shift, Direction::Decode)
}

/// Every possible decryption, indexed by shift 0..26
pub fn brute_force(text: &str) -> Vec<(i32, String)> {
    (0..ALPHABET_LEN).map(|shift| (shift, decrypt(text, shift))).collect()
}
