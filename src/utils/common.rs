//! Common utility functions

/// Convert a string to asterisks (for masking passwords)
pub fn mask_string(s: &str) -> String {
    "*".repeat(s.chars().count())
}

/// Show only the first `visible` characters of a secret
pub fn mask_partial(s: &str, visible: usize) -> String {
    let count = s.chars().count();
    if count <= visible {
        return mask_string(s);
    }
    let head: String = s.chars().take(visible).collect();
    format!("{}{}", head, "*".repeat(count - visible))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string("password"), "********");
        assert_eq!(mask_string(""), "");
        assert_eq!(mask_string("пароль"), "******");
    }

    #[test]
    fn test_mask_partial() {
        assert_eq!(mask_partial("hunter22", 2), "hu******");
        assert_eq!(mask_partial("ab", 2), "**");
        assert_eq!(mask_partial("", 3), "");
    }
}
