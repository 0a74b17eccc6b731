//! Utility functions and helpers

use std::path::PathBuf;

/// Expand a leading `~/` to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// First `max_chars` characters of a string, respecting char boundaries
pub fn char_prefix(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/tmp/comms.db"), PathBuf::from("/tmp/comms.db"));
        assert_eq!(expand_tilde("relative/db"), PathBuf::from("relative/db"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/x/y.db"), home.join("x/y.db"));
        }
    }

    #[test]
    fn test_char_prefix() {
        assert_eq!(char_prefix("abcdef1234567890", 8), "abcdef12");
        assert_eq!(char_prefix("abc", 8), "abc");
        assert_eq!(char_prefix("", 8), "");
        assert_eq!(char_prefix("héllo wörld", 4), "héll");
    }
}
