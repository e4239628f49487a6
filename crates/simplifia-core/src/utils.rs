//! Utility helpers — data directory resolution and string shortening.

use std::path::PathBuf;

/// Get the SimplifIA data directory (e.g. `~/.simplifia/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".simplifia")
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate_string("photosynthèse végétale", 9), "photos...");
    }

    #[test]
    fn test_data_path_suffix() {
        assert!(get_data_path().ends_with(".simplifia"));
    }

    #[test]
    fn test_data_path_under_home() {
        if let Some(home) = dirs_next::home_dir() {
            assert_eq!(get_data_path(), home.join(".simplifia"));
        }
    }
}
