//! Tool name normalization
//!
//! Model APIs only accept function names made of `[A-Za-z0-9_-]`. Remote
//! servers are free to use anything, and two servers may expose the same
//! name, so each registry owns one sanitizer that also keeps names unique.

use std::collections::HashSet;

/// Used when nothing is left after sanitizing
pub const FALLBACK_NAME: &str = "tool";

/// Produces unique, API-safe tool names
#[derive(Debug, Default)]
pub struct NameSanitizer {
    taken: HashSet<String>,
}

impl NameSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace disallowed characters, without reserving the result
    pub fn normalize(raw: &str) -> String {
        let cleaned: String = raw
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if cleaned.is_empty() {
            FALLBACK_NAME.to_string()
        } else {
            cleaned
        }
    }

    /// Normalize `raw` and reserve a name no earlier call returned
    ///
    /// Collisions get `_2`, `_3`, ... appended to the normalized base.
    pub fn sanitize(&mut self, raw: &str) -> String {
        let base = Self::normalize(raw);
        if self.taken.insert(base.clone()) {
            return base;
        }

        let mut n = 2usize;
        loop {
            let candidate = format!("{}_{}", base, n);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Number of names handed out
    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_api_safe(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }

    #[test]
    fn test_replaces_disallowed_characters() {
        let mut s = NameSanitizer::new();
        assert_eq!(s.sanitize("weather.get forecast"), "weather_get_forecast");
        assert_eq!(s.sanitize("fs/read-file"), "fs_read-file");
        assert_eq!(s.sanitize("données"), "donn_es");
    }

    #[test]
    fn test_empty_becomes_fallback() {
        let mut s = NameSanitizer::new();
        assert_eq!(s.sanitize(""), "tool");
        assert_eq!(s.sanitize(""), "tool_2");
    }

    #[test]
    fn test_collisions_get_suffixes() {
        let mut s = NameSanitizer::new();
        assert_eq!(s.sanitize("search"), "search");
        assert_eq!(s.sanitize("search"), "search_2");
        assert_eq!(s.sanitize("search!"), "search_");
        assert_eq!(s.sanitize("search?"), "search__2");
        assert_eq!(s.sanitize("search"), "search_3");
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn test_suffix_skips_names_already_taken() {
        let mut s = NameSanitizer::new();
        assert_eq!(s.sanitize("a_2"), "a_2");
        assert_eq!(s.sanitize("a"), "a");
        assert_eq!(s.sanitize("a"), "a_3");
    }

    #[test]
    fn test_output_always_api_safe_and_unique() {
        let raws = [
            "", " ", "a b", "a.b", "a/b", "日本語", "x-y_z", "x-y_z", "🙂", "tool", "tool", "A:B:C",
        ];
        let mut s = NameSanitizer::new();
        let names: Vec<String> = raws.iter().map(|r| s.sanitize(r)).collect();

        assert!(names.iter().all(|n| is_api_safe(n)));
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_instances_are_independent() {
        let mut a = NameSanitizer::new();
        let mut b = NameSanitizer::new();
        assert_eq!(a.sanitize("x"), "x");
        assert_eq!(b.sanitize("x"), "x");
    }
}
