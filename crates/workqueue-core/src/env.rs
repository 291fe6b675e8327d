//! Environment variable utilities
//!
//! Generic `env_get<T>` for parsing environment variables with defaults.
//! Used for the `WQ_*` knobs (log level, worker count override).

use std::str::FromStr;

/// Get environment variable parsed as type T, or return default
///
/// Works with any type that implements `FromStr`. Unset or unparsable
/// values fall back to the default.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Get environment variable as boolean
///
/// Accepts "1", "true", "yes", "on" (case-insensitive) as true.
/// Everything else (including unset) returns the default.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_get_default() {
        let v: usize = env_get("WQ_TEST_UNSET_VARIABLE", 42);
        assert_eq!(v, 42);
    }

    #[test]
    fn test_env_get_parsed() {
        std::env::set_var("WQ_TEST_PARSE_VARIABLE", "17");
        let v: usize = env_get("WQ_TEST_PARSE_VARIABLE", 1);
        assert_eq!(v, 17);
        std::env::remove_var("WQ_TEST_PARSE_VARIABLE");
    }

    #[test]
    fn test_env_get_bool() {
        assert!(!env_get_bool("WQ_TEST_UNSET_BOOL", false));
        assert!(env_get_bool("WQ_TEST_UNSET_BOOL", true));
        std::env::set_var("WQ_TEST_BOOL_VARIABLE", "yes");
        assert!(env_get_bool("WQ_TEST_BOOL_VARIABLE", false));
        std::env::remove_var("WQ_TEST_BOOL_VARIABLE");
    }
}
