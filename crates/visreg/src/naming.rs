//! Mapping logical baseline names to file-system-safe keys.
//!
//! `"a/b"` and `"a b"` both sanitize to `a_b`. Repositories record which
//! logical name owns each key and reject a second, different name instead
//! of letting it share the first one's files.

use crate::result::{VisregError, VisregResult};

/// Replace every character outside `[A-Za-z0-9-_]` with `_`
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Storage key for a logical name
///
/// # Errors
///
/// Returns [`VisregError::Configuration`] if the name is empty.
pub fn baseline_key(name: &str) -> VisregResult<String> {
    if name.is_empty() {
        return Err(VisregError::config("baseline name must not be empty"));
    }
    Ok(sanitize_name(name))
}

/// Check that `owner`, the name recorded for `key`, is `name`
///
/// # Errors
///
/// Returns [`VisregError::Configuration`] naming both logical names.
pub fn check_owner(key: &str, owner: &str, name: &str) -> VisregResult<()> {
    if owner == name {
        Ok(())
    } else {
        Err(VisregError::config(format!(
            "baseline names '{owner}' and '{name}' both map to key '{key}'"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_chars() {
        assert_eq!(sanitize_name("checkout-summary_v2"), "checkout-summary_v2");
    }

    #[test]
    fn test_sanitize_replaces_unsafe_chars() {
        assert_eq!(sanitize_name("home page/header.main"), "home_page_header_main");
        assert_eq!(sanitize_name("../etc"), "___etc");
        assert_eq!(sanitize_name("café"), "caf_");
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = baseline_key("").unwrap_err();
        assert!(matches!(err, VisregError::Configuration { .. }));
        assert_eq!(baseline_key("a b").unwrap(), "a_b");
    }

    #[test]
    fn test_check_owner() {
        assert!(check_owner("a_b", "a/b", "a/b").is_ok());
        let err = check_owner("a_b", "a/b", "a b").unwrap_err();
        assert!(matches!(err, VisregError::Configuration { .. }));
        assert!(err.to_string().contains("'a/b'"));
        assert!(err.to_string().contains("'a b'"));
    }
}
