//! Environment variable loading utilities
//!
//! Helper functions for loading and parsing environment variables with proper error handling.

use crate::{Result, ToolingError};
use regex::{Captures, Regex};
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

/// Load an environment variable as a string
///
/// Blank values are treated the same as unset ones.
///
/// * `Ok(Some(value))` if variable exists and is non-blank
/// * `Ok(None)` if variable doesn't exist
/// * `Err` if variable exists but has invalid UTF-8
pub fn get_env(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(val) if val.trim().is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ToolingError::EnvNotUnicode {
            key: key.to_string(),
        }),
    }
}

/// Load and parse an environment variable
///
/// # Example
///
/// ```rust,ignore
/// let attempts: Option<usize> = get_env_parse("TASKMATE_MAX_ATTEMPTS")?;
/// ```
pub fn get_env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_env(key)? {
        Some(val) => {
            let parsed = val
                .trim()
                .parse::<T>()
                .map_err(|e| ToolingError::EnvParse {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

/// Load the first non-blank variable from a list of candidates.
pub fn get_env_first(keys: &[&str]) -> Result<Option<String>> {
    for key in keys {
        if let Some(value) = get_env(key)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

fn placeholder_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").ok())
        .as_ref()
}

/// Replace every `${VAR}` placeholder with the variable's value.
///
/// Placeholders naming unset variables are left untouched so callers can
/// report them; see [`has_unresolved_placeholder`].
///
/// # Example
///
/// ```rust,ignore
/// std::env::set_var("GOOGLE_API_KEY", "abc");
/// assert_eq!(expand_env_vars("${GOOGLE_API_KEY}"), "abc");
/// ```
pub fn expand_env_vars(value: &str) -> String {
    let Some(pattern) = placeholder_pattern() else {
        return value.to_string();
    };

    pattern
        .replace_all(value, |caps: &Captures| match get_env(&caps[1]) {
            Ok(Some(resolved)) => resolved,
            _ => caps[0].to_string(),
        })
        .into_owned()
}

/// True when `value` still contains a `${VAR}` placeholder.
pub fn has_unresolved_placeholder(value: &str) -> bool {
    placeholder_pattern().is_some_and(|pattern| pattern.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_missing() {
        assert!(get_env("TOOLING_TEST_MISSING_VAR_12345").unwrap().is_none());
    }

    #[test]
    fn test_get_env_blank_is_missing() {
        env::set_var("TOOLING_TEST_BLANK_VAR", "   ");
        assert!(get_env("TOOLING_TEST_BLANK_VAR").unwrap().is_none());
        env::remove_var("TOOLING_TEST_BLANK_VAR");
    }

    #[test]
    fn test_get_env_parse() {
        env::set_var("TOOLING_TEST_NUMBER", "42");
        let result: Option<i32> = get_env_parse("TOOLING_TEST_NUMBER").unwrap();
        assert_eq!(result, Some(42));
        env::remove_var("TOOLING_TEST_NUMBER");
    }

    #[test]
    fn test_get_env_parse_invalid() {
        env::set_var("TOOLING_TEST_INVALID_NUMBER", "not_a_number");
        let result: Result<Option<i32>> = get_env_parse("TOOLING_TEST_INVALID_NUMBER");
        assert!(matches!(
            result,
            Err(ToolingError::EnvParse { ref key, .. }) if key == "TOOLING_TEST_INVALID_NUMBER"
        ));
        env::remove_var("TOOLING_TEST_INVALID_NUMBER");
    }

    #[test]
    fn test_get_env_first() {
        env::set_var("TOOLING_TEST_SECOND_CHOICE", "second");
        let result = get_env_first(&["TOOLING_TEST_FIRST_CHOICE_UNSET", "TOOLING_TEST_SECOND_CHOICE"]);
        assert_eq!(result.unwrap(), Some("second".to_string()));
        env::remove_var("TOOLING_TEST_SECOND_CHOICE");
    }

    #[test]
    fn test_expand_env_vars() {
        env::set_var("TOOLING_TEST_EXPAND_KEY", "secret");
        assert_eq!(expand_env_vars("${TOOLING_TEST_EXPAND_KEY}"), "secret");
        assert_eq!(
            expand_env_vars("key=${TOOLING_TEST_EXPAND_KEY};"),
            "key=secret;"
        );
        env::remove_var("TOOLING_TEST_EXPAND_KEY");
    }

    #[test]
    fn test_expand_leaves_unknown_placeholders() {
        let value = expand_env_vars("${TOOLING_TEST_NEVER_SET_999}");
        assert_eq!(value, "${TOOLING_TEST_NEVER_SET_999}");
        assert!(has_unresolved_placeholder(&value));
        assert!(!has_unresolved_placeholder("plain"));
    }
}
