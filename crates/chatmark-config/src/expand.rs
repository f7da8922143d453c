//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Bare `$VAR` syntax is not expanded (only `${VAR}` with braces).
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Variable that had no value in the environment.
struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("CHATMARK_EXPAND_HOST", "avatars.example.org");
        }
        let result =
            expand_env("https://${CHATMARK_EXPAND_HOST}/avatar", "avatar.base_url").unwrap();
        assert_eq!(result, "https://avatars.example.org/avatar");
        unsafe {
            std::env::remove_var("CHATMARK_EXPAND_HOST");
        }
    }

    #[test]
    fn test_expand_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("CHATMARK_EXPAND_UNSET");
        }
        let result =
            expand_env("${CHATMARK_EXPAND_UNSET:-identicon}", "avatar.default_icon").unwrap();
        assert_eq!(result, "identicon");
    }

    #[test]
    fn test_expand_missing_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("CHATMARK_EXPAND_MISSING");
        }
        let err = expand_env("${CHATMARK_EXPAND_MISSING}", "avatar.base_url").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("CHATMARK_EXPAND_MISSING"));
        assert!(err.to_string().contains("avatar.base_url"));
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        assert_eq!(expand_env("$HOME/x", "f").unwrap(), "$HOME/x");
    }
}
