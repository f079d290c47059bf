//!
//! Utility functions shared by the configuration layer.
//!
//! - [`replace_handlebars_with_env`] - Template substitution for environment variables
//!

use {
    regex::{Captures, Regex},
    std::{env, sync::LazyLock},
};

/// Matches `{{ VAR_NAME }}` with optional whitespace around the variable name.
/// Variable names must be uppercase letters, digits, or underscores.
static HANDLEBAR_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Z0-9_]+)\s*\}\}").unwrap());

/// Replaces every `{{ VAR_NAME }}` in `input` with the value of the matching
/// environment variable.
///
/// Missing variables are replaced with an empty string and a warning is logged.
///
/// ```
/// use site_middleware::replace_handlebars_with_env;
///
/// unsafe { std::env::set_var("DOC_COOKIE_NAME", "sid"); }
/// let out = replace_handlebars_with_env(r#"cookie_name = "{{ DOC_COOKIE_NAME }}""#);
/// assert_eq!(out, r#"cookie_name = "sid""#);
/// ```
pub fn replace_handlebars_with_env(input: &str) -> String {
    HANDLEBAR_REGEXP
        .replace_all(input, |caps: &Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!(
                    variable = %var_name,
                    "Environment variable not found, substituting with empty string"
                );
                String::new()
            })
        })
        .to_string()
}
