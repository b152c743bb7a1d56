//! Environment variable substitution for config values.
//!
//! Supports `${VAR_NAME}` syntax in string values, resolved at load time.
//! Only uppercase `[A-Z_][A-Z0-9_]*` variable names are matched, and
//! `$${VAR}` escapes to a literal `${VAR}`.

use std::collections::HashMap;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

/// Matches a variable reference with an optional escape marker in front.
static VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config JSON value tree.
///
/// Walks the tree recursively; only string leaves are processed. A
/// referenced variable that is unset or empty is an error naming the
/// config path it appeared at.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    substitute_value(value, &std::env::vars().collect(), "")
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(items) => {
            let result: Result<Vec<_>> = items
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                result.insert(key.clone(), substitute_value(child, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        // Primitives pass through unchanged.
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = VAR_PATTERN
        .replace_all(s, |caps: &Captures| {
            let name = &caps[2];
            // Leading `$` marks an escaped reference: emit it literally.
            if !caps[1].is_empty() {
                return format!("${{{name}}}");
            }
            match env.get(name) {
                Some(value) if !value.is_empty() => value.clone(),
                _ => {
                    missing.get_or_insert(MissingEnvVarError {
                        var_name: name.to_string(),
                        config_path: path.to_string(),
                    });
                    String::new()
                }
            }
        })
        .into_owned();

    match missing {
        Some(err) => Err(err.into()),
        None => Ok(substituted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_simple_var() {
        let v = json!({"auth_token": "${STUDYLENS_API_TOKEN}"});
        let env = env(&[("STUDYLENS_API_TOKEN", "tok-abc123")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["auth_token"], "tok-abc123");
    }

    #[test]
    fn error_on_missing_var_names_the_path() {
        let v = json!({"api": {"auth_token": "${MISSING_VAR}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("MISSING_VAR"));
        assert!(text.contains("api.auth_token"));
    }

    #[test]
    fn escaped_reference_is_preserved() {
        let v = json!({"note": "literal $${HOME} stays"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["note"], "literal ${HOME} stays");
    }

    #[test]
    fn passthrough_non_var_strings() {
        let v = json!({"base_url": "http://localhost:8000"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["base_url"], "http://localhost:8000");
    }

    #[test]
    fn substitutes_inside_arrays() {
        let v = json!({"hosts": ["${PRIMARY_HOST}", "static.example.com"]});
        let env = env(&[("PRIMARY_HOST", "api.studylens.app")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["hosts"][0], "api.studylens.app");
        assert_eq!(result["hosts"][1], "static.example.com");
    }
}
