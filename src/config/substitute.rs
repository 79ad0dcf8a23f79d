//! Environment marker substitution.

use tracing::warn;

use super::env::EnvReader;
use super::ConfigError;
use crate::document::{self, EnvMode, EnvRef, Value};

/// Replaces every environment marker in `value` with data read from `env`.
///
/// Containers are rebuilt with their kind and element order preserved;
/// mapping keys are never substituted. `!env` markers substitute the literal
/// string value of the variable; `!env_parse` markers run the variable's
/// value through the document value reader, so `8080` becomes an integer and
/// a bare word becomes a string. The caller is responsible for supplying
/// variable values whose literal form parses to the intended type.
///
/// An unset variable substitutes null in both modes. Symbolic references
/// pass through untouched; resolving them is a separate pass.
pub fn substitute(value: Value, env: &dyn EnvReader) -> Result<Value, ConfigError> {
    match value {
        Value::Map(map) => map
            .into_iter()
            .map(|(key, value)| Ok((key, substitute(value, env)?)))
            .collect::<Result<_, ConfigError>>()
            .map(Value::Map),
        Value::Seq(items) => items
            .into_iter()
            .map(|item| substitute(item, env))
            .collect::<Result<_, _>>()
            .map(Value::Seq),
        Value::Set(items) => items
            .into_iter()
            .map(|item| substitute(item, env))
            .collect::<Result<_, _>>()
            .map(Value::Set),
        Value::EnvRef(marker) => from_env(&marker, env),
        other => Ok(other),
    }
}

fn from_env(marker: &EnvRef, env: &dyn EnvReader) -> Result<Value, ConfigError> {
    let Some(raw) = env.var(&marker.name) else {
        warn!(name = %marker.name, "environment variable unset, substituting null");
        return Ok(Value::Null);
    };

    match marker.mode {
        EnvMode::Raw => Ok(Value::String(raw)),
        EnvMode::Parse => parse_env_value(&marker.name, &raw),
    }
}

fn parse_env_value(name: &str, raw: &str) -> Result<Value, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    document::from_str(raw).map_err(|e| ConfigError::MalformedEnvValue {
        name: name.to_string(),
        source: e,
    })
}
