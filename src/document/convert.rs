//! Parsing and conversion between YAML and the document value model.
//!
//! Marker tags use the underscore-separated convention: `!env NAME`,
//! `!env_parse NAME`, `!ref module::name`, and `!set` on a sequence.

use std::collections::BTreeMap;

use serde_yaml::value::{Tag, TaggedValue};
use thiserror::Error;

use super::value::{EnvMode, EnvRef, SymbolRef, Value};

const TAG_ENV: &str = "env";
const TAG_ENV_PARSE: &str = "env_parse";
const TAG_REF: &str = "ref";
const TAG_SET: &str = "set";

/// Errors raised while parsing or converting a document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown tag '{0}'")]
    UnknownTag(String),

    #[error("tag '{tag}' expects {expected}")]
    BadTagPayload { tag: String, expected: &'static str },

    #[error("mapping keys must be strings, found {0}")]
    NonStringKey(&'static str),
}

/// Parses YAML text into a document value.
pub fn from_str(text: &str) -> Result<Value, DocumentError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
    from_yaml(yaml)
}

fn from_yaml(yaml: serde_yaml::Value) -> Result<Value, DocumentError> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_yaml::Value::Number(n) => Ok(from_number(&n)),
        serde_yaml::Value::String(s) => Ok(Value::String(s)),
        serde_yaml::Value::Sequence(items) => {
            let items = items
                .into_iter()
                .map(from_yaml)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Seq(items))
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = BTreeMap::new();
            for (key, value) in mapping {
                let serde_yaml::Value::String(key) = key else {
                    return Err(DocumentError::NonStringKey(yaml_kind(&key)));
                };
                map.insert(key, from_yaml(value)?);
            }
            Ok(Value::Map(map))
        }
        serde_yaml::Value::Tagged(tagged) => from_tagged(*tagged),
    }
}

fn from_tagged(tagged: TaggedValue) -> Result<Value, DocumentError> {
    let TaggedValue { tag, value } = tagged;

    if tag == TAG_ENV {
        let name = string_payload(&tag, value)?;
        Ok(Value::EnvRef(EnvRef {
            name,
            mode: EnvMode::Raw,
        }))
    } else if tag == TAG_ENV_PARSE {
        let name = string_payload(&tag, value)?;
        Ok(Value::EnvRef(EnvRef {
            name,
            mode: EnvMode::Parse,
        }))
    } else if tag == TAG_REF {
        let target = string_payload(&tag, value)?;
        Ok(Value::SymbolRef(SymbolRef { target }))
    } else if tag == TAG_SET {
        let serde_yaml::Value::Sequence(items) = value else {
            return Err(DocumentError::BadTagPayload {
                tag: tag.to_string(),
                expected: "a sequence",
            });
        };
        let mut set = Vec::with_capacity(items.len());
        for item in items {
            let item = from_yaml(item)?;
            if !set.contains(&item) {
                set.push(item);
            }
        }
        Ok(Value::Set(set))
    } else {
        Err(DocumentError::UnknownTag(tag.to_string()))
    }
}

fn string_payload(tag: &Tag, value: serde_yaml::Value) -> Result<String, DocumentError> {
    match value {
        serde_yaml::Value::String(s) => Ok(s),
        _ => Err(DocumentError::BadTagPayload {
            tag: tag.to_string(),
            expected: "a string",
        }),
    }
}

fn from_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Integer(i)
    } else if let Some(f) = n.as_f64() {
        Value::Float(f)
    } else {
        Value::Null
    }
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

/// Lowers a document value back to YAML for the serde bridge.
///
/// Sets lower to plain sequences; markers re-emit their tags so a marker that
/// survived to this point fails loudly downstream instead of deserializing.
pub(crate) fn to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Integer(i) => serde_yaml::Value::Number((*i).into()),
        Value::Float(f) => serde_yaml::Value::Number((*f).into()),
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::Seq(items) | Value::Set(items) => {
            serde_yaml::Value::Sequence(items.iter().map(to_yaml).collect())
        }
        Value::Map(map) => {
            let mut mapping = serde_yaml::Mapping::new();
            for (key, value) in map {
                mapping.insert(serde_yaml::Value::String(key.clone()), to_yaml(value));
            }
            serde_yaml::Value::Mapping(mapping)
        }
        Value::EnvRef(marker) => {
            let tag = match marker.mode {
                EnvMode::Raw => TAG_ENV,
                EnvMode::Parse => TAG_ENV_PARSE,
            };
            tagged(tag, marker.name.clone())
        }
        Value::SymbolRef(marker) => tagged(TAG_REF, marker.target.clone()),
    }
}

fn tagged(tag: &str, payload: String) -> serde_yaml::Value {
    serde_yaml::Value::Tagged(Box::new(TaggedValue {
        tag: Tag::new(tag),
        value: serde_yaml::Value::String(payload),
    }))
}
