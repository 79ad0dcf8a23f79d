use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

/// A parsed configuration document.
///
/// Documents are nested value trees over mappings, ordered sequences, sets,
/// and scalars. The two environment markers and the symbolic-reference marker
/// are carried as first-class variants until the resolution pipeline replaces
/// them.
///
/// ## Example
///
/// ```
/// use stratum::document::{self, Value};
///
/// let doc = document::from_str("server:\n  port: 8080").unwrap();
/// assert_eq!(doc.get("server").and_then(|s| s.get("port")),
///            Some(&Value::Integer(8080)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Ordered sequence.
    Seq(Vec<Value>),
    /// Set, written in source as a `!set`-tagged sequence. Elements are
    /// deduplicated by equality at parse time; source order is preserved.
    Set(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Environment substitution marker (`!env` / `!env_parse`).
    EnvRef(EnvRef),
    /// Symbolic reference marker (`!ref module::name`).
    SymbolRef(SymbolRef),
}

/// How an environment marker turns its variable into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvMode {
    /// Substitute the literal string value of the variable.
    Raw,
    /// Parse the variable's string value with the document value reader.
    Parse,
}

/// A scalar naming an environment variable to substitute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvRef {
    pub name: String,
    pub mode: EnvMode,
}

/// A scalar naming a module-qualified bound value (`module::name`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRef {
    pub target: String,
}

impl Value {
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Looks up `key` if this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Deserializes this value into a caller-defined type.
    ///
    /// Intended for fully resolved documents; sets lower to sequences and any
    /// marker still present surfaces as a deserialization error.
    ///
    /// ## Example
    ///
    /// ```
    /// use serde::Deserialize;
    /// use stratum::document;
    ///
    /// #[derive(Deserialize)]
    /// struct Server {
    ///     port: u16,
    /// }
    ///
    /// let doc = document::from_str("port: 8080").unwrap();
    /// let server: Server = doc.to_typed().unwrap();
    /// assert_eq!(server.port, 8080);
    /// ```
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, serde_yaml::Error> {
        serde_yaml::from_value(super::to_yaml(self))
    }
}
