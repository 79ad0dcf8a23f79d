//! Deep merge of configuration documents.

use crate::document::Value;

/// Deep merge two documents, with `overlay` taking precedence over `base`.
///
/// Mappings merge recursively: keys only in the base survive, keys only in
/// the overlay are added, and keys in both merge depth-first. Every other
/// pairing (sequences, sets, scalars, markers, mixed kinds) is replaced by
/// the overlay value wholesale; an explicit overlay null wins too.
///
/// # Example
/// ```
/// use stratum::config::deep_merge;
/// use stratum::document::from_str;
///
/// let base = from_str("server:\n  port: 8080\n  host: localhost").unwrap();
/// let overlay = from_str("server:\n  port: 9000").unwrap();
/// let merged = deep_merge(base, overlay);
/// // { server: { port: 9000, host: localhost } }
/// assert_eq!(merged, from_str("server:\n  port: 9000\n  host: localhost").unwrap());
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Map(mut base_map), Value::Map(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged);
            }
            Value::Map(base_map)
        }
        (_, overlay) => overlay,
    }
}
