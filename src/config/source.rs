//! Source loading from embedded resources and the filesystem.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use super::ConfigError;
use crate::document::{self, Value};

/// Loads configuration documents by path.
///
/// Relative paths are first looked up in the embedded-resource table (the
/// host registers bundled documents with [`with_resource`](Self::with_resource),
/// typically from `include_str!`), then on the filesystem. Absolute paths go
/// straight to the filesystem. A missing source is `Ok(None)`, never an
/// error; only unreadable or malformed sources fail.
#[derive(Debug, Clone, Default)]
pub struct SourceLoader {
    resources: BTreeMap<String, String>,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an embedded resource under a relative path.
    pub fn with_resource(
        mut self,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        self.resources.insert(path.into(), content.into());
        self
    }

    /// Whether an open attempt on `path` could succeed: the path is
    /// absolute, or an embedded resource exists under it, or it names an
    /// existing relative filesystem entry.
    pub fn locate(&self, path: &Path) -> bool {
        path.is_absolute() || self.resource(path).is_some() || path.exists()
    }

    /// Loads and parses the document at `path`.
    ///
    /// Returns `Ok(None)` when no source exists there.
    pub fn load(&self, path: &Path) -> Result<Option<Value>, ConfigError> {
        if path.is_relative() {
            if let Some(content) = self.resource(path) {
                debug!(path = %path.display(), "loading embedded config source");
                return parse_source(path, content).map(Some);
            }
        }

        match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), "loading config source from disk");
                parse_source(path, &content).map(Some)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    fn resource(&self, path: &Path) -> Option<&str> {
        path.to_str()
            .and_then(|key| self.resources.get(key))
            .map(String::as_str)
    }
}

fn parse_source(path: &Path, content: &str) -> Result<Value, ConfigError> {
    document::from_str(content).map_err(|e| ConfigError::MalformedSource {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_absolute_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "key: value").unwrap();

        let loader = SourceLoader::new();
        let doc = loader.load(file.path()).unwrap().unwrap();

        assert_eq!(doc.get("key"), Some(&Value::String("value".into())));
    }

    #[test]
    fn test_load_missing_absolute_file_is_not_found() {
        let loader = SourceLoader::new();
        let result = loader.load(Path::new("/nonexistent/path/config.yaml"));

        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_load_prefers_embedded_resource_for_relative_path() {
        let loader = SourceLoader::new().with_resource("config/defaults.yaml", "tier: embedded");
        let doc = loader
            .load(Path::new("config/defaults.yaml"))
            .unwrap()
            .unwrap();

        assert_eq!(doc.get("tier"), Some(&Value::String("embedded".into())));
    }

    #[test]
    fn test_load_relative_path_falls_back_to_disk() {
        let dir = tempfile::tempdir_in(".").unwrap();
        let path = dir.path().join("local.yaml");
        std::fs::write(&path, "tier: disk").unwrap();
        assert!(path.is_relative());

        let loader = SourceLoader::new();
        let doc = loader.load(&path).unwrap().unwrap();

        assert_eq!(doc.get("tier"), Some(&Value::String("disk".into())));
    }

    #[test]
    fn test_load_missing_relative_path_is_not_found() {
        let loader = SourceLoader::new();
        let result = loader.load(Path::new("no/such/resource.yaml"));

        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_malformed_source_names_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "key: [not, closed").unwrap();

        let loader = SourceLoader::new();
        let err = loader.load(file.path()).unwrap_err();

        match err {
            ConfigError::MalformedSource { path, .. } => assert_eq!(path, file.path()),
            other => panic!("expected MalformedSource, got {other:?}"),
        }
    }

    #[test]
    fn test_locate() {
        let loader = SourceLoader::new().with_resource("bundled.yaml", "a: 1");

        assert!(loader.locate(Path::new("/anything/absolute.yaml")));
        assert!(loader.locate(Path::new("bundled.yaml")));
        assert!(!loader.locate(Path::new("invalid/file")));
    }
}
