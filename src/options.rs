//! Options Module for the Export Exposer
//!
//! Per-run configuration supplied by the host build pipeline, usually as a
//! JSON options object next to the file being compiled.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

lazy_static! {
    /// Configured path segments must be usable as bare JS identifiers,
    /// otherwise the emitted dotted paths would not be readable back as
    /// `globalObject.a.b.c` property chains.
    static ref SEGMENT_RE: Regex = Regex::new(r"^[a-zA-Z_$][a-zA-Z0-9_$]*$").unwrap();
}

/// Immutable per-run settings for the export exposer.
///
/// Naming safety is a caller obligation: `named_key`, `default_key`, and the
/// collapse policy must be chosen so that no two distinct files or exports
/// under the source root ever produce the same dotted path. The transform
/// does not detect collisions; a later write silently overwrites an earlier
/// one in the global namespace. In practice this means no file or directory
/// under the source root may be named like the container keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposeOptions {
    /// Top-level key under the global object that all modules nest under.
    pub expose_root: String,
    /// Absolute directory; files outside it are left untouched.
    pub source_root: String,
    /// Identifier the `set` calls write through, e.g. `window`.
    #[serde(default = "default_global_object")]
    pub global_object: String,
    /// Container segment for named exports.
    #[serde(default = "default_named_key")]
    pub named_key: String,
    /// Container segment for the default export.
    #[serde(default = "default_default_key")]
    pub default_key: String,
    /// Drop a trailing segment equal to its parent (`foo/foo.js` convention).
    #[serde(default)]
    pub collapse_duplicate: bool,
    /// Import specifier of the path-assignment primitive. A package name is
    /// emitted as-is; a relative path is re-resolved per file.
    #[serde(default = "default_set_package")]
    pub set_package: String,
    /// Print every `relativePath::exportName -> dotted.path` mapping.
    #[serde(default)]
    pub log_mapping: bool,
}

fn default_global_object() -> String {
    "window".to_string()
}

fn default_named_key() -> String {
    "xposed".to_string()
}

fn default_default_key() -> String {
    "xposed_default".to_string()
}

fn default_set_package() -> String {
    "lodash-es/set".to_string()
}

impl ExposeOptions {
    /// Reject settings that could never yield a readable namespace. Called at
    /// the N-API boundary and by the directory driver; the per-file transform
    /// assumes validated options.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("exposeRoot", &self.expose_root),
            ("globalObject", &self.global_object),
            ("namedKey", &self.named_key),
            ("defaultKey", &self.default_key),
        ] {
            if !SEGMENT_RE.is_match(value) {
                return Err(format!(
                    "Option {} must be a valid identifier, got \"{}\"",
                    field, value
                ));
            }
        }
        if !Path::new(&self.source_root).is_absolute() {
            return Err(format!(
                "Option sourceRoot must be an absolute path, got \"{}\"",
                self.source_root
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let options: ExposeOptions =
            serde_json::from_str(r#"{ "exposeRoot": "Xp", "sourceRoot": "/src" }"#).unwrap();
        assert_eq!(options.global_object, "window");
        assert_eq!(options.named_key, "xposed");
        assert_eq!(options.default_key, "xposed_default");
        assert_eq!(options.set_package, "lodash-es/set");
        assert!(!options.collapse_duplicate);
        assert!(!options.log_mapping);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_identifier_segments() {
        let mut options: ExposeOptions =
            serde_json::from_str(r#"{ "exposeRoot": "Xp", "sourceRoot": "/src" }"#).unwrap();
        options.named_key = "a.b".to_string();
        assert!(options.validate().is_err());

        options.named_key = "x".to_string();
        options.expose_root = "1bad".to_string();
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_rejects_relative_source_root() {
        let options: ExposeOptions =
            serde_json::from_str(r#"{ "exposeRoot": "Xp", "sourceRoot": "src" }"#).unwrap();
        assert!(options.validate().is_err());
    }
}
