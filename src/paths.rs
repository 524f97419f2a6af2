//! Path Deriver for the Export Exposer
//!
//! Maps a file's location under the source root to the ordered segments that
//! address its exports in the global namespace tree.

use std::path::{Component, Path};

use crate::options::ExposeOptions;

/// Ordered segments identifying one file inside the exposed tree:
/// `[exposeRoot, dir1, .., basenameWithoutExtension]`.
///
/// Derived once per file and reused for every export; derivation is pure, so
/// the same (file, options) pair always yields the same sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePath {
    segments: Vec<String>,
    relative: String,
}

impl ModulePath {
    /// Returns `None` when `file` is not underneath the source root, which
    /// disables the transform for that file entirely.
    pub fn derive(file: &Path, options: &ExposeOptions) -> Option<Self> {
        let root = Path::new(&options.source_root);
        let rel = file.strip_prefix(root).ok()?;

        let components: Vec<&str> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(os) => os.to_str(),
                _ => None,
            })
            .collect();
        if components.is_empty() {
            return None;
        }

        let stem = file.file_stem()?.to_str()?;
        let mut segments = Vec::with_capacity(components.len() + 1);
        segments.push(options.expose_root.clone());
        for dir in &components[..components.len() - 1] {
            segments.push(dir.to_string());
        }
        segments.push(stem.to_string());

        if options.collapse_duplicate
            && segments.len() >= 2
            && segments[segments.len() - 1] == segments[segments.len() - 2]
        {
            segments.pop();
        }

        Some(ModulePath {
            segments,
            relative: rel.to_string_lossy().replace('\\', "/"),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// File path relative to the source root, used in diagnostics.
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Full dotted path for one export of this module. `"default"` selects
    /// the default-export container, everything else nests under the
    /// named-export container.
    pub fn global_path(&self, export_name: &str, options: &ExposeOptions) -> String {
        let mut parts = self.segments.clone();
        if export_name == "default" {
            parts.push(options.default_key.clone());
        } else {
            parts.push(options.named_key.clone());
            parts.push(export_name.to_string());
        }
        parts.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ExposeOptions {
        serde_json::from_str(r#"{ "exposeRoot": "Xp", "sourceRoot": "/src" }"#).unwrap()
    }

    #[test]
    fn test_derive_nested_file() {
        let path = ModulePath::derive(Path::new("/src/foo/bar/baz.js"), &options()).unwrap();
        assert_eq!(path.segments(), &["Xp", "foo", "bar", "baz"]);
        assert_eq!(path.relative(), "foo/bar/baz.js");
    }

    #[test]
    fn test_derive_outside_root() {
        assert!(ModulePath::derive(Path::new("/other/outside.js"), &options()).is_none());
        // Sibling directory sharing the root as a string prefix is still outside.
        assert!(ModulePath::derive(Path::new("/srcfoo/a.js"), &options()).is_none());
    }

    #[test]
    fn test_derive_is_idempotent() {
        let first = ModulePath::derive(Path::new("/src/a/b.js"), &options()).unwrap();
        let second = ModulePath::derive(Path::new("/src/a/b.js"), &options()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_collapse_rule() {
        let mut opts = options();
        let file = Path::new("/src/foo/foo.js");

        let plain = ModulePath::derive(file, &opts).unwrap();
        assert_eq!(plain.segments(), &["Xp", "foo", "foo"]);

        opts.collapse_duplicate = true;
        let collapsed = ModulePath::derive(file, &opts).unwrap();
        assert_eq!(collapsed.segments(), &["Xp", "foo"]);

        // Only the trailing pair collapses; a root-level file never does.
        let top = ModulePath::derive(Path::new("/src/bar.js"), &opts).unwrap();
        assert_eq!(top.segments(), &["Xp", "bar"]);
    }

    #[test]
    fn test_global_path_separates_default_from_named() {
        let opts = options();
        let path = ModulePath::derive(Path::new("/src/foo/baz.js"), &opts).unwrap();
        assert_eq!(path.global_path("default", &opts), "Xp.foo.baz.xposed_default");
        assert_eq!(path.global_path("a", &opts), "Xp.foo.baz.xposed.a");
    }
}
