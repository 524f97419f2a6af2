//! Source-tree driver for the Export Exposer
//!
//! Walks the configured source root, transforms every module file in
//! parallel, and writes the results under an output directory preserving the
//! relative layout. A failure in one file is reported and skipped; the rest
//! of the run continues.

#[cfg(feature = "napi")]
use napi_derive::napi;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cache::IncrementalCache;
use crate::compile::{expose_file_internal, ExportMapping};
use crate::options::ExposeOptions;

const SOURCE_EXTENSIONS: [&str; 3] = ["js", "mjs", "jsx"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct ExposeSummary {
    pub files_processed: u32,
    pub files_skipped: u32,
    pub mappings: Vec<ExportMapping>,
}

pub fn expose_directory_internal(
    options: &ExposeOptions,
    out_dir: &str,
    use_cache: bool,
) -> Result<ExposeSummary, String> {
    options.validate()?;
    let root = Path::new(&options.source_root);
    if !root.is_dir() {
        return Err(format!(
            "Source root is not a directory: {}",
            options.source_root
        ));
    }

    let files = find_source_files(root);
    let cache = if use_cache {
        Some(IncrementalCache::new())
    } else {
        None
    };
    let out_root = Path::new(out_dir);

    let outcomes: Vec<Result<Vec<ExportMapping>, String>> = files
        .par_iter()
        .map(|file| process_file(file, root, out_root, options, cache.as_ref()))
        .collect();

    let mut summary = ExposeSummary {
        files_processed: 0,
        files_skipped: 0,
        mappings: Vec::new(),
    };
    for outcome in outcomes {
        match outcome {
            Ok(mappings) => {
                summary.files_processed += 1;
                summary.mappings.extend(mappings);
            }
            Err(e) => {
                eprintln!("[ExposerNative] {}", e);
                summary.files_skipped += 1;
            }
        }
    }
    Ok(summary)
}

/// Recursively find all module files under a directory
fn find_source_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true).into_iter().flatten() {
        let path = entry.path();
        if path.is_file() {
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                if SOURCE_EXTENSIONS.contains(&ext) {
                    files.push(path.to_path_buf());
                }
            }
        }
    }

    files
}

fn process_file(
    file: &Path,
    root: &Path,
    out_root: &Path,
    options: &ExposeOptions,
    cache: Option<&IncrementalCache>,
) -> Result<Vec<ExportMapping>, String> {
    let source =
        fs::read_to_string(file).map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
    let path_str = file.to_string_lossy().to_string();

    let (code, mappings) = match cache.and_then(|c| c.get(&path_str, &source)) {
        Some(entry) => (entry.code, entry.mappings),
        None => {
            let result = expose_file_internal(&path_str, &source, options);
            if !result.errors.is_empty() {
                return Err(format!(
                    "Failed to transform {}: {}",
                    file.display(),
                    result.errors.join("; ")
                ));
            }
            if let Some(c) = cache {
                c.set(&path_str, &source, result.code.clone(), result.mappings.clone());
            }
            (result.code, result.mappings)
        }
    };

    let relative = file
        .strip_prefix(root)
        .map_err(|_| format!("File escaped source root: {}", file.display()))?;
    let out_path = out_root.join(relative);
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }
    fs::write(&out_path, code)
        .map_err(|e| format!("Failed to write {}: {}", out_path.display(), e))?;
    Ok(mappings)
}

#[cfg(feature = "napi")]
#[napi]
pub fn expose_directory_native(
    options_json: String,
    out_dir: String,
    use_cache: bool,
) -> napi::Result<ExposeSummary> {
    let options: ExposeOptions = serde_json::from_str(&options_json)
        .map_err(|e| napi::Error::from_reason(format!("Options parse error: {}", e)))?;
    expose_directory_internal(&options, &out_dir, use_cache).map_err(napi::Error::from_reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expose_directory_preserves_layout() {
        let base = std::env::temp_dir().join(format!("exposer-discovery-{}", std::process::id()));
        fs::remove_dir_all(&base).ok();
        let src = base.join("src");
        fs::create_dir_all(src.join("foo")).unwrap();
        fs::write(src.join("foo").join("foo.js"), "export const a = 1;\n").unwrap();
        fs::write(src.join("bar.js"), "export default 42;\n").unwrap();
        fs::write(src.join("notes.txt"), "not a module\n").unwrap();

        let options = ExposeOptions {
            expose_root: "Xp".to_string(),
            source_root: src.to_string_lossy().to_string(),
            global_object: "window".to_string(),
            named_key: "xposed".to_string(),
            default_key: "xposed_default".to_string(),
            collapse_duplicate: true,
            set_package: "lodash-es/set".to_string(),
            log_mapping: false,
        };
        let out = base.join("out");
        let summary =
            expose_directory_internal(&options, out.to_str().unwrap(), false).unwrap();

        assert_eq!(summary.files_processed, 2);
        assert_eq!(summary.files_skipped, 0);

        let foo_out = fs::read_to_string(out.join("foo").join("foo.js")).unwrap();
        assert!(foo_out.contains("Xp.foo.xposed.a"));
        let bar_out = fs::read_to_string(out.join("bar.js")).unwrap();
        assert!(bar_out.contains("Xp.bar.xposed_default"));
        assert!(!out.join("notes.txt").exists());

        assert!(summary
            .mappings
            .iter()
            .any(|m| m.global_path == "Xp.foo.xposed.a" && m.export_name == "a"));

        fs::remove_dir_all(&base).ok();
    }
}
