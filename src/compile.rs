//! Per-file orchestration for the Export Exposer
//!
//! One pass per file: derive the module path (or mark the file disabled),
//! parse, rewrite, print. Files outside the source root come back
//! byte-identical, without even being parsed.

#[cfg(feature = "napi")]
use napi_derive::napi;
use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_span::SourceType;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::options::ExposeOptions;
use crate::paths::ModulePath;
use crate::rewrite::ExportExposer;

/// One produced mapping: which export landed on which dotted global path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct ExportMapping {
    pub export_name: String,
    pub global_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct ExposeResult {
    /// Transformed source, or the input unchanged when disabled or on error.
    pub code: String,
    pub mappings: Vec<ExportMapping>,
    /// True when the file lies outside the source root.
    pub disabled: bool,
    /// Parse errors the host pipeline should surface as compilation failures.
    pub errors: Vec<String>,
}

pub fn expose_file_internal(filename: &str, source: &str, options: &ExposeOptions) -> ExposeResult {
    let file = Path::new(filename);
    let module_path = match ModulePath::derive(file, options) {
        Some(path) => path,
        None => {
            return ExposeResult {
                code: source.to_string(),
                mappings: Vec::new(),
                disabled: true,
                errors: Vec::new(),
            }
        }
    };

    let allocator = Allocator::default();
    let source_type = SourceType::default().with_module(true).with_jsx(true);
    let parser = Parser::new(&allocator, source, source_type);
    let ret = parser.parse();
    if !ret.errors.is_empty() {
        let errors = ret
            .errors
            .iter()
            .map(|e| format!("{}: {:?}", filename, e))
            .collect();
        return ExposeResult {
            code: source.to_string(),
            mappings: Vec::new(),
            disabled: false,
            errors,
        };
    }

    let mut program = ret.program;
    let mut exposer = ExportExposer::new(&allocator, options, &module_path, &program);
    exposer.rewrite(&mut program, file);
    let code = Codegen::new().build(&program).code;

    ExposeResult {
        code,
        mappings: exposer.mappings,
        disabled: false,
        errors: Vec::new(),
    }
}

#[cfg(feature = "napi")]
#[napi]
pub fn expose_file_native(
    filename: String,
    source: String,
    options_json: String,
) -> napi::Result<ExposeResult> {
    let options: ExposeOptions = serde_json::from_str(&options_json)
        .map_err(|e| napi::Error::from_reason(format!("Options parse error: {}", e)))?;
    options.validate().map_err(napi::Error::from_reason)?;
    Ok(expose_file_internal(&filename, &source, &options))
}
