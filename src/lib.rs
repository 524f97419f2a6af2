//! # Export Exposer
//!
//! Rewrites a tree of ES-module files into assignments on a single global
//! namespace object. The object mirrors the directory layout below the
//! configured source root, so a tree like:
//!
//! foo
//! |-bar
//! | |-baz.js
//! |-abc.js
//!
//! is published as `window.Xp.foo.bar.baz` and `window.Xp.foo.abc` (for
//! expose root `Xp`). Each module object then holds one default export under
//! the configured default key and its named exports under the named key, so
//! the two can never collide with each other.
//!
//! The transform is a compile-time, per-file rewrite with no runtime of its
//! own: it injects one import of a `set(target, "a.b.c", value)`
//! path-assignment primitive and appends one `set` call per export,
//! immediately after the export it belongs to. It only ever appends leaves
//! to the namespace; the loader that later reads `window.Xp.*` back is the
//! consuming runtime's concern.
//!
//! Shorter container keys (such as `x` and `_`) shrink the generated code,
//! but then no file or directory under the source root may carry those
//! names — collision safety is a caller obligation, see `ExposeOptions`.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod cache;
mod compile;
mod discovery;
mod options;
mod paths;
mod rewrite;


pub use cache::{CacheEntry, IncrementalCache};
#[cfg(feature = "napi")]
pub use compile::expose_file_native;
// Internal Rust-to-Rust API for host pipelines embedding the crate directly
pub use compile::{expose_file_internal, ExportMapping, ExposeResult};
#[cfg(feature = "napi")]
pub use discovery::expose_directory_native;
pub use discovery::{expose_directory_internal, ExposeSummary};
pub use options::ExposeOptions;
pub use paths::ModulePath;

#[cfg(feature = "napi")]
#[napi]
pub fn expose_bridge() -> String {
    "Exposer Native Bridge Connected".to_string()
}
