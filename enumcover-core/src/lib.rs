//! enumcover-core: directive-driven exhaustiveness checking for named
//! constants in Rust code.
//!
//! A comment such as `// enumcover:Color` marks the syntax node that follows
//! it. The node is expected to reference every named constant of `Color`
//! (module-level consts, associated consts and fieldless enum variants); each
//! constant whose value it never mentions is reported.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use enumcover_core::prelude::*;
//! use std::path::Path;
//!
//! let report = check_crate(Path::new("/path/to/crate"), &EnumcoverConfig::default())?;
//! for diag in &report.diagnostics {
//!     println!("{}", format_diagnostic(diag, Some(&report.root)));
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`directive`]: directive grammar
//! - [`resolve`]: module paths, import tables and type name resolution
//! - [`index`]: lazily built index of named constants per type
//! - [`coverage`]: region analysis against the index
//! - [`syntax`]: syn-based host (comments, declarations, module graph, typing)
//! - [`check`]: check session, crate and workspace entry points
//! - [`scan`]: parallel file discovery
//! - [`error`]: typed error handling

pub mod check;
pub mod common;
pub mod config;
pub mod coverage;
pub mod diagnostics;
pub mod directive;
pub mod error;
pub mod index;
pub mod logging;
pub mod prelude;
pub mod report;
pub mod resolve;
pub mod scan;
pub mod syntax;
pub mod types;
pub mod workspace;

// Common trait re-exports
pub use common::GraphTraversal;

// ============================================================================
// Explicit Re-exports
// ============================================================================

// Error types
pub use error::{EnumcoverError, EnumcoverResult, IoResultExt};

// Configuration
pub use config::{load_config, EnumcoverConfig, OutputConfig, CONFIG_FILE};

// Logging
pub use logging::{init_structured_logging, log_error, log_info, log_warn};

// Core types
pub use types::{ConstDecl, ConstInit, NamedConstant, SourceSpan, TypeIdentity};

// Directives and diagnostics
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink};
pub use directive::{classify_comment, has_marker, CommentClass, MARKER};

// Resolution
pub use resolve::{
    resolve_type_name, ImportKind, ImportTable, ModulePathContext, Scope, SymbolTable,
    TypeResolution,
};

// Index and coverage
pub use coverage::{analyze, CoverageReport, ExprCategory, Region, TypedExpr};
pub use index::{ConstRegistry, EnumerationIndex, IndexStats};

// Syntax host
pub use syntax::attach::{scan_directives, Directive, DirectiveScan};
pub use syntax::graph::ModuleGraph;
pub use syntax::typing::ConstTypes;

// Entry points
pub use check::{check_crate, check_workspace, CheckSession, CrateReport};

// Reporting
pub use report::{format_diagnostic, print_json, print_plain, render_json};

// File scanning and workspace discovery
pub use scan::gather_rs_files;
pub use workspace::{
    find_all_crates, find_crate_root, is_workspace_root, read_package_info, PackageInfo,
};

#[cfg(test)]
mod tests;
