//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use enumcover_core::prelude::*;
//! ```

// Core types
pub use crate::error::{EnumcoverError, EnumcoverResult};
pub use crate::diagnostics::{CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink};
pub use crate::types::{NamedConstant, SourceSpan, TypeIdentity};

// Checking
pub use crate::check::{check_crate, check_workspace, CheckSession, CrateReport};
pub use crate::syntax::graph::ModuleGraph;

// Configuration
pub use crate::config::{load_config, EnumcoverConfig};

// Reporting
pub use crate::report::{format_diagnostic, print_json, print_plain};
