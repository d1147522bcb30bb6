//! Output formatting - plaintext and JSON.

use serde_json::json;
use std::path::Path;

use crate::diagnostics::Diagnostic;
use crate::error::{EnumcoverError, EnumcoverResult};

/// One diagnostic as `file:line:col: message`. Columns are printed 1-based.
pub fn format_diagnostic(diag: &Diagnostic, base: Option<&Path>) -> String {
    let file = base
        .and_then(|b| diag.file.strip_prefix(b).ok())
        .unwrap_or(&diag.file);
    format!(
        "{}:{}:{}: {}",
        file.display(),
        diag.span.line,
        diag.span.column + 1,
        diag.message
    )
}

/// Prints diagnostics in plain text format, followed by a summary line.
pub fn print_plain(diags: &[Diagnostic], base: Option<&Path>) {
    for diag in diags {
        println!("{}", format_diagnostic(diag, base));
    }
    if diags.is_empty() {
        println!("No enumcover issues found.");
    } else {
        println!("{} enumcover issue(s) found.", diags.len());
    }
}

/// Diagnostics as a JSON document: `{"diagnostics": [...], "count": n}`.
pub fn render_json(diags: &[Diagnostic]) -> EnumcoverResult<String> {
    serde_json::to_string_pretty(&json!({
        "diagnostics": diags,
        "count": diags.len(),
    }))
    .map_err(|e| EnumcoverError::internal(format!("JSON serialization failed: {}", e)))
}

/// Prints diagnostics in JSON format.
pub fn print_json(diags: &[Diagnostic]) {
    match render_json(diags) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!(error = %e, "falling back to compact output");
            println!("{{\"count\": {}}}", diags.len());
        }
    }
}
