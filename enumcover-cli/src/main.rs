//! enumcover CLI - directive-driven exhaustiveness checker for Rust projects.
//!
//! Features:
//! - Automatic crate root detection
//! - Workspace-aware checking
//! - Rayon-powered parallel parsing and checking
//! - Plain `file:line:col: message` or JSON output
//! - CI-friendly exit codes: 0 clean, 1 findings, 2 fatal error

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::Path;

use enumcover_core::{
    check_crate, check_workspace, find_crate_root, init_structured_logging, is_workspace_root,
    load_config, log_error, log_info, log_warn, print_json, print_plain, Diagnostic,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Reports named constants an enumcover directive leaves unhandled")]
pub struct Cli {
    /// Path to the root of the Rust project
    #[arg(default_value = ".")]
    path: String,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Check the entire workspace (all member crates)
    #[arg(long)]
    workspace: bool,

    /// Directory names to skip, in addition to target/.git and enumcover.toml excludes
    #[arg(long, num_args = 1..)]
    exclude: Vec<String>,
}

fn main() {
    // Global panic guard
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] enumcover internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code 2.");
        std::process::exit(2);
    }));

    // Initialize structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            log_error(&format!("{:#}", e));
            eprintln!("[ERROR] {:#}", e);
            std::process::exit(2);
        }
    }
}

/// Check the requested crate or workspace and print the findings.
/// Returns the process exit code.
fn run(cli: &Cli) -> Result<i32> {
    let input_path = Path::new(&cli.path);
    if !input_path.exists() {
        return Err(anyhow!("Path does not exist: {}", cli.path));
    }

    // 1. Locate crate root
    let root = find_crate_root(input_path)
        .with_context(|| format!("Failed to find crate root from: {}", cli.path))?;

    // 2. Configuration (enumcover.toml + command line)
    let config = load_config(&root)
        .with_context(|| format!("Failed to load configuration at {}", root.display()))?
        .unwrap_or_default()
        .with_excludes(cli.exclude.iter().cloned());

    // 3. Check
    let diagnostics: Vec<Diagnostic> = if cli.workspace || is_workspace_root(&root) {
        let reports = check_workspace(&root, &config)
            .with_context(|| format!("Failed to check workspace at {}", root.display()))?;
        if reports.is_empty() {
            log_warn(&format!("no member crates found under {}", root.display()));
        } else {
            log_info(&format!("checked {} crate(s)", reports.len()));
        }
        reports.into_iter().flat_map(|r| r.diagnostics).collect()
    } else {
        check_crate(&root, &config)
            .with_context(|| format!("Failed to check crate at {}", root.display()))?
            .diagnostics
    };

    // 4. Report
    if cli.json || config.wants_json() {
        print_json(&diagnostics);
    } else {
        print_plain(&diagnostics, Some(&root));
    }

    Ok(exit_code(&diagnostics))
}

fn exit_code(diagnostics: &[Diagnostic]) -> i32 {
    if diagnostics.is_empty() {
        0
    } else {
        1
    }
}
