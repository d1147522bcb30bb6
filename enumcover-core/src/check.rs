//! Check session: ties directive discovery, type resolution and coverage
//! analysis together for the files of one crate.

use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::common::GraphTraversal;
use crate::config::EnumcoverConfig;
use crate::coverage::analyze;
use crate::diagnostics::{CollectingSink, Diagnostic, DiagnosticSink};
use crate::directive::has_marker;
use crate::error::{EnumcoverError, EnumcoverResult, IoResultExt};
use crate::index::{EnumerationIndex, IndexStats};
use crate::resolve::{resolve_type_name, ModulePathContext, Scope};
use crate::scan::gather_rs_files;
use crate::syntax::attach::{scan_directives, Directive};
use crate::syntax::graph::ModuleGraph;
use crate::workspace::{find_all_crates, read_package_info, PackageInfo};

/// One check run over a crate. Owns the enumeration index shared by every
/// file checked through it.
pub struct CheckSession<'g> {
    graph: &'g ModuleGraph,
    index: EnumerationIndex,
}

impl<'g> CheckSession<'g> {
    pub fn new(graph: &'g ModuleGraph) -> Self {
        Self {
            graph,
            index: EnumerationIndex::new(),
        }
    }

    pub fn graph(&self) -> &ModuleGraph {
        self.graph
    }

    pub fn index(&self) -> &EnumerationIndex {
        &self.index
    }

    /// Check one file's source. Returns the number of directives checked.
    ///
    /// `path` locates the file inside the crate; it is made relative to the
    /// graph root to find the module the file defines.
    pub fn check_source(
        &self,
        path: &Path,
        content: &str,
        sink: &dyn DiagnosticSink,
    ) -> EnumcoverResult<usize> {
        if !has_marker(content) {
            return Ok(0);
        }

        let rel = path.strip_prefix(self.graph.root()).unwrap_or(path);
        let ctx = ModulePathContext::from_file_path(rel)
            .with_lib_name(self.graph.lib_name().map(str::to_string));
        let file = syn::parse_file(content).map_err(|e| EnumcoverError::from_syn(path, &e))?;

        let scan = scan_directives(&file, content, ctx, self.graph);
        for malformed in &scan.malformed {
            sink.report(Diagnostic::malformed_directive(path, malformed.span, &malformed.raw));
        }
        for directive in &scan.directives {
            self.check_directive(path, directive, sink);
        }
        Ok(scan.directives.len())
    }

    fn check_directive(&self, path: &Path, directive: &Directive, sink: &dyn DiagnosticSink) {
        let scope = Scope::new(&directive.ctx, &directive.imports);
        let resolution = resolve_type_name(&directive.token, scope, self.graph);
        if resolution.dot_import {
            sink.report(Diagnostic::dot_import(path, directive.node_span));
        }
        let target = resolution.identity;

        let mut roots = vec![directive.ctx.to_path()];
        if let Some(module) = target.module_path().filter(|m| self.graph.has_module(m)) {
            roots.push(module.to_string());
        }
        for root in &roots {
            self.index.ensure_closure(root, self.graph);
        }
        let closure = self.graph.reachable_from(roots);

        let report = analyze(&directive.region, &target, &self.index, &closure);
        debug!(
            path = %path.display(),
            target = %target,
            referenced = report.referenced.len(),
            missing = report.missing.len(),
            "directive analyzed"
        );

        if report.no_constants {
            sink.report(Diagnostic::no_constants(path, directive.node_span, &target));
            return;
        }
        for constant in &report.missing {
            sink.report(Diagnostic::unhandled_const(path, directive.node_span, constant));
        }
    }

    /// Read and check one file.
    pub fn check_file(&self, path: &Path, sink: &dyn DiagnosticSink) -> EnumcoverResult<usize> {
        let content = fs::read_to_string(path).with_path(path)?;
        self.check_source(path, &content, sink)
    }

    /// Check files in parallel. Files that fail to read or parse are logged
    /// and skipped. Returns how many files were checked.
    pub fn check_files(&self, files: &[PathBuf], sink: &dyn DiagnosticSink) -> usize {
        files
            .par_iter()
            .filter(|path| match self.check_file(path, sink) {
                Ok(_) => true,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping file");
                    false
                }
            })
            .count()
    }
}

/// Result of checking a single crate.
#[derive(Debug, Clone, Serialize)]
pub struct CrateReport {
    pub crate_name: String,
    pub root: PathBuf,
    pub files_checked: usize,
    /// Sorted by file, line and column.
    pub diagnostics: Vec<Diagnostic>,
    pub stats: IndexStats,
}

/// Check every source file of the crate at `root`.
pub fn check_crate(root: &Path, config: &EnumcoverConfig) -> EnumcoverResult<CrateReport> {
    if !root.is_dir() {
        return Err(EnumcoverError::invalid_argument(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let package = read_package_info(root).unwrap_or_else(|e| {
        debug!(root = %root.display(), error = %e, "no package manifest, using directory name");
        PackageInfo::from_dir(root)
    });

    // 1. Gather sources
    let files = gather_rs_files(root, &config.excluded_dirs())?;

    // 2. Module graph (parallel parse)
    let graph = ModuleGraph::build(root, &files, package.lib_name.as_deref());

    // 3. Check files against one shared index
    let session = CheckSession::new(&graph);
    let sink = CollectingSink::new();
    let files_checked = session.check_files(&files, &sink);

    info!(
        crate_name = %package.name,
        files = files_checked,
        modules = graph.module_count(),
        diagnostics = sink.len(),
        "crate checked"
    );

    Ok(CrateReport {
        crate_name: package.name,
        root: root.to_path_buf(),
        files_checked,
        diagnostics: sink.into_sorted(),
        stats: session.index().stats(),
    })
}

/// Check every member crate of the workspace at `root`.
///
/// A crate that fails to check is logged and left out of the result.
pub fn check_workspace(root: &Path, config: &EnumcoverConfig) -> EnumcoverResult<Vec<CrateReport>> {
    let crates = find_all_crates(root)?;
    if crates.is_empty() {
        warn!(root = %root.display(), "no crates found in workspace");
        return Ok(Vec::new());
    }
    info!(root = %root.display(), crates = crates.len(), "checking workspace");

    let mut reports: Vec<CrateReport> = crates
        .par_iter()
        .filter_map(|crate_root| match check_crate(crate_root, config) {
            Ok(report) => Some(report),
            Err(e) if e.is_recoverable() => {
                let at = e.path().unwrap_or(crate_root);
                warn!(crate_root = %crate_root.display(), path = %at.display(), error = %e, "crate skipped");
                None
            }
            Err(e) => {
                error!(crate_root = %crate_root.display(), error = %e, "crate failed");
                None
            }
        })
        .collect();
    reports.sort_by(|a, b| a.root.cmp(&b.root));
    Ok(reports)
}
