//! Crate module graph and constant registry.
//!
//! Built once per run, before any directive is checked:
//! 1. every file is parsed in parallel into raw per-module declarations
//! 2. the set of known types, modules and constants is assembled
//! 3. owner types, constant paths and alias initializers are resolved
//!    against that set, and dependency edges are added for `mod` children,
//!    `use` targets and every path a constant declaration refers to
//!
//! The graph is immutable afterwards and shared across checking threads.

use petgraph::graph::{DiGraph, NodeIndex};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::decls::{parse_module_file, RawInit, RawModule};
use super::typing::ConstTypes;
use crate::common::GraphTraversal;
use crate::index::ConstRegistry;
use crate::resolve::{resolve_type_path, resolve_value_path, Scope, SymbolTable};
use crate::types::{ConstDecl, ConstInit, TypeIdentity};

/// Canonical paths of every known type, constant and module.
#[derive(Debug, Clone, Default)]
struct KnownSymbols {
    types: HashSet<String>,
    consts: HashSet<String>,
    modules: HashSet<String>,
}

impl SymbolTable for KnownSymbols {
    fn is_type(&self, path: &str) -> bool {
        self.types.contains(path)
    }
    fn is_constant(&self, path: &str) -> bool {
        self.consts.contains(path)
    }
    fn is_module(&self, path: &str) -> bool {
        self.modules.contains(path)
    }
}

/// Module dependency graph of one crate, with the constants each module
/// declares.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    root: PathBuf,
    lib_name: Option<String>,
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
    consts: HashMap<String, Vec<ConstDecl>>,
    const_types: HashMap<String, TypeIdentity>,
    symbols: KnownSymbols,
}

impl ModuleGraph {
    /// Parse `files` in parallel and build the graph.
    ///
    /// Files that cannot be read or parsed are logged and contribute no
    /// module.
    pub fn build(root: &Path, files: &[PathBuf], lib_name: Option<&str>) -> Self {
        let raw: Vec<RawModule> = files
            .par_iter()
            .filter_map(|file| {
                let content = match fs::read_to_string(file) {
                    Ok(c) => c,
                    Err(e) => {
                        warn!(path = %file.display(), error = %e, "skipping unreadable file");
                        return None;
                    }
                };
                let rel = file.strip_prefix(root).unwrap_or(file);
                match parse_module_file(rel, file, &content, lib_name) {
                    Ok(mods) => Some(mods),
                    Err(e) => {
                        warn!(path = %file.display(), error = %e, "skipping unparsable file");
                        None
                    }
                }
            })
            .flatten()
            .collect();

        Self::from_modules(root, lib_name, raw)
    }

    /// Build the graph from already parsed modules.
    pub fn from_modules(root: &Path, lib_name: Option<&str>, mut raw: Vec<RawModule>) -> Self {
        // Deterministic declaration order regardless of parse scheduling.
        raw.sort_by(|a, b| (&a.file, a.ctx.to_path()).cmp(&(&b.file, b.ctx.to_path())));

        let mut symbols = KnownSymbols::default();
        for m in &raw {
            symbols.modules.insert(m.ctx.to_path());
            for ty in &m.types {
                symbols.types.insert(m.ctx.qualify(ty));
            }
        }

        // Constant paths need resolved parent types.
        let const_paths: Vec<Vec<String>> = raw
            .iter()
            .map(|m| {
                let scope = Scope::new(&m.ctx, &m.imports);
                m.consts
                    .iter()
                    .map(|c| match &c.parent {
                        Some(parent) => {
                            let segs: Vec<&str> = parent.iter().map(String::as_str).collect();
                            format!("{}::{}", resolve_type_path(&segs, scope, &symbols), c.name)
                        }
                        None => m.ctx.qualify(&c.name),
                    })
                    .collect()
            })
            .collect();
        symbols
            .consts
            .extend(const_paths.iter().flatten().cloned());

        let mut graph = ModuleGraph {
            root: root.to_path_buf(),
            lib_name: lib_name.map(String::from),
            ..Default::default()
        };
        for module in &symbols.modules {
            graph.node(module);
        }

        let mut edges: BTreeSet<(String, String)> = BTreeSet::new();
        for (m, paths) in raw.iter().zip(const_paths) {
            let from = m.ctx.to_path();
            let scope = Scope::new(&m.ctx, &m.imports);
            let mut refs: Vec<String> = m.children.clone();
            refs.extend(m.imports.entries().iter().map(|e| e.target.clone()));

            for (c, path) in m.consts.iter().zip(paths) {
                let owner_segs: Vec<&str> = c.owner.iter().map(String::as_str).collect();
                let owner = TypeIdentity::new(resolve_type_path(&owner_segs, scope, &symbols));
                let init = match &c.init {
                    RawInit::Literal(v) => ConstInit::Literal(v.clone()),
                    RawInit::Opaque(t) => ConstInit::Opaque(t.clone()),
                    RawInit::Path(segs) => {
                        let segs: Vec<&str> = segs.iter().map(String::as_str).collect();
                        let target = resolve_value_path(&segs, scope, &symbols);
                        refs.push(target.clone());
                        ConstInit::Alias(target)
                    }
                };
                refs.push(owner.as_str().to_string());

                graph.const_types.insert(path.clone(), owner.clone());
                graph.consts.entry(from.clone()).or_default().push(ConstDecl {
                    name: c.name.clone(),
                    path,
                    owner,
                    init,
                    file: m.file.clone(),
                    line: c.line,
                });
            }

            for target in refs {
                if let Some(dep) = module_prefix(&target, &symbols.modules) {
                    if dep != from {
                        edges.insert((from.clone(), dep.to_string()));
                    }
                }
            }
        }

        for (from, to) in edges {
            let a = graph.node(&from);
            let b = graph.node(&to);
            graph.graph.add_edge(a, b, ());
        }
        graph.symbols = symbols;

        debug!(
            modules = graph.module_count(),
            constants = graph.constant_count(),
            edges = graph.graph.edge_count(),
            "module graph built"
        );
        graph
    }

    fn node(&mut self, module: &str) -> NodeIndex {
        if let Some(idx) = self.nodes.get(module) {
            return *idx;
        }
        let idx = self.graph.add_node(module.to_string());
        self.nodes.insert(module.to_string(), idx);
        idx
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn lib_name(&self) -> Option<&str> {
        self.lib_name.as_deref()
    }

    pub fn module_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn constant_count(&self) -> usize {
        self.const_types.len()
    }

    pub fn has_module(&self, module: &str) -> bool {
        self.nodes.contains_key(module)
    }

    /// Direct dependencies of a module, sorted.
    pub fn dependencies(&self, module: &str) -> Vec<String> {
        let mut deps = self.neighbors(&module.to_string());
        deps.sort();
        deps
    }
}

/// Longest known module path that is a prefix of `path` (or `path` itself).
fn module_prefix<'a>(path: &'a str, modules: &HashSet<String>) -> Option<&'a str> {
    let mut candidate = path;
    loop {
        if modules.contains(candidate) {
            return Some(candidate);
        }
        candidate = candidate.rsplit_once("::")?.0;
    }
}

impl GraphTraversal for ModuleGraph {
    type Node = String;

    fn neighbors(&self, node: &String) -> Vec<String> {
        match self.nodes.get(node) {
            Some(idx) => self
                .graph
                .neighbors(*idx)
                .map(|n| self.graph[n].clone())
                .collect(),
            None => Vec::new(),
        }
    }

    fn contains_node(&self, node: &String) -> bool {
        self.nodes.contains_key(node)
    }
}

impl SymbolTable for ModuleGraph {
    fn is_type(&self, path: &str) -> bool {
        self.symbols.is_type(path)
    }
    fn is_constant(&self, path: &str) -> bool {
        self.symbols.is_constant(path)
    }
    fn is_module(&self, path: &str) -> bool {
        self.symbols.is_module(path)
    }
}

impl ConstTypes for ModuleGraph {
    fn type_of_constant(&self, path: &str) -> Option<TypeIdentity> {
        self.const_types.get(path).cloned()
    }
}

impl ConstRegistry for ModuleGraph {
    fn declared_constants(&self, module: &str) -> &[ConstDecl] {
        self.consts.get(module).map(Vec::as_slice).unwrap_or(&[])
    }
}
