//! Type name and path resolution.
//!
//! Turns the possibly-qualified names found in directives and expressions into
//! canonical module paths:
//! - `Color` → `crate::colors::Color` (via `use crate::colors::Color`)
//! - `sh.Kind` / `sh::Kind` → `crate::shapes::Kind` (via `use crate::shapes as sh`)
//! - `super::Kind` → `crate::Kind`
//!
//! Resolution never fails. Unknown names degrade to a path under the current
//! module (unqualified) or to the literal path (qualified, external crates),
//! which later finds no constants.

use std::path::{Component, Path};

use crate::directive::token_segments;
use crate::types::TypeIdentity;

/// Primitive type names, identified by their bare name.
pub const PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64",
    "i128", "isize", "f32", "f64",
];

pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

/// Join path segments with `::`.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("::")
}

/// Module's position in the crate hierarchy.
///
/// `root` is the path of the target root the module belongs to: `crate` for
/// the library (and `src/main.rs`), `bin::<name>` for extra binaries and
/// `tests::<name>` for integration tests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModulePathContext {
    pub root: String,
    /// Segments below the root.
    pub segments: Vec<String>,
    /// Library name of the package (`my-crate` → `my_crate`), which refers to
    /// `crate` when used as a path's first segment.
    pub lib_name: Option<String>,
}

impl Default for ModulePathContext {
    fn default() -> Self {
        Self::crate_root()
    }
}

impl ModulePathContext {
    pub fn crate_root() -> Self {
        Self {
            root: "crate".to_string(),
            segments: Vec::new(),
            lib_name: None,
        }
    }

    /// Create context from a file path relative to the crate root.
    ///
    /// - `src/lib.rs`, `src/main.rs` → `crate`
    /// - `src/api/mod.rs` → `crate::api`
    /// - `src/api/v1/handler.rs` → `crate::api::v1::handler`
    /// - `src/bin/tool.rs`, `src/bin/tool/main.rs` → `bin::tool`
    /// - `tests/smoke.rs` → `tests::smoke`
    pub fn from_file_path(path: &Path) -> Self {
        let parts: Vec<String> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let (root, rest) = match parts.iter().position(|p| p == "src") {
            Some(i) if parts.get(i + 1).map(String::as_str) == Some("bin") && parts.len() > i + 2 => {
                let name = strip_rs(&parts[i + 2]);
                (format!("bin::{}", name), &parts[i + 3..])
            }
            Some(i) => ("crate".to_string(), &parts[i + 1..]),
            None => match parts.iter().position(|p| p == "tests" || p == "benches") {
                Some(i) if parts.len() > i + 1 => {
                    let name = strip_rs(&parts[i + 1]);
                    (format!("{}::{}", parts[i], name), &parts[i + 2..])
                }
                _ => (
                    "crate".to_string(),
                    parts.last().map(std::slice::from_ref).unwrap_or(&[]),
                ),
            },
        };

        let segments = rest
            .iter()
            .filter(|p| !matches!(p.as_str(), "mod.rs" | "lib.rs" | "main.rs"))
            .map(|p| strip_rs(p))
            .collect();

        Self {
            root,
            segments,
            lib_name: None,
        }
    }

    pub fn with_lib_name(mut self, lib_name: Option<String>) -> Self {
        self.lib_name = lib_name;
        self
    }

    /// Context of a child module (`mod name;` or `mod name { }`).
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self {
            root: self.root.clone(),
            segments,
            lib_name: self.lib_name.clone(),
        }
    }

    /// Parent module (for `super::`). The root is its own parent.
    pub fn parent(&self) -> Self {
        let mut parent = self.clone();
        parent.segments.pop();
        parent
    }

    /// Fully qualified module path, e.g. `crate::api::v1`.
    pub fn to_path(&self) -> String {
        if self.segments.is_empty() {
            self.root.clone()
        } else {
            format!("{}::{}", self.root, self.segments.join("::"))
        }
    }

    /// `<module path>::<name>`
    pub fn qualify(&self, name: &str) -> String {
        format!("{}::{}", self.to_path(), name)
    }

    fn is_lib_name(&self, segment: &str) -> bool {
        self.lib_name.as_deref() == Some(segment)
    }
}

fn strip_rs(part: &str) -> String {
    part.strip_suffix(".rs").unwrap_or(part).to_string()
}

/// What an import table entry brings into scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `use a::b::Name;` or `use a::b::Name as Alias;`
    Named,
    /// `use a::b::*;`, keyed by the last segment of `a::b`.
    Glob,
    /// `mod name;` or `mod name { }`
    Module,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    /// Name the entry is looked up by.
    pub key: String,
    /// Canonical path of the imported item (for globs, of the module).
    pub target: String,
    pub kind: ImportKind,
}

/// Names a module brings into scope, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    entries: Vec<ImportEntry>,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: impl Into<String>, target: impl Into<String>, kind: ImportKind) {
        self.entries.push(ImportEntry {
            key: key.into(),
            target: target.into(),
            kind,
        });
    }

    /// Last entry (in declaration order) with this key, of any kind.
    pub fn lookup(&self, key: &str) -> Option<&ImportEntry> {
        self.entries.iter().rev().find(|e| e.key == key)
    }

    /// Last non-glob entry with this key.
    pub fn named(&self, key: &str) -> Option<&ImportEntry> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.key == key && e.kind != ImportKind::Glob)
    }

    /// Glob entries in reverse declaration order.
    pub fn globs_rev(&self) -> impl Iterator<Item = &ImportEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.kind == ImportKind::Glob)
    }

    pub fn entries(&self) -> &[ImportEntry] {
        &self.entries
    }
}

/// Which canonical paths name types, constants and modules.
pub trait SymbolTable {
    fn is_type(&self, path: &str) -> bool;
    fn is_constant(&self, path: &str) -> bool;
    fn is_module(&self, path: &str) -> bool;
}

/// A symbol table that knows nothing. Resolution then relies on imports only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSymbols;

impl SymbolTable for NoSymbols {
    fn is_type(&self, _path: &str) -> bool {
        false
    }
    fn is_constant(&self, _path: &str) -> bool {
        false
    }
    fn is_module(&self, _path: &str) -> bool {
        false
    }
}

/// Outcome of resolving a directive's type token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeResolution {
    pub identity: TypeIdentity,
    /// The qualifier resolved through a glob import; `identity` is then the
    /// bare local type name.
    pub dot_import: bool,
}

/// Scope a name is resolved in: the owning module and its imports.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub ctx: &'a ModulePathContext,
    pub imports: &'a ImportTable,
}

impl<'a> Scope<'a> {
    pub fn new(ctx: &'a ModulePathContext, imports: &'a ImportTable) -> Self {
        Self { ctx, imports }
    }
}

enum Lookup {
    Known(String),
    Glob,
    Unknown,
}

/// Resolve the base path of a qualified path's leading segments.
///
/// Consumes `crate`/`self`/`super` chains and the first named segment.
/// Returns the base path and how many segments were consumed.
fn resolve_head(
    segs: &[&str],
    scope: Scope<'_>,
    symbols: &dyn SymbolTable,
) -> (Lookup, usize) {
    let ctx = scope.ctx;
    match segs[0] {
        "crate" => return (Lookup::Known(ctx.root.clone()), 1),
        "self" => return (Lookup::Known(ctx.to_path()), 1),
        "super" => {
            let mut module = ctx.parent();
            let mut used = 1;
            while segs.get(used) == Some(&"super") {
                module = module.parent();
                used += 1;
            }
            return (Lookup::Known(module.to_path()), used);
        }
        _ => {}
    }

    let first = segs[0];
    if let Some(entry) = scope.imports.lookup(first) {
        return match entry.kind {
            ImportKind::Glob => (Lookup::Glob, 1),
            _ => (Lookup::Known(entry.target.clone()), 1),
        };
    }
    if ctx.is_lib_name(first) {
        return (Lookup::Known("crate".to_string()), 1);
    }

    let local = ctx.qualify(first);
    if symbols.is_type(&local) || symbols.is_module(&local) {
        return (Lookup::Known(local), 1);
    }
    for glob in scope.imports.globs_rev() {
        let candidate = format!("{}::{}", glob.target, first);
        if symbols.is_type(&candidate) {
            return (Lookup::Known(candidate), 1);
        }
    }
    (Lookup::Unknown, 0)
}

/// Resolve a single name against imports, the current module and globs.
///
/// `known` decides whether a candidate path names the kind of item looked for.
fn resolve_single(name: &str, scope: Scope<'_>, known: impl Fn(&str) -> bool) -> String {
    if let Some(entry) = scope.imports.named(name) {
        return entry.target.clone();
    }
    let local = scope.ctx.qualify(name);
    if known(&local) {
        return local;
    }
    for glob in scope.imports.globs_rev() {
        let candidate = format!("{}::{}", glob.target, name);
        if known(&candidate) {
            return candidate;
        }
    }
    local
}

/// Resolve a directive type token to a canonical type identity.
pub fn resolve_type_name(
    token: &str,
    scope: Scope<'_>,
    symbols: &dyn SymbolTable,
) -> TypeResolution {
    let segs = token_segments(token);
    match segs.as_slice() {
        [] => TypeResolution {
            identity: TypeIdentity::new(token),
            dot_import: false,
        },
        [name] => {
            let identity = if is_primitive(name) {
                TypeIdentity::new(*name)
            } else {
                TypeIdentity::new(resolve_single(name, scope, |p| symbols.is_type(p)))
            };
            TypeResolution {
                identity,
                dot_import: false,
            }
        }
        _ => {
            let (head, used) = resolve_head(&segs, scope, symbols);
            match head {
                Lookup::Glob => TypeResolution {
                    identity: TypeIdentity::new(segs[segs.len() - 1]),
                    dot_import: true,
                },
                Lookup::Known(base) => TypeResolution {
                    identity: TypeIdentity::new(append(&base, &segs[used..])),
                    dot_import: false,
                },
                Lookup::Unknown => TypeResolution {
                    identity: TypeIdentity::new(join_path(&segs)),
                    dot_import: false,
                },
            }
        }
    }
}

/// Resolve a type path written in code (annotations, casts, constructors).
pub fn resolve_type_path(segs: &[&str], scope: Scope<'_>, symbols: &dyn SymbolTable) -> String {
    match segs {
        [] => String::new(),
        [name] if is_primitive(name) => (*name).to_string(),
        [name] => resolve_single(name, scope, |p| symbols.is_type(p)),
        _ => resolve_qualified(segs, scope, symbols),
    }
}

/// Resolve a value path (a constant reference) written in code.
pub fn resolve_value_path(segs: &[&str], scope: Scope<'_>, symbols: &dyn SymbolTable) -> String {
    match segs {
        [] => String::new(),
        [name] => resolve_single(name, scope, |p| symbols.is_constant(p)),
        _ => resolve_qualified(segs, scope, symbols),
    }
}

/// Resolve a `use` path. Only the leading segment is looked up.
pub fn resolve_use_path(segs: &[&str], scope: Scope<'_>) -> String {
    if segs.is_empty() {
        return scope.ctx.to_path();
    }
    resolve_qualified(segs, scope, &NoSymbols)
}

fn resolve_qualified(segs: &[&str], scope: Scope<'_>, symbols: &dyn SymbolTable) -> String {
    match resolve_head(segs, scope, symbols) {
        (Lookup::Known(base), used) => append(&base, &segs[used..]),
        // A glob keyed by the qualifier: the module the glob imports from.
        (Lookup::Glob, used) => match scope.imports.lookup(segs[0]) {
            Some(entry) => append(&entry.target, &segs[used..]),
            None => join_path(segs),
        },
        (Lookup::Unknown, _) => join_path(segs),
    }
}

fn append(base: &str, rest: &[&str]) -> String {
    if rest.is_empty() {
        base.to_string()
    } else {
        format!("{}::{}", base, join_path(rest))
    }
}
