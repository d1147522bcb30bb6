//! Declaration extraction from Rust AST.
//!
//! For every module of a file (the file module and each inline `mod x { }`)
//! collects:
//! - the import table (`use` items and `mod` declarations)
//! - declared type names
//! - named constant declarations with their raw, unresolved paths:
//!   `const NAME: T = ...`, associated consts in `impl T`, and fieldless
//!   enum variants
//!
//! Paths stay unresolved here; the module graph resolves them once every
//! file of the crate is known.

use std::path::{Path, PathBuf};
use syn::{Expr, Fields, ImplItem, Item, ItemEnum, ItemImpl, UseTree};

use super::{declared_type_segments, literal_expr_value, path_segments, span_of, span_text};
use crate::error::{EnumcoverError, EnumcoverResult};
use crate::resolve::{resolve_use_path, ImportKind, ImportTable, ModulePathContext, Scope};

/// Constant initializer before path resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInit {
    Literal(String),
    /// Path to another constant, as written (with `Self` substituted).
    Path(Vec<String>),
    Opaque(String),
}

/// A named constant before path resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawConst {
    pub name: String,
    /// Type path the constant is declared under (associated consts and enum
    /// variants); `None` for module-level constants.
    pub parent: Option<Vec<String>>,
    /// Declared type path.
    pub owner: Vec<String>,
    pub init: RawInit,
    pub line: usize,
}

/// Everything one module declares, unresolved.
#[derive(Debug, Clone)]
pub struct RawModule {
    pub ctx: ModulePathContext,
    pub file: PathBuf,
    pub imports: ImportTable,
    /// Canonical paths of child modules.
    pub children: Vec<String>,
    /// Local names of declared types.
    pub types: Vec<String>,
    pub consts: Vec<RawConst>,
}

/// Parse a source file into its modules.
///
/// `rel_path` (relative to the crate root) determines the module path;
/// `file` is recorded on every declaration.
pub fn parse_module_file(
    rel_path: &Path,
    file: &Path,
    content: &str,
    lib_name: Option<&str>,
) -> EnumcoverResult<Vec<RawModule>> {
    let ast = syn::parse_file(content).map_err(|e| EnumcoverError::from_syn(file, &e))?;
    let ctx = ModulePathContext::from_file_path(rel_path).with_lib_name(lib_name.map(String::from));
    let mut out = Vec::new();
    collect_module(&ast.items, ctx, file, content, &mut out);
    Ok(out)
}

fn collect_module(
    items: &[Item],
    ctx: ModulePathContext,
    file: &Path,
    content: &str,
    out: &mut Vec<RawModule>,
) {
    let mut module = RawModule {
        imports: collect_imports(items, &ctx),
        ctx,
        file: file.to_path_buf(),
        children: Vec::new(),
        types: Vec::new(),
        consts: Vec::new(),
    };

    for item in items {
        match item {
            Item::Mod(m) => {
                let name = m.ident.to_string();
                module.children.push(module.ctx.qualify(&name));
                if let Some((_, inner)) = &m.content {
                    collect_module(inner, module.ctx.child(&name), file, content, out);
                }
            }
            Item::Struct(s) => module.types.push(s.ident.to_string()),
            Item::Union(u) => module.types.push(u.ident.to_string()),
            Item::Type(t) => module.types.push(t.ident.to_string()),
            Item::Enum(e) => {
                module.types.push(e.ident.to_string());
                collect_variants(e, content, &mut module.consts);
            }
            Item::Const(c) => {
                let name = c.ident.to_string();
                if name == "_" {
                    continue;
                }
                if let Some(owner) = declared_type_segments(&c.ty) {
                    module.consts.push(RawConst {
                        name,
                        parent: None,
                        owner,
                        init: classify_init(&c.expr, None, content),
                        line: c.ident.span().start().line,
                    });
                }
            }
            Item::Impl(imp) => collect_impl_consts(imp, content, &mut module.consts),
            _ => {}
        }
    }

    out.push(module);
}

fn collect_variants(e: &ItemEnum, content: &str, consts: &mut Vec<RawConst>) {
    // `self::Name` resolves to the enum in the declaring module.
    let owner = vec!["self".to_string(), e.ident.to_string()];
    for variant in &e.variants {
        if !matches!(variant.fields, Fields::Unit) {
            continue;
        }
        let name = variant.ident.to_string();
        let init = match &variant.discriminant {
            Some((_, expr)) => classify_init(expr, Some(&owner), content),
            None => RawInit::Literal(name.clone()),
        };
        consts.push(RawConst {
            name,
            parent: Some(owner.clone()),
            owner: owner.clone(),
            init,
            line: variant.ident.span().start().line,
        });
    }
}

fn collect_impl_consts(imp: &ItemImpl, content: &str, consts: &mut Vec<RawConst>) {
    let Some(self_segs) = declared_type_segments(&imp.self_ty) else {
        return;
    };
    for item in &imp.items {
        let ImplItem::Const(c) = item else {
            continue;
        };
        let Some(owner) = declared_type_segments(&c.ty) else {
            continue;
        };
        consts.push(RawConst {
            name: c.ident.to_string(),
            parent: Some(self_segs.clone()),
            owner: substitute_self(owner, &self_segs),
            init: classify_init(&c.expr, Some(&self_segs), content),
            line: c.ident.span().start().line,
        });
    }
}

/// Replace a leading `Self` segment with the impl's self type path.
pub fn substitute_self(segs: Vec<String>, self_segs: &[String]) -> Vec<String> {
    match segs.split_first() {
        Some((first, rest)) if first == "Self" => {
            let mut out = self_segs.to_vec();
            out.extend_from_slice(rest);
            out
        }
        _ => segs,
    }
}

/// Classify a constant initializer.
///
/// A newtype constructor around a literal (`Color("r")`) counts as a literal.
pub fn classify_init(expr: &Expr, self_segs: Option<&[String]>, content: &str) -> RawInit {
    if let Some(value) = literal_expr_value(expr) {
        return RawInit::Literal(value);
    }
    match expr {
        Expr::Paren(p) => classify_init(&p.expr, self_segs, content),
        Expr::Group(g) => classify_init(&g.expr, self_segs, content),
        Expr::Call(call) if call.args.len() == 1 && matches!(*call.func, Expr::Path(_)) => {
            match call.args.first().and_then(literal_expr_value) {
                Some(value) => RawInit::Literal(value),
                None => RawInit::Opaque(span_text(content, span_of(expr))),
            }
        }
        Expr::Path(p) if p.qself.is_none() => {
            let segs = path_segments(&p.path);
            RawInit::Path(match self_segs {
                Some(s) => substitute_self(segs, s),
                None => segs,
            })
        }
        _ => RawInit::Opaque(span_text(content, span_of(expr))),
    }
}

/// Build the import table of a module from its items.
///
/// `mod` declarations are recorded first so `use` paths can start with a
/// child module name.
pub fn collect_imports(items: &[Item], ctx: &ModulePathContext) -> ImportTable {
    let mut mods = ImportTable::new();
    for item in items {
        if let Item::Mod(m) = item {
            let name = m.ident.to_string();
            mods.record(name.clone(), ctx.qualify(&name), ImportKind::Module);
        }
    }

    let mut table = mods.clone();
    for item in items {
        if let Item::Use(u) = item {
            let scope = Scope::new(ctx, &mods);
            handle_use_tree(&u.tree, scope, &mut table, Vec::new());
        }
    }
    table
}

/// Recursively process a use tree, recording every imported name.
fn handle_use_tree(tree: &UseTree, scope: Scope<'_>, table: &mut ImportTable, mut prefix: Vec<String>) {
    match tree {
        UseTree::Path(p) => {
            prefix.push(p.ident.to_string());
            handle_use_tree(&p.tree, scope, table, prefix);
        }
        UseTree::Name(n) => {
            let name = n.ident.to_string();
            // `use a::b::{self}` imports `b`.
            let key = if name == "self" {
                match prefix.last() {
                    Some(last) => last.clone(),
                    None => return,
                }
            } else {
                prefix.push(name.clone());
                name
            };
            table.record(key, resolve(&prefix, scope), ImportKind::Named);
        }
        UseTree::Rename(r) => {
            let alias = r.rename.to_string();
            if alias == "_" {
                return;
            }
            if r.ident != "self" {
                prefix.push(r.ident.to_string());
            }
            table.record(alias, resolve(&prefix, scope), ImportKind::Named);
        }
        UseTree::Group(g) => {
            for t in &g.items {
                handle_use_tree(t, scope, table, prefix.clone());
            }
        }
        UseTree::Glob(_) => {
            if let Some(last) = prefix.last() {
                table.record(last.clone(), resolve(&prefix, scope), ImportKind::Glob);
            }
        }
    }
}

fn resolve(prefix: &[String], scope: Scope<'_>) -> String {
    let segs: Vec<&str> = prefix.iter().map(String::as_str).collect();
    resolve_use_path(&segs, scope)
}
