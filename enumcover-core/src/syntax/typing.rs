//! Expression typing for annotated regions.
//!
//! A single syn visitor walks a file, tracks the module, impl and local
//! scopes it is in, and records every literal and constant reference that
//! falls inside an open directive region together with its static type.
//!
//! Types come from declarations only: constant types from the module graph,
//! local bindings from annotations and initializers, and literals from the
//! type their position expects (a `let` annotation, the other side of a
//! comparison, a match scrutinee, a cast or a newtype constructor).

use std::collections::HashMap;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::visit::{self, Visit};
use syn::{
    Arm, Attribute, BinOp, Block, Expr, ExprCall, ExprPath, FnArg, ImplItem, ImplItemConst,
    ImplItemFn, Item, ItemConst, ItemFn, ItemStatic, Local, Macro, Pat, ReturnType, Signature,
    Stmt, Token, TraitItem, TraitItemConst, TraitItemFn, Type,
};

use super::attach::Attacher;
use super::decls::collect_imports;
use super::{
    declared_type_segments, element_type_segments, literal_expr_value, literal_value,
    path_segments, span_of,
};
use crate::coverage::{ExprCategory, TypedExpr};
use crate::resolve::{
    resolve_type_path, resolve_value_path, ImportTable, ModulePathContext, Scope, SymbolTable,
};
use crate::types::{SourceSpan, TypeIdentity};

/// Symbol table that also knows the declared type of every constant.
pub trait ConstTypes: SymbolTable {
    fn type_of_constant(&self, path: &str) -> Option<TypeIdentity>;
}

struct ModuleScope {
    ctx: ModulePathContext,
    imports: ImportTable,
}

/// Visitor recording typed expressions into the directive regions that
/// contain them.
pub struct TypedExprCollector<'a, S: ConstTypes> {
    symbols: &'a S,
    attacher: Attacher,
    root: ModuleScope,
    nested: Vec<ModuleScope>,
    self_types: Vec<Option<TypeIdentity>>,
    locals: Vec<HashMap<String, Option<TypeIdentity>>>,
    return_types: Vec<Option<TypeIdentity>>,
    expected: Option<TypeIdentity>,
    open: Vec<usize>,
}

impl<'a, S: ConstTypes> TypedExprCollector<'a, S> {
    pub fn new(ctx: ModulePathContext, items: &[Item], symbols: &'a S, attacher: Attacher) -> Self {
        let imports = collect_imports(items, &ctx);
        Self {
            symbols,
            attacher,
            root: ModuleScope { ctx, imports },
            nested: Vec::new(),
            self_types: Vec::new(),
            locals: Vec::new(),
            return_types: Vec::new(),
            expected: None,
            open: Vec::new(),
        }
    }

    pub fn into_attacher(self) -> Attacher {
        self.attacher
    }

    fn module(&self) -> &ModuleScope {
        self.nested.last().unwrap_or(&self.root)
    }

    fn scope(&self) -> Scope<'_> {
        let module = self.module();
        Scope::new(&module.ctx, &module.imports)
    }

    fn self_type(&self) -> Option<&TypeIdentity> {
        self.self_types.last().and_then(Option::as_ref)
    }

    // -- region bookkeeping --

    fn enter_node(&mut self, span: SourceSpan) -> usize {
        let mark = self.open.len();
        let module = self.nested.last().unwrap_or(&self.root);
        let opened = self.attacher.enter(span, &module.ctx, &module.imports);
        self.open.extend(opened);
        mark
    }

    fn leave_node(&mut self, mark: usize) {
        self.open.truncate(mark);
    }

    fn record(&mut self, ty: Option<TypeIdentity>, category: ExprCategory) {
        if !self.open.is_empty() {
            self.attacher.record(&self.open, TypedExpr::new(ty, category));
        }
    }

    fn with_expected(&mut self, expected: Option<TypeIdentity>, f: impl FnOnce(&mut Self)) {
        let saved = std::mem::replace(&mut self.expected, expected);
        f(self);
        self.expected = saved;
    }

    // -- local scopes --

    fn push_scope(&mut self) {
        self.locals.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.locals.pop();
    }

    fn bind(&mut self, name: String, ty: Option<TypeIdentity>) {
        if let Some(scope) = self.locals.last_mut() {
            scope.insert(name, ty);
        }
    }

    /// `Some(ty)` when `name` is a local binding.
    fn local_type(&self, name: &str) -> Option<Option<TypeIdentity>> {
        self.locals.iter().rev().find_map(|s| s.get(name).cloned())
    }

    // -- resolution --

    fn resolve_type(&self, segs: &[String]) -> TypeIdentity {
        if let (Some((first, rest)), Some(self_ty)) = (segs.split_first(), self.self_type()) {
            if first == "Self" {
                return match rest {
                    [] => self_ty.clone(),
                    _ => TypeIdentity::new(format!("{}::{}", self_ty, rest.join("::"))),
                };
            }
        }
        let refs: Vec<&str> = segs.iter().map(String::as_str).collect();
        TypeIdentity::new(resolve_type_path(&refs, self.scope(), self.symbols))
    }

    fn resolve_value(&self, segs: &[String]) -> String {
        if let (Some((first, rest)), Some(self_ty)) = (segs.split_first(), self.self_type()) {
            if first == "Self" && !rest.is_empty() {
                return format!("{}::{}", self_ty, rest.join("::"));
            }
        }
        let refs: Vec<&str> = segs.iter().map(String::as_str).collect();
        resolve_value_path(&refs, self.scope(), self.symbols)
    }

    fn annotation_type(&self, ty: &Type) -> Option<TypeIdentity> {
        declared_type_segments(ty).map(|segs| self.resolve_type(&segs))
    }

    fn element_type(&self, ty: &Type) -> Option<TypeIdentity> {
        element_type_segments(ty).map(|segs| self.resolve_type(&segs))
    }

    /// Constant path named by a path expression, if it is one.
    fn constant_path(&self, p: &ExprPath) -> Option<String> {
        if p.qself.is_some() {
            return None;
        }
        let path = self.resolve_value(&path_segments(&p.path));
        self.symbols.is_constant(&path).then_some(path)
    }

    /// `T(lit)` where `T` is a known type: the literal typed as `T`.
    fn newtype_literal(&self, call: &ExprCall) -> Option<(TypeIdentity, String)> {
        let Expr::Path(func) = &*call.func else {
            return None;
        };
        if func.qself.is_some() || call.args.len() != 1 {
            return None;
        }
        let value = call.args.first().and_then(literal_expr_value)?;
        let ty = self.resolve_type(&path_segments(&func.path));
        self.symbols.is_type(ty.as_str()).then_some((ty, value))
    }

    /// Static type of an expression, where it follows from declarations.
    fn type_of(&self, expr: &Expr) -> Option<TypeIdentity> {
        match expr {
            Expr::Path(p) => {
                if let Some(ident) = p.path.get_ident() {
                    if let Some(ty) = self.local_type(&ident.to_string()) {
                        return ty;
                    }
                }
                self.constant_path(p)
                    .and_then(|path| self.symbols.type_of_constant(&path))
            }
            Expr::Call(call) => self.newtype_literal(call).map(|(ty, _)| ty),
            Expr::Cast(c) => self.annotation_type(&c.ty),
            Expr::Paren(p) => self.type_of(&p.expr),
            Expr::Group(g) => self.type_of(&g.expr),
            Expr::Reference(r) => self.type_of(&r.expr),
            Expr::Unary(u) => self.type_of(&u.expr),
            Expr::Binary(b) if !is_boolean_op(&b.op) => {
                self.type_of(&b.left).or_else(|| self.type_of(&b.right))
            }
            _ => None,
        }
    }

    // -- visiting helpers --

    fn with_fn(&mut self, sig: &Signature, body: impl FnOnce(&mut Self)) {
        self.push_scope();
        for input in &sig.inputs {
            match input {
                FnArg::Receiver(_) => {
                    let ty = self.self_type().cloned();
                    self.bind("self".to_string(), ty);
                }
                FnArg::Typed(pt) => {
                    let ty = self.annotation_type(&pt.ty);
                    self.visit_pattern(&pt.pat, ty);
                }
            }
        }
        let ret = match &sig.output {
            ReturnType::Type(_, ty) => self.element_type(ty),
            ReturnType::Default => None,
        };
        self.return_types.push(ret);
        self.with_expected(None, body);
        self.return_types.pop();
        self.pop_scope();
    }

    fn visit_typed_init(&mut self, ty: &Type, expr: &Expr) {
        let expected = self.element_type(ty);
        self.with_expected(expected, |this| this.visit_expr(expr));
    }

    fn visit_arm_typed(&mut self, arm: &Arm, scrutinee: Option<TypeIdentity>) {
        let mark = self.enter_node(span_of(arm));
        self.push_scope();
        self.visit_pattern(&arm.pat, scrutinee);
        if let Some((_, guard)) = &arm.guard {
            self.with_expected(None, |this| this.visit_expr(guard));
        }
        self.visit_expr(&arm.body);
        self.pop_scope();
        self.leave_node(mark);
    }

    /// Record constants and literals a pattern compares against, and bind the
    /// names it introduces.
    fn visit_pattern(&mut self, pat: &Pat, ty: Option<TypeIdentity>) {
        match pat {
            Pat::Lit(l) => {
                if let Some(value) = literal_value(&l.lit) {
                    self.record(ty, ExprCategory::Literal(value));
                }
            }
            Pat::Path(p) => {
                if let Some(path) = self.constant_path(p) {
                    let const_ty = self.symbols.type_of_constant(&path);
                    self.record(const_ty, ExprCategory::ConstRef(path));
                }
            }
            Pat::Ident(i) => {
                let name = i.ident.to_string();
                if i.subpat.is_none() && i.by_ref.is_none() && i.mutability.is_none() {
                    let path = self.resolve_value(std::slice::from_ref(&name));
                    if self.symbols.is_constant(&path) {
                        let const_ty = self.symbols.type_of_constant(&path);
                        self.record(const_ty, ExprCategory::ConstRef(path));
                        return;
                    }
                }
                self.bind(name, ty.clone());
                if let Some((_, sub)) = &i.subpat {
                    self.visit_pattern(sub, ty);
                }
            }
            Pat::TupleStruct(ts) => {
                if ts.qself.is_none() && ts.elems.len() == 1 {
                    let tuple_ty = self.resolve_type(&path_segments(&ts.path));
                    if let Some(Pat::Lit(l)) = ts.elems.first() {
                        if self.symbols.is_type(tuple_ty.as_str()) {
                            if let Some(value) = literal_value(&l.lit) {
                                self.record(Some(tuple_ty), ExprCategory::Literal(value));
                                return;
                            }
                        }
                    }
                }
                for elem in &ts.elems {
                    self.visit_pattern(elem, None);
                }
            }
            Pat::Or(o) => {
                for case in &o.cases {
                    self.visit_pattern(case, ty.clone());
                }
            }
            Pat::Reference(r) => self.visit_pattern(&r.pat, ty),
            Pat::Paren(p) => self.visit_pattern(&p.pat, ty),
            Pat::Slice(s) => {
                for elem in &s.elems {
                    self.visit_pattern(elem, ty.clone());
                }
            }
            Pat::Type(pt) => {
                let annotated = self.annotation_type(&pt.ty);
                self.visit_pattern(&pt.pat, annotated);
            }
            Pat::Tuple(t) => {
                for elem in &t.elems {
                    self.visit_pattern(elem, None);
                }
            }
            Pat::Struct(s) => {
                for field in &s.fields {
                    self.visit_pattern(&field.pat, None);
                }
            }
            // Ranges, wildcards and rest patterns name no single value.
            _ => {}
        }
    }

    fn visit_expr_typed(&mut self, expr: &Expr) {
        if let Expr::Unary(_) = expr {
            if let Some(value) = literal_expr_value(expr) {
                let ty = self.expected.clone();
                self.record(ty, ExprCategory::Literal(value));
                return;
            }
        }
        match expr {
            Expr::Lit(l) => {
                if let Some(value) = literal_value(&l.lit) {
                    let ty = self.expected.clone();
                    self.record(ty, ExprCategory::Literal(value));
                }
            }
            Expr::Path(p) => {
                if let Some(ident) = p.path.get_ident() {
                    if let Some(ty) = self.local_type(&ident.to_string()) {
                        self.record(ty, ExprCategory::Other);
                        return;
                    }
                }
                if let Some(path) = self.constant_path(p) {
                    let ty = self.symbols.type_of_constant(&path);
                    self.record(ty, ExprCategory::ConstRef(path));
                }
            }
            Expr::Call(call) => {
                if let Some((ty, value)) = self.newtype_literal(call) {
                    self.record(Some(ty), ExprCategory::Literal(value));
                    return;
                }
                self.with_expected(None, |this| {
                    this.visit_expr(&call.func);
                    for arg in &call.args {
                        this.visit_expr(arg);
                    }
                });
            }
            Expr::Cast(c) => {
                if let Some(value) = literal_expr_value(&c.expr) {
                    let ty = self.annotation_type(&c.ty);
                    self.record(ty, ExprCategory::Literal(value));
                    return;
                }
                self.with_expected(None, |this| this.visit_expr(&c.expr));
            }
            Expr::Binary(b) => {
                if is_boolean_op(&b.op) {
                    self.with_expected(None, |this| {
                        this.visit_expr(&b.left);
                        this.visit_expr(&b.right);
                    });
                    return;
                }
                let outer = if is_comparison(&b.op) {
                    None
                } else {
                    self.expected.clone()
                };
                let left = self.type_of(&b.left).or_else(|| outer.clone());
                let right = self.type_of(&b.right).or(outer);
                self.with_expected(right, |this| this.visit_expr(&b.left));
                self.with_expected(left, |this| this.visit_expr(&b.right));
            }
            Expr::Match(m) => {
                let scrutinee = self.type_of(&m.expr);
                self.with_expected(None, |this| this.visit_expr(&m.expr));
                for arm in &m.arms {
                    self.visit_arm_typed(arm, scrutinee.clone());
                }
            }
            Expr::Let(l) => {
                let ty = self.type_of(&l.expr);
                self.with_expected(None, |this| this.visit_expr(&l.expr));
                self.visit_pattern(&l.pat, ty);
            }
            Expr::If(i) => {
                self.push_scope();
                self.with_expected(None, |this| this.visit_expr(&i.cond));
                self.visit_block(&i.then_branch);
                self.pop_scope();
                if let Some((_, else_branch)) = &i.else_branch {
                    self.visit_expr(else_branch);
                }
            }
            Expr::Array(a) => {
                for elem in &a.elems {
                    self.visit_expr(elem);
                }
            }
            Expr::Reference(r) => self.visit_expr(&r.expr),
            Expr::Paren(p) => self.visit_expr(&p.expr),
            Expr::Group(g) => self.visit_expr(&g.expr),
            Expr::Block(b) => self.visit_block(&b.block),
            Expr::Unsafe(u) => self.visit_block(&u.block),
            Expr::Return(r) => {
                if let Some(value) = &r.expr {
                    let ty = self.return_types.last().cloned().flatten();
                    self.with_expected(ty, |this| this.visit_expr(value));
                }
            }
            Expr::Assign(a) => {
                let target = self.type_of(&a.left);
                self.with_expected(None, |this| this.visit_expr(&a.left));
                self.with_expected(target, |this| this.visit_expr(&a.right));
            }
            Expr::Closure(c) => {
                self.push_scope();
                for input in &c.inputs {
                    self.visit_pattern(input, None);
                }
                let ret = match &c.output {
                    ReturnType::Type(_, ty) => self.element_type(ty),
                    ReturnType::Default => None,
                };
                self.return_types.push(ret.clone());
                self.with_expected(ret, |this| this.visit_expr(&c.body));
                self.return_types.pop();
                self.pop_scope();
            }
            Expr::Macro(m) => self.visit_macro(&m.mac),
            _ => self.with_expected(None, |this| visit::visit_expr(this, expr)),
        }
    }
}

fn is_boolean_op(op: &BinOp) -> bool {
    matches!(op, BinOp::And(_) | BinOp::Or(_))
}

fn is_comparison(op: &BinOp) -> bool {
    matches!(
        op,
        BinOp::Eq(_) | BinOp::Ne(_) | BinOp::Lt(_) | BinOp::Le(_) | BinOp::Gt(_) | BinOp::Ge(_)
    )
}

/// Body of `matches!(expr, pattern if guard)`.
struct MatchesBody {
    expr: Expr,
    pat: Pat,
    guard: Option<Expr>,
}

impl Parse for MatchesBody {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let expr: Expr = input.parse()?;
        input.parse::<Token![,]>()?;
        let pat = Pat::parse_multi_with_leading_vert(input)?;
        let guard = if input.peek(Token![if]) {
            input.parse::<Token![if]>()?;
            Some(input.parse()?)
        } else {
            None
        };
        input.parse::<Option<Token![,]>>()?;
        Ok(Self { expr, pat, guard })
    }
}

impl<'ast, S: ConstTypes> Visit<'ast> for TypedExprCollector<'_, S> {
    fn visit_attribute(&mut self, _attr: &'ast Attribute) {}

    fn visit_item(&mut self, item: &'ast Item) {
        let mark = self.enter_node(span_of(item));
        self.with_expected(None, |this| match item {
            Item::Mod(m) => match &m.content {
                Some((_, items)) => {
                    let ctx = this.module().ctx.child(&m.ident.to_string());
                    let imports = collect_imports(items, &ctx);
                    this.nested.push(ModuleScope { ctx, imports });
                    for inner in items {
                        this.visit_item(inner);
                    }
                    this.nested.pop();
                }
                None => {}
            },
            Item::Impl(imp) => {
                let self_ty = this.annotation_type(&imp.self_ty);
                this.self_types.push(self_ty);
                visit::visit_item_impl(this, imp);
                this.self_types.pop();
            }
            _ => visit::visit_item(this, item),
        });
        self.leave_node(mark);
    }

    fn visit_item_fn(&mut self, f: &'ast ItemFn) {
        self.with_fn(&f.sig, |this| this.visit_block(&f.block));
    }

    fn visit_item_const(&mut self, c: &'ast ItemConst) {
        self.visit_typed_init(&c.ty, &c.expr);
    }

    fn visit_item_static(&mut self, s: &'ast ItemStatic) {
        self.visit_typed_init(&s.ty, &s.expr);
    }

    fn visit_impl_item(&mut self, item: &'ast ImplItem) {
        let mark = self.enter_node(span_of(item));
        self.with_expected(None, |this| visit::visit_impl_item(this, item));
        self.leave_node(mark);
    }

    fn visit_impl_item_fn(&mut self, f: &'ast ImplItemFn) {
        self.with_fn(&f.sig, |this| this.visit_block(&f.block));
    }

    fn visit_impl_item_const(&mut self, c: &'ast ImplItemConst) {
        self.visit_typed_init(&c.ty, &c.expr);
    }

    fn visit_trait_item(&mut self, item: &'ast TraitItem) {
        let mark = self.enter_node(span_of(item));
        self.with_expected(None, |this| visit::visit_trait_item(this, item));
        self.leave_node(mark);
    }

    fn visit_trait_item_fn(&mut self, f: &'ast TraitItemFn) {
        if let Some(block) = &f.default {
            self.with_fn(&f.sig, |this| this.visit_block(block));
        }
    }

    fn visit_trait_item_const(&mut self, c: &'ast TraitItemConst) {
        if let Some((_, expr)) = &c.default {
            self.visit_typed_init(&c.ty, expr);
        }
    }

    fn visit_block(&mut self, block: &'ast Block) {
        self.push_scope();
        for stmt in &block.stmts {
            self.visit_stmt(stmt);
        }
        self.pop_scope();
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        let mark = self.enter_node(span_of(stmt));
        // Only a block's tail expression keeps the expected type.
        let expected = match stmt {
            Stmt::Expr(_, None) => self.expected.clone(),
            _ => None,
        };
        self.with_expected(expected, |this| visit::visit_stmt(this, stmt));
        self.leave_node(mark);
    }

    fn visit_local(&mut self, local: &'ast Local) {
        let (pat, annotation) = match &local.pat {
            Pat::Type(pt) => (&*pt.pat, Some(&*pt.ty)),
            other => (other, None),
        };
        if let Some(init) = &local.init {
            let expected = annotation.and_then(|ty| self.element_type(ty));
            self.with_expected(expected, |this| this.visit_expr(&init.expr));
            if let Some((_, diverge)) = &init.diverge {
                self.with_expected(None, |this| this.visit_expr(diverge));
            }
        }
        let ty = annotation
            .and_then(|ty| self.annotation_type(ty))
            .or_else(|| local.init.as_ref().and_then(|i| self.type_of(&i.expr)));
        self.visit_pattern(pat, ty);
    }

    fn visit_pat(&mut self, pat: &'ast Pat) {
        self.visit_pattern(pat, None);
    }

    fn visit_arm(&mut self, arm: &'ast Arm) {
        self.visit_arm_typed(arm, None);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        let mark = self.enter_node(span_of(expr));
        self.visit_expr_typed(expr);
        self.leave_node(mark);
    }

    fn visit_macro(&mut self, mac: &'ast Macro) {
        let name = mac
            .path
            .segments
            .last()
            .map(|s| s.ident.to_string())
            .unwrap_or_default();

        match name.as_str() {
            "matches" => {
                if let Ok(body) = mac.parse_body::<MatchesBody>() {
                    let scrutinee = self.type_of(&body.expr);
                    self.with_expected(None, |this| this.visit_expr(&body.expr));
                    self.push_scope();
                    self.visit_pattern(&body.pat, scrutinee);
                    if let Some(guard) = &body.guard {
                        self.with_expected(None, |this| this.visit_expr(guard));
                    }
                    self.pop_scope();
                    return;
                }
            }
            "assert_eq" | "assert_ne" | "debug_assert_eq" | "debug_assert_ne" => {
                if let Ok(args) = mac.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
                    let args: Vec<&Expr> = args.iter().collect();
                    if let [left, right, rest @ ..] = args.as_slice() {
                        let left_ty = self.type_of(left);
                        let right_ty = self.type_of(right);
                        self.with_expected(right_ty, |this| this.visit_expr(left));
                        self.with_expected(left_ty, |this| this.visit_expr(right));
                        for arg in rest {
                            self.with_expected(None, |this| this.visit_expr(arg));
                        }
                        return;
                    }
                }
            }
            _ => {}
        }

        // Other macros: visited when their body reads as an expression list.
        if let Ok(args) = mac.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
            let expected = if name == "vec" {
                self.expected.clone()
            } else {
                None
            };
            for arg in &args {
                self.with_expected(expected.clone(), |this| this.visit_expr(arg));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::attach::scan_directives;
    use crate::syntax::decls::parse_module_file;
    use crate::syntax::graph::ModuleGraph;
    use std::path::Path;

    const COLORS: &str = r#"
pub struct Color(pub &'static str);
pub const RED: Color = Color("r");
pub const GREEN: Color = Color("g");
pub const BLUE: Color = Color("b");
"#;

    fn graph(lib: &str) -> ModuleGraph {
        let raw = [("src/lib.rs", lib), ("src/colors.rs", COLORS)]
            .iter()
            .flat_map(|(rel, src)| parse_module_file(Path::new(rel), Path::new(rel), src, None).unwrap())
            .collect();
        ModuleGraph::from_modules(Path::new("."), None, raw)
    }

    /// Typed expressions recorded for the single directive in `lib`.
    fn region_exprs(lib: &str) -> Vec<TypedExpr> {
        let g = graph(lib);
        let file = syn::parse_file(lib).unwrap();
        let scan = scan_directives(&file, lib, ModulePathContext::crate_root(), &g);
        assert_eq!(scan.directives.len(), 1, "expected one attached directive");
        scan.directives.into_iter().next().unwrap().region.exprs
    }

    fn color() -> Option<TypeIdentity> {
        Some(TypeIdentity::new("crate::colors::Color"))
    }

    fn const_ref(name: &str) -> TypedExpr {
        TypedExpr::new(color(), ExprCategory::ConstRef(format!("crate::colors::{}", name)))
    }

    fn typed_literal(value: &str) -> TypedExpr {
        TypedExpr::new(color(), ExprCategory::Literal(value.to_string()))
    }

    #[test]
    fn test_const_refs_in_slice() {
        let exprs = region_exprs(
            r#"
mod colors;
use colors::{Color, RED, GREEN};

fn all() -> Vec<Color> {
    // enumcover:Color
    let xs: &[Color] = &[RED, GREEN];
    xs.to_vec()
}
"#,
        );
        assert_eq!(exprs, vec![const_ref("RED"), const_ref("GREEN")]);
    }

    #[test]
    fn test_match_patterns_take_scrutinee_type() {
        let exprs = region_exprs(
            r#"
mod colors;
use colors::*;

fn name(c: Color) -> &'static str {
    // enumcover:Color
    match c {
        RED => "red",
        Color("g") => "green",
        _ => "other",
    }
}
"#,
        );
        assert!(exprs.contains(&const_ref("RED")));
        assert!(exprs.contains(&typed_literal("g")));
        // Arm bodies are `&str`, not colors.
        assert!(!exprs.contains(&typed_literal("red")));
    }

    #[test]
    fn test_comparison_types_literal_from_other_side() {
        let exprs = region_exprs(
            r#"
mod colors;
use colors::Color;

fn is_blue(c: &Color) -> bool {
    // enumcover:Color
    *c == Color("b") || c.0 == "x"
}
"#,
        );
        assert!(exprs.contains(&typed_literal("b")));
        assert!(!exprs.contains(&typed_literal("x")));
    }

    #[test]
    fn test_matches_macro_and_path_consts() {
        let exprs = region_exprs(
            r#"
mod colors;

fn warm(c: colors::Color) -> bool {
    // enumcover:colors::Color
    matches!(c, colors::RED | colors::GREEN)
}
"#,
        );
        assert_eq!(exprs, vec![const_ref("RED"), const_ref("GREEN")]);
    }

    #[test]
    fn test_let_binding_carries_initializer_type() {
        let exprs = region_exprs(
            r#"
mod colors;
use colors::{Color, RED};

fn f() {
    // enumcover:Color
    {
        let c = RED;
        if c == Color("g") {}
        let s = "b";
    }
}
"#,
        );
        assert!(exprs.contains(&const_ref("RED")));
        assert!(exprs.contains(&typed_literal("g")));
        assert!(exprs.contains(&TypedExpr::new(color(), ExprCategory::Other)));
        assert!(!exprs.contains(&typed_literal("b")));
    }
}
