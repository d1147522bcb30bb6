//! syn-based host: supplies comments, module structure, declarations and
//! expression types to the core pipeline.

pub mod attach;
pub mod comments;
pub mod decls;
pub mod graph;
pub mod typing;

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Expr, GenericArgument, Lit, PathArguments, Type, UnOp};

use crate::types::SourceSpan;

/// Source span of a syntax node. Lines 1-based, columns 0-based.
pub fn span_of<T: Spanned>(node: &T) -> SourceSpan {
    from_span(node.span())
}

pub fn from_span(span: Span) -> SourceSpan {
    let start = span.start();
    let end = span.end();
    SourceSpan::new(start.line, start.column, end.line, end.column)
}

/// Underlying value of a literal: strings unquoted, numbers in base 10
/// without suffix, bytes as their decimal value.
pub fn literal_value(lit: &Lit) -> Option<String> {
    match lit {
        Lit::Str(s) => Some(s.value()),
        Lit::ByteStr(s) => Some(String::from_utf8_lossy(&s.value()).into_owned()),
        Lit::CStr(s) => Some(s.value().to_string_lossy().into_owned()),
        Lit::Char(c) => Some(c.value().to_string()),
        Lit::Byte(b) => Some(b.value().to_string()),
        Lit::Int(i) => Some(i.base10_digits().to_string()),
        Lit::Float(f) => Some(f.base10_digits().to_string()),
        Lit::Bool(b) => Some(b.value.to_string()),
        _ => None,
    }
}

/// Literal value of an expression that is a (possibly negated or
/// parenthesized) literal.
pub fn literal_expr_value(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(l) => literal_value(&l.lit),
        Expr::Unary(u) if matches!(u.op, UnOp::Neg(_)) => {
            literal_expr_value(&u.expr).map(|v| format!("-{}", v))
        }
        Expr::Paren(p) => literal_expr_value(&p.expr),
        Expr::Group(g) => literal_expr_value(&g.expr),
        _ => None,
    }
}

/// Segments of a syn path, generics dropped.
pub fn path_segments(path: &syn::Path) -> Vec<String> {
    path.segments.iter().map(|s| s.ident.to_string()).collect()
}

/// Path segments of a declared type, peeling references and grouping.
///
/// `&'static str` → `["str"]`, `shapes::Kind` → `["shapes", "Kind"]`.
pub fn declared_type_segments(ty: &Type) -> Option<Vec<String>> {
    match ty {
        Type::Path(p) if p.qself.is_none() => Some(path_segments(&p.path)),
        Type::Reference(r) => declared_type_segments(&r.elem),
        Type::Paren(p) => declared_type_segments(&p.elem),
        Type::Group(g) => declared_type_segments(&g.elem),
        _ => None,
    }
}

/// Like [`declared_type_segments`], additionally peeling arrays, slices and
/// `Vec<T>` to their element type. Used for expected-type propagation into
/// literals.
pub fn element_type_segments(ty: &Type) -> Option<Vec<String>> {
    match ty {
        Type::Array(a) => element_type_segments(&a.elem),
        Type::Slice(s) => element_type_segments(&s.elem),
        Type::Reference(r) => element_type_segments(&r.elem),
        Type::Paren(p) => element_type_segments(&p.elem),
        Type::Group(g) => element_type_segments(&g.elem),
        Type::Path(p) if p.qself.is_none() => match vec_element(&p.path) {
            Some(elem) => element_type_segments(elem),
            None => Some(path_segments(&p.path)),
        },
        _ => None,
    }
}

fn vec_element(path: &syn::Path) -> Option<&Type> {
    let last = path.segments.last()?;
    if last.ident != "Vec" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(t) if args.args.len() == 1 => Some(t),
        _ => None,
    }
}

/// Text of the source between two positions of a span.
pub fn span_text(content: &str, span: SourceSpan) -> String {
    let mut out = String::new();
    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        if line_no < span.line || line_no > span.end_line {
            continue;
        }
        let chars: Vec<char> = line.chars().collect();
        let start = if line_no == span.line { span.column } else { 0 };
        let end = if line_no == span.end_line {
            span.end_column.min(chars.len())
        } else {
            chars.len()
        };
        if line_no > span.line {
            out.push('\n');
        }
        if start < end {
            out.extend(&chars[start..end]);
        }
    }
    out
}
