//! Coverage analysis of an annotated region against the enumeration index.
//!
//! Coverage is keyed by value: referencing any constant (or literal) with a
//! given value covers every named constant sharing that value.

use std::collections::HashSet;

use crate::diagnostics::{no_consts_message, unhandled_const_message};
use crate::index::EnumerationIndex;
use crate::types::{NamedConstant, SourceSpan, TypeIdentity};

/// What kind of expression a typed expression is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprCategory {
    /// A literal with its underlying value.
    Literal(String),
    /// A reference to the constant at this canonical path.
    ConstRef(String),
    Other,
}

/// An expression inside a region together with its static type, if known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedExpr {
    pub ty: Option<TypeIdentity>,
    pub category: ExprCategory,
}

impl TypedExpr {
    pub fn new(ty: Option<TypeIdentity>, category: ExprCategory) -> Self {
        Self { ty, category }
    }
}

/// Flattened view of the syntax node a directive annotates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    pub span: SourceSpan,
    pub exprs: Vec<TypedExpr>,
}

/// Outcome of checking one region against one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    pub target: TypeIdentity,
    /// Values referenced by the region.
    pub referenced: HashSet<String>,
    /// Constants of the target whose value is not referenced, in discovery
    /// order.
    pub missing: Vec<NamedConstant>,
    /// The target has no named constants at all.
    pub no_constants: bool,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        !self.no_constants && self.missing.is_empty()
    }

    /// Diagnostic messages for this report, in emission order.
    pub fn messages(&self) -> Vec<String> {
        if self.no_constants {
            return vec![no_consts_message(&self.target)];
        }
        self.missing.iter().map(unhandled_const_message).collect()
    }
}

/// Compare the values a region references with the constants of `target`
/// declared in `closure`.
///
/// The index must already hold every module of `closure`. Constants merged
/// from modules outside it are ignored.
pub fn analyze(
    region: &Region,
    target: &TypeIdentity,
    index: &EnumerationIndex,
    closure: &HashSet<String>,
) -> CoverageReport {
    let mut referenced = HashSet::new();
    for expr in &region.exprs {
        if expr.ty.as_ref() != Some(target) {
            continue;
        }
        match &expr.category {
            ExprCategory::Literal(value) => {
                referenced.insert(value.clone());
            }
            ExprCategory::ConstRef(path) => {
                if let Some(c) = index.constant_at(path) {
                    if &c.owner == target && closure.contains(&c.module) {
                        referenced.insert(c.value);
                    }
                }
            }
            ExprCategory::Other => {}
        }
    }

    let all = index.consts_for_type_in(target, closure);
    let missing = all
        .values()
        .filter(|c| !referenced.contains(&c.value))
        .cloned()
        .collect();

    CoverageReport {
        target: target.clone(),
        referenced,
        missing,
        no_constants: all.is_empty(),
    }
}
