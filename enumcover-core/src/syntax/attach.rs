//! Directive discovery and attachment.
//!
//! Comment groups carrying well-formed directives are indexed by the lines a
//! node may start on to claim them. The typing visitor reports every node it
//! enters in pre-order, so the outermost node starting on a claimable line
//! takes the group.

use std::collections::HashMap;
use syn::visit::Visit;
use tracing::warn;

use super::comments::{group_comments, lex_comments, CommentGroup};
use super::typing::{ConstTypes, TypedExprCollector};
use crate::coverage::{Region, TypedExpr};
use crate::directive::{classify_comment, CommentClass};
use crate::resolve::{ImportTable, ModulePathContext};
use crate::types::SourceSpan;

/// A well-formed directive attached to a syntax node.
#[derive(Debug, Clone)]
pub struct Directive {
    /// Raw comment text.
    pub raw: String,
    /// Type token after the marker.
    pub token: String,
    pub comment_span: SourceSpan,
    /// Span of the annotated node.
    pub node_span: SourceSpan,
    /// Module owning the annotated node.
    pub ctx: ModulePathContext,
    pub imports: ImportTable,
    pub region: Region,
}

/// A comment mentioning the marker without matching the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedComment {
    pub raw: String,
    pub span: SourceSpan,
}

/// Everything found in one file.
#[derive(Debug, Default)]
pub struct DirectiveScan {
    pub directives: Vec<Directive>,
    pub malformed: Vec<MalformedComment>,
    /// Well-formed directives no node claimed: `(token, comment span)`.
    pub unattached: Vec<(String, SourceSpan)>,
}

#[derive(Debug)]
struct Pending {
    raw: String,
    token: String,
    span: SourceSpan,
}

/// Hands comment groups to the first node that claims them and collects the
/// typed expressions of every open region.
#[derive(Debug, Default)]
pub struct Attacher {
    groups: Vec<Vec<Pending>>,
    claimed: Vec<bool>,
    by_line: HashMap<usize, Vec<usize>>,
    directives: Vec<Directive>,
}

impl Attacher {
    /// Build from comment groups. Returns the malformed comments alongside.
    pub fn from_groups(groups: Vec<CommentGroup>) -> (Self, Vec<MalformedComment>) {
        let mut attacher = Attacher::default();
        let mut malformed = Vec::new();

        for group in groups {
            let mut pending = Vec::new();
            for comment in group.comments {
                match classify_comment(&comment.text) {
                    Some(CommentClass::Directive(token)) => pending.push(Pending {
                        raw: comment.text,
                        token,
                        span: comment.span,
                    }),
                    Some(CommentClass::Malformed) => malformed.push(MalformedComment {
                        raw: comment.text,
                        span: comment.span,
                    }),
                    None => {}
                }
            }
            if pending.is_empty() {
                continue;
            }

            let id = attacher.groups.len();
            let lines = if group.trailing {
                group.first_line..=group.first_line
            } else {
                group.first_line..=group.last_line + 1
            };
            for line in lines {
                attacher.by_line.entry(line).or_default().push(id);
            }
            attacher.groups.push(pending);
            attacher.claimed.push(false);
        }

        (attacher, malformed)
    }

    pub fn has_pending(&self) -> bool {
        self.claimed.iter().any(|c| !c)
    }

    /// A node starting at `span` was entered. Returns the ids of the
    /// directives it claimed, whose regions are now open.
    pub fn enter(&mut self, span: SourceSpan, ctx: &ModulePathContext, imports: &ImportTable) -> Vec<usize> {
        let Some(candidates) = self.by_line.get(&span.line) else {
            return Vec::new();
        };

        let mut opened = Vec::new();
        for &group in candidates {
            if self.claimed[group] {
                continue;
            }
            self.claimed[group] = true;
            for pending in &self.groups[group] {
                opened.push(self.directives.len());
                self.directives.push(Directive {
                    raw: pending.raw.clone(),
                    token: pending.token.clone(),
                    comment_span: pending.span,
                    node_span: span,
                    ctx: ctx.clone(),
                    imports: imports.clone(),
                    region: Region {
                        span,
                        exprs: Vec::new(),
                    },
                });
            }
        }
        opened
    }

    /// Add an expression to every open region.
    pub fn record(&mut self, open: &[usize], expr: TypedExpr) {
        for &id in open {
            if let Some(directive) = self.directives.get_mut(id) {
                directive.region.exprs.push(expr.clone());
            }
        }
    }

    fn finish(self, malformed: Vec<MalformedComment>) -> DirectiveScan {
        let unattached = self
            .groups
            .iter()
            .zip(&self.claimed)
            .filter(|(_, claimed)| !**claimed)
            .flat_map(|(group, _)| group.iter().map(|p| (p.token.clone(), p.span)))
            .collect();

        DirectiveScan {
            directives: self.directives,
            malformed,
            unattached,
        }
    }
}

/// Find every directive in a parsed file, attach it and type the
/// expressions of its region.
pub fn scan_directives<S: ConstTypes>(
    file: &syn::File,
    content: &str,
    ctx: ModulePathContext,
    symbols: &S,
) -> DirectiveScan {
    let (attacher, malformed) = Attacher::from_groups(group_comments(lex_comments(content)));
    if !attacher.has_pending() {
        return attacher.finish(malformed);
    }

    let mut collector = TypedExprCollector::new(ctx, &file.items, symbols, attacher);
    collector.visit_file(file);
    let scan = collector.into_attacher().finish(malformed);

    for (token, span) in &scan.unattached {
        warn!(
            token = %token,
            line = span.line,
            "enumcover directive is not attached to any node, skipping"
        );
    }
    scan
}
