//! Enumeration index: every named constant of every type, across the
//! transitive import closure of the modules checked so far.
//!
//! The index is built lazily. [`EnumerationIndex::ensure_closure`] merges the
//! constants of every module reachable from a root that no earlier call
//! visited. Each module is merged exactly once per run, and entries are never
//! changed after merging.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::common::GraphTraversal;
use crate::types::{ConstDecl, ConstInit, NamedConstant, TypeIdentity};

/// Source of modules, their dependency edges and their declared constants.
pub trait ConstRegistry: GraphTraversal<Node = String> + Sync {
    /// Constants declared directly in `module`.
    fn declared_constants(&self, module: &str) -> &[ConstDecl];
}

/// Counters describing what the index holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub modules_visited: usize,
    pub constants_indexed: usize,
    pub types_indexed: usize,
}

#[derive(Debug, Default)]
struct IndexEntries {
    visited: HashSet<String>,
    roots: HashSet<String>,
    raw_by_path: HashMap<String, ConstDecl>,
    by_type: HashMap<TypeIdentity, IndexMap<String, NamedConstant>>,
    by_path: HashMap<String, NamedConstant>,
}

/// Run-scoped index from type identity to its named constants.
#[derive(Debug, Default)]
pub struct EnumerationIndex {
    entries: RwLock<IndexEntries>,
}

impl EnumerationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexEntries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexEntries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Merge the constants of every not yet visited module reachable from
    /// `root`. Returns how many modules were merged by this call.
    ///
    /// The traversal and the merge happen under one write lock, so a caller
    /// never observes a partially merged closure.
    pub fn ensure_closure<R: ConstRegistry + ?Sized>(&self, root: &str, registry: &R) -> usize {
        if self.read().roots.contains(root) {
            return 0;
        }

        let mut guard = self.write();
        let entries = &mut *guard;
        if !entries.roots.insert(root.to_string()) {
            return 0;
        }

        let claimed = registry.claim_unvisited(root.to_string(), &mut entries.visited);
        if claimed.is_empty() {
            return 0;
        }

        let mut fresh = Vec::new();
        for module in &claimed {
            for decl in registry.declared_constants(module) {
                entries.raw_by_path.insert(decl.path.clone(), decl.clone());
                fresh.push((module, decl.path.clone()));
            }
        }

        for (module, path) in fresh {
            if entries.by_path.contains_key(&path) {
                continue;
            }
            let Some(decl) = entries.raw_by_path.get(&path) else {
                continue;
            };
            let value = resolve_value(decl, &entries.raw_by_path);
            let constant = NamedConstant {
                name: decl.name.clone(),
                value,
                owner: decl.owner.clone(),
                path: decl.path.clone(),
                module: module.clone(),
                file: decl.file.clone(),
                line: decl.line,
            };

            let by_name = entries.by_type.entry(constant.owner.clone()).or_default();
            let key = if by_name.contains_key(&constant.name) {
                constant.path.clone()
            } else {
                constant.name.clone()
            };
            by_name.insert(key, constant.clone());
            entries.by_path.insert(path, constant);
        }

        debug!(root, modules = claimed.len(), "merged module closure");
        claimed.len()
    }

    /// All constants of `ty`, in discovery order. Empty for unknown types.
    pub fn consts_for_type(&self, ty: &TypeIdentity) -> IndexMap<String, NamedConstant> {
        self.read().by_type.get(ty).cloned().unwrap_or_default()
    }

    /// Constants of `ty` declared in one of the `modules`, in discovery order.
    ///
    /// Other runs may have merged more modules into the index; restricting to
    /// a closure makes the answer independent of what was checked before.
    pub fn consts_for_type_in(
        &self,
        ty: &TypeIdentity,
        modules: &HashSet<String>,
    ) -> IndexMap<String, NamedConstant> {
        self.read()
            .by_type
            .get(ty)
            .map(|by_name| {
                by_name
                    .iter()
                    .filter(|(_, c)| modules.contains(&c.module))
                    .map(|(k, c)| (k.clone(), c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The constant declared at a canonical path, if merged.
    pub fn constant_at(&self, path: &str) -> Option<NamedConstant> {
        self.read().by_path.get(path).cloned()
    }

    pub fn stats(&self) -> IndexStats {
        let entries = self.read();
        IndexStats {
            modules_visited: entries.visited.len(),
            constants_indexed: entries.by_path.len(),
            types_indexed: entries.by_type.len(),
        }
    }
}

/// Underlying value of a declaration, following alias chains.
///
/// A cycle or an alias to an unknown constant ends the chain with the
/// target path as the value.
fn resolve_value(decl: &ConstDecl, raw: &HashMap<String, ConstDecl>) -> String {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = decl;
    loop {
        match &current.init {
            ConstInit::Literal(v) | ConstInit::Opaque(v) => return v.clone(),
            ConstInit::Alias(target) => {
                if !seen.insert(current.path.as_str()) {
                    return target.clone();
                }
                match raw.get(target) {
                    Some(next) => current = next,
                    None => return target.clone(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory registry: module → (deps, decls).
    #[derive(Default)]
    struct Registry {
        modules: HashMap<String, (Vec<String>, Vec<ConstDecl>)>,
        lookups: AtomicUsize,
    }

    impl Registry {
        fn module(mut self, name: &str, deps: &[&str], decls: Vec<ConstDecl>) -> Self {
            self.modules.insert(
                name.to_string(),
                (deps.iter().map(|d| d.to_string()).collect(), decls),
            );
            self
        }
    }

    impl GraphTraversal for Registry {
        type Node = String;

        fn neighbors(&self, node: &String) -> Vec<String> {
            self.modules.get(node).map(|m| m.0.clone()).unwrap_or_default()
        }

        fn contains_node(&self, node: &String) -> bool {
            self.modules.contains_key(node)
        }
    }

    impl ConstRegistry for Registry {
        fn declared_constants(&self, module: &str) -> &[ConstDecl] {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.modules.get(module).map(|m| m.1.as_slice()).unwrap_or(&[])
        }
    }

    fn decl(module: &str, name: &str, owner: &str, init: ConstInit) -> ConstDecl {
        ConstDecl {
            name: name.to_string(),
            path: format!("{}::{}", module, name),
            owner: TypeIdentity::new(owner),
            init,
            file: PathBuf::from("src/lib.rs"),
            line: 1,
        }
    }

    fn lit(v: &str) -> ConstInit {
        ConstInit::Literal(v.to_string())
    }

    fn color_registry() -> Registry {
        Registry::default()
            .module(
                "crate",
                &["crate::colors"],
                vec![decl("crate", "EXTRA", "crate::colors::Color", lit("x"))],
            )
            .module(
                "crate::colors",
                &[],
                vec![
                    decl("crate::colors", "RED", "crate::colors::Color", lit("r")),
                    decl("crate::colors", "GREEN", "crate::colors::Color", lit("g")),
                    decl("crate::colors", "LIMIT", "u8", lit("3")),
                ],
            )
            .module("crate::other", &[], vec![decl("crate::other", "BLUE", "crate::colors::Color", lit("b"))])
    }

    #[test]
    fn test_closure_merges_reachable_modules_only() {
        let registry = color_registry();
        let index = EnumerationIndex::new();
        assert_eq!(index.ensure_closure("crate", &registry), 2);

        let colors = index.consts_for_type(&TypeIdentity::new("crate::colors::Color"));
        let names: Vec<_> = colors.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["EXTRA", "RED", "GREEN"]);

        assert_eq!(
            index.stats(),
            IndexStats {
                modules_visited: 2,
                constants_indexed: 4,
                types_indexed: 2
            }
        );
    }

    #[test]
    fn test_lookup_limited_to_closure() {
        let registry = color_registry();
        let index = EnumerationIndex::new();
        index.ensure_closure("crate", &registry);
        index.ensure_closure("crate::other", &registry);

        let color = TypeIdentity::new("crate::colors::Color");
        assert_eq!(index.consts_for_type(&color).len(), 4);

        let closure = registry.reachable_from(["crate::colors".to_string()]);
        let names: Vec<_> = index
            .consts_for_type_in(&color, &closure)
            .values()
            .map(|c| c.name.clone())
            .collect();
        assert_eq!(names, vec!["RED", "GREEN"]);
        assert_eq!(index.constant_at("crate::other::BLUE").unwrap().module, "crate::other");
    }

    #[test]
    fn test_repeated_root_short_circuits() {
        let registry = color_registry();
        let index = EnumerationIndex::new();
        index.ensure_closure("crate", &registry);
        let lookups = registry.lookups.load(Ordering::SeqCst);

        assert_eq!(index.ensure_closure("crate", &registry), 0);
        assert_eq!(index.ensure_closure("crate::colors", &registry), 0);
        assert_eq!(registry.lookups.load(Ordering::SeqCst), lookups);
    }

    #[test]
    fn test_unknown_type_is_empty() {
        let index = EnumerationIndex::new();
        index.ensure_closure("crate", &color_registry());
        assert!(index.consts_for_type(&TypeIdentity::new("crate::Nope")).is_empty());
        assert!(index.constant_at("crate::nope::X").is_none());
    }

    #[test]
    fn test_alias_chain_across_modules() {
        let registry = Registry::default()
            .module(
                "crate",
                &["crate::base"],
                vec![decl("crate", "C", "crate::T", ConstInit::Alias("crate::base::D".to_string()))],
            )
            .module(
                "crate::base",
                &[],
                vec![
                    decl("crate::base", "D", "crate::T", ConstInit::Alias("crate::base::E".to_string())),
                    decl("crate::base", "E", "crate::T", lit("c")),
                ],
            );
        let index = EnumerationIndex::new();
        index.ensure_closure("crate", &registry);
        assert_eq!(index.constant_at("crate::C").unwrap().value, "c");
        assert_eq!(index.constant_at("crate::base::D").unwrap().value, "c");
    }

    #[test]
    fn test_alias_cycle_and_unknown_target() {
        let registry = Registry::default().module(
            "crate",
            &[],
            vec![
                decl("crate", "A", "crate::T", ConstInit::Alias("crate::B".to_string())),
                decl("crate", "B", "crate::T", ConstInit::Alias("crate::A".to_string())),
                decl("crate", "Z", "crate::T", ConstInit::Alias("ext::Y".to_string())),
                decl("crate", "O", "crate::T", ConstInit::Opaque("1 << 2".to_string())),
            ],
        );
        let index = EnumerationIndex::new();
        index.ensure_closure("crate", &registry);
        assert_eq!(index.constant_at("crate::A").unwrap().value, "crate::A");
        assert_eq!(index.constant_at("crate::Z").unwrap().value, "ext::Y");
        assert_eq!(index.constant_at("crate::O").unwrap().value, "1 << 2");
    }

    #[test]
    fn test_name_collision_keeps_both() {
        let registry = Registry::default()
            .module("crate", &["crate::b"], vec![decl("crate", "X", "crate::T", lit("1"))])
            .module("crate::b", &[], vec![decl("crate::b", "X", "crate::T", lit("2"))]);
        let index = EnumerationIndex::new();
        index.ensure_closure("crate", &registry);

        let consts = index.consts_for_type(&TypeIdentity::new("crate::T"));
        let keys: Vec<_> = consts.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["X", "crate::b::X"]);
    }

    #[test]
    fn test_concurrent_overlapping_closures() {
        let mut registry = Registry::default();
        for i in 0..16 {
            let name = format!("crate::m{}", i);
            let deps: Vec<String> = (0..16).filter(|j| *j != i).map(|j| format!("crate::m{}", j)).collect();
            let dep_refs: Vec<&str> = deps.iter().map(String::as_str).collect();
            registry = registry.module(&name, &dep_refs, vec![decl(&name, "K", "crate::T", lit(&i.to_string()))]);
        }
        let index = EnumerationIndex::new();

        std::thread::scope(|s| {
            for i in 0..16 {
                let index = &index;
                let registry = &registry;
                s.spawn(move || {
                    index.ensure_closure(&format!("crate::m{}", i), registry);
                    // Any caller sees the complete closure.
                    assert_eq!(index.consts_for_type(&TypeIdentity::new("crate::T")).len(), 16);
                });
            }
        });

        assert_eq!(registry.lookups.load(Ordering::SeqCst), 16);
        assert_eq!(index.stats().modules_visited, 16);
    }
}
