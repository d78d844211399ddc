//! Parent/child relationships between modules.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet as HashSet;

use crate::module::Module;
use crate::module_id::ModuleId;

/// One node of the module graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: ModuleId,
    /// Modules requiring this one, in discovery order.
    pub parents: IndexSet<ModuleId>,
    /// Modules this one requires, in declaration order.
    pub children: IndexSet<ModuleId>,
    /// Placeholder for an id that edges point at but no chunk defines.
    pub bare: bool,
}

impl GraphNode {
    fn new(id: ModuleId, bare: bool) -> Self {
        Self {
            id,
            parents: IndexSet::new(),
            children: IndexSet::new(),
            bare,
        }
    }
}

/// Dependency graph over every discovered module.
///
/// May be a forest and may contain cycles; both are left to the path resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleGraph {
    nodes: IndexMap<ModuleId, GraphNode>,
}

impl ModuleGraph {
    /// Build the graph from modules in discovery order.
    ///
    /// Every edge with a statically known module id contributes; chunk loads without one don't.
    pub fn build<'m>(modules: impl IntoIterator<Item = &'m Module>) -> Self {
        let modules: Vec<&Module> = modules.into_iter().collect();
        let mut nodes: IndexMap<ModuleId, GraphNode> = modules
            .iter()
            .map(|module| (module.id.clone(), GraphNode::new(module.id.clone(), false)))
            .collect();

        for module in &modules {
            for target in module.dependencies() {
                if !nodes.contains_key(target) {
                    tracing::warn!(module = %module.id, target = %target, "dependency on a module no chunk defines");
                    nodes.insert(target.clone(), GraphNode::new(target.clone(), true));
                }
                if let Some(node) = nodes.get_mut(&module.id) {
                    node.children.insert(target.clone());
                }
                if let Some(node) = nodes.get_mut(target) {
                    node.parents.insert(module.id.clone());
                }
            }
        }

        Self { nodes }
    }

    pub fn node(&self, id: &ModuleId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Whether `id` only exists because an edge points at it.
    pub fn is_bare(&self, id: &ModuleId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.bare)
    }

    /// Dependencies of a module (forward edges).
    pub fn children(&self, id: &ModuleId) -> impl Iterator<Item = &ModuleId> {
        self.nodes.get(id).into_iter().flat_map(|node| node.children.iter())
    }

    /// Dependents of a module (reverse edges).
    pub fn parents(&self, id: &ModuleId) -> impl Iterator<Item = &ModuleId> {
        self.nodes.get(id).into_iter().flat_map(|node| node.parents.iter())
    }

    /// Collect transitive dependencies of a module, breadth first, excluding the module itself.
    pub fn transitive_dependencies(&self, id: &ModuleId) -> Vec<ModuleId> {
        let mut visited = HashSet::default();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        visited.insert(id.clone());
        queue.push_back(id.clone());

        while let Some(current) = queue.pop_front() {
            for next in self.children(&current) {
                if visited.insert(next.clone()) {
                    order.push(next.clone());
                    queue.push_back(next.clone());
                }
            }
        }

        order
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{DependencyEdge, DependencyKind};

    fn module(id: u64, deps: &[(DependencyKind, Option<u64>)]) -> Module {
        Module {
            id: ModuleId::Index(id),
            chunk_ids: vec![ModuleId::Name("default".into())],
            source: String::new(),
            body: 0..0,
            edges: deps
                .iter()
                .map(|(kind, target)| DependencyEdge {
                    kind: *kind,
                    chunk: matches!(kind, DependencyKind::Chunk).then(|| ModuleId::Index(50)),
                    module: target.map(ModuleId::Index),
                    request: None,
                    literal: None,
                })
                .collect(),
            renames: Vec::new(),
            lookup: Default::default(),
            path: None,
            comment: None,
        }
    }

    #[test]
    fn records_both_directions() {
        let modules = [
            module(1, &[(DependencyKind::Direct, Some(2)), (DependencyKind::Interop, Some(3))]),
            module(2, &[(DependencyKind::Direct, Some(3))]),
            module(3, &[]),
        ];
        let graph = ModuleGraph::build(&modules);

        let children: Vec<_> = graph.children(&ModuleId::Index(1)).cloned().collect();
        assert_eq!(children, vec![ModuleId::Index(2), ModuleId::Index(3)]);
        let parents: Vec<_> = graph.parents(&ModuleId::Index(3)).cloned().collect();
        assert_eq!(parents, vec![ModuleId::Index(1), ModuleId::Index(2)]);
    }

    #[test]
    fn chunk_only_edges_do_not_link() {
        let modules = [module(1, &[(DependencyKind::Chunk, None)])];
        let graph = ModuleGraph::build(&modules);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.children(&ModuleId::Index(1)).count(), 0);
    }

    #[test]
    fn dangling_targets_become_bare_nodes() {
        let modules = [module(1, &[(DependencyKind::Direct, Some(99))])];
        let graph = ModuleGraph::build(&modules);
        assert!(graph.is_bare(&ModuleId::Index(99)));
        assert!(!graph.is_bare(&ModuleId::Index(1)));
        assert_eq!(graph.parents(&ModuleId::Index(99)).count(), 1);
    }

    #[test]
    fn cycles_are_kept() {
        let modules = [
            module(1, &[(DependencyKind::Direct, Some(2))]),
            module(2, &[(DependencyKind::Direct, Some(1))]),
        ];
        let graph = ModuleGraph::build(&modules);
        assert_eq!(graph.transitive_dependencies(&ModuleId::Index(1)), vec![ModuleId::Index(2)]);
    }
}
