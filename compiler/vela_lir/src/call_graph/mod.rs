//! Caller → callee edges between lowered functions.
//!
//! Edges are recorded while bodies are lowered: one per direct call and
//! one per function used as a value. Callees need not have a body in the
//! module (declarations supplied by the backend still appear as nodes).

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rustc_hash::FxHashSet;
use vela_ir::Name;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallGraph {
    edges: BTreeMap<Name, BTreeSet<Name>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function with no edges yet.
    pub fn add_node(&mut self, function: Name) {
        self.edges.entry(function).or_default();
    }

    pub fn add_edge(&mut self, caller: Name, callee: Name) {
        self.edges.entry(caller).or_default().insert(callee);
        self.add_node(callee);
    }

    pub fn contains(&self, function: Name) -> bool {
        self.edges.contains_key(&function)
    }

    /// Direct callees of `function`, in name order.
    pub fn callees(&self, function: Name) -> impl Iterator<Item = Name> + '_ {
        self.edges.get(&function).into_iter().flatten().copied()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Transitive closure of `root`'s callees in breadth-first discovery
    /// order. `root` itself is included only when it is reachable from one
    /// of its callees.
    pub fn nested_functions(&self, root: Name) -> Vec<Name> {
        let mut visited: FxHashSet<Name> = FxHashSet::default();
        let mut order = Vec::new();
        let mut worklist: VecDeque<Name> = self.callees(root).collect();

        while let Some(function) = worklist.pop_front() {
            if !visited.insert(function) {
                continue;
            }
            order.push(function);
            worklist.extend(self.callees(function).filter(|f| !visited.contains(f)));
        }
        order
    }
}
