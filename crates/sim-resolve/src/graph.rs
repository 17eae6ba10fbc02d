//! Phase-specific dependency graph and Kahn's algorithm.
//!
//! # Determinism
//!
//! The ready set is a `BTreeSet<ComponentId>`, so among components whose
//! dependencies are all ordered the smallest id always goes first.  The same
//! input therefore always yields the same order, independent of registration
//! order or hash seeds.

use std::collections::{BTreeMap, BTreeSet};

use sim_core::{ComponentId, Phase};
use tracing::debug;

use crate::{ResolveError, ResolveResult};

/// Nodes are components, edges point from a component to the components it
/// must run after in one [`Phase`].
#[derive(Clone, Debug)]
pub struct DependencyGraph {
    phase: Phase,
    /// Component → its (de-duplicated) dependency list, in declaration order.
    nodes: BTreeMap<ComponentId, Vec<ComponentId>>,
}

impl DependencyGraph {
    pub fn new(phase: Phase) -> Self {
        Self { phase, nodes: BTreeMap::new() }
    }

    /// Build a graph from `(component, dependency list)` pairs.
    pub fn from_lists<'a, I>(phase: Phase, lists: I) -> Self
    where
        I: IntoIterator<Item = (ComponentId, &'a [ComponentId])>,
    {
        let mut graph = Self::new(phase);
        for (id, deps) in lists {
            graph.add_node(id, deps);
        }
        graph
    }

    /// Add `id` with its dependencies.  Adding the same id again appends the
    /// new dependencies to the existing list.  Repeated ids count once.
    pub fn add_node(&mut self, id: ComponentId, deps: &[ComponentId]) {
        let list = self.nodes.entry(id).or_default();
        for &dep in deps {
            if !list.contains(&dep) {
                list.push(dep);
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// The de-duplicated dependency list of `id`, or `None` if unknown.
    pub fn dependencies_of(&self, id: ComponentId) -> Option<&[ComponentId]> {
        self.nodes.get(&id).map(Vec::as_slice)
    }

    /// Check that every referenced dependency is itself a node.
    ///
    /// Components are checked in ascending id order and each list in
    /// declaration order, so the first reported problem is stable.
    pub fn validate(&self) -> ResolveResult<()> {
        for (&component, deps) in &self.nodes {
            if let Some(&dependency) = deps.iter().find(|d| !self.nodes.contains_key(d)) {
                return Err(ResolveError::MissingDependency {
                    phase: self.phase,
                    component,
                    dependency,
                });
            }
        }
        Ok(())
    }

    /// A total execution order: every component after all its dependencies,
    /// ties broken by ascending id.
    pub fn resolve(&self) -> ResolveResult<Vec<ComponentId>> {
        let order: Vec<ComponentId> = self.kahn()?.into_iter().map(|(id, _)| id).collect();
        debug!(phase = %self.phase, ?order, "resolved execution order");
        Ok(order)
    }

    /// Partition the order into dependency levels.
    ///
    /// Wave `k` holds the components whose longest dependency chain has
    /// length `k`; all dependencies of a wave member lie in earlier waves.
    /// Ids inside a wave are ascending.
    pub fn waves(&self) -> ResolveResult<Vec<Vec<ComponentId>>> {
        let mut waves: Vec<Vec<ComponentId>> = Vec::new();
        for (id, level) in self.kahn()? {
            if waves.len() <= level {
                waves.resize_with(level + 1, Vec::new);
            }
            waves[level].push(id);
        }
        for wave in &mut waves {
            wave.sort_unstable();
        }
        Ok(waves)
    }

    /// Kahn's algorithm returning `(component, level)` in execution order.
    fn kahn(&self) -> ResolveResult<Vec<(ComponentId, usize)>> {
        self.validate()?;

        // 1. In-degree = number of distinct dependencies; reverse edges.
        let mut in_degree: BTreeMap<ComponentId, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<ComponentId, Vec<ComponentId>> = BTreeMap::new();
        for (&id, deps) in &self.nodes {
            in_degree.insert(id, deps.len());
            for &dep in deps {
                dependents.entry(dep).or_default().push(id);
            }
        }

        // 2. Seed the ready set with dependency-free components.
        let mut ready: BTreeSet<ComponentId> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(&id, _)| id)
            .collect();

        // 3. Repeatedly emit the smallest ready id.
        let mut levels: BTreeMap<ComponentId, usize> = BTreeMap::new();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = ready.pop_first() {
            let level = self.nodes[&id]
                .iter()
                .map(|dep| levels[dep] + 1)
                .max()
                .unwrap_or(0);
            levels.insert(id, level);
            order.push((id, level));

            for child in dependents.get(&id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(*child);
                    }
                }
            }
        }

        // 4. Anything left still has unresolved in-edges: a cycle.
        if order.len() != self.nodes.len() {
            let remaining: Vec<ComponentId> = in_degree
                .into_iter()
                .filter(|&(_, degree)| degree > 0)
                .map(|(id, _)| id)
                .collect();
            return Err(ResolveError::CyclicDependency { phase: self.phase, remaining });
        }

        Ok(order)
    }
}

/// Convenience wrapper: build a graph for `phase` and resolve it.
pub fn resolve_order<'a, I>(phase: Phase, lists: I) -> ResolveResult<Vec<ComponentId>>
where
    I: IntoIterator<Item = (ComponentId, &'a [ComponentId])>,
{
    DependencyGraph::from_lists(phase, lists).resolve()
}
