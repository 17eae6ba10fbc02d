//! `ComponentSet` — the working collection of registered components.
//!
//! # Storage
//!
//! Cells live in an `IndexMap<ComponentId, Option<ComponentCell>>`, which
//! keeps insertion order for iteration and gives O(1) lookup by id.  The
//! `Option` lets the owner *detach* one cell for a mutable phase call while a
//! shared [`Dependencies`] view borrows the rest of the set; the cell is
//! reattached right after.  Outside such a call every slot is occupied.
//!
//! Components are added during setup and never removed.

use indexmap::IndexMap;
use sim_core::{ComponentId, Phase};
use sim_resolve::DependencyGraph;

use crate::{Component, ComponentCell, ComponentSetError, ComponentState, Dependencies, DependencyLists};

#[derive(Default)]
pub struct ComponentSet {
    cells:   IndexMap<ComponentId, Option<ComponentCell>>,
    /// Smallest id greater than every id registered so far, or `u32::MAX`
    /// once none is left.
    next_id: u32,
}

impl ComponentSet {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Register `component` under the next free id and return that id.
    pub fn register<C: Component>(
        &mut self,
        component: C,
        deps:      DependencyLists,
    ) -> Result<ComponentId, ComponentSetError> {
        self.register_boxed(Box::new(component), deps)
    }

    /// Like [`register`](Self::register) for an already boxed component.
    /// Fails with `Exhausted` once `next_id` would reach the sentinel.
    pub fn register_boxed(
        &mut self,
        component: Box<dyn Component>,
        deps:      DependencyLists,
    ) -> Result<ComponentId, ComponentSetError> {
        let id = ComponentId(self.next_id);
        if !id.is_valid() {
            return Err(ComponentSetError::Exhausted);
        }
        self.insert(id, component, deps)?;
        Ok(id)
    }

    /// Register `component` under a caller-chosen id (e.g. from a manifest).
    pub fn insert(
        &mut self,
        id:        ComponentId,
        component: Box<dyn Component>,
        deps:      DependencyLists,
    ) -> Result<(), ComponentSetError> {
        if !id.is_valid() {
            return Err(ComponentSetError::InvalidId(id));
        }
        if self.cells.contains_key(&id) {
            return Err(ComponentSetError::DuplicateId(id));
        }
        self.cells.insert(id, Some(ComponentCell::new(id, deps, component)));
        // `INVALID` marks an exhausted id space.
        let following = id.next().map_or(u32::MAX, |next| next.0);
        self.next_id = self.next_id.max(following);
        Ok(())
    }

    // ── Read access ───────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.cells.contains_key(&id)
    }

    /// Registered ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.cells.keys().copied()
    }

    pub fn get(&self, id: ComponentId) -> Option<&ComponentCell> {
        self.cells.get(&id).and_then(Option::as_ref)
    }

    pub fn state(&self, id: ComponentId) -> Option<ComponentState> {
        self.get(id).map(ComponentCell::state)
    }

    /// The component `id` as its concrete type `T`.
    pub fn component<T: Component>(&self, id: ComponentId) -> Option<&T> {
        self.get(id).and_then(ComponentCell::downcast_ref::<T>)
    }

    /// Cells in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentCell> + '_ {
        self.cells.values().flatten()
    }

    /// Cells in insertion order, mutably.  Used for the dependency-free
    /// signals (`next_timestep_started`, `prepare_shutdown`).
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ComponentCell> + '_ {
        self.cells.values_mut().flatten()
    }

    /// Dependency graph of `phase` over every registered component.
    pub fn graph(&self, phase: Phase) -> DependencyGraph {
        DependencyGraph::from_lists(
            phase,
            self.iter().map(|cell| (cell.id(), cell.dependencies().for_phase(phase))),
        )
    }

    /// View of the declared `phase` dependencies of `id` that are currently
    /// attached.  Unknown ids are skipped; the cell reports them.
    pub fn dependencies_of(&self, id: ComponentId, phase: Phase) -> Dependencies<'_> {
        match self.get(id) {
            Some(cell) => self.view(phase, cell.dependencies().for_phase(phase)),
            None => Dependencies::empty(phase),
        }
    }

    /// View over `ids` (in that order), skipping ids that are not attached.
    pub fn view(&self, phase: Phase, ids: &[ComponentId]) -> Dependencies<'_> {
        Dependencies::from_cells(phase, ids.iter().filter_map(|&id| self.get(id)))
    }

    // ── Phase-call plumbing ───────────────────────────────────────────────

    /// Run `f` with exclusive access to cell `id` and a read-only view of its
    /// `phase` dependencies.  Returns `None` if `id` is not attached.
    pub fn with_cell<R>(
        &mut self,
        id:    ComponentId,
        phase: Phase,
        f:     impl FnOnce(&mut ComponentCell, &Dependencies<'_>) -> R,
    ) -> Option<R> {
        let mut cell = self.detach(id)?;
        let result = {
            let deps = self.view(phase, cell.dependencies().for_phase(phase));
            f(&mut cell, &deps)
        };
        self.reattach(cell);
        Some(result)
    }

    /// Take cell `id` out of its slot.  The slot keeps its position and must
    /// be refilled with [`reattach`](Self::reattach) before the set is used
    /// for anything but building views.
    pub fn detach(&mut self, id: ComponentId) -> Option<ComponentCell> {
        self.cells.get_mut(&id).and_then(Option::take)
    }

    /// Put a detached cell back into its slot.
    pub fn reattach(&mut self, cell: ComponentCell) {
        if let Some(slot) = self.cells.get_mut(&cell.id()) {
            *slot = Some(cell);
        }
    }
}
