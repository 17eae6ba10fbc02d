//! Per-phase dependency declarations and the read-only views handed to hooks.

use sim_core::{ComponentId, Phase, Timestep};

use crate::{Component, ComponentCell, ComponentState};

// ── DependencyLists ───────────────────────────────────────────────────────────

/// The three dependency lists of one component, fixed at registration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DependencyLists {
    pub init:     Vec<ComponentId>,
    pub advance:  Vec<ComponentId>,
    pub shutdown: Vec<ComponentId>,
}

impl DependencyLists {
    /// No dependencies in any phase.
    pub fn none() -> Self {
        Self::default()
    }

    /// The same list for all three phases.
    pub fn all_phases(ids: &[ComponentId]) -> Self {
        Self {
            init:     ids.to_vec(),
            advance:  ids.to_vec(),
            shutdown: ids.to_vec(),
        }
    }

    pub fn with_init(mut self, ids: &[ComponentId]) -> Self {
        self.init = ids.to_vec();
        self
    }

    pub fn with_advance(mut self, ids: &[ComponentId]) -> Self {
        self.advance = ids.to_vec();
        self
    }

    pub fn with_shutdown(mut self, ids: &[ComponentId]) -> Self {
        self.shutdown = ids.to_vec();
        self
    }

    #[inline]
    pub fn for_phase(&self, phase: Phase) -> &[ComponentId] {
        match phase {
            Phase::Initialize => &self.init,
            Phase::Advance    => &self.advance,
            Phase::Shutdown   => &self.shutdown,
        }
    }

    /// Append `id` to the list for `phase` unless it is already there.
    pub fn push(&mut self, phase: Phase, id: ComponentId) {
        let list = match phase {
            Phase::Initialize => &mut self.init,
            Phase::Advance    => &mut self.advance,
            Phase::Shutdown   => &mut self.shutdown,
        };
        if !list.contains(&id) {
            list.push(id);
        }
    }
}

// ── Dependencies ──────────────────────────────────────────────────────────────

/// Read-only view of the dependency components available to one phase call.
///
/// Built by the owner of the [`ComponentSet`](crate::ComponentSet) from the
/// caller's declared list.  Entries keep declaration order.
pub struct Dependencies<'a> {
    phase:   Phase,
    entries: Vec<&'a ComponentCell>,
}

impl<'a> Dependencies<'a> {
    pub fn empty(phase: Phase) -> Self {
        Self { phase, entries: Vec::new() }
    }

    /// View over the given cells.
    pub fn from_cells(phase: Phase, cells: impl IntoIterator<Item = &'a ComponentCell>) -> Self {
        Self { phase, entries: cells.into_iter().collect() }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.entries.iter().map(|cell| cell.id())
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.cell(id).is_some()
    }

    pub fn cell(&self, id: ComponentId) -> Option<&'a ComponentCell> {
        self.entries.iter().copied().find(|cell| cell.id() == id)
    }

    pub fn state(&self, id: ComponentId) -> Option<ComponentState> {
        self.cell(id).map(ComponentCell::state)
    }

    /// Last timestep the dependency advanced, if any.
    pub fn last_advanced(&self, id: ComponentId) -> Option<Timestep> {
        self.cell(id).and_then(ComponentCell::last_advanced)
    }

    pub fn reward(&self, id: ComponentId) -> Option<i32> {
        self.cell(id).map(ComponentCell::timestep_reward)
    }

    pub fn component(&self, id: ComponentId) -> Option<&'a dyn Component> {
        self.cell(id).map(ComponentCell::component)
    }

    /// The dependency `id` as its concrete type `T`.
    ///
    /// Returns `None` if `id` is not in the view or is a different type.
    pub fn get<T: Component>(&self, id: ComponentId) -> Option<&'a T> {
        self.cell(id).and_then(ComponentCell::downcast_ref::<T>)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a ComponentCell> + '_ {
        self.entries.iter().copied()
    }
}
