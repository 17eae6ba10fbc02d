//! `ComponentCell` — a registered component plus the state the coordinator
//! tracks for it.
//!
//! Every phase call goes through the cell, which checks, in order:
//!
//! 1. the lifecycle allows the transition,
//! 2. (advance only) the timestep is the expected next one,
//! 3. every declared dependency of the phase is present in the view and has
//!    finished the phase,
//!
//! and only then runs the component's hook.  A rejected call leaves the state
//! untouched; a failing hook leaves the state untouched as well.

use sim_core::{ComponentId, Phase, Timestep};

use crate::{
    Component, ComponentError, ComponentResult, ComponentState, Dependencies, DependencyLists,
    Lifecycle,
};

pub struct ComponentCell {
    id:            ComponentId,
    deps:          DependencyLists,
    lifecycle:     Lifecycle,
    /// Timestep of the last successful advance.
    last_advanced: Option<Timestep>,
    /// Reward captured right after the last successful advance.
    last_reward:   Option<i32>,
    inner:         Box<dyn Component>,
}

impl ComponentCell {
    pub fn new(id: ComponentId, deps: DependencyLists, inner: Box<dyn Component>) -> Self {
        Self {
            id,
            deps,
            lifecycle: Lifecycle::new(),
            last_advanced: None,
            last_reward: None,
            inner,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    #[inline]
    pub fn state(&self) -> ComponentState {
        self.lifecycle.state()
    }

    pub fn dependencies(&self) -> &DependencyLists {
        &self.deps
    }

    #[inline]
    pub fn last_advanced(&self) -> Option<Timestep> {
        self.last_advanced
    }

    /// The timestep the next `advance_timestep` call must carry.
    #[inline]
    pub fn expected_timestep(&self) -> Timestep {
        self.last_advanced.map_or(Timestep::ZERO, Timestep::next)
    }

    /// Reward of the last successful advance, 0 before the first one.
    #[inline]
    pub fn timestep_reward(&self) -> i32 {
        self.last_reward.unwrap_or(0)
    }

    pub fn component(&self) -> &dyn Component {
        self.inner.as_ref()
    }

    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        let component: &dyn Component = self.inner.as_ref();
        component.as_any().downcast_ref::<T>()
    }

    // ── Phase calls ───────────────────────────────────────────────────────

    /// Initialize the component.  Every init dependency must be `Initialized`.
    pub fn initialize(&mut self, deps: &Dependencies<'_>) -> ComponentResult<()> {
        self.lifecycle.check(ComponentState::Initialized)?;
        self.check_dependencies(Phase::Initialize, deps, |dependency, state| {
            (state == ComponentState::Initialized)
                .then_some(())
                .ok_or(ComponentError::InitializationFailed { dependency, state })
        })?;
        self.inner.initialize(deps)?;
        self.lifecycle.transition(ComponentState::Initialized)
    }

    /// Open the gate for the next cycle.  No dependencies apply.
    pub fn next_timestep_started(&mut self) -> ComponentResult<()> {
        self.lifecycle.transition(ComponentState::WaitingForTimestepAdvance)?;
        self.inner.on_timestep_started();
        Ok(())
    }

    /// Advance to `timestep`.  Every advance dependency must already have
    /// advanced this same timestep.
    pub fn advance_timestep(
        &mut self,
        timestep: Timestep,
        deps:     &Dependencies<'_>,
    ) -> ComponentResult<()> {
        self.lifecycle.check(ComponentState::TimestepAdvanced)?;

        let expected = self.expected_timestep();
        if timestep != expected {
            return Err(ComponentError::UnsupportedTimestepAdvanceTime { expected, got: timestep });
        }

        self.check_dependencies(Phase::Advance, deps, |dependency, state| {
            let advanced_now = state == ComponentState::TimestepAdvanced
                && deps.last_advanced(dependency) == Some(timestep);
            advanced_now
                .then_some(())
                .ok_or(ComponentError::UnsupportedTimestepAdvanceDependency { dependency, state })
        })?;

        self.inner.advance(timestep, deps)?;
        self.lifecycle.transition(ComponentState::TimestepAdvanced)?;
        self.last_advanced = Some(timestep);
        self.last_reward = Some(self.inner.reward());
        Ok(())
    }

    /// Announce that shutdown is coming.  No dependencies apply.
    pub fn prepare_shutdown(&mut self) -> ComponentResult<()> {
        self.lifecycle.transition(ComponentState::ReadyForShutdown)
    }

    /// Shut the component down.  Every shutdown dependency must be
    /// `ShutdownComplete`.  A second call fails: the state is terminal.
    pub fn shutdown(&mut self, deps: &Dependencies<'_>) -> ComponentResult<()> {
        self.lifecycle.check(ComponentState::ShutdownComplete)?;
        self.check_dependencies(Phase::Shutdown, deps, |dependency, state| {
            (state == ComponentState::ShutdownComplete)
                .then_some(())
                .ok_or(ComponentError::UnsupportedShutdownDependency { dependency, state })
        })?;
        self.inner.shutdown(deps)?;
        self.lifecycle.transition(ComponentState::ShutdownComplete)
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    /// Run `accept` for every dependency declared for `phase`, failing with
    /// `MissingDependency` for any the view does not contain.
    fn check_dependencies<F>(
        &self,
        phase:  Phase,
        deps:   &Dependencies<'_>,
        accept: F,
    ) -> ComponentResult<()>
    where
        F: Fn(ComponentId, ComponentState) -> ComponentResult<()>,
    {
        for &dependency in self.deps.for_phase(phase) {
            let state = deps
                .state(dependency)
                .ok_or(ComponentError::MissingDependency(dependency))?;
            accept(dependency, state)?;
        }
        Ok(())
    }
}
