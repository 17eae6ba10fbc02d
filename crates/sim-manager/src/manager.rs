//! The `Manager` struct and its phase loop.

use std::collections::BTreeSet;

use sim_component::{ComponentCell, ComponentError, ComponentSet, ComponentState, Dependencies};
use sim_core::{ComponentId, Phase, SimClock, SimConfig, Timestep};
use tracing::{debug, error, info, warn};

use crate::{
    ManagerError, ManagerObserver, ManagerResult, ManagerState, NoopObserver, RewardAggregator,
    TimestepRewards,
};

// ── RunSummary ────────────────────────────────────────────────────────────────

/// Totals reported at the end of a run call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Advance cycles completed since the manager was built.
    pub timesteps:    u64,
    /// Sum of every per-timestep aggregate so far.
    pub total_reward: i64,
}

// ── Manager ───────────────────────────────────────────────────────────────────

/// The phase coordinator.
///
/// Owns the components, the timestep counter and the reward aggregator, and
/// drives three phases across all components:
///
/// 1. **Initialize**: every component in init-dependency order.
/// 2. **Advance** (once per timestep): signal every component, advance them
///    in advance-dependency order, then collect and aggregate rewards.
/// 3. **Shutdown**: best-effort drain in shutdown-dependency order.
///
/// Each phase resolves its order before touching any component, so a cyclic
/// or dangling dependency fails the phase with no side effects.
///
/// Create via [`ManagerBuilder`][crate::ManagerBuilder].
pub struct Manager {
    config:       SimConfig,
    clock:        SimClock,
    state:        ManagerState,
    components:   ComponentSet,
    aggregator:   Box<dyn RewardAggregator>,
    total_reward: i64,

    /// Advance order, resolved once before the first timestep.  Dependency
    /// lists are fixed after registration, so it never goes stale.
    #[cfg(not(feature = "parallel"))]
    advance_order: Option<Vec<ComponentId>>,

    /// Advance waves, resolved once before the first timestep.
    #[cfg(feature = "parallel")]
    advance_waves: Option<Vec<Vec<ComponentId>>>,
}

impl Manager {
    pub(crate) fn from_parts(
        config:     SimConfig,
        components: ComponentSet,
        aggregator: Box<dyn RewardAggregator>,
    ) -> Self {
        Self {
            clock: config.make_clock(),
            config,
            state: ManagerState::Uninitialized,
            components,
            aggregator,
            total_reward: 0,
            #[cfg(not(feature = "parallel"))]
            advance_order: None,
            #[cfg(feature = "parallel")]
            advance_waves: None,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn state(&self) -> ManagerState {
        self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// The next timestep to execute.
    pub fn current_timestep(&self) -> Timestep {
        self.clock.current
    }

    pub fn components(&self) -> &ComponentSet {
        &self.components
    }

    pub fn component_state(&self, id: ComponentId) -> Option<ComponentState> {
        self.components.state(id)
    }

    /// Sum of every per-timestep aggregate so far.
    pub fn total_reward(&self) -> i64 {
        self.total_reward
    }

    /// Exclusive access to component `id` together with a read-only view of
    /// its `phase` dependencies.  Returns `None` for an unknown id.
    ///
    /// Calls made through the cell bypass the manager's ordering and state
    /// checks; the cell's own contract still applies.
    pub fn with_component<R>(
        &mut self,
        id:    ComponentId,
        phase: Phase,
        f:     impl FnOnce(&mut ComponentCell, &Dependencies<'_>) -> R,
    ) -> Option<R> {
        self.components.with_cell(id, phase, f)
    }

    // ── Initialize ────────────────────────────────────────────────────────

    /// Initialize every component in init-dependency order.
    pub fn initialize(&mut self) -> ManagerResult<()> {
        self.initialize_with(&mut NoopObserver)
    }

    /// [`initialize`](Self::initialize) with observer callbacks.
    pub fn initialize_with<O: ManagerObserver>(&mut self, observer: &mut O) -> ManagerResult<()> {
        self.check_transition(ManagerState::Initialized)?;
        let order = self.components.graph(Phase::Initialize).resolve().inspect_err(|e| {
            error!(error = %e, "initialization order could not be resolved");
        })?;

        info!(components = order.len(), "initializing components");
        observer.on_phase_start(Phase::Initialize);

        for id in order {
            let result = self.call(id, Phase::Initialize, |cell, deps| {
                debug!(component = %id, name = cell.name(), "initialize");
                cell.initialize(deps)
            });
            if let Err(source) = result {
                error!(component = %id, error = %source, "component failed to initialize");
                return Err(ManagerError::InitializationFailed { component: id, source });
            }
        }

        observer.on_phase_end(Phase::Initialize);
        self.transition(ManagerState::Initialized);
        Ok(())
    }

    // ── Advance ───────────────────────────────────────────────────────────

    /// Run from the current timestep to `config.end_timestep()`.
    ///
    /// Calls observer hooks at every timestep boundary.  Use
    /// [`NoopObserver`] if you don't need callbacks.
    pub fn run_simulation<O: ManagerObserver>(&mut self, observer: &mut O) -> ManagerResult<RunSummary> {
        self.begin_running()?;

        let end = self.config.end_timestep();
        info!(
            from      = %self.clock.current,
            timesteps = end.since(self.clock.current),
            "running simulation"
        );

        observer.on_phase_start(Phase::Advance);
        while self.clock.current < end {
            self.step(observer)?;
        }
        observer.on_phase_end(Phase::Advance);
        observer.on_run_end(self.clock.current);

        let summary = self.summary();
        info!(timesteps = summary.timesteps, total_reward = summary.total_reward, "run complete");
        Ok(summary)
    }

    /// Run exactly `n` timesteps from the current position (ignores the
    /// configured duration).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_timesteps<O: ManagerObserver>(
        &mut self,
        n:        u64,
        observer: &mut O,
    ) -> ManagerResult<RunSummary> {
        self.begin_running()?;
        observer.on_phase_start(Phase::Advance);
        for _ in 0..n {
            self.step(observer)?;
        }
        observer.on_phase_end(Phase::Advance);
        Ok(self.summary())
    }

    /// Enter (or stay in) `RunningSimulation` with the advance order cached.
    ///
    /// The order is resolved before the state changes, so a configuration
    /// error leaves the manager in `Initialized`.
    fn begin_running(&mut self) -> ManagerResult<()> {
        if self.state != ManagerState::RunningSimulation {
            self.check_transition(ManagerState::RunningSimulation)?;
        }
        self.resolve_advance_order().inspect_err(|e| {
            error!(error = %e, "advance order could not be resolved");
        })?;
        if self.state != ManagerState::RunningSimulation {
            self.transition(ManagerState::RunningSimulation);
        }
        Ok(())
    }

    /// Execute one full advance cycle at the current timestep.
    fn step<O: ManagerObserver>(&mut self, observer: &mut O) -> ManagerResult<()> {
        let now = self.clock.current;
        observer.on_timestep_start(now);

        // ── ① Open the cycle for every component ──────────────────────────
        for cell in self.components.iter_mut() {
            if let Err(source) = cell.next_timestep_started() {
                error!(component = %cell.id(), timestep = %now, error = %source, "timestep signal rejected");
                return Err(ManagerError::advance(cell.id(), now, source));
            }
        }

        // ── ② Advance in dependency order ─────────────────────────────────
        self.advance_components(now)?;

        // ── ③ Collect and aggregate rewards ───────────────────────────────
        let rewards = TimestepRewards::new(
            now,
            self.components.iter().map(|c| (c.id(), c.timestep_reward())).collect(),
        );
        let aggregate = self.aggregator.aggregate(&rewards);
        self.total_reward = self.total_reward.saturating_add(aggregate);
        debug!(timestep = %now, aggregate, "timestep complete");
        observer.on_timestep_end(now, &rewards, aggregate);

        // ── ④ Next timestep ───────────────────────────────────────────────
        self.clock.advance();
        Ok(())
    }

    #[cfg(not(feature = "parallel"))]
    fn resolve_advance_order(&mut self) -> ManagerResult<()> {
        if self.advance_order.is_none() {
            self.advance_order = Some(self.components.graph(Phase::Advance).resolve()?);
        }
        Ok(())
    }

    #[cfg(feature = "parallel")]
    fn resolve_advance_order(&mut self) -> ManagerResult<()> {
        if self.advance_waves.is_none() {
            self.advance_waves = Some(self.components.graph(Phase::Advance).waves()?);
        }
        Ok(())
    }

    /// Advance every component at `now`, one at a time in resolved order.
    #[cfg(not(feature = "parallel"))]
    fn advance_components(&mut self, now: Timestep) -> ManagerResult<()> {
        let order = self.advance_order.as_deref().unwrap_or_default();
        for &id in order {
            let result = call_cell(&mut self.components, id, Phase::Advance, |cell, deps| {
                debug!(component = %id, name = cell.name(), timestep = %now, "advance");
                cell.advance_timestep(now, deps)
            });
            if let Err(source) = result {
                error!(component = %id, timestep = %now, error = %source, "component failed to advance");
                return Err(ManagerError::advance(id, now, source));
            }
        }
        Ok(())
    }

    /// Advance every component at `now`, wave by wave.
    ///
    /// The cells of one wave are detached from the set and advanced on
    /// Rayon's pool; the rest of the set (holding every earlier wave) serves
    /// as the shared dependency view.  No member of a wave depends on another
    /// member of the same wave, so a successful cycle matches the sequential
    /// path.  On failure the rest of the failing wave still advances; later
    /// waves do not run.
    #[cfg(feature = "parallel")]
    fn advance_components(&mut self, now: Timestep) -> ManagerResult<()> {
        use rayon::prelude::*;

        let waves = self.advance_waves.as_deref().unwrap_or_default();
        for wave in waves {
            let mut cells: Vec<ComponentCell> =
                wave.iter().filter_map(|&id| self.components.detach(id)).collect();

            let components = &self.components;
            let failures: Vec<(ComponentId, ComponentError)> = cells
                .par_iter_mut()
                .filter_map(|cell| {
                    let deps = components.view(Phase::Advance, cell.dependencies().for_phase(Phase::Advance));
                    debug!(component = %cell.id(), name = cell.name(), timestep = %now, "advance");
                    cell.advance_timestep(now, &deps).err().map(|e| (cell.id(), e))
                })
                .collect();

            for cell in cells {
                self.components.reattach(cell);
            }

            // Lowest id first, matching the sequential path's report.
            if let Some((id, source)) = failures.into_iter().min_by_key(|&(id, _)| id) {
                error!(component = %id, timestep = %now, error = %source, "component failed to advance");
                return Err(ManagerError::advance(id, now, source));
            }
        }
        Ok(())
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            timesteps:    self.clock.current.0,
            total_reward: self.total_reward,
        }
    }

    // ── Shutdown ──────────────────────────────────────────────────────────

    /// Shut every component down in shutdown-dependency order.
    pub fn shutdown(&mut self) -> ManagerResult<()> {
        self.shutdown_with(&mut NoopObserver)
    }

    /// [`shutdown`](Self::shutdown) with observer callbacks.
    ///
    /// Every component gets its calls even when an earlier one failed.
    /// Failures are logged and returned together as
    /// [`ManagerError::ShutdownFailed`]; the manager ends in
    /// `ShutdownComplete` either way.  A component whose `prepare_shutdown`
    /// was rejected is not asked to shut down; its dependents then report
    /// the unfinished dependency.
    pub fn shutdown_with<O: ManagerObserver>(&mut self, observer: &mut O) -> ManagerResult<()> {
        self.check_transition(ManagerState::ShutdownComplete)?;
        let order = self.components.graph(Phase::Shutdown).resolve().inspect_err(|e| {
            error!(error = %e, "shutdown order could not be resolved");
        })?;

        info!(components = order.len(), "shutting down components");
        observer.on_phase_start(Phase::Shutdown);

        let mut failures: Vec<(ComponentId, ComponentError)> = Vec::new();
        let mut not_ready: BTreeSet<ComponentId> = BTreeSet::new();

        for cell in self.components.iter_mut() {
            if let Err(e) = cell.prepare_shutdown() {
                warn!(component = %cell.id(), error = %e, "prepare_shutdown rejected");
                not_ready.insert(cell.id());
                failures.push((cell.id(), e));
            }
        }

        for id in order.into_iter().filter(|id| !not_ready.contains(id)) {
            let result = self.call(id, Phase::Shutdown, |cell, deps| {
                debug!(component = %id, name = cell.name(), "shutdown");
                cell.shutdown(deps)
            });
            if let Err(e) = result {
                warn!(component = %id, error = %e, "component failed to shut down");
                failures.push((id, e));
            }
        }

        observer.on_phase_end(Phase::Shutdown);
        self.transition(ManagerState::ShutdownComplete);

        if failures.is_empty() {
            Ok(())
        } else {
            warn!(failed = failures.len(), "shutdown finished with failures");
            Err(ManagerError::ShutdownFailed { failures })
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn call<F>(&mut self, id: ComponentId, phase: Phase, f: F) -> Result<(), ComponentError>
    where
        F: FnOnce(&mut ComponentCell, &Dependencies<'_>) -> Result<(), ComponentError>,
    {
        call_cell(&mut self.components, id, phase, f)
    }

    fn check_transition(&self, to: ManagerState) -> ManagerResult<()> {
        if ManagerState::allows(self.state, to) {
            Ok(())
        } else {
            Err(ManagerError::UnsupportedManagerStateTransition { from: self.state, to })
        }
    }

    /// Apply an already-checked transition.
    fn transition(&mut self, to: ManagerState) {
        info!(from = %self.state, %to, "manager state transition");
        self.state = to;
    }
}

/// Run `f` on cell `id` with its `phase` dependencies.  Ids in a resolved
/// order are always registered; a stray one reports as a missing component.
fn call_cell<F>(components: &mut ComponentSet, id: ComponentId, phase: Phase, f: F) -> Result<(), ComponentError>
where
    F: FnOnce(&mut ComponentCell, &Dependencies<'_>) -> Result<(), ComponentError>,
{
    components
        .with_cell(id, phase, f)
        .unwrap_or(Err(ComponentError::MissingDependency(id)))
}
