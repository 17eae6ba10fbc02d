//! Manager observer trait for progress reporting and data collection.

use sim_core::{Phase, Timestep};

use crate::TimestepRewards;

/// Callbacks invoked by the [`Manager`][crate::Manager] at phase and timestep
/// boundaries.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl ManagerObserver for ProgressPrinter {
///     fn on_timestep_end(&mut self, t: Timestep, _r: &TimestepRewards, aggregate: i64) {
///         if t.0 % self.interval == 0 {
///             println!("{t}: aggregate reward {aggregate}");
///         }
///     }
/// }
/// ```
pub trait ManagerObserver {
    /// Called before the first component call of a phase.
    fn on_phase_start(&mut self, _phase: Phase) {}

    /// Called after the last component call of a phase, failed or not for
    /// shutdown, successful only for the others.
    fn on_phase_end(&mut self, _phase: Phase) {}

    /// Called at the very start of each timestep, before any component is
    /// signalled.
    fn on_timestep_start(&mut self, _timestep: Timestep) {}

    /// Called once every component advanced, with the collected rewards and
    /// their aggregate.
    fn on_timestep_end(&mut self, _timestep: Timestep, _rewards: &TimestepRewards, _aggregate: i64) {}

    /// Called once after the final timestep of
    /// [`run_simulation`](crate::Manager::run_simulation).
    fn on_run_end(&mut self, _final_timestep: Timestep) {}
}

/// A [`ManagerObserver`] that does nothing.
pub struct NoopObserver;

impl ManagerObserver for NoopObserver {}
