//! The `Component` trait — the main extension point for simulation code.

use std::any::Any;

use sim_core::Timestep;

use crate::{ComponentResult, Dependencies};

/// Upcast helper so dependency views can downcast `&dyn Component` to the
/// concrete type.  Blanket-implemented for every `'static` type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Pluggable unit of simulated behavior.
///
/// Implementations hold their own simulated state and update it in the phase
/// hooks.  The lifecycle rules (which hook may run when, which dependencies
/// must have finished, which timestep is expected next) are enforced by the
/// [`ComponentCell`](crate::ComponentCell) that wraps every registered
/// component, so hooks only run when the call is valid.
///
/// # Required methods
///
/// Only [`advance`][Self::advance] is required.  The other hooks default to
/// doing nothing, and the reward defaults to 0.
///
/// # Thread safety
///
/// With the `parallel` feature of `sim-manager`, independent components of
/// one dependency wave advance on different threads while reading their
/// dependencies, so implementations must be `Send + Sync`.
///
/// # Example
///
/// ```rust,ignore
/// struct Counter { total: i32 }
///
/// impl Component for Counter {
///     fn advance(&mut self, _t: Timestep, _deps: &Dependencies<'_>) -> ComponentResult<()> {
///         self.total += 1;
///         Ok(())
///     }
///     fn reward(&self) -> i32 { self.total }
/// }
/// ```
pub trait Component: AsAny + Send + Sync + 'static {
    /// Human-readable label used in log events.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// One-time setup.  `deps` holds the initialized dependencies.
    fn initialize(&mut self, _deps: &Dependencies<'_>) -> ComponentResult<()> {
        Ok(())
    }

    /// A new cycle has been announced to every component.  Reset per-cycle
    /// accumulators here; no peer has advanced yet.
    fn on_timestep_started(&mut self) {}

    /// Compute this component's contribution to `timestep`.  `deps` holds
    /// the dependencies that already advanced this timestep.
    fn advance(&mut self, timestep: Timestep, deps: &Dependencies<'_>) -> ComponentResult<()>;

    /// Release resources.  `deps` holds the dependencies already shut down.
    fn shutdown(&mut self, _deps: &Dependencies<'_>) -> ComponentResult<()> {
        Ok(())
    }

    /// Reward for the most recent successful advance.
    fn reward(&self) -> i32 {
        0
    }
}
