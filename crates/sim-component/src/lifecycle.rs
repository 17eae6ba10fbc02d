//! The component transition table.
//!
//! ```text
//! Uninitialized             ── initialize ──────────▶ Initialized
//! Initialized │ Advanced    ── next_timestep ───────▶ WaitingForTimestepAdvance
//! WaitingForTimestepAdvance ── advance ─────────────▶ TimestepAdvanced
//! Initialized │ Advanced    ── prepare_shutdown ────▶ ReadyForShutdown
//! ReadyForShutdown          ── shutdown ────────────▶ ShutdownComplete
//! ```
//!
//! Anything else is rejected and leaves the state unchanged.  Nothing leaves
//! `ShutdownComplete`.

use tracing::trace;

use crate::{ComponentError, ComponentResult, ComponentState};

/// Holds a component's current state and applies the transition table.
#[derive(Clone, Debug)]
pub struct Lifecycle {
    state: ComponentState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self { state: ComponentState::Uninitialized }
    }

    #[inline]
    pub fn state(&self) -> ComponentState {
        self.state
    }

    /// `true` if the table allows `from → to`.
    pub fn allows(from: ComponentState, to: ComponentState) -> bool {
        use ComponentState::*;
        matches!(
            (from, to),
            (Uninitialized, Initialized)
                | (Initialized | TimestepAdvanced, WaitingForTimestepAdvance)
                | (WaitingForTimestepAdvance, TimestepAdvanced)
                | (Initialized | TimestepAdvanced, ReadyForShutdown)
                | (ReadyForShutdown, ShutdownComplete)
        )
    }

    /// Fail with `UnsupportedComponentStateTransition` unless `to` is
    /// reachable from the current state.  Does not change the state.
    pub fn check(&self, to: ComponentState) -> ComponentResult<()> {
        if Self::allows(self.state, to) {
            Ok(())
        } else {
            Err(ComponentError::UnsupportedComponentStateTransition { from: self.state, to })
        }
    }

    /// Move to `to` if the table allows it.
    pub fn transition(&mut self, to: ComponentState) -> ComponentResult<()> {
        self.check(to)?;
        trace!(from = %self.state, %to, "component state transition");
        self.state = to;
        Ok(())
    }
}
