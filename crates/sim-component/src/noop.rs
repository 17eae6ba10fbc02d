//! A placeholder component that always succeeds.

use sim_core::Timestep;

use crate::{Component, ComponentResult, Dependencies};

/// A [`Component`] whose hooks never fail and whose reward is a constant.
///
/// Useful in tests and for passive slots that only exist to satisfy a
/// dependency declaration.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopComponent {
    reward: i32,
}

impl NoopComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reward(reward: i32) -> Self {
        Self { reward }
    }
}

impl Component for NoopComponent {
    fn name(&self) -> &str {
        "noop"
    }

    fn advance(&mut self, _timestep: Timestep, _deps: &Dependencies<'_>) -> ComponentResult<()> {
        Ok(())
    }

    fn reward(&self) -> i32 {
        self.reward
    }
}
