//! Plain data row types written by output backends.

/// One component's reward for one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentRewardRow {
    pub timestep:     u64,
    pub component_id: u32,
    pub reward:       i32,
}

/// Aggregate outcome of one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestepSummaryRow {
    pub timestep:         u64,
    /// Simulated seconds at the end of the timestep.
    pub elapsed_secs:     u64,
    pub aggregate_reward: i64,
}
