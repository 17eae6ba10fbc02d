//! Manager states and status codes.

use std::fmt;

// ── ManagerState ──────────────────────────────────────────────────────────────

/// Position of the manager in the run.
///
/// ```text
/// Uninitialized ──▶ Initialized ──▶ RunningSimulation ──▶ ShutdownComplete
///                        └───────────────────────────────────────▲
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[repr(u32)]
pub enum ManagerState {
    Uninitialized = 0,
    Initialized,
    RunningSimulation,
    ShutdownComplete,
}

const MANAGER_STATE_NAMES: [&str; ManagerState::COUNT] = [
    "UNINITIALIZED",
    "INITIALIZED",
    "RUNNING_SIMULATION",
    "SHUTDOWN_COMPLETE",
];

impl ManagerState {
    pub const COUNT: usize = 4;

    pub const ALL: [ManagerState; Self::COUNT] = [
        ManagerState::Uninitialized,
        ManagerState::Initialized,
        ManagerState::RunningSimulation,
        ManagerState::ShutdownComplete,
    ];

    #[inline]
    pub fn name(self) -> &'static str {
        MANAGER_STATE_NAMES[self as usize]
    }

    /// `true` if the manager may move from `from` to `to`.
    pub fn allows(from: ManagerState, to: ManagerState) -> bool {
        use ManagerState::*;
        matches!(
            (from, to),
            (Uninitialized, Initialized)
                | (Initialized, RunningSimulation)
                | (Initialized | RunningSimulation, ShutdownComplete)
        )
    }
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn manager_state_name(index: u32) -> Option<&'static str> {
    MANAGER_STATE_NAMES.get(index as usize).copied()
}

// ── ManagerStatus ─────────────────────────────────────────────────────────────

/// Outcome code of a manager operation.  See
/// [`ManagerError::status`](crate::ManagerError::status).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[repr(u32)]
pub enum ManagerStatus {
    Success = 0,
    InitializationFailed,
    UnsupportedTimestepAdvanceTime,
    ConfigurationError,
    AdvanceFailed,
    UnsupportedManagerStateTransition,
    ShutdownFailed,
}

const MANAGER_STATUS_NAMES: [&str; ManagerStatus::COUNT] = [
    "SUCCESS",
    "INITIALIZATION_FAILED",
    "UNSUPPORTED_TIMESTEP_ADVANCE_TIME",
    "CONFIGURATION_ERROR",
    "ADVANCE_FAILED",
    "UNSUPPORTED_MANAGER_STATE_TRANSITION",
    "SHUTDOWN_FAILED",
];

impl ManagerStatus {
    pub const COUNT: usize = 7;

    #[inline]
    pub fn name(self) -> &'static str {
        MANAGER_STATUS_NAMES[self as usize]
    }
}

impl fmt::Display for ManagerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn manager_status_name(code: u32) -> Option<&'static str> {
    MANAGER_STATUS_NAMES.get(code as usize).copied()
}
