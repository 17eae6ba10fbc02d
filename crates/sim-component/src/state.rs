//! Component states and status codes with their static name tables.
//!
//! Names are looked up from fixed `const` arrays indexed by discriminant.
//! Raw-index lookups ([`state_name`], [`status_name`]) return `None` for any
//! value outside the enumerated range.

use std::fmt;

// ── ComponentState ────────────────────────────────────────────────────────────

/// Position of a component in its lifecycle.
///
/// `Uninitialized` is the initial state, `ShutdownComplete` is terminal.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[repr(u32)]
pub enum ComponentState {
    Uninitialized = 0,
    Initialized,
    WaitingForTimestepAdvance,
    TimestepAdvanced,
    ReadyForShutdown,
    ShutdownComplete,
}

const STATE_NAMES: [&str; ComponentState::COUNT] = [
    "UNINITIALIZED",
    "INITIALIZED",
    "WAITING_FOR_TIMESTEP_ADVANCE",
    "TIMESTEP_ADVANCED",
    "READY_FOR_SHUTDOWN",
    "SHUTDOWN_COMPLETE",
];

impl ComponentState {
    pub const COUNT: usize = 6;

    pub const ALL: [ComponentState; Self::COUNT] = [
        ComponentState::Uninitialized,
        ComponentState::Initialized,
        ComponentState::WaitingForTimestepAdvance,
        ComponentState::TimestepAdvanced,
        ComponentState::ReadyForShutdown,
        ComponentState::ShutdownComplete,
    ];

    #[inline]
    pub fn name(self) -> &'static str {
        STATE_NAMES[self as usize]
    }

    #[inline]
    pub fn from_index(index: u32) -> Option<ComponentState> {
        Self::ALL.get(index as usize).copied()
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self == ComponentState::ShutdownComplete
    }
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name of the state with raw index `index`, or `None` if out of range.
pub fn state_name(index: u32) -> Option<&'static str> {
    STATE_NAMES.get(index as usize).copied()
}

// ── ComponentStatus ───────────────────────────────────────────────────────────

/// Outcome code of a component phase call.
///
/// Every [`ComponentError`](crate::ComponentError) maps onto one of these via
/// [`ComponentError::status`](crate::ComponentError::status).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[repr(u32)]
pub enum ComponentStatus {
    Success = 0,
    InitializationFailed,
    UnsupportedTimestepAdvanceTime,
    UnsupportedTimestepAdvanceDependency,
    UnsupportedComponentState,
    UnsupportedComponentStateTransition,
    Failure,
}

const STATUS_NAMES: [&str; ComponentStatus::COUNT] = [
    "SUCCESS",
    "INITIALIZATION_FAILED",
    "UNSUPPORTED_TIMESTEP_ADVANCE_TIME",
    "UNSUPPORTED_TIMESTEP_ADVANCE_DEPENDENCY",
    "UNSUPPORTED_COMPONENT_STATE",
    "UNSUPPORTED_COMPONENT_STATE_TRANSITION",
    "FAILURE",
];

impl ComponentStatus {
    pub const COUNT: usize = 7;

    #[inline]
    pub fn name(self) -> &'static str {
        STATUS_NAMES[self as usize]
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name of the status with raw code `code`, or `None` if out of range.
pub fn status_name(code: u32) -> Option<&'static str> {
    STATUS_NAMES.get(code as usize).copied()
}
