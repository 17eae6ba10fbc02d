use sim_core::{ComponentId, Timestep};
use thiserror::Error;

use crate::{ComponentState, ComponentStatus};

/// Failure of a single component phase call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentError {
    #[error("initialization dependency {dependency} is {state}, expected INITIALIZED")]
    InitializationFailed {
        dependency: ComponentId,
        state:      ComponentState,
    },

    #[error("timestep {got} does not match expected timestep {expected}")]
    UnsupportedTimestepAdvanceTime {
        expected: Timestep,
        got:      Timestep,
    },

    #[error("advance dependency {dependency} is {state}, expected TIMESTEP_ADVANCED for this timestep")]
    UnsupportedTimestepAdvanceDependency {
        dependency: ComponentId,
        state:      ComponentState,
    },

    #[error("shutdown dependency {dependency} is {state}, expected SHUTDOWN_COMPLETE")]
    UnsupportedShutdownDependency {
        dependency: ComponentId,
        state:      ComponentState,
    },

    #[error("declared dependency {0} was not provided")]
    MissingDependency(ComponentId),

    #[error("unsupported state transition {from} -> {to}")]
    UnsupportedComponentStateTransition {
        from: ComponentState,
        to:   ComponentState,
    },

    #[error("component failure: {0}")]
    Failure(String),
}

impl ComponentError {
    /// Status code reported for this error.
    pub fn status(&self) -> ComponentStatus {
        match self {
            Self::InitializationFailed { .. } => ComponentStatus::InitializationFailed,
            Self::UnsupportedTimestepAdvanceTime { .. } => ComponentStatus::UnsupportedTimestepAdvanceTime,
            Self::UnsupportedTimestepAdvanceDependency { .. } => {
                ComponentStatus::UnsupportedTimestepAdvanceDependency
            }
            Self::UnsupportedShutdownDependency { .. } | Self::MissingDependency(_) => {
                ComponentStatus::UnsupportedComponentState
            }
            Self::UnsupportedComponentStateTransition { .. } => {
                ComponentStatus::UnsupportedComponentStateTransition
            }
            Self::Failure(_) => ComponentStatus::Failure,
        }
    }
}

pub type ComponentResult<T> = Result<T, ComponentError>;

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentSetError {
    #[error("component id {0} is already registered")]
    DuplicateId(ComponentId),

    #[error("component id {0} is reserved")]
    InvalidId(ComponentId),

    #[error("no component ids left to assign")]
    Exhausted,
}

/// Errors loading a dependency manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
