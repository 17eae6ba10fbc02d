use sim_component::ComponentError;
use sim_core::{ComponentId, Timestep};
use sim_resolve::ResolveError;
use thiserror::Error;

use crate::{ManagerState, ManagerStatus};

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("dependency resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("{component} failed to initialize: {source}")]
    InitializationFailed {
        component: ComponentId,
        source:    ComponentError,
    },

    #[error("{component} rejected timestep {timestep}: {source}")]
    UnsupportedTimestepAdvanceTime {
        component: ComponentId,
        timestep:  Timestep,
        source:    ComponentError,
    },

    #[error("{component} failed to advance timestep {timestep}: {source}")]
    AdvanceFailed {
        component: ComponentId,
        timestep:  Timestep,
        source:    ComponentError,
    },

    #[error("unsupported manager state transition {from} -> {to}")]
    UnsupportedManagerStateTransition {
        from: ManagerState,
        to:   ManagerState,
    },

    #[error("{} component(s) failed to shut down", .failures.len())]
    ShutdownFailed {
        failures: Vec<(ComponentId, ComponentError)>,
    },
}

impl ManagerError {
    pub fn status(&self) -> ManagerStatus {
        match self {
            Self::Config(_) | Self::Resolve(_) => ManagerStatus::ConfigurationError,
            Self::InitializationFailed { .. } => ManagerStatus::InitializationFailed,
            Self::UnsupportedTimestepAdvanceTime { .. } => ManagerStatus::UnsupportedTimestepAdvanceTime,
            Self::AdvanceFailed { .. } => ManagerStatus::AdvanceFailed,
            Self::UnsupportedManagerStateTransition { .. } => {
                ManagerStatus::UnsupportedManagerStateTransition
            }
            Self::ShutdownFailed { .. } => ManagerStatus::ShutdownFailed,
        }
    }

    /// Classify a failed advance call: a timestep mismatch keeps its own kind.
    pub(crate) fn advance(component: ComponentId, timestep: Timestep, source: ComponentError) -> Self {
        match source {
            ComponentError::UnsupportedTimestepAdvanceTime { .. } => {
                Self::UnsupportedTimestepAdvanceTime { component, timestep, source }
            }
            source => Self::AdvanceFailed { component, timestep, source },
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
