use sim_core::{ComponentId, Phase};
use thiserror::Error;

/// Configuration errors found while ordering a phase.
///
/// Both are fatal for the run: no component of the phase is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("{component} declares {phase} dependency {dependency}, which is not registered")]
    MissingDependency {
        phase:      Phase,
        component:  ComponentId,
        dependency: ComponentId,
    },

    #[error("cyclic {phase} dependency among {remaining:?}")]
    CyclicDependency {
        phase:     Phase,
        /// Components left unordered, ascending.
        remaining: Vec<ComponentId>,
    },
}

pub type ResolveResult<T> = Result<T, ResolveError>;
