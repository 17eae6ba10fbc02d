//! `sim-manager` — the phase coordinator.
//!
//! # Phase loop
//!
//! ```text
//! initialize():
//!   resolve init order                      (cycle / missing id → abort)
//!   cell.initialize(deps) in order          (first failure → abort)
//!
//! run_simulation(observer):
//!   resolve + cache advance order           (before the first timestep)
//!   for t in clock.current..config.end_timestep():
//!     ① next_timestep_started on every component (insertion order)
//!     ② advance_timestep(t, deps) in resolved order
//!        (wave by wave on Rayon's pool with the `parallel` feature)
//!     ③ collect rewards (ascending id) and fold with the RewardAggregator
//!     ④ clock.advance()
//!
//! shutdown():
//!   resolve shutdown order                  (configuration error → abort)
//!   prepare_shutdown on every component, then shutdown in order
//!   failures are collected; every component still gets its call
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs each dependency wave of the advance phase on Rayon. |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use sim_component::{DependencyLists, NoopComponent};
//! use sim_core::SimConfig;
//! use sim_manager::{ManagerBuilder, NoopObserver};
//!
//! let mut builder = ManagerBuilder::new(SimConfig::with_duration(10));
//! let a = builder.register(NoopComponent::new(), DependencyLists::none())?;
//! builder.register(NoopComponent::with_reward(1), DependencyLists::all_phases(&[a]))?;
//!
//! let mut manager = builder.build()?;
//! manager.initialize()?;
//! let summary = manager.run_simulation(&mut NoopObserver)?;
//! manager.shutdown()?;
//! ```

pub mod aggregate;
pub mod builder;
pub mod error;
pub mod manager;
pub mod observer;
pub mod state;

#[cfg(test)]
mod tests;

pub use aggregate::{MinRewards, RewardAggregator, SumRewards, TimestepRewards, WeightedRewards};
pub use builder::ManagerBuilder;
pub use error::{ManagerError, ManagerResult};
pub use manager::{Manager, RunSummary};
pub use observer::{ManagerObserver, NoopObserver};
pub use state::{ManagerState, ManagerStatus, manager_state_name, manager_status_name};
