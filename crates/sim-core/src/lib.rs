//! `sim-core` — foundational types for the `rust_phasesim` coordinator.
//!
//! This crate is a dependency of every other `sim-*` crate.  It has no
//! `sim-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                          |
//! |-------------|---------------------------------------------------|
//! | [`ids`]     | `ComponentId`                                     |
//! | [`phase`]   | `Phase` (initialize / advance / shutdown)         |
//! | [`time`]    | `Timestep`, `SimClock`, `SimConfig`               |
//! | [`rng`]     | `ComponentRng` (per-component, deterministic)     |
//! | [`error`]   | `CoreError`, `CoreResult`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                             |
//! |---------|----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod error;
pub mod ids;
pub mod phase;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::ComponentId;
pub use phase::Phase;
pub use rng::ComponentRng;
pub use time::{SimClock, SimConfig, Timestep};
