//! `sim-component` — the unit of simulated behavior and its lifecycle.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                      |
//! |-----------------|---------------------------------------------------------------|
//! | [`component`]   | `Component` trait (domain hooks), `AsAny`                     |
//! | [`state`]       | `ComponentState`, `ComponentStatus`, static name tables       |
//! | [`lifecycle`]   | `Lifecycle` — the transition table                            |
//! | [`deps`]        | `DependencyLists`, `Dependencies<'_>` read-only views         |
//! | [`cell`]        | `ComponentCell` — contract-enforcing wrapper around a component |
//! | [`set`]         | `ComponentSet` — insertion-ordered, keyed by `ComponentId`    |
//! | [`manifest`]    | `load_manifest_csv`, `load_manifest_reader`                   |
//! | [`noop`]        | `NoopComponent` — placeholder that always succeeds            |
//! | [`error`]       | `ComponentError`, `ComponentSetError`, `ManifestError`        |
//!
//! # Design notes
//!
//! Concrete components implement only their domain hooks.  The state machine,
//! the dependency-state checks, the expected-timestep check and the reward
//! capture all live in [`ComponentCell`], so no implementation can skip them.
//!
//! Components see their dependencies through [`Dependencies`], which hands
//! out shared references only.  Mutation of any component happens through
//! its own cell, driven by the owner of the [`ComponentSet`].

pub mod cell;
pub mod component;
pub mod deps;
pub mod error;
pub mod lifecycle;
pub mod manifest;
pub mod noop;
pub mod set;
pub mod state;


pub use cell::ComponentCell;
pub use component::{AsAny, Component};
pub use deps::{Dependencies, DependencyLists};
pub use error::{ComponentError, ComponentResult, ComponentSetError, ManifestError};
pub use lifecycle::Lifecycle;
pub use manifest::{Manifest, load_manifest_csv, load_manifest_reader};
pub use noop::NoopComponent;
pub use set::ComponentSet;
pub use state::{ComponentState, ComponentStatus, state_name, status_name};
