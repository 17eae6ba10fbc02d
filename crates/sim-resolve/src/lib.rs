//! `sim-resolve` — dependency resolution for the coordinator's phases.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`graph`]   | `DependencyGraph`, `resolve_order`                        |
//! | [`error`]   | `ResolveError`, `ResolveResult<T>`                        |
//!
//! # Ordering rule
//!
//! ```text
//! ready   = { c | every dependency of c is already ordered }
//! next    = min(ready)            (ascending ComponentId)
//! ```
//!
//! The resolver only reads dependency lists.  It can be re-run for every
//! phase without side effects, and it fails before any component executes
//! when a list names an unregistered id or the graph has a cycle.

pub mod error;
pub mod graph;


pub use error::{ResolveError, ResolveResult};
pub use graph::{DependencyGraph, resolve_order};
