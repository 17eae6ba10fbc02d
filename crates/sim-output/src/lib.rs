//! `sim-output` — reward output writers for the rust_phasesim coordinator.
//!
//! | Backend              | Files created                                        |
//! |----------------------|------------------------------------------------------|
//! | [`CsvRewardWriter`]  | `timestep_rewards.csv`, `timestep_summaries.csv`     |
//!
//! Writers implement [`RewardWriter`] and are driven by
//! [`RewardOutputObserver`], which implements `sim_manager::ManagerObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sim_output::{CsvRewardWriter, RewardOutputObserver};
//!
//! let writer = CsvRewardWriter::new(Path::new("./output"))?;
//! let mut obs = RewardOutputObserver::new(writer, &config);
//! manager.run_simulation(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvRewardWriter;
pub use error::{OutputError, OutputResult};
pub use observer::RewardOutputObserver;
pub use row::{ComponentRewardRow, TimestepSummaryRow};
pub use writer::RewardWriter;
