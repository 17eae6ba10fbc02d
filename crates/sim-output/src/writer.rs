//! The `RewardWriter` trait implemented by output backends.

use crate::{ComponentRewardRow, OutputResult, TimestepSummaryRow};

/// Sink for per-timestep reward rows.
///
/// Errors are stored by the observer and retrieved with
/// [`RewardOutputObserver::take_error`](crate::RewardOutputObserver::take_error).
pub trait RewardWriter {
    /// Write the rewards of every component for one timestep.
    fn write_rewards(&mut self, rows: &[ComponentRewardRow]) -> OutputResult<()>;

    /// Write one timestep summary row.
    fn write_summary(&mut self, row: &TimestepSummaryRow) -> OutputResult<()>;

    /// Flush all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
