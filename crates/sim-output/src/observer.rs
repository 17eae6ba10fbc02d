//! `RewardOutputObserver<W>` — bridges `ManagerObserver` to a `RewardWriter`.

use sim_core::{SimConfig, Timestep};
use sim_manager::{ManagerObserver, TimestepRewards};
use tracing::warn;

use crate::row::{ComponentRewardRow, TimestepSummaryRow};
use crate::writer::RewardWriter;
use crate::{OutputError, OutputResult};

/// A [`ManagerObserver`] that writes per-component rewards and timestep
/// summaries to any [`RewardWriter`] backend.
///
/// Only every `config.output_interval_timesteps`-th timestep is written
/// (0 disables output).  Errors from the writer are stored internally because
/// observer methods have no return value.  After the run returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct RewardOutputObserver<W: RewardWriter> {
    writer:                 W,
    timestep_duration_secs: u32,
    interval:               u64,
    last_error:             Option<OutputError>,
}

impl<W: RewardWriter> RewardOutputObserver<W> {
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            timestep_duration_secs: config.timestep_duration_secs,
            interval:               config.output_interval_timesteps,
            last_error:             None,
        }
    }

    /// Take the stored write error (if any) after the run returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush the writer.  Needed after a run that failed before its end.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.finish()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn should_write(&self, timestep: Timestep) -> bool {
        self.interval > 0 && timestep.0.is_multiple_of(self.interval)
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "reward output failed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: RewardWriter> ManagerObserver for RewardOutputObserver<W> {
    fn on_timestep_end(&mut self, timestep: Timestep, rewards: &TimestepRewards, aggregate: i64) {
        if !self.should_write(timestep) {
            return;
        }

        let rows: Vec<ComponentRewardRow> = rewards
            .iter()
            .map(|(id, reward)| ComponentRewardRow {
                timestep:     timestep.0,
                component_id: id.0,
                reward,
            })
            .collect();
        if !rows.is_empty() {
            let result = self.writer.write_rewards(&rows);
            self.store_err(result);
        }

        let summary = TimestepSummaryRow {
            timestep:         timestep.0,
            elapsed_secs:     timestep.next().0 * self.timestep_duration_secs as u64,
            aggregate_reward: aggregate,
        };
        let result = self.writer.write_summary(&summary);
        self.store_err(result);
    }

    fn on_run_end(&mut self, _final_timestep: Timestep) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
