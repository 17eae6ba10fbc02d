//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `timestep_rewards.csv`   (`timestep,component_id,reward`)
//! - `timestep_summaries.csv` (`timestep,elapsed_secs,aggregate_reward`)

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::RewardWriter;
use crate::{ComponentRewardRow, OutputResult, TimestepSummaryRow};

pub const REWARDS_FILE: &str = "timestep_rewards.csv";
pub const SUMMARIES_FILE: &str = "timestep_summaries.csv";

/// Writes reward output to two CSV files.
pub struct CsvRewardWriter {
    rewards:   Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvRewardWriter {
    /// Create `dir` if needed, open (or truncate) both files and write the
    /// header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut rewards = Writer::from_path(dir.join(REWARDS_FILE))?;
        rewards.write_record(["timestep", "component_id", "reward"])?;

        let mut summaries = Writer::from_path(dir.join(SUMMARIES_FILE))?;
        summaries.write_record(["timestep", "elapsed_secs", "aggregate_reward"])?;

        Ok(Self { rewards, summaries, finished: false })
    }
}

impl RewardWriter for CsvRewardWriter {
    fn write_rewards(&mut self, rows: &[ComponentRewardRow]) -> OutputResult<()> {
        for row in rows {
            self.rewards.write_record(&[
                row.timestep.to_string(),
                row.component_id.to_string(),
                row.reward.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_summary(&mut self, row: &TimestepSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.timestep.to_string(),
            row.elapsed_secs.to_string(),
            row.aggregate_reward.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.rewards.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
