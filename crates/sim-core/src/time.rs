//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Timestep` counter owned by the
//! manager.  The mapping to simulated seconds lives in `SimClock`:
//!
//!   elapsed_secs = timestep * timestep_duration_secs
//!
//! The caller supplies a run duration in seconds; `SimConfig` turns it into a
//! whole number of timesteps, rounding up so a partial final step still runs.

use std::fmt;

use crate::{CoreError, CoreResult};

// ── Timestep ──────────────────────────────────────────────────────────────────

/// An absolute timestep index.  The first advance cycle is `Timestep(0)`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestep(pub u64);

impl Timestep {
    pub const ZERO: Timestep = Timestep(0);

    /// The timestep immediately after `self`.
    #[inline]
    pub fn next(self) -> Timestep {
        Timestep(self.0 + 1)
    }

    /// Timesteps elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Timestep) -> u64 {
        self.0 - earlier.0
    }
}

impl fmt::Display for Timestep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The manager's timestep counter plus its mapping to simulated seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Simulated seconds one timestep represents.
    pub timestep_duration_secs: u32,
    /// The next timestep to execute.  Incremented once per advance cycle.
    pub current: Timestep,
}

impl SimClock {
    pub fn new(timestep_duration_secs: u32) -> Self {
        Self {
            timestep_duration_secs,
            current: Timestep::ZERO,
        }
    }

    /// Advance the clock by one timestep.
    #[inline]
    pub fn advance(&mut self) {
        self.current = self.current.next();
    }

    /// Simulated seconds covered by the timesteps completed so far.
    #[inline]
    pub fn elapsed_secs(&self) -> u64 {
        self.current.0 * self.timestep_duration_secs as u64
    }

    /// Simulated seconds at the *start* of `timestep`.
    #[inline]
    pub fn secs_at(&self, timestep: Timestep) -> u64 {
        timestep.0 * self.timestep_duration_secs as u64
    }

    /// How many timesteps span `secs` seconds (rounds up).
    #[inline]
    pub fn timesteps_for_secs(&self, secs: u64) -> u64 {
        secs.div_ceil(self.timestep_duration_secs.max(1) as u64)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} s elapsed)", self.current, self.elapsed_secs())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration.
///
/// Built by the application (the CLI fills it from `--duration` and friends)
/// and handed to the manager.  The coordinator itself only reads the duration
/// and the timestep resolution.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Total simulated run length in seconds.  Zero runs no timesteps.
    pub duration_secs: u64,

    /// Simulated seconds per timestep.  Must be at least 1.  Default: 1.
    pub timestep_duration_secs: u32,

    /// Master seed for per-component RNGs.  Same seed, same run.
    pub seed: u64,

    /// Worker thread count for the `parallel` advance.  `None` uses all cores.
    pub num_threads: Option<usize>,

    /// Report output every N timesteps.  1 = every timestep.
    pub output_interval_timesteps: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            duration_secs:             0,
            timestep_duration_secs:    1,
            seed:                      0,
            num_threads:               None,
            output_interval_timesteps: 1,
        }
    }
}

impl SimConfig {
    /// Config for a run of `duration_secs` at one second per timestep.
    pub fn with_duration(duration_secs: u64) -> Self {
        Self { duration_secs, ..Self::default() }
    }

    /// Reject values the coordinator cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.timestep_duration_secs == 0 {
            return Err(CoreError::Config(
                "timestep_duration_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Number of advance cycles the run executes.
    #[inline]
    pub fn total_timesteps(&self) -> u64 {
        self.make_clock().timesteps_for_secs(self.duration_secs)
    }

    /// The timestep at which the run ends (exclusive upper bound).
    #[inline]
    pub fn end_timestep(&self) -> Timestep {
        Timestep(self.total_timesteps())
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.timestep_duration_secs)
    }
}
