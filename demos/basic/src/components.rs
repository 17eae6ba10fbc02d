//! Demo components: a pulsed emitter, a lossy channel, a threshold detector
//! and a scoreboard.
//!
//! Each component finds its upstream peer by type in the dependency view,
//! so the wiring lives entirely in the manifest.

use sim_component::{Component, ComponentError, ComponentResult, Dependencies};
use sim_core::{ComponentId, ComponentRng, Timestep};
use tracing::{debug, info};

/// First dependency of concrete type `T`, or a failure naming what is missing.
fn upstream<'a, T: Component>(deps: &Dependencies<'a>, what: &str) -> ComponentResult<&'a T> {
    deps.iter()
        .find_map(|cell| cell.downcast_ref::<T>())
        .ok_or_else(|| ComponentError::Failure(format!("no {what} among {} dependencies", deps.phase())))
}

// ── Emitter ───────────────────────────────────────────────────────────────────

/// Emits one pulse per timestep at `base_dbm ± jitter_db`.
pub struct Emitter {
    rng:       ComponentRng,
    base_dbm:  f64,
    jitter_db: f64,
    power_dbm: f64,
}

impl Emitter {
    pub fn new(seed: u64, id: ComponentId, base_dbm: f64, jitter_db: f64) -> Self {
        Self {
            rng: ComponentRng::new(seed, id),
            base_dbm,
            jitter_db,
            power_dbm: base_dbm,
        }
    }

    pub fn power_dbm(&self) -> f64 {
        self.power_dbm
    }
}

impl Component for Emitter {
    fn name(&self) -> &str {
        "emitter"
    }

    fn advance(&mut self, _timestep: Timestep, _deps: &Dependencies<'_>) -> ComponentResult<()> {
        self.power_dbm = self.base_dbm + self.rng.gen_range(-self.jitter_db..=self.jitter_db);
        Ok(())
    }
}

// ── Channel ───────────────────────────────────────────────────────────────────

/// Attenuates the emitter's pulse by a fixed path loss plus random fading.
pub struct Channel {
    rng:          ComponentRng,
    path_loss_db: f64,
    max_fade_db:  f64,
    received_dbm: Option<f64>,
}

impl Channel {
    pub fn new(seed: u64, id: ComponentId, path_loss_db: f64, max_fade_db: f64) -> Self {
        Self {
            rng: ComponentRng::new(seed, id),
            path_loss_db,
            max_fade_db,
            received_dbm: None,
        }
    }

    /// Power at the receiver this timestep; `None` until the channel advanced.
    pub fn received_dbm(&self) -> Option<f64> {
        self.received_dbm
    }
}

impl Component for Channel {
    fn name(&self) -> &str {
        "channel"
    }

    fn initialize(&mut self, deps: &Dependencies<'_>) -> ComponentResult<()> {
        upstream::<Emitter>(deps, "emitter")?;
        Ok(())
    }

    fn on_timestep_started(&mut self) {
        self.received_dbm = None;
    }

    fn advance(&mut self, _timestep: Timestep, deps: &Dependencies<'_>) -> ComponentResult<()> {
        let emitter = upstream::<Emitter>(deps, "emitter")?;
        let fade = self.rng.gen_range(0.0..=self.max_fade_db);
        self.received_dbm = Some(emitter.power_dbm() - self.path_loss_db - fade);
        Ok(())
    }
}

// ── Detector ──────────────────────────────────────────────────────────────────

/// Declares a detection when the received power reaches the threshold.
///
/// Reward: +1 for a detection, -1 for a miss.
pub struct Detector {
    threshold_dbm: f64,
    detected:      bool,
}

impl Detector {
    pub fn new(threshold_dbm: f64) -> Self {
        Self { threshold_dbm, detected: false }
    }

    pub fn detected(&self) -> bool {
        self.detected
    }
}

impl Component for Detector {
    fn name(&self) -> &str {
        "detector"
    }

    fn advance(&mut self, timestep: Timestep, deps: &Dependencies<'_>) -> ComponentResult<()> {
        let channel = upstream::<Channel>(deps, "channel")?;
        let received = channel
            .received_dbm()
            .ok_or_else(|| ComponentError::Failure("channel has not advanced".into()))?;
        self.detected = received >= self.threshold_dbm;
        debug!(%timestep, received, detected = self.detected, "detector");
        Ok(())
    }

    fn reward(&self) -> i32 {
        if self.detected { 1 } else { -1 }
    }
}

// ── Scoreboard ────────────────────────────────────────────────────────────────

/// Tallies detections and reports them at shutdown.
#[derive(Default)]
pub struct Scoreboard {
    hits:   u64,
    misses: u64,
}

impl Scoreboard {
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl Component for Scoreboard {
    fn name(&self) -> &str {
        "scoreboard"
    }

    fn advance(&mut self, _timestep: Timestep, deps: &Dependencies<'_>) -> ComponentResult<()> {
        if upstream::<Detector>(deps, "detector")?.detected() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        Ok(())
    }

    fn shutdown(&mut self, _deps: &Dependencies<'_>) -> ComponentResult<()> {
        info!(hits = self.hits, misses = self.misses, "scoreboard");
        Ok(())
    }
}
