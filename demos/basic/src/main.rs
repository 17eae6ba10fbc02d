//! sim-run — drives the phase coordinator over a small radar chain.
//!
//! An emitter, a lossy channel, a threshold detector and a scoreboard are
//! wired by a dependency manifest (built in, or `--manifest <csv>`), run for
//! `--duration` simulated seconds, and shut down.  Per-timestep rewards can be
//! written to CSV with `--output-dir`.

mod components;


use std::io::Cursor;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sim_component::{
    Component, ComponentSet, Manifest, NoopComponent, load_manifest_csv, load_manifest_reader,
};
use sim_core::{ComponentId, SimConfig};
use sim_manager::{
    Manager, ManagerBuilder, ManagerState, MinRewards, NoopObserver, RunSummary, SumRewards,
};
use sim_output::{CsvRewardWriter, RewardOutputObserver, RewardWriter};

use components::{Channel, Detector, Emitter, Scoreboard};

// ── Constants ─────────────────────────────────────────────────────────────────

const EMITTER_ID:    ComponentId = ComponentId(0);
const CHANNEL_ID:    ComponentId = ComponentId(1);
const DETECTOR_ID:   ComponentId = ComponentId(2);
const SCOREBOARD_ID: ComponentId = ComponentId(3);

const EMITTER_BASE_DBM:   f64 = 30.0;
const EMITTER_JITTER_DB:  f64 = 2.0;
const PATH_LOSS_DB:       f64 = 95.0;
const MAX_FADE_DB:        f64 = 12.0;
const DETECT_THRESHOLD:   f64 = -72.0;

// ── Built-in wiring ───────────────────────────────────────────────────────────

// emitter → channel → detector → scoreboard for init and advance; shutdown
// runs the other way.  Id 4 is a spare passive slot.
const MANIFEST_CSV: &str = "\
component_id,phase,depends_on\n\
0,init,\n\
0,shutdown,1\n\
1,init,0\n\
1,advance,0\n\
1,shutdown,2\n\
2,init,1\n\
2,advance,1\n\
2,shutdown,3\n\
3,init,2\n\
3,advance,2\n\
4,init,\n\
";

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Aggregation {
    Sum,
    Min,
}

#[derive(Parser, Debug)]
#[command(name = "sim-run")]
#[command(about = "Run the dependency-ordered phase coordinator over a demo radar chain")]
struct Cli {
    /// Simulated run length in seconds
    #[arg(short, long)]
    duration: u64,

    /// Simulated seconds per timestep
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    timestep_secs: u32,

    /// Master seed for component RNGs
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Dependency manifest CSV (component_id,phase,depends_on)
    #[arg(long, value_name = "CSV")]
    manifest: Option<PathBuf>,

    /// How per-component rewards are folded each timestep
    #[arg(long, value_enum, default_value = "sum")]
    aggregation: Aggregation,

    /// Write timestep_rewards.csv and timestep_summaries.csv here
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> SimConfig {
        SimConfig {
            duration_secs:             self.duration,
            timestep_duration_secs:    self.timestep_secs,
            seed:                      self.seed,
            num_threads:               None,
            output_interval_timesteps: 1,
        }
    }
}

// ── Component factory ─────────────────────────────────────────────────────────

/// The concrete component behind a manifest id.  Unknown ids become passive
/// slots.
fn make_component(id: ComponentId, seed: u64) -> Box<dyn Component> {
    match id {
        EMITTER_ID    => Box::new(Emitter::new(seed, id, EMITTER_BASE_DBM, EMITTER_JITTER_DB)),
        CHANNEL_ID    => Box::new(Channel::new(seed, id, PATH_LOSS_DB, MAX_FADE_DB)),
        DETECTOR_ID   => Box::new(Detector::new(DETECT_THRESHOLD)),
        SCOREBOARD_ID => Box::new(Scoreboard::default()),
        _             => Box::new(NoopComponent::new()),
    }
}

/// Instantiate every manifest entry with its dependency lists.
fn build_components(manifest: &Manifest, seed: u64) -> Result<ComponentSet> {
    let mut set = ComponentSet::new();
    for (id, deps) in manifest.iter() {
        set.insert(id, make_component(id, seed), deps.clone())
            .with_context(|| format!("registering {id}"))?;
    }
    Ok(set)
}

fn load_manifest(cli: &Cli) -> Result<Manifest> {
    match &cli.manifest {
        Some(path) => load_manifest_csv(path)
            .with_context(|| format!("loading manifest {}", path.display())),
        None => load_manifest_reader(Cursor::new(MANIFEST_CSV)).context("parsing built-in manifest"),
    }
}

fn build_manager(cli: &Cli) -> Result<Manager> {
    let config = cli.config();
    let manifest = load_manifest(cli)?;
    let components = build_components(&manifest, config.seed)?;
    info!(components = components.len(), "components registered");

    let builder = ManagerBuilder::new(config).components(components);
    let builder = match cli.aggregation {
        Aggregation::Sum => builder.aggregator(SumRewards),
        Aggregation::Min => builder.aggregator(MinRewards),
    };
    Ok(builder.build()?)
}

// ── Run ───────────────────────────────────────────────────────────────────────

/// Initialize and run.  Shutdown is left to the caller so it happens on
/// every path once the manager exists.
fn initialize_and_run(manager: &mut Manager, cli: &Cli) -> Result<RunSummary> {
    manager.initialize()?;

    let summary = match &cli.output_dir {
        Some(dir) => {
            let writer = CsvRewardWriter::new(dir)
                .with_context(|| format!("creating output in {}", dir.display()))?;
            let mut observer = RewardOutputObserver::new(writer, manager.config());
            run_recorded(manager, &mut observer)?
        }
        None => manager.run_simulation(&mut NoopObserver)?,
    };

    if let Some(board) = manager.components().component::<Scoreboard>(SCOREBOARD_ID) {
        info!(hits = board.hits(), misses = board.misses(), "detections");
    }
    Ok(summary)
}

/// Run with reward output attached.  A failed run is reported ahead of a
/// failed flush; the flush error only surfaces when the run itself succeeded.
fn run_recorded<W: RewardWriter>(
    manager:  &mut Manager,
    observer: &mut RewardOutputObserver<W>,
) -> Result<RunSummary> {
    let result = manager.run_simulation(observer);
    let flushed = observer.finish();
    if let Some(e) = observer.take_error() {
        warn!(error = %e, "reward output incomplete");
    }

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            if let Err(flush) = flushed {
                warn!(error = %flush, "reward output not flushed");
            }
            return Err(e.into());
        }
    };
    flushed.context("flushing reward output")?;
    Ok(summary)
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let mut manager = build_manager(cli)?;
    let outcome = initialize_and_run(&mut manager, cli);

    // A manager that never initialized has nothing to shut down.
    if manager.state() == ManagerState::Uninitialized {
        return outcome;
    }
    let shutdown = manager.shutdown();
    let summary = outcome?;
    shutdown?;
    Ok(summary)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let t0 = Instant::now();

    let summary = run(&cli)?;

    println!(
        "completed {} timesteps in {:.2?}, total reward {}",
        summary.timesteps,
        t0.elapsed(),
        summary.total_reward
    );
    Ok(())
}
