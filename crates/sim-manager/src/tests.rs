//! Unit tests for sim-manager.

use std::sync::{Arc, Mutex};

use sim_component::{
    Component, ComponentError, ComponentResult, ComponentState, Dependencies, DependencyLists,
};
use sim_core::{ComponentId, Phase, SimConfig, Timestep};
use sim_resolve::ResolveError;

use crate::{
    Manager, ManagerBuilder, ManagerError, ManagerObserver, ManagerState, ManagerStatus,
    MinRewards, NoopObserver, RunSummary, TimestepRewards, WeightedRewards,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn config(duration_secs: u64) -> SimConfig {
    SimConfig {
        duration_secs,
        timestep_duration_secs:    1,
        seed:                      7,
        num_threads:               Some(1),
        output_interval_timesteps: 1,
    }
}

/// Shared call log written by every [`Recorder`] of one test.
#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries().into_iter().filter(|e| e.starts_with(prefix)).collect()
    }
}

#[derive(Clone, Copy)]
enum Fail {
    Init,
    AdvanceAt(u64),
    MismatchAt(u64),
    Shutdown,
}

/// Appends `phase:label[@timestep]` to the log after every successful hook.
struct Recorder {
    label:  &'static str,
    log:    Log,
    reward: i32,
    fail:   Option<Fail>,
}

impl Recorder {
    fn new(label: &'static str, log: &Log) -> Self {
        Self { label, log: log.clone(), reward: 0, fail: None }
    }

    fn reward(mut self, reward: i32) -> Self {
        self.reward = reward;
        self
    }

    fn failing(mut self, fail: Fail) -> Self {
        self.fail = Some(fail);
        self
    }
}

impl Component for Recorder {
    fn name(&self) -> &str {
        self.label
    }

    fn initialize(&mut self, _deps: &Dependencies<'_>) -> ComponentResult<()> {
        if matches!(self.fail, Some(Fail::Init)) {
            return Err(ComponentError::Failure("bad calibration".into()));
        }
        self.log.push(format!("init:{}", self.label));
        Ok(())
    }

    fn advance(&mut self, timestep: Timestep, _deps: &Dependencies<'_>) -> ComponentResult<()> {
        match self.fail {
            Some(Fail::AdvanceAt(t)) if timestep.0 == t => {
                return Err(ComponentError::Failure("link lost".into()));
            }
            Some(Fail::MismatchAt(t)) if timestep.0 == t => {
                return Err(ComponentError::UnsupportedTimestepAdvanceTime {
                    expected: timestep,
                    got:      Timestep(timestep.0 + 2),
                });
            }
            _ => {}
        }
        self.log.push(format!("advance:{}@{timestep}", self.label));
        Ok(())
    }

    fn shutdown(&mut self, _deps: &Dependencies<'_>) -> ComponentResult<()> {
        if matches!(self.fail, Some(Fail::Shutdown)) {
            return Err(ComponentError::Failure("flush failed".into()));
        }
        self.log.push(format!("shutdown:{}", self.label));
        Ok(())
    }

    fn reward(&self) -> i32 {
        self.reward
    }
}

fn insert(builder: &mut ManagerBuilder, id: u32, component: Recorder, deps: DependencyLists) {
    builder.insert(ComponentId(id), Box::new(component), deps).unwrap();
}

fn ids(ns: &[u32]) -> Vec<ComponentId> {
    ns.iter().copied().map(ComponentId).collect()
}

/// Records every observer callback as a string.
#[derive(Default)]
struct EventObserver {
    events:     Vec<String>,
    aggregates: Vec<i64>,
}

impl ManagerObserver for EventObserver {
    fn on_phase_start(&mut self, phase: Phase) {
        self.events.push(format!("start:{phase}"));
    }

    fn on_phase_end(&mut self, phase: Phase) {
        self.events.push(format!("end:{phase}"));
    }

    fn on_timestep_start(&mut self, timestep: Timestep) {
        self.events.push(format!("timestep:{timestep}"));
    }

    fn on_timestep_end(&mut self, timestep: Timestep, rewards: &TimestepRewards, aggregate: i64) {
        assert_eq!(rewards.timestep(), timestep);
        self.aggregates.push(aggregate);
    }

    fn on_run_end(&mut self, final_timestep: Timestep) {
        self.events.push(format!("run_end:{final_timestep}"));
    }
}

// ── End-to-end scenarios ──────────────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use super::*;

    #[test]
    fn fan_in_runs_dependencies_first() {
        // C(0) depends on A(1) and B(2) for init and advance.
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(1));
        insert(&mut builder, 0, Recorder::new("C", &log), DependencyLists::none()
            .with_init(&ids(&[1, 2]))
            .with_advance(&ids(&[1, 2])));
        insert(&mut builder, 1, Recorder::new("A", &log), DependencyLists::none());
        insert(&mut builder, 2, Recorder::new("B", &log), DependencyLists::none());
        let mut manager = builder.build().unwrap();

        manager.initialize().unwrap();
        let summary = manager.run_simulation(&mut NoopObserver).unwrap();

        assert_eq!(
            log.entries(),
            vec!["init:A", "init:B", "init:C", "advance:A@T0", "advance:B@T0", "advance:C@T0"]
        );
        assert_eq!(summary, RunSummary { timesteps: 1, total_reward: 0 });
        for id in ids(&[0, 1, 2]) {
            assert_eq!(manager.component_state(id), Some(ComponentState::TimestepAdvanced));
        }
        assert_eq!(manager.state(), ManagerState::RunningSimulation);
    }

    #[test]
    fn unregistered_dependency_fails_before_any_initialize() {
        // D(3) depends on E(4), which is never registered.
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(5));
        insert(&mut builder, 0, Recorder::new("A", &log), DependencyLists::none());
        insert(&mut builder, 3, Recorder::new("D", &log), DependencyLists::all_phases(&ids(&[4])));
        let mut manager = builder.build().unwrap();

        let err = manager.initialize().unwrap_err();
        match &err {
            ManagerError::Resolve(ResolveError::MissingDependency { phase, component, dependency }) => {
                assert_eq!(*phase, Phase::Initialize);
                assert_eq!(*component, ComponentId(3));
                assert_eq!(*dependency, ComponentId(4));
            }
            other => panic!("expected missing dependency, got {other:?}"),
        }
        assert_eq!(err.status(), ManagerStatus::ConfigurationError);
        assert!(log.entries().is_empty(), "no initialize hook may run");
        assert_eq!(manager.state(), ManagerState::Uninitialized);
    }

    #[test]
    fn advance_cycle_fails_before_first_timestep() {
        // F(5) and G(6) depend on each other for advance only.
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(10));
        insert(&mut builder, 5, Recorder::new("F", &log), DependencyLists::none().with_advance(&ids(&[6])));
        insert(&mut builder, 6, Recorder::new("G", &log), DependencyLists::none().with_advance(&ids(&[5])));
        let mut manager = builder.build().unwrap();
        manager.initialize().unwrap();

        let err = manager.run_simulation(&mut NoopObserver).unwrap_err();
        assert!(matches!(
            err,
            ManagerError::Resolve(ResolveError::CyclicDependency { phase: Phase::Advance, ref remaining })
                if *remaining == ids(&[5, 6])
        ));
        assert!(log.with_prefix("advance").is_empty());
        assert_eq!(manager.current_timestep(), Timestep::ZERO);
        assert_eq!(manager.state(), ManagerState::Initialized);

        // The components are still Initialized, so they can be shut down.
        manager.shutdown().unwrap();
        assert_eq!(log.with_prefix("shutdown").len(), 2);
    }

    #[test]
    fn timestep_mismatch_halts_the_run() {
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(10));
        let a = builder.register(Recorder::new("A", &log), DependencyLists::none()).unwrap();
        let b = builder.register(Recorder::new("B", &log), DependencyLists::none()).unwrap();
        let c = builder.register(Recorder::new("C", &log), DependencyLists::none().with_advance(&[b])).unwrap();
        let mut manager = builder.build().unwrap();
        manager.initialize().unwrap();
        manager.run_timesteps(3, &mut NoopObserver).unwrap();

        // Drive B through T3 and T4 behind the manager's back: it now
        // expects T5 while the manager's counter is still at T3.
        manager
            .with_component(b, Phase::Advance, |cell, deps| {
                for t in [Timestep(3), Timestep(4)] {
                    cell.next_timestep_started()?;
                    cell.advance_timestep(t, deps)?;
                }
                Ok::<_, ComponentError>(())
            })
            .unwrap()
            .unwrap();
        assert_eq!(manager.components().get(b).unwrap().expected_timestep(), Timestep(5));

        let err = manager.run_simulation(&mut NoopObserver).unwrap_err();
        let ManagerError::UnsupportedTimestepAdvanceTime { component, timestep, source } = &err else {
            panic!("expected UnsupportedTimestepAdvanceTime, got {err:?}");
        };
        assert_eq!((*component, *timestep), (b, Timestep(3)));
        assert!(matches!(
            source,
            ComponentError::UnsupportedTimestepAdvanceTime { expected: Timestep(5), got: Timestep(3) }
        ));
        assert_eq!(err.status(), ManagerStatus::UnsupportedTimestepAdvanceTime);

        assert_eq!(manager.current_timestep(), Timestep(3));
        assert_eq!(manager.component_state(b), Some(ComponentState::WaitingForTimestepAdvance));
        assert_eq!(manager.component_state(c), Some(ComponentState::WaitingForTimestepAdvance));
        assert_eq!(log.with_prefix("advance:A").len(), 4);
        assert_eq!(log.with_prefix("advance:B").len(), 5);
        assert!(!log.entries().contains(&"advance:C@T3".to_string()));
        assert_eq!(manager.components().get(a).unwrap().last_advanced(), Some(Timestep(3)));
    }

    #[test]
    fn timestep_mismatch_from_a_hook_is_classified() {
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(10));
        let a = builder.register(Recorder::new("A", &log), DependencyLists::none()).unwrap();
        let b = builder.register(
            Recorder::new("B", &log).failing(Fail::MismatchAt(3)),
            DependencyLists::none().with_advance(&[a]),
        ).unwrap();
        builder.register(Recorder::new("C", &log), DependencyLists::none().with_advance(&[b])).unwrap();
        let mut manager = builder.build().unwrap();
        manager.initialize().unwrap();

        let err = manager.run_simulation(&mut NoopObserver).unwrap_err();
        assert!(matches!(
            err,
            ManagerError::UnsupportedTimestepAdvanceTime { component, timestep: Timestep(3), .. } if component == b
        ));
        assert_eq!(err.status(), ManagerStatus::UnsupportedTimestepAdvanceTime);
        assert_eq!(manager.current_timestep(), Timestep(3));
        assert!(!log.entries().contains(&"advance:C@T3".to_string()));
        assert!(log.with_prefix("advance:A").len() == 4);
        assert_eq!(manager.component_state(b), Some(ComponentState::WaitingForTimestepAdvance));
    }

    #[test]
    fn failing_advance_stops_before_dependents() {
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(3));
        let a = builder.register(
            Recorder::new("A", &log).failing(Fail::AdvanceAt(1)),
            DependencyLists::none(),
        ).unwrap();
        builder.register(Recorder::new("B", &log), DependencyLists::none().with_advance(&[a])).unwrap();
        let mut manager = builder.build().unwrap();
        manager.initialize().unwrap();

        let err = manager.run_simulation(&mut NoopObserver).unwrap_err();
        assert!(matches!(err, ManagerError::AdvanceFailed { component, timestep: Timestep(1), .. } if component == a));
        assert_eq!(err.status(), ManagerStatus::AdvanceFailed);
        assert_eq!(log.with_prefix("advance"), vec!["advance:A@T0", "advance:B@T0"]);
    }

    /// A(0) and E(3) fail at T1; S(1) is independent; D(2) needs A.
    fn failing_wave(log: &Log) -> (Manager, ComponentId, ComponentId) {
        let mut builder = ManagerBuilder::new(config(3));
        let a = builder.register(
            Recorder::new("A", log).failing(Fail::AdvanceAt(1)),
            DependencyLists::none(),
        ).unwrap();
        let s = builder.register(Recorder::new("S", log), DependencyLists::none()).unwrap();
        builder.register(Recorder::new("D", log), DependencyLists::none().with_advance(&[a])).unwrap();
        builder.register(
            Recorder::new("E", log).failing(Fail::AdvanceAt(1)),
            DependencyLists::none(),
        ).unwrap();
        let mut manager = builder.build().unwrap();
        manager.initialize().unwrap();
        (manager, a, s)
    }

    #[cfg(not(feature = "parallel"))]
    #[test]
    fn failing_advance_stops_every_later_component() {
        let log = Log::default();
        let (mut manager, a, s) = failing_wave(&log);

        let err = manager.run_simulation(&mut NoopObserver).unwrap_err();
        assert!(matches!(err, ManagerError::AdvanceFailed { component, timestep: Timestep(1), .. } if component == a));
        assert!(log.entries().iter().all(|e| !e.ends_with("@T1")));
        assert_eq!(manager.component_state(s), Some(ComponentState::WaitingForTimestepAdvance));
        assert_eq!(manager.current_timestep(), Timestep(1));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn failing_advance_finishes_its_wave_and_stops_later_waves() {
        let log = Log::default();
        let (mut manager, a, s) = failing_wave(&log);

        let err = manager.run_simulation(&mut NoopObserver).unwrap_err();
        // Lowest failing id of the wave is reported.
        assert!(matches!(err, ManagerError::AdvanceFailed { component, timestep: Timestep(1), .. } if component == a));
        let at_t1: Vec<String> = log.entries().into_iter().filter(|e| e.ends_with("@T1")).collect();
        assert_eq!(at_t1, vec!["advance:S@T1"]);
        assert_eq!(manager.component_state(s), Some(ComponentState::TimestepAdvanced));
        assert_eq!(manager.component_state(ComponentId(2)), Some(ComponentState::WaitingForTimestepAdvance));
        assert_eq!(manager.current_timestep(), Timestep(1));
    }

    #[test]
    fn failing_initialize_aborts_remaining_components() {
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(1));
        let a = builder.register(Recorder::new("A", &log), DependencyLists::none()).unwrap();
        let b = builder.register(
            Recorder::new("B", &log).failing(Fail::Init),
            DependencyLists::none().with_init(&[a]),
        ).unwrap();
        let c = builder.register(Recorder::new("C", &log), DependencyLists::none().with_init(&[b])).unwrap();
        let mut manager = builder.build().unwrap();

        let err = manager.initialize().unwrap_err();
        assert!(matches!(
            err,
            ManagerError::InitializationFailed { component, source: ComponentError::Failure(_) } if component == b
        ));
        assert_eq!(err.status(), ManagerStatus::InitializationFailed);
        assert_eq!(log.entries(), vec!["init:A"]);
        assert_eq!(manager.component_state(a), Some(ComponentState::Initialized));
        assert_eq!(manager.component_state(c), Some(ComponentState::Uninitialized));
        assert_eq!(manager.state(), ManagerState::Uninitialized);
    }

    #[test]
    fn zero_duration_runs_no_timesteps() {
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(0));
        builder.register(Recorder::new("A", &log), DependencyLists::none()).unwrap();
        let mut manager = builder.build().unwrap();
        manager.initialize().unwrap();

        let summary = manager.run_simulation(&mut NoopObserver).unwrap();
        assert_eq!(summary.timesteps, 0);
        manager.shutdown().unwrap();
        assert_eq!(log.entries(), vec!["init:A", "shutdown:A"]);
    }

    #[test]
    fn duration_rounds_up_to_whole_timesteps() {
        let log = Log::default();
        let mut cfg = config(7);
        cfg.timestep_duration_secs = 3;
        let mut builder = ManagerBuilder::new(cfg);
        builder.register(Recorder::new("A", &log), DependencyLists::none()).unwrap();
        let mut manager = builder.build().unwrap();
        manager.initialize().unwrap();

        assert_eq!(manager.run_simulation(&mut NoopObserver).unwrap().timesteps, 3);
        assert_eq!(manager.clock().elapsed_secs(), 9);
    }

    #[test]
    fn stepping_then_running_continues_the_counter() {
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(5));
        builder.register(Recorder::new("A", &log), DependencyLists::none()).unwrap();
        let mut manager = builder.build().unwrap();
        manager.initialize().unwrap();

        assert_eq!(manager.run_timesteps(2, &mut NoopObserver).unwrap().timesteps, 2);
        assert_eq!(manager.current_timestep(), Timestep(2));
        assert_eq!(manager.run_simulation(&mut NoopObserver).unwrap().timesteps, 5);
        assert_eq!(
            log.with_prefix("advance"),
            (0..5).map(|t| format!("advance:A@T{t}")).collect::<Vec<_>>()
        );
    }
}

// ── Manager state machine ─────────────────────────────────────────────────────

#[cfg(test)]
mod manager_state {
    use super::*;
    use crate::{manager_state_name, manager_status_name};

    fn single() -> Manager {
        let mut builder = ManagerBuilder::new(config(2));
        builder.register(sim_component::NoopComponent::new(), DependencyLists::none()).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn run_before_initialize_rejected() {
        let mut manager = single();
        let err = manager.run_simulation(&mut NoopObserver).unwrap_err();
        assert!(matches!(
            err,
            ManagerError::UnsupportedManagerStateTransition {
                from: ManagerState::Uninitialized,
                to:   ManagerState::RunningSimulation,
            }
        ));
        assert_eq!(err.status(), ManagerStatus::UnsupportedManagerStateTransition);
    }

    #[test]
    fn initialize_twice_rejected() {
        let mut manager = single();
        manager.initialize().unwrap();
        assert!(matches!(
            manager.initialize(),
            Err(ManagerError::UnsupportedManagerStateTransition { from: ManagerState::Initialized, .. })
        ));
    }

    #[test]
    fn shutdown_before_initialize_rejected() {
        let mut manager = single();
        assert!(manager.shutdown().is_err());
        assert_eq!(manager.state(), ManagerState::Uninitialized);
    }

    #[test]
    fn nothing_runs_after_shutdown() {
        let mut manager = single();
        manager.initialize().unwrap();
        manager.run_simulation(&mut NoopObserver).unwrap();
        manager.shutdown().unwrap();
        assert_eq!(manager.state(), ManagerState::ShutdownComplete);

        assert!(manager.run_simulation(&mut NoopObserver).is_err());
        assert!(manager.run_timesteps(1, &mut NoopObserver).is_err());
        assert!(manager.initialize().is_err());
        assert!(manager.shutdown().is_err());
    }

    #[test]
    fn transition_table() {
        use crate::ManagerState::*;
        assert!(ManagerState::allows(Uninitialized, Initialized));
        assert!(ManagerState::allows(Initialized, RunningSimulation));
        assert!(ManagerState::allows(Initialized, ShutdownComplete));
        assert!(ManagerState::allows(RunningSimulation, ShutdownComplete));
        assert!(!ManagerState::allows(Uninitialized, RunningSimulation));
        assert!(!ManagerState::allows(RunningSimulation, Initialized));
        for to in ManagerState::ALL {
            assert!(!ManagerState::allows(ShutdownComplete, to));
        }
    }

    #[test]
    fn name_tables() {
        assert_eq!(manager_state_name(2), Some("RUNNING_SIMULATION"));
        assert_eq!(manager_state_name(ManagerState::COUNT as u32), None);
        assert_eq!(manager_status_name(0), Some("SUCCESS"));
        assert_eq!(manager_status_name(99), None);
        assert_eq!(ManagerStatus::ShutdownFailed.to_string(), "SHUTDOWN_FAILED");
    }

    #[test]
    fn zero_length_timestep_rejected_by_builder() {
        let mut cfg = config(5);
        cfg.timestep_duration_secs = 0;
        let err = ManagerBuilder::new(cfg).build().err().unwrap();
        assert!(matches!(err, ManagerError::Config(ref msg) if msg.contains("timestep_duration_secs")));
    }

    #[test]
    fn duplicate_insert_rejected_by_builder() {
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(1));
        insert(&mut builder, 4, Recorder::new("A", &log), DependencyLists::none());
        let err = builder
            .insert(ComponentId(4), Box::new(Recorder::new("B", &log)), DependencyLists::none())
            .unwrap_err();
        assert!(matches!(err, ManagerError::Config(_)));
    }
}

// ── Shutdown drain ────────────────────────────────────────────────────────────

#[cfg(test)]
mod shutdown {
    use super::*;

    #[test]
    fn shutdown_follows_its_own_order() {
        // A(0) initializes before B(1) but must shut down after it.
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(1));
        insert(&mut builder, 0, Recorder::new("A", &log), DependencyLists::none().with_shutdown(&ids(&[1])));
        insert(
            &mut builder,
            1,
            Recorder::new("B", &log),
            DependencyLists::none().with_init(&ids(&[0])).with_advance(&ids(&[0])),
        );
        let mut manager = builder.build().unwrap();
        manager.initialize().unwrap();
        manager.run_simulation(&mut NoopObserver).unwrap();
        manager.shutdown().unwrap();

        assert_eq!(log.with_prefix("init"), vec!["init:A", "init:B"]);
        assert_eq!(log.with_prefix("shutdown"), vec!["shutdown:B", "shutdown:A"]);
    }

    #[test]
    fn failures_are_collected_and_every_component_is_attempted() {
        // X fails; Y needs X shut down first; Z is independent.
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(2));
        let x = builder.register(Recorder::new("X", &log).failing(Fail::Shutdown), DependencyLists::none()).unwrap();
        let y = builder.register(Recorder::new("Y", &log), DependencyLists::none().with_shutdown(&[x])).unwrap();
        let z = builder.register(Recorder::new("Z", &log), DependencyLists::none()).unwrap();
        let mut manager = builder.build().unwrap();
        manager.initialize().unwrap();
        manager.run_simulation(&mut NoopObserver).unwrap();

        let err = manager.shutdown().unwrap_err();
        let ManagerError::ShutdownFailed { failures } = &err else {
            panic!("expected ShutdownFailed, got {err:?}");
        };
        let failed: Vec<ComponentId> = failures.iter().map(|(id, _)| *id).collect();
        assert_eq!(failed, vec![x, y]);
        assert!(matches!(failures[0].1, ComponentError::Failure(_)));
        assert_eq!(
            failures[1].1,
            ComponentError::UnsupportedShutdownDependency {
                dependency: x,
                state:      ComponentState::ReadyForShutdown,
            }
        );
        assert_eq!(err.to_string(), "2 component(s) failed to shut down");

        assert_eq!(log.with_prefix("shutdown"), vec!["shutdown:Z"]);
        assert_eq!(manager.component_state(z), Some(ComponentState::ShutdownComplete));
        assert_eq!(manager.state(), ManagerState::ShutdownComplete);
    }

    #[test]
    fn components_stuck_mid_cycle_are_reported() {
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(4));
        let a = builder.register(
            Recorder::new("A", &log).failing(Fail::AdvanceAt(2)),
            DependencyLists::none(),
        ).unwrap();
        let b = builder.register(Recorder::new("B", &log), DependencyLists::none().with_advance(&[a])).unwrap();
        let mut manager = builder.build().unwrap();
        manager.initialize().unwrap();
        assert!(manager.run_simulation(&mut NoopObserver).is_err());

        // A is WaitingForTimestepAdvance and cannot prepare; B waits on A
        // and was never advanced at T2 either.
        let err = manager.shutdown().unwrap_err();
        let ManagerError::ShutdownFailed { failures } = err else {
            panic!("expected ShutdownFailed");
        };
        let failed: Vec<ComponentId> = failures.iter().map(|(id, _)| *id).collect();
        assert_eq!(failed, vec![a, b]);
        assert!(log.with_prefix("shutdown").is_empty());
        assert_eq!(manager.state(), ManagerState::ShutdownComplete);
    }

    #[test]
    fn shutdown_cycle_aborts_before_any_call() {
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(1));
        insert(&mut builder, 0, Recorder::new("A", &log), DependencyLists::none().with_shutdown(&ids(&[1])));
        insert(&mut builder, 1, Recorder::new("B", &log), DependencyLists::none().with_shutdown(&ids(&[0])));
        let mut manager = builder.build().unwrap();
        manager.initialize().unwrap();

        assert!(matches!(
            manager.shutdown(),
            Err(ManagerError::Resolve(ResolveError::CyclicDependency { phase: Phase::Shutdown, .. }))
        ));
        assert!(log.with_prefix("shutdown").is_empty());
        assert_eq!(manager.state(), ManagerState::Initialized);
        assert_eq!(manager.component_state(ComponentId(0)), Some(ComponentState::Initialized));
    }
}

// ── Rewards and aggregation ───────────────────────────────────────────────────

#[cfg(test)]
mod rewards {
    use super::*;
    use crate::{RewardAggregator, SumRewards};

    fn sample() -> TimestepRewards {
        TimestepRewards::new(
            Timestep(4),
            vec![(ComponentId(2), -3), (ComponentId(0), 5), (ComponentId(1), 10)],
        )
    }

    #[test]
    fn rewards_sorted_by_id() {
        let r = sample();
        let ids: Vec<_> = r.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, super::ids(&[0, 1, 2]));
        assert_eq!(r.get(ComponentId(2)), Some(-3));
        assert_eq!(r.get(ComponentId(9)), None);
    }

    #[test]
    fn sum() {
        assert_eq!(SumRewards.aggregate(&sample()), 12);
    }

    #[test]
    fn weighted_defaults_to_one() {
        let agg = WeightedRewards::new().weight(ComponentId(1), 3).weight(ComponentId(2), 0);
        assert_eq!(agg.aggregate(&sample()), 5 + 30);
        assert_eq!(agg.weight_of(ComponentId(7)), 1);
    }

    #[test]
    fn min_picks_worst_component() {
        assert_eq!(MinRewards.aggregate(&sample()), -3);
    }

    #[test]
    fn empty_reward_sets_aggregate_to_zero() {
        let empty = TimestepRewards::new(Timestep(0), Vec::new());
        assert_eq!(SumRewards.aggregate(&empty), 0);
        assert_eq!(MinRewards.aggregate(&empty), 0);
        assert_eq!(WeightedRewards::new().aggregate(&empty), 0);
    }

    #[test]
    fn sums_do_not_overflow_i32() {
        let r = TimestepRewards::new(Timestep(0), vec![(ComponentId(0), i32::MAX), (ComponentId(1), i32::MAX)]);
        assert_eq!(SumRewards.aggregate(&r), 2 * i64::from(i32::MAX));
    }

    #[test]
    fn weighted_products_saturate() {
        let r = TimestepRewards::new(Timestep(0), vec![(ComponentId(0), 2), (ComponentId(1), 1)]);
        let up = WeightedRewards::new().weight(ComponentId(0), i64::MAX);
        assert_eq!(up.aggregate(&r), i64::MAX);
        let down = WeightedRewards::new().weight(ComponentId(0), i64::MIN).weight(ComponentId(1), i64::MIN);
        assert_eq!(down.aggregate(&r), i64::MIN);
    }

    #[test]
    fn running_total_saturates() {
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(3));
        builder.register(Recorder::new("A", &log).reward(2), DependencyLists::none()).unwrap();
        let mut manager = builder
            .aggregator(WeightedRewards::new().weight(ComponentId(0), i64::MAX / 2))
            .build()
            .unwrap();
        manager.initialize().unwrap();

        let summary = manager.run_simulation(&mut NoopObserver).unwrap();
        assert_eq!(summary.timesteps, 3);
        assert_eq!(summary.total_reward, i64::MAX);
    }

    #[test]
    fn manager_folds_rewards_every_timestep() {
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(3));
        builder.register(Recorder::new("A", &log).reward(2), DependencyLists::none()).unwrap();
        builder.register(Recorder::new("B", &log).reward(3), DependencyLists::none()).unwrap();
        let mut manager = builder.build().unwrap();
        manager.initialize().unwrap();

        let mut observer = EventObserver::default();
        let summary = manager.run_simulation(&mut observer).unwrap();
        assert_eq!(observer.aggregates, vec![5, 5, 5]);
        assert_eq!(summary.total_reward, 15);
        assert_eq!(manager.total_reward(), 15);
    }

    #[test]
    fn configured_aggregator_is_used() {
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(2));
        builder.register(Recorder::new("A", &log).reward(2), DependencyLists::none()).unwrap();
        builder.register(Recorder::new("B", &log).reward(-4), DependencyLists::none()).unwrap();
        let mut manager = builder.aggregator(MinRewards).build().unwrap();
        manager.initialize().unwrap();

        let mut observer = EventObserver::default();
        manager.run_simulation(&mut observer).unwrap();
        assert_eq!(observer.aggregates, vec![-4, -4]);
        assert_eq!(manager.total_reward(), -8);
    }
}

// ── Observer callbacks ────────────────────────────────────────────────────────

#[cfg(test)]
mod observer {
    use super::*;

    #[test]
    fn callbacks_fire_in_order() {
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(2));
        builder.register(Recorder::new("A", &log), DependencyLists::none()).unwrap();
        let mut manager = builder.build().unwrap();

        let mut observer = EventObserver::default();
        manager.initialize_with(&mut observer).unwrap();
        manager.run_simulation(&mut observer).unwrap();
        manager.shutdown_with(&mut observer).unwrap();

        assert_eq!(
            observer.events,
            vec![
                "start:init",
                "end:init",
                "start:advance",
                "timestep:T0",
                "timestep:T1",
                "end:advance",
                "run_end:T2",
                "start:shutdown",
                "end:shutdown",
            ]
        );
    }

    #[test]
    fn run_timesteps_skips_run_end() {
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(10));
        builder.register(Recorder::new("A", &log), DependencyLists::none()).unwrap();
        let mut manager = builder.build().unwrap();
        manager.initialize().unwrap();

        let mut observer = EventObserver::default();
        manager.run_timesteps(1, &mut observer).unwrap();
        assert_eq!(observer.events, vec!["start:advance", "timestep:T0", "end:advance"]);
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod logging {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn run_emits_phase_events() {
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(1));
        builder.register(Recorder::new("A", &log), DependencyLists::none()).unwrap();
        let mut manager = builder.build().unwrap();
        manager.initialize().unwrap();
        manager.run_simulation(&mut NoopObserver).unwrap();
        manager.shutdown().unwrap();

        assert!(logs_contain("initializing components"));
        assert!(logs_contain("running simulation"));
        assert!(logs_contain("run complete"));
        assert!(logs_contain("shutting down components"));
    }

    #[traced_test]
    #[test]
    fn shutdown_failures_are_warned() {
        let log = Log::default();
        let mut builder = ManagerBuilder::new(config(1));
        builder.register(Recorder::new("A", &log).failing(Fail::Shutdown), DependencyLists::none()).unwrap();
        let mut manager = builder.build().unwrap();
        manager.initialize().unwrap();
        assert!(manager.shutdown().is_err());

        assert!(logs_contain("component failed to shut down"));
        assert!(logs_contain("flush failed"));
    }
}
