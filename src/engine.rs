use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::agents::{Agent, DeerAgent, EnvironmentAgent, GrainAgent, Role, WolfAgent};
use crate::barrier::Barrier;
use crate::config::{ConfigError, SimulationConfig, AGENT_COUNT};
use crate::report::{ConsoleReporter, ReportFormat, Reporter};
use crate::rng::{seeded_rng, RandomSource};
use crate::world::{SharedWorld, WorldSnapshot};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Workers spawned before the failure stay parked at the barrier.
    #[error("failed to spawn {role} worker: {source}")]
    Spawn {
        role: Role,
        #[source]
        source: std::io::Error,
    },
    /// Returned when the environment worker, the only one running injected
    /// code, panics. Its peers stay parked at the barrier. A panic in one of
    /// the other workers hangs the join instead, like a miscounted team.
    #[error("{0} worker panicked")]
    AgentPanicked(Role),
}

pub struct SimulationBuilder {
    config: SimulationConfig,
    rng: Option<Box<dyn RandomSource>>,
    reporter: Option<Box<dyn Reporter>>,
}

impl SimulationBuilder {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            rng: None,
            reporter: None,
        }
    }

    /// Replaces the seeded ChaCha generator, e.g. with a test double.
    pub fn with_random_source(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    /// Replaces the default stdout CSV reporter.
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    pub fn build(self) -> Result<Simulation, EngineError> {
        let config = self.config;
        config.validate()?;

        let (rng, seed): (Box<dyn RandomSource>, Option<u64>) = match self.rng {
            Some(rng) => (rng, None),
            None => {
                let (rng, seed) = seeded_rng(config.seed);
                (Box::new(rng) as Box<dyn RandomSource>, Some(seed))
            }
        };
        let reporter = self
            .reporter
            .unwrap_or_else(|| Box::new(ConsoleReporter::new(ReportFormat::Csv)));

        let environment = EnvironmentAgent::new(config.climate.clone(), rng, reporter);
        let initial = config.initial_snapshot();

        let agents: Vec<Box<dyn Agent>> = vec![
            Box::new(GrainAgent::new(config.grain.clone())),
            Box::new(DeerAgent::new(config.herd.clone())),
            Box::new(WolfAgent::new(config.herd.clone())),
            Box::new(environment),
        ];

        Ok(Simulation {
            world: Arc::new(SharedWorld::new(initial)),
            barrier: Arc::new(Barrier::new(AGENT_COUNT)),
            agents,
            initial,
            end_year: config.calendar.end_year,
            expected_cycles: config.expected_cycles(),
            seed,
        })
    }
}

/// Four agents, one barrier, one world. Consumed by [`Simulation::run`].
pub struct Simulation {
    world: Arc<SharedWorld>,
    barrier: Arc<Barrier>,
    agents: Vec<Box<dyn Agent>>,
    initial: WorldSnapshot,
    end_year: i32,
    expected_cycles: u64,
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentReport {
    pub role: Role,
    pub cycles: u64,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub cycles: u64,
    pub initial_snapshot: WorldSnapshot,
    pub final_snapshot: WorldSnapshot,
    pub barrier_generations: u64,
    pub agents: Vec<AgentReport>,
    /// Seed of the built-in generator; `None` when a custom source was used.
    pub seed: Option<u64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl Simulation {
    pub fn builder(config: SimulationConfig) -> SimulationBuilder {
        SimulationBuilder::new(config)
    }

    /// World as it stands before any worker starts.
    pub fn initial_snapshot(&self) -> WorldSnapshot {
        self.initial
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Runs every agent on its own thread until the shared year reaches the
    /// end year, then joins them.
    pub fn run(self) -> Result<RunSummary, EngineError> {
        let started_at = Utc::now();
        info!(
            year = self.initial.year,
            month = self.initial.month,
            end_year = self.end_year,
            seed = ?self.seed,
            "simulation starting"
        );

        let mut handles: Vec<(Role, JoinHandle<AgentReport>)> = Vec::with_capacity(AGENT_COUNT);
        for agent in self.agents {
            let role = agent.role();
            let world = Arc::clone(&self.world);
            let barrier = Arc::clone(&self.barrier);
            let end_year = self.end_year;
            let handle = thread::Builder::new()
                .name(format!("meadow-{role}"))
                .spawn(move || run_agent(agent, &world, &barrier, end_year))
                .map_err(|source| EngineError::Spawn { role, source })?;
            handles.push((role, handle));
        }

        // environment first: it is the only worker that can panic mid-run
        let mut agents = Vec::with_capacity(handles.len());
        for (role, handle) in handles.into_iter().rev() {
            let report = handle
                .join()
                .map_err(|_| EngineError::AgentPanicked(role))?;
            agents.push(report);
        }
        agents.reverse();

        let cycles = agents.first().map(|report| report.cycles).unwrap_or(0);
        if agents
            .iter()
            .any(|report| report.cycles != self.expected_cycles)
        {
            warn!(expected = self.expected_cycles, ?agents, "unexpected cycle count");
        }

        let summary = RunSummary {
            cycles,
            initial_snapshot: self.initial,
            final_snapshot: self.world.snapshot(),
            barrier_generations: self.barrier.generation(),
            agents,
            seed: self.seed,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            cycles = summary.cycles,
            deer = summary.final_snapshot.deer,
            wolves = summary.final_snapshot.wolves,
            grain_height = summary.final_snapshot.grain_height,
            "simulation finished"
        );
        Ok(summary)
    }
}

/// Worker loop: read, wait, commit, wait, settle, wait.
fn run_agent(
    mut agent: Box<dyn Agent>,
    world: &SharedWorld,
    barrier: &Barrier,
    end_year: i32,
) -> AgentReport {
    let role = agent.role();
    let mut cycles = 0;
    while world.year() < end_year {
        let snapshot = world.snapshot();
        let commit = agent.plan(&snapshot);
        debug_assert!(role.owns(&commit), "{role} produced {commit:?}");
        barrier.wait();

        world.apply(commit);
        barrier.wait();

        agent.settle(&world.snapshot());
        barrier.wait();
        cycles += 1;
    }
    debug!(%role, cycles, "agent done");
    AgentReport { role, cycles }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryReporter;

    fn short_config(end_year: i32) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.calendar.end_year = end_year;
        config.seed = Some(11);
        config
    }

    #[test]
    fn test_build_leaves_weather_unset() {
        let sim = Simulation::builder(short_config(2025))
            .with_reporter(MemoryReporter::new())
            .build()
            .unwrap();
        let initial = sim.initial_snapshot();
        assert_eq!(initial.year, 2024);
        assert_eq!(initial.month, 0);
        assert_eq!(initial.temperature, 0.0);
        assert_eq!(initial.precipitation, 0.0);
        assert_eq!(sim.seed(), Some(11));
    }

    #[test]
    fn test_first_month_grows_from_cold_dry_start() {
        let reporter = MemoryReporter::new();
        Simulation::builder(short_config(2025))
            .with_reporter(reporter.clone())
            .build()
            .unwrap()
            .run()
            .unwrap();
        // 0 F and 0 in: 25 + 12 * e^-25 * e^-1 - 3 deer * 2
        let expected = 25.0 + 12.0 * (-25.0f32).exp() * (-1.0f32).exp() - 6.0;
        let height_in = reporter.reports()[0].height_cm / 2.54;
        assert!((height_in - expected).abs() < 1e-3, "{height_in} vs {expected}");
    }

    struct PanickingReporter;

    impl Reporter for PanickingReporter {
        fn emit(&mut self, _report: &crate::report::MonthlyReport) {
            panic!("reporter failed");
        }
    }

    #[test]
    fn test_reporter_panic_surfaces_as_error() {
        let sim = Simulation::builder(short_config(2025))
            .with_reporter(PanickingReporter)
            .build()
            .unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(sim.run());
        });
        let result = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("run should return instead of hanging");
        assert!(matches!(
            result,
            Err(EngineError::AgentPanicked(Role::Environment))
        ));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let result = Simulation::builder(short_config(2000))
            .with_reporter(MemoryReporter::new())
            .build();
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_one_year_run() {
        let reporter = MemoryReporter::new();
        let summary = Simulation::builder(short_config(2025))
            .with_reporter(reporter.clone())
            .build()
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(summary.cycles, 12);
        assert_eq!(summary.barrier_generations, 36);
        assert_eq!(summary.final_snapshot.year, 2025);
        assert_eq!(summary.final_snapshot.month, 0);
        assert_eq!(reporter.len(), 12);
    }

    #[test]
    fn test_zero_length_run() {
        let reporter = MemoryReporter::new();
        let summary = Simulation::builder(short_config(2024))
            .with_reporter(reporter.clone())
            .build()
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(summary.cycles, 0);
        assert_eq!(summary.barrier_generations, 0);
        assert!(reporter.is_empty());
    }
}
