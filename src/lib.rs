pub mod agents;
pub mod barrier;
pub mod config;
pub mod engine;
pub mod logging;
pub mod report;
pub mod rng;
pub mod world;

pub use barrier::Barrier;
pub use config::SimulationConfig;
pub use engine::{EngineError, RunSummary, Simulation, SimulationBuilder};
pub use world::{SharedWorld, WorldSnapshot};
