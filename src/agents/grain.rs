use tracing::debug;

use super::{Agent, Role};
use crate::config::GrainConfig;
use crate::world::{Commit, WorldSnapshot};

fn suitability(value: f32, ideal: f32, spread: f32) -> f32 {
    let z = (value - ideal) / spread;
    (-(z * z)).exp()
}

/// Grain height after one month of growth and grazing, never below zero.
pub fn next_height(snapshot: &WorldSnapshot, grain: &GrainConfig) -> f32 {
    let temp_factor = suitability(snapshot.temperature, grain.ideal_temp, grain.temp_spread);
    let precip_factor = suitability(
        snapshot.precipitation,
        grain.ideal_precip,
        grain.precip_spread,
    );
    let grown = temp_factor * precip_factor * grain.grows_per_month;
    let eaten = snapshot.deer as f32 * grain.eaten_per_deer;
    (snapshot.grain_height + grown - eaten).max(0.0)
}

pub struct GrainAgent {
    config: GrainConfig,
}

impl GrainAgent {
    pub fn new(config: GrainConfig) -> Self {
        Self { config }
    }
}

impl Default for GrainAgent {
    fn default() -> Self {
        Self::new(GrainConfig::default())
    }
}

impl Agent for GrainAgent {
    fn role(&self) -> Role {
        Role::Grain
    }

    fn plan(&mut self, snapshot: &WorldSnapshot) -> Commit {
        let height = next_height(snapshot, &self.config);
        debug!(from = snapshot.grain_height, to = height, "grain planned");
        Commit::GrainHeight(height)
    }
}
