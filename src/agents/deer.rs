use tracing::debug;

use super::{step_toward, Agent, Role};
use crate::config::HerdConfig;
use crate::world::{Commit, WorldSnapshot};

/// Deer count for next month.
///
/// The herd drifts one animal toward the grain-derived carrying capacity,
/// then loses `wolves * wolf_impact` to predation. The loss is applied in
/// floating point and the result truncated toward zero before clamping.
pub fn next_deer(snapshot: &WorldSnapshot, herd: &HerdConfig) -> u32 {
    let capacity = snapshot.grain_height.trunc() as i64;
    let drifted = step_toward(snapshot.deer as i64, capacity);
    let predation = snapshot.wolves as f32 * herd.wolf_impact;
    let remaining = (drifted as f32 - predation).trunc();
    remaining.max(0.0) as u32
}

pub struct DeerAgent {
    config: HerdConfig,
}

impl DeerAgent {
    pub fn new(config: HerdConfig) -> Self {
        Self { config }
    }
}

impl Default for DeerAgent {
    fn default() -> Self {
        Self::new(HerdConfig::default())
    }
}

impl Agent for DeerAgent {
    fn role(&self) -> Role {
        Role::Deer
    }

    fn plan(&mut self, snapshot: &WorldSnapshot) -> Commit {
        let deer = next_deer(snapshot, &self.config);
        debug!(from = snapshot.deer, to = deer, "deer planned");
        Commit::Deer(deer)
    }
}
