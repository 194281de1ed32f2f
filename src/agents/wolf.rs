use tracing::debug;

use super::{step_toward, Agent, Role};
use crate::config::HerdConfig;
use crate::world::{Commit, WorldSnapshot};

/// Wolf count for next month: one step toward `trunc(deer / deer_per_wolf)`.
pub fn next_wolves(snapshot: &WorldSnapshot, herd: &HerdConfig) -> u32 {
    let ideal = (snapshot.deer as f32 / herd.deer_per_wolf).trunc() as i64;
    step_toward(snapshot.wolves as i64, ideal).max(0) as u32
}

pub struct WolfAgent {
    config: HerdConfig,
}

impl WolfAgent {
    pub fn new(config: HerdConfig) -> Self {
        Self { config }
    }
}

impl Default for WolfAgent {
    fn default() -> Self {
        Self::new(HerdConfig::default())
    }
}

impl Agent for WolfAgent {
    fn role(&self) -> Role {
        Role::Wolf
    }

    fn plan(&mut self, snapshot: &WorldSnapshot) -> Commit {
        let wolves = next_wolves(snapshot, &self.config);
        debug!(from = snapshot.wolves, to = wolves, "wolves planned");
        Commit::Wolves(wolves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(deer: u32, wolves: u32) -> WorldSnapshot {
        WorldSnapshot {
            year: 2024,
            month: 0,
            temperature: 50.0,
            precipitation: 10.0,
            grain_height: 25.0,
            deer,
            wolves,
        }
    }

    #[test]
    fn test_wolves_follow_deer_supply() {
        let herd = HerdConfig::default();
        // 10 / 3.7 = 2.7, ideal 2
        assert_eq!(next_wolves(&snapshot(10, 0), &herd), 1);
        assert_eq!(next_wolves(&snapshot(10, 1), &herd), 2);
        assert_eq!(next_wolves(&snapshot(10, 2), &herd), 2);
    }

    #[test]
    fn test_wolves_starve_without_deer() {
        let herd = HerdConfig::default();
        assert_eq!(next_wolves(&snapshot(0, 3), &herd), 2);
        assert_eq!(next_wolves(&snapshot(0, 0), &herd), 0);
    }
}
