//! The four fixed roles that share the world.
//!
//! Each agent is split into the two halves of a cycle: [`Agent::plan`] reads
//! the previous month's snapshot and returns the value to commit, and
//! [`Agent::settle`] runs after every role has committed.

mod deer;
mod environment;
mod grain;
mod wolf;

use std::fmt;

pub use deer::{next_deer, DeerAgent};
pub use environment::{seasonal_means, seasonal_weather, EnvironmentAgent, Weather};
pub use grain::{next_height, GrainAgent};
pub use wolf::{next_wolves, WolfAgent};

use crate::world::{Commit, WorldSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Grain,
    Deer,
    Wolf,
    Environment,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Grain, Role::Deer, Role::Wolf, Role::Environment];

    pub fn name(self) -> &'static str {
        match self {
            Role::Grain => "grain",
            Role::Deer => "deer",
            Role::Wolf => "wolf",
            Role::Environment => "environment",
        }
    }

    /// Whether this role is the single writer of the fields in `commit`.
    pub fn owns(self, commit: &Commit) -> bool {
        matches!(
            (self, commit),
            (Role::Grain, Commit::GrainHeight(_))
                | (Role::Deer, Commit::Deer(_))
                | (Role::Wolf, Commit::Wolves(_))
                | (Role::Environment, Commit::Environment { .. })
        )
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub trait Agent: Send {
    fn role(&self) -> Role;

    /// Computes next month's value for the fields this agent owns.
    fn plan(&mut self, snapshot: &WorldSnapshot) -> Commit;

    /// Called once all agents have committed for the month.
    fn settle(&mut self, _snapshot: &WorldSnapshot) {}
}

/// Moves `current` one unit toward `target`, holding on a tie.
pub fn step_toward(current: i64, target: i64) -> i64 {
    match current.cmp(&target) {
        std::cmp::Ordering::Less => current + 1,
        std::cmp::Ordering::Greater => current - 1,
        std::cmp::Ordering::Equal => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_toward() {
        assert_eq!(step_toward(3, 25), 4);
        assert_eq!(step_toward(30, 25), 29);
        assert_eq!(step_toward(25, 25), 25);
    }

    #[test]
    fn test_each_role_owns_one_commit_kind() {
        let commits = [
            Commit::GrainHeight(1.0),
            Commit::Deer(1),
            Commit::Wolves(1),
            Commit::Environment {
                temperature: 0.0,
                precipitation: 0.0,
                month: 0,
                year: 2024,
            },
        ];
        for role in Role::ALL {
            let owned = commits.iter().filter(|c| role.owns(c)).count();
            assert_eq!(owned, 1, "{role} should own exactly one commit kind");
        }
    }
}
