use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

pub const MONTHS_PER_YEAR: u32 = 12;

/// One consistent month of world state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub year: i32,
    pub month: u32,
    /// Degrees Fahrenheit.
    pub temperature: f32,
    /// Inches of rain this month.
    pub precipitation: f32,
    /// Inches.
    pub grain_height: f32,
    pub deer: u32,
    pub wolves: u32,
}

impl WorldSnapshot {
    /// Month and year after this one.
    pub fn next_calendar(&self) -> (u32, i32) {
        advance_calendar(self.month, self.year)
    }
}

pub fn advance_calendar(month: u32, year: i32) -> (u32, i32) {
    let next = month + 1;
    if next >= MONTHS_PER_YEAR {
        (0, year + 1)
    } else {
        (next, year)
    }
}

/// The value one agent writes back at the end of a cycle.
///
/// Each variant covers only the fields its role owns, so an agent has no way
/// to express a write to somebody else's field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Commit {
    GrainHeight(f32),
    Deer(u32),
    Wolves(u32),
    Environment {
        temperature: f32,
        precipitation: f32,
        month: u32,
        year: i32,
    },
}

/// Shared world handle passed to every agent worker.
///
/// Fields are plain atomics accessed with relaxed ordering. Cross-thread
/// visibility comes from the barrier: every commit is followed by a barrier
/// wait and every read is preceded by one, and the barrier's mutex orders
/// them.
#[derive(Debug)]
pub struct SharedWorld {
    year: AtomicI32,
    month: AtomicU32,
    temperature: AtomicU32,
    precipitation: AtomicU32,
    grain_height: AtomicU32,
    deer: AtomicU32,
    wolves: AtomicU32,
}

impl SharedWorld {
    pub fn new(initial: WorldSnapshot) -> Self {
        Self {
            year: AtomicI32::new(initial.year),
            month: AtomicU32::new(initial.month),
            temperature: AtomicU32::new(initial.temperature.to_bits()),
            precipitation: AtomicU32::new(initial.precipitation.to_bits()),
            grain_height: AtomicU32::new(initial.grain_height.to_bits()),
            deer: AtomicU32::new(initial.deer),
            wolves: AtomicU32::new(initial.wolves),
        }
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            year: self.year.load(Ordering::Relaxed),
            month: self.month.load(Ordering::Relaxed),
            temperature: f32::from_bits(self.temperature.load(Ordering::Relaxed)),
            precipitation: f32::from_bits(self.precipitation.load(Ordering::Relaxed)),
            grain_height: f32::from_bits(self.grain_height.load(Ordering::Relaxed)),
            deer: self.deer.load(Ordering::Relaxed),
            wolves: self.wolves.load(Ordering::Relaxed),
        }
    }

    pub fn year(&self) -> i32 {
        self.year.load(Ordering::Relaxed)
    }

    /// Writes the owned fields named by `commit`. Only call from the commit
    /// phase, between the first and second barrier wait of a cycle.
    pub fn apply(&self, commit: Commit) {
        match commit {
            Commit::GrainHeight(height) => {
                self.grain_height
                    .store(height.max(0.0).to_bits(), Ordering::Relaxed);
            }
            Commit::Deer(count) => self.deer.store(count, Ordering::Relaxed),
            Commit::Wolves(count) => self.wolves.store(count, Ordering::Relaxed),
            Commit::Environment {
                temperature,
                precipitation,
                month,
                year,
            } => {
                self.temperature
                    .store(temperature.to_bits(), Ordering::Relaxed);
                self.precipitation
                    .store(precipitation.max(0.0).to_bits(), Ordering::Relaxed);
                self.month.store(month, Ordering::Relaxed);
                self.year.store(year, Ordering::Relaxed);
            }
        }
    }
}
