use std::f32::consts::PI;

use tracing::debug;

use super::{Agent, Role};
use crate::config::ClimateConfig;
use crate::report::{MonthlyReport, Reporter};
use crate::rng::RandomSource;
use crate::world::{Commit, WorldSnapshot};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weather {
    /// Degrees Fahrenheit.
    pub temperature: f32,
    /// Inches, never negative.
    pub precipitation: f32,
}

/// Seasonal means for `month`: the phase sits mid-month, 30 degrees per month.
pub fn seasonal_means(month: u32, climate: &ClimateConfig) -> Weather {
    let angle = (30.0 * month as f32 + 15.0) * (PI / 180.0);
    Weather {
        temperature: climate.avg_temp - climate.amp_temp * angle.cos(),
        precipitation: climate.avg_precip + climate.amp_precip * angle.sin(),
    }
}

/// Seasonal weather for `month` with bounded noise drawn from `rng`.
pub fn seasonal_weather(
    month: u32,
    climate: &ClimateConfig,
    rng: &mut dyn RandomSource,
) -> Weather {
    let means = seasonal_means(month, climate);
    let temperature =
        means.temperature + rng.uniform(-climate.random_temp, climate.random_temp);
    let precipitation =
        means.precipitation + rng.uniform(-climate.random_precip, climate.random_precip);
    Weather {
        temperature,
        precipitation: precipitation.max(0.0),
    }
}

/// Owns the weather and the calendar, and reports each finished month.
pub struct EnvironmentAgent {
    config: ClimateConfig,
    rng: Box<dyn RandomSource>,
    reporter: Box<dyn Reporter>,
}

impl EnvironmentAgent {
    pub fn new(
        config: ClimateConfig,
        rng: Box<dyn RandomSource>,
        reporter: Box<dyn Reporter>,
    ) -> Self {
        Self {
            config,
            rng,
            reporter,
        }
    }

}

impl Agent for EnvironmentAgent {
    fn role(&self) -> Role {
        Role::Environment
    }

    fn plan(&mut self, snapshot: &WorldSnapshot) -> Commit {
        let weather = seasonal_weather(snapshot.month, &self.config, self.rng.as_mut());
        let (month, year) = snapshot.next_calendar();
        debug!(
            temperature = weather.temperature,
            precipitation = weather.precipitation,
            month,
            year,
            "environment planned"
        );
        Commit::Environment {
            temperature: weather.temperature,
            precipitation: weather.precipitation,
            month,
            year,
        }
    }

    fn settle(&mut self, snapshot: &WorldSnapshot) {
        self.reporter.emit(&MonthlyReport::from_snapshot(snapshot));
    }
}
