//! Simulation configuration
//!
//! Every section is optional in YAML; missing values fall back to the stock
//! meadow constants.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::{WorldSnapshot, MONTHS_PER_YEAR};

/// Number of agent roles, and therefore barrier participants.
pub const AGENT_COUNT: usize = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub calendar: CalendarConfig,
    pub initial: InitialConfig,
    pub grain: GrainConfig,
    pub herd: HerdConfig,
    pub climate: ClimateConfig,
    /// Fixed RNG seed. Seeded from the wall clock when absent.
    pub seed: Option<u64>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub start_year: i32,
    pub start_month: u32,
    /// The run stops once the shared year reaches this value.
    pub end_year: i32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            start_year: 2024,
            start_month: 0,
            end_year: 2030,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConfig {
    /// Degrees Fahrenheit seen by the first grain cycle.
    pub temperature: f32,
    /// Inches seen by the first grain cycle.
    pub precipitation: f32,
    pub grain_height: f32,
    pub deer: u32,
    pub wolves: u32,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            precipitation: 0.0,
            grain_height: 25.0,
            deer: 3,
            wolves: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrainConfig {
    pub grows_per_month: f32,
    pub eaten_per_deer: f32,
    pub ideal_temp: f32,
    pub temp_spread: f32,
    pub ideal_precip: f32,
    pub precip_spread: f32,
}

impl Default for GrainConfig {
    fn default() -> Self {
        Self {
            grows_per_month: 12.0,
            eaten_per_deer: 2.0,
            ideal_temp: 50.0,
            temp_spread: 10.0,
            ideal_precip: 10.0,
            precip_spread: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HerdConfig {
    /// Deer taken by one wolf per month.
    pub wolf_impact: f32,
    /// Deer needed to support one wolf.
    pub deer_per_wolf: f32,
}

impl Default for HerdConfig {
    fn default() -> Self {
        Self {
            wolf_impact: 0.6,
            deer_per_wolf: 3.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateConfig {
    pub avg_temp: f32,
    pub amp_temp: f32,
    pub random_temp: f32,
    pub avg_precip: f32,
    pub amp_precip: f32,
    pub random_precip: f32,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            avg_temp: 60.0,
            amp_temp: 20.0,
            random_temp: 10.0,
            avg_precip: 12.0,
            amp_precip: 6.0,
            random_precip: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl SimulationConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let calendar = &self.calendar;
        if calendar.start_month >= MONTHS_PER_YEAR {
            return Err(ConfigError::Validation(format!(
                "start_month {} is outside 0..=11",
                calendar.start_month
            )));
        }
        if calendar.end_year < calendar.start_year {
            return Err(ConfigError::Validation(format!(
                "end_year {} is before start_year {}",
                calendar.end_year, calendar.start_year
            )));
        }
        let height = self.initial.grain_height;
        if height.is_nan() || height < 0.0 {
            return Err(ConfigError::Validation(
                "initial grain_height must be non-negative".into(),
            ));
        }
        let precipitation = self.initial.precipitation;
        if precipitation.is_nan() || precipitation < 0.0 {
            return Err(ConfigError::Validation(
                "initial precipitation must be non-negative".into(),
            ));
        }
        let spreads = [self.grain.temp_spread, self.grain.precip_spread];
        if spreads.iter().any(|spread| spread.is_nan() || *spread <= 0.0) {
            return Err(ConfigError::Validation(
                "grain spreads must be greater than zero".into(),
            ));
        }
        let ratio = self.herd.deer_per_wolf;
        if ratio.is_nan() || ratio <= 0.0 {
            return Err(ConfigError::Validation(
                "deer_per_wolf must be greater than zero".into(),
            ));
        }
        if self.herd.wolf_impact < 0.0 || self.grain.eaten_per_deer < 0.0 {
            return Err(ConfigError::Validation(
                "consumption rates must be non-negative".into(),
            ));
        }
        if self.climate.random_temp < 0.0 || self.climate.random_precip < 0.0 {
            return Err(ConfigError::Validation(
                "noise bounds must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// World as it stands before the first cycle. The weather stays at the
    /// configured values until the environment's first commit.
    pub fn initial_snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            year: self.calendar.start_year,
            month: self.calendar.start_month,
            temperature: self.initial.temperature,
            precipitation: self.initial.precipitation,
            grain_height: self.initial.grain_height,
            deer: self.initial.deer,
            wolves: self.initial.wolves,
        }
    }

    /// Number of monthly cycles a full run performs.
    pub fn expected_cycles(&self) -> u64 {
        let calendar = &self.calendar;
        let months = (calendar.end_year as i64 - calendar.start_year as i64)
            * MONTHS_PER_YEAR as i64
            - calendar.start_month as i64;
        months.max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_meadow() {
        let config = SimulationConfig::default();
        assert_eq!(config.calendar.start_year, 2024);
        assert_eq!(config.calendar.end_year, 2030);
        assert_eq!(config.initial.deer, 3);
        assert_eq!(config.herd.deer_per_wolf, 3.7);
        assert_eq!(config.expected_cycles(), 72);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = SimulationConfig::from_yaml_str(
            "calendar:\n  end_year: 2025\nseed: 9\n",
        )
        .unwrap();
        assert_eq!(config.calendar.start_year, 2024);
        assert_eq!(config.calendar.end_year, 2025);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.grain, GrainConfig::default());
    }

    #[test]
    fn test_rejects_end_before_start() {
        let err = SimulationConfig::from_yaml_str(
            "calendar:\n  start_year: 2030\n  end_year: 2024\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_rejects_bad_month_and_ratio() {
        let mut config = SimulationConfig::default();
        config.calendar.start_month = 12;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.herd.deer_per_wolf = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_initial_weather_defaults_to_zero() {
        let config = SimulationConfig::default();
        let snapshot = config.initial_snapshot();
        assert_eq!(snapshot.temperature, 0.0);
        assert_eq!(snapshot.precipitation, 0.0);

        let config = SimulationConfig::from_yaml_str(
            "initial:\n  temperature: 45.0\n  precipitation: 9.5\n",
        )
        .unwrap();
        assert_eq!(config.initial_snapshot().temperature, 45.0);
        assert_eq!(config.initial.deer, 3);

        let mut config = SimulationConfig::default();
        config.initial.precipitation = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expected_cycles_respects_start_month() {
        let mut config = SimulationConfig::default();
        config.calendar.start_month = 6;
        config.calendar.end_year = 2025;
        assert_eq!(config.expected_cycles(), 6);
    }

    #[test]
    fn test_config_serialization() {
        let mut config = SimulationConfig::default();
        config.seed = Some(42);
        let temp = tempfile::NamedTempFile::new().unwrap();
        config.to_yaml(temp.path()).unwrap();
        let loaded = SimulationConfig::from_yaml(temp.path()).unwrap();
        assert_eq!(config, loaded);
    }
}
