//! Configuration loading and validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::parse_kickoff_time;
use crate::schedule::ScheduleOptions;
use crate::standings::StandingsRules;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Default scheduling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Stage key mixed into fixture IDs
    #[serde(default = "default_league_stage")]
    pub stage: String,

    /// Kickoff time, "HH:MM"
    #[serde(default = "default_kickoff_time")]
    pub kickoff_time: String,

    #[serde(default)]
    pub weekends_only: bool,

    #[serde(default)]
    pub home_and_away: bool,

    #[serde(default = "default_days_between_rounds")]
    pub days_between_rounds: u32,

    #[serde(default)]
    pub venue: Option<String>,
}

fn default_league_stage() -> String {
    "league".to_string()
}

fn default_knockout_stage() -> String {
    "knockout".to_string()
}

fn default_kickoff_time() -> String {
    "15:00".to_string()
}

fn default_days_between_rounds() -> u32 {
    7
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            stage: default_league_stage(),
            kickoff_time: default_kickoff_time(),
            weekends_only: false,
            home_and_away: false,
            days_between_rounds: default_days_between_rounds(),
            venue: None,
        }
    }
}

impl ScheduleConfig {
    /// Scheduling options for a stage starting on `start_date`
    /// (or the calendar's today when None).
    pub fn options(&self, start_date: Option<NaiveDate>) -> ScheduleOptions {
        ScheduleOptions {
            stage: self.stage.clone(),
            start_date,
            kickoff_time: self.kickoff_time.clone(),
            weekends_only: self.weekends_only,
            home_and_away: self.home_and_away,
            venue: self.venue.clone(),
            days_between_rounds: self.days_between_rounds,
        }
    }
}

/// Knockout stage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnockoutConfig {
    /// Stage key mixed into fixture IDs
    #[serde(default = "default_knockout_stage")]
    pub stage: String,

    /// Play a third-place match between the semi-final losers
    #[serde(default)]
    pub third_place: bool,
}

impl Default for KnockoutConfig {
    fn default() -> Self {
        Self {
            stage: default_knockout_stage(),
            third_place: false,
        }
    }
}

/// Main engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub standings: StandingsRules,

    #[serde(default)]
    pub knockout: KnockoutConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if parse_kickoff_time(&self.schedule.kickoff_time).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "kickoff time '{}' is not a valid HH:MM time",
                self.schedule.kickoff_time
            )));
        }

        if self.schedule.stage.trim().is_empty() || self.knockout.stage.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Stage keys must not be empty".to_string(),
            ));
        }

        if self.schedule.days_between_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "Days between rounds must be greater than 0".to_string(),
            ));
        }

        self.standings
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(())
    }
}
