//! Engine configuration.
//!
//! Every field has a default, so a partial JSON document (or none at all)
//! yields a usable configuration.

use crate::error::SettingsError;
use crate::types::MatchingMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level engine settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub scheduler: SchedulerSettings,
    pub session: SessionSettings,
    pub study: StudyLimits,
    pub matching: MatchingSettings,
}

/// Parameters of the ease-adjusted interval schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub again_penalty: f64,
    pub hard_penalty: f64,
    pub easy_bonus: f64,
    pub second_interval_multiplier: f64,
    pub mature_interval_days: u32,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            initial_ease: 2.3,
            minimum_ease: 1.3,
            again_penalty: 0.2,
            hard_penalty: 0.05,
            easy_bonus: 0.15,
            second_interval_multiplier: 6.0,
            mature_interval_days: 21,
        }
    }
}

/// Session-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub exam_duration_secs: u32,
    pub remediation_threshold: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            exam_duration_secs: 1800,
            remediation_threshold: 0.7,
        }
    }
}

/// Per-session caps on the flashcard study queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyLimits {
    pub new_per_session: usize,
    pub reviews_per_session: usize,
}

impl Default for StudyLimits {
    fn default() -> Self {
        Self {
            new_per_session: 20,
            reviews_per_session: 200,
        }
    }
}

/// Typed flashcard answer matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingSettings {
    pub mode: MatchingMode,
    pub fuzzy_threshold: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            mode: MatchingMode::default(),
            fuzzy_threshold: 0.8,
        }
    }
}

impl EngineSettings {
    /// Parse settings from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let scheduler = &self.scheduler;
        if scheduler.minimum_ease < 1.0 {
            return Err(SettingsError::Invalid(format!(
                "minimum_ease must be at least 1.0, got {}",
                scheduler.minimum_ease
            )));
        }
        if scheduler.initial_ease < scheduler.minimum_ease {
            return Err(SettingsError::Invalid(format!(
                "initial_ease {} is below minimum_ease {}",
                scheduler.initial_ease, scheduler.minimum_ease
            )));
        }
        self.session.validate()?;
        if !(0.0..=1.0).contains(&self.matching.fuzzy_threshold) {
            return Err(SettingsError::Invalid(format!(
                "fuzzy_threshold must be within 0..=1, got {}",
                self.matching.fuzzy_threshold
            )));
        }
        Ok(())
    }
}

/// Per-session overrides (all fields optional).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_duration_secs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation_threshold: Option<f64>,
}

impl SessionSettings {
    /// Reject a zero exam duration and a threshold outside `0..=1`.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.exam_duration_secs == 0 {
            return Err(SettingsError::Invalid(
                "exam_duration_secs must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.remediation_threshold) {
            return Err(SettingsError::Invalid(format!(
                "remediation_threshold must be within 0..=1, got {}",
                self.remediation_threshold
            )));
        }
        Ok(())
    }

    /// Merge global session settings with optional overrides.
    ///
    /// The result is not validated; `Session::new` rejects invalid values.
    pub fn merge(global: &SessionSettings, overrides: Option<&SessionOverrides>) -> Self {
        match overrides {
            Some(o) => Self {
                exam_duration_secs: o.exam_duration_secs.unwrap_or(global.exam_duration_secs),
                remediation_threshold: o
                    .remediation_threshold
                    .unwrap_or(global.remediation_threshold),
            },
            None => global.clone(),
        }
    }
}
