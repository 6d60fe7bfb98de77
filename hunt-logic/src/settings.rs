use serde::{Deserialize, Serialize};

use crate::location::Coordinate;

/// Length of a single step in meters, distances are shown to the player in steps
pub const DEFAULT_STEP_LENGTH_METERS: f64 = 0.8;

/// Fewer steps than this to the target and the treasure is found
pub const ARRIVAL_STEPS: f64 = 1.0;

const DEFAULT_TARGET: (f64, f64) = (-23.11443, -45.70780);

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("step length must be a positive number of meters, got {0}")]
    InvalidStepLength(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, specta::Type)]
/// Settings for a hunt, fixed for the lifetime of a session
pub struct HuntSettings {
    /// Where the treasure is hidden
    pub target: Coordinate,
    /// Meters per step
    pub step_length_meters: f64,
}

impl HuntSettings {
    pub fn new(target: Coordinate, step_length_meters: f64) -> Result<Self, SettingsError> {
        let settings = Self {
            target,
            step_length_meters,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check settings that came from somewhere else (a store, the UI)
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.step_length_meters.is_finite() && self.step_length_meters > 0.0 {
            Ok(())
        } else {
            Err(SettingsError::InvalidStepLength(self.step_length_meters))
        }
    }

    pub fn steps_for(&self, distance_meters: f64) -> f64 {
        distance_meters / self.step_length_meters
    }
}

impl Default for HuntSettings {
    fn default() -> Self {
        let (lat, long) = DEFAULT_TARGET;
        Self {
            target: Coordinate::new(lat, long).expect("Default target is in range"),
            step_length_meters: DEFAULT_STEP_LENGTH_METERS,
        }
    }
}
