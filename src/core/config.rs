//! Enemy configuration
//!
//! Authored per enemy and constant after spawn. Stored as RON or JSON.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ai::VisionConfig;

/// Configured speeds are in hundredths of a world unit per tick.
pub const SPEED_MULTIPLIER: f32 = 0.01;

/// Enemy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Patrol waypoints, visited cyclically
    pub path: Vec<Vec2>,
    /// Patrol speed
    pub speed: f32,
    /// Speed while chasing a sighting
    pub chase_speed: f32,
    /// Fraction of a turn completed per tick
    pub turn_speed: f32,
    /// Degrees rotated per tick while spinning
    pub spin_speed: f32,
    /// Tag of the targets this enemy hunts
    pub target_tag: String,
    /// Vision cone used by the default probe
    pub vision: VisionConfig,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            speed: 10.0,
            chase_speed: 20.0,
            turn_speed: 0.1,
            spin_speed: 8.0,
            target_tag: String::from("Player"),
            vision: VisionConfig::default(),
        }
    }
}

impl EnemyConfig {
    /// Create a config patrolling the given waypoints
    pub fn new(path: impl Into<Vec<Vec2>>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set patrol speed
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set chase speed
    pub fn with_chase_speed(mut self, chase_speed: f32) -> Self {
        self.chase_speed = chase_speed;
        self
    }

    /// Set turn speed (fraction of a turn per tick)
    pub fn with_turn_speed(mut self, turn_speed: f32) -> Self {
        self.turn_speed = turn_speed;
        self
    }

    /// Set spin speed (degrees per tick)
    pub fn with_spin_speed(mut self, spin_speed: f32) -> Self {
        self.spin_speed = spin_speed;
        self
    }

    /// Set the hunted target tag
    pub fn with_target_tag(mut self, tag: impl Into<String>) -> Self {
        self.target_tag = tag.into();
        self
    }

    /// Set the vision cone
    pub fn with_vision(mut self, vision: VisionConfig) -> Self {
        self.vision = vision;
        self
    }

    /// Check the config can drive a controller
    ///
    /// # Errors
    ///
    /// Returns an error for an empty path, a non-positive turn or spin speed,
    /// or a negative or non-finite movement speed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.is_empty() {
            return Err(ConfigError::EmptyPath);
        }

        for (name, value) in [("speed", self.speed), ("chase_speed", self.chase_speed)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidRate { name, value });
            }
        }

        for (name, value) in [
            ("turn_speed", self.turn_speed),
            ("spin_speed", self.spin_speed),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidRate { name, value });
            }
        }

        Ok(())
    }

    /// Parse a config from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid config
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Save the config to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }
}

/// Errors that can occur while loading or validating a config
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// Patrol path has no waypoints
    EmptyPath,
    /// A speed or rate is out of range
    InvalidRate { name: &'static str, value: f32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::EmptyPath => write!(f, "patrol path needs at least one waypoint"),
            Self::InvalidRate { name, value } => write!(f, "invalid {name}: {value}"),
        }
    }
}

impl std::error::Error for ConfigError {}
