//! Gameplay constants, loaded from JSON with per-field defaults.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::entities::Vector2D;
use crate::error::ConfigError;

/// Which blocks count as a swap trigger when struck.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerPolicy {
    /// Only a tower's target block triggers; structural blocks just break.
    #[default]
    TargetOnly,
    /// Any block of a tower triggers.
    AnyBlock,
}

impl FromStr for TriggerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "target-only" | "target" => Ok(TriggerPolicy::TargetOnly),
            "any-block" | "any" => Ok(TriggerPolicy::AnyBlock),
            other => Err(format!("unknown trigger policy `{other}`")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Added to vertical velocity every step (px/step²).
    pub gravity: f64,
    /// Horizontal velocity multiplier applied every step.
    pub drag: f64,
    pub launch_power: f64,
    /// Height of the ground strip at the bottom of the field.
    pub ground_height: f64,
    /// Slingshot anchor; the projectile rests here between shots.
    pub anchor: Vector2D,
    pub max_drag_distance: f64,
    pub capture_radius: f64,
    /// Per-axis displacement below which a release is not a shot.
    pub dead_zone: f64,
    pub projectile_size: Size,
    /// Nominal width each pyramid row is centred in.
    pub tower_width: f64,
    pub block_size: Size,
    pub target_size: f64,
    /// Distance from the field's right edge to the first tower.
    pub tower_right_margin: f64,
    pub tower_spacing: f64,
    pub min_levels: u32,
    pub max_levels: u32,
    pub chances: u32,
    pub retry_delay_ms: u64,
    pub settle_delay_ms: u64,
    pub trigger_policy: TriggerPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            gravity: 0.2,
            drag: 0.995,
            launch_power: 0.2,
            ground_height: 96.0,
            anchor: Vector2D::new(120.0, 420.0),
            max_drag_distance: 80.0,
            capture_radius: 48.0,
            dead_zone: 5.0,
            projectile_size: Size { width: 48.0, height: 48.0 },
            tower_width: 120.0,
            block_size: Size { width: 40.0, height: 20.0 },
            target_size: 60.0,
            tower_right_margin: 300.0,
            tower_spacing: 180.0,
            min_levels: 3,
            max_levels: 5,
            chances: 3,
            retry_delay_ms: 1500,
            settle_delay_ms: 1000,
            trigger_policy: TriggerPolicy::TargetOnly,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("gravity", self.gravity),
            ("launch_power", self.launch_power),
            ("max_drag_distance", self.max_drag_distance),
            ("capture_radius", self.capture_radius),
            ("projectile_size.width", self.projectile_size.width),
            ("projectile_size.height", self.projectile_size.height),
            ("tower_width", self.tower_width),
            ("block_size.width", self.block_size.width),
            ("block_size.height", self.block_size.height),
            ("target_size", self.target_size),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, format!("must be a positive number, got {value}")));
            }
        }

        let non_negative = [
            ("ground_height", self.ground_height),
            ("dead_zone", self.dead_zone),
            ("tower_right_margin", self.tower_right_margin),
            ("tower_spacing", self.tower_spacing),
            ("anchor.x", self.anchor.x),
            ("anchor.y", self.anchor.y),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("must be finite and >= 0, got {value}")));
            }
        }

        if !(self.drag > 0.0 && self.drag <= 1.0) {
            return Err(invalid("drag", format!("must be in (0, 1], got {}", self.drag)));
        }
        if self.min_levels == 0 || self.min_levels > self.max_levels {
            return Err(invalid(
                "min_levels",
                format!("level range {}..={} is empty", self.min_levels, self.max_levels),
            ));
        }
        if self.chances == 0 {
            return Err(invalid("chances", "must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
