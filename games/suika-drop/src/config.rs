use serde::Deserialize;
use thiserror::Error;

use crate::sizes::SizeTable;

/// Why a tuning document was refused.
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("death_threshold_steps must be at least 1")]
    ZeroDeathThreshold,
    #[error("merge_radius_limit {limit} must be below the smallest radius {smallest}")]
    MergeLimitTooLarge { limit: f32, smallest: f32 },
    #[error("wall_thickness {thickness} leaves no room in an arena {width} wide")]
    NoRoom { thickness: f32, width: f32 },
}

/// Runtime-tunable game parameters. Any field missing from a JSON document
/// keeps its default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena_width: f32,
    pub arena_height: f32,
    pub wall_thickness: f32,
    /// Downward gravity in units/s².
    pub gravity: f32,
    /// Y of in-hand and freshly dropped balls.
    pub spawn_height: f32,
    /// Y of the death line sensor.
    pub death_line_y: f32,
    /// Seconds between a drop and the next in-hand ball.
    pub drop_delay: f32,
    /// Seconds between game over and the next in-hand ball.
    pub restart_delay: f32,
    /// Consecutive steps on the death line that end the game. The first
    /// contact step counts as 0, so a ball is lost on step `threshold + 1`.
    pub death_threshold_steps: u32,
    /// A merging ball resolves once its radius falls below this.
    pub merge_radius_limit: f32,
    /// Per-step shrink factor before the time term.
    pub shrink_base: f32,
    /// Shrink speed per second, subtracted from `shrink_base`.
    pub shrink_rate: f32,
    /// A merging ball covers 1/divisor of the gap to its partner per step.
    pub approach_divisor: f32,
    /// Tie merging pairs together with a zero-length spring.
    pub link_pairs: bool,
    pub link_stiffness: f32,
    pub link_damping: f32,
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
    /// Fraction of the smallest tiers new in-hand balls are drawn from.
    pub spawn_fraction: f32,
    pub seed: u64,
    pub sizes: SizeTable,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_width: 560.0,
            arena_height: 800.0,
            wall_thickness: 20.0,
            gravity: 1000.0,
            spawn_height: 50.0,
            death_line_y: 150.0,
            drop_delay: 0.5,
            restart_delay: 2.0,
            death_threshold_steps: 500,
            merge_radius_limit: 10.0,
            shrink_base: 0.95,
            shrink_rate: 0.5,
            approach_divisor: 10.0,
            link_pairs: true,
            link_stiffness: 200.0,
            link_damping: 10.0,
            restitution: 0.5,
            friction: 0.3,
            density: 1.0,
            spawn_fraction: 1.0 / 3.0,
            seed: 0x5eed,
            sizes: SizeTable::default(),
        }
    }
}

impl Tuning {
    /// Parse a document and check that the values describe a playable game.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        for (field, value) in [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
            ("merge_radius_limit", self.merge_radius_limit),
            ("approach_divisor", self.approach_divisor),
        ] {
            // Negated so NaN fails too
            if !(value > 0.0) {
                return Err(TuningError::NotPositive { field, value });
            }
        }
        for (field, value) in [
            ("wall_thickness", self.wall_thickness),
            ("drop_delay", self.drop_delay),
            ("restart_delay", self.restart_delay),
        ] {
            if !(value >= 0.0) {
                return Err(TuningError::Negative { field, value });
            }
        }
        if self.death_threshold_steps == 0 {
            return Err(TuningError::ZeroDeathThreshold);
        }
        let smallest = self.sizes.smallest().radius;
        if self.merge_radius_limit >= smallest {
            return Err(TuningError::MergeLimitTooLarge {
                limit: self.merge_radius_limit,
                smallest,
            });
        }
        if self.wall_thickness >= self.arena_width {
            return Err(TuningError::NoRoom {
                thickness: self.wall_thickness,
                width: self.arena_width,
            });
        }
        Ok(())
    }

    /// Inner edge of the left wall.
    pub fn left_bound(&self) -> f32 {
        self.wall_thickness / 2.0
    }

    /// Inner edge of the right wall.
    pub fn right_bound(&self) -> f32 {
        self.arena_width - self.wall_thickness / 2.0
    }
}
