//! Engine tuning knobs
//!
//! Every numeric tolerance and behavioral switch the simulation consults
//! lives here, loaded once and treated as immutable for the session's
//! lifetime. Distances are in cell units (adjacent cell centers are 1.0
//! apart); durations are in ticks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a pursuer behaves right after being placed back in the pen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RespawnExit {
    /// Resume logic-driven movement on the next tick.
    #[default]
    Immediate,
    /// Follow breadcrumbs out through the nearest gate before resuming.
    Scripted,
}

/// A tuning value failed validation.
#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("step_distance must not exceed one cell per tick, got {value}")]
    StepTooLarge { value: f32 },
    #[error("corner_correct must stay below half a cell, got {value}")]
    CornerTooWide { value: f32 },
    #[error("epsilon ({epsilon}) must be smaller than wall_bumper ({wall_bumper})")]
    EpsilonTooCoarse { epsilon: f32, wall_bumper: f32 },
}

/// Simulation constants, checked once at session construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Distance an agent travels per tick, wall limits permitting.
    pub step_distance: f32,
    /// Perpendicular offset within which a turning agent may cut a corner.
    pub corner_correct: f32,
    /// Minimum room toward a wall limit that still counts as "can keep going".
    pub wall_bumper: f32,
    /// Tolerance for floating-point position agreement.
    pub epsilon: f32,
    /// Manhattan distance below which two agents have met.
    pub collision_close: f32,
    /// Lives beyond the first; a collision with zero left ends the session.
    pub retries: u32,
    /// Ticks an empowerment lasts; 0 means it never expires.
    pub empowered_ticks: u32,
    /// Post-respawn behavior for pursuers.
    pub respawn_exit: RespawnExit,
    /// Fixed RNG seed; `None` draws one from entropy at load.
    pub rng_seed: Option<u64>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            step_distance: 0.125,
            corner_correct: 0.25,
            wall_bumper: 0.1,
            epsilon: 1e-4,
            collision_close: 0.4,
            retries: 3,
            empowered_ticks: 300,
            respawn_exit: RespawnExit::Immediate,
            rng_seed: None,
        }
    }
}

impl Tuning {
    /// Check the numeric relationships the movement engine depends on.
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("step_distance", self.step_distance),
            ("corner_correct", self.corner_correct),
            ("wall_bumper", self.wall_bumper),
            ("epsilon", self.epsilon),
            ("collision_close", self.collision_close),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(TuningError::NonPositive { name, value });
            }
        }
        if self.step_distance > 1.0 {
            return Err(TuningError::StepTooLarge {
                value: self.step_distance,
            });
        }
        if self.corner_correct >= 0.5 {
            return Err(TuningError::CornerTooWide {
                value: self.corner_correct,
            });
        }
        if self.epsilon >= self.wall_bumper {
            return Err(TuningError::EpsilonTooCoarse {
                epsilon: self.epsilon,
                wall_bumper: self.wall_bumper,
            });
        }
        Ok(())
    }
}
