//! Data-driven game balance
//!
//! Every gameplay knob lives here so balance passes never touch sim code.
//! Tuning is loadable from JSON; malformed input falls back to defaults.
//! The tail knobs have hard clamp ranges - out-of-range requests are
//! clamped, never rejected.

use serde::{Deserialize, Serialize};

/// Player movement speeds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    /// Units per second while walking
    pub move_speed: f32,
    /// Units per second while boosting
    pub boost_speed: f32,
    /// Rotation slerp rate toward the travel direction
    pub rotation_speed: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            boost_speed: 10.0,
            rotation_speed: 15.0,
        }
    }
}

/// Boost resource behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostTuning {
    /// Full charge in seconds of boosting
    pub duration: f32,
    /// Lockout after draining the charge to empty
    pub cooldown: f32,
    /// Charge regained per second while not boosting
    pub refill_speed: f32,
}

impl Default for BoostTuning {
    fn default() -> Self {
        Self {
            duration: 2.0,
            cooldown: 5.0,
            refill_speed: 0.5,
        }
    }
}

/// Tail chain following behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TailTuning {
    /// Spacing between consecutive chain members
    pub distance: f32,
    /// Position lerp rate toward the follow target
    pub follow_smoothness: f32,
    /// Rotation slerp rate toward the leader's orientation
    pub rotation_smoothness: f32,
    /// Tail cubes created at game start
    pub initial_length: u32,
}

impl TailTuning {
    pub const DISTANCE_RANGE: (f32, f32) = (1.0, 2.5);
    pub const FOLLOW_RANGE: (f32, f32) = (5.0, 15.0);
    pub const ROTATION_RANGE: (f32, f32) = (8.0, 20.0);

    /// Clamped setter; out-of-range values are clamped, never rejected
    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(Self::DISTANCE_RANGE.0, Self::DISTANCE_RANGE.1);
    }

    pub fn set_follow_smoothness(&mut self, rate: f32) {
        self.follow_smoothness = rate.clamp(Self::FOLLOW_RANGE.0, Self::FOLLOW_RANGE.1);
    }

    pub fn set_rotation_smoothness(&mut self, rate: f32) {
        self.rotation_smoothness = rate.clamp(Self::ROTATION_RANGE.0, Self::ROTATION_RANGE.1);
    }
}

impl Default for TailTuning {
    fn default() -> Self {
        Self {
            distance: 1.5,
            follow_smoothness: 8.0,
            rotation_smoothness: 10.0,
            initial_length: 3,
        }
    }
}

/// Spawner timing, placement, and value pool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Seconds between timed spawns
    pub interval: f32,
    /// Cubes placed in the initial burst at startup
    pub initial_count: u32,
    /// Side length of the square spawn area
    pub area_size: f32,
    /// Ground plane height for spawned cubes
    pub ground_y: f32,
    /// Candidate cube values (weighted draw picks among these)
    pub possible_values: Vec<u32>,
    /// Hard cap on spawned values regardless of player growth
    pub max_spawn_value: u32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            interval: 5.0,
            initial_count: 20,
            area_size: 50.0,
            ground_y: 0.0,
            possible_values: vec![2, 4, 8, 16, 32, 64],
            max_spawn_value: 64,
        }
    }
}

/// Arena bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    /// Walls sit at +/- half_extent on both horizontal axes
    pub half_extent: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self { half_extent: 25.0 }
    }
}

/// Complete tuning table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub movement: MovementTuning,
    pub boost: BoostTuning,
    pub tail: TailTuning,
    pub spawn: SpawnTuning,
    pub arena: ArenaTuning,
}

impl Tuning {
    /// Parse tuning from JSON, falling back to defaults on malformed input
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::warn!("malformed tuning JSON, using defaults: {err}");
                Self::default()
            }
        }
    }
}
