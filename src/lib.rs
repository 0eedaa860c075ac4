//! Cube Chain - a 3D arena snake game with 2048-style cube merging
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, tail chain, merge engine, spawning)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::{Quat, Vec3};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Grid step length for player movement
    pub const GRID_SIZE: f32 = 1.0;
    /// Player snaps to its step target within this distance
    pub const STEP_SNAP_DISTANCE: f32 = 0.01;

    /// Duration of a merge animation in seconds
    pub const MERGE_DURATION: f32 = 0.3;
    /// Settle delay between a finished merge and the next cascade check
    pub const MERGE_SETTLE_DELAY: f32 = 0.1;

    /// Cube scale per size index (indexed by log2(value) - 1, clamped)
    pub const SIZE_PRESETS: [f32; 11] = [
        1.0, 1.1, 1.2, 1.3, 1.4, 1.5, 1.6, 1.7, 1.8, 1.9, 2.0,
    ];
    /// Cubes rest at scale * BASE_Y_OFFSET above the ground plane
    pub const BASE_Y_OFFSET: f32 = 0.5;

    /// Contact distance between the player and a collectible cube
    pub const CONTACT_DISTANCE: f32 = 1.0;

    /// Smallest legal cube value
    pub const MIN_CUBE_VALUE: u32 = 2;
}

/// Move a point toward a target by at most `max_delta`, without overshoot
#[inline]
pub fn move_toward(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let to_target = target - current;
    let dist = to_target.length();
    if dist <= max_delta || dist < f32::EPSILON {
        target
    } else {
        current + to_target / dist * max_delta
    }
}

/// Frame-rate independent interpolation factor for position/rotation chasing
/// (rate is the per-second smoothing constant from the tuning tables)
#[inline]
pub fn smoothing_t(rate: f32, dt: f32) -> f32 {
    (rate * dt).clamp(0.0, 1.0)
}

/// Orientation looking along `dir` with +Y up; identity for zero vectors
#[inline]
pub fn look_rotation(dir: Vec3) -> Quat {
    let flat = Vec3::new(dir.x, 0.0, dir.z);
    if flat.length_squared() < 1e-6 {
        Quat::IDENTITY
    } else {
        let fwd = flat.normalize();
        Quat::from_rotation_y(fwd.x.atan2(fwd.z))
    }
}

/// Forward vector (+Z rotated by orientation)
#[inline]
pub fn forward(rot: Quat) -> Vec3 {
    rot * Vec3::Z
}
