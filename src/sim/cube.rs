//! Numbered cube entities
//!
//! A cube carries a power-of-two value and the visual/physics state that
//! follows from it. Values only ever double after creation; scale and rest
//! height are derived from the value through the size curve.

use glam::{Quat, Vec3};

use super::appearance::{AppearanceResolver, LABEL_DARK, Rgb};
use crate::consts::{BASE_Y_OFFSET, SIZE_PRESETS};

/// A numbered cube in the world (free collectible or tail member)
#[derive(Debug, Clone)]
pub struct Cube {
    pub id: u32,
    /// Power-of-two value >= 2
    pub value: u32,
    pub pos: Vec3,
    pub rot: Quat,
    pub scale: f32,
    /// Part of the player's tail chain
    pub trail_member: bool,
    /// Solid collider; false means trigger-only (pass-through detection)
    pub physics_enabled: bool,
    pub color: Rgb,
    pub label: String,
    pub label_color: Rgb,
}

/// Index into the size curve for a value: clamp(log2(v) - 1, 0, N-1)
#[inline]
pub fn size_index(value: u32) -> usize {
    let log2 = value.max(1).ilog2() as i32;
    (log2 - 1).clamp(0, SIZE_PRESETS.len() as i32 - 1) as usize
}

impl Cube {
    pub fn new(id: u32, value: u32, pos: Vec3) -> Self {
        let mut cube = Self {
            id,
            value,
            pos,
            rot: Quat::IDENTITY,
            scale: 1.0,
            trail_member: false,
            physics_enabled: true,
            color: Rgb::new(0.93, 0.89, 0.85),
            label: value.to_string(),
            label_color: LABEL_DARK,
        };
        cube.update_size_and_position();
        cube
    }

    /// Update value, refresh label/appearance, recompute scale and rest height
    pub fn set_value(&mut self, value: u32, appearance: &AppearanceResolver) {
        self.value = value;
        appearance.apply_to(self);
        self.update_size_and_position();
    }

    /// Recompute scale from the size curve and seat the cube on the ground
    /// so larger cubes sit higher
    pub fn update_size_and_position(&mut self) {
        self.scale = SIZE_PRESETS[size_index(self.value)];
        self.pos.y = self.scale * BASE_Y_OFFSET;
    }

    /// Toggle solid collision; disabled means the collider is a trigger
    pub fn enable_physics(&mut self, enable: bool) {
        self.physics_enabled = enable;
    }
}
