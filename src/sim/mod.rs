//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod appearance;
pub mod cube;
pub mod merge;
pub mod spawn;
pub mod state;
pub mod tail;
pub mod tick;

pub use appearance::{AppearanceResolver, CubePreset, Rgb, contrast_color};
pub use cube::{Cube, size_index};
pub use merge::{
    ContactClass, ContactOutcome, MergeAnim, MergeKind, MergePhase, Participant,
    check_for_all_merges, classify_contact, handle_contact,
};
pub use spawn::{eligible_values, spawn_weight, weighted_random_value};
pub use state::{GameState, Player};
pub use tick::{TickInput, tick};
