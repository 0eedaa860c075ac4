//! Fixed timestep simulation tick
//!
//! Advances the whole game one step: input, boost, grid movement, tail
//! follow, contact resolution, merge animation, and the spawn timer.
//! While a merge is in flight the `merging` gate suspends movement,
//! input, tail updates, and contacts; the spawn timer keeps counting.

use glam::Vec3;

use super::merge;
use super::spawn;
use super::state::GameState;
use super::tail;
use crate::consts::CONTACT_DISTANCE;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired travel direction from keys or pointer; `None` keeps the
    /// current heading. Any normalizable vector is accepted.
    pub direction: Option<Vec3>,
    /// Boost key held
    pub boost: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    // Merge in flight: the gate suspends movement, input, tail follow,
    // and contacts. The spawner runs on its own clock regardless.
    if state.player.merging {
        merge::advance_merge(state, dt);
        spawn::update_spawner(state, dt);
        state.normalize_order();
        return;
    }

    // Steering input (vertical component is discarded)
    if let Some(dir) = input.direction {
        let flat = Vec3::new(dir.x, 0.0, dir.z);
        if flat.length_squared() > 0.01 {
            state.player.current_direction = flat.normalize();
        }
    }

    let tuning = state.tuning.clone();
    state.player.handle_boost(input.boost, &tuning, dt);
    state.player.step_movement(&tuning, dt);
    bounce_off_walls(state);
    tail::update_tail(state, dt);
    resolve_contacts(state);
    spawn::update_spawner(state, dt);

    state.normalize_order();
}

/// Deliver contact events between the player and overlapping collectible
/// cubes. Each overlap is handled as its own event; once a merge starts,
/// the gate ignores the rest of this tick's contacts.
fn resolve_contacts(state: &mut GameState) {
    let player_pos = state.player.cube.pos;
    let player_scale = state.player.cube.scale;

    let contacts: Vec<u32> = state
        .cubes
        .iter()
        .filter(|c| !c.trail_member && c.physics_enabled)
        .filter(|c| {
            let dx = c.pos.x - player_pos.x;
            let dz = c.pos.z - player_pos.z;
            let reach = (player_scale + c.scale) * 0.5 * CONTACT_DISTANCE;
            dx * dx + dz * dz <= reach * reach
        })
        .map(|c| c.id)
        .collect();

    for id in contacts {
        merge::handle_contact(state, id);
    }
}

/// Reflect the player back inside the arena when it crosses a wall
fn bounce_off_walls(state: &mut GameState) {
    let half = state.tuning.arena.half_extent;
    let player = &mut state.player;
    let mut bounced = false;

    if player.cube.pos.x.abs() > half {
        player.cube.pos.x = player.cube.pos.x.clamp(-half, half);
        player.current_direction.x = -player.current_direction.x;
        bounced = true;
    }
    if player.cube.pos.z.abs() > half {
        player.cube.pos.z = player.cube.pos.z.clamp(-half, half);
        player.current_direction.z = -player.current_direction.z;
        bounced = true;
    }

    if bounced {
        // Pick a fresh step target along the reflected heading
        player.moving = false;
        log::debug!("player bounced off arena wall");
    }
}
