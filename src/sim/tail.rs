//! Tail chain management
//!
//! The tail is an ordered list of cube ids behind the player. Each member
//! chases a point at the tuned distance behind the entity ahead of it
//! (the player for index 0, the previous member otherwise). A member is
//! either settled into that chase ("following") or freshly collected
//! ("joining"): joining flips the cube to kinematic/trigger so it can
//! never re-trigger contacts against the player or the rest of the chain,
//! then the regular follow lerp pulls it into place.

use crate::{forward, smoothing_t};

use super::state::GameState;

/// Create the starter tail at game start
pub fn initialize_tail(state: &mut GameState) {
    for _ in 0..state.tuning.tail.initial_length {
        add_tail_cube(state, 2);
    }
}

/// Instantiate a new tail cube at the end of the chain
pub fn add_tail_cube(state: &mut GameState, value: u32) {
    let (leader_pos, leader_rot) = match state.tail.last() {
        None => (state.player.cube.pos, state.player.cube.rot),
        Some(&last_id) => match state.cube(last_id) {
            Some(last) => (last.pos, last.rot),
            None => (state.player.cube.pos, state.player.cube.rot),
        },
    };
    let spawn_pos = leader_pos - forward(leader_rot) * state.tuning.tail.distance;

    let id = state.add_cube(value, spawn_pos);
    if let Some(cube) = state.cube_mut(id) {
        cube.rot = leader_rot;
        cube.trail_member = true;
        cube.enable_physics(false);
    }
    state.tail.push(id);
}

/// Join a freshly collected world cube at the end of the chain.
///
/// The cube becomes kinematic/trigger so no contact against the player or
/// existing members can fire again, and keeps its world position - the
/// follow lerp reels it in over the next ticks.
pub fn join_tail(state: &mut GameState, cube_id: u32) {
    if let Some(cube) = state.cube_mut(cube_id) {
        cube.enable_physics(false);
        cube.trail_member = true;
        state.tail.push(cube_id);
    } else {
        log::warn!("join_tail: cube {cube_id} died before joining");
    }
}

/// Advance the follow chase for every member.
///
/// Members update in chain order, so each reads the already-updated pose
/// of the entity ahead. Dead ids are skipped; the next member then chases
/// the last live cube ahead of it.
pub fn update_tail(state: &mut GameState, dt: f32) {
    let distance = state.tuning.tail.distance;
    let t_pos = smoothing_t(state.tuning.tail.follow_smoothness, dt);
    let t_rot = smoothing_t(state.tuning.tail.rotation_smoothness, dt);

    let mut leader = (state.player.cube.pos, state.player.cube.rot);
    for i in 0..state.tail.len() {
        let id = state.tail[i];
        let target_pos = leader.0 - forward(leader.1) * distance;
        let target_rot = leader.1;
        if let Some(cube) = state.cube_mut(id) {
            cube.pos = cube.pos.lerp(target_pos, t_pos);
            cube.rot = cube.rot.slerp(target_rot, t_rot);
            leader = (cube.pos, cube.rot);
        }
    }
}
