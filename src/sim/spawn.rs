//! Timed cube spawning with player-biased value selection
//!
//! New cubes appear on a fixed interval (plus an initial burst) at random
//! spots in the spawn area. Values are drawn from a weighted table biased
//! toward small cubes and toward the player's current value, and capped so
//! nothing unreachably large spawns.

use glam::Vec3;
use rand::Rng;

use super::state::GameState;
use crate::consts::MIN_CUBE_VALUE;
use crate::tuning::SpawnTuning;

/// Base weight table for spawn values; a candidate equal to the player's
/// current value gets 1.5 instead of its base weight
#[inline]
pub fn spawn_weight(value: u32, player_value: u32) -> f32 {
    if value == player_value {
        1.5
    } else {
        match value {
            2 => 4.0,
            4 => 3.0,
            8 => 2.0,
            _ => 1.0,
        }
    }
}

/// Candidate values for the current player value: pool entries no larger
/// than min(player * 2, max_spawn_value)
pub fn eligible_values(tuning: &SpawnTuning, player_value: u32) -> Vec<u32> {
    let cap = player_value.saturating_mul(2).min(tuning.max_spawn_value);
    tuning
        .possible_values
        .iter()
        .copied()
        .filter(|&v| v <= cap)
        .collect()
}

/// Cumulative-weight draw over the eligible candidates. An empty pool or
/// empty candidate set defaults to spawning a 2.
pub fn weighted_random_value(
    tuning: &SpawnTuning,
    player_value: u32,
    rng: &mut impl Rng,
) -> u32 {
    if tuning.possible_values.is_empty() {
        return MIN_CUBE_VALUE;
    }

    let candidates = eligible_values(tuning, player_value);
    let (candidates, weights): (Vec<u32>, Vec<f32>) = if candidates.is_empty() {
        (vec![MIN_CUBE_VALUE], vec![1.0])
    } else {
        let weights = candidates
            .iter()
            .map(|&v| spawn_weight(v, player_value))
            .collect();
        (candidates, weights)
    };

    let total: f32 = weights.iter().sum();
    let draw = rng.random_range(0.0..total);

    let mut cumulative = 0.0;
    for (value, weight) in candidates.iter().zip(&weights) {
        cumulative += weight;
        if draw <= cumulative {
            return *value;
        }
    }
    candidates[0]
}

/// Uniform position in the square spawn area at ground level
fn random_spawn_position(tuning: &SpawnTuning, rng: &mut impl Rng) -> Vec3 {
    let half = tuning.area_size / 2.0;
    Vec3::new(
        rng.random_range(-half..half),
        tuning.ground_y,
        rng.random_range(-half..half),
    )
}

/// Place one weighted-random cube in the world
pub fn spawn_random_cube(state: &mut GameState) {
    let pos = random_spawn_position(&state.tuning.spawn, &mut state.rng);
    let value = weighted_random_value(&state.tuning.spawn, state.player.value(), &mut state.rng);
    let id = state.add_cube(value, pos);
    log::debug!("spawned cube {id} value {value} at {pos:?}");
}

/// Initial burst at game start
pub fn spawn_initial_cubes(state: &mut GameState) {
    for _ in 0..state.tuning.spawn.initial_count {
        spawn_random_cube(state);
    }
}

/// Advance the spawn timer; spawns one cube per full interval
pub fn update_spawner(state: &mut GameState, dt: f32) {
    state.spawn_timer += dt;
    if state.spawn_timer >= state.tuning.spawn.interval {
        spawn_random_cube(state);
        state.spawn_timer = 0.0;
    }
}
