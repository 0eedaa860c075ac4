//! Game state and the player avatar
//!
//! All simulation state lives here: the player, the world cubes, the tail
//! chain order, and any merge animation in flight. Iteration order over
//! cubes is stable (sorted by entity id) so runs are reproducible per seed.

use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::appearance::AppearanceResolver;
use super::cube::Cube;
use super::merge::MergeAnim;
use crate::consts::GRID_SIZE;
use crate::tuning::Tuning;
use crate::{forward, move_toward};

/// The player avatar: a distinguished cube with movement and boost state
#[derive(Debug, Clone)]
pub struct Player {
    /// The player's own numbered cube (id 0, never stored in `cubes`)
    pub cube: Cube,
    /// Current grid-step destination
    pub target_position: Vec3,
    /// Mid-step flag; a new step target is only picked when settled
    pub moving: bool,
    /// Last commanded travel direction (unit length)
    pub current_direction: Vec3,
    /// Remaining boost charge in seconds, within [0, boost_duration]
    pub current_boost: f32,
    pub is_boosting: bool,
    /// Seconds of boost-effect linger after the key is released
    pub boost_timer: f32,
    /// Lockout after draining the boost to empty
    pub cooldown_timer: f32,
    /// Mutual-exclusion gate: while true no movement, input, tail update,
    /// or new merge may start
    pub merging: bool,
}

impl Player {
    fn new(tuning: &Tuning) -> Self {
        Self {
            cube: Cube::new(0, 2, Vec3::ZERO),
            target_position: Vec3::ZERO,
            moving: false,
            current_direction: Vec3::Z,
            current_boost: tuning.boost.duration,
            is_boosting: false,
            boost_timer: 0.0,
            cooldown_timer: 0.0,
            merging: false,
        }
    }

    pub fn value(&self) -> u32 {
        self.cube.value
    }

    pub fn pos(&self) -> Vec3 {
        self.cube.pos
    }

    /// Drain/refill the boost resource from the boost-held input
    pub fn handle_boost(&mut self, boost_held: bool, tuning: &Tuning, dt: f32) {
        if self.boost_timer > 0.0 {
            self.boost_timer -= dt;
        }

        if self.cooldown_timer > 0.0 {
            self.cooldown_timer -= dt;
            self.is_boosting = false;
            return;
        }

        if boost_held && self.current_boost > 0.0 {
            self.is_boosting = true;
            self.current_boost -= dt;
            self.boost_timer = 0.5;
        } else {
            self.is_boosting = false;
        }

        if !boost_held && self.current_boost < tuning.boost.duration {
            self.current_boost =
                (self.current_boost + dt * tuning.boost.refill_speed).min(tuning.boost.duration);
        }

        if self.current_boost <= 0.0 {
            self.cooldown_timer = tuning.boost.cooldown;
            self.current_boost = 0.0;
        }
    }

    /// Advance one grid-step toward the current direction
    pub fn step_movement(&mut self, tuning: &Tuning, dt: f32) {
        if !self.moving {
            self.target_position = self.cube.pos + self.current_direction * GRID_SIZE;
            self.moving = true;
        }

        let speed = if self.is_boosting {
            tuning.movement.boost_speed
        } else {
            tuning.movement.move_speed
        };

        self.cube.pos = move_toward(self.cube.pos, self.target_position, speed * dt);

        if self.current_direction != Vec3::ZERO {
            let target_rot = crate::look_rotation(self.current_direction);
            self.cube.rot = self
                .cube
                .rot
                .slerp(target_rot, crate::smoothing_t(tuning.movement.rotation_speed, dt));
        }

        if self.cube.pos.distance(self.target_position) < crate::consts::STEP_SNAP_DISTANCE {
            self.cube.pos = self.target_position;
            self.moving = false;
        }
    }

    /// Boost trail/FX collaborators show the effect while this holds,
    /// which lingers half a second past the last boosting tick
    pub fn boost_effect_active(&self) -> bool {
        self.boost_timer > 0.0
    }

    /// Remaining boost as a fraction of the full charge
    pub fn boost_percentage(&self, tuning: &Tuning) -> f32 {
        if tuning.boost.duration <= 0.0 {
            0.0
        } else {
            self.current_boost / tuning.boost.duration
        }
    }

    /// Whether boosting is currently available
    pub fn boost_ready(&self, tuning: &Tuning) -> bool {
        self.current_boost >= tuning.boost.duration * 0.1 && self.cooldown_timer <= 0.0
    }
}

/// Complete game state, deterministic per seed
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Seeded RNG driving spawn placement and value draws
    pub rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    /// World cubes: free collectibles and tail members (sorted by id)
    pub cubes: Vec<Cube>,
    /// Ordered tail chain, index 0 closest to the player
    pub tail: Vec<u32>,
    /// Merge animation in flight, if any
    pub merge: Option<MergeAnim>,
    pub appearance: AppearanceResolver,
    pub tuning: Tuning,
    /// Seconds accumulated toward the next timed spawn
    pub spawn_timer: f32,
    next_id: u32,
}

impl GameState {
    /// Create a fresh run: player at the origin, starter tail, initial
    /// spawn burst
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let appearance = AppearanceResolver::default();
        let mut player = Player::new(&tuning);
        player.cube.set_value(2, &appearance);

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            player,
            cubes: Vec::new(),
            tail: Vec::new(),
            merge: None,
            appearance,
            tuning,
            spawn_timer: 0.0,
            next_id: 1,
        };

        super::tail::initialize_tail(&mut state);
        super::spawn::spawn_initial_cubes(&mut state);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Liveness check and lookup by id
    pub fn cube(&self, id: u32) -> Option<&Cube> {
        self.cubes.iter().find(|c| c.id == id)
    }

    pub fn cube_mut(&mut self, id: u32) -> Option<&mut Cube> {
        self.cubes.iter_mut().find(|c| c.id == id)
    }

    /// Remove a cube from the world, returning it if it was still alive.
    /// Any further lookup of the id fails the liveness check.
    pub fn remove_cube(&mut self, id: u32) -> Option<Cube> {
        let idx = self.cubes.iter().position(|c| c.id == id)?;
        Some(self.cubes.remove(idx))
    }

    /// Spawn a fresh world cube and return its id
    pub fn add_cube(&mut self, value: u32, pos: Vec3) -> u32 {
        let id = self.next_entity_id();
        let mut cube = Cube::new(id, value, pos);
        cube.set_value(value, &self.appearance);
        self.cubes.push(cube);
        id
    }

    /// Position of the cube ahead of tail index `i` (the player for index 0)
    pub fn tail_leader_pose(&self, index: usize) -> Option<(Vec3, Quat)> {
        if index == 0 {
            Some((self.player.cube.pos, self.player.cube.rot))
        } else {
            let prev = self.cube(*self.tail.get(index - 1)?)?;
            Some((prev.pos, prev.rot))
        }
    }

    /// Follow target behind a leader pose at the tuned tail distance
    pub fn tail_target(&self, leader_pos: Vec3, leader_rot: Quat) -> Vec3 {
        leader_pos - forward(leader_rot) * self.tuning.tail.distance
    }

    /// Camera collaborators consume this each tick
    pub fn camera_target(&self) -> Vec3 {
        self.player.cube.pos
    }

    /// Ensure cubes are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.cubes.sort_by_key(|c| c.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn test_new_state_has_starter_tail() {
        let state = GameState::new(7, Tuning::default());
        assert_eq!(state.tail.len(), state.tuning.tail.initial_length as usize);
        assert_eq!(state.player.value(), 2);
        // Every tail id resolves to a live value-2 trail member
        for &id in &state.tail {
            let cube = state.cube(id).expect("tail cube alive");
            assert_eq!(cube.value, 2);
            assert!(cube.trail_member);
        }
    }

    #[test]
    fn test_remove_cube_invalidates_id() {
        let mut state = GameState::new(7, Tuning::default());
        let id = state.add_cube(4, Vec3::new(5.0, 0.0, 5.0));
        assert!(state.cube(id).is_some());
        assert!(state.remove_cube(id).is_some());
        assert!(state.cube(id).is_none());
        // Double remove is a no-op
        assert!(state.remove_cube(id).is_none());
    }

    #[test]
    fn test_boost_drains_and_cools_down() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);

        // Hold boost until empty
        let mut ticks = 0;
        while player.current_boost > 0.0 && ticks < 100_000 {
            player.handle_boost(true, &tuning, SIM_DT);
            ticks += 1;
        }
        assert!(player.cooldown_timer > 0.0);
        assert!(!player.boost_ready(&tuning));

        // Wait out the cooldown, then refill
        while player.cooldown_timer > 0.0 {
            player.handle_boost(false, &tuning, SIM_DT);
        }
        for _ in 0..100_000 {
            player.handle_boost(false, &tuning, SIM_DT);
            if player.boost_ready(&tuning) {
                break;
            }
        }
        assert!(player.boost_ready(&tuning));
    }

    #[test]
    fn test_boost_effect_lingers_after_release() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);

        for _ in 0..5 {
            player.handle_boost(true, &tuning, SIM_DT);
        }
        assert!(player.boost_effect_active());

        // Half a second after release the linger runs out
        for _ in 0..20 {
            player.handle_boost(false, &tuning, SIM_DT);
        }
        assert!(player.boost_effect_active());
        for _ in 0..11 {
            player.handle_boost(false, &tuning, SIM_DT);
        }
        assert!(!player.boost_effect_active());
    }

    #[test]
    fn test_step_movement_snaps_to_grid_target() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);
        player.current_direction = Vec3::X;

        for _ in 0..1000 {
            player.step_movement(&tuning, SIM_DT);
            if !player.moving {
                break;
            }
        }
        assert!(!player.moving);
        assert!((player.cube.pos.x - GRID_SIZE).abs() < 1e-4);
    }
}
