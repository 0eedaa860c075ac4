//! Collection and merge engine
//!
//! The heart of the game: deciding collect-vs-merge-vs-ignore on contact,
//! grouping equal-valued cubes across the player and its tail, and running
//! the time-sliced merge animation that doubles a survivor and destroys
//! the rest.
//!
//! `player.merging` is the sole synchronization gate. While an animation
//! is in flight no movement, contact handling, or tail update runs, so a
//! re-entrant merge is impossible. Animations are advanced once per tick
//! by the main loop and are not cancellable; participants destroyed by
//! other means are skipped per frame, never failing the batch.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use super::state::GameState;
use super::tail;
use crate::consts::{MERGE_DURATION, MERGE_SETTLE_DELAY};

/// Contact classification against the player's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactClass {
    /// Bigger cube: no interaction
    Ignore,
    /// Equal value: pairwise merge into the player
    Merge,
    /// Smaller value: collect into the tail
    Collect,
}

/// What a handled contact did to game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    Ignored,
    MergeStarted,
    Collected,
}

/// A merge participant: the player or a tail cube
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participant {
    Player,
    Cube(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKind {
    /// Freshly contacted equal-valued cube merging into the player
    WithPlayer,
    /// Batched merge of an equal-valued group from the cascade check
    Batched,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MergePhase {
    /// Destroy-members lerping toward the player, scaling to zero
    Animating,
    /// Post-merge settle delay before the next cascade check
    Settling,
}

/// Explicit per-merge animation record, advanced once per tick
#[derive(Debug, Clone)]
pub struct MergeAnim {
    pub kind: MergeKind,
    /// Shared value of the group when the merge started
    pub value: u32,
    /// Cube ids destroyed when the animation completes
    pub destroy: Vec<u32>,
    /// Start pose (pos, rot, scale) per destroy member
    pub starts: Vec<(Vec3, Quat, f32)>,
    /// Survivor whose value doubles: `None` is the player
    pub survivor: Option<u32>,
    pub target_pos: Vec3,
    pub target_rot: Quat,
    pub elapsed: f32,
    pub settle: f32,
    pub phase: MergePhase,
}

/// Classify a contact by value comparison
#[inline]
pub fn classify_contact(player_value: u32, other_value: u32) -> ContactClass {
    if other_value > player_value {
        ContactClass::Ignore
    } else if other_value == player_value {
        ContactClass::Merge
    } else {
        ContactClass::Collect
    }
}

/// Resolve a contact between the player and a world cube.
///
/// No-op while a merge is in flight or when the cube is already a tail
/// member / trigger-only.
pub fn handle_contact(state: &mut GameState, cube_id: u32) -> ContactOutcome {
    if state.player.merging {
        return ContactOutcome::Ignored;
    }
    let Some(cube) = state.cube(cube_id) else {
        return ContactOutcome::Ignored;
    };
    if cube.trail_member || !cube.physics_enabled {
        return ContactOutcome::Ignored;
    }

    match classify_contact(state.player.value(), cube.value) {
        ContactClass::Ignore => ContactOutcome::Ignored,
        ContactClass::Merge => {
            begin_player_merge(state, cube_id);
            ContactOutcome::MergeStarted
        }
        ContactClass::Collect => {
            tail::join_tail(state, cube_id);
            check_for_all_merges(state);
            ContactOutcome::Collected
        }
    }
}

/// Start the pairwise merge of a contacted equal-valued cube into the player
fn begin_player_merge(state: &mut GameState, cube_id: u32) {
    let Some(cube) = state.cube(cube_id) else {
        return;
    };
    log::debug!(
        "merge with player: cube {} value {} -> {}",
        cube_id,
        cube.value,
        cube.value * 2
    );
    let anim = MergeAnim {
        kind: MergeKind::WithPlayer,
        value: state.player.value(),
        destroy: vec![cube_id],
        starts: vec![(cube.pos, cube.rot, cube.scale)],
        survivor: None,
        target_pos: state.player.cube.pos,
        target_rot: state.player.cube.rot,
        elapsed: 0.0,
        settle: 0.0,
        phase: MergePhase::Animating,
    };
    state.player.merging = true;
    state.merge = Some(anim);
}

/// Group the player and every live tail cube by value. Values map in
/// ascending order, which fixes the cascade's group-selection order.
fn value_groups(state: &GameState) -> BTreeMap<u32, Vec<Participant>> {
    let mut groups: BTreeMap<u32, Vec<Participant>> = BTreeMap::new();
    groups
        .entry(state.player.value())
        .or_default()
        .push(Participant::Player);

    for &id in &state.tail {
        if let Some(cube) = state.cube(id) {
            groups.entry(cube.value).or_default().push(Participant::Cube(id));
        }
    }
    groups
}

/// Cascade check: find the first value group (ascending) with two or more
/// members and start a batched merge for it. A no-op when every group is
/// a singleton.
pub fn check_for_all_merges(state: &mut GameState) {
    let groups = value_groups(state);
    for (value, members) in groups {
        if members.len() >= 2 {
            begin_batched_merge(state, value, members);
            return;
        }
    }
}

/// Start a batched merge: the front half of the group survives, the back
/// half animates into the player and is destroyed; an odd leftover stays
/// untouched this round.
fn begin_batched_merge(state: &mut GameState, value: u32, members: Vec<Participant>) {
    let merge_count = members.len() / 2;
    let keep = &members[..merge_count];
    let destroy = &members[merge_count..merge_count * 2];

    let player_included = members.contains(&Participant::Player);
    // The player always groups first, so it can only land in the keep half
    let survivor = if player_included {
        None
    } else {
        match keep.first() {
            Some(Participant::Cube(id)) => Some(*id),
            _ => None,
        }
    };

    let mut destroy_ids = Vec::with_capacity(destroy.len());
    let mut starts = Vec::with_capacity(destroy.len());
    for member in destroy {
        if let Participant::Cube(id) = member {
            if let Some(cube) = state.cube(*id) {
                destroy_ids.push(*id);
                starts.push((cube.pos, cube.rot, cube.scale));
            }
        }
    }

    log::debug!(
        "batched merge: value {value} group of {}, destroying {}",
        members.len(),
        destroy_ids.len()
    );

    state.player.merging = true;
    state.merge = Some(MergeAnim {
        kind: MergeKind::Batched,
        value,
        destroy: destroy_ids,
        starts,
        survivor,
        target_pos: state.player.cube.pos,
        target_rot: state.player.cube.rot,
        elapsed: 0.0,
        settle: 0.0,
        phase: MergePhase::Animating,
    });
}

/// Advance the in-flight merge animation by one tick
pub fn advance_merge(state: &mut GameState, dt: f32) {
    let Some(mut anim) = state.merge.take() else {
        return;
    };

    match anim.phase {
        MergePhase::Animating => {
            anim.elapsed += dt;
            let t = (anim.elapsed / MERGE_DURATION).min(1.0);

            for (idx, &id) in anim.destroy.iter().enumerate() {
                let (start_pos, start_rot, start_scale) = anim.starts[idx];
                // Destroyed externally mid-animation: skip the step, not the batch
                if let Some(cube) = state.cube_mut(id) {
                    cube.pos = start_pos.lerp(anim.target_pos, t);
                    cube.rot = start_rot.slerp(anim.target_rot, t);
                    cube.scale = start_scale * (1.0 - t);
                }
            }

            if anim.elapsed >= MERGE_DURATION {
                complete_merge(state, &anim);
                match anim.kind {
                    MergeKind::WithPlayer => finish_and_cascade(state),
                    MergeKind::Batched => {
                        anim.phase = MergePhase::Settling;
                        anim.settle = MERGE_SETTLE_DELAY;
                        state.merge = Some(anim);
                    }
                }
            } else {
                state.merge = Some(anim);
            }
        }
        MergePhase::Settling => {
            anim.settle -= dt;
            if anim.settle <= 0.0 {
                finish_and_cascade(state);
            } else {
                state.merge = Some(anim);
            }
        }
    }
}

/// Double the survivor, then destroy the consumed members and drop them
/// from the tail. Tail removal is applied after the destroy loop so the
/// chain order is never mutated mid-iteration.
fn complete_merge(state: &mut GameState, anim: &MergeAnim) {
    let new_value = anim.value * 2;
    let appearance = state.appearance.clone();

    match anim.survivor {
        None => {
            state.player.cube.set_value(new_value, &appearance);
            log::info!("player merged up to {new_value}");
        }
        Some(id) => match state.cube_mut(id) {
            Some(cube) => cube.set_value(new_value, &appearance),
            // Survivor died externally: the round completes without a doubling
            None => log::warn!("merge survivor {id} died mid-animation"),
        },
    }

    for &id in &anim.destroy {
        state.remove_cube(id);
    }
    state.tail.retain(|id| !anim.destroy.contains(id));
}

/// Lower the merging gate, then re-check for chain reactions (which may
/// raise it again immediately)
fn finish_and_cascade(state: &mut GameState) {
    state.player.merging = false;
    check_for_all_merges(state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::consts::SIM_DT;
    use glam::Vec3;

    fn bare_state() -> GameState {
        let mut tuning = Tuning::default();
        tuning.tail.initial_length = 0;
        tuning.spawn.initial_count = 0;
        GameState::new(42, tuning)
    }

    /// Run merge animations (including cascades) until the gate drops
    fn run_merges(state: &mut GameState) {
        let mut ticks = 0;
        while state.merge.is_some() && ticks < 10_000 {
            advance_merge(state, SIM_DT);
            ticks += 1;
        }
        assert!(ticks < 10_000, "merge never settled");
    }

    #[test]
    fn test_classify_contact() {
        assert_eq!(classify_contact(4, 8), ContactClass::Ignore);
        assert_eq!(classify_contact(4, 4), ContactClass::Merge);
        assert_eq!(classify_contact(4, 2), ContactClass::Collect);
    }

    #[test]
    fn test_bigger_cube_contact_changes_nothing() {
        let mut state = bare_state();
        let id = state.add_cube(8, Vec3::new(1.0, 0.0, 0.0));

        let outcome = handle_contact(&mut state, id);
        assert_eq!(outcome, ContactOutcome::Ignored);
        assert_eq!(state.player.value(), 2);
        assert!(state.tail.is_empty());
        assert!(state.cube(id).is_some());
    }

    #[test]
    fn test_equal_contact_doubles_player_and_destroys_cube() {
        let mut state = bare_state();
        let id = state.add_cube(2, Vec3::new(1.0, 0.0, 0.0));

        let outcome = handle_contact(&mut state, id);
        assert_eq!(outcome, ContactOutcome::MergeStarted);
        assert!(state.player.merging);
        // Mid-animation nothing has resolved yet
        assert_eq!(state.player.value(), 2);

        run_merges(&mut state);
        assert_eq!(state.player.value(), 4);
        assert!(state.cube(id).is_none());
        assert!(!state.player.merging);
    }

    #[test]
    fn test_smaller_contact_joins_tail_without_value_change() {
        let mut state = bare_state();
        state.player.cube.value = 4;
        let id = state.add_cube(2, Vec3::new(1.0, 0.0, 0.0));

        let outcome = handle_contact(&mut state, id);
        assert_eq!(outcome, ContactOutcome::Collected);
        assert_eq!(state.tail.len(), 1);
        assert_eq!(state.player.value(), 4);
        // A single 2 forms no group, so no merge started
        assert!(state.merge.is_none());
    }

    #[test]
    fn test_contacts_ignored_while_merging() {
        let mut state = bare_state();
        let first = state.add_cube(2, Vec3::new(1.0, 0.0, 0.0));
        let second = state.add_cube(2, Vec3::new(2.0, 0.0, 0.0));

        assert_eq!(handle_contact(&mut state, first), ContactOutcome::MergeStarted);
        // Gate is up: the second contact must not start anything
        assert_eq!(handle_contact(&mut state, second), ContactOutcome::Ignored);
        run_merges(&mut state);
        assert!(state.cube(second).is_some());
    }

    #[test]
    fn test_cascade_noop_when_all_groups_are_singletons() {
        let mut state = bare_state();
        state.player.cube.value = 8;
        let a = state.add_cube(2, Vec3::ZERO);
        let b = state.add_cube(4, Vec3::ZERO);
        tail::join_tail(&mut state, a);
        tail::join_tail(&mut state, b);

        check_for_all_merges(&mut state);
        assert!(state.merge.is_none());
        assert!(!state.player.merging);
        assert_eq!(state.tail.len(), 2);
        assert_eq!(state.player.value(), 8);
    }

    /// Advance exactly one batch to its settle phase, before any cascade
    fn run_one_batch(state: &mut GameState) {
        let mut ticks = 0;
        while matches!(
            state.merge.as_ref().map(|a| a.phase),
            Some(MergePhase::Animating)
        ) && ticks < 10_000
        {
            advance_merge(state, SIM_DT);
            ticks += 1;
        }
        assert!(ticks < 10_000, "batch never completed");
    }

    #[test]
    fn test_batched_merge_conservation() {
        // Five equal tail cubes, player not in the group: floor(5/2)=2
        // destroyed, exactly one keep member doubled, the rest (including
        // the odd leftover) untouched this round
        let mut state = bare_state();
        state.player.cube.value = 16;
        let ids: Vec<u32> = (0..5)
            .map(|i| {
                let id = state.add_cube(4, Vec3::new(i as f32, 0.0, 0.0));
                tail::join_tail(&mut state, id);
                id
            })
            .collect();

        check_for_all_merges(&mut state);
        assert!(state.merge.is_some());
        run_one_batch(&mut state);

        let survivors: Vec<u32> = ids
            .iter()
            .filter(|id| state.cube(**id).is_some())
            .copied()
            .collect();
        assert_eq!(survivors.len(), 3);
        let doubled = survivors
            .iter()
            .filter(|id| state.cube(**id).unwrap().value == 8)
            .count();
        let untouched = survivors
            .iter()
            .filter(|id| state.cube(**id).unwrap().value == 4)
            .count();
        assert_eq!(doubled, 1);
        assert_eq!(untouched, 2);
        assert_eq!(state.tail.len(), 3);
        assert_eq!(state.player.value(), 16);
    }

    #[test]
    fn test_cascade_prefers_smallest_value_group() {
        let mut state = bare_state();
        state.player.cube.value = 16;
        for i in 0..2 {
            let id = state.add_cube(8, Vec3::new(i as f32, 0.0, 0.0));
            tail::join_tail(&mut state, id);
        }
        for i in 0..2 {
            let id = state.add_cube(2, Vec3::new(10.0 + i as f32, 0.0, 0.0));
            tail::join_tail(&mut state, id);
        }

        check_for_all_merges(&mut state);
        let anim = state.merge.as_ref().expect("merge started");
        assert_eq!(anim.value, 2);
    }

    #[test]
    fn test_three_way_merge_end_to_end() {
        // Player 2 with tail [2] contacts another 2: the contacted cube
        // merges into the player (now 4), then the cascade over {4, 2}
        // finds only singletons and stops with one value-2 member left.
        let mut state = bare_state();
        let tail_id = state.add_cube(2, Vec3::new(0.0, 0.0, -1.5));
        tail::join_tail(&mut state, tail_id);

        let contacted = state.add_cube(2, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(handle_contact(&mut state, contacted), ContactOutcome::MergeStarted);
        run_merges(&mut state);

        assert_eq!(state.player.value(), 4);
        assert!(state.cube(contacted).is_none());
        // The lone remaining 2 found no partner: no infinite cascade
        assert_eq!(state.tail.len(), 1);
        assert_eq!(state.cube(tail_id).unwrap().value, 2);
        assert!(!state.player.merging);
    }

    #[test]
    fn test_four_twos_single_representative_doubles() {
        // Tail [2,2,2,2], player 16: the back pair is consumed, one keep
        // member doubles to 4, the other stays at 2. The follow-up cascade
        // finds only singletons and stops.
        let mut state = bare_state();
        state.player.cube.value = 16;
        for i in 0..4 {
            let id = state.add_cube(2, Vec3::new(i as f32, 0.0, 0.0));
            tail::join_tail(&mut state, id);
        }

        check_for_all_merges(&mut state);
        run_merges(&mut state);

        assert_eq!(state.tail.len(), 2);
        let mut values: Vec<u32> = state
            .tail
            .iter()
            .map(|id| state.cube(*id).unwrap().value)
            .collect();
        values.sort_unstable();
        assert_eq!(values, vec![2, 4]);
        assert_eq!(state.player.value(), 16);
    }

    #[test]
    fn test_destroyed_mid_animation_is_skipped() {
        let mut state = bare_state();
        state.player.cube.value = 8;
        let ids: Vec<u32> = (0..4)
            .map(|i| {
                let id = state.add_cube(4, Vec3::new(i as f32, 0.0, 0.0));
                tail::join_tail(&mut state, id);
                id
            })
            .collect();

        check_for_all_merges(&mut state);
        let doomed = state.merge.as_ref().unwrap().destroy[0];
        // Simulate an external event destroying one participant mid-flight
        advance_merge(&mut state, SIM_DT);
        state.remove_cube(doomed);
        state.tail.retain(|id| *id != doomed);
        run_merges(&mut state);

        // Batch still completed: ids[0] doubled to 8, the chain reaction
        // paired it with the player (8 as well) and doubled the player
        assert_eq!(state.player.value(), 16);
        assert_eq!(state.tail, vec![ids[1]]);
        assert_eq!(state.cube(ids[1]).unwrap().value, 4);
        assert!(!state.player.merging);
    }
}
