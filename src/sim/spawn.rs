//! Target spawn policy
//!
//! Regular cycles respect the interval, the population cap and the minimum
//! angular separation between wheel slots. Bonus spawns (split children and
//! mystery extras) skip the cap.

use rand::Rng;

use super::events::GameEvent;
use super::state::GameState;
use super::target::{Target, TargetKind};
use crate::angular_distance;

/// Weighted draw by cumulative probability.
///
/// Negative weights count as zero; an empty or all-zero table yields `None`.
pub fn weighted_pick<T: Copy, R: Rng + ?Sized>(table: &[(T, f32)], rng: &mut R) -> Option<T> {
    let total: f32 = table.iter().map(|&(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }

    let mut roll = rng.random::<f32>() * total;
    for &(item, weight) in table {
        let weight = weight.max(0.0);
        if weight <= 0.0 {
            continue;
        }
        if roll < weight {
            return Some(item);
        }
        roll -= weight;
    }
    // Float rounding left a sliver past the last bucket
    table
        .iter()
        .rev()
        .find(|&&(_, w)| w > 0.0)
        .map(|&(item, _)| item)
}

/// Rejection-sample a wheel slot at least `min_separation` from every
/// occupied slot, giving up after `attempts` draws.
pub fn find_free_slot<R: Rng + ?Sized>(
    occupied: &[f32],
    min_separation: f32,
    attempts: u32,
    rng: &mut R,
) -> Option<f32> {
    use std::f32::consts::PI;

    (0..attempts)
        .map(|_| rng.random_range(-PI..PI))
        .find(|&angle| {
            occupied
                .iter()
                .all(|&slot| angular_distance(angle, slot) >= min_separation)
        })
}

/// Wheel-relative slots of every active target
fn occupied_slots(state: &GameState) -> Vec<f32> {
    state
        .targets
        .iter()
        .filter(|t| t.active)
        .map(|t| t.wheel_slot(&state.wheel))
        .collect()
}

/// Create a target at `angle` and announce it
pub fn spawn_target(state: &mut GameState, kind: TargetKind, angle: f32, now_ms: f64) -> u32 {
    let id = state.ids.next();
    let target = Target::spawn(id, kind, angle, &state.wheel, now_ms, &state.tuning);
    log::debug!("Spawned {} target {id} at slot {:.2}", kind.as_str(), target.angle);
    state.targets.push(target);
    state.emit(GameEvent::TargetSpawned { id, kind });
    id
}

/// One regular spawn cycle. Returns the new target's id, if any.
pub fn spawn_cycle(state: &mut GameState, now_ms: f64) -> Option<u32> {
    if state.active_targets() == 0 {
        return force_spawn_standard(state, now_ms);
    }
    if !state
        .target_timer
        .poll(now_ms, state.tuning.targets.spawn_interval_ms)
    {
        return None;
    }
    if state.active_targets() >= state.tuning.targets.max_targets {
        return None;
    }

    let weights = state.tuning.targets.variants.weights();
    let kind = weighted_pick(&weights, &mut state.rng)?;
    let occupied = occupied_slots(state);
    let angle = find_free_slot(
        &occupied,
        state.tuning.targets.min_angular_separation,
        state.tuning.targets.spawn_attempts,
        &mut state.rng,
    )?;
    Some(spawn_target(state, kind, angle, now_ms))
}

/// Keep the wheel from ever standing empty (ignores the interval)
pub fn force_spawn_standard(state: &mut GameState, now_ms: f64) -> Option<u32> {
    let angle = state
        .rng
        .random_range(-std::f32::consts::PI..std::f32::consts::PI);
    state.target_timer.reset(now_ms);
    Some(spawn_target(state, TargetKind::Standard, angle, now_ms))
}

/// Mystery reward: up to `count` extra weighted targets, ignoring the cap.
///
/// Each still needs a free slot; crowded wheels get fewer.
pub fn spawn_extra_targets(state: &mut GameState, count: u32, now_ms: f64) -> Vec<u32> {
    let weights = state.tuning.targets.variants.weights();
    let mut spawned = Vec::new();
    for _ in 0..count {
        let kind = weighted_pick(&weights, &mut state.rng).unwrap_or(TargetKind::Standard);
        let occupied = occupied_slots(state);
        let Some(angle) = find_free_slot(
            &occupied,
            state.tuning.targets.min_angular_separation,
            state.tuning.targets.spawn_attempts,
            &mut state.rng,
        ) else {
            continue;
        };
        spawned.push(spawn_target(state, kind, angle, now_ms));
    }
    spawned
}

/// Two Split children at the given slots, ignoring cap and separation
pub fn spawn_split_children(
    state: &mut GameState,
    child_angles: [f32; 2],
    depth: u32,
    size: f32,
    now_ms: f64,
) -> [u32; 2] {
    child_angles.map(|angle| {
        let id = state.ids.next();
        let child = Target::spawn(id, TargetKind::Split, angle, &state.wheel, now_ms, &state.tuning)
            .with_split_depth(depth, size);
        log::debug!("Split child {id} at depth {depth}");
        state.targets.push(child);
        state.emit(GameEvent::TargetSpawned {
            id,
            kind: TargetKind::Split,
        });
        id
    })
}
