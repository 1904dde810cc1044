//! Variable-timestep simulation tick
//!
//! One call per rendered frame. The pass reads input, moves everything,
//! gathers collisions into [`TickStaging`], then applies them so no list is
//! mutated while it is being scanned.

use glam::Vec3;
use rand::Rng;

use super::arrow::ArrowId;
use super::collision::plane_crossing;
use super::events::GameEvent;
use super::powerup::PowerUpKind;
use super::spawn::{spawn_cycle, spawn_extra_targets, spawn_split_children};
use super::state::{GamePhase, GameState};
use super::target::{HitResult, MysteryReward, SpecialEffect};

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Lane movement in [-1, 1]
    pub move_axis: f32,
    /// World point to aim at (keeps the previous aim when `None`)
    pub aim_point: Option<Vec3>,
    /// Fire if the cooldown allows
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

/// A target struck by an arrow this tick
#[derive(Debug, Clone, Copy)]
struct StagedHit {
    target: usize,
    result: HitResult,
    explosive_arrow: bool,
}

/// Collision results gathered before any of them are applied
#[derive(Debug, Default)]
struct TickStaging {
    hits: Vec<StagedHit>,
    misses: u32,
    pickups: Vec<PowerUpKind>,
}

/// Advance the game by one frame of `dt` seconds at wall-clock `now_ms`
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, now_ms: f64) {
    // Handle pause toggle
    if input.pause {
        state.phase = match state.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
        };
        log::debug!("Phase -> {:?}", state.phase);
    }
    if state.phase == GamePhase::Paused {
        return;
    }

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }

    // Player movement (slowed while stunned)
    let speed = state.tuning.player.speed
        * state
            .obstacles
            .stun
            .speed_factor(now_ms, state.tuning.obstacles.stun_speed_fraction);
    state
        .player
        .move_along(input.move_axis, speed, dt, state.tuning.player.lane_half_width);
    if let Some(aim) = input.aim_point {
        state.player.aim = aim;
    }

    if input.fire && state.can_fire(now_ms) {
        fire_arrow(state, now_ms);
    }

    let gravity = state.tuning.arrows.gravity;
    state
        .obstacles
        .update(dt, state.player.center(), gravity, &state.tuning.obstacles);
    state
        .power_ups
        .update(dt, state.player.center(), &state.tuning.power_ups);

    apply_magnetism(state);
    state.arrows.integrate(
        dt,
        gravity,
        state.tuning.arrows.bounds_min,
        state.tuning.arrows.bounds_max,
    );

    // Wheel and targets
    state.wheel.advance(dt);
    let mut expired = Vec::new();
    for target in state.targets.iter_mut().filter(|t| t.active) {
        target.update(dt, &state.wheel, now_ms);
        if !target.active {
            expired.push((target.id, target.kind()));
        }
    }
    for (id, kind) in expired {
        log::debug!("{} target {id} expired", kind.as_str());
        state.stats.targets_expired += 1;
        state.emit(GameEvent::TargetExpired { id, kind });
    }

    let staging = collect_arrow_collisions(state);

    for hit in &staging.hits {
        apply_hit(state, hit.target, hit.result, hit.explosive_arrow, true, now_ms);
    }
    for _ in 0..staging.misses {
        broadcast_miss(state);
    }
    for kind in staging.pickups {
        activate_power_up(state, kind, now_ms);
    }

    // Player walks through a pickup
    let reach = state.tuning.power_ups.pickup_radius + state.tuning.player.radius;
    while let Some(index) = state.power_ups.pickup_at(state.player.center(), reach) {
        if let Some(kind) = state.power_ups.collect(index) {
            activate_power_up(state, kind, now_ms);
        }
    }

    resolve_obstacle_contacts(state, now_ms);

    for kind in state.power_ups.tick(now_ms) {
        state.emit(GameEvent::PowerUpExpired { kind });
    }

    // Spawns
    spawn_cycle(state, now_ms);
    let player_center = state.player.center();
    state.obstacles.try_spawn(
        &mut state.ids,
        player_center,
        gravity,
        now_ms,
        &mut state.rng,
        &state.tuning.obstacles,
    );
    state
        .power_ups
        .try_spawn(&mut state.ids, now_ms, &mut state.rng, &state.tuning.power_ups);

    state.targets.retain(|t| t.active);
    state.normalize_order();
}

fn fire_arrow(state: &mut GameState, now_ms: f64) {
    let explosive = state.power_ups.explosive_arrows();
    state.arrows.launch(
        state.player.bow(),
        state.player.aim,
        explosive,
        state.tuning.arrows.speed,
    );
    state.last_fire_ms = Some(now_ms);
    state.stats.shots_fired += 1;
    state.emit(GameEvent::ArrowFired { explosive });
}

/// Magnetic targets bend nearby arrows (added to velocity, not scaled by dt)
fn apply_magnetism(state: &mut GameState) {
    for id in state.arrows.active_ids() {
        let Some(arrow) = state.arrows.get_mut(id) else {
            continue;
        };
        let pull: Vec3 = state
            .targets
            .iter()
            .filter_map(|t| t.magnetic_force(arrow.pos))
            .sum();
        arrow.vel += pull;
    }
}

/// First target hit by the arrow, probing the wheel-plane crossing first
fn probe_targets(state: &GameState, probes: &[Vec3], padding: f32) -> Option<usize> {
    probes.iter().find_map(|&point| {
        state
            .targets
            .iter()
            .position(|t| t.check_collision_padded(point, padding))
    })
}

fn collect_arrow_collisions(state: &mut GameState) -> TickStaging {
    let mut staging = TickStaging::default();
    let padding = state.tuning.arrows.explosive_hit_bonus;

    for id in state.arrows.active_ids() {
        let Some(arrow) = state.arrows.get(id) else {
            continue;
        };
        let (prev, pos, explosive) = (arrow.prev_pos, arrow.pos, arrow.explosive);
        let crossing = plane_crossing(prev, pos, state.wheel.center.z);
        let probes: Vec<Vec3> = crossing.into_iter().chain(std::iter::once(pos)).collect();
        let pad = if explosive { padding } else { 0.0 };

        if let Some(index) = probe_targets(state, &probes, pad) {
            // Consumed now so a second arrow this tick can't score it again
            let result = state.targets[index].on_hit(&mut state.rng);
            staging.hits.push(StagedHit {
                target: index,
                result,
                explosive_arrow: explosive,
            });
            retire(state, id);
            continue;
        }

        if let Some(index) = state
            .power_ups
            .pickup_at(pos, state.tuning.power_ups.pickup_radius)
        {
            if let Some(kind) = state.power_ups.collect(index) {
                staging.pickups.push(kind);
                retire(state, id);
                continue;
            }
        }

        if crossing.is_some_and(|point| state.wheel.in_band(point)) {
            staging.misses += 1;
            retire(state, id);
        }
    }
    staging
}

fn retire(state: &mut GameState, id: ArrowId) {
    state.arrows.deactivate(id);
}

/// Score a hit and resolve its side effects.
///
/// `direct` hits come from arrows and may detonate; chain victims never do.
fn apply_hit(
    state: &mut GameState,
    index: usize,
    result: HitResult,
    explosive_arrow: bool,
    direct: bool,
    now_ms: f64,
) {
    let (id, kind, origin) = {
        let target = &state.targets[index];
        (target.id, target.kind(), target.pos)
    };

    let score_multiplier = state.power_ups.score_multiplier(&state.tuning.power_ups);
    let award = state
        .combo
        .register_hit(result.points, score_multiplier, now_ms, &state.tuning.combo);
    state.score += award.points;
    if direct {
        state.stats.hits += 1;
    } else {
        state.stats.chain_kills += 1;
    }
    state.stats.best_combo = state.combo.best;
    state.wheel.speed_up();
    state.emit(GameEvent::TargetHit {
        id,
        kind,
        points: award.points,
    });
    if award.milestone {
        state.emit(GameEvent::ComboMilestone {
            count: award.combo_count,
        });
    }

    // Explosive arrows detonate on anything; a target's own blast merges in
    let mut blast = explosive_arrow.then_some((
        origin,
        state.tuning.arrows.explosive_radius,
        state.tuning.arrows.explosive_chain,
    ));
    if let Some(SpecialEffect::Explosion {
        origin,
        radius,
        chain_probability,
    }) = result.special
    {
        blast = Some(match blast {
            Some((_, r, p)) => (origin, r.max(radius), p.max(chain_probability)),
            None => (origin, radius, chain_probability),
        });
    }
    if direct {
        if let Some((origin, radius, probability)) = blast {
            detonate(state, origin, radius, probability, now_ms);
        }
    }

    match result.special {
        Some(SpecialEffect::Split {
            child_angles,
            depth,
            size,
        }) => {
            spawn_split_children(state, child_angles, depth, size, now_ms);
        }
        Some(SpecialEffect::Mystery(reward)) => reveal_mystery(state, reward, now_ms),
        Some(SpecialEffect::Explosion { .. }) | None => {}
    }
}

/// Each active target inside the blast falls to an independent trial
fn detonate(state: &mut GameState, origin: Vec3, radius: f32, probability: f32, now_ms: f64) {
    let in_range: Vec<usize> = state
        .targets
        .iter()
        .enumerate()
        .filter(|(_, t)| t.active && t.pos.distance(origin) <= radius)
        .map(|(i, _)| i)
        .collect();

    let probability = f64::from(probability).clamp(0.0, 1.0);
    let mut destroyed = 0;
    for index in in_range {
        if !state.targets[index].active || !state.rng.random_bool(probability) {
            continue;
        }
        let result = state.targets[index].on_hit(&mut state.rng);
        apply_hit(state, index, result, false, false, now_ms);
        destroyed += 1;
    }
    log::debug!("Explosion at {origin} destroyed {destroyed}");
    state.emit(GameEvent::ChainReaction { destroyed });
}

fn reveal_mystery(state: &mut GameState, reward: MysteryReward, now_ms: f64) {
    state.emit(GameEvent::MysteryRevealed {
        message: reward.describe(),
    });
    match reward {
        // Already folded into the hit's points
        MysteryReward::Points(_) => {}
        MysteryReward::PowerUp => {
            let kind = PowerUpKind::random(&mut state.rng);
            activate_power_up(state, kind, now_ms);
        }
        MysteryReward::ExtraTargets(count) => {
            spawn_extra_targets(state, count, now_ms);
        }
    }
}

/// An arrow crossed the band without hitting anything
fn broadcast_miss(state: &mut GameState) {
    state.stats.misses += 1;
    state.emit(GameEvent::Miss);

    let mut worn_out = Vec::new();
    for target in state.targets.iter_mut().filter(|t| t.active) {
        target.on_miss();
        if !target.active {
            worn_out.push((target.id, target.kind()));
        }
    }
    for (id, kind) in worn_out {
        state.stats.targets_expired += 1;
        state.emit(GameEvent::TargetExpired { id, kind });
    }
}

fn activate_power_up(state: &mut GameState, kind: PowerUpKind, now_ms: f64) {
    state
        .power_ups
        .activate(kind, now_ms, &state.tuning.power_ups);
    state.stats.power_ups_collected += 1;
    state.emit(GameEvent::PowerUpCollected { kind });
}

fn resolve_obstacle_contacts(state: &mut GameState, now_ms: f64) {
    let report = state.obstacles.resolve_contacts(
        state.player.center(),
        state.tuning.player.radius,
        now_ms,
        &state.tuning.obstacles,
    );
    let penalty = state.tuning.obstacles.penalty;
    for kind in report.collisions {
        state.apply_penalty(penalty);
        state.stats.obstacles_hit += 1;
        state.emit(GameEvent::ObstacleCollision { kind, penalty });
    }
    for kind in report.warnings {
        state.emit(GameEvent::ObstacleWarning { kind });
    }
}

/// Demo player: aim at the nearest visible target, lob to cancel gravity,
/// wander toward pickups and fire whenever allowed.
fn autopilot(state: &GameState, input: &mut TickInput) {
    let bow = state.player.bow();
    let nearest = state
        .targets
        .iter()
        .filter(|t| t.active && t.is_visible())
        .min_by(|a, b| {
            a.pos
                .distance_squared(bow)
                .partial_cmp(&b.pos.distance_squared(bow))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    if let Some(target) = nearest {
        // Lead the target: refine the flight time once against the predicted spot
        let speed = state.tuning.arrows.speed;
        let mut flight = target.pos.distance(bow) / speed;
        let mut lead = target.predicted_position(&state.wheel, flight);
        flight = lead.distance(bow) / speed;
        lead = target.predicted_position(&state.wheel, flight);

        let drop = 0.5 * state.tuning.arrows.gravity * flight * flight;
        input.aim_point = Some(lead + Vec3::Y * drop);
        input.fire = true;
    }

    let pickup_x = state
        .power_ups
        .pickups
        .iter()
        .filter(|p| p.active)
        .map(|p| p.pos.x)
        .min_by(|a, b| {
            (a - bow.x)
                .abs()
                .partial_cmp(&(b - bow.x).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    input.move_axis = match pickup_x {
        Some(x) if (x - state.player.pos.x).abs() > 0.2 => (x - state.player.pos.x).signum(),
        _ => 0.0,
    };
}
