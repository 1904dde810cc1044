//! Data-driven game balance
//!
//! Every knob the simulation reads lives here. Defaults come from
//! [`crate::consts`]; a JSON file can override any subset of fields.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::obstacle::ObstacleKind;
use crate::sim::powerup::PowerUpKind;
use crate::sim::target::{MysteryReward, TargetKind};

/// Failure loading or validating a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), TuningError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("must be > 0 (got {value})")))
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("must be within [0, 1] (got {value})")))
    }
}

fn fraction(field: &'static str, value: f64) -> Result<(), TuningError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be within (0, 1] (got {value})")))
    }
}

fn ordered(field: &'static str, min: f64, max: f64) -> Result<(), TuningError> {
    if min <= max {
        Ok(())
    } else {
        Err(invalid(field, format!("min {min} exceeds max {max}")))
    }
}

/// The rotating carrier targets ride on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelTuning {
    pub center: Vec3,
    pub ring_radius: f32,
    pub band_margin: f32,
    pub angular_velocity: f32,
    pub speedup_per_hit: f32,
}

impl Default for WheelTuning {
    fn default() -> Self {
        Self {
            center: Vec3::from_array(WHEEL_CENTER),
            ring_radius: WHEEL_RING_RADIUS,
            band_margin: WHEEL_BAND_MARGIN,
            angular_velocity: WHEEL_ANGULAR_VELOCITY,
            speedup_per_hit: WHEEL_SPEEDUP_PER_HIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub speed: f32,
    pub lane_half_width: f32,
    pub radius: f32,
    pub body_height: f32,
    pub bow_height: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: PLAYER_SPEED,
            lane_half_width: PLAYER_LANE_HALF_WIDTH,
            radius: PLAYER_RADIUS,
            body_height: PLAYER_BODY_HEIGHT,
            bow_height: BOW_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowTuning {
    pub speed: f32,
    pub gravity: f32,
    pub fire_cooldown_ms: f64,
    /// Extra hit radius for explosive arrows
    pub explosive_hit_bonus: f32,
    pub explosive_radius: f32,
    pub explosive_chain: f32,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
}

impl Default for ArrowTuning {
    fn default() -> Self {
        Self {
            speed: ARROW_SPEED,
            gravity: GRAVITY,
            fire_cooldown_ms: FIRE_COOLDOWN_MS,
            explosive_hit_bonus: EXPLOSIVE_ARROW_HIT_BONUS,
            explosive_radius: EXPLOSIVE_ARROW_RADIUS,
            explosive_chain: EXPLOSIVE_ARROW_CHAIN,
            bounds_min: Vec3::new(-ARROW_BOUND_X, ARROW_BOUND_Y_MIN, ARROW_BOUND_Z_MIN),
            bounds_max: Vec3::new(ARROW_BOUND_X, ARROW_BOUND_Y_MAX, ARROW_BOUND_Z_MAX),
        }
    }
}

/// Spawn weight, value and lifetime of one target variant
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VariantTuning {
    pub weight: f32,
    pub points: u32,
    /// Wall-clock lifetime in ms (None = lives until hit)
    pub lifetime_ms: Option<f64>,
    pub size: f32,
}

impl VariantTuning {
    const fn new(weight: f32, points: u32, lifetime_ms: Option<f64>) -> Self {
        Self {
            weight,
            points,
            lifetime_ms,
            size: TARGET_SIZE,
        }
    }
}

/// Per-variant table, one entry per [`TargetKind`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantTable {
    pub standard: VariantTuning,
    pub gold: VariantTuning,
    pub speed: VariantTuning,
    pub bonus: VariantTuning,
    pub shrinking: VariantTuning,
    pub split: VariantTuning,
    pub mystery: VariantTuning,
    pub ghost: VariantTuning,
    pub magnetic: VariantTuning,
    pub explosive: VariantTuning,
}

impl Default for VariantTable {
    fn default() -> Self {
        Self {
            standard: VariantTuning::new(30.0, 10, None),
            gold: VariantTuning::new(8.0, 30, Some(8000.0)),
            speed: VariantTuning::new(8.0, 25, Some(10000.0)),
            bonus: VariantTuning::new(4.0, 50, Some(3000.0)),
            shrinking: VariantTuning {
                size: SHRINK_MAX_SIZE,
                ..VariantTuning::new(8.0, SHRINK_MIN_POINTS, None)
            },
            split: VariantTuning::new(8.0, 15, None),
            mystery: VariantTuning::new(6.0, 15, None),
            ghost: VariantTuning::new(8.0, 20, None),
            magnetic: VariantTuning::new(6.0, 20, None),
            explosive: VariantTuning::new(6.0, 20, None),
        }
    }
}

impl VariantTable {
    pub fn get(&self, kind: TargetKind) -> &VariantTuning {
        match kind {
            TargetKind::Standard => &self.standard,
            TargetKind::Gold => &self.gold,
            TargetKind::Speed => &self.speed,
            TargetKind::Bonus => &self.bonus,
            TargetKind::Shrinking => &self.shrinking,
            TargetKind::Split => &self.split,
            TargetKind::Mystery => &self.mystery,
            TargetKind::Ghost => &self.ghost,
            TargetKind::Magnetic => &self.magnetic,
            TargetKind::Explosive => &self.explosive,
        }
    }

    /// Spawn weights in draw order
    pub fn weights(&self) -> Vec<(TargetKind, f32)> {
        TargetKind::ALL
            .iter()
            .map(|&kind| (kind, self.get(kind).weight))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShrinkTuning {
    pub max_size: f32,
    pub min_size: f32,
    pub ratio: f32,
    pub max_misses: u32,
    pub min_points: u32,
    pub max_points: u32,
}

impl Default for ShrinkTuning {
    fn default() -> Self {
        Self {
            max_size: SHRINK_MAX_SIZE,
            min_size: SHRINK_MIN_SIZE,
            ratio: SHRINK_RATIO,
            max_misses: SHRINK_MAX_MISSES,
            min_points: SHRINK_MIN_POINTS,
            max_points: SHRINK_MAX_POINTS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitTuning {
    pub max_depth: u32,
    pub angle_offset: f32,
    pub child_size: f32,
}

impl Default for SplitTuning {
    fn default() -> Self {
        Self {
            max_depth: SPLIT_MAX_DEPTH,
            angle_offset: SPLIT_ANGLE_OFFSET,
            child_size: SPLIT_CHILD_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetTuning {
    pub max_targets: usize,
    pub min_angular_separation: f32,
    pub spawn_attempts: u32,
    pub spawn_interval_ms: f64,
    pub variants: VariantTable,
    pub speed_multiplier: f32,
    pub shrink: ShrinkTuning,
    pub split: SplitTuning,
    pub ghost_visible_secs: f32,
    pub ghost_invisible_secs: f32,
    pub magnet_range: f32,
    pub magnet_strength: f32,
    pub explosion_radius: f32,
    pub explosion_chain: f32,
}

impl Default for TargetTuning {
    fn default() -> Self {
        Self {
            max_targets: MAX_TARGETS,
            min_angular_separation: MIN_ANGULAR_SEPARATION,
            spawn_attempts: SPAWN_ATTEMPTS,
            spawn_interval_ms: TARGET_SPAWN_INTERVAL_MS,
            variants: VariantTable::default(),
            speed_multiplier: SPEED_MULTIPLIER,
            shrink: ShrinkTuning::default(),
            split: SplitTuning::default(),
            ghost_visible_secs: GHOST_VISIBLE_SECS,
            ghost_invisible_secs: GHOST_INVISIBLE_SECS,
            magnet_range: MAGNET_RANGE,
            magnet_strength: MAGNET_STRENGTH,
            explosion_radius: EXPLOSION_RADIUS,
            explosion_chain: EXPLOSION_CHAIN,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpTuning {
    pub spawn_interval_ms: f64,
    pub spawn_chance: f64,
    pub max_pickups: usize,
    pub pickup_radius: f32,
    /// Pickups drift from their spawn point toward the player's lane
    pub drift_speed: f32,
    pub rapid_fire_duration_ms: f64,
    /// Fire cooldown is multiplied by this while rapid-fire is active
    pub rapid_fire_fraction: f64,
    pub explosive_arrows_duration_ms: f64,
    pub score_multiplier_duration_ms: f64,
    pub score_multiplier: f64,
    /// Pickups float somewhere inside this box
    pub spawn_min: Vec3,
    pub spawn_max: Vec3,
}

impl Default for PowerUpTuning {
    fn default() -> Self {
        Self {
            spawn_interval_ms: POWERUP_SPAWN_INTERVAL_MS,
            spawn_chance: POWERUP_SPAWN_CHANCE,
            max_pickups: MAX_PICKUPS,
            pickup_radius: PICKUP_RADIUS,
            drift_speed: PICKUP_DRIFT_SPEED,
            rapid_fire_duration_ms: RAPID_FIRE_DURATION_MS,
            rapid_fire_fraction: RAPID_FIRE_FRACTION,
            explosive_arrows_duration_ms: EXPLOSIVE_ARROWS_DURATION_MS,
            score_multiplier_duration_ms: SCORE_MULTIPLIER_DURATION_MS,
            score_multiplier: SCORE_MULTIPLIER,
            spawn_min: Vec3::new(-8.0, 1.5, -15.0),
            spawn_max: Vec3::new(8.0, 5.0, -6.0),
        }
    }
}

impl PowerUpTuning {
    pub fn duration_ms(&self, kind: PowerUpKind) -> f64 {
        match kind {
            PowerUpKind::RapidFire => self.rapid_fire_duration_ms,
            PowerUpKind::ExplosiveArrows => self.explosive_arrows_duration_ms,
            PowerUpKind::ScoreMultiplier => self.score_multiplier_duration_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    pub spawn_interval_ms: f64,
    pub rock_weight: f32,
    pub tree_weight: f32,
    pub bird_weight: f32,
    pub rock_min_distance: f32,
    pub rock_max_distance: f32,
    pub rock_speed: f32,
    /// Random yaw (radians) added to a rock's aim
    pub rock_aim_variance: f32,
    pub rock_spawn_height: f32,
    pub rock_radius: f32,
    pub tree_spawn_radius: f32,
    pub tree_min_offset: f32,
    pub tree_radius: f32,
    /// Trees are cleared after this many seconds
    pub tree_lifetime: f32,
    pub bird_radius: f32,
    pub bird_speed: f32,
    pub bird_spawn_offset: f32,
    pub bird_height: f32,
    pub bird_wave_amplitude: f32,
    pub bird_wave_frequency: f32,
    pub despawn_distance: f32,
    pub warning_distance: f32,
    pub penalty: u64,
    pub stun_duration_ms: f64,
    pub stun_speed_fraction: f32,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            spawn_interval_ms: OBSTACLE_SPAWN_INTERVAL_MS,
            rock_weight: 5.0,
            tree_weight: 2.0,
            bird_weight: 3.0,
            rock_min_distance: ROCK_MIN_DISTANCE,
            rock_max_distance: ROCK_MAX_DISTANCE,
            rock_speed: ROCK_SPEED,
            rock_aim_variance: ROCK_AIM_VARIANCE,
            rock_spawn_height: ROCK_SPAWN_HEIGHT,
            rock_radius: ROCK_RADIUS,
            tree_spawn_radius: TREE_SPAWN_RADIUS,
            tree_min_offset: TREE_MIN_OFFSET,
            tree_radius: TREE_RADIUS,
            tree_lifetime: TREE_LIFETIME_SECS,
            bird_radius: BIRD_RADIUS,
            bird_speed: BIRD_SPEED,
            bird_spawn_offset: BIRD_SPAWN_OFFSET,
            bird_height: BIRD_HEIGHT,
            bird_wave_amplitude: BIRD_WAVE_AMPLITUDE,
            bird_wave_frequency: BIRD_WAVE_FREQUENCY,
            despawn_distance: OBSTACLE_DESPAWN_DISTANCE,
            warning_distance: OBSTACLE_WARNING_DISTANCE,
            penalty: OBSTACLE_PENALTY,
            stun_duration_ms: STUN_DURATION_MS,
            stun_speed_fraction: STUN_SPEED_FRACTION,
        }
    }
}

impl ObstacleTuning {
    pub fn weights(&self) -> [(ObstacleKind, f32); 3] {
        [
            (ObstacleKind::Rock, self.rock_weight),
            (ObstacleKind::Tree, self.tree_weight),
            (ObstacleKind::Bird, self.bird_weight),
        ]
    }

    pub fn radius(&self, kind: ObstacleKind) -> f32 {
        match kind {
            ObstacleKind::Rock => self.rock_radius,
            ObstacleKind::Tree => self.tree_radius,
            ObstacleKind::Bird => self.bird_radius,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboTuning {
    pub window_ms: f64,
    pub increment: f64,
    pub max_multiplier: f64,
    /// Emit a milestone every N consecutive hits (0 disables)
    pub milestone_interval: u32,
}

impl Default for ComboTuning {
    fn default() -> Self {
        Self {
            window_ms: COMBO_WINDOW_MS,
            increment: COMBO_INCREMENT,
            max_multiplier: MAX_COMBO_MULTIPLIER,
            milestone_interval: COMBO_MILESTONE_INTERVAL,
        }
    }
}

fn default_mystery_rewards() -> Vec<MysteryReward> {
    vec![
        MysteryReward::Points(25),
        MysteryReward::Points(50),
        MysteryReward::Points(100),
        MysteryReward::PowerUp,
        MysteryReward::ExtraTargets(3),
    ]
}

/// Complete balance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub wheel: WheelTuning,
    pub player: PlayerTuning,
    pub arrows: ArrowTuning,
    pub targets: TargetTuning,
    pub mystery_rewards: Vec<MysteryReward>,
    pub power_ups: PowerUpTuning,
    pub obstacles: ObstacleTuning,
    pub combo: ComboTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            wheel: WheelTuning::default(),
            player: PlayerTuning::default(),
            arrows: ArrowTuning::default(),
            targets: TargetTuning::default(),
            mystery_rewards: default_mystery_rewards(),
            power_ups: PowerUpTuning::default(),
            obstacles: ObstacleTuning::default(),
            combo: ComboTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON document (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Load a tuning file, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::warn!("{err}; using default tuning");
                Self::default()
            }
        }
    }

    /// Check cross-field constraints the type system can't express
    pub fn validate(&self) -> Result<(), TuningError> {
        positive("wheel.ring_radius", self.wheel.ring_radius as f64)?;
        positive("wheel.speedup_per_hit", self.wheel.speedup_per_hit as f64)?;

        positive("player.speed", self.player.speed as f64)?;
        positive("player.radius", self.player.radius as f64)?;

        positive("arrows.speed", self.arrows.speed as f64)?;
        positive("arrows.fire_cooldown_ms", self.arrows.fire_cooldown_ms)?;
        probability("arrows.explosive_chain", self.arrows.explosive_chain as f64)?;

        let t = &self.targets;
        if t.max_targets == 0 {
            return Err(invalid("targets.max_targets", "must allow at least one target"));
        }
        positive("targets.spawn_interval_ms", t.spawn_interval_ms)?;
        for &kind in TargetKind::ALL.iter() {
            let variant = t.variants.get(kind);
            if variant.weight < 0.0 {
                return Err(invalid("targets.variants.weight", format!("{kind:?} weight is negative")));
            }
            positive("targets.variants.size", variant.size as f64)?;
            if let Some(lifetime) = variant.lifetime_ms {
                positive("targets.variants.lifetime_ms", lifetime)?;
            }
        }
        ordered("targets.shrink.size", t.shrink.min_size as f64, t.shrink.max_size as f64)?;
        ordered(
            "targets.shrink.points",
            t.shrink.min_points as f64,
            t.shrink.max_points as f64,
        )?;
        fraction("targets.shrink.ratio", t.shrink.ratio as f64)?;
        positive("targets.ghost_visible_secs", t.ghost_visible_secs as f64)?;
        positive("targets.ghost_invisible_secs", t.ghost_invisible_secs as f64)?;
        positive("targets.magnet_range", t.magnet_range as f64)?;
        probability("targets.explosion_chain", t.explosion_chain as f64)?;

        let p = &self.power_ups;
        positive("power_ups.spawn_interval_ms", p.spawn_interval_ms)?;
        probability("power_ups.spawn_chance", p.spawn_chance)?;
        positive("power_ups.drift_speed", p.drift_speed as f64)?;
        fraction("power_ups.rapid_fire_fraction", p.rapid_fire_fraction)?;
        positive("power_ups.rapid_fire_duration_ms", p.rapid_fire_duration_ms)?;
        positive("power_ups.explosive_arrows_duration_ms", p.explosive_arrows_duration_ms)?;
        positive("power_ups.score_multiplier_duration_ms", p.score_multiplier_duration_ms)?;
        positive("power_ups.score_multiplier", p.score_multiplier)?;

        let o = &self.obstacles;
        positive("obstacles.spawn_interval_ms", o.spawn_interval_ms)?;
        ordered(
            "obstacles.rock_distance",
            o.rock_min_distance as f64,
            o.rock_max_distance as f64,
        )?;
        ordered(
            "obstacles.tree_offset",
            o.tree_min_offset as f64,
            o.tree_spawn_radius as f64,
        )?;
        positive("obstacles.tree_lifetime", o.tree_lifetime as f64)?;
        positive("obstacles.stun_duration_ms", o.stun_duration_ms)?;
        fraction("obstacles.stun_speed_fraction", o.stun_speed_fraction as f64)?;

        positive("combo.window_ms", self.combo.window_ms)?;
        if self.combo.max_multiplier < 1.0 {
            return Err(invalid("combo.max_multiplier", "must be at least 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        Tuning::default().validate().expect("defaults must be valid");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "combo": { "window_ms": 1000.0 } }"#).unwrap();
        assert_eq!(tuning.combo.window_ms, 1000.0);
        assert_eq!(tuning.combo.increment, COMBO_INCREMENT);
        assert_eq!(tuning.targets.max_targets, MAX_TARGETS);
    }

    #[test]
    fn test_variant_override() {
        let json = r#"{ "targets": { "variants": { "gold": { "weight": 0.0, "points": 99, "lifetime_ms": null, "size": 1.0 } } } }"#;
        let tuning = Tuning::from_json(json).unwrap();
        let gold = tuning.targets.variants.get(TargetKind::Gold);
        assert_eq!(gold.points, 99);
        assert!(gold.lifetime_ms.is_none());
        // Untouched variants keep their defaults
        assert_eq!(tuning.targets.variants.get(TargetKind::Standard).points, 10);
    }

    #[test]
    fn test_mystery_table_from_json() {
        let json = r#"{ "mystery_rewards": [ { "Points": 7 }, "PowerUp" ] }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(
            tuning.mystery_rewards,
            vec![MysteryReward::Points(7), MysteryReward::PowerUp]
        );
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = Tuning::from_json(r#"{ "power_ups": { "spawn_chance": 1.5 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "power_ups.spawn_chance",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_inverted_band() {
        let json = r#"{ "obstacles": { "rock_min_distance": 30.0, "rock_max_distance": 10.0 } }"#;
        assert!(matches!(
            Tuning::from_json(json),
            Err(TuningError::Invalid { field: "obstacles.rock_distance", .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(Tuning::from_json("{ nope"), Err(TuningError::Parse(_))));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let tuning = Tuning::load_or_default("/definitely/not/here.json");
        assert_eq!(tuning.targets.max_targets, MAX_TARGETS);
    }
}
