//! Tuning Configuration
//!
//! Per-form stat tables, explosion data per effect size, and the round
//! rules. Everything numeric the simulation reads lives here so there is a
//! single source of truth, loadable from JSON.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::state::Form;

// =============================================================================
// ERRORS
// =============================================================================

/// Failure to load or validate a [`GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its allowed range.
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: String,
        /// What is wrong with it
        reason: &'static str,
    },
}

// =============================================================================
// FORM STATS
// =============================================================================

/// Stat block for one form.
///
/// Speeds are per frame, cooldowns in seconds, rotation in degrees per frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormStats {
    /// Speed gained per frame while steering
    pub movement_speed_step: f32,
    /// Speed cap outside of a boost
    pub max_movement_speed: f32,
    /// Speed added when a boost starts
    pub boost_speed: f32,
    /// Speed lost per frame while boosting
    pub speed_decrease: f32,
    /// Maximum turn per frame (degrees)
    pub rotation_speed: f32,
    /// Seconds between the end of a boost and the next one
    pub dash_cooldown: f32,
    /// Seconds between trail segment spawns
    pub trail_cooldown: f32,
    /// Size of the trail segment pool
    pub max_trail_parts: usize,
    /// Multiplier applied to knockback force each frame
    pub force_drag: f32,
}

impl FormStats {
    fn validate(&self, form: &str) -> Result<(), ConfigError> {
        let invalid = |name: &str, reason| ConfigError::Invalid {
            field: format!("{form}.{name}"),
            reason,
        };

        if self.max_trail_parts == 0 {
            return Err(invalid("maxTrailParts", "trail pool must hold at least one segment"));
        }
        if !(self.force_drag > 0.0 && self.force_drag <= 1.0) {
            return Err(invalid("forceDrag", "must be in (0, 1]"));
        }
        if self.dash_cooldown < 0.0 {
            return Err(invalid("dashCooldown", "must not be negative"));
        }
        if self.trail_cooldown < 0.0 {
            return Err(invalid("trailCooldown", "must not be negative"));
        }
        if self.movement_speed_step < 0.0 {
            return Err(invalid("movementSpeedStep", "must not be negative"));
        }
        if self.max_movement_speed < 0.0 {
            return Err(invalid("maxMovementSpeed", "must not be negative"));
        }
        // A held stick adds the step every frame; the boost must still lose speed
        if self.speed_decrease <= self.movement_speed_step {
            return Err(invalid("speedDecrease", "must exceed movementSpeedStep"));
        }
        if self.rotation_speed <= 0.0 {
            return Err(invalid("rotationSpeed", "must be positive"));
        }
        Ok(())
    }
}

/// Stat blocks for both forms, keyed by form name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatTable {
    /// Stats while in [`Form::Slug`]
    #[serde(rename = "SLUG")]
    pub slug: FormStats,
    /// Stats while in [`Form::Snail`]
    #[serde(rename = "SNAIL")]
    pub snail: FormStats,
}

impl StatTable {
    /// Look up the stats for a form.
    #[inline]
    pub fn get(&self, form: Form) -> &FormStats {
        match form {
            Form::Slug => &self.slug,
            Form::Snail => &self.snail,
        }
    }
}

impl Default for StatTable {
    fn default() -> Self {
        Self {
            slug: FormStats {
                movement_speed_step: 0.25,
                max_movement_speed: 4.0,
                boost_speed: 8.0,
                speed_decrease: 0.45,
                rotation_speed: 5.0,
                dash_cooldown: 1.5,
                trail_cooldown: 0.04,
                max_trail_parts: 30,
                force_drag: 0.9,
            },
            snail: FormStats {
                movement_speed_step: 0.15,
                max_movement_speed: 2.5,
                boost_speed: 0.0,
                speed_decrease: 0.3,
                rotation_speed: 3.0,
                dash_cooldown: 1.5,
                trail_cooldown: 0.04,
                max_trail_parts: 30,
                force_drag: 0.85,
            },
        }
    }
}

// =============================================================================
// EFFECT STATS
// =============================================================================

/// Size class of a spawned explosion effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectSize {
    /// Surviving hit
    Small,
    /// Pickup collected
    Medium,
    /// Lethal hit
    Big,
}

/// Knockback contract of one explosion size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplosionStats {
    /// Radius inside which targets are pushed
    pub explosion_radius: f32,
    /// Force per unit of distance inside the radius
    pub explosion_force: f32,
    /// Delay before the push lands (seconds)
    pub explosion_freeze_time: f32,
}

/// Explosion data for every size class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectTable {
    /// Small explosion
    #[serde(rename = "SMALL")]
    pub small: ExplosionStats,
    /// Medium explosion
    #[serde(rename = "MEDIUM")]
    pub medium: ExplosionStats,
    /// Big explosion
    #[serde(rename = "BIG")]
    pub big: ExplosionStats,
}

impl EffectTable {
    /// Look up the explosion data for a size class.
    #[inline]
    pub fn get(&self, size: EffectSize) -> &ExplosionStats {
        match size {
            EffectSize::Small => &self.small,
            EffectSize::Medium => &self.medium,
            EffectSize::Big => &self.big,
        }
    }
}

impl Default for EffectTable {
    fn default() -> Self {
        Self {
            small: ExplosionStats {
                explosion_radius: 80.0,
                explosion_force: 4.0,
                explosion_freeze_time: 0.1,
            },
            medium: ExplosionStats {
                explosion_radius: 120.0,
                explosion_force: 5.0,
                explosion_freeze_time: 0.15,
            },
            big: ExplosionStats {
                explosion_radius: 200.0,
                explosion_force: 6.0,
                explosion_freeze_time: 0.25,
            },
        }
    }
}

// =============================================================================
// GAME CONFIG
// =============================================================================

/// Round rules plus the stat and effect tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Hit points of a snail; restored on every return to slug form
    pub max_hp: f32,
    /// Input magnitude below which a direction counts as "no input"
    pub deadzone: f32,
    /// Speed multiplier while touching a foreign trail
    pub trail_slow_multiplier: f32,
    /// Damage a boosting slug deals to a snail on contact
    pub boost_hit_damage: f32,
    /// Seconds a freshly dropped slug cannot pick the shell up again
    pub pickup_lock_seconds: f32,
    /// Seconds the hit pose is held after a surviving hit
    pub hit_pose_seconds: f32,
    /// Render scale while in snail form
    pub snail_scale: f32,
    /// Knockback below this snaps to zero
    pub force_epsilon: f32,
    /// Seconds a trail segment stays active after spawning
    pub trail_lifetime: f32,
    /// Per-form stats
    pub stats: StatTable,
    /// Per-size explosion data
    pub effects: EffectTable,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_hp: 30.0,
            deadzone: 0.2,
            trail_slow_multiplier: 0.3,
            boost_hit_damage: 10.0,
            pickup_lock_seconds: 3.0,
            hit_pose_seconds: 0.3,
            snail_scale: 1.7,
            force_epsilon: 0.1,
            trail_lifetime: 1.0,
            stats: StatTable::default(),
            effects: EffectTable::default(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a config from JSON text.
    ///
    /// Missing top-level fields fall back to the built-in tuning.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Stats for a form.
    #[inline]
    pub fn stats(&self, form: Form) -> &FormStats {
        self.stats.get(form)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_hp <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "maxHp".into(),
                reason: "must be positive",
            });
        }
        if !(0.0..1.0).contains(&self.deadzone) {
            return Err(ConfigError::Invalid {
                field: "deadzone".into(),
                reason: "must be in [0, 1)",
            });
        }
        if self.pickup_lock_seconds < 0.0 {
            return Err(ConfigError::Invalid {
                field: "pickupLockSeconds".into(),
                reason: "must not be negative",
            });
        }
        if self.hit_pose_seconds < 0.0 {
            return Err(ConfigError::Invalid {
                field: "hitPoseSeconds".into(),
                reason: "must not be negative",
            });
        }
        if !(self.trail_slow_multiplier > 0.0 && self.trail_slow_multiplier <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "trailSlowMultiplier".into(),
                reason: "must be in (0, 1]",
            });
        }
        if self.force_epsilon <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "forceEpsilon".into(),
                reason: "must be positive",
            });
        }
        if self.trail_lifetime <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "trailLifetime".into(),
                reason: "must be positive",
            });
        }
        self.stats.slug.validate("SLUG")?;
        self.stats.snail.validate("SNAIL")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_hp, 30.0);
        assert_eq!(config.deadzone, 0.2);
    }

    #[test]
    fn test_stats_lookup_by_form() {
        let table = StatTable::default();
        assert_eq!(table.get(Form::Slug), &table.slug);
        assert_eq!(table.get(Form::Snail), &table.snail);
    }

    #[test]
    fn test_parse_partial_json_uses_defaults() {
        let config = GameConfig::from_json_str(r#"{ "maxHp": 3 }"#).unwrap();
        assert_eq!(config.max_hp, 3.0);
        assert_eq!(config.stats, StatTable::default());
    }

    #[test]
    fn test_parse_stat_table_names() {
        let json = r#"{
            "stats": {
                "SLUG": {
                    "movementSpeedStep": 0.5, "maxMovementSpeed": 5, "boostSpeed": 10,
                    "speedDecrease": 0.6, "rotationSpeed": 6, "dashCooldown": 2,
                    "trailCooldown": 0.05, "maxTrailParts": 12, "forceDrag": 0.9
                },
                "SNAIL": {
                    "movementSpeedStep": 0.1, "maxMovementSpeed": 2, "boostSpeed": 0,
                    "speedDecrease": 0.3, "rotationSpeed": 3, "dashCooldown": 2,
                    "trailCooldown": 0.05, "maxTrailParts": 12, "forceDrag": 0.8
                }
            }
        }"#;
        let config = GameConfig::from_json_str(json).unwrap();
        assert_eq!(config.stats(Form::Slug).max_trail_parts, 12);
        assert_eq!(config.stats(Form::Snail).force_drag, 0.8);
    }

    #[test]
    fn test_rejects_empty_trail_pool() {
        let mut config = GameConfig::default();
        config.stats.slug.max_trail_parts = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("SLUG.maxTrailParts"));
    }

    #[test]
    fn test_rejects_bad_drag() {
        let mut config = GameConfig::default();
        config.stats.snail.force_drag = 1.5;
        assert!(config.validate().is_err());
    }

    fn invalid_field(config: &GameConfig) -> String {
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("expected an invalid field, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_boost_that_never_decays() {
        let mut config = GameConfig::default();
        config.stats.slug.speed_decrease = 0.2;
        assert_eq!(invalid_field(&config), "SLUG.speedDecrease");

        // Equal to the step is still a boost that never ends
        config.stats.slug.speed_decrease = config.stats.slug.movement_speed_step;
        assert_eq!(invalid_field(&config), "SLUG.speedDecrease");
    }

    #[test]
    fn test_rejects_non_positive_rotation_speed() {
        let mut config = GameConfig::default();
        config.stats.snail.rotation_speed = -5.0;
        assert_eq!(invalid_field(&config), "SNAIL.rotationSpeed");

        config.stats.snail.rotation_speed = 0.0;
        assert_eq!(invalid_field(&config), "SNAIL.rotationSpeed");
    }

    #[test]
    fn test_negative_speeds_name_their_field() {
        let mut config = GameConfig::default();
        config.stats.slug.max_movement_speed = -1.0;
        assert_eq!(invalid_field(&config), "SLUG.maxMovementSpeed");

        let mut config = GameConfig::default();
        config.stats.slug.movement_speed_step = -0.1;
        assert_eq!(invalid_field(&config), "SLUG.movementSpeedStep");
    }

    #[test]
    fn test_rejects_bad_round_tuning() {
        let mut config = GameConfig::default();
        config.trail_slow_multiplier = 0.0;
        assert_eq!(invalid_field(&config), "trailSlowMultiplier");

        let mut config = GameConfig::default();
        config.trail_slow_multiplier = 1.5;
        assert_eq!(invalid_field(&config), "trailSlowMultiplier");

        let mut config = GameConfig::default();
        config.force_epsilon = 0.0;
        assert_eq!(invalid_field(&config), "forceEpsilon");

        let mut config = GameConfig::default();
        config.trail_lifetime = -1.0;
        assert_eq!(invalid_field(&config), "trailLifetime");

        let mut config = GameConfig::default();
        config.hit_pose_seconds = -0.1;
        assert_eq!(invalid_field(&config), "hitPoseSeconds");
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = GameConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GameConfig::load("/nonexistent/slug-arena.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
