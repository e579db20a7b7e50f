//! Game State Definitions
//!
//! The slug/snail entity and the arena that owns every entity of a round.
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vec2;
use crate::game::boost::BoostState;
use crate::game::collision::Counterpart;
use crate::game::events::GameEvent;
use crate::game::force::ForceState;
use crate::game::movement::MovementState;
use crate::game::pickup::{Pickup, PickupId};
use crate::game::schedule::{CancelToken, Scheduler};
use crate::game::stats::{FormStats, GameConfig};
use crate::game::trail::TrailSpawner;

/// Player number (1-based pad slot).
pub type PlayerNumber = u8;

/// Upper bound on simultaneously tracked contacts per entity.
pub const MAX_TRACKED_CONTACTS: usize = 64;

// =============================================================================
// FORM
// =============================================================================

/// The two mutually exclusive gameplay forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[derive(Default)]
pub enum Form {
    /// Agile and fragile; can boost, takes no damage
    #[default]
    Slug = 0,
    /// Carries the shell; slower, has HP, slowed by foreign trails
    Snail = 1,
}

impl Form {
    /// Stat-table name of this form.
    pub fn name(self) -> &'static str {
        match self {
            Form::Slug => "SLUG",
            Form::Snail => "SNAIL",
        }
    }

    /// Get form from index (0-1).
    pub fn from_index(index: u8) -> Option<Form> {
        match index {
            0 => Some(Form::Slug),
            1 => Some(Form::Snail),
            _ => None,
        }
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognized form name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown form {0:?}")]
pub struct FormParseError(pub String);

impl FromStr for Form {
    type Err = FormParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("slug") {
            Ok(Form::Slug)
        } else if s.eq_ignore_ascii_case("snail") {
            Ok(Form::Snail)
        } else {
            Err(FormParseError(s.to_string()))
        }
    }
}

// =============================================================================
// PRESENTATION STATE
// =============================================================================

/// Which reaction the renderer should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Pose {
    /// Normal movement cycle
    #[default]
    Moving,
    /// Hit reaction
    Hit,
}

// =============================================================================
// TRAIL CONTACT
// =============================================================================

/// Whether a foreign trail is slowing the entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrailState {
    /// No foreign segment overlapping
    #[default]
    NoCollide,
    /// At least one foreign segment overlapping
    Collide,
}

/// Count of overlapping foreign trail segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrailContact {
    count: u32,
    state: TrailState,
}

impl TrailContact {
    /// A foreign segment started overlapping.
    pub fn begin(&mut self) {
        self.count += 1;
        self.state = TrailState::Collide;
    }

    /// A foreign segment stopped overlapping. Never goes below zero.
    pub fn end(&mut self) {
        self.count = self.count.saturating_sub(1);
        if self.count == 0 {
            self.state = TrailState::NoCollide;
        }
    }

    /// Forget every overlap.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of overlapping foreign segments.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Current flag.
    #[inline]
    pub fn state(&self) -> TrailState {
        self.state
    }

    /// Speed multiplier to apply to movement this frame.
    #[inline]
    pub fn speed_multiplier(&self, config: &GameConfig) -> f32 {
        match self.state {
            TrailState::NoCollide => 1.0,
            TrailState::Collide => config.trail_slow_multiplier,
        }
    }
}

// =============================================================================
// SLUG STATE
// =============================================================================

/// One player-controlled creature.
#[derive(Clone, Debug)]
pub struct SlugState {
    /// Pad slot of the owning player
    pub player_number: PlayerNumber,

    /// Team color tag
    pub color: String,

    /// Current form
    pub form: Form,

    /// Current hit points (only meaningful as a snail)
    pub hp: f32,

    /// Hit points restored on every return to slug form
    pub max_hp: f32,

    /// Whether touching the pickup collects it
    pub can_pick_up: bool,

    /// Pickup currently carried
    pub shell: Option<PickupId>,

    /// Counterparts currently overlapping (duplicate begin guard)
    pub colliding_with: Vec<Counterpart>,

    /// Direction, speed and position
    pub movement: MovementState,

    /// Boost and dash cooldown
    pub boost: BoostState,

    /// Trail segment pool
    pub trail: TrailSpawner,

    /// Foreign trail overlap
    pub trail_contact: TrailContact,

    /// Knockback
    pub force: ForceState,

    /// Render scale
    pub scale: f32,

    /// Render reaction
    pub pose: Pose,

    pub(crate) pickup_lock: Option<CancelToken>,
    pub(crate) hit_pose_timer: Option<CancelToken>,
}

impl SlugState {
    /// Create a slug at full HP.
    ///
    /// The trail pool is sized from the slug stats and never resized.
    pub fn new(
        player_number: PlayerNumber,
        color: impl Into<String>,
        position: Vec2,
        config: &GameConfig,
    ) -> Self {
        let slug_stats = config.stats(Form::Slug);
        Self {
            player_number,
            color: color.into(),
            form: Form::Slug,
            hp: config.max_hp,
            max_hp: config.max_hp,
            can_pick_up: true,
            shell: None,
            colliding_with: Vec::new(),
            movement: MovementState::new(position),
            boost: BoostState::new(slug_stats),
            trail: TrailSpawner::new(slug_stats.max_trail_parts, player_number),
            trail_contact: TrailContact::default(),
            force: ForceState::default(),
            scale: 1.0,
            pose: Pose::Moving,
            pickup_lock: None,
            hit_pose_timer: None,
        }
    }

    /// Is the entity in slug form?
    #[inline]
    pub fn is_slug(&self) -> bool {
        self.form == Form::Slug
    }

    /// Is the entity in snail form?
    #[inline]
    pub fn is_snail(&self) -> bool {
        self.form == Form::Snail
    }

    /// Current position.
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.movement.position
    }

    /// Display angle in degrees.
    #[inline]
    pub fn facing_angle(&self) -> f32 {
        self.movement.facing_angle
    }

    /// Stats of the current form, re-resolved on every call.
    #[inline]
    pub fn stats<'a>(&self, config: &'a GameConfig) -> &'a FormStats {
        config.stats(self.form)
    }

    /// Stop all motion (round end).
    pub fn halt(&mut self) {
        self.movement.target_direction = Vec2::ZERO;
        self.movement.current_direction = Vec2::ZERO;
    }
}

// =============================================================================
// ARENA STATE
// =============================================================================

/// Every entity of a round plus the shared pickup and deferred callbacks.
#[derive(Clone, Debug)]
pub struct ArenaState {
    /// Frames simulated so far
    pub frame: u32,

    /// RNG seed (for verification)
    pub rng_seed: u64,

    /// Deterministic RNG state
    pub rng: DeterministicRng,

    /// Tuning
    pub config: GameConfig,

    /// All entities (BTreeMap for deterministic iteration)
    pub players: BTreeMap<PlayerNumber, SlugState>,

    /// The shell; its holder slot is the single ownership token
    pub pickup: Pickup,

    /// Deferred callbacks
    pub scheduler: Scheduler,

    /// Back-to-front draw order
    pub render_order: Vec<PlayerNumber>,

    /// Events generated since the last drain
    pub pending_events: Vec<GameEvent>,
}

impl ArenaState {
    /// Create an empty arena with the pickup at `pickup_position`.
    pub fn new(config: GameConfig, rng_seed: u64, pickup_position: Vec2) -> Self {
        Self {
            frame: 0,
            rng_seed,
            rng: DeterministicRng::new(rng_seed),
            config,
            players: BTreeMap::new(),
            pickup: Pickup::new(0, pickup_position),
            scheduler: Scheduler::new(),
            render_order: Vec::new(),
            pending_events: Vec::new(),
        }
    }

    /// Add a player at full HP in slug form.
    pub fn add_player(&mut self, number: PlayerNumber, color: impl Into<String>, position: Vec2) {
        let slug = SlugState::new(number, color, position, &self.config);
        if self.players.insert(number, slug).is_none() {
            self.render_order.push(number);
        }
    }

    /// Get a player by number.
    pub fn player(&self, number: PlayerNumber) -> Option<&SlugState> {
        self.players.get(&number)
    }

    /// Get a player mutably by number.
    pub fn player_mut(&mut self, number: PlayerNumber) -> Option<&mut SlugState> {
        self.players.get_mut(&number)
    }

    /// Set the steering input of a player. The zero vector means no input.
    pub fn set_target(&mut self, number: PlayerNumber, target: Vec2) {
        if let Some(slug) = self.players.get_mut(&number) {
            slug.movement.target_direction = target;
        }
    }

    /// Move a player to the front of the draw order.
    pub fn raise_to_front(&mut self, number: PlayerNumber) {
        if let Some(index) = self.render_order.iter().position(|n| *n == number) {
            let n = self.render_order.remove(index);
            self.render_order.push(n);
        }
    }

    /// Freeze every entity (round end).
    pub fn halt_all(&mut self) {
        for slug in self.players.values_mut() {
            slug.halt();
        }
    }

    /// Put a player back into a fresh slug at its current position.
    ///
    /// Pending deferred callbacks for the player are cancelled and a carried
    /// pickup respawns where the player stood.
    pub fn reset_player(&mut self, number: PlayerNumber) {
        let Some(slug) = self.players.get(&number) else {
            return;
        };
        let position = slug.position();
        let color = slug.color.clone();
        let carried = slug.shell;

        self.scheduler.cancel_for(number);
        if let Some(pickup_id) = carried {
            self.release_pickup(number, pickup_id, position);
        }

        let fresh = SlugState::new(number, color, position, &self.config);
        self.players.insert(number, fresh);
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.frame, self.rng_seed, |hasher| {
            for slug in self.players.values() {
                hasher.update_u8(slug.player_number);
                hasher.update_u8(slug.form as u8);
                hasher.update_f32(slug.hp);
                hasher.update_vec2(slug.movement.position);
                hasher.update_vec2(slug.movement.current_direction);
                hasher.update_f32(slug.movement.speed);
                hasher.update_bool(slug.boost.can_boost);
                hasher.update_bool(slug.boost.is_boosting);
                hasher.update_f32(slug.boost.dash_cooldown_remaining);
                hasher.update_f32(slug.force.magnitude);
                hasher.update_u32(slug.trail_contact.count());
                hasher.update_bool(slug.can_pick_up);
            }

            hasher.update_vec2(self.pickup.position);
            hasher.update_bool(self.pickup.is_pickable());
            hasher.update_u8(self.pickup.holder().unwrap_or(0));
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_names_and_parsing() {
        assert_eq!(Form::Slug.name(), "SLUG");
        assert_eq!("snail".parse::<Form>(), Ok(Form::Snail));
        assert_eq!("SLUG".parse::<Form>(), Ok(Form::Slug));
        assert!("shell".parse::<Form>().is_err());
        assert_eq!(Form::from_index(1), Some(Form::Snail));
        assert_eq!(Form::from_index(2), None);
    }

    #[test]
    fn test_new_slug_defaults() {
        let config = GameConfig::default();
        let slug = SlugState::new(1, "red", Vec2::new(10.0, 20.0), &config);

        assert!(slug.is_slug());
        assert_eq!(slug.hp, 30.0);
        assert!(slug.can_pick_up);
        assert!(slug.boost.can_boost);
        assert!(!slug.boost.is_boosting);
        assert_eq!(slug.trail.segments().len(), config.stats.slug.max_trail_parts);
        assert_eq!(slug.position(), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_trail_contact_counter() {
        let config = GameConfig::default();
        let mut contact = TrailContact::default();

        contact.begin();
        contact.begin();
        assert_eq!(contact.state(), TrailState::Collide);
        assert_eq!(contact.speed_multiplier(&config), 0.3);

        contact.end();
        assert_eq!(contact.state(), TrailState::Collide);
        contact.end();
        assert_eq!(contact.state(), TrailState::NoCollide);
        assert_eq!(contact.speed_multiplier(&config), 1.0);

        // Unmatched end never goes negative
        contact.end();
        assert_eq!(contact.count(), 0);
    }

    #[test]
    fn test_raise_to_front() {
        let mut arena = ArenaState::new(GameConfig::default(), 1, Vec2::ZERO);
        arena.add_player(1, "red", Vec2::ZERO);
        arena.add_player(2, "blue", Vec2::ZERO);
        arena.add_player(3, "green", Vec2::ZERO);

        arena.raise_to_front(1);
        assert_eq!(arena.render_order, vec![2, 3, 1]);
    }

    #[test]
    fn test_arena_hash_determinism() {
        let build = || {
            let mut arena = ArenaState::new(GameConfig::default(), 42, Vec2::new(5.0, 5.0));
            for i in 1..=4 {
                arena.add_player(i, "red", Vec2::new(i as f32 * 10.0, 0.0));
            }
            arena
        };
        assert_eq!(build().compute_hash(), build().compute_hash());

        let mut moved = build();
        moved.players.get_mut(&1).unwrap().movement.position.x += 1.0;
        assert_ne!(build().compute_hash(), moved.compute_hash());
    }

    #[test]
    fn test_halt_all_zeroes_directions() {
        let mut arena = ArenaState::new(GameConfig::default(), 1, Vec2::ZERO);
        arena.add_player(1, "red", Vec2::ZERO);
        arena.set_target(1, Vec2::RIGHT);
        arena.halt_all();

        let slug = arena.player(1).unwrap();
        assert_eq!(slug.movement.target_direction, Vec2::ZERO);
        assert_eq!(slug.movement.current_direction, Vec2::ZERO);
    }
}
