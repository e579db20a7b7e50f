//! Boost Controller
//!
//! A boost adds a burst of speed that bleeds off every frame. Once speed
//! falls back under the form's cap the boost ends and the dash cooldown
//! starts counting down in real seconds.
//!
//! ```text
//!   Idle ──request (slug only)──▶ Boosting ──speed < max──▶ Cooldown
//!    ▲                                                        │
//!    └──────────────── dash cooldown elapsed ─────────────────┘
//! ```

use serde::{Serialize, Deserialize};

use crate::game::state::Form;
use crate::game::stats::FormStats;

/// Observable phase of the boost state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoostPhase {
    /// A boost may be started
    Idle,
    /// Boost in progress
    Boosting,
    /// Waiting for the dash cooldown
    Cooldown,
}

/// What happened to the boost during a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoostTransition {
    /// Nothing changed phase
    None,
    /// Speed decayed under the cap; cooldown started
    Ended,
    /// Cooldown elapsed; boosting allowed again
    Ready,
}

/// Boost flags and cooldown timer.
///
/// `is_boosting` and `can_boost` are never both true.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoostState {
    /// A boost may be started
    pub can_boost: bool,
    /// Boost in progress
    pub is_boosting: bool,
    /// Seconds left on the dash cooldown
    pub dash_cooldown_remaining: f32,
}

impl BoostState {
    /// Ready to boost, timer primed from the given stats.
    pub fn new(stats: &FormStats) -> Self {
        Self {
            can_boost: true,
            is_boosting: false,
            dash_cooldown_remaining: stats.dash_cooldown,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> BoostPhase {
        if self.is_boosting {
            BoostPhase::Boosting
        } else if self.can_boost {
            BoostPhase::Idle
        } else {
            BoostPhase::Cooldown
        }
    }

    /// Try to start a boost, adding `boost_speed` to `speed`.
    ///
    /// Silently refused outside slug form or while not ready.
    pub fn request(&mut self, form: Form, speed: &mut f32, stats: &FormStats) -> bool {
        if form != Form::Slug || !self.can_boost {
            return false;
        }

        self.can_boost = false;
        self.is_boosting = true;
        *speed += stats.boost_speed;
        true
    }

    /// Force an active boost to end without touching speed.
    ///
    /// The cooldown then runs as if the boost had ended naturally.
    pub fn cancel(&mut self) -> bool {
        let was_boosting = self.is_boosting;
        self.is_boosting = false;
        was_boosting
    }

    /// Advance one frame.
    ///
    /// While boosting, speed decays by `speed_decrease` and snaps to
    /// `max_movement_speed` when it crosses under it. Otherwise speed is
    /// clamped to `[0, max_movement_speed]` and the cooldown ticks.
    pub fn update(&mut self, speed: &mut f32, stats: &FormStats, dt: f32) -> BoostTransition {
        if self.is_boosting {
            *speed -= stats.speed_decrease;
            if *speed < stats.max_movement_speed {
                *speed = stats.max_movement_speed;
                self.is_boosting = false;
                self.can_boost = false;
                return BoostTransition::Ended;
            }
            return BoostTransition::None;
        }

        *speed = speed.clamp(0.0, stats.max_movement_speed);

        if !self.can_boost {
            self.dash_cooldown_remaining -= dt;
            if self.dash_cooldown_remaining <= 0.0 {
                self.can_boost = true;
                self.dash_cooldown_remaining = stats.dash_cooldown;
                return BoostTransition::Ready;
            }
        }

        BoostTransition::None
    }
}
