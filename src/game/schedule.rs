//! Deferred Callbacks
//!
//! Delayed effects (explosion telegraph, post-drop pickup lock, hit pose)
//! are queued here with a fire time on the simulated clock. The frame
//! stepper advances the clock and applies whatever came due, so delayed
//! effects are deterministic and can be tested by stepping time.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::state::PlayerNumber;

/// Slack when comparing fire times against the accumulated clock.
const FIRE_EPSILON: f64 = 1e-9;

/// Handle used to cancel a pending entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CancelToken(u64);

impl CancelToken {
    /// Raw token value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Work to perform when an entry comes due.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScheduledAction {
    /// Resolve an explosion's knockback against one entity
    ExplosionForce {
        /// Entity pushed
        target: PlayerNumber,
        /// Explosion center
        origin: Vec2,
        /// Reach of the explosion
        radius: f32,
        /// Force per unit of distance inside the radius
        force_per_unit: f32,
    },
    /// End the post-drop pickup lock
    RestorePickup {
        /// Entity unlocked
        target: PlayerNumber,
    },
    /// Return from the hit reaction to the movement pose
    ClearHitPose {
        /// Entity affected
        target: PlayerNumber,
    },
}

impl ScheduledAction {
    /// The entity this action applies to.
    pub fn target(&self) -> PlayerNumber {
        match *self {
            ScheduledAction::ExplosionForce { target, .. } => target,
            ScheduledAction::RestorePickup { target } => target,
            ScheduledAction::ClearHitPose { target } => target,
        }
    }
}

/// One pending entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEntry {
    /// Cancellation handle; also the insertion sequence
    pub token: CancelToken,
    /// Clock value at which the entry fires
    pub fire_at: f64,
    /// Work to perform
    pub action: ScheduledAction,
}

/// Queue of deferred actions on a simulated clock.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Scheduler {
    now: f64,
    next_token: u64,
    entries: Vec<ScheduledEntry>,
}

impl Scheduler {
    /// Empty queue at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value in seconds.
    #[inline]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of pending entries.
    #[inline]
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Pending entries in insertion order.
    pub fn entries(&self) -> &[ScheduledEntry] {
        &self.entries
    }

    /// Queue `action` to fire `delay` seconds from now.
    ///
    /// Negative delays fire on the next advance.
    pub fn schedule(&mut self, delay: f32, action: ScheduledAction) -> CancelToken {
        let token = CancelToken(self.next_token);
        self.next_token += 1;

        self.entries.push(ScheduledEntry {
            token,
            fire_at: self.now + f64::from(delay.max(0.0)),
            action,
        });
        token
    }

    /// Drop a pending entry. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, token: CancelToken) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.token != token);
        self.entries.len() != before
    }

    /// Drop every pending entry aimed at `player`.
    pub fn cancel_for(&mut self, player: PlayerNumber) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.action.target() != player);
        before - self.entries.len()
    }

    /// Advance the clock and remove every entry that came due.
    ///
    /// Returned entries are ordered by fire time, ties by insertion order.
    pub fn advance(&mut self, dt: f32) -> Vec<ScheduledEntry> {
        self.now += f64::from(dt.max(0.0));
        let deadline = self.now + FIRE_EPSILON;

        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.fire_at <= deadline);
        self.entries = pending;

        due.sort_by(|a, b| {
            a.fire_at
                .total_cmp(&b.fire_at)
                .then(a.token.cmp(&b.token))
        });
        due
    }
}
