//! Game Events
//!
//! Notifications produced during simulation for the round coordinator, the
//! effect renderer and replay logs. Collaborators drain them with
//! `ArenaState::take_events`.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::pickup::PickupId;
use crate::game::state::{Form, PlayerNumber};
use crate::game::stats::EffectSize;

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Form transitions first
    FormChange = 0,
    /// Then damage
    Damage = 1,
    /// Then pickup ownership
    Pickup = 2,
    /// Then boosts
    Boost = 3,
    /// Then effects and knockback
    Effect = 4,
    /// Lowest priority
    Other = 255,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Entity switched form
    FormChanged {
        player: PlayerNumber,
        old_form: Form,
        new_form: Form,
    },

    /// Snail lost HP
    Damaged {
        player: PlayerNumber,
        source: Option<PlayerNumber>,
        amount: f32,
        remaining_hp: f32,
    },

    /// Entity collected the pickup
    PickupAcquired {
        player: PlayerNumber,
        pickup_id: PickupId,
    },

    /// Entity lost the pickup; it respawned at `position`
    PickupDropped {
        player: PlayerNumber,
        pickup_id: PickupId,
        position: Vec2,
    },

    /// Boost started
    BoostStarted {
        player: PlayerNumber,
    },

    /// Boost over (decayed, or cancelled by a hit)
    BoostEnded {
        player: PlayerNumber,
        cancelled: bool,
    },

    /// Dash cooldown elapsed
    BoostReady {
        player: PlayerNumber,
    },

    /// Visual effect requested
    EffectSpawned {
        size: EffectSize,
        position: Vec2,
        targets: Vec<PlayerNumber>,
    },

    /// Explosion pushed an entity
    KnockbackApplied {
        player: PlayerNumber,
        direction: Vec2,
        magnitude: f32,
    },
}

/// A game event with timing and priority.
///
/// Events are kept in the order they were pushed; `priority` tells a
/// coordinator which to handle first within a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Frame when event occurred
    pub frame: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Player involved, if any
    pub player: Option<PlayerNumber>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(frame: u32, priority: EventPriority, data: GameEventData) -> Self {
        let player = match &data {
            GameEventData::FormChanged { player, .. }
            | GameEventData::Damaged { player, .. }
            | GameEventData::PickupAcquired { player, .. }
            | GameEventData::PickupDropped { player, .. }
            | GameEventData::BoostStarted { player }
            | GameEventData::BoostEnded { player, .. }
            | GameEventData::BoostReady { player }
            | GameEventData::KnockbackApplied { player, .. } => Some(*player),
            GameEventData::EffectSpawned { .. } => None,
        };

        Self {
            frame,
            priority,
            player,
            data,
        }
    }

    /// Create form changed event.
    pub fn form_changed(frame: u32, player: PlayerNumber, old_form: Form, new_form: Form) -> Self {
        Self::new(
            frame,
            EventPriority::FormChange,
            GameEventData::FormChanged { player, old_form, new_form },
        )
    }

    /// Create damaged event.
    pub fn damaged(
        frame: u32,
        player: PlayerNumber,
        source: Option<PlayerNumber>,
        amount: f32,
        remaining_hp: f32,
    ) -> Self {
        Self::new(
            frame,
            EventPriority::Damage,
            GameEventData::Damaged {
                player,
                source,
                amount,
                remaining_hp,
            },
        )
    }

    /// Create pickup acquired event.
    pub fn pickup_acquired(frame: u32, player: PlayerNumber, pickup_id: PickupId) -> Self {
        Self::new(
            frame,
            EventPriority::Pickup,
            GameEventData::PickupAcquired { player, pickup_id },
        )
    }

    /// Create pickup dropped event.
    pub fn pickup_dropped(frame: u32, player: PlayerNumber, pickup_id: PickupId, position: Vec2) -> Self {
        Self::new(
            frame,
            EventPriority::Pickup,
            GameEventData::PickupDropped { player, pickup_id, position },
        )
    }

    /// Create boost started event.
    pub fn boost_started(frame: u32, player: PlayerNumber) -> Self {
        Self::new(frame, EventPriority::Boost, GameEventData::BoostStarted { player })
    }

    /// Create boost ended event.
    pub fn boost_ended(frame: u32, player: PlayerNumber, cancelled: bool) -> Self {
        Self::new(
            frame,
            EventPriority::Boost,
            GameEventData::BoostEnded { player, cancelled },
        )
    }

    /// Create boost ready event.
    pub fn boost_ready(frame: u32, player: PlayerNumber) -> Self {
        Self::new(frame, EventPriority::Boost, GameEventData::BoostReady { player })
    }

    /// Create effect spawned event.
    pub fn effect_spawned(frame: u32, size: EffectSize, position: Vec2, targets: Vec<PlayerNumber>) -> Self {
        Self::new(
            frame,
            EventPriority::Effect,
            GameEventData::EffectSpawned { size, position, targets },
        )
    }

    /// Create knockback applied event.
    pub fn knockback_applied(frame: u32, player: PlayerNumber, direction: Vec2, magnitude: f32) -> Self {
        Self::new(
            frame,
            EventPriority::Effect,
            GameEventData::KnockbackApplied { player, direction, magnitude },
        )
    }
}
