//! Pickup (the shell)
//!
//! The arena owns exactly one pickup. Its `holder` slot is the single
//! ownership token: it changes only through `on_collide` (acquire) and
//! `on_spawn` (drop), so two entities can never hold it at once.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::state::PlayerNumber;

/// Pickup identifier.
pub type PickupId = u32;

/// The capturable shell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    /// Unique ID
    pub id: PickupId,
    /// Where the pickup rests (last spawn point while carried)
    pub position: Vec2,
    pickable: bool,
    holder: Option<PlayerNumber>,
}

impl Pickup {
    /// Spawn a pickable pickup.
    pub fn new(id: PickupId, position: Vec2) -> Self {
        Self {
            id,
            position,
            pickable: true,
            holder: None,
        }
    }

    /// Can the pickup be collected right now?
    #[inline]
    pub fn is_pickable(&self) -> bool {
        self.pickable
    }

    /// Current carrier, if any.
    #[inline]
    pub fn holder(&self) -> Option<PlayerNumber> {
        self.holder
    }

    /// Collected by `holder`. Returns false if it was not pickable.
    pub fn on_collide(&mut self, holder: PlayerNumber) -> bool {
        if !self.pickable {
            return false;
        }
        self.pickable = false;
        self.holder = Some(holder);
        true
    }

    /// Respawn at `position`, free for anyone.
    pub fn on_spawn(&mut self, position: Vec2) {
        self.position = position;
        self.pickable = true;
        self.holder = None;
    }
}
