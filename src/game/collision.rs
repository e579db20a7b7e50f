//! Collision Response
//!
//! Turns begin/end contact notifications into gameplay effects: boost hits
//! between players, pickup collection, and foreign-trail slowdown.
//!
//! The physics engine that detects contacts lives outside this crate. A
//! small circle-overlap `ContactSensor` is provided so rounds can be driven
//! without one (demo binary, integration tests).

use std::collections::BTreeSet;

use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::core::vec2::Vec2;
use crate::game::events::GameEvent;
use crate::game::pickup::PickupId;
use crate::game::state::{ArenaState, Form, PlayerNumber, MAX_TRACKED_CONTACTS};
use crate::game::stats::EffectSize;

/// What an entity touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Counterpart {
    /// Another player
    Player(PlayerNumber),
    /// The shell
    Pickup(PickupId),
    /// A pooled trail segment
    Trail {
        /// Player that dropped it
        owner: PlayerNumber,
        /// Pool index
        segment: usize,
    },
    /// Anything else (walls, props); ignored
    Other,
}

impl ArenaState {
    /// A contact between `number` and `counterpart` began.
    ///
    /// Returns true if the contact was recorded. A second begin for a
    /// counterpart already overlapping is ignored until the matching end.
    pub fn begin_contact(&mut self, number: PlayerNumber, counterpart: Counterpart) -> bool {
        let Some(slug) = self.players.get_mut(&number) else {
            return false;
        };

        match counterpart {
            Counterpart::Other => {
                warn!(player = number, "Ignoring contact with unrecognized counterpart");
                return false;
            }
            Counterpart::Player(other) if other == number => return false,
            Counterpart::Trail { owner, .. } if owner == number => return false,
            // Trails are harmless to slugs
            Counterpart::Trail { .. } if slug.is_slug() => return false,
            _ => {}
        }

        if slug.colliding_with.contains(&counterpart) {
            return false;
        }
        if slug.colliding_with.len() >= MAX_TRACKED_CONTACTS {
            warn!(player = number, ?counterpart, "Contact list full, dropping contact");
            return false;
        }
        slug.colliding_with.push(counterpart);

        match counterpart {
            Counterpart::Player(other) => self.resolve_player_contact(number, other),
            Counterpart::Pickup(pickup_id) => {
                self.acquire_pickup(number, pickup_id);
            }
            Counterpart::Trail { .. } => {
                if let Some(slug) = self.players.get_mut(&number) {
                    slug.trail_contact.begin();
                }
            }
            Counterpart::Other => {}
        }
        true
    }

    /// A contact between `number` and `counterpart` ended.
    ///
    /// Returns false for an end without a recorded begin.
    pub fn end_contact(&mut self, number: PlayerNumber, counterpart: Counterpart) -> bool {
        let Some(slug) = self.players.get_mut(&number) else {
            return false;
        };
        let Some(index) = slug.colliding_with.iter().position(|c| *c == counterpart) else {
            return false;
        };
        slug.colliding_with.remove(index);

        if let Counterpart::Trail { .. } = counterpart {
            slug.trail_contact.end();
        }
        true
    }

    /// Collect the pickup if it is free and `number` is allowed to take it.
    pub fn acquire_pickup(&mut self, number: PlayerNumber, pickup_id: PickupId) -> bool {
        let Some(slug) = self.players.get(&number) else {
            return false;
        };
        if self.pickup.id != pickup_id
            || !self.pickup.is_pickable()
            || !slug.can_pick_up
            || !slug.is_slug()
        {
            return false;
        }
        let position = slug.position();

        if !self.pickup.on_collide(number) {
            return false;
        }
        self.switch_state(number, Form::Snail);

        debug!(player = number, pickup_id, "Pickup acquired");
        let frame = self.frame;
        self.push_event(GameEvent::pickup_acquired(frame, number, pickup_id));

        self.spawn_effect(EffectSize::Medium, position, &[number]);
        self.raise_to_front(number);
        if let Some(slug) = self.players.get_mut(&number) {
            slug.shell = Some(pickup_id);
        }
        true
    }

    /// A boosting player rammed a snail.
    fn resolve_player_contact(&mut self, number: PlayerNumber, other: PlayerNumber) {
        let victim_is_snail = self.players.get(&number).is_some_and(|s| s.is_snail());
        let attacker_boosting = self.players.get(&other).is_some_and(|s| s.boost.is_boosting);
        if !victim_is_snail || !attacker_boosting {
            return;
        }

        let damage = self.config.boost_hit_damage;
        self.apply_damage(number, damage, Some(other));

        if let Some(attacker) = self.players.get_mut(&other) {
            attacker.boost.cancel();
            attacker.movement.current_direction = attacker.movement.current_direction.normalize();
        }
        debug!(player = other, victim = number, "Boost cancelled by hit");
        let frame = self.frame;
        self.push_event(GameEvent::boost_ended(frame, other, true));
    }
}

// =============================================================================
// CONTACT SENSOR
// =============================================================================

/// Check if two circles overlap.
#[inline]
pub fn circles_overlap(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> bool {
    let combined_radius = radius_a + radius_b;
    (pos_a - pos_b).length_squared() <= combined_radius * combined_radius
}

/// A contact notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    /// Overlap started
    Begin(PlayerNumber, Counterpart),
    /// Overlap ended
    End(PlayerNumber, Counterpart),
}

impl Contact {
    /// Deliver the notification to the arena.
    pub fn apply(self, arena: &mut ArenaState) -> bool {
        match self {
            Contact::Begin(number, counterpart) => arena.begin_contact(number, counterpart),
            Contact::End(number, counterpart) => arena.end_contact(number, counterpart),
        }
    }
}

/// Circle-overlap contact source.
///
/// Keeps the previous frame's overlap set and reports the difference.
#[derive(Clone, Debug)]
pub struct ContactSensor {
    /// Body radius of every entity
    pub slug_radius: f32,
    /// Radius of the pickup
    pub pickup_radius: f32,
    /// Radius of a trail segment
    pub trail_radius: f32,
    overlapping: BTreeSet<(PlayerNumber, Counterpart)>,
}

impl Default for ContactSensor {
    fn default() -> Self {
        Self::new(16.0, 12.0, 6.0)
    }
}

impl ContactSensor {
    /// Sensor with the given radii and no known overlaps.
    pub fn new(slug_radius: f32, pickup_radius: f32, trail_radius: f32) -> Self {
        Self {
            slug_radius,
            pickup_radius,
            trail_radius,
            overlapping: BTreeSet::new(),
        }
    }

    /// Overlaps reported as begun and not yet ended.
    pub fn overlapping(&self) -> &BTreeSet<(PlayerNumber, Counterpart)> {
        &self.overlapping
    }

    /// Compare the arena against the last frame; ends first, then begins.
    pub fn sense(&mut self, arena: &ArenaState) -> Vec<Contact> {
        let current = self.current_overlaps(arena);

        let mut contacts: Vec<Contact> = self
            .overlapping
            .difference(&current)
            .map(|&(n, c)| Contact::End(n, c))
            .collect();
        contacts.extend(
            current
                .difference(&self.overlapping)
                .map(|&(n, c)| Contact::Begin(n, c)),
        );

        self.overlapping = current;
        contacts
    }

    /// Sense and deliver in one go. Returns the number of contacts delivered.
    pub fn step(&mut self, arena: &mut ArenaState) -> usize {
        let contacts = self.sense(arena);
        for contact in &contacts {
            contact.apply(arena);
        }
        contacts.len()
    }

    fn current_overlaps(&self, arena: &ArenaState) -> BTreeSet<(PlayerNumber, Counterpart)> {
        let mut current = BTreeSet::new();

        for (&number, slug) in &arena.players {
            let position = slug.position();

            for (&other, other_slug) in &arena.players {
                if other == number {
                    continue;
                }
                if circles_overlap(position, self.slug_radius, other_slug.position(), self.slug_radius) {
                    current.insert((number, Counterpart::Player(other)));
                }

                for (segment, trail) in other_slug.trail.active_segments() {
                    if circles_overlap(position, self.slug_radius, trail.position, self.trail_radius) {
                        current.insert((number, Counterpart::Trail { owner: other, segment }));
                    }
                }
            }

            let pickup = &arena.pickup;
            if pickup.holder().is_none()
                && circles_overlap(position, self.slug_radius, pickup.position, self.pickup_radius)
            {
                current.insert((number, Counterpart::Pickup(pickup.id)));
            }
        }

        current
    }
}
