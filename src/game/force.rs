//! Knockback
//!
//! Explosions push entities with a force that falls off linearly with
//! distance and then decays by the form's drag every frame. The push only
//! reaches the rigid-body velocity; it never moves the integrated position.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::vec2::Vec2;
use crate::game::events::GameEvent;
use crate::game::schedule::{CancelToken, ScheduledAction};
use crate::game::state::{ArenaState, PlayerNumber};
use crate::game::stats::EffectSize;

/// Current knockback of one entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceState {
    /// Push direction (unit)
    pub direction: Vec2,
    /// Push strength, never negative
    pub magnitude: f32,
}

impl ForceState {
    /// Velocity added to the rigid body this frame.
    #[inline]
    pub fn contribution(&self) -> Vec2 {
        self.direction * self.magnitude
    }

    /// Is a push currently active?
    #[inline]
    pub fn is_active(&self) -> bool {
        self.magnitude > 0.0
    }

    /// Apply one frame of drag, snapping to zero under `epsilon`.
    pub fn decay(&mut self, drag: f32, epsilon: f32) {
        if self.magnitude <= 0.0 {
            return;
        }
        self.magnitude *= drag;
        if self.magnitude < epsilon {
            self.magnitude = 0.0;
        }
    }
}

/// Knockback magnitude at `distance` from the origin, zero at or beyond `radius`.
#[inline]
pub fn falloff(distance: f32, radius: f32, force_per_unit: f32) -> f32 {
    if distance < radius {
        (radius - distance) * force_per_unit
    } else {
        0.0
    }
}

impl ArenaState {
    /// Queue an explosion push against `number`, landing after `delay` seconds.
    ///
    /// Distance is measured when the push lands, not when it is queued.
    pub fn apply_explosion_force(
        &mut self,
        number: PlayerNumber,
        origin: Vec2,
        radius: f32,
        force_per_unit: f32,
        delay: f32,
    ) -> Option<CancelToken> {
        if !self.players.contains_key(&number) {
            return None;
        }

        let token = self.scheduler.schedule(
            delay,
            ScheduledAction::ExplosionForce {
                target: number,
                origin,
                radius,
                force_per_unit,
            },
        );
        Some(token)
    }

    /// Land an explosion push on `number` now.
    pub(crate) fn resolve_explosion(
        &mut self,
        number: PlayerNumber,
        origin: Vec2,
        radius: f32,
        force_per_unit: f32,
    ) {
        let Some(position) = self.players.get(&number).map(|s| s.position()) else {
            return;
        };

        let distance = position.distance(origin);
        if distance >= radius {
            return;
        }

        let offset = position - origin;
        let direction = if offset.length_squared() > 0.0 {
            offset.normalize()
        } else {
            self.rng.random_direction()
        };
        let magnitude = falloff(distance, radius, force_per_unit);

        if let Some(slug) = self.players.get_mut(&number) {
            slug.force = ForceState { direction, magnitude };
        }

        debug!(player = number, magnitude, "Knockback applied");
        let frame = self.frame;
        self.push_event(GameEvent::knockback_applied(frame, number, direction, magnitude));
    }

    /// Spawn a visual effect and queue its push against every target.
    pub fn spawn_effect(&mut self, size: EffectSize, position: Vec2, targets: &[PlayerNumber]) {
        let explosion = *self.config.effects.get(size);

        let frame = self.frame;
        self.push_event(GameEvent::effect_spawned(frame, size, position, targets.to_vec()));

        for &target in targets {
            self.apply_explosion_force(
                target,
                position,
                explosion.explosion_radius,
                explosion.explosion_force,
                explosion.explosion_freeze_time,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::GameEventData;
    use crate::game::stats::GameConfig;

    fn arena() -> ArenaState {
        let mut arena = ArenaState::new(GameConfig::default(), 9, Vec2::new(500.0, 500.0));
        arena.add_player(1, "red", Vec2::new(30.0, 40.0));
        arena
    }

    #[test]
    fn test_decay_snaps_to_zero() {
        let mut force = ForceState {
            direction: Vec2::RIGHT,
            magnitude: 1.0,
        };
        force.decay(0.5, 0.1);
        assert_eq!(force.magnitude, 0.5);
        force.decay(0.5, 0.1);
        force.decay(0.5, 0.1);
        assert_eq!(force.magnitude, 0.125);
        force.decay(0.5, 0.1);
        assert_eq!(force.magnitude, 0.0);
        assert!(!force.is_active());
    }

    #[test]
    fn test_falloff_linear_inside_radius() {
        assert_eq!(falloff(50.0, 80.0, 4.0), 120.0);
        assert_eq!(falloff(80.0, 80.0, 4.0), 0.0);
        assert_eq!(falloff(100.0, 80.0, 4.0), 0.0);
    }

    #[test]
    fn test_explosion_is_deferred() {
        let mut arena = arena();
        let token = arena.apply_explosion_force(1, Vec2::ZERO, 80.0, 4.0, 0.1);

        assert!(token.is_some());
        assert_eq!(arena.scheduler.pending(), 1);
        assert!(!arena.player(1).unwrap().force.is_active());

        // Unknown entity is ignored
        assert!(arena.apply_explosion_force(9, Vec2::ZERO, 80.0, 4.0, 0.1).is_none());
    }

    #[test]
    fn test_resolved_explosion_pushes_outward() {
        let mut arena = arena();
        arena.resolve_explosion(1, Vec2::ZERO, 80.0, 4.0);

        let force = arena.player(1).unwrap().force;
        // Distance 50 from the origin
        assert!((force.magnitude - 120.0).abs() < 1e-3);
        assert!((force.direction.x - 0.6).abs() < 1e-5);
        assert!((force.direction.y - 0.8).abs() < 1e-5);

        let events = arena.take_events();
        assert!(matches!(
            events[0].data,
            GameEventData::KnockbackApplied { player: 1, .. }
        ));
    }

    #[test]
    fn test_out_of_range_explosion_does_nothing() {
        let mut arena = arena();
        arena.resolve_explosion(1, Vec2::ZERO, 50.0, 4.0);

        assert!(!arena.player(1).unwrap().force.is_active());
        assert!(arena.take_events().is_empty());
    }

    #[test]
    fn test_coincident_explosion_uses_random_unit_direction() {
        let mut arena = arena();
        let origin = arena.player(1).unwrap().position();
        arena.resolve_explosion(1, origin, 80.0, 4.0);

        let force = arena.player(1).unwrap().force;
        assert!((force.direction.length() - 1.0).abs() < 1e-4);
        assert!((force.magnitude - 320.0).abs() < 1e-3);
    }

    #[test]
    fn test_spawn_effect_queues_every_target() {
        let mut arena = arena();
        arena.add_player(2, "blue", Vec2::ZERO);
        arena.spawn_effect(EffectSize::Big, Vec2::ZERO, &[1, 2]);

        assert_eq!(arena.scheduler.pending(), 2);
        let events = arena.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0].data,
            GameEventData::EffectSpawned { size: EffectSize::Big, targets, .. } if targets == &vec![1, 2]
        ));
    }
}
