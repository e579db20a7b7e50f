//! Health and Form Transitions
//!
//! `switch_state` is the single place a form changes. Everything that leads
//! to a transition (collecting the pickup, dying as a snail, a scripted
//! switch by name) funnels through it.
//!
//! ```text
//!            pickup collected
//!   SLUG ─────────────────────────▶ SNAIL
//!    ▲                                │
//!    └──────── hp <= 0 (damage) ──────┘
//!      hp = max, drop shell, lock pickup
//! ```

use tracing::{debug, warn};

use crate::core::vec2::Vec2;
use crate::game::collision::Counterpart;
use crate::game::events::GameEvent;
use crate::game::pickup::PickupId;
use crate::game::schedule::ScheduledAction;
use crate::game::state::{ArenaState, Form, PlayerNumber, Pose};
use crate::game::stats::EffectSize;

impl ArenaState {
    /// Switch `number` into `form`.
    ///
    /// Returns false if the player is unknown or already in that form.
    pub fn switch_state(&mut self, number: PlayerNumber, form: Form) -> bool {
        let Some(slug) = self.players.get_mut(&number) else {
            return false;
        };
        if slug.form == form {
            return false;
        }

        let old_form = slug.form;
        slug.form = form;

        match form {
            Form::Slug => {
                slug.hp = slug.max_hp;
                slug.scale = 1.0;
                slug.trail_contact.clear();
                slug.colliding_with.retain(|c| !matches!(c, Counterpart::Trail { .. }));
                slug.pose = Pose::Hit;
                slug.can_pick_up = false;

                let position = slug.position();
                let carried = slug.shell;
                let stale_lock = slug.pickup_lock.take();
                let stale_pose = slug.hit_pose_timer.take();

                for token in [stale_lock, stale_pose].into_iter().flatten() {
                    self.scheduler.cancel(token);
                }
                if let Some(pickup_id) = carried {
                    self.release_pickup(number, pickup_id, position);
                }

                let lock = self.scheduler.schedule(
                    self.config.pickup_lock_seconds,
                    ScheduledAction::RestorePickup { target: number },
                );
                if let Some(slug) = self.players.get_mut(&number) {
                    slug.pickup_lock = Some(lock);
                }
            }
            Form::Snail => {
                slug.scale = self.config.snail_scale;
                slug.pose = Pose::Moving;
            }
        }

        debug!(player = number, from = %old_form, to = %form, "Form switched");
        let frame = self.frame;
        self.push_event(GameEvent::form_changed(frame, number, old_form, form));
        true
    }

    /// Switch by stat-table name. Unknown names are logged and ignored.
    pub fn switch_state_named(&mut self, number: PlayerNumber, name: &str) -> bool {
        match name.parse::<Form>() {
            Ok(form) => self.switch_state(number, form),
            Err(e) => {
                warn!(player = number, error = %e, "Ignoring switch to invalid form");
                false
            }
        }
    }

    /// Damage a snail. Slugs are immune.
    ///
    /// A lethal hit turns the snail back into a slug and drops the shell
    /// where it stood; either way an effect pushes the attacker away.
    /// Returns true if HP changed.
    pub fn apply_damage(
        &mut self,
        number: PlayerNumber,
        amount: f32,
        source: Option<PlayerNumber>,
    ) -> bool {
        let Some(slug) = self.players.get_mut(&number) else {
            return false;
        };
        if !slug.is_snail() {
            return false;
        }

        slug.hp -= amount;
        let remaining_hp = slug.hp;
        let position = slug.position();

        let frame = self.frame;
        self.push_event(GameEvent::damaged(frame, number, source, amount, remaining_hp));
        debug!(player = number, ?source, amount, remaining_hp, "Snail damaged");

        let targets: Vec<PlayerNumber> = source.into_iter().collect();

        if remaining_hp <= 0.0 {
            self.switch_state(number, Form::Slug);
            self.spawn_effect(EffectSize::Big, position, &targets);
        } else {
            self.spawn_effect(EffectSize::Small, position, &targets);
            self.play_hit_pose(number);
        }
        true
    }

    /// Respawn the carried pickup at `position` and clear the carrier's shell.
    pub(crate) fn release_pickup(&mut self, number: PlayerNumber, pickup_id: PickupId, position: Vec2) {
        if let Some(slug) = self.players.get_mut(&number) {
            slug.shell = None;
        }

        if self.pickup.id == pickup_id && self.pickup.holder() == Some(number) {
            self.pickup.on_spawn(position);
        }

        debug!(player = number, pickup_id, "Pickup dropped");
        let frame = self.frame;
        self.push_event(GameEvent::pickup_dropped(frame, number, pickup_id, position));
    }

    /// Show the hit reaction for a short while.
    fn play_hit_pose(&mut self, number: PlayerNumber) {
        let stale = match self.players.get_mut(&number) {
            Some(slug) => {
                slug.pose = Pose::Hit;
                slug.hit_pose_timer.take()
            }
            None => return,
        };
        if let Some(token) = stale {
            self.scheduler.cancel(token);
        }

        let token = self.scheduler.schedule(
            self.config.hit_pose_seconds,
            ScheduledAction::ClearHitPose { target: number },
        );
        if let Some(slug) = self.players.get_mut(&number) {
            slug.hit_pose_timer = Some(token);
        }
    }

    /// Pickup lock expired.
    pub(crate) fn restore_pickup(&mut self, number: PlayerNumber) {
        if let Some(slug) = self.players.get_mut(&number) {
            slug.pickup_lock = None;
            slug.can_pick_up = true;
            slug.pose = Pose::Moving;
        }
    }

    /// Hit reaction over. The pickup lock keeps the pose if still running.
    pub(crate) fn clear_hit_pose(&mut self, number: PlayerNumber) {
        if let Some(slug) = self.players.get_mut(&number) {
            slug.hit_pose_timer = None;
            if slug.pickup_lock.is_none() {
                slug.pose = Pose::Moving;
            }
        }
    }
}
