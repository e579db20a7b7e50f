//! Frame Stepper
//!
//! One call to [`tick`] advances every entity by one frame. Elapsed time is
//! passed in explicitly; nothing reads a global clock.
//!
//! Order inside a frame:
//! 1. apply inputs (steering target, boost button)
//! 2. per entity: steer → boost → force drag → integrate → trail
//! 3. advance the deferred-callback clock and fire what came due
//! 4. drain events

use std::collections::BTreeMap;

use tracing::debug;
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::game::boost::BoostTransition;
use crate::game::collision::ContactSensor;
use crate::game::events::GameEvent;
use crate::game::input::{InputFrame, InputRecording};
use crate::game::schedule::ScheduledAction;
use crate::game::state::{ArenaState, PlayerNumber};
use crate::game::trail::TrailFrame;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Frame number after this tick
    pub frame: u32,
    /// Events generated this tick
    pub events: Vec<GameEvent>,
}

/// Run one simulation frame.
///
/// # Arguments
///
/// * `arena` - The round state (will be mutated)
/// * `inputs` - Player inputs for this frame (BTreeMap for deterministic order!)
/// * `dt` - Seconds since the previous frame
///
/// Players missing from `inputs` keep their previous steering target.
pub fn tick(arena: &mut ArenaState, inputs: &BTreeMap<PlayerNumber, InputFrame>, dt: f32) -> TickResult {
    arena.frame += 1;

    // 1. Apply player inputs
    apply_inputs(arena, inputs);

    // 2. Update every entity
    let numbers: Vec<PlayerNumber> = arena.players.keys().copied().collect();
    for number in numbers {
        update_slug(arena, number, dt);
    }

    // 3. Fire deferred callbacks
    arena.advance_clock(dt);

    TickResult {
        frame: arena.frame,
        events: arena.take_events(),
    }
}

/// Apply player inputs to their states.
fn apply_inputs(arena: &mut ArenaState, inputs: &BTreeMap<PlayerNumber, InputFrame>) {
    for (&number, input) in inputs {
        arena.set_target(number, input.move_direction());
        if input.boost_pressed() {
            arena.request_boost(number);
        }
    }
}

/// Advance one entity by one frame.
fn update_slug(arena: &mut ArenaState, number: PlayerNumber, dt: f32) {
    let ArenaState {
        players,
        config,
        frame,
        pending_events,
        ..
    } = arena;
    let Some(slug) = players.get_mut(&number) else {
        return;
    };

    // Stats follow the current form every frame
    let stats = config.stats(slug.form);

    slug.movement.steer(stats, config.deadzone);

    match slug.boost.update(&mut slug.movement.speed, stats, dt) {
        BoostTransition::Ended => {
            debug!(player = number, "Boost ended");
            pending_events.push(GameEvent::boost_ended(*frame, number, false));
        }
        BoostTransition::Ready => {
            pending_events.push(GameEvent::boost_ready(*frame, number));
        }
        BoostTransition::None => {}
    }

    slug.force.decay(stats.force_drag, config.force_epsilon);

    let trail_speed = slug.trail_contact.speed_multiplier(config);
    slug.movement.integrate(trail_speed, &slug.force);

    let trail_frame = TrailFrame {
        boosting: slug.boost.is_boosting,
        moving: slug.movement.is_moving,
        position: slug.movement.position,
        angle: slug.movement.facing_angle,
        dt,
    };
    slug.trail.update(trail_frame, number, stats, config.trail_lifetime);
}

impl ArenaState {
    /// Start a boost for `number`. Refused silently outside slug form or
    /// while the dash cooldown runs.
    pub fn request_boost(&mut self, number: PlayerNumber) -> bool {
        let Some(slug) = self.players.get_mut(&number) else {
            return false;
        };
        let stats = self.config.stats(slug.form);
        if !slug.boost.request(slug.form, &mut slug.movement.speed, stats) {
            return false;
        }

        debug!(player = number, speed = slug.movement.speed, "Boost started");
        let frame = self.frame;
        self.push_event(GameEvent::boost_started(frame, number));
        true
    }

    /// Advance the deferred-callback clock by `dt` and apply due actions.
    ///
    /// Returns the number of actions fired.
    pub fn advance_clock(&mut self, dt: f32) -> usize {
        let due = self.scheduler.advance(dt);
        for entry in &due {
            #[cfg(feature = "debug-tracing")]
            trace!(token = entry.token.raw(), action = ?entry.action, "Scheduled action fired");

            match entry.action {
                ScheduledAction::ExplosionForce {
                    target,
                    origin,
                    radius,
                    force_per_unit,
                } => self.resolve_explosion(target, origin, radius, force_per_unit),
                ScheduledAction::RestorePickup { target } => self.restore_pickup(target),
                ScheduledAction::ClearHitPose { target } => self.clear_hit_pose(target),
            }
        }
        due.len()
    }
}

/// Replay a round from recorded inputs.
///
/// With a sensor, contacts are sensed and delivered after every frame.
/// Returns the final state and every event in order.
pub fn replay(
    initial: ArenaState,
    recordings: &BTreeMap<PlayerNumber, InputRecording>,
    frame_count: u32,
    dt: f32,
    mut sensor: Option<ContactSensor>,
) -> (ArenaState, Vec<GameEvent>) {
    let mut arena = initial;
    let mut all_events = Vec::new();

    for _ in 0..frame_count {
        // Inputs recorded for the frame about to run
        let next_frame = arena.frame + 1;
        let inputs: BTreeMap<PlayerNumber, InputFrame> = recordings
            .iter()
            .map(|(&number, recording)| (number, recording.input_at(next_frame)))
            .collect();

        let result = tick(&mut arena, &inputs, dt);
        all_events.extend(result.events);

        if let Some(sensor) = sensor.as_mut() {
            sensor.step(&mut arena);
            all_events.extend(arena.take_events());
        }
    }

    (arena, all_events)
}
