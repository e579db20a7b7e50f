//! Movement Integration
//!
//! Eases the current heading towards the steering input, accelerates and
//! decelerates scalar speed, and integrates position. Directions are kept
//! at unit length (or zero when fully stopped); speed is tracked separately.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::force::ForceState;
use crate::game::stats::FormStats;

/// Frames per second the rigid-body velocity is expressed in.
pub const BODY_VELOCITY_SCALE: f32 = 60.0;

/// Offset from the direction's angle-to-origin to the display angle.
pub const FACING_OFFSET: f32 = 270.0;

/// Offset from the display angle to the rigid body's orientation.
pub const BODY_ANGLE_OFFSET: f32 = -90.0;

/// Deceleration is this many times the acceleration step.
const DECELERATION_FACTOR: f32 = 3.0;

/// Fraction of the rotation step used when the angular distance is undefined.
const DEGENERATE_ROTATION_DIVISOR: f32 = 8.0;

/// Wrap an angle in degrees into `[0, 360)`.
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    angle.rem_euclid(360.0)
}

/// Display angle for a heading.
#[inline]
pub fn facing_for(direction: Vec2) -> f32 {
    wrap_degrees(direction.angle_to_origin() + FACING_OFFSET)
}

/// Direction, speed and position of one entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovementState {
    /// Position in world space
    pub position: Vec2,
    /// Heading (unit, or zero when stopped)
    pub current_direction: Vec2,
    /// Steering input (zero = no input)
    pub target_direction: Vec2,
    /// Last heading before the input dropped
    pub last_direction: Vec2,
    /// Scalar speed per frame
    pub speed: f32,
    /// Set while steering, cleared once fully stopped
    pub is_moving: bool,
    /// Display angle in degrees
    pub facing_angle: f32,
    /// Heading times speed for the last frame
    pub velocity: Vec2,
    /// Velocity handed to the external rigid body (per second)
    pub body_velocity: Vec2,
}

impl MovementState {
    /// Create a stationary entity heading right.
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            current_direction: Vec2::RIGHT,
            target_direction: Vec2::ZERO,
            last_direction: Vec2::RIGHT,
            speed: 0.0,
            is_moving: false,
            facing_angle: facing_for(Vec2::RIGHT),
            velocity: Vec2::ZERO,
            body_velocity: Vec2::ZERO,
        }
    }

    /// Orientation of the rigid body in degrees.
    #[inline]
    pub fn body_angle(&self) -> f32 {
        wrap_degrees(self.facing_angle + BODY_ANGLE_OFFSET)
    }

    /// Advance heading and speed from the steering input.
    pub fn steer(&mut self, stats: &FormStats, deadzone: f32) {
        self.current_direction = self.current_direction.normalize();

        if self.target_direction.length() > deadzone {
            self.is_moving = true;
            if self.current_direction.length() < deadzone {
                // Resume from the remembered heading instead of a zero vector
                self.current_direction = self.last_direction.normalize();
            }
            self.rotate_towards_target(stats.rotation_speed);
            self.speed += stats.movement_speed_step;
        } else if self.current_direction.length() > deadzone {
            self.speed -= stats.movement_speed_step * DECELERATION_FACTOR;
            self.last_direction = self.current_direction;
        } else if self.is_moving {
            self.is_moving = false;
            self.speed = 0.0;
        }

        if self.current_direction.length_squared() > 0.0 {
            self.facing_angle = facing_for(self.current_direction);
        }
    }

    /// Turn the heading towards the target by at most `rotation_speed` degrees.
    ///
    /// The step is capped at the remaining angular distance so the final
    /// approach does not overshoot.
    pub fn rotate_towards_target(&mut self, rotation_speed: f32) {
        let current = self.current_direction;
        let target = self.target_direction.normalize();

        let dot = current.dot(target);
        let distance = dot.acos();
        let mut step = rotation_speed.to_radians();

        if distance.is_nan() {
            if dot >= 1.0 {
                // Rounding pushed dot past 1: headings coincide
                step = 0.0;
            } else {
                step /= DEGENERATE_ROTATION_DIVISOR;
            }
        } else if distance < step {
            step = distance;
        }

        self.current_direction = if target.x * current.y > target.y * current.x {
            current.rotate(-step)
        } else {
            current.rotate(step)
        };
    }

    /// Integrate position and compute the rigid-body velocity.
    ///
    /// `trail_speed` scales both; knockback only feeds the body velocity.
    /// A speed of zero collapses the heading to zero (fully stopped).
    pub fn integrate(&mut self, trail_speed: f32, force: &ForceState) {
        self.velocity = self.current_direction * self.speed;
        self.position += self.velocity * trail_speed;
        self.body_velocity =
            self.velocity * (BODY_VELOCITY_SCALE * trail_speed) + force.contribution();

        if self.speed <= 0.0 {
            self.current_direction = Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::stats::StatTable;

    const EPS: f32 = 1e-4;

    fn stats() -> FormStats {
        StatTable::default().slug
    }

    #[test]
    fn test_facing_angle_offsets() {
        // Heading right faces 90 degrees on screen
        assert!((facing_for(Vec2::RIGHT) - 90.0).abs() < EPS);
        assert!((facing_for(Vec2::DOWN) - 180.0).abs() < EPS);

        let state = MovementState::new(Vec2::ZERO);
        assert!((state.body_angle() - 0.0).abs() < EPS);
    }

    #[test]
    fn test_rotation_toward_equal_target_is_noop() {
        let mut state = MovementState::new(Vec2::ZERO);
        state.target_direction = Vec2::RIGHT;
        state.rotate_towards_target(5.0);
        assert_eq!(state.current_direction, Vec2::RIGHT);
    }

    #[test]
    fn test_rotation_is_capped_by_rotation_speed() {
        let mut state = MovementState::new(Vec2::ZERO);
        state.target_direction = Vec2::DOWN;
        state.rotate_towards_target(10.0);

        let turned = state.current_direction.dot(Vec2::RIGHT).acos().to_degrees();
        assert!((turned - 10.0).abs() < 1e-3);
        // Turned towards +Y, not away
        assert!(state.current_direction.y > 0.0);
    }

    #[test]
    fn test_rotation_direction_follows_cross_sign() {
        let mut state = MovementState::new(Vec2::ZERO);
        state.target_direction = Vec2::UP;
        state.rotate_towards_target(10.0);
        assert!(state.current_direction.y < 0.0);
    }

    #[test]
    fn test_antiparallel_rounding_uses_reduced_step() {
        // Heading a hair longer than unit: dot with the opposite target is
        // below -1 and acos is undefined
        let mut state = MovementState::new(Vec2::ZERO);
        state.current_direction = Vec2::new(1.000_000_1, 0.0);
        state.target_direction = Vec2::new(-1.0, 0.0);
        assert!(state.current_direction.dot(state.target_direction) < -1.0);

        state.rotate_towards_target(5.0);

        let current = state.current_direction;
        let turned = current.y.atan2(current.x).to_degrees();
        assert!((turned.abs() - 5.0 / DEGENERATE_ROTATION_DIVISOR).abs() < EPS);
    }

    #[test]
    fn test_rotation_does_not_overshoot() {
        let mut state = MovementState::new(Vec2::ZERO);
        let target = Vec2::RIGHT.rotate(2.0_f32.to_radians());
        state.target_direction = target;
        state.rotate_towards_target(10.0);

        assert!((state.current_direction.x - target.x).abs() < EPS);
        assert!((state.current_direction.y - target.y).abs() < EPS);
    }

    #[test]
    fn test_target_magnitude_does_not_matter() {
        let mut a = MovementState::new(Vec2::ZERO);
        let mut b = MovementState::new(Vec2::ZERO);
        a.target_direction = Vec2::new(0.0, 0.5);
        b.target_direction = Vec2::new(0.0, 1.0);
        a.rotate_towards_target(7.0);
        b.rotate_towards_target(7.0);
        assert!((a.current_direction.x - b.current_direction.x).abs() < EPS);
    }

    #[test]
    fn test_steer_accelerates_with_input() {
        let stats = stats();
        let mut state = MovementState::new(Vec2::ZERO);
        state.target_direction = Vec2::RIGHT;

        state.steer(&stats, 0.2);
        assert!(state.is_moving);
        assert!((state.speed - stats.movement_speed_step).abs() < EPS);
    }

    #[test]
    fn test_steer_ignores_input_inside_deadzone() {
        let stats = stats();
        let mut state = MovementState::new(Vec2::ZERO);
        state.speed = 2.0;
        state.target_direction = Vec2::new(0.1, 0.1);

        state.steer(&stats, 0.2);
        assert!((state.speed - (2.0 - 3.0 * stats.movement_speed_step)).abs() < EPS);
        assert_eq!(state.last_direction, Vec2::RIGHT);
    }

    #[test]
    fn test_stopped_entity_resumes_from_last_direction() {
        let stats = stats();
        let mut state = MovementState::new(Vec2::ZERO);
        state.current_direction = Vec2::ZERO;
        state.last_direction = Vec2::DOWN;
        state.target_direction = Vec2::DOWN;

        state.steer(&stats, 0.2);
        assert!((state.current_direction.y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_full_stop_clears_moving_flag() {
        let stats = stats();
        let mut state = MovementState::new(Vec2::ZERO);
        state.is_moving = true;
        state.speed = 0.1;
        state.current_direction = Vec2::ZERO;

        state.steer(&stats, 0.2);
        assert!(!state.is_moving);
        assert_eq!(state.speed, 0.0);
    }

    #[test]
    fn test_integrate_applies_trail_speed_and_force() {
        let mut state = MovementState::new(Vec2::ZERO);
        state.speed = 2.0;
        let force = ForceState {
            direction: Vec2::DOWN,
            magnitude: 50.0,
        };

        state.integrate(0.5, &force);
        assert_eq!(state.position, Vec2::new(1.0, 0.0));
        assert_eq!(state.body_velocity, Vec2::new(60.0, 50.0));
    }

    #[test]
    fn test_integrate_at_zero_speed_collapses_heading() {
        let mut state = MovementState::new(Vec2::ZERO);
        state.integrate(1.0, &ForceState::default());
        assert_eq!(state.current_direction, Vec2::ZERO);
        assert_eq!(state.position, Vec2::ZERO);
    }
}
