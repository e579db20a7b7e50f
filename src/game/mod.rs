//! Game Logic Module
//!
//! All entity simulation code. Deterministic given the seed and inputs.
//!
//! ## Module Structure
//!
//! - `stats`: Per-form stat tables, effect sizes, round tuning
//! - `state`: Form, slug entity, arena
//! - `input`: Input frames and recordings
//! - `movement`: Heading easing and position integration
//! - `boost`: Boost / dash cooldown state machine
//! - `trail`: Pooled trail segments
//! - `health`: Damage and form transitions
//! - `collision`: Contact response and the circle-overlap sensor
//! - `force`: Explosion knockback
//! - `pickup`: The shell and its single holder
//! - `schedule`: Deferred callbacks on the simulated clock
//! - `events`: Game events for coordinators and replay
//! - `tick`: Frame stepper

pub mod stats;
pub mod state;
pub mod input;
pub mod movement;
pub mod boost;
pub mod trail;
pub mod health;
pub mod collision;
pub mod force;
pub mod pickup;
pub mod schedule;
pub mod events;
pub mod tick;

// Re-export key types
pub use stats::{ConfigError, EffectSize, FormStats, GameConfig};
pub use state::{ArenaState, Form, PlayerNumber, Pose, SlugState, TrailState};
pub use input::{InputFrame, InputRecording};
pub use collision::{Contact, ContactSensor, Counterpart};
pub use events::{GameEvent, GameEventData};
pub use tick::{replay, tick, TickResult};
