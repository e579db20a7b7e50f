//! # Slug Arena
//!
//! Player-entity simulation for Slug Arena: a creature that alternates
//! between an agile slug and an armored snail carrying the shell, steers
//! with eased rotation, boosts leaving a slowing trail, and trades HP and
//! shell ownership through contacts and explosions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SLUG ARENA                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Primitives                              │
//! │  ├── vec2.rs      - 2D direction vector                     │
//! │  ├── rng.rs       - Seeded Xorshift128+ PRNG                │
//! │  └── hash.rs      - State hashing for replay checks         │
//! │                                                             │
//! │  game/            - Entity simulation                       │
//! │  ├── stats.rs     - Stat tables and tuning (JSON)           │
//! │  ├── state.rs     - Slug entity and arena                   │
//! │  ├── input.rs     - Input frames and recordings             │
//! │  ├── movement.rs  - Heading easing, integration             │
//! │  ├── boost.rs     - Boost / dash cooldown                   │
//! │  ├── trail.rs     - Trail segment pool                      │
//! │  ├── health.rs    - Damage and form transitions             │
//! │  ├── collision.rs - Contact response, overlap sensor        │
//! │  ├── force.rs     - Explosion knockback                     │
//! │  ├── pickup.rs    - Shell ownership                         │
//! │  ├── schedule.rs  - Deferred callbacks                      │
//! │  ├── events.rs    - Events for coordinators                 │
//! │  └── tick.rs      - Frame stepper and replay                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! - BTreeMap everywhere iteration order matters
//! - Elapsed time passed explicitly into every update
//! - Delayed effects run on a simulated clock, not a timer service
//! - All randomness from the seeded PRNG
//!
//! Same config, seed and inputs give the same state hash on the same build.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use core::vec2::Vec2;
pub use core::rng::DeterministicRng;
pub use game::state::{ArenaState, Form, PlayerNumber, SlugState};
pub use game::stats::{ConfigError, GameConfig};
pub use game::input::InputFrame;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation frame rate (Hz)
pub const FRAME_RATE: u32 = 60;

/// Seconds per frame at `FRAME_RATE`
pub const FRAME_DT: f32 = 1.0 / FRAME_RATE as f32;

/// Round length in frames (90 seconds at 60 Hz)
pub const ROUND_DURATION_FRAMES: u32 = 5400;
