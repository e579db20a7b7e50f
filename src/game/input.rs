//! Input Frames
//!
//! Per-frame controller state after mapping: a stick direction and a boost
//! button. Controller mapping itself happens outside the crate.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::state::PlayerNumber;

/// Full stick deflection.
const AXIS_MAX: f32 = 127.0;

/// Convert one stick axis to `[-1, 1]`. `-128` means released.
#[inline]
pub fn axis_to_unit(value: i8) -> f32 {
    if value == InputFrame::NO_INPUT {
        0.0
    } else {
        f32::from(value) / AXIS_MAX
    }
}

/// Raw input state for a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Stick X: -127 (left) to +127 (right), -128 = released
    pub move_x: i8,

    /// Stick Y in screen space: -127 (up) to +127 (down), -128 = released
    pub move_y: i8,

    /// Action flags (packed bits):
    /// - Bit 0: Boost pressed this frame
    /// - Bit 1-7: Reserved
    pub flags: u8,
}

impl Default for InputFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl InputFrame {
    /// Special value indicating no input (stick released)
    pub const NO_INPUT: i8 = -128;

    /// Boost flag bit
    pub const FLAG_BOOST: u8 = 0x01;

    /// Create a new empty input frame.
    pub const fn new() -> Self {
        Self {
            move_x: Self::NO_INPUT,
            move_y: Self::NO_INPUT,
            flags: 0,
        }
    }

    /// Create input with movement direction.
    pub const fn with_movement(move_x: i8, move_y: i8) -> Self {
        Self {
            move_x,
            move_y,
            flags: 0,
        }
    }

    /// Same input with the boost button held.
    pub const fn boosting(mut self) -> Self {
        self.flags |= Self::FLAG_BOOST;
        self
    }

    /// Stick direction with each axis in `[-1, 1]`.
    ///
    /// Not normalized; the deadzone check sees the raw deflection.
    #[inline]
    pub fn move_direction(&self) -> Vec2 {
        Vec2::new(axis_to_unit(self.move_x), axis_to_unit(self.move_y))
    }

    /// Check if boost was pressed this frame.
    #[inline]
    pub fn boost_pressed(&self) -> bool {
        self.flags & Self::FLAG_BOOST != 0
    }

    /// Set boost flag.
    #[inline]
    pub fn set_boost(&mut self, pressed: bool) {
        if pressed {
            self.flags |= Self::FLAG_BOOST;
        } else {
            self.flags &= !Self::FLAG_BOOST;
        }
    }

    /// Check if this is an idle frame (no input).
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.move_x == Self::NO_INPUT && self.move_y == Self::NO_INPUT && self.flags == 0
    }
}

// =============================================================================
// INPUT RECORDING
// =============================================================================

/// Input change starting at `frame`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Frame when this input state began
    pub frame: u32,
    /// The new input state
    pub input: InputFrame,
}

/// One player's inputs for a round, stored only when they change.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputRecording {
    /// Player this recording belongs to
    pub player: PlayerNumber,

    /// Last frame recorded
    pub end_frame: u32,

    deltas: Vec<InputDelta>,

    #[serde(skip)]
    last_input: InputFrame,
}

impl InputRecording {
    /// Empty recording.
    pub fn new(player: PlayerNumber) -> Self {
        Self {
            player,
            end_frame: 0,
            deltas: Vec::new(),
            last_input: InputFrame::new(),
        }
    }

    /// Record input for a frame. Only stored if it changed.
    pub fn record(&mut self, frame: u32, input: InputFrame) {
        self.end_frame = frame;
        if input != self.last_input {
            self.deltas.push(InputDelta { frame, input });
            self.last_input = input;
        }
    }

    /// Input in effect at `frame`.
    pub fn input_at(&self, frame: u32) -> InputFrame {
        let idx = self.deltas.partition_point(|d| d.frame <= frame);
        if idx == 0 {
            InputFrame::new()
        } else {
            self.deltas[idx - 1].input
        }
    }

    /// Stored changes.
    pub fn deltas(&self) -> &[InputDelta] {
        &self.deltas
    }
}
