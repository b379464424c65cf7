//! Pure Visual Pin Pad logic crate.
//! - Map parsing into an immutable `Layout`
//! - Clamped grid movement with wall rejection
//! - Pad sequence tracking and target reward
//! - 64x64 RGB observation rendering
//! - Shipped preset maps

mod board;
mod error;
mod game;
mod palette;
mod preset;
mod render;
mod sequence;

pub use board::{Cell, Layout, MAX_HEIGHT, MAX_WIDTH};
pub use error::PinPadError;
pub use game::{
    Action, Discrete, ImageSpace, Info, PinPad, ResetOptions, StepOutcome, ACTION_SPACE,
    OBSERVATION_SPACE,
};
pub use palette::{pad_color, pad_symbols, Rgb};
pub use preset::{preset_layout, LayoutName};
pub use render::{render, Frame, IMAGE_SIZE, SCALE, STRIP_ROW};
pub use sequence::{Sequence, Target, RECENT_LEN};

/// Palette constants for callers inspecting frames.
pub mod colors {
    pub use crate::palette::{dim, AGENT, BACKGROUND, WALL};
}
