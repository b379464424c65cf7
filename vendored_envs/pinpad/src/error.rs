use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PinPadError {
    #[error("malformed layout: {0}")]
    MalformedLayout(String),
    #[error("unknown pad symbol {0:?} (no palette entry)")]
    UnknownPad(char),
    #[error("invalid action {0} (expected 0..=4)")]
    InvalidAction(i64),
    /// Spawn override outside the grid or on a wall cell.
    #[error("invalid spawn position ({x}, {y})")]
    InvalidSpawn { x: usize, y: usize },
    #[error("unknown layout name: {0}")]
    UnknownLayout(String),
}
