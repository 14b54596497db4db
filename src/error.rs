use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GestureError {
    #[error("invalid hand shape: expected 21 landmarks, got {found}")]
    InvalidHandShape { found: usize },
}
