use serde::Serialize;
use std::fmt;

use crate::landmarks::{Hand, INDEX_TIP, WRIST};

/// Coarse pointing direction of the index finger relative to the wrist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Orientation {
    Up,
    Down,
    Side,
    None,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Side => "SIDE",
            Self::None => "NONE",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image Y grows downward, so a fingertip above the wrist has the smaller Y.
pub fn detect_orientation(hand: Option<&Hand>) -> Orientation {
    let Some(hand) = hand else {
        return Orientation::None;
    };
    let tip = hand.point(INDEX_TIP);
    let wrist = hand.point(WRIST);
    let dx = (tip.x - wrist.x).abs();
    let dy = (tip.y - wrist.y).abs();

    if dx > dy {
        Orientation::Side
    } else if tip.y < wrist.y {
        Orientation::Up
    } else {
        Orientation::Down
    }
}
