//! Hand landmark schema shared by every recognizer.
//!
//! A hand is always exactly 21 points in the detector's fixed anatomical
//! order; construction fails otherwise so nothing downstream can index
//! past the end.

use serde::{Deserialize, Serialize};

use crate::error::GestureError;

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// One keypoint in normalized image coordinates. `z` is relative depth,
/// more negative is closer to the camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLandmark")]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

// wire form: {"x":..,"y":..,"z":..} or [x, y, z]
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLandmark {
    Point {
        x: f64,
        y: f64,
        #[serde(default)]
        z: f64,
    },
    Triple([f64; 3]),
}

impl From<RawLandmark> for Landmark {
    fn from(raw: RawLandmark) -> Self {
        match raw {
            RawLandmark::Point { x, y, z } => Landmark { x, y, z },
            RawLandmark::Triple([x, y, z]) => Landmark { x, y, z },
        }
    }
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Landmark) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct Hand {
    points: [Landmark; LANDMARK_COUNT],
}

impl Hand {
    pub fn new(points: Vec<Landmark>) -> Result<Self, GestureError> {
        let found = points.len();
        let points: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| GestureError::InvalidHandShape { found })?;
        Ok(Self { points })
    }

    pub fn point(&self, idx: usize) -> &Landmark {
        &self.points[idx]
    }

    pub fn wrist(&self) -> &Landmark {
        &self.points[WRIST]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    /// Distance between two landmarks of this hand.
    pub fn span(&self, a: usize, b: usize) -> f64 {
        self.points[a].distance(&self.points[b])
    }

    /// Tip farther from the wrist than the PIP joint.
    pub fn finger_extended(&self, finger: Finger) -> bool {
        let (pip, tip) = finger.pip_tip();
        self.span(tip, WRIST) > self.span(pip, WRIST)
    }

    /// Thumb tip farther from the index MCP than the thumb IP is.
    pub fn thumb_extended(&self) -> bool {
        self.span(THUMB_TIP, INDEX_MCP) > self.span(THUMB_IP, INDEX_MCP)
    }

    pub fn extension(&self) -> Extension {
        Extension {
            thumb: self.thumb_extended(),
            index: self.finger_extended(Finger::Index),
            middle: self.finger_extended(Finger::Middle),
            ring: self.finger_extended(Finger::Ring),
            pinky: self.finger_extended(Finger::Pinky),
        }
    }
}

impl TryFrom<Vec<Landmark>> for Hand {
    type Error = GestureError;

    fn try_from(points: Vec<Landmark>) -> Result<Self, Self::Error> {
        Hand::new(points)
    }
}

impl From<Hand> for Vec<Landmark> {
    fn from(hand: Hand) -> Self {
        hand.points.to_vec()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    fn pip_tip(self) -> (usize, usize) {
        match self {
            Finger::Index => (INDEX_PIP, INDEX_TIP),
            Finger::Middle => (MIDDLE_PIP, MIDDLE_TIP),
            Finger::Ring => (RING_PIP, RING_TIP),
            Finger::Pinky => (PINKY_PIP, PINKY_TIP),
        }
    }
}

/// Per-finger "extended" flags for one hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extension {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl Extension {
    pub fn all_four(&self) -> bool {
        self.index && self.middle && self.ring && self.pinky
    }

    pub fn none_of_four(&self) -> bool {
        !self.index && !self.middle && !self.ring && !self.pinky
    }
}

/// Hands seen in one video tick. Ordering is not stable across ticks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub hands: Vec<Hand>,
}

impl Frame {
    pub fn new(hands: Vec<Hand>) -> Self {
        Self { hands }
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}
