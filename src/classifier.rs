//! Single-frame letter-shape classification.
//!
//! The branch order and distance thresholds below are load-bearing: the
//! groups overlap and earlier checks mask later ones.

use log::debug;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::landmarks::*;
use crate::motion::MotionHistory;
use crate::orientation::{Orientation, detect_orientation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Letter {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
}

impl Letter {
    pub const ALL: [Letter; 26] = [
        Letter::A,
        Letter::B,
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::H,
        Letter::I,
        Letter::J,
        Letter::K,
        Letter::L,
        Letter::M,
        Letter::N,
        Letter::O,
        Letter::P,
        Letter::Q,
        Letter::R,
        Letter::S,
        Letter::T,
        Letter::U,
        Letter::V,
        Letter::W,
        Letter::X,
        Letter::Y,
        Letter::Z,
    ];

    pub fn as_char(&self) -> char {
        (b'A' + *self as u8) as char
    }
}

/// Output of the static path: a letter, the shake motion, or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticLabel {
    Letter(Letter),
    Shake,
    None,
}

impl fmt::Display for StaticLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Letter(l) => write!(f, "{}", l.as_char()),
            Self::Shake => f.write_str("6-7"),
            Self::None => f.write_str("NONE"),
        }
    }
}

impl Serialize for StaticLabel {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

// thumb-to-joint contact in a closed fist
const FIST_CONTACT: f64 = 0.05;
const X_HOOK: f64 = 0.08;
const U_TIPS_TOGETHER: f64 = 0.03;
const K_THUMB_ON_MIDDLE: f64 = 0.06;
const F_CIRCLE: f64 = 0.06;
const O_CIRCLE: f64 = 0.06;
const C_GAP_MIN: f64 = 0.05;
const C_GAP_MAX: f64 = 0.25;

/// Classifier with its own shake-tracking history. One per session.
#[derive(Debug, Clone, Default)]
pub struct StaticClassifier {
    history: MotionHistory,
}

impl StaticClassifier {
    pub fn new(history: MotionHistory) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &MotionHistory {
        &self.history
    }

    /// Classifies one hand, updating the shake history first. A missing
    /// hand yields `None` and leaves the history untouched.
    pub fn classify(&mut self, hand: Option<&Hand>) -> StaticLabel {
        let Some(hand) = hand else {
            return StaticLabel::None;
        };
        if self.history.observe(hand) {
            return StaticLabel::Shake;
        }
        classify_pose(hand)
    }

    pub fn reset(&mut self) {
        self.history.reset();
    }
}

/// Pure letter-shape classification, no motion involved.
pub fn classify_pose(hand: &Hand) -> StaticLabel {
    let orientation = detect_orientation(Some(hand));
    let ext = hand.extension();
    let thumb_to = |idx: usize| hand.span(THUMB_TIP, idx);

    let label = if ext.none_of_four() {
        closed_fist(hand, ext.thumb)
    } else if ext.index && !ext.middle && !ext.ring && !ext.pinky {
        index_only(hand, ext.thumb, orientation)
    } else if ext.index && ext.middle && !ext.ring && !ext.pinky {
        index_middle(hand, orientation)
    } else if ext.index && ext.middle && ext.ring && !ext.pinky {
        Some(Letter::W)
    } else if !ext.index && !ext.middle && !ext.ring && ext.pinky {
        Some(if ext.thumb { Letter::Y } else { Letter::I })
    } else if !ext.index && ext.middle && ext.ring && ext.pinky {
        Some(Letter::F)
    } else if ext.all_four() {
        let thumb_index = thumb_to(INDEX_TIP);
        if thumb_index < O_CIRCLE && thumb_to(MIDDLE_TIP) < O_CIRCLE {
            Some(Letter::O)
        } else if thumb_index > C_GAP_MIN && thumb_index < C_GAP_MAX {
            Some(Letter::C)
        } else {
            Some(Letter::B)
        }
    } else if ext.middle && ext.ring && ext.pinky && thumb_to(INDEX_TIP) < F_CIRCLE {
        // unreachable: both index states are taken by the F and open-hand groups
        Some(Letter::F)
    } else {
        None
    };

    debug!("pose: {ext:?} orientation={orientation} -> {label:?}");
    label.map_or(StaticLabel::None, StaticLabel::Letter)
}

fn closed_fist(hand: &Hand, thumb_out: bool) -> Option<Letter> {
    let near = |idx: usize| hand.span(THUMB_TIP, idx) < FIST_CONTACT;
    let letter = if thumb_out {
        Letter::A
    } else if near(INDEX_PIP) || near(INDEX_MCP) {
        Letter::T
    } else if near(MIDDLE_PIP) || near(MIDDLE_MCP) {
        Letter::N
    } else if near(RING_PIP) || near(PINKY_PIP) {
        Letter::M
    } else if near(INDEX_DIP) {
        Letter::S
    } else {
        Letter::E
    };
    Some(letter)
}

fn index_only(hand: &Hand, thumb_out: bool, orientation: Orientation) -> Option<Letter> {
    // Q sits behind the unconditional thumb-out L and never fires; kept in
    // place until the intended D/Z/Q/G split is settled.
    let letter = if thumb_out && orientation == Orientation::Side {
        Letter::G
    } else if thumb_out {
        Letter::L
    } else if orientation == Orientation::Down && thumb_out {
        Letter::Q
    } else if orientation == Orientation::Down {
        Letter::Z
    } else if orientation == Orientation::Side {
        Letter::G
    } else if hand.span(INDEX_TIP, INDEX_PIP) < X_HOOK {
        Letter::X
    } else {
        Letter::D
    };
    Some(letter)
}

fn index_middle(hand: &Hand, orientation: Orientation) -> Option<Letter> {
    let letter = match orientation {
        Orientation::Down => Letter::P,
        Orientation::Side => Letter::H,
        _ if hand.span(INDEX_TIP, MIDDLE_TIP) < U_TIPS_TOGETHER => Letter::U,
        _ if hand.span(THUMB_TIP, MIDDLE_PIP) < K_THUMB_ON_MIDDLE => Letter::K,
        _ => Letter::V,
    };
    Some(letter)
}
