//! Synthetic hand geometry for tests. Wrist sits at (0.5, 0.8), fingers
//! point toward the top of the image.

use crate::landmarks::{Frame, Hand, Landmark, THUMB_TIP, WRIST};

type Chain = [(f64, f64); 4];

const WRIST_AT: (f64, f64) = (0.5, 0.8);

pub const THUMB_OUT: Chain = [(0.42, 0.75), (0.36, 0.70), (0.30, 0.66), (0.25, 0.62)];
pub const THUMB_TUCKED: Chain = [(0.42, 0.76), (0.36, 0.72), (0.30, 0.68), (0.47, 0.72)];

pub const INDEX_UP: Chain = [(0.44, 0.60), (0.43, 0.50), (0.43, 0.44), (0.43, 0.38)];
pub const MIDDLE_UP: Chain = [(0.50, 0.58), (0.50, 0.47), (0.50, 0.41), (0.50, 0.35)];
pub const RING_UP: Chain = [(0.56, 0.60), (0.57, 0.50), (0.57, 0.44), (0.57, 0.39)];
pub const PINKY_UP: Chain = [(0.61, 0.63), (0.63, 0.55), (0.64, 0.50), (0.65, 0.46)];

pub const INDEX_CURLED: Chain = [(0.44, 0.60), (0.44, 0.50), (0.38, 0.58), (0.40, 0.66)];
pub const MIDDLE_CURLED: Chain = [(0.50, 0.58), (0.50, 0.50), (0.50, 0.56), (0.50, 0.62)];
pub const RING_CURLED: Chain = [(0.56, 0.60), (0.57, 0.52), (0.56, 0.58), (0.55, 0.63)];
pub const PINKY_CURLED: Chain = [(0.61, 0.63), (0.63, 0.57), (0.62, 0.61), (0.61, 0.65)];

pub fn build(thumb: Chain, index: Chain, middle: Chain, ring: Chain, pinky: Chain) -> Hand {
    let mut pts = vec![Landmark::new(WRIST_AT.0, WRIST_AT.1, 0.0)];
    for chain in [thumb, index, middle, ring, pinky] {
        pts.extend(chain.iter().map(|&(x, y)| Landmark::new(x, y, 0.0)));
    }
    Hand::new(pts).expect("fixture hands have 21 points")
}

/// Flat open palm, thumb spread wide.
pub fn open_hand() -> Hand {
    build(THUMB_OUT, INDEX_UP, MIDDLE_UP, RING_UP, PINKY_UP)
}

/// All four fingers curled, thumb tucked away from every joint.
pub fn fist() -> Hand {
    build(THUMB_TUCKED, INDEX_CURLED, MIDDLE_CURLED, RING_CURLED, PINKY_CURLED)
}

/// Index extended, everything else curled.
pub fn pointing() -> Hand {
    build(THUMB_TUCKED, INDEX_UP, MIDDLE_CURLED, RING_CURLED, PINKY_CURLED)
}

/// Thumb and pinky out.
pub fn y_shape() -> Hand {
    build(THUMB_OUT, INDEX_CURLED, MIDDLE_CURLED, RING_CURLED, PINKY_UP)
}

/// Open hand with the thumb tip pinched between index and middle tips.
pub fn tap_pose() -> Hand {
    with_point(&open_hand(), THUMB_TIP, 0.465, 0.365)
}

pub fn with_point(hand: &Hand, idx: usize, x: f64, y: f64) -> Hand {
    let mut pts = hand.points().to_vec();
    pts[idx] = Landmark::new(x, y, pts[idx].z);
    Hand::new(pts).expect("fixture hands have 21 points")
}

pub fn translated(hand: &Hand, dx: f64, dy: f64) -> Hand {
    let pts = hand
        .points()
        .iter()
        .map(|p| Landmark::new(p.x + dx, p.y + dy, p.z))
        .collect();
    Hand::new(pts).expect("fixture hands have 21 points")
}

/// Moves the whole hand so the wrist lands on `(x, y)`.
pub fn wrist_at(hand: &Hand, x: f64, y: f64) -> Hand {
    let w = hand.point(WRIST);
    translated(hand, x - w.x, y - w.y)
}

pub fn frame(hands: Vec<Hand>) -> Frame {
    Frame::new(hands)
}
