//! Vertical wrist oscillation ("shake") tracking.

use log::debug;
use std::collections::VecDeque;

use crate::landmarks::{Hand, Landmark};

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Per-frame vertical wrist travel below this is treated as stillness.
const MOVE_EPS: f64 = 0.02;
/// History must hold more than this many directions before it is scanned.
const MIN_SAMPLES: usize = 6;
const MIN_SIGN_CHANGES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Rolling record of vertical wrist directions for one session.
#[derive(Debug, Clone)]
pub struct MotionHistory {
    directions: VecDeque<Direction>,
    capacity: usize,
    prev_wrist: Option<Landmark>,
}

impl Default for MotionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl MotionHistory {
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            directions: VecDeque::with_capacity(capacity),
            capacity,
            prev_wrist: None,
        }
    }

    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Index of the hand whose wrist is closest to the last observed one,
    /// or the first hand when nothing has been observed yet.
    pub fn closest_hand(&self, hands: &[Hand]) -> Option<usize> {
        let Some(prev) = self.prev_wrist else {
            return if hands.is_empty() { None } else { Some(0) };
        };
        hands
            .iter()
            .map(|h| h.wrist().distance(&prev))
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    pub fn directions(&self) -> impl Iterator<Item = Direction> + '_ {
        self.directions.iter().copied()
    }

    /// Feeds one frame's hand. Returns true when a shake fires; the
    /// direction history is cleared in that case. The wrist is always
    /// kept as the previous position for the next call.
    pub fn observe(&mut self, hand: &Hand) -> bool {
        let wrist = *hand.wrist();
        if let Some(prev) = self.prev_wrist.replace(wrist) {
            let dy = wrist.y - prev.y;
            let dir = if dy < -MOVE_EPS {
                Some(Direction::Up)
            } else if dy > MOVE_EPS {
                Some(Direction::Down)
            } else {
                None
            };
            if let Some(dir) = dir {
                if self.directions.len() == self.capacity {
                    self.directions.pop_front();
                }
                self.directions.push_back(dir);
            }
        }

        if self.directions.len() > MIN_SAMPLES {
            let changes = self.sign_changes();
            if changes >= MIN_SIGN_CHANGES {
                debug!("shake: {changes} direction changes over {} samples", self.len());
                self.directions.clear();
                return true;
            }
        }
        false
    }

    fn sign_changes(&self) -> usize {
        self.directions
            .iter()
            .zip(self.directions.iter().skip(1))
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Forgets both the direction history and the previous wrist.
    pub fn reset(&mut self) {
        self.directions.clear();
        self.prev_wrist = None;
    }
}
