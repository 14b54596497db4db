//! Rolling window of recent frames for the dynamic matcher.

use std::collections::VecDeque;

use crate::landmarks::Frame;

pub const DEFAULT_BUFFER_CAPACITY: usize = 30;

/// FIFO of frames, oldest first. Never holds more than `capacity`.
#[derive(Debug, Clone)]
pub struct GestureBuffer {
    frames: VecDeque<Frame>,
    capacity: usize,
}

impl Default for GestureBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

impl GestureBuffer {
    /// A capacity of 0 is raised to 1 so the latest frame is always kept.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn add(&mut self, frame: Frame) {
        while self.frames.len() >= self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    /// Current frames, most recent last.
    pub fn get(&self) -> &VecDeque<Frame> {
        &self.frames
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
