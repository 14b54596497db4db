//! One recognition session: owns its own motion history and frame buffer.

use log::{debug, info};
use serde::Serialize;

use crate::buffer::GestureBuffer;
use crate::classifier::{StaticClassifier, StaticLabel, classify_pose};
use crate::config::SessionSettings;
use crate::landmarks::Frame;
use crate::matcher::{CompoundGesture, DynamicMatcher};
use crate::motion::MotionHistory;
use crate::orientation::{Orientation, detect_orientation};

/// Everything recognized for one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub tick: u64,
    pub hands: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub letters: Vec<StaticLabel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orientations: Vec<Orientation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gesture: Option<CompoundGesture>,
}

pub struct Session {
    settings: SessionSettings,
    classifier: StaticClassifier,
    buffer: GestureBuffer,
    matcher: DynamicMatcher,
    tick: u64,
}

impl Session {
    pub fn new(settings: SessionSettings) -> Self {
        Self::with_matcher(settings, DynamicMatcher::new())
    }

    pub fn with_matcher(settings: SessionSettings, matcher: DynamicMatcher) -> Self {
        info!(
            "session: buffer={} history={} static={} dynamic={}",
            settings.buffer_capacity,
            settings.history_capacity,
            settings.static_poses,
            settings.dynamic_gestures
        );
        Self {
            classifier: StaticClassifier::new(MotionHistory::new(settings.history_capacity)),
            buffer: GestureBuffer::new(settings.buffer_capacity),
            matcher,
            settings,
            tick: 0,
        }
    }

    pub fn buffer(&self) -> &GestureBuffer {
        &self.buffer
    }

    pub fn classifier(&self) -> &StaticClassifier {
        &self.classifier
    }

    /// Runs one tick through both paths.
    pub fn process(&mut self, frame: Frame) -> FrameReport {
        let tick = self.tick;
        self.tick += 1;

        let mut letters = Vec::new();
        let mut orientations = Vec::new();
        if self.settings.static_poses {
            // one hand feeds the shake history, picked by wrist proximity
            // since hand order is not stable; the rest are shape only
            let tracked = self.classifier.history().closest_hand(&frame.hands);
            for (i, hand) in frame.hands.iter().enumerate() {
                let label = if Some(i) == tracked {
                    self.classifier.classify(Some(hand))
                } else {
                    classify_pose(hand)
                };
                letters.push(label);
                orientations.push(detect_orientation(Some(hand)));
            }
        }

        let hands = frame.hands.len();
        let gesture = if self.settings.dynamic_gestures {
            self.buffer.add(frame);
            self.matcher.detect(&self.buffer)
        } else {
            None
        };

        debug!("tick {tick}: hands={hands} letters={letters:?} gesture={gesture:?}");
        FrameReport {
            tick,
            hands,
            letters,
            orientations,
            gesture,
        }
    }

    /// Ends the session: drops buffered frames and the shake history.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.classifier.reset();
        self.tick = 0;
        info!("session: reset");
    }
}
