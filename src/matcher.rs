//! Multi-frame compound gesture matching over a `GestureBuffer`.
//!
//! Detectors run in a fixed priority order and the first match wins.
//! They only read the buffer.

use log::debug;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

use crate::buffer::GestureBuffer;
use crate::landmarks::{
    Frame, Hand, INDEX_MCP, INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP, PINKY_MCP, PINKY_TIP, RING_MCP,
    RING_TIP, THUMB_TIP,
};

/// Below this many buffered frames nothing is matched.
pub const MIN_FRAMES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompoundGesture {
    Hello,
    Yes,
    No,
    Help,
    Time,
}

impl CompoundGesture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hello => "HELLO",
            Self::Yes => "YES",
            Self::No => "NO",
            Self::Help => "HELP",
            Self::Time => "TIME",
        }
    }
}

impl fmt::Display for CompoundGesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Hand selection ─────────────────────────────────────────

/// Picks which hand of a frame stands in for "the" tracked hand. Frames
/// carry no hand identity, so this is an approximation.
pub trait HandSelector {
    fn select<'a>(&self, frame: &'a Frame, pred: &dyn Fn(&Hand) -> bool) -> Option<&'a Hand>;
}

/// First qualifying hand in detector order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatch;

impl HandSelector for FirstMatch {
    fn select<'a>(&self, frame: &'a Frame, pred: &dyn Fn(&Hand) -> bool) -> Option<&'a Hand> {
        frame.hands.iter().find(|h| pred(h))
    }
}

// ── Detector chain ─────────────────────────────────────────

pub trait PatternDetector {
    fn label(&self) -> CompoundGesture;
    fn matches(&self, frames: &VecDeque<Frame>, selector: &dyn HandSelector) -> bool;
}

pub struct DynamicMatcher {
    detectors: Vec<Box<dyn PatternDetector>>,
    selector: Box<dyn HandSelector>,
}

impl Default for DynamicMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicMatcher {
    /// The five built-in detectors in priority order.
    pub fn new() -> Self {
        Self {
            detectors: vec![
                Box::new(Wave),
                Box::new(Nod),
                Box::new(Tap),
                Box::new(Lift),
                Box::new(WristTouch),
            ],
            selector: Box::new(FirstMatch),
        }
    }

    pub fn with_selector(mut self, selector: impl HandSelector + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    /// Appends a detector after the existing ones.
    pub fn with_detector(mut self, detector: impl PatternDetector + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    pub fn labels(&self) -> Vec<CompoundGesture> {
        self.detectors.iter().map(|d| d.label()).collect()
    }

    pub fn detect(&self, buffer: &GestureBuffer) -> Option<CompoundGesture> {
        let frames = buffer.get();
        if frames.len() < MIN_FRAMES {
            return None;
        }
        let hit = self
            .detectors
            .iter()
            .find(|d| d.matches(frames, self.selector.as_ref()))
            .map(|d| d.label());
        if let Some(g) = hit {
            debug!("matched {g} over {} frames", frames.len());
        }
        hit
    }
}

// ── Hand shape predicates ──────────────────────────────────

/// Every fingertip above its MCP. Cheaper and looser than `extension()`.
fn is_open(hand: &Hand) -> bool {
    [
        (INDEX_TIP, INDEX_MCP),
        (MIDDLE_TIP, MIDDLE_MCP),
        (RING_TIP, RING_MCP),
        (PINKY_TIP, PINKY_MCP),
    ]
    .iter()
    .all(|&(tip, mcp)| hand.point(tip).y < hand.point(mcp).y)
}

fn is_y_shape(hand: &Hand) -> bool {
    let e = hand.extension();
    e.thumb && e.pinky && !e.index && !e.middle && !e.ring
}

fn is_fist(hand: &Hand) -> bool {
    hand.extension().none_of_four()
}

fn is_flat(hand: &Hand) -> bool {
    hand.extension().all_four()
}

fn is_pointing(hand: &Hand) -> bool {
    let e = hand.extension();
    e.index && !e.middle && !e.ring && !e.pinky
}

// ── Series helpers ─────────────────────────────────────────

fn tail(frames: &VecDeque<Frame>, n: usize) -> impl Iterator<Item = &Frame> {
    frames.iter().skip(frames.len().saturating_sub(n))
}

/// Counts direction flips, ignoring steps no larger than `eps`.
fn reversals(series: &[f64], eps: f64) -> usize {
    let mut count = 0;
    let mut last_dir = 0.0;
    for pair in series.windows(2) {
        let delta = pair[1] - pair[0];
        if delta.abs() <= eps {
            continue;
        }
        let dir = delta.signum();
        if last_dir != 0.0 && dir != last_dir {
            count += 1;
        }
        last_dir = dir;
    }
    count
}

fn range(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let max = series.iter().copied().fold(f64::MIN, f64::max);
    let min = series.iter().copied().fold(f64::MAX, f64::min);
    max - min
}

// ── HELLO: open hand waved side to side ────────────────────

const WAVE_WINDOW: usize = 20;
const WAVE_OPEN_RATIO: f64 = 0.7;
const WAVE_MIN_SAMPLES: usize = 10;
const WAVE_MIN_RANGE: f64 = 0.1;

const STEP_EPS: f64 = 0.005;
const MIN_REVERSALS: usize = 2;

struct Wave;

impl PatternDetector for Wave {
    fn label(&self) -> CompoundGesture {
        CompoundGesture::Hello
    }

    fn matches(&self, frames: &VecDeque<Frame>, selector: &dyn HandSelector) -> bool {
        let window: Vec<&Frame> = tail(frames, WAVE_WINDOW).collect();
        let open_frames = window
            .iter()
            .filter(|f| f.hands.iter().any(is_open))
            .count();
        if (open_frames as f64) < WAVE_OPEN_RATIO * window.len() as f64 {
            return false;
        }

        let xs: Vec<f64> = window
            .iter()
            .filter_map(|f| selector.select(f, &is_open))
            .map(|h| h.wrist().x)
            .collect();
        if xs.len() < WAVE_MIN_SAMPLES {
            return false;
        }
        reversals(&xs, STEP_EPS) >= MIN_REVERSALS && range(&xs) > WAVE_MIN_RANGE
    }
}

// ── YES: Y-shaped hand nodding ─────────────────────────────

const NOD_WINDOW: usize = 15;
const NOD_MIN_SAMPLES: usize = 9;
const NOD_MIN_RANGE: f64 = 0.1;
const NOD_VERTICAL_RATIO: f64 = 1.5;

struct Nod;

impl PatternDetector for Nod {
    fn label(&self) -> CompoundGesture {
        CompoundGesture::Yes
    }

    fn matches(&self, frames: &VecDeque<Frame>, selector: &dyn HandSelector) -> bool {
        let Some(current) = frames.back() else {
            return false;
        };
        if !current.hands.iter().any(is_y_shape) {
            return false;
        }

        let (xs, ys): (Vec<f64>, Vec<f64>) = tail(frames, NOD_WINDOW)
            .filter_map(|f| selector.select(f, &is_y_shape))
            .map(|h| (h.wrist().x, h.wrist().y))
            .unzip();
        if ys.len() < NOD_MIN_SAMPLES {
            return false;
        }
        let y_range = range(&ys);
        reversals(&ys, STEP_EPS) >= MIN_REVERSALS
            && y_range > NOD_MIN_RANGE
            && y_range > NOD_VERTICAL_RATIO * range(&xs)
    }
}

// ── NO: thumb snaps shut on index + middle ─────────────────

const TAP_CLOSED: f64 = 0.05;
const TAP_OPENED: f64 = 0.1;
/// Open pose is searched in frames `len-15 .. len-5`.
const TAP_LOOKBACK_FAR: usize = 15;
const TAP_LOOKBACK_NEAR: usize = 5;

struct Tap;

fn tap_closed(hand: &Hand) -> bool {
    hand.span(THUMB_TIP, INDEX_TIP) < TAP_CLOSED && hand.span(THUMB_TIP, MIDDLE_TIP) < TAP_CLOSED
}

fn tap_opened(hand: &Hand) -> bool {
    hand.span(THUMB_TIP, INDEX_TIP) > TAP_OPENED && hand.span(THUMB_TIP, MIDDLE_TIP) > TAP_OPENED
}

impl PatternDetector for Tap {
    fn label(&self) -> CompoundGesture {
        CompoundGesture::No
    }

    fn matches(&self, frames: &VecDeque<Frame>, selector: &dyn HandSelector) -> bool {
        let Some(current) = frames.back() else {
            return false;
        };
        if !current.hands.iter().any(tap_closed) {
            return false;
        }
        let start = frames.len().saturating_sub(TAP_LOOKBACK_FAR);
        let end = frames.len().saturating_sub(TAP_LOOKBACK_NEAR);
        frames
            .range(start..end)
            .any(|f| selector.select(f, &tap_opened).is_some())
    }
}

// ── HELP: fist resting on flat palm, both lifted ───────────

const LIFT_CONTACT: f64 = 0.15;
const LIFT_WINDOW: usize = 10;
const LIFT_MIN_SAMPLES: usize = 5;
const LIFT_MIN_RISE: f64 = 0.1;
/// Height used for a frame with no hands at all.
const NO_HANDS_Y: f64 = 1.0;

struct Lift;

fn fist_on_palm(frame: &Frame) -> impl Iterator<Item = (&Hand, &Hand)> {
    frame.hands.iter().enumerate().flat_map(move |(i, fist)| {
        frame
            .hands
            .iter()
            .enumerate()
            .filter(move |&(j, flat)| i != j && is_fist(fist) && is_flat(flat))
            .map(move |(_, flat)| (fist, flat))
    })
}

fn mean_height(frame: &Frame) -> f64 {
    if let Some((fist, flat)) = fist_on_palm(frame).next() {
        return (fist.wrist().y + flat.wrist().y) / 2.0;
    }
    if frame.hands.is_empty() {
        return NO_HANDS_Y;
    }
    frame.hands.iter().map(|h| h.wrist().y).sum::<f64>() / frame.hands.len() as f64
}

impl PatternDetector for Lift {
    fn label(&self) -> CompoundGesture {
        CompoundGesture::Help
    }

    fn matches(&self, frames: &VecDeque<Frame>, _selector: &dyn HandSelector) -> bool {
        let Some(current) = frames.back() else {
            return false;
        };
        let resting = fist_on_palm(current)
            .any(|(fist, flat)| fist.wrist().distance(flat.point(MIDDLE_MCP)) < LIFT_CONTACT);
        if !resting {
            return false;
        }

        let heights: Vec<f64> = tail(frames, LIFT_WINDOW).map(mean_height).collect();
        match (heights.first(), heights.last()) {
            (Some(first), Some(last)) if heights.len() >= LIFT_MIN_SAMPLES => {
                first - last > LIFT_MIN_RISE
            }
            _ => false,
        }
    }
}

// ── TIME: index finger taps the other wrist ────────────────

const TOUCH_REACH: f64 = 0.1;

struct WristTouch;

impl PatternDetector for WristTouch {
    fn label(&self) -> CompoundGesture {
        CompoundGesture::Time
    }

    fn matches(&self, frames: &VecDeque<Frame>, _selector: &dyn HandSelector) -> bool {
        let Some(current) = frames.back() else {
            return false;
        };
        let hands = &current.hands;
        hands.iter().enumerate().any(|(i, pointer)| {
            is_pointing(pointer)
                && hands.iter().enumerate().any(|(j, target)| {
                    i != j && pointer.point(INDEX_TIP).distance(target.wrist()) < TOUCH_REACH
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use std::f64::consts::PI;

    fn buffer_of(frames: Vec<Frame>) -> GestureBuffer {
        let mut buf = GestureBuffer::new(30);
        for f in frames {
            buf.add(f);
        }
        buf
    }

    fn detect(frames: Vec<Frame>) -> Option<CompoundGesture> {
        DynamicMatcher::new().detect(&buffer_of(frames))
    }

    fn wave(amplitude: f64) -> Vec<Frame> {
        wave_over(20, amplitude)
    }

    fn wave_over(frames: usize, amplitude: f64) -> Vec<Frame> {
        (0..frames)
            .map(|t| {
                let x = 0.5 + amplitude * (2.0 * PI * t as f64 / 6.0).sin();
                frame(vec![wrist_at(&open_hand(), x, 0.8)])
            })
            .collect()
    }

    fn touching_time() -> Frame {
        let target = wrist_at(&fist(), 0.45, 0.40);
        frame(vec![target, pointing()])
    }

    #[test]
    fn reversal_counting() {
        assert_eq!(reversals(&[0.0, 0.1, 0.0, 0.1], STEP_EPS), 2);
        assert_eq!(reversals(&[0.0, 0.1, 0.1, 0.2], STEP_EPS), 0);
        // jitter below the step threshold does not reset direction
        assert_eq!(reversals(&[0.0, 0.1, 0.098, 0.2, 0.1], STEP_EPS), 1);
        assert_eq!(range(&[]), 0.0);
    }

    #[test]
    fn needs_five_frames() {
        for n in 0..MIN_FRAMES {
            let frames = (0..n).map(|_| touching_time()).collect();
            assert_eq!(detect(frames), None, "{n} frames");
        }
        let frames = (0..MIN_FRAMES).map(|_| touching_time()).collect();
        assert_eq!(detect(frames), Some(CompoundGesture::Time));
    }

    #[test]
    fn wide_wave_is_hello() {
        assert_eq!(detect(wave(0.15)), Some(CompoundGesture::Hello));
    }

    #[test]
    fn narrow_wave_fails_range_gate() {
        assert_eq!(detect(wave(0.05)), None);
    }

    #[test]
    fn mostly_closed_hands_do_not_wave() {
        let mut frames = wave(0.15);
        for f in frames.iter_mut().step_by(3) {
            f.hands = vec![fist()];
        }
        // 7 of 20 frames closed leaves 65% open
        assert_eq!(detect(frames), None);
    }

    #[test]
    fn y_nod_is_yes() {
        assert_eq!(detect(nod_over(15)), Some(CompoundGesture::Yes));
    }

    fn nod_over(frames: usize) -> Vec<Frame> {
        (0..frames)
            .map(|t| {
                let y = 0.6 + 0.08 * (2.0 * PI * t as f64 / 6.0).sin();
                frame(vec![wrist_at(&y_shape(), 0.5, y)])
            })
            .collect()
    }

    #[test]
    fn wave_needs_ten_open_samples() {
        assert_eq!(detect(wave_over(9, 0.15)), None);
        assert_eq!(detect(wave_over(10, 0.15)), Some(CompoundGesture::Hello));
    }

    #[test]
    fn nod_needs_nine_y_samples() {
        assert_eq!(detect(nod_over(8)), None);
        assert_eq!(detect(nod_over(9)), Some(CompoundGesture::Yes));
    }

    #[test]
    fn y_moving_sideways_is_not_yes() {
        let frames = (0..15)
            .map(|t| {
                let s = (2.0 * PI * t as f64 / 6.0).sin();
                frame(vec![wrist_at(&y_shape(), 0.5 + 0.2 * s, 0.6 + 0.08 * s)])
            })
            .collect();
        assert_eq!(detect(frames), None);
    }

    #[test]
    fn open_then_pinch_is_no() {
        let mut frames: Vec<Frame> = (0..10).map(|_| frame(vec![open_hand()])).collect();
        frames.extend((0..6).map(|_| frame(vec![tap_pose()])));
        assert_eq!(detect(frames), Some(CompoundGesture::No));
    }

    #[test]
    fn pinch_without_opening_is_not_no() {
        let frames = (0..16).map(|_| frame(vec![tap_pose()])).collect();
        assert_eq!(detect(frames), None);
    }

    #[test]
    fn opening_too_recent_is_not_no() {
        // open frames only inside the last five
        let mut frames: Vec<Frame> = (0..12).map(|_| frame(vec![tap_pose()])).collect();
        frames.extend((0..3).map(|_| frame(vec![open_hand()])));
        frames.push(frame(vec![tap_pose()]));
        assert_eq!(detect(frames), None);
    }

    fn lifting(rise_per_frame: f64) -> Vec<Frame> {
        (0..10)
            .map(|k| {
                let fy = 0.6 - rise_per_frame * k as f64;
                let fist = wrist_at(&fist(), 0.5, fy);
                let flat = wrist_at(&open_hand(), 0.5, fy + 0.2);
                frame(vec![fist, flat])
            })
            .collect()
    }

    #[test]
    fn fist_on_palm_lifted_is_help() {
        assert_eq!(detect(lifting(0.02)), Some(CompoundGesture::Help));
    }

    #[test]
    fn fist_on_palm_held_still_is_not_help() {
        assert_eq!(detect(lifting(0.0)), None);
    }

    #[test]
    fn handless_current_frame_is_not_help() {
        let mut frames = lifting(0.02);
        frames.push(Frame::default());
        assert_eq!(detect(frames), None);
        assert_eq!(mean_height(&Frame::default()), NO_HANDS_Y);
    }

    #[test]
    fn pointer_on_wrist_is_time() {
        let frames = (0..5).map(|_| touching_time()).collect();
        assert_eq!(detect(frames), Some(CompoundGesture::Time));
    }

    #[test]
    fn pointer_far_from_wrist_is_not_time() {
        let far = frame(vec![wrist_at(&fist(), 0.9, 0.9), pointing()]);
        let frames = (0..5).map(|_| far.clone()).collect();
        assert_eq!(detect(frames), None);
    }

    #[test]
    fn detection_is_read_only_and_repeatable() {
        let buf = buffer_of(wave(0.15));
        let matcher = DynamicMatcher::new();
        assert_eq!(matcher.detect(&buf), matcher.detect(&buf));
        assert_eq!(buf.len(), 20);
    }

    struct Always(CompoundGesture);

    impl PatternDetector for Always {
        fn label(&self) -> CompoundGesture {
            self.0
        }
        fn matches(&self, _: &VecDeque<Frame>, _: &dyn HandSelector) -> bool {
            true
        }
    }

    #[test]
    fn earlier_detectors_mask_later_ones() {
        let matcher = DynamicMatcher::new().with_detector(Always(CompoundGesture::Time));
        assert_eq!(matcher.labels().len(), 6);

        let idle = (0..5).map(|_| Frame::default()).collect();
        assert_eq!(matcher.detect(&buffer_of(idle)), Some(CompoundGesture::Time));
        assert_eq!(
            matcher.detect(&buffer_of(wave(0.15))),
            Some(CompoundGesture::Hello)
        );
    }

    struct LastMatch;

    impl HandSelector for LastMatch {
        fn select<'a>(&self, frame: &'a Frame, pred: &dyn Fn(&Hand) -> bool) -> Option<&'a Hand> {
            frame.hands.iter().rev().find(|h| pred(h))
        }
    }

    #[test]
    fn selector_decides_which_hand_is_tracked() {
        // a still open hand listed before the waving one
        let frames: Vec<Frame> = wave(0.15)
            .into_iter()
            .map(|mut f| {
                f.hands.insert(0, wrist_at(&open_hand(), 0.2, 0.8));
                f
            })
            .collect();

        assert_eq!(detect(frames.clone()), None);
        let matcher = DynamicMatcher::new().with_selector(LastMatch);
        assert_eq!(
            matcher.detect(&buffer_of(frames)),
            Some(CompoundGesture::Hello)
        );
    }
}
