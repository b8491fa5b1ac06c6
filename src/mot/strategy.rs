use log::info;
use serde::{Deserialize, Serialize};

use crate::mot::detection::{Detection, FrameRange, TrackedRow};
use crate::mot::kalman_tracker::{KalmanTrackerConfig, MultiObjectKalmanTracker};
use crate::mot::mot_errors::TrackerError;
use crate::mot::track_features::enrich;
use crate::mot::vicinity_tracker::{VicinityTracker, VicinityTrackerConfig};
use crate::utils::Point;

/// Common contract of tracking strategies: identities for every detection in a frame range.
///
/// Implementations:
/// - `KalmanStrategy` - motion model per track, see [`MultiObjectKalmanTracker`]
/// - `VicinityStrategy` - no motion model, see [`VicinityTracker`]
pub trait TrackingStrategy: Send {
    /// Resets internal state. Call before tracking another video
    fn initialize(&mut self);
    /// Tracks frames `range.start..range.end` of `frames` (indexed by frame number).
    /// Returns one enriched row per detection, ordered by frame, then identity.
    fn track(
        &mut self,
        frames: &[Vec<Detection>],
        range: FrameRange,
    ) -> Result<Vec<TrackedRow>, TrackerError>;
}

fn positions(detections: &[Detection]) -> Vec<Point> {
    detections.iter().map(|d| d.position).collect()
}

pub struct KalmanStrategy {
    tracker: MultiObjectKalmanTracker,
}

impl KalmanStrategy {
    pub fn new(config: KalmanTrackerConfig) -> Self {
        KalmanStrategy {
            tracker: MultiObjectKalmanTracker::new(config),
        }
    }
    pub fn get_tracker(&self) -> &MultiObjectKalmanTracker {
        &self.tracker
    }
}

impl Default for KalmanStrategy {
    fn default() -> Self {
        KalmanStrategy::new(KalmanTrackerConfig::long_running())
    }
}

impl TrackingStrategy for KalmanStrategy {
    fn initialize(&mut self) {
        self.tracker.initialize();
    }
    fn track(
        &mut self,
        frames: &[Vec<Detection>],
        range: FrameRange,
    ) -> Result<Vec<TrackedRow>, TrackerError> {
        let (start, end) = range.resolve(frames.len())?;
        info!("Kalman tracking. Frame start: {}, Frame end: {}", start, end);
        let mut rows = Vec::with_capacity(frames[start..end].iter().map(Vec::len).sum());
        for (frame, detections) in frames.iter().enumerate().take(end).skip(start) {
            let assignments = self.tracker.update(frame, &positions(detections))?;
            for (detection, assignment) in detections.iter().zip(assignments) {
                let mut row = TrackedRow::new(frame, detection.clone());
                if let Some(assignment) = assignment {
                    row.id = Some(assignment.id);
                    row.nb_predictions = Some(assignment.nb_predictions);
                    row.filter_state = Some(assignment.state);
                }
                rows.push(row);
            }
        }
        Ok(enrich(rows))
    }
}

#[derive(Default)]
pub struct VicinityStrategy {
    tracker: VicinityTracker,
}

impl VicinityStrategy {
    pub fn new(config: VicinityTrackerConfig) -> Self {
        VicinityStrategy {
            tracker: VicinityTracker::new(config),
        }
    }
    pub fn get_tracker(&self) -> &VicinityTracker {
        &self.tracker
    }
}

impl TrackingStrategy for VicinityStrategy {
    fn initialize(&mut self) {
        self.tracker.initialize();
    }
    fn track(
        &mut self,
        frames: &[Vec<Detection>],
        range: FrameRange,
    ) -> Result<Vec<TrackedRow>, TrackerError> {
        let (start, end) = range.resolve(frames.len())?;
        info!("Vicinity tracking. Frame start: {}, Frame end: {}", start, end);
        let window = &frames[start..end];
        let frame_positions: Vec<Vec<Point>> = window.iter().map(|f| positions(f)).collect();
        let assignments = self.tracker.assign_ids(&frame_positions);
        let mut rows = Vec::with_capacity(frame_positions.iter().map(Vec::len).sum());
        for (offset, (detections, frame_assignments)) in
            window.iter().zip(assignments).enumerate()
        {
            for (detection, assignment) in detections.iter().zip(frame_assignments) {
                let mut row = TrackedRow::new(start + offset, detection.clone());
                row.id = Some(assignment.id);
                row.found_after = Some(assignment.found_after);
                rows.push(row);
            }
        }
        Ok(enrich(rows))
    }
}

/// Strategy selection, e.g. `{"strategy": "vicinity", "max_dist": 30.0}`.
/// Omitted fields take the defaults of the strategy's tracker config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyConfig {
    Kalman(KalmanTrackerConfig),
    Vicinity(VicinityTrackerConfig),
}

impl StrategyConfig {
    pub fn from_json(json: &str) -> Result<Self, TrackerError> {
        Ok(serde_json::from_str(json)?)
    }
    pub fn build(&self) -> Result<Box<dyn TrackingStrategy>, TrackerError> {
        match self {
            StrategyConfig::Kalman(config) => {
                config.validate()?;
                Ok(Box::new(KalmanStrategy::new(*config)))
            }
            StrategyConfig::Vicinity(config) => {
                config.validate()?;
                Ok(Box::new(VicinityStrategy::new(*config)))
            }
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::Kalman(KalmanTrackerConfig::long_running())
    }
}
