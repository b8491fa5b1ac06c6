use log::debug;
use serde::{Deserialize, Serialize};

use crate::mot::assignment::match_positions;
use crate::mot::kalman_track::{FilterState, KalmanModel, KalmanParams, KalmanTrack};
use crate::mot::mot_errors::{FrameOutOfOrder, TrackerError};
use crate::utils::Point;

/// Settings of [`MultiObjectKalmanTracker`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanTrackerConfig {
    /// Max number of frames a track survives without a match. Default is 1
    pub max_age: usize,
    /// Consecutive matches before a track's identity is reported. Default is 3
    pub min_hits: usize,
    /// Max distance between predicted position and detection (pixels). Default is 50.0
    pub distance_threshold: f64,
    pub kalman: KalmanParams,
}

impl Default for KalmanTrackerConfig {
    fn default() -> Self {
        KalmanTrackerConfig {
            max_age: 1,
            min_hits: 3,
            distance_threshold: 50.0,
            kalman: KalmanParams::default(),
        }
    }
}

impl KalmanTrackerConfig {
    /// Settings for whole-video tracking: tracks survive 15 missed frames and are reported right away
    pub fn long_running() -> Self {
        KalmanTrackerConfig {
            max_age: 15,
            min_hits: 0,
            ..KalmanTrackerConfig::default()
        }
    }
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !(self.distance_threshold > 0.0) {
            return Err(TrackerError::BadConfig(format!(
                "distance_threshold must be positive, got {}",
                self.distance_threshold
            )));
        }
        if !(self.kalman.observation_noise > 0.0) {
            return Err(TrackerError::BadConfig(format!(
                "observation_noise must be positive, got {}",
                self.kalman.observation_noise
            )));
        }
        if !(self.kalman.process_noise_var >= 0.0) {
            return Err(TrackerError::BadConfig(format!(
                "process_noise_var must not be negative, got {}",
                self.kalman.process_noise_var
            )));
        }
        if !(self.kalman.velocity_uncertainty_scale > 0.0) {
            return Err(TrackerError::BadConfig(format!(
                "velocity_uncertainty_scale must be positive, got {}",
                self.kalman.velocity_uncertainty_scale
            )));
        }
        if !(self.kalman.dt > 0.0) {
            return Err(TrackerError::BadConfig(format!(
                "dt must be positive, got {}",
                self.kalman.dt
            )));
        }
        Ok(())
    }
}

/// Identity of a confirmed track attached to a detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackAssignment {
    pub id: u64,
    pub nb_predictions: usize,
    pub state: FilterState,
}

impl TrackAssignment {
    fn from_track(track: &KalmanTrack) -> Self {
        TrackAssignment {
            id: track.get_id(),
            nb_predictions: track.get_nb_predictions(),
            state: track.get_filter_state(),
        }
    }
}

/// SORT-like multi-object tracker for point detections.
///
/// Each frame: predict every track, match predictions to detections optimally,
/// correct matched tracks, start tracks for unmatched detections and drop
/// tracks that have not been matched for more than `max_age` frames.
pub struct MultiObjectKalmanTracker {
    config: KalmanTrackerConfig,
    model: KalmanModel,
    // Live tracks in creation order
    tracks: Vec<KalmanTrack>,
    // Number of processed frames
    frame_count: usize,
    next_id: u64,
    last_frame: Option<usize>,
}

impl Default for MultiObjectKalmanTracker {
    /// Creates default instance of MultiObjectKalmanTracker
    ///
    /// Basic usage:
    ///
    /// ```
    /// use zebratrack::mot::MultiObjectKalmanTracker;
    /// let mut tracker = MultiObjectKalmanTracker::default();
    /// ```
    fn default() -> Self {
        MultiObjectKalmanTracker::new(KalmanTrackerConfig::default())
    }
}

impl MultiObjectKalmanTracker {
    /// Creates new instance of MultiObjectKalmanTracker
    ///
    /// Basic usage:
    ///
    /// ```
    /// use zebratrack::mot::{KalmanTrackerConfig, MultiObjectKalmanTracker};
    /// let config = KalmanTrackerConfig {
    ///     max_age: 15,
    ///     min_hits: 1,
    ///     distance_threshold: 30.0,
    ///     ..KalmanTrackerConfig::default()
    /// };
    /// let mut tracker = MultiObjectKalmanTracker::new(config);
    /// ```
    pub fn new(config: KalmanTrackerConfig) -> Self {
        MultiObjectKalmanTracker {
            model: KalmanModel::new(&config.kalman),
            config,
            tracks: Vec::new(),
            frame_count: 0,
            next_id: 0,
            last_frame: None,
        }
    }
    /// Forgets every track and restarts identities from 0
    pub fn initialize(&mut self) {
        self.tracks.clear();
        self.frame_count = 0;
        self.next_id = 0;
        self.last_frame = None;
    }
    pub fn get_config(&self) -> &KalmanTrackerConfig {
        &self.config
    }
    pub fn get_tracks(&self) -> &[KalmanTrack] {
        &self.tracks
    }
    pub fn get_frame_count(&self) -> usize {
        self.frame_count
    }
    /// Processes detections of a single frame.
    ///
    /// Must be called for every frame in increasing order, also with an empty slice.
    /// Returns one entry per detection: the assignment when its track is confirmed, `None` otherwise.
    /// On error the tracker is left as it was before the call, so the same frame can be retried.
    ///
    /// # Arguments
    /// * `frame` - frame number; every call after the first one must pass previous frame + 1
    /// * `detections` - detected positions in this frame
    pub fn update(
        &mut self,
        frame: usize,
        detections: &[Point],
    ) -> Result<Vec<Option<TrackAssignment>>, TrackerError> {
        if let Some(last) = self.last_frame {
            if frame != last + 1 {
                return Err(TrackerError::from(FrameOutOfOrder {
                    expected: last + 1,
                    got: frame,
                }));
            }
        }
        let frame_count = self.frame_count + 1;
        let mut assignments: Vec<Option<TrackAssignment>> = vec![None; detections.len()];

        // Work on a copy so a failed correction leaves the tracker untouched
        let mut tracks = self.tracks.clone();

        // 1. Predict, dropping tracks whose prediction blew up
        let mut predicted: Vec<Point> = Vec::with_capacity(tracks.len());
        tracks.retain_mut(|track| {
            let position = track.predict();
            if position.is_finite() {
                predicted.push(position);
                true
            } else {
                debug!("Frame {}: dropping track {} with invalid prediction", frame, track.get_id());
                false
            }
        });

        // 2. Match predictions (rows) with detections (columns)
        let result = match_positions(&predicted, detections, self.config.distance_threshold);

        // 3. Correct matched tracks
        for &(track_idx, det_idx) in result.matches.iter() {
            let track = &mut tracks[track_idx];
            track.update(&detections[det_idx])?;
            if track.get_hit_streak() >= self.config.min_hits {
                assignments[det_idx] = Some(TrackAssignment::from_track(track));
            }
        }

        // 4. Start new tracks. A single sighting confirms when min_hits <= 1 or during warm-up
        let confirmed_at_birth = self.config.min_hits <= 1 || frame_count <= self.config.min_hits;
        let mut next_id = self.next_id;
        for &det_idx in result.unmatched_cols.iter() {
            let track = KalmanTrack::new(next_id, &detections[det_idx], self.model);
            next_id += 1;
            if confirmed_at_birth {
                assignments[det_idx] = Some(TrackAssignment::from_track(&track));
            }
            tracks.push(track);
        }

        // 5. Remove dead tracks
        let max_age = self.config.max_age;
        let before = tracks.len();
        tracks.retain(|track| track.get_time_since_update() <= max_age);

        debug!(
            "Frame {}: {} detections, {} matched, {} born, {} removed, {} alive",
            frame,
            detections.len(),
            result.matches.len(),
            result.unmatched_cols.len(),
            before - tracks.len(),
            tracks.len()
        );

        self.tracks = tracks;
        self.next_id = next_id;
        self.frame_count = frame_count;
        self.last_frame = Some(frame);
        Ok(assignments)
    }
}

use std::fmt;
impl fmt::Display for MultiObjectKalmanTracker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Maximum age: {}\n\tMinimum hits: {}\n\tDistance threshold: {}",
            self.config.max_age, self.config.min_hits, self.config.distance_threshold
        )
    }
}
