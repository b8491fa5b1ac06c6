use log::debug;
use serde::{Deserialize, Serialize};

use crate::mot::assignment::match_positions;
use crate::mot::mot_errors::TrackerError;
use crate::utils::Point;

/// Settings of [`VicinityTracker`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VicinityTrackerConfig {
    /// How many frames back an unidentified detection looks for a predecessor. Default is 15
    pub nb_frames_to_find: usize,
    /// Distance threshold for predecessor one frame back (pixels). Default is 25.0
    pub max_dist: f64,
    /// Threshold growth per frame of look-back distance. Default is 0.05
    pub max_dist_inc_ratio: f64,
}

impl Default for VicinityTrackerConfig {
    fn default() -> Self {
        VicinityTrackerConfig {
            nb_frames_to_find: 15,
            max_dist: 25.0,
            max_dist_inc_ratio: 0.05,
        }
    }
}

impl VicinityTrackerConfig {
    /// Distance threshold when looking `look_back` frames into the past
    pub fn threshold(&self, look_back: usize) -> f64 {
        self.max_dist * (1.0 + self.max_dist_inc_ratio * look_back as f64)
    }
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !(self.max_dist > 0.0) {
            return Err(TrackerError::BadConfig(format!(
                "max_dist must be positive, got {}",
                self.max_dist
            )));
        }
        if !(self.max_dist_inc_ratio >= 0.0) {
            return Err(TrackerError::BadConfig(format!(
                "max_dist_inc_ratio must not be negative, got {}",
                self.max_dist_inc_ratio
            )));
        }
        Ok(())
    }
}

/// Identity given to a detection by [`VicinityTracker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VicinityAssignment {
    pub id: u64,
    /// Some later detection inherited this identity from this detection
    pub found_after: bool,
}

/// Model-free tracker: links detections to not yet continued detections of the
/// previous frames, trying nearer frames first.
pub struct VicinityTracker {
    config: VicinityTrackerConfig,
    next_id: u64,
}

impl Default for VicinityTracker {
    /// Creates default instance of VicinityTracker
    ///
    /// Basic usage:
    ///
    /// ```
    /// use zebratrack::mot::VicinityTracker;
    /// let mut tracker = VicinityTracker::default();
    /// ```
    fn default() -> Self {
        VicinityTracker::new(VicinityTrackerConfig::default())
    }
}

impl VicinityTracker {
    /// Creates new instance of VicinityTracker
    ///
    /// Basic usage:
    ///
    /// ```
    /// use zebratrack::mot::{VicinityTracker, VicinityTrackerConfig};
    /// let config = VicinityTrackerConfig {
    ///     nb_frames_to_find: 5,
    ///     max_dist: 10.0,
    ///     max_dist_inc_ratio: 0.1,
    /// };
    /// let mut tracker = VicinityTracker::new(config);
    /// ```
    pub fn new(config: VicinityTrackerConfig) -> Self {
        VicinityTracker { config, next_id: 0 }
    }
    /// Restarts identities from 0
    pub fn initialize(&mut self) {
        self.next_id = 0;
    }
    pub fn get_config(&self) -> &VicinityTrackerConfig {
        &self.config
    }
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
    /// Assigns identities to every detection of `frames`.
    /// Returned outer vector is aligned with `frames`, inner ones with each frame's detections.
    pub fn assign_ids(&mut self, frames: &[Vec<Point>]) -> Vec<Vec<VicinityAssignment>> {
        let mut ids: Vec<Vec<Option<u64>>> = frames.iter().map(|f| vec![None; f.len()]).collect();
        let mut found_after: Vec<Vec<bool>> =
            frames.iter().map(|f| vec![false; f.len()]).collect();

        for current in 0..frames.len() {
            for look_back in 1..=self.config.nb_frames_to_find {
                if look_back > current {
                    break;
                }
                let previous = current - look_back;
                let unidentified: Vec<usize> = (0..frames[current].len())
                    .filter(|&j| ids[current][j].is_none())
                    .collect();
                if unidentified.is_empty() {
                    break;
                }
                let unconsumed: Vec<usize> = (0..frames[previous].len())
                    .filter(|&i| !found_after[previous][i])
                    .collect();
                if unconsumed.is_empty() {
                    continue;
                }
                let previous_pos: Vec<Point> =
                    unconsumed.iter().map(|&i| frames[previous][i]).collect();
                let current_pos: Vec<Point> =
                    unidentified.iter().map(|&j| frames[current][j]).collect();
                let result = match_positions(
                    &previous_pos,
                    &current_pos,
                    self.config.threshold(look_back),
                );
                for &(row, col) in result.matches.iter() {
                    let prev_idx = unconsumed[row];
                    let inherited = ids[previous][prev_idx];
                    ids[current][unidentified[col]] = inherited;
                    found_after[previous][prev_idx] = true;
                }
                debug!(
                    "Frame {}: {} detections linked {} frame(s) back",
                    current,
                    result.matches.len(),
                    look_back
                );
            }
            for j in 0..frames[current].len() {
                if ids[current][j].is_none() {
                    ids[current][j] = Some(self.allocate_id());
                }
            }
        }

        ids.into_iter()
            .zip(found_after)
            .map(|(frame_ids, frame_found)| {
                frame_ids
                    .into_iter()
                    .zip(frame_found)
                    .filter_map(|(id, found_after)| id.map(|id| VicinityAssignment { id, found_after }))
                    .collect()
            })
            .collect()
    }
}

use std::fmt;
impl fmt::Display for VicinityTracker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Frames to look back: {}\n\tMaximum distance: {}\n\tDistance increase ratio: {}",
            self.config.nb_frames_to_find, self.config.max_dist, self.config.max_dist_inc_ratio
        )
    }
}
