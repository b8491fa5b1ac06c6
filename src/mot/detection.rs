use serde::{Deserialize, Serialize};

use crate::mot::kalman_track::FilterState;
use crate::mot::mot_errors::TrackerError;
use crate::utils::{Point, Rect};

/// Detected object in a single frame. Only `position` is used for tracking,
/// the rest is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub position: Point,
    pub bbox: Option<Rect>,
    /// Orientation relative to the flow direction, degrees
    pub rel_angle_deg: Option<f64>,
}

impl Detection {
    pub fn new(position: Point) -> Self {
        Detection {
            position,
            bbox: None,
            rel_angle_deg: None,
        }
    }
    pub fn with_bbox(mut self, bbox: Rect) -> Self {
        self.bbox = Some(bbox);
        self
    }
    pub fn with_angle(mut self, rel_angle_deg: f64) -> Self {
        self.rel_angle_deg = Some(rel_angle_deg);
        self
    }
}

/// Optional columns produced by the `post` stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostFeatures {
    pub velocity_pixel_x: Option<f64>,
    pub velocity_pixel_y: Option<f64>,
    pub velocity_pixel: Option<f64>,
    pub velocity_cm: Option<f64>,
    pub sin_rel_angle: Option<f64>,
    pub cos_rel_angle: Option<f64>,
    /// One flag per configured bound: position lies strictly inside
    pub in_bounds: Vec<bool>,
}

/// One output row per input detection.
/// `None` means "unset": no identity, or no predecessor under the same identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedRow {
    pub frame: usize,
    pub detection: Detection,
    pub id: Option<u64>,
    pub nb_predictions: Option<usize>,
    pub filter_state: Option<FilterState>,
    pub found_after: Option<bool>,
    pub is_new_id: bool,
    pub frame_diff: Option<usize>,
    pub pos_diff_x: Option<f64>,
    pub pos_diff_y: Option<f64>,
    pub pos_dist: Option<f64>,
    pub rel_angle_deg_diff: Option<f64>,
    pub post: PostFeatures,
}

impl TrackedRow {
    pub fn new(frame: usize, detection: Detection) -> Self {
        TrackedRow {
            frame,
            detection,
            id: None,
            nb_predictions: None,
            filter_state: None,
            found_after: None,
            is_new_id: false,
            frame_diff: None,
            pos_diff_x: None,
            pos_diff_y: None,
            pos_dist: None,
            rel_angle_deg_diff: None,
            post: PostFeatures::default(),
        }
    }
    pub fn position(&self) -> Point {
        self.detection.position
    }
}

/// Frames to process: `start..end`, `end = None` means through the last frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: usize,
    pub end: Option<usize>,
}

impl FrameRange {
    pub fn new(start: usize, end: Option<usize>) -> Self {
        FrameRange { start, end }
    }
    pub fn full() -> Self {
        FrameRange {
            start: 0,
            end: None,
        }
    }
    /// Returns concrete (start, end) for a sequence of `nb_frames` frames
    pub fn resolve(&self, nb_frames: usize) -> Result<(usize, usize), TrackerError> {
        let end = self.end.unwrap_or(nb_frames);
        if end > nb_frames {
            return Err(TrackerError::BadRange(format!(
                "End frame {} is beyond the number of frames {}",
                end, nb_frames
            )));
        }
        if self.start > end {
            return Err(TrackerError::BadRange(format!(
                "Start frame {} is after end frame {}",
                self.start, end
            )));
        }
        Ok((self.start, end))
    }
}

impl Default for FrameRange {
    fn default() -> Self {
        FrameRange::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_range() {
        assert_eq!(FrameRange::full().resolve(10).unwrap(), (0, 10));
        assert_eq!(FrameRange::new(2, Some(5)).resolve(10).unwrap(), (2, 5));
        assert_eq!(FrameRange::new(4, Some(4)).resolve(10).unwrap(), (4, 4));
        assert!(matches!(
            FrameRange::new(6, Some(5)).resolve(10),
            Err(TrackerError::BadRange(_))
        ));
        assert!(matches!(
            FrameRange::new(0, Some(11)).resolve(10),
            Err(TrackerError::BadRange(_))
        ));
        assert!(matches!(
            FrameRange::new(11, None).resolve(10),
            Err(TrackerError::BadRange(_))
        ));
    }

    #[test]
    fn test_detection_payload() {
        let det = Detection::new(Point::new(1.0, 2.0))
            .with_bbox(Rect::new(0.0, 0.0, 2.0, 4.0))
            .with_angle(-45.0);
        let row = TrackedRow::new(3, det.clone());
        assert_eq!(row.position(), Point::new(1.0, 2.0));
        assert_eq!(row.detection, det);
        assert_eq!(row.id, None);
        assert!(!row.is_new_id);
    }
}
