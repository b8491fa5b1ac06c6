//! Multi object tracking for video of moving organisms.
//!
//! Per-frame detection sets go in, a table of detections with persistent
//! track identities comes out. Two strategies are available:
//! - [`mot::KalmanStrategy`] - constant velocity Kalman filter per track plus optimal assignment
//! - [`mot::VicinityStrategy`] - model free linking over a bounded look-back window
//!
//! ```
//! use zebratrack::mot::{Detection, FrameRange, KalmanStrategy, TrackingStrategy};
//! use zebratrack::utils::Point;
//!
//! let frames = vec![
//!     vec![Detection::new(Point::new(10.0, 10.0))],
//!     vec![Detection::new(Point::new(12.0, 11.0))],
//! ];
//! let mut strategy = KalmanStrategy::default();
//! strategy.initialize();
//! let rows = strategy.track(&frames, FrameRange::full()).unwrap();
//! assert_eq!(rows.len(), 2);
//! ```
pub mod mot;
pub mod post;
pub mod utils;
