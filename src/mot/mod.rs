//! Export contents of `mot` folder
mod assignment;
mod detection;
mod kalman_track;
mod kalman_tracker;
mod mot_errors;
mod strategy;
mod track_features;
mod vicinity_tracker;

#[cfg(test)]
mod test_data;

pub use self::{
    assignment::*,
    detection::*,
    kalman_track::*,
    kalman_tracker::*,
    mot_errors::*,
    strategy::*,
    track_features::*,
    vicinity_tracker::*,
};
