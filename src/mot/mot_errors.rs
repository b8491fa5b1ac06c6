use std::fmt;

#[derive(Debug)]
pub enum TrackerError {
    /// Requested frame range does not fit the supplied frames
    BadRange(String),
    /// Frame handed to a per-frame tracker is not the successor of the previous one
    FrameOutOfOrder(FrameOutOfOrder),
    /// Innovation covariance could not be inverted during Kalman update
    SingularInnovation(SingularInnovation),
    /// Configuration could not be parsed or holds unusable values
    BadConfig(String),
}

impl From<FrameOutOfOrder> for TrackerError {
    fn from(e: FrameOutOfOrder) -> Self {
        TrackerError::FrameOutOfOrder(e)
    }
}

impl From<SingularInnovation> for TrackerError {
    fn from(e: SingularInnovation) -> Self {
        TrackerError::SingularInnovation(e)
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(e: serde_json::Error) -> Self {
        TrackerError::BadConfig(e.to_string())
    }
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrackerError::BadRange(txt) => write!(f, "BadRange: {}", txt),
            TrackerError::FrameOutOfOrder(e) => write!(f, "{}", e),
            TrackerError::SingularInnovation(e) => write!(f, "{}", e),
            TrackerError::BadConfig(txt) => write!(f, "BadConfig: {}", txt),
        }
    }
}

impl std::error::Error for TrackerError {}

#[derive(Debug)]
pub struct FrameOutOfOrder {
    pub expected: usize,
    pub got: usize,
}
impl fmt::Display for FrameOutOfOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "FrameOutOfOrder: expected frame {}, got frame {}",
            self.expected, self.got
        )
    }
}

#[derive(Debug)]
pub struct SingularInnovation {
    pub track_id: u64,
}
impl fmt::Display for SingularInnovation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "SingularInnovation: innovation covariance of track {} is not invertible",
            self.track_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = TrackerError::from(FrameOutOfOrder { expected: 4, got: 6 });
        assert_eq!(
            err.to_string(),
            "FrameOutOfOrder: expected frame 4, got frame 6"
        );
        let err = TrackerError::BadRange("start 3 > end 2".to_string());
        assert_eq!(err.to_string(), "BadRange: start 3 > end 2");
    }

    #[test]
    fn test_from_json_error() {
        let parse_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: TrackerError = parse_err.into();
        assert!(matches!(err, TrackerError::BadConfig(_)));
    }
}
