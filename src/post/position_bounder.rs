use serde::{Deserialize, Serialize};

use crate::mot::TrackedRow;
use crate::utils::Point;

/// Axis aligned region in frame coordinates (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    /// (lower, upper) along x
    pub x: (f64, f64),
    /// (lower, upper) along y
    pub y: (f64, f64),
}

impl Bound {
    pub fn new(x: (f64, f64), y: (f64, f64)) -> Self {
        Bound { x, y }
    }
    /// Bounds are exclusive
    pub fn contains(&self, p: &Point) -> bool {
        p.x > self.x.0 && p.x < self.x.1 && p.y > self.y.0 && p.y < self.y.1
    }
}

/// Flags rows whose position falls inside each configured region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionBounder {
    pub bounds: Vec<Bound>,
}

impl PositionBounder {
    pub fn new(bounds: Vec<Bound>) -> Self {
        PositionBounder { bounds }
    }
    /// Sets `post.in_bounds` of every row: one flag per bound, in order
    pub fn run(&self, rows: &mut [TrackedRow]) {
        for row in rows.iter_mut() {
            let position = row.position();
            row.post.in_bounds = self.bounds.iter().map(|b| b.contains(&position)).collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mot::Detection;

    #[test]
    fn test_flags_per_bound() {
        let bounder = PositionBounder::new(vec![
            Bound::new((0.0, 100.0), (0.0, 100.0)),
            Bound::new((50.0, 200.0), (-10.0, 10.0)),
        ]);
        let mut rows = vec![
            TrackedRow::new(0, Detection::new(Point::new(60.0, 5.0))),
            TrackedRow::new(0, Detection::new(Point::new(150.0, 0.0))),
            // On the edge counts as outside
            TrackedRow::new(1, Detection::new(Point::new(100.0, 50.0))),
        ];
        bounder.run(&mut rows);
        assert_eq!(rows[0].post.in_bounds, vec![true, true]);
        assert_eq!(rows[1].post.in_bounds, vec![false, true]);
        assert_eq!(rows[2].post.in_bounds, vec![false, false]);
    }

    #[test]
    fn test_from_json() {
        let bounder: PositionBounder =
            serde_json::from_str(r#"{"bounds": [{"x": [0.0, 10.0], "y": [0.0, 20.0]}]}"#).unwrap();
        assert_eq!(bounder.bounds.len(), 1);
        assert!(bounder.bounds[0].contains(&Point::new(5.0, 15.0)));
    }
}
