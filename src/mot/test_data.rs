//! Synthetic detections shared by tracker tests
use crate::mot::Detection;
use crate::utils::Point;

/// Two objects whose paths cross around frame 10. Object B starts one pixel to the right
pub fn get_crossing_data() -> Vec<Vec<Point>> {
    (0..25)
        .map(|t| {
            let t = t as f64;
            vec![
                Point::new(5.0 * t, 5.0 * t),
                Point::new(5.0 * t + 1.0, 100.0 - 5.0 * t),
            ]
        })
        .collect()
}

/// Three objects swimming to the right side by side, 50 pixels apart
pub fn get_parallel_data() -> (Vec<Point>, Vec<Point>, Vec<Point>) {
    let lane = |y: f64, speed: f64| -> Vec<Point> {
        (0..20)
            .map(|t| Point::new(20.0 + speed * t as f64, y + 0.5 * (t % 3) as f64))
            .collect()
    };
    (lane(0.0, 3.0), lane(50.0, 2.5), lane(100.0, 3.5))
}

pub fn points_to_detections(frames: &[Vec<Point>]) -> Vec<Vec<Detection>> {
    frames
        .iter()
        .map(|points| points.iter().map(|p| Detection::new(*p)).collect())
        .collect()
}
