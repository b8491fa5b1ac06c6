use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::mot::TrackedRow;

/// Which conversions to run. Every conversion has its own switch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Position deltas to pixels per second
    pub pixel_velocity: bool,
    /// Pixel velocity to centimeters per second
    pub pixel_to_cm: bool,
    pub sin_rel_angle: bool,
    pub cos_rel_angle: bool,
    pub fps: f64,
    pub pixel_to_cm_ratio: f64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig {
            pixel_velocity: false,
            pixel_to_cm: false,
            sin_rel_angle: false,
            cos_rel_angle: false,
            fps: 30.0,
            pixel_to_cm_ratio: 1.0,
        }
    }
}

/// Derives kinematic columns from the enriched table
pub struct DataConverter {
    config: ConverterConfig,
}

impl DataConverter {
    pub fn new(config: ConverterConfig) -> Self {
        DataConverter { config }
    }
    pub fn get_config(&self) -> &ConverterConfig {
        &self.config
    }
    // Computed in this run, or carried over from an earlier one
    fn has_pixel_velocity(&self, rows: &[TrackedRow]) -> bool {
        self.config.pixel_velocity || rows.iter().any(|row| row.post.velocity_pixel.is_some())
    }
    pub fn run(&self, rows: &mut [TrackedRow]) {
        let fps = self.config.fps;
        if self.config.pixel_velocity {
            info!("Converting pixel diff to pixel velocity, fps: {}", fps);
            for row in rows.iter_mut() {
                let frame_diff = row.frame_diff.map(|d| d as f64);
                let per_second = |diff: Option<f64>| match (diff, frame_diff) {
                    (Some(diff), Some(frames)) if frames > 0.0 => Some(diff * fps / frames),
                    _ => None,
                };
                row.post.velocity_pixel_x = per_second(row.pos_diff_x);
                row.post.velocity_pixel_y = per_second(row.pos_diff_y);
                row.post.velocity_pixel = per_second(row.pos_dist);
            }
        }
        if self.config.pixel_to_cm {
            let ratio = self.config.pixel_to_cm_ratio;
            if !self.has_pixel_velocity(rows) {
                warn!("Pixel velocity is not available, skipping pixel to cm conversion");
            } else {
                info!("Converting pixel to cm, pixel_to_cm_ratio: {}", ratio);
                for row in rows.iter_mut() {
                    row.post.velocity_cm = row.post.velocity_pixel.map(|v| v * ratio);
                }
            }
        }
        if self.config.sin_rel_angle {
            info!("Converting rel_angle to sin rel_angle");
            for row in rows.iter_mut() {
                row.post.sin_rel_angle = row.detection.rel_angle_deg.map(|a| a.to_radians().sin());
            }
        }
        if self.config.cos_rel_angle {
            info!("Converting rel_angle to cos rel_angle");
            for row in rows.iter_mut() {
                row.post.cos_rel_angle = row.detection.rel_angle_deg.map(|a| a.to_radians().cos());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mot::{enrich, Detection};
    use crate::utils::Point;
    use approx::assert_abs_diff_eq;

    fn table() -> Vec<TrackedRow> {
        let points = [(0, 0.0, 0.0, 90.0), (1, 3.0, 4.0, 0.0), (3, 9.0, 12.0, 180.0)];
        let rows = points
            .iter()
            .map(|&(frame, x, y, angle)| {
                let mut row = TrackedRow::new(frame, Detection::new(Point::new(x, y)).with_angle(angle));
                row.id = Some(0);
                row
            })
            .collect();
        enrich(rows)
    }

    #[test]
    fn test_nothing_selected() {
        let mut rows = table();
        let before = rows.clone();
        DataConverter::new(ConverterConfig::default()).run(&mut rows);
        assert_eq!(rows, before);
    }

    #[test]
    fn test_pixel_and_cm_velocity() {
        let mut rows = table();
        let config = ConverterConfig {
            pixel_velocity: true,
            pixel_to_cm: true,
            fps: 10.0,
            pixel_to_cm_ratio: 0.5,
            ..ConverterConfig::default()
        };
        DataConverter::new(config).run(&mut rows);
        assert_eq!(rows[0].post.velocity_pixel, None);
        assert_eq!(rows[0].post.velocity_cm, None);
        assert_abs_diff_eq!(rows[1].post.velocity_pixel_x.unwrap(), 30.0);
        assert_abs_diff_eq!(rows[1].post.velocity_pixel_y.unwrap(), 40.0);
        assert_abs_diff_eq!(rows[1].post.velocity_pixel.unwrap(), 50.0);
        assert_abs_diff_eq!(rows[1].post.velocity_cm.unwrap(), 25.0);
        // Two frame gap halves the speed
        assert_abs_diff_eq!(rows[2].post.velocity_pixel.unwrap(), 50.0);
    }

    #[test]
    fn test_cm_without_pixel_velocity_is_skipped() {
        let mut rows = table();
        let config = ConverterConfig {
            pixel_to_cm: true,
            ..ConverterConfig::default()
        };
        DataConverter::new(config).run(&mut rows);
        assert!(rows.iter().all(|r| r.post.velocity_cm.is_none()));
    }

    #[test]
    fn test_pixel_velocity_availability() {
        // Every row starts its own identity: no deltas, yet velocity was computed
        let mut rows: Vec<TrackedRow> = (0..3)
            .map(|id| {
                let mut row = TrackedRow::new(0, Detection::new(Point::new(id as f64, 0.0)));
                row.id = Some(id);
                row
            })
            .collect();
        rows = enrich(rows);
        let both = DataConverter::new(ConverterConfig {
            pixel_velocity: true,
            pixel_to_cm: true,
            ..ConverterConfig::default()
        });
        assert!(both.has_pixel_velocity(&rows));
        both.run(&mut rows);
        assert!(rows.iter().all(|r| r.post.velocity_cm.is_none()));

        // cm only: relies on pixel velocity from an earlier run
        let cm_only = DataConverter::new(ConverterConfig {
            pixel_to_cm: true,
            pixel_to_cm_ratio: 2.0,
            ..ConverterConfig::default()
        });
        let mut table = table();
        assert!(!cm_only.has_pixel_velocity(&table));
        DataConverter::new(ConverterConfig {
            pixel_velocity: true,
            fps: 1.0,
            ..ConverterConfig::default()
        })
        .run(&mut table);
        assert!(cm_only.has_pixel_velocity(&table));
        cm_only.run(&mut table);
        assert_abs_diff_eq!(table[1].post.velocity_cm.unwrap(), 10.0);
    }

    #[test]
    fn test_sin_and_cos_are_independent() {
        let mut rows = table();
        let config = ConverterConfig {
            cos_rel_angle: true,
            ..ConverterConfig::default()
        };
        DataConverter::new(config).run(&mut rows);
        assert!(rows.iter().all(|r| r.post.sin_rel_angle.is_none()));
        assert_abs_diff_eq!(rows[0].post.cos_rel_angle.unwrap(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rows[1].post.cos_rel_angle.unwrap(), 1.0);
        assert_abs_diff_eq!(rows[2].post.cos_rel_angle.unwrap(), -1.0);

        let config = ConverterConfig {
            sin_rel_angle: true,
            ..ConverterConfig::default()
        };
        DataConverter::new(config).run(&mut rows);
        assert_abs_diff_eq!(rows[0].post.sin_rel_angle.unwrap(), 1.0);
    }
}
