use nalgebra::{Matrix2, Matrix2x4, Matrix4, Vector2, Vector4};
use serde::{Deserialize, Serialize};

use crate::mot::mot_errors::{SingularInnovation, TrackerError};
use crate::utils::Point;

/// Tunables of the constant velocity filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanParams {
    /// Time step between two consecutive frames
    pub dt: f64,
    /// Multiplier applied to initial velocity variance (velocity is unobservable at birth)
    pub velocity_uncertainty_scale: f64,
    /// Variance of discrete white noise process model
    pub process_noise_var: f64,
    /// Observation noise variance per axis
    pub observation_noise: f64,
}

impl Default for KalmanParams {
    fn default() -> Self {
        KalmanParams {
            dt: 1.0,
            velocity_uncertainty_scale: 1000.0,
            process_noise_var: 0.01,
            observation_noise: 1.0,
        }
    }
}

/// Matrices of the linear model, derived once from [`KalmanParams`].
/// State is (x, y, vx, vy), observation is (x, y).
#[derive(Debug, Clone, Copy)]
pub struct KalmanModel {
    f: Matrix4<f64>,
    h: Matrix2x4<f64>,
    q: Matrix4<f64>,
    r: Matrix2<f64>,
    p0: Matrix4<f64>,
}

impl KalmanModel {
    pub fn new(params: &KalmanParams) -> Self {
        let dt = params.dt;
        #[rustfmt::skip]
        let f = Matrix4::new(
            1.0, 0.0, dt,  0.0,
            0.0, 1.0, 0.0, dt,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        #[rustfmt::skip]
        let h = Matrix2x4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
        );
        // Piecewise white noise acceleration, same block for both axes
        let var = params.process_noise_var;
        let q_pp = 0.25 * dt.powi(4) * var;
        let q_pv = 0.5 * dt.powi(3) * var;
        let q_vv = dt.powi(2) * var;
        #[rustfmt::skip]
        let q = Matrix4::new(
            q_pp, 0.0,  q_pv, 0.0,
            0.0,  q_pp, 0.0,  q_pv,
            q_pv, 0.0,  q_vv, 0.0,
            0.0,  q_pv, 0.0,  q_vv,
        );
        let r = Matrix2::identity() * params.observation_noise;
        let scale = params.velocity_uncertainty_scale;
        let p0 = Matrix4::from_diagonal(&Vector4::new(1.0, 1.0, scale, scale));
        KalmanModel { f, h, q, r, p0 }
    }
}

impl Default for KalmanModel {
    fn default() -> Self {
        KalmanModel::new(&KalmanParams::default())
    }
}

/// Position and velocity estimate of a track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub position: Point,
    pub velocity: Point,
}

/// Mean and covariance of the filter. Every step returns a new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KalmanState {
    pub x: Vector4<f64>,
    pub p: Matrix4<f64>,
}

impl KalmanState {
    /// Zero velocity state seeded at observed position
    pub fn new(model: &KalmanModel, position: &Point) -> Self {
        KalmanState {
            x: Vector4::new(position.x, position.y, 0.0, 0.0),
            p: model.p0,
        }
    }
    pub fn predict(&self, model: &KalmanModel) -> KalmanState {
        KalmanState {
            x: model.f * self.x,
            p: model.f * self.p * model.f.transpose() + model.q,
        }
    }
    /// Correction step. Returns `None` when innovation covariance is singular
    pub fn update(&self, model: &KalmanModel, z: &Point) -> Option<KalmanState> {
        let y = Vector2::new(z.x, z.y) - model.h * self.x;
        let pht = self.p * model.h.transpose();
        let s = model.h * pht + model.r;
        let s_inv = s.try_inverse()?;
        let k = pht * s_inv;
        // Joseph form keeps covariance symmetric positive semi-definite
        let i_kh = Matrix4::identity() - k * model.h;
        Some(KalmanState {
            x: self.x + k * y,
            p: i_kh * self.p * i_kh.transpose() + k * model.r * k.transpose(),
        })
    }
    pub fn position(&self) -> Point {
        Point::new(self.x[0], self.x[1])
    }
    pub fn velocity(&self) -> Point {
        Point::new(self.x[2], self.x[3])
    }
    pub fn filter_state(&self) -> FilterState {
        FilterState {
            position: self.position(),
            velocity: self.velocity(),
        }
    }
}

/// Single tracked object observed as a point
#[derive(Debug, Clone)]
pub struct KalmanTrack {
    id: u64,
    model: KalmanModel,
    state: KalmanState,
    time_since_update: usize,
    hits: usize,
    hit_streak: usize,
    nb_predictions: usize,
}

impl KalmanTrack {
    pub fn new(id: u64, position: &Point, model: KalmanModel) -> Self {
        KalmanTrack {
            id,
            state: KalmanState::new(&model, position),
            model,
            time_since_update: 0,
            hits: 0,
            hit_streak: 0,
            nb_predictions: 0,
        }
    }
    pub fn get_id(&self) -> u64 {
        self.id
    }
    pub fn get_state(&self) -> &KalmanState {
        &self.state
    }
    pub fn get_filter_state(&self) -> FilterState {
        self.state.filter_state()
    }
    pub fn get_position(&self) -> Point {
        self.state.position()
    }
    pub fn get_velocity(&self) -> Point {
        self.state.velocity()
    }
    pub fn get_time_since_update(&self) -> usize {
        self.time_since_update
    }
    pub fn get_hits(&self) -> usize {
        self.hits
    }
    pub fn get_hit_streak(&self) -> usize {
        self.hit_streak
    }
    pub fn get_nb_predictions(&self) -> usize {
        self.nb_predictions
    }
    /// Advances the state one step and returns the predicted position.
    /// A track that already missed its previous update loses its hit streak.
    pub fn predict(&mut self) -> Point {
        self.state = self.state.predict(&self.model);
        self.nb_predictions += 1;
        if self.time_since_update > 0 {
            self.hit_streak = 0;
        }
        self.time_since_update += 1;
        self.state.position()
    }
    /// Corrects the state with an observed position
    pub fn update(&mut self, position: &Point) -> Result<(), TrackerError> {
        self.state = self
            .state
            .update(&self.model, position)
            .ok_or(SingularInnovation { track_id: self.id })?;
        self.time_since_update = 0;
        self.hits += 1;
        self.hit_streak += 1;
        Ok(())
    }
}
