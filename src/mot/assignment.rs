use nalgebra::DMatrix;
use pathfinding::{matrix::Matrix, prelude::kuhn_munkres_min};

use crate::utils::{euclidean_distance, Point};

// Costs are converted to integers for Kuhn-Munkres
const SCALE_FACTOR: f64 = 1_000_000.0;
// Any cost above this (including non-finite ones) is clamped. Leaves headroom for summing
const MAX_SCALED_COST: i64 = 1 << 50;

/// Outcome of matching previous positions (rows) with current detections (columns)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentResult {
    /// Accepted pairs as (row_idx, col_idx), ordered by row
    pub matches: Vec<(usize, usize)>,
    pub unmatched_rows: Vec<usize>,
    pub unmatched_cols: Vec<usize>,
}

/// Pairwise euclidean distances: rows x cols
pub fn distance_matrix(rows: &[Point], cols: &[Point]) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), cols.len(), |i, j| {
        euclidean_distance(&rows[i], &cols[j])
    })
}

fn scale_cost(cost: f64) -> i64 {
    let scaled = (cost * SCALE_FACTOR).round();
    if !scaled.is_finite() || scaled > MAX_SCALED_COST as f64 {
        return MAX_SCALED_COST;
    }
    if scaled < -(MAX_SCALED_COST as f64) {
        return -MAX_SCALED_COST;
    }
    scaled as i64
}

/// Solves rectangular assignment problem optimally (minimum total cost).
///
/// Every row and every column is used at most once, so `min(rows, cols)` pairs
/// are returned as (row_idx, col_idx), ordered by row.
pub fn solve_assignment(cost: &DMatrix<f64>) -> Vec<(usize, usize)> {
    let (n_rows, n_cols) = cost.shape();
    if n_rows == 0 || n_cols == 0 {
        return Vec::new();
    }
    // Kuhn-Munkres needs rows <= columns, so solve the transposed problem otherwise
    let transposed = n_rows > n_cols;
    let (solver_rows, solver_cols) = if transposed {
        (n_cols, n_rows)
    } else {
        (n_rows, n_cols)
    };
    let cost_matrix = Matrix::from_fn(solver_rows, solver_cols, |(i, j)| {
        if transposed {
            scale_cost(cost[(j, i)])
        } else {
            scale_cost(cost[(i, j)])
        }
    });
    let (_, assignments) = kuhn_munkres_min(&cost_matrix);
    let mut pairs: Vec<(usize, usize)> = assignments
        .into_iter()
        .enumerate()
        .map(|(i, j)| if transposed { (j, i) } else { (i, j) })
        .collect();
    pairs.sort_unstable();
    pairs
}

/// Matches `rows` to `cols` optimally, then rejects every pair whose distance
/// is not strictly below `threshold`. Rejected pairs are unmatched on both sides.
pub fn match_positions(rows: &[Point], cols: &[Point], threshold: f64) -> AssignmentResult {
    if rows.is_empty() || cols.is_empty() {
        return AssignmentResult {
            matches: Vec::new(),
            unmatched_rows: (0..rows.len()).collect(),
            unmatched_cols: (0..cols.len()).collect(),
        };
    }
    let cost = distance_matrix(rows, cols);
    let matches: Vec<(usize, usize)> = solve_assignment(&cost)
        .into_iter()
        .filter(|&(i, j)| cost[(i, j)] < threshold)
        .collect();

    let mut row_taken = vec![false; rows.len()];
    let mut col_taken = vec![false; cols.len()];
    for &(i, j) in matches.iter() {
        row_taken[i] = true;
        col_taken[j] = true;
    }
    AssignmentResult {
        matches,
        unmatched_rows: (0..rows.len()).filter(|&i| !row_taken[i]).collect(),
        unmatched_cols: (0..cols.len()).filter(|&j| !col_taken[j]).collect(),
    }
}
