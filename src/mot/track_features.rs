use itertools::Itertools;
use std::cmp::Ordering;

use crate::mot::detection::TrackedRow;
use crate::utils::{angle_diff_deg, euclidean_distance};

// Rows without identity go after every identified row
fn id_key(id: Option<u64>) -> (bool, u64) {
    (id.is_none(), id.unwrap_or(0))
}

fn by_id_then_frame(a: &TrackedRow, b: &TrackedRow) -> Ordering {
    id_key(a.id)
        .cmp(&id_key(b.id))
        .then(a.frame.cmp(&b.frame))
}

fn by_frame_then_id(a: &TrackedRow, b: &TrackedRow) -> Ordering {
    a.frame.cmp(&b.frame).then(id_key(a.id).cmp(&id_key(b.id)))
}

/// Derives per-track sequential features from an identity-assigned table.
///
/// Rows are walked per identity in frame order: `is_new_id` marks the first row of an
/// identity, `frame_diff`, `pos_diff_*`, `pos_dist` and `rel_angle_deg_diff` describe the
/// step from the previous row of the same identity (unset at the first row).
/// `found_after` is derived only when no row carries it yet.
/// A row without identity is its own singleton track.
///
/// Output is ordered by frame, then identity.
pub fn enrich(mut rows: Vec<TrackedRow>) -> Vec<TrackedRow> {
    rows.sort_by(by_id_then_frame);

    if rows.iter().all(|row| row.found_after.is_none()) {
        let continued: Vec<bool> = rows
            .iter()
            .tuple_windows()
            .map(|(a, b)| a.id.is_some() && a.id == b.id)
            .chain(std::iter::once(false))
            .collect();
        for (row, found_after) in rows.iter_mut().zip(continued) {
            row.found_after = Some(found_after);
        }
    }

    for i in 0..rows.len() {
        let predecessor = if i > 0 && rows[i].id.is_some() && rows[i].id == rows[i - 1].id {
            let prev = &rows[i - 1];
            Some((prev.frame, prev.position(), prev.detection.rel_angle_deg))
        } else {
            None
        };
        let row = &mut rows[i];
        row.is_new_id = predecessor.is_none();
        match predecessor {
            Some((prev_frame, prev_position, prev_angle)) => {
                let position = row.position();
                row.frame_diff = Some(row.frame - prev_frame);
                row.pos_diff_x = Some(position.x - prev_position.x);
                row.pos_diff_y = Some(position.y - prev_position.y);
                row.pos_dist = Some(euclidean_distance(&prev_position, &position));
                row.rel_angle_deg_diff = match (prev_angle, row.detection.rel_angle_deg) {
                    (Some(from), Some(to)) => Some(angle_diff_deg(from, to)),
                    _ => None,
                };
            }
            None => {
                row.frame_diff = None;
                row.pos_diff_x = None;
                row.pos_diff_y = None;
                row.pos_dist = None;
                row.rel_angle_deg_diff = None;
            }
        }
    }

    rows.sort_by(by_frame_then_id);
    rows
}
