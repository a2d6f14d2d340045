//! Candidate drop-pose generation and scoring types.

use nalgebra::Point3;
use rand::Rng;
use stackwise_core::Pose;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A hypothesized drop pose under evaluation. Created fresh per round and
/// discarded after scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    /// The drop pose.
    pub pose: Pose,
}

/// Outcome of one speculative simulation. Derived purely from the
/// simulation result and never mutated after computation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CandidateScore {
    /// Largest ground-plane displacement across all bodies (meters).
    pub max_displacement: f64,
    /// Largest tilt from vertical across all bodies (degrees).
    pub max_tilt: f64,
    /// True if both maxima stayed below their thresholds.
    pub is_stable: bool,
    /// Ranking score, higher is better. Not a probability; may be negative.
    pub score: f64,
}

/// Generates `count` candidate drop poses.
///
/// Candidate `i` draws its X offset uniformly from
/// `[-x_jitter_step, x_jitter_step]` scaled by `i + 1`, so later candidates
/// spread progressively wider - a deliberate, reproducible bias. Y is the
/// constant `drop_height`, Z is zero, and yaw is drawn uniformly from the
/// discrete `yaw_choices` set; pitch and roll stay zero. Output order
/// matches index order, and `count == 0` yields an empty list.
pub fn generate_candidates<R: Rng>(
    rng: &mut R,
    drop_height: f64,
    count: usize,
    x_jitter_step: f64,
    yaw_choices: &[f64],
) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(count);
    for i in 0..count {
        let offset_x = rng.gen_range(-x_jitter_step..=x_jitter_step) * (i + 1) as f64;
        let yaw = if yaw_choices.is_empty() {
            0.0
        } else {
            yaw_choices[rng.gen_range(0..yaw_choices.len())]
        };
        candidates.push(Candidate {
            pose: Pose::from_yaw_degrees(Point3::new(offset_x, drop_height, 0.0), yaw),
        });
    }
    candidates
}

/// Picks the index of the strictly greatest score.
///
/// Ties keep the first-seen (lowest) index. Returns `None` for an empty
/// slice.
pub fn select_best(scores: &[CandidateScore]) -> Option<usize> {
    let mut best_index = None;
    let mut best_score = f64::NEG_INFINITY;
    for (i, score) in scores.iter().enumerate() {
        if score.score > best_score {
            best_score = score.score;
            best_index = Some(i);
        }
    }
    best_index
}
