//! Stability evaluation of a single candidate.

use crate::body::{Body, BodySnapshot};
use crate::candidate::{Candidate, CandidateScore};
use crate::world::{BodyId, World};
use stackwise_core::{Config, Pool};

/// Runs one candidate to completion in the scratch world and scores the
/// outcome.
///
/// Every snapshot body is first reset to its captured baseline so each trial
/// starts from an identical, unperturbed condition regardless of what a
/// previous trial did to the shared world. A fresh body is acquired from the
/// pool, dropped at the candidate pose with zero velocity, and the world is
/// advanced through the configured evaluation window in fixed steps. After
/// settling, the maxima of ground-plane displacement and tilt are taken
/// across the snapshot bodies *and* the candidate body, and the score is the
/// literal ranking heuristic `100 - displacement * 50 - tilt`.
///
/// The pooled body is released before returning, so each call leaves the
/// pool's in-use/available balance exactly as it found it.
pub fn evaluate_candidate(
    world: &mut World,
    candidate: &Candidate,
    snapshot_ids: &[BodyId],
    initial_states: &[BodySnapshot],
    body_pool: &mut Pool<Body>,
    config: &Config,
) -> CandidateScore {
    debug_assert_eq!(snapshot_ids.len(), initial_states.len());

    for (id, state) in snapshot_ids.iter().zip(initial_states) {
        if let Some(body) = world.body_mut(*id) {
            body.restore(state);
        }
    }

    let mut trial_body = body_pool.acquire();
    trial_body.reset(&candidate.pose, config.body_half_extent);
    let trial_baseline = trial_body.snapshot();
    let trial_id = world.insert(trial_body);

    world.advance_for(config.sim_duration, config.time_step);

    let mut max_displacement = 0f64;
    let mut max_tilt = 0f64;
    for (id, state) in snapshot_ids.iter().zip(initial_states) {
        if let Some(body) = world.body(*id) {
            max_displacement = max_displacement.max(body.horizontal_displacement_from(state));
            max_tilt = max_tilt.max(body.tilt_degrees());
        }
    }
    if let Some(body) = world.body(trial_id) {
        max_displacement =
            max_displacement.max(body.horizontal_displacement_from(&trial_baseline));
        max_tilt = max_tilt.max(body.tilt_degrees());
    }

    if let Some(body) = world.remove(trial_id) {
        body_pool.release(body);
    }

    CandidateScore {
        max_displacement,
        max_tilt,
        is_stable: max_displacement < config.displacement_threshold
            && max_tilt < config.tilt_threshold,
        score: 100.0 - max_displacement * 50.0 - max_tilt,
    }
}
