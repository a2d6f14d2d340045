//! Placement orchestration.
//!
//! The orchestrator owns the scratch world and both body pools, drives the
//! snapshot / generate / evaluate / select / commit / settle round for each
//! placement request, and notifies presentation collaborators through the
//! narrow [`RoundObserver`] interface. Collaborators never hold a reference
//! back into the orchestrator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::body::{Body, BodySnapshot};
use crate::candidate::{generate_candidates, select_best, Candidate, CandidateScore};
use crate::evaluate::evaluate_candidate;
use crate::metric::tallest_stack;
use crate::world::{BodyId, World};
use stackwise_core::{Config, Pool, Pose, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything a presentation layer needs to visualize one completed round.
///
/// Candidate and score order is generation order; `winner` indexes into
/// both.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoundReport {
    /// Every candidate pose trialled this round, in generation order.
    pub candidates: Vec<Candidate>,
    /// One score per candidate, same order.
    pub scores: Vec<CandidateScore>,
    /// Index of the committed candidate.
    pub winner: usize,
}

impl RoundReport {
    /// The committed candidate.
    pub fn winning_candidate(&self) -> &Candidate {
        &self.candidates[self.winner]
    }
}

/// Callbacks the core invokes after each completed round.
///
/// All methods have no-op defaults so collaborators implement only what
/// they consume.
pub trait RoundObserver {
    /// The tallest-stack metric changed (or was recomputed) after a round.
    fn on_tallest_stack_changed(&mut self, _count: usize) {}

    /// A round committed a body at `pose`; `report` carries every
    /// candidate and score for visualization.
    fn on_round_committed(&mut self, _pose: &Pose, _report: &RoundReport) {}
}

/// Observer that ignores all notifications, for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl RoundObserver for NullObserver {}

/// Phases of one placement round. Strictly sequential per request.
#[derive(Debug, Clone, Copy, PartialEq)]
enum RoundPhase {
    Idle,
    Snapshotting,
    GeneratingCandidates,
    Evaluating { index: usize },
    Selecting,
    Committing,
    Settling { elapsed: f64 },
}

/// The placement orchestrator.
///
/// Owns the live world, the isolated scratch world and the body pools. A
/// placement request admitted by [`request_placement`] runs to completion
/// over successive [`tick`] calls - one unit of work per tick, suspension
/// points between candidate evaluations and during the settle wait, so the
/// host's frame loop stays in control of timing. Evaluations are strictly
/// sequential: candidates share one mutable scratch world.
///
/// [`request_placement`]: Orchestrator::request_placement
/// [`tick`]: Orchestrator::tick
pub struct Orchestrator<R: Rng = StdRng> {
    config: Config,
    rng: R,
    live: World,
    scratch: World,
    live_pool: Pool<Body>,
    sim_pool: Pool<Body>,
    /// Committed bodies, in placement order. Never shrinks.
    active: Vec<BodyId>,
    press_count: u32,
    frozen: bool,
    phase: RoundPhase,
    // In-flight round state.
    snapshot_ids: Vec<BodyId>,
    initial_states: Vec<BodySnapshot>,
    candidates: Vec<Candidate>,
    scores: Vec<CandidateScore>,
    pending_report: Option<RoundReport>,
}

impl Orchestrator<StdRng> {
    /// Creates an orchestrator with a seeded RNG, for reproducible rounds.
    pub fn with_seed(config: Config, seed: u64) -> Result<Self> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Orchestrator<R> {
    /// Creates an orchestrator, validating the configuration up front.
    pub fn new(config: Config, rng: R) -> Result<Self> {
        config.validate()?;
        let half_extent = config.body_half_extent;
        let live = World::new(&config);
        let scratch = World::new(&config);
        let live_pool =
            Pool::with_initial_size(move || Body::cube(half_extent), config.pool_size);
        let sim_pool =
            Pool::with_initial_size(move || Body::cube(half_extent), config.pool_size);
        Ok(Self {
            config,
            rng,
            live,
            scratch,
            live_pool,
            sim_pool,
            active: Vec::new(),
            press_count: 0,
            frozen: false,
            phase: RoundPhase::Idle,
            snapshot_ids: Vec::new(),
            initial_states: Vec::new(),
            candidates: Vec::new(),
            scores: Vec::new(),
            pending_report: None,
        })
    }

    /// Requests a placement round.
    ///
    /// Returns `true` if the round was admitted. Requests beyond the
    /// configured press limit, or while a round is already in flight, are
    /// silent no-ops.
    pub fn request_placement(&mut self) -> bool {
        if self.phase != RoundPhase::Idle {
            log::debug!("placement request ignored: round in flight");
            return false;
        }
        if self.press_count >= self.config.max_presses {
            log::debug!(
                "placement request ignored: press limit {} reached",
                self.config.max_presses
            );
            return false;
        }
        self.press_count += 1;
        self.phase = RoundPhase::Snapshotting;
        log::debug!(
            "placement round {} of {} admitted",
            self.press_count,
            self.config.max_presses
        );
        true
    }

    /// Advances the in-flight round by one unit of work.
    ///
    /// `dt` is the host frame delta; it is consumed by the settle wait.
    /// Does nothing while idle.
    pub fn tick(&mut self, dt: f64, observer: &mut dyn RoundObserver) {
        match self.phase {
            RoundPhase::Idle => {}
            RoundPhase::Snapshotting => self.snapshot_active_bodies(),
            RoundPhase::GeneratingCandidates => self.generate_round_candidates(),
            RoundPhase::Evaluating { index } => self.evaluate_one(index),
            RoundPhase::Selecting => self.select_winner(),
            RoundPhase::Committing => self.commit_winner(),
            RoundPhase::Settling { elapsed } => self.settle(elapsed + dt, observer),
        }
    }

    /// Drives the current round to completion, stepping the live world
    /// alongside each tick.
    pub fn run_round(&mut self, observer: &mut dyn RoundObserver) {
        let dt = self.config.time_step;
        while self.is_round_active() {
            self.tick(dt, observer);
            self.live.advance(dt);
        }
    }

    /// Advances the live world by one frame.
    pub fn advance_live(&mut self, dt: f64) {
        self.live.advance(dt);
    }

    /// True while a placement round is in flight.
    pub fn is_round_active(&self) -> bool {
        self.phase != RoundPhase::Idle
    }

    /// Toggles the kinematic freeze on all committed bodies.
    ///
    /// Freezing changes kinematic state only; stack membership is
    /// unchanged.
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
        for &id in &self.active {
            self.live.set_kinematic(id, frozen);
        }
    }

    /// True if the committed bodies are currently frozen.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Height of the top surface of the tallest committed body, 0 for an
    /// empty stack.
    pub fn current_max_height(&self) -> f64 {
        self.active
            .iter()
            .filter_map(|&id| self.live.body(id))
            .map(|body| body.position.y + body.half_extent)
            .fold(0.0, f64::max)
    }

    /// Current tallest-stack metric over the committed bodies.
    pub fn tallest_stack(&self) -> usize {
        tallest_stack(&self.active_poses(), self.config.stack_proximity)
    }

    /// Poses of all committed bodies, in placement order.
    pub fn active_poses(&self) -> Vec<Pose> {
        self.active
            .iter()
            .filter_map(|&id| self.live.body(id))
            .map(Body::pose)
            .collect()
    }

    /// Number of committed bodies.
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Placement requests honored so far.
    pub fn presses_used(&self) -> u32 {
        self.press_count
    }

    /// Placement requests still available.
    pub fn presses_remaining(&self) -> u32 {
        self.config.max_presses.saturating_sub(self.press_count)
    }

    /// The live world, for host-side inspection.
    pub fn live(&self) -> &World {
        &self.live
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn snapshot_active_bodies(&mut self) {
        self.snapshot_ids.clear();
        self.initial_states.clear();
        for &live_id in &self.active {
            let Some(live_body) = self.live.body(live_id) else {
                continue;
            };
            let state = live_body.snapshot();
            let half_extent = live_body.half_extent;
            let mut sim_body = self.sim_pool.acquire();
            sim_body.reset(&Pose::new(state.position, state.rotation), half_extent);
            sim_body.restore(&state);
            self.snapshot_ids.push(self.scratch.insert(sim_body));
            self.initial_states.push(state);
        }
        self.phase = RoundPhase::GeneratingCandidates;
    }

    fn generate_round_candidates(&mut self) {
        let drop_height = self.current_max_height() + self.config.drop_clearance;
        self.candidates = generate_candidates(
            &mut self.rng,
            drop_height,
            self.config.candidate_samples,
            self.config.candidate_x_step,
            &self.config.candidate_yaws,
        );
        self.scores.clear();
        self.phase = if self.candidates.is_empty() {
            RoundPhase::Selecting
        } else {
            RoundPhase::Evaluating { index: 0 }
        };
    }

    fn evaluate_one(&mut self, index: usize) {
        let score = evaluate_candidate(
            &mut self.scratch,
            &self.candidates[index],
            &self.snapshot_ids,
            &self.initial_states,
            &mut self.sim_pool,
            &self.config,
        );
        self.scores.push(score);
        self.phase = if index + 1 < self.candidates.len() {
            RoundPhase::Evaluating { index: index + 1 }
        } else {
            RoundPhase::Selecting
        };
    }

    fn select_winner(&mut self) {
        for id in self.snapshot_ids.drain(..) {
            if let Some(body) = self.scratch.remove(id) {
                self.sim_pool.release(body);
            }
        }
        self.initial_states.clear();

        match select_best(&self.scores) {
            Some(winner) => {
                self.pending_report = Some(RoundReport {
                    candidates: std::mem::take(&mut self.candidates),
                    scores: std::mem::take(&mut self.scores),
                    winner,
                });
                self.phase = RoundPhase::Committing;
            }
            None => {
                // Degenerate round: no candidates, nothing to commit.
                log::debug!("round produced no candidates; active stack unchanged");
                self.candidates.clear();
                self.phase = RoundPhase::Idle;
            }
        }
    }

    fn commit_winner(&mut self) {
        let Some(report) = self.pending_report.as_ref() else {
            self.phase = RoundPhase::Idle;
            return;
        };
        let pose = report.winning_candidate().pose;
        let score = report.scores[report.winner];

        let mut body = self.live_pool.acquire();
        body.reset(&pose, self.config.body_half_extent);
        let id = self.live.insert(body);
        self.active.push(id);

        log::info!(
            "committed candidate {} (score {:.2}, stable: {}) at x = {:.3}",
            report.winner,
            score.score,
            score.is_stable,
            pose.position.x
        );
        self.phase = RoundPhase::Settling { elapsed: 0.0 };
    }

    /// The settle wait is a fixed span of logical time, not a
    /// physics-settling detection: the metric is read after it regardless
    /// of whether the committed body has actually stopped moving.
    fn settle(&mut self, elapsed: f64, observer: &mut dyn RoundObserver) {
        if elapsed < self.config.settle_delay {
            self.phase = RoundPhase::Settling { elapsed };
            return;
        }

        let tallest = self.tallest_stack();
        if let Some(report) = self.pending_report.take() {
            let pose = report.winning_candidate().pose;
            observer.on_round_committed(&pose, &report);
        }
        observer.on_tallest_stack_changed(tallest);
        log::info!("round settled; tallest stack is {} bodies", tallest);
        self.phase = RoundPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> Config {
        // Short windows keep unit tests fast; thresholds stay at defaults.
        Config::default()
            .with_sim_duration(0.6)
            .with_settle_delay(0.2)
            .with_candidate_samples(3)
    }

    #[test]
    fn test_round_commits_one_body() {
        let mut orchestrator = Orchestrator::with_seed(quick_config(), 42).expect("valid config");
        assert!(orchestrator.request_placement());
        orchestrator.run_round(&mut NullObserver);

        assert_eq!(orchestrator.active_len(), 1);
        assert!(!orchestrator.is_round_active());
        assert_eq!(orchestrator.presses_used(), 1);
    }

    #[test]
    fn test_request_rejected_while_round_in_flight() {
        let mut orchestrator = Orchestrator::with_seed(quick_config(), 42).expect("valid config");
        assert!(orchestrator.request_placement());
        // Round admitted but not yet run: a second trigger is ignored and
        // does not consume a press.
        assert!(!orchestrator.request_placement());
        assert_eq!(orchestrator.presses_used(), 1);

        orchestrator.run_round(&mut NullObserver);
        assert!(orchestrator.request_placement());
        assert_eq!(orchestrator.presses_used(), 2);
    }

    #[test]
    fn test_zero_candidates_round_commits_nothing() {
        let config = quick_config().with_candidate_samples(0);
        let mut orchestrator = Orchestrator::with_seed(config, 42).expect("valid config");

        assert!(orchestrator.request_placement());
        orchestrator.run_round(&mut NullObserver);

        assert_eq!(orchestrator.active_len(), 0);
        assert!(!orchestrator.is_round_active());
        // The no-op round still consumed a press.
        assert_eq!(orchestrator.presses_used(), 1);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = Config::default().with_time_step(-1.0);
        assert!(Orchestrator::with_seed(config, 0).is_err());
    }

    #[test]
    fn test_freeze_changes_kinematic_state_not_membership() {
        let mut orchestrator = Orchestrator::with_seed(quick_config(), 42).expect("valid config");
        orchestrator.request_placement();
        orchestrator.run_round(&mut NullObserver);
        assert_eq!(orchestrator.active_len(), 1);

        orchestrator.set_frozen(true);
        assert!(orchestrator.is_frozen());
        assert_eq!(orchestrator.active_len(), 1);
        for (_, body) in orchestrator.live().iter() {
            assert!(body.kinematic);
        }

        orchestrator.set_frozen(false);
        for (_, body) in orchestrator.live().iter() {
            assert!(!body.kinematic);
        }
        assert_eq!(orchestrator.active_len(), 1);
    }

    #[test]
    fn test_max_height_empty_stack_is_zero() {
        let orchestrator = Orchestrator::with_seed(quick_config(), 42).expect("valid config");
        assert!(orchestrator.current_max_height().abs() < 1e-12);
    }
}
