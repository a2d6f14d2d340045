//! Simulation configuration.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the placement simulator.
///
/// All tuning knobs are plain numeric values; there is no file format.
/// Configuration errors are rejected by [`validate`](Config::validate)
/// before a placement round enters the state machine, never mid-simulation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Total speculative simulation window per candidate (seconds).
    pub sim_duration: f64,

    /// Fixed physics time step (seconds).
    pub time_step: f64,

    /// Maximum horizontal displacement for a configuration to count as
    /// stable (meters).
    pub displacement_threshold: f64,

    /// Maximum tilt from vertical for a configuration to count as stable
    /// (degrees).
    pub tilt_threshold: f64,

    /// Number of candidate drop poses per round. Zero is a valid degenerate
    /// case: the round runs but commits nothing.
    pub candidate_samples: usize,

    /// Base lateral jitter step (meters). Candidate `i` draws its X offset
    /// uniformly from `[-step, step]` scaled by `i + 1`.
    pub candidate_x_step: f64,

    /// Discrete yaw choices for candidates (degrees about the vertical
    /// axis).
    pub candidate_yaws: Vec<f64>,

    /// Clearance above the current tallest surface at which candidates are
    /// dropped (meters).
    pub drop_clearance: f64,

    /// Maximum number of placement requests honored; further requests are
    /// silent no-ops.
    pub max_presses: u32,

    /// Fixed logical-time wait after committing a body before the stack
    /// metric is recomputed (seconds).
    pub settle_delay: f64,

    /// Half extent of the cubic bodies (meters).
    pub body_half_extent: f64,

    /// Ground-plane proximity within which two bodies may belong to the
    /// same column in the tallest-stack metric (meters).
    pub stack_proximity: f64,

    /// Initial size of the live and sandbox body pools.
    pub pool_size: usize,

    // Physics parameters
    /// Gravity acceleration along -Y (m/s^2, positive magnitude).
    pub gravity: f64,

    /// Friction applied to horizontal velocity on contact (0.0 - 1.0).
    pub friction: f64,

    /// Restitution (bounciness) on contact (0.0 - 1.0).
    pub restitution: f64,

    /// Speed below which a supported body is considered at rest (m/s).
    pub rest_velocity_threshold: f64,

    /// Iterations of pairwise contact resolution per step.
    pub solver_iterations: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sim_duration: 1.5,
            time_step: 0.02,
            displacement_threshold: 0.12,
            tilt_threshold: 20.0,
            candidate_samples: 8,
            candidate_x_step: 0.5,
            candidate_yaws: vec![-10.0, -5.0, 0.0, 5.0, 10.0],
            drop_clearance: 2.0,
            max_presses: 20,
            settle_delay: 2.0,
            body_half_extent: 0.5,
            stack_proximity: 0.8,
            pool_size: 25,
            gravity: 9.81,
            friction: 0.5,
            restitution: 0.1,
            rest_velocity_threshold: 0.05,
            solver_iterations: 10,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the speculative simulation window per candidate.
    pub fn with_sim_duration(mut self, seconds: f64) -> Self {
        self.sim_duration = seconds;
        self
    }

    /// Sets the physics time step.
    pub fn with_time_step(mut self, seconds: f64) -> Self {
        self.time_step = seconds;
        self
    }

    /// Sets the displacement and tilt stability thresholds.
    pub fn with_stability_thresholds(mut self, displacement: f64, tilt_degrees: f64) -> Self {
        self.displacement_threshold = displacement;
        self.tilt_threshold = tilt_degrees;
        self
    }

    /// Sets the number of candidates per round.
    pub fn with_candidate_samples(mut self, samples: usize) -> Self {
        self.candidate_samples = samples;
        self
    }

    /// Sets the base lateral jitter step.
    pub fn with_candidate_x_step(mut self, step: f64) -> Self {
        self.candidate_x_step = step.max(0.0);
        self
    }

    /// Sets the discrete yaw choices (degrees).
    pub fn with_candidate_yaws(mut self, yaws: Vec<f64>) -> Self {
        self.candidate_yaws = yaws;
        self
    }

    /// Sets the drop clearance above the tallest surface.
    pub fn with_drop_clearance(mut self, clearance: f64) -> Self {
        self.drop_clearance = clearance.max(0.0);
        self
    }

    /// Sets the maximum number of honored placement requests.
    pub fn with_max_presses(mut self, presses: u32) -> Self {
        self.max_presses = presses;
        self
    }

    /// Sets the post-commit settle delay.
    pub fn with_settle_delay(mut self, seconds: f64) -> Self {
        self.settle_delay = seconds.max(0.0);
        self
    }

    /// Sets the friction coefficient.
    pub fn with_friction(mut self, friction: f64) -> Self {
        self.friction = friction.clamp(0.0, 1.0);
        self
    }

    /// Sets the restitution (bounciness).
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution.clamp(0.0, 1.0);
        self
    }

    /// Validates the configuration.
    ///
    /// Rejects values that would make the simulation loop meaningless
    /// (non-positive durations, steps or body geometry; negative
    /// thresholds; an empty yaw set with a non-zero candidate count).
    /// `candidate_samples == 0` passes: such a round runs and commits
    /// nothing.
    pub fn validate(&self) -> Result<()> {
        if self.time_step <= 0.0 {
            return Err(Error::InvalidConfig("time step must be positive".into()));
        }
        if self.sim_duration <= 0.0 {
            return Err(Error::InvalidConfig(
                "simulation duration must be positive".into(),
            ));
        }
        if self.body_half_extent <= 0.0 {
            return Err(Error::InvalidConfig(
                "body half extent must be positive".into(),
            ));
        }
        if self.displacement_threshold < 0.0 || self.tilt_threshold < 0.0 {
            return Err(Error::InvalidConfig(
                "stability thresholds must be non-negative".into(),
            ));
        }
        if self.candidate_x_step < 0.0 {
            return Err(Error::InvalidConfig(
                "candidate jitter step must be non-negative".into(),
            ));
        }
        if self.stack_proximity <= 0.0 {
            return Err(Error::InvalidConfig(
                "stack proximity must be positive".into(),
            ));
        }
        if self.candidate_samples > 0 && self.candidate_yaws.is_empty() {
            return Err(Error::InvalidConfig(
                "candidate yaw set must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = Config::new()
            .with_sim_duration(2.0)
            .with_time_step(0.01)
            .with_candidate_samples(4)
            .with_stability_thresholds(0.2, 30.0)
            .with_max_presses(5);

        assert!((config.sim_duration - 2.0).abs() < 1e-12);
        assert!((config.time_step - 0.01).abs() < 1e-12);
        assert_eq!(config.candidate_samples, 4);
        assert!((config.displacement_threshold - 0.2).abs() < 1e-12);
        assert_eq!(config.max_presses, 5);
    }

    #[test]
    fn test_setters_clamp() {
        let config = Config::new().with_friction(1.5).with_restitution(-0.2);
        assert!((config.friction - 1.0).abs() < 1e-12);
        assert!(config.restitution.abs() < 1e-12);
    }

    #[test]
    fn test_rejects_non_positive_time_step() {
        let config = Config::new().with_time_step(0.0);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        let config = Config::new().with_sim_duration(-1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_yaws_with_candidates() {
        let config = Config::new().with_candidate_yaws(vec![]);
        assert!(config.validate().is_err());

        // But an empty yaw set is fine when no candidates are generated.
        let config = Config::new()
            .with_candidate_yaws(vec![])
            .with_candidate_samples(0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_candidate_samples_is_valid() {
        let config = Config::new().with_candidate_samples(0);
        assert!(config.validate().is_ok());
    }
}
