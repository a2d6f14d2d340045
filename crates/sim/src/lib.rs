//! # Stackwise Sim
//!
//! The candidate-placement simulator for the Stackwise block-stacking toy.
//!
//! Given the current stack of rigid bodies, the simulator picks a drop pose
//! for the next block that is likely to remain stable: it snapshots the live
//! stack into an isolated scratch world, runs a short forward simulation for
//! each of a bounded set of candidate poses, scores the outcomes and commits
//! the best one to the live world.
//!
//! ## Components
//!
//! - [`World`]: a self-contained rigid-cube physics world, used both as the
//!   host-owned live world and as the orchestrator-owned scratch world
//! - [`generate_candidates`]: bounded drop-pose hypothesis generation
//! - [`evaluate_candidate`]: one speculative simulation round plus scoring
//! - [`Orchestrator`]: the placement state machine tying it all together
//! - [`tallest_stack`]: greedy column clustering of the committed stack
//!
//! Rendering, input, audio and UI layout are out of scope; presentation
//! collaborators observe rounds through the [`RoundObserver`] interface.

pub mod body;
pub mod candidate;
pub mod evaluate;
pub mod metric;
pub mod orchestrator;
pub mod world;

// Re-exports
pub use body::{Body, BodySnapshot};
pub use candidate::{generate_candidates, select_best, Candidate, CandidateScore};
pub use evaluate::evaluate_candidate;
pub use metric::tallest_stack;
pub use orchestrator::{NullObserver, Orchestrator, RoundObserver, RoundReport};
pub use world::{BodyId, World};

pub use stackwise_core::{Config, Error, Pool, Pose, Result};
