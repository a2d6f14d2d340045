//! # Stackwise Core
//!
//! Foundational types for the Stackwise placement simulator.
//!
//! This crate provides the pieces shared by the simulation crates:
//!
//! - **Error taxonomy**: [`Error`], [`Result`]
//! - **Object pool**: [`Pool`] - reusable-instance allocator with FIFO reuse
//! - **Pose math**: [`Pose`] - position + unit-quaternion rotation
//! - **Configuration**: [`Config`] - all numeric tuning knobs in one place
//!
//! ## Configuration
//!
//! Use [`Config`] to configure simulation behavior:
//!
//! ```rust
//! use stackwise_core::Config;
//!
//! let config = Config::new()
//!     .with_sim_duration(1.5)
//!     .with_time_step(0.02)
//!     .with_candidate_samples(8);
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod config;
pub mod error;
pub mod pool;
pub mod pose;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use pool::Pool;
pub use pose::{ground_plane_distance, Pose};
