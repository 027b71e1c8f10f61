//! # Actup Core
//!
//! Declarative memory engine in the ACT-R tradition: an agent learns
//! attribute sets ("chunks"), and later recalls them from partial cues with
//! a strength that grows with use and fades with time.
//!
//! ## Core Concepts
//!
//! ### Activation
//!
//! Every chunk has an activation against a cue. The most active chunk is
//! the one recalled. Activation comes from three sources:
//!
//! 1. **Base-level activation** - Recency and frequency of occurrence
//!    ```text
//!    B = ln[Σ(now - t_j)^(-d)]
//!    ```
//!
//! 2. **Mismatch penalty** - How far the cue is from the chunk on the
//!    slots scored by similarity
//!    ```text
//!    P = Σ penalty(cue_value, chunk_value)
//!    ```
//!
//! 3. **Noise** - A logistic draw with standard deviation `σ`, fresh on
//!    every evaluation
//!
//! With optimized learning, `B` is computed from the occurrence count and
//! the chunk's age instead of every timestamp.
//!
//! ### Retrieval and Blending
//!
//! - `retrieve` returns the most active matching chunk, or nothing when no
//!   chunk matches or the winner falls below the threshold.
//! - `blend` returns the Boltzmann-weighted average of a numeric slot over
//!   every matching chunk.
//!
//! ### Fatigue
//!
//! The [`fatigue`] module models time-on-task fatigue as a degrading
//! utility racing a declining threshold. A memory configured with a
//! [`StressConfig`] uses it to turn otherwise successful retrievals into
//! lapses.
//!
//! ## Example
//!
//! ```rust
//! use actup_core::{Cue, Memory, MemoryConfig, Signature};
//!
//! let mut memory = Memory::seeded(MemoryConfig::default().with_noise(0.0), 42)?;
//!
//! memory.learn(Signature::new().with("player", "p2").with("move", "rock"))?;
//! memory.advance(1.0)?;
//!
//! let recalled = memory.retrieve(&Cue::new().exact("player", "p2"))?;
//! assert_eq!(
//!     recalled.map(|r| r.signature),
//!     Some(Signature::new().with("player", "p2").with("move", "rock"))
//! );
//! # Ok::<(), actup_core::ActupError>(())
//! ```
//!
//! ## References
//!
//! - Anderson, J. R., & Lebiere, C. (1998). *The Atomic Components of
//!   Thought* - ACT-R declarative memory
//! - Petrov, A. (2006). *Computationally efficient approximation of the
//!   base-level learning equation in ACT-R*
//! - Gonzalez, C., Lerch, J. F., & Lebiere, C. (2003). *Instance-based
//!   learning in dynamic decision making* - Blending
//! - Gunzelmann, G., et al. (2009). *Sleep deprivation and sustained
//!   attention performance* - Fatigue mechanism

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod activation;
pub mod chunk;
pub mod clock;
pub mod config;
pub mod error;
pub mod fatigue;
pub mod memory;
pub mod retrieval;
pub mod signature;
pub mod store;

pub use activation::{
	activation, base_level, blend_weights, instance_base_level, logistic_noise, logistic_scale,
	mismatch_penalty, optimized_base_level, retrieval_probability, ActivationBreakdown, PenaltyFn,
	MINIMUM_TEMPERATURE, OPTIMIZED_LEARNING_OFFSET,
};
pub use chunk::{Chunk, ChunkHistory, LearningMode};
pub use clock::TimeClock;
pub use config::{MemoryConfig, StressConfig};
pub use error::{ActupError, Result};
pub use fatigue::{
	fatigue_param, fatigue_param_with_rng, fatigue_thresh, is_lapse, utility, utility_threshold,
	utility_with_rng, ExponentSampling, FatigueCheck, FatigueParams, FatigueState,
};
pub use memory::Memory;
pub use retrieval::{Recall, Retrieved};
pub use signature::{Cue, MatchKind, Signature, Value};
pub use store::ChunkStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
