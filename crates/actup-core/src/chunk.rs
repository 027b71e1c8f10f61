//! Chunks and their occurrence histories.
//!
//! Two accounting strategies are supported, chosen once per memory:
//!
//! - **Instance-based**: every occurrence time is stored, so base-level
//!   activation is the exact power-law sum.
//! - **Optimized learning**: only `(count, first occurrence)` is kept, and
//!   base-level activation uses a closed-form approximation. Constant memory
//!   per chunk regardless of how often it recurs.

use serde::{Deserialize, Serialize};

use crate::signature::Signature;

/// Which accounting strategy a memory uses for its chunks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LearningMode {
	/// Keep every occurrence timestamp
	#[default]
	InstanceBased,
	/// Keep an O(1) summary
	Optimized,
}

impl LearningMode {
	/// History for a chunk first seen at `time`.
	#[must_use]
	pub fn first_occurrence(self, time: f64) -> ChunkHistory {
		match self {
			Self::InstanceBased => ChunkHistory::InstanceBased {
				references: vec![time],
			},
			Self::Optimized => ChunkHistory::Optimized {
				count: 1,
				first: time,
				last: time,
			},
		}
	}
}

/// Occurrence record of a chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ChunkHistory {
	/// Every occurrence, non-decreasing
	InstanceBased {
		/// Occurrence times
		references: Vec<f64>,
	},
	/// Summary sufficient for the optimized-learning approximation
	Optimized {
		/// Number of occurrences (always ≥ 1)
		count: u64,
		/// Time of the first occurrence
		first: f64,
		/// Time of the most recent occurrence
		last: f64,
	},
}

impl ChunkHistory {
	/// Add an occurrence at `time`.
	///
	/// Callers record at the memory's current time, which never runs
	/// backwards, so histories stay non-decreasing.
	pub fn record(&mut self, time: f64) {
		debug_assert!(time >= self.last_occurrence());
		match self {
			Self::InstanceBased { references } => references.push(time),
			Self::Optimized { count, last, .. } => {
				*count += 1;
				*last = time;
			}
		}
	}

	/// Number of recorded occurrences.
	#[must_use]
	pub fn reference_count(&self) -> u64 {
		match self {
			Self::InstanceBased { references } => references.len() as u64,
			Self::Optimized { count, .. } => *count,
		}
	}

	/// Time of the first occurrence.
	#[must_use]
	pub fn first_occurrence(&self) -> f64 {
		match self {
			Self::InstanceBased { references } => {
				references.first().copied().unwrap_or(f64::NEG_INFINITY)
			}
			Self::Optimized { first, .. } => *first,
		}
	}

	/// Time of the most recent occurrence.
	#[must_use]
	pub fn last_occurrence(&self) -> f64 {
		match self {
			Self::InstanceBased { references } => {
				references.last().copied().unwrap_or(f64::NEG_INFINITY)
			}
			Self::Optimized { last, .. } => *last,
		}
	}

	/// Which strategy produced this history.
	#[must_use]
	pub const fn mode(&self) -> LearningMode {
		match self {
			Self::InstanceBased { .. } => LearningMode::InstanceBased,
			Self::Optimized { .. } => LearningMode::Optimized,
		}
	}
}

/// A remembered attribute set and its occurrence history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
	signature: Signature,
	history: ChunkHistory,
}

impl Chunk {
	/// Create a chunk first seen at `time`.
	#[must_use]
	pub fn new(signature: Signature, time: f64, mode: LearningMode) -> Self {
		Self {
			signature,
			history: mode.first_occurrence(time),
		}
	}

	/// The chunk's attributes.
	#[must_use]
	pub const fn signature(&self) -> &Signature {
		&self.signature
	}

	/// The chunk's occurrence history.
	#[must_use]
	pub const fn history(&self) -> &ChunkHistory {
		&self.history
	}

	/// Add an occurrence at `time`.
	pub fn record(&mut self, time: f64) {
		self.history.record(time);
	}

	/// Number of recorded occurrences.
	#[must_use]
	pub fn reference_count(&self) -> u64 {
		self.history.reference_count()
	}

	/// Time of the first occurrence.
	#[must_use]
	pub fn first_occurrence(&self) -> f64 {
		self.history.first_occurrence()
	}

	/// Time of the most recent occurrence.
	#[must_use]
	pub fn last_occurrence(&self) -> f64 {
		self.history.last_occurrence()
	}
}
