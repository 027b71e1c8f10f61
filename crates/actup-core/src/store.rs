//! Chunk Store
//!
//! Chunks keyed by canonical signature, kept in creation order so that
//! iteration (and therefore display and tie pools) is deterministic.
//! Chunks are never removed: forgetting happens through activation decay.

use std::collections::HashMap;

use crate::chunk::{Chunk, LearningMode};
use crate::signature::{Cue, Signature};

/// All chunks known to one memory.
#[derive(Clone, Debug, Default)]
pub struct ChunkStore {
	mode: LearningMode,
	chunks: Vec<Chunk>,
	index: HashMap<Signature, usize>,
}

impl ChunkStore {
	/// An empty store using the given accounting strategy.
	#[must_use]
	pub fn new(mode: LearningMode) -> Self {
		Self {
			mode,
			chunks: Vec::new(),
			index: HashMap::new(),
		}
	}

	/// Accounting strategy for new chunks.
	#[must_use]
	pub const fn mode(&self) -> LearningMode {
		self.mode
	}

	/// Record an occurrence of `signature` at `time`.
	///
	/// Returns `true` if this created a new chunk.
	pub fn record(&mut self, signature: Signature, time: f64) -> bool {
		if let Some(&position) = self.index.get(&signature) {
			self.chunks[position].record(time);
			return false;
		}

		let position = self.chunks.len();
		self.chunks.push(Chunk::new(signature.clone(), time, self.mode));
		let _ = self.index.insert(signature, position);
		true
	}

	/// Chunks whose slots satisfy the cue's filters, in creation order.
	///
	/// The iterator is lazy and can be cloned to restart it.
	pub fn all_matching<'a>(
		&'a self,
		cue: &'a Cue,
		partial_matching: bool,
	) -> impl Iterator<Item = (&'a Signature, &'a Chunk)> + Clone + 'a {
		self.chunks
			.iter()
			.filter(move |chunk| cue.admits(chunk.signature(), partial_matching))
			.map(|chunk| (chunk.signature(), chunk))
	}

	/// Look up a chunk by its exact signature.
	#[must_use]
	pub fn get(&self, signature: &Signature) -> Option<&Chunk> {
		self.index
			.get(signature)
			.map(|&position| &self.chunks[position])
	}

	/// All chunks in creation order.
	pub fn iter(&self) -> impl Iterator<Item = &Chunk> + '_ {
		self.chunks.iter()
	}

	/// Number of distinct chunks.
	#[must_use]
	pub fn len(&self) -> usize {
		self.chunks.len()
	}

	/// Whether nothing has been learned yet.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.chunks.is_empty()
	}
}
