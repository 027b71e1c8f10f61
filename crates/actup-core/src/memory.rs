//! Declarative Memory
//!
//! [`Memory`] owns everything one simulated agent remembers: its chunks,
//! its clock, its frozen parameters and its random source. Nothing is
//! shared between instances, and nothing happens unless the caller asks.
//!
//! ```rust
//! use actup_core::{Cue, Memory, MemoryConfig, Signature};
//!
//! let mut memory = Memory::seeded(MemoryConfig::default().with_noise(0.0), 7)?;
//! memory.learn(Signature::new().with("player", "p2").with("move", "rock"))?;
//! memory.advance(1.0)?;
//!
//! let recalled = memory.retrieve(&Cue::new().exact("player", "p2"))?;
//! assert_eq!(recalled.unwrap().get("move").unwrap().to_string(), "rock");
//! # Ok::<(), actup_core::ActupError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument, trace};

use crate::activation::{activation, logistic_noise, ActivationBreakdown, PenaltyFn};
use crate::chunk::Chunk;
use crate::clock::TimeClock;
use crate::config::MemoryConfig;
use crate::error::{ActupError, Result};
use crate::fatigue::{sample_exponent, ExponentSampling, FatigueCheck, FatigueState};
use crate::retrieval::{blend_outcome, retrieve_best, Recall, Retrieved};
use crate::signature::{Cue, Signature, Value};
use crate::store::ChunkStore;

/// A declarative memory for one simulated agent.
pub struct Memory<R = StdRng> {
	config: MemoryConfig,
	penalty: Option<PenaltyFn>,
	store: ChunkStore,
	clock: TimeClock,
	rng: R,
	/// Time-on-task exponent held for the current clock value
	round_exponent: Option<(f64, f64)>,
}

impl Memory<StdRng> {
	/// Create a memory with an entropy-seeded generator.
	///
	/// # Errors
	///
	/// Returns [`ActupError::Configuration`] if `config` is invalid.
	pub fn new(config: MemoryConfig) -> Result<Self> {
		Self::with_rng(config, StdRng::from_entropy())
	}

	/// Create a memory whose every random draw is determined by `seed`.
	///
	/// # Errors
	///
	/// Returns [`ActupError::Configuration`] if `config` is invalid.
	pub fn seeded(config: MemoryConfig, seed: u64) -> Result<Self> {
		Self::with_rng(config, StdRng::seed_from_u64(seed))
	}
}

impl<R: Rng> Memory<R> {
	/// Create a memory drawing randomness from `rng`.
	///
	/// # Errors
	///
	/// Returns [`ActupError::Configuration`] if `config` is invalid.
	pub fn with_rng(config: MemoryConfig, rng: R) -> Result<Self> {
		config.validate()?;
		debug!(
			noise = config.noise,
			decay = config.decay,
			optimized_learning = config.optimized_learning,
			"creating memory"
		);
		Ok(Self {
			store: ChunkStore::new(config.learning_mode()),
			config,
			penalty: None,
			clock: TimeClock::new(),
			rng,
			round_exponent: None,
		})
	}

	/// Enable partial matching with the given mismatch penalty.
	///
	/// The function must be symmetric, return `0.0` for identical values
	/// and a non-negative penalty otherwise. It is part of the memory's
	/// configuration and can only be set before anything is learned.
	///
	/// # Errors
	///
	/// Returns [`ActupError::Configuration`] if the memory already holds
	/// chunks or the penalty of a value against itself is not zero.
	#[allow(clippy::float_cmp)]
	pub fn with_mismatch_penalty<F>(mut self, penalty: F) -> Result<Self>
	where
		F: Fn(&Value, &Value) -> f64 + Send + Sync + 'static,
	{
		if !self.store.is_empty() {
			return Err(ActupError::config(
				"mismatch penalty must be configured before learning",
			));
		}
		for probe in [Value::Null, Value::from(0.0), Value::from("")] {
			let p = penalty(&probe, &probe);
			if p != 0.0 {
				return Err(ActupError::config(format!(
					"mismatch penalty of {probe:?} against itself must be 0, got {p}"
				)));
			}
		}
		self.penalty = Some(Arc::new(penalty));
		Ok(self)
	}

	// ========================================================================
	// Accessors
	// ========================================================================

	/// The frozen configuration.
	#[must_use]
	pub const fn config(&self) -> &MemoryConfig {
		&self.config
	}

	/// Current simulation time.
	#[must_use]
	pub const fn time(&self) -> f64 {
		self.clock.now()
	}

	/// Whether cue similarity slots are scored rather than filtered.
	#[must_use]
	pub const fn partial_matching(&self) -> bool {
		self.penalty.is_some()
	}

	/// All chunks in the order they were first learned.
	pub fn chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
		self.store.iter()
	}

	/// The chunk with exactly these attributes, if learned.
	#[must_use]
	pub fn chunk(&self, signature: &Signature) -> Option<&Chunk> {
		self.store.get(signature)
	}

	/// Number of distinct chunks.
	#[must_use]
	pub fn len(&self) -> usize {
		self.store.len()
	}

	/// Whether nothing has been learned.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.store.is_empty()
	}

	// ========================================================================
	// Time & Learning
	// ========================================================================

	/// Move simulation time forward by `amount`.
	///
	/// # Errors
	///
	/// Returns [`ActupError::Domain`] for a negative or non-finite amount.
	pub fn advance(&mut self, amount: f64) -> Result<()> {
		self.clock.advance(amount)?;
		trace!(time = self.clock.now(), "advanced");
		Ok(())
	}

	/// Move simulation time forward by one unit.
	pub fn advance_one(&mut self) {
		self.clock.tick();
		trace!(time = self.clock.now(), "advanced");
	}

	/// Record an occurrence of `attributes` at the current time.
	///
	/// Learning the same attributes again strengthens the existing chunk,
	/// even within a single instant.
	///
	/// # Errors
	///
	/// Returns [`ActupError::Configuration`] for an empty attribute set or
	/// an empty slot name.
	pub fn learn(&mut self, attributes: Signature) -> Result<()> {
		if attributes.is_empty() {
			return Err(ActupError::config("cannot learn an empty attribute set"));
		}
		if attributes.iter().any(|(slot, _)| slot.is_empty()) {
			return Err(ActupError::config("slot names must not be empty"));
		}

		let now = self.clock.now();
		let created = self.store.record(attributes, now);
		trace!(time = now, created, chunks = self.store.len(), "learned");
		Ok(())
	}

	// ========================================================================
	// Retrieval
	// ========================================================================

	fn score(&mut self, cue: &Cue, noisy: bool) -> Result<Vec<ActivationBreakdown>> {
		let now = self.clock.now();
		let decay = self.config.decay;
		let noise = if noisy { self.config.noise } else { 0.0 };
		let partial = self.penalty.is_some();

		let mut scored = Vec::new();
		for (_, chunk) in self.store.all_matching(cue, partial) {
			let draw = logistic_noise(&mut self.rng, noise);
			scored.push(activation(chunk, cue, now, decay, self.penalty.as_ref(), draw)?);
		}
		Ok(scored)
	}

	/// Activation breakdown of every chunk matching `cue`, with fresh noise.
	///
	/// # Errors
	///
	/// Returns [`ActupError::Domain`] if a matching chunk was learned at the
	/// current instant (advance time first), or a configuration error from
	/// the mismatch penalty.
	pub fn activations(&mut self, cue: &Cue) -> Result<Vec<ActivationBreakdown>> {
		self.score(cue, true)
	}

	/// Recall the most active chunk matching `cue`.
	///
	/// Returns `Ok(None)` when nothing matches or the winner falls below
	/// the retrieval threshold.
	///
	/// # Errors
	///
	/// See [`Memory::activations`].
	#[instrument(level = "debug", skip_all, fields(time = self.clock.now()))]
	pub fn retrieve(&mut self, cue: &Cue) -> Result<Option<Retrieved>> {
		let candidates = self.score(cue, true)?;
		let matched = candidates.len();
		let result = retrieve_best(&mut self.rng, candidates, self.config.threshold);
		debug!(matched, retrieved = result.is_some(), "retrieve");
		Ok(result)
	}

	/// Probability-weighted average of `outcome_slot` over chunks matching
	/// `cue`.
	///
	/// Uses noise-free activations, so the result depends only on the
	/// memory's contents and the current time. Returns `Ok(None)` when
	/// nothing matches.
	///
	/// # Errors
	///
	/// Returns [`ActupError::TypeMismatch`] if a matching chunk's outcome is
	/// not numeric, plus the errors of [`Memory::activations`].
	#[instrument(level = "debug", skip_all, fields(slot = outcome_slot, time = self.clock.now()))]
	pub fn blend(&mut self, outcome_slot: &str, cue: &Cue) -> Result<Option<f64>> {
		let candidates = self.score(cue, false)?;
		let blended = blend_outcome(
			outcome_slot,
			&candidates,
			self.config.effective_temperature(),
		)?;
		debug!(matched = candidates.len(), ?blended, "blend");
		Ok(blended)
	}

	#[allow(clippy::float_cmp)]
	fn fatigue_exponent(&mut self, sampling: ExponentSampling) -> f64 {
		let now = self.clock.now();
		match (sampling, self.round_exponent) {
			(ExponentSampling::PerRound, Some((round, exponent))) if round == now => exponent,
			(ExponentSampling::PerRound, _) => {
				let exponent = sample_exponent(&mut self.rng);
				self.round_exponent = Some((now, exponent));
				exponent
			}
			(ExponentSampling::PerEvaluation, _) => sample_exponent(&mut self.rng),
		}
	}

	/// Recall as [`Memory::retrieve`], but let fatigue suppress success.
	///
	/// With a stress configuration, a successful retrieval is checked
	/// against the fatigue equations at the caller's session state; if
	/// utility falls below its threshold the retrieval becomes a
	/// [`Recall::Lapse`] with probability `coupling`. Without one this
	/// never lapses.
	///
	/// # Errors
	///
	/// Errors of [`Memory::retrieve`], plus [`ActupError::Domain`] for an
	/// invalid session time.
	#[instrument(level = "debug", skip_all, fields(time = self.clock.now(), microlapses = state.microlapses()))]
	pub fn retrieve_with_fatigue(&mut self, cue: &Cue, state: &FatigueState) -> Result<Recall> {
		let Some(retrieved) = self.retrieve(cue)? else {
			return Ok(Recall::Failed);
		};
		let Some(stress) = self.config.stress.clone() else {
			return Ok(Recall::Retrieved(retrieved));
		};

		let exponent = self.fatigue_exponent(stress.sampling);
		let check: FatigueCheck = stress.fatigue.check_with_exponent(
			&mut self.rng,
			i64::from(state.microlapses()),
			state.time(),
			exponent,
		)?;
		let suppressed = check.lapse && self.rng.gen::<f64>() < stress.coupling;
		debug!(
			utility = check.utility,
			threshold = check.threshold,
			suppressed,
			"fatigue check"
		);

		if suppressed {
			Ok(Recall::Lapse)
		} else {
			Ok(Recall::Retrieved(retrieved))
		}
	}
}

impl<R> fmt::Debug for Memory<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Memory")
			.field("config", &self.config)
			.field("time", &self.clock.now())
			.field("chunks", &self.store.len())
			.field("partial_matching", &self.penalty.is_some())
			.finish_non_exhaustive()
	}
}

impl<R> fmt::Display for Memory<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(
			f,
			"Memory at time {} ({} chunks)",
			self.clock.now(),
			self.store.len()
		)?;
		for chunk in self.store.iter() {
			writeln!(
				f,
				"  {}  references: {}  created: {}",
				chunk.signature(),
				chunk.reference_count(),
				chunk.first_occurrence()
			)?;
		}
		Ok(())
	}
}
