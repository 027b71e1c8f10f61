//! Activation Calculation
//!
//! The mathematics of remembering.
//!
//! A chunk's activation against a cue has three components:
//! 1. **Base-level activation** (recency/frequency): `B = ln[Σ(now - t_j)^(-d)]`
//! 2. **Mismatch penalty** (partial matching): `Σ penalty(cue_value, chunk_value)`
//! 3. **Noise**: one logistic draw per evaluation
//!
//! `A = B - mismatch + noise`
//!
//! With optimized learning the base level is replaced by the closed form
//! `B ≈ ln(n / (1 - d)) - d·ln(L)` where `L` is the chunk's lifetime. For a
//! chunk recurring at a steady rate this tracks the exact sum ever more
//! closely as `n` grows.

use std::f64::consts::PI;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::chunk::{Chunk, ChunkHistory};
use crate::error::{ActupError, Result};
use crate::signature::{Cue, Signature, Value};

/// Offset added to the lifetime in the optimized-learning form so the
/// logarithm stays finite for a chunk created at the current instant.
pub const OPTIMIZED_LEARNING_OFFSET: f64 = 1e-9;

/// Lowest blending temperature accepted. Below this the softmax is
/// numerically indistinguishable from an argmax.
pub const MINIMUM_TEMPERATURE: f64 = 0.01;

/// Caller-supplied dissimilarity between a cue value and a chunk value.
///
/// Must be symmetric, return `0.0` for identical values and a non-negative
/// penalty otherwise.
pub type PenaltyFn = Arc<dyn Fn(&Value, &Value) -> f64 + Send + Sync>;

/// Breakdown of activation components for one chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivationBreakdown {
	/// Attributes of the scored chunk
	pub signature: Signature,
	/// From occurrence history
	pub base_level: f64,
	/// Total partial-matching penalty (non-negative, subtracted)
	pub mismatch: f64,
	/// Logistic noise draw
	pub noise: f64,
	/// `base_level - mismatch + noise`
	pub total: f64,
}

// ============================================================================
// Base-Level Activation
// ============================================================================

/// Exact base-level activation from every occurrence.
///
/// `B = ln[Σ(now - t_j)^(-d)]`
///
/// # Errors
///
/// Returns [`ActupError::Domain`] if `d > 0` and some occurrence is not
/// strictly in the past (`now - t_j <= 0`), or if there are no occurrences.
pub fn instance_base_level(references: &[f64], now: f64, decay: f64) -> Result<f64> {
	if references.is_empty() {
		return Err(ActupError::domain("chunk has no recorded occurrences"));
	}

	let mut sum = 0.0;
	for &t in references {
		let elapsed = now - t;
		if decay > 0.0 && elapsed <= 0.0 {
			return Err(ActupError::domain(format!(
				"occurrence at {t} is not before the current time {now}; advance time before retrieving"
			)));
		}
		sum += elapsed.powf(-decay);
	}

	Ok(sum.ln())
}

/// Closed-form base-level approximation for optimized learning.
///
/// `B = ln(n / (1 - d)) - d·ln(L + ε)`, `L = now - t_1`
///
/// # Errors
///
/// Returns [`ActupError::Domain`] if `d > 0` and the chunk's lifetime is
/// not positive, or if `count` is zero.
#[allow(clippy::cast_precision_loss)]
pub fn optimized_base_level(count: u64, first: f64, now: f64, decay: f64) -> Result<f64> {
	if count == 0 {
		return Err(ActupError::domain("chunk has no recorded occurrences"));
	}
	let n = count as f64;
	if decay == 0.0 {
		return Ok(n.ln());
	}

	let lifetime = now - first;
	if lifetime <= 0.0 {
		return Err(ActupError::domain(format!(
			"chunk created at {first} has no lifetime at time {now}; advance time before retrieving"
		)));
	}

	Ok((n / (1.0 - decay)).ln() - decay * (lifetime + OPTIMIZED_LEARNING_OFFSET).ln())
}

/// Base-level activation for either accounting strategy.
///
/// # Errors
///
/// See [`instance_base_level`] and [`optimized_base_level`].
pub fn base_level(history: &ChunkHistory, now: f64, decay: f64) -> Result<f64> {
	match history {
		ChunkHistory::InstanceBased { references } => instance_base_level(references, now, decay),
		ChunkHistory::Optimized { count, first, .. } => {
			optimized_base_level(*count, *first, now, decay)
		}
	}
}

// ============================================================================
// Partial Matching
// ============================================================================

/// Sum of mismatch penalties over the cue's similarity slots.
///
/// # Errors
///
/// Returns [`ActupError::Configuration`] if the penalty function yields a
/// negative or non-finite value.
pub fn mismatch_penalty(cue: &Cue, signature: &Signature, penalty: &PenaltyFn) -> Result<f64> {
	let mut total = 0.0;
	for (slot, wanted) in cue.similarity_slots() {
		let Some(found) = signature.get(slot) else {
			continue;
		};
		let p = penalty(wanted, found);
		if !p.is_finite() || p < 0.0 {
			return Err(ActupError::config(format!(
				"mismatch penalty for slot `{slot}` ({wanted} vs {found}) must be finite and non-negative, got {p}"
			)));
		}
		total += p;
	}
	Ok(total)
}

// ============================================================================
// Noise
// ============================================================================

/// Logistic scale for a noise standard deviation `σ`: `s = σ·√3/π`.
#[inline]
#[must_use]
pub fn logistic_scale(noise: f64) -> f64 {
	noise * 3.0_f64.sqrt() / PI
}

/// Draw activation noise from a logistic distribution.
///
/// Inverse CDF: `s·ln(u / (1 - u))`, `u ~ Uniform(0, 1)`. Zero noise returns
/// exactly `0.0` without touching the generator.
pub fn logistic_noise<R: Rng + ?Sized>(rng: &mut R, noise: f64) -> f64 {
	if noise == 0.0 {
		return 0.0;
	}
	let u: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
	logistic_scale(noise) * (u / (1.0 - u)).ln()
}

// ============================================================================
// Total Activation
// ============================================================================

/// Compute the activation of `chunk` against `cue` at time `now`.
///
/// `noise_draw` is supplied by the caller so that each evaluation gets its
/// own independent draw.
///
/// # Errors
///
/// Propagates base-level domain errors and penalty validation errors.
pub fn activation(
	chunk: &Chunk,
	cue: &Cue,
	now: f64,
	decay: f64,
	penalty: Option<&PenaltyFn>,
	noise_draw: f64,
) -> Result<ActivationBreakdown> {
	let base = base_level(chunk.history(), now, decay)?;
	let mismatch = match penalty {
		Some(penalty) => mismatch_penalty(cue, chunk.signature(), penalty)?,
		None => 0.0,
	};

	Ok(ActivationBreakdown {
		signature: chunk.signature().clone(),
		base_level: base,
		mismatch,
		noise: noise_draw,
		total: base - mismatch + noise_draw,
	})
}

// ============================================================================
// Retrieval Probability & Blending Weights
// ============================================================================

/// Compute probability of successful retrieval.
///
/// `P(recall) = 1 / (1 + e^((τ - A) / s))`
///
/// Where `τ` is the retrieval threshold, `A` the noise-free activation and
/// `s` the logistic noise scale. With `s = 0` this is a step function.
#[inline]
#[must_use]
pub fn retrieval_probability(total_activation: f64, threshold: f64, scale: f64) -> f64 {
	if scale == 0.0 {
		return if total_activation >= threshold { 1.0 } else { 0.0 };
	}
	let exponent = (threshold - total_activation) / scale;
	1.0 / (1.0 + exponent.exp())
}

/// Boltzmann weights `p_i = e^(A_i/τ) / Σ e^(A_k/τ)`.
///
/// Shifted by the maximum activation before exponentiating so large
/// activations cannot overflow. Returns an empty vector for no input.
#[must_use]
pub fn blend_weights(activations: &[f64], temperature: f64) -> Vec<f64> {
	let Some(max) = activations.iter().copied().reduce(f64::max) else {
		return Vec::new();
	};
	let exps: Vec<f64> = activations
		.iter()
		.map(|&a| ((a - max) / temperature).exp())
		.collect();
	let sum: f64 = exps.iter().sum();
	exps.into_iter().map(|e| e / sum).collect()
}
