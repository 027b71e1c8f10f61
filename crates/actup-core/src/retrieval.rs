//! Retrieval and Blending
//!
//! Selection policies over a set of scored candidates:
//!
//! - **Retrieve**: the single most active chunk, if it clears the threshold.
//!   Ties are broken uniformly at random so that the order chunks were
//!   learned in never biases recall.
//! - **Blend**: the Boltzmann-weighted average of a numeric outcome slot
//!   over every candidate.

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::activation::{blend_weights, ActivationBreakdown};
use crate::error::{ActupError, Result};
use crate::signature::{Signature, Value};

/// A successfully recalled chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Retrieved {
	/// Attributes of the recalled chunk
	pub signature: Signature,
	/// Activation that won the retrieval (noise included)
	pub activation: f64,
}

impl Retrieved {
	/// Value of `slot` in the recalled chunk.
	#[must_use]
	pub fn get(&self, slot: &str) -> Option<&Value> {
		self.signature.get(slot)
	}
}

/// Outcome of a retrieval that may be cut short by fatigue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Recall {
	/// A chunk was recalled
	Retrieved(Retrieved),
	/// Nothing matched, or the best match fell below the threshold
	Failed,
	/// A chunk would have been recalled but fatigue suppressed it
	Lapse,
}

impl Recall {
	/// The recalled chunk, if any.
	#[must_use]
	pub fn retrieved(self) -> Option<Retrieved> {
		match self {
			Self::Retrieved(retrieved) => Some(retrieved),
			Self::Failed | Self::Lapse => None,
		}
	}

	/// Whether fatigue suppressed this retrieval.
	#[must_use]
	pub const fn is_lapse(&self) -> bool {
		matches!(self, Self::Lapse)
	}
}

/// Whether an activation clears an optional threshold.
#[inline]
#[must_use]
pub fn passes_threshold(activation: f64, threshold: Option<f64>) -> bool {
	!matches!(threshold, Some(theta) if activation < theta)
}

/// Index of the most active candidate, ties broken uniformly at random.
///
/// Returns `None` for an empty candidate list.
#[allow(clippy::float_cmp)]
pub fn select_best<R: Rng + ?Sized>(rng: &mut R, candidates: &[ActivationBreakdown]) -> Option<usize> {
	let mut best = f64::NEG_INFINITY;
	let mut tied: SmallVec<[usize; 4]> = SmallVec::new();

	for (i, candidate) in candidates.iter().enumerate() {
		if candidate.total > best {
			best = candidate.total;
			tied.clear();
			tied.push(i);
		} else if candidate.total == best {
			tied.push(i);
		}
	}

	match tied.len() {
		0 => None,
		1 => Some(tied[0]),
		n => Some(tied[rng.gen_range(0..n)]),
	}
}

/// Pick the winner among `candidates` and apply the threshold.
pub fn retrieve_best<R: Rng + ?Sized>(
	rng: &mut R,
	candidates: Vec<ActivationBreakdown>,
	threshold: Option<f64>,
) -> Option<Retrieved> {
	let winner = select_best(rng, &candidates)?;
	let best = candidates.into_iter().nth(winner)?;
	if !passes_threshold(best.total, threshold) {
		return None;
	}
	Some(Retrieved {
		signature: best.signature,
		activation: best.total,
	})
}

/// Numeric outcome of `slot` for one candidate.
fn outcome(slot: &str, signature: &Signature) -> Result<f64> {
	match signature.get(slot) {
		Some(value) => value.as_f64().ok_or_else(|| ActupError::TypeMismatch {
			slot: slot.to_string(),
			found: value.describe(),
		}),
		None => Err(ActupError::TypeMismatch {
			slot: slot.to_string(),
			found: format!("no value in chunk {signature}"),
		}),
	}
}

/// Boltzmann-weighted average of `slot` over `candidates`.
///
/// `Σ p_i·v_i` with `p_i = e^(A_i/τ) / Σ e^(A_k/τ)`. The result is clamped
/// to the range of observed values to absorb rounding. A NaN outcome makes
/// the blend NaN. Returns `Ok(None)` for no candidates.
///
/// # Errors
///
/// Returns [`ActupError::TypeMismatch`] if any candidate lacks a numeric
/// value for `slot`.
pub fn blend_outcome(
	slot: &str,
	candidates: &[ActivationBreakdown],
	temperature: f64,
) -> Result<Option<f64>> {
	if candidates.is_empty() {
		return Ok(None);
	}

	let values = candidates
		.iter()
		.map(|candidate| outcome(slot, &candidate.signature))
		.collect::<Result<Vec<f64>>>()?;
	let activations: Vec<f64> = candidates.iter().map(|c| c.total).collect();
	let weights = blend_weights(&activations, temperature);

	let blended: f64 = weights.iter().zip(&values).map(|(p, v)| p * v).sum();
	if values.iter().any(|v| v.is_nan()) {
		return Ok(Some(f64::NAN));
	}
	let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
	let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
	Ok(Some(blended.clamp(lo, hi)))
}
