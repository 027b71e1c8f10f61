//! Memory configuration.
//!
//! Parameters are frozen once a [`crate::Memory`] is built. Every
//! constructor runs [`MemoryConfig::validate`], so a memory never exists
//! with an unusable configuration.

use serde::{Deserialize, Serialize};

use crate::activation::MINIMUM_TEMPERATURE;
use crate::chunk::LearningMode;
use crate::error::{ActupError, Result};
use crate::fatigue::{ExponentSampling, FatigueParams};

/// Coupling between the fatigue equations and retrieval.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
	/// Probability (0-1) that a fatigue lapse suppresses a retrieval
	pub coupling: f64,
	/// Fatigue equation parameters
	pub fatigue: FatigueParams,
	/// When the time-on-task exponent is redrawn
	pub sampling: ExponentSampling,
}

impl Default for StressConfig {
	fn default() -> Self {
		Self {
			coupling: 1.0,
			fatigue: FatigueParams::default(),
			sampling: ExponentSampling::PerEvaluation,
		}
	}
}

/// Configuration for a declarative memory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
	/// `σ` - standard deviation of activation noise
	pub noise: f64,
	/// `d` - base-level decay exponent (0.5 for human-like decay)
	pub decay: f64,
	/// Use the closed-form base-level approximation
	pub optimized_learning: bool,
	/// `θ` - minimum activation for a successful retrieval (`None` = no threshold)
	pub threshold: Option<f64>,
	/// `τ` - blending temperature (`None` = `σ·√2`, floored at the minimum)
	pub temperature: Option<f64>,
	/// Fatigue coupling (`None` = retrieval ignores fatigue)
	pub stress: Option<StressConfig>,
}

impl Default for MemoryConfig {
	fn default() -> Self {
		Self {
			noise: 0.25,
			decay: 0.5,
			optimized_learning: false,
			threshold: None,
			temperature: None,
			stress: None,
		}
	}
}

impl MemoryConfig {
	/// Load configuration from a TOML string. Missing keys take defaults.
	///
	/// # Errors
	///
	/// Returns [`ActupError::Configuration`] if the TOML is malformed or the
	/// parameters fail validation.
	pub fn from_toml(toml_str: &str) -> Result<Self> {
		let config: Self = toml::from_str(toml_str).map_err(|e| ActupError::config(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	/// Set the noise `σ`.
	#[must_use]
	pub const fn with_noise(mut self, noise: f64) -> Self {
		self.noise = noise;
		self
	}

	/// Set the decay exponent `d`.
	#[must_use]
	pub const fn with_decay(mut self, decay: f64) -> Self {
		self.decay = decay;
		self
	}

	/// Enable or disable optimized learning.
	#[must_use]
	pub const fn with_optimized_learning(mut self, enabled: bool) -> Self {
		self.optimized_learning = enabled;
		self
	}

	/// Set the retrieval threshold.
	#[must_use]
	pub const fn with_threshold(mut self, threshold: Option<f64>) -> Self {
		self.threshold = threshold;
		self
	}

	/// Set an explicit blending temperature.
	#[must_use]
	pub const fn with_temperature(mut self, temperature: Option<f64>) -> Self {
		self.temperature = temperature;
		self
	}

	/// Couple retrieval to the fatigue equations.
	#[must_use]
	pub fn with_stress(mut self, stress: Option<StressConfig>) -> Self {
		self.stress = stress;
		self
	}

	/// Chunk accounting strategy selected by `optimized_learning`.
	#[must_use]
	pub const fn learning_mode(&self) -> LearningMode {
		if self.optimized_learning {
			LearningMode::Optimized
		} else {
			LearningMode::InstanceBased
		}
	}

	/// Temperature used for blending.
	#[must_use]
	pub fn effective_temperature(&self) -> f64 {
		self.temperature
			.unwrap_or_else(|| (self.noise * std::f64::consts::SQRT_2).max(MINIMUM_TEMPERATURE))
	}

	/// Check that every parameter is usable.
	///
	/// # Errors
	///
	/// Returns [`ActupError::Configuration`] naming the first bad parameter.
	pub fn validate(&self) -> Result<()> {
		if !self.noise.is_finite() || self.noise < 0.0 {
			return Err(ActupError::config(format!(
				"noise must be finite and non-negative, got {}",
				self.noise
			)));
		}
		if !self.decay.is_finite() || self.decay < 0.0 {
			return Err(ActupError::config(format!(
				"decay must be finite and non-negative, got {}",
				self.decay
			)));
		}
		if self.optimized_learning && self.decay >= 1.0 {
			return Err(ActupError::config(format!(
				"optimized learning requires decay below 1, got {}",
				self.decay
			)));
		}
		if let Some(threshold) = self.threshold {
			if !threshold.is_finite() {
				return Err(ActupError::config(format!(
					"threshold must be finite, got {threshold}"
				)));
			}
		}
		if let Some(temperature) = self.temperature {
			if !temperature.is_finite() || temperature < MINIMUM_TEMPERATURE {
				return Err(ActupError::config(format!(
					"temperature must be at least {MINIMUM_TEMPERATURE}, got {temperature}"
				)));
			}
		}
		if let Some(stress) = &self.stress {
			if !(0.0..=1.0).contains(&stress.coupling) {
				return Err(ActupError::config(format!(
					"stress coupling must lie in [0, 1], got {}",
					stress.coupling
				)));
			}
			stress.fatigue.validate()?;
		}
		Ok(())
	}
}
