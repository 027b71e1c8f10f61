//! Fatigue and Stress
//!
//! Time-on-task fatigue modelled as a race between a degrading utility and
//! a slowly declining utility threshold:
//!
//! ```text
//! FP(t)  = fp_dcc^microlapses · (1 + t)^U,      U ~ Uniform(-1, 0)
//! UI(t)  = FP(t) · ui_t + N(0, noise_sigma)
//! FT(t)  = (1 + t)^ut_tot
//! UT(t)  = FT(t) · ut_0
//! ```
//!
//! Whenever `UI(t) < UT(t)` the agent suffers a lapse: it fails to act on
//! what it would otherwise have recalled. Every lapse the caller records
//! makes the next ones more likely through the `fp_dcc^microlapses` term.
//!
//! The functions here hold no state. `time` is in the same units as the
//! memory clock (minutes, by convention).

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{ActupError, Result};

/// Degradation applied per microlapse.
pub const DEFAULT_FP_DCC: f64 = 0.98;
/// Initial utility.
pub const DEFAULT_UI_T: f64 = 5.0;
/// Standard deviation of the utility noise.
pub const DEFAULT_NOISE_SIGMA: f64 = 0.2;
/// Initial utility threshold (motivation).
pub const DEFAULT_UT_0: f64 = 3.6;
/// Time-on-task decline of the utility threshold.
pub const DEFAULT_UT_TOT: f64 = -0.16;

// ============================================================================
// Validation
// ============================================================================

#[allow(clippy::cast_precision_loss)]
fn check_microlapses(microlapses: i64) -> Result<f64> {
	if microlapses < 0 {
		return Err(ActupError::domain(format!(
			"microlapses must be non-negative, got {microlapses}"
		)));
	}
	Ok(microlapses as f64)
}

fn check_time(time: f64) -> Result<()> {
	if !time.is_finite() || time < 0.0 {
		return Err(ActupError::domain(format!(
			"fatigue time must be finite and non-negative, got {time}"
		)));
	}
	Ok(())
}

// ============================================================================
// Equations
// ============================================================================

/// Draw the time-on-task exponent `U ~ Uniform(-1, 0)`.
pub fn sample_exponent<R: Rng + ?Sized>(rng: &mut R) -> f64 {
	rng.gen_range(-1.0..0.0)
}

/// Fatigue modulation for a given exponent `U`.
///
/// `FP = fp_dcc^microlapses · (1 + time)^U`
///
/// # Errors
///
/// Returns [`ActupError::Domain`] for negative `microlapses` or a negative
/// or non-finite `time`.
pub fn fatigue_param_with_exponent(
	microlapses: i64,
	time: f64,
	fp_dcc: f64,
	exponent: f64,
) -> Result<f64> {
	let lapses = check_microlapses(microlapses)?;
	check_time(time)?;
	Ok(fp_dcc.powf(lapses) * (1.0 + time).powf(exponent))
}

/// Fatigue modulation with a fresh exponent drawn from `rng`.
///
/// # Errors
///
/// See [`fatigue_param_with_exponent`].
pub fn fatigue_param_with_rng<R: Rng + ?Sized>(
	rng: &mut R,
	microlapses: i64,
	time: f64,
	fp_dcc: f64,
) -> Result<f64> {
	// Validate before consuming randomness
	let _ = check_microlapses(microlapses)?;
	check_time(time)?;
	fatigue_param_with_exponent(microlapses, time, fp_dcc, sample_exponent(rng))
}

/// Fatigue modulation using the thread-local generator.
///
/// # Errors
///
/// See [`fatigue_param_with_exponent`].
pub fn fatigue_param(microlapses: i64, time: f64, fp_dcc: f64) -> Result<f64> {
	fatigue_param_with_rng(&mut rand::thread_rng(), microlapses, time, fp_dcc)
}

fn gaussian<R: Rng + ?Sized>(rng: &mut R, sigma: f64) -> Result<f64> {
	if !sigma.is_finite() || sigma < 0.0 {
		return Err(ActupError::config(format!(
			"utility noise sigma must be finite and non-negative, got {sigma}"
		)));
	}
	let normal = Normal::new(0.0, sigma).map_err(|e| {
		ActupError::config(format!("utility noise sigma {sigma} is invalid: {e}"))
	})?;
	Ok(normal.sample(rng))
}

/// Utility as degraded by fatigue, with a fresh exponent and noise.
///
/// `UI = FP · ui_t + N(0, noise_sigma)`, where `FP` uses the default
/// degradation [`DEFAULT_FP_DCC`].
///
/// # Errors
///
/// Returns [`ActupError::Domain`] for invalid `microlapses`/`time` and
/// [`ActupError::Configuration`] for a negative or non-finite `noise_sigma`.
pub fn utility_with_rng<R: Rng + ?Sized>(
	rng: &mut R,
	microlapses: i64,
	time: f64,
	ui_t: f64,
	noise_sigma: f64,
) -> Result<f64> {
	let fp = fatigue_param_with_rng(rng, microlapses, time, DEFAULT_FP_DCC)?;
	Ok(fp.mul_add(ui_t, gaussian(rng, noise_sigma)?))
}

/// [`utility_with_rng`] using the thread-local generator.
///
/// # Errors
///
/// See [`utility_with_rng`].
pub fn utility(microlapses: i64, time: f64, ui_t: f64, noise_sigma: f64) -> Result<f64> {
	utility_with_rng(&mut rand::thread_rng(), microlapses, time, ui_t, noise_sigma)
}

/// Fatigue threshold modulation `FT = (1 + time)^ut_tot`.
///
/// Strictly decreasing in `time` for `ut_tot < 0`, strictly increasing for
/// `ut_tot > 0`, and `1.0` at `time = 0`.
///
/// # Errors
///
/// Returns [`ActupError::Domain`] for a negative or non-finite `time`.
pub fn fatigue_thresh(time: f64, ut_tot: f64) -> Result<f64> {
	check_time(time)?;
	Ok((1.0 + time).powf(ut_tot))
}

/// Utility threshold `UT = FT · ut_0`: the bar utility must clear.
///
/// # Errors
///
/// See [`fatigue_thresh`].
pub fn utility_threshold(time: f64, ut_0: f64, ut_tot: f64) -> Result<f64> {
	Ok(fatigue_thresh(time, ut_tot)? * ut_0)
}

/// Whether a utility falls short of its threshold.
#[inline]
#[must_use]
pub fn is_lapse(utility: f64, threshold: f64) -> bool {
	utility < threshold
}

// ============================================================================
// Parameter Bundle
// ============================================================================

/// When the time-on-task exponent `U` is redrawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExponentSampling {
	/// Fresh `U` for every utility evaluation
	#[default]
	PerEvaluation,
	/// One `U` per simulation time step, shared by every evaluation in it
	PerRound,
}

/// Parameters of the fatigue equations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueParams {
	/// Degradation per microlapse
	pub fp_dcc: f64,
	/// Initial utility
	pub ui_t: f64,
	/// Utility noise standard deviation
	pub noise_sigma: f64,
	/// Initial utility threshold
	pub ut_0: f64,
	/// Threshold time-on-task decline
	pub ut_tot: f64,
}

impl Default for FatigueParams {
	fn default() -> Self {
		Self {
			fp_dcc: DEFAULT_FP_DCC,
			ui_t: DEFAULT_UI_T,
			noise_sigma: DEFAULT_NOISE_SIGMA,
			ut_0: DEFAULT_UT_0,
			ut_tot: DEFAULT_UT_TOT,
		}
	}
}

/// Outcome of comparing utility against its threshold.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FatigueCheck {
	/// Fatigue-degraded utility
	pub utility: f64,
	/// Threshold it had to clear
	pub threshold: f64,
	/// `utility < threshold`
	pub lapse: bool,
}

impl FatigueParams {
	/// Check that every parameter is usable.
	///
	/// # Errors
	///
	/// Returns [`ActupError::Configuration`] naming the first bad parameter.
	pub fn validate(&self) -> Result<()> {
		if !self.fp_dcc.is_finite() || self.fp_dcc <= 0.0 {
			return Err(ActupError::config(format!(
				"fp_dcc must be finite and positive, got {}",
				self.fp_dcc
			)));
		}
		if !self.noise_sigma.is_finite() || self.noise_sigma < 0.0 {
			return Err(ActupError::config(format!(
				"fatigue noise_sigma must be finite and non-negative, got {}",
				self.noise_sigma
			)));
		}
		for (name, value) in [
			("ui_t", self.ui_t),
			("ut_0", self.ut_0),
			("ut_tot", self.ut_tot),
		] {
			if !value.is_finite() {
				return Err(ActupError::config(format!("{name} must be finite, got {value}")));
			}
		}
		Ok(())
	}

	/// Utility for a given exponent, with fresh noise.
	///
	/// # Errors
	///
	/// See [`utility_with_rng`].
	pub fn utility_with_exponent<R: Rng + ?Sized>(
		&self,
		rng: &mut R,
		microlapses: i64,
		time: f64,
		exponent: f64,
	) -> Result<f64> {
		let fp = fatigue_param_with_exponent(microlapses, time, self.fp_dcc, exponent)?;
		Ok(fp.mul_add(self.ui_t, gaussian(rng, self.noise_sigma)?))
	}

	/// Utility with a fresh exponent and noise.
	///
	/// # Errors
	///
	/// See [`utility_with_rng`].
	pub fn utility<R: Rng + ?Sized>(&self, rng: &mut R, microlapses: i64, time: f64) -> Result<f64> {
		// Validate before consuming randomness
		let _ = check_microlapses(microlapses)?;
		check_time(time)?;
		let exponent = sample_exponent(rng);
		self.utility_with_exponent(rng, microlapses, time, exponent)
	}

	/// Utility threshold at `time`.
	///
	/// # Errors
	///
	/// See [`fatigue_thresh`].
	pub fn utility_threshold(&self, time: f64) -> Result<f64> {
		utility_threshold(time, self.ut_0, self.ut_tot)
	}

	/// Compare utility (with a given exponent) against the threshold.
	///
	/// # Errors
	///
	/// See [`utility_with_rng`].
	pub fn check_with_exponent<R: Rng + ?Sized>(
		&self,
		rng: &mut R,
		microlapses: i64,
		time: f64,
		exponent: f64,
	) -> Result<FatigueCheck> {
		let utility = self.utility_with_exponent(rng, microlapses, time, exponent)?;
		let threshold = self.utility_threshold(time)?;
		Ok(FatigueCheck {
			utility,
			threshold,
			lapse: is_lapse(utility, threshold),
		})
	}

	/// Compare utility (fresh exponent) against the threshold.
	///
	/// # Errors
	///
	/// See [`utility_with_rng`].
	pub fn check<R: Rng + ?Sized>(
		&self,
		rng: &mut R,
		microlapses: i64,
		time: f64,
	) -> Result<FatigueCheck> {
		let _ = check_microlapses(microlapses)?;
		check_time(time)?;
		let exponent = sample_exponent(rng);
		self.check_with_exponent(rng, microlapses, time, exponent)
	}
}

// ============================================================================
// Caller-held State
// ============================================================================

/// Lapse counter and session clock kept by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FatigueState {
	microlapses: u32,
	time: f64,
}

impl FatigueState {
	/// Fresh session: no lapses, time zero.
	#[must_use]
	pub const fn new() -> Self {
		Self {
			microlapses: 0,
			time: 0.0,
		}
	}

	/// Number of lapses recorded so far.
	#[must_use]
	pub const fn microlapses(&self) -> u32 {
		self.microlapses
	}

	/// Current session time.
	#[must_use]
	pub const fn time(&self) -> f64 {
		self.time
	}

	/// Count one more lapse.
	pub fn record_lapse(&mut self) {
		self.microlapses = self.microlapses.saturating_add(1);
	}

	/// Move the session clock to `time`.
	///
	/// # Errors
	///
	/// Returns [`ActupError::Domain`] if `time` is earlier than the current
	/// session time or not finite.
	pub fn set_time(&mut self, time: f64) -> Result<()> {
		check_time(time)?;
		if time < self.time {
			return Err(ActupError::domain(format!(
				"session time cannot move backwards from {} to {time}",
				self.time
			)));
		}
		self.time = time;
		Ok(())
	}
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	use super::*;

	fn rng() -> StdRng {
		StdRng::seed_from_u64(42)
	}

	#[test]
	fn test_utility_threshold_at_zero() {
		assert_eq!(utility_threshold(0.0, 3.6, -0.16).unwrap(), 3.6);
		assert_eq!(fatigue_thresh(0.0, 5.0).unwrap(), 1.0);
	}

	#[test]
	fn test_fatigue_thresh_monotonicity() {
		let times = [0.0, 0.5, 1.0, 10.0, 60.0, 1000.0];
		for pair in times.windows(2) {
			let (a, b) = (pair[0], pair[1]);
			assert!(fatigue_thresh(b, -0.16).unwrap() < fatigue_thresh(a, -0.16).unwrap());
			assert!(fatigue_thresh(b, 0.3).unwrap() > fatigue_thresh(a, 0.3).unwrap());
			assert_eq!(fatigue_thresh(b, 0.0).unwrap(), 1.0);
		}
	}

	#[test]
	fn test_negative_microlapses_rejected() {
		let mut rng = rng();
		assert!(fatigue_param_with_rng(&mut rng, -1, 1.0, 0.98)
			.unwrap_err()
			.is_domain());
		assert!(utility_with_rng(&mut rng, -3, 1.0, 5.0, 0.2)
			.unwrap_err()
			.is_domain());
		assert!(fatigue_param(-1, 0.0, DEFAULT_FP_DCC).unwrap_err().is_domain());
	}

	#[test]
	fn test_negative_time_rejected() {
		assert!(fatigue_thresh(-0.5, -0.16).unwrap_err().is_domain());
		assert!(fatigue_param_with_exponent(0, f64::INFINITY, 0.98, -0.5)
			.unwrap_err()
			.is_domain());
	}

	#[test]
	fn test_fatigue_param_bounds() {
		// (1+t)^U with U in (-1, 0) lies in ((1+t)^-1, 1]
		let mut rng = rng();
		for _ in 0..500 {
			let fp = fatigue_param_with_rng(&mut rng, 0, 9.0, 0.98).unwrap();
			assert!(fp > 0.1 && fp <= 1.0, "fp {fp}");
		}
	}

	#[test]
	fn test_microlapses_degrade_fatigue_param() {
		let fresh = fatigue_param_with_exponent(0, 4.0, 0.98, -0.5).unwrap();
		let tired = fatigue_param_with_exponent(10, 4.0, 0.98, -0.5).unwrap();
		assert!((tired - fresh * 0.98_f64.powi(10)).abs() < 1e-12);
	}

	#[test]
	fn test_noise_free_utility_at_time_zero() {
		// (1+0)^U = 1, so UI = ui_t exactly when sigma = 0
		let mut rng = rng();
		assert_eq!(utility_with_rng(&mut rng, 0, 0.0, 5.0, 0.0).unwrap(), 5.0);
	}

	#[test]
	fn test_utility_is_reproducible_with_seed() {
		let a = utility_with_rng(&mut rng(), 3, 12.0, 5.0, 0.2).unwrap();
		let b = utility_with_rng(&mut rng(), 3, 12.0, 5.0, 0.2).unwrap();
		assert_eq!(a, b);
	}

	#[test]
	fn test_invalid_noise_sigma() {
		assert!(utility_with_rng(&mut rng(), 0, 1.0, 5.0, -0.2)
			.unwrap_err()
			.is_configuration());
		assert!(utility_with_rng(&mut rng(), 0, 1.0, 5.0, f64::NAN)
			.unwrap_err()
			.is_configuration());
		assert!(utility_with_rng(&mut rng(), 0, 1.0, 5.0, 0.0).is_ok());
	}

	#[test]
	fn test_huge_microlapse_counts_are_accepted() {
		let state_max = i64::from(u32::MAX);
		let fp = fatigue_param_with_exponent(state_max, 10.0, DEFAULT_FP_DCC, -0.5).unwrap();
		assert!((0.0..1e-6).contains(&fp));
		let fp = fatigue_param_with_exponent(i64::MAX, 10.0, DEFAULT_FP_DCC, -0.5).unwrap();
		assert_eq!(fp, 0.0);
	}

	#[test]
	fn test_params_validation() {
		assert!(FatigueParams::default().validate().is_ok());
		let bad = FatigueParams {
			fp_dcc: 0.0,
			..Default::default()
		};
		assert!(bad.validate().unwrap_err().is_configuration());
		let bad = FatigueParams {
			ut_tot: f64::NAN,
			..Default::default()
		};
		assert!(bad.validate().is_err());
	}

	#[test]
	fn test_check_flags_lapses() {
		let mut rng = rng();
		// A threshold nobody can clear
		let hopeless = FatigueParams {
			ut_0: 1e6,
			..Default::default()
		};
		assert!(hopeless.check(&mut rng, 0, 5.0).unwrap().lapse);

		// A threshold everybody clears
		let easy = FatigueParams {
			ut_0: -1e6,
			..Default::default()
		};
		assert!(!easy.check(&mut rng, 0, 5.0).unwrap().lapse);
	}

	#[test]
	fn test_lapses_grow_more_frequent() {
		// Late in a long session with many lapses, utility dips below the
		// threshold far more often than at the start.
		let params = FatigueParams::default();
		let mut rng = rng();
		let count = |rng: &mut StdRng, lapses: i64, time: f64| {
			(0..2000)
				.filter(|_| params.check(rng, lapses, time).unwrap().lapse)
				.count()
		};
		let early = count(&mut rng, 0, 0.0);
		let late = count(&mut rng, 50, 60.0);
		assert!(late > early, "early {early}, late {late}");
	}

	#[test]
	fn test_state_tracks_session() {
		let mut state = FatigueState::new();
		state.record_lapse();
		state.record_lapse();
		state.set_time(3.0).unwrap();
		assert_eq!(state.microlapses(), 2);
		assert_eq!(state.time(), 3.0);
		assert!(state.set_time(1.0).unwrap_err().is_domain());
		assert_eq!(state.time(), 3.0);
	}
}
