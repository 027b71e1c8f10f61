//! Simulation Clock
//!
//! Time inside a memory only moves when the caller says so. There is no
//! wall-clock coupling: one unit is whatever the simulation decides
//! (rounds, seconds, minutes).

use serde::{Deserialize, Serialize};

use crate::error::{ActupError, Result};

/// Monotonically non-decreasing simulation time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeClock {
	now: f64,
}

impl TimeClock {
	/// A clock reading zero.
	#[must_use]
	pub const fn new() -> Self {
		Self { now: 0.0 }
	}

	/// Current simulation time.
	#[inline]
	#[must_use]
	pub const fn now(&self) -> f64 {
		self.now
	}

	/// Move time forward by `amount`.
	///
	/// # Errors
	///
	/// Returns [`ActupError::Domain`] if `amount` is negative or not finite.
	/// The clock is left untouched in that case.
	pub fn advance(&mut self, amount: f64) -> Result<()> {
		if !amount.is_finite() || amount < 0.0 {
			return Err(ActupError::domain(format!(
				"time can only advance by a finite non-negative amount, got {amount}"
			)));
		}
		self.now += amount;
		Ok(())
	}

	/// Move time forward by one unit.
	pub fn tick(&mut self) {
		self.now += 1.0;
	}
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
	use super::*;

	#[test]
	fn test_starts_at_zero() {
		assert_eq!(TimeClock::new().now(), 0.0);
	}

	#[test]
	fn test_advance_accumulates() {
		let mut clock = TimeClock::new();
		clock.advance(1.0).unwrap();
		clock.advance(2.5).unwrap();
		clock.advance(0.0).unwrap();
		assert_eq!(clock.now(), 3.5);
	}

	#[test]
	fn test_tick_adds_one_unit() {
		let mut clock = TimeClock::new();
		clock.tick();
		clock.advance(0.5).unwrap();
		clock.tick();
		assert_eq!(clock.now(), 2.5);
	}

	#[test]
	fn test_rejects_backwards_time() {
		let mut clock = TimeClock::new();
		clock.advance(2.0).unwrap();
		assert!(clock.advance(-1.0).unwrap_err().is_domain());
		assert!(clock.advance(f64::NAN).unwrap_err().is_domain());
		assert_eq!(clock.now(), 2.0);
	}
}
