//! A two-hour vigilance session run on the fatigue equations alone.
//!
//! Every simulated minute a microlapse occurs with probability 0.02, and
//! every microlapse degrades later utility. An error is any minute whose
//! utility falls below the declining utility threshold; the last column is
//! their running total.
//!
//! ```text
//! cargo run --example fatigue_session -- 7
//! ```

use actup_core::{FatigueCheck, FatigueParams, FatigueState};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SESSION_MINUTES: u32 = 120;
const LAPSE_PROBABILITY: f64 = 0.02;

/// One simulated minute of the session.
struct Minute {
	minute: u32,
	check: FatigueCheck,
	microlapses: u32,
	errors: u32,
}

fn run_session(params: &FatigueParams, seed: u64, minutes: u32) -> Result<Vec<Minute>> {
	let mut rng = StdRng::seed_from_u64(seed);
	let mut state = FatigueState::new();
	let mut errors = 0;
	let mut rows = Vec::with_capacity(minutes as usize);

	for minute in 1..=minutes {
		state.set_time(f64::from(minute))?;
		if rng.gen::<f64>() < LAPSE_PROBABILITY {
			state.record_lapse();
		}
		let check = params.check(&mut rng, i64::from(state.microlapses()), state.time())?;
		errors += u32::from(check.lapse);
		rows.push(Minute {
			minute,
			check,
			microlapses: state.microlapses(),
			errors,
		});
	}
	Ok(rows)
}

fn main() -> Result<()> {
	tracing_subscriber::fmt().init();

	let seed: u64 = match std::env::args().nth(1) {
		Some(arg) => arg.parse().context("seed must be an unsigned integer")?,
		None => 0,
	};

	for (ut_0, ut_tot) in [(4.0, -1.0), (4.0, -0.8), (4.0, -0.4), (4.0, 0.0)] {
		let params = FatigueParams {
			ut_0,
			ut_tot,
			..FatigueParams::default()
		};
		println!("ut_0 = {ut_0}, ut_tot = {ut_tot}");
		println!("minute   utility  threshold  lapses  errors");
		for row in run_session(&params, seed, SESSION_MINUTES)? {
			if row.minute % 10 == 0 {
				println!(
					"{:6}  {:8.3}  {:9.3}  {:6}  {:6}",
					row.minute, row.check.utility, row.check.threshold, row.microlapses, row.errors
				);
			}
		}
		println!();
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_errors_count_every_minute_below_threshold() {
		let rows = run_session(&FatigueParams::default(), 3, SESSION_MINUTES).unwrap();
		let below = rows.iter().filter(|row| row.check.lapse).count();
		let last = rows.last().unwrap();
		assert_eq!(last.errors as usize, below);
		assert!(last.errors > last.microlapses, "errors {} lapses {}", last.errors, last.microlapses);
	}

	#[test]
	fn test_microlapses_accumulate_independently_of_errors() {
		let rows = run_session(&FatigueParams::default(), 11, 2000).unwrap();
		let lapses = rows.last().unwrap().microlapses;
		// 2% of 2000 minutes
		assert!((15..=70).contains(&lapses), "{lapses}");
		assert!(rows.iter().any(|row| !row.check.lapse && row.microlapses > 0));
	}
}
