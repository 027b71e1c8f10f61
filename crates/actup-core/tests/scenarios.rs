//! End-to-end scenarios for the memory engine.

#![allow(clippy::float_cmp, clippy::unwrap_used)]

use actup_core::{
	fatigue, Cue, ExponentSampling, FatigueParams, FatigueState, Memory, MemoryConfig, Recall,
	Signature, StressConfig, Value,
};

fn rps(player: &str, mv: &str) -> Signature {
	Signature::new().with("player", player).with("move", mv)
}

// ---------------------------------------------------------------------------
// Basic recall
// ---------------------------------------------------------------------------

#[test]
fn learned_move_is_recalled_after_one_tick() {
	let mut memory = Memory::new(MemoryConfig::default().with_noise(0.0)).unwrap();
	memory.learn(rps("p2", "rock")).unwrap();
	memory.advance(1.0).unwrap();

	let recalled = memory
		.retrieve(&Cue::new().exact("player", "p2"))
		.unwrap()
		.unwrap();
	assert_eq!(recalled.signature, rps("p2", "rock"));
	assert_eq!(recalled.signature.to_string(), "{player: p2, move: rock}");
}

#[test]
fn fresh_memory_recalls_nothing() {
	let mut memory = Memory::new(MemoryConfig::default()).unwrap();
	assert_eq!(memory.retrieve(&Cue::new().exact("player", "p2")).unwrap(), None);
	assert_eq!(memory.blend("payoff", &Cue::new()).unwrap(), None);
}

#[test]
fn unmatched_cue_recalls_nothing() {
	let mut memory = Memory::seeded(MemoryConfig::default(), 3).unwrap();
	memory.learn(rps("p1", "rock")).unwrap();
	memory.advance(1.0).unwrap();
	assert!(memory
		.retrieve(&Cue::new().exact("player", "p2"))
		.unwrap()
		.is_none());
}

#[test]
fn null_slots_take_part_in_matching() {
	let mut memory = Memory::seeded(MemoryConfig::default().with_noise(0.0), 3).unwrap();
	memory
		.learn(rps("p1", "rock").with("ultimate", None::<&str>))
		.unwrap();
	memory
		.learn(rps("p1", "paper").with("ultimate", "rock"))
		.unwrap();
	memory.advance(1.0).unwrap();

	let after_nothing = memory
		.retrieve(&Cue::new().exact("player", "p1").exact("ultimate", Value::Null))
		.unwrap()
		.unwrap();
	assert_eq!(after_nothing.get("move"), Some(&Value::from("rock")));

	let after_rock = memory
		.retrieve(&Cue::new().exact("player", "p1").exact("ultimate", "rock"))
		.unwrap()
		.unwrap();
	assert_eq!(after_rock.get("move"), Some(&Value::from("paper")));
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

fn noisy_session(seed: u64) -> Vec<String> {
	let mut memory = Memory::seeded(MemoryConfig::default().with_noise(0.8), seed).unwrap();
	for (i, mv) in ["rock", "paper", "scissors", "rock", "paper"].iter().enumerate() {
		memory.learn(rps("p1", mv)).unwrap();
		memory.advance(1.0 + i as f64).unwrap();
	}
	(0..30)
		.map(|_| {
			memory
				.retrieve(&Cue::new().exact("player", "p1"))
				.unwrap()
				.unwrap()
				.get("move")
				.unwrap()
				.to_string()
		})
		.collect()
}

#[test]
fn seeded_memories_replay_identically() {
	assert_eq!(noisy_session(11), noisy_session(11));
}

#[test]
fn noise_varies_the_winner() {
	let recalled = noisy_session(5);
	let first = &recalled[0];
	assert!(recalled.iter().any(|mv| mv != first), "{recalled:?}");
}

// ---------------------------------------------------------------------------
// Decay and strengthening
// ---------------------------------------------------------------------------

#[test]
fn recency_beats_age_without_noise() {
	let mut memory = Memory::seeded(MemoryConfig::default().with_noise(0.0), 0).unwrap();
	memory.learn(rps("p1", "rock")).unwrap();
	memory.advance(10.0).unwrap();
	memory.learn(rps("p1", "paper")).unwrap();
	memory.advance(1.0).unwrap();

	let recalled = memory.retrieve(&Cue::new()).unwrap().unwrap();
	assert_eq!(recalled.get("move"), Some(&Value::from("paper")));
}

#[test]
fn optimized_learning_tracks_instance_based_ranking() {
	let mut exact = Memory::seeded(MemoryConfig::default().with_noise(0.0), 0).unwrap();
	let mut approx = Memory::seeded(
		MemoryConfig::default()
			.with_noise(0.0)
			.with_optimized_learning(true),
		0,
	)
	.unwrap();

	for round in 0..200 {
		let mv = if round % 3 == 0 { "rock" } else { "paper" };
		exact.learn(rps("p1", mv)).unwrap();
		approx.learn(rps("p1", mv)).unwrap();
		exact.advance_one();
		approx.advance_one();
	}

	let cue = Cue::new().exact("player", "p1");
	let winner = |m: &mut Memory| m.retrieve(&cue).unwrap().unwrap().signature;
	assert_eq!(winner(&mut exact), rps("p1", "paper"));
	assert_eq!(winner(&mut approx), rps("p1", "paper"));

	let exact_levels = exact.activations(&cue).unwrap();
	let approx_levels = approx.activations(&cue).unwrap();
	for (e, a) in exact_levels.iter().zip(&approx_levels) {
		assert_eq!(e.signature, a.signature);
		assert!(
			(e.base_level - a.base_level).abs() < 0.15,
			"{} exact {} approx {}",
			e.signature,
			e.base_level,
			a.base_level
		);
	}
}

// ---------------------------------------------------------------------------
// Partial matching and blending
// ---------------------------------------------------------------------------

fn numeric_distance(a: &Value, b: &Value) -> f64 {
	match (a.as_f64(), b.as_f64()) {
		(Some(x), Some(y)) => (x - y).abs(),
		_ if a == b => 0.0,
		_ => 1.0,
	}
}

#[test]
fn blend_over_similar_prices() {
	let mut memory = Memory::seeded(MemoryConfig::default().with_noise(0.25), 8)
		.unwrap()
		.with_mismatch_penalty(numeric_distance)
		.unwrap();

	for (size, price) in [(1.0, 10.0), (2.0, 20.0), (3.0, 30.0)] {
		memory
			.learn(Signature::new().with("size", size).with("price", price))
			.unwrap();
	}
	memory.advance(1.0).unwrap();

	let near_small = memory
		.blend("price", &Cue::new().similar("size", 1.0))
		.unwrap()
		.unwrap();
	let near_large = memory
		.blend("price", &Cue::new().similar("size", 3.0))
		.unwrap()
		.unwrap();
	assert!(near_small < 20.0, "{near_small}");
	assert!(near_large > 20.0, "{near_large}");
	assert!((10.0..=30.0).contains(&near_small));
	assert!((10.0..=30.0).contains(&near_large));
}

#[test]
fn similarity_slots_filter_without_partial_matching() {
	let mut memory = Memory::seeded(MemoryConfig::default().with_noise(0.0), 8).unwrap();
	memory
		.learn(Signature::new().with("size", 1.0).with("price", 10.0))
		.unwrap();
	memory.advance(1.0).unwrap();
	assert!(memory
		.retrieve(&Cue::new().similar("size", 2.0))
		.unwrap()
		.is_none());
	assert!(memory
		.retrieve(&Cue::new().similar("size", 1.0))
		.unwrap()
		.is_some());
}

#[test]
fn blend_over_non_finite_payoffs() {
	let mut memory = Memory::seeded(MemoryConfig::default(), 4).unwrap();
	memory
		.learn(Signature::new().with("id", 1).with("payoff", f64::NAN))
		.unwrap();
	memory.advance(1.0).unwrap();
	let blended = memory.blend("payoff", &Cue::new()).unwrap().unwrap();
	assert!(blended.is_nan());

	let mut memory = Memory::seeded(MemoryConfig::default(), 4).unwrap();
	memory
		.learn(Signature::new().with("id", 1).with("payoff", f64::INFINITY))
		.unwrap();
	memory
		.learn(Signature::new().with("id", 2).with("payoff", 3.0))
		.unwrap();
	memory.advance(1.0).unwrap();
	let blended = memory.blend("payoff", &Cue::new()).unwrap().unwrap();
	assert_eq!(blended, f64::INFINITY);
}

#[test]
fn blending_symbols_is_a_type_mismatch() {
	let mut memory = Memory::seeded(MemoryConfig::default(), 1).unwrap();
	memory.learn(rps("p1", "rock")).unwrap();
	memory.advance(1.0).unwrap();
	let err = memory.blend("move", &Cue::new()).unwrap_err();
	assert!(err.is_type_mismatch());
	assert!(err.to_string().contains("move"));
}

// ---------------------------------------------------------------------------
// Fatigue
// ---------------------------------------------------------------------------

#[test]
fn utility_threshold_at_session_start() {
	assert_eq!(fatigue::utility_threshold(0.0, 3.6, -0.16).unwrap(), 3.6);
}

#[test]
fn fatigue_session_accumulates_lapses() {
	let stress = StressConfig {
		coupling: 1.0,
		fatigue: FatigueParams::default(),
		sampling: ExponentSampling::PerEvaluation,
	};
	let mut memory = Memory::seeded(
		MemoryConfig::default()
			.with_noise(0.0)
			.with_stress(Some(stress)),
		21,
	)
	.unwrap();
	memory.learn(rps("p1", "rock")).unwrap();

	let mut state = FatigueState::new();
	let mut early_lapses = 0;
	let mut late_lapses = 0;
	for minute in 1..=120 {
		memory.advance_one();
		state.set_time(f64::from(minute)).unwrap();
		let recall = memory.retrieve_with_fatigue(&Cue::new(), &state).unwrap();
		if recall == Recall::Lapse {
			state.record_lapse();
			if minute <= 10 {
				early_lapses += 1;
			} else if minute > 110 {
				late_lapses += 1;
			}
		}
	}

	assert!(state.microlapses() > 0);
	assert!(late_lapses > early_lapses, "early {early_lapses}, late {late_lapses}");
}

#[test]
fn fatigue_rejects_negative_lapses() {
	assert!(fatigue::fatigue_param(-1, 0.0, 0.98).unwrap_err().is_domain());
	assert!(fatigue::utility(-1, 0.0, 5.0, 0.2).unwrap_err().is_domain());
}
