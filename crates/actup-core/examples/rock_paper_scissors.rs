//! Two players learn each other's habits at rock, paper, scissors.
//!
//! Each player recalls what the opponent played after the opponent's last
//! two moves and plays whatever beats it. Set `RUST_LOG=actup_core=debug`
//! to watch the retrievals.
//!
//! ```text
//! cargo run --example rock_paper_scissors -- 100
//! ```

use actup_core::{Cue, Memory, MemoryConfig, Signature, Value};
use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use tracing_subscriber::EnvFilter;

const MOVES: [&str; 3] = ["rock", "paper", "scissors"];

fn beats(mv: &str) -> &'static str {
	match mv {
		"rock" => "paper",
		"paper" => "scissors",
		_ => "rock",
	}
}

/// Score for `a` against `b`: 1 for a win, -1 for a loss, 0 for a draw.
fn score(a: &str, b: &str) -> i32 {
	if a == b {
		0
	} else if beats(b) == a {
		1
	} else {
		-1
	}
}

struct Player {
	name: &'static str,
	memory: Memory,
	/// Opponent's last two moves, most recent first
	history: [Option<String>; 2],
}

impl Player {
	fn new(name: &'static str, seed: u64) -> Result<Self> {
		let memory = Memory::seeded(MemoryConfig::default().with_noise(0.1), seed)?;
		Ok(Self {
			name,
			memory,
			history: [None, None],
		})
	}

	fn choose(&mut self) -> Result<String> {
		let cue = Cue::new()
			.exact("ultimate", self.history[0].clone())
			.exact("penultimate", self.history[1].clone());
		let expected = self
			.memory
			.retrieve(&cue)
			.with_context(|| format!("{} failed to recall", self.name))?;

		let choice = match expected.as_ref().and_then(|r| r.get("move")) {
			Some(Value::Text(mv)) => beats(mv),
			_ => MOVES
				.choose(&mut rand::thread_rng())
				.copied()
				.unwrap_or("rock"),
		};
		Ok(choice.to_string())
	}

	fn observe(&mut self, opponent_move: &str) -> Result<()> {
		self.memory.learn(
			Signature::new()
				.with("ultimate", self.history[0].clone())
				.with("penultimate", self.history[1].clone())
				.with("move", opponent_move),
		)?;
		self.history = [Some(opponent_move.to_string()), self.history[0].take()];
		Ok(())
	}
}

fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	let rounds: u32 = match std::env::args().nth(1) {
		Some(arg) => arg.parse().context("rounds must be a positive integer")?,
		None => 100,
	};

	let mut p1 = Player::new("p1", 1)?;
	let mut p2 = Player::new("p2", 2)?;
	let mut total = 0;

	for round in 1..=rounds {
		let m1 = p1.choose()?;
		let m2 = p2.choose()?;
		p1.observe(&m2)?;
		p2.observe(&m1)?;
		p1.memory.advance_one();
		p2.memory.advance_one();

		let result = score(&m1, &m2);
		total += result;
		println!("{round:4}  p1 {m1:<8}  p2 {m2:<8}  {result:+}  total {total:+}");
	}

	println!();
	print!("{}", p1.memory);
	Ok(())
}
