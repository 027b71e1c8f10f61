//! Benchmarks for the full retrieval pipeline
//!
//! Tests end-to-end performance of `retrieve` and `blend` with:
//! - Various chunk counts (10, 100, 1000)
//! - Instance-based and optimized learning

#![allow(clippy::expect_used)] // Fine in benchmarks

use actup_core::{Cue, Memory, MemoryConfig, Signature};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;

/// Build a memory holding `chunk_count` distinct chunks, each learned a few times
fn populated_memory(chunk_count: usize, optimized: bool) -> Memory {
	let config = MemoryConfig::default().with_optimized_learning(optimized);
	let mut memory = Memory::seeded(config, 42).expect("valid config");
	let mut rng = rand::thread_rng();

	for round in 0..chunk_count * 4 {
		let id = rng.gen_range(0..chunk_count) as i64;
		let group = if id % 2 == 0 { "even" } else { "odd" };
		let payoff = rng.gen::<f64>() * 100.0;
		let attributes = Signature::new()
			.with("id", id)
			.with("group", group)
			.with("payoff", payoff.round());
		memory.learn(attributes).expect("learn should succeed");
		if round % 2 == 1 {
			memory.advance_one();
		}
	}
	memory.advance_one();
	memory
}

fn bench_retrieve(c: &mut Criterion) {
	let mut group = c.benchmark_group("retrieve");
	let cue = Cue::new().exact("group", "even");

	for chunk_count in &[10_usize, 100, 1000] {
		for optimized in [false, true] {
			let mut memory = populated_memory(*chunk_count, optimized);
			let label = if optimized { "optimized" } else { "instance" };

			let _ = group.throughput(Throughput::Elements(memory.len() as u64));
			let _ = group.bench_with_input(
				BenchmarkId::new(label, chunk_count),
				chunk_count,
				|bench, _| {
					bench.iter(|| memory.retrieve(black_box(&cue)).expect("retrieve"));
				},
			);
		}
	}

	group.finish();
}

fn bench_blend(c: &mut Criterion) {
	let mut group = c.benchmark_group("blend");
	let cue = Cue::new().exact("group", "odd");

	for chunk_count in &[10_usize, 100, 1000] {
		let mut memory = populated_memory(*chunk_count, false);

		let _ = group.throughput(Throughput::Elements(memory.len() as u64));
		let _ = group.bench_with_input(
			BenchmarkId::new("chunks", chunk_count),
			chunk_count,
			|bench, _| {
				bench.iter(|| memory.blend("payoff", black_box(&cue)).expect("blend"));
			},
		);
	}

	group.finish();
}

criterion_group!(benches, bench_retrieve, bench_blend);

criterion_main!(benches);
