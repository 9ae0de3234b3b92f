//! Engine benchmarks on randomly grown debates.
//!
//! Run with:
//! ```bash
//! cargo bench --bench engine
//! ```

use std::collections::HashSet;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use dialectic_rs::engine::CompiledFormula;
use dialectic_rs::formula::Debate;
use dialectic_rs::introduction::{ArgumentDraw, GrowthMode};
use dialectic_rs::pool::SentencePool;
use dialectic_rs::position::init_positions;
use dialectic_rs::position::Position;
use dialectic_rs::update::{closest_closed_partial_coherent, closest_coherent};

// ============================================================================
// Helper: random debate growth
// ============================================================================

/// Grows a satisfiable debate of `num_arguments` arguments over `num_sentences` sentences.
fn random_debate(num_sentences: usize, num_arguments: usize, seed: u64) -> Debate {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let pool = SentencePool::parse(&format!("p:{}", num_sentences)).unwrap();
    let mut used = HashSet::new();
    let mut debate = Debate::default();
    for _ in 0..num_arguments {
        let draw = ArgumentDraw {
            pool: pool.sentences(),
            lengths: &[2],
            used_premises: &used,
            growth: GrowthMode::Random,
            key_statements: &[],
        };
        let Some(argument) = draw.draw(&debate, None, &mut rng) else {
            break;
        };
        let mut premises = argument.premises().to_vec();
        premises.sort();
        used.insert(premises);
        debate.push(argument);
    }
    debate
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_count_models(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/count_models");

    for n in [10, 20, 40] {
        let debate = random_debate(n, n, 42);
        group.bench_with_input(BenchmarkId::new("sentences", n), &debate, |b, debate| {
            b.iter(|| CompiledFormula::for_debate(debate).count_models());
        });
    }

    group.finish();
}

fn bench_enumerate_models(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/enumerate_models");
    group.sample_size(20);

    for n in [8, 10, 12] {
        let debate = random_debate(n, n / 2, 42);
        group.bench_with_input(BenchmarkId::new("sentences", n), &debate, |b, debate| {
            b.iter(|| CompiledFormula::for_debate(debate).enumerate_models().len());
        });
    }

    group.finish();
}

fn bench_updates(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/updates");
    group.sample_size(20);

    let n = 12;
    let debate = random_debate(n, n, 7);
    let pool = SentencePool::parse(&format!("p:{}", n)).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let positions = init_positions(vec![Position::default(); 10], pool.sentences(), None, &mut rng);
    let formula = CompiledFormula::for_debate_over(&debate, pool.sentences());
    let models = formula.enumerate_models();

    group.bench_function("closest_coherent", |b| {
        b.iter(|| {
            for p in &positions {
                closest_coherent(&models, p, &mut rng);
            }
        });
    });
    group.bench_function("closest_closed_partial_coherent", |b| {
        b.iter(|| {
            for p in &positions {
                closest_closed_partial_coherent(&formula, p, 4, &mut rng);
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_count_models, bench_enumerate_models, bench_updates);
criterion_main!(benches);
