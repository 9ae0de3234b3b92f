use std::collections::{BTreeSet, HashSet};

use num_bigint::BigUint;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use test_log::test;

use dialectic_rs::engine::{count_models, enumerate_models, CompiledFormula};
use dialectic_rs::formula::{Argument, Assignment, Debate, Formula, Sentence};
use dialectic_rs::introduction::{ArgumentDraw, GrowthMode};
use dialectic_rs::pool::SentencePool;
use dialectic_rs::Error;

fn grow(num_sentences: usize, num_arguments: usize, seed: u64) -> Debate {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let pool = SentencePool::parse(&format!("p:{}", num_sentences)).unwrap();
    let mut used = HashSet::new();
    let mut debate = Debate::default();
    for _ in 0..num_arguments {
        let draw = ArgumentDraw {
            pool: pool.sentences(),
            lengths: &[1, 2],
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

fn as_set(models: impl IntoIterator<Item = Assignment>) -> BTreeSet<Vec<(Sentence, bool)>> {
    models.into_iter().map(|m| m.into_iter().collect()).collect()
}

#[test]
fn test_count_matches_enumeration() {
    for seed in 0..10 {
        let debate = grow(6, 5, seed);
        let compiled = CompiledFormula::for_debate(&debate);
        let models = compiled.enumerate_models();
        assert_eq!(compiled.count_models(), BigUint::from(models.len()), "debate: {}", debate);
        assert!(models.iter().all(|m| compiled.satisfied_by(m)));
    }
}

#[test]
fn test_density_bounds() {
    for seed in 0..10 {
        let debate = grow(6, 6, seed);
        let compiled = CompiledFormula::for_debate(&debate);
        assert!(compiled.is_satisfiable());
        let density = debate.density();
        assert!((0.0..=1.0).contains(&density), "density {} of {}", density, debate);
        // Only a single remaining model pins the density to 1
        if compiled.count_models() > BigUint::from(1u32) {
            assert!(density < 1.0);
        }

        let unconstrained = BigUint::from(1u32) << debate.atoms().len();
        assert_eq!(density == 0.0, compiled.count_models() == unconstrained);
    }
}

#[test]
fn test_independent_atoms() {
    let debate = Debate::over([Sentence::new("a"), Sentence::new("b")]);
    assert_eq!(debate.count_models(), BigUint::from(4u32));
    assert_eq!(debate.density(), 0.0);
}

#[test]
fn test_single_implication() {
    let debate = Debate::new([Argument::new([Formula::atom("a")], Formula::atom("b")).unwrap()]);
    assert_eq!(debate.count_models(), BigUint::from(3u32));
    assert!((debate.density() - (2.0 - 3f64.log2()) / 2.0).abs() < 1e-12);

    let a = Sentence::new("a");
    let b = Sentence::new("b");
    let expected = as_set([
        Assignment::from([(a.clone(), false), (b.clone(), false)]),
        Assignment::from([(a.clone(), false), (b.clone(), true)]),
        Assignment::from([(a, true), (b, true)]),
    ]);
    assert_eq!(as_set(enumerate_models(&debate.to_formula())), expected);
}

#[test]
fn test_pair_premise_rejected() {
    let pair = Formula::and([Formula::atom("a"), Formula::atom("b")]);
    let result = Argument::new([pair], Formula::atom("c"));
    assert!(matches!(result, Err(Error::MalformedArgument { .. })));
}

#[test]
fn test_enumeration_is_idempotent() {
    let debate = grow(7, 6, 99);
    let compiled = CompiledFormula::for_debate(&debate);
    let first = as_set(compiled.enumerate_models());
    let second = as_set(compiled.enumerate_models());
    assert_eq!(first, second);
    assert_eq!(as_set(enumerate_models(&debate.to_formula())).len(), first.len());
}

#[test]
fn test_care_set_projection() {
    let debate = grow(5, 4, 3);
    let compiled = CompiledFormula::for_debate(&debate);
    let care: Vec<Sentence> = compiled.order().iter().take(2).cloned().collect();

    let projected = compiled.enumerate_models_with_care_set(&care);
    let expected: BTreeSet<Vec<(Sentence, bool)>> = compiled
        .enumerate_models()
        .into_iter()
        .map(|m| m.into_iter().filter(|(s, _)| care.contains(s)).collect())
        .collect();
    assert_eq!(as_set(projected), expected);
}

#[test]
fn test_free_function_count() {
    let formula = Formula::implies(Formula::atom("x"), -Formula::atom("y"));
    assert_eq!(count_models(&formula), BigUint::from(3u32));
}
