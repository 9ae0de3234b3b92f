//! Agent positions.
//!
//! A position maps sentences to truth values. Missing sentences are suspended
//! judgements. Positions are values: updating one produces a new position and
//! leaves the old one untouched.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use num_bigint::BigUint;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::CompiledFormula;
use crate::formula::{Assignment, Debate, Formula, Sentence};
use crate::introduction::IntroductionChoice;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Position {
    values: Assignment,
    /// `None` until the agent is given a strategy.
    strategy: Option<IntroductionChoice>,
    /// Index of the debate snapshot this position refers to.
    debate: Option<usize>,
}

impl Position {
    pub fn new(values: Assignment) -> Self {
        Position {
            values,
            ..Default::default()
        }
    }

    pub fn with_strategy(mut self, strategy: impl Into<IntroductionChoice>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    /// Gives the position `strategy` unless it already has one.
    pub fn or_strategy(mut self, strategy: impl Into<IntroductionChoice>) -> Self {
        if self.strategy.is_none() {
            self.strategy = Some(strategy.into());
        }
        self
    }

    pub fn with_debate(mut self, debate: usize) -> Self {
        self.debate = Some(debate);
        self
    }

    /// A position with the same strategy and debate but different values.
    pub fn with_values(&self, values: Assignment) -> Self {
        Position {
            values,
            strategy: self.strategy.clone(),
            debate: self.debate,
        }
    }

    pub fn strategy(&self) -> Option<&IntroductionChoice> {
        self.strategy.as_ref()
    }

    pub fn debate(&self) -> Option<usize> {
        self.debate
    }

    pub fn values(&self) -> &Assignment {
        &self.values
    }

    pub fn get(&self, sentence: &Sentence) -> Option<bool> {
        self.values.get(sentence).copied()
    }

    pub fn insert(&mut self, sentence: Sentence, value: bool) {
        self.values.insert(sentence, value);
    }

    pub fn remove(&mut self, sentence: &Sentence) -> Option<bool> {
        self.values.remove(sentence)
    }

    pub fn contains(&self, sentence: &Sentence) -> bool {
        self.values.contains_key(sentence)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Sentence, bool)> {
        self.values.iter().map(|(s, &v)| (s, v))
    }

    pub fn sentences(&self) -> BTreeSet<Sentence> {
        self.values.keys().cloned().collect()
    }

    /// Whether the position holds every truth value in `requirements`.
    pub fn accepts(&self, requirements: &Assignment) -> bool {
        requirements.iter().all(|(s, v)| self.values.get(s) == Some(v))
    }

    /// Whether the position suspends judgement on every sentence in `requirements`.
    pub fn suspends(&self, requirements: &Assignment) -> bool {
        requirements.keys().all(|s| !self.values.contains_key(s))
    }

    /// Whether every one of `sentences` has a truth value.
    pub fn is_closed_over<'a>(&self, sentences: impl IntoIterator<Item = &'a Sentence>) -> bool {
        sentences.into_iter().all(|s| self.values.contains_key(s))
    }

    /// Whether the position is closed over the compiled formula and satisfies it.
    pub fn is_coherent(&self, formula: &CompiledFormula) -> bool {
        self.is_closed_over(formula.order()) && formula.satisfied_by(&self.values)
    }

    /// Bit string over `order`: `1` for true, `0` for false, `-` for suspended.
    pub fn to_bits(&self, order: &[Sentence]) -> String {
        order
            .iter()
            .map(|s| match self.get(s) {
                Some(true) => '1',
                Some(false) => '0',
                None => '-',
            })
            .collect()
    }

    /// Conjunction of the literals held by this position.
    pub fn to_formula(&self) -> Formula {
        Formula::and(self.iter().map(|(s, v)| Formula::literal(s.clone(), v)))
    }
}

impl From<Assignment> for Position {
    fn from(values: Assignment) -> Self {
        Position::new(values)
    }
}

impl FromIterator<(Sentence, bool)> for Position {
    fn from_iter<T: IntoIterator<Item = (Sentence, bool)>>(iter: T) -> Self {
        Position::new(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<(&'a str, bool)> for Position {
    fn from_iter<T: IntoIterator<Item = (&'a str, bool)>>(iter: T) -> Self {
        iter.into_iter().map(|(name, v)| (Sentence::new(name), v)).collect()
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iter().map(|(s, v)| format!("{}: {}", s, v)).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Draws `n` distinct coherent complete positions of `debate`.
///
/// Returns `None` if the debate has fewer than `n` models. The model count is
/// checked before anything is enumerated.
pub fn pick_random_positions<R: Rng + ?Sized>(n: usize, debate: &Debate, rng: &mut R) -> Option<Vec<Position>> {
    let compiled = CompiledFormula::for_debate(debate);
    if compiled.count_models() < BigUint::from(n) {
        return None;
    }
    let models = compiled.enumerate_models();
    Some(models.sample(n, rng).into_iter().map(Position::new).collect())
}

/// Fills every position up to `target_length` sentences with random values.
///
/// Sentences are drawn from `pool` in random order; positions that already
/// have `target_length` values are left alone. `None` means the whole pool.
pub fn init_positions<R: Rng + ?Sized>(
    positions: Vec<Position>,
    pool: &[Sentence],
    target_length: Option<usize>,
    rng: &mut R,
) -> Vec<Position> {
    let target_length = target_length.unwrap_or(pool.len()).min(pool.len());
    positions
        .into_iter()
        .map(|mut p| {
            if p.len() < target_length {
                let mut candidates: Vec<&Sentence> = pool.iter().collect();
                candidates.shuffle(rng);
                for s in candidates {
                    if p.len() >= target_length {
                        break;
                    }
                    if !p.contains(s) {
                        p.insert(s.clone(), rng.gen_bool(0.5));
                    }
                }
            }
            p
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::formula::Argument;

    fn s(name: &str) -> Sentence {
        Sentence::new(name)
    }

    #[test]
    fn test_accepts_and_suspends() {
        let p: Position = [("a", true), ("b", false)].into_iter().collect();

        assert!(p.accepts(&Assignment::from([(s("a"), true)])));
        assert!(!p.accepts(&Assignment::from([(s("b"), true)])));
        assert!(!p.accepts(&Assignment::from([(s("c"), true)])));
        assert!(p.suspends(&Assignment::from([(s("c"), true)])));
        assert!(!p.suspends(&Assignment::from([(s("a"), false)])));
    }

    #[test]
    fn test_bits_and_formula() {
        let p: Position = [("p1", true), ("p10", false)].into_iter().collect();
        let order = [s("p1"), s("p2"), s("p10")];
        assert_eq!(p.to_bits(&order), "1-0");
        assert_eq!(p.to_formula().to_string(), "p1 & ~p10");
        assert_eq!(p.to_string(), "{p1: true, p10: false}");
    }

    #[test]
    fn test_coherence() {
        let arg = Argument::new([Formula::atom("a")], Formula::atom("b")).unwrap();
        let compiled = CompiledFormula::for_debate(&Debate::new([arg]));

        let good: Position = [("a", true), ("b", true)].into_iter().collect();
        let bad: Position = [("a", true), ("b", false)].into_iter().collect();
        let open: Position = [("a", false)].into_iter().collect();
        assert!(good.is_coherent(&compiled));
        assert!(!bad.is_coherent(&compiled));
        assert!(!open.is_coherent(&compiled));
    }

    #[test]
    fn test_pick_random_positions() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let arg = Argument::new([Formula::atom("a")], Formula::atom("b")).unwrap();
        let debate = Debate::new([arg]);

        let picked = pick_random_positions(2, &debate, &mut rng).unwrap();
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0], picked[1]);
        assert!(pick_random_positions(4, &debate, &mut rng).is_none());
    }

    #[test]
    fn test_init_positions() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let pool: Vec<Sentence> = ["p0", "p1", "p2", "p3"].into_iter().map(Sentence::new).collect();
        let seeded: Position = [("p2", false)].into_iter().collect();

        let positions = init_positions(vec![seeded, Position::default()], &pool, Some(3), &mut rng);
        assert_eq!(positions[0].len(), 3);
        assert_eq!(positions[0].get(&s("p2")), Some(false));
        assert_eq!(positions[1].len(), 3);

        let positions = init_positions(vec![Position::default()], &pool, None, &mut rng);
        assert!(positions[0].is_closed_over(&pool));
    }
}
