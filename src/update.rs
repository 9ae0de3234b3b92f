//! Position updates: moving a position to a nearby coherent one.
//!
//! Two strategies exist. `closest_coherent` scans the full, precomputed list
//! of models. `closest_closed_partial_coherent` searches outward from the
//! position layer by layer and never enumerates more than the completions of
//! the positions it visits, at the price of a bounded radius.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::distance::normalised_edit_distance;
use crate::engine::{CompiledFormula, Models};
use crate::error::{Error, Result};
use crate::formula::{Assignment, Debate, Sentence};
use crate::position::Position;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum UpdateStrategy {
    #[default]
    ClosestCoherent,
    ClosestClosedPartialCoherent,
}

impl FromStr for UpdateStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "closest_coherent" => Ok(UpdateStrategy::ClosestCoherent),
            "closest_closed_partial_coherent" => Ok(UpdateStrategy::ClosestClosedPartialCoherent),
            _ => Err(Error::UnknownUpdateStrategy { name: s.to_string() }),
        }
    }
}

impl Display for UpdateStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateStrategy::ClosestCoherent => write!(f, "closest_coherent"),
            UpdateStrategy::ClosestClosedPartialCoherent => write!(f, "closest_closed_partial_coherent"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UpdateFailure {
    /// The debate has no coherent position at all.
    NoModels,
    /// No closed coherent position lies within the search radius.
    RadiusExhausted { radius: usize },
}

impl Display for UpdateFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateFailure::NoModels => write!(f, "the debate has no coherent positions"),
            UpdateFailure::RadiusExhausted { radius } => {
                write!(f, "no closed coherent position within radius {}", radius)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated { position: Position, distance: f64 },
    /// The update failed and `position` is the unchanged target.
    Failed { position: Position, reason: UpdateFailure },
}

impl UpdateOutcome {
    pub fn position(&self) -> &Position {
        match self {
            UpdateOutcome::Updated { position, .. } | UpdateOutcome::Failed { position, .. } => position,
        }
    }

    pub fn into_position(self) -> Position {
        match self {
            UpdateOutcome::Updated { position, .. } | UpdateOutcome::Failed { position, .. } => position,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, UpdateOutcome::Updated { .. })
    }
}

/// Moves `target` to a model with the fewest disagreements on the sentences
/// both mention, breaking ties uniformly at random.
///
/// The model's values replace the target's; sentences outside the models are
/// kept as they are. `distance` is the normalised Hamming distance on the
/// shared sentences.
pub fn closest_coherent<R: Rng + ?Sized>(models: &Models, target: &Position, rng: &mut R) -> UpdateOutcome {
    let Some(first) = models.first() else {
        return UpdateOutcome::Failed {
            position: target.clone(),
            reason: UpdateFailure::NoModels,
        };
    };
    // All models share one domain.
    let shared: Vec<&Sentence> = first.keys().filter(|s| target.contains(s)).collect();

    let disagreements =
        |model: &Assignment| shared.iter().filter(|s| target.get(s) != model.get(**s).copied()).count();

    // Reservoir sampling over the models at minimal distance.
    let mut best = disagreements(first);
    let mut model = first;
    let mut ties = 1u32;
    for candidate in models.iter().skip(1) {
        let differ = disagreements(candidate);
        if differ < best {
            best = differ;
            model = candidate;
            ties = 1;
        } else if differ == best {
            ties += 1;
            if rng.gen_range(0..ties) == 0 {
                model = candidate;
            }
        }
    }

    let mut values = target.values().clone();
    values.extend(model.iter().map(|(s, &v)| (s.clone(), v)));

    let distance = if shared.is_empty() {
        0.0
    } else {
        best as f64 / shared.len() as f64
    };
    UpdateOutcome::Updated {
        position: target.with_values(values),
        distance,
    }
}

/// Finds a closed coherent position near `target` by breadth-first search.
///
/// One step either assigns a value to a suspended sentence or flips an
/// assigned one. Every suspended sentence of `formula` must be assigned, so
/// the search starts at layer `suspended`; layer `suspended + k` consists of
/// all positions with `k` flipped sentences. The first layer containing closed
/// coherent positions wins and one of them is picked uniformly at random.
/// Layers beyond `radius` are not explored.
pub fn closest_closed_partial_coherent<R: Rng + ?Sized>(
    formula: &CompiledFormula,
    target: &Position,
    radius: usize,
    rng: &mut R,
) -> UpdateOutcome {
    let failed = |reason| UpdateOutcome::Failed {
        position: target.clone(),
        reason,
    };

    let assigned: Vec<&Sentence> = formula.order().iter().filter(|s| target.contains(s)).collect();
    let suspended = formula.order().len() - assigned.len();
    if suspended > radius {
        return failed(UpdateFailure::RadiusExhausted { radius });
    }
    let fixed: Assignment = assigned
        .iter()
        .filter_map(|&s| target.get(s).map(|v| (s.clone(), v)))
        .collect();

    let max_flips = (radius - suspended).min(assigned.len());
    for flips in 0..=max_flips {
        let mut found: Vec<Assignment> = Vec::new();
        for combination in Combinations::new(assigned.len(), flips) {
            let mut values = fixed.clone();
            for i in combination {
                if let Some(v) = values.get_mut(assigned[i]) {
                    *v = !*v;
                }
            }
            if !formula.consistent_with(&values) {
                continue;
            }
            for completion in formula.completions(&values) {
                let mut closed = values.clone();
                closed.extend(completion);
                found.push(closed);
            }
        }
        debug!(
            "layer {}: {} closed coherent positions",
            suspended + flips,
            found.len()
        );

        if let Some(values) = found.choose(rng) {
            let mut merged = target.values().clone();
            merged.extend(values.iter().map(|(s, &v)| (s.clone(), v)));
            let position = target.with_values(merged);
            let distance = normalised_edit_distance(target, &position);
            return UpdateOutcome::Updated { position, distance };
        }
    }

    failed(UpdateFailure::RadiusExhausted { radius })
}

/// Updates every position against `debate` over the given sentences.
///
/// For `closest_coherent` the models are enumerated once, or taken from
/// `models` when the caller already has them.
pub fn respond<R: Rng + ?Sized>(
    debate: &Debate,
    sentences: &[Sentence],
    positions: &[Position],
    strategy: UpdateStrategy,
    radius: usize,
    models: Option<&Models>,
    rng: &mut R,
) -> Vec<UpdateOutcome> {
    let formula = CompiledFormula::for_debate_over(debate, sentences);
    match strategy {
        UpdateStrategy::ClosestCoherent => {
            let enumerated;
            let models = match models {
                Some(models) => models,
                None => {
                    enumerated = formula.enumerate_models();
                    &enumerated
                }
            };
            positions.iter().map(|p| closest_coherent(models, p, rng)).collect()
        }
        UpdateStrategy::ClosestClosedPartialCoherent => positions
            .iter()
            .map(|p| closest_closed_partial_coherent(&formula, p, radius, rng))
            .collect(),
    }
}

/// All `k`-subsets of `0..n` as sorted index vectors, in lexicographic order.
struct Combinations {
    n: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Combinations {
            n,
            current: (k <= n).then(|| (0..k).collect()),
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.current.clone()?;
        let k = result.len();
        let mut next = result.clone();
        // Rightmost index that can still move right
        let pivot = (0..k).rev().find(|&i| next[i] < self.n - k + i);
        self.current = pivot.map(|i| {
            next[i] += 1;
            for j in i + 1..k {
                next[j] = next[j - 1] + 1;
            }
            next
        });
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use test_log::test;

    use super::*;
    use crate::formula::{Argument, Formula};

    fn pos(pairs: &[(&str, bool)]) -> Position {
        pairs.iter().copied().collect()
    }

    fn implication() -> Debate {
        Debate::new([Argument::new([Formula::atom("a")], Formula::atom("b")).unwrap()])
    }

    #[test]
    fn test_combinations() {
        let all: Vec<Vec<usize>> = Combinations::new(4, 2).collect();
        assert_eq!(all, vec![vec![0, 1], vec![0, 2], vec![0, 3], vec![1, 2], vec![1, 3], vec![2, 3]]);
        assert_eq!(Combinations::new(3, 0).collect::<Vec<_>>(), vec![Vec::<usize>::new()]);
        assert_eq!(Combinations::new(2, 3).count(), 0);
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!(
            "closest_closed_partial_coherent".parse::<UpdateStrategy>().unwrap(),
            UpdateStrategy::ClosestClosedPartialCoherent
        );
        assert!(matches!(
            "nearest".parse::<UpdateStrategy>(),
            Err(Error::UnknownUpdateStrategy { .. })
        ));
    }

    #[test]
    fn test_closest_coherent_flips_one() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let models = CompiledFormula::for_debate(&implication()).enumerate_models();

        // a=T, b=F violates a >> b; both (T,T) and (F,F) are one flip away
        let target = pos(&[("a", true), ("b", false), ("z", true)]);
        let outcome = closest_coherent(&models, &target, &mut rng);
        let UpdateOutcome::Updated { position, distance } = outcome else {
            panic!("update failed");
        };
        assert_eq!(distance, 0.5);
        assert_eq!(position.get(&Sentence::new("z")), Some(true));
        assert_ne!(position.get(&Sentence::new("a")), position.get(&Sentence::new("b")).map(|b| !b));
    }

    #[test]
    fn test_closest_coherent_reaches_every_tie() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let models = CompiledFormula::for_debate(&implication()).enumerate_models();

        let target = pos(&[("a", true), ("b", false)]);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..100 {
            let outcome = closest_coherent(&models, &target, &mut rng);
            assert!(outcome.is_updated());
            seen.insert(outcome.position().values().clone());
        }
        // (T,T) and (F,F) are both one flip away, (F,T) is two
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_closest_coherent_without_models() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let target = pos(&[("a", true)]);
        let outcome = closest_coherent(&Models::default(), &target, &mut rng);
        assert_eq!(
            outcome,
            UpdateOutcome::Failed {
                position: target,
                reason: UpdateFailure::NoModels
            }
        );
    }

    #[test]
    fn test_partial_radius_zero_keeps_coherent_position() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let formula = CompiledFormula::for_debate(&implication());
        let target = pos(&[("a", true), ("b", true)]);

        let outcome = closest_closed_partial_coherent(&formula, &target, 0, &mut rng);
        assert_eq!(
            outcome,
            UpdateOutcome::Updated {
                position: target,
                distance: 0.0
            }
        );
    }

    #[test]
    fn test_partial_fills_suspended() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let formula = CompiledFormula::for_debate(&implication());
        let target = pos(&[("a", true)]);

        let outcome = closest_closed_partial_coherent(&formula, &target, 1, &mut rng);
        assert_eq!(outcome.position(), &pos(&[("a", true), ("b", true)]));

        let outcome = closest_closed_partial_coherent(&formula, &target, 0, &mut rng);
        assert!(!outcome.is_updated());
        assert_eq!(outcome.into_position(), target);
    }

    #[test]
    fn test_partial_needs_flip() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let formula = CompiledFormula::for_debate(&implication());
        let target = pos(&[("a", true), ("b", false)]);

        assert!(!closest_closed_partial_coherent(&formula, &target, 0, &mut rng).is_updated());
        let outcome = closest_closed_partial_coherent(&formula, &target, 1, &mut rng);
        assert!(outcome.position().is_coherent(&formula));
        assert_eq!(
            normalised_edit_distance(&target, outcome.position()),
            0.5
        );
    }

    #[test]
    fn test_respond_uses_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let sentences = [Sentence::new("a"), Sentence::new("b"), Sentence::new("c")];
        let positions = vec![pos(&[("a", true), ("b", false)]), pos(&[("a", false)])];

        let outcomes = respond(
            &implication(),
            &sentences,
            &positions,
            UpdateStrategy::ClosestClosedPartialCoherent,
            3,
            None,
            &mut rng,
        );
        assert!(outcomes.iter().all(UpdateOutcome::is_updated));
        assert!(outcomes.iter().all(|o| o.position().is_closed_over(&sentences)));

        let outcomes = respond(
            &implication(),
            &sentences,
            &positions,
            UpdateStrategy::ClosestCoherent,
            0,
            None,
            &mut rng,
        );
        assert!(outcomes.iter().all(|o| o.position().len() == 3));
    }
}
