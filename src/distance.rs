//! Distances between positions and the density of debates.

use std::collections::BTreeSet;

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::engine::CompiledFormula;
use crate::error::{Error, Result};
use crate::formula::{Debate, Sentence};
use crate::position::Position;

/// Fraction of sentences on which two total positions differ.
///
/// Both positions must range over the same sentences.
pub fn normalised_hamming_distance(p1: &Position, p2: &Position) -> Result<f64> {
    let left = p1.sentences();
    let right = p2.sentences();
    if left != right {
        return Err(Error::DomainMismatch {
            left: render(&left),
            right: render(&right),
        });
    }
    if left.is_empty() {
        return Ok(0.0);
    }
    let differ = p1.iter().filter(|&(s, v)| p2.get(s) != Some(v)).count();
    Ok(differ as f64 / left.len() as f64)
}

fn render(sentences: &BTreeSet<Sentence>) -> String {
    let names: Vec<&str> = sentences.iter().map(Sentence::name).collect();
    format!("{{{}}}", names.join(", "))
}

/// Distance between possibly partial positions.
///
/// Suspension is a third value half way between true and false: opposite
/// values cost 1 and one-sided suspension costs 1/2. The sum is normalised by
/// the number of sentences either position mentions.
pub fn normalised_edit_distance(p1: &Position, p2: &Position) -> f64 {
    let domain: BTreeSet<&Sentence> = p1.iter().chain(p2.iter()).map(|(s, _)| s).collect();
    if domain.is_empty() {
        return 0.0;
    }
    let cost: usize = domain
        .iter()
        .map(|s| match (p1.get(s), p2.get(s)) {
            (Some(a), Some(b)) if a != b => 2,
            (Some(_), None) | (None, Some(_)) => 1,
            _ => 0,
        })
        .sum();
    cost as f64 / (2 * domain.len()) as f64
}

pub fn normalised_edit_agreement(p1: &Position, p2: &Position) -> f64 {
    1.0 - normalised_edit_distance(p1, p2)
}

/// Pairwise `measure` between all positions, as a square matrix.
pub fn difference_matrix<F>(positions: &[Position], measure: F) -> Vec<Vec<f64>>
where
    F: Fn(&Position, &Position) -> f64,
{
    positions
        .iter()
        .map(|p| positions.iter().map(|q| measure(p, q)).collect())
        .collect()
}

/// Mean of `measure` over all unordered pairs of distinct positions.
///
/// Returns `None` for fewer than two positions.
pub fn mean_pairwise<F>(positions: &[Position], measure: F) -> Option<f64>
where
    F: Fn(&Position, &Position) -> f64,
{
    let n = positions.len();
    if n < 2 {
        return None;
    }
    let mut total = 0.0;
    for i in 0..n {
        for j in i + 1..n {
            total += measure(&positions[i], &positions[j]);
        }
    }
    Some(total / (n * (n - 1) / 2) as f64)
}

/// Mean pairwise edit distance of a population, zero if there is no pair.
pub fn pairwise_dispersion(positions: &[Position]) -> f64 {
    mean_pairwise(positions, normalised_edit_distance).unwrap_or(0.0)
}

/// `log2` of a model count of arbitrary size.
pub(crate) fn log2(count: &BigUint) -> f64 {
    let bits = count.bits();
    if bits <= f64::MANTISSA_DIGITS as u64 {
        return count.to_f64().map_or(f64::NAN, f64::log2);
    }
    let shift = bits - f64::MANTISSA_DIGITS as u64;
    let head: BigUint = count >> shift;
    head.to_f64().map_or(f64::NAN, f64::log2) + shift as f64
}

/// `(n - log2(models)) / n` for a formula over `n` sentences.
///
/// A formula over no sentences has density 0. An unsatisfiable one has density 1.
pub fn density_of(formula: &CompiledFormula) -> f64 {
    let n = formula.order().len();
    if n == 0 {
        return 0.0;
    }
    let count = formula.count_models();
    if count.is_zero() {
        return 1.0;
    }
    (n as f64 - log2(&count)) / n as f64
}

pub fn density(debate: &Debate) -> f64 {
    density_of(&CompiledFormula::for_debate(debate))
}

impl Debate {
    pub fn density(&self) -> f64 {
        density(self)
    }

    pub fn count_models(&self) -> BigUint {
        CompiledFormula::for_debate(self).count_models()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{Argument, Formula};

    fn pos(pairs: &[(&str, bool)]) -> Position {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_hamming() {
        let p = pos(&[("a", true), ("b", false), ("c", true), ("d", true)]);
        let q = pos(&[("a", true), ("b", true), ("c", false), ("d", true)]);
        assert_eq!(normalised_hamming_distance(&p, &p).unwrap(), 0.0);
        assert_eq!(normalised_hamming_distance(&p, &q).unwrap(), 0.5);
        assert_eq!(normalised_hamming_distance(&q, &p).unwrap(), 0.5);

        let r = pos(&[("a", true)]);
        assert!(matches!(
            normalised_hamming_distance(&p, &r),
            Err(Error::DomainMismatch { .. })
        ));
    }

    #[test]
    fn test_edit_distance() {
        let p = pos(&[("a", true), ("b", false)]);
        let q = pos(&[("a", false)]);
        // a: opposite (2), b: one-sided suspension (1), over 2 sentences
        assert_eq!(normalised_edit_distance(&p, &q), 0.75);
        assert_eq!(normalised_edit_distance(&q, &p), 0.75);
        assert_eq!(normalised_edit_distance(&p, &p), 0.0);
        assert_eq!(normalised_edit_agreement(&p, &q), 0.25);
        assert_eq!(normalised_edit_distance(&Position::default(), &Position::default()), 0.0);
    }

    #[test]
    fn test_matrix_and_dispersion() {
        let positions = vec![
            pos(&[("a", true), ("b", true)]),
            pos(&[("a", true), ("b", false)]),
            pos(&[("a", false), ("b", false)]),
        ];
        let matrix = difference_matrix(&positions, normalised_edit_distance);
        assert_eq!(matrix[0][0], 0.0);
        assert_eq!(matrix[0][2], 1.0);
        assert_eq!(matrix[1][0], matrix[0][1]);
        // (0.5 + 1.0 + 0.5) / 3
        assert!((pairwise_dispersion(&positions) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(pairwise_dispersion(&positions[..1]), 0.0);
    }

    #[test]
    fn test_density() {
        let open = Debate::over([Sentence::new("a"), Sentence::new("b")]);
        assert_eq!(open.density(), 0.0);

        let arg = Argument::new([Formula::atom("a")], Formula::atom("b")).unwrap();
        let d = Debate::new([arg]).density();
        assert!((d - (2.0 - 3f64.log2()) / 2.0).abs() < 1e-12);

        assert_eq!(Debate::default().density(), 0.0);
    }

    #[test]
    fn test_log2_large_counts() {
        let count = BigUint::from(1u32) << 200;
        assert_eq!(log2(&count), 200.0);
        let count = BigUint::from(3u32) << 100;
        assert!((log2(&count) - (100.0 + 3f64.log2())).abs() < 1e-9);
    }
}
