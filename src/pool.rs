//! Sentence pools and premise sampling.

use std::collections::HashSet;
use std::str::FromStr;

use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;

use crate::error::{Error, Result};
use crate::formula::{Formula, Sentence};

/// The sentences a simulation may talk about.
///
/// Parsed from a compact description:
/// - `"p:10"` expands to `p0, p1, ..., p9`,
/// - `"p1:4"` expands to `p1, p2, p3`,
/// - `"a, b, c"` (or `"a b c"`) lists sentences explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentencePool(Vec<Sentence>);

impl SentencePool {
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidSentencePool {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let mut sentences = Vec::new();
        for item in pattern.split(|c: char| c == ',' || c.is_whitespace()).filter(|s| !s.is_empty()) {
            match item.split_once(':') {
                Some((head, end)) => {
                    let prefix = head.trim_end_matches(|c: char| c.is_ascii_digit());
                    if prefix.is_empty() {
                        return Err(invalid("range needs a name prefix"));
                    }
                    let start: usize = match &head[prefix.len()..] {
                        "" => 0,
                        digits => digits.parse().map_err(|_| invalid("bad range start"))?,
                    };
                    let end: usize = end.parse().map_err(|_| invalid("bad range end"))?;
                    sentences.extend((start..end).map(|i| Sentence::new(format!("{}{}", prefix, i))));
                }
                None => sentences.push(Sentence::new(item)),
            }
        }

        if sentences.is_empty() {
            return Err(invalid("no sentences"));
        }
        let unique: HashSet<&Sentence> = sentences.iter().collect();
        if unique.len() != sentences.len() {
            return Err(invalid("duplicate sentences"));
        }
        Ok(SentencePool(sentences))
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Sentence> {
        self.0
    }
}

impl FromStr for SentencePool {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SentencePool::parse(s)
    }
}

/// Every sentence of `pool` and its negation.
pub fn premise_candidates(pool: &[Sentence]) -> Vec<Formula> {
    pool.iter()
        .flat_map(|s| [Formula::literal(s.clone(), true), Formula::literal(s.clone(), false)])
        .collect()
}

/// Whether a set of literals contains some sentence together with its negation.
pub fn is_contradictory(literals: &[Formula]) -> bool {
    let mut seen = HashSet::new();
    for lit in literals {
        if let Some((s, v)) = lit.as_literal() {
            if seen.contains(&(s, !v)) {
                return true;
            }
            seen.insert((s, v));
        }
    }
    false
}

/// Number of `k`-subsets of an `n`-set, saturating.
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k) as u64;
    let n = n as u64;
    let mut result: u64 = 1;
    for i in 0..k {
        // result * (n - i) / (i + 1) stays integral at every step
        result = match result.checked_mul(n - i) {
            Some(r) => r / (i + 1),
            None => return u64::MAX,
        };
    }
    result
}

/// Draws a random combination of premises from `pool`.
///
/// The number of premises is drawn from `lengths`. Combinations that are
/// contradictory or listed in `exclude` are rejected, and the search gives up
/// after as many draws as there are combinations of that size. Returned
/// premises are sorted, matching the form expected in `exclude`.
pub fn fetch_premises<R: Rng + ?Sized>(
    pool: &[Formula],
    lengths: &[usize],
    exclude: &HashSet<Vec<Formula>>,
    rng: &mut R,
) -> Option<Vec<Formula>> {
    let &n = lengths.choose(rng)?;
    if n == 0 || n > pool.len() {
        return None;
    }

    let tries = binomial(pool.len(), n);
    for _ in 0..tries {
        let mut premises: Vec<Formula> = pool.iter().cloned().choose_multiple(rng, n);
        premises.sort();
        if !exclude.contains(&premises) && !is_contradictory(&premises) {
            return Some(premises);
        }
    }
    None
}
