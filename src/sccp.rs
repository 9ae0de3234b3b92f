//! The space of coherent and complete positions (SCCP).
//!
//! Nodes are the models of a debate, encoded as bit strings over the sorted
//! sentences (`1` true, `0` false). Two nodes are adjacent iff they differ in
//! exactly one bit. Only the `n` single-bit flips of each model are probed, so
//! building the graph takes `O(models * n)` lookups.
//!
//! ```
//! use dialectic_rs::formula::{Debate, Sentence};
//!
//! let debate = Debate::over([Sentence::new("a"), Sentence::new("b")]);
//! let sccp = debate.sccp();
//! assert_eq!(sccp.len(), 4);
//! assert_eq!(sccp.neighbours("00"), &["10".to_string(), "01".to_string()]);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};

use log::debug;

use crate::engine::CompiledFormula;
use crate::formula::{Assignment, Debate, Sentence};
use crate::position::Position;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sccp {
    order: Vec<Sentence>,
    adjacency: BTreeMap<String, Vec<String>>,
    attributions: BTreeMap<String, Assignment>,
}

impl Sccp {
    pub fn from_debate(debate: &Debate) -> Self {
        let compiled = CompiledFormula::for_debate(debate);
        let models = compiled.enumerate_models();
        Self::build(compiled.order().to_vec(), models.into_vec())
    }

    /// Neighbour graph over arbitrary positions.
    ///
    /// Sentences are the union of all positions' sentences. A position that
    /// suspends on some of them only matches positions suspending on the same.
    pub fn from_positions(positions: &[Position]) -> Self {
        let order: BTreeSet<Sentence> = positions.iter().flat_map(Position::sentences).collect();
        let assignments = positions.iter().map(|p| p.values().clone()).collect();
        Self::build(order.into_iter().collect(), assignments)
    }

    fn build(order: Vec<Sentence>, assignments: Vec<Assignment>) -> Self {
        let encode = |a: &Assignment| Position::new(a.clone()).to_bits(&order);

        let attributions: BTreeMap<String, Assignment> =
            assignments.into_iter().map(|a| (encode(&a), a)).collect();
        let members: HashSet<&str> = attributions.keys().map(String::as_str).collect();

        let mut adjacency = BTreeMap::new();
        for code in attributions.keys() {
            let neighbours: Vec<String> = flips(code).filter(|n| members.contains(n.as_str())).collect();
            adjacency.insert(code.clone(), neighbours);
        }
        debug!("built SCCP with {} positions over {} sentences", adjacency.len(), order.len());

        Sccp {
            order,
            adjacency,
            attributions,
        }
    }

    /// Sentences in bit order.
    pub fn order(&self) -> &[Sentence] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.adjacency.contains_key(code)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    /// Neighbours of `code`, ordered by the flipped bit.
    pub fn neighbours(&self, code: &str) -> &[String] {
        self.adjacency.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn adjacency(&self) -> &BTreeMap<String, Vec<String>> {
        &self.adjacency
    }

    /// The assignment a code stands for.
    pub fn attribution(&self, code: &str) -> Option<&Assignment> {
        self.attributions.get(code)
    }

    pub fn num_edges(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum::<usize>() / 2
    }
}

/// All codes at Hamming distance 1 from `code`. Suspended bits are never flipped.
pub fn flips(code: &str) -> impl Iterator<Item = String> + '_ {
    code.char_indices().filter_map(move |(i, c)| {
        let flipped = match c {
            '0' => '1',
            '1' => '0',
            _ => return None,
        };
        let mut neighbour = String::with_capacity(code.len());
        neighbour.push_str(&code[..i]);
        neighbour.push(flipped);
        neighbour.push_str(&code[i + 1..]);
        Some(neighbour)
    })
}

impl Debate {
    pub fn sccp(&self) -> Sccp {
        Sccp::from_debate(self)
    }
}
