//! Per-variable unique tables.
//!
//! The manager keeps a plain `Vec<Node>` for storage and one subtable per
//! variable for hash consing:
//!
//! ```text
//! subtables[0] → nodes labelled x1
//! subtables[1] → nodes labelled x2
//! ...
//! ```
//!
//! Since all nodes in a subtable share the variable, the key is just the
//! `(low, high)` pair of children.

use std::collections::HashMap;

use crate::reference::Ref;
use crate::types::Var;

/// A unique table for the nodes of a single variable.
#[derive(Debug, Clone)]
pub struct Subtable {
    /// The variable for all nodes in this subtable.
    pub variable: Var,

    /// Map from (low, high) to node index in the global storage.
    nodes: HashMap<(Ref, Ref), u32>,
}

impl Subtable {
    pub fn new(variable: Var) -> Self {
        Self {
            variable,
            nodes: HashMap::new(),
        }
    }

    /// Look up a node by its children.
    pub fn find(&self, low: Ref, high: Ref) -> Option<u32> {
        self.nodes.get(&(low, high)).copied()
    }

    pub fn insert(&mut self, low: Ref, high: Ref, index: u32) {
        self.nodes.insert((low, high), index);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
