use crate::reference::Ref;
use crate::types::Var;

/// A decision node: `if variable then high else low`.
///
/// # Invariants
///
/// - `high` is never negated (complement bits are pushed to the parent edge)
/// - `low != high` (redundant tests are never stored)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Node {
    pub variable: Var,
    pub low: Ref,
    pub high: Ref,
}

impl Node {
    /// The terminal node occupying storage slot 1.
    pub(crate) const TERMINAL: Node = Node {
        variable: Var::TERMINAL,
        low: Ref::ONE,
        high: Ref::ONE,
    };

    pub fn is_terminal(&self) -> bool {
        self.variable.is_terminal()
    }
}
