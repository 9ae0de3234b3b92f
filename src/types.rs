//! Type-safe wrappers for BDD variables and literals.
//!
//! Variables are 1-indexed (0 is reserved for terminal nodes) and their
//! numeric order *is* the variable order of the diagram: the formula compiler
//! assigns `Var(1)` to the first sentence in canonical order, `Var(2)` to the
//! second, and so on.
use std::fmt;
use std::ops::Neg;

/// A variable identifier (1-indexed).
///
/// # Invariants
///
/// - Variable IDs must be >= 1 (0 is reserved for terminals)
/// - A smaller ID means the variable sits closer to the root
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    /// Sentinel stored in terminal nodes.
    pub(crate) const TERMINAL: Var = Var(0);

    /// Creates a new variable with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id == 0`. Variables must be 1-indexed.
    pub fn new(id: u32) -> Self {
        assert_ne!(id, 0, "Variable IDs must be >= 1");
        Var(id)
    }

    /// Returns the raw variable ID as a `u32`.
    pub fn id(self) -> u32 {
        self.0
    }

    /// Zero-based position of this variable in the order.
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// Whether this is the terminal sentinel.
    pub fn is_terminal(self) -> bool {
        self.0 == 0
    }

    /// Positive literal of this variable.
    pub fn pos(self) -> Lit {
        Lit::pos(self)
    }

    /// Negative literal of this variable.
    pub fn neg(self) -> Lit {
        Lit::neg(self)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<Var> for u32 {
    fn from(var: Var) -> Self {
        var.0
    }
}

/// A signed literal: a variable together with its polarity.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Lit {
    var: Var,
    positive: bool,
}

impl Lit {
    pub fn pos(var: Var) -> Self {
        Lit { var, positive: true }
    }

    pub fn neg(var: Var) -> Self {
        Lit { var, positive: false }
    }

    pub fn new(var: Var, positive: bool) -> Self {
        Lit { var, positive }
    }

    pub fn var(self) -> Var {
        self.var
    }

    pub fn is_positive(self) -> bool {
        self.positive
    }

    /// Signed DIMACS-style integer (`3` or `-3`).
    pub fn to_dimacs(self) -> i32 {
        let v = self.var.id() as i32;
        if self.positive {
            v
        } else {
            -v
        }
    }

    /// Parses a signed DIMACS-style integer.
    ///
    /// # Panics
    ///
    /// Panics if `lit == 0`.
    pub fn from_dimacs(lit: i32) -> Self {
        Lit::new(Var::new(lit.unsigned_abs()), lit > 0)
    }
}

impl Neg for Lit {
    type Output = Lit;

    fn neg(self) -> Self::Output {
        Lit::new(self.var, !self.positive)
    }
}

impl From<i32> for Lit {
    fn from(lit: i32) -> Self {
        Lit::from_dimacs(lit)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positive {
            write!(f, "{}", self.var)
        } else {
            write!(f, "~{}", self.var)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_creation() {
        let v1 = Var::new(1);
        let v2 = Var::new(2);
        assert_eq!(v1.id(), 1);
        assert_eq!(v2.index(), 1);
        assert!(v1 < v2);
        assert!(!v1.is_terminal());
        assert!(Var::TERMINAL.is_terminal());
    }

    #[test]
    #[should_panic(expected = "Variable IDs must be >= 1")]
    fn test_var_zero_panics() {
        Var::new(0);
    }

    #[test]
    fn test_lit_dimacs() {
        let lit = Lit::from_dimacs(-3);
        assert_eq!(lit.var(), Var::new(3));
        assert!(!lit.is_positive());
        assert_eq!(lit.to_dimacs(), -3);
        assert_eq!((-lit).to_dimacs(), 3);
        assert_eq!(lit.to_string(), "~x3");
    }
}
