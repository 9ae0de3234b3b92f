use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// A handle to a BDD node with a complement bit.
///
/// The sign carries the complement: `-r` denotes the negation of the function
/// denoted by `r`. Index `1` is the terminal node, so [`Ref::ONE`] is `@1`
/// and [`Ref::ZERO`] is `~@1`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ref(i32);

impl Ref {
    pub const ONE: Ref = Ref(1);
    pub const ZERO: Ref = Ref(-1);

    /// Non-negated reference to the node at `index`.
    pub const fn positive(index: u32) -> Self {
        assert!(index != 0, "Node index should not be zero");
        Self(index as i32)
    }

    pub const fn is_negated(self) -> bool {
        self.0 < 0
    }

    pub const fn negate(self) -> Self {
        Self(-self.0)
    }

    /// Return the internal representation of the reference.
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Return the index of the referenced node in storage.
    pub const fn index(self) -> usize {
        self.0.unsigned_abs() as usize
    }

    /// The same node without the complement bit.
    pub const fn regular(self) -> Self {
        Self(self.0.abs())
    }

    pub const fn is_terminal(self) -> bool {
        self.0 == 1 || self.0 == -1
    }
}

impl Neg for Ref {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            1 => write!(f, "⊤"),
            -1 => write!(f, "⊥"),
            _ => write!(f, "{}@{}", if self.is_negated() { "~" } else { "" }, self.index()),
        }
    }
}
