use std::collections::HashMap;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::bdd::Bdd;
use crate::reference::Ref;
use crate::types::Var;

impl Bdd {
    /// Whether `node` has at least one model.
    ///
    /// Reduced diagrams are canonical, so this is a constant-time check.
    pub fn is_satisfiable(&self, node: Ref) -> bool {
        !self.is_zero(node)
    }

    /// Number of total assignments over `x1..=x{num_vars}` satisfying `node`.
    ///
    /// All variables in the support of `node` must be among the first `num_vars`.
    pub fn sat_count(&self, node: Ref, num_vars: usize) -> BigUint {
        let max = BigUint::one() << num_vars;
        let mut cache = HashMap::new();
        self.sat_count_(node, &max, &mut cache)
    }

    fn sat_count_(&self, node: Ref, max: &BigUint, cache: &mut HashMap<Ref, BigUint>) -> BigUint {
        if self.is_zero(node) {
            return BigUint::zero();
        }
        if self.is_one(node) {
            return max.clone();
        }

        let regular = node.regular();
        let count = match cache.get(&regular) {
            Some(count) => count.clone(),
            None => {
                let count_low = self.sat_count_(self.low(regular), max, cache);
                let count_high = self.sat_count_(self.high(regular), max, cache);
                let count: BigUint = (count_low + count_high) >> 1;
                cache.insert(regular, count.clone());
                count
            }
        };

        if node.is_negated() {
            max - count
        } else {
            count
        }
    }

    /// Evaluates `node` under a total assignment, `values[i]` being the value of `x{i+1}`.
    ///
    /// # Panics
    ///
    /// Panics if `values` is shorter than the largest variable in the support.
    pub fn eval(&self, node: Ref, values: &[bool]) -> bool {
        let mut current = node;
        while !self.is_terminal(current) {
            let var = self.variable(current);
            current = if values[var.index()] {
                self.high_node(current)
            } else {
                self.low_node(current)
            };
        }
        self.is_one(current)
    }

    /// Evaluates `node` under a partial assignment.
    ///
    /// Returns `None` when the result depends on an unassigned variable.
    pub fn eval_partial(&self, node: Ref, values: &HashMap<Var, bool>) -> Option<bool> {
        let f = self.restrict(node, values);
        if self.is_one(f) {
            Some(true)
        } else if self.is_zero(f) {
            Some(false)
        } else {
            None
        }
    }
}
