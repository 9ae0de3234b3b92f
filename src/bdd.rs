//! The BDD manager.
//!
//! All diagrams live inside a [`Bdd`] manager, which owns node storage, the
//! per-variable unique tables and the computed table. Functions are referred
//! to by lightweight [`Ref`] handles with complement edges, so negation is
//! free and every Boolean function has exactly one representation for the
//! fixed variable order `x1 < x2 < ...`.
//!
//! ```
//! use dialectic_rs::bdd::Bdd;
//!
//! let bdd = Bdd::default();
//! let a = bdd.mk_var(1);
//! let b = bdd.mk_var(2);
//!
//! // a -> b
//! let f = bdd.apply_imply(a, b);
//! assert_eq!(bdd.sat_count(f, 2), 3u32.into());
//! assert_eq!(f, bdd.apply_or(-a, b));
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Debug;

use log::debug;

use crate::cache::{Cache, OpKey};
use crate::node::Node;
use crate::reference::Ref;
use crate::subtable::Subtable;
use crate::types::{Lit, Var};

pub struct Bdd {
    /// Node storage. Index 0 is unused, index 1 is the terminal.
    nodes: RefCell<Vec<Node>>,
    /// One unique table per variable, indexed by `var.index()`.
    subtables: RefCell<Vec<Subtable>>,
    cache: RefCell<Cache<OpKey, Ref>>,
}

impl Bdd {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(2));
        nodes.push(Node::TERMINAL); // unused slot, keeps `Ref` non-zero
        nodes.push(Node::TERMINAL);

        Self {
            nodes: RefCell::new(nodes),
            subtables: RefCell::new(Vec::new()),
            cache: RefCell::new(Cache::new(12)),
        }
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::with_capacity(1 << 10)
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.cache.borrow();
        f.debug_struct("Bdd")
            .field("nodes", &self.num_nodes())
            .field("vars", &self.subtables.borrow().len())
            .field("cache_hits", &cache.hits())
            .field("cache_misses", &cache.misses())
            .finish()
    }
}

impl Bdd {
    pub fn zero(&self) -> Ref {
        Ref::ZERO
    }
    pub fn one(&self) -> Ref {
        Ref::ONE
    }

    pub fn is_zero(&self, node: Ref) -> bool {
        node == Ref::ZERO
    }
    pub fn is_one(&self, node: Ref) -> bool {
        node == Ref::ONE
    }
    pub fn is_terminal(&self, node: Ref) -> bool {
        node.is_terminal()
    }

    /// Number of stored decision nodes (terminal excluded).
    pub fn num_nodes(&self) -> usize {
        self.nodes.borrow().len() - 2
    }

    /// Cache hit and miss counters of the computed table.
    pub fn cache_stats(&self) -> (usize, usize) {
        let cache = self.cache.borrow();
        (cache.hits(), cache.misses())
    }

    fn node(&self, node: Ref) -> Node {
        self.nodes.borrow()[node.index()]
    }

    /// Decision variable of the node, or the terminal sentinel.
    pub fn variable(&self, node: Ref) -> Var {
        self.node(node).variable
    }

    /// Low child as stored, ignoring the complement bit of `node`.
    pub fn low(&self, node: Ref) -> Ref {
        self.node(node).low
    }

    /// High child as stored, ignoring the complement bit of `node`.
    pub fn high(&self, node: Ref) -> Ref {
        self.node(node).high
    }

    /// Low cofactor of the function denoted by `node`.
    pub fn low_node(&self, node: Ref) -> Ref {
        let low = self.low(node);
        if node.is_negated() {
            -low
        } else {
            low
        }
    }

    /// High cofactor of the function denoted by `node`.
    pub fn high_node(&self, node: Ref) -> Ref {
        let high = self.high(node);
        if node.is_negated() {
            -high
        } else {
            high
        }
    }

    pub fn mk_node(&self, v: Var, low: Ref, high: Ref) -> Ref {
        // Handle canonicity
        if high.is_negated() {
            return -self.mk_node(v, -low, -high);
        }

        // Handle duplicates
        if low == high {
            return low;
        }

        {
            let mut subtables = self.subtables.borrow_mut();
            while subtables.len() <= v.index() {
                let next = Var::new(subtables.len() as u32 + 1);
                subtables.push(Subtable::new(next));
            }
            if let Some(index) = subtables[v.index()].find(low, high) {
                return Ref::positive(index);
            }
        }

        let index = {
            let mut nodes = self.nodes.borrow_mut();
            let index = nodes.len() as u32;
            nodes.push(Node { variable: v, low, high });
            index
        };
        self.subtables.borrow_mut()[v.index()].insert(low, high, index);
        debug!("mk(v = {}, low = {}, high = {}) -> @{}", v, low, high, index);
        Ref::positive(index)
    }

    pub fn mk_var(&self, v: u32) -> Ref {
        self.mk_node(Var::new(v), Ref::ZERO, Ref::ONE)
    }

    /// Conjunction of the given literals.
    pub fn mk_cube(&self, literals: impl IntoIterator<Item = impl Into<Lit>>) -> Ref {
        let mut literals: Vec<Lit> = literals.into_iter().map(Into::into).collect();
        literals.sort_by_key(|lit| std::cmp::Reverse(lit.var()));
        let mut current = Ref::ONE;
        for lit in literals {
            current = if lit.is_positive() {
                self.mk_node(lit.var(), Ref::ZERO, current)
            } else {
                self.mk_node(lit.var(), current, Ref::ZERO)
            };
        }
        current
    }

    pub fn top_cofactors(&self, node: Ref, v: Var) -> (Ref, Ref) {
        if self.is_terminal(node) || v < self.variable(node) {
            return (node, node);
        }
        debug_assert_eq!(v, self.variable(node));
        (self.low_node(node), self.high_node(node))
    }

    /// Apply the ITE operation to the arguments.
    ///
    /// ```text
    /// ITE(x, y, z) = (x ∧ y) ∨ (¬x ∧ z)
    /// ```
    pub fn apply_ite(&self, f: Ref, g: Ref, h: Ref) -> Ref {
        // Base cases:
        //   ite(1,G,H) => G
        //   ite(0,G,H) => H
        if self.is_one(f) {
            return g;
        }
        if self.is_zero(f) {
            return h;
        }

        // Standard triples:
        //   ite(F,F,H) => ite(F,1,H)
        //   ite(F,~F,H) => ite(F,0,H)
        //   ite(F,G,F) => ite(F,G,0)
        //   ite(F,G,~F) => ite(F,G,1)
        let g = if g == f {
            Ref::ONE
        } else if g == -f {
            Ref::ZERO
        } else {
            g
        };
        let h = if h == f {
            Ref::ZERO
        } else if h == -f {
            Ref::ONE
        } else {
            h
        };

        // More base cases:
        //   ite(F,G,G) => G
        //   ite(F,1,0) => F
        //   ite(F,0,1) => ~F
        if g == h {
            return g;
        }
        if self.is_one(g) && self.is_zero(h) {
            return f;
        }
        if self.is_zero(g) && self.is_one(h) {
            return -f;
        }

        // ite(~F,G,H) => ite(F,H,G)
        let (f, g, h) = if f.is_negated() { (-f, h, g) } else { (f, g, h) };

        // ite(F,~G,H) => ~ite(F,G,~H)
        let (g, h, n) = if g.is_negated() { (-g, -h, true) } else { (g, h, false) };

        let key = OpKey::Ite(f, g, h);
        if let Some(res) = self.cache.borrow_mut().get(&key) {
            debug!("cache: apply_ite(f = {}, g = {}, h = {}) -> {}", f, g, h, res);
            return if n { -res } else { res };
        }

        // Determine the top variable:
        let m = [f, g, h]
            .into_iter()
            .filter(|&r| !self.is_terminal(r))
            .map(|r| self.variable(r))
            .min()
            .expect("f is not terminal");

        let (f0, f1) = self.top_cofactors(f, m);
        let (g0, g1) = self.top_cofactors(g, m);
        let (h0, h1) = self.top_cofactors(h, m);

        let e = self.apply_ite(f0, g0, h0);
        let t = self.apply_ite(f1, g1, h1);

        let res = self.mk_node(m, e, t);
        debug!("computed: apply_ite(f = {}, g = {}, h = {}) -> {}", f, g, h, res);
        self.cache.borrow_mut().insert(key, res);

        if n {
            -res
        } else {
            res
        }
    }

    pub fn apply_not(&self, f: Ref) -> Ref {
        -f
    }

    pub fn apply_and(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, Ref::ZERO)
    }

    pub fn apply_or(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, Ref::ONE, v)
    }

    pub fn apply_imply(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, Ref::ONE)
    }

    pub fn apply_and_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = Ref::ONE;
        for node in nodes {
            res = self.apply_and(res, node);
            if self.is_zero(res) {
                break;
            }
        }
        res
    }

    /// Cofactor of `f` with respect to a partial assignment.
    pub fn restrict(&self, f: Ref, values: &HashMap<Var, bool>) -> Ref {
        let mut cache = HashMap::new();
        self.restrict_(f, values, &mut cache)
    }

    fn restrict_(&self, f: Ref, values: &HashMap<Var, bool>, cache: &mut HashMap<Ref, Ref>) -> Ref {
        if self.is_terminal(f) || values.is_empty() {
            return f;
        }
        if let Some(&res) = cache.get(&f) {
            return res;
        }

        let i = self.variable(f);
        let res = match values.get(&i) {
            Some(true) => self.restrict_(self.high_node(f), values, cache),
            Some(false) => self.restrict_(self.low_node(f), values, cache),
            None => {
                let low = self.restrict_(self.low_node(f), values, cache);
                let high = self.restrict_(self.high_node(f), values, cache);
                self.mk_node(i, low, high)
            }
        };
        cache.insert(f, res);
        res
    }

    /// Existential quantification: `∃ vars. f`.
    pub fn exists(&self, f: Ref, vars: &HashSet<Var>) -> Ref {
        let mut cache = HashMap::new();
        self.exists_(f, vars, &mut cache)
    }

    fn exists_(&self, f: Ref, vars: &HashSet<Var>, cache: &mut HashMap<Ref, Ref>) -> Ref {
        if self.is_terminal(f) || vars.is_empty() {
            return f;
        }
        if let Some(&res) = cache.get(&f) {
            return res;
        }

        let i = self.variable(f);
        let low = self.exists_(self.low_node(f), vars, cache);
        let high = self.exists_(self.high_node(f), vars, cache);
        let res = if vars.contains(&i) {
            self.apply_or(low, high)
        } else {
            self.mk_node(i, low, high)
        };
        cache.insert(f, res);
        res
    }

    /// Storage indices of all nodes reachable from `nodes`, terminal included.
    pub fn descendants(&self, nodes: impl IntoIterator<Item = Ref>) -> HashSet<usize> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from_iter(nodes);

        while let Some(node) = queue.pop_front() {
            let i = node.index();
            if visited.insert(i) && !self.is_terminal(node) {
                queue.push_back(self.low(node));
                queue.push_back(self.high(node));
            }
        }

        visited
    }

    /// Number of nodes in the diagram of `f`, terminal included.
    pub fn size(&self, f: Ref) -> usize {
        self.descendants([f]).len()
    }
}
