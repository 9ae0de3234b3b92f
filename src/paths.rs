//! Iteration over the satisfying paths of a BDD.
//!
//! A path is a cube: the literals tested on the way from the root to the
//! `1` terminal. Variables skipped by the path are don't-cares. Paths of a
//! reduced diagram are pairwise disjoint, so expanding the don't-cares of
//! every path over a fixed set of variables yields each total model exactly
//! once.
//!
//! ```
//! use dialectic_rs::bdd::Bdd;
//! use dialectic_rs::types::Var;
//!
//! let bdd = Bdd::default();
//! let x = bdd.mk_var(1);
//! let y = bdd.mk_var(2);
//!
//! // x OR y has two paths: {x} and {~x, y}
//! let f = bdd.apply_or(x, y);
//! assert_eq!(bdd.paths(f).count(), 2);
//!
//! // ...but three total models over {x1, x2}
//! let care = [Var::new(1), Var::new(2)];
//! assert_eq!(bdd.models(f, &care).count(), 3);
//! ```

use crate::bdd::Bdd;
use crate::reference::Ref;
use crate::types::{Lit, Var};

impl Bdd {
    /// Iterates over all paths from `f` to the `1` terminal, high branches first.
    pub fn paths(&self, f: Ref) -> BddPaths<'_> {
        BddPaths::new(self, f)
    }

    /// Iterates over all total assignments of `care` satisfying `f`.
    ///
    /// Every variable in the support of `f` must appear in `care`.
    /// Each model lists one literal per care variable, in the order of `care`.
    pub fn models<'a>(&'a self, f: Ref, care: &'a [Var]) -> impl Iterator<Item = Vec<Lit>> + 'a {
        self.paths(f).flat_map(move |cube| expand_cube(&cube, care))
    }
}

/// A pending step of the depth-first traversal.
#[derive(Debug, Clone, Copy)]
struct Pending {
    node: Ref,
    /// Length of the current path at the parent of `node`.
    depth: usize,
    /// Literal taken from the parent to reach `node`.
    via: Option<Lit>,
}

/// Iterator over the satisfying paths of a BDD, created by [`Bdd::paths`].
pub struct BddPaths<'a> {
    bdd: &'a Bdd,
    stack: Vec<Pending>,
    path: Vec<Lit>,
}

impl<'a> BddPaths<'a> {
    pub fn new(bdd: &'a Bdd, f: Ref) -> Self {
        BddPaths {
            bdd,
            stack: vec![Pending {
                node: f,
                depth: 0,
                via: None,
            }],
            path: Vec::new(),
        }
    }
}

impl Iterator for BddPaths<'_> {
    type Item = Vec<Lit>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(Pending { node, depth, via }) = self.stack.pop() {
            self.path.truncate(depth);
            if let Some(lit) = via {
                self.path.push(lit);
            }

            if self.bdd.is_zero(node) {
                continue;
            }
            if self.bdd.is_one(node) {
                return Some(self.path.clone());
            }

            let var = self.bdd.variable(node);
            let depth = self.path.len();
            // Low is pushed first so that high is explored first.
            self.stack.push(Pending {
                node: self.bdd.low_node(node),
                depth,
                via: Some(var.neg()),
            });
            self.stack.push(Pending {
                node: self.bdd.high_node(node),
                depth,
                via: Some(var.pos()),
            });
        }
        None
    }
}

/// Expands a cube into all total assignments of `care` it covers.
///
/// Literals of `cube` on variables outside `care` are ignored. Don't-care
/// variables are enumerated with `true` before `false`.
pub fn expand_cube(cube: &[Lit], care: &[Var]) -> Vec<Vec<Lit>> {
    let fixed: Vec<Option<bool>> = care
        .iter()
        .map(|&v| cube.iter().find(|lit| lit.var() == v).map(|lit| lit.is_positive()))
        .collect();

    let mut result = vec![Vec::with_capacity(care.len())];
    for (&v, value) in care.iter().zip(fixed) {
        match value {
            Some(b) => {
                for model in &mut result {
                    model.push(Lit::new(v, b));
                }
            }
            None => {
                result = result
                    .into_iter()
                    .flat_map(|model| {
                        let mut positive = model.clone();
                        positive.push(v.pos());
                        let mut negative = model;
                        negative.push(v.neg());
                        [positive, negative]
                    })
                    .collect();
            }
        }
    }
    result
}
