//! The satisfiability engine: counting, enumerating and checking models of
//! formulas by compiling them into a BDD.
//!
//! The `i`-th sentence of the canonical order is BDD variable `x{i+1}`.
//! Compilation happens once; all queries then run on the diagram.
//!
//! ```
//! use dialectic_rs::engine::CompiledFormula;
//! use dialectic_rs::formula::{Argument, Debate, Formula};
//!
//! let arg = Argument::new([Formula::atom("a")], Formula::atom("b")).unwrap();
//! let compiled = CompiledFormula::for_debate(&Debate::new([arg]));
//! assert_eq!(compiled.count_models(), 3u32.into());
//! assert_eq!(compiled.enumerate_models().len(), 3);
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::ops::Deref;

use log::debug;
use num_bigint::BigUint;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::bdd::Bdd;
use crate::formula::{Assignment, Debate, Formula, Sentence};
use crate::reference::Ref;
use crate::types::{Lit, Var};

/// A formula compiled into a BDD over a fixed, sorted list of sentences.
pub struct CompiledFormula {
    bdd: Bdd,
    root: Ref,
    order: Vec<Sentence>,
    vars: HashMap<Sentence, Var>,
}

impl CompiledFormula {
    pub fn new(formula: &Formula) -> Self {
        Self::with_sentences(formula, std::iter::empty())
    }

    /// Compiles `formula` over its own atoms together with `extra` sentences.
    ///
    /// The extra sentences are unconstrained unless they occur in `formula`.
    pub fn with_sentences(formula: &Formula, extra: impl IntoIterator<Item = Sentence>) -> Self {
        let mut atoms = formula.atoms();
        atoms.extend(extra);
        let order: Vec<Sentence> = atoms.into_iter().collect();
        let vars: HashMap<Sentence, Var> = order
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), Var::new(i as u32 + 1)))
            .collect();

        let bdd = Bdd::default();
        let root = compile(&bdd, formula, &vars);
        let (hits, misses) = bdd.cache_stats();
        debug!(
            "compiled formula over {} sentences into {} nodes ({} cache hits, {} misses)",
            order.len(),
            bdd.size(root),
            hits,
            misses
        );

        CompiledFormula { bdd, root, order, vars }
    }

    /// Compiles a debate over its atoms, declared sentences included.
    pub fn for_debate(debate: &Debate) -> Self {
        Self::with_sentences(&debate.to_formula(), debate.atoms())
    }

    /// Compiles a debate over its atoms and the given sentence pool.
    pub fn for_debate_over(debate: &Debate, sentences: &[Sentence]) -> Self {
        let mut atoms = debate.atoms();
        atoms.extend(sentences.iter().cloned());
        Self::with_sentences(&debate.to_formula(), atoms)
    }

    /// Sentences in variable order.
    pub fn order(&self) -> &[Sentence] {
        &self.order
    }

    pub fn bdd(&self) -> &Bdd {
        &self.bdd
    }

    pub fn root(&self) -> Ref {
        self.root
    }

    pub fn var(&self, sentence: &Sentence) -> Option<Var> {
        self.vars.get(sentence).copied()
    }

    /// Number of total assignments over [`order`][Self::order] satisfying the formula.
    pub fn count_models(&self) -> BigUint {
        self.bdd.sat_count(self.root, self.order.len())
    }

    pub fn is_satisfiable(&self) -> bool {
        self.bdd.is_satisfiable(self.root)
    }

    /// All satisfying total assignments over [`order`][Self::order].
    pub fn enumerate_models(&self) -> Models {
        let care: Vec<Var> = (1..=self.order.len() as u32).map(Var::new).collect();
        let models: Models = self
            .bdd
            .models(self.root, &care)
            .map(|model| self.to_assignment(&model))
            .collect();
        debug!("enumerated {} models over {} sentences", models.len(), self.order.len());
        models
    }

    /// All assignments to `care` that extend to a model of the formula.
    ///
    /// Sentences of the formula outside `care` are projected away. Sentences in
    /// `care` that the formula does not mention are unconstrained.
    pub fn enumerate_models_with_care_set<'a>(&self, care: impl IntoIterator<Item = &'a Sentence>) -> Models {
        let care: BTreeSet<&Sentence> = care.into_iter().collect();
        let (known, unknown): (Vec<&Sentence>, Vec<&Sentence>) =
            care.into_iter().partition(|s| self.vars.contains_key(*s));

        let care_vars: Vec<Var> = known.iter().map(|s| self.vars[*s]).collect();
        let projected: HashSet<Var> = self
            .vars
            .values()
            .copied()
            .filter(|v| !care_vars.contains(v))
            .collect();
        let f = self.bdd.exists(self.root, &projected);

        let mut models: Vec<Assignment> = self
            .bdd
            .models(f, &care_vars)
            .map(|model| self.to_assignment(&model))
            .collect();
        for sentence in unknown {
            models = models
                .into_iter()
                .flat_map(|model| {
                    [true, false].map(|value| {
                        let mut extended = model.clone();
                        extended.insert(sentence.clone(), value);
                        extended
                    })
                })
                .collect();
        }
        Models(models)
    }

    /// All ways to assign the sentences missing from `values` so that the formula holds.
    ///
    /// Each completion only mentions the missing sentences of
    /// [`order`][Self::order]. A total `values` yields a single empty completion
    /// if it satisfies the formula, and none otherwise.
    pub fn completions(&self, values: &Assignment) -> Models {
        let fixed = self.to_vars(values);
        let f = self.bdd.restrict(self.root, &fixed);
        let free: Vec<Var> = (1..=self.order.len() as u32)
            .map(Var::new)
            .filter(|v| !fixed.contains_key(v))
            .collect();
        self.bdd
            .models(f, &free)
            .map(|model| self.to_assignment(&model))
            .collect()
    }

    /// Evaluates the formula under a partial assignment.
    ///
    /// Keys that the formula does not range over are ignored.
    pub fn eval(&self, values: &Assignment) -> Option<bool> {
        let total: Option<Vec<bool>> = self.order.iter().map(|s| values.get(s).copied()).collect();
        match total {
            // Total assignments walk a single path
            Some(total) => Some(self.bdd.eval(self.root, &total)),
            None => self.bdd.eval_partial(self.root, &self.to_vars(values)),
        }
    }

    /// Whether `values` makes the formula true regardless of unassigned sentences.
    pub fn satisfied_by(&self, values: &Assignment) -> bool {
        self.eval(values) == Some(true)
    }

    /// Whether `values` can be extended to a model.
    pub fn consistent_with(&self, values: &Assignment) -> bool {
        let literals = self
            .to_vars(values)
            .into_iter()
            .map(|(v, b)| if b { v.pos() } else { v.neg() });
        let cube = self.bdd.mk_cube(literals);
        self.bdd.is_satisfiable(self.bdd.apply_and(self.root, cube))
    }

    fn to_vars(&self, values: &Assignment) -> HashMap<Var, bool> {
        values
            .iter()
            .filter_map(|(s, &b)| self.vars.get(s).map(|&v| (v, b)))
            .collect()
    }

    fn to_assignment(&self, model: &[Lit]) -> Assignment {
        model
            .iter()
            .map(|lit| (self.order[lit.var().index()].clone(), lit.is_positive()))
            .collect()
    }
}

fn compile(bdd: &Bdd, formula: &Formula, vars: &HashMap<Sentence, Var>) -> Ref {
    match formula {
        Formula::Atom(s) => bdd.mk_var(vars[s].id()),
        Formula::Not(inner) => bdd.apply_not(compile(bdd, inner, vars)),
        Formula::And(args) => bdd.apply_and_many(args.iter().map(|arg| compile(bdd, arg, vars))),
        Formula::Implies(premise, conclusion) => {
            let p = compile(bdd, premise, vars);
            let c = compile(bdd, conclusion, vars);
            bdd.apply_imply(p, c)
        }
    }
}

/// A materialised list of models that can be iterated and sampled repeatedly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Models(Vec<Assignment>);

impl Models {
    /// `n` distinct models drawn uniformly, or fewer if there are not enough.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<Assignment> {
        self.0.choose_multiple(rng, n).cloned().collect()
    }

    pub fn into_vec(self) -> Vec<Assignment> {
        self.0
    }
}

impl Deref for Models {
    type Target = [Assignment];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<Assignment> for Models {
    fn from_iter<T: IntoIterator<Item = Assignment>>(iter: T) -> Self {
        Models(iter.into_iter().collect())
    }
}

impl IntoIterator for Models {
    type Item = Assignment;
    type IntoIter = std::vec::IntoIter<Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Models {
    type Item = &'a Assignment;
    type IntoIter = std::slice::Iter<'a, Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

pub fn count_models(formula: &Formula) -> BigUint {
    CompiledFormula::new(formula).count_models()
}

pub fn enumerate_models(formula: &Formula) -> Models {
    CompiledFormula::new(formula).enumerate_models()
}

pub fn is_satisfiable(formula: &Formula) -> bool {
    CompiledFormula::new(formula).is_satisfiable()
}

pub fn enumerate_models_with_care_set<'a>(formula: &Formula, care: impl IntoIterator<Item = &'a Sentence>) -> Models {
    CompiledFormula::new(formula).enumerate_models_with_care_set(care)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::formula::Argument;

    fn s(name: &str) -> Sentence {
        Sentence::new(name)
    }

    #[test]
    fn test_count_unconstrained() {
        let debate = Debate::over([s("a"), s("b")]);
        let compiled = CompiledFormula::for_debate(&debate);
        assert_eq!(compiled.count_models(), BigUint::from(4u32));
        assert_eq!(compiled.enumerate_models().len(), 4);
    }

    #[test]
    fn test_implication_models() {
        let f = Formula::implies(Formula::atom("a"), Formula::atom("b"));
        let models = enumerate_models(&f);
        assert_eq!(count_models(&f), BigUint::from(3u32));
        assert_eq!(models.len(), 3);

        let expected = [(false, false), (false, true), (true, true)];
        for (a, b) in expected {
            let model = Assignment::from([(s("a"), a), (s("b"), b)]);
            assert!(models.contains(&model), "missing model {:?}", model);
        }
    }

    #[test]
    fn test_contradiction() {
        let a = Formula::atom("a");
        let f = Formula::and([a.clone(), -a]);
        assert!(!is_satisfiable(&f));
        assert_eq!(count_models(&f), BigUint::from(0u32));
        assert!(enumerate_models(&f).is_empty());
    }

    #[test]
    fn test_variable_order_is_natural() {
        let f = Formula::and([Formula::atom("p10"), Formula::atom("p2"), Formula::atom("p1")]);
        let compiled = CompiledFormula::new(&f);
        assert_eq!(compiled.order(), &[s("p1"), s("p2"), s("p10")]);
        assert_eq!(compiled.var(&s("p10")), Some(Var::new(3)));
    }

    #[test]
    fn test_care_set_projection() {
        // (a >> b) projected onto {b} admits both values of b
        let arg = Argument::new([Formula::atom("a")], Formula::atom("b")).unwrap();
        let compiled = CompiledFormula::for_debate(&Debate::new([arg]));

        let models = compiled.enumerate_models_with_care_set([&s("b")]);
        assert_eq!(models.len(), 2);
        assert!(models.iter().all(|m| m.len() == 1));

        // An unknown care sentence doubles the models
        let models = compiled.enumerate_models_with_care_set([&s("a"), &s("b"), &s("c")]);
        assert_eq!(models.len(), 6);
    }

    #[test]
    fn test_partial_queries() {
        let arg = Argument::new([Formula::atom("a")], Formula::atom("b")).unwrap();
        let compiled = CompiledFormula::for_debate(&Debate::new([arg]));

        let partial = Assignment::from([(s("a"), true)]);
        assert_eq!(compiled.eval(&partial), None);
        assert!(compiled.consistent_with(&partial));
        assert!(!compiled.satisfied_by(&partial));

        let bad = Assignment::from([(s("a"), true), (s("b"), false)]);
        assert!(!compiled.consistent_with(&bad));
        assert_eq!(compiled.eval(&bad), Some(false));

        let unrelated = Assignment::from([(s("z"), true), (s("a"), false)]);
        assert!(compiled.satisfied_by(&unrelated));
    }

    #[test]
    fn test_total_eval_matches_models() {
        let debate = Debate::new([
            Argument::new([Formula::atom("a")], Formula::atom("b")).unwrap(),
            Argument::new([Formula::atom("b")], -Formula::atom("c")).unwrap(),
        ]);
        let compiled = CompiledFormula::for_debate(&debate);
        let models = compiled.enumerate_models();
        assert_eq!(models.len(), 4);

        for bits in 0..8u32 {
            let total: Assignment = compiled
                .order()
                .iter()
                .enumerate()
                .map(|(i, s)| (s.clone(), bits & (1 << i) != 0))
                .collect();
            let expected = models.iter().any(|m| m == &total);
            assert_eq!(compiled.eval(&total), Some(expected), "{:?}", total);
            assert_eq!(compiled.satisfied_by(&total), expected);
        }
    }

    #[test]
    fn test_completions() {
        let arg = Argument::new([Formula::atom("a")], Formula::atom("b")).unwrap();
        let compiled = CompiledFormula::for_debate_over(&Debate::new([arg]), &[s("c")]);

        let completions = compiled.completions(&Assignment::from([(s("a"), true)]));
        assert_eq!(completions.len(), 2);
        assert!(completions.iter().all(|m| m.get(&s("b")) == Some(&true) && m.len() == 2));

        let total = Assignment::from([(s("a"), false), (s("b"), false), (s("c"), true)]);
        assert_eq!(compiled.completions(&total).len(), 1);
        assert!(compiled.completions(&total)[0].is_empty());

        let bad = Assignment::from([(s("a"), true), (s("b"), false)]);
        assert!(compiled.completions(&bad).is_empty());
    }
}
