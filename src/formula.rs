//! Propositional formulas, arguments and debates.
//!
//! ```
//! use dialectic_rs::formula::{Argument, Debate, Formula};
//!
//! let a = Formula::atom("a");
//! let b = Formula::atom("b");
//! let arg = Argument::new([a.clone()], b.clone()).unwrap();
//! let debate = Debate::new([arg]);
//! assert_eq!(debate.to_string(), "(a >> b)");
//! assert_eq!(debate.atoms().len(), 2);
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::ops::{BitAnd, Neg};
use std::sync::Arc;

use crate::error::{Error, Result};

/// A (possibly partial) truth-value assignment.
pub type Assignment = BTreeMap<Sentence, bool>;

/// An atomic proposition, identified by its name.
///
/// Sentences are ordered naturally: a name is split into an alphabetic prefix
/// and a numeric suffix, so `p2 < p10`. This order fixes the variable order
/// of compiled formulas and the bit order of SCCP encodings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sentence(Arc<str>);

impl Sentence {
    pub fn new(name: impl AsRef<str>) -> Self {
        Sentence(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    fn sort_key(&self) -> (&str, Option<u64>) {
        let name = self.name();
        let prefix = name.trim_end_matches(|c: char| c.is_ascii_digit());
        let number = name[prefix.len()..].parse().ok();
        (prefix, number)
    }
}

impl Ord for Sentence {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.name().cmp(other.name()))
    }
}

impl PartialOrd for Sentence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Sentence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Sentence {
    fn from(name: &str) -> Self {
        Sentence::new(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Formula {
    Atom(Sentence),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),
}

impl Formula {
    pub fn atom(name: impl AsRef<str>) -> Self {
        Formula::Atom(Sentence::new(name))
    }

    /// Literal `s` or `~s`.
    pub fn literal(sentence: Sentence, value: bool) -> Self {
        if value {
            Formula::Atom(sentence)
        } else {
            Formula::Not(Box::new(Formula::Atom(sentence)))
        }
    }

    /// Negation, collapsing double negations.
    pub fn not(value: Self) -> Self {
        match value {
            Formula::Not(inner) => *inner,
            _ => Formula::Not(Box::new(value)),
        }
    }

    pub fn and(args: impl IntoIterator<Item = Formula>) -> Self {
        Formula::And(args.into_iter().collect())
    }

    pub fn implies(premise: Self, conclusion: Self) -> Self {
        Formula::Implies(Box::new(premise), Box::new(conclusion))
    }

    /// The sentence and polarity of a literal, `None` for compound formulas.
    pub fn as_literal(&self) -> Option<(&Sentence, bool)> {
        match self {
            Formula::Atom(s) => Some((s, true)),
            Formula::Not(inner) => match inner.as_ref() {
                Formula::Atom(s) => Some((s, false)),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn atoms(&self) -> BTreeSet<Sentence> {
        let mut atoms = BTreeSet::new();
        self.collect_atoms(&mut atoms);
        atoms
    }

    fn collect_atoms(&self, atoms: &mut BTreeSet<Sentence>) {
        match self {
            Formula::Atom(s) => {
                atoms.insert(s.clone());
            }
            Formula::Not(inner) => inner.collect_atoms(atoms),
            Formula::And(args) => args.iter().for_each(|f| f.collect_atoms(atoms)),
            Formula::Implies(premise, conclusion) => {
                premise.collect_atoms(atoms);
                conclusion.collect_atoms(atoms);
            }
        }
    }

    /// Three-valued evaluation: `None` if the value depends on an unassigned atom.
    pub fn eval(&self, values: &Assignment) -> Option<bool> {
        match self {
            Formula::Atom(s) => values.get(s).copied(),
            Formula::Not(inner) => inner.eval(values).map(|b| !b),
            Formula::And(args) => {
                let mut unknown = false;
                for arg in args {
                    match arg.eval(values) {
                        Some(false) => return Some(false),
                        Some(true) => {}
                        None => unknown = true,
                    }
                }
                if unknown {
                    None
                } else {
                    Some(true)
                }
            }
            Formula::Implies(premise, conclusion) => match (premise.eval(values), conclusion.eval(values)) {
                (Some(false), _) | (_, Some(true)) => Some(true),
                (Some(true), Some(false)) => Some(false),
                _ => None,
            },
        }
    }
}

impl Neg for Formula {
    type Output = Formula;

    fn neg(self) -> Self::Output {
        Formula::not(self)
    }
}

impl BitAnd for Formula {
    type Output = Formula;

    fn bitand(self, rhs: Self) -> Self::Output {
        match self {
            Formula::And(mut args) => {
                args.push(rhs);
                Formula::And(args)
            }
            _ => Formula::And(vec![self, rhs]),
        }
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Formula::Atom(s) => write!(f, "{}", s),
            Formula::Not(inner) => match inner.as_ref() {
                Formula::Atom(_) | Formula::Not(_) => write!(f, "~{}", inner),
                _ => write!(f, "~({})", inner),
            },
            Formula::And(args) if args.is_empty() => write!(f, "True"),
            Formula::And(args) => {
                let parts: Vec<String> = args
                    .iter()
                    .map(|arg| match arg {
                        Formula::Implies(..) => format!("({})", arg),
                        _ => arg.to_string(),
                    })
                    .collect();
                write!(f, "{}", parts.join(" & "))
            }
            Formula::Implies(premise, conclusion) => {
                let wrap = |x: &Formula| match x {
                    Formula::Atom(_) | Formula::Not(_) => x.to_string(),
                    _ => format!("({})", x),
                };
                write!(f, "{} >> {}", wrap(premise.as_ref()), wrap(conclusion.as_ref()))
            }
        }
    }
}

/// An implication from a conjunction of premises to a single conclusion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Argument {
    premises: Vec<Formula>,
    conclusion: Formula,
}

impl Argument {
    /// Creates an argument `p1 & ... & pn >> conclusion`.
    ///
    /// Fails if there are no premises, or if a premise is itself a
    /// conjunction: premises must be given as a flat list, never as a
    /// grouped pair.
    pub fn new(premises: impl IntoIterator<Item = Formula>, conclusion: Formula) -> Result<Self> {
        let premises: Vec<Formula> = premises.into_iter().collect();
        if premises.is_empty() {
            return Err(Error::MalformedArgument {
                reason: "an argument needs at least one premise".to_string(),
            });
        }
        if let Some(nested) = premises.iter().find(|p| matches!(p, Formula::And(_))) {
            return Err(Error::MalformedArgument {
                reason: format!("premise '{}' is a conjunction, premises must be listed individually", nested),
            });
        }
        Ok(Argument { premises, conclusion })
    }

    pub fn premises(&self) -> &[Formula] {
        &self.premises
    }

    pub fn conclusion(&self) -> &Formula {
        &self.conclusion
    }

    pub fn to_formula(&self) -> Formula {
        Formula::implies(Formula::and(self.premises.iter().cloned()), self.conclusion.clone())
    }

    pub fn atoms(&self) -> BTreeSet<Sentence> {
        let mut atoms = self.conclusion.atoms();
        for p in &self.premises {
            atoms.extend(p.atoms());
        }
        atoms
    }

    /// Truth values the premises demand.
    pub fn premise_requirements(&self) -> Result<Assignment> {
        self.premises.iter().map(literal_requirement).collect()
    }

    /// Truth value the conclusion demands.
    pub fn conclusion_requirement(&self) -> Result<Assignment> {
        literal_requirement(&self.conclusion).map(|(s, v)| Assignment::from([(s, v)]))
    }

    /// Premise and conclusion requirements together.
    pub fn requirements(&self) -> Result<Assignment> {
        let mut reqs = self.premise_requirements()?;
        reqs.extend(self.conclusion_requirement()?);
        Ok(reqs)
    }
}

fn literal_requirement(formula: &Formula) -> Result<(Sentence, bool)> {
    formula
        .as_literal()
        .map(|(s, v)| (s.clone(), v))
        .ok_or_else(|| Error::NonLiteralRequirement {
            formula: formula.to_string(),
        })
}

impl Display for Argument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let premises: Vec<String> = self.premises.iter().map(ToString::to_string).collect();
        if premises.len() == 1 {
            write!(f, "{}", premises[0])?;
        } else {
            write!(f, "({})", premises.join(" & "))?;
        }
        match self.conclusion.as_literal() {
            Some(_) => write!(f, " >> {}", self.conclusion),
            None => write!(f, " >> ({})", self.conclusion),
        }
    }
}

/// A conjunction of arguments over an optional set of declared sentences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Debate {
    arguments: Vec<Argument>,
    declared: BTreeSet<Sentence>,
}

impl Debate {
    pub fn new(arguments: impl IntoIterator<Item = Argument>) -> Self {
        Debate {
            arguments: arguments.into_iter().collect(),
            declared: BTreeSet::new(),
        }
    }

    /// An argument-free debate ranging over the given sentences.
    pub fn over(sentences: impl IntoIterator<Item = Sentence>) -> Self {
        Debate {
            arguments: Vec::new(),
            declared: sentences.into_iter().collect(),
        }
    }

    pub fn push(&mut self, argument: Argument) {
        self.arguments.push(argument);
    }

    /// A copy of this debate extended by `argument`.
    pub fn with_argument(&self, argument: Argument) -> Self {
        let mut debate = self.clone();
        debate.push(argument);
        debate
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    pub fn contains(&self, argument: &Argument) -> bool {
        self.arguments.contains(argument)
    }

    pub fn declared(&self) -> &BTreeSet<Sentence> {
        &self.declared
    }

    /// Declared sentences together with the atoms of all arguments.
    pub fn atoms(&self) -> BTreeSet<Sentence> {
        let mut atoms = self.declared.clone();
        for arg in &self.arguments {
            atoms.extend(arg.atoms());
        }
        atoms
    }

    pub fn to_formula(&self) -> Formula {
        Formula::and(self.arguments.iter().map(Argument::to_formula))
    }

    pub fn list_of_premises(&self) -> Vec<&[Formula]> {
        self.arguments.iter().map(Argument::premises).collect()
    }

    /// Premise atoms that are never concluded, neither positively nor negatively.
    pub fn free_premises(&self) -> BTreeSet<Sentence> {
        let concluded: BTreeSet<&Sentence> = self
            .arguments
            .iter()
            .filter_map(|arg| arg.conclusion().as_literal().map(|(s, _)| s))
            .collect();
        self.arguments
            .iter()
            .flat_map(|arg| arg.premises().iter().flat_map(Formula::atoms))
            .filter(|s| !concluded.contains(s))
            .collect()
    }
}

impl Display for Debate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.arguments.iter().map(|arg| format!("({})", arg)).collect();
        if parts.is_empty() {
            write!(f, "True")
        } else {
            write!(f, "{}", parts.join(" & "))
        }
    }
}
