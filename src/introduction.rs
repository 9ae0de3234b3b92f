//! Argument introduction.
//!
//! An introduction strategy says where the premises of a new argument come
//! from and how the source and the target agent must stand towards its
//! conclusion. For a candidate argument, the agents it could be used against
//! are those satisfying all three constraints at once.

use std::collections::{BTreeSet, HashSet};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::CompiledFormula;
use crate::error::{Error, Result};
use crate::formula::{Argument, Debate, Formula, Sentence};
use crate::pool::{fetch_premises, premise_candidates};
use crate::position::Position;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PremiseSource {
    /// Premises must be held by the source.
    Source,
    /// Premises must be held by the target.
    Target,
    Unconstrained,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SourceAcceptance {
    /// The source holds the conclusion.
    Yes,
    /// The source holds the conclusion or suspends judgement on it.
    Toleration,
    NotApplicable,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TargetAcceptance {
    /// The target does not hold the conclusion.
    No,
    NotApplicable,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct IntroductionStrategy {
    pub pick_premises_from: PremiseSource,
    pub source_accepts_conclusion: SourceAcceptance,
    pub target_accepts_conclusion: TargetAcceptance,
}

impl IntroductionStrategy {
    pub const RANDOM: Self = Self::new(
        PremiseSource::Unconstrained,
        SourceAcceptance::NotApplicable,
        TargetAcceptance::NotApplicable,
    );
    pub const FORTIFY: Self = Self::new(PremiseSource::Source, SourceAcceptance::Yes, TargetAcceptance::NotApplicable);
    pub const CONVERT: Self = Self::new(PremiseSource::Target, SourceAcceptance::Yes, TargetAcceptance::NotApplicable);
    pub const ATTACK: Self = Self::new(PremiseSource::Target, SourceAcceptance::Yes, TargetAcceptance::No);
    pub const UNDERCUT: Self = Self::new(PremiseSource::Target, SourceAcceptance::Toleration, TargetAcceptance::No);

    const PRESETS: [(&'static str, Self); 5] = [
        ("random", Self::RANDOM),
        ("fortify", Self::FORTIFY),
        ("convert", Self::CONVERT),
        ("attack", Self::ATTACK),
        ("undercut", Self::UNDERCUT),
    ];

    pub const fn new(
        pick_premises_from: PremiseSource,
        source_accepts_conclusion: SourceAcceptance,
        target_accepts_conclusion: TargetAcceptance,
    ) -> Self {
        IntroductionStrategy {
            pick_premises_from,
            source_accepts_conclusion,
            target_accepts_conclusion,
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        Self::PRESETS.iter().find(|(_, s)| s == self).map(|(name, _)| *name)
    }
}

impl Default for IntroductionStrategy {
    fn default() -> Self {
        Self::RANDOM
    }
}

impl FromStr for IntroductionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::PRESETS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s.trim()))
            .map(|&(_, strategy)| strategy)
            .ok_or_else(|| Error::UnknownIntroductionStrategy { name: s.to_string() })
    }
}

impl Display for IntroductionStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(
                f,
                "{{premises: {:?}, source: {:?}, target: {:?}}}",
                self.pick_premises_from, self.source_accepts_conclusion, self.target_accepts_conclusion
            ),
        }
    }
}

/// The introduction strategy of a position: fixed, or drawn anew each time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntroductionChoice {
    Single(IntroductionStrategy),
    Sample(Vec<IntroductionStrategy>),
}

impl IntroductionChoice {
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> IntroductionStrategy {
        match self {
            IntroductionChoice::Single(strategy) => *strategy,
            IntroductionChoice::Sample(strategies) => strategies.choose(rng).copied().unwrap_or_default(),
        }
    }
}

impl Default for IntroductionChoice {
    fn default() -> Self {
        IntroductionChoice::Single(IntroductionStrategy::RANDOM)
    }
}

impl From<IntroductionStrategy> for IntroductionChoice {
    fn from(strategy: IntroductionStrategy) -> Self {
        IntroductionChoice::Single(strategy)
    }
}

impl From<Vec<IntroductionStrategy>> for IntroductionChoice {
    fn from(strategies: Vec<IntroductionStrategy>) -> Self {
        IntroductionChoice::Sample(strategies)
    }
}

/// How to choose among the available arguments.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum SelectionStrategy {
    /// Any argument with at least one possible target.
    #[default]
    Any,
    /// An argument with the most possible targets.
    Max,
}

impl FromStr for SelectionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "any" => Ok(SelectionStrategy::Any),
            "max" => Ok(SelectionStrategy::Max),
            _ => Err(Error::UnknownSelectionStrategy { name: s.to_string() }),
        }
    }
}

impl Display for SelectionStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionStrategy::Any => write!(f, "any"),
            SelectionStrategy::Max => write!(f, "max"),
        }
    }
}

/// Which sentences new conclusions may be about.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum GrowthMode {
    /// Any sentence of the pool.
    #[default]
    Random,
    /// Key statements, or sentences already used as premises.
    Tree,
}

impl FromStr for GrowthMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "random" => Ok(GrowthMode::Random),
            "tree" => Ok(GrowthMode::Tree),
            _ => Err(Error::UnknownGrowthMode { name: s.to_string() }),
        }
    }
}

impl Display for GrowthMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GrowthMode::Random => write!(f, "random"),
            GrowthMode::Tree => write!(f, "tree"),
        }
    }
}

/// Indices of the agents `argument` could target when introduced by `positions[source]`.
pub fn possible_targets(
    strategy: &IntroductionStrategy,
    argument: &Argument,
    source: usize,
    positions: &[Position],
) -> Result<BTreeSet<usize>> {
    let premise_reqs = argument.premise_requirements()?;
    let conclusion_reqs = argument.conclusion_requirement()?;
    let source_position = &positions[source];
    let everyone = || (0..positions.len()).collect::<BTreeSet<usize>>();
    let others = || (0..positions.len()).filter(|&i| i != source).collect::<BTreeSet<usize>>();

    let premise_holders: BTreeSet<usize> = match strategy.pick_premises_from {
        PremiseSource::Target => (0..positions.len())
            .filter(|&i| positions[i].accepts(&premise_reqs))
            .collect(),
        PremiseSource::Source if source_position.accepts(&premise_reqs) => everyone(),
        PremiseSource::Source => BTreeSet::new(),
        PremiseSource::Unconstrained => everyone(),
    };

    let source_ok = match strategy.source_accepts_conclusion {
        SourceAcceptance::Yes => source_position.accepts(&conclusion_reqs),
        SourceAcceptance::Toleration => {
            source_position.accepts(&conclusion_reqs) || source_position.suspends(&conclusion_reqs)
        }
        SourceAcceptance::NotApplicable => true,
    };
    let conclusion_source: BTreeSet<usize> = match strategy.source_accepts_conclusion {
        SourceAcceptance::NotApplicable => others(),
        _ if source_ok => everyone(),
        _ => BTreeSet::new(),
    };

    let conclusion_target: BTreeSet<usize> = match strategy.target_accepts_conclusion {
        TargetAcceptance::No => (0..positions.len())
            .filter(|&i| i != source && !positions[i].accepts(&conclusion_reqs))
            .collect(),
        TargetAcceptance::NotApplicable => others(),
    };

    Ok(premise_holders
        .intersection(&conclusion_source)
        .copied()
        .filter(|i| conclusion_target.contains(i))
        .collect())
}

/// Picks an index into `counts` according to `selection`, ignoring zero counts.
pub fn select<R: Rng + ?Sized>(counts: &[usize], selection: SelectionStrategy, rng: &mut R) -> Option<usize> {
    let threshold = match selection {
        SelectionStrategy::Any => 1,
        SelectionStrategy::Max => counts.iter().copied().max().filter(|&m| m > 0)?,
    };
    let eligible: Vec<usize> = (0..counts.len()).filter(|&i| counts[i] >= threshold).collect();
    eligible.choose(rng).copied()
}

/// Draws new arguments for a growing debate.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentDraw<'a> {
    pub pool: &'a [Sentence],
    pub lengths: &'a [usize],
    /// Premise sets already used, sorted.
    pub used_premises: &'a HashSet<Vec<Formula>>,
    pub growth: GrowthMode,
    pub key_statements: &'a [Sentence],
}

impl ArgumentDraw<'_> {
    /// Sentences a new conclusion may be about.
    pub fn conclusion_sentences(&self, debate: &Debate) -> Vec<Sentence> {
        match self.growth {
            GrowthMode::Random => self.pool.to_vec(),
            GrowthMode::Tree => {
                let mut allowed: BTreeSet<Sentence> = self.key_statements.iter().cloned().collect();
                for premises in debate.list_of_premises() {
                    allowed.extend(premises.iter().flat_map(Formula::atoms));
                }
                if allowed.is_empty() {
                    self.pool.to_vec()
                } else {
                    allowed.into_iter().collect()
                }
            }
        }
    }

    /// Draws one argument that keeps `debate` satisfiable.
    ///
    /// With `directed = Some((strategy, source, target))` premises and
    /// conclusion are drawn so that `target` is a possible target of the
    /// argument when `source` introduces it.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        debate: &Debate,
        directed: Option<(&IntroductionStrategy, &Position, &Position)>,
        rng: &mut R,
    ) -> Option<Argument> {
        let literals = |p: &Position| -> Vec<Formula> {
            p.iter()
                .filter(|(s, _)| self.pool.contains(s))
                .map(|(s, v)| Formula::literal(s.clone(), v))
                .collect()
        };
        let premise_pool = match directed {
            Some((strategy, source, _)) if strategy.pick_premises_from == PremiseSource::Source => literals(source),
            Some((strategy, _, target)) if strategy.pick_premises_from == PremiseSource::Target => literals(target),
            _ => premise_candidates(self.pool),
        };
        let premises = fetch_premises(&premise_pool, self.lengths, self.used_premises, rng)?;
        let premise_atoms: BTreeSet<Sentence> = premises.iter().flat_map(Formula::atoms).collect();

        let mut conclusions: Vec<Formula> = Vec::new();
        for s in self.conclusion_sentences(debate) {
            if premise_atoms.contains(&s) {
                continue;
            }
            for value in [true, false] {
                if let Some((strategy, source, target)) = directed {
                    let source_value = source.get(&s);
                    let source_ok = match strategy.source_accepts_conclusion {
                        SourceAcceptance::Yes => source_value == Some(value),
                        SourceAcceptance::Toleration => source_value.map_or(true, |v| v == value),
                        SourceAcceptance::NotApplicable => true,
                    };
                    let target_ok = match strategy.target_accepts_conclusion {
                        TargetAcceptance::No => target.get(&s) != Some(value),
                        TargetAcceptance::NotApplicable => true,
                    };
                    if !(source_ok && target_ok) {
                        continue;
                    }
                }
                conclusions.push(Formula::literal(s.clone(), value));
            }
        }
        conclusions.shuffle(rng);

        for conclusion in conclusions {
            let Ok(argument) = Argument::new(premises.iter().cloned(), conclusion) else {
                continue;
            };
            if debate.contains(&argument) {
                continue;
            }
            if CompiledFormula::for_debate(&debate.with_argument(argument.clone())).is_satisfiable() {
                debug!("drew argument {}", argument);
                return Some(argument);
            }
        }
        None
    }
}
