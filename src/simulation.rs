//! Debates that grow argument by argument.
//!
//! A [`Simulation`] keeps two append-only histories of equal length: debate
//! snapshots and the population of positions after each snapshot. Every step
//! either introduces an argument (after which all positions are updated) or
//! widens the sentence pool.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use log::{info, log, Level};
use num_bigint::BigUint;
use rand::seq::{index, SliceRandom};
use rand::Rng;

use crate::error::{Error, Result};
use crate::formula::{Argument, Debate, Formula, Sentence};
use crate::introduction::{
    possible_targets, select, ArgumentDraw, GrowthMode, IntroductionStrategy, SelectionStrategy,
};
use crate::pool::SentencePool;
use crate::position::{init_positions, Position};
use crate::update::{respond, UpdateOutcome, UpdateStrategy};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EventWeights {
    pub introduction: u32,
    pub new_sentence: u32,
}

impl Default for EventWeights {
    fn default() -> Self {
        EventWeights {
            introduction: 9,
            new_sentence: 1,
        }
    }
}

impl EventWeights {
    pub fn validate(&self) -> Result<()> {
        if u64::from(self.introduction) + u64::from(self.new_sentence) == 0 {
            return Err(Error::InvalidEventWeights {
                introduction: self.introduction,
                new_sentence: self.new_sentence,
            });
        }
        Ok(())
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Event {
        let total = u64::from(self.introduction) + u64::from(self.new_sentence);
        if rng.gen_range(0..total) < u64::from(self.introduction) {
            Event::Introduction
        } else {
            Event::NewSentence
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    Introduction,
    NewSentence,
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Initial sentence pool, e.g. `"p:10"` or `"a, b, c"`.
    pub sentence_pool: String,
    /// The pool may grow up to this one through new-sentence events.
    pub max_sentence_pool: Option<String>,
    /// Sentences tree growth starts from.
    pub key_statements: Option<String>,
    pub event_weights: EventWeights,
    pub directed: bool,
    pub growth_mode: GrowthMode,
    /// Premise counts new arguments are drawn with.
    pub argument_length: Vec<usize>,
    pub default_introduction_strategy: IntroductionStrategy,
    pub default_update_strategy: UpdateStrategy,
    pub argument_selection: SelectionStrategy,
    pub partial_neighbour_search_radius: usize,
    /// Arguments drawn per directed introduction attempt.
    pub candidate_arguments: usize,
    pub initial_positions: Vec<Position>,
    /// Length initial positions are filled up to. `None` fills them completely.
    pub initial_position_size: Option<usize>,
    /// Debate the simulation continues from.
    pub parent_debate: Option<Debate>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            sentence_pool: "p:10".to_string(),
            max_sentence_pool: None,
            key_statements: None,
            event_weights: EventWeights::default(),
            directed: true,
            growth_mode: GrowthMode::default(),
            argument_length: vec![2],
            default_introduction_strategy: IntroductionStrategy::default(),
            default_update_strategy: UpdateStrategy::default(),
            argument_selection: SelectionStrategy::default(),
            partial_neighbour_search_radius: 50,
            candidate_arguments: 5,
            initial_positions: Vec::new(),
            initial_position_size: None,
            parent_debate: None,
        }
    }
}

impl SimulationConfig {
    pub fn with_sentence_pool(mut self, pattern: impl Into<String>) -> Self {
        self.sentence_pool = pattern.into();
        self
    }

    pub fn with_max_sentence_pool(mut self, pattern: impl Into<String>) -> Self {
        self.max_sentence_pool = Some(pattern.into());
        self
    }

    pub fn with_key_statements(mut self, pattern: impl Into<String>) -> Self {
        self.key_statements = Some(pattern.into());
        self
    }

    pub fn with_event_weights(mut self, introduction: u32, new_sentence: u32) -> Self {
        self.event_weights = EventWeights {
            introduction,
            new_sentence,
        };
        self
    }

    pub fn with_directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    pub fn with_growth_mode(mut self, growth_mode: GrowthMode) -> Self {
        self.growth_mode = growth_mode;
        self
    }

    pub fn with_argument_length(mut self, lengths: impl IntoIterator<Item = usize>) -> Self {
        self.argument_length = lengths.into_iter().collect();
        self
    }

    pub fn with_introduction_strategy(mut self, strategy: IntroductionStrategy) -> Self {
        self.default_introduction_strategy = strategy;
        self
    }

    pub fn with_update_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.default_update_strategy = strategy;
        self
    }

    pub fn with_argument_selection(mut self, selection: SelectionStrategy) -> Self {
        self.argument_selection = selection;
        self
    }

    pub fn with_search_radius(mut self, radius: usize) -> Self {
        self.partial_neighbour_search_radius = radius;
        self
    }

    pub fn with_candidate_arguments(mut self, n: usize) -> Self {
        self.candidate_arguments = n;
        self
    }

    pub fn with_positions(mut self, positions: impl IntoIterator<Item = Position>) -> Self {
        self.initial_positions = positions.into_iter().collect();
        self
    }

    pub fn with_initial_position_size(mut self, size: usize) -> Self {
        self.initial_position_size = Some(size);
        self
    }

    pub fn with_parent_debate(mut self, debate: Debate) -> Self {
        self.parent_debate = Some(debate);
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    MaxDensity,
    MaxSteps,
    MinSccp,
    IntroductionExhausted,
    AllArgumentsUncovered,
    MaxAgreement,
}

impl Display for TerminationReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TerminationReason::MaxDensity => "maximum density reached",
            TerminationReason::MaxSteps => "maximum number of steps reached",
            TerminationReason::MinSccp => "SCCP shrank to its minimum",
            TerminationReason::IntroductionExhausted => "no argument could be introduced",
            TerminationReason::AllArgumentsUncovered => "all arguments uncovered",
            TerminationReason::MaxAgreement => "maximum agreement reached",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum SimulationState {
    #[default]
    Running,
    Terminated(TerminationReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntroductionOutcome {
    Introduced {
        argument: Argument,
        /// Introducing agent, for directed introductions.
        source: Option<usize>,
        targets: usize,
        attempts: usize,
    },
    Failed {
        attempts: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Introduction(IntroductionOutcome),
    /// `None` when the pool could not grow any further.
    NewSentence(Option<Sentence>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    pub density: f64,
    pub sccp_size: BigUint,
    pub reason: TerminationReason,
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Simulation ended. {} steps were taken. Density at end: {}. Extension of SCCP: {}.",
            self.steps, self.density, self.sccp_size
        )
    }
}

/// Appends `message` to `log` and mirrors it to the `log` facade.
pub(crate) fn note(log: &mut Vec<String>, level: Level, message: String) {
    log!(level, "{}", message);
    log.push(message);
}

/// Positions after an update round, noting every failed update in `log`.
pub(crate) fn settle(log: &mut Vec<String>, outcomes: Vec<UpdateOutcome>) -> Vec<Position> {
    outcomes
        .into_iter()
        .enumerate()
        .map(|(i, outcome)| {
            if let UpdateOutcome::Failed { reason, .. } = &outcome {
                note(log, Level::Warn, format!("Position {} could not be updated: {}.", i, reason));
            }
            outcome.into_position()
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    sentence_pool: Vec<Sentence>,
    max_sentence_pool: Vec<Sentence>,
    key_statements: Vec<Sentence>,
    used_premises: HashSet<Vec<Formula>>,
    debates: Vec<Debate>,
    positions: Vec<Vec<Position>>,
    log: Vec<String>,
    state: SimulationState,
}

impl Simulation {
    pub fn new<R: Rng + ?Sized>(config: SimulationConfig, rng: &mut R) -> Result<Self> {
        let sentence_pool = SentencePool::parse(&config.sentence_pool)?.into_vec();
        let max_sentence_pool = match &config.max_sentence_pool {
            Some(pattern) => SentencePool::parse(pattern)?.into_vec(),
            None => sentence_pool.clone(),
        };
        let key_statements = match &config.key_statements {
            Some(pattern) => SentencePool::parse(pattern)?.into_vec(),
            None => Vec::new(),
        };
        config.event_weights.validate()?;
        if config.argument_length.is_empty() {
            return Err(Error::InvalidArgumentLength {
                reason: "no premise count given".to_string(),
            });
        }
        if config.argument_length.contains(&0) {
            return Err(Error::InvalidArgumentLength {
                reason: "arguments need at least one premise".to_string(),
            });
        }

        let parent = config.parent_debate.clone().unwrap_or_default();
        let used_premises = parent
            .list_of_premises()
            .into_iter()
            .map(|premises| {
                let mut premises = premises.to_vec();
                premises.sort();
                premises
            })
            .collect();

        let positions = init_positions(
            config.initial_positions.clone(),
            &sentence_pool,
            config.initial_position_size,
            rng,
        )
        .into_iter()
        .map(|p| p.or_strategy(config.default_introduction_strategy).with_debate(0))
        .collect();

        Ok(Simulation {
            config,
            sentence_pool,
            max_sentence_pool,
            key_statements,
            used_premises,
            debates: vec![parent],
            positions: vec![positions],
            log: Vec::new(),
            state: SimulationState::Running,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn sentence_pool(&self) -> &[Sentence] {
        &self.sentence_pool
    }

    pub fn key_statements(&self) -> &[Sentence] {
        &self.key_statements
    }

    /// Premise sets already used by some argument, sorted.
    pub fn used_premises(&self) -> &HashSet<Vec<Formula>> {
        &self.used_premises
    }

    /// Debate snapshots, oldest first.
    pub fn debates(&self) -> &[Debate] {
        &self.debates
    }

    /// Populations, one per debate snapshot.
    pub fn positions(&self) -> &[Vec<Position>] {
        &self.positions
    }

    pub fn current_debate(&self) -> &Debate {
        // Never empty: the constructor pushes the initial snapshot.
        &self.debates[self.debates.len() - 1]
    }

    pub fn current_positions(&self) -> &[Position] {
        &self.positions[self.positions.len() - 1]
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    fn note(&mut self, level: Level, message: String) {
        note(&mut self.log, level, message);
    }

    /// Samples an event and carries it out.
    ///
    /// A failed introduction terminates the simulation.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<StepOutcome> {
        match self.config.event_weights.sample(rng) {
            Event::Introduction => {
                let outcome = self.introduce(rng)?;
                if let IntroductionOutcome::Introduced { argument, .. } = &outcome {
                    self.push_debate(argument.clone());
                    self.update_positions(rng);
                } else {
                    self.state = SimulationState::Terminated(TerminationReason::IntroductionExhausted);
                }
                Ok(StepOutcome::Introduction(outcome))
            }
            Event::NewSentence => Ok(StepOutcome::NewSentence(self.add_sentence(rng))),
        }
    }

    fn draw(&self) -> ArgumentDraw<'_> {
        ArgumentDraw {
            pool: &self.sentence_pool,
            lengths: &self.config.argument_length,
            used_premises: &self.used_premises,
            growth: self.config.growth_mode,
            key_statements: &self.key_statements,
        }
    }

    fn introduce<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<IntroductionOutcome> {
        let population = self.current_positions().len();
        let default_strategy = self.config.default_introduction_strategy;
        if !self.config.directed || population < 2 {
            let argument = self.draw().draw(self.current_debate(), None, rng);
            return Ok(match argument {
                Some(argument) => {
                    self.note(
                        Level::Info,
                        format!("Argument {} introduced with strategy {}.", argument, default_strategy),
                    );
                    IntroductionOutcome::Introduced {
                        argument,
                        source: None,
                        targets: 0,
                        attempts: 1,
                    }
                }
                None => {
                    self.note(
                        Level::Warn,
                        format!(
                            "Argument introduction with strategy {} did not succeed: no admissible argument could be drawn.",
                            default_strategy
                        ),
                    );
                    IntroductionOutcome::Failed { attempts: 1 }
                }
            });
        }

        let mut attempts = 0;
        while 2 * attempts < population {
            attempts += 1;
            let pair = index::sample(rng, population, 2);
            let (source, target) = (pair.index(0), pair.index(1));
            let strategy = match self.current_positions()[source].strategy() {
                Some(choice) => choice.pick(rng),
                None => default_strategy,
            };

            match self.directed_candidate(&strategy, source, target, rng)? {
                Some((argument, targets)) => {
                    self.note(
                        Level::Info,
                        format!("Argument introduction suceeded after {} attempts.", attempts),
                    );
                    return Ok(IntroductionOutcome::Introduced {
                        argument,
                        source: Some(source),
                        targets,
                        attempts,
                    });
                }
                None => {
                    let message = format!(
                        "No {} argument available for position {}.",
                        strategy,
                        self.current_positions()[source]
                    );
                    self.note(Level::Info, message);
                }
            }
        }
        self.note(
            Level::Warn,
            format!("Argument introduction did not succeed, even after {} attempts.", attempts),
        );
        Ok(IntroductionOutcome::Failed { attempts })
    }

    /// Draws candidate arguments from `source` against `target` and selects one
    /// among those with possible targets.
    fn directed_candidate<R: Rng + ?Sized>(
        &self,
        strategy: &IntroductionStrategy,
        source: usize,
        target: usize,
        rng: &mut R,
    ) -> Result<Option<(Argument, usize)>> {
        let positions = self.current_positions();
        let draw = self.draw();

        let mut candidates: Vec<Argument> = Vec::new();
        for _ in 0..self.config.candidate_arguments.max(1) {
            let directed = Some((strategy, &positions[source], &positions[target]));
            if let Some(argument) = draw.draw(self.current_debate(), directed, rng) {
                if !candidates.contains(&argument) {
                    candidates.push(argument);
                }
            }
        }

        let mut counts = Vec::with_capacity(candidates.len());
        for argument in &candidates {
            counts.push(possible_targets(strategy, argument, source, positions)?.len());
        }

        Ok(select(&counts, self.config.argument_selection, rng).map(|i| (candidates[i].clone(), counts[i])))
    }

    fn push_debate(&mut self, argument: Argument) {
        let mut premises = argument.premises().to_vec();
        premises.sort();
        self.used_premises.insert(premises);
        let debate = self.current_debate().with_argument(argument);
        self.debates.push(debate);
    }

    /// Updates the latest population against the latest debate.
    fn update_positions<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let outcomes = respond(
            self.current_debate(),
            &self.sentence_pool,
            &self.positions[self.positions.len() - 1],
            self.config.default_update_strategy,
            self.config.partial_neighbour_search_radius,
            None,
            rng,
        );
        let index = self.debates.len() - 1;
        let updated = settle(&mut self.log, outcomes)
            .into_iter()
            .map(|p| p.with_debate(index))
            .collect();
        self.positions.push(updated);
    }

    fn add_sentence<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Sentence> {
        let picked = {
            let candidates: Vec<&Sentence> = self
                .max_sentence_pool
                .iter()
                .filter(|s| !self.sentence_pool.contains(s))
                .collect();
            candidates.choose(rng).map(|&s| s.clone())
        };
        let Some(sentence) = picked else {
            self.note(
                Level::Warn,
                "Tried to insert a new sentence to the debate but maximum extension was reached.".to_string(),
            );
            return None;
        };
        self.sentence_pool.push(sentence.clone());
        self.note(Level::Info, format!("Sentence {} added to the sentence pool.", sentence));

        let debate = self.current_debate().clone();
        self.debates.push(debate);
        let index = self.debates.len() - 1;
        let expanded = self
            .current_positions()
            .iter()
            .map(|p| {
                let mut p = p.clone().with_debate(index);
                if rng.gen_ratio(2, 3) {
                    p.insert(sentence.clone(), rng.gen_bool(0.5));
                }
                p
            })
            .collect();
        self.positions.push(expanded);
        Some(sentence)
    }

    /// Steps until the latest debate is dense enough, `max_steps` steps were
    /// taken, the SCCP has shrunk to `min_sccp` positions or no argument can
    /// be introduced anymore.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        max_density: f64,
        max_steps: usize,
        min_sccp: u64,
        rng: &mut R,
    ) -> Result<RunSummary> {
        let mut steps = 0;
        let reason = loop {
            if let SimulationState::Terminated(reason) = self.state {
                break reason;
            }
            self.step(rng)?;
            if let SimulationState::Terminated(reason) = self.state {
                break reason;
            }
            steps += 1;

            let debate = self.current_debate();
            if debate.density() >= max_density {
                break TerminationReason::MaxDensity;
            }
            if steps >= max_steps {
                break TerminationReason::MaxSteps;
            }
            if !debate.is_empty() && debate.count_models() <= BigUint::from(min_sccp) {
                break TerminationReason::MinSccp;
            }
        };
        self.state = SimulationState::Terminated(reason);

        let debate = self.current_debate();
        let summary = RunSummary {
            steps,
            density: debate.density(),
            sccp_size: debate.count_models(),
            reason,
        };
        info!("{}", reason);
        self.note(Level::Info, summary.to_string());
        Ok(summary)
    }
}
