//! Simulations over a debate that exists from the start.
//!
//! The arguments are all there; agents only uncover them one at a time. Each
//! step one agent brings up an argument it can use against at least one other
//! agent, and everybody updates against the arguments uncovered so far.

use log::Level;
use num_bigint::BigUint;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::error::Result;
use crate::formula::{Argument, Debate, Sentence};
use crate::introduction::{possible_targets, select, SelectionStrategy};
use crate::pool::SentencePool;
use crate::position::{init_positions, Position};
use crate::simulation::{note, settle, RunSummary, SimulationState, TerminationReason};
use crate::update::{respond, UpdateStrategy};

/// Builds the debate a fixed-debate simulation runs on.
pub trait ArgumentMapGenerator {
    fn generate(&mut self, sentences: &[Sentence], key_statements: &[Sentence], rng: &mut dyn RngCore) -> Debate;
}

impl<F> ArgumentMapGenerator for F
where
    F: FnMut(&[Sentence], &[Sentence], &mut dyn RngCore) -> Debate,
{
    fn generate(&mut self, sentences: &[Sentence], key_statements: &[Sentence], rng: &mut dyn RngCore) -> Debate {
        self(sentences, key_statements, rng)
    }
}

#[derive(Debug, Clone)]
pub struct FixedDebateConfig {
    pub sentence_pool: String,
    /// The first sentences of the pool are key statements.
    pub num_key_statements: usize,
    /// Arguments known before the first step.
    pub initial_arguments: Vec<Argument>,
    pub initial_positions: Vec<Position>,
    pub initial_position_size: Option<usize>,
    pub update_strategy: UpdateStrategy,
    pub argument_selection: SelectionStrategy,
    pub partial_neighbour_search_radius: usize,
}

impl Default for FixedDebateConfig {
    fn default() -> Self {
        FixedDebateConfig {
            sentence_pool: "p:10".to_string(),
            num_key_statements: 1,
            initial_arguments: Vec::new(),
            initial_positions: Vec::new(),
            initial_position_size: None,
            update_strategy: UpdateStrategy::default(),
            argument_selection: SelectionStrategy::default(),
            partial_neighbour_search_radius: 100,
        }
    }
}

impl FixedDebateConfig {
    pub fn with_sentence_pool(mut self, pattern: impl Into<String>) -> Self {
        self.sentence_pool = pattern.into();
        self
    }

    pub fn with_key_statements(mut self, n: usize) -> Self {
        self.num_key_statements = n;
        self
    }

    pub fn with_initial_arguments(mut self, arguments: impl IntoIterator<Item = Argument>) -> Self {
        self.initial_arguments = arguments.into_iter().collect();
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

    pub fn with_update_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.update_strategy = strategy;
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
}

#[derive(Debug, Clone)]
pub struct FixedDebateSimulation {
    config: FixedDebateConfig,
    sentence_pool: Vec<Sentence>,
    key_statements: Vec<Sentence>,
    debate: Debate,
    uncovered: Vec<Argument>,
    positions: Vec<Vec<Position>>,
    log: Vec<String>,
    state: SimulationState,
}

impl FixedDebateSimulation {
    pub fn new<R: Rng + ?Sized>(debate: Debate, config: FixedDebateConfig, rng: &mut R) -> Result<Self> {
        let sentence_pool = SentencePool::parse(&config.sentence_pool)?.into_vec();
        let key_statements = sentence_pool.iter().take(config.num_key_statements).cloned().collect();
        let positions = init_positions(
            config.initial_positions.clone(),
            &sentence_pool,
            config.initial_position_size,
            rng,
        );

        Ok(FixedDebateSimulation {
            uncovered: config.initial_arguments.clone(),
            config,
            sentence_pool,
            key_statements,
            debate,
            positions: vec![positions],
            log: Vec::new(),
            state: SimulationState::Running,
        })
    }

    /// Generates the debate over the configured pool and key statements first.
    pub fn from_generator<G, R>(generator: &mut G, config: FixedDebateConfig, rng: &mut R) -> Result<Self>
    where
        G: ArgumentMapGenerator + ?Sized,
        R: Rng,
    {
        let sentence_pool = SentencePool::parse(&config.sentence_pool)?.into_vec();
        let key_statements: Vec<Sentence> = sentence_pool.iter().take(config.num_key_statements).cloned().collect();
        let debate = generator.generate(&sentence_pool, &key_statements, rng);
        Self::new(debate, config, rng)
    }

    pub fn debate(&self) -> &Debate {
        &self.debate
    }

    pub fn key_statements(&self) -> &[Sentence] {
        &self.key_statements
    }

    pub fn uncovered_arguments(&self) -> &[Argument] {
        &self.uncovered
    }

    /// The debate made of the uncovered arguments.
    pub fn uncovered_debate(&self) -> Debate {
        Debate::new(self.uncovered.iter().cloned())
    }

    pub fn positions(&self) -> &[Vec<Position>] {
        &self.positions
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

    fn remaining(&self) -> Vec<&Argument> {
        self.debate
            .arguments()
            .iter()
            .filter(|a| !self.uncovered.contains(a))
            .collect()
    }

    /// Lets one agent uncover an argument, then updates all positions.
    ///
    /// Agents are tried in random order until one of them has an argument
    /// with possible targets. Returns `None` if nobody has.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Option<Argument>> {
        let mut new_argument = None;
        let mut messages = Vec::new();
        {
            let remaining = self.remaining();
            let positions = self.current_positions();
            if positions.len() > 1 {
                let mut sources: Vec<usize> = (0..positions.len()).collect();
                sources.shuffle(rng);
                for source in sources {
                    let strategy = positions[source].strategy().map_or_else(Default::default, |c| c.pick(rng));
                    let mut counts = Vec::with_capacity(remaining.len());
                    for &argument in &remaining {
                        counts.push(possible_targets(&strategy, argument, source, positions)?.len());
                    }
                    match select(&counts, self.config.argument_selection, rng) {
                        Some(i) => {
                            messages.push((
                                Level::Info,
                                format!(
                                    "Agent with id {} introduced {}, which targets {} other agents.",
                                    source, remaining[i], counts[i]
                                ),
                            ));
                            new_argument = Some(remaining[i].clone());
                            break;
                        }
                        None => messages.push((
                            Level::Info,
                            format!("No {} argument available for position {}.", strategy, positions[source]),
                        )),
                    }
                }
            } else {
                new_argument = remaining.choose(rng).map(|&a| a.clone());
            }
        }
        for (level, message) in messages {
            note(&mut self.log, level, message);
        }

        let Some(argument) = new_argument else {
            return Ok(None);
        };
        self.uncovered.push(argument.clone());

        let outcomes = respond(
            &self.uncovered_debate(),
            &self.sentence_pool,
            self.current_positions(),
            self.config.update_strategy,
            self.config.partial_neighbour_search_radius,
            None,
            rng,
        );
        let updated = settle(&mut self.log, outcomes);
        self.positions.push(updated);
        Ok(Some(argument))
    }

    /// Uncovers arguments until none is available, all are uncovered,
    /// `max_steps` steps were taken, the uncovered debate is denser than
    /// `max_density` or its SCCP has shrunk to `min_sccp` positions.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        max_density: f64,
        max_steps: usize,
        min_sccp: u64,
        rng: &mut R,
    ) -> Result<RunSummary> {
        let mut steps = 0;
        let reason = loop {
            let uncovered = self.uncovered_debate();
            if steps >= max_steps {
                break TerminationReason::MaxSteps;
            }
            if uncovered.len() > 1 && uncovered.density() > max_density {
                break TerminationReason::MaxDensity;
            }
            if !uncovered.is_empty() && uncovered.count_models() <= BigUint::from(min_sccp) {
                break TerminationReason::MinSccp;
            }
            if self.remaining().is_empty() {
                break TerminationReason::AllArgumentsUncovered;
            }
            if self.step(rng)?.is_none() {
                break TerminationReason::IntroductionExhausted;
            }
            steps += 1;
        };
        self.state = SimulationState::Terminated(reason);

        let uncovered = self.uncovered_debate();
        let summary = RunSummary {
            steps,
            density: uncovered.density(),
            sccp_size: uncovered.count_models(),
            reason,
        };
        note(&mut self.log, Level::Info, summary.to_string());
        Ok(summary)
    }
}
