//! Agents influencing each other on a debate that never changes.
//!
//! Each step a random agent and a random sentence are drawn. Every agent is
//! pulled towards the drawn agent's stance on that sentence, the more likely
//! the closer they already are, and then restores coherence.

use std::fmt::{Display, Formatter};

use log::Level;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::distance::{mean_pairwise, normalised_edit_agreement, normalised_edit_distance};
use crate::engine::{CompiledFormula, Models};
use crate::error::Result;
use crate::fixed::ArgumentMapGenerator;
use crate::formula::{Debate, Sentence};
use crate::pool::SentencePool;
use crate::position::{init_positions, Position};
use crate::simulation::{note, settle, SimulationState, TerminationReason};
use crate::update::{respond, UpdateStrategy};

#[derive(Debug, Clone)]
pub struct SocialInfluenceConfig {
    pub sentence_pool: String,
    pub num_key_statements: usize,
    pub initial_positions: Vec<Position>,
    pub initial_position_size: Option<usize>,
    pub update_strategy: UpdateStrategy,
    pub partial_neighbour_search_radius: usize,
    /// Weight of distance against being influenced, usually in `[0, 1]`.
    pub influence_parameter: f64,
}

impl Default for SocialInfluenceConfig {
    fn default() -> Self {
        SocialInfluenceConfig {
            sentence_pool: "p:10".to_string(),
            num_key_statements: 3,
            initial_positions: Vec::new(),
            initial_position_size: Some(5),
            update_strategy: UpdateStrategy::default(),
            partial_neighbour_search_radius: 50,
            influence_parameter: 0.0,
        }
    }
}

impl SocialInfluenceConfig {
    pub fn with_sentence_pool(mut self, pattern: impl Into<String>) -> Self {
        self.sentence_pool = pattern.into();
        self
    }

    pub fn with_key_statements(mut self, n: usize) -> Self {
        self.num_key_statements = n;
        self
    }

    pub fn with_positions(mut self, positions: impl IntoIterator<Item = Position>) -> Self {
        self.initial_positions = positions.into_iter().collect();
        self
    }

    pub fn with_initial_position_size(mut self, size: Option<usize>) -> Self {
        self.initial_position_size = size;
        self
    }

    pub fn with_update_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.update_strategy = strategy;
        self
    }

    pub fn with_search_radius(mut self, radius: usize) -> Self {
        self.partial_neighbour_search_radius = radius;
        self
    }

    pub fn with_influence(mut self, influence: f64) -> Self {
        self.influence_parameter = influence;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfluenceSummary {
    pub steps: usize,
    pub agreement: f64,
    pub reason: TerminationReason,
}

impl Display for InfluenceSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Simulation ended. {} steps taken. Reached mean agreement of {}.",
            self.steps, self.agreement
        )
    }
}

#[derive(Debug, Clone)]
pub struct SocialInfluenceSimulation {
    config: SocialInfluenceConfig,
    sentence_pool: Vec<Sentence>,
    key_statements: Vec<Sentence>,
    debate: Debate,
    /// All models of the debate, kept when updating by `closest_coherent`.
    models: Option<Models>,
    positions: Vec<Vec<Position>>,
    log: Vec<String>,
    state: SimulationState,
}

impl SocialInfluenceSimulation {
    /// Sets up the population and brings it in line with `debate` once.
    pub fn new<R: Rng + ?Sized>(debate: Debate, config: SocialInfluenceConfig, rng: &mut R) -> Result<Self> {
        let sentence_pool = SentencePool::parse(&config.sentence_pool)?.into_vec();
        let key_statements = sentence_pool.iter().take(config.num_key_statements).cloned().collect();
        let initial = init_positions(
            config.initial_positions.clone(),
            &sentence_pool,
            config.initial_position_size,
            rng,
        );

        let mut log = Vec::new();
        let models = match config.update_strategy {
            UpdateStrategy::ClosestCoherent => {
                Some(CompiledFormula::for_debate_over(&debate, &sentence_pool).enumerate_models())
            }
            strategy => {
                note(
                    &mut log,
                    Level::Info,
                    format!("Unable to compute all models given the update strategy {}.", strategy),
                );
                None
            }
        };

        let outcomes = respond(
            &debate,
            &sentence_pool,
            &initial,
            config.update_strategy,
            config.partial_neighbour_search_radius,
            models.as_ref(),
            rng,
        );
        let updated = settle(&mut log, outcomes);

        Ok(SocialInfluenceSimulation {
            config,
            sentence_pool,
            key_statements,
            debate,
            models,
            positions: vec![initial, updated],
            log,
            state: SimulationState::Running,
        })
    }

    pub fn from_generator<G, R>(generator: &mut G, config: SocialInfluenceConfig, rng: &mut R) -> Result<Self>
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

    pub fn models(&self) -> Option<&Models> {
        self.models.as_ref()
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

    /// Mean pairwise edit agreement of the latest population.
    ///
    /// A population without pairs counts as fully agreeing.
    pub fn mean_agreement(&self) -> f64 {
        mean_pairwise(self.current_positions(), normalised_edit_agreement).unwrap_or(1.0)
    }

    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let current = &self.positions[self.positions.len() - 1];
        if current.is_empty() {
            return;
        }
        let source_id = rng.gen_range(0..current.len());
        let Some(item) = self.sentence_pool.choose(rng).cloned() else {
            return;
        };
        let source = &current[source_id];

        let mut messages = Vec::with_capacity(current.len());
        let candidates: Vec<Position> = current
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let d = normalised_edit_distance(source, p);
                let probability = (1.0 - d * self.config.influence_parameter).clamp(0.0, 1.0);
                if rng.gen_bool(probability) {
                    messages.push(format!("Position {} was influenced by Position {}.", i, source_id));
                    let mut values = p.values().clone();
                    values.remove(&item);
                    if let Some(v) = source.get(&item) {
                        values.insert(item.clone(), v);
                    }
                    p.with_values(values)
                } else {
                    messages.push(format!("Position {} was not influenced by Position {}.", i, source_id));
                    p.clone()
                }
            })
            .collect();

        for message in messages {
            note(&mut self.log, Level::Info, message);
        }
        let outcomes = respond(
            &self.debate,
            &self.sentence_pool,
            &candidates,
            self.config.update_strategy,
            self.config.partial_neighbour_search_radius,
            self.models.as_ref(),
            rng,
        );
        let updated = settle(&mut self.log, outcomes);
        self.positions.push(updated);
    }

    /// Steps while at most `max_steps` steps were taken (no bound for `None`)
    /// and the mean agreement does not exceed `max_agreement`.
    pub fn run<R: Rng + ?Sized>(&mut self, max_steps: Option<usize>, max_agreement: f64, rng: &mut R) -> InfluenceSummary {
        let mut steps = 0;
        let (agreement, reason) = loop {
            let agreement = self.mean_agreement();
            if agreement > max_agreement {
                break (agreement, TerminationReason::MaxAgreement);
            }
            if max_steps.is_some_and(|max| steps > max) {
                break (agreement, TerminationReason::MaxSteps);
            }
            self.step(rng);
            steps += 1;
        };
        self.state = SimulationState::Terminated(reason);

        let summary = InfluenceSummary {
            steps,
            agreement,
            reason,
        };
        note(&mut self.log, Level::Info, summary.to_string());
        summary
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use test_log::test;

    use super::*;
    use crate::formula::{Argument, Formula};

    fn implication() -> Debate {
        Debate::new([Argument::new([Formula::atom("a")], Formula::atom("b")).unwrap()])
    }

    fn pos(pairs: &[(&str, bool)]) -> Position {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_initial_update() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let config = SocialInfluenceConfig::default()
            .with_sentence_pool("a, b")
            .with_initial_position_size(None)
            .with_positions([pos(&[("a", true), ("b", false)]), pos(&[("a", false), ("b", true)])]);
        let sim = SocialInfluenceSimulation::new(implication(), config, &mut rng).unwrap();

        assert_eq!(sim.positions().len(), 2);
        assert_eq!(sim.models().map(|m| m.len()), Some(3));
        let formula = CompiledFormula::for_debate(sim.debate());
        assert!(sim.current_positions().iter().all(|p| p.is_coherent(&formula)));
    }

    #[test]
    fn test_full_influence_copies_stance() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let config = SocialInfluenceConfig::default()
            .with_sentence_pool("a, b")
            .with_initial_position_size(None)
            .with_positions(vec![pos(&[("a", false), ("b", true)]); 3]);
        let mut sim = SocialInfluenceSimulation::new(implication(), config, &mut rng).unwrap();

        // Everyone agrees, so every agent is influenced and nothing changes
        sim.step(&mut rng);
        assert_eq!(sim.positions().len(), 3);
        assert_eq!(sim.positions()[1], sim.positions()[2]);
        assert_eq!(sim.log().iter().filter(|l| l.contains("was influenced")).count(), 3);
        assert_eq!(sim.mean_agreement(), 1.0);
    }

    #[test]
    fn test_run_stops_on_agreement() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let config = SocialInfluenceConfig::default()
            .with_sentence_pool("a, b")
            .with_initial_position_size(None)
            .with_positions(vec![Position::default(); 4])
            .with_update_strategy(UpdateStrategy::ClosestClosedPartialCoherent);
        let mut sim = SocialInfluenceSimulation::new(implication(), config, &mut rng).unwrap();
        assert!(sim.models().is_none());

        let summary = sim.run(Some(3), 0.9, &mut rng);
        assert!(summary.steps <= 4);
        assert!(matches!(sim.state(), SimulationState::Terminated(_)));
        assert_eq!(sim.log().last(), Some(&summary.to_string()));
    }
}
