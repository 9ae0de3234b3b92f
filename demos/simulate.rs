use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use dialectic_rs::introduction::{GrowthMode, IntroductionStrategy, SelectionStrategy};
use dialectic_rs::position::Position;
use dialectic_rs::simulation::{Simulation, SimulationConfig};
use dialectic_rs::update::UpdateStrategy;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of agents.
    #[arg(value_name = "INT", default_value = "10")]
    agents: usize,

    /// Initial sentence pool, e.g. `p:10` or `a,b,c`.
    #[arg(long, value_name = "POOL", default_value = "p:10")]
    pool: String,

    /// Sentence pool the debate may grow into.
    #[arg(long, value_name = "POOL")]
    max_pool: Option<String>,

    /// Key statements for tree growth.
    #[arg(long, value_name = "POOL")]
    key_statements: Option<String>,

    /// Weight of argument introductions.
    #[arg(long, value_name = "INT", default_value = "9")]
    introduction_weight: u32,

    /// Weight of new sentences.
    #[arg(long, value_name = "INT", default_value = "1")]
    new_sentence_weight: u32,

    /// Introduce arguments without a source and a target.
    #[arg(long)]
    undirected: bool,

    /// Debate growth: `random` or `tree`.
    #[arg(long, value_name = "MODE", default_value = "random")]
    growth: GrowthMode,

    /// Introduction strategy of all agents.
    #[arg(long, value_name = "STRATEGY", default_value = "random")]
    strategy: IntroductionStrategy,

    /// Update strategy: `closest_coherent` or `closest_closed_partial_coherent`.
    #[arg(long, value_name = "STRATEGY", default_value = "closest_coherent")]
    update: UpdateStrategy,

    /// Argument selection: `any` or `max`.
    #[arg(long, value_name = "SELECTION", default_value = "any")]
    selection: SelectionStrategy,

    /// Premise count of new arguments. May be given several times.
    #[arg(long, value_name = "INT", default_value = "2")]
    argument_length: Vec<usize>,

    /// Search radius of the partial update.
    #[arg(long, value_name = "INT", default_value = "50")]
    radius: usize,

    /// Number of sentences agents start with.
    #[arg(long, value_name = "INT")]
    position_size: Option<usize>,

    /// Stop once the debate is this dense.
    #[arg(long, value_name = "FLOAT", default_value = "0.8")]
    max_density: f64,

    /// Maximum number of steps.
    #[arg(long, value_name = "INT", default_value = "1000")]
    max_steps: usize,

    /// Stop once the SCCP has at most this many positions.
    #[arg(long, value_name = "INT", default_value = "1")]
    min_sccp: u64,

    /// Random seed.
    #[arg(long, value_name = "INT", default_value = "42")]
    seed: u64,

    /// Print the whole simulation log.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();
    println!("args = {:?}", args);

    let mut config = SimulationConfig::default()
        .with_sentence_pool(args.pool)
        .with_event_weights(args.introduction_weight, args.new_sentence_weight)
        .with_directed(!args.undirected)
        .with_growth_mode(args.growth)
        .with_argument_length(args.argument_length)
        .with_introduction_strategy(args.strategy)
        .with_update_strategy(args.update)
        .with_argument_selection(args.selection)
        .with_search_radius(args.radius)
        .with_positions((0..args.agents).map(|_| Position::default().with_strategy(args.strategy)));
    if let Some(pool) = args.max_pool {
        config = config.with_max_sentence_pool(pool);
    }
    if let Some(keys) = args.key_statements {
        config = config.with_key_statements(keys);
    }
    if let Some(size) = args.position_size {
        config = config.with_initial_position_size(size);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut simulation = Simulation::new(config, &mut rng)?;
    let summary = simulation.run(args.max_density, args.max_steps, args.min_sccp, &mut rng)?;

    println!("{}", summary);
    println!("reason: {}", summary.reason);
    println!("final debate: {}", simulation.current_debate());
    for (i, p) in simulation.current_positions().iter().enumerate() {
        println!("  agent {}: {}", i, p);
    }

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
