use biodivine_lib_sync_bn::cancellation::CancellationFlag;
use biodivine_lib_sync_bn::config::{
    DeterministicConfig, DynamicsMode, ExplorationLimits, ProbabilisticConfig, ThresholdPolicy,
    TieBehavior, WeightedConfig,
};
use biodivine_lib_sync_bn::{analyze_with_cancellation, NetworkDefinition};
use clap::{Parser, ValueEnum};
use std::error::Error;
use std::path::PathBuf;

/// Compute the synchronous attractors of a network and their basins.
///
/// `.bnet` models are analysed in the deterministic mode. A `.json` file containing a
/// serialized `NetworkDefinition` can be analysed in any mode.
#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Path to a `.bnet` or `.json` model.
    #[arg(value_name = "FILE")]
    model: PathBuf,

    #[arg(long, value_enum, default_value = "deterministic")]
    mode: Mode,

    #[arg(long, value_enum, default_value = "csv")]
    format: Format,

    /// Maximal number of initial states (larger state spaces are sampled).
    #[arg(long, value_name = "INT", default_value = "65536")]
    state_cap: u64,

    /// Maximal number of steps of one trajectory.
    #[arg(long, value_name = "INT", default_value = "1000")]
    step_cap: usize,

    /// Seed of all pseudo-random choices.
    #[arg(long, value_name = "INT", default_value = "0")]
    seed: u64,

    /// Node count ceiling of the selected mode (the mode's default if omitted).
    #[arg(long, value_name = "INT")]
    max_nodes: Option<usize>,

    /// Threshold of a weighted node, as a fraction of its positive input weight.
    #[arg(long, value_name = "FLOAT", default_value = "0.5")]
    multiplier: f64,

    /// Value of a weighted node whose input is exactly at its threshold.
    #[arg(long, value_enum, default_value = "hold")]
    tie: Tie,

    /// Maximal number of probabilistic iterations.
    #[arg(long, value_name = "INT", default_value = "1000")]
    iteration_cap: usize,

    /// Noise probability of the probabilistic mode.
    #[arg(long, value_name = "FLOAT", default_value = "0.01")]
    noise: f64,

    /// Decay factor of the probabilistic mode.
    #[arg(long, value_name = "FLOAT", default_value = "0")]
    degradation: f64,

    /// Largest change of the ensemble mean still considered stable.
    #[arg(long, value_name = "FLOAT", default_value = "0.001")]
    tolerance: f64,

    /// Print debug messages.
    #[arg(long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Deterministic,
    Weighted,
    Probabilistic,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Tie {
    Hold,
    On,
    Off,
}

impl From<Tie> for TieBehavior {
    fn from(value: Tie) -> Self {
        match value {
            Tie::Hold => TieBehavior::Hold,
            Tie::On => TieBehavior::ForceOn,
            Tie::Off => TieBehavior::ForceOff,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    let level = if args.verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let buffer = std::fs::read_to_string(&args.model)?;
    let is_json = args
        .model
        .extension()
        .map(|it| it.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let definition: NetworkDefinition = if is_json {
        serde_json::from_str(&buffer)?
    } else {
        NetworkDefinition::try_from_bnet(&buffer)?
    };
    log::info!(
        "Loaded model with {} nodes and {} rules.",
        definition.nodes().len(),
        definition.rules().len()
    );

    let limits = ExplorationLimits::default()
        .with_state_cap(args.state_cap)
        .with_step_cap(args.step_cap)
        .with_seed(args.seed);
    let threshold = ThresholdPolicy::new(args.multiplier, args.tie.into());
    let mode = match args.mode {
        Mode::Deterministic => {
            let mut config = DeterministicConfig::default().with_limits(limits);
            if let Some(max_nodes) = args.max_nodes {
                config = config.with_max_nodes(max_nodes);
            }
            DynamicsMode::Deterministic(config)
        }
        Mode::Weighted => {
            let mut config = WeightedConfig::default()
                .with_limits(limits)
                .with_threshold(threshold);
            if let Some(max_nodes) = args.max_nodes {
                config = config.with_max_nodes(max_nodes);
            }
            DynamicsMode::Weighted(config)
        }
        Mode::Probabilistic => {
            let mut config = ProbabilisticConfig::default()
                .with_seed(args.seed)
                .with_threshold(threshold)
                .with_iteration_cap(args.iteration_cap)
                .with_noise(args.noise)
                .with_degradation(args.degradation)
                .with_tolerance(args.tolerance);
            if let Some(max_nodes) = args.max_nodes {
                config = config.with_max_nodes(max_nodes);
            }
            DynamicsMode::Probabilistic(config)
        }
    };

    let result = analyze_with_cancellation(&definition, &mode, &CancellationFlag::new())?;
    match args.format {
        Format::Csv => result.write_csv(std::io::stdout())?,
        Format::Json => println!("{}", result.to_json()?),
    }
    Ok(())
}
