/// Build Page — generates `index.html` and its numbered animation frames.
///
/// Usage: build_page [--config <file.ron>] [--length <n>] [--seed <n>]
///                   [--tree <symbols>] [--random-victory] [--skip-unmatched] [--dry-run]
use clap::Parser;
use std::path::PathBuf;
use std::process;
use timber_gen::core::sequence::UnmatchedPolicy;
use timber_gen::core::tree::VictoryRule;
use timber_gen::{BuildError, GameConfig, PageBuilder, Tree};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "build_page")]
#[command(about = "Generate the branching-choice game page and its frame copies")]
struct Cli {
    /// RON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tree length (odd, at least 5)
    #[arg(long, allow_negative_numbers = true)]
    length: Option<i64>,

    /// RNG seed for a reproducible layout
    #[arg(long)]
    seed: Option<u64>,

    /// Replay a fixed layout such as NRNLNRNRN instead of generating one
    #[arg(long)]
    tree: Option<String>,

    /// Draw the victory branch at random (needs VICTORY_L and VICTORY_R frames)
    #[arg(long)]
    random_victory: bool,

    /// Leave out positions whose window has no step instead of failing
    #[arg(long)]
    skip_unmatched: bool,

    /// Plan and print the sequence without touching the filesystem
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timber_gen=info,build_page=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), BuildError> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load_from_ron(path)?,
        None => GameConfig::default(),
    };
    if let Some(length) = cli.length {
        config.length = length;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if cli.random_victory {
        config.victory = VictoryRule::Random;
    }
    if cli.skip_unmatched {
        config.on_unmatched = UnmatchedPolicy::Skip;
    }

    let mut builder = PageBuilder::new(config);
    if let Some(symbols) = &cli.tree {
        builder = builder.tree(symbols.parse::<Tree>()?);
    }

    if cli.dry_run {
        let plan = builder.prepare()?;
        println!("tree: {}", plan.tree);
        if let Some(seed) = plan.seed {
            println!("seed: {}", seed);
        }
        for step in &plan.sequence.steps {
            println!(
                "{:>4}  {} -> {:<4} {} -> {}",
                step.index,
                step.correct_choice,
                step.success_asset,
                step.wrong_choice,
                step.failure_asset
            );
        }
        if !plan.sequence.skipped.is_empty() {
            println!("skipped: {:?}", plan.sequence.skipped);
        }
        return Ok(());
    }

    let report = builder.build()?;
    info!(
        steps = report.steps,
        copies = report.copies,
        tree = %report.tree,
        "built {}",
        report.output.display()
    );
    if let Some(seed) = report.seed {
        info!("reproduce with --seed {}", seed);
    }
    Ok(())
}
