use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use schnitzeljagd_cli::{
    CliError, HttpLeaderboard, JsonFileResultStore, LogConfig, Replay, Result, Scenario,
};
use schnitzeljagd_core::{
    CatalogConfig, ChallengeCatalog, GeoPoint, LeaderboardSummary, ResultStore, RunResult,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "schnitzel")]
#[command(version, about = "Schnitzeljagd - device scavenger hunt runner")]
struct Cli {
    /// File the local scores are kept in
    #[arg(long, global = true, env = "SCHNITZEL_STORE", default_value = "schnitzeljagd_runs.json")]
    store: PathBuf,

    /// Remote leaderboard; finished runs are posted here when set
    #[arg(long, global = true, env = "LEADERBOARD_URL")]
    leaderboard_url: Option<String>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    /// Log one JSON object per line
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the challenges a run started at the given position would get
    Catalog {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Seed for reproducible targets and distances
        #[arg(long)]
        seed: Option<u64>,

        /// Include the sensor challenge
        #[arg(long)]
        with_sensor: bool,
    },

    /// Play a scenario file through a full game session
    Replay {
        /// Scenario JSON file
        #[arg(short = 's', long)]
        scenario: PathBuf,

        /// Player name, overrides the scenario's
        #[arg(short = 'n', long)]
        name: Option<String>,
    },

    /// Show the local leaderboard
    Leaderboard,

    /// Delete all local scores
    Clear,

    /// Print a JSON schema
    Schema {
        #[arg(value_enum, default_value_t = SchemaKind::RunResult)]
        kind: SchemaKind,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchemaKind {
    /// Leaderboard submission body
    RunResult,
    /// Replay scenario file
    Scenario,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    LogConfig::default()
        .with_level(cli.log_level)
        .with_json(cli.json_logs)
        .init()
        .map_err(CliError::InvalidConfig)?;

    let store = JsonFileResultStore::new(&cli.store);

    match cli.command {
        Commands::Catalog {
            lat,
            lng,
            seed,
            with_sensor,
        } => print_catalog(GeoPoint::new(lat, lng), seed, with_sensor)?,
        Commands::Replay { scenario, name } => {
            let leaderboard = HttpLeaderboard::new(cli.leaderboard_url);
            replay(scenario, name, store, leaderboard).await?;
        }
        Commands::Leaderboard => print_leaderboard(&store).await?,
        Commands::Clear => {
            store.clear_runs().await?;
            info!("Cleared scores in {}", store.path().display());
        }
        Commands::Schema { kind } => {
            let schema = match kind {
                SchemaKind::RunResult => schemars::schema_for!(RunResult),
                SchemaKind::Scenario => schemars::schema_for!(Scenario),
            };
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn print_catalog(origin: GeoPoint, seed: Option<u64>, with_sensor: bool) -> Result<()> {
    let catalog = ChallengeCatalog::new(CatalogConfig::default().with_sensor(with_sensor));
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let challenges = catalog.build(origin, &mut rng);
    println!("{}", serde_json::to_string_pretty(&challenges)?);
    Ok(())
}

async fn replay(
    path: PathBuf,
    name: Option<String>,
    store: JsonFileResultStore,
    leaderboard: HttpLeaderboard,
) -> Result<()> {
    let scenario = Scenario::load(&path).await?;
    info!(
        "Replaying {} ({} steps)",
        path.display(),
        scenario.steps.len()
    );

    let outcome = Replay::new(scenario, Arc::new(store))
        .with_leaderboard(Arc::new(leaderboard))
        .run(name.as_deref())
        .await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn print_leaderboard(store: &JsonFileResultStore) -> Result<()> {
    let summary = LeaderboardSummary::from_scores(store.get_runs().await?);

    if !summary.has_runs() {
        println!("No runs yet.");
        return Ok(());
    }

    for (rank, score) in summary.ranked().iter().enumerate() {
        println!(
            "{:>2}. {:<24} {:>5} pts  {}",
            rank + 1,
            score.name,
            score.points,
            score.completed_at.format("%Y-%m-%d %H:%M")
        );
    }
    println!(
        "{} runs, {} points on average",
        summary.total_runs(),
        summary.average_points()
    );
    Ok(())
}
