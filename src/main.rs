use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use competition_engine::bracket::KnockoutBracketBuilder;
use competition_engine::config::{EngineConfig, ScheduleConfig};
use competition_engine::models::{
    apply_result_updates, Fixture, NodeId, ResultUpdate, Team, TeamId,
};
use competition_engine::schedule::{FixtureGenerator, ScheduleOptions};
use competition_engine::standings::{StandingsEngine, StandingsTable};

#[derive(Parser)]
#[command(name = "competition-engine")]
#[command(about = "Round-robin fixtures, league tables and knockout brackets")]
#[command(version)]
struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a round-robin schedule
    Fixtures(FixturesArgs),

    /// Compute a league table
    Standings {
        /// JSON file with the team roster
        #[arg(long)]
        teams: PathBuf,

        /// JSON file with fixtures
        #[arg(long)]
        matches: PathBuf,

        /// JSON file with result updates to apply first
        #[arg(long)]
        results: Option<PathBuf>,

        /// Print JSON instead of a text table
        #[arg(long)]
        json: bool,
    },

    /// Build a knockout bracket and replay results through it
    Bracket {
        /// JSON file with teams ordered best to worst
        #[arg(long)]
        teams: PathBuf,

        /// Stage key mixed into fixture IDs (overrides config)
        #[arg(long)]
        stage: Option<String>,

        /// Add a third-place match (overrides config)
        #[arg(long)]
        third_place: Option<bool>,

        /// JSON file with node winners, applied in order
        #[arg(long)]
        results: Option<PathBuf>,
    },
}

#[derive(Args)]
struct FixturesArgs {
    /// JSON file with the team roster
    #[arg(long)]
    teams: PathBuf,

    /// Stage key mixed into fixture IDs (overrides config)
    #[arg(long)]
    stage: Option<String>,

    /// First possible match day (YYYY-MM-DD); today when omitted
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Kickoff time (HH:MM)
    #[arg(long)]
    kickoff: Option<String>,

    /// Only schedule on Saturdays and Sundays (overrides config)
    #[arg(long)]
    weekends_only: Option<bool>,

    /// Add a mirrored second leg (overrides config)
    #[arg(long)]
    home_and_away: Option<bool>,

    /// Venue attached to every fixture
    #[arg(long)]
    venue: Option<String>,
}

impl FixturesArgs {
    /// Config defaults with every flag given on the command line applied on top.
    fn options(&self, config: &ScheduleConfig) -> ScheduleOptions {
        let mut options = config.options(self.start);
        if let Some(stage) = &self.stage {
            options.stage = stage.clone();
        }
        if let Some(kickoff) = &self.kickoff {
            options.kickoff_time = kickoff.clone();
        }
        if let Some(weekends_only) = self.weekends_only {
            options.weekends_only = weekends_only;
        }
        if let Some(home_and_away) = self.home_and_away {
            options.home_and_away = home_and_away;
        }
        if self.venue.is_some() {
            options.venue = self.venue.clone();
        }
        options
    }
}

/// One recorded knockout result.
#[derive(Debug, Deserialize)]
struct NodeResult {
    node: NodeId,
    winner: TeamId,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_table(table: &StandingsTable) {
    println!(
        "{:>3}  {:<20} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>5} {:>4}  Form",
        "Pos", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
    );
    for row in &table.rows {
        println!(
            "{:>3}  {:<20} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>+5} {:>4}  {}",
            row.position,
            row.team_id.as_str(),
            row.played,
            row.won,
            row.drawn,
            row.lost,
            row.goals_for,
            row.goals_against,
            row.goal_difference,
            row.points,
            row.form_string()
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::info!("Starting competition-engine v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Fixtures(args) => {
            let teams: Vec<Team> = read_json(&args.teams)?;
            let options = args.options(&config.schedule);

            let fixtures = FixtureGenerator::new().generate(&teams, &options)?;
            tracing::info!("Generated {} fixtures for {} teams", fixtures.len(), teams.len());
            println!("{}", serde_json::to_string_pretty(&fixtures)?);
        }

        Commands::Standings {
            teams,
            matches,
            results,
            json,
        } => {
            let teams: Vec<Team> = read_json(&teams)?;
            let mut fixtures: Vec<Fixture> = read_json(&matches)?;
            if let Some(results) = results {
                let updates: Vec<ResultUpdate> = read_json(&results)?;
                apply_result_updates(&mut fixtures, &updates)?;
                tracing::info!("Applied {} result updates", updates.len());
            }

            let table = StandingsEngine::new(config.standings.clone()).compute(&teams, &fixtures)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                print_table(&table);
            }
        }

        Commands::Bracket {
            teams,
            stage,
            third_place,
            results,
        } => {
            let teams: Vec<Team> = read_json(&teams)?;
            let mut bracket = KnockoutBracketBuilder::new()
                .with_stage(stage.unwrap_or_else(|| config.knockout.stage.clone()))
                .with_third_place(third_place.unwrap_or(config.knockout.third_place))
                .build(&teams)?;

            if let Some(results) = results {
                let results: Vec<NodeResult> = read_json(&results)?;
                for result in &results {
                    bracket
                        .advance(result.node, &result.winner)
                        .with_context(|| format!("Failed to advance {}", result.node))?;
                }
                tracing::info!("Applied {} knockout results", results.len());
            }

            if let Some(champion) = bracket.champion() {
                tracing::info!("Champion: {}", champion);
            }
            println!("{}", serde_json::to_string_pretty(&bracket)?);
        }
    }

    Ok(())
}
