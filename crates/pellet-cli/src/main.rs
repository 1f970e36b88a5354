//! Pellet CLI: simulation, benchmarking, and config validation.

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pellet")]
#[command(version, about = "Pellet: data-parallel DEM particle simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Built-in configurations.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Preset {
    Default,
    Debug,
    Dense,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from a config file or preset.
    Run {
        /// Path to simulation config (TOML). Overrides --preset.
        #[arg(short, long)]
        config: Option<String>,

        /// Preset used when no config file is given.
        #[arg(short, long, value_enum, default_value = "default")]
        preset: Preset,

        /// Number of external ticks.
        #[arg(short, long, default_value_t = 300)]
        ticks: u64,

        /// External frame delta (seconds).
        #[arg(long, default_value_t = pellet_types::constants::DEFAULT_FRAME_DT)]
        dt: f32,

        /// Log a progress line every N ticks.
        #[arg(long, default_value_t = 60)]
        log_every: u64,

        /// Forward telemetry events to the log.
        #[arg(long)]
        events: bool,
    },

    /// Run benchmark suite.
    Bench {
        /// Which scenario to run (pair_repulsion, floor_bounce, box_settle, all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Use brute force instead of the grid.
        #[arg(long)]
        brute_force: bool,

        /// Output file path (CSV, or JSON with --json).
        #[arg(short, long)]
        output: Option<String>,

        /// Export JSON instead of CSV.
        #[arg(long)]
        json: bool,
    },

    /// Run grid and brute force side by side and compare them.
    Compare {
        /// Particle count.
        #[arg(short, long, default_value_t = 1000)]
        particles: usize,

        /// Number of external ticks.
        #[arg(short, long, default_value_t = 60)]
        ticks: u32,

        /// Optional base config (TOML); --particles still applies.
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Validate a simulation config file.
    Validate {
        /// Path to config file (TOML).
        path: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            preset,
            ticks,
            dt,
            log_every,
            events,
        } => commands::run(config.as_deref(), preset, ticks, dt, log_every, events),
        Commands::Bench {
            scenario,
            brute_force,
            output,
            json,
        } => commands::bench(&scenario, brute_force, output.as_deref(), json),
        Commands::Compare {
            particles,
            ticks,
            config,
        } => commands::compare(particles, ticks, config.as_deref()),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
