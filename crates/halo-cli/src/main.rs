use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use halo_core::config::HaloConfig;

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "halo",
    version,
    about = "Score prompt tokens by captured attention and plan context pruning"
)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: output::OutputFormat,

    /// JSON config file (results_dir, progress_interval, top_n, keep_above)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root directory for reports [default: config results_dir]
    #[arg(long, global = true, env = "HALO_RESULTS_DIR")]
    results_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(cli: &Cli) -> Result<HaloConfig> {
    let mut settings = HaloConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load config")?;
    if let Some(dir) = &cli.results_dir {
        settings.results_dir = dir.clone();
    }
    Ok(settings)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let settings = load_settings(&cli)?;

    match &cli.command {
        commands::Commands::Voting(args) => commands::voting::run(args, &settings, cli.format),
        commands::Commands::Symmetric(args) => {
            commands::symmetric::run(args, &settings, cli.format)
        }
        commands::Commands::Magnitude(args) => {
            commands::magnitude::run(args, &settings, cli.format)
        }
        commands::Commands::MagnitudeBos(args) => {
            commands::magnitude_bos::run(args, &settings, cli.format)
        }
        commands::Commands::Cumulative(args) => {
            commands::cumulative::run(args, &settings, cli.format)
        }
        commands::Commands::Compare(args) => commands::compare::run(args, &settings, cli.format),
        commands::Commands::Prune(args) => commands::prune::run(args, &settings, cli.format),
        commands::Commands::Convert(args) => commands::convert::run(args, cli.format),
    }
}
