use std::io;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use instasolve::commands::config::{self, ConfigOperation};
use instasolve::commands::solve::{self, SolveArgs};
use instasolve::commands::typewriter::{self, TypewriterArgs};
use instasolve::ui::console::print_critical;

#[derive(Parser)]
#[command(
    name = "instasolve",
    version,
    about = "Solves instaling.pl vocabulary sessions with human-like typing",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    solve: SolveArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and solve the daily session (default)
    Solve(SolveArgs),

    /// Manage the config files
    Config {
        #[arg(value_enum)]
        operation: ConfigOperation,
    },

    /// Show the typing simulator on a sample sentence
    Typewriter(TypewriterArgs),
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(err) = dispatch(cli) {
        print_critical(&format!("{err:#}"));
        process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        None => solve::run(&cli.solve),
        Some(Command::Solve(args)) => solve::run(&args),
        Some(Command::Config { operation }) => config::run(operation),
        Some(Command::Typewriter(args)) => typewriter::run(&args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("instasolve=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
