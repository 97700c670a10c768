//! Rivulet CLI - compile and run dataflow graphs from the command line.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rivulet")]
#[command(author, version, about = "Rivulet dataflow graph CLI", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available blocks and their parameters
    Blocks(commands::blocks::BlocksArgs),

    /// Compile a graph and print its execution plan
    Compile(commands::compile::CompileArgs),

    /// Run a graph for a number of cycles
    Run(commands::run::RunArgs),
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Blocks(args) => commands::blocks::run(args),
        Commands::Compile(args) => commands::compile::run(args),
        Commands::Run(args) => commands::run::run(args),
    }
}
