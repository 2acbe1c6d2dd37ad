mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand};
use randexam_core::config::ConfigLoader;
use randexam_core::config::types::ResolvedConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "randexam", version, about = "Randomized exam generator")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Assemble an exam from an index file and write one file per channel
    Generate(GenerateArgs),

    /// Resolve the quota tree of an index file without sampling
    Check(CheckArgs),

    /// Write a starter index file
    Init(InitArgs),

    /// Validate configuration and print resolved values
    Doctor,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Exam index file (YAML)
    pub index: PathBuf,

    /// Question bank directory or file
    #[arg(long, short = 'b')]
    pub bank: Option<PathBuf>,

    /// Force an edition instead of taking the first unused one
    #[arg(long, short = 'e')]
    pub edition: Option<usize>,

    /// Base random seed (the edition is added to it)
    #[arg(long, short = 's')]
    pub seed: Option<u64>,

    /// Number of assembly attempts
    #[arg(long, short = 'a')]
    pub tries: Option<usize>,

    /// Accepted distance from the target difficulty
    #[arg(long, short = 't')]
    pub tolerance: Option<f64>,

    /// Write the closest attempt when none lands within tolerance
    #[arg(long)]
    pub accept_best: bool,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Exam index file (YAML)
    pub index: PathBuf,

    /// Question bank directory or file
    #[arg(long, short = 'b')]
    pub bank: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Index file to create
    pub index: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Doctor => cmd::doctor::run(cli.config.as_deref()),
        Commands::Init(args) => cmd::init::run(&args.index),
        Commands::Generate(args) => {
            let rc = load_config(cli.config.as_deref(), "generate");
            logging::init(&rc);
            cmd::generate::run(&rc, &args);
        }
        Commands::Check(args) => {
            let rc = load_config(cli.config.as_deref(), "check");
            logging::init(&rc);
            cmd::check::run(&rc, &args);
        }
    }
}

fn load_config(config: Option<&Path>, command: &str) -> ResolvedConfig {
    match ConfigLoader::load(config) {
        Ok(rc) => rc,
        Err(e) => {
            println!("FAIL randexam {command}");
            println!("{e}");
            std::process::exit(1);
        }
    }
}
