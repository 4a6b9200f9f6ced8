pub mod commands;
pub mod output;

use crate::core::config::{default_config, load_config, Config};
use crate::core::paths::CONFIG_ENV;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "bgcpred",
    version,
    about = "Biosynthetic gene cluster class prediction for protein sequences",
    long_about = "bgcpred embeds protein sequences residue by residue, reduces the averaged \
                  embedding and classifies it into a biosynthetic gene cluster class with a \
                  pretrained random forest. Sequences can come from a single string, a \
                  multi-FASTA file, GenBank CDS translations or the first column of a CSV file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress bars and summaries
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Number of threads to use (0 = all available, default from config)
    #[arg(short = 'j', long, global = true)]
    pub threads: Option<usize>,

    /// TOML configuration file
    #[arg(long, env = CONFIG_ENV, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict BGC classes for protein sequences
    Predict(commands::predict::PredictArgs),

    /// Extract protein sequences from an input and write them as FASTA
    Extract(commands::extract::ExtractArgs),

    /// Show the pretrained model artifacts and their shapes
    Models(commands::models::ModelsArgs),
}

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub threads: usize,
    pub quiet: bool,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self, crate::BgcError> {
        let config = match &cli.config {
            Some(path) => load_config(path)?,
            None => default_config(),
        };
        let threads = cli.threads.unwrap_or(config.performance.threads);

        Ok(Self {
            config,
            threads,
            quiet: cli.quiet,
        })
    }
}
