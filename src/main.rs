use bgcpred::cli::{Cli, Commands, Context};
use bgcpred::core::paths::LOG_ENV;
use bgcpred::BgcError;
use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG, then BGCPRED_LOG; -v/-vv override both, -q drops to warnings
    let filter = match (cli.verbose, cli.quiet) {
        (0, true) => EnvFilter::new("warn"),
        (0, false) => EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let log_level = std::env::var(LOG_ENV).unwrap_or_else(|_| "info".to_string());
            EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"))
        }),
        (1, _) => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(exit_code(&e));
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::from_cli(&cli)?;
    tracing::debug!("Using {} worker threads", bgcpred::utils::parallel::resolve_threads(ctx.threads));

    match cli.command {
        Commands::Predict(args) => bgcpred::cli::commands::predict::run(args, &ctx),
        Commands::Extract(args) => bgcpred::cli::commands::extract::run(args, &ctx),
        Commands::Models(args) => bgcpred::cli::commands::models::run(args, &ctx),
    }
}

fn exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<BgcError>() {
        Some(BgcError::Usage(_))
        | Some(BgcError::InvalidFormat(_))
        | Some(BgcError::InvalidThreshold(_))
        | Some(BgcError::Config(_)) => 2,
        Some(BgcError::Input { .. }) | Some(BgcError::Io(_)) => 3,
        Some(BgcError::Parse { .. }) => 4,
        Some(BgcError::ModelLoad { .. }) => 5,
        _ => 1,
    }
}
