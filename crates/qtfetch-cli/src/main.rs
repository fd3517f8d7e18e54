//! qtfetch - Qt SDK package downloader CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use qtfetch_cli::cmd;
use qtfetch_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match cli.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let repository = cli.repository.as_str();

    match cli.command {
        Commands::Install {
            target,
            modules,
            output,
            jobs,
        } => cmd::install::install(repository, &target, &modules, &output, jobs, cli.dry_run).await,
        Commands::Resolve { target, modules } => {
            cmd::resolve::resolve(repository, &target, &modules).await
        }
        Commands::Modules { target } => cmd::modules::modules(repository, &target).await,
        Commands::Versions => {
            cmd::versions::versions();
            Ok(())
        }
    }
}
