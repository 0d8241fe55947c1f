use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tl_cli::commands::{range, ranges, select, status, task, tasks};
use tl_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = io::stdout().lock();
    match command {
        Commands::Task { action } => task::run(&mut stdout, action, &config)?,
        Commands::Tasks(args) => tasks::run(&mut stdout, args, &config)?,
        Commands::Select(args) => select::run(&mut stdout, args, &config)?,
        Commands::Stop => select::stop(&mut stdout, &config)?,
        Commands::Status => status::run(&mut stdout, &config)?,
        Commands::Ranges(args) => ranges::run(&mut stdout, args, &config)?,
        Commands::Range { action } => range::run(&mut stdout, action, &config)?,
    }

    Ok(())
}
