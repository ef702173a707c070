// src/main.rs

use anyhow::Result;
use clap::Parser;
use tracing::debug;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);

        let sous_err = err.downcast_ref::<sous::Error>();
        if let Some(output) = sous_err.and_then(sous::Error::captured_output)
            && !output.is_empty()
        {
            eprintln!("\n--- captured output ---\n{}", output.trim_end());
        }

        let code = sous_err.map(sous::Error::exit_code).unwrap_or(1);
        debug!("Exiting with code {}", code);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Requirements { recipe } => commands::cmd_requirements(&recipe),
        Commands::Validate { recipe } => commands::cmd_validate(&recipe),
        Commands::Cook {
            recipe,
            output,
            source_dir,
            work_dir,
            settings,
            options,
            jobs,
            keep_builddir,
        } => commands::cmd_cook(commands::CookArgs {
            recipe,
            output,
            source_dir,
            work_dir,
            settings,
            options,
            jobs,
            keep_builddir,
        }),
    }
}
