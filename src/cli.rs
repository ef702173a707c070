// src/cli.rs
//! CLI definitions for the sous recipe builder
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sous")]
#[command(version)]
#[command(about = "Build, test and package libraries from recipes", long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the requirements a recipe declares
    Requirements {
        /// Path to the recipe file
        recipe: String,
    },

    /// Parse and validate a recipe without building
    Validate {
        /// Path to the recipe file
        recipe: String,
    },

    /// Cook a recipe: configure, build, test and package
    Cook {
        /// Path to the recipe file
        recipe: String,

        /// Output directory for the package
        #[arg(short, long, default_value = "package")]
        output: String,

        /// Source folder (default: the recipe's directory)
        #[arg(long)]
        source_dir: Option<String>,

        /// Directory for temporary build folders
        #[arg(long)]
        work_dir: Option<String>,

        /// Setting override, e.g. build_type=Debug (repeatable)
        #[arg(short, long = "setting", value_name = "AXIS=VALUE")]
        settings: Vec<String>,

        /// Option override, e.g. shared=True (repeatable)
        #[arg(long = "option", value_name = "NAME=VALUE")]
        options: Vec<String>,

        /// Number of parallel build jobs
        #[arg(short, long)]
        jobs: Option<u32>,

        /// Keep the build directory after completion
        #[arg(long)]
        keep_builddir: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cook_overrides() {
        let cli = Cli::parse_from([
            "sous",
            "cook",
            "recipes/samduino.toml",
            "-s",
            "build_type=Debug",
            "--setting",
            "compiler=gcc",
            "--option",
            "shared=True",
            "--keep-builddir",
        ]);
        match cli.command {
            Commands::Cook {
                settings,
                options,
                keep_builddir,
                output,
                ..
            } => {
                assert_eq!(settings, vec!["build_type=Debug", "compiler=gcc"]);
                assert_eq!(options, vec!["shared=True"]);
                assert!(keep_builddir);
                assert_eq!(output, "package");
            }
            _ => panic!("expected cook"),
        }
    }
}
