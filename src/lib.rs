// src/lib.rs

//! Sous recipe build orchestrator
//!
//! Cooks a library package from a source tree by running a fixed pipeline:
//! declare dependencies, configure, build, test (optional) and package.
//!
//! # Architecture
//!
//! - Recipes: TOML files holding metadata, requirements, build steps and packaging rules
//! - Kitchen: Runs the phases in order and stops at the first failure
//! - Build tools: CMake/CTest or shell commands behind one trait
//! - Packaging: Deterministic pattern selection with a JSON manifest

mod error;
pub mod recipe;

pub use error::{EXIT_CANCELLED, EXIT_INVALID_RECIPE, EXIT_TOOL_NOT_FOUND, Error, Result};
pub use recipe::{
    CookResult, DependencyRequirement, Kitchen, KitchenConfig, Phase, Recipe, parse_recipe,
    parse_recipe_file, validate_recipe,
};
