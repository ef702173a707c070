// src/recipe/mod.rs

//! Recipe system for building packages from a source tree
//!
//! A recipe describes one library package:
//! - Identity (name, url, description, license)
//! - Settings axes and build options
//! - Requirements on other packages
//! - How to configure, build and test it
//! - Which files end up in the package
//!
//! # Culinary Terminology
//!
//! - **Recipe**: The build specification
//! - **Kitchen**: Runs the phases of a cook in a fixed order
//! - **Cook**: Build and package one recipe
//!
//! # Example Recipe
//!
//! ```toml
//! [recipe]
//! name = "samduino"
//! url = "https://github.com/cheezypoofs/samduino"
//! description = "A library of arduino capabilities with tests"
//! settings = ["os", "compiler", "arch", "build_type"]
//!
//! [options]
//! shared = ["True", "False"]
//!
//! [default_options]
//! shared = "False"
//!
//! [requirements]
//! requires = ["gtest/1.8.1@bincrafters/stable"]
//!
//! [build]
//! test = true
//!
//! [[package]]
//! pattern = "*.h"
//! src = "lib"
//!
//! [[package]]
//! pattern = "*.a"
//! root = "build"
//! dst = "lib"
//! keep_path = false
//! ```

mod format;
pub mod kitchen;
mod metadata;
pub mod parser;
pub mod requirement;
pub mod settings;

pub use format::{
    BuildSection, PackageRoot, PackagingRule, Recipe, RecipeFile, RecipeSection,
    RequirementsSection, ToolKind,
};
pub use kitchen::{CookResult, Kitchen, KitchenConfig, Phase};
pub use metadata::{OptionValues, RecipeMetadata, RecipeOptions};
pub use parser::{parse_recipe, parse_recipe_file, validate_recipe};
pub use requirement::DependencyRequirement;
pub use settings::{SettingAxis, SettingsValues};
