// src/commands/cook.rs

//! Cook command - build packages from recipes

use anyhow::{Context, Result};
use sous::Error;
use sous::recipe::settings::parse_assignment;
use sous::recipe::{Kitchen, KitchenConfig, parse_recipe_file, validate_recipe};
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments of `sous cook`
pub struct CookArgs {
    pub recipe: String,
    pub output: String,
    pub source_dir: Option<String>,
    pub work_dir: Option<String>,
    pub settings: Vec<String>,
    pub options: Vec<String>,
    pub jobs: Option<u32>,
    pub keep_builddir: bool,
}

/// Cook a package from a recipe
pub fn cmd_cook(args: CookArgs) -> Result<()> {
    let recipe_path = Path::new(&args.recipe);

    println!("Reading recipe: {}", recipe_path.display());
    let recipe = parse_recipe_file(recipe_path)
        .with_context(|| format!("Failed to parse recipe: {}", recipe_path.display()))?;

    let warnings = validate_recipe(&recipe).with_context(|| "Recipe validation failed")?;
    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    // Sources live next to the recipe unless told otherwise
    let source_dir = match &args.source_dir {
        Some(dir) => PathBuf::from(dir),
        None => recipe_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let mut config = KitchenConfig::new(source_dir, &args.output);
    if let Some(dir) = &args.work_dir {
        config.work_dir = PathBuf::from(dir);
    }
    if let Some(j) = args.jobs {
        config.jobs = j.max(1);
    }
    config.keep_builddir = args.keep_builddir;

    for assignment in &args.settings {
        let (axis, value) = parse_assignment(assignment)?;
        config = config.with_setting(axis, value);
    }
    for assignment in &args.options {
        let (name, value) = parse_option(assignment)?;
        config = config.with_option(name, value);
    }

    println!("Cooking {} with {} parallel jobs...", recipe.name(), config.jobs);

    let kitchen = Kitchen::new(config);
    let result = kitchen
        .cook(&recipe)
        .with_context(|| format!("Failed to cook {}", recipe.name()))?;

    println!("\n[COMPLETE] Cooked: {}", result.package_dir.display());
    for file in &result.files {
        println!("  - {}", file.path);
    }

    if let Some(passed) = result.tests_passed {
        println!("Tests: {}", if passed { "passed" } else { "failed" });
    }

    if !result.warnings.is_empty() {
        println!("\nPackaging warnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    if let Some(dir) = &result.build_dir {
        println!("Build directory kept at {}", dir.display());
    }

    info!(
        "Successfully cooked {} to {}",
        recipe.name(),
        result.package_dir.display()
    );

    Ok(())
}

/// Parse a `name=value` option override
fn parse_option(s: &str) -> sous::Result<(String, String)> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() && !value.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(Error::InvalidOption(format!(
            "expected name=value, got '{}'",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_option() {
        assert_eq!(
            parse_option("shared=True").unwrap(),
            ("shared".to_string(), "True".to_string())
        );
        assert!(matches!(parse_option("shared"), Err(Error::InvalidOption(_))));
        assert!(matches!(parse_option("=True"), Err(Error::InvalidOption(_))));
        assert!(matches!(parse_option("shared="), Err(Error::InvalidOption(_))));
    }
}
