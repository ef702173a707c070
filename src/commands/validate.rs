// src/commands/validate.rs

//! Validate command - check a recipe without building it

use anyhow::{Context, Result};
use sous::recipe::{parse_recipe_file, validate_recipe};
use std::path::Path;

/// Parse and validate a recipe, printing any warnings
pub fn cmd_validate(recipe_path: &str) -> Result<()> {
    let recipe_path = Path::new(recipe_path);

    println!("Reading recipe: {}", recipe_path.display());
    let recipe = parse_recipe_file(recipe_path)
        .with_context(|| format!("Failed to parse recipe: {}", recipe_path.display()))?;

    let meta = recipe.metadata();
    println!("Recipe: {}", meta.name());
    if !meta.settings().is_empty() {
        let axes: Vec<_> = meta.settings().iter().map(|a| a.as_str()).collect();
        println!("Settings: {}", axes.join(", "));
    }

    let warnings = validate_recipe(&recipe).with_context(|| "Recipe validation failed")?;
    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    if warnings.is_empty() {
        println!("[OK] No issues found");
    } else {
        println!("[OK] {} warning(s)", warnings.len());
    }

    Ok(())
}
