// src/commands/requirements.rs

//! Requirements command - run the declare phase and print the result

use anyhow::{Context, Result};
use sous::recipe::{Kitchen, KitchenConfig, parse_recipe_file};
use std::path::Path;

/// Print the requirements a recipe declares, one per line, in declaration order
pub fn cmd_requirements(recipe_path: &str) -> Result<()> {
    let recipe_path = Path::new(recipe_path);
    let recipe = parse_recipe_file(recipe_path)
        .with_context(|| format!("Failed to parse recipe: {}", recipe_path.display()))?;

    let kitchen = Kitchen::new(KitchenConfig::default());
    let requirements = kitchen
        .declare_dependencies(&recipe)
        .with_context(|| format!("Failed to declare requirements of {}", recipe.name()))?;

    for requirement in &requirements {
        println!("{}", requirement);
    }

    Ok(())
}
