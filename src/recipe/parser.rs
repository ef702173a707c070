// src/recipe/parser.rs

//! Recipe file parsing

use crate::error::{Error, Result};
use crate::recipe::format::{Recipe, RecipeFile, ToolKind};
use std::path::Path;

/// Parse a recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    let file: RecipeFile =
        toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))?;

    Recipe::from_file(file)
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read recipe file: {}", e)))?;

    parse_recipe(&content)
}

/// Validate a recipe for completeness and correctness
///
/// Hard errors (malformed requirements, bad patterns) are returned as `Err`;
/// everything else is reported as a warning.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    recipe.requirements()?;

    for rule in recipe.packaging_rules() {
        for pattern in std::iter::once(&rule.pattern).chain(rule.excludes.iter()) {
            glob::Pattern::new(pattern).map_err(|e| Error::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        }
    }

    let meta = recipe.metadata();
    if meta.description().is_empty() {
        warnings.push("Missing recipe description".to_string());
    }
    if meta.url().is_empty() {
        warnings.push("Missing recipe url".to_string());
    }
    if meta.license().is_none() {
        warnings.push("Missing recipe license".to_string());
    }

    let build = recipe.build();
    if build.tool == ToolKind::Shell {
        if build.configure.is_none() && build.build.is_none() {
            warnings.push("Shell tool selected but no configure or build command given".to_string());
        }
        if build.run_tests && build.test_command.is_none() {
            warnings.push("Test phase enabled but no test_command given".to_string());
        }
    }

    if !build.run_tests {
        warnings.push("Test phase disabled; the package is built without running tests".to_string());
    }

    if recipe.packaging_rules().is_empty() {
        warnings.push("No packaging rules; the package will be empty".to_string());
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_recipe() {
        let content = r#"
[recipe]
name = "samduino"
settings = ["os", "build_type"]
"#;

        let recipe = parse_recipe(content).unwrap();
        assert_eq!(recipe.name(), "samduino");
    }

    #[test]
    fn test_parse_invalid_recipe() {
        let content = "this is not valid toml at all {}";
        assert!(matches!(parse_recipe(content), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_parse_empty_name() {
        let content = r#"
[recipe]
name = ""
"#;
        assert!(matches!(parse_recipe(content), Err(Error::InvalidMetadata(_))));
    }

    #[test]
    fn test_parse_undeclared_default_option() {
        let content = r#"
[recipe]
name = "samduino"

[default_options]
shared = "False"
"#;
        assert!(matches!(parse_recipe(content), Err(Error::InvalidMetadata(_))));
    }

    #[test]
    fn test_validate_malformed_requirement() {
        let content = r#"
[recipe]
name = "samduino"

[requirements]
requires = ["gtest"]
"#;
        let recipe = parse_recipe(content).unwrap();
        assert!(matches!(
            validate_recipe(&recipe),
            Err(Error::MalformedRequirement { .. })
        ));
    }

    #[test]
    fn test_validate_bad_pattern() {
        let content = r#"
[recipe]
name = "samduino"

[[package]]
pattern = "[*.cpp"
"#;
        let recipe = parse_recipe(content).unwrap();
        assert!(matches!(
            validate_recipe(&recipe),
            Err(Error::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_validate_warnings() {
        let content = r#"
[recipe]
name = "samduino"

[build]
tool = "shell"
test = true
"#;
        let recipe = parse_recipe(content).unwrap();
        let warnings = validate_recipe(&recipe).unwrap();
        assert!(warnings.iter().any(|w| w.contains("description")));
        assert!(warnings.iter().any(|w| w.contains("license")));
        assert!(warnings.iter().any(|w| w.contains("test_command")));
        assert!(warnings.iter().any(|w| w.contains("packaging rules")));
    }
}
