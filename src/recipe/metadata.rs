// src/recipe/metadata.rs

//! Validated, immutable recipe metadata

use crate::error::{Error, Result};
use crate::recipe::format::RecipeSection;
use crate::recipe::settings::SettingAxis;
use serde::Serialize;
use std::collections::BTreeMap;

/// Options a recipe recognizes, each with its allowed values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecipeOptions(BTreeMap<String, Vec<String>>);

impl RecipeOptions {
    pub fn new(options: BTreeMap<String, Vec<String>>) -> Self {
        Self(options)
    }

    /// Allowed values for an option, if the option is recognized
    pub fn allowed(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Chosen option values keyed by option name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionValues(BTreeMap<String, String>);

impl OptionValues {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self(values)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Descriptive metadata of a recipe
///
/// Construction validates the invariants; afterwards the value is read-only.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeMetadata {
    name: String,
    url: String,
    description: String,
    license: Option<String>,
    settings: Vec<SettingAxis>,
    generator: String,
    options: RecipeOptions,
    default_options: OptionValues,
    exports_sources: Vec<String>,
}

impl RecipeMetadata {
    /// Build metadata from the parsed `[recipe]`, `[options]` and `[default_options]` tables
    pub fn from_sections(
        section: RecipeSection,
        options: BTreeMap<String, Vec<String>>,
        default_options: BTreeMap<String, String>,
    ) -> Result<Self> {
        check_name(&section.name)?;

        for (key, value) in &default_options {
            let allowed = options.get(key).ok_or_else(|| {
                Error::InvalidMetadata(format!(
                    "default option '{}' is not a declared option",
                    key
                ))
            })?;
            if !allowed.contains(value) {
                return Err(Error::InvalidMetadata(format!(
                    "default value '{}' for option '{}' is not one of: {}",
                    value,
                    key,
                    allowed.join(", ")
                )));
            }
        }

        let mut settings = section.settings;
        settings.sort();
        settings.dedup();

        Ok(Self {
            name: section.name,
            url: section.url,
            description: section.description,
            license: section.license,
            settings,
            generator: section.generator,
            options: RecipeOptions::new(options),
            default_options: OptionValues::new(default_options),
            exports_sources: section.exports_sources,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    /// Settings axes the recipe's binaries depend on
    pub fn settings(&self) -> &[SettingAxis] {
        &self.settings
    }

    /// Build-file generator the external tool should use
    pub fn generator(&self) -> &str {
        &self.generator
    }

    pub fn options(&self) -> &RecipeOptions {
        &self.options
    }

    pub fn default_options(&self) -> &OptionValues {
        &self.default_options
    }

    /// Recipe-side files shipped with the recipe, recorded in the package manifest
    pub fn exports_sources(&self) -> &[String] {
        &self.exports_sources
    }

    /// Overlay invoker overrides on the default option values
    ///
    /// Every override must name a declared option and use an allowed value.
    pub fn resolve_options(&self, overrides: &BTreeMap<String, String>) -> Result<OptionValues> {
        let mut values = self.default_options.0.clone();

        for (name, value) in overrides {
            let allowed = self.options.allowed(name).ok_or_else(|| {
                Error::InvalidOption(format!("'{}' is not an option of {}", name, self.name))
            })?;
            if !allowed.contains(value) {
                return Err(Error::InvalidOption(format!(
                    "'{}' is not an allowed value for '{}' (allowed: {})",
                    value,
                    name,
                    allowed.join(", ")
                )));
            }
            values.insert(name.clone(), value.clone());
        }

        Ok(OptionValues::new(values))
    }
}

/// Check that a recipe name is usable as a single path component
///
/// The name becomes the package directory under the output root, so it must
/// not be able to point anywhere else.
pub(crate) fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidMetadata(
            "recipe name cannot be empty".to_string(),
        ));
    }
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(Error::InvalidMetadata(format!(
            "recipe name '{}' must be a plain name, not a path",
            name.escape_default()
        )));
    }
    Ok(())
}
