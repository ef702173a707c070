// src/recipe/format.rs

//! Recipe file format definitions
//!
//! Recipes are TOML files. The raw document (`RecipeFile`) is deserialized
//! first and then turned into a validated `Recipe`.

use crate::error::{Error, Result};
use crate::recipe::metadata::RecipeMetadata;
use crate::recipe::requirement::{self, DependencyRequirement};
use crate::recipe::settings::SettingAxis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path};

/// The raw recipe document as written on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeFile {
    /// Descriptive metadata
    pub recipe: RecipeSection,

    /// Recognized options and their allowed values
    #[serde(default)]
    pub options: BTreeMap<String, Vec<String>>,

    /// Default value per option
    #[serde(default)]
    pub default_options: BTreeMap<String, String>,

    /// External package requirements
    #[serde(default)]
    pub requirements: RequirementsSection,

    /// Build tool and phase configuration
    #[serde(default)]
    pub build: BuildSection,

    /// Packaging rules, evaluated in order
    #[serde(default)]
    pub package: Vec<PackagingRule>,
}

/// `[recipe]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSection {
    /// Unique recipe name
    pub name: String,

    /// Project homepage or repository URL
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub description: String,

    /// License identifier (SPDX)
    #[serde(default)]
    pub license: Option<String>,

    /// Build-file generator identifier handed to the build tool
    #[serde(default = "default_generator")]
    pub generator: String,

    /// Settings axes the binaries depend on
    #[serde(default)]
    pub settings: Vec<SettingAxis>,

    /// Recipe-side files shipped together with the recipe
    #[serde(default)]
    pub exports_sources: Vec<String>,
}

fn default_generator() -> String {
    "cmake".to_string()
}

/// `[requirements]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequirementsSection {
    /// Requirement references (`name/version@account/channel`)
    #[serde(default)]
    pub requires: Vec<String>,
}

/// Which external build tool drives the configure/build/test phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// CMake + CTest
    #[default]
    Cmake,
    /// Recipe-provided shell commands
    Shell,
}

/// `[build]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    #[serde(default)]
    pub tool: ToolKind,

    /// Name of the build folder inside the private work directory
    #[serde(default = "default_build_folder")]
    pub build_folder: String,

    /// Whether the test phase runs for this recipe
    #[serde(default, rename = "test")]
    pub run_tests: bool,

    /// Surface test output only when the tests fail
    #[serde(default = "default_true")]
    pub output_on_failure: bool,

    /// Configure command (shell tool)
    ///
    /// Supports `%(variable)s` substitution.
    #[serde(default)]
    pub configure: Option<String>,

    /// Build command (shell tool)
    #[serde(default)]
    pub build: Option<String>,

    /// Test command (shell tool)
    #[serde(default)]
    pub test_command: Option<String>,

    /// Environment variables set for every tool invocation
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            tool: ToolKind::default(),
            build_folder: default_build_folder(),
            run_tests: false,
            output_on_failure: true,
            configure: None,
            build: None,
            test_command: None,
            environment: BTreeMap::new(),
        }
    }
}

fn default_build_folder() -> String {
    "build".to_string()
}

fn default_true() -> bool {
    true
}

/// Folder a packaging rule's `src` is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageRoot {
    /// The recipe's source folder
    #[default]
    Source,
    /// The build folder of the current run
    Build,
}

/// A `[[package]]` rule selecting files to ship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingRule {
    /// Include glob
    pub pattern: String,

    /// Exclude globs; a file matching any of them is dropped
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Source root, relative to `root`
    #[serde(default = "default_src")]
    pub src: String,

    #[serde(default)]
    pub root: PackageRoot,

    /// Destination subdirectory inside the package
    #[serde(default)]
    pub dst: Option<String>,

    /// Preserve directories below `src` (false flattens to file names)
    #[serde(default = "default_true")]
    pub keep_path: bool,
}

fn default_src() -> String {
    ".".to_string()
}

impl PackagingRule {
    /// Rule with an include pattern under `src` and no excludes
    pub fn new(pattern: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            excludes: Vec::new(),
            src: src.into(),
            root: PackageRoot::Source,
            dst: None,
            keep_path: true,
        }
    }

    /// Add an exclude pattern
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }
}

/// A validated recipe
#[derive(Debug, Clone)]
pub struct Recipe {
    metadata: RecipeMetadata,
    requires: Vec<String>,
    build: BuildSection,
    package: Vec<PackagingRule>,
}

impl Recipe {
    /// Validate a raw document
    ///
    /// Requirement strings are kept verbatim here; they are checked when the
    /// dependencies are declared.
    pub fn from_file(file: RecipeFile) -> Result<Self> {
        let metadata =
            RecipeMetadata::from_sections(file.recipe, file.options, file.default_options)?;

        check_relative("build_folder", &file.build.build_folder)?;
        for rule in &file.package {
            check_relative("src", &rule.src)?;
            if let Some(dst) = &rule.dst {
                check_relative("dst", dst)?;
            }
        }

        Ok(Self {
            metadata,
            requires: file.requirements.requires,
            build: file.build,
            package: file.package,
        })
    }

    pub fn metadata(&self) -> &RecipeMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    /// Declared requirement strings, unvalidated
    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    /// Declare the requirements, in order, validating each one
    pub fn requirements(&self) -> Result<Vec<DependencyRequirement>> {
        requirement::declare(&self.requires)
    }

    pub fn build(&self) -> &BuildSection {
        &self.build
    }

    pub fn test_phase_enabled(&self) -> bool {
        self.build.run_tests
    }

    pub fn packaging_rules(&self) -> &[PackagingRule] {
        &self.package
    }

    /// Same recipe with the test phase switched on or off
    pub fn with_test_phase(mut self, enabled: bool) -> Self {
        self.build.run_tests = enabled;
        self
    }
}

/// Reject paths that could leave the folder they are joined onto
fn check_relative(field: &str, value: &str) -> Result<()> {
    let escapes = Path::new(value).components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });

    if escapes || value.contains('\0') {
        return Err(Error::InvalidMetadata(format!(
            "{} '{}' must be a relative path without '..'",
            field,
            value.escape_default()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMDUINO: &str = r#"
[recipe]
name = "samduino"
url = "https://github.com/cheezypoofs/samduino"
description = "A library of arduino capabilities with tests"
generator = "cmake"
settings = ["os", "compiler", "arch", "build_type"]

[requirements]
requires = ["gtest/1.8.1@bincrafters/stable"]

[build]
build_folder = "build"
test = true

[[package]]
pattern = "*.cpp"
excludes = ["*Test*"]
src = "lib"

[[package]]
pattern = "*.h"
src = "lib"
"#;

    #[test]
    fn test_parse_document() {
        let file: RecipeFile = toml::from_str(SAMDUINO).unwrap();

        assert_eq!(file.recipe.name, "samduino");
        assert_eq!(file.recipe.settings.len(), 4);
        assert!(file.options.is_empty());
        assert_eq!(file.requirements.requires.len(), 1);
        assert!(file.build.run_tests);
        assert!(file.build.output_on_failure);
        assert_eq!(file.build.tool, ToolKind::Cmake);

        assert_eq!(file.package.len(), 2);
        assert_eq!(file.package[0].excludes, vec!["*Test*"]);
        assert!(file.package[1].excludes.is_empty());
        assert_eq!(file.package[1].root, PackageRoot::Source);
        assert!(file.package[1].keep_path);
    }

    #[test]
    fn test_minimal_document_defaults() {
        let file: RecipeFile = toml::from_str("[recipe]\nname = \"hello\"\n").unwrap();
        assert_eq!(file.recipe.generator, "cmake");
        assert_eq!(file.build.build_folder, "build");
        assert!(!file.build.run_tests);
        assert!(file.package.is_empty());
    }

    #[test]
    fn test_unknown_setting_axis_rejected() {
        let doc = "[recipe]\nname = \"x\"\nsettings = [\"os\", \"toolset\"]\n";
        assert!(toml::from_str::<RecipeFile>(doc).is_err());
    }

    #[test]
    fn test_recipe_requirements() {
        let file: RecipeFile = toml::from_str(SAMDUINO).unwrap();
        let recipe = Recipe::from_file(file).unwrap();

        let reqs = recipe.requirements().unwrap();
        assert_eq!(reqs[0].to_string(), "gtest/1.8.1@bincrafters/stable");
        assert!(recipe.test_phase_enabled());
        assert!(!recipe.clone().with_test_phase(false).test_phase_enabled());
    }

    #[test]
    fn test_escaping_paths_rejected() {
        let cases = [
            ("[build]\nbuild_folder = \"../build\"\n", "build_folder"),
            ("[build]\nbuild_folder = \"/tmp/build\"\n", "build_folder"),
            ("[[package]]\npattern = \"*.h\"\nsrc = \"../lib\"\n", "src"),
            ("[[package]]\npattern = \"*.h\"\nsrc = \"/usr/include\"\n", "src"),
            ("[[package]]\npattern = \"*.h\"\ndst = \"include/../../x\"\n", "dst"),
            ("[[package]]\npattern = \"*.h\"\ndst = \"/etc\"\n", "dst"),
        ];

        for (section, field) in cases {
            let doc = format!("[recipe]\nname = \"samduino\"\n\n{}", section);
            let file: RecipeFile = toml::from_str(&doc).unwrap();
            match Recipe::from_file(file) {
                Err(Error::InvalidMetadata(msg)) => assert!(msg.contains(field), "{}", msg),
                other => panic!("{} accepted: {:?}", field, other.map(|r| r.name().to_string())),
            }
        }
    }

    #[test]
    fn test_nested_relative_paths_accepted() {
        let doc = "[recipe]\nname = \"samduino\"\n[build]\nbuild_folder = \"out/build\"\n\
                   [[package]]\npattern = \"*.h\"\nsrc = \"./lib\"\ndst = \"include/samduino\"\n";
        let file: RecipeFile = toml::from_str(doc).unwrap();
        assert!(Recipe::from_file(file).is_ok());
    }

    #[test]
    fn test_packaging_rule_builder() {
        let rule = PackagingRule::new("*.cpp", "lib").exclude("*Test*");
        assert_eq!(rule.src, "lib");
        assert_eq!(rule.excludes, vec!["*Test*"]);
        assert!(rule.dst.is_none());
    }
}
