// src/recipe/kitchen/config.rs

//! Configuration types for the Kitchen

use crate::recipe::kitchen::package::{PackagedFile, PackagingPatternNoMatch};
use crate::recipe::metadata::OptionValues;
use crate::recipe::settings::{self, SettingAxis, SettingsValues};
use crate::recipe::Phase;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Configuration for the Kitchen
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Directory holding the recipe's sources
    pub source_dir: PathBuf,
    /// Parent directory for the private per-run build folder
    pub work_dir: PathBuf,
    /// Package output root; each recipe lands in `<output_dir>/<name>`
    pub output_dir: PathBuf,
    /// Number of parallel jobs handed to the build tool
    pub jobs: u32,
    /// Keep the build folder after the run (for debugging)
    pub keep_builddir: bool,
    /// Setting values used when the invoker does not override them
    pub default_settings: SettingsValues,
    /// Invoker setting overrides (`-s axis=value`)
    pub settings: SettingsValues,
    /// Invoker option overrides (`--option name=value`)
    pub options: BTreeMap<String, String>,
    /// Set by the invoker to stop the pipeline before the next phase
    pub cancel_token: Arc<AtomicBool>,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);

        Self {
            source_dir: PathBuf::from("."),
            work_dir: std::env::temp_dir(),
            output_dir: PathBuf::from("package"),
            jobs,
            keep_builddir: false,
            default_settings: settings::host_defaults(),
            settings: SettingsValues::new(),
            options: BTreeMap::new(),
            cancel_token: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl KitchenConfig {
    /// Configuration rooted at a source directory, packaging into `output_dir`
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Override one setting axis
    pub fn with_setting(mut self, axis: SettingAxis, value: impl Into<String>) -> Self {
        self.settings.insert(axis, value.into());
        self
    }

    /// Override one option value
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.load(Ordering::SeqCst)
    }
}

/// Everything the build tool needs for one run
#[derive(Debug, Clone)]
pub struct BuildConfiguration {
    /// Recipe name
    pub name: String,
    /// Folder holding the sources handed to the tool
    pub source_folder: PathBuf,
    /// Private build folder of this run
    pub build_folder: PathBuf,
    /// Build-file generator identifier
    pub generator: String,
    /// Effective settings snapshot
    pub settings: SettingsValues,
    /// Effective option values
    pub options: OptionValues,
    /// Parallel jobs
    pub jobs: u32,
    /// Extra environment for tool invocations
    pub environment: BTreeMap<String, String>,
}

impl BuildConfiguration {
    pub fn setting(&self, axis: SettingAxis) -> Option<&str> {
        self.settings.get(&axis).map(String::as_str)
    }

    pub fn build_type(&self) -> Option<&str> {
        self.setting(SettingAxis::BuildType)
    }

    /// Variables available for `%(name)s` substitution
    pub fn variables(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert("name".to_string(), self.name.clone());
        vars.insert(
            "source_folder".to_string(),
            self.source_folder.to_string_lossy().to_string(),
        );
        vars.insert(
            "build_folder".to_string(),
            self.build_folder.to_string_lossy().to_string(),
        );
        vars.insert("generator".to_string(), self.generator.clone());
        vars.insert("jobs".to_string(), self.jobs.to_string());

        for (axis, value) in &self.settings {
            vars.insert(axis.as_str().to_string(), value.clone());
        }
        for (name, value) in self.options.iter() {
            vars.insert(name.to_string(), value.to_string());
        }

        vars
    }
}

/// Outcome of the test phase
#[derive(Debug, Clone)]
pub struct TestExecutionResult {
    pub passed: bool,
    pub output: String,
    pub status: i32,
}

/// Result of cooking a recipe
#[derive(Debug)]
pub struct CookResult {
    /// Directory holding the packaged files
    pub package_dir: PathBuf,
    /// Packaged files, sorted by relative path
    pub files: Vec<PackagedFile>,
    /// Phase log
    pub log: String,
    /// Non-fatal packaging warnings
    pub warnings: Vec<PackagingPatternNoMatch>,
    /// Phases that ran, in order
    pub phases: Vec<Phase>,
    /// Whether a test phase ran and passed
    pub tests_passed: Option<bool>,
    /// Build folder, when kept
    pub build_dir: Option<PathBuf>,
}
