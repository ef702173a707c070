// src/recipe/kitchen/cook.rs

//! Cook: the phase execution for a single recipe run

use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use crate::recipe::kitchen::config::{BuildConfiguration, TestExecutionResult};
use crate::recipe::kitchen::package::{self, ManifestHeader, PackageOutcome, PackageRoots};
use crate::recipe::kitchen::tool::{BuildTool, ToolOutput};
use crate::recipe::requirement::DependencyRequirement;
use crate::recipe::settings;
use crate::recipe::Phase;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, info};

use super::Kitchen;

/// A single cook operation
///
/// Owns the private work directory of the run; dropping the cook removes it.
pub struct Cook<'a> {
    pub(super) kitchen: &'a Kitchen,
    pub(super) recipe: &'a Recipe,
    pub(super) tool: Arc<dyn BuildTool>,
    /// Temporary work directory holding the build folder
    pub(super) work_dir: TempDir,
    /// Configuration handed to the build tool
    pub(super) config: BuildConfiguration,
    /// Phase log accumulator
    pub(super) log: String,
    /// Phases completed so far
    pub(super) phases: Vec<Phase>,
}

impl<'a> Cook<'a> {
    /// Prepare a run: resolve settings and options and create the build folder
    pub(super) fn new(
        kitchen: &'a Kitchen,
        recipe: &'a Recipe,
        tool: Arc<dyn BuildTool>,
    ) -> Result<Self> {
        let meta = recipe.metadata();
        let kconfig = &kitchen.config;

        let options = meta.resolve_options(&kconfig.options)?;
        let settings = settings::effective(
            meta.settings(),
            &kconfig.default_settings,
            &kconfig.settings,
        );

        fs::create_dir_all(&kconfig.work_dir)?;
        let work_dir = tempfile::Builder::new()
            .prefix(&format!("sous-{}-", meta.name()))
            .tempdir_in(&kconfig.work_dir)
            .map_err(|e| Error::IoError(format!("Failed to create build directory: {}", e)))?;

        let build_folder = work_dir.path().join(&recipe.build().build_folder);
        fs::create_dir_all(&build_folder)?;

        let source_folder = fs::canonicalize(&kconfig.source_dir).map_err(|e| {
            Error::IoError(format!(
                "Failed to resolve source folder {}: {}",
                kconfig.source_dir.display(),
                e
            ))
        })?;

        let config = BuildConfiguration {
            name: meta.name().to_string(),
            source_folder,
            build_folder,
            generator: meta.generator().to_string(),
            settings,
            options,
            jobs: kconfig.jobs,
            environment: recipe.build().environment.clone(),
        };

        debug!("Build folder: {}", config.build_folder.display());
        for (axis, value) in &config.settings {
            debug!("Setting {}={}", axis, value);
        }

        Ok(Self {
            kitchen,
            recipe,
            tool,
            work_dir,
            config,
            log: String::new(),
            phases: Vec::new(),
        })
    }

    pub(super) fn configuration(&self) -> &BuildConfiguration {
        &self.config
    }

    /// Configure phase: generate build files in the build folder
    pub(super) fn configure(&mut self) -> Result<()> {
        info!("Running configure phase with {}", self.tool.name());
        let output = self.tool.configure(&self.config)?;
        self.finish_tool_phase(Phase::Configure, output)
    }

    /// Build phase: compile
    pub(super) fn build(&mut self) -> Result<()> {
        info!("Running build phase with {}", self.tool.name());
        let output = self.tool.build(&self.config)?;
        self.finish_tool_phase(Phase::Build, output)
    }

    /// Test phase
    ///
    /// With `output_on_failure`, output of a passing run is kept out of the log.
    pub(super) fn test(&mut self) -> Result<TestExecutionResult> {
        let output_on_failure = self.recipe.build().output_on_failure;
        info!("Running test phase with {}", self.tool.name());

        let output = self.tool.test(&self.config, output_on_failure)?;
        let result = TestExecutionResult {
            passed: output.success(),
            output: output.output,
            status: output.status,
        };

        if !result.passed {
            self.log_phase_output(Phase::Test, &result.output);
            return Err(Error::TestFailure {
                code: result.status,
                output: result.output,
            });
        }

        if output_on_failure {
            self.log_line("=== test ===");
            self.log_line("tests passed");
        } else {
            self.log_phase_output(Phase::Test, &result.output);
        }
        self.phases.push(Phase::Test);

        Ok(result)
    }

    /// Package phase: select artifacts and publish them under the output root
    pub(super) fn package(
        &mut self,
        requirements: &[DependencyRequirement],
    ) -> Result<PackageOutcome> {
        let header = ManifestHeader {
            recipe: self.config.name.clone(),
            exports_sources: self.recipe.metadata().exports_sources().to_vec(),
            settings: self.config.settings.clone(),
            options: self.config.options.clone(),
            requires: requirements.iter().map(ToString::to_string).collect(),
        };
        let roots = PackageRoots {
            source: &self.config.source_folder,
            build: Some(&self.config.build_folder),
            output: None,
        };

        let outcome = package::package(
            self.recipe.packaging_rules(),
            roots,
            &self.kitchen.config.output_dir,
            &header,
        )?;

        self.log_line("=== package ===");
        for file in &outcome.files {
            self.log_line(&file.path);
        }
        for warning in &outcome.warnings {
            self.log_line(&format!("warning: {}", warning));
        }
        self.phases.push(Phase::Package);

        Ok(outcome)
    }

    /// Release the work directory, returning the build folder if it is kept
    pub(super) fn finish(self) -> (String, Vec<Phase>, Option<PathBuf>) {
        let build_dir = if self.kitchen.config.keep_builddir {
            let kept = self.work_dir.keep();
            info!("Keeping build directory: {}", kept.display());
            Some(self.config.build_folder)
        } else {
            None
        };
        (self.log, self.phases, build_dir)
    }

    /// Record a configure/build outcome, failing on a nonzero status
    fn finish_tool_phase(&mut self, phase: Phase, output: ToolOutput) -> Result<()> {
        self.log_phase_output(phase, &output.output);

        if !output.success() {
            return Err(Error::phase_failure(phase, output.status, output.output).unwrap_or_else(
                || Error::IoError(format!("{} phase failed with exit code {}", phase, output.status)),
            ));
        }

        self.phases.push(phase);
        Ok(())
    }

    fn log_line(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }

    /// Log phase output with a phase header
    fn log_phase_output(&mut self, phase: Phase, output: &str) {
        self.log_line(&format!("=== {} ===", phase));
        if !output.is_empty() {
            self.log.push_str(output);
            if !output.ends_with('\n') {
                self.log.push('\n');
            }
        }
    }
}
