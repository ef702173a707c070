// src/recipe/kitchen/mod.rs

//! Kitchen: the fixed-order pipeline that cooks a recipe
//!
//! A cook runs these phases strictly in order, stopping at the first failure:
//! 1. **Declare dependencies**: validate requirements, hand them to the package manager
//! 2. **Configure**: create the private build folder and run the tool's configure step
//! 3. **Build**: run the tool's build step
//! 4. **Test**: only when the recipe enables it
//! 5. **Package**: copy the selected artifacts to the output root
//!
//! The invoker may cancel between phases; a phase that has started always
//! runs to completion.

mod config;
mod cook;
pub mod package;
mod phase;
pub mod provider;
pub mod tool;

pub use config::{BuildConfiguration, CookResult, KitchenConfig, TestExecutionResult};
pub use package::{PackagedFile, PackagingPatternNoMatch};
pub use phase::Phase;
pub use provider::{LoggingPackageManager, PackageManager};
pub use tool::{BuildTool, CMakeTool, ShellTool, ToolOutput};

use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use crate::recipe::requirement::DependencyRequirement;
use cook::Cook;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The Kitchen: where recipes are cooked
pub struct Kitchen {
    pub(crate) config: KitchenConfig,
    /// Build tool override; by default the recipe's `[build] tool` is used
    tool: Option<Arc<dyn BuildTool>>,
    package_manager: Arc<dyn PackageManager>,
}

impl Kitchen {
    /// Create a new Kitchen with the given configuration
    pub fn new(config: KitchenConfig) -> Self {
        Self {
            config,
            tool: None,
            package_manager: Arc::new(LoggingPackageManager),
        }
    }

    /// Create a Kitchen with default configuration
    pub fn with_defaults() -> Self {
        Self::new(KitchenConfig::default())
    }

    /// Use a specific build tool for every recipe
    pub fn with_tool(mut self, tool: Arc<dyn BuildTool>) -> Self {
        self.tool = Some(tool);
        self
    }

    /// Hand declared requirements to a specific package manager
    pub fn with_package_manager(mut self, package_manager: Arc<dyn PackageManager>) -> Self {
        self.package_manager = package_manager;
        self
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    /// Declare-dependencies phase
    ///
    /// Returns the requirements in declaration order, duplicates included.
    pub fn declare_dependencies(&self, recipe: &Recipe) -> Result<Vec<DependencyRequirement>> {
        let requirements = recipe.requirements()?;
        debug!(
            "{} declares {} requirement(s)",
            recipe.name(),
            requirements.len()
        );
        self.package_manager.declare(recipe.name(), &requirements)?;
        Ok(requirements)
    }

    /// Cook a recipe: run every phase in order and package the result
    ///
    /// This is the main entry point. The build folder lives in a temporary
    /// directory that is removed on every exit path unless `keep_builddir`
    /// is set, and nothing is packaged unless configure, build and (when
    /// enabled) test all succeeded.
    pub fn cook(&self, recipe: &Recipe) -> Result<CookResult> {
        info!("Cooking {}", recipe.name());

        self.checkpoint(Phase::DeclareDependencies)?;
        let requirements = self.declare_dependencies(recipe)?;

        self.checkpoint(Phase::Configure)?;
        let tool = self
            .tool
            .clone()
            .unwrap_or_else(|| tool::tool_for(recipe.build()));
        let mut cook = Cook::new(self, recipe, tool)?;
        debug!(
            "Configuring {} in {}",
            recipe.name(),
            cook.configuration().build_folder.display()
        );
        cook.configure()?;

        self.checkpoint(Phase::Build)?;
        cook.build()?;

        let tests_passed = if recipe.test_phase_enabled() {
            self.checkpoint(Phase::Test)?;
            let result = cook.test()?;
            info!("Tests passed (exit code {})", result.status);
            Some(result.passed)
        } else {
            debug!("Test phase disabled for {}", recipe.name());
            None
        };

        self.checkpoint(Phase::Package)?;
        let outcome = cook.package(&requirements)?;

        let (log, mut phases, build_dir) = cook.finish();
        phases.insert(0, Phase::DeclareDependencies);

        info!(
            "Cooked {} ({} files) into {}",
            recipe.name(),
            outcome.files.len(),
            outcome.package_dir.display()
        );

        Ok(CookResult {
            package_dir: outcome.package_dir,
            files: outcome.files,
            log,
            warnings: outcome.warnings,
            phases,
            tests_passed,
            build_dir,
        })
    }

    /// Stop before `phase` if the invoker asked for cancellation
    fn checkpoint(&self, phase: Phase) -> Result<()> {
        if self.config.is_cancelled() {
            warn!("Cancelled before {} phase", phase);
            return Err(Error::Cancelled(phase));
        }
        Ok(())
    }
}
