// src/recipe/kitchen/tool.rs

//! External build tool interface
//!
//! The Kitchen never runs compilers itself. It hands a `BuildConfiguration`
//! to a `BuildTool` and looks only at the exit status and captured output.

use crate::error::{Result, EXIT_TOOL_NOT_FOUND};
use crate::recipe::format::{BuildSection, ToolKind};
use crate::recipe::kitchen::config::BuildConfiguration;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, ExitStatus};
use std::sync::Arc;
use tracing::debug;

/// Exit status and captured output of one tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub status: i32,
    pub output: String,
}

impl ToolOutput {
    pub fn new(status: i32, output: impl Into<String>) -> Self {
        Self {
            status,
            output: output.into(),
        }
    }

    /// Successful invocation with no output
    pub fn empty() -> Self {
        Self::new(0, String::new())
    }

    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// An external build tool driving configure, build and test
///
/// `Err` is reserved for failures of the adapter itself; a tool that ran and
/// failed reports it through a nonzero `ToolOutput::status`.
pub trait BuildTool: Send + Sync {
    /// Tool name for logging
    fn name(&self) -> &str;

    /// Prepare the build folder (generate build files)
    fn configure(&self, config: &BuildConfiguration) -> Result<ToolOutput>;

    /// Compile
    fn build(&self, config: &BuildConfiguration) -> Result<ToolOutput>;

    /// Run the test suite
    fn test(&self, config: &BuildConfiguration, output_on_failure: bool) -> Result<ToolOutput>;
}

/// Select the tool a recipe's `[build]` section asks for
pub fn tool_for(build: &BuildSection) -> Arc<dyn BuildTool> {
    match build.tool {
        ToolKind::Cmake => Arc::new(CMakeTool::default()),
        ToolKind::Shell => Arc::new(ShellTool::from_section(build)),
    }
}

/// CMake for configure/build, CTest for tests
#[derive(Debug, Clone)]
pub struct CMakeTool {
    cmake: String,
    ctest: String,
}

impl Default for CMakeTool {
    fn default() -> Self {
        Self {
            cmake: "cmake".to_string(),
            ctest: "ctest".to_string(),
        }
    }
}

impl CMakeTool {
    /// Use specific `cmake`/`ctest` binaries
    pub fn with_programs(cmake: impl Into<String>, ctest: impl Into<String>) -> Self {
        Self {
            cmake: cmake.into(),
            ctest: ctest.into(),
        }
    }

    /// Arguments for the configure step
    ///
    /// The generator `cmake` stands for "CMake's default generator" and adds no `-G`.
    pub fn configure_args(config: &BuildConfiguration) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            config.source_folder.to_string_lossy().to_string(),
            "-B".to_string(),
            config.build_folder.to_string_lossy().to_string(),
        ];

        if !config.generator.is_empty() && !config.generator.eq_ignore_ascii_case("cmake") {
            args.push("-G".to_string());
            args.push(config.generator.clone());
        }

        if let Some(build_type) = config.build_type() {
            args.push(format!("-DCMAKE_BUILD_TYPE={}", build_type));
        }

        for (name, value) in config.options.iter() {
            args.push(format!("-D{}={}", name, value));
        }

        args
    }

    /// Arguments for the build step
    pub fn build_args(config: &BuildConfiguration) -> Vec<String> {
        let mut args = vec![
            "--build".to_string(),
            config.build_folder.to_string_lossy().to_string(),
            "--parallel".to_string(),
            config.jobs.to_string(),
        ];
        if let Some(build_type) = config.build_type() {
            args.push("--config".to_string());
            args.push(build_type.to_string());
        }
        args
    }

    /// Arguments for the test step
    pub fn test_args(config: &BuildConfiguration, output_on_failure: bool) -> Vec<String> {
        let mut args = vec![
            "--test-dir".to_string(),
            config.build_folder.to_string_lossy().to_string(),
        ];
        if let Some(build_type) = config.build_type() {
            args.push("-C".to_string());
            args.push(build_type.to_string());
        }
        if output_on_failure {
            args.push("--output-on-failure".to_string());
        }
        args
    }
}

impl BuildTool for CMakeTool {
    fn name(&self) -> &str {
        "cmake"
    }

    fn configure(&self, config: &BuildConfiguration) -> Result<ToolOutput> {
        Ok(run_program(
            &self.cmake,
            &Self::configure_args(config),
            &config.source_folder,
            &config.environment,
        ))
    }

    fn build(&self, config: &BuildConfiguration) -> Result<ToolOutput> {
        Ok(run_program(
            &self.cmake,
            &Self::build_args(config),
            &config.build_folder,
            &config.environment,
        ))
    }

    fn test(&self, config: &BuildConfiguration, output_on_failure: bool) -> Result<ToolOutput> {
        Ok(run_program(
            &self.ctest,
            &Self::test_args(config, output_on_failure),
            &config.build_folder,
            &config.environment,
        ))
    }
}

/// Recipe-provided shell commands run with `sh -c` inside the build folder
#[derive(Debug, Clone, Default)]
pub struct ShellTool {
    configure: Option<String>,
    build: Option<String>,
    test: Option<String>,
}

impl ShellTool {
    pub fn new(configure: Option<String>, build: Option<String>, test: Option<String>) -> Self {
        Self {
            configure,
            build,
            test,
        }
    }

    pub fn from_section(build: &BuildSection) -> Self {
        Self::new(
            build.configure.clone(),
            build.build.clone(),
            build.test_command.clone(),
        )
    }

    /// Run one step; a step without a command is a successful no-op
    fn run_step(&self, command: Option<&String>, config: &BuildConfiguration) -> ToolOutput {
        let Some(command) = command else {
            return ToolOutput::empty();
        };

        let command = substitute(command, &config.variables());
        let mut env = config.environment.clone();
        env.entry("MAKEFLAGS".to_string())
            .or_insert_with(|| format!("-j{}", config.jobs));

        run_program(
            "sh",
            &["-c".to_string(), command],
            &config.build_folder,
            &env,
        )
    }
}

impl BuildTool for ShellTool {
    fn name(&self) -> &str {
        "shell"
    }

    fn configure(&self, config: &BuildConfiguration) -> Result<ToolOutput> {
        Ok(self.run_step(self.configure.as_ref(), config))
    }

    fn build(&self, config: &BuildConfiguration) -> Result<ToolOutput> {
        Ok(self.run_step(self.build.as_ref(), config))
    }

    fn test(&self, config: &BuildConfiguration, _output_on_failure: bool) -> Result<ToolOutput> {
        Ok(self.run_step(self.test.as_ref(), config))
    }
}

/// Substitute `%(name)s` variables in a command template
pub fn substitute(template: &str, vars: &BTreeMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("%({})s", key), value);
    }
    result
}

/// Run a program to completion, capturing stdout and stderr
///
/// A program that cannot be spawned reports exit code 127 with the OS error
/// as its output, the same as a shell would.
pub fn run_program(
    program: &str,
    args: &[String],
    workdir: &Path,
    env: &BTreeMap<String, String>,
) -> ToolOutput {
    debug!("Running {} {}", program, args.join(" "));

    let output = match Command::new(program)
        .args(args)
        .current_dir(workdir)
        .envs(env)
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            return ToolOutput::new(
                EXIT_TOOL_NOT_FOUND,
                format!("Failed to run {}: {}", program, e),
            );
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    let mut captured = String::new();
    if !stdout.is_empty() {
        captured.push_str(&stdout);
    }
    if !stderr.is_empty() {
        if !captured.is_empty() && !captured.ends_with('\n') {
            captured.push('\n');
        }
        captured.push_str(&stderr);
    }

    ToolOutput::new(exit_code(output.status), captured)
}

/// Map an exit status to a shell-style code (`128 + signal` when killed)
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::metadata::OptionValues;
    use crate::recipe::settings::{SettingAxis, SettingsValues};
    use std::path::PathBuf;

    fn config(build_folder: PathBuf, generator: &str) -> BuildConfiguration {
        let mut settings = SettingsValues::new();
        settings.insert(SettingAxis::BuildType, "Release".to_string());
        let mut options = BTreeMap::new();
        options.insert("shared".to_string(), "False".to_string());

        BuildConfiguration {
            name: "samduino".to_string(),
            source_folder: PathBuf::from("/src/samduino"),
            build_folder,
            generator: generator.to_string(),
            settings,
            options: OptionValues::new(options),
            jobs: 4,
            environment: BTreeMap::new(),
        }
    }

    #[test]
    fn test_cmake_configure_args_default_generator() {
        let args = CMakeTool::configure_args(&config(PathBuf::from("/work/build"), "cmake"));
        assert_eq!(&args[..4], &["-S", "/src/samduino", "-B", "/work/build"]);
        assert!(!args.contains(&"-G".to_string()));
        assert!(args.contains(&"-DCMAKE_BUILD_TYPE=Release".to_string()));
        assert!(args.contains(&"-Dshared=False".to_string()));
    }

    #[test]
    fn test_cmake_configure_args_explicit_generator() {
        let args = CMakeTool::configure_args(&config(PathBuf::from("/work/build"), "Ninja"));
        let pos = args.iter().position(|a| a == "-G").unwrap();
        assert_eq!(args[pos + 1], "Ninja");
    }

    #[test]
    fn test_cmake_build_and_test_args() {
        let cfg = config(PathBuf::from("/work/build"), "cmake");
        let build = CMakeTool::build_args(&cfg);
        assert_eq!(build, vec!["--build", "/work/build", "--parallel", "4", "--config", "Release"]);

        let test = CMakeTool::test_args(&cfg, true);
        assert!(test.contains(&"--output-on-failure".to_string()));
        let test = CMakeTool::test_args(&cfg, false);
        assert!(!test.contains(&"--output-on-failure".to_string()));
    }

    #[test]
    fn test_substitute() {
        let mut vars = BTreeMap::new();
        vars.insert("build_type".to_string(), "Debug".to_string());
        vars.insert("name".to_string(), "samduino".to_string());
        assert_eq!(
            substitute("make %(name)s BUILD=%(build_type)s %(unknown)s", &vars),
            "make samduino BUILD=Debug %(unknown)s"
        );
    }

    #[test]
    fn test_missing_program_reports_127() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_program(
            "sous-definitely-not-a-real-program",
            &[],
            dir.path(),
            &BTreeMap::new(),
        );
        assert_eq!(out.status, 127);
        assert!(out.output.contains("sous-definitely-not-a-real-program"));
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_tool_captures_status_and_output() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ShellTool::new(
            Some("echo configuring %(name)s".to_string()),
            Some("echo broken >&2; exit 3".to_string()),
            None,
        );
        let cfg = config(dir.path().to_path_buf(), "cmake");

        let out = tool.configure(&cfg).unwrap();
        assert!(out.success());
        assert_eq!(out.output.trim(), "configuring samduino");

        let out = tool.build(&cfg).unwrap();
        assert_eq!(out.status, 3);
        assert!(out.output.contains("broken"));

        // No test command: no-op success
        assert_eq!(tool.test(&cfg, true).unwrap(), ToolOutput::empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_tool_runs_in_build_folder() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ShellTool::new(Some("touch configured".to_string()), None, None);
        let cfg = config(dir.path().to_path_buf(), "cmake");

        assert!(tool.configure(&cfg).unwrap().success());
        assert!(dir.path().join("configured").exists());
    }
}
