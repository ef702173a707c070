// src/error.rs

//! Error types for recipe processing and the cook pipeline

use crate::recipe::Phase;
use thiserror::Error;

/// Exit code reported for recipe/metadata problems detected before any tool runs
pub const EXIT_INVALID_RECIPE: i32 = 2;

/// Exit code reported when a tool binary could not be spawned
pub const EXIT_TOOL_NOT_FOUND: i32 = 127;

/// Exit code reported when the pipeline was cancelled between phases
pub const EXIT_CANCELLED: i32 = 130;

/// Errors produced while loading recipes or cooking them
#[derive(Error, Debug)]
pub enum Error {
    /// Recipe metadata violates an invariant (empty name, unknown default option, ...)
    #[error("Invalid recipe metadata: {0}")]
    InvalidMetadata(String),

    /// Requirement string does not have the `name/version@account/channel` shape
    #[error("Malformed requirement '{requirement}': {reason}")]
    MalformedRequirement { requirement: String, reason: String },

    /// The build tool's configure step exited nonzero
    #[error("configure failed with exit code {code}")]
    ConfigureFailure { code: i32, output: String },

    /// The build tool's build step exited nonzero
    #[error("build failed with exit code {code}")]
    BuildFailure { code: i32, output: String },

    /// The test suite exited nonzero
    #[error("tests failed with exit code {code}")]
    TestFailure { code: i32, output: String },

    /// Recipe file could not be parsed
    #[error("Failed to parse recipe: {0}")]
    ParseError(String),

    /// Packaging pattern is not a valid glob
    #[error("Invalid packaging pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Unknown settings axis or malformed `axis=value` pair
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    /// Option override names an unknown option or a disallowed value
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Invoker aborted the pipeline before the named phase started
    #[error("cancelled before {0} phase")]
    Cancelled(Phase),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build the phase failure matching `phase` from a tool status and its output
    ///
    /// Returns `None` for phases that are never delegated to the build tool.
    pub fn phase_failure(phase: Phase, code: i32, output: String) -> Option<Self> {
        match phase {
            Phase::Configure => Some(Error::ConfigureFailure { code, output }),
            Phase::Build => Some(Error::BuildFailure { code, output }),
            Phase::Test => Some(Error::TestFailure { code, output }),
            Phase::DeclareDependencies | Phase::Package => None,
        }
    }

    /// Process exit code for this error
    ///
    /// Tool failures propagate the tool's own exit status unchanged.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ConfigureFailure { code, .. }
            | Error::BuildFailure { code, .. }
            | Error::TestFailure { code, .. } => *code,
            Error::InvalidMetadata(_)
            | Error::MalformedRequirement { .. }
            | Error::ParseError(_)
            | Error::InvalidPattern { .. }
            | Error::InvalidSetting(_)
            | Error::InvalidOption(_) => EXIT_INVALID_RECIPE,
            Error::Cancelled(_) => EXIT_CANCELLED,
            Error::Io(_) | Error::IoError(_) | Error::Walk(_) | Error::Json(_) => 1,
        }
    }

    /// Captured diagnostic output of a failed tool phase
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            Error::ConfigureFailure { output, .. }
            | Error::BuildFailure { output, .. }
            | Error::TestFailure { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
