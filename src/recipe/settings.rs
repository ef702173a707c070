// src/recipe/settings.rs

//! Build-variant settings axes
//!
//! A recipe declares which of the fixed axes (`os`, `compiler`, `arch`,
//! `build_type`) its binaries depend on. Values for those axes come from the
//! host defaults, overlaid by whatever the invoker passes on the command line.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// One of the recognized settings axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingAxis {
    Os,
    Compiler,
    Arch,
    BuildType,
}

impl SettingAxis {
    /// All axes in canonical order
    pub const ALL: [SettingAxis; 4] = [
        SettingAxis::Os,
        SettingAxis::Compiler,
        SettingAxis::Arch,
        SettingAxis::BuildType,
    ];

    /// Get the axis name as used in recipes and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingAxis::Os => "os",
            SettingAxis::Compiler => "compiler",
            SettingAxis::Arch => "arch",
            SettingAxis::BuildType => "build_type",
        }
    }
}

impl fmt::Display for SettingAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingAxis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SettingAxis::ALL
            .into_iter()
            .find(|axis| axis.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidSetting(format!(
                    "unknown axis '{}' (expected one of: os, compiler, arch, build_type)",
                    s
                ))
            })
    }
}

/// Snapshot of setting values keyed by axis
pub type SettingsValues = BTreeMap<SettingAxis, String>;

/// Parse an `axis=value` assignment
pub fn parse_assignment(s: &str) -> Result<(SettingAxis, String)> {
    let (axis, value) = s
        .split_once('=')
        .ok_or_else(|| Error::InvalidSetting(format!("expected axis=value, got '{}'", s)))?;

    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidSetting(format!("empty value for '{}'", axis)));
    }

    Ok((axis.trim().parse()?, value.to_string()))
}

/// Setting values describing the host this process runs on
///
/// `compiler` is never guessed; it has to be supplied explicitly.
pub fn host_defaults() -> SettingsValues {
    let os = match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Macos",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        other => other,
    };
    let arch = match std::env::consts::ARCH {
        "aarch64" => "armv8",
        other => other,
    };

    let mut values = SettingsValues::new();
    values.insert(SettingAxis::Os, os.to_string());
    values.insert(SettingAxis::Arch, arch.to_string());
    values.insert(SettingAxis::BuildType, "Release".to_string());
    values
}

/// Compute the effective settings snapshot for a recipe
///
/// Starts from `defaults`, applies `overrides`, and keeps only the axes the
/// recipe declares. Overrides for undeclared axes are dropped with a warning.
pub fn effective(
    declared: &[SettingAxis],
    defaults: &SettingsValues,
    overrides: &SettingsValues,
) -> SettingsValues {
    for axis in overrides.keys() {
        if !declared.contains(axis) {
            warn!("Ignoring setting '{}': not declared by the recipe", axis);
        }
    }

    declared
        .iter()
        .filter_map(|axis| {
            overrides
                .get(axis)
                .or_else(|| defaults.get(axis))
                .map(|value| (*axis, value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_round_trip_names() {
        for axis in SettingAxis::ALL {
            assert_eq!(axis.as_str().parse::<SettingAxis>().unwrap(), axis);
        }
        assert!("toolset".parse::<SettingAxis>().is_err());
    }

    #[test]
    fn test_parse_assignment() {
        let (axis, value) = parse_assignment("build_type=Debug").unwrap();
        assert_eq!(axis, SettingAxis::BuildType);
        assert_eq!(value, "Debug");

        assert!(parse_assignment("build_type").is_err());
        assert!(parse_assignment("build_type=").is_err());
        assert!(parse_assignment("flavor=x").is_err());
    }

    #[test]
    fn test_host_defaults_leave_compiler_unset() {
        let defaults = host_defaults();
        assert!(defaults.contains_key(&SettingAxis::Os));
        assert!(defaults.contains_key(&SettingAxis::Arch));
        assert_eq!(defaults[&SettingAxis::BuildType], "Release");
        assert!(!defaults.contains_key(&SettingAxis::Compiler));
    }

    #[test]
    fn test_effective_restricts_to_declared_axes() {
        let defaults = host_defaults();
        let mut overrides = SettingsValues::new();
        overrides.insert(SettingAxis::BuildType, "Debug".to_string());
        overrides.insert(SettingAxis::Compiler, "gcc".to_string());

        let snapshot = effective(&[SettingAxis::Os, SettingAxis::BuildType], &defaults, &overrides);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[&SettingAxis::BuildType], "Debug");
        assert!(!snapshot.contains_key(&SettingAxis::Compiler));
    }

    #[test]
    fn test_effective_skips_axes_without_value() {
        let snapshot = effective(&SettingAxis::ALL, &host_defaults(), &SettingsValues::new());
        assert!(!snapshot.contains_key(&SettingAxis::Compiler));
        assert_eq!(snapshot.len(), 3);
    }
}
