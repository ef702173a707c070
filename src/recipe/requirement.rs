// src/recipe/requirement.rs

//! Dependency requirement references
//!
//! Requirements point at an external package using the format:
//! `name/version@account/channel`
//!
//! Examples:
//! - `gtest/1.8.1@bincrafters/stable`
//! - `zlib/1.2.11@conan/stable`
//!
//! Only the shape is checked here. Whether the package exists, and which
//! revision gets picked, is up to the external package manager.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A reference to an external package
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DependencyRequirement {
    /// Package name
    pub name: String,
    /// Package version
    pub version: String,
    /// Owning account (user/namespace)
    pub account: String,
    /// Release channel
    pub channel: String,
}

impl DependencyRequirement {
    /// Create a new requirement from its parts
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        account: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            account: account.into(),
            channel: channel.into(),
        }
    }

    /// Parse a requirement from `name/version@account/channel`
    pub fn parse(s: &str) -> Result<Self> {
        let malformed = |reason: &str| Error::MalformedRequirement {
            requirement: s.to_string(),
            reason: reason.to_string(),
        };

        let (package, owner) = s
            .split_once('@')
            .ok_or_else(|| malformed("missing '@account/channel'"))?;

        let (name, version) = package
            .split_once('/')
            .ok_or_else(|| malformed("missing '/version' after the package name"))?;

        let (account, channel) = owner
            .split_once('/')
            .ok_or_else(|| malformed("missing '/channel' after the account"))?;

        for (label, part) in [
            ("name", name),
            ("version", version),
            ("account", account),
            ("channel", channel),
        ] {
            if part.is_empty() {
                return Err(malformed(&format!("empty {}", label)));
            }
            if !part.chars().all(valid_char) {
                return Err(malformed(&format!("invalid characters in {} '{}'", label, part)));
            }
        }

        Ok(Self::new(name, version, account, channel))
    }
}

/// Alphanumerics plus the punctuation that shows up in real versions
fn valid_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | '+')
}

impl fmt::Display for DependencyRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}/{}",
            self.name, self.version, self.account, self.channel
        )
    }
}

impl FromStr for DependencyRequirement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DependencyRequirement::parse(s)
    }
}

/// Validate a list of requirement strings, keeping declaration order
///
/// Duplicates are kept as-is; deduplication belongs to the package manager.
pub fn declare<S: AsRef<str>>(requires: &[S]) -> Result<Vec<DependencyRequirement>> {
    requires
        .iter()
        .map(|r| DependencyRequirement::parse(r.as_ref()))
        .collect()
}
