// src/recipe/kitchen/package.rs

//! Artifact selection and packaging
//!
//! Each rule walks its source root, keeps the files matching its include
//! pattern, drops those matching any exclude, and maps the survivors to a
//! destination path. The per-rule results are unioned by destination path,
//! so rule order never changes what ends up in the package.
//!
//! The package is assembled in a staging directory next to the output root
//! and moved into place once complete.

use crate::error::{Error, Result};
use crate::recipe::format::{PackageRoot, PackagingRule};
use crate::recipe::metadata::{self, OptionValues};
use crate::recipe::settings::SettingsValues;
use glob::{MatchOptions, Pattern};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Name of the manifest written at the package root
pub const MANIFEST_FILE: &str = "sous-manifest.json";

/// `*` and `?` never match `/`
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Warning: a rule's include pattern selected nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagingPatternNoMatch {
    pub pattern: String,
    pub source_root: PathBuf,
}

impl fmt::Display for PackagingPatternNoMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pattern '{}' matched no files in {}",
            self.pattern,
            self.source_root.display()
        )
    }
}

/// A file selected for the package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackagedFile {
    /// Destination path relative to the package root, `/`-separated
    pub path: String,
    #[serde(skip)]
    pub source: PathBuf,
    pub size: u64,
    pub sha256: String,
}

/// Files chosen by a rule set, keyed by destination path
#[derive(Debug, Default)]
pub struct Selection {
    pub files: BTreeMap<String, PathBuf>,
    pub warnings: Vec<PackagingPatternNoMatch>,
}

/// Folders packaging rules resolve against
#[derive(Debug, Clone, Copy)]
pub struct PackageRoots<'a> {
    pub source: &'a Path,
    pub build: Option<&'a Path>,
    /// Package output root; never selected from, even when it lies inside a rule's root
    pub output: Option<&'a Path>,
}

/// A compiled packaging rule
struct CompiledRule<'a> {
    rule: &'a PackagingRule,
    include: Pattern,
    excludes: Vec<Pattern>,
}

impl<'a> CompiledRule<'a> {
    fn compile(rule: &'a PackagingRule) -> Result<Self> {
        Ok(Self {
            rule,
            include: compile_pattern(&rule.pattern)?,
            excludes: rule
                .excludes
                .iter()
                .map(|p| compile_pattern(p))
                .collect::<Result<_>>()?,
        })
    }

    fn included(&self, relative: &str) -> bool {
        pattern_matches(&self.include, relative)
    }

    fn excluded(&self, relative: &str) -> bool {
        self.excludes.iter().any(|p| pattern_matches(p, relative))
    }

    /// Destination path for a selected file
    fn destination(&self, relative: &str) -> String {
        let leaf = if self.rule.keep_path {
            relative
        } else {
            file_name(relative)
        };

        match self.rule.dst.as_deref().map(|d| d.trim_matches('/')) {
            Some(dst) if !dst.is_empty() && dst != "." => format!("{}/{}", dst, leaf),
            _ => leaf.to_string(),
        }
    }
}

fn compile_pattern(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Match a pattern against a `/`-separated path relative to the rule's root
///
/// Patterns without a `/` are matched against the file name, so `*.cpp`
/// selects sources at any depth.
fn pattern_matches(pattern: &Pattern, relative: &str) -> bool {
    if pattern.as_str().contains('/') {
        pattern.matches_with(relative, MATCH_OPTIONS)
    } else {
        pattern.matches_with(file_name(relative), MATCH_OPTIONS)
    }
}

fn file_name(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}

/// Relative path with `/` separators regardless of platform
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Some(parts.join("/"))
}

/// Resolve a rule set against the source and build folders
pub fn select(rules: &[PackagingRule], roots: PackageRoots<'_>) -> Result<Selection> {
    let mut selection = Selection::default();
    let output = roots.output.and_then(|p| fs::canonicalize(p).ok());

    for rule in rules {
        let compiled = CompiledRule::compile(rule)?;

        let base = match rule.root {
            PackageRoot::Source => Some(roots.source),
            PackageRoot::Build => roots.build,
        };
        let source_root = match base {
            Some(base) => base.join(&rule.src),
            None => PathBuf::from(&rule.src),
        };

        if base.is_none() || !source_root.is_dir() {
            let warning = PackagingPatternNoMatch {
                pattern: rule.pattern.clone(),
                source_root,
            };
            warn!("{} (source root missing)", warning);
            selection.warnings.push(warning);
            continue;
        }

        let mut matched = 0usize;

        // Walk the canonical root so earlier packages under the output root can be pruned
        let walk_root = fs::canonicalize(&source_root)?;
        let skip = output
            .as_deref()
            .filter(|out| out.starts_with(&walk_root) && *out != walk_root.as_path());
        let walker = WalkDir::new(&walk_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| skip.is_none_or(|out| !e.path().starts_with(out)));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(relative) = relative_path(&walk_root, entry.path()) else {
                continue;
            };

            if !compiled.included(&relative) {
                continue;
            }
            matched += 1;

            if compiled.excluded(&relative) {
                debug!("Excluded {} by rule '{}'", relative, rule.pattern);
                continue;
            }

            insert(&mut selection.files, compiled.destination(&relative), entry.into_path());
        }

        if matched == 0 {
            let warning = PackagingPatternNoMatch {
                pattern: rule.pattern.clone(),
                source_root,
            };
            warn!("{}", warning);
            selection.warnings.push(warning);
        } else {
            debug!("Rule '{}' matched {} file(s)", rule.pattern, matched);
        }
    }

    Ok(selection)
}

/// Add a file to the selection
///
/// When two rules map different sources to the same destination, the
/// smallest source path wins so the outcome does not depend on rule order.
fn insert(files: &mut BTreeMap<String, PathBuf>, destination: String, source: PathBuf) {
    match files.entry(destination) {
        Entry::Vacant(slot) => {
            slot.insert(source);
        }
        Entry::Occupied(mut slot) => {
            if *slot.get() == source {
                return;
            }
            warn!(
                "{} selected from both {} and {}",
                slot.key(),
                slot.get().display(),
                source.display()
            );
            if source < *slot.get() {
                slot.insert(source);
            }
        }
    }
}

/// Recipe-level facts recorded in the package manifest
#[derive(Debug, Clone, Serialize)]
pub struct ManifestHeader {
    pub recipe: String,
    pub exports_sources: Vec<String>,
    pub settings: SettingsValues,
    pub options: OptionValues,
    pub requires: Vec<String>,
}

#[derive(Serialize)]
struct PackageManifest<'a> {
    #[serde(flatten)]
    header: &'a ManifestHeader,
    files: &'a [PackagedFile],
}

/// Result of the packaging phase
#[derive(Debug)]
pub struct PackageOutcome {
    pub package_dir: PathBuf,
    pub files: Vec<PackagedFile>,
    pub warnings: Vec<PackagingPatternNoMatch>,
}

/// Select files, stage them with a manifest, and publish to `output_root/<recipe>`
///
/// Any previous package for the recipe is replaced. On failure the staging
/// directory is removed and the previous package is left untouched.
pub fn package(
    rules: &[PackagingRule],
    roots: PackageRoots<'_>,
    output_root: &Path,
    header: &ManifestHeader,
) -> Result<PackageOutcome> {
    metadata::check_name(&header.recipe)?;

    let roots = PackageRoots {
        output: Some(output_root),
        ..roots
    };
    let selection = select(rules, roots)?;

    if selection.files.contains_key(MANIFEST_FILE) {
        return Err(Error::IoError(format!(
            "Packaged file {} conflicts with the package manifest",
            MANIFEST_FILE
        )));
    }

    fs::create_dir_all(output_root)?;
    let staging = tempfile::Builder::new()
        .prefix(".sous-staging-")
        .tempdir_in(output_root)
        .map_err(|e| Error::IoError(format!("Failed to create staging directory: {}", e)))?;
    let staged_root = staging.path().join(&header.recipe);
    fs::create_dir_all(&staged_root)?;

    let mut files = Vec::with_capacity(selection.files.len());
    for (destination, source) in &selection.files {
        files.push(copy_file(source, &staged_root, destination)?);
    }

    let manifest = PackageManifest {
        header,
        files: &files,
    };
    let mut json = serde_json::to_string_pretty(&manifest)?;
    json.push('\n');
    fs::write(staged_root.join(MANIFEST_FILE), json)?;

    let package_dir = output_root.join(&header.recipe);
    if package_dir.exists() {
        debug!("Replacing previous package at {}", package_dir.display());
        fs::remove_dir_all(&package_dir)?;
    }
    fs::rename(&staged_root, &package_dir)?;

    info!(
        "Packaged {} file(s) into {}",
        files.len(),
        package_dir.display()
    );

    Ok(PackageOutcome {
        package_dir,
        files,
        warnings: selection.warnings,
    })
}

/// Copy one file into the staging tree and record its digest
fn copy_file(source: &Path, staged_root: &Path, destination: &str) -> Result<PackagedFile> {
    let target = staged_root.join(destination);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let size = fs::copy(source, &target)
        .map_err(|e| Error::IoError(format!("Failed to copy {}: {}", source.display(), e)))?;

    let mut file = fs::File::open(&target)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;

    Ok(PackagedFile {
        path: destination.to_string(),
        source: source.to_path_buf(),
        size,
        sha256: format!("{:x}", hasher.finalize()),
    })
}
