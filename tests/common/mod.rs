// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Source files of a small library laid out like samduino
pub const SAMDUINO_SOURCES: &[&str] = &[
    "lib/WString.cpp",
    "lib/WString.h",
    "lib/Print.cpp",
    "lib/Print.h",
    "lib/WStringTest.cpp",
    "lib/avr/pgmspace.h",
    "test/main.cpp",
    "CMakeLists.txt",
    "README.md",
];

/// A source tree, an output root and a work directory for one cook
pub struct Workspace {
    pub source: TempDir,
    pub output: TempDir,
    pub work: TempDir,
}

impl Workspace {
    /// Create a workspace whose source tree holds [`SAMDUINO_SOURCES`]
    pub fn samduino() -> Self {
        let source = tempfile::tempdir().unwrap();
        for file in SAMDUINO_SOURCES {
            write_file(source.path(), file, &format!("// {}\n", file));
        }
        Self {
            source,
            output: tempfile::tempdir().unwrap(),
            work: tempfile::tempdir().unwrap(),
        }
    }

    /// Write `recipe.toml` into the source tree and return its path
    pub fn write_recipe(&self, body: &str) -> PathBuf {
        write_file(self.source.path(), "recipe.toml", body)
    }

    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.output.path().join(name)
    }

    /// True when no build folder is left behind in the work directory
    pub fn work_is_empty(&self) -> bool {
        fs::read_dir(self.work.path()).unwrap().next().is_none()
    }
}

pub fn write_file(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

/// A shell-tool recipe for samduino
///
/// The build step compiles nothing; it drops a static library into the
/// build folder so packaging has a build artifact to pick up.
pub fn shell_recipe(test: bool, test_command: &str) -> String {
    format!(
        r#"
[recipe]
name = "samduino"
url = "https://github.com/cheezypoofs/samduino"
description = "A library of arduino capabilities with tests"
license = "MIT"
settings = ["os", "compiler", "arch", "build_type"]

[options]
shared = ["True", "False"]

[default_options]
shared = "False"

[requirements]
requires = ["gtest/1.8.1@bincrafters/stable"]

[build]
tool = "shell"
test = {test}
configure = "echo configuring %(name)s %(build_type)s > configured.txt"
build = "echo archive > libsamduino.a"
test_command = "{test_command}"

[[package]]
pattern = "*.cpp"
excludes = ["*Test*"]
src = "lib"

[[package]]
pattern = "*.h"
src = "lib"

[[package]]
pattern = "*.a"
root = "build"
dst = "lib"
"#
    )
}

/// Relative paths of every regular file under `root`, sorted
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}
