// src/recipe/kitchen/phase.rs

//! The fixed, ordered phases of a cook

use std::fmt;

/// One step of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    DeclareDependencies,
    Configure,
    Build,
    Test,
    Package,
}

impl Phase {
    /// All phases in execution order
    pub const ORDER: [Phase; 5] = [
        Phase::DeclareDependencies,
        Phase::Configure,
        Phase::Build,
        Phase::Test,
        Phase::Package,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::DeclareDependencies => "declare-dependencies",
            Phase::Configure => "configure",
            Phase::Build => "build",
            Phase::Test => "test",
            Phase::Package => "package",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_matches_ord() {
        let mut sorted = Phase::ORDER;
        sorted.sort();
        assert_eq!(sorted, Phase::ORDER);
        assert_eq!(Phase::DeclareDependencies.to_string(), "declare-dependencies");
    }
}
