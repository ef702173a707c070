// src/recipe/kitchen/provider.rs

//! Hand-off of declared requirements to the external package manager

use crate::error::Result;
use crate::recipe::requirement::DependencyRequirement;
use tracing::info;

/// Trait for the package manager that receives a recipe's requirements
///
/// The Kitchen only declares intent. Resolving versions, deduplicating and
/// fetching are the package manager's business.
pub trait PackageManager: Send + Sync {
    /// Receive the requirements, in declaration order
    fn declare(&self, recipe: &str, requirements: &[DependencyRequirement]) -> Result<()>;
}

/// A package manager that only logs the declared requirements
///
/// Use this when the dependencies are provisioned outside of the cook
/// (e.g., a pre-populated build container).
pub struct LoggingPackageManager;

impl PackageManager for LoggingPackageManager {
    fn declare(&self, recipe: &str, requirements: &[DependencyRequirement]) -> Result<()> {
        if requirements.is_empty() {
            info!("{} declares no requirements", recipe);
            return Ok(());
        }

        for req in requirements {
            info!("{} requires {}", recipe, req);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// A package manager that records every declaration
    #[derive(Default)]
    pub struct RecordingPackageManager {
        pub declared: Mutex<Vec<(String, Vec<DependencyRequirement>)>>,
    }

    impl PackageManager for RecordingPackageManager {
        fn declare(&self, recipe: &str, requirements: &[DependencyRequirement]) -> Result<()> {
            self.declared
                .lock()
                .unwrap()
                .push((recipe.to_string(), requirements.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_logging_package_manager() {
        let pm = LoggingPackageManager;
        assert!(pm.declare("samduino", &[]).is_ok());
        let reqs = vec![DependencyRequirement::new("gtest", "1.8.1", "bincrafters", "stable")];
        assert!(pm.declare("samduino", &reqs).is_ok());
    }

    #[test]
    fn test_recording_package_manager() {
        let pm = RecordingPackageManager::default();
        let reqs = vec![
            DependencyRequirement::new("gtest", "1.8.1", "bincrafters", "stable"),
            DependencyRequirement::new("gtest", "1.8.1", "bincrafters", "stable"),
        ];
        pm.declare("samduino", &reqs).unwrap();

        let declared = pm.declared.lock().unwrap();
        assert_eq!(declared.len(), 1);
        assert_eq!(declared[0].1.len(), 2);
    }
}
