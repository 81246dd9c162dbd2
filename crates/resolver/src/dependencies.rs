//! Loading of external dependency packages

use kure_spec_common::{ApiDependency, ApiGroupVersion, Result, SpecError};
use kure_spec_parser::DescriptorLoader;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Source of the group versions published by a dependency package
#[cfg_attr(test, mockall::automock)]
pub trait PackageLoader {
    /// Every group version of `dependency.package` at `dependency.version`
    fn load(&self, dependency: &ApiDependency) -> Result<Vec<ApiGroupVersion>>;
}

/// Loads packages from `<root>/<package>/<version>/` directories
///
/// Every `.json`, `.yaml` and `.yml` file in the version directory is read;
/// the first root containing the directory wins.
#[derive(Debug, Clone, Default)]
pub struct DirectoryPackageLoader {
    roots: Vec<PathBuf>,
}

impl DirectoryPackageLoader {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    fn package_dir(&self, dependency: &ApiDependency) -> Option<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(&dependency.package).join(&dependency.version))
            .find(|dir| dir.is_dir())
    }
}

impl PackageLoader for DirectoryPackageLoader {
    fn load(&self, dependency: &ApiDependency) -> Result<Vec<ApiGroupVersion>> {
        let dir = self
            .package_dir(dependency)
            .ok_or_else(|| SpecError::PackageNotFound {
                package: dependency.package.clone(),
                version: dependency.version.clone(),
            })?;
        debug!(dir = %dir.display(), "reading dependency package");

        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_file() && is_descriptor_file(&path) {
                files.push(path);
            }
        }
        // Directory order is platform dependent
        files.sort();

        let mut group_versions = Vec::new();
        for file in files {
            trace!(file = %file.display(), "reading package descriptor");
            let loader = DescriptorLoader::from_file(&file)?;
            group_versions.extend(loader.group_versions().cloned());
        }
        Ok(group_versions)
    }
}

fn is_descriptor_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json" | "yaml" | "yml")
    )
}
