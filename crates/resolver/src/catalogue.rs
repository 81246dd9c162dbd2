//! Immutable snapshot of every group version a resolution can reach

use crate::dependencies::PackageLoader;
use kure_spec_common::{
    Api, ApiDependency, ApiGroup, ApiGroupIdentifier, ApiGroupVersion, Definition, Descriptor,
    Document, GroupModule, NameKind, Result, SchemaPath, SpecError,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use tracing::debug;

/// Where a group version comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Origin {
    /// Part of a locally declared API, by Kure API name
    Api(String),
    /// Part of an external dependency package
    Package { name: String, version: String },
}

impl Origin {
    pub fn package(dependency: &ApiDependency) -> Self {
        Origin::Package {
            name: dependency.package.clone(),
            version: dependency.version.clone(),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Origin::Api(_))
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Api(name) => f.write_str(name),
            Origin::Package { name, version } => write!(f, "{}@{}", name, version),
        }
    }
}

/// Identity of a group version inside a [`Catalogue`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupVersionId {
    pub origin: Origin,
    pub group: ApiGroupIdentifier,
    pub version: String,
}

impl GroupVersionId {
    pub fn new(origin: Origin, group: ApiGroupIdentifier, version: &str) -> Self {
        Self {
            origin,
            group,
            version: version.to_string(),
        }
    }

    /// Identity of a locally declared group version
    pub fn local(group_version: &ApiGroupVersion) -> Self {
        Self::new(
            Origin::Api(group_version.api.clone()),
            group_version.group.clone(),
            &group_version.version,
        )
    }

    pub fn path(&self) -> SchemaPath {
        SchemaPath::group_version(&self.origin.to_string(), &self.group, &self.version)
    }

    pub fn definition(&self, name: &str) -> DefinitionId {
        DefinitionId {
            group_version: self.clone(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for GroupVersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.origin, self.group, self.version)
    }
}

/// Identity of a definition: `(group version, name)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionId {
    pub group_version: GroupVersionId,
    pub name: String,
}

impl DefinitionId {
    pub fn path(&self) -> SchemaPath {
        self.group_version.path().definition(&self.name)
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group_version, self.name)
    }
}

/// Every group version known to a resolution, keyed by [`GroupVersionId`]
///
/// Built once with a [`CatalogueBuilder`] and read-only afterwards, so it can
/// be shared freely between threads.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    group_versions: BTreeMap<GroupVersionId, ApiGroupVersion>,
    apis: Vec<Api>,
    groups: Vec<ApiGroup>,
}

impl Catalogue {
    pub fn builder() -> CatalogueBuilder {
        CatalogueBuilder::default()
    }

    pub fn group_version(&self, id: &GroupVersionId) -> Option<&ApiGroupVersion> {
        self.group_versions.get(id)
    }

    /// The stored key and group version for `id`
    pub(crate) fn entry(&self, id: &GroupVersionId) -> Option<(&GroupVersionId, &ApiGroupVersion)> {
        self.group_versions.get_key_value(id)
    }

    pub fn definition(&self, id: &DefinitionId) -> Option<&Definition> {
        self.group_version(&id.group_version)?.definition(&id.name)
    }

    /// All group versions, local and external, in key order
    pub fn group_versions(&self) -> impl Iterator<Item = (&GroupVersionId, &ApiGroupVersion)> {
        self.group_versions.iter()
    }

    /// Group versions declared locally rather than pulled in as dependencies
    pub fn local_group_versions(
        &self,
    ) -> impl Iterator<Item = (&GroupVersionId, &ApiGroupVersion)> {
        self.group_versions
            .iter()
            .filter(|(id, _)| id.origin.is_local())
    }

    pub fn apis(&self) -> &[Api] {
        &self.apis
    }

    pub fn groups(&self) -> &[ApiGroup] {
        &self.groups
    }

    /// Find a local group version by wire group name (`core` or `""` for the
    /// core group) and version
    ///
    /// Several modules or APIs may share a wire group name; that is reported
    /// as [`SpecError::AmbiguousGroup`] rather than picking one.
    pub fn find(&self, group: &str, version: &str) -> Result<Option<&GroupVersionId>> {
        let group = wire_name(group);
        let matches: Vec<&GroupVersionId> = self
            .local_group_versions()
            .map(|(id, _)| id)
            .filter(|id| id.group.name == group && id.version == version)
            .collect();

        match matches[..] {
            [] => Ok(None),
            [id] => Ok(Some(id)),
            [first, ..] => Err(SpecError::AmbiguousGroup {
                group: format!("{}/{}", first.group, version),
                candidates: matches
                    .iter()
                    .map(|id| format!("{} in {}", module_label(&id.group), id.origin))
                    .collect(),
            }),
        }
    }

    /// The identifier of a group, local or external, by wire name
    pub fn group(&self, name: &str) -> Result<Option<&ApiGroupIdentifier>> {
        let name = wire_name(name);
        let candidates: BTreeSet<&ApiGroupIdentifier> = self
            .group_versions
            .keys()
            .map(|id| &id.group)
            .filter(|group| group.name == name)
            .collect();

        if candidates.len() > 1 {
            return Err(SpecError::AmbiguousGroup {
                group: if name.is_empty() { "core" } else { name }.to_string(),
                candidates: candidates.iter().map(|group| module_label(group)).collect(),
            });
        }
        Ok(candidates.into_iter().next())
    }

    pub fn len(&self) -> usize {
        self.group_versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.group_versions.is_empty()
    }
}

fn wire_name(group: &str) -> &str {
    if group == "core" {
        ""
    } else {
        group
    }
}

fn module_label(group: &ApiGroupIdentifier) -> String {
    match &group.module {
        GroupModule::Named(module) => format!("module `{}`", module),
        GroupModule::Default => "the default module".to_string(),
    }
}

/// Collects descriptors into a [`Catalogue`]
#[derive(Debug, Default)]
pub struct CatalogueBuilder {
    group_versions: BTreeMap<GroupVersionId, ApiGroupVersion>,
    packages: BTreeSet<ApiDependency>,
    apis: Vec<Api>,
    groups: Vec<ApiGroup>,
}

impl CatalogueBuilder {
    /// Register a locally declared group version
    pub fn add_group_version(&mut self, group_version: ApiGroupVersion) -> Result<&mut Self> {
        let id = GroupVersionId::local(&group_version);
        self.insert(id, group_version)?;
        Ok(self)
    }

    /// Register every group version of a dependency package
    pub fn add_package(
        &mut self,
        dependency: &ApiDependency,
        group_versions: Vec<ApiGroupVersion>,
    ) -> Result<&mut Self> {
        if !self.packages.insert(dependency.clone()) {
            return Err(SpecError::DuplicateName {
                entity: NameKind::Package,
                name: format!("{}@{}", dependency.package, dependency.version),
                path: SchemaPath::default(),
            });
        }

        let origin = Origin::package(dependency);
        for group_version in group_versions {
            let id = GroupVersionId::new(
                origin.clone(),
                group_version.group.clone(),
                &group_version.version,
            );
            self.insert(id, group_version)?;
        }
        Ok(self)
    }

    /// Register a decoded document of any kind
    pub fn add_document(&mut self, document: Document) -> Result<&mut Self> {
        match document.descriptor {
            Descriptor::Api(api) => self.apis.push(api),
            Descriptor::ApiGroup(group) => self.groups.push(group),
            Descriptor::ApiGroupVersion(group_version) => {
                self.add_group_version(group_version)?;
            }
        }
        Ok(self)
    }

    pub fn add_documents<I>(&mut self, documents: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Document>,
    {
        for document in documents {
            self.add_document(document)?;
        }
        Ok(self)
    }

    /// Pull in every declared dependency, transitively, once per package version
    pub fn load_dependencies(&mut self, loader: &dyn PackageLoader) -> Result<&mut Self> {
        let mut pending: VecDeque<ApiDependency> = self
            .group_versions
            .values()
            .flat_map(|gv| gv.dependencies.iter().cloned())
            .collect();

        while let Some(dependency) = pending.pop_front() {
            if self.packages.contains(&dependency) {
                continue;
            }

            debug!(
                package = %dependency.package,
                version = %dependency.version,
                "loading dependency package"
            );
            let group_versions = loader.load(&dependency)?;
            pending.extend(
                group_versions
                    .iter()
                    .flat_map(|gv| gv.dependencies.iter().cloned()),
            );
            self.add_package(&dependency, group_versions)?;
        }

        Ok(self)
    }

    pub fn build(self) -> Catalogue {
        debug!(
            group_versions = self.group_versions.len(),
            packages = self.packages.len(),
            "built catalogue"
        );
        Catalogue {
            group_versions: self.group_versions,
            apis: self.apis,
            groups: self.groups,
        }
    }

    fn insert(&mut self, id: GroupVersionId, group_version: ApiGroupVersion) -> Result<()> {
        if self.group_versions.contains_key(&id) {
            return Err(SpecError::DuplicateName {
                entity: NameKind::GroupVersion,
                name: format!("{}/{}", id.group, id.version),
                path: id.path(),
            });
        }
        debug!(group_version = %id, definitions = group_version.definitions.len(), "registered group version");
        self.group_versions.insert(id, group_version);
        Ok(())
    }
}
