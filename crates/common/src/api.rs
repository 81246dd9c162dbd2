//! Containers grouping definitions into versioned, dependency-aware units

use crate::{ApiGroupIdentifier, Definition, NameKind, SchemaPath, SpecError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A Kubernetes API whose groups and types are available in Kure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Api {
    pub name: String,

    /// `None` for an unversioned API, written as `null`
    #[serde(deserialize_with = "crate::de::required")]
    pub version: Option<String>,

    #[serde(default)]
    pub groups: Vec<ApiGroupIdentifier>,
}

impl Api {
    /// Structural problems: groups must be unique by `(module, name)`
    pub fn check(&self) -> Vec<SpecError> {
        let mut seen = HashSet::new();
        self.groups
            .iter()
            .filter(|group| !seen.insert(*group))
            .map(|group| SpecError::DuplicateName {
                entity: NameKind::Group,
                name: format!("{}", group),
                path: SchemaPath {
                    origin: Some(self.name.clone()),
                    group: Some(group.clone()),
                    ..SchemaPath::default()
                },
            })
            .collect()
    }
}

/// A Kubernetes API group, across its versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroup {
    #[serde(flatten)]
    pub identifier: ApiGroupIdentifier,

    /// The Kure name of the API this group is part of
    pub api: String,

    #[serde(default)]
    pub versions: Vec<String>,

    /// The version to use by default, if any; the key is required
    #[serde(deserialize_with = "crate::de::required")]
    pub preferred_version: Option<String>,
}

impl ApiGroup {
    /// Structural problems: unique versions, preferred version among them
    pub fn check(&self) -> Vec<SpecError> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for version in &self.versions {
            if !seen.insert(version.as_str()) {
                errors.push(SpecError::DuplicateName {
                    entity: NameKind::Version,
                    name: version.clone(),
                    path: SchemaPath {
                        origin: Some(self.api.clone()),
                        group: Some(self.identifier.clone()),
                        ..SchemaPath::default()
                    },
                });
            }
        }

        if let Some(preferred) = &self.preferred_version {
            if !seen.contains(preferred.as_str()) {
                errors.push(SpecError::InvalidPreferredVersion {
                    group: self.identifier.clone(),
                    preferred: preferred.clone(),
                });
            }
        }

        errors
    }
}

/// Declares all the types in one version of an API group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiGroupVersion {
    /// The Kure name of the API this group version is part of
    pub api: String,

    pub group: ApiGroupIdentifier,

    /// The Kubernetes version, like `v1` or `v1beta2`
    pub version: String,

    #[serde(default)]
    pub dependencies: Vec<ApiDependency>,

    #[serde(default)]
    pub definitions: Vec<Definition>,
}

impl ApiGroupVersion {
    pub fn new(api: &str, group: ApiGroupIdentifier, version: &str) -> Self {
        Self {
            api: api.to_string(),
            group,
            version: version.to_string(),
            dependencies: Vec::new(),
            definitions: Vec::new(),
        }
    }

    pub fn with_definition(mut self, definition: Definition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn with_dependency(mut self, package: &str, version: &str) -> Self {
        self.dependencies.push(ApiDependency {
            package: package.to_string(),
            version: version.to_string(),
        });
        self
    }

    /// First definition with the given name
    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.definitions.iter().find(|d| d.name() == name)
    }

    /// The declared dependency on a package, if any
    pub fn dependency(&self, package: &str) -> Option<&ApiDependency> {
        self.dependencies.iter().find(|d| d.package == package)
    }

    /// Path of this group version, using the API name as origin
    pub fn path(&self) -> SchemaPath {
        SchemaPath::group_version(&self.api, &self.group, &self.version)
    }

    /// Definitions sharing a name with an earlier sibling
    pub fn duplicate_definitions(&self) -> Vec<SpecError> {
        let mut seen = HashSet::new();
        self.definitions
            .iter()
            .filter(|d| !seen.insert(d.name()))
            .map(|d| SpecError::DuplicateName {
                entity: NameKind::Definition,
                name: d.name().to_string(),
                path: self.path().definition(d.name()),
            })
            .collect()
    }
}

/// An external API package a group version depends on
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApiDependency {
    pub package: String,
    pub version: String,
}

impl ApiDependency {
    pub fn new(package: &str, version: &str) -> Self {
        Self {
            package: package.to_string(),
            version: version.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Type;
    use serde_json::json;

    #[test]
    fn test_duplicate_groups() {
        let api = Api {
            name: "kubernetes".to_string(),
            version: None,
            groups: vec![
                ApiGroupIdentifier::core(),
                ApiGroupIdentifier::named("apps", "apps"),
                ApiGroupIdentifier::named("apps", "apps"),
                // Same wire name in another module is a distinct group
                ApiGroupIdentifier::named("apps2", "apps"),
            ],
        };
        let errors = api.check();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SpecError::DuplicateName { entity: NameKind::Group, name, .. } if name == "apps"
        ));
    }

    #[test]
    fn test_preferred_version_must_be_listed() {
        let group = ApiGroup {
            identifier: ApiGroupIdentifier::default_group("apps"),
            api: "kubernetes".to_string(),
            versions: vec!["v1".to_string(), "v1beta1".to_string()],
            preferred_version: Some("v2".to_string()),
        };
        let errors = group.check();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], SpecError::InvalidPreferredVersion { .. }));
    }

    #[test]
    fn test_duplicate_versions() {
        let group = ApiGroup {
            identifier: ApiGroupIdentifier::default_group("apps"),
            api: "kubernetes".to_string(),
            versions: vec!["v1".to_string(), "v1".to_string()],
            preferred_version: None,
        };
        assert_eq!(group.check().len(), 1);
    }

    #[test]
    fn test_group_fields_are_flattened() {
        let value = json!({
            "module": null,
            "name": "apps",
            "api": "kubernetes",
            "versions": ["v1"],
            "preferredVersion": "v1"
        });
        let group: ApiGroup = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(group.identifier, ApiGroupIdentifier::default_group("apps"));
        assert_eq!(serde_json::to_value(&group).unwrap(), value);
    }

    #[test]
    fn test_nullable_keys_must_be_present() {
        let group = json!({"module": null, "name": "apps", "api": "kubernetes", "versions": ["v1"]});
        let err = serde_json::from_value::<ApiGroup>(group).unwrap_err();
        assert!(err.to_string().contains("missing field `preferredVersion`"), "{}", err);

        let api = json!({"name": "kubernetes", "groups": []});
        let err = serde_json::from_value::<Api>(api).unwrap_err();
        assert!(err.to_string().contains("missing field `version`"), "{}", err);

        let api: Api =
            serde_json::from_value(json!({"name": "kubernetes", "version": null, "groups": []}))
                .unwrap();
        assert_eq!(api.version, None);
        assert_eq!(
            serde_json::to_value(&api).unwrap(),
            json!({"name": "kubernetes", "version": null, "groups": []})
        );
    }

    #[test]
    fn test_duplicate_definitions() {
        let gv = ApiGroupVersion::new("k", ApiGroupIdentifier::core(), "v1")
            .with_definition(Definition::new("A", Type::Boolean))
            .with_definition(Definition::new("B", Type::Boolean))
            .with_definition(Definition::new("A", Type::string()));
        let errors = gv.duplicate_definitions();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "duplicate definition `A` at k:core/v1 A"
        );
        // Lookup returns the first declaration
        assert_eq!(gv.definition("A").unwrap().value, Type::Boolean);
    }
}
