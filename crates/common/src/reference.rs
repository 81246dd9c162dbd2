//! By-name references from one type to another definition

use crate::ApiGroupIdentifier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference to another [`crate::Definition`]
///
/// References never own their target; they are resolved by lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeReference {
    pub target: ReferenceTarget,
}

/// The definition being referenced
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceTarget {
    /// Absent for definitions in the referencing group version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ReferenceScope>,

    pub name: String,
}

/// The API group, version, and possibly external package declaring a target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceScope {
    /// Absent for the same API as the referencing group version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,

    pub group: ApiGroupIdentifier,

    pub version: String,
}

/// How far a reference reaches to find its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// Same group and version
    Local,
    /// Another group or version of the same API
    IntraApi,
    /// A group version of a dependency package
    External,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::Local => "local",
            ReferenceKind::IntraApi => "intra-API",
            ReferenceKind::External => "external",
        };
        f.write_str(name)
    }
}

impl TypeReference {
    /// A reference into the referencing group version
    pub fn local(name: &str) -> Self {
        Self {
            target: ReferenceTarget {
                scope: None,
                name: name.to_string(),
            },
        }
    }

    /// A reference into another group version of the same API
    pub fn in_group(group: ApiGroupIdentifier, version: &str, name: &str) -> Self {
        Self {
            target: ReferenceTarget {
                scope: Some(ReferenceScope {
                    package: None,
                    group,
                    version: version.to_string(),
                }),
                name: name.to_string(),
            },
        }
    }

    /// A reference into a group version of a dependency package
    pub fn external(package: &str, group: ApiGroupIdentifier, version: &str, name: &str) -> Self {
        Self {
            target: ReferenceTarget {
                scope: Some(ReferenceScope {
                    package: Some(package.to_string()),
                    group,
                    version: version.to_string(),
                }),
                name: name.to_string(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.target.name
    }

    pub fn kind(&self) -> ReferenceKind {
        match &self.target.scope {
            None => ReferenceKind::Local,
            Some(ReferenceScope { package: None, .. }) => ReferenceKind::IntraApi,
            Some(ReferenceScope {
                package: Some(_), ..
            }) => ReferenceKind::External,
        }
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target.scope {
            None => f.write_str(&self.target.name),
            Some(scope) => {
                if let Some(package) = &scope.package {
                    write!(f, "{}:", package)?;
                }
                write!(f, "{}/{}.{}", scope.group, scope.version, self.target.name)
            }
        }
    }
}

/// Serde adapter for an optional list of references written with their
/// `type` tag, as they appear in an object's `inherit` list.
pub(crate) mod tagged_references {
    use super::TypeReference;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize)]
    #[serde(tag = "type", rename_all = "lowercase")]
    enum TaggedRef<'a> {
        Reference(&'a TypeReference),
    }

    #[derive(Deserialize)]
    #[serde(tag = "type", rename_all = "lowercase")]
    enum OwnedTaggedRef {
        Reference(TypeReference),
    }

    pub fn serialize<S>(
        references: &Option<Vec<TypeReference>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match references {
            Some(references) => serializer.collect_seq(references.iter().map(TaggedRef::Reference)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<TypeReference>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tagged = Option::<Vec<OwnedTaggedRef>>::deserialize(deserializer)?;
        Ok(tagged.map(|tagged| {
            tagged
                .into_iter()
                .map(|OwnedTaggedRef::Reference(reference)| reference)
                .collect()
        }))
    }
}
