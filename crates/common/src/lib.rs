//! Common types for the Kure API specification
//!
//! This crate contains the intermediate representation used to describe
//! Kubernetes-style APIs as data: API groups and their versions, the
//! definitions each version declares, and the closed set of structural
//! types those definitions are built from.
//!
//! The IR is plain immutable data. Resolving references between definitions
//! and merging inherited object shapes is the job of `kure-spec-resolver`;
//! reading and writing descriptor documents is the job of `kure-spec-parser`.

mod api;
mod de;
mod descriptor;
mod identifier;
mod lint_config;
mod meta;
mod path;
mod reference;
mod resource;
mod types;

pub use api::{Api, ApiDependency, ApiGroup, ApiGroupVersion};
pub use descriptor::{ApiVersion, Descriptor, DescriptorKind, Document, API_VERSION};
pub use identifier::{ApiGroupIdentifier, GroupModule};
pub use lint_config::{Lint, LintConfig, LintLevel, LintLevels};
pub use meta::{DefinitionMeta, PropertyMeta};
pub use path::SchemaPath;
pub use reference::{ReferenceKind, ReferenceScope, ReferenceTarget, TypeReference};
pub use resource::{NameScope, ResourceMeta, Subresources};
pub use types::{
    ArrayType, Definition, Kind, MapType, NumberKind, NumberSize, NumberType, ObjectType,
    OptionalType, ParseKindError, Property, ResourceType, StringType, Type, UnionType,
};

use std::fmt;
use thiserror::Error;

/// Errors raised while loading, resolving, or validating API specifications
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("unresolved {scope} reference `{name}` at {path}")]
    UnresolvedReference {
        scope: ReferenceKind,
        name: String,
        path: SchemaPath,
    },

    #[error("unknown dependency package `{package}` at {path}")]
    UnknownDependency { package: String, path: SchemaPath },

    #[error("inheritance cycle {} at {path}", .chain.join(" -> "))]
    InheritanceCycle { chain: Vec<String>, path: SchemaPath },

    #[error("reference cycle {} at {path}", .chain.join(" -> "))]
    ReferenceCycle { chain: Vec<String>, path: SchemaPath },

    #[error("`{name}` resolves to non-object type `{kind}` and cannot be inherited at {path}")]
    InheritedNonObject {
        name: String,
        kind: Kind,
        path: SchemaPath,
    },

    #[error("duplicate {entity} `{name}` at {path}")]
    DuplicateName {
        entity: NameKind,
        name: String,
        path: SchemaPath,
    },

    #[error("unknown type tag `{tag}` at {location}")]
    UnknownTypeTag { tag: String, location: String },

    #[error("unknown field `{field}` at {location}")]
    UnknownField { field: String, location: String },

    #[error("group `{group}` is ambiguous, candidates: {}", .candidates.join(", "))]
    AmbiguousGroup {
        group: String,
        candidates: Vec<String>,
    },

    #[error("union with {members} member(s) at {path}, expected at least 2")]
    DegenerateUnion { members: usize, path: SchemaPath },

    #[error("optional type wraps another optional type at {path}")]
    NestedOptional { path: SchemaPath },

    #[error("reference to deprecated definition `{name}` at {path}")]
    DeprecatedReference { name: String, path: SchemaPath },

    #[error("preferred version `{preferred}` is not a version of group `{group}`")]
    InvalidPreferredVersion {
        group: ApiGroupIdentifier,
        preferred: String,
    },

    #[error("dependency package `{package}` version `{version}` could not be found")]
    PackageNotFound { package: String, version: String },

    #[error("unsupported apiVersion `{found}`, expected `{}`", API_VERSION)]
    ApiVersionMismatch { found: String },

    #[error("unknown descriptor kind `{0}`")]
    UnknownKind(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SpecError {
    /// The declaration this error points at, when it has one
    pub fn path(&self) -> Option<&SchemaPath> {
        match self {
            SpecError::UnresolvedReference { path, .. }
            | SpecError::UnknownDependency { path, .. }
            | SpecError::InheritanceCycle { path, .. }
            | SpecError::ReferenceCycle { path, .. }
            | SpecError::InheritedNonObject { path, .. }
            | SpecError::DuplicateName { path, .. }
            | SpecError::DegenerateUnion { path, .. }
            | SpecError::NestedOptional { path }
            | SpecError::DeprecatedReference { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type for specification operations
pub type Result<T> = std::result::Result<T, SpecError>;

/// The kind of sibling collection a [`SpecError::DuplicateName`] was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Definition,
    Property,
    Group,
    Version,
    GroupVersion,
    Package,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NameKind::Definition => "definition",
            NameKind::Property => "property",
            NameKind::Group => "group",
            NameKind::Version => "version",
            NameKind::GroupVersion => "group version",
            NameKind::Package => "package",
        };
        f.write_str(name)
    }
}
