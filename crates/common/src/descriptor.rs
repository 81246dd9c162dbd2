//! The `spec.kure.sh` document envelope

use crate::{Api, ApiGroup, ApiGroupVersion, SpecError};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The only `apiVersion` a descriptor document may carry
pub const API_VERSION: &str = "spec.kure.sh/v1alpha1";

/// Marker for the `apiVersion` field; rejects anything but [`API_VERSION`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApiVersion;

impl Serialize for ApiVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(API_VERSION)
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        if value == API_VERSION {
            Ok(ApiVersion)
        } else {
            Err(de::Error::custom(format!(
                "unsupported apiVersion `{}`, expected `{}`",
                value, API_VERSION
            )))
        }
    }
}

/// A descriptor body, discriminated by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Descriptor {
    #[serde(rename = "API")]
    Api(Api),
    #[serde(rename = "APIGroup")]
    ApiGroup(ApiGroup),
    #[serde(rename = "APIGroupVersion")]
    ApiGroupVersion(ApiGroupVersion),
}

impl Descriptor {
    pub fn kind(&self) -> DescriptorKind {
        match self {
            Descriptor::Api(_) => DescriptorKind::Api,
            Descriptor::ApiGroup(_) => DescriptorKind::ApiGroup,
            Descriptor::ApiGroupVersion(_) => DescriptorKind::ApiGroupVersion,
        }
    }
}

/// The `kind` values a descriptor may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Api,
    ApiGroup,
    ApiGroupVersion,
}

impl DescriptorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptorKind::Api => "API",
            DescriptorKind::ApiGroup => "APIGroup",
            DescriptorKind::ApiGroupVersion => "APIGroupVersion",
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DescriptorKind {
    type Err = SpecError;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            "API" => Ok(DescriptorKind::Api),
            "APIGroup" => Ok(DescriptorKind::ApiGroup),
            "APIGroupVersion" => Ok(DescriptorKind::ApiGroupVersion),
            other => Err(SpecError::UnknownKind(other.to_string())),
        }
    }
}

/// A complete top-level document: envelope plus descriptor body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "apiVersion")]
    pub api_version: ApiVersion,

    #[serde(flatten)]
    pub descriptor: Descriptor,
}

impl From<Descriptor> for Document {
    fn from(descriptor: Descriptor) -> Self {
        Self {
            api_version: ApiVersion,
            descriptor,
        }
    }
}
