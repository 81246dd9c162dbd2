//! Metadata shared by every declared entity

use serde::{Deserialize, Serialize};

/// The metadata fields available on every [`crate::Definition`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionMeta {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Either absent or `true`; an explicit `false` is rejected
    #[serde(default, skip_serializing_if = "is_false", deserialize_with = "crate::de::only_true")]
    pub deprecated: bool,
}

impl DefinitionMeta {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            deprecated: false,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

/// The metadata fields available on every [`crate::Property`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMeta {
    #[serde(flatten)]
    pub definition: DefinitionMeta,

    /// Absent and `false` are kept distinct for round-tripping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl PropertyMeta {
    pub fn new(name: &str) -> Self {
        Self {
            definition: DefinitionMeta::new(name),
            required: None,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
