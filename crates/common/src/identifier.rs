//! Naming primitives for API groups

use serde::{Deserialize, Serialize};
use std::fmt;

/// The Kure-local module an API group lives in
///
/// Encoded as `null` for the API's default group and as a string otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum GroupModule {
    /// The default group of its API
    #[default]
    Default,
    /// A named module, relative to the API
    Named(String),
}

impl From<Option<String>> for GroupModule {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(module) => GroupModule::Named(module),
            None => GroupModule::Default,
        }
    }
}

impl From<GroupModule> for Option<String> {
    fn from(value: GroupModule) -> Self {
        match value {
            GroupModule::Default => None,
            GroupModule::Named(module) => Some(module),
        }
    }
}

/// The identity of an API group
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApiGroupIdentifier {
    /// The relative Kure name of the group, or the API's default group
    ///
    /// Always written, as `null` for the default group.
    #[serde(deserialize_with = "crate::de::required")]
    pub module: GroupModule,

    /// The Kubernetes API group name, like `apps` or `cert-manager.io`
    pub name: String,
}

impl ApiGroupIdentifier {
    /// The Kubernetes core group (empty wire name) as the API's default group
    pub fn core() -> Self {
        Self {
            module: GroupModule::Default,
            name: String::new(),
        }
    }

    /// The default group of an API, with the given wire name
    pub fn default_group(name: &str) -> Self {
        Self {
            module: GroupModule::Default,
            name: name.to_string(),
        }
    }

    /// A group living in a named module
    pub fn named(module: &str, name: &str) -> Self {
        Self {
            module: GroupModule::Named(module.to_string()),
            name: name.to_string(),
        }
    }

    /// Whether this is the legacy core group (`""` on the wire)
    pub fn is_core(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Display for ApiGroupIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_core() {
            f.write_str("core")
        } else {
            f.write_str(&self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_module_is_default_group() {
        let id: ApiGroupIdentifier =
            serde_json::from_value(json!({"module": null, "name": "apps"})).unwrap();
        assert_eq!(id.module, GroupModule::Default);
        assert_eq!(id, ApiGroupIdentifier::default_group("apps"));
    }

    #[test]
    fn test_missing_module_is_rejected() {
        let result: Result<ApiGroupIdentifier, _> = serde_json::from_value(json!({"name": "apps"}));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("missing field `module`"), "{}", err);
    }

    #[test]
    fn test_module_serializes_as_null_or_string() {
        let default = serde_json::to_value(ApiGroupIdentifier::default_group("apps")).unwrap();
        assert_eq!(default, json!({"module": null, "name": "apps"}));

        let named = serde_json::to_value(ApiGroupIdentifier::named("certs", "cert-manager.io"))
            .unwrap();
        assert_eq!(named, json!({"module": "certs", "name": "cert-manager.io"}));
    }

    #[test]
    fn test_core_display() {
        assert_eq!(ApiGroupIdentifier::core().to_string(), "core");
        assert_eq!(ApiGroupIdentifier::named("a", "apps").to_string(), "apps");
    }
}
