//! Kubernetes-facing metadata of resource types

use serde::{Deserialize, Serialize};
use std::fmt;

/// The metadata of a [`crate::ResourceType`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMeta {
    /// Plural resource name, like `deployments`
    pub name: String,
    pub singular_name: String,
    pub kind: String,
    pub scope: NameScope,
    pub subresources: Subresources,
}

/// Whether a resource's names are unique per cluster or per namespace
///
/// There is no default; every resource declares one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameScope {
    Cluster,
    Namespace,
}

impl fmt::Display for NameScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameScope::Cluster => f.write_str("cluster"),
            NameScope::Namespace => f.write_str("namespace"),
        }
    }
}

/// The subresources available on a resource
///
/// Both flags are always present on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subresources {
    pub status: bool,
    pub scale: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subresources_are_never_omitted() {
        let value = serde_json::to_value(Subresources::default()).unwrap();
        assert_eq!(value, json!({"status": false, "scale": false}));
    }

    #[test]
    fn test_missing_subresource_flag_is_rejected() {
        let result: Result<Subresources, _> = serde_json::from_value(json!({"status": true}));
        assert!(result.is_err());
    }

    #[test]
    fn test_scope_is_required() {
        let result: Result<ResourceMeta, _> = serde_json::from_value(json!({
            "name": "pods",
            "singularName": "pod",
            "kind": "Pod",
            "subresources": {"status": true, "scale": false}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_meta_field_names() {
        let meta = ResourceMeta {
            name: "deployments".to_string(),
            singular_name: "deployment".to_string(),
            kind: "Deployment".to_string(),
            scope: NameScope::Namespace,
            subresources: Subresources {
                status: true,
                scale: true,
            },
        };
        assert_eq!(
            serde_json::to_value(&meta).unwrap(),
            json!({
                "name": "deployments",
                "singularName": "deployment",
                "kind": "Deployment",
                "scope": "namespace",
                "subresources": {"status": true, "scale": true}
            })
        );
        assert_eq!(meta.scope.to_string(), "namespace");
    }
}
