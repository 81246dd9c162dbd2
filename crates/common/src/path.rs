//! Locations of declarations inside a catalogue of API group versions

use crate::ApiGroupIdentifier;
use std::fmt;

/// Identifies where in the IR a declaration lives
///
/// Rendered as `origin:group/version Definition.property.path`, where
/// `origin` is the API name (or `package@version` for external packages).
/// Any missing leading part is omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SchemaPath {
    pub origin: Option<String>,
    pub group: Option<ApiGroupIdentifier>,
    pub version: Option<String>,
    pub definition: Option<String>,
    pub properties: Vec<String>,
}

impl SchemaPath {
    /// Path of a group version within an API or package
    pub fn group_version(origin: &str, group: &ApiGroupIdentifier, version: &str) -> Self {
        Self {
            origin: Some(origin.to_string()),
            group: Some(group.clone()),
            version: Some(version.to_string()),
            definition: None,
            properties: Vec::new(),
        }
    }

    /// Narrow this path to a definition
    pub fn definition(&self, name: &str) -> Self {
        Self {
            definition: Some(name.to_string()),
            properties: Vec::new(),
            ..self.clone()
        }
    }

    /// Append one property segment
    pub fn property(&self, segment: &str) -> Self {
        let mut path = self.clone();
        path.properties.push(segment.to_string());
        path
    }

    /// Append a sequence of segments as produced by [`crate::Type::walk`]
    pub fn properties<S: AsRef<str>>(&self, segments: &[S]) -> Self {
        let mut path = self.clone();
        path.properties
            .extend(segments.iter().map(|s| s.as_ref().to_string()));
        path
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;

        if let Some(origin) = &self.origin {
            write!(f, "{}:", origin)?;
        }
        if let Some(group) = &self.group {
            write!(f, "{}", group)?;
            wrote = true;
        }
        if let Some(version) = &self.version {
            write!(f, "/{}", version)?;
            wrote = true;
        }
        if let Some(definition) = &self.definition {
            if wrote {
                f.write_str(" ")?;
            }
            f.write_str(definition)?;
            wrote = true;
        }
        for segment in &self.properties {
            if wrote {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
            wrote = true;
        }
        if !wrote && self.origin.is_none() {
            f.write_str("<root>")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_full_path() {
        let group = ApiGroupIdentifier::named("apps", "apps");
        let path = SchemaPath::group_version("kubernetes", &group, "v1")
            .definition("Deployment")
            .property("spec")
            .property("template");
        assert_eq!(path.to_string(), "kubernetes:apps/v1 Deployment.spec.template");
    }

    #[test]
    fn test_definition_resets_properties() {
        let base = SchemaPath::group_version("k", &ApiGroupIdentifier::core(), "v1")
            .definition("A")
            .property("x");
        let other = base.definition("B");
        assert!(other.properties.is_empty());
        assert_eq!(other.to_string(), "k:core/v1 B");
    }

    #[test]
    fn test_empty_path() {
        assert_eq!(SchemaPath::default().to_string(), "<root>");
    }
}
