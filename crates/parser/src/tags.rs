//! Pre-decoding checks on raw documents
//!
//! Serde would reject a bad envelope or type tag too, but only with a
//! generic message. Walking the raw tree first lets us report which tag is
//! wrong and where it sits, using JSON pointer syntax.
//!
//! The walk also rejects keys the IR has no field for. Most IR structs are
//! flattened or internally tagged, which `deny_unknown_fields` cannot
//! handle, so unknown keys would otherwise be dropped on decode.

use kure_spec_common::{DescriptorKind, Kind, Result, SpecError, API_VERSION};
use serde_json::{Map, Value};

const API_FIELDS: &[&str] = &["apiVersion", "kind", "name", "version", "groups"];
const API_GROUP_FIELDS: &[&str] = &[
    "apiVersion",
    "kind",
    "module",
    "name",
    "api",
    "versions",
    "preferredVersion",
];
const API_GROUP_VERSION_FIELDS: &[&str] = &[
    "apiVersion",
    "kind",
    "api",
    "group",
    "version",
    "dependencies",
    "definitions",
];
const GROUP_FIELDS: &[&str] = &["module", "name"];
const DEPENDENCY_FIELDS: &[&str] = &["package", "version"];
const DEFINITION_FIELDS: &[&str] = &["name", "description", "deprecated", "value"];
const PROPERTY_FIELDS: &[&str] = &["name", "description", "deprecated", "required", "value"];
const TARGET_FIELDS: &[&str] = &["scope", "name"];
const SCOPE_FIELDS: &[&str] = &["package", "group", "version"];
const RESOURCE_META_FIELDS: &[&str] = &["name", "singularName", "kind", "scope", "subresources"];
const SUBRESOURCE_FIELDS: &[&str] = &["status", "scale"];

/// Keys a type node of `kind` may carry besides `type`
fn type_fields(kind: Kind) -> &'static [&'static str] {
    match kind {
        Kind::String => &["enum", "format"],
        Kind::Integer | Kind::Float => &["size"],
        Kind::Boolean | Kind::Unknown => &[],
        Kind::Resource => &["properties", "metadata"],
        Kind::Object => &["inherit", "properties"],
        Kind::Map | Kind::Array | Kind::Union => &["values"],
        Kind::Optional => &["value"],
        Kind::Reference => &["target"],
    }
}

/// Check the envelope, every `type` tag and every key of one raw document
pub(crate) fn check_document(value: &Value, source: &str) -> Result<DescriptorKind> {
    let object = value
        .as_object()
        .ok_or_else(|| SpecError::Parse(format!("{}: document is not a mapping", source)))?;

    match object.get("apiVersion").and_then(Value::as_str) {
        Some(API_VERSION) => {}
        Some(other) => {
            return Err(SpecError::ApiVersionMismatch {
                found: other.to_string(),
            })
        }
        None => {
            return Err(SpecError::Parse(format!(
                "{}: missing `apiVersion`",
                source
            )))
        }
    }

    let kind: DescriptorKind = object
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| SpecError::Parse(format!("{}: missing `kind`", source)))?
        .parse()?;

    let root = format!("{}#", source);
    match kind {
        DescriptorKind::Api => {
            check_fields(object, API_FIELDS, &root)?;
            for (i, group) in array(object, "groups").iter().enumerate() {
                check_mapping(group, GROUP_FIELDS, &format!("{}/groups/{}", root, i))?;
            }
        }
        DescriptorKind::ApiGroup => check_fields(object, API_GROUP_FIELDS, &root)?,
        DescriptorKind::ApiGroupVersion => {
            check_fields(object, API_GROUP_VERSION_FIELDS, &root)?;
            if let Some(group) = object.get("group") {
                check_mapping(group, GROUP_FIELDS, &format!("{}/group", root))?;
            }
            for (i, dependency) in array(object, "dependencies").iter().enumerate() {
                check_mapping(
                    dependency,
                    DEPENDENCY_FIELDS,
                    &format!("{}/dependencies/{}", root, i),
                )?;
            }
            for (i, definition) in array(object, "definitions").iter().enumerate() {
                let location = format!("{}/definitions/{}", root, i);
                check_mapping(definition, DEFINITION_FIELDS, &location)?;
                if let Some(ty) = definition.get("value") {
                    check_type(ty, &format!("{}/value", location))?;
                }
            }
        }
    }

    Ok(kind)
}

/// Check the tag and keys of one type node and everything nested below it
fn check_type(value: &Value, location: &str) -> Result<()> {
    // A missing tag is left to serde, which names the missing field
    let Some(tag) = value.get("type").and_then(Value::as_str) else {
        return Ok(());
    };

    let kind: Kind = tag.parse().map_err(|_| SpecError::UnknownTypeTag {
        tag: tag.to_string(),
        location: location.to_string(),
    })?;

    if let Some(object) = value.as_object() {
        if let Some(field) = object
            .keys()
            .find(|key| *key != "type" && !type_fields(kind).contains(&key.as_str()))
        {
            return Err(unknown_field(field, location));
        }
    }

    match kind {
        Kind::Object | Kind::Resource => {
            if let Some(inherit) = value.get("inherit") {
                // `null` would decode like an absent list and not round-trip
                let entries = inherit.as_array().ok_or_else(|| {
                    SpecError::Parse(format!("{}/inherit: expected a list of references", location))
                })?;
                for (i, reference) in entries.iter().enumerate() {
                    check_type(reference, &format!("{}/inherit/{}", location, i))?;
                }
            }
            if let Some(properties) = value.get("properties").and_then(Value::as_array) {
                for (i, property) in properties.iter().enumerate() {
                    let location = format!("{}/properties/{}", location, i);
                    check_mapping(property, PROPERTY_FIELDS, &location)?;
                    if let Some(ty) = property.get("value") {
                        check_type(ty, &format!("{}/value", location))?;
                    }
                }
            }
            if let Some(metadata) = value.get("metadata") {
                let location = format!("{}/metadata", location);
                check_mapping(metadata, RESOURCE_META_FIELDS, &location)?;
                if let Some(subresources) = metadata.get("subresources") {
                    check_mapping(
                        subresources,
                        SUBRESOURCE_FIELDS,
                        &format!("{}/subresources", location),
                    )?;
                }
            }
        }
        Kind::Map | Kind::Array => {
            if let Some(values) = value.get("values") {
                check_type(values, &format!("{}/values", location))?;
            }
        }
        Kind::Union => {
            if let Some(members) = value.get("values").and_then(Value::as_array) {
                for (i, member) in members.iter().enumerate() {
                    check_type(member, &format!("{}/values/{}", location, i))?;
                }
            }
        }
        Kind::Optional => {
            if let Some(inner) = value.get("value") {
                check_type(inner, &format!("{}/value", location))?;
            }
        }
        Kind::Reference => {
            if let Some(target) = value.get("target") {
                let location = format!("{}/target", location);
                check_mapping(target, TARGET_FIELDS, &location)?;
                if let Some(scope) = target.get("scope") {
                    let location = format!("{}/scope", location);
                    check_mapping(scope, SCOPE_FIELDS, &location)?;
                    if let Some(group) = scope.get("group") {
                        check_mapping(group, GROUP_FIELDS, &format!("{}/group", location))?;
                    }
                }
            }
        }
        Kind::String | Kind::Integer | Kind::Float | Kind::Boolean | Kind::Unknown => {}
    }

    Ok(())
}

/// Reject keys outside `allowed`; non-mappings are left to serde
fn check_mapping(value: &Value, allowed: &[&str], location: &str) -> Result<()> {
    match value.as_object() {
        Some(object) => check_fields(object, allowed, location),
        None => Ok(()),
    }
}

fn check_fields(object: &Map<String, Value>, allowed: &[&str], location: &str) -> Result<()> {
    match object.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(field) => Err(unknown_field(field, location)),
        None => Ok(()),
    }
}

fn unknown_field(field: &str, location: &str) -> SpecError {
    SpecError::UnknownField {
        field: field.to_string(),
        location: location.to_string(),
    }
}

fn array<'v>(object: &'v Map<String, Value>, key: &str) -> &'v [Value] {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
