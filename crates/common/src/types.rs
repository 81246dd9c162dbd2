//! The closed set of structural types a definition can declare

use crate::meta::{DefinitionMeta, PropertyMeta};
use crate::reference::{tagged_references, TypeReference};
use crate::resource::ResourceMeta;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A type declared by an API group version
///
/// Tagged by its `type` field. The set of tags is closed; see [`Kind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Type {
    String(StringType),
    Integer(NumberType),
    Float(NumberType),
    Boolean,
    Resource(ResourceType),
    Object(ObjectType),
    Map(MapType),
    Array(ArrayType),
    Union(UnionType),
    Optional(OptionalType),
    Unknown,
    Reference(TypeReference),
}

/// The `type` tag of a [`Type`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    String,
    Integer,
    Float,
    Boolean,
    Resource,
    Object,
    Map,
    Array,
    Union,
    Optional,
    Unknown,
    Reference,
}

impl Kind {
    /// Every tag, in declaration order
    pub const ALL: [Kind; 12] = [
        Kind::String,
        Kind::Integer,
        Kind::Float,
        Kind::Boolean,
        Kind::Resource,
        Kind::Object,
        Kind::Map,
        Kind::Array,
        Kind::Union,
        Kind::Optional,
        Kind::Unknown,
        Kind::Reference,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::Boolean => "boolean",
            Kind::Resource => "resource",
            Kind::Object => "object",
            Kind::Map => "map",
            Kind::Array => "array",
            Kind::Union => "union",
            Kind::Optional => "optional",
            Kind::Unknown => "unknown",
            Kind::Reference => "reference",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `type` tag outside the closed set
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown type tag `{0}`")]
pub struct ParseKindError(pub String);

impl FromStr for Kind {
    type Err = ParseKindError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == tag)
            .ok_or_else(|| ParseKindError(tag.to_string()))
    }
}

/// A string, optionally restricted to a set of literals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringType {
    /// Legal values; `None` means unconstrained
    #[serde(rename = "enum")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Whether a number is integral or floating point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Integer,
    Float,
}

/// Advisory precision of a number, in bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NumberSize {
    Bits32,
    Bits64,
}

impl TryFrom<u8> for NumberSize {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            32 => Ok(NumberSize::Bits32),
            64 => Ok(NumberSize::Bits64),
            other => Err(format!("invalid number size {}, expected 32 or 64", other)),
        }
    }
}

impl From<NumberSize> for u8 {
    fn from(value: NumberSize) -> Self {
        match value {
            NumberSize::Bits32 => 32,
            NumberSize::Bits64 => 64,
        }
    }
}

/// An `integer` or `float`; the kind is carried by the [`Type`] variant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberType {
    /// `None` means the platform-natural width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<NumberSize>,
}

/// A Kubernetes resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
    #[serde(default)]
    pub properties: Vec<Property>,

    pub metadata: ResourceMeta,
}

/// A structural record, optionally inheriting the shape of other objects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectType {
    /// Objects whose properties are merged in, earliest first
    ///
    /// An empty list and an absent one are kept distinct for round-tripping.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "tagged_references")]
    pub inherit: Option<Vec<TypeReference>>,

    #[serde(default)]
    pub properties: Vec<Property>,
}

impl ObjectType {
    pub fn new(properties: Vec<Property>) -> Self {
        Self {
            inherit: None,
            properties,
        }
    }

    pub fn inheriting(mut self, reference: TypeReference) -> Self {
        self.inherit.get_or_insert_with(Vec::new).push(reference);
        self
    }

    /// The inherited references, empty when `inherit` is absent
    pub fn inherited(&self) -> &[TypeReference] {
        self.inherit.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapType {
    pub values: Box<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayType {
    pub values: Box<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionType {
    pub values: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalType {
    pub value: Box<Type>,
}

/// A named field of an object or resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    #[serde(flatten)]
    pub meta: PropertyMeta,

    pub value: Type,
}

impl Property {
    pub fn new(name: &str, value: Type) -> Self {
        Self {
            meta: PropertyMeta::new(name),
            value,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.meta.required = Some(required);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.meta.definition.description = Some(description.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.meta.definition.name
    }

    pub fn is_required(&self) -> bool {
        self.meta.required.unwrap_or(false)
    }
}

/// A named, documented declaration of a [`Type`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition<T = Type> {
    #[serde(flatten)]
    pub meta: DefinitionMeta,

    pub value: T,
}

impl<T> Definition<T> {
    pub fn new(name: &str, value: T) -> Self {
        Self {
            meta: DefinitionMeta::new(name),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.meta = self.meta.with_description(description);
        self
    }

    /// Mark this definition as deprecated
    pub fn deprecated(mut self) -> Self {
        self.meta = self.meta.deprecated();
        self
    }

    pub fn is_deprecated(&self) -> bool {
        self.meta.deprecated
    }
}

impl Type {
    pub fn string() -> Self {
        Type::String(StringType::default())
    }

    pub fn string_enum<S: AsRef<str>>(values: &[S]) -> Self {
        Type::String(StringType {
            enum_values: Some(values.iter().map(|v| v.as_ref().to_string()).collect()),
            format: None,
        })
    }

    pub fn number(kind: NumberKind, size: Option<NumberSize>) -> Self {
        let number = NumberType { size };
        match kind {
            NumberKind::Integer => Type::Integer(number),
            NumberKind::Float => Type::Float(number),
        }
    }

    pub fn object(properties: Vec<Property>) -> Self {
        Type::Object(ObjectType::new(properties))
    }

    pub fn map(values: Type) -> Self {
        Type::Map(MapType {
            values: Box::new(values),
        })
    }

    pub fn array(values: Type) -> Self {
        Type::Array(ArrayType {
            values: Box::new(values),
        })
    }

    pub fn union(values: Vec<Type>) -> Self {
        Type::Union(UnionType { values })
    }

    pub fn optional(value: Type) -> Self {
        Type::Optional(OptionalType {
            value: Box::new(value),
        })
    }

    pub fn reference(reference: TypeReference) -> Self {
        Type::Reference(reference)
    }

    /// The active `type` tag
    pub fn kind(&self) -> Kind {
        match self {
            Type::String(_) => Kind::String,
            Type::Integer(_) => Kind::Integer,
            Type::Float(_) => Kind::Float,
            Type::Boolean => Kind::Boolean,
            Type::Resource(_) => Kind::Resource,
            Type::Object(_) => Kind::Object,
            Type::Map(_) => Kind::Map,
            Type::Array(_) => Kind::Array,
            Type::Union(_) => Kind::Union,
            Type::Optional(_) => Kind::Optional,
            Type::Unknown => Kind::Unknown,
            Type::Reference(_) => Kind::Reference,
        }
    }

    /// The number representation, for `integer` and `float`
    pub fn as_number(&self) -> Option<(NumberKind, &NumberType)> {
        match self {
            Type::Integer(number) => Some((NumberKind::Integer, number)),
            Type::Float(number) => Some((NumberKind::Float, number)),
            _ => None,
        }
    }

    /// Own properties, for `object` and `resource`
    pub fn properties(&self) -> Option<&[Property]> {
        match self {
            Type::Object(object) => Some(&object.properties),
            Type::Resource(resource) => Some(&resource.properties),
            _ => None,
        }
    }

    /// Visit this type and every type nested inside it, depth first
    ///
    /// The visitor receives the path of segments leading to each type:
    /// property names, `[]` for array items, `{}` for map values, `|N` for
    /// union members and `?` for the inside of an optional.
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a Type, &[String]),
    {
        let mut path = Vec::new();
        self.walk_at(&mut path, visit);
    }

    fn walk_at<'a, F>(&'a self, path: &mut Vec<String>, visit: &mut F)
    where
        F: FnMut(&'a Type, &[String]),
    {
        visit(self, path);

        match self {
            Type::Object(ObjectType { properties, .. })
            | Type::Resource(ResourceType { properties, .. }) => {
                for property in properties {
                    path.push(property.name().to_string());
                    property.value.walk_at(path, visit);
                    path.pop();
                }
            }
            Type::Map(MapType { values }) => {
                path.push("{}".to_string());
                values.walk_at(path, visit);
                path.pop();
            }
            Type::Array(ArrayType { values }) => {
                path.push("[]".to_string());
                values.walk_at(path, visit);
                path.pop();
            }
            Type::Union(UnionType { values }) => {
                for (i, member) in values.iter().enumerate() {
                    path.push(format!("|{}", i));
                    member.walk_at(path, visit);
                    path.pop();
                }
            }
            Type::Optional(OptionalType { value }) => {
                path.push("?".to_string());
                value.walk_at(path, visit);
                path.pop();
            }
            Type::String(_)
            | Type::Integer(_)
            | Type::Float(_)
            | Type::Boolean
            | Type::Unknown
            | Type::Reference(_) => {}
        }
    }

    /// Every `reference` type nested in this type, with its path
    ///
    /// Inheritance lists are not included; those are followed by merging.
    pub fn references(&self) -> Vec<(Vec<String>, &TypeReference)> {
        let mut found = Vec::new();
        self.walk(&mut |ty, path| {
            if let Type::Reference(reference) = ty {
                found.push((path.to_vec(), reference));
            }
        });
        found
    }
}
