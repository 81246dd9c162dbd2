//! Inheritance merging into effective property sets

use crate::catalogue::{Catalogue, DefinitionId, GroupVersionId};
use kure_spec_common::{
    ObjectType, Property, ReferenceKind, Result, SchemaPath, SpecError, Type,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Fully merged properties of an object, in merge order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveProperties {
    properties: Vec<Property>,
    index: HashMap<String, usize>,
}

impl EffectiveProperties {
    /// Add `property` unless a property with the same name is already present
    ///
    /// Returns whether the property was added.
    pub fn insert_if_absent(&mut self, property: Property) -> bool {
        if self.contains(property.name()) {
            return false;
        }
        self.index
            .insert(property.name().to_string(), self.properties.len());
        self.properties.push(property);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.index.get(name).map(|&i| &self.properties[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(Property::name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Property> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<'a> IntoIterator for &'a EffectiveProperties {
    type Item = &'a Property;
    type IntoIter = std::slice::Iter<'a, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Computes effective properties against a [`Catalogue`]
///
/// Objects are merged in the order `inherit[0], ..., inherit[n], properties`;
/// the first property seen with a given name wins. Merges of named
/// definitions are memoised by [`DefinitionId`], so a base object inherited
/// by many definitions is expanded once. A `Merger` is `Sync` and may be
/// shared between threads.
#[derive(Debug)]
pub struct Merger<'a> {
    catalogue: &'a Catalogue,
    cache: RwLock<HashMap<DefinitionId, Arc<EffectiveProperties>>>,
}

impl<'a> Merger<'a> {
    pub fn new(catalogue: &'a Catalogue) -> Self {
        Self {
            catalogue,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalogue(&self) -> &'a Catalogue {
        self.catalogue
    }

    /// Effective properties of an object declared inside the group version `at`
    pub fn effective_properties(
        &self,
        object: &ObjectType,
        at: &GroupVersionId,
    ) -> Result<EffectiveProperties> {
        self.effective_properties_at(object, at, &at.path())
    }

    /// Like [`Merger::effective_properties`], reporting errors at `path`
    pub fn effective_properties_at(
        &self,
        object: &ObjectType,
        at: &GroupVersionId,
        path: &SchemaPath,
    ) -> Result<EffectiveProperties> {
        self.merge_object(object, at, path, &mut Vec::new())
    }

    /// Effective properties of a named `object` or `resource` definition
    ///
    /// Alias definitions are followed to the shape they name.
    pub fn effective_properties_of(&self, id: &DefinitionId) -> Result<Arc<EffectiveProperties>> {
        self.merge_named(id, &mut Vec::new())
    }

    /// Number of memoised definitions
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    fn merge_named(
        &self,
        id: &DefinitionId,
        stack: &mut Vec<DefinitionId>,
    ) -> Result<Arc<EffectiveProperties>> {
        let cached = self.cache.read().get(id).cloned();
        if let Some(cached) = cached {
            return Ok(cached);
        }

        let path = id.path();
        if let Some(pos) = stack.iter().position(|seen| seen == id) {
            let mut chain: Vec<String> = stack[pos..].iter().map(ToString::to_string).collect();
            chain.push(id.to_string());
            return Err(SpecError::InheritanceCycle { chain, path });
        }

        let definition =
            self.catalogue
                .definition(id)
                .ok_or_else(|| SpecError::UnresolvedReference {
                    scope: ReferenceKind::Local,
                    name: id.name.clone(),
                    path: path.clone(),
                })?;

        let at = &id.group_version;
        stack.push(id.clone());
        let merged = match &definition.value {
            Type::Object(object) => self.merge_object(object, at, &path, stack),
            Type::Resource(resource) => Ok(own_properties(&resource.properties)),
            Type::Reference(reference) => self
                .catalogue
                .resolve_shape(reference, at, &path)
                .and_then(|resolved| self.merge_named(&resolved.id(), stack))
                .map(|merged| (*merged).clone()),
            other => Err(SpecError::InheritedNonObject {
                name: id.to_string(),
                kind: other.kind(),
                path: path.clone(),
            }),
        };
        stack.pop();

        let merged = Arc::new(merged?);
        trace!(definition = %id, properties = merged.len(), "merged definition");
        let mut cache = self.cache.write();
        Ok(Arc::clone(cache.entry(id.clone()).or_insert(merged)))
    }

    fn merge_object(
        &self,
        object: &ObjectType,
        at: &GroupVersionId,
        path: &SchemaPath,
        stack: &mut Vec<DefinitionId>,
    ) -> Result<EffectiveProperties> {
        let mut merged = EffectiveProperties::default();

        for reference in object.inherited() {
            let resolved = self.catalogue.resolve_shape(reference, at, path)?;
            match &resolved.definition.value {
                Type::Object(_) | Type::Resource(_) => {}
                other => {
                    return Err(SpecError::InheritedNonObject {
                        name: reference.to_string(),
                        kind: other.kind(),
                        path: path.clone(),
                    })
                }
            }

            let inherited = self.merge_named(&resolved.id(), stack)?;
            for property in inherited.iter() {
                merged.insert_if_absent(property.clone());
            }
        }

        for property in &object.properties {
            if !merged.insert_if_absent(property.clone()) {
                trace!(property = property.name(), at = %path, "property shadowed by inherited one");
            }
        }
        Ok(merged)
    }
}

fn own_properties(properties: &[Property]) -> EffectiveProperties {
    let mut merged = EffectiveProperties::default();
    for property in properties {
        merged.insert_if_absent(property.clone());
    }
    merged
}
