//! Reference resolution across group versions and packages

use crate::catalogue::{Catalogue, DefinitionId, GroupVersionId, Origin};
use kure_spec_common::{
    ApiGroupVersion, Definition, ReferenceScope, Result, SchemaPath, SpecError, Type,
    TypeReference,
};
use tracing::trace;

/// A reference resolved to its target definition
#[derive(Debug, Clone, Copy)]
pub struct ResolvedDefinition<'a> {
    pub definition: &'a Definition,
    pub group_version: &'a ApiGroupVersion,
    id: &'a GroupVersionId,
}

impl<'a> ResolvedDefinition<'a> {
    /// The group version declaring the target
    pub fn location(&self) -> &'a GroupVersionId {
        self.id
    }

    pub fn id(&self) -> DefinitionId {
        self.id.definition(self.definition.name())
    }
}

impl Catalogue {
    /// Resolve `reference` as written inside the group version `from`
    ///
    /// Lookup is pure: the same reference against the same catalogue always
    /// yields the same definition. A target that is itself a reference is
    /// returned as is; see [`Catalogue::resolve_shape`].
    pub fn resolve(
        &self,
        reference: &TypeReference,
        from: &GroupVersionId,
    ) -> Result<ResolvedDefinition<'_>> {
        self.resolve_at(reference, from, &from.path())
    }

    /// Like [`Catalogue::resolve`], reporting errors at `path`
    pub fn resolve_at(
        &self,
        reference: &TypeReference,
        from: &GroupVersionId,
        path: &SchemaPath,
    ) -> Result<ResolvedDefinition<'_>> {
        let kind = reference.kind();
        let unresolved = || SpecError::UnresolvedReference {
            scope: kind,
            name: reference.to_string(),
            path: path.clone(),
        };

        let target = match &reference.target.scope {
            None => from.clone(),
            Some(ReferenceScope {
                package: None,
                group,
                version,
            }) => GroupVersionId::new(from.origin.clone(), group.clone(), version),
            Some(ReferenceScope {
                package: Some(package),
                group,
                version,
            }) => {
                let source = self.group_version(from).ok_or_else(unresolved)?;
                let dependency =
                    source
                        .dependency(package)
                        .ok_or_else(|| SpecError::UnknownDependency {
                            package: package.clone(),
                            path: path.clone(),
                        })?;
                GroupVersionId::new(Origin::package(dependency), group.clone(), version)
            }
        };

        let (id, group_version) = self.entry(&target).ok_or_else(unresolved)?;
        let definition = group_version
            .definition(reference.name())
            .ok_or_else(unresolved)?;

        trace!(reference = %reference, from = %from, target = %id, "resolved reference");
        Ok(ResolvedDefinition {
            definition,
            group_version,
            id,
        })
    }

    /// Resolve a reference and follow alias definitions until a non-reference
    /// type is reached
    pub fn resolve_shape(
        &self,
        reference: &TypeReference,
        from: &GroupVersionId,
        path: &SchemaPath,
    ) -> Result<ResolvedDefinition<'_>> {
        let mut resolved = self.resolve_at(reference, from, path)?;
        let mut seen = vec![resolved.id()];

        loop {
            let definition = resolved.definition;
            let Type::Reference(next) = &definition.value else {
                return Ok(resolved);
            };

            resolved = self.resolve_at(next, resolved.location(), path)?;
            let id = resolved.id();
            if seen.contains(&id) {
                let mut chain: Vec<String> = seen.iter().map(ToString::to_string).collect();
                chain.push(id.to_string());
                return Err(SpecError::ReferenceCycle {
                    chain,
                    path: path.clone(),
                });
            }
            seen.push(id);
        }
    }
}
