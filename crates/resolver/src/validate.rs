//! Whole-catalogue validation and linting

use crate::catalogue::{Catalogue, GroupVersionId};
use crate::merge::Merger;
use kure_spec_common::{
    ApiGroupVersion, Definition, Lint, LintConfig, LintLevel, NameKind, SchemaPath, SpecError,
    Type, TypeReference,
};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// How serious a [`Diagnostic`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A single validation finding
#[derive(Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub error: SpecError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.error)
    }
}

/// Every finding of a validation run, in discovery order
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &SpecError> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &SpecError> {
        self.with_severity(Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// No errors and no warnings
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &SpecError> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity == severity)
            .map(|d| &d.error)
    }

    fn error(&mut self, error: SpecError) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            error,
        });
    }
}

/// Checks every locally declared descriptor in a [`Catalogue`]
///
/// Dependency packages are only used as resolution targets and are not
/// validated themselves. A failing definition does not stop validation of
/// the others.
pub struct Validator<'a> {
    catalogue: &'a Catalogue,
    config: LintConfig,
    merger: Merger<'a>,
}

impl<'a> Validator<'a> {
    pub fn new(catalogue: &'a Catalogue, config: LintConfig) -> Self {
        Self {
            catalogue,
            config,
            merger: Merger::new(catalogue),
        }
    }

    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        for api in self.catalogue.apis() {
            api.check().into_iter().for_each(|e| report.error(e));
        }
        for group in self.catalogue.groups() {
            group.check().into_iter().for_each(|e| report.error(e));
        }

        for (id, group_version) in self.catalogue.local_group_versions() {
            self.validate_group_version(id, group_version, &mut report);
        }

        debug!(
            diagnostics = report.diagnostics.len(),
            errors = report.errors().count(),
            "validated catalogue"
        );
        report
    }

    fn validate_group_version(
        &self,
        id: &GroupVersionId,
        group_version: &ApiGroupVersion,
        report: &mut ValidationReport,
    ) {
        debug!(group_version = %id, "validating group version");
        group_version
            .duplicate_definitions()
            .into_iter()
            .for_each(|e| report.error(e));

        for definition in &group_version.definitions {
            self.validate_definition(id, definition, report);
        }
    }

    fn validate_definition(
        &self,
        at: &GroupVersionId,
        definition: &Definition,
        report: &mut ValidationReport,
    ) {
        let base = at.path().definition(definition.name());

        // Inheritance of the definition itself goes through the memoised merge
        if let Type::Object(object) = &definition.value {
            if !object.inherited().is_empty() {
                if let Err(e) = self.merger.effective_properties_of(&at.definition(definition.name())) {
                    report.error(e);
                }
            }
        }

        definition.value.walk(&mut |ty, segments| {
            let path = base.properties(segments);
            match ty {
                Type::Object(object) => {
                    duplicate_properties(object.properties.iter().map(|p| p.name()), &path, report);
                    if !segments.is_empty() && !object.inherited().is_empty() {
                        if let Err(e) = self.merger.effective_properties_at(object, at, &path) {
                            report.error(e);
                        }
                    }
                    // Unresolvable entries are already reported by the merge
                    for reference in object.inherited() {
                        if let Ok(resolved) = self.catalogue.resolve_at(reference, at, &path) {
                            if resolved.definition.is_deprecated() {
                                self.deprecated_reference(reference, path.clone(), report);
                            }
                        }
                    }
                }
                Type::Resource(resource) => {
                    duplicate_properties(resource.properties.iter().map(|p| p.name()), &path, report);
                }
                Type::Union(union) if union.values.len() < 2 => self.lint(
                    Lint::DegenerateUnion,
                    SpecError::DegenerateUnion {
                        members: union.values.len(),
                        path,
                    },
                    report,
                ),
                Type::Optional(optional) if matches!(*optional.value, Type::Optional(_)) => {
                    self.lint(Lint::NestedOptional, SpecError::NestedOptional { path }, report)
                }
                Type::Reference(reference) => {
                    match self.catalogue.resolve_at(reference, at, &path) {
                        Ok(resolved) if resolved.definition.is_deprecated() => {
                            self.deprecated_reference(reference, path, report)
                        }
                        Ok(_) => {}
                        Err(e) => report.error(e),
                    }
                }
                _ => {}
            }
        });
    }

    fn deprecated_reference(
        &self,
        reference: &TypeReference,
        path: SchemaPath,
        report: &mut ValidationReport,
    ) {
        let error = SpecError::DeprecatedReference {
            name: reference.to_string(),
            path,
        };
        self.lint(Lint::DeprecatedReference, error, report);
    }

    fn lint(&self, lint: Lint, error: SpecError, report: &mut ValidationReport) {
        let severity = match self.config.level(lint) {
            LintLevel::Allow => return,
            LintLevel::Warn => Severity::Warning,
            LintLevel::Deny => Severity::Error,
        };
        if severity == Severity::Warning {
            warn!(lint = %lint, "{}", error);
        }
        report.diagnostics.push(Diagnostic { severity, error });
    }
}

fn duplicate_properties<'n, I>(names: I, path: &SchemaPath, report: &mut ValidationReport)
where
    I: Iterator<Item = &'n str>,
{
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            report.error(SpecError::DuplicateName {
                entity: NameKind::Property,
                name: name.to_string(),
                path: path.property(name),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kure_spec_common::{
        Api, ApiGroup, ApiGroupIdentifier, Descriptor, Document, ObjectType, Property,
        TypeReference,
    };

    fn validate(definitions: Vec<Definition>, config: LintConfig) -> ValidationReport {
        let mut group_version =
            ApiGroupVersion::new("kubernetes", ApiGroupIdentifier::core(), "v1");
        group_version.definitions = definitions;
        let mut builder = Catalogue::builder();
        builder.add_group_version(group_version).unwrap();
        let catalogue = builder.build();
        Validator::new(&catalogue, config).validate()
    }

    #[test]
    fn test_clean_catalogue() {
        let report = validate(
            vec![
                Definition::new("Base", Type::object(vec![Property::new("a", Type::string())])),
                Definition::new(
                    "Node",
                    Type::Object(
                        ObjectType::new(vec![Property::new(
                            "children",
                            Type::array(Type::reference(TypeReference::local("Node"))),
                        )])
                        .inheriting(TypeReference::local("Base")),
                    ),
                ),
            ],
            LintConfig::default(),
        );
        assert!(report.is_clean(), "{:?}", report);
    }

    #[test]
    fn test_duplicate_definitions_and_properties() {
        let report = validate(
            vec![
                Definition::new(
                    "Pod",
                    Type::object(vec![
                        Property::new("spec", Type::string()),
                        Property::new("spec", Type::string()),
                    ]),
                ),
                Definition::new("Pod", Type::string()),
            ],
            LintConfig::default(),
        );
        let rendered: Vec<String> = report.errors().map(ToString::to_string).collect();
        assert_eq!(rendered.len(), 2);
        assert!(rendered.iter().any(|e| e.contains("duplicate definition `Pod`")));
        assert!(rendered
            .iter()
            .any(|e| e.contains("duplicate property `spec` at kubernetes:core/v1 Pod.spec")));
    }

    #[test]
    fn test_unresolved_reference_in_nested_type() {
        let report = validate(
            vec![Definition::new(
                "Pod",
                Type::object(vec![Property::new(
                    "volumes",
                    Type::map(Type::reference(TypeReference::local("Volume"))),
                )]),
            )],
            LintConfig::default(),
        );
        let errors: Vec<&SpecError> = report.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].path().unwrap().to_string(),
            "kubernetes:core/v1 Pod.volumes.{}"
        );
    }

    #[test]
    fn test_one_failing_definition_does_not_hide_others() {
        let report = validate(
            vec![
                Definition::new("A", Type::reference(TypeReference::local("Missing"))),
                Definition::new(
                    "B",
                    Type::Object(ObjectType::new(vec![]).inheriting(TypeReference::local("B"))),
                ),
            ],
            LintConfig::default(),
        );
        let errors: Vec<&SpecError> = report.errors().collect();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], SpecError::UnresolvedReference { .. }));
        assert!(matches!(errors[1], SpecError::InheritanceCycle { .. }));
    }

    #[test]
    fn test_nested_anonymous_object_inheritance_is_checked() {
        let report = validate(
            vec![
                Definition::new("Name", Type::string()),
                Definition::new(
                    "Pod",
                    Type::object(vec![Property::new(
                        "spec",
                        Type::Object(ObjectType::new(vec![]).inheriting(TypeReference::local("Name"))),
                    )]),
                ),
            ],
            LintConfig::default(),
        );
        assert!(matches!(
            report.errors().next(),
            Some(SpecError::InheritedNonObject { .. })
        ));
    }

    #[test]
    fn test_lint_levels() {
        let definitions = || {
            vec![
                Definition::new("Old", Type::string()).deprecated(),
                Definition::new(
                    "Pod",
                    Type::object(vec![
                        Property::new("single", Type::union(vec![Type::string()])),
                        Property::new("twice", Type::optional(Type::optional(Type::string()))),
                        Property::new("old", Type::reference(TypeReference::local("Old"))),
                    ]),
                ),
            ]
        };

        let report = validate(definitions(), LintConfig::default());
        assert!(matches!(
            report.errors().collect::<Vec<_>>()[..],
            [SpecError::DegenerateUnion { members: 1, .. }]
        ));
        assert!(matches!(
            report.warnings().collect::<Vec<_>>()[..],
            [SpecError::NestedOptional { .. }]
        ));

        let mut config = LintConfig::default();
        config.set(Lint::DegenerateUnion, LintLevel::Allow);
        config.set(Lint::NestedOptional, LintLevel::Allow);
        config.set(Lint::DeprecatedReference, LintLevel::Deny);
        let report = validate(definitions(), config);
        assert!(matches!(
            report.errors().collect::<Vec<_>>()[..],
            [SpecError::DeprecatedReference { .. }]
        ));
        assert_eq!(report.warnings().count(), 0);
    }

    #[test]
    fn test_inheriting_deprecated_object_is_linted() {
        let mut config = LintConfig::default();
        config.set(Lint::DeprecatedReference, LintLevel::Deny);
        let report = validate(
            vec![
                Definition::new("Old", Type::object(vec![Property::new("a", Type::string())]))
                    .deprecated(),
                Definition::new(
                    "Child",
                    Type::Object(ObjectType::new(vec![]).inheriting(TypeReference::local("Old"))),
                ),
            ],
            config,
        );
        let errors: Vec<String> = report.errors().map(ToString::to_string).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("`Old`"), "{}", errors[0]);
        assert!(errors[0].ends_with("at kubernetes:core/v1 Child"), "{}", errors[0]);
    }

    #[test]
    fn test_api_and_group_checks() {
        let group = ApiGroup {
            identifier: ApiGroupIdentifier::named("apps", "apps"),
            api: "kubernetes".to_string(),
            versions: vec!["v1".to_string()],
            preferred_version: Some("v2".to_string()),
        };
        let api = Api {
            name: "kubernetes".to_string(),
            version: None,
            groups: vec![ApiGroupIdentifier::core(), ApiGroupIdentifier::core()],
        };

        let mut builder = Catalogue::builder();
        builder
            .add_documents(vec![
                Document::from(Descriptor::Api(api)),
                Document::from(Descriptor::ApiGroup(group)),
            ])
            .unwrap();
        let catalogue = builder.build();
        let report = Validator::new(&catalogue, LintConfig::default()).validate();

        let errors: Vec<&SpecError> = report.errors().collect();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], SpecError::DuplicateName { entity: NameKind::Group, .. }));
        assert!(matches!(errors[1], SpecError::InvalidPreferredVersion { .. }));
    }
}
