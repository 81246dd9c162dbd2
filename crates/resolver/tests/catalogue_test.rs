//! End-to-end tests: descriptor files on disk through validation and merging

use kure_spec_common::{Kind, LintConfig, SpecError, TypeReference};
use kure_spec_resolver::{Catalogue, DirectoryPackageLoader, Merger, Origin, Validator};
use std::fs;
use std::path::Path;

const APPS_V1: &str = r#"
apiVersion: spec.kure.sh/v1alpha1
kind: API
name: kubernetes
version: "1.30"
groups:
  - {module: apps, name: apps}
---
apiVersion: spec.kure.sh/v1alpha1
kind: APIGroup
module: apps
name: apps
api: kubernetes
versions: [v1]
preferredVersion: v1
---
apiVersion: spec.kure.sh/v1alpha1
kind: APIGroupVersion
api: kubernetes
group: {module: apps, name: apps}
version: v1
dependencies:
  - {package: kubernetes-meta, version: 1.30.0}
definitions:
  - name: Deployment
    value:
      type: resource
      properties:
        - name: metadata
          value:
            type: reference
            target:
              scope: {package: kubernetes-meta, group: {module: null, name: meta}, version: v1}
              name: ObjectMeta
        - name: spec
          value: {type: reference, target: {name: DeploymentSpec}}
      metadata:
        name: deployments
        singularName: deployment
        kind: Deployment
        scope: namespace
        subresources: {status: true, scale: true}
  - name: DeploymentSpec
    value:
      type: object
      inherit:
        - {type: reference, target: {name: Replicated}}
        - {type: reference, target: {name: Selected}}
      properties:
        - name: replicas
          value: {type: string}
        - name: paused
          value: {type: boolean}
  - name: Replicated
    value:
      type: object
      properties:
        - name: replicas
          value: {type: integer, size: 32}
  - name: Selected
    value:
      type: object
      properties:
        - name: selector
          value: {type: map, values: {type: string}}
        - name: replicas
          value: {type: float}
"#;

const META_V1: &str = r#"
apiVersion: spec.kure.sh/v1alpha1
kind: APIGroupVersion
api: kubernetes-meta
group: {module: null, name: meta}
version: v1
definitions:
  - name: ObjectMeta
    value:
      type: object
      properties:
        - name: name
          value: {type: string}
"#;

fn write_package(root: &Path, package: &str, version: &str, file: &str, content: &str) {
    let dir = root.join(package).join(version);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), content).unwrap();
}

fn build(packages: &Path) -> Catalogue {
    let documents = kure_spec_parser::DescriptorLoader::from_yaml(APPS_V1)
        .unwrap()
        .into_documents();

    let mut builder = Catalogue::builder();
    builder.add_documents(documents).unwrap();
    builder
        .load_dependencies(&DirectoryPackageLoader::new([packages]))
        .unwrap();
    builder.build()
}

#[test]
fn test_catalogue_from_files_validates_cleanly() {
    let packages = tempfile::tempdir().unwrap();
    write_package(packages.path(), "kubernetes-meta", "1.30.0", "meta-v1.yaml", META_V1);

    let catalogue = build(packages.path());
    assert_eq!(catalogue.len(), 2);
    assert_eq!(catalogue.local_group_versions().count(), 1);

    let report = Validator::new(&catalogue, LintConfig::default()).validate();
    assert!(report.is_clean(), "{:?}", report);
}

#[test]
fn test_external_reference_resolves_into_package() {
    let packages = tempfile::tempdir().unwrap();
    write_package(packages.path(), "kubernetes-meta", "1.30.0", "meta-v1.yaml", META_V1);
    let catalogue = build(packages.path());

    let apps_v1 = catalogue.find("apps", "v1").unwrap().unwrap().clone();
    let deployment = catalogue
        .resolve(&TypeReference::local("Deployment"), &apps_v1)
        .unwrap();
    let metadata = deployment.definition.value.references()[0].1;

    let resolved = kure_spec_resolver::resolve(metadata, &apps_v1, &catalogue).unwrap();
    assert_eq!(resolved.definition.name(), "ObjectMeta");
    assert_eq!(
        resolved.location().origin,
        Origin::Package {
            name: "kubernetes-meta".to_string(),
            version: "1.30.0".to_string()
        }
    );
}

#[test]
fn test_effective_properties_follow_inherit_order() {
    let packages = tempfile::tempdir().unwrap();
    write_package(packages.path(), "kubernetes-meta", "1.30.0", "meta-v1.yaml", META_V1);
    let catalogue = build(packages.path());
    let apps_v1 = catalogue.find("apps", "v1").unwrap().unwrap();

    let merger = Merger::new(&catalogue);
    let merged = merger
        .effective_properties_of(&apps_v1.definition("DeploymentSpec"))
        .unwrap();

    let names: Vec<&str> = merged.names().collect();
    assert_eq!(names, vec!["replicas", "selector", "paused"]);
    // Replicated is inherited first, so its integer wins over Selected and the own string
    assert_eq!(merged.get("replicas").unwrap().value.kind(), Kind::Integer);
}

#[test]
fn test_missing_package_fails_the_build() {
    let packages = tempfile::tempdir().unwrap();
    let documents = kure_spec_parser::DescriptorLoader::from_yaml(APPS_V1)
        .unwrap()
        .into_documents();

    let mut builder = Catalogue::builder();
    builder.add_documents(documents).unwrap();
    let err = builder
        .load_dependencies(&DirectoryPackageLoader::new([packages.path()]))
        .unwrap_err();
    assert!(matches!(err, SpecError::PackageNotFound { ref package, .. } if package == "kubernetes-meta"));
}

#[test]
fn test_unresolved_external_name_is_reported_with_path() {
    let packages = tempfile::tempdir().unwrap();
    write_package(
        packages.path(),
        "kubernetes-meta",
        "1.30.0",
        "meta-v1.yaml",
        &META_V1.replace("ObjectMeta", "ListMeta"),
    );
    let catalogue = build(packages.path());

    let report = Validator::new(&catalogue, LintConfig::default()).validate();
    let errors: Vec<String> = report.errors().map(ToString::to_string).collect();
    assert_eq!(
        errors,
        vec![
            "unresolved external reference `kubernetes-meta:meta/v1.ObjectMeta` at kubernetes:apps/v1 Deployment.metadata"
                .to_string()
        ]
    );
}
