//! Property-based tests for inheritance merging

use kure_spec_common::{
    ApiGroupIdentifier, ApiGroupVersion, Definition, ObjectType, Property, Type, TypeReference,
};
use kure_spec_resolver::{Catalogue, GroupVersionId, Merger};
use proptest::prelude::*;

fn catalogue(definitions: Vec<Definition>) -> (Catalogue, GroupVersionId) {
    let mut group_version = ApiGroupVersion::new("kubernetes", ApiGroupIdentifier::core(), "v1");
    group_version.definitions = definitions;
    let id = GroupVersionId::local(&group_version);

    let mut builder = Catalogue::builder();
    builder.add_group_version(group_version).unwrap();
    (builder.build(), id)
}

/// Properties named `names`, each described with the `source` declaring it
fn declared(names: &[String], source: &str) -> Vec<Property> {
    names
        .iter()
        .map(|name| Property::new(name, Type::string()).with_description(source))
        .collect()
}

fn names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-f]", 0..5)
}

proptest! {
    #[test]
    fn earliest_declaration_wins(
        bases in prop::collection::vec(names(), 1..5),
        own in names(),
    ) {
        let mut definitions = Vec::new();
        let mut object = ObjectType::new(declared(&own, "own"));
        for (i, base) in bases.iter().enumerate() {
            let name = format!("Base{}", i);
            definitions.push(Definition::new(&name, Type::object(declared(base, &name))));
            object = object.inheriting(TypeReference::local(&name));
        }
        let (catalogue, at) = catalogue(definitions);

        let mut expected: Vec<(String, String)> = Vec::new();
        let sources = bases
            .iter()
            .enumerate()
            .map(|(i, base)| (format!("Base{}", i), base))
            .chain(std::iter::once(("own".to_string(), &own)));
        for (source, names) in sources {
            for name in names {
                if !expected.iter().any(|(seen, _)| seen == name) {
                    expected.push((name.clone(), source.clone()));
                }
            }
        }

        let merged = Merger::new(&catalogue).effective_properties(&object, &at).unwrap();
        let actual: Vec<(String, String)> = merged
            .iter()
            .map(|p| {
                (
                    p.name().to_string(),
                    p.meta.definition.description.clone().unwrap_or_default(),
                )
            })
            .collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn merging_is_idempotent(depth in 1usize..8, shared in names()) {
        let mut definitions = Vec::new();
        for level in 0..depth {
            let name = format!("Level{}", level);
            let mut properties = declared(&shared, &name);
            properties.push(Property::new(&format!("level{}", level), Type::Boolean));
            let mut object = ObjectType::new(properties);
            if level > 0 {
                object = object.inheriting(TypeReference::local(&format!("Level{}", level - 1)));
            }
            definitions.push(Definition::new(&name, Type::Object(object)));
        }
        let (catalogue, at) = catalogue(definitions);
        let top = at.definition(&format!("Level{}", depth - 1));

        let merger = Merger::new(&catalogue);
        let first = merger.effective_properties_of(&top).unwrap();
        let second = merger.effective_properties_of(&top).unwrap();
        let fresh = Merger::new(&catalogue).effective_properties_of(&top).unwrap();
        prop_assert_eq!(&*first, &*second);
        prop_assert_eq!(&*first, &*fresh);

        // Every shared name comes from the root of the chain
        for name in &shared {
            let property = first.get(name).unwrap();
            prop_assert_eq!(property.meta.definition.description.as_deref(), Some("Level0"));
        }
    }
}
