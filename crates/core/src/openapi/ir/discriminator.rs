//! Discriminator pre-pass over `components.schemas`.
//!
//! A "discriminating schema" declares a `discriminator` without being a
//! `oneOf`/`anyOf` itself; its subtypes point back at it through `allOf`.
//! Mappings that are only implied by such `allOf` usage are made explicit here,
//! once, before any translation starts.

use indexmap::IndexMap;

use crate::openapi::spec::Components;

const SCHEMAS_PREFIX: &str = "#/components/schemas/";

/// A schema that other components extend through `allOf`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscriminatingSchema {
    pub property_name: Option<String>,
    /// Tag value to component ref, explicit entries first.
    pub mapping: IndexMap<String, String>,
}

impl DiscriminatingSchema {
    /// The tag under which `component_ref` is mapped.
    pub fn tag_for(&self, component_ref: &str) -> Option<&str> {
        self.mapping
            .iter()
            .find(|(_, target)| target.as_str() == component_ref)
            .map(|(tag, _)| tag.as_str())
    }
}

/// Discriminating schemas keyed by their ref path.
#[derive(Debug, Clone, Default)]
pub struct DiscriminatorIndex {
    schemas: IndexMap<String, DiscriminatingSchema>,
}

impl DiscriminatorIndex {
    /// Index the discriminating component schemas and complete their
    /// mappings from `allOf` back-references.
    pub fn build(components: Option<&Components>) -> Self {
        let mut index = Self::default();
        let Some(components) = components else {
            return index;
        };

        for (name, schema) in &components.schemas {
            let Some(discriminator) = &schema.discriminator else {
                continue;
            };
            if schema.one_of.is_some() || schema.any_of.is_some() {
                continue;
            }
            index.schemas.insert(
                component_ref(name),
                DiscriminatingSchema {
                    property_name: discriminator.property_name.clone(),
                    mapping: discriminator.mapping.clone().unwrap_or_default(),
                },
            );
        }

        for (name, schema) in &components.schemas {
            let child_ref = component_ref(name);
            for branch in schema.all_of.iter().flatten() {
                let Some(parent) = branch
                    .ref_path
                    .as_deref()
                    .and_then(|r| index.schemas.get_mut(r))
                else {
                    continue;
                };
                let already_mapped = parent.mapping.values().any(|target| *target == child_ref);
                if !already_mapped && !parent.mapping.contains_key(name) {
                    parent.mapping.insert(name.clone(), child_ref.clone());
                }
            }
        }

        tracing::trace!(count = index.schemas.len(), "Indexed discriminating schemas");
        index
    }

    /// The discriminating schema at `reference`, if it is one.
    pub fn get(&self, reference: &str) -> Option<&DiscriminatingSchema> {
        self.schemas.get(reference)
    }
}

/// `#/components/schemas/<name>` with JSON-pointer escaping.
pub fn component_ref(name: &str) -> String {
    format!(
        "{SCHEMAS_PREFIX}{}",
        name.replace('~', "~0").replace('/', "~1")
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn components(json: &str) -> Components {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_implicit_mapping_from_all_of() {
        let components = components(
            r##"{ "schemas": {
                "Pet": { "type": "object", "discriminator": { "propertyName": "petType" } },
                "Dog": { "allOf": [{ "$ref": "#/components/schemas/Pet" }] },
                "Cat": { "allOf": [{ "$ref": "#/components/schemas/Pet" }] }
            } }"##,
        );
        let index = DiscriminatorIndex::build(Some(&components));
        let pet = index.get("#/components/schemas/Pet").unwrap();
        assert_eq!(pet.property_name.as_deref(), Some("petType"));
        assert_eq!(pet.tag_for("#/components/schemas/Dog"), Some("Dog"));
        assert_eq!(pet.tag_for("#/components/schemas/Cat"), Some("Cat"));
    }

    #[test]
    fn test_explicit_mapping_wins() {
        let components = components(
            r##"{ "schemas": {
                "Pet": { "discriminator": { "propertyName": "petType",
                    "mapping": { "dog": "#/components/schemas/Dog" } } },
                "Dog": { "allOf": [{ "$ref": "#/components/schemas/Pet" }] }
            } }"##,
        );
        let index = DiscriminatorIndex::build(Some(&components));
        let pet = index.get("#/components/schemas/Pet").unwrap();
        assert_eq!(pet.mapping.len(), 1);
        assert_eq!(pet.tag_for("#/components/schemas/Dog"), Some("dog"));
    }

    #[test]
    fn test_one_of_discriminators_are_not_indexed() {
        let components = components(
            r##"{ "schemas": {
                "Pet": { "oneOf": [{ "$ref": "#/components/schemas/Dog" }],
                    "discriminator": { "propertyName": "petType" } },
                "Dog": { "type": "object" }
            } }"##,
        );
        let index = DiscriminatorIndex::build(Some(&components));
        assert!(index.get("#/components/schemas/Pet").is_none());
    }

    #[test]
    fn test_component_ref_escapes() {
        assert_eq!(component_ref("a/b~c"), "#/components/schemas/a~1b~0c");
    }
}
