//! `$ref` resolution within a single self-contained document.
//!
//! References are looked up in the raw JSON tree and deserialized into the
//! shape the caller asks for. Only local refs (`#/...`) are supported.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::spec::{RefOr, Schema};
use crate::error::{GenerateError, Result};

const LOCAL_PREFIX: &str = "#/";

/// Resolves `$ref` pointers against the raw document tree.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    document: &'a Value,
}

impl<'a> Resolver<'a> {
    /// Resolver over a parsed document tree.
    pub fn new(document: &'a Value) -> Self {
        Self { document }
    }

    /// Return the exact, unconverted node a ref points to.
    pub fn lookup(&self, reference: &str) -> Result<&'a Value> {
        let segments = pointer_segments(reference)?;
        let mut node = self.document;
        for segment in &segments {
            let next = match node {
                Value::Object(map) => map.get(segment.as_str()),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            node = next.ok_or_else(|| GenerateError::ReferenceNotFound {
                path: segments.join("."),
            })?;
        }
        Ok(node)
    }

    /// Look up a ref and deserialize the target into `T`.
    pub fn resolve_ref<T: DeserializeOwned>(&self, reference: &str) -> Result<T> {
        let node = self.lookup(reference)?;
        <T as serde::Deserialize>::deserialize(node).map_err(|source| GenerateError::InvalidDocument {
            path: reference.to_string(),
            source,
        })
    }

    /// Pass inline values through; resolve references.
    pub fn resolve<'n, T>(&self, node: &'n RefOr<T>) -> Result<Cow<'n, T>>
    where
        T: DeserializeOwned + Clone,
    {
        match node {
            RefOr::Item(item) => Ok(Cow::Borrowed(item)),
            RefOr::Ref { ref_path } => self.resolve_ref(ref_path).map(Cow::Owned),
        }
    }

    /// [`Resolver::resolve`] over an optional list; absent lists give an empty vector.
    pub fn resolve_array<'n, T>(&self, nodes: Option<&'n [RefOr<T>]>) -> Result<Vec<Cow<'n, T>>>
    where
        T: DeserializeOwned + Clone,
    {
        nodes
            .unwrap_or_default()
            .iter()
            .map(|node| self.resolve(node))
            .collect()
    }

    /// Schemas carry their own `$ref`; resolve it if present.
    pub fn resolve_schema<'n>(&self, schema: &'n Schema) -> Result<Cow<'n, Schema>> {
        match &schema.ref_path {
            Some(reference) => self.resolve_ref(reference).map(Cow::Owned),
            None => Ok(Cow::Borrowed(schema)),
        }
    }
}

/// A raw value is a reference iff it is an object with a `$ref` key.
pub fn is_reference(value: &Value) -> bool {
    value.as_object().is_some_and(|map| map.contains_key("$ref"))
}

/// Split a local ref into decoded pointer segments.
///
/// Each segment is percent-decoded first, then `~1` becomes `/` and `~0`
/// becomes `~`.
pub fn pointer_segments(reference: &str) -> Result<Vec<String>> {
    let Some(pointer) = reference.strip_prefix(LOCAL_PREFIX) else {
        return Err(GenerateError::UnsupportedReference {
            reference: reference.to_string(),
        });
    };
    Ok(pointer.split('/').map(decode_pointer_segment).collect())
}

fn decode_pointer_segment(segment: &str) -> String {
    percent_decode_str(segment)
        .decode_utf8_lossy()
        .replace("~1", "/")
        .replace("~0", "~")
}

/// Substring after the last `/`.
pub fn basename(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// A name for a ref that is safe to build an identifier from.
///
/// Basenames starting with a digit fall back to the whole decoded path joined
/// with `_`, e.g. `#/components/schemas/200` becomes `components_schemas_200`.
pub fn stable_name(reference: &str) -> String {
    let base = basename(reference);
    if base.starts_with(|c: char| c.is_ascii_digit()) {
        let path = reference.strip_prefix(LOCAL_PREFIX).unwrap_or(reference);
        return path
            .split('/')
            .map(decode_pointer_segment)
            .collect::<Vec<_>>()
            .join("_");
    }
    base.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::spec::Parameter;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "components": {
                "schemas": {
                    "Pet": { "type": "object", "properties": { "name": { "type": "string" } } },
                    "pet/name": { "type": "string" },
                    "meta~data": { "type": "integer" },
                    "space name": { "type": "boolean" }
                },
                "parameters": {
                    "Limit": { "name": "limit", "in": "query", "schema": { "type": "integer" } }
                }
            },
            "tags": [{ "name": "first" }, { "name": "second" }]
        })
    }

    #[test]
    fn test_lookup_returns_the_stored_node() {
        let doc = document();
        let resolver = Resolver::new(&doc);
        let node = resolver.lookup("#/components/schemas/Pet").unwrap();
        assert_eq!(node, &doc["components"]["schemas"]["Pet"]);
    }

    #[test]
    fn test_pointer_escapes() {
        let doc = document();
        let resolver = Resolver::new(&doc);
        assert_eq!(
            resolver.lookup("#/components/schemas/pet~1name").unwrap(),
            &json!({ "type": "string" })
        );
        assert_eq!(
            resolver.lookup("#/components/schemas/meta~0data").unwrap(),
            &json!({ "type": "integer" })
        );
        assert_eq!(
            resolver.lookup("#/components/schemas/space%20name").unwrap(),
            &json!({ "type": "boolean" })
        );
    }

    #[test]
    fn test_array_segments() {
        let doc = document();
        let resolver = Resolver::new(&doc);
        assert_eq!(resolver.lookup("#/tags/1/name").unwrap(), &json!("second"));
    }

    #[test]
    fn test_external_ref_is_unsupported() {
        let doc = document();
        let resolver = Resolver::new(&doc);
        let err = resolver.lookup("other.yaml#/components/schemas/Pet").unwrap_err();
        assert!(matches!(
            err,
            GenerateError::UnsupportedReference { reference } if reference == "other.yaml#/components/schemas/Pet"
        ));
    }

    #[test]
    fn test_missing_ref_names_the_path() {
        let doc = document();
        let resolver = Resolver::new(&doc);
        let err = resolver.lookup("#/components/schemas/Missing").unwrap_err();
        assert!(matches!(
            err,
            GenerateError::ReferenceNotFound { path } if path == "components.schemas.Missing"
        ));
    }

    #[test]
    fn test_resolve_passes_items_through() {
        let doc = document();
        let resolver = Resolver::new(&doc);
        let inline: RefOr<Parameter> = serde_json::from_value(json!({ "name": "q", "in": "query" })).unwrap();
        assert!(matches!(resolver.resolve(&inline).unwrap(), Cow::Borrowed(_)));

        let by_ref: RefOr<Parameter> =
            serde_json::from_value(json!({ "$ref": "#/components/parameters/Limit" })).unwrap();
        assert_eq!(resolver.resolve(&by_ref).unwrap().name, "limit");
    }

    #[test]
    fn test_resolve_array_absent_is_empty() {
        let doc = document();
        let resolver = Resolver::new(&doc);
        let resolved = resolver.resolve_array::<Parameter>(None).unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_resolve_schema_follows_its_ref() {
        let doc = document();
        let resolver = Resolver::new(&doc);
        let inline = Schema::typed("string", None);
        assert!(matches!(resolver.resolve_schema(&inline).unwrap(), Cow::Borrowed(_)));

        let by_ref = Schema::reference("#/components/schemas/meta~0data");
        assert_eq!(
            resolver.resolve_schema(&by_ref).unwrap().into_owned(),
            Schema::typed("integer", None)
        );
    }

    #[test]
    fn test_is_reference() {
        assert!(is_reference(&json!({ "$ref": "#/a" })));
        assert!(!is_reference(&json!({ "type": "string" })));
        assert!(!is_reference(&json!(false)));
        assert!(!is_reference(&json!(0)));
    }

    #[test]
    fn test_ref_names() {
        assert_eq!(basename("#/components/schemas/Pet"), "Pet");
        assert_eq!(stable_name("#/components/schemas/Pet"), "Pet");
        assert_eq!(stable_name("#/components/schemas/200"), "components_schemas_200");
        assert_eq!(
            stable_name("#/components/schemas/1%20a~1b"),
            "components_schemas_1 a/b"
        );
    }
}
