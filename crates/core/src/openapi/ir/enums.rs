//! Named enum declarations.

use super::context::Generator;
use super::naming::{AliasNames, EnumName, OnlyMode, to_identifier};
use super::types::{TsDoc, TsEnumMember, TsLiteral, TsType, TsTypeDef, TypeDefKind};
use super::utils::{capitalize_first, is_valid_identifier};
use crate::error::{GenerateError, Result};
use crate::openapi::spec::Schema;

impl Generator<'_> {
    /// Whether a schema becomes an `enum` declaration rather than a literal union.
    pub(super) fn is_true_enum(&self, schema: &Schema, name: Option<&str>) -> bool {
        self.options.use_enum_type
            && name.is_some()
            && schema.enum_values.is_some()
            && !schema
                .schema_type
                .as_ref()
                .is_some_and(|t| t.includes("boolean"))
    }

    /// Declare (or reuse) a named enum and return a reference to it.
    ///
    /// The name is the schema title, or `name` capitalized. Only string and
    /// number values become members; `null` is left to the nullable wrapper.
    pub(super) fn true_enum(&mut self, schema: &Schema, name: &str) -> Result<TsType> {
        let values = schema.enum_values.as_deref().unwrap_or_default();
        let proposed = enum_type_name(schema.title.as_deref().unwrap_or(name));

        let overrides = schema.enum_member_names();
        if let Some(names) = overrides
            && names.len() != values.len()
        {
            return Err(GenerateError::InvalidEnumNames {
                name: proposed,
                expected: values.len(),
                found: names.len(),
            });
        }

        let serialized = serde_json::to_string(values).unwrap_or_default();
        let enum_name = match self
            .enum_names
            .name_for(&proposed, &serialized, &mut self.aliases)
        {
            EnumName::Reused(existing) => return Ok(TsType::Ref(existing)),
            EnumName::Fresh(fresh) => fresh,
        };

        let mut member_ids = AliasNames::default();
        let mut members = Vec::with_capacity(values.len());
        for (i, value) in values.iter().enumerate() {
            let (basis, literal) = match TsLiteral::from_json(value) {
                Some(TsLiteral::String(s)) => (s.clone(), TsLiteral::String(s)),
                Some(TsLiteral::Int(n)) => (n.to_string(), TsLiteral::Int(n)),
                Some(TsLiteral::Number(n)) => (n.to_string(), TsLiteral::Number(n)),
                _ => continue,
            };
            let basis = overrides
                .and_then(|names| names.get(i))
                .cloned()
                .unwrap_or(basis);
            members.push(TsEnumMember {
                name: member_ids.unique(&to_identifier(&basis, true, OnlyMode::Base)),
                value: literal,
            });
        }

        tracing::trace!(name = %enum_name, members = members.len(), "Declared enum");
        self.enum_declarations.push(TsTypeDef {
            name: enum_name.clone(),
            kind: TypeDefKind::Enum { members },
            doc: schema.description.as_deref().and_then(TsDoc::from_text),
        });
        Ok(TsType::Ref(enum_name))
    }
}

/// `pet status` becomes `PetStatus`; every part is capitalized as-is.
fn enum_type_name(raw: &str) -> String {
    let name: String = raw
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '$' || c == '_'))
        .map(capitalize_first)
        .collect();
    if is_valid_identifier(&name) {
        name
    } else {
        format!("${name}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::ir::Emit;
    use crate::openapi::options::GenerateOptions;
    use crate::openapi::spec::Document;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn enum_options() -> GenerateOptions {
        GenerateOptions {
            use_enum_type: true,
            ..GenerateOptions::default()
        }
    }

    fn translate(g: &mut Generator<'_>, value: Value, name: &str) -> Result<String> {
        let schema: Schema = serde_json::from_value(value).unwrap();
        g.type_from_schema(Some(&schema), Some(name), OnlyMode::Base)
            .map(|ty| ty.emit())
    }

    fn run<R>(raw: Value, options: GenerateOptions, f: impl FnOnce(&mut Generator<'_>) -> R) -> R {
        let document = Document::from_value(&raw).unwrap();
        let mut generator = Generator::new(&raw, &document, &options);
        f(&mut generator)
    }

    #[test]
    fn test_enum_type_name() {
        assert_eq!(enum_type_name("status"), "Status");
        assert_eq!(enum_type_name("pet status"), "PetStatus");
        assert_eq!(enum_type_name("order-kind_v2"), "OrderKind_v2");
        assert_eq!(enum_type_name("2fa"), "$2fa");
    }

    #[test]
    fn test_literal_union_by_default() {
        run(json!({}), GenerateOptions::default(), |g| {
            let ty = translate(g, json!({ "type": "string", "enum": ["a", "b"] }), "status").unwrap();
            assert_eq!(ty, "\"a\" | \"b\"");
            assert!(g.enum_declarations.is_empty());
        });
    }

    #[test]
    fn test_named_enum_members() {
        run(json!({}), enum_options(), |g| {
            let ty = translate(
                g,
                json!({ "type": "string", "enum": ["available", "in-stock", "available2", null] }),
                "status",
            )
            .unwrap();
            assert_eq!(ty, "Status");
            assert_eq!(
                g.enum_declarations[0].emit(),
                "export enum Status {\n  Available = \"available\",\n  InStock = \"in-stock\",\n  Available2 = \"available2\",\n}\n"
            );
        });
    }

    #[test]
    fn test_numeric_members_and_overrides() {
        run(json!({}), enum_options(), |g| {
            translate(g, json!({ "type": "integer", "enum": [1, 2] }), "level").unwrap();
            translate(
                g,
                json!({ "type": "integer", "enum": [1, 2], "title": "Priority", "x-enumNames": ["Low", "High"] }),
                "ignored",
            )
            .unwrap();
            assert_eq!(
                g.enum_declarations[0].emit(),
                "export enum Level {\n  $1 = 1,\n  $2 = 2,\n}\n"
            );
            assert_eq!(
                g.enum_declarations[1].emit(),
                "export enum Priority {\n  Low = 1,\n  High = 2,\n}\n"
            );
        });
    }

    #[test]
    fn test_identical_enums_are_reused() {
        run(json!({}), enum_options(), |g| {
            let first = translate(g, json!({ "enum": ["a", "b"] }), "status").unwrap();
            let second = translate(g, json!({ "enum": ["a", "b"] }), "status").unwrap();
            let third = translate(g, json!({ "enum": ["c"] }), "status").unwrap();
            assert_eq!(first, "Status");
            assert_eq!(second, "Status");
            assert_eq!(third, "Status2");
            assert_eq!(g.enum_declarations.len(), 2);
        });
    }

    #[test]
    fn test_boolean_enums_stay_inline() {
        run(json!({}), enum_options(), |g| {
            let ty = translate(g, json!({ "type": "boolean", "enum": [true] }), "flag").unwrap();
            assert_eq!(ty, "true");
        });
    }

    #[test]
    fn test_component_enum_has_no_alias() {
        let raw = json!({
            "components": { "schemas": { "Color": { "type": "string", "enum": ["red"] } } }
        });
        run(raw, enum_options(), |g| {
            let schema = Schema::reference("#/components/schemas/Color");
            let ty = g.type_from_schema(Some(&schema), None, OnlyMode::Base).unwrap();
            assert_eq!(ty.emit(), "Color");
            assert!(g.declarations.is_empty());
            assert_eq!(g.enum_declarations.len(), 1);
        });
    }

    #[test]
    fn test_mismatched_member_names() {
        run(json!({}), enum_options(), |g| {
            let err = translate(g, json!({ "enum": ["a", "b"], "x-enum-varnames": ["A"] }), "status")
                .unwrap_err();
            assert!(matches!(
                err,
                GenerateError::InvalidEnumNames { expected: 2, found: 1, .. }
            ));
        });
    }
}
