//! Schema to TypeScript type translation.
//!
//! Each schema is classified once with [`Schema::kind`] and translated per
//! case. Named types come from `$ref`s: the first use of a ref reserves its
//! alias (and the Read/Write variant aliases) before the body is translated,
//! so recursive schemas end up as references by name.

use std::collections::HashSet;

use super::context::{Generator, OnlyFlags, RefEntry};
use super::discriminator::component_ref;
use super::naming::{OnlyMode, to_identifier};
use super::types::{TsDoc, TsLiteral, TsPrimitive, TsProp, TsType, TsTypeDef, TypeDefKind};
use crate::error::{GenerateError, Result};
use crate::openapi::resolver::{basename, stable_name};
use crate::openapi::spec::{
    AdditionalProperties, Discriminator, Document, Schema, SchemaKind, SchemaType,
};

impl Generator<'_> {
    /// Translate a schema into a type for the given read/write view.
    ///
    /// `name` is the property or parameter name the schema sits under; it is
    /// only used to name enums.
    pub fn type_from_schema(
        &mut self,
        schema: Option<&Schema>,
        name: Option<&str>,
        mode: OnlyMode,
    ) -> Result<TsType> {
        let Some(schema) = schema else {
            return Ok(self.any_type());
        };
        self.nullable_type(schema, name, mode, None)
    }

    /// The body of the component at `reference`, for one view.
    ///
    /// Discriminator handling looks the component up by its ref path, which
    /// inline schemas don't have.
    fn component_type(&mut self, schema: &Schema, reference: &str, mode: OnlyMode) -> Result<TsType> {
        self.nullable_type(schema, None, mode, Some(reference))
    }

    fn nullable_type(
        &mut self,
        schema: &Schema,
        name: Option<&str>,
        mode: OnlyMode,
        component: Option<&str>,
    ) -> Result<TsType> {
        let ty = self.base_type(schema, name, mode, component)?;
        Ok(if schema.is_nullable() { with_null(ty) } else { ty })
    }

    fn base_type(
        &mut self,
        schema: &Schema,
        name: Option<&str>,
        mode: OnlyMode,
        component: Option<&str>,
    ) -> Result<TsType> {
        match schema.kind() {
            SchemaKind::Reference(reference) => self.ref_type(reference, mode),
            SchemaKind::OneOf {
                variants,
                discriminator: Some(discriminator),
            } => {
                let label = component.or(name).unwrap_or("inline schema");
                self.tagged_union(variants, discriminator, mode, label)
            }
            SchemaKind::OneOf {
                variants,
                discriminator: None,
            }
            | SchemaKind::AnyOf(variants) => Ok(TsType::Union(self.types_of(variants, mode)?)),
            SchemaKind::Discriminated(discriminator) => {
                self.discriminated_union(schema, discriminator, name, mode, component)
            }
            SchemaKind::AllOf(branches) => self.intersection(schema, branches, mode, component),
            SchemaKind::Array(items) => {
                let item = self.type_from_schema(Some(items), name, mode)?;
                Ok(TsType::Array(Box::new(item)))
            }
            SchemaKind::Tuple(items) => Ok(TsType::Tuple(self.types_of(items, mode)?)),
            SchemaKind::Object => self.object_type(schema, mode, None),
            SchemaKind::Enum(values) => match name {
                Some(name) if self.is_true_enum(schema, Some(name)) => self.true_enum(schema, name),
                _ => Ok(literal_union(values)),
            },
            SchemaKind::Binary => Ok(TsType::Ref("Blob".into())),
            SchemaKind::Const(value) => Ok(TsLiteral::from_json(value)
                .map(TsType::Literal)
                .unwrap_or_else(|| self.any_type())),
            SchemaKind::Primitive(schema_type) => Ok(self.primitive_type(schema_type)),
        }
    }

    fn types_of(&mut self, schemas: &[Schema], mode: OnlyMode) -> Result<Vec<TsType>> {
        schemas
            .iter()
            .map(|schema| self.type_from_schema(Some(schema), None, mode))
            .collect()
    }

    // =========================================================================
    // References
    // =========================================================================

    /// The named type for a `$ref`, registering it on first use.
    pub(super) fn ref_type(&mut self, reference: &str, mode: OnlyMode) -> Result<TsType> {
        if let Some(entry) = self.refs.get(reference) {
            return Ok(TsType::Ref(entry.alias_for(mode).to_string()));
        }

        let schema: Schema = self.resolver.resolve_ref(reference)?;
        let name = stable_name(reference);
        if self.is_true_enum(&schema, Some(&name)) {
            return self.true_enum(&schema, &name);
        }

        let base = self.aliases.unique(&to_identifier(&name, true, OnlyMode::Base));
        let flags = if self.options.merge_read_write_only {
            OnlyFlags::default()
        } else {
            self.ref_only_flags(reference, HashSet::new())?
        };
        let read_only = flags
            .read_only
            .then(|| self.aliases.unique(&to_identifier(&name, true, OnlyMode::ReadOnly)));
        let write_only = flags
            .write_only
            .then(|| self.aliases.unique(&to_identifier(&name, true, OnlyMode::WriteOnly)));
        tracing::trace!(
            reference,
            alias = %base,
            read = ?read_only,
            write = ?write_only,
            "Registered alias"
        );

        let entry = RefEntry {
            base,
            read_only,
            write_only,
        };
        self.refs.insert(reference.to_string(), entry.clone());

        let doc = schema.description.as_deref().and_then(TsDoc::from_text);
        let views = [
            (OnlyMode::Base, Some(&entry.base)),
            (OnlyMode::ReadOnly, entry.read_only.as_ref()),
            (OnlyMode::WriteOnly, entry.write_only.as_ref()),
        ];
        for (view, alias) in views {
            let Some(alias) = alias else {
                continue;
            };
            let ty = self.component_type(&schema, reference, view)?;
            self.declarations.push(TsTypeDef {
                name: alias.clone(),
                kind: TypeDefKind::TypeAlias { ty },
                doc: doc.clone(),
            });
        }

        Ok(TsType::Ref(entry.alias_for(mode).to_string()))
    }

    /// Translate every component schema, in document order.
    pub(super) fn translate_all_schemas(&mut self, document: &Document) -> Result<()> {
        let Some(components) = &document.components else {
            return Ok(());
        };
        for name in components.schemas.keys() {
            self.ref_type(&component_ref(name), OnlyMode::Base)?;
        }
        Ok(())
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// `oneOf` with a discriminator: `{ prop: "tag" } & Variant | ...`.
    fn tagged_union(
        &mut self,
        variants: &[Schema],
        discriminator: &Discriminator,
        mode: OnlyMode,
        label: &str,
    ) -> Result<TsType> {
        let Some(property) = &discriminator.property_name else {
            return Err(GenerateError::InvalidDiscriminatorUsage {
                schema: label.to_string(),
                reason: "discriminator has no propertyName".into(),
            });
        };
        let mut members = Vec::with_capacity(variants.len());
        for variant in variants {
            let Some(reference) = &variant.ref_path else {
                return Err(GenerateError::InvalidDiscriminatorUsage {
                    schema: label.to_string(),
                    reason: "every oneOf variant must be a $ref".into(),
                });
            };
            let tag = discriminator
                .mapping
                .iter()
                .flatten()
                .find(|(_, target)| *target == reference)
                .map_or_else(|| basename(reference).to_string(), |(tag, _)| tag.clone());
            let variant_type = self.type_from_schema(Some(variant), None, mode)?;
            members.push(TsType::Intersection(vec![
                TsType::tag(property, &tag),
                variant_type,
            ]));
        }
        Ok(TsType::Union(members))
    }

    /// A bare discriminator: the union of its mapped subtypes.
    ///
    /// The discriminating component itself uses the mapping completed by the
    /// pre-pass. Without any mapping the schema is translated as if it had no
    /// discriminator.
    fn discriminated_union(
        &mut self,
        schema: &Schema,
        discriminator: &Discriminator,
        name: Option<&str>,
        mode: OnlyMode,
        component: Option<&str>,
    ) -> Result<TsType> {
        let targets: Vec<String> = match component.and_then(|c| self.discriminators.get(c)) {
            Some(indexed) => indexed.mapping.values().cloned().collect(),
            None => discriminator.mapping.iter().flatten().map(|(_, t)| t.clone()).collect(),
        };
        if targets.is_empty() {
            let plain = Schema {
                discriminator: None,
                ..schema.clone()
            };
            return self.base_type(&plain, name, mode, component);
        }
        let members = targets
            .iter()
            .map(|target| self.ref_type(target, mode))
            .collect::<Result<Vec<_>>>()?;
        Ok(TsType::Union(members))
    }

    /// `allOf`: the intersection of its branches.
    ///
    /// A branch pointing at a discriminating schema contributes the tag of the
    /// current component plus the parent's properties without the tag.
    fn intersection(
        &mut self,
        schema: &Schema,
        branches: &[Schema],
        mode: OnlyMode,
        component: Option<&str>,
    ) -> Result<TsType> {
        let mut types = Vec::with_capacity(branches.len() + 1);
        for branch in branches {
            let parent = branch
                .ref_path
                .as_deref()
                .and_then(|r| self.discriminators.get(r).map(|p| (r, p.clone())));
            let Some((reference, parent)) = parent else {
                types.push(self.type_from_schema(Some(branch), None, mode)?);
                continue;
            };
            let parent_schema: Schema = self.resolver.resolve_ref(reference)?;
            let property = parent.property_name.as_deref();
            if let (Some(property), Some(tag)) = (property, component.and_then(|c| parent.tag_for(c))) {
                types.push(TsType::tag(property, tag));
            }
            types.push(self.object_type(&parent_schema, mode, property)?);
        }
        if schema.properties.is_some() {
            types.push(self.object_type(schema, mode, None)?);
        }
        Ok(TsType::Intersection(types))
    }

    // =========================================================================
    // Objects
    // =========================================================================

    /// Structural object type, filtered to the properties of `mode`.
    fn object_type(&mut self, schema: &Schema, mode: OnlyMode, skip: Option<&str>) -> Result<TsType> {
        let mut props = Vec::new();
        for (prop_name, prop_schema) in schema.properties.iter().flatten() {
            if skip == Some(prop_name.as_str()) || !self.keeps_property(prop_schema, mode)? {
                continue;
            }
            let optional = !schema.requires(prop_name);
            let mut ty = self.type_from_schema(Some(prop_schema), Some(prop_name), mode)?;
            if optional && self.options.union_undefined {
                ty = with_member(ty, TsType::Primitive(TsPrimitive::Undefined));
            }
            props.push(TsProp {
                name: prop_name.clone(),
                ty,
                optional,
                doc: property_doc(prop_schema),
            });
        }

        let index = match &schema.additional_properties {
            Some(AdditionalProperties::Bool(true)) => Some(self.any_type()),
            Some(AdditionalProperties::Schema(extra)) => {
                Some(self.type_from_schema(Some(extra), None, mode)?)
            }
            Some(AdditionalProperties::Bool(false)) | None => None,
        };

        Ok(TsType::Object {
            props,
            index: index.map(Box::new),
        })
    }

    fn keeps_property(&mut self, schema: &Schema, mode: OnlyMode) -> Result<bool> {
        if self.options.merge_read_write_only {
            return Ok(true);
        }
        let flags = self.classify(schema, false, HashSet::new())?;
        Ok(match mode {
            OnlyMode::Base => !flags.read_only && !flags.write_only,
            OnlyMode::ReadOnly => flags.read_only || !flags.write_only,
            OnlyMode::WriteOnly => flags.write_only || !flags.read_only,
        })
    }

    // =========================================================================
    // Read/write classification
    // =========================================================================

    /// Whether a schema contains read-only or write-only members.
    ///
    /// `visited` holds the refs in progress on the current path; it is passed
    /// by value so siblings don't see each other's refs. References are only
    /// entered when `follow_refs` is set.
    fn classify(
        &mut self,
        schema: &Schema,
        follow_refs: bool,
        visited: HashSet<String>,
    ) -> Result<OnlyFlags> {
        let mut flags = OnlyFlags {
            read_only: schema.read_only == Some(true),
            write_only: schema.write_only == Some(true),
        };
        if flags.both() {
            return Ok(flags);
        }

        if let Some(reference) = &schema.ref_path {
            if follow_refs {
                flags.merge(self.ref_only_flags(reference, visited)?);
            }
            return Ok(flags);
        }

        let children: Vec<&Schema> = match &schema.items {
            Some(items) => vec![items.as_ref()],
            None => schema
                .properties
                .iter()
                .flat_map(|props| props.values())
                .chain(schema.all_of.iter().flatten())
                .chain(schema.any_of.iter().flatten())
                .chain(schema.one_of.iter().flatten())
                .collect(),
        };
        for child in children {
            flags.merge(self.classify(child, follow_refs, visited.clone())?);
            if flags.both() {
                break;
            }
        }
        Ok(flags)
    }

    /// Ref-following classification, cached per ref path once complete.
    fn ref_only_flags(&mut self, reference: &str, mut visited: HashSet<String>) -> Result<OnlyFlags> {
        if visited.contains(reference) {
            return Ok(OnlyFlags::default());
        }
        if let Some(flags) = self.only_flags.get(reference) {
            return Ok(*flags);
        }
        let schema: Schema = self.resolver.resolve_ref(reference)?;
        visited.insert(reference.to_string());
        let flags = self.classify(&schema, true, visited)?;
        self.only_flags.insert(reference.to_string(), flags);
        Ok(flags)
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    /// `any`, or `unknown` when configured.
    pub(super) fn any_type(&self) -> TsType {
        if self.options.use_unknown {
            TsType::Primitive(TsPrimitive::Unknown)
        } else {
            TsType::Primitive(TsPrimitive::Any)
        }
    }

    fn primitive_type(&self, schema_type: Option<&SchemaType>) -> TsType {
        match schema_type {
            None => self.any_type(),
            Some(SchemaType::Single(name)) => self.named_primitive(name),
            Some(SchemaType::Multiple(names)) => {
                TsType::Union(names.iter().map(|n| self.named_primitive(n)).collect())
            }
        }
    }

    fn named_primitive(&self, name: &str) -> TsType {
        match name {
            "integer" | "number" => TsType::Primitive(TsPrimitive::Number),
            "string" => TsType::string(),
            "boolean" => TsType::Primitive(TsPrimitive::Boolean),
            "null" => TsType::null(),
            "object" => TsType::Object {
                props: Vec::new(),
                index: Some(Box::new(self.any_type())),
            },
            "array" => TsType::Array(Box::new(self.any_type())),
            _ => self.any_type(),
        }
    }
}

/// `T | null`, without repeating an existing null member.
fn with_null(ty: TsType) -> TsType {
    with_member(ty, TsType::null())
}

fn with_member(ty: TsType, member: TsType) -> TsType {
    match ty {
        TsType::Union(mut members) => {
            if !members.contains(&member) {
                members.push(member);
            }
            TsType::Union(members)
        }
        ty if ty == member => ty,
        ty => TsType::Union(vec![ty, member]),
    }
}

/// Inline union of an enum's literal values.
fn literal_union(values: &[serde_json::Value]) -> TsType {
    TsType::Union(
        values
            .iter()
            .filter_map(TsLiteral::from_json)
            .map(TsType::Literal)
            .collect(),
    )
}

fn property_doc(schema: &Schema) -> Option<TsDoc> {
    let mut lines = schema
        .description
        .as_deref()
        .and_then(TsDoc::from_text)
        .map(|doc| doc.0)
        .unwrap_or_default();
    if schema.deprecated == Some(true) {
        lines.push("@deprecated".into());
    }
    (!lines.is_empty()).then_some(TsDoc(lines))
}
