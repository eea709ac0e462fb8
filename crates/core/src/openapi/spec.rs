//! OpenAPI document structs for serde deserialization.
//!
//! This module covers the subset of OpenAPI 3.x that the generator reads.
//! Maps are `IndexMap`s so that paths, properties and content types keep
//! their document order, which the generated output depends on.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{GenerateError, Result};

/// Root OpenAPI document.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    /// The `openapi` version string, when present.
    pub openapi: Option<String>,
    /// A Swagger 2 marker, only read to reject such documents.
    pub swagger: Option<String>,
    /// Title and version for the header comment.
    #[serde(default)]
    pub info: Info,
    /// Server entries, in document order.
    #[serde(default)]
    pub servers: Vec<Server>,
    /// Path items keyed by path template.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Reusable component schemas.
    pub components: Option<Components>,
}

/// Document metadata used for the header comment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Info {
    /// API title; empty when absent.
    #[serde(default)]
    pub title: String,
    /// API version; empty when absent.
    #[serde(default)]
    pub version: String,
    /// Free-text description.
    pub description: Option<String>,
}

/// A server entry; the first one seeds `defaults.baseUrl`.
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    /// URL template, possibly with `{variable}` placeholders.
    pub url: String,
    /// Used as the key in the generated `servers` object.
    pub description: Option<String>,
    /// Placeholder substitutions.
    #[serde(default)]
    pub variables: IndexMap<String, ServerVariable>,
}

/// A substitution variable inside a server URL template.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerVariable {
    /// Value used when the caller passes none.
    #[serde(default)]
    pub default: Value,
    /// Allowed values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
}

/// Components section containing reusable schemas.
///
/// Parameters, request bodies and responses are only ever reached through
/// `$ref`s, which the resolver reads from the raw document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
    /// Schemas keyed by component name.
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
}

/// A path item containing operations for different HTTP methods.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    /// `GET` operation.
    pub get: Option<Operation>,
    /// `PUT` operation.
    pub put: Option<Operation>,
    /// `POST` operation.
    pub post: Option<Operation>,
    /// `DELETE` operation.
    pub delete: Option<Operation>,
    /// `OPTIONS` operation.
    pub options: Option<Operation>,
    /// `HEAD` operation.
    pub head: Option<Operation>,
    /// `PATCH` operation.
    pub patch: Option<Operation>,
    /// `TRACE` operation.
    pub trace: Option<Operation>,
    /// Path-level parameters shared by all operations.
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
}

/// An API operation (endpoint).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Source of the generated function name.
    pub operation_id: Option<String>,
    /// Preferred text for the function doc comment.
    pub summary: Option<String>,
    /// Doc comment text when there is no summary.
    pub description: Option<String>,
    /// Tags matched by the include/exclude filters.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Operation parameters; they override path-level ones on `(name, in)`.
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
    /// Request body, inline or by reference.
    pub request_body: Option<RefOr<RequestBody>>,
    /// Responses keyed by status code, `default` or a range like `2XX`.
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<Response>>,
    /// Marks the generated function `@deprecated`.
    #[serde(default)]
    pub deprecated: bool,
}

/// Where a parameter lives in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Substituted into the path template.
    Path,
    /// Encoded into the query string.
    Query,
    /// Sent as a request header.
    Header,
    /// Accepted but not sent.
    Cookie,
}

impl ParamLocation {
    /// The raw `in` value, as written in the document.
    pub fn as_str(self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
        }
    }
}

/// A parameter (path, query, header or cookie).
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    /// Wire name.
    pub name: String,
    /// The `in` field.
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// Path parameters are required regardless of this flag.
    #[serde(default)]
    pub required: bool,
    /// Value schema.
    pub schema: Option<Schema>,
    /// Media-type map used instead of `schema`/`style` for complex values.
    pub content: Option<IndexMap<String, MediaType>>,
    /// Serialization style (`form`, `deepObject`, ...).
    pub style: Option<String>,
    /// Whether arrays and objects expand into separate pairs.
    pub explode: Option<bool>,
    /// Free-text description.
    pub description: Option<String>,
}

/// A request body definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    /// Optional bodies become optional arguments.
    #[serde(default)]
    pub required: bool,
    /// Media types keyed by content type.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    /// Free-text description.
    pub description: Option<String>,
}

/// A response definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    /// Free-text description.
    pub description: Option<String>,
    /// Media types keyed by content type; absent for empty responses.
    pub content: Option<IndexMap<String, MediaType>>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    /// Payload schema.
    pub schema: Option<Schema>,
}

/// Either a `$ref` or an inline value.
///
/// Any object carrying a `$ref` key is a reference; sibling keys are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// A `$ref` to resolve against the document.
    Ref {
        /// The reference string.
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    /// An inline value.
    Item(T),
}

/// JSON Schema definition used in OpenAPI.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Reference to another schema.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    /// The type of the schema (string, number, integer, boolean, object, array, null).
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    /// Format hint; only `binary` changes the translation.
    pub format: Option<String>,
    /// Preferred source of enum declaration names.
    pub title: Option<String>,
    /// Becomes the doc comment of the alias or property.
    pub description: Option<String>,

    /// Properties for object types.
    pub properties: Option<IndexMap<String, Schema>>,

    /// Required property names for object types.
    pub required: Option<Vec<String>>,

    /// Additional properties (boolean or schema).
    pub additional_properties: Option<AdditionalProperties>,

    /// Item schema for array types.
    pub items: Option<Box<Schema>>,

    /// Tuple item schemas.
    pub prefix_items: Option<Vec<Schema>>,

    /// Enum values, kept as raw JSON.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,

    /// Constant value. `Some(Value::Null)` means `const: null` was written.
    #[serde(rename = "const", default, deserialize_with = "deserialize_present")]
    pub const_value: Option<Value>,

    /// Exclusive alternatives.
    pub one_of: Option<Vec<Schema>>,
    /// Inclusive alternatives.
    pub any_of: Option<Vec<Schema>>,
    /// Intersected branches.
    pub all_of: Option<Vec<Schema>>,

    /// Tag property for polymorphic schemas.
    pub discriminator: Option<Discriminator>,

    /// OpenAPI 3.0 style nullable.
    pub nullable: Option<bool>,
    /// Only present in responses.
    pub read_only: Option<bool>,
    /// Only present in requests.
    pub write_only: Option<bool>,
    /// Marks the property `@deprecated`.
    pub deprecated: Option<bool>,

    /// Member-name override for enums.
    #[serde(rename = "x-enumNames")]
    pub x_enum_names: Option<Vec<String>>,

    /// Alternate spelling of the member-name override.
    #[serde(rename = "x-enum-varnames")]
    pub x_enum_varnames: Option<Vec<String>>,
}

/// Keep `Some(Value::Null)` for an explicit `null` instead of collapsing it to `None`.
fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Discriminator for polymorphic types.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
    /// Name of the tag property.
    pub property_name: Option<String>,
    /// Tag value to schema ref.
    pub mapping: Option<IndexMap<String, String>>,
}

/// Schema type can be a single type or an array of types (OpenAPI 3.1).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `"type": "string"`
    Single(String),
    /// `"type": ["string", "null"]`
    Multiple(Vec<String>),
}

impl SchemaType {
    /// Check whether the given type name is among the declared ones.
    pub fn includes(&self, name: &str) -> bool {
        match self {
            SchemaType::Single(t) => t == name,
            SchemaType::Multiple(ts) => ts.iter().any(|t| t == name),
        }
    }
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` allows any extra property, `false` none.
    Bool(bool),
    /// Extra properties must match this schema.
    Schema(Box<Schema>),
}

impl Schema {
    /// A bare `{ "$ref": ... }` schema.
    pub fn reference(ref_path: impl Into<String>) -> Self {
        Self {
            ref_path: Some(ref_path.into()),
            ..Self::default()
        }
    }

    /// A `{ "type": ... }` schema, optionally with a format.
    pub fn typed(schema_type: &str, format: Option<&str>) -> Self {
        Self {
            schema_type: Some(SchemaType::Single(schema_type.to_string())),
            format: format.map(str::to_string),
            ..Self::default()
        }
    }

    /// `nullable: true` was written.
    pub fn is_nullable(&self) -> bool {
        self.nullable.unwrap_or(false)
    }

    /// Check whether a property is listed in `required`.
    pub fn requires(&self, property: &str) -> bool {
        self.required
            .as_ref()
            .is_some_and(|names| names.iter().any(|n| n == property))
    }

    /// The explicit member-name override, first spelling found wins.
    pub fn enum_member_names(&self) -> Option<&[String]> {
        self.x_enum_names
            .as_deref()
            .or(self.x_enum_varnames.as_deref())
    }

    /// Classify this schema into exactly one translation case.
    ///
    /// The order of the checks is the dispatch priority:
    /// ref > oneOf > anyOf > bare discriminator > allOf > items > prefixItems
    /// > properties > enum > binary > const > primitive.
    pub fn kind(&self) -> SchemaKind<'_> {
        if let Some(ref_path) = &self.ref_path {
            return SchemaKind::Reference(ref_path);
        }
        if let Some(variants) = &self.one_of {
            return SchemaKind::OneOf {
                variants,
                discriminator: self.discriminator.as_ref(),
            };
        }
        if let Some(variants) = &self.any_of {
            return SchemaKind::AnyOf(variants);
        }
        if let Some(discriminator) = &self.discriminator {
            return SchemaKind::Discriminated(discriminator);
        }
        if let Some(branches) = &self.all_of {
            return SchemaKind::AllOf(branches);
        }
        if let Some(items) = &self.items {
            return SchemaKind::Array(items);
        }
        if let Some(items) = &self.prefix_items {
            return SchemaKind::Tuple(items);
        }
        if self.properties.is_some() || self.additional_properties.is_some() {
            return SchemaKind::Object;
        }
        if let Some(values) = &self.enum_values {
            return SchemaKind::Enum(values);
        }
        if self.format.as_deref() == Some("binary") {
            return SchemaKind::Binary;
        }
        if let Some(value) = &self.const_value {
            return SchemaKind::Const(value);
        }
        SchemaKind::Primitive(self.schema_type.as_ref())
    }
}

/// The translation case a schema falls into. See [`Schema::kind`].
#[derive(Debug, Clone, Copy)]
pub enum SchemaKind<'s> {
    /// `$ref`, with the ref string.
    Reference(&'s str),
    /// `oneOf`, tagged when a discriminator sits next to it.
    OneOf {
        /// The alternatives.
        variants: &'s [Schema],
        /// Sibling discriminator, if any.
        discriminator: Option<&'s Discriminator>,
    },
    /// `anyOf`.
    AnyOf(&'s [Schema]),
    /// A discriminator without `oneOf`/`anyOf`.
    Discriminated(&'s Discriminator),
    /// `allOf`.
    AllOf(&'s [Schema]),
    /// `items`.
    Array(&'s Schema),
    /// `prefixItems`.
    Tuple(&'s [Schema]),
    /// `properties` or `additionalProperties`.
    Object,
    /// `enum`.
    Enum(&'s [Value]),
    /// `format: binary`.
    Binary,
    /// `const`, including `const: null`.
    Const(&'s Value),
    /// Everything else, by `type`.
    Primitive(Option<&'s SchemaType>),
}

impl Document {
    /// Deserialize the typed view of an already-parsed document.
    pub fn from_value(raw: &Value) -> Result<Self> {
        let document =
            Document::deserialize(raw).map_err(|source| GenerateError::InvalidDocument {
                path: "document".into(),
                source,
            })?;
        if let Some(version) = &document.swagger {
            return Err(GenerateError::UnsupportedVersion {
                version: version.clone(),
            });
        }
        Ok(document)
    }
}

/// Parse document text as JSON or YAML into a raw value tree.
///
/// Text whose first non-blank character is `{` is read as JSON; anything else
/// goes through the YAML parser.
pub fn parse_document(text: &str) -> Result<Value> {
    if text.trim_start().starts_with('{') {
        return serde_json::from_str(text).map_err(|e| GenerateError::Parse(e.to_string()));
    }
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| GenerateError::Parse(e.to_string()))?;
    yaml_to_json(yaml)
}

/// Convert a YAML tree to JSON, turning scalar mapping keys into strings.
///
/// Unquoted status codes (`200:`) are integers in YAML but strings in OpenAPI.
fn yaml_to_json(value: serde_yaml::Value) -> Result<Value> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => yaml_number(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = serde_json::Map::new();
            for (key, value) in mapping {
                let key = match key {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Null => "null".to_string(),
                    other => {
                        return Err(GenerateError::Parse(format!(
                            "unsupported mapping key {other:?}"
                        )));
                    }
                };
                object.insert(key, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::from(i)
    } else if let Some(u) = n.as_u64() {
        Value::from(u)
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map_or(Value::Null, Value::Number)
    }
}
