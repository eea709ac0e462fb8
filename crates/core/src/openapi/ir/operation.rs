//! OpenAPI operations to API IR.
//!
//! Operations are visited in document path order and fixed verb order, which
//! together with the shared name tables makes the output deterministic.

use std::borrow::Cow;
use std::collections::HashSet;

use indexmap::IndexMap;

use super::api::{
    BodyEncoding, BodyIR, HttpMethod, OperationIR, ParamIR, ResponseIR, ResponseStatus,
    ResponseStrategy, ResponseVariant,
};
use super::context::Generator;
use super::naming::{OnlyMode, operation_names, to_identifier};
use super::types::TsDoc;
use super::utils::capitalize_first;
use crate::error::Result;
use crate::openapi::resolver::stable_name;
use crate::openapi::spec::{
    Document, MediaType, Operation, ParamLocation, Parameter, PathItem, RequestBody, Schema,
};
use crate::query::{QueryStyle, is_json_media_type};

impl Generator<'_> {
    /// Normalize every operation that passes the tag filter.
    pub fn normalize_operations(&mut self, document: &Document) -> Result<Vec<OperationIR>> {
        let mut operations = Vec::new();
        for (path, item) in &document.paths {
            for (method, op) in item.operations() {
                if !self.options.keeps_tags(&op.tags) {
                    tracing::debug!(
                        path = %path,
                        method = method.as_str(),
                        tags = ?op.tags,
                        "Skipping operation excluded by tag filter"
                    );
                    continue;
                }
                operations.push(self.normalize_operation(path, item, method, op)?);
            }
        }
        Ok(operations)
    }

    fn normalize_operation(
        &mut self,
        path: &str,
        item: &PathItem,
        method: HttpMethod,
        op: &Operation,
    ) -> Result<OperationIR> {
        let names = operation_names(method.as_lower(), path, op.operation_id.as_deref());
        let name = self.operation_names.unique(&names.primary);
        let legacy_name = names
            .legacy
            .map(|legacy| self.operation_names.unique(&legacy));

        let parameters = self.merged_parameters(item, op)?;
        let arg_names = argument_names(&parameters);
        let params = parameters
            .iter()
            .zip(arg_names)
            .map(|(param, arg_name)| self.normalize_param(param, arg_name))
            .collect::<Result<Vec<_>>>()?;

        let resolver = self.resolver;
        let body = match &op.request_body {
            Some(body) => {
                let mut body = self.normalize_body(&*resolver.resolve(body)?)?;
                if params.iter().any(|p| p.arg_name == body.arg_name) {
                    body.arg_name.push_str("Body");
                }
                Some(body)
            }
            None => None,
        };

        let response = self.normalize_response(op)?;
        tracing::trace!(name = %name, method = method.as_str(), path, "Normalized operation");

        Ok(OperationIR {
            name,
            legacy_name,
            method,
            path: path.to_string(),
            doc: operation_doc(op),
            params,
            body,
            response,
        })
    }

    /// Path-item parameters overridden by operation parameters on `(name, in)`.
    fn merged_parameters(&self, item: &PathItem, op: &Operation) -> Result<Vec<Parameter>> {
        let mut merged: Vec<Parameter> = self
            .resolver
            .resolve_array(Some(item.parameters.as_slice()))?
            .into_iter()
            .map(Cow::into_owned)
            .collect();
        for param in self.resolver.resolve_array(Some(op.parameters.as_slice()))? {
            let param = param.into_owned();
            match merged
                .iter_mut()
                .find(|p| p.name == param.name && p.location == param.location)
            {
                Some(slot) => *slot = param,
                None => merged.push(param),
            }
        }
        Ok(merged)
    }

    fn normalize_param(&mut self, param: &Parameter, arg_name: String) -> Result<ParamIR> {
        let schema = match &param.content {
            Some(content) => content.values().next().and_then(|m| m.schema.as_ref()),
            None => param.schema.as_ref(),
        };
        let ty = self.type_from_schema(schema, Some(&param.name), OnlyMode::WriteOnly)?;
        let query_style = match param.location {
            ParamLocation::Query => Some(QueryStyle::for_parameter(param)?),
            _ => None,
        };
        Ok(ParamIR {
            name: param.name.clone(),
            arg_name,
            location: param.location,
            required: param.required || param.location == ParamLocation::Path,
            ty,
            query_style,
        })
    }

    fn normalize_body(&mut self, body: &RequestBody) -> Result<BodyIR> {
        let schema = schema_from_content(&body.content);
        let ty = self.type_from_schema(Some(&*schema), None, OnlyMode::WriteOnly)?;

        let arg_name = match schema.ref_path.as_deref() {
            Some(reference) => {
                let type_name = self
                    .refs
                    .get(reference)
                    .map_or_else(|| stable_name(reference), |entry| entry.base.clone());
                to_identifier(&type_name, false, OnlyMode::Base)
            }
            None => "body".to_string(),
        };

        Ok(BodyIR {
            arg_name,
            ty,
            required: body.required,
            encoding: body_encoding(body.content.keys().map(String::as_str)),
        })
    }

    fn normalize_response(&mut self, op: &Operation) -> Result<ResponseIR> {
        let resolver = self.resolver;
        let mut variants = Vec::with_capacity(op.responses.len());
        let mut media_types: Vec<String> = Vec::new();

        for (code, response) in &op.responses {
            let response = resolver.resolve(response)?;
            let status = code
                .parse::<i64>()
                .map_or(ResponseStatus::Any, ResponseStatus::Code);
            let data = match &response.content {
                Some(content) => {
                    media_types.extend(content.keys().cloned());
                    let schema = schema_from_content(content);
                    Some(self.type_from_schema(Some(&*schema), None, OnlyMode::ReadOnly)?)
                }
                None => None,
            };
            variants.push(ResponseVariant { status, data });
        }

        Ok(ResponseIR {
            strategy: response_strategy(&media_types),
            variants,
        })
    }
}

/// Sort by name length, then name each argument; a taken identifier gets
/// the capitalized location appended (`id`, `idQuery`).
fn argument_names(params: &[Parameter]) -> Vec<String> {
    let mut order: Vec<usize> = (0..params.len()).collect();
    order.sort_by_key(|&i| params[i].name.chars().count());

    let mut names = vec![String::new(); params.len()];
    let mut taken = HashSet::new();
    for i in order {
        let param = &params[i];
        let mut arg = to_identifier(&param.name, false, OnlyMode::Base);
        if taken.contains(&arg) {
            arg.push_str(&capitalize_first(param.location.as_str()));
        }
        taken.insert(arg.clone());
        names[i] = arg;
    }
    names
}

/// `type/subtype` with text on both sides of a single `/`.
///
/// Parameters are allowed (`application/json; charset=utf-8`), and so are
/// wildcards like `*/*`.
fn is_mime_type(s: &str) -> bool {
    let mut parts = s.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(kind), Some(subtype), None) => !kind.is_empty() && !subtype.is_empty(),
        _ => false,
    }
}

/// `application/json` out of `Application/JSON; charset=utf-8`.
fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or(media_type)
        .trim()
        .to_ascii_lowercase()
}

/// Schema of the first media type declaring one, or a string/binary stand-in.
fn schema_from_content(content: &IndexMap<String, MediaType>) -> Cow<'_, Schema> {
    let declared = content
        .iter()
        .filter(|(media_type, _)| is_mime_type(media_type))
        .find_map(|(_, media)| media.schema.as_ref());
    if let Some(schema) = declared {
        return Cow::Borrowed(schema);
    }
    if content.is_empty() || content.keys().any(|k| k.starts_with("text/")) {
        Cow::Owned(Schema::typed("string", None))
    } else {
        Cow::Owned(Schema::typed("string", Some("binary")))
    }
}

/// Encoding over every declared content type: json, then form, then multipart.
fn body_encoding<'c>(content_types: impl Iterator<Item = &'c str>) -> Option<BodyEncoding> {
    let essences: Vec<String> = content_types
        .filter(|ct| is_mime_type(ct))
        .map(essence)
        .collect();
    if essences.iter().any(|ct| is_json_media_type(ct)) {
        Some(BodyEncoding::Json)
    } else if essences.iter().any(|ct| ct == "application/x-www-form-urlencoded") {
        Some(BodyEncoding::Form)
    } else if essences.iter().any(|ct| ct == "multipart/form-data") {
        Some(BodyEncoding::Multipart)
    } else {
        None
    }
}

/// `text` without any content, then json > text/* > blob.
fn response_strategy(media_types: &[String]) -> ResponseStrategy {
    if media_types.is_empty() {
        ResponseStrategy::Text
    } else if media_types.iter().any(|m| is_json_media_type(m)) {
        ResponseStrategy::Json
    } else if media_types.iter().any(|m| m.starts_with("text/")) {
        ResponseStrategy::Text
    } else {
        ResponseStrategy::Blob
    }
}

fn operation_doc(op: &Operation) -> Option<TsDoc> {
    let mut lines = op
        .summary
        .as_deref()
        .or(op.description.as_deref())
        .and_then(TsDoc::from_text)
        .map(|doc| doc.0)
        .unwrap_or_default();
    if op.deprecated {
        lines.push("@deprecated".into());
    }
    (!lines.is_empty()).then_some(TsDoc(lines))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::GenerateError;
    use crate::openapi::ir::Emit;
    use crate::openapi::options::GenerateOptions;
    use serde_json::{Value, json};

    fn normalize(raw: Value, options: GenerateOptions) -> Result<Vec<OperationIR>> {
        let document = Document::from_value(&raw)?;
        let mut generator = Generator::new(&raw, &document, &options);
        generator.normalize_operations(&document)
    }

    fn single(raw: Value) -> OperationIR {
        normalize(raw, GenerateOptions::default()).unwrap().remove(0)
    }

    fn encoding(content_types: &[&str]) -> Option<BodyEncoding> {
        body_encoding(content_types.iter().copied())
    }

    #[test]
    fn test_mime_types() {
        assert!(is_mime_type("application/json"));
        assert!(is_mime_type("application/json; charset=utf-8"));
        assert!(is_mime_type("*/*"));
        assert!(!is_mime_type("json"));
        assert!(!is_mime_type("/json"));
        assert!(!is_mime_type("a/b/c"));
    }

    #[test]
    fn test_body_encoding() {
        assert_eq!(encoding(&["application/json"]), Some(BodyEncoding::Json));
        assert_eq!(encoding(&["application/vnd.api+JSON"]), Some(BodyEncoding::Json));
        assert_eq!(encoding(&["*/*"]), Some(BodyEncoding::Json));
        assert_eq!(encoding(&["application/x-www-form-urlencoded"]), Some(BodyEncoding::Form));
        assert_eq!(encoding(&["multipart/form-data"]), Some(BodyEncoding::Multipart));
        assert_eq!(encoding(&["application/octet-stream"]), None);
        assert_eq!(encoding(&[]), None);
    }

    #[test]
    fn test_body_encoding_scans_every_content_type() {
        assert_eq!(
            encoding(&["application/octet-stream", "multipart/form-data", "application/json"]),
            Some(BodyEncoding::Json)
        );
        assert_eq!(
            encoding(&["multipart/form-data", "application/x-www-form-urlencoded"]),
            Some(BodyEncoding::Form)
        );
        assert_eq!(
            encoding(&["text/plain", "multipart/form-data; boundary=x"]),
            Some(BodyEncoding::Multipart)
        );
        assert_eq!(
            encoding(&["Application/X-WWW-Form-Urlencoded; charset=utf-8"]),
            Some(BodyEncoding::Form)
        );
    }

    #[test]
    fn test_response_strategy() {
        assert_eq!(response_strategy(&[]), ResponseStrategy::Text);
        assert_eq!(
            response_strategy(&["text/plain".into(), "application/json".into()]),
            ResponseStrategy::Json
        );
        assert_eq!(response_strategy(&["text/plain".into()]), ResponseStrategy::Text);
        assert_eq!(response_strategy(&["image/png".into()]), ResponseStrategy::Blob);
    }

    #[test]
    fn test_parameter_merging_and_argument_names() {
        let op = single(json!({
            "openapi": "3.0.0",
            "paths": { "/pets/{id}": {
                "parameters": [
                    { "name": "id", "in": "path", "schema": { "type": "string" } },
                    { "name": "verbose", "in": "query", "schema": { "type": "boolean" } }
                ],
                "get": {
                    "parameters": [
                        { "name": "verbose", "in": "query", "required": true, "schema": { "type": "integer" } },
                        { "name": "id", "in": "query", "schema": { "type": "string" } },
                        { "name": "X-Request-ID", "in": "header", "schema": { "type": "string" } }
                    ],
                    "responses": {}
                }
            } }
        }));
        let summary: Vec<_> = op
            .params
            .iter()
            .map(|p| (p.name.as_str(), p.arg_name.as_str(), p.required, p.ty.emit()))
            .collect();
        assert_eq!(
            summary,
            [
                ("id", "id", true, "string".to_string()),
                ("verbose", "verbose", true, "number".to_string()),
                ("id", "idQuery", false, "string".to_string()),
                ("X-Request-ID", "xRequestId", false, "string".to_string()),
            ]
        );
        assert_eq!(op.params[1].query_style, Some(QueryStyle::Explode));
        assert_eq!(op.params[0].query_style, None);
    }

    #[test]
    fn test_body_naming_and_encoding() {
        let op = single(json!({
            "openapi": "3.0.0",
            "paths": { "/pets": { "post": {
                "requestBody": {
                    "required": true,
                    "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewPet" } } }
                },
                "responses": { "201": { "description": "created" } }
            } } },
            "components": { "schemas": { "NewPet": { "type": "object" } } }
        }));
        let body = op.body.unwrap();
        assert_eq!(body.arg_name, "newPet");
        assert_eq!(body.ty.emit(), "NewPet");
        assert!(body.required);
        assert_eq!(body.encoding, Some(BodyEncoding::Json));

        let op = single(json!({
            "openapi": "3.0.0",
            "paths": { "/upload": { "put": {
                "requestBody": { "content": { "application/octet-stream": {} } },
                "responses": {}
            } } }
        }));
        let body = op.body.unwrap();
        assert_eq!(body.arg_name, "body");
        assert_eq!(body.ty.emit(), "Blob");
        assert!(!body.required);
        assert_eq!(body.encoding, None);
    }

    #[test]
    fn test_media_type_parameters_keep_the_schema() {
        let op = single(json!({
            "openapi": "3.0.0",
            "paths": { "/pets": { "post": {
                "requestBody": { "content": { "application/json; charset=utf-8": {
                    "schema": { "$ref": "#/components/schemas/Pet" } } } },
                "responses": { "200": { "description": "ok", "content": {
                    "application/json; charset=utf-8": { "schema": { "$ref": "#/components/schemas/Pet" } } } } }
            } } },
            "components": { "schemas": { "Pet": { "type": "object" } } }
        }));
        let body = op.body.unwrap();
        assert_eq!(body.ty.emit(), "Pet");
        assert_eq!(body.arg_name, "pet");
        assert_eq!(body.encoding, Some(BodyEncoding::Json));
        assert_eq!(op.response.strategy, ResponseStrategy::Json);
        assert_eq!(op.response.variants[0].data.as_ref().unwrap().emit(), "Pet");
    }

    #[test]
    fn test_schema_comes_from_first_media_type_declaring_one() {
        let op = single(json!({
            "openapi": "3.0.0",
            "paths": { "/pets": { "post": {
                "requestBody": { "content": {
                    "application/octet-stream": {},
                    "application/json": { "schema": { "type": "object", "properties": { "name": { "type": "string" } } } }
                } },
                "responses": {}
            } } }
        }));
        let body = op.body.unwrap();
        assert_eq!(body.ty.emit(), "{\n  name?: string;\n}");
        assert_eq!(body.encoding, Some(BodyEncoding::Json));
    }

    #[test]
    fn test_responses() {
        let op = single(json!({
            "openapi": "3.0.0",
            "paths": { "/pets": { "get": { "responses": {
                "200": { "description": "ok", "content": { "application/json": { "schema": { "type": "string" } } } },
                "default": { "description": "error" }
            } } } }
        }));
        assert_eq!(op.response.strategy, ResponseStrategy::Json);
        assert_eq!(op.response.variants[0].status, ResponseStatus::Code(200));
        assert_eq!(op.response.variants[1].status, ResponseStatus::Any);
        assert!(op.response.variants[1].data.is_none());
    }

    #[test]
    fn test_only_400_text_is_text() {
        let op = single(json!({
            "openapi": "3.0.0",
            "paths": { "/pets": { "get": { "responses": {
                "400": { "description": "bad", "content": { "text/plain": { "schema": { "type": "string" } } } }
            } } } }
        }));
        assert_eq!(op.response.strategy, ResponseStrategy::Text);
    }

    #[test]
    fn test_names_and_docs() {
        let ops = normalize(
            json!({
                "openapi": "3.0.0",
                "paths": {
                    "/pets": {
                        "get": { "operationId": "API\\PetController::listPetAction", "summary": "List pets", "responses": {} },
                        "post": { "operationId": "listPets", "deprecated": true, "responses": {} }
                    },
                    "/pets/{id}": { "get": { "responses": {} } },
                    "/other": { "get": { "operationId": "listPets", "responses": {} } }
                }
            }),
            GenerateOptions::default(),
        )
        .unwrap();
        let names: Vec<_> = ops
            .iter()
            .map(|op| (op.name.as_str(), op.legacy_name.as_deref()))
            .collect();
        assert_eq!(
            names,
            [
                ("apiPetControllerListPetAction", Some("getPets")),
                ("listPets", None),
                ("getPetsById", None),
                ("listPets2", None),
            ]
        );
        assert_eq!(ops[0].doc, Some(TsDoc(vec!["List pets".into()])));
        assert_eq!(ops[1].doc, Some(TsDoc(vec!["@deprecated".into()])));
    }

    #[test]
    fn test_tag_filters() {
        let raw = json!({
            "openapi": "3.0.0",
            "paths": { "/a": {
                "get": { "tags": ["pets"], "responses": {} },
                "post": { "tags": ["admin"], "responses": {} },
                "put": { "responses": {} }
            } }
        });
        let options = GenerateOptions {
            exclude: vec!["admin".into()],
            ..GenerateOptions::default()
        };
        let names: Vec<_> = normalize(raw.clone(), options)
            .unwrap()
            .into_iter()
            .map(|op| op.name)
            .collect();
        assert_eq!(names, ["getA", "putA"]);

        let options = GenerateOptions {
            include: vec!["pets".into()],
            ..GenerateOptions::default()
        };
        let names: Vec<_> = normalize(raw, options)
            .unwrap()
            .into_iter()
            .map(|op| op.name)
            .collect();
        assert_eq!(names, ["getA"]);
    }

    #[test]
    fn test_ambiguous_content_parameter_aborts() {
        let err = normalize(
            json!({
                "openapi": "3.0.0",
                "paths": { "/a": { "get": {
                    "parameters": [{ "name": "filter", "in": "query",
                        "content": { "application/json": {}, "text/plain": {} } }],
                    "responses": {}
                } } }
            }),
            GenerateOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::AmbiguousContentParameter { .. }));
    }
}
