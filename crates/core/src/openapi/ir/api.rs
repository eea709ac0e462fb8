//! API-level IR for normalized operations.
//!
//! This module defines the intermediate representation for API operations:
//! - OperationIR: one callable per (path, verb)
//! - ParamIR / BodyIR: the callable's inputs
//! - ResponseIR: decoding strategy and per-status payload types
//! - ApiIR: everything codegen needs for one module

use super::types::{TsDoc, TsType, TsTypeDef};
use crate::openapi::spec::{Operation, ParamLocation, PathItem};
use crate::query::QueryStyle;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Verbs in the order operations are visited within a path item.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lowercase verb, as used for fallback operation names.
    pub fn as_lower(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl PathItem {
    /// The operation declared for `method`.
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }

    /// Declared operations in visiting order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(|method| self.operation(method).map(|op| (method, op)))
    }
}

/// Normalized API operation
#[derive(Debug, Clone)]
pub struct OperationIR {
    /// Function name after collision handling (e.g., "listPets")
    pub name: String,
    /// Deprecated alias kept for the verb + path naming scheme
    pub legacy_name: Option<String>,
    pub method: HttpMethod,
    /// URL path (e.g., "/pets/{petId}")
    pub path: String,
    /// Summary or description, plus `@deprecated` when flagged
    pub doc: Option<TsDoc>,
    /// Merged path-item and operation parameters, in declaration order
    pub params: Vec<ParamIR>,
    pub body: Option<BodyIR>,
    pub response: ResponseIR,
}

impl OperationIR {
    pub fn required_params(&self) -> impl Iterator<Item = &ParamIR> {
        self.params.iter().filter(|p| p.required)
    }

    pub fn optional_params(&self) -> impl Iterator<Item = &ParamIR> {
        self.params.iter().filter(|p| !p.required)
    }

    pub fn params_in(&self, location: ParamLocation) -> impl Iterator<Item = &ParamIR> {
        self.params.iter().filter(move |p| p.location == location)
    }
}

/// A single operation parameter
#[derive(Debug, Clone)]
pub struct ParamIR {
    /// Original name, used as the wire key
    pub name: String,
    /// Identifier of the function argument
    pub arg_name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub ty: TsType,
    /// Encoder for query parameters
    pub query_style: Option<QueryStyle>,
}

/// Request body encoding family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Json,
    Form,
    Multipart,
}

impl BodyEncoding {
    /// Name of the runtime init builder.
    pub fn as_str(self) -> &'static str {
        match self {
            BodyEncoding::Json => "json",
            BodyEncoding::Form => "form",
            BodyEncoding::Multipart => "multipart",
        }
    }
}

/// Request body parameter
#[derive(Debug, Clone)]
pub struct BodyIR {
    pub arg_name: String,
    pub ty: TsType,
    pub required: bool,
    /// `None` sends the body as-is
    pub encoding: Option<BodyEncoding>,
}

/// How the runtime decodes the response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStrategy {
    Json,
    Text,
    Blob,
}

impl ResponseStrategy {
    /// Runtime fetch function for this strategy.
    pub fn runtime_fn(self) -> &'static str {
        match self {
            ResponseStrategy::Json => "fetchJson",
            ResponseStrategy::Text => "fetchText",
            ResponseStrategy::Blob => "fetchBlob",
        }
    }
}

/// Status of a response variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// A concrete status code like `200`
    Code(i64),
    /// `default`, `2XX` and other non-numeric keys
    Any,
}

/// One `{ status, data }` member of the response union
#[derive(Debug, Clone)]
pub struct ResponseVariant {
    pub status: ResponseStatus,
    /// `None` when the response declares no content
    pub data: Option<TsType>,
}

/// Response information
#[derive(Debug, Clone)]
pub struct ResponseIR {
    pub strategy: ResponseStrategy,
    pub variants: Vec<ResponseVariant>,
}

/// Complete API IR for one generated module
#[derive(Debug, Clone, Default)]
pub struct ApiIR {
    pub operations: Vec<OperationIR>,
    /// Type aliases, in the order they were completed
    pub types: Vec<TsTypeDef>,
    /// Named enum declarations
    pub enums: Vec<TsTypeDef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operations_follow_verb_order() {
        let item: PathItem = serde_json::from_str(
            r#"{ "post": {}, "trace": {}, "get": {}, "delete": {} }"#,
        )
        .unwrap_or_default();
        let methods: Vec<_> = item.operations().map(|(m, _)| m.as_lower()).collect();
        assert_eq!(methods, ["get", "post", "delete", "trace"]);
    }

    #[test]
    fn test_runtime_names() {
        assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
        assert_eq!(BodyEncoding::Multipart.as_str(), "multipart");
        assert_eq!(ResponseStrategy::Blob.runtime_fn(), "fetchBlob");
    }
}
