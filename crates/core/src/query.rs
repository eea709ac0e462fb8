//! Query-string styles for OpenAPI parameters.
//!
//! [`QueryStyle::for_parameter`] picks the runtime helper a generated function
//! calls for a query parameter. The encoder functions here have the same wire
//! semantics as the shipped `runtime/query.ts`, so the output of generated
//! code can be checked from Rust.
//!
//! Values are `serde_json::Value`s; `Value::Null` stands for `undefined` and
//! is dropped before encoding.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

use crate::error::{GenerateError, Result};
use crate::openapi::spec::Parameter;

/// Characters `encodeURIComponent` escapes.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Query encoder selected by `style` and `explode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryStyle {
    /// `style=form, explode=false`: `a=1,2`
    Form,
    /// `explode=true`: `a=1&a=2`
    Explode,
    /// `style=deepObject`: `a[b]=1`
    Deep,
    /// `style=spaceDelimited`: `a=1%202`
    Space,
    /// `style=pipeDelimited`: `a=1|2`
    Pipe,
    /// `content` parameters: `a=<encoded JSON>`
    Json,
}

impl QueryStyle {
    /// Name of the runtime helper.
    pub fn as_str(self) -> &'static str {
        match self {
            QueryStyle::Form => "form",
            QueryStyle::Explode => "explode",
            QueryStyle::Deep => "deep",
            QueryStyle::Space => "space",
            QueryStyle::Pipe => "pipe",
            QueryStyle::Json => "json",
        }
    }

    /// Pick the encoder for a query parameter.
    ///
    /// A `content` map must have exactly one JSON media type. Otherwise
    /// `explode` defaults to true and wins over the delimited styles.
    pub fn for_parameter(param: &Parameter) -> Result<Self> {
        if let Some(content) = &param.content {
            let mut media_types = content.keys();
            return match (media_types.next(), media_types.next()) {
                (Some(media_type), None) if is_json_media_type(media_type) => Ok(QueryStyle::Json),
                (Some(media_type), None) => Err(GenerateError::AmbiguousContentParameter {
                    name: param.name.clone(),
                    reason: format!("content type {media_type} is not JSON"),
                }),
                (None, _) => Err(GenerateError::AmbiguousContentParameter {
                    name: param.name.clone(),
                    reason: "content map is empty".into(),
                }),
                (Some(_), Some(_)) => Err(GenerateError::AmbiguousContentParameter {
                    name: param.name.clone(),
                    reason: format!("expected one content type, found {}", content.len()),
                }),
            };
        }

        let explode = param.explode.unwrap_or(true);
        let style = param.style.as_deref();
        Ok(match style {
            Some("deepObject") if explode => QueryStyle::Deep,
            _ if explode => QueryStyle::Explode,
            Some("spaceDelimited") => QueryStyle::Space,
            Some("pipeDelimited") => QueryStyle::Pipe,
            _ => QueryStyle::Form,
        })
    }

    /// Encode named values into one query fragment (no leading `?`).
    pub fn encode(self, params: &[(&str, &Value)]) -> String {
        let defined = params.iter().filter(|(_, value)| !value.is_null());
        let parts: Vec<String> = match self {
            QueryStyle::Form => defined.map(|(n, v)| delimited(n, v, ",")).collect(),
            QueryStyle::Space => defined.map(|(n, v)| delimited(n, v, "%20")).collect(),
            QueryStyle::Pipe => defined.map(|(n, v)| delimited(n, v, "|")).collect(),
            QueryStyle::Explode => defined.map(|(n, v)| exploded(n, v)).collect(),
            QueryStyle::Deep => defined.map(|(n, v)| deep(&encode_component(n), v)).collect(),
            QueryStyle::Json => defined
                .map(|(n, v)| format!("{}={}", encode_component(n), encode_component(&v.to_string())))
                .collect(),
        };
        parts.into_iter().filter(|p| !p.is_empty()).collect::<Vec<_>>().join("&")
    }
}

/// JSON-compatible media types: anything mentioning `json`, or `*/*`.
pub fn is_json_media_type(media_type: &str) -> bool {
    media_type == "*/*" || media_type.to_ascii_lowercase().contains("json")
}

/// Join encoder outputs into a query string: `?a=1&b=2`, or empty.
pub fn query(parts: &[String]) -> String {
    let joined = parts
        .iter()
        .filter(|p| !p.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("&");
    if joined.is_empty() {
        joined
    } else {
        format!("?{joined}")
    }
}

/// Percent-encode like `encodeURIComponent`.
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// String form of a scalar, as JavaScript would interpolate it.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn delimited(name: &str, value: &Value, delimiter: &str) -> String {
    let items: Vec<String> = match value {
        Value::Array(items) => items.iter().map(|v| encode_component(&scalar(v))).collect(),
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .flat_map(|(k, v)| [encode_component(k), encode_component(&scalar(v))])
            .collect(),
        scalar_value => vec![encode_component(&scalar(scalar_value))],
    };
    format!("{}={}", encode_component(name), items.join(delimiter))
}

fn exploded(name: &str, value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|v| format!("{}={}", encode_component(name), encode_component(&scalar(v))))
            .collect::<Vec<_>>()
            .join("&"),
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| exploded(k, v))
            .collect::<Vec<_>>()
            .join("&"),
        scalar_value => format!("{}={}", encode_component(name), encode_component(&scalar(scalar_value))),
    }
}

/// `key` is already encoded; nested keys are appended in brackets.
fn deep(key: &str, value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| deep(&format!("{key}[{}]", encode_component(k)), v))
            .collect::<Vec<_>>()
            .join("&"),
        Value::Array(items) => items
            .iter()
            .map(|v| format!("{key}={}", encode_component(&scalar(v))))
            .collect::<Vec<_>>()
            .join("&"),
        scalar_value => format!("{key}={}", encode_component(&scalar(scalar_value))),
    }
}
