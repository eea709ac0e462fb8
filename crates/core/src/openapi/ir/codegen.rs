//! Code generation from API IR to TypeScript AST.
//!
//! This module turns normalized operations into function declarations and
//! assembles the module around them: header, runtime imports, the `servers`
//! and `defaults` stubs, type and enum declarations.
//!
//! The generated AST can then be emitted to strings via the `Emit` trait.

use super::api::{ApiIR, HttpMethod, OperationIR, ParamIR, ResponseIR, ResponseStatus, ResponseStrategy};
use super::naming::{OnlyMode, OperationNames, to_identifier};
use super::types::{
    BindingElement, ImportClause, ObjectEntry, ParamPattern, TemplatePart, TsDoc, TsExpr,
    TsFunction, TsImport, TsItem, TsLiteral, TsModule, TsParam, TsPrimitive, TsProp, TsStmt,
    TsType,
};
use crate::error::{GenerateError, Result};
use crate::openapi::options::GenerateOptions;
use crate::openapi::spec::{Document, Info, ParamLocation, Server};
use crate::query::QueryStyle;

/// Helpers generated modules re-export from the runtime.
const RUNTIME_REEXPORTS: [&str; 5] = ["HttpError", "handle", "ok", "okify", "optimistic"];

/// Generate a complete TypeScript module from API IR.
pub fn codegen_module(api: &ApiIR, document: &Document, options: &GenerateOptions) -> Result<TsModule> {
    let mut statements = stub_statements(&document.servers);
    apply_default_base_url(&mut statements, &default_base_url(&document.servers))?;

    let items = api
        .operations
        .iter()
        .flat_map(|op| codegen_operation(op, options.optimistic))
        .collect();

    Ok(TsModule {
        header: Some(header(&document.info)),
        imports: codegen_imports(&options.runtime_module),
        statements,
        types: api.types.iter().chain(&api.enums).cloned().collect(),
        items,
    })
}

fn header(info: &Info) -> TsDoc {
    let mut lines: Vec<String> = [&info.title, &info.version]
        .into_iter()
        .filter(|s| !s.is_empty())
        .cloned()
        .collect();
    lines.push("DO NOT MODIFY - This file has been generated using fetchgen.".into());
    TsDoc(lines)
}

fn codegen_imports(runtime_module: &str) -> Vec<TsImport> {
    vec![
        TsImport {
            clause: ImportClause::Namespace("Runtime".into()),
            from: runtime_module.to_string(),
        },
        TsImport {
            clause: ImportClause::Namespace("QS".into()),
            from: format!("{runtime_module}/query"),
        },
        TsImport {
            clause: ImportClause::Reexport(RUNTIME_REEXPORTS.map(String::from).to_vec()),
            from: runtime_module.to_string(),
        },
    ]
}

// =============================================================================
// Module stub
// =============================================================================

/// `servers`, `defaults` and the runtime instance.
///
/// `defaults.baseUrl` starts out as `/`; [`apply_default_base_url`] fills in
/// the real value.
pub fn stub_statements(servers: &[Server]) -> Vec<TsStmt> {
    vec![
        TsStmt::Const {
            name: "servers".into(),
            ty: None,
            init: servers_object(servers),
            is_export: true,
            doc: None,
        },
        TsStmt::Const {
            name: "defaults".into(),
            ty: Some(TsType::Ref("Runtime.Defaults<Runtime.CustomHeaders>".into())),
            init: TsExpr::Object {
                entries: vec![
                    ObjectEntry::Prop(
                        "headers".into(),
                        TsExpr::Object {
                            entries: Vec::new(),
                            multiline: false,
                        },
                    ),
                    ObjectEntry::Prop("baseUrl".into(), TsExpr::string("/")),
                ],
                multiline: true,
            },
            is_export: true,
            doc: None,
        },
        TsStmt::Const {
            name: "runtime".into(),
            ty: None,
            init: TsExpr::call("Runtime.runtime", vec![TsExpr::ident("defaults")]),
            is_export: false,
            doc: None,
        },
    ]
}

/// Point `defaults.baseUrl` at `base_url`.
pub fn apply_default_base_url(statements: &mut [TsStmt], base_url: &str) -> Result<()> {
    let slot = statements.iter_mut().find_map(|stmt| match stmt {
        TsStmt::Const {
            name,
            init: TsExpr::Object { entries, .. },
            ..
        } if name.as_str() == "defaults" => entries.iter_mut().find_map(|entry| match entry {
            ObjectEntry::Prop(key, value) if key.as_str() == "baseUrl" => Some(value),
            _ => None,
        }),
        _ => None,
    });
    let Some(value) = slot else {
        return Err(GenerateError::MissingDefaultsLiteral);
    };
    *value = TsExpr::string(base_url);
    Ok(())
}

/// The first server's URL with variable defaults filled in, or `/`.
pub fn default_base_url(servers: &[Server]) -> String {
    let Some(server) = servers.first() else {
        return "/".to_string();
    };
    let mut url = server.url.clone();
    for (name, variable) in &server.variables {
        let value = match &variable.default {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        url = url.replace(&format!("{{{name}}}"), &value);
    }
    url
}

fn servers_object(servers: &[Server]) -> TsExpr {
    let mut keys = OperationNames::default();
    let entries = servers
        .iter()
        .enumerate()
        .map(|(i, server)| {
            let key = match server.description.as_deref() {
                Some(description) => to_identifier(description, false, OnlyMode::Base),
                None => format!("server{}", i + 1),
            };
            ObjectEntry::Prop(keys.unique(&key), server_value(server))
        })
        .collect();
    TsExpr::Object {
        entries,
        multiline: true,
    }
}

/// A plain URL string, or an arrow function over the server variables.
fn server_value(server: &Server) -> TsExpr {
    if server.variables.is_empty() {
        return TsExpr::string(server.url.clone());
    }

    let mut bindings = Vec::new();
    let mut props = Vec::new();
    for (name, variable) in &server.variables {
        let ident = to_identifier(name, false, OnlyMode::Base);
        bindings.push(BindingElement {
            name: ident.clone(),
            default: TsLiteral::from_json(&variable.default).map(TsExpr::Literal),
        });
        let ty = match &variable.enum_values {
            Some(values) => TsType::Union(
                values
                    .iter()
                    .filter_map(TsLiteral::from_json)
                    .map(TsType::Literal)
                    .collect(),
            ),
            None => TsType::Union(vec![
                TsType::string(),
                TsType::Primitive(TsPrimitive::Number),
            ]),
        };
        props.push(TsProp {
            name: ident,
            ty,
            optional: true,
            doc: None,
        });
    }

    let body = template(&server.url, |placeholder| {
        server
            .variables
            .contains_key(placeholder)
            .then(|| TsExpr::ident(to_identifier(placeholder, false, OnlyMode::Base)))
    });

    TsExpr::Arrow {
        params: vec![TsParam {
            pattern: ParamPattern::Object(bindings),
            ty: Some(TsType::Object { props, index: None }),
            optional: false,
            default: Some(empty_object()),
        }],
        body: Box::new(body),
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Generate the function for one operation, plus its deprecated alias.
pub fn codegen_operation(op: &OperationIR, optimistic: bool) -> Vec<TsItem> {
    let call = fetch_call(op);
    let body = if optimistic {
        TsExpr::call("runtime.ok", vec![call])
    } else {
        call
    };

    let mut items = vec![TsItem::Function(TsFunction {
        name: op.name.clone(),
        params: codegen_params(op),
        body: vec![TsStmt::Return(body)],
        is_export: true,
        doc: op.doc.clone(),
    })];

    if let Some(legacy) = &op.legacy_name {
        items.push(TsItem::Stmt(TsStmt::Const {
            name: legacy.clone(),
            ty: None,
            init: TsExpr::ident(op.name.clone()),
            is_export: true,
            doc: Some(TsDoc(vec![format!(
                "@deprecated Use {{@link {}}} instead",
                op.name
            )])),
        }));
    }
    items
}

/// Required params, body, optional params bag, `opts`.
fn codegen_params(op: &OperationIR) -> Vec<TsParam> {
    let mut params: Vec<TsParam> = op
        .required_params()
        .map(|p| TsParam {
            pattern: ParamPattern::Ident(p.arg_name.clone()),
            ty: Some(p.ty.clone()),
            optional: false,
            default: None,
        })
        .collect();

    if let Some(body) = &op.body {
        params.push(TsParam {
            pattern: ParamPattern::Ident(body.arg_name.clone()),
            ty: Some(body.ty.clone()),
            optional: !body.required,
            default: None,
        });
    }

    let optional: Vec<&ParamIR> = op.optional_params().collect();
    if !optional.is_empty() {
        params.push(TsParam {
            pattern: ParamPattern::Object(
                optional
                    .iter()
                    .map(|p| BindingElement {
                        name: p.arg_name.clone(),
                        default: None,
                    })
                    .collect(),
            ),
            ty: Some(TsType::Object {
                props: optional
                    .iter()
                    .map(|p| TsProp {
                        name: p.arg_name.clone(),
                        ty: p.ty.clone(),
                        optional: true,
                        doc: None,
                    })
                    .collect(),
                index: None,
            }),
            optional: false,
            default: Some(empty_object()),
        });
    }

    params.push(TsParam {
        pattern: ParamPattern::Ident("opts".into()),
        ty: Some(TsType::Ref("Runtime.RequestOpts".into())),
        optional: true,
        default: None,
    });
    params
}

/// `runtime.fetchJson<...>(url, init)`
fn fetch_call(op: &OperationIR) -> TsExpr {
    let type_args = match op.response.strategy {
        ResponseStrategy::Text => Vec::new(),
        ResponseStrategy::Json | ResponseStrategy::Blob => vec![response_type(&op.response)],
    };
    TsExpr::Call {
        callee: Box::new(TsExpr::ident(format!(
            "runtime.{}",
            op.response.strategy.runtime_fn()
        ))),
        type_args,
        args: vec![url_expr(op), init_expr(op)],
    }
}

/// Union of `{ status: 200; data: T }` members.
fn response_type(response: &ResponseIR) -> TsType {
    TsType::Union(
        response
            .variants
            .iter()
            .map(|variant| {
                let status = match variant.status {
                    ResponseStatus::Code(code) => TsType::Literal(TsLiteral::Int(code)),
                    ResponseStatus::Any => TsType::Primitive(TsPrimitive::Number),
                };
                let mut props = vec![TsProp {
                    name: "status".into(),
                    ty: status,
                    optional: false,
                    doc: None,
                }];
                if let Some(data) = &variant.data {
                    props.push(TsProp {
                        name: "data".into(),
                        ty: data.clone(),
                        optional: false,
                        doc: None,
                    });
                }
                TsType::Object { props, index: None }
            })
            .collect(),
    )
}

/// Path template with encoded path args, followed by the query string.
fn url_expr(op: &OperationIR) -> TsExpr {
    let path_template = template(&op.path, |placeholder| {
        op.params_in(ParamLocation::Path)
            .find(|p| p.name == placeholder)
            .map(|p| TsExpr::call("encodeURIComponent", vec![TsExpr::ident(p.arg_name.clone())]))
    });
    let Some(query) = query_expr(op) else {
        return path_template;
    };
    let mut parts = match path_template {
        TsExpr::Template(parts) => parts,
        TsExpr::Literal(TsLiteral::String(s)) => vec![TemplatePart::Static(s)],
        other => vec![TemplatePart::Dynamic(other)],
    };
    parts.push(TemplatePart::Dynamic(query));
    TsExpr::Template(parts)
}

/// `QS.query(QS.explode({ a }), QS.form({ b }))`, one call per style in
/// first-seen order.
fn query_expr(op: &OperationIR) -> Option<TsExpr> {
    let mut groups: Vec<(QueryStyle, Vec<ObjectEntry>)> = Vec::new();
    for param in op.params_in(ParamLocation::Query) {
        let style = param.query_style.unwrap_or(QueryStyle::Form);
        let entry = TsExpr::entry(&param.name, TsExpr::ident(param.arg_name.clone()));
        match groups.iter_mut().find(|(s, _)| *s == style) {
            Some((_, entries)) => entries.push(entry),
            None => groups.push((style, vec![entry])),
        }
    }
    if groups.is_empty() {
        return None;
    }
    let calls = groups
        .into_iter()
        .map(|(style, entries)| {
            TsExpr::call(
                format!("QS.{}", style.as_str()),
                vec![TsExpr::Object {
                    entries,
                    multiline: false,
                }],
            )
        })
        .collect();
    Some(TsExpr::call("QS.query", calls))
}

/// `{ ...opts, method, body, headers }`, wrapped in the body encoder.
fn init_expr(op: &OperationIR) -> TsExpr {
    let mut entries = vec![ObjectEntry::Spread(TsExpr::ident("opts"))];
    if op.method != HttpMethod::Get {
        entries.push(TsExpr::entry("method", TsExpr::string(op.method.as_str())));
    }
    if let Some(body) = &op.body {
        entries.push(TsExpr::entry("body", TsExpr::ident(body.arg_name.clone())));
    }

    let headers: Vec<ObjectEntry> = op
        .params_in(ParamLocation::Header)
        .map(|p| TsExpr::entry(&p.name, TsExpr::ident(p.arg_name.clone())))
        .collect();
    if !headers.is_empty() {
        let merged = TsExpr::call(
            "runtime.mergeHeaders",
            vec![
                TsExpr::OptionalMember {
                    object: Box::new(TsExpr::ident("opts")),
                    prop: "headers".into(),
                },
                TsExpr::Object {
                    entries: headers,
                    multiline: false,
                },
            ],
        );
        entries.push(TsExpr::entry("headers", merged));
    }

    let init = TsExpr::Object {
        entries,
        multiline: true,
    };
    match op.body.as_ref().and_then(|b| b.encoding) {
        Some(encoding) => TsExpr::call(format!("runtime.{}", encoding.as_str()), vec![init]),
        None => init,
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Build a template from `{placeholder}` segments.
///
/// Placeholders `resolve` has no expression for stay literal. Without any
/// substitution the result is a plain string literal.
fn template(source: &str, resolve: impl Fn(&str) -> Option<TsExpr>) -> TsExpr {
    let mut parts: Vec<TemplatePart> = Vec::new();
    let mut literal = String::new();
    let mut rest = source;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start + 1..].find('}') else {
            break;
        };
        let placeholder = &rest[start + 1..start + 1 + len];
        match resolve(placeholder) {
            Some(expr) => {
                literal.push_str(&rest[..start]);
                if !literal.is_empty() {
                    parts.push(TemplatePart::Static(std::mem::take(&mut literal)));
                }
                parts.push(TemplatePart::Dynamic(expr));
            }
            None => literal.push_str(&rest[..start + 2 + len]),
        }
        rest = &rest[start + 2 + len..];
    }
    literal.push_str(rest);

    if parts.is_empty() {
        return TsExpr::string(literal);
    }
    if !literal.is_empty() {
        parts.push(TemplatePart::Static(literal));
    }
    TsExpr::Template(parts)
}

fn empty_object() -> TsExpr {
    TsExpr::Object {
        entries: Vec::new(),
        multiline: false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::ir::Emit;
    use crate::openapi::ir::api::{BodyEncoding, BodyIR, ResponseVariant};
    use pretty_assertions::assert_eq;

    fn servers(json: serde_json::Value) -> Vec<Server> {
        serde_json::from_value(json).unwrap()
    }

    fn param(name: &str, arg: &str, location: ParamLocation, required: bool) -> ParamIR {
        ParamIR {
            name: name.into(),
            arg_name: arg.into(),
            location,
            required,
            ty: TsType::string(),
            query_style: (location == ParamLocation::Query).then_some(QueryStyle::Explode),
        }
    }

    fn operation() -> OperationIR {
        OperationIR {
            name: "updatePet".into(),
            legacy_name: None,
            method: HttpMethod::Put,
            path: "/pets/{petId}".into(),
            doc: TsDoc::from_text("Update a pet"),
            params: vec![
                param("petId", "petId", ParamLocation::Path, true),
                param("status", "status", ParamLocation::Query, false),
                param("X-Trace", "xTrace", ParamLocation::Header, false),
            ],
            body: Some(BodyIR {
                arg_name: "pet".into(),
                ty: TsType::Ref("PetWrite".into()),
                required: true,
                encoding: Some(BodyEncoding::Json),
            }),
            response: ResponseIR {
                strategy: ResponseStrategy::Json,
                variants: vec![ResponseVariant {
                    status: ResponseStatus::Code(200),
                    data: Some(TsType::Ref("PetRead".into())),
                }],
            },
        }
    }

    #[test]
    fn test_codegen_operation() {
        let items = codegen_operation(&operation(), false);
        assert_eq!(items.len(), 1);
        let expected = r#"/**
 * Update a pet
 */
export function updatePet(petId: string, pet: PetWrite, { status, xTrace }: {
  status?: string;
  xTrace?: string;
} = {}, opts?: Runtime.RequestOpts) {
  return runtime.fetchJson<{
    status: 200;
    data: PetRead;
  }>(`/pets/${encodeURIComponent(petId)}${QS.query(QS.explode({ status }))}`, runtime.json({
    ...opts,
    method: "PUT",
    body: pet,
    headers: runtime.mergeHeaders(opts?.headers, { "X-Trace": xTrace }),
  }));
}
"#;
        assert_eq!(items[0].emit(), expected);
    }

    #[test]
    fn test_optimistic_and_legacy_alias() {
        let mut op = operation();
        op.legacy_name = Some("putPetsByPetId".into());
        op.response.strategy = ResponseStrategy::Text;
        op.body = None;
        op.params.truncate(1);
        let items = codegen_operation(&op, true);
        let emitted: Vec<_> = items.iter().map(|i| i.emit()).collect();
        assert_eq!(
            emitted[0],
            "/**\n * Update a pet\n */\nexport function updatePet(petId: string, opts?: Runtime.RequestOpts) {\n  return runtime.ok(runtime.fetchText(`/pets/${encodeURIComponent(petId)}`, {\n    ...opts,\n    method: \"PUT\",\n  }));\n}\n"
        );
        assert_eq!(
            emitted[1],
            "/**\n * @deprecated Use {@link updatePet} instead\n */\nexport const putPetsByPetId = updatePet;\n"
        );
    }

    #[test]
    fn test_template_keeps_unknown_placeholders() {
        let expr = template("/a/{x}/b/{y}", |p| (p == "y").then(|| TsExpr::ident("y")));
        assert_eq!(expr.emit(), "`/a/{x}/b/${y}`");
        assert_eq!(template("/plain", |_| None).emit(), "\"/plain\"");
    }

    #[test]
    fn test_servers_and_defaults() {
        let servers = servers(serde_json::json!([
            { "url": "https://{region}.example.com/v1", "description": "Production API",
              "variables": { "region": { "default": "eu", "enum": ["eu", "us"] } } },
            { "url": "http://localhost:8080" }
        ]));
        let mut statements = stub_statements(&servers);
        apply_default_base_url(&mut statements, &default_base_url(&servers)).unwrap();
        let emitted: String = statements.iter().map(|s| s.emit()).collect();
        let expected = r#"export const servers = {
  productionApi: ({ region = "eu" }: {
    region?: "eu" | "us";
  } = {}) => `https://${region}.example.com/v1`,
  server2: "http://localhost:8080",
};
export const defaults: Runtime.Defaults<Runtime.CustomHeaders> = {
  headers: {},
  baseUrl: "https://eu.example.com/v1",
};
const runtime = Runtime.runtime(defaults);
"#;
        assert_eq!(emitted, expected);
    }

    #[test]
    fn test_default_base_url_without_servers() {
        assert_eq!(default_base_url(&[]), "/");
    }

    #[test]
    fn test_missing_defaults_literal() {
        let mut statements = stub_statements(&[]);
        statements.retain(|s| !matches!(s, TsStmt::Const { name, .. } if name == "defaults"));
        let err = apply_default_base_url(&mut statements, "/").unwrap_err();
        assert!(matches!(err, GenerateError::MissingDefaultsLiteral));
    }
}
