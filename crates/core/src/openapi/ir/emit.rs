//! TypeScript code emission via the Emit trait.
//!
//! Each AST type implements `Emit`. Nodes that can span several lines (object
//! types, object literals, statements) also take an indentation level so that
//! nested blocks line up; one level is two spaces.

use super::types::{
    BindingElement, ImportClause, ObjectEntry, ParamPattern, TemplatePart, TsDoc, TsExpr,
    TsFunction, TsImport, TsItem, TsLiteral, TsModule, TsParam, TsPrimitive, TsStmt, TsType,
    TsTypeDef, TypeDefKind,
};
use super::utils::{escape_js_string, escape_template_chunk, quote_if_needed};

/// Trait for emitting TypeScript code from AST nodes.
pub trait Emit {
    /// Convert the AST node to its TypeScript string representation.
    fn emit(&self) -> String;
}

fn pad(indent: usize) -> String {
    "  ".repeat(indent)
}

// =============================================================================
// Primitive Types
// =============================================================================

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string",
            TsPrimitive::Number => "number",
            TsPrimitive::Boolean => "boolean",
            TsPrimitive::Null => "null",
            TsPrimitive::Undefined => "undefined",
            TsPrimitive::Any => "any",
            TsPrimitive::Unknown => "unknown",
        }
        .to_string()
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
            TsLiteral::Number(n) => n.to_string(),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
        }
    }
}

// =============================================================================
// Types
// =============================================================================

impl Emit for TsType {
    fn emit(&self) -> String {
        self.emit_at(0)
    }
}

impl TsType {
    /// Emit with the given indentation level for multi-line object types.
    pub fn emit_at(&self, indent: usize) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => {
                let inner_str = inner.emit_at(indent);
                // Wrap complex types in parentheses
                if inner.is_compound() {
                    format!("({inner_str})[]")
                } else {
                    format!("{inner_str}[]")
                }
            }
            TsType::Tuple(items) => {
                let items: Vec<_> = items.iter().map(|t| t.emit_at(indent)).collect();
                format!("[{}]", items.join(", "))
            }
            TsType::Union(types) => match types.as_slice() {
                [] => "never".to_string(),
                [single] => single.emit_at(indent),
                _ => types
                    .iter()
                    .map(|t| t.emit_at(indent))
                    .collect::<Vec<_>>()
                    .join(" | "),
            },
            TsType::Intersection(types) => match types.as_slice() {
                [] => "unknown".to_string(),
                [single] => single.emit_at(indent),
                _ => types
                    .iter()
                    .map(|t| {
                        let s = t.emit_at(indent);
                        if matches!(t, TsType::Union(_)) && t.is_compound() {
                            format!("({s})")
                        } else {
                            s
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" & "),
            },
            TsType::Object { props, index } => {
                if props.is_empty() && index.is_none() {
                    return "{}".to_string();
                }
                let inner = pad(indent + 1);
                let mut output = "{\n".to_string();
                for prop in props {
                    if let Some(doc) = &prop.doc {
                        output.push_str(&doc.emit_at(indent + 1));
                    }
                    let opt = if prop.optional { "?" } else { "" };
                    output.push_str(&format!(
                        "{inner}{}{opt}: {};\n",
                        quote_if_needed(&prop.name),
                        prop.ty.emit_at(indent + 1)
                    ));
                }
                if let Some(index) = index {
                    output.push_str(&format!(
                        "{inner}[key: string]: {};\n",
                        index.emit_at(indent + 1)
                    ));
                }
                output.push_str(&pad(indent));
                output.push('}');
                output
            }
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(name) => name.clone(),
        }
    }
}

impl TsDoc {
    /// Emit as a block comment at the given indentation, with trailing newline.
    pub fn emit_at(&self, indent: usize) -> String {
        let prefix = pad(indent);
        let mut output = format!("{prefix}/**\n");
        for line in &self.0 {
            let line = line.replace("*/", "*\\/");
            if line.is_empty() {
                output.push_str(&format!("{prefix} *\n"));
            } else {
                output.push_str(&format!("{prefix} * {line}\n"));
            }
        }
        output.push_str(&format!("{prefix} */\n"));
        output
    }
}

// =============================================================================
// Type Definitions
// =============================================================================

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        let mut output = self.doc.as_ref().map(|d| d.emit_at(0)).unwrap_or_default();
        match &self.kind {
            TypeDefKind::TypeAlias { ty } => {
                output.push_str(&format!("export type {} = {};\n", self.name, ty.emit()));
            }
            TypeDefKind::Enum { members } => {
                output.push_str(&format!("export enum {} {{\n", self.name));
                for member in members {
                    output.push_str(&format!(
                        "  {} = {},\n",
                        quote_if_needed(&member.name),
                        member.value.emit()
                    ));
                }
                output.push_str("}\n");
            }
        }
        output
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl Emit for TsExpr {
    fn emit(&self) -> String {
        self.emit_at(0)
    }
}

impl TsExpr {
    /// Emit with the given indentation level for multi-line literals.
    pub fn emit_at(&self, indent: usize) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Call {
                callee,
                type_args,
                args,
            } => {
                let type_args_str = if type_args.is_empty() {
                    String::new()
                } else {
                    let types: Vec<_> = type_args.iter().map(|t| t.emit_at(indent)).collect();
                    format!("<{}>", types.join(", "))
                };
                let args_str: Vec<_> = args.iter().map(|a| a.emit_at(indent)).collect();
                format!(
                    "{}{type_args_str}({})",
                    callee.emit_at(indent),
                    args_str.join(", ")
                )
            }
            TsExpr::Arrow { params, body } => {
                let params_str: Vec<_> = params.iter().map(|p| p.emit_at(indent)).collect();
                format!("({}) => {}", params_str.join(", "), body.emit_at(indent))
            }
            TsExpr::Object { entries, multiline } => {
                if entries.is_empty() {
                    return "{}".to_string();
                }
                if *multiline {
                    let inner = pad(indent + 1);
                    let mut output = "{\n".to_string();
                    for entry in entries {
                        output.push_str(&format!("{inner}{},\n", entry.emit_at(indent + 1)));
                    }
                    output.push_str(&pad(indent));
                    output.push('}');
                    output
                } else {
                    let parts: Vec<_> = entries.iter().map(|e| e.emit_at(indent)).collect();
                    format!("{{ {} }}", parts.join(", "))
                }
            }
            TsExpr::OptionalMember { object, prop } => {
                format!("{}?.{prop}", object.emit_at(indent))
            }
            TsExpr::Template(parts) => {
                let content: String = parts
                    .iter()
                    .map(|p| match p {
                        TemplatePart::Static(s) => escape_template_chunk(s),
                        TemplatePart::Dynamic(e) => format!("${{{}}}", e.emit_at(indent)),
                    })
                    .collect();
                format!("`{content}`")
            }
        }
    }
}

impl ObjectEntry {
    fn emit_at(&self, indent: usize) -> String {
        match self {
            ObjectEntry::Prop(key, value) => {
                format!("{}: {}", quote_if_needed(key), value.emit_at(indent))
            }
            ObjectEntry::Shorthand(name) => name.clone(),
            ObjectEntry::Spread(expr) => format!("...{}", expr.emit_at(indent)),
        }
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        self.emit_at(0)
    }
}

impl TsParam {
    fn emit_at(&self, indent: usize) -> String {
        let mut output = match &self.pattern {
            ParamPattern::Ident(name) => name.clone(),
            ParamPattern::Object(elements) => {
                let parts: Vec<_> = elements.iter().map(|e| e.emit_at(indent)).collect();
                format!("{{ {} }}", parts.join(", "))
            }
        };
        if self.optional {
            output.push('?');
        }
        if let Some(ty) = &self.ty {
            output.push_str(&format!(": {}", ty.emit_at(indent)));
        }
        if let Some(default) = &self.default {
            output.push_str(&format!(" = {}", default.emit_at(indent)));
        }
        output
    }
}

impl BindingElement {
    fn emit_at(&self, indent: usize) -> String {
        match &self.default {
            Some(default) => format!("{} = {}", self.name, default.emit_at(indent)),
            None => self.name.clone(),
        }
    }
}

// =============================================================================
// Statements
// =============================================================================

impl Emit for TsStmt {
    fn emit(&self) -> String {
        self.emit_indented(0)
    }
}

impl TsStmt {
    /// Emit with specified indentation level (2 spaces per level)
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = pad(indent);
        match self {
            TsStmt::Const {
                name,
                ty,
                init,
                is_export,
                doc,
            } => {
                let mut output = doc.as_ref().map(|d| d.emit_at(indent)).unwrap_or_default();
                let export = if *is_export { "export " } else { "" };
                let ty_str = ty
                    .as_ref()
                    .map(|t| format!(": {}", t.emit_at(indent)))
                    .unwrap_or_default();
                output.push_str(&format!(
                    "{prefix}{export}const {name}{ty_str} = {};\n",
                    init.emit_at(indent)
                ));
                output
            }
            TsStmt::Return(expr) => format!("{prefix}return {};\n", expr.emit_at(indent)),
        }
    }
}

// =============================================================================
// Functions
// =============================================================================

impl Emit for TsFunction {
    fn emit(&self) -> String {
        let mut output = self.doc.as_ref().map(|d| d.emit_at(0)).unwrap_or_default();
        if self.is_export {
            output.push_str("export ");
        }
        let params: Vec<_> = self.params.iter().map(|p| p.emit_at(0)).collect();
        output.push_str(&format!("function {}({}) {{\n", self.name, params.join(", ")));
        for stmt in &self.body {
            output.push_str(&stmt.emit_indented(1));
        }
        output.push_str("}\n");
        output
    }
}

impl Emit for TsItem {
    fn emit(&self) -> String {
        match self {
            TsItem::Function(func) => func.emit(),
            TsItem::Stmt(stmt) => stmt.emit(),
        }
    }
}

// =============================================================================
// Module
// =============================================================================

impl Emit for TsImport {
    fn emit(&self) -> String {
        match &self.clause {
            ImportClause::Namespace(alias) => {
                format!("import * as {alias} from \"{}\";\n", escape_js_string(&self.from))
            }
            ImportClause::Reexport(names) => format!(
                "export {{ {} }} from \"{}\";\n",
                names.join(", "),
                escape_js_string(&self.from)
            ),
        }
    }
}

impl Emit for TsModule {
    fn emit(&self) -> String {
        let mut output = String::new();

        if let Some(header) = &self.header {
            output.push_str(&header.emit_at(0));
        }

        for import in &self.imports {
            output.push_str(&import.emit());
        }
        if !self.imports.is_empty() {
            output.push('\n');
        }

        for stmt in &self.statements {
            output.push_str(&stmt.emit());
            output.push('\n');
        }

        for type_def in &self.types {
            output.push_str(&type_def.emit());
            output.push('\n');
        }

        for item in &self.items {
            output.push_str(&item.emit());
            output.push('\n');
        }

        let mut output = output.trim_end().to_string();
        output.push('\n');
        output
    }
}

// =============================================================================
// Tests
// =============================================================================
