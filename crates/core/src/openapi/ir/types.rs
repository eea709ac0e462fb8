//! TypeScript IR types for code generation.
//!
//! This module defines the TypeScript syntax the generator builds:
//! - TsType: Types (primitives, arrays, unions, objects, etc.)
//! - TsExpr: Expressions (identifiers, calls, templates, object literals)
//! - TsStmt / TsFunction / TsTypeDef: declarations
//! - TsModule: a whole output file

use serde_json::Value;

/// TypeScript type representation
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// Keyword types: string, number, any, ...
    Primitive(TsPrimitive),
    /// Array type: T[]
    Array(Box<TsType>),
    /// Tuple type: [A, B]
    Tuple(Vec<TsType>),
    /// Union type: A | B | C
    Union(Vec<TsType>),
    /// Intersection type: A & B & C
    Intersection(Vec<TsType>),
    /// Object type: { foo: string; bar?: number; [key: string]: any }
    Object {
        props: Vec<TsProp>,
        index: Option<Box<TsType>>,
    },
    /// Literal type: "foo", 42, true
    Literal(TsLiteral),
    /// Named type reference
    Ref(String),
}

/// TypeScript keyword types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Any,
    Unknown,
}

/// Object type member
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
    pub doc: Option<TsDoc>,
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    String(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    Null,
}

impl TsLiteral {
    /// Scalar JSON values as literals; arrays and objects have none.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(TsLiteral::String(s.clone())),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => TsLiteral::Int(i),
                None => TsLiteral::Number(n.as_f64().unwrap_or_default()),
            }),
            Value::Bool(b) => Some(TsLiteral::Bool(*b)),
            Value::Null => Some(TsLiteral::Null),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl TsType {
    pub fn string() -> Self {
        TsType::Primitive(TsPrimitive::String)
    }

    pub fn null() -> Self {
        TsType::Primitive(TsPrimitive::Null)
    }

    /// `{ name: literal }`, used for discriminator tags.
    pub fn tag(property: &str, value: &str) -> Self {
        TsType::Object {
            props: vec![TsProp {
                name: property.to_string(),
                ty: TsType::Literal(TsLiteral::String(value.to_string())),
                optional: false,
                doc: None,
            }],
            index: None,
        }
    }

    /// Check if this is a union or intersection of more than one member.
    pub fn is_compound(&self) -> bool {
        matches!(self, TsType::Union(types) | TsType::Intersection(types) if types.len() > 1)
    }
}

/// A `/** ... */` comment, one entry per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsDoc(pub Vec<String>);

impl TsDoc {
    /// Build from free text; `None` for blank text.
    pub fn from_text(text: &str) -> Option<Self> {
        let lines: Vec<String> = text.trim().lines().map(|l| l.trim_end().to_string()).collect();
        if lines.iter().all(|l| l.trim().is_empty()) {
            None
        } else {
            Some(TsDoc(lines))
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

/// TypeScript expression
#[derive(Debug, Clone, PartialEq)]
pub enum TsExpr {
    /// Identifier (possibly dotted): `foo`, `runtime.fetchJson`
    Ident(String),
    /// Literal value
    Literal(TsLiteral),
    /// Function call with optional type arguments
    Call {
        callee: Box<TsExpr>,
        type_args: Vec<TsType>,
        args: Vec<TsExpr>,
    },
    /// Arrow function with an expression body
    Arrow {
        params: Vec<TsParam>,
        body: Box<TsExpr>,
    },
    /// Object literal
    Object {
        entries: Vec<ObjectEntry>,
        multiline: bool,
    },
    /// Optional member access: `obj?.prop`
    OptionalMember { object: Box<TsExpr>, prop: String },
    /// Template literal
    Template(Vec<TemplatePart>),
}

/// Object literal entry
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectEntry {
    /// `key: value`
    Prop(String, TsExpr),
    /// `key`
    Shorthand(String),
    /// `...expr`
    Spread(TsExpr),
}

/// Template literal part
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Static(String),
    Dynamic(TsExpr),
}

impl TsExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        TsExpr::Ident(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        TsExpr::Literal(TsLiteral::String(value.into()))
    }

    pub fn call(callee: impl Into<String>, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(TsExpr::Ident(callee.into())),
            type_args: Vec::new(),
            args,
        }
    }

    /// `{ key: value }` entry, shortened to `{ key }` when the value is the same identifier.
    pub fn entry(key: &str, value: TsExpr) -> ObjectEntry {
        match value {
            TsExpr::Ident(name) if name == key => ObjectEntry::Shorthand(name),
            value => ObjectEntry::Prop(key.to_string(), value),
        }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct TsParam {
    pub pattern: ParamPattern,
    pub ty: Option<TsType>,
    pub optional: bool,
    pub default: Option<TsExpr>,
}

/// Binding pattern of a parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamPattern {
    /// `name`
    Ident(String),
    /// `{ a, b = 1 }`
    Object(Vec<BindingElement>),
}

/// Element of an object binding pattern
#[derive(Debug, Clone, PartialEq)]
pub struct BindingElement {
    pub name: String,
    pub default: Option<TsExpr>,
}

// =============================================================================
// Statements and declarations
// =============================================================================

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum TsStmt {
    /// `const name: Type = init;`
    Const {
        name: String,
        ty: Option<TsType>,
        init: TsExpr,
        is_export: bool,
        doc: Option<TsDoc>,
    },
    /// `return expr;`
    Return(TsExpr),
}

/// Named type declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeDef {
    pub name: String,
    pub kind: TypeDefKind,
    pub doc: Option<TsDoc>,
}

/// Kind of type declaration
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    /// `export type Name = ...;`
    TypeAlias { ty: TsType },
    /// `export enum Name { ... }`
    Enum { members: Vec<TsEnumMember> },
}

/// Enum member
#[derive(Debug, Clone, PartialEq)]
pub struct TsEnumMember {
    pub name: String,
    pub value: TsLiteral,
}

/// Function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TsFunction {
    pub name: String,
    pub params: Vec<TsParam>,
    pub body: Vec<TsStmt>,
    pub is_export: bool,
    pub doc: Option<TsDoc>,
}

// =============================================================================
// Module-Level IR (for printer)
// =============================================================================

/// Import or re-export declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsImport {
    pub clause: ImportClause,
    pub from: String,
}

/// What an import brings in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportClause {
    /// `import * as Name from "..."`
    Namespace(String),
    /// `export { a, b } from "..."`
    Reexport(Vec<String>),
}

/// Top-level item in the functions section
#[derive(Debug, Clone, PartialEq)]
pub enum TsItem {
    Function(TsFunction),
    Stmt(TsStmt),
}

/// Complete TypeScript module
#[derive(Debug, Clone, PartialEq)]
pub struct TsModule {
    pub header: Option<TsDoc>,
    pub imports: Vec<TsImport>,
    pub statements: Vec<TsStmt>,
    pub types: Vec<TsTypeDef>,
    pub items: Vec<TsItem>,
}
