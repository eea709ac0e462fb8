//! Intermediate Representation for OpenAPI to TypeScript code generation.
//!
//! This module defines a three-layer architecture:
//! 1. API-level IR: Normalized operations, parameters, bodies and responses
//! 2. TypeScript AST IR: Types, expressions, statements, functions
//! 3. Emission: AST to TypeScript code strings via the `Emit` trait
//!
//! Every ref, discriminator and read/write split is resolved while building
//! the API IR, so code generation only arranges AST nodes and emission is
//! purely mechanical string building.
//!
//! ## Module Structure
//!
//! - `types`: TypeScript AST IR (TsType, TsExpr, TsStmt, TsFunction, TsModule)
//! - `api`: API-level IR (OperationIR, ParamIR, BodyIR, ResponseIR)
//! - `context`: Generator state shared by one run (ref registry, name tables)
//! - `schema`: Schema -> TsType translation and alias declarations
//! - `enums`: Named `enum` declarations
//! - `discriminator`: Discriminating component schemas and their mappings
//! - `operation`: Path items -> OperationIR
//! - `naming`: Identifier derivation and collision tracking
//! - `codegen`: API IR -> TypeScript AST
//! - `emit`: TypeScript AST -> code strings (via Emit trait)
//! - `utils`: Common utilities shared across modules

mod api;
mod codegen;
mod context;
mod discriminator;
mod emit;
mod enums;
mod naming;
mod operation;
mod schema;
mod types;
pub mod utils;

pub use codegen::codegen_module;
pub use context::Generator;
pub use emit::Emit;
