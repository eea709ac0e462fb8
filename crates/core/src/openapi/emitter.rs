//! TypeScript client emitter for OpenAPI documents.
//!
//! This module is a thin wrapper around the IR-based code generation.
//! The pipeline is:
//! 1. Parse: JSON or YAML text -> raw value tree -> Document
//! 2. Normalize: Document -> ApiIR (refs, read/write views, enums resolved)
//! 3. Codegen: ApiIR -> TsModule (TypeScript AST)
//! 4. Emit: TsModule -> String (via Emit trait)

use serde_json::Value;

use crate::error::Result;
use crate::openapi::ir::{Emit, Generator, codegen_module};
use crate::openapi::options::GenerateOptions;
use crate::openapi::spec::{Document, parse_document};

/// Generate a TypeScript client module from OpenAPI document text.
pub fn generate(text: &str, options: &GenerateOptions) -> Result<String> {
    let raw = parse_document(text)?;
    generate_from_value(&raw, options)
}

/// Generate a TypeScript client module from an already-parsed document.
pub fn generate_from_value(raw: &Value, options: &GenerateOptions) -> Result<String> {
    let document = Document::from_value(raw)?;
    tracing::debug!(
        title = %document.info.title,
        paths = document.paths.len(),
        "Generating client"
    );

    let api_ir = Generator::new(raw, &document, options).run(&document)?;

    let module = codegen_module(&api_ir, &document, options)?;
    Ok(module.emit())
}
