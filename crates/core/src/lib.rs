//! Typed TypeScript fetch clients from OpenAPI documents.
//!
//! [`generate`] turns OpenAPI 3.x text (JSON or YAML) into one TypeScript
//! module: a type alias per referenced schema, an optional `enum` per enum
//! schema, and one function per operation calling the runtime shipped in
//! [`runtime`].

#![forbid(unsafe_code)]
#![deny(unused_must_use, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

pub mod error;
pub mod openapi;
pub mod query;
pub mod runtime;

pub use error::{GenerateError, Result};
pub use openapi::{GenerateOptions, generate, generate_from_value};
