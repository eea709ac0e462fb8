//! OpenAPI to TypeScript client generator.
//!
//! This module parses OpenAPI 3.x documents (JSON or YAML) and generates a
//! single TypeScript module with:
//! - Type aliases for every referenced component schema, split into
//!   `Read`/`Write` views where readOnly/writeOnly properties differ
//! - Optional `enum` declarations for enum schemas
//! - One fetch function per operation, calling the shipped runtime
//! - `servers` and `defaults` constants seeded from the document servers

mod emitter;
mod ir;
pub mod options;
pub mod resolver;
pub mod spec;

pub use emitter::{generate, generate_from_value};
pub use options::GenerateOptions;
