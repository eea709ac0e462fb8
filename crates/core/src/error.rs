//! Error types for client generation.
//!
//! Every failure aborts the whole run. The message carries the context needed
//! to locate the problem in the source document (the ref, the parameter, the
//! schema), since nothing else is reported alongside it.

use thiserror::Error;

/// Errors that can occur while generating a client module.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The document text is neither valid JSON nor valid YAML.
    #[error("Failed to parse OpenAPI document: {0}")]
    Parse(String),

    /// The document is a Swagger 2 document, which must be converted first.
    #[error("Unsupported document version {version}: convert Swagger 2 documents to OpenAPI 3 before generating")]
    UnsupportedVersion {
        /// The version string found in the document.
        version: String,
    },

    /// A node did not have the shape the generator expected.
    #[error("Invalid OpenAPI document at {path}: {source}")]
    InvalidDocument {
        /// Location of the offending node (a ref or `document`).
        path: String,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A `$ref` that points outside the current document.
    #[error("External refs are not supported ({reference}); bundle the document into a single file first")]
    UnsupportedReference {
        /// The offending reference.
        reference: String,
    },

    /// A local `$ref` whose target does not exist.
    #[error("Can't find {path}")]
    ReferenceNotFound {
        /// The decoded pointer segments, joined with `.`.
        path: String,
    },

    /// A discriminator that cannot produce a tagged union.
    #[error("Invalid discriminator usage in {schema}: {reason}")]
    InvalidDiscriminatorUsage {
        /// The schema (ref path or context) carrying the discriminator.
        schema: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A parameter whose `content` map cannot be encoded as a query value.
    #[error("Parameter {name}: {reason}")]
    AmbiguousContentParameter {
        /// The parameter name.
        name: String,
        /// What is wrong with its content map.
        reason: String,
    },

    /// An enum whose member-name extension does not line up with its values.
    #[error("Enum {name}: expected {expected} member names, found {found}")]
    InvalidEnumNames {
        /// The proposed enum name.
        name: String,
        /// Number of enum values.
        expected: usize,
        /// Number of names in the extension.
        found: usize,
    },

    /// The module stub lost its `defaults` literal.
    #[error("Module stub is missing the `defaults` literal with a `baseUrl` entry")]
    MissingDefaultsLiteral,
}

/// Result alias used across the generator.
pub type Result<T> = std::result::Result<T, GenerateError>;
