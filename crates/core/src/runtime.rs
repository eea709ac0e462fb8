//! TypeScript runtime imported by generated modules.
//!
//! Generated code imports `Runtime` and `QS` from the configured runtime
//! module; these sources are that module, shipped with the generator so the
//! CLI can write them next to the output.

/// `index.ts`: the fetch runtime factory and the result helpers.
pub const INDEX_TS: &str = include_str!("../runtime/index.ts");

/// `query.ts`: query string encoders, one per parameter style.
pub const QUERY_TS: &str = include_str!("../runtime/query.ts");

/// Runtime files as `(relative path, contents)`.
pub const RUNTIME_FILES: [(&str, &str); 2] = [("index.ts", INDEX_TS), ("query.ts", QUERY_TS)];
