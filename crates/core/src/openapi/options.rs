//! Options threaded through a generation run.

use serde::Deserialize;

/// Default module specifier generated code imports the runtime from.
pub const DEFAULT_RUNTIME_MODULE: &str = "./runtime";

/// Generator configuration.
///
/// Deserializes from kebab-case keys (`use-enum-type = true`); every field is
/// optional in config files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GenerateOptions {
    /// Keep only operations carrying at least one of these tags.
    pub include: Vec<String>,
    /// Drop operations carrying any of these tags.
    pub exclude: Vec<String>,
    /// Wrap every call in `ok()` so functions return the success payload.
    pub optimistic: bool,
    /// Emit named `enum` declarations instead of literal unions.
    pub use_enum_type: bool,
    /// Ignore readOnly/writeOnly and produce one type per schema.
    pub merge_read_write_only: bool,
    /// Use `unknown` where a schema gives no type information.
    pub use_unknown: bool,
    /// Type optional properties as `T | undefined`.
    pub union_undefined: bool,
    /// Emit every component schema, referenced or not.
    pub all_schemas: bool,
    /// Module specifier of the runtime import.
    pub runtime_module: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            optimistic: false,
            use_enum_type: false,
            merge_read_write_only: false,
            use_unknown: false,
            union_undefined: false,
            all_schemas: false,
            runtime_module: DEFAULT_RUNTIME_MODULE.to_string(),
        }
    }
}

impl GenerateOptions {
    /// Tag filter: excluded tags always win; an include list must match.
    pub fn keeps_tags(&self, tags: &[String]) -> bool {
        if tags.iter().any(|tag| self.exclude.contains(tag)) {
            return false;
        }
        self.include.is_empty() || tags.iter().any(|tag| self.include.contains(tag))
    }
}
