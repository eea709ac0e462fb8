//! Identifier naming and collision tracking.
//!
//! Everything here is deterministic: the same input sequence always yields
//! the same names, which keeps repeated runs byte-identical.

use std::collections::{HashMap, HashSet};

use super::utils::{camel_case, capitalize_first, is_valid_identifier};

/// Which read/write view of a schema is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OnlyMode {
    /// Properties that are neither read-only nor write-only.
    #[default]
    Base,
    /// Response view: read-only and neutral properties.
    ReadOnly,
    /// Request view: write-only and neutral properties.
    WriteOnly,
}

impl OnlyMode {
    /// Suffix appended to variant alias names.
    pub fn suffix(self) -> &'static str {
        match self {
            OnlyMode::Base => "",
            OnlyMode::ReadOnly => "Read",
            OnlyMode::WriteOnly => "Write",
        }
    }
}

/// Turn an arbitrary string into a valid identifier.
///
/// Camel-cases `raw`, appends the variant suffix, optionally upper-cases the
/// first letter and prefixes `$` when the result still isn't a valid
/// identifier (leading digit, reserved word, empty).
pub fn to_identifier(raw: &str, upper_first: bool, mode: OnlyMode) -> String {
    let mut id = camel_case(raw);
    id.push_str(mode.suffix());
    if upper_first {
        id = capitalize_first(&id);
    }
    if is_valid_identifier(&id) {
        id
    } else {
        format!("${id}")
    }
}

/// Usage counts for type alias names, shared by every alias in a run.
///
/// A repeated name gets the new count appended. The suffixed name is reserved
/// without checking whether it was already taken, so an explicit `Foo2`
/// followed by two collisions on `Foo` yields `Foo2` twice.
#[derive(Debug, Default)]
pub struct AliasNames {
    used: HashMap<String, usize>,
}

impl AliasNames {
    pub fn unique(&mut self, name: &str) -> String {
        let mut name = name.to_string();
        let used = self.used.get(&name).copied().unwrap_or(0);
        if used > 0 {
            self.used.insert(name.clone(), used + 1);
            name = format!("{name}{}", used + 1);
        }
        self.used.insert(name.clone(), 1);
        name
    }
}

/// Outcome of naming a named enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumName {
    /// An enum with the same values was already emitted under this name.
    Reused(String),
    /// A new declaration is needed under this name.
    Fresh(String),
}

/// Names already given to enums, keyed by the proposed name.
#[derive(Debug, Default)]
pub struct EnumNames {
    emitted: HashMap<String, Vec<(String, String)>>,
}

impl EnumNames {
    /// Reuse the name of an identical enum or reserve a new one.
    ///
    /// `values` is the serialized value list. New names come from the shared
    /// alias table so an enum never shadows a type alias.
    pub fn name_for(&mut self, proposed: &str, values: &str, aliases: &mut AliasNames) -> EnumName {
        let existing = self
            .emitted
            .get(proposed)
            .and_then(|names| names.iter().find(|(_, v)| v == values));
        if let Some((name, _)) = existing {
            return EnumName::Reused(name.clone());
        }
        let name = aliases.unique(proposed);
        self.emitted
            .entry(proposed.to_string())
            .or_default()
            .push((name.clone(), values.to_string()));
        EnumName::Fresh(name)
    }
}

/// Operation function names.
///
/// Unlike [`AliasNames`], a suffixed name is only handed out if nothing else
/// holds it, so names are never reused.
#[derive(Debug, Default)]
pub struct OperationNames {
    counts: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl OperationNames {
    pub fn unique(&mut self, name: &str) -> String {
        let count = self.counts.entry(name.to_string()).or_insert(0);
        let candidate = loop {
            *count += 1;
            let candidate = if *count == 1 {
                name.to_string()
            } else {
                format!("{name}{count}")
            };
            if !self.taken.contains(&candidate) {
                break candidate;
            }
        };
        self.taken.insert(candidate.clone());
        candidate
    }
}

/// Primary and deprecated legacy name of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationNameSet {
    pub primary: String,
    /// Present only when it differs from `primary`.
    pub legacy: Option<String>,
}

/// Compute the primary name and, if different, the legacy name.
///
/// The primary name salvages any operationId by splitting on every
/// non-alphanumeric character. The legacy name follows the strict rule of
/// [`legacy_operation_name`].
pub fn operation_names(verb: &str, path: &str, operation_id: Option<&str>) -> OperationNameSet {
    let legacy = legacy_operation_name(verb, path, operation_id);
    let primary = operation_id
        .and_then(semantic_identifier)
        .unwrap_or_else(|| legacy.clone());
    let legacy = (primary != legacy).then_some(legacy);
    OperationNameSet { primary, legacy }
}

/// Name an operation from its operationId, falling back to verb + path.
///
/// The id is only used if it consists of word characters, whitespace, `.`,
/// `:` and `-`. Any other character disqualifies the whole id.
pub fn legacy_operation_name(verb: &str, path: &str, operation_id: Option<&str>) -> String {
    operation_id
        .filter(|id| {
            id.chars().all(|c| {
                c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() || matches!(c, '.' | ':' | '-')
            })
        })
        .and_then(semantic_identifier)
        .unwrap_or_else(|| path_operation_name(verb, path))
}

fn semantic_identifier(id: &str) -> Option<String> {
    let joined = camel_case(id);
    let trimmed = joined.trim_start_matches(|c: char| c.is_ascii_digit());
    is_valid_identifier(trimmed).then(|| trimmed.to_string())
}

/// `get /pets/{id}` becomes `getPetsById`.
///
/// Only the first two placeholders are rewritten (`By X`, `And X`).
fn path_operation_name(verb: &str, path: &str) -> String {
    let path = replace_first_placeholder(path, "by");
    let path = replace_first_placeholder(&path, "and");
    to_identifier(&format!("{verb} {path}"), false, OnlyMode::Base)
}

fn replace_first_placeholder(path: &str, word: &str) -> String {
    let Some(start) = path.find('{') else {
        return path.to_string();
    };
    match path[start + 1..].find('}') {
        Some(len) if len > 0 => {
            let name = &path[start + 1..start + 1 + len];
            format!("{}{word} {name}{}", &path[..start], &path[start + 2 + len..])
        }
        _ => path.to_string(),
    }
}
