//! The per-run generation context.
//!
//! Every registry the translator and the operation synthesizer mutate lives
//! on [`Generator`]. A fresh generator is created for each run and dropped
//! after emission.

use std::collections::HashMap;

use serde_json::Value;

use super::api::ApiIR;
use super::discriminator::DiscriminatorIndex;
use super::naming::{AliasNames, EnumNames, OnlyMode, OperationNames};
use super::types::TsTypeDef;
use crate::error::Result;
use crate::openapi::options::GenerateOptions;
use crate::openapi::resolver::Resolver;
use crate::openapi::spec::Document;

/// Alias names registered for one `$ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefEntry {
    pub base: String,
    pub read_only: Option<String>,
    pub write_only: Option<String>,
}

impl RefEntry {
    /// The alias for a view, falling back to the base alias when the schema
    /// has no such variant.
    pub fn alias_for(&self, mode: OnlyMode) -> &str {
        let variant = match mode {
            OnlyMode::Base => None,
            OnlyMode::ReadOnly => self.read_only.as_deref(),
            OnlyMode::WriteOnly => self.write_only.as_deref(),
        };
        variant.unwrap_or(&self.base)
    }
}

/// Whether a schema contains read-only and/or write-only members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OnlyFlags {
    pub read_only: bool,
    pub write_only: bool,
}

impl OnlyFlags {
    /// Nothing more to find.
    pub const fn both(self) -> bool {
        self.read_only && self.write_only
    }

    pub fn merge(&mut self, other: OnlyFlags) {
        self.read_only |= other.read_only;
        self.write_only |= other.write_only;
    }
}

/// Generation context for one run.
#[derive(Debug)]
pub struct Generator<'a> {
    pub(super) resolver: Resolver<'a>,
    pub(super) options: &'a GenerateOptions,
    pub(super) discriminators: DiscriminatorIndex,
    /// Reference registry, keyed by ref path.
    pub(super) refs: HashMap<String, RefEntry>,
    /// Ref-following read/write classification, cached per ref path.
    pub(super) only_flags: HashMap<String, OnlyFlags>,
    pub(super) aliases: AliasNames,
    pub(super) enum_names: EnumNames,
    pub(super) operation_names: OperationNames,
    pub(super) declarations: Vec<TsTypeDef>,
    pub(super) enum_declarations: Vec<TsTypeDef>,
}

impl<'a> Generator<'a> {
    /// Fresh registries over `raw`; `document` seeds the discriminator index.
    pub fn new(raw: &'a Value, document: &Document, options: &'a GenerateOptions) -> Self {
        Self {
            resolver: Resolver::new(raw),
            options,
            discriminators: DiscriminatorIndex::build(document.components.as_ref()),
            refs: HashMap::new(),
            only_flags: HashMap::new(),
            aliases: AliasNames::default(),
            enum_names: EnumNames::default(),
            operation_names: OperationNames::default(),
            declarations: Vec::new(),
            enum_declarations: Vec::new(),
        }
    }

    /// Translate the whole document into the API IR.
    pub fn run(mut self, document: &Document) -> Result<ApiIR> {
        let operations = self.normalize_operations(document)?;
        if self.options.all_schemas {
            self.translate_all_schemas(document)?;
        }
        tracing::debug!(
            operations = operations.len(),
            types = self.declarations.len(),
            enums = self.enum_declarations.len(),
            "Normalized document"
        );
        Ok(ApiIR {
            operations,
            types: self.declarations,
            enums: self.enum_declarations,
        })
    }
}
