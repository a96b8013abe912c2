//! Schema catalog - the canonical name of every top-level named schema.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::document::{Document, SchemaNode};
use crate::error::{CatalogError, NamingError, ResolveError};
use crate::linter::{lint_document, Diagnostic};
use crate::namer;
use crate::property::PropertyInfo;
use crate::resolver;
use crate::types::ResolveSettings;

/// A schema node together with its declared key and canonical name.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaInfo<'a> {
    /// Key the schema was declared under.
    pub source_key: String,
    pub canonical_name: String,
    pub node: SchemaNode<'a>,
}

impl<'a> SchemaInfo<'a> {
    /// Name `node`, keeping `source_key` as its declared key.
    pub fn new(source_key: impl Into<String>, node: SchemaNode<'a>) -> Result<Self, NamingError> {
        Ok(Self {
            source_key: source_key.into(),
            canonical_name: namer::name(&node)?,
            node,
        })
    }

    /// Name `node`, using the key it is stored under in its parent.
    pub fn from_node(node: SchemaNode<'a>) -> Result<Self, NamingError> {
        let key = node.key().to_string();
        Self::new(key, node)
    }
}

/// Map from path to [`SchemaInfo`] for every top-level named schema.
///
/// Entries keep document order: definitions, parameter schemas, then
/// response content schemas.
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    document: &'a Document,
    entries: IndexMap<String, SchemaInfo<'a>>,
    warnings: Vec<Diagnostic>,
}

impl<'a> Catalog<'a> {
    /// Validate `document` and name all of its top-level schemas.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` listing every validation error when
    /// the document has any, or `CatalogError::Naming` when a schema cannot
    /// be named. No catalog is produced in either case.
    pub fn build(document: &'a Document) -> Result<Self, CatalogError> {
        let report = lint_document(document);
        for warning in report.warning_diagnostics() {
            warn!(path = %warning.path, code = %warning.code, "{}", warning.message);
        }
        if !report.is_ok() {
            return Err(CatalogError::Invalid {
                diagnostics: report.error_diagnostics().cloned().collect(),
            });
        }

        let mut entries = IndexMap::new();
        for (key, node) in document.roots() {
            let path = node.path().to_string();
            if entries.contains_key(&path) {
                continue;
            }
            let info = SchemaInfo::new(key, node)?;
            debug!(%path, name = %info.canonical_name, "cataloged schema");
            entries.insert(path, info);
        }

        Ok(Self {
            document,
            entries,
            warnings: report.warning_diagnostics().cloned().collect(),
        })
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// Entry at `path` (e.g. `components/schemas/Pet`).
    pub fn get(&self, path: &str) -> Option<&SchemaInfo<'a>> {
        self.entries.get(path)
    }

    /// First entry whose declared key or canonical name is `name`.
    pub fn find(&self, name: &str) -> Option<&SchemaInfo<'a>> {
        self.entries
            .values()
            .find(|info| info.source_key == name)
            .or_else(|| self.entries.values().find(|info| info.canonical_name == name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaInfo<'a>)> {
        self.entries.iter().map(|(path, info)| (path.as_str(), info))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Warnings found while validating the document.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Schema info for any node: the cataloged entry when there is one,
    /// otherwise a freshly named one.
    pub fn info_for(&self, node: &SchemaNode<'a>) -> Result<SchemaInfo<'a>, NamingError> {
        match self.entries.get(&node.path().to_string()) {
            Some(info) => Ok(info.clone()),
            None => SchemaInfo::from_node(node.clone()),
        }
    }

    /// Visible properties of `info` under `settings`.
    pub fn properties(
        &self,
        info: &SchemaInfo<'a>,
        settings: ResolveSettings,
    ) -> Result<Vec<PropertyInfo<'a>>, ResolveError> {
        resolver::resolve(self, info, settings, None)
    }
}
