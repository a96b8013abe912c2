//! OpenAPI Model Resolution
//!
//! Canonical type names and property resolution for the schema graph of an
//! OpenAPI document, ready to hand to a code generator.
//!
//! The [`Catalog`] validates a document and names every top-level schema
//! (definitions, reusable parameter schemas and response content schemas).
//! [`Catalog::properties`] then lists the visible properties of a schema,
//! flattening `allOf`/`oneOf`/`anyOf` composition into typed descriptors.
//!
//! # Example
//!
//! ```
//! use oas_model::{Catalog, Document, PropertyKind, ResolveSettings};
//! use serde_json::json;
//!
//! let document = Document::new(json!({
//!     "components": {
//!         "schemas": {
//!             "Pet": {
//!                 "type": "object",
//!                 "required": ["name"],
//!                 "properties": {
//!                     "name": { "type": "string" },
//!                     "tags": { "type": "array", "items": { "type": "string" } }
//!                 }
//!             },
//!             "Dog": {
//!                 "allOf": [
//!                     { "$ref": "#/components/schemas/Pet" },
//!                     { "type": "object", "properties": { "barks": { "type": "boolean" } } }
//!                 ]
//!             }
//!         }
//!     }
//! }));
//!
//! let catalog = Catalog::build(&document).unwrap();
//! let dog = catalog.find("Dog").unwrap();
//! let properties = catalog.properties(dog, ResolveSettings::document()).unwrap();
//!
//! let keys: Vec<_> = properties.iter().map(|p| p.key.as_str()).collect();
//! assert_eq!(keys, ["name", "tags", "barks"]);
//! assert!(properties[0].inherited && properties[0].required);
//! assert!(matches!(properties[1].kind, PropertyKind::List(_)));
//! ```
//!
//! # Settings
//!
//! | Setting | Effect |
//! |---------|--------|
//! | `mark_inherited` | Flags properties as coming from a parent type |
//! | `treat_read_write_only_as_optional` | `readOnly`/`writeOnly` properties are never required |
//! | `mark_all_optional` | No property is required |
//! | `exclude_write_only` | `writeOnly` properties are dropped |

mod catalog;
mod document;
mod error;
mod linter;
mod loader;
mod namer;
mod property;
mod resolver;
mod type_info;
mod types;

pub use catalog::{Catalog, SchemaInfo};
pub use document::{AdditionalProperties, Discriminator, Document, SchemaNode, SchemaPath};
pub use error::{CatalogError, LoadError, NamingError, ResolveError};
pub use linter::{lint_document, Diagnostic, LintReport, Severity};
pub use loader::{
    is_url, load_document, load_document_auto, load_document_str, merge_fragments,
    navigate_fragment,
};
pub use namer::{class_name, name};
pub use property::{
    DiscriminatorKey, DiscriminatorKeyKind, ListDetail, PropertyInfo, PropertyKind,
    PropertySummary, ScalarDetail, ADDITIONAL_PROPERTIES_KEY, ONE_OF_KEY,
};
pub use resolver::resolve;
pub use type_info::TypeDescriptor;
pub use types::{OasType, ResolveSettings, ShapeKind};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
