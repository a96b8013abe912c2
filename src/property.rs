//! Resolved property descriptors.
//!
//! A [`PropertyInfo`] carries the fields every descriptor shares plus a
//! [`PropertyKind`] tag recording which of the seven descriptor variants was
//! produced. Consumers dispatch on the tag.

use serde::Serialize;
use serde_json::Number;

use crate::catalog::SchemaInfo;
use crate::document::SchemaNode;
use crate::type_info::TypeDescriptor;

/// Reserved key of the synthetic additional-properties descriptor.
pub const ADDITIONAL_PROPERTIES_KEY: &str = "additionalProperties";

/// Reserved key of the synthetic `oneOf` marker descriptor.
pub const ONE_OF_KEY: &str = "oneOf";

/// Discriminator value that selects the model owning a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscriminatorKey {
    pub value: String,
    pub model_name: String,
    pub kind: DiscriminatorKeyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscriminatorKeyKind {
    /// The discriminating property is a free-form string.
    String,
    /// The discriminating property is an enum; `value` is one of its members.
    Enum,
}

/// Validation bounds and discriminator linkage of a scalar property.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarDetail<'a> {
    pub pattern: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    /// The property is the discriminator of the declaring or enclosing model.
    pub is_discriminator: bool,
    pub discriminator_key: Option<DiscriminatorKey>,
    /// Naming context for inline enums.
    pub enclosing: Option<SchemaInfo<'a>>,
}

/// Element type and item-count bounds of a list property.
#[derive(Debug, Clone, PartialEq)]
pub struct ListDetail<'a> {
    pub element: TypeDescriptor,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    /// Naming context when the element is an anonymous object or enum.
    pub enclosing: Option<SchemaInfo<'a>>,
}

/// Descriptor variant tag with its variant-specific data.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind<'a> {
    Scalar(ScalarDetail<'a>),
    List(ListDetail<'a>),
    /// Open or schema-less object; `value` is the `additionalProperties` schema.
    Map { value: Option<SchemaNode<'a>> },
    /// Object property pointing at a named, reusable schema.
    ObjectRef { target: SchemaInfo<'a> },
    /// Object property defined in place.
    InlineObject { enclosing: SchemaInfo<'a> },
    /// Synthetic entry for a declared `additionalProperties` schema.
    AdditionalProperties { value: Option<SchemaNode<'a>> },
    /// Synthetic entry for a `oneOf` composition.
    OneOfAny,
}

impl PropertyKind<'_> {
    /// Stable tag name, used in serialized summaries.
    pub fn tag(&self) -> &'static str {
        match self {
            PropertyKind::Scalar(_) => "scalar",
            PropertyKind::List(_) => "list",
            PropertyKind::Map { .. } => "map",
            PropertyKind::ObjectRef { .. } => "object_ref",
            PropertyKind::InlineObject { .. } => "inline_object",
            PropertyKind::AdditionalProperties { .. } => "additional_properties",
            PropertyKind::OneOfAny => "one_of_any",
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(
            self,
            PropertyKind::AdditionalProperties { .. } | PropertyKind::OneOfAny
        )
    }
}

/// One visible property of an object-shaped schema.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo<'a> {
    /// Key as declared in the document, or a reserved key for synthetic entries.
    pub key: String,
    /// Identifier form of the key.
    pub name: String,
    pub required: bool,
    pub inherited: bool,
    pub node: SchemaNode<'a>,
    pub type_descriptor: TypeDescriptor,
    pub kind: PropertyKind<'a>,
}

impl<'a> PropertyInfo<'a> {
    /// Identity used for deduplication. Synthetic keys live in their own
    /// namespace so they never collide with declared keys.
    pub fn dedup_key(&self) -> (bool, &str) {
        (self.kind.is_synthetic(), self.key.as_str())
    }

    pub fn summary(&self) -> PropertySummary {
        PropertySummary {
            key: self.key.clone(),
            name: self.name.clone(),
            kind: self.kind.tag(),
            required: self.required,
            inherited: self.inherited,
            path: self.node.path().to_string(),
            type_descriptor: self.type_descriptor.clone(),
            discriminator: match &self.kind {
                PropertyKind::Scalar(detail) if detail.is_discriminator => Some(detail.discriminator_key.clone()),
                _ => None,
            },
            target: match &self.kind {
                PropertyKind::ObjectRef { target } => Some(target.canonical_name.clone()),
                _ => None,
            },
        }
    }
}

/// Serializable view of a [`PropertyInfo`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySummary {
    pub key: String,
    pub name: String,
    pub kind: &'static str,
    pub required: bool,
    pub inherited: bool,
    pub path: String,
    #[serde(rename = "type")]
    pub type_descriptor: TypeDescriptor,
    /// Present for discriminator properties; inner `None` when no single value applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Option<DiscriminatorKey>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_tags() {
        assert!(PropertyKind::OneOfAny.is_synthetic());
        assert!(PropertyKind::AdditionalProperties { value: None }.is_synthetic());
        assert!(!PropertyKind::Map { value: None }.is_synthetic());
        assert_eq!(PropertyKind::OneOfAny.tag(), "one_of_any");
    }

    #[test]
    fn discriminator_key_serializes_lowercase_kind() {
        let key = DiscriminatorKey {
            value: "dog".into(),
            model_name: "Dog".into(),
            kind: DiscriminatorKeyKind::Enum,
        };
        assert_eq!(
            serde_json::to_value(&key).unwrap(),
            serde_json::json!({ "value": "dog", "model_name": "Dog", "kind": "enum" })
        );
    }
}
