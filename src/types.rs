//! Core types shared by the namer, catalog and property resolver.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Path segments that describe document structure rather than a type name.
pub const STRUCTURAL_SEGMENTS: &[&str] = &[
    "anyOf",
    "oneOf",
    "allOf",
    "items",
    "schema",
    "content",
    "additionalProperties",
    "properties",
];

/// Composition keywords, in resolution order.
pub const COMPOSITION_KEYWORDS: &[&str] = &["allOf", "oneOf", "anyOf"];

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Declared OpenAPI `type` of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OasType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
}

impl OasType {
    /// Parse a `type` keyword value. `null` and unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "object" => Some(OasType::Object),
            "array" => Some(OasType::Array),
            "string" => Some(OasType::String),
            "number" => Some(OasType::Number),
            "integer" => Some(OasType::Integer),
            "boolean" => Some(OasType::Boolean),
            _ => None,
        }
    }
}

/// Structural shape of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Object with declared properties or composition.
    Object,
    Array,
    /// Open or schema-less object.
    Map,
    Scalar,
}

/// Settings threaded by value through property resolution.
///
/// Every recursive call receives its own copy, so sibling `allOf`/`anyOf`
/// branches never observe each other's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolveSettings {
    /// Tag produced properties as inherited from a polymorphic parent.
    pub mark_inherited: bool,
    /// Treat `readOnly`/`writeOnly` properties as optional even when required.
    pub treat_read_write_only_as_optional: bool,
    /// Force every produced property to be optional.
    pub mark_all_optional: bool,
    /// Drop `writeOnly` properties entirely.
    pub exclude_write_only: bool,
}

impl Default for ResolveSettings {
    fn default() -> Self {
        Self::DOCUMENT
    }
}

impl ResolveSettings {
    /// Profile for model documents shared between readers and writers.
    pub const DOCUMENT: Self = Self {
        mark_inherited: false,
        treat_read_write_only_as_optional: true,
        mark_all_optional: false,
        exclude_write_only: false,
    };

    /// Profile for HTTP request/response models.
    pub const HTTP: Self = Self {
        mark_inherited: false,
        treat_read_write_only_as_optional: true,
        mark_all_optional: false,
        exclude_write_only: false,
    };

    pub fn document() -> Self {
        Self::DOCUMENT
    }

    pub fn http() -> Self {
        Self::HTTP
    }

    pub fn mark_inherited(mut self, mark_inherited: bool) -> Self {
        self.mark_inherited = mark_inherited;
        self
    }

    pub fn treat_read_write_only_as_optional(mut self, optional: bool) -> Self {
        self.treat_read_write_only_as_optional = optional;
        self
    }

    pub fn mark_all_optional(mut self, optional: bool) -> Self {
        self.mark_all_optional = optional;
        self
    }

    pub fn exclude_write_only(mut self, exclude: bool) -> Self {
        self.exclude_write_only = exclude;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oas_type_parse() {
        assert_eq!(OasType::parse("object"), Some(OasType::Object));
        assert_eq!(OasType::parse("integer"), Some(OasType::Integer));
        assert_eq!(OasType::parse("null"), None);
        assert_eq!(OasType::parse("Object"), None);
    }

    #[test]
    fn presets_treat_read_write_only_as_optional() {
        assert!(ResolveSettings::document().treat_read_write_only_as_optional);
        assert!(ResolveSettings::http().treat_read_write_only_as_optional);
        assert_eq!(ResolveSettings::default(), ResolveSettings::DOCUMENT);
    }

    #[test]
    fn builder_copies_leave_original_untouched() {
        let base = ResolveSettings::http();
        let optional = base.mark_all_optional(true);
        assert!(optional.mark_all_optional);
        assert!(!base.mark_all_optional);
    }
}
