//! Language-neutral type descriptors for resolved schema nodes.

use serde::Serialize;
use serde_json::Value;

use crate::document::{AdditionalProperties, SchemaNode, SchemaPath};
use crate::error::NamingError;
use crate::namer;
use crate::types::{OasType, ShapeKind};

/// Type token handed to the code-generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    Text,
    Date,
    DateTime,
    Uuid,
    Uri,
    Bytes,
    Integer,
    Long,
    Float,
    Double,
    Number,
    Boolean,
    Enum { name: String, values: Vec<String> },
    Object { name: String },
    UntypedObject,
    Array { items: Box<TypeDescriptor> },
    Map { values: Box<TypeDescriptor> },
    Any,
}

impl TypeDescriptor {
    /// Describe `node`'s shape.
    ///
    /// Named and inline objects become [`TypeDescriptor::Object`] and are not
    /// expanded, so self-referential object graphs terminate. Arrays and maps
    /// that refer back to themselves degrade to [`TypeDescriptor::Any`].
    pub fn from_node(node: &SchemaNode<'_>) -> Result<Self, NamingError> {
        describe(node, &mut Vec::new())
    }
}

fn describe(node: &SchemaNode<'_>, visiting: &mut Vec<SchemaPath>) -> Result<TypeDescriptor, NamingError> {
    if !node.is_defined() || visiting.contains(node.path()) {
        return Ok(TypeDescriptor::Any);
    }

    visiting.push(node.path().clone());
    let described = match node.kind() {
        ShapeKind::Array => {
            let items = match node.items() {
                Some(items) => describe(&items, visiting)?,
                None => TypeDescriptor::Any,
            };
            TypeDescriptor::Array {
                items: Box::new(items),
            }
        }
        ShapeKind::Map => match node.additional_properties() {
            AdditionalProperties::Schema(values) => TypeDescriptor::Map {
                values: Box::new(describe(&values, visiting)?),
            },
            AdditionalProperties::Allowed(true) => TypeDescriptor::Map {
                values: Box::new(TypeDescriptor::Any),
            },
            _ => TypeDescriptor::UntypedObject,
        },
        ShapeKind::Object => TypeDescriptor::Object {
            name: namer::name(node)?,
        },
        ShapeKind::Scalar => scalar(node)?,
    };
    visiting.pop();

    Ok(described)
}

fn scalar(node: &SchemaNode<'_>) -> Result<TypeDescriptor, NamingError> {
    if let Some(values) = node.enum_values() {
        return Ok(TypeDescriptor::Enum {
            name: namer::name(node)?,
            values: values.iter().map(enum_literal).collect(),
        });
    }

    let described = match (node.effective_type(), node.format()) {
        (Some(OasType::String), Some("date")) => TypeDescriptor::Date,
        (Some(OasType::String), Some("date-time")) => TypeDescriptor::DateTime,
        (Some(OasType::String), Some("uuid")) => TypeDescriptor::Uuid,
        (Some(OasType::String), Some("uri" | "url")) => TypeDescriptor::Uri,
        (Some(OasType::String), Some("byte" | "binary")) => TypeDescriptor::Bytes,
        (Some(OasType::String), _) => TypeDescriptor::Text,
        (Some(OasType::Integer), Some("int64")) => TypeDescriptor::Long,
        (Some(OasType::Integer), _) => TypeDescriptor::Integer,
        (Some(OasType::Number), Some("float")) => TypeDescriptor::Float,
        (Some(OasType::Number), Some("double")) => TypeDescriptor::Double,
        (Some(OasType::Number), _) => TypeDescriptor::Number,
        (Some(OasType::Boolean), _) => TypeDescriptor::Boolean,
        _ => TypeDescriptor::Any,
    };
    Ok(described)
}

fn enum_literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use serde_json::json;

    fn describe_schema(doc: &Document, name: &str) -> TypeDescriptor {
        TypeDescriptor::from_node(&doc.schema(name).unwrap()).unwrap()
    }

    #[test]
    fn scalar_formats() {
        let doc = Document::new(json!({
            "components": { "schemas": {
                "When": { "type": "string", "format": "date-time" },
                "Id": { "type": "string", "format": "uuid" },
                "Count": { "type": "integer", "format": "int64" },
                "Ratio": { "type": "number", "format": "float" },
                "Flag": { "type": "boolean" },
                "Anything": {}
            }}
        }));
        assert_eq!(describe_schema(&doc, "When"), TypeDescriptor::DateTime);
        assert_eq!(describe_schema(&doc, "Id"), TypeDescriptor::Uuid);
        assert_eq!(describe_schema(&doc, "Count"), TypeDescriptor::Long);
        assert_eq!(describe_schema(&doc, "Ratio"), TypeDescriptor::Float);
        assert_eq!(describe_schema(&doc, "Flag"), TypeDescriptor::Boolean);
        assert_eq!(describe_schema(&doc, "Anything"), TypeDescriptor::Any);
    }

    #[test]
    fn enums_carry_name_and_values() {
        let doc = Document::new(json!({
            "components": { "schemas": {
                "Color": { "type": "string", "enum": ["red", "green"] },
                "Code": { "type": "integer", "enum": [1, 2] }
            }}
        }));
        assert_eq!(
            describe_schema(&doc, "Color"),
            TypeDescriptor::Enum {
                name: "Color".into(),
                values: vec!["red".into(), "green".into()]
            }
        );
        assert_eq!(
            describe_schema(&doc, "Code"),
            TypeDescriptor::Enum {
                name: "Code".into(),
                values: vec!["1".into(), "2".into()]
            }
        );
    }

    #[test]
    fn collections_and_maps() {
        let doc = Document::new(json!({
            "components": { "schemas": {
                "Pet": { "type": "object", "properties": { "id": { "type": "string" } } },
                "Pets": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } },
                "Labels": { "type": "object", "additionalProperties": { "type": "string" } },
                "Blob": { "type": "object" }
            }}
        }));
        assert_eq!(
            describe_schema(&doc, "Pets"),
            TypeDescriptor::Array {
                items: Box::new(TypeDescriptor::Object { name: "Pet".into() })
            }
        );
        assert_eq!(
            describe_schema(&doc, "Labels"),
            TypeDescriptor::Map {
                values: Box::new(TypeDescriptor::Text)
            }
        );
        assert_eq!(describe_schema(&doc, "Blob"), TypeDescriptor::UntypedObject);
    }

    #[test]
    fn self_referential_array_terminates() {
        let doc = Document::new(json!({
            "components": { "schemas": {
                "Tree": { "type": "array", "items": { "$ref": "#/components/schemas/Tree" } }
            }}
        }));
        assert_eq!(
            describe_schema(&doc, "Tree"),
            TypeDescriptor::Array {
                items: Box::new(TypeDescriptor::Any)
            }
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let descriptor = TypeDescriptor::Array {
            items: Box::new(TypeDescriptor::Object { name: "Pet".into() }),
        };
        assert_eq!(
            serde_json::to_value(&descriptor).unwrap(),
            json!({ "kind": "array", "items": { "kind": "object", "name": "Pet" } })
        );
    }
}
