//! Integration tests for catalog construction and validation.

use oas_model::{
    load_document_str, merge_fragments, Catalog, CatalogError, Document, NamingError,
    PropertyKind, ResolveSettings, Severity, TypeDescriptor,
};
use serde_json::json;

const PETSTORE: &str = r##"
openapi: 3.0.0
info:
  title: Petstore
  version: 1.0.0
paths: {}
components:
  schemas:
    Pet:
      type: object
      required: [id]
      properties:
        id:
          type: integer
          format: int64
        status:
          type: string
          enum: [available, sold]
    Pets:
      type: array
      items:
        $ref: '#/components/schemas/Pet'
  parameters:
    Status:
      name: status
      in: query
      schema:
        type: string
        enum: [available, sold]
  responses:
    PetList:
      description: all pets
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/Pets'
"##;

#[test]
fn builds_catalog_from_yaml() {
    let doc = Document::new(load_document_str(PETSTORE).unwrap());
    let catalog = Catalog::build(&doc).unwrap();

    let names: Vec<_> = catalog
        .iter()
        .map(|(path, info)| (path, info.canonical_name.as_str()))
        .collect();
    assert_eq!(
        names,
        [
            ("components/schemas/Pet", "Pet"),
            ("components/schemas/Pets", "Pet"),
            ("components/parameters/Status/schema", "Status"),
        ]
    );
    assert!(catalog.warnings().is_empty());
}

#[test]
fn properties_and_combiner_fail_whole_build() {
    let doc = Document::new(json!({
        "components": { "schemas": {
            "Fine": { "type": "object", "properties": { "a": { "type": "string" } } },
            "Pet": {
                "type": "object",
                "properties": { "id": { "type": "string" } },
                "oneOf": [{ "type": "object" }]
            }
        }}
    }));

    let err = Catalog::build(&doc).unwrap_err();
    assert_eq!(err.exit_code(), 1);
    match &err {
        CatalogError::Invalid { diagnostics } => {
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].severity, Severity::Error);
            assert!(diagnostics[0].message.contains("'Pet'"));
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
    let message = err.to_string();
    assert!(message.starts_with("invalid models or api file (1 error(s)):"));
    assert!(message.contains("\tcomponents/schemas/Pet: "));
}

#[test]
fn every_finding_is_reported_at_once() {
    let doc = Document::new(json!({
        "components": { "schemas": {
            "A": { "type": "array" },
            "B": { "type": "object", "properties": { "ghost": { "$ref": "#/components/schemas/Gone" } } },
            "C": { "anyOf": [{ "$ref": "#/components/schemas/Lost" }] }
        }}
    }));

    match Catalog::build(&doc) {
        Err(CatalogError::Invalid { diagnostics }) => {
            let codes: Vec<_> = diagnostics.iter().map(|d| d.code.as_str()).collect();
            assert_eq!(codes, ["E002", "E003", "E004"]);
        }
        other => panic!("expected validation failure, got {:?}", other.map(|c| c.len())),
    }
}

#[test]
fn unnameable_shape_is_a_naming_error() {
    let doc = Document::new(json!({
        "components": { "parameters": {
            "Broken": {
                "name": "broken",
                "in": "query",
                "schema": { "allOf": [{ "type": "array", "items": { "type": "string" } }] }
            }
        }}
    }));

    let catalog = Catalog::build(&doc).unwrap();
    let info = catalog.find("Broken").unwrap();
    let branch = info.node.all_of().remove(0);
    assert!(catalog.info_for(&branch).is_err());
}

#[test]
fn fragments_extend_the_catalog() {
    let base = load_document_str(PETSTORE).unwrap();
    let fragment = json!({
        "components": { "schemas": {
            "Owner": { "type": "object", "properties": { "name": { "type": "string" } } }
        }}
    });

    let doc = Document::new(merge_fragments(base, [fragment]));
    let catalog = Catalog::build(&doc).unwrap();

    assert!(catalog.get("components/schemas/Owner").is_some());
    assert_eq!(catalog.len(), 4);
}

#[test]
fn self_referential_array_fails_to_name() {
    let doc = Document::new(json!({
        "components": { "schemas": {
            "Tree": { "type": "array", "items": { "$ref": "#/components/schemas/Tree" } }
        }}
    }));

    match Catalog::build(&doc) {
        Err(CatalogError::Naming(NamingError::UnsupportedShape { path })) => {
            assert_eq!(path, "components/schemas/Tree");
        }
        other => panic!("expected naming failure, got {:?}", other.map(|c| c.len())),
    }
}

#[test]
fn mutually_referential_arrays_fail_to_name() {
    let doc = Document::new(json!({
        "components": { "schemas": {
            "Ping": { "type": "array", "items": { "$ref": "#/components/schemas/Pong" } },
            "Pong": { "type": "array", "items": { "$ref": "#/components/schemas/Ping" } }
        }}
    }));

    let err = Catalog::build(&doc).unwrap_err();
    assert!(matches!(err, CatalogError::Naming(NamingError::UnsupportedShape { .. })));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn inline_list_elements_are_unique_per_owner() {
    let doc = Document::new(json!({
        "components": { "schemas": {
            "Order": { "type": "object", "properties": {
                "lines": { "type": "array", "items": {
                    "type": "object", "properties": { "sku": { "type": "string" } }
                } }
            } },
            "Invoice": { "type": "object", "properties": {
                "lines": { "type": "array", "items": {
                    "type": "object", "properties": { "amount": { "type": "number" } }
                } }
            } }
        }}
    }));
    let catalog = Catalog::build(&doc).unwrap();

    let element = |schema: &str| {
        let info = catalog.find(schema).unwrap();
        let props = catalog.properties(info, ResolveSettings::document()).unwrap();
        match &props[0].kind {
            PropertyKind::List(list) => list.element.clone(),
            other => panic!("expected list, got {:?}", other),
        }
    };

    assert_eq!(element("Order"), TypeDescriptor::Object { name: "OrderLines".into() });
    assert_eq!(element("Invoice"), TypeDescriptor::Object { name: "InvoiceLines".into() });
}
