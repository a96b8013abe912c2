//! Canonical type names for schema nodes.
//!
//! Naming is a pure function of the node's position in the document. Nothing
//! is cached here; the [`Catalog`](crate::Catalog) memoizes names for the
//! nodes it enumerates.

use heck::ToUpperCamelCase;

use crate::document::{SchemaNode, SchemaPath};
use crate::error::NamingError;
use crate::types::{ShapeKind, STRUCTURAL_SEGMENTS};

/// Canonical type name of `node`.
///
/// # Errors
///
/// Returns `NamingError::UnsupportedShape` when the node's path follows none
/// of the known naming conventions, or when naming it leads back to itself
/// (an array whose items are the array, envelopes wrapping each other).
pub fn name(node: &SchemaNode<'_>) -> Result<String, NamingError> {
    name_within(node, &mut Vec::new())
}

/// Convert an arbitrary key into an identifier-safe class name.
pub fn class_name(raw: &str) -> String {
    let name = raw.to_upper_camel_case();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", name)
    } else {
        name
    }
}

/// `chain` holds the paths currently being named.
fn name_within(node: &SchemaNode<'_>, chain: &mut Vec<SchemaPath>) -> Result<String, NamingError> {
    if chain.contains(node.path()) {
        return Err(unsupported(node.path()));
    }

    chain.push(node.path().clone());
    let named = name_unguarded(node, chain);
    chain.pop();
    named
}

fn name_unguarded(node: &SchemaNode<'_>, chain: &mut Vec<SchemaPath>) -> Result<String, NamingError> {
    if let Some(variant) = polymorphic_variant(node) {
        return name_within(&variant, chain);
    }

    if node.kind() == ShapeKind::Array {
        return array_name(node, chain);
    }

    if let Some(scoped) = scoped_name(node, chain)? {
        return Ok(scoped);
    }

    base_name(node)
}

/// The first variant's wrapped node when `node` is a `oneOf` envelope whose
/// variants all wrap an `allOf` and which declares no properties itself.
fn polymorphic_variant<'a>(node: &SchemaNode<'a>) -> Option<SchemaNode<'a>> {
    if node.has_properties() {
        return None;
    }
    let variants = node.one_of();
    if variants.is_empty() || variants.iter().any(|v| v.all_of().is_empty()) {
        return None;
    }
    variants.first()?.all_of().into_iter().next()
}

fn array_name(node: &SchemaNode<'_>, chain: &mut Vec<SchemaPath>) -> Result<String, NamingError> {
    let path = node.path();
    if path.len() < 3 {
        return Err(unsupported(path));
    }

    match path.nth_from_end(1) {
        // Inline arrays are scoped to the object declaring them.
        Some("properties") => Ok(format!(
            "{}{}",
            owner_name(node, &path.truncated(2), chain)?,
            class_name(node.key())
        )),
        Some("schemas") if path.nth_from_end(2) == Some("components") => element_name(node, chain),
        Some("schema") | Some("items") | Some("additionalProperties") => element_name(node, chain),
        _ => Err(unsupported(path)),
    }
}

fn element_name(node: &SchemaNode<'_>, chain: &mut Vec<SchemaPath>) -> Result<String, NamingError> {
    match node.items() {
        Some(items) if items.is_defined() => name_within(&items, chain),
        _ => Err(unsupported(node.path())),
    }
}

/// `Owner` + `Key` for anonymous nodes that take their name from the
/// declaring object: enums declared on a property, and enum or object
/// elements of an inline array property.
fn scoped_name(node: &SchemaNode<'_>, chain: &mut Vec<SchemaPath>) -> Result<Option<String>, NamingError> {
    if node.is_named() {
        return Ok(None);
    }
    let kind = node.kind();
    let inline_enum = node.is_enum() && kind == ShapeKind::Scalar;
    let element = inline_enum || kind == ShapeKind::Object;

    let path = node.path();
    let (owner, key) = match (path.nth_from_end(0), path.nth_from_end(1), path.nth_from_end(2)) {
        (Some(key), Some("properties"), _) if inline_enum => (path.truncated(2), key),
        (Some("items"), Some(key), Some("properties")) if element => (path.truncated(3), key),
        _ => return Ok(None),
    };
    Ok(Some(format!("{}{}", owner_name(node, &owner, chain)?, class_name(key))))
}

/// Canonical name of the object declared at `owner`.
fn owner_name(node: &SchemaNode<'_>, owner: &SchemaPath, chain: &mut Vec<SchemaPath>) -> Result<String, NamingError> {
    match node.document().node_at(owner) {
        Some(owner) => name_within(&owner, chain),
        None => Err(unsupported(owner)),
    }
}

fn base_name(node: &SchemaNode<'_>) -> Result<String, NamingError> {
    if let Some(declared) = node.declared_name() {
        let name = class_name(declared);
        if !name.is_empty() {
            return Ok(name);
        }
    }
    derived_name(node.path()).ok_or_else(|| unsupported(node.path()))
}

/// Class name of the last path segment that is not document structure.
fn derived_name(path: &SchemaPath) -> Option<String> {
    let segments = path.segments();
    segments
        .iter()
        .enumerate()
        .filter(|(i, segment)| {
            let parent = i.checked_sub(1).map(|p| segments[p].as_str());
            !is_structural(segment, parent)
        })
        .map(|(_, segment)| class_name(segment))
        .filter(|name| !name.is_empty())
        .last()
}

/// Structural keywords, composition indices and media-type keys.
fn is_structural(segment: &str, parent: Option<&str>) -> bool {
    STRUCTURAL_SEGMENTS.contains(&segment)
        || segment.parse::<u64>().is_ok()
        || parent == Some("content")
}

fn unsupported(path: &SchemaPath) -> NamingError {
    NamingError::UnsupportedShape {
        path: path.to_string(),
    }
}
