//! Property resolution - the visible properties of an object-shaped schema.
//!
//! Resolution concatenates, in order:
//! 1. properties of every `allOf` branch
//! 2. a single marker for the first `oneOf` branch
//! 3. properties of every `anyOf` branch, all optional
//! 4. the schema's own declared properties
//! 5. a synthetic entry for an `additionalProperties` schema
//!
//! and then deduplicates by key. Referenced object properties are leaves;
//! only composition branches are followed through references.

use heck::ToSnakeCase;
use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::catalog::{Catalog, SchemaInfo};
use crate::document::{AdditionalProperties, SchemaNode, SchemaPath};
use crate::error::ResolveError;
use crate::property::{
    DiscriminatorKey, DiscriminatorKeyKind, ListDetail, PropertyInfo, PropertyKind, ScalarDetail,
    ADDITIONAL_PROPERTIES_KEY, ONE_OF_KEY,
};
use crate::type_info::TypeDescriptor;
use crate::types::{ResolveSettings, ShapeKind};

/// Resolve the visible properties of `info`.
///
/// `enclosing` is the schema whose resolution led here, if any; it supplies
/// discriminator context for inherited properties.
///
/// # Errors
///
/// Returns `ResolveError::Naming` when a nested node cannot be named, or
/// `ResolveError::CompositionCycle` when composition branches loop back.
pub fn resolve<'a>(
    catalog: &Catalog<'a>,
    info: &SchemaInfo<'a>,
    settings: ResolveSettings,
    enclosing: Option<&SchemaInfo<'a>>,
) -> Result<Vec<PropertyInfo<'a>>, ResolveError> {
    resolve_within(catalog, info, settings, enclosing, &mut Vec::new())
}

fn resolve_within<'a>(
    catalog: &Catalog<'a>,
    info: &SchemaInfo<'a>,
    settings: ResolveSettings,
    enclosing: Option<&SchemaInfo<'a>>,
    ancestry: &mut Vec<SchemaPath>,
) -> Result<Vec<PropertyInfo<'a>>, ResolveError> {
    let path = info.node.path();
    if ancestry.contains(path) {
        return Err(ResolveError::CompositionCycle {
            path: path.to_string(),
        });
    }

    ancestry.push(path.clone());
    let collected = collect(catalog, info, settings, enclosing, ancestry);
    ancestry.pop();

    Ok(deduplicate(collected?))
}

fn collect<'a>(
    catalog: &Catalog<'a>,
    info: &SchemaInfo<'a>,
    settings: ResolveSettings,
    enclosing: Option<&SchemaInfo<'a>>,
    ancestry: &mut Vec<SchemaPath>,
) -> Result<Vec<PropertyInfo<'a>>, ResolveError> {
    let node = &info.node;
    let mut properties = Vec::new();

    for branch in node.all_of() {
        let branch = catalog.info_for(&branch)?;
        let branch_settings = settings.mark_inherited(inherits(info, &branch, settings));
        properties.extend(resolve_within(catalog, &branch, branch_settings, Some(info), ancestry)?);
    }

    // Only the first alternative is modeled.
    if let Some(first) = node.one_of().into_iter().next() {
        properties.push(PropertyInfo {
            key: ONE_OF_KEY.to_string(),
            name: ONE_OF_KEY.to_snake_case(),
            required: false,
            inherited: false,
            node: first,
            type_descriptor: TypeDescriptor::Any,
            kind: PropertyKind::OneOfAny,
        });
    }

    for branch in node.any_of() {
        let branch = catalog.info_for(&branch)?;
        properties.extend(resolve_within(
            catalog,
            &branch,
            settings.mark_all_optional(true),
            Some(info),
            ancestry,
        )?);
    }

    for (key, property) in node.properties() {
        if settings.exclude_write_only && property.write_only() {
            continue;
        }
        properties.push(declared_property(catalog, info, key, property, settings, enclosing)?);
    }

    let additional = match node.additional_properties() {
        AdditionalProperties::Schema(value) => Some(Some(value)),
        AdditionalProperties::Allowed(true) => Some(None),
        _ => None,
    };
    if let Some(value) = additional {
        let values = match &value {
            Some(value) => TypeDescriptor::from_node(value)?,
            None => TypeDescriptor::Any,
        };
        properties.push(PropertyInfo {
            key: ADDITIONAL_PROPERTIES_KEY.to_string(),
            name: ADDITIONAL_PROPERTIES_KEY.to_snake_case(),
            required: true,
            inherited: settings.mark_inherited,
            node: value.clone().unwrap_or_else(|| node.clone()),
            type_descriptor: TypeDescriptor::Map {
                values: Box::new(values),
            },
            kind: PropertyKind::AdditionalProperties { value },
        });
    }

    Ok(properties)
}

/// Inheritance flag for an `allOf` branch.
///
/// A branch that merely splits the schema's own definition (same canonical
/// name, or an inline object without discriminator) keeps the incoming flag.
/// Any other branch is a parent type, so its properties are inherited.
fn inherits(info: &SchemaInfo<'_>, branch: &SchemaInfo<'_>, settings: ResolveSettings) -> bool {
    let merge = branch.canonical_name == info.canonical_name
        || (branch.node.discriminator().is_none()
            && !branch.node.is_named()
            && branch.node.is_under_all_of());
    if merge {
        settings.mark_inherited
    } else {
        true
    }
}

fn declared_property<'a>(
    catalog: &Catalog<'a>,
    info: &SchemaInfo<'a>,
    key: &str,
    property: SchemaNode<'a>,
    settings: ResolveSettings,
    enclosing: Option<&SchemaInfo<'a>>,
) -> Result<PropertyInfo<'a>, ResolveError> {
    let kind = match property.kind() {
        ShapeKind::Array => PropertyKind::List(list_detail(info, &property)?),
        ShapeKind::Map => PropertyKind::Map {
            value: match property.additional_properties() {
                AdditionalProperties::Schema(value) => Some(value),
                _ => None,
            },
        },
        ShapeKind::Object if property.is_named() => PropertyKind::ObjectRef {
            target: catalog.info_for(&property)?,
        },
        ShapeKind::Object => PropertyKind::InlineObject {
            enclosing: info.clone(),
        },
        ShapeKind::Scalar => PropertyKind::Scalar(scalar_detail(info, key, &property, enclosing)),
    };

    Ok(PropertyInfo {
        key: key.to_string(),
        name: key.to_snake_case(),
        required: is_required(&info.node, key, &property, settings),
        inherited: settings.mark_inherited,
        type_descriptor: TypeDescriptor::from_node(&property)?,
        node: property,
        kind,
    })
}

fn is_required(owner: &SchemaNode<'_>, key: &str, property: &SchemaNode<'_>, settings: ResolveSettings) -> bool {
    if settings.mark_all_optional || !owner.is_required_key(key) {
        return false;
    }
    !(settings.treat_read_write_only_as_optional && (property.read_only() || property.write_only()))
}

fn list_detail<'a>(info: &SchemaInfo<'a>, property: &SchemaNode<'a>) -> Result<ListDetail<'a>, ResolveError> {
    let items = property.items().filter(SchemaNode::is_defined);
    let element = match &items {
        Some(items) => TypeDescriptor::from_node(items)?,
        None => TypeDescriptor::Any,
    };
    let anonymous = items.as_ref().is_some_and(|items| {
        !items.is_named() && (items.kind() == ShapeKind::Object || items.is_enum())
    });

    Ok(ListDetail {
        element,
        min_items: property.min_items(),
        max_items: property.max_items(),
        enclosing: anonymous.then(|| info.clone()),
    })
}

fn scalar_detail<'a>(
    info: &SchemaInfo<'a>,
    key: &str,
    property: &SchemaNode<'a>,
    enclosing: Option<&SchemaInfo<'a>>,
) -> ScalarDetail<'a> {
    let discriminator = info
        .node
        .discriminator()
        .or_else(|| enclosing.and_then(|e| e.node.discriminator()))
        .filter(|d| d.property_name == key);

    let discriminator_key = discriminator.as_ref().and_then(|discriminator| {
        // The model being resolved is the one the value selects.
        let subject = enclosing.unwrap_or(info);
        let mapped = discriminator.values_for(&subject.node);
        let value = match mapped.as_slice() {
            [single] => Some(single.to_string()),
            _ => single_enum_value(property),
        }?;
        Some(DiscriminatorKey {
            value,
            model_name: subject.canonical_name.clone(),
            kind: if property.is_enum() {
                DiscriminatorKeyKind::Enum
            } else {
                DiscriminatorKeyKind::String
            },
        })
    });

    ScalarDetail {
        pattern: property.pattern().map(str::to_string),
        min_length: property.min_length(),
        max_length: property.max_length(),
        minimum: property.minimum().cloned(),
        maximum: property.maximum().cloned(),
        exclusive_minimum: property.exclusive_minimum(),
        exclusive_maximum: property.exclusive_maximum(),
        is_discriminator: discriminator.is_some(),
        discriminator_key,
        enclosing: (property.is_enum() && !property.is_named()).then(|| info.clone()),
    }
}

fn single_enum_value(property: &SchemaNode<'_>) -> Option<String> {
    match property.enum_values()? {
        [serde_json::Value::String(value)] => Some(value.clone()),
        _ => None,
    }
}

/// Keep one descriptor per key, at the position of its first occurrence.
/// A non-inherited descriptor replaces an inherited one with the same key.
fn deduplicate(properties: Vec<PropertyInfo<'_>>) -> Vec<PropertyInfo<'_>> {
    let mut unique: IndexMap<(bool, String), PropertyInfo<'_>> = IndexMap::new();
    for property in properties {
        let (synthetic, key) = property.dedup_key();
        match unique.entry((synthetic, key.to_string())) {
            Entry::Vacant(slot) => {
                slot.insert(property);
            }
            Entry::Occupied(mut slot) => {
                if slot.get().inherited && !property.inherited {
                    slot.insert(property);
                }
            }
        }
    }
    unique.into_values().collect()
}
