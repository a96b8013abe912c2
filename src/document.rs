//! Navigable, read-only view over an OpenAPI document.
//!
//! The document is held as a `serde_json::Value`. Schema nodes are borrowed
//! views into it, addressed by their path from the document root. A `$ref`
//! is resolved when the node is created: the node takes the target's value
//! and path, and remembers the reference it was reached through.

use std::fmt;

use serde_json::{Map, Number, Value};

use crate::types::{OasType, ShapeKind, COMPOSITION_KEYWORDS};

/// Upper bound on chained `$ref` hops before a reference counts as unresolvable.
const MAX_REF_HOPS: usize = 32;

/// A loaded specification document.
#[derive(Debug, Clone)]
pub struct Document {
    root: Value,
}

impl Document {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Object definitions under `components/schemas`, in declaration order.
    pub fn schemas(&self) -> Vec<(&str, SchemaNode<'_>)> {
        self.components("schemas")
            .map(|(key, value)| {
                let path = SchemaPath::from_segments(["components", "schemas", key.as_str()]);
                (key.as_str(), SchemaNode::at(self, value, path))
            })
            .collect()
    }

    /// Look up a single definition under `components/schemas`.
    pub fn schema(&self, name: &str) -> Option<SchemaNode<'_>> {
        self.schemas()
            .into_iter()
            .find(|(key, _)| *key == name)
            .map(|(_, node)| node)
    }

    /// Schemas of reusable parameters (`components/parameters/*/schema`).
    ///
    /// Parameters defined by `content` instead of `schema` are skipped.
    pub fn parameter_schemas(&self) -> Vec<(&str, SchemaNode<'_>)> {
        let mut found = Vec::new();
        for (key, value) in self.components("parameters") {
            let path = SchemaPath::from_segments(["components", "parameters", key.as_str()]);
            let Some((parameter, path)) = self.follow_refs(value, path) else {
                continue;
            };
            if let Some(schema) = parameter.get("schema") {
                found.push((key.as_str(), SchemaNode::at(self, schema, path.join("schema"))));
            }
        }
        found
    }

    /// Content schemas of reusable responses
    /// (`components/responses/*/content/*/schema`).
    pub fn response_schemas(&self) -> Vec<(&str, SchemaNode<'_>)> {
        let mut found = Vec::new();
        for (key, value) in self.components("responses") {
            let path = SchemaPath::from_segments(["components", "responses", key.as_str()]);
            let Some((response, path)) = self.follow_refs(value, path) else {
                continue;
            };
            let Some(content) = response.get("content").and_then(Value::as_object) else {
                continue;
            };
            for (media_type, media) in content {
                if let Some(schema) = media.get("schema") {
                    let schema_path = path.join("content").join(media_type.as_str()).join("schema");
                    found.push((key.as_str(), SchemaNode::at(self, schema, schema_path)));
                }
            }
        }
        found
    }

    /// Every top-level named schema: definitions, then parameter schemas,
    /// then response content schemas.
    pub fn roots(&self) -> Vec<(&str, SchemaNode<'_>)> {
        let mut roots = self.schemas();
        roots.extend(self.parameter_schemas());
        roots.extend(self.response_schemas());
        roots
    }

    /// The node at `path`, with references resolved.
    pub fn node_at(&self, path: &SchemaPath) -> Option<SchemaNode<'_>> {
        self.lookup(path)
            .map(|value| SchemaNode::at(self, value, path.clone()))
    }

    /// The node addressed by a local JSON pointer such as `#/components/schemas/Pet`.
    pub fn node_at_pointer(&self, pointer: &str) -> Option<SchemaNode<'_>> {
        self.node_at(&SchemaPath::parse_pointer(pointer)?)
    }

    fn components(&self, kind: &str) -> impl Iterator<Item = (&String, &Value)> {
        self.root
            .get("components")
            .and_then(|components| components.get(kind))
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(Map::iter)
    }

    fn lookup(&self, path: &SchemaPath) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path.segments() {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Follow `$ref` chains starting at `value` (located at `path`).
    ///
    /// Returns `None` when a reference is external, dangling, or the chain
    /// is longer than [`MAX_REF_HOPS`].
    fn follow_refs<'a>(&'a self, value: &'a Value, path: SchemaPath) -> Option<(&'a Value, SchemaPath)> {
        let mut current = value;
        let mut current_path = path;
        for _ in 0..MAX_REF_HOPS {
            let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
                return Some((current, current_path));
            };
            current_path = SchemaPath::parse_pointer(reference)?;
            current = self.lookup(&current_path)?;
        }
        None
    }
}

/// Ordered, unescaped path segments from the document root.
///
/// Displays as the slash-joined JSON Pointer form without the leading `#/`,
/// e.g. `components/responses/Ok/content/application~1json/schema`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaPath(Vec<String>);

impl SchemaPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse a local JSON pointer (`#/a/b`). Non-local references yield `None`.
    pub fn parse_pointer(pointer: &str) -> Option<Self> {
        let path = pointer.strip_prefix('#')?.trim_start_matches('/');
        if path.is_empty() {
            return Some(Self::root());
        }
        // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
        Some(Self::from_segments(
            path.split('/')
                .map(|part| part.replace("~1", "/").replace("~0", "~")),
        ))
    }

    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Segment `n` positions before the last one (`nth_from_end(0)` is the last).
    pub fn nth_from_end(&self, n: usize) -> Option<&str> {
        self.0.len().checked_sub(n + 1).map(|i| self.0[i].as_str())
    }

    /// The path with the last `n` segments removed.
    pub fn truncated(&self, n: usize) -> Self {
        let keep = self.0.len().saturating_sub(n);
        Self(self.0[..keep].to_vec())
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let escaped: Vec<String> = self
            .0
            .iter()
            .map(|s| s.replace('~', "~0").replace('/', "~1"))
            .collect();
        write!(f, "{}", escaped.join("/"))
    }
}

/// Value of the `additionalProperties` keyword.
#[derive(Debug, Clone)]
pub enum AdditionalProperties<'a> {
    Absent,
    Allowed(bool),
    Schema(SchemaNode<'a>),
}

/// A `discriminator` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminator<'a> {
    pub property_name: &'a str,
    /// Explicit value → target mappings, in declaration order.
    pub mapping: Vec<(&'a str, &'a str)>,
}

impl<'a> Discriminator<'a> {
    /// Mapping values whose target resolves to `node`.
    pub fn values_for(&self, node: &SchemaNode<'_>) -> Vec<&'a str> {
        self.mapping
            .iter()
            .filter(|(_, target)| {
                let resolved = if target.starts_with('#') {
                    node.document.node_at_pointer(target)
                } else {
                    // Bare names refer to `components/schemas`.
                    node.document.schema(target)
                };
                resolved.is_some_and(|target| target.path == node.path)
            })
            .map(|(value, _)| *value)
            .collect()
    }
}

/// One node in the schema graph.
#[derive(Clone)]
pub struct SchemaNode<'a> {
    document: &'a Document,
    value: &'a Value,
    path: SchemaPath,
    reference: Option<&'a str>,
    resolved: bool,
}

impl<'a> SchemaNode<'a> {
    pub(crate) fn at(document: &'a Document, value: &'a Value, path: SchemaPath) -> Self {
        let Some(reference) = value.get("$ref").and_then(Value::as_str) else {
            return Self {
                document,
                value,
                path,
                reference: None,
                resolved: true,
            };
        };

        match document.follow_refs(value, path.clone()) {
            Some((target, target_path)) => Self {
                document,
                value: target,
                path: target_path,
                reference: Some(reference),
                resolved: true,
            },
            None => Self {
                document,
                value,
                path,
                reference: Some(reference),
                resolved: false,
            },
        }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Path from the document root. For referenced nodes this is the target's path.
    pub fn path(&self) -> &SchemaPath {
        &self.path
    }

    /// The `$ref` this node was reached through, if any.
    pub fn reference(&self) -> Option<&'a str> {
        self.reference
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// False for dangling references and for values that are not schema objects.
    pub fn is_defined(&self) -> bool {
        self.resolved && self.value.is_object()
    }

    /// The key this node is stored under in its parent.
    pub fn key(&self) -> &str {
        self.path.last().unwrap_or_default()
    }

    /// The declared name of a `components/schemas` definition.
    pub fn declared_name(&self) -> Option<&str> {
        match self.path.segments() {
            [components, schemas, name] if components == "components" && schemas == "schemas" => {
                Some(name.as_str())
            }
            _ => None,
        }
    }

    pub fn is_named(&self) -> bool {
        self.declared_name().is_some()
    }

    /// True when this node sits directly in an `allOf` list.
    pub fn is_under_all_of(&self) -> bool {
        self.path.nth_from_end(1) == Some("allOf")
    }

    /// The `type` keyword. For type arrays the first non-`null` entry wins.
    pub fn declared_type(&self) -> Option<OasType> {
        match self.value.get("type")? {
            Value::String(s) => OasType::parse(s),
            Value::Array(types) => types.iter().filter_map(Value::as_str).find_map(OasType::parse),
            _ => None,
        }
    }

    /// Declared type, or the type implied by the keywords present.
    pub fn effective_type(&self) -> Option<OasType> {
        if let Some(declared) = self.declared_type() {
            return Some(declared);
        }
        let open = matches!(
            self.additional_properties(),
            AdditionalProperties::Schema(_) | AdditionalProperties::Allowed(true)
        );
        if self.has_properties() || self.has_composition() || open {
            Some(OasType::Object)
        } else if self.value.get("items").is_some() {
            Some(OasType::Array)
        } else {
            None
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self.effective_type() {
            Some(OasType::Array) => ShapeKind::Array,
            Some(OasType::Object) if self.is_open_map() => ShapeKind::Map,
            Some(OasType::Object) => ShapeKind::Object,
            _ => ShapeKind::Scalar,
        }
    }

    /// An object without declared structure whose keys are not closed off.
    fn is_open_map(&self) -> bool {
        !self.has_properties()
            && !self.has_composition()
            && !matches!(self.additional_properties(), AdditionalProperties::Allowed(false))
    }

    fn object(&self) -> Option<&'a Map<String, Value>> {
        self.value.as_object()
    }

    fn child(&self, path: SchemaPath, value: &'a Value) -> SchemaNode<'a> {
        SchemaNode::at(self.document, value, path)
    }

    pub fn has_properties(&self) -> bool {
        self.object()
            .and_then(|map| map.get("properties"))
            .and_then(Value::as_object)
            .is_some_and(|props| !props.is_empty())
    }

    /// Declared properties in document order.
    pub fn properties(&self) -> Vec<(&'a str, SchemaNode<'a>)> {
        let Some(props) = self
            .object()
            .and_then(|map| map.get("properties"))
            .and_then(Value::as_object)
        else {
            return Vec::new();
        };
        let base = self.path.join("properties");
        props
            .iter()
            .map(|(key, value)| (key.as_str(), self.child(base.join(key.as_str()), value)))
            .collect()
    }

    fn composition(&self, keyword: &str) -> Vec<SchemaNode<'a>> {
        let Some(branches) = self.value.get(keyword).and_then(Value::as_array) else {
            return Vec::new();
        };
        let base = self.path.join(keyword);
        branches
            .iter()
            .enumerate()
            .map(|(i, value)| self.child(base.join(i.to_string()), value))
            .collect()
    }

    pub fn all_of(&self) -> Vec<SchemaNode<'a>> {
        self.composition("allOf")
    }

    pub fn one_of(&self) -> Vec<SchemaNode<'a>> {
        self.composition("oneOf")
    }

    pub fn any_of(&self) -> Vec<SchemaNode<'a>> {
        self.composition("anyOf")
    }

    pub fn has_composition(&self) -> bool {
        COMPOSITION_KEYWORDS.iter().any(|keyword| {
            self.value
                .get(*keyword)
                .and_then(Value::as_array)
                .is_some_and(|branches| !branches.is_empty())
        })
    }

    pub fn items(&self) -> Option<SchemaNode<'a>> {
        let items = self.value.get("items")?;
        Some(self.child(self.path.join("items"), items))
    }

    pub fn additional_properties(&self) -> AdditionalProperties<'a> {
        match self.value.get("additionalProperties") {
            None => AdditionalProperties::Absent,
            Some(Value::Bool(allowed)) => AdditionalProperties::Allowed(*allowed),
            Some(schema) => AdditionalProperties::Schema(
                self.child(self.path.join("additionalProperties"), schema),
            ),
        }
    }

    pub fn discriminator(&self) -> Option<Discriminator<'a>> {
        let discriminator = self.value.get("discriminator")?;
        let property_name = discriminator.get("propertyName")?.as_str()?;
        let mapping = discriminator
            .get("mapping")
            .and_then(Value::as_object)
            .map(|mapping| {
                mapping
                    .iter()
                    .filter_map(|(value, target)| Some((value.as_str(), target.as_str()?)))
                    .collect()
            })
            .unwrap_or_default();
        Some(Discriminator {
            property_name,
            mapping,
        })
    }

    pub fn required(&self) -> Vec<&'a str> {
        self.value
            .get("required")
            .and_then(Value::as_array)
            .map(|keys| keys.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_required_key(&self, key: &str) -> bool {
        self.required().contains(&key)
    }

    fn flag(&self, keyword: &str) -> bool {
        self.value.get(keyword).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn read_only(&self) -> bool {
        self.flag("readOnly")
    }

    pub fn write_only(&self) -> bool {
        self.flag("writeOnly")
    }

    fn str_keyword(&self, keyword: &str) -> Option<&'a str> {
        self.value.get(keyword).and_then(Value::as_str)
    }

    fn u64_keyword(&self, keyword: &str) -> Option<u64> {
        self.value.get(keyword).and_then(Value::as_u64)
    }

    pub fn format(&self) -> Option<&'a str> {
        self.str_keyword("format")
    }

    pub fn pattern(&self) -> Option<&'a str> {
        self.str_keyword("pattern")
    }

    pub fn enum_values(&self) -> Option<&'a [Value]> {
        self.value
            .get("enum")
            .and_then(Value::as_array)
            .filter(|values| !values.is_empty())
            .map(Vec::as_slice)
    }

    pub fn is_enum(&self) -> bool {
        self.enum_values().is_some()
    }

    pub fn min_length(&self) -> Option<u64> {
        self.u64_keyword("minLength")
    }

    pub fn max_length(&self) -> Option<u64> {
        self.u64_keyword("maxLength")
    }

    pub fn min_items(&self) -> Option<u64> {
        self.u64_keyword("minItems")
    }

    pub fn max_items(&self) -> Option<u64> {
        self.u64_keyword("maxItems")
    }

    /// Lower numeric bound. A numeric `exclusiveMinimum` (OpenAPI 3.1) is the bound itself.
    pub fn minimum(&self) -> Option<&'a Number> {
        self.bound("minimum", "exclusiveMinimum")
    }

    pub fn maximum(&self) -> Option<&'a Number> {
        self.bound("maximum", "exclusiveMaximum")
    }

    pub fn exclusive_minimum(&self) -> bool {
        self.exclusive("exclusiveMinimum")
    }

    pub fn exclusive_maximum(&self) -> bool {
        self.exclusive("exclusiveMaximum")
    }

    fn bound(&self, inclusive: &str, exclusive: &str) -> Option<&'a Number> {
        match self.value.get(exclusive) {
            Some(Value::Number(n)) => Some(n),
            _ => self.value.get(inclusive).and_then(|v| match v {
                Value::Number(n) => Some(n),
                _ => None,
            }),
        }
    }

    fn exclusive(&self, keyword: &str) -> bool {
        match self.value.get(keyword) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(_)) => true,
            _ => false,
        }
    }
}

impl PartialEq for SchemaNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.resolved == other.resolved
    }
}

impl fmt::Debug for SchemaNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaNode")
            .field("path", &self.path.to_string())
            .field("reference", &self.reference)
            .field("resolved", &self.resolved)
            .finish()
    }
}
