//! Document validation - static checks run before the catalog is built.
//!
//! Checks every top-level named schema and the inline schemas nested in it:
//! - properties declared next to a composition operator
//! - untyped schemas with properties (warning, object is assumed)
//! - arrays whose items cannot be resolved
//! - properties and composition branches that cannot be resolved
//!
//! Findings accumulate; a single pass reports all of them.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::document::{AdditionalProperties, Document, SchemaNode, SchemaPath};
use crate::types::{json_type_name, ShapeKind};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    /// Path of the offending node (e.g. "components/schemas/Pet/properties/id")
    pub path: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Result of validating a whole document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    pub errors: usize,
    pub warnings: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl LintReport {
    /// Returns true if no errors were found. Warnings do not count.
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }

    pub fn error_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warning_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    fn push(&mut self, severity: Severity, code: &str, node: &SchemaNode<'_>, message: String) {
        match severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
        }
        self.diagnostics.push(Diagnostic {
            severity,
            code: code.to_string(),
            path: node.path().to_string(),
            message,
        });
    }
}

/// Validate every top-level named schema of `document`.
pub fn lint_document(document: &Document) -> LintReport {
    let mut report = LintReport::default();
    let mut visited = HashSet::new();

    for (key, node) in document.roots() {
        if !node.is_defined() {
            report.push(
                Severity::Error,
                "E003",
                &node,
                format!("Schema '{}' cannot be parsed to a Schema. Check your input", key),
            );
            continue;
        }
        check_schema(key, &node, &mut report, &mut visited);
    }

    report
}

/// Check one defined schema and recurse into its inline children.
///
/// Referenced children are skipped: they are top-level schemas and get
/// checked on their own.
fn check_schema(
    name: &str,
    node: &SchemaNode<'_>,
    report: &mut LintReport,
    visited: &mut HashSet<SchemaPath>,
) {
    if !visited.insert(node.path().clone()) {
        return;
    }

    if node.has_properties() && node.has_composition() {
        report.push(
            Severity::Error,
            "E001",
            node,
            format!(
                "'{}' schema contains an invalid combination of properties and `oneOf | anyOf | allOf`. \
                 Do not use properties and a combiner at the same level.",
                name
            ),
        );
    }

    if node.declared_type().is_none() && node.has_properties() {
        report.push(
            Severity::Warning,
            "W001",
            node,
            format!(
                "Schema '{}' has no type but defines properties. Assuming: 'type: object'",
                name
            ),
        );
    }

    if node.kind() == ShapeKind::Array {
        match node.items() {
            Some(items) if items.is_defined() => {
                if !items.is_reference() {
                    check_schema(name, &items, report, visited);
                }
            }
            _ => report.push(
                Severity::Error,
                "E002",
                node,
                format!("Array type '{}' cannot be parsed to a Schema. Check your input", name),
            ),
        }
    }

    for (key, property) in node.properties() {
        if !property.is_defined() {
            report.push(
                Severity::Error,
                "E003",
                &property,
                undefined_message("Property", key, &property),
            );
        } else if !property.is_reference() {
            check_schema(key, &property, report, visited);
        }
    }

    let branches = node
        .all_of()
        .into_iter()
        .chain(node.one_of())
        .chain(node.any_of());
    for branch in branches {
        if !branch.is_defined() {
            report.push(
                Severity::Error,
                "E004",
                &branch,
                undefined_message("Composition branch of", name, &branch),
            );
        } else if !branch.is_reference() {
            check_schema(name, &branch, report, visited);
        }
    }

    if let AdditionalProperties::Schema(values) = node.additional_properties() {
        if !values.is_defined() {
            report.push(
                Severity::Error,
                "E003",
                &values,
                undefined_message("Additional properties of", name, &values),
            );
        } else if !values.is_reference() {
            check_schema(name, &values, report, visited);
        }
    }
}

fn undefined_message(what: &str, name: &str, node: &SchemaNode<'_>) -> String {
    match node.reference() {
        Some(reference) => format!(
            "{} '{}' cannot be parsed to a Schema: unresolved reference {}",
            what, name, reference
        ),
        None => format!(
            "{} '{}' cannot be parsed to a Schema: expected object, got {}",
            what,
            name,
            json_type_name(node.value())
        ),
    }
}
