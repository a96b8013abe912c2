//! Error types for document loading, naming and property resolution.

use std::path::PathBuf;
use thiserror::Error;

use crate::linter::Diagnostic;

/// Errors while loading a specification document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("fragment not found: {fragment}")]
    FragmentNotFound { fragment: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// A node whose path does not follow any naming convention the namer models.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("unsupported schema shape at {path}: cannot derive a type name")]
    UnsupportedShape { path: String },
}

impl NamingError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors during property resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Naming(#[from] NamingError),

    #[error("composition cycle detected at {path}")]
    CompositionCycle { path: String },
}

impl ResolveError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while building the schema catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{}", render_findings(.diagnostics))]
    Invalid { diagnostics: Vec<Diagnostic> },

    #[error(transparent)]
    Naming(#[from] NamingError),
}

impl CatalogError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            CatalogError::Invalid { .. } => 1,
            CatalogError::Naming(_) => 2,
        }
    }
}

fn render_findings(diagnostics: &[Diagnostic]) -> String {
    let mut message = format!("invalid models or api file ({} error(s)):", diagnostics.len());
    for diagnostic in diagnostics {
        message.push_str("\n\t");
        message.push_str(&diagnostic.to_string());
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linter::Severity;

    #[test]
    fn load_error_exit_codes() {
        let err = LoadError::FileNotFound {
            path: PathBuf::from("api.yaml"),
        };
        assert_eq!(err.exit_code(), 3);

        let err = LoadError::FragmentNotFound {
            fragment: "#/components/schemas/Missing".into(),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn catalog_error_exit_codes() {
        let err = CatalogError::Invalid {
            diagnostics: Vec::new(),
        };
        assert_eq!(err.exit_code(), 1);

        let err = CatalogError::Naming(NamingError::UnsupportedShape {
            path: "paths".into(),
        });
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn catalog_error_lists_every_finding() {
        let err = CatalogError::Invalid {
            diagnostics: vec![
                Diagnostic {
                    severity: Severity::Error,
                    code: "E001".into(),
                    path: "components/schemas/Pet".into(),
                    message: "first".into(),
                },
                Diagnostic {
                    severity: Severity::Error,
                    code: "E003".into(),
                    path: "components/schemas/Owner/properties/pet".into(),
                    message: "second".into(),
                },
            ],
        };
        let rendered = err.to_string();
        assert!(rendered.starts_with("invalid models or api file (2 error(s)):"));
        assert!(rendered.contains("\tcomponents/schemas/Pet: first"));
        assert!(rendered.contains("\tcomponents/schemas/Owner/properties/pet: second"));
        assert_eq!(rendered.lines().count(), 3);
    }
}
