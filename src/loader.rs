//! Document loading from files, strings and HTTP URLs, plus fragment merging.
//!
//! Documents load as `serde_json::Value` (YAML is converted on the way in)
//! and are wrapped into a [`Document`](crate::Document) by the caller once
//! all fragments are merged.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::LoadError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a document from a file path.
///
/// Files ending in `.yaml` or `.yml` are parsed as YAML, everything else as JSON.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist, or a parse
/// error if the content is not valid for its format.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "loaded document");

    if is_yaml_path(path) {
        parse_yaml(&content)
    } else {
        serde_json::from_str(&content).map_err(|source| LoadError::InvalidJson { source })
    }
}

/// Load a document from a string. JSON is tried first, then YAML.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` when the content is neither valid JSON
/// nor a YAML mapping.
pub fn load_document_str(content: &str) -> Result<Value, LoadError> {
    match serde_json::from_str(content) {
        Ok(value) => Ok(value),
        Err(json_error) => match parse_yaml(content) {
            Ok(value @ Value::Object(_)) => Ok(value),
            _ => Err(LoadError::InvalidJson { source: json_error }),
        },
    }
}

/// Load a document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the server
/// answers with an error status, or a parse error for an invalid body.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Value, LoadError> {
    let network = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network)?;

    let body = client
        .get(url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .and_then(reqwest::blocking::Response::text)
        .map_err(network)?;
    debug!(%url, bytes = body.len(), "fetched document");

    let path = url.split(['?', '#']).next().unwrap_or(url);
    if is_yaml_path(Path::new(path)) {
        parse_yaml(&body)
    } else {
        load_document_str(&body)
    }
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a document from a file path or URL.
///
/// URL loading requires the `remote` feature.
pub fn load_document_auto(source: &str) -> Result<Value, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}

/// Navigate a JSON Pointer fragment (e.g. `#/components/schemas/Pet`).
///
/// # Errors
///
/// Returns `LoadError::FragmentNotFound` when a segment does not exist.
pub fn navigate_fragment(document: &Value, fragment: &str) -> Result<Value, LoadError> {
    let path = fragment.trim_start_matches('#').trim_start_matches('/');
    if path.is_empty() {
        return Ok(document.clone());
    }

    let not_found = || LoadError::FragmentNotFound {
        fragment: fragment.to_string(),
    };
    let mut current = document;
    for part in path.split('/') {
        // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
        let key = part.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            other => other.get(&key),
        }
        .ok_or_else(not_found)?;
    }
    Ok(current.clone())
}

/// Merge `fragments` into `base`, in order.
///
/// Objects merge key by key; any other fragment value replaces what the
/// base holds at that position.
pub fn merge_fragments(mut base: Value, fragments: impl IntoIterator<Item = Value>) -> Value {
    for fragment in fragments {
        merge_into(&mut base, fragment);
    }
    base
}

fn merge_into(target: &mut Value, overlay: Value) {
    match (target, overlay) {
        (Value::Object(target), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match target.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, overlay) => *target = overlay,
    }
}

fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

fn parse_yaml(content: &str) -> Result<Value, LoadError> {
    serde_yaml::from_str(content).map_err(|source| LoadError::InvalidYaml { source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    #[test]
    fn load_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"openapi": "3.0.0"}}"#).unwrap();

        let doc = load_document(file.path()).unwrap();
        assert_eq!(doc["openapi"], "3.0.0");
    }

    #[test]
    fn load_yaml_file_by_extension() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "openapi: 3.0.0\ncomponents:\n  schemas:\n    Pet:\n      type: object").unwrap();

        let doc = load_document(file.path()).unwrap();
        assert_eq!(doc["components"]["schemas"]["Pet"]["type"], "object");
    }

    #[test]
    fn load_file_not_found() {
        let result = load_document(Path::new("/nonexistent/api.json"));
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
        assert_eq!(result.unwrap_err().exit_code(), 3);
    }

    #[test]
    fn load_invalid_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{ not json").unwrap();

        let result = load_document(file.path());
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn load_str_accepts_json_and_yaml() {
        assert_eq!(load_document_str(r#"{"a": 1}"#).unwrap(), json!({ "a": 1 }));
        assert_eq!(load_document_str("a: 1\nb: [x]").unwrap(), json!({ "a": 1, "b": ["x"] }));
    }

    #[test]
    fn load_str_rejects_scalars() {
        let result = load_document_str("just some words");
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn url_detection() {
        assert!(is_url("https://example.com/api.yaml"));
        assert!(is_url("http://example.com/api.json"));
        assert!(!is_url("./api.json"));
        assert!(!is_url("api.yaml"));
    }

    #[test]
    fn navigate_into_objects_and_arrays() {
        let doc = json!({ "paths": { "/pets": { "tags": ["a", "b"] } } });
        assert_eq!(navigate_fragment(&doc, "#/paths/~1pets/tags/1").unwrap(), json!("b"));
        assert_eq!(navigate_fragment(&doc, "#").unwrap(), doc);
        assert!(matches!(
            navigate_fragment(&doc, "#/paths/missing"),
            Err(LoadError::FragmentNotFound { .. })
        ));
    }

    #[test]
    fn merge_adds_and_overrides() {
        let base = json!({
            "components": { "schemas": { "Pet": { "type": "object" } } },
            "tags": ["a"]
        });
        let fragment = json!({
            "components": { "schemas": { "Owner": { "type": "object" } } },
            "tags": ["b"]
        });

        let merged = merge_fragments(base, [fragment]);
        let schemas = merged["components"]["schemas"].as_object().unwrap();
        assert_eq!(schemas.keys().collect::<Vec<_>>(), ["Pet", "Owner"]);
        assert_eq!(merged["tags"], json!(["b"]));
    }

    #[cfg(feature = "remote")]
    mod remote {
        use super::*;

        #[test]
        fn load_url_json() {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/api.json")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(r#"{"openapi": "3.0.0"}"#)
                .create();

            let doc = load_document_url(&format!("{}/api.json", server.url())).unwrap();
            assert_eq!(doc["openapi"], "3.0.0");
            mock.assert();
        }

        #[test]
        fn load_url_yaml() {
            let mut server = mockito::Server::new();
            let _mock = server
                .mock("GET", "/api.yaml")
                .with_status(200)
                .with_body("openapi: 3.1.0\n")
                .create();

            let doc = load_document_auto(&format!("{}/api.yaml", server.url())).unwrap();
            assert_eq!(doc["openapi"], "3.1.0");
        }

        #[test]
        fn load_url_error_status() {
            let mut server = mockito::Server::new();
            let _mock = server.mock("GET", "/missing.json").with_status(404).create();

            let result = load_document_url(&format!("{}/missing.json", server.url()));
            assert!(matches!(result, Err(LoadError::NetworkError { .. })));
        }
    }
}
