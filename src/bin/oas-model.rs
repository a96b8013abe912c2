//! OpenAPI model CLI
//!
//! Command-line interface for naming and resolving the schemas of an OpenAPI document.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use oas_model::{
    lint_document, load_document_auto, merge_fragments, Catalog, CatalogError, Document,
    PropertySummary, ResolveSettings, Severity,
};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "oas-model")]
#[command(about = "Name and resolve the schema models of an OpenAPI document")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the canonical name of every top-level schema
    Names {
        /// API document: file path or URL (http:// or https://)
        api: String,

        /// Additional document merged over the API document (repeatable)
        #[arg(long)]
        fragment: Vec<String>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve the visible properties of one schema
    Properties {
        /// API document: file path or URL (http:// or https://)
        api: String,

        /// Schema key or canonical name
        schema: String,

        /// Additional document merged over the API document (repeatable)
        #[arg(long)]
        fragment: Vec<String>,

        /// Start from the HTTP preset instead of the document preset
        #[arg(long)]
        http: bool,

        /// Flag top-level properties as inherited
        #[arg(long)]
        mark_inherited: bool,

        /// Keep readOnly/writeOnly properties required when listed in `required`
        #[arg(long)]
        strict_read_write: bool,

        /// Make every property optional
        #[arg(long)]
        all_optional: bool,

        /// Drop writeOnly properties
        #[arg(long)]
        exclude_write_only: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate the schemas of a document without generating anything
    Lint {
        /// API document: file path or URL (http:// or https://)
        api: String,

        /// Additional document merged over the API document (repeatable)
        #[arg(long)]
        fragment: Vec<String>,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "oas_model=warn".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Names {
            api,
            fragment,
            json,
        } => run_names(&api, &fragment, json),

        Commands::Properties {
            api,
            schema,
            fragment,
            http,
            mark_inherited,
            strict_read_write,
            all_optional,
            exclude_write_only,
            pretty,
        } => {
            let preset = if http {
                ResolveSettings::http()
            } else {
                ResolveSettings::document()
            };
            let settings = preset
                .mark_inherited(mark_inherited)
                .treat_read_write_only_as_optional(
                    preset.treat_read_write_only_as_optional && !strict_read_write,
                )
                .mark_all_optional(all_optional)
                .exclude_write_only(exclude_write_only);
            run_properties(&api, &fragment, &schema, settings, pretty)
        }

        Commands::Lint {
            api,
            fragment,
            format,
            strict,
        } => run_lint(&api, &fragment, &format, strict),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Load `api` and merge every fragment over it.
fn load(api: &str, fragments: &[String]) -> Result<Document, u8> {
    let load_one = |source: &str| {
        load_document_auto(source).map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })
    };

    let base = load_one(api)?;
    let overlays = fragments
        .iter()
        .map(|fragment| load_one(fragment.as_str()))
        .collect::<Result<Vec<Value>, u8>>()?;

    Ok(Document::new(merge_fragments(base, overlays)))
}

fn build_catalog(document: &Document) -> Result<Catalog<'_>, u8> {
    Catalog::build(document).map_err(|e| {
        match &e {
            CatalogError::Invalid { .. } => eprintln!("{}", e),
            CatalogError::Naming(_) => eprintln!("Error: {}", e),
        }
        e.exit_code() as u8
    })
}

#[derive(Serialize)]
struct NameEntry<'a> {
    path: &'a str,
    key: &'a str,
    name: &'a str,
}

fn run_names(api: &str, fragments: &[String], json_output: bool) -> Result<(), u8> {
    let document = load(api, fragments)?;
    let catalog = build_catalog(&document)?;

    if json_output {
        let entries: Vec<NameEntry<'_>> = catalog
            .iter()
            .map(|(path, info)| NameEntry {
                path,
                key: &info.source_key,
                name: &info.canonical_name,
            })
            .collect();
        println!("{}", to_json(&entries, true)?);
    } else {
        for (path, info) in catalog.iter() {
            println!("{}\t{}", path, info.canonical_name);
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct PropertiesOutput<'a> {
    schema: &'a str,
    path: String,
    properties: Vec<PropertySummary>,
}

fn run_properties(
    api: &str,
    fragments: &[String],
    schema: &str,
    settings: ResolveSettings,
    pretty: bool,
) -> Result<(), u8> {
    let document = load(api, fragments)?;
    let catalog = build_catalog(&document)?;

    let Some(info) = catalog.find(schema) else {
        eprintln!("Error: schema not found: {}", schema);
        return Err(2);
    };

    let properties = catalog.properties(info, settings).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let output = PropertiesOutput {
        schema: &info.canonical_name,
        path: info.node.path().to_string(),
        properties: properties.iter().map(|p| p.summary()).collect(),
    };
    println!("{}", to_json(&output, pretty)?);

    Ok(())
}

fn run_lint(api: &str, fragments: &[String], format: &str, strict: bool) -> Result<(), u8> {
    let document = load(api, fragments)?;
    let report = lint_document(&document);
    let passed = report.is_ok() && (!strict || report.warnings == 0);

    if format == "json" {
        println!("{}", to_json(&report, true)?);
    } else {
        println!("Linting {} ...\n", api);

        for diag in &report.diagnostics {
            let (color, label) = match diag.severity {
                Severity::Error => ("\x1b[31m", "error"),
                Severity::Warning => ("\x1b[33m", "warning"),
            };
            println!(
                "  {}{}[{}]\x1b[0m: {} - {}",
                color, label, diag.code, diag.path, diag.message
            );
        }

        if !report.diagnostics.is_empty() {
            println!();
        }
        if passed {
            println!("\x1b[32m✓ all schemas passed ({} warnings)\x1b[0m", report.warnings);
        } else {
            println!(
                "\x1b[31m✗ {} errors, {} warnings\x1b[0m",
                report.errors, report.warnings
            );
        }
    }

    if passed {
        Ok(())
    } else {
        Err(1)
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}
