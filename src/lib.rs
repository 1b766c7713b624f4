pub mod ast;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod graph;
pub mod naming;
pub mod openapi;
pub mod params;
pub mod refs;
pub mod schema;
pub mod synth;

use std::path::Path;

pub use codegen::{generate_document, GeneratedModule};
pub use config::GeneratorConfig;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::CodegenError;
use openapi::{parse_document, parse_document_from_path};

/// Generates a validator module from an OpenAPI JSON string.
pub fn generate(input: &str, config: &GeneratorConfig) -> Result<GeneratedModule, CodegenError> {
    let document = parse_document(input)?;
    Ok(generate_document(&document, config))
}

/// Generates a validator module from an OpenAPI JSON file.
pub fn generate_from_path(
    path: impl AsRef<Path>,
    config: &GeneratorConfig,
) -> Result<GeneratedModule, CodegenError> {
    let document = parse_document_from_path(path)?;
    Ok(generate_document(&document, config))
}

/// Emission order of the document's named schemas.
pub fn schema_order(input: &str) -> Result<Vec<String>, CodegenError> {
    let document = parse_document(input)?;
    Ok(graph::resolve_order(&document.schemas))
}
