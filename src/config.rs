//! Generator configuration: naming conventions and export policy.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CodegenError;
use crate::naming::NamingConvention;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Naming and visibility of one kind of declaration.
pub struct DeclarationConfig {
    pub name: NamingConvention,
    pub export: bool,
}

impl Default for DeclarationConfig {
    fn default() -> Self {
        Self {
            name: NamingConvention::TitleCase,
            export: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Configuration record read from a JSON file:
///
/// ```json
/// { "schema": { "name": "PascalCase", "export": true },
///   "type": { "name": "camelCase", "export": false } }
/// ```
pub struct GeneratorConfig {
    /// Validator bindings (`const UserSchema = ...`).
    pub schema: DeclarationConfig,
    /// Derived static types (`type User = z.infer<...>`). When `export` is
    /// false no type declarations are emitted.
    #[serde(rename = "type")]
    pub types: DeclarationConfig,
}

impl GeneratorConfig {
    pub fn from_json_str(input: &str) -> Result<Self, CodegenError> {
        serde_json::from_str(input).map_err(|e| CodegenError::ConfigError(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CodegenError> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|e| {
            CodegenError::ConfigError(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&input)
    }
}
