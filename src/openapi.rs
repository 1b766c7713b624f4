//! OpenAPI 3.0 / 3.1 JSON loading into the [`Document`] model.
//!
//! Only hard structural problems are errors. Malformed operations,
//! parameters and responses are skipped or degraded while loading.

use std::fs;
use std::path::Path;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::ast::{
    Document, Endpoint, HttpMethod, MediaType, Parameter, ParameterLocation, Registry,
    RequestBody, Response, SchemaNode,
};
use crate::error::CodegenError;
use crate::schema::{parse_schema_node, parse_schema_registry, reference_name};

/// Upper bound on `$ref -> $ref` hops when resolving component references.
const MAX_REF_HOPS: usize = 16;

type JsonObject = JsonMap<String, JsonValue>;

/// Parses an OpenAPI JSON string.
pub fn parse_document(input: &str) -> Result<Document, CodegenError> {
    let root: JsonValue = serde_json::from_str(input)
        .map_err(|e| CodegenError::DocumentError(format!("invalid JSON: {e}")))?;
    document_from_value(&root)
}

/// Reads and parses an OpenAPI JSON file.
pub fn parse_document_from_path(path: impl AsRef<Path>) -> Result<Document, CodegenError> {
    let path = path.as_ref();
    let input = fs::read_to_string(path).map_err(|e| {
        CodegenError::DocumentError(format!("failed to read '{}': {e}", path.display()))
    })?;
    parse_document(&input)
}

/// Builds a [`Document`] from an already parsed JSON value.
pub fn document_from_value(root: &JsonValue) -> Result<Document, CodegenError> {
    let root = root.as_object().ok_or_else(|| {
        CodegenError::DocumentError("document root must be a mapping/object".to_string())
    })?;

    let components = root.get("components").and_then(JsonValue::as_object);
    let schemas = match components.and_then(|c| c.get("schemas")) {
        Some(value) => parse_schema_registry(value)?,
        None => match root.get("definitions") {
            Some(value) => parse_schema_registry(value)?,
            None => Registry::new(),
        },
    };

    let loader = Loader { components };
    let endpoints = match root.get("paths") {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Object(paths)) => loader.endpoints(paths),
        Some(_) => {
            return Err(CodegenError::DocumentError(
                "'paths' must be a mapping/object".to_string(),
            ))
        }
    };

    tracing::debug!(
        schemas = schemas.len(),
        endpoints = endpoints.len(),
        "loaded document"
    );

    Ok(Document { schemas, endpoints })
}

struct Loader<'a> {
    components: Option<&'a JsonObject>,
}

impl<'a> Loader<'a> {
    fn endpoints(&self, paths: &'a JsonObject) -> Vec<Endpoint> {
        let mut out = Vec::new();

        for (path, item) in paths {
            let Some(item) = item.as_object() else {
                tracing::debug!(path = %path, "skipping non-object path item");
                continue;
            };
            let shared = self.parameters(item.get("parameters"));

            for (key, operation) in item {
                let Some(method) = HttpMethod::parse(key) else {
                    continue;
                };
                let Some(operation) = operation.as_object() else {
                    continue;
                };
                out.push(self.endpoint(path, method, operation, &shared));
            }
        }

        out
    }

    fn endpoint(
        &self,
        path: &str,
        method: HttpMethod,
        operation: &'a JsonObject,
        shared: &[Parameter],
    ) -> Endpoint {
        let mut endpoint = Endpoint::new(path, method);
        endpoint.operation_id = string_field(operation, "operationId");
        endpoint.summary = string_field(operation, "summary");
        endpoint.description = string_field(operation, "description");
        endpoint.tags = operation
            .get("tags")
            .and_then(JsonValue::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(JsonValue::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        endpoint.parameters = merge_parameters(shared, self.parameters(operation.get("parameters")));
        endpoint.request_body = operation
            .get("requestBody")
            .and_then(|value| self.request_body(value));
        endpoint.responses = operation
            .get("responses")
            .and_then(JsonValue::as_object)
            .map(|responses| {
                responses
                    .iter()
                    .filter_map(|(status, value)| self.response(status, value))
                    .collect()
            })
            .unwrap_or_default();

        endpoint
    }

    fn parameters(&self, value: Option<&'a JsonValue>) -> Vec<Parameter> {
        value
            .and_then(JsonValue::as_array)
            .map(|items| items.iter().filter_map(|item| self.parameter(item)).collect())
            .unwrap_or_default()
    }

    fn parameter(&self, value: &'a JsonValue) -> Option<Parameter> {
        let map = self.resolve(value, "parameters")?;
        let name = string_field(map, "name")?;
        let location = map
            .get("in")
            .and_then(JsonValue::as_str)
            .and_then(ParameterLocation::parse)?;

        let required = map
            .get("required")
            .and_then(JsonValue::as_bool)
            .unwrap_or(location == ParameterLocation::Path);

        let schema = match map.get("schema") {
            Some(schema) => parse_schema_node(schema),
            None => self
                .content(map.get("content"))
                .into_iter()
                .next()
                .map(|media| media.schema)
                .unwrap_or_default(),
        };

        Some(Parameter {
            name,
            location,
            required,
            schema,
            description: string_field(map, "description"),
        })
    }

    fn request_body(&self, value: &'a JsonValue) -> Option<RequestBody> {
        let map = self.resolve(value, "requestBodies")?;
        Some(RequestBody {
            required: map
                .get("required")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
            description: string_field(map, "description"),
            content: self.content(map.get("content")),
        })
    }

    fn response(&self, status: &str, value: &'a JsonValue) -> Option<Response> {
        let map = self.resolve(value, "responses")?;
        Some(Response {
            status: status.to_string(),
            description: string_field(map, "description").unwrap_or_default(),
            content: self.content(map.get("content")),
        })
    }

    fn content(&self, value: Option<&'a JsonValue>) -> Vec<MediaType> {
        value
            .and_then(JsonValue::as_object)
            .map(|content| {
                content
                    .iter()
                    .map(|(content_type, media)| MediaType {
                        content_type: content_type.clone(),
                        schema: media
                            .get("schema")
                            .map(parse_schema_node)
                            .unwrap_or_else(SchemaNode::default),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Follows `$ref`s into `components.<section>` until a plain object is found.
    fn resolve(&self, value: &'a JsonValue, section: &str) -> Option<&'a JsonObject> {
        let mut current = value.as_object()?;
        for _ in 0..MAX_REF_HOPS {
            let Some(target) = current.get("$ref").and_then(JsonValue::as_str) else {
                return Some(current);
            };
            let name = reference_name(target);
            let found = self
                .components
                .and_then(|components| components.get(section))
                .and_then(JsonValue::as_object)
                .and_then(|entries| entries.get(&name))
                .and_then(JsonValue::as_object);
            match found {
                Some(next) => current = next,
                None => {
                    tracing::debug!(reference = %target, "unresolved component reference");
                    return None;
                }
            }
        }
        tracing::debug!(section = %section, "component reference chain too deep");
        None
    }
}

/// Path-level parameters followed by operation-level ones; an operation
/// parameter replaces a path-level one with the same name and location.
fn merge_parameters(shared: &[Parameter], own: Vec<Parameter>) -> Vec<Parameter> {
    let mut merged: Vec<Parameter> = shared
        .iter()
        .filter(|p| {
            !own.iter()
                .any(|o| o.name == p.name && o.location == p.location)
        })
        .cloned()
        .collect();
    merged.extend(own);
    merged
}

fn string_field(map: &JsonObject, key: &str) -> Option<String> {
    map.get(key).and_then(JsonValue::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{document_from_value, parse_document};
    use crate::ast::{HttpMethod, Kind, ParameterLocation};

    #[test]
    fn keeps_declaration_order() {
        let doc = document_from_value(&json!({
            "components": { "schemas": {
                "Zebra": { "type": "string" },
                "Apple": { "type": "string" }
            } },
            "paths": {
                "/b": { "post": { "responses": {} }, "get": { "responses": {} } },
                "/a": { "get": { "responses": {} } }
            }
        }))
        .unwrap();

        assert_eq!(doc.schemas.names().collect::<Vec<_>>(), vec!["Zebra", "Apple"]);
        let endpoints: Vec<(&str, HttpMethod)> = doc
            .endpoints
            .iter()
            .map(|e| (e.path.as_str(), e.method))
            .collect();
        assert_eq!(
            endpoints,
            vec![
                ("/b", HttpMethod::Post),
                ("/b", HttpMethod::Get),
                ("/a", HttpMethod::Get)
            ]
        );
    }

    #[test]
    fn operation_parameters_override_path_parameters() {
        let doc = document_from_value(&json!({
            "paths": { "/users/{id}": {
                "parameters": [
                    { "name": "id", "in": "path", "schema": { "type": "string" } },
                    { "name": "trace", "in": "header", "schema": { "type": "string" } }
                ],
                "get": {
                    "parameters": [
                        { "name": "id", "in": "path", "schema": { "type": "integer" } }
                    ],
                    "responses": {}
                }
            } }
        }))
        .unwrap();

        let params = &doc.endpoints[0].parameters;
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "trace");
        assert_eq!(params[1].schema.kind, Some(Kind::Integer));
        assert!(params[1].required);
        assert!(!params[0].required);
    }

    #[test]
    fn resolves_component_references() {
        let doc = document_from_value(&json!({
            "components": {
                "parameters": { "Limit": { "name": "limit", "in": "query", "schema": { "type": "integer" } } },
                "requestBodies": { "NewUser": { "required": true, "content": {
                    "application/json": { "schema": { "$ref": "#/components/schemas/User" } }
                } } },
                "responses": { "NotFound": { "description": "missing" } }
            },
            "paths": { "/users": { "post": {
                "parameters": [{ "$ref": "#/components/parameters/Limit" }],
                "requestBody": { "$ref": "#/components/requestBodies/NewUser" },
                "responses": { "404": { "$ref": "#/components/responses/NotFound" } }
            } } }
        }))
        .unwrap();

        let endpoint = &doc.endpoints[0];
        assert_eq!(endpoint.parameters[0].location, ParameterLocation::Query);
        let body = endpoint.request_body.as_ref().unwrap();
        assert!(body.required);
        assert_eq!(body.content[0].schema.reference.as_deref(), Some("User"));
        assert_eq!(endpoint.responses[0].status, "404");
        assert_eq!(endpoint.responses[0].description, "missing");
    }

    #[test]
    fn unresolvable_references_are_skipped() {
        let doc = document_from_value(&json!({
            "paths": { "/x": { "get": {
                "parameters": [{ "$ref": "#/components/parameters/Nope" }],
                "responses": { "200": { "description": "ok" } }
            } } }
        }))
        .unwrap();
        assert!(doc.endpoints[0].parameters.is_empty());
        assert_eq!(doc.endpoints[0].responses.len(), 1);
    }

    #[test]
    fn parameters_fall_back_to_content_schema() {
        let doc = document_from_value(&json!({
            "paths": { "/x": { "get": {
                "parameters": [{ "name": "filter", "in": "query", "content": {
                    "application/json": { "schema": { "type": "object" } }
                } }],
                "responses": {}
            } } }
        }))
        .unwrap();
        assert_eq!(doc.endpoints[0].parameters[0].schema.kind, Some(Kind::Object));
    }

    #[test]
    fn rejects_structural_errors() {
        assert!(parse_document("[]").is_err());
        assert!(parse_document("{ not json").is_err());
        assert!(parse_document(r#"{ "paths": [] }"#).is_err());
        assert!(parse_document(r#"{ "components": { "schemas": 1 } }"#).is_err());
    }

    #[test]
    fn reads_legacy_definitions() {
        let doc = parse_document(r#"{ "definitions": { "Pet": { "type": "object" } } }"#).unwrap();
        assert!(doc.schemas.contains("Pet"));
        assert!(doc.endpoints.is_empty());
    }
}
