//! Whole-document pipeline: ordering, synthesis, route binding and emission.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::ast::{Document, Endpoint, ParameterLocation, Registry};
use crate::config::GeneratorConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::emit::{emit_module, ResponseBinding, RouteDefinition, SchemaDeclaration};
use crate::error::CodegenError;
use crate::graph::{build_graph, resolve_graph_order};
use crate::naming::{resolve_identifier, to_camel_case, Role};
use crate::params::{bind_content, bind_parameters};
use crate::synth::{synthesize, SynthContext};

const HEADER: &str = concat!(
    "// Generated by openapi-zod.\n",
    "// WARNING: This file is generated. Do not edit manually.\n",
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Generated module text plus the non-fatal diagnostics raised while building it.
pub struct GeneratedModule {
    pub code: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Diagnostic>,
}

impl GeneratedModule {
    /// Writes the module text to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), CodegenError> {
        fs::write(path, &self.code)?;
        Ok(())
    }

    /// Warnings as a JSON array of `{ "location", "message" }` records.
    pub fn warnings_json(&self) -> Result<String, CodegenError> {
        serde_json::to_string_pretty(&self.warnings)
            .map_err(|e| CodegenError::SerializationError(e.to_string()))
    }
}

/// Generates a full module for an already loaded document.
///
/// Never fails: defects in individual schemas degrade and show up in
/// [`GeneratedModule::warnings`].
pub fn generate_document(document: &Document, config: &GeneratorConfig) -> GeneratedModule {
    let mut diagnostics = Diagnostics::new();

    let graph = build_graph(&document.schemas);
    let order = resolve_graph_order(&graph);
    tracing::debug!(
        schemas = order.len(),
        endpoints = document.endpoints.len(),
        "generating module"
    );

    let schemas = declare_schemas(&document.schemas, &order, config, &mut diagnostics);

    let mut used_route_names = HashSet::new();
    let routes: Vec<RouteDefinition> = document
        .endpoints
        .iter()
        .map(|endpoint| {
            let mut route = bind_route(endpoint, &document.schemas, config, &mut diagnostics);
            route.identifier = unique_identifier(&route.identifier, &mut used_route_names);
            route
        })
        .collect();

    let mut code = String::from(HEADER);
    if routes.is_empty() {
        code.push_str("import { z } from \"@hono/zod-openapi\";\n");
    } else {
        code.push_str("import { createRoute, z } from \"@hono/zod-openapi\";\n");
    }

    let body = emit_module(&schemas, &routes, config);
    if !body.is_empty() {
        code.push('\n');
        code.push_str(&body);
    }

    GeneratedModule {
        code,
        warnings: diagnostics.into_vec(),
    }
}

/// Synthesizes the named schemas listed in `order`.
///
/// A schema is marked lazy when it references itself or a registry schema
/// that has not been declared yet, which only happens inside cycles.
pub fn declare_schemas(
    registry: &Registry,
    order: &[String],
    config: &GeneratorConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<SchemaDeclaration> {
    let graph = build_graph(registry);
    let mut declared: HashSet<&str> = HashSet::new();
    let mut identifiers: HashMap<String, &str> = HashMap::new();
    let mut out = Vec::with_capacity(order.len());

    for name in order {
        let Some(node) = registry.get(name) else {
            continue;
        };

        let identifier = resolve_identifier(name, config.schema.name, Role::SchemaVariable);
        if let Some(previous) = identifiers.insert(identifier.clone(), name) {
            diagnostics.warn(
                name.clone(),
                format!("identifier '{identifier}' is also derived from schema '{previous}'"),
            );
        }

        let ctx = SynthContext::new(config.schema.name)
            .with_registry(registry)
            .at(name.clone());
        let expression = synthesize(node, &ctx, diagnostics);

        let lazy = graph.dependencies(name).iter().any(|dependency| {
            dependency == name
                || (registry.contains(dependency) && !declared.contains(dependency.as_str()))
        });
        if lazy {
            tracing::debug!(schema = %name, "deferring cyclic schema with z.lazy");
            if config.types.export {
                diagnostics.warn(
                    name.clone(),
                    "recursive schema is declared as z.ZodTypeAny; its derived type is 'any'",
                );
            }
        }

        declared.insert(name);
        out.push(SchemaDeclaration {
            name: name.clone(),
            expression,
            lazy,
        });
    }

    out
}

/// Binds one endpoint's parameters, body and responses into a route.
pub fn bind_route(
    endpoint: &Endpoint,
    registry: &Registry,
    config: &GeneratorConfig,
    diagnostics: &mut Diagnostics,
) -> RouteDefinition {
    let location = format!("{} {}", endpoint.method.as_str(), endpoint.path);
    check_path_template(endpoint, &location, diagnostics);

    let ctx = SynthContext::new(config.schema.name)
        .with_registry(registry)
        .at(location);

    let request = bind_parameters(
        &endpoint.parameters,
        endpoint.request_body.as_ref(),
        &ctx,
        diagnostics,
    );

    let responses = endpoint
        .responses
        .iter()
        .map(|response| ResponseBinding {
            status: response.status.clone(),
            description: response.description.clone(),
            content: bind_content(
                &response.content,
                &ctx.child(&format!("responses.{}", response.status)),
                diagnostics,
            ),
        })
        .collect();

    RouteDefinition {
        identifier: route_identifier(endpoint),
        method: endpoint.method,
        path: endpoint.path.clone(),
        operation_id: endpoint.operation_id.clone(),
        tags: endpoint.tags.clone(),
        summary: endpoint.summary.clone(),
        description: endpoint.description.clone(),
        request,
        responses,
    }
}

/// `operationId` or `method + path`, camel-cased, with a `Route` suffix.
pub fn route_identifier(endpoint: &Endpoint) -> String {
    let base = match &endpoint.operation_id {
        Some(operation_id) => to_camel_case(operation_id),
        None => to_camel_case(&format!("{} {}", endpoint.method.as_str(), endpoint.path)),
    };
    if base.is_empty() {
        "route".to_string()
    } else {
        format!("{base}Route")
    }
}

fn path_placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}/]+)\}").expect("valid path placeholder regex"))
}

fn check_path_template(endpoint: &Endpoint, location: &str, diagnostics: &mut Diagnostics) {
    for captures in path_placeholder_regex().captures_iter(&endpoint.path) {
        let name = &captures[1];
        let declared = endpoint
            .parameters
            .iter()
            .any(|p| p.location == ParameterLocation::Path && p.name == name);
        if !declared {
            diagnostics.warn(
                location.to_string(),
                format!("path placeholder '{{{name}}}' has no matching path parameter"),
            );
        }
    }
}

fn unique_identifier(base: &str, used: &mut HashSet<String>) -> String {
    if used.insert(base.to_string()) {
        return base.to_string();
    }

    let mut idx = 2usize;
    loop {
        let candidate = format!("{base}{idx}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        idx += 1;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{declare_schemas, generate_document, route_identifier};
    use crate::ast::{Document, Endpoint, HttpMethod, Registry};
    use crate::config::GeneratorConfig;
    use crate::diagnostics::Diagnostics;
    use crate::graph::resolve_order;
    use crate::schema::parse_schema_registry;

    fn registry(value: serde_json::Value) -> Registry {
        parse_schema_registry(&value).unwrap()
    }

    #[test]
    fn cyclic_schemas_are_deferred() {
        let registry = registry(json!({
            "Order": { "type": "object", "properties": { "buyer": { "$ref": "#/components/schemas/User" } } },
            "User": { "type": "object", "properties": {
                "recentOrders": { "type": "array", "items": { "$ref": "#/components/schemas/Order" } }
            } }
        }));
        let order = resolve_order(&registry);
        assert_eq!(order, vec!["User", "Order"]);

        let mut diagnostics = Diagnostics::new();
        let declarations =
            declare_schemas(&registry, &order, &GeneratorConfig::default(), &mut diagnostics);
        assert!(declarations[0].lazy);
        assert!(!declarations[1].lazy);
        assert_eq!(diagnostics.entries().len(), 1);
        assert_eq!(diagnostics.entries()[0].location, "User");
    }

    #[test]
    fn recursive_schemas_without_types_are_not_reported() {
        let registry = registry(json!({
            "Tree": { "type": "object", "properties": {
                "children": { "type": "array", "items": { "$ref": "#/components/schemas/Tree" } }
            } }
        }));
        let mut config = GeneratorConfig::default();
        config.types.export = false;
        let mut diagnostics = Diagnostics::new();
        let declarations =
            declare_schemas(&registry, &resolve_order(&registry), &config, &mut diagnostics);
        assert!(declarations[0].lazy);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn self_references_are_deferred() {
        let registry = registry(json!({
            "Tree": { "type": "object", "properties": {
                "children": { "type": "array", "items": { "$ref": "#/components/schemas/Tree" } }
            } }
        }));
        let mut diagnostics = Diagnostics::new();
        let declarations = declare_schemas(
            &registry,
            &resolve_order(&registry),
            &GeneratorConfig::default(),
            &mut diagnostics,
        );
        assert!(declarations[0].lazy);
    }

    #[test]
    fn dangling_references_do_not_defer() {
        let registry = registry(json!({
            "A": { "type": "object", "properties": { "b": { "$ref": "#/components/schemas/Gone" } } }
        }));
        let mut diagnostics = Diagnostics::new();
        let declarations = declare_schemas(
            &registry,
            &resolve_order(&registry),
            &GeneratorConfig::default(),
            &mut diagnostics,
        );
        assert!(!declarations[0].lazy);
        assert!(declarations[0].expression.contains("GoneSchema"));
    }

    #[test]
    fn colliding_identifiers_are_reported() {
        let registry = registry(json!({ "a-b": { "type": "string" }, "a_b": { "type": "string" } }));
        let mut diagnostics = Diagnostics::new();
        declare_schemas(
            &registry,
            &resolve_order(&registry),
            &GeneratorConfig::default(),
            &mut diagnostics,
        );
        assert_eq!(diagnostics.entries().len(), 1);
    }

    #[test]
    fn route_identifiers_prefer_operation_ids() {
        let mut endpoint = Endpoint::new("/users/{id}", HttpMethod::Get);
        assert_eq!(route_identifier(&endpoint), "getUsersIdRoute");
        endpoint.operation_id = Some("fetch-user".to_string());
        assert_eq!(route_identifier(&endpoint), "fetchUserRoute");
    }

    #[test]
    fn duplicate_route_identifiers_get_suffixes() {
        let mut first = Endpoint::new("/a", HttpMethod::Get);
        first.operation_id = Some("same".to_string());
        let mut second = Endpoint::new("/b", HttpMethod::Get);
        second.operation_id = Some("same".to_string());
        let document = Document {
            schemas: Registry::new(),
            endpoints: vec![first, second],
        };
        let module = generate_document(&document, &GeneratorConfig::default());
        assert!(module.code.contains("export const sameRoute = createRoute"));
        assert!(module.code.contains("export const sameRoute2 = createRoute"));
    }

    #[test]
    fn missing_path_parameters_are_reported() {
        let document = Document {
            schemas: Registry::new(),
            endpoints: vec![Endpoint::new("/users/{id}", HttpMethod::Delete)],
        };
        let module = generate_document(&document, &GeneratorConfig::default());
        assert_eq!(module.warnings.len(), 1);
        assert_eq!(module.warnings[0].location, "delete /users/{id}");
    }

    #[test]
    fn schema_only_documents_import_only_z() {
        let document = Document {
            schemas: registry(json!({ "Id": { "type": "string" } })),
            endpoints: Vec::new(),
        };
        let module = generate_document(&document, &GeneratorConfig::default());
        assert!(module.code.contains("import { z } from \"@hono/zod-openapi\";"));
        assert!(module.code.contains("export const IdSchema = z.string().openapi(\"Id\");"));
    }
}
