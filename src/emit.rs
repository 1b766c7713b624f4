//! Text assembly of schema declarations, derived types and route definitions.

use crate::ast::HttpMethod;
use crate::config::GeneratorConfig;
use crate::naming::{quote_string, render_property_name, resolve_identifier, sanitize_name, Role};
use crate::params::{ContentBinding, RequestShape};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One named schema ready to be written.
pub struct SchemaDeclaration {
    pub name: String,
    pub expression: String,
    /// Wrap in `z.lazy` because the expression refers to itself or to a
    /// schema declared later.
    pub lazy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBinding {
    pub status: String,
    pub description: String,
    pub content: Vec<ContentBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One endpoint's `createRoute` call.
pub struct RouteDefinition {
    pub identifier: String,
    pub method: HttpMethod,
    pub path: String,
    pub operation_id: Option<String>,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub request: RequestShape,
    pub responses: Vec<ResponseBinding>,
}

/// Writes every schema (with its optional derived type) and then every route.
///
/// Schema and type visibility follow `config.schema.export` and
/// `config.types.export` independently; an unexported schema stays reachable
/// from an exported type because both live in the same module.
pub fn emit_module(
    schemas: &[SchemaDeclaration],
    routes: &[RouteDefinition],
    config: &GeneratorConfig,
) -> String {
    let mut blocks = Vec::with_capacity(schemas.len() + routes.len());

    for schema in schemas {
        blocks.push(render_schema_declaration(schema, config));
    }
    for route in routes {
        blocks.push(render_route(route));
    }

    let mut out = blocks.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Type annotation carried by `z.lazy` declarations.
pub const LAZY_ANNOTATION: &str = ": z.ZodTypeAny";

/// `const XSchema = ...;` plus, when types are exported, `type X = z.infer<...>;`.
pub fn render_schema_declaration(schema: &SchemaDeclaration, config: &GeneratorConfig) -> String {
    let schema_ident = resolve_identifier(&schema.name, config.schema.name, Role::SchemaVariable);
    // A lazy initializer refers to its own binding, so it needs an explicit
    // annotation to type-check.
    let (annotation, expression) = if schema.lazy {
        (LAZY_ANNOTATION, format!("z.lazy(() => {})", schema.expression))
    } else {
        ("", schema.expression.clone())
    };

    let mut out = format!(
        "{}const {schema_ident}{annotation} = {expression}.openapi({});",
        visibility(config.schema.export),
        quote_string(&sanitize_name(&schema.name))
    );

    if config.types.export {
        let type_ident = resolve_identifier(&schema.name, config.types.name, Role::TypeDeclaration);
        out.push_str(&format!(
            "\n\nexport type {type_ident} = z.infer<typeof {schema_ident}>;"
        ));
    }

    out
}

/// `export const fooRoute = createRoute({ ... });`
pub fn render_route(route: &RouteDefinition) -> String {
    let mut out = format!("export const {} = createRoute({{\n", route.identifier);
    out.push_str(&format!("  method: {},\n", quote_string(route.method.as_str())));
    out.push_str(&format!("  path: {},\n", quote_string(&route.path)));

    if let Some(operation_id) = &route.operation_id {
        out.push_str(&format!("  operationId: {},\n", quote_string(operation_id)));
    }
    if !route.tags.is_empty() {
        let tags: Vec<String> = route.tags.iter().map(|tag| quote_string(tag)).collect();
        out.push_str(&format!("  tags: [{}],\n", tags.join(", ")));
    }
    if let Some(summary) = &route.summary {
        out.push_str(&format!("  summary: {},\n", quote_string(summary)));
    }
    if let Some(description) = &route.description {
        out.push_str(&format!("  description: {},\n", quote_string(description)));
    }

    if !route.request.is_empty() {
        out.push_str("  request: {\n");
        out.push_str(&render_request(&route.request));
        out.push_str("  },\n");
    }

    if route.responses.is_empty() {
        out.push_str("  responses: {},\n");
    } else {
        out.push_str("  responses: {\n");
        for response in &route.responses {
            out.push_str(&format!("    {}: {{\n", render_status_key(&response.status)));
            out.push_str(&format!(
                "      description: {},\n",
                quote_string(&response.description)
            ));
            if !response.content.is_empty() {
                out.push_str(&render_content(&response.content, "      "));
            }
            out.push_str("    },\n");
        }
        out.push_str("  },\n");
    }

    out.push_str("});");
    out
}

fn render_request(request: &RequestShape) -> String {
    let mut out = String::new();
    for group in &request.groups {
        out.push_str(&format!(
            "    {}: {},\n",
            group.location.request_key(),
            group.object_expression()
        ));
    }

    if let Some(body) = &request.body {
        out.push_str("    body: {\n");
        if let Some(description) = &body.description {
            out.push_str(&format!("      description: {},\n", quote_string(description)));
        }
        out.push_str(&format!("      required: {},\n", body.required));
        out.push_str(&render_content(&body.content, "      "));
        out.push_str("    },\n");
    }
    out
}

fn render_content(content: &[ContentBinding], indent: &str) -> String {
    let mut out = format!("{indent}content: {{\n");
    for binding in content {
        out.push_str(&format!(
            "{indent}  {}: {{ schema: {} }},\n",
            quote_string(&binding.content_type),
            binding.expression
        ));
    }
    out.push_str(&format!("{indent}}},\n"));
    out
}

fn render_status_key(status: &str) -> String {
    if !status.is_empty() && status.chars().all(|c| c.is_ascii_digit()) {
        status.to_string()
    } else {
        render_property_name(status)
    }
}

fn visibility(export: bool) -> &'static str {
    if export {
        "export "
    } else {
        ""
    }
}
