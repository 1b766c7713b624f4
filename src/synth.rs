//! Type-directed synthesis of Zod validator expressions from schema nodes.
//!
//! Synthesis never fails. Underspecified nodes degrade to `z.any()` and
//! record a [`Diagnostic`](crate::diagnostics::Diagnostic) in the caller's sink.

use serde_json::{Number as JsonNumber, Value as JsonValue};

use crate::ast::{AdditionalProperties, ExclusiveBound, Kind, ParameterLocation, Registry, SchemaNode};
use crate::diagnostics::Diagnostics;
use crate::naming::{quote_string, render_property_name, resolve_identifier, NamingConvention, Role};

const ANY: &str = "z.any()";

/// `format` keyword to string refinement.
const STRING_FORMATS: &[(&str, &str)] = &[
    ("email", ".email()"),
    ("uri", ".url()"),
    ("url", ".url()"),
    ("uuid", ".uuid()"),
    ("date-time", ".datetime()"),
    ("date", ".date()"),
    ("time", ".time()"),
    ("ipv4", ".ip({ version: \"v4\" })"),
    ("ipv6", ".ip({ version: \"v6\" })"),
    ("cuid", ".cuid()"),
    ("cuid2", ".cuid2()"),
    ("ulid", ".ulid()"),
    ("emoji", ".emoji()"),
    ("base64", ".base64()"),
    ("duration", ".duration()"),
    ("nanoid", ".nanoid()"),
];

/// Base validator for a bare primitive kind.
pub fn base_validator(kind: Kind) -> &'static str {
    match kind {
        Kind::String => "z.string()",
        Kind::Number => "z.number()",
        Kind::Integer => "z.number().int()",
        Kind::Boolean => "z.boolean()",
        Kind::Array => "z.array(z.any())",
        Kind::Object => "z.object({})",
        Kind::Null => "z.null()",
        Kind::Any => ANY,
        Kind::Unknown => "z.unknown()",
    }
}

/// Refinement call for a string `format`, if the format has one.
pub fn string_format_refinement(format: &str) -> Option<&'static str> {
    STRING_FORMATS
        .iter()
        .find(|(name, _)| *name == format)
        .map(|(_, refinement)| *refinement)
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// `param` metadata attached to a parameter's top-level validator.
pub struct ParamAnnotation {
    pub name: String,
    pub location: ParameterLocation,
}

#[derive(Debug, Clone)]
/// Read-only state threaded through one synthesis call tree.
pub struct SynthContext<'a> {
    convention: NamingConvention,
    registry: Option<&'a Registry>,
    param: Option<ParamAnnotation>,
    location: String,
}

impl<'a> SynthContext<'a> {
    pub fn new(convention: NamingConvention) -> Self {
        Self {
            convention,
            registry: None,
            param: None,
            location: "$".to_string(),
        }
    }

    /// Lets reference-aware decisions (such as query coercion) look through `$ref`s.
    pub fn with_registry(mut self, registry: &'a Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the location prefix used in diagnostics.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Annotates the top-level validator as a parameter.
    pub fn with_param(mut self, name: impl Into<String>, location: ParameterLocation) -> Self {
        self.param = Some(ParamAnnotation {
            name: name.into(),
            location,
        });
        self
    }

    /// Context for a nested node: same naming, no parameter metadata.
    pub fn child(&self, segment: &str) -> SynthContext<'a> {
        SynthContext {
            convention: self.convention,
            registry: self.registry,
            param: None,
            location: format!("{}.{segment}", self.location),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Primary discriminant of a node, in dispatch priority order.
pub enum Shape<'a> {
    Enum(&'a [JsonValue]),
    Object,
    String,
    Number { integer: bool },
    Array,
    Union(&'a [SchemaNode]),
    Intersection(&'a [SchemaNode]),
    Not,
    Reference(&'a str),
    Primitive(Kind),
    Undetermined,
}

/// Picks the discriminant [`synthesize`] dispatches on.
///
/// A bare `type: object` next to a composite keyword (no properties, no
/// `additionalProperties`) defers to the composite.
pub fn classify(node: &SchemaNode) -> Shape<'_> {
    if let Some(values) = &node.enum_values {
        return Shape::Enum(values);
    }

    let has_composite = node.one_of.is_some()
        || node.any_of.is_some()
        || node.all_of.is_some()
        || node.not.is_some();
    let has_object_fields = node.properties.is_some() || node.additional_properties.is_some();

    match node.kind {
        Some(Kind::Object) if has_object_fields || !has_composite => return Shape::Object,
        None if has_object_fields => return Shape::Object,
        Some(Kind::String) => return Shape::String,
        Some(Kind::Number) => return Shape::Number { integer: false },
        Some(Kind::Integer) => return Shape::Number { integer: true },
        Some(Kind::Array) => return Shape::Array,
        None if node.items.is_some() && !has_composite => return Shape::Array,
        _ => {}
    }

    if let Some(members) = node.one_of.as_ref().or(node.any_of.as_ref()) {
        return Shape::Union(members);
    }
    if let Some(members) = &node.all_of {
        return Shape::Intersection(members);
    }
    if node.not.is_some() {
        return Shape::Not;
    }
    if let Some(name) = &node.reference {
        return Shape::Reference(name);
    }

    match node.kind {
        Some(kind) => Shape::Primitive(kind),
        None => Shape::Undetermined,
    }
}

/// Translates one schema node into a validator expression.
///
/// Named schemas referenced from `node` are not expanded; they resolve to
/// their schema-variable identifier.
pub fn synthesize(node: &SchemaNode, ctx: &SynthContext<'_>, diagnostics: &mut Diagnostics) -> String {
    let shape = classify(node);
    let mut expr = match shape {
        Shape::Enum(values) => synthesize_enum(values, ctx, diagnostics),
        Shape::Object => synthesize_object(node, ctx, diagnostics),
        Shape::String => synthesize_string(node, ctx, diagnostics),
        Shape::Number { integer } => synthesize_number(node, integer, ctx, diagnostics),
        Shape::Array => synthesize_array(node, ctx, diagnostics),
        Shape::Union(members) => {
            let keyword = if node.one_of.is_some() { "oneOf" } else { "anyOf" };
            synthesize_union(members, keyword, ctx, diagnostics)
        }
        Shape::Intersection(members) => synthesize_intersection(node, members, ctx, diagnostics),
        Shape::Not => "z.unknown()".to_string(),
        Shape::Reference(name) => {
            resolve_identifier(name, ctx.convention, Role::SchemaVariable)
        }
        Shape::Primitive(kind) => base_validator(kind).to_string(),
        Shape::Undetermined => {
            diagnostics.warn(
                ctx.location.clone(),
                "schema has no type, reference or composite keyword; using z.any()",
            );
            ANY.to_string()
        }
    };

    let nullable_handled = matches!(
        shape,
        Shape::Intersection(_) | Shape::Primitive(Kind::Null)
    );
    if node.nullable && !nullable_handled {
        expr.push_str(".nullable()");
    }

    if let Some(default) = &node.default {
        expr.push_str(&format!(".default({})", render_literal(default)));
    }

    if let Some(annotation) = metadata_annotation(node.example.as_ref(), ctx.param.as_ref()) {
        expr.push_str(&annotation);
    }

    expr
}

/// Kind of `node`, looking through references (when the context has a
/// registry) and through composites that synthesize to a single operand.
pub fn resolved_kind(node: &SchemaNode, ctx: &SynthContext<'_>) -> Option<Kind> {
    let mut current = node;
    // Bounded so reference cycles cannot loop.
    for _ in 0..16 {
        if let Some(kind) = current.kind {
            return Some(kind);
        }
        let has_composite =
            current.one_of.is_some() || current.any_of.is_some() || current.all_of.is_some();
        current = if has_composite {
            single_operand(current)?
        } else {
            let name = current.reference.as_ref()?;
            ctx.registry?.get(name)?
        };
    }
    None
}

/// The one member a union or intersection collapses to, if it has exactly one.
///
/// Nullable markers inside `allOf` do not count as operands.
fn single_operand(node: &SchemaNode) -> Option<&SchemaNode> {
    if let Some(members) = node.one_of.as_ref().or(node.any_of.as_ref()) {
        return match members.as_slice() {
            [single] => Some(single),
            _ => None,
        };
    }

    let mut operands = node
        .all_of
        .as_deref()?
        .iter()
        .filter(|member| !member.is_nullable_marker());
    match (operands.next(), operands.next()) {
        (Some(single), None) => Some(single),
        _ => None,
    }
}

fn synthesize_enum(values: &[JsonValue], ctx: &SynthContext<'_>, diagnostics: &mut Diagnostics) -> String {
    match values {
        [] => {
            diagnostics.warn(ctx.location.clone(), "enum has no values; using z.any()");
            ANY.to_string()
        }
        [single] => format!("z.literal({})", render_literal(single)),
        _ if values.iter().all(JsonValue::is_string) => {
            let members: Vec<String> = values.iter().map(render_literal).collect();
            format!("z.enum([{}])", members.join(", "))
        }
        _ => {
            let members: Vec<String> = values
                .iter()
                .map(|value| format!("z.literal({})", render_literal(value)))
                .collect();
            format!("z.union([{}])", members.join(", "))
        }
    }
}

fn synthesize_object(node: &SchemaNode, ctx: &SynthContext<'_>, diagnostics: &mut Diagnostics) -> String {
    let properties = node.properties.as_deref().unwrap_or(&[]);

    if properties.is_empty() {
        if let Some(AdditionalProperties::Schema(values)) = &node.additional_properties {
            let value_expr = synthesize(values, &ctx.child("additionalProperties"), diagnostics);
            return format!("z.record(z.string(), {value_expr})");
        }
    }

    let partial =
        node.properties.is_some() && properties.iter().all(|(name, _)| !node.is_required(name));

    let mut entries = Vec::with_capacity(properties.len());
    for (name, child) in properties {
        let child_ctx = ctx.child(&format!("properties.{name}"));
        let mut entry = synthesize(child, &child_ctx, diagnostics);
        if !partial && !node.is_required(name) {
            entry.push_str(".optional()");
        }
        entries.push(format!("{}: {entry}", render_property_name(name)));
    }

    let mut out = if entries.is_empty() {
        "z.object({})".to_string()
    } else {
        format!("z.object({{ {} }})", entries.join(", "))
    };

    if partial {
        out.push_str(".partial()");
    }

    match &node.additional_properties {
        Some(AdditionalProperties::Allowed(true)) => out.push_str(".passthrough()"),
        Some(AdditionalProperties::Allowed(false)) => out.push_str(".strict()"),
        Some(AdditionalProperties::Schema(values)) => {
            let value_expr = synthesize(values, &ctx.child("additionalProperties"), diagnostics);
            out.push_str(&format!(".catchall({value_expr})"));
        }
        None => {}
    }

    out
}

fn synthesize_string(
    node: &SchemaNode,
    ctx: &SynthContext<'_>,
    diagnostics: &mut Diagnostics,
) -> String {
    let mut out = base_validator(Kind::String).to_string();

    if let Some(pattern) = &node.pattern {
        match regex_literal(pattern) {
            Some(literal) => out.push_str(&format!(".regex({literal})")),
            None => diagnostics.warn(
                ctx.location.clone(),
                "pattern ends in an unescaped backslash and is ignored",
            ),
        }
    }

    out.push_str(&length_refinements(node.min_length, node.max_length));

    if let Some(refinement) = node.format.as_deref().and_then(string_format_refinement) {
        out.push_str(refinement);
    }

    out
}

fn synthesize_number(
    node: &SchemaNode,
    integer: bool,
    ctx: &SynthContext<'_>,
    diagnostics: &mut Diagnostics,
) -> String {
    let kind = if integer { Kind::Integer } else { Kind::Number };
    let mut out = base_validator(kind).to_string();

    if node.pattern.is_some() {
        diagnostics.warn(
            ctx.location.clone(),
            "pattern has no numeric validator equivalent and is ignored",
        );
    }

    if let Some(bound) = numeric_bound(node.minimum.as_ref(), node.exclusive_minimum.as_ref(), "min", "gt") {
        out.push_str(&bound);
    }
    if let Some(bound) = numeric_bound(node.maximum.as_ref(), node.exclusive_maximum.as_ref(), "max", "lt") {
        out.push_str(&bound);
    }

    out
}

/// One refinement per bound; an exclusive bound replaces the inclusive one.
fn numeric_bound(
    inclusive: Option<&JsonNumber>,
    exclusive: Option<&ExclusiveBound>,
    inclusive_method: &str,
    exclusive_method: &str,
) -> Option<String> {
    match (inclusive, exclusive) {
        (_, Some(ExclusiveBound::Value(limit))) => Some(format!(".{exclusive_method}({limit})")),
        (Some(limit), Some(ExclusiveBound::Flag(true))) => {
            Some(format!(".{exclusive_method}({limit})"))
        }
        (Some(limit), _) => Some(format!(".{inclusive_method}({limit})")),
        (None, _) => None,
    }
}

fn synthesize_array(node: &SchemaNode, ctx: &SynthContext<'_>, diagnostics: &mut Diagnostics) -> String {
    let mut out = match &node.items {
        Some(items) => {
            let item_expr = synthesize(items, &ctx.child("items"), diagnostics);
            format!("z.array({item_expr})")
        }
        None => {
            if node.example.is_none() {
                diagnostics.warn(
                    ctx.location.clone(),
                    "array has no items schema; elements are unconstrained",
                );
            }
            base_validator(Kind::Array).to_string()
        }
    };

    out.push_str(&length_refinements(node.min_items, node.max_items));
    out
}

/// `.min(n)` / `.max(n)`, collapsed into `.length(n)` when both are equal.
fn length_refinements(min: Option<u64>, max: Option<u64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) if min == max => format!(".length({min})"),
        _ => {
            let mut out = String::new();
            if let Some(min) = min {
                out.push_str(&format!(".min({min})"));
            }
            if let Some(max) = max {
                out.push_str(&format!(".max({max})"));
            }
            out
        }
    }
}

fn synthesize_union(
    members: &[SchemaNode],
    keyword: &str,
    ctx: &SynthContext<'_>,
    diagnostics: &mut Diagnostics,
) -> String {
    let mut alternatives: Vec<String> = members
        .iter()
        .enumerate()
        .map(|(i, member)| synthesize(member, &ctx.child(&format!("{keyword}[{i}]")), diagnostics))
        .collect();

    match alternatives.len() {
        0 => {
            diagnostics.warn(ctx.location.clone(), format!("{keyword} has no members; using z.any()"));
            ANY.to_string()
        }
        1 => alternatives.remove(0),
        _ => format!("z.union([{}])", alternatives.join(", ")),
    }
}

fn synthesize_intersection(
    node: &SchemaNode,
    members: &[SchemaNode],
    ctx: &SynthContext<'_>,
    diagnostics: &mut Diagnostics,
) -> String {
    if members.is_empty() {
        diagnostics.warn(ctx.location.clone(), "allOf has no members; using z.any()");
    }

    let mut nullable = node.nullable;
    let mut operands = Vec::with_capacity(members.len());
    for (i, member) in members.iter().enumerate() {
        if member.is_nullable_marker() {
            nullable = true;
            continue;
        }
        operands.push(synthesize(member, &ctx.child(&format!("allOf[{i}]")), diagnostics));
    }

    let mut out = operands
        .into_iter()
        .reduce(|acc, next| format!("z.intersection({acc}, {next})"))
        .unwrap_or_else(|| ANY.to_string());

    if nullable {
        out.push_str(".nullable()");
    }
    out
}

fn metadata_annotation(example: Option<&JsonValue>, param: Option<&ParamAnnotation>) -> Option<String> {
    let mut fields = Vec::new();
    if let Some(param) = param {
        fields.push(format!(
            "param: {{ name: {}, in: {} }}",
            quote_string(&param.name),
            quote_string(param.location.as_str())
        ));
    }
    if let Some(example) = example {
        fields.push(format!("example: {}", render_literal(example)));
    }

    if fields.is_empty() {
        None
    } else {
        Some(format!(".openapi({{ {} }})", fields.join(", ")))
    }
}

/// JSON literal text, which is also a valid JavaScript expression.
pub fn render_literal(value: &JsonValue) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// JavaScript regex literal for a JSON Schema `pattern`.
///
/// `None` when the pattern ends in a dangling escape, which would swallow
/// the closing delimiter.
fn regex_literal(pattern: &str) -> Option<String> {
    if pattern.is_empty() {
        return Some("/(?:)/".to_string());
    }

    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('/');
    let mut escaped = false;
    for c in pattern.chars() {
        match c {
            '/' if !escaped => out.push_str("\\/"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
        escaped = c == '\\' && !escaped;
    }
    if escaped {
        return None;
    }
    out.push('/');
    Some(out)
}
