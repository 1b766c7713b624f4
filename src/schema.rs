//! Conversion of raw JSON Schema / OpenAPI schema objects into [`SchemaNode`]s.
//!
//! Supported keyword subset:
//! - Common: `type` (string or 3.1 type array), `nullable`, `enum`, `const`,
//!   `default`, `example`, `examples`, `description`
//! - Composite: `$ref`, `allOf`, `oneOf`, `anyOf`, `not`
//! - Numeric: `minimum`, `maximum`, `exclusiveMinimum`, `exclusiveMaximum`
//! - String: `minLength`, `maxLength`, `pattern`, `format`
//! - Object: `properties`, `required`, `additionalProperties`
//! - Array: `items`, `minItems`, `maxItems`
//!
//! Conversion never fails: fields with an unexpected JSON shape are dropped.

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::ast::{AdditionalProperties, ExclusiveBound, Kind, Registry, SchemaNode};
use crate::error::CodegenError;

/// Parses a `components.schemas`-style mapping into a [`Registry`].
///
/// The mapping itself must be an object; individual schemas are converted
/// leniently with [`parse_schema_node`].
pub fn parse_schema_registry(value: &JsonValue) -> Result<Registry, CodegenError> {
    let map = value.as_object().ok_or_else(|| {
        CodegenError::DocumentError("schema registry must be a mapping/object".to_string())
    })?;

    Ok(map
        .iter()
        .map(|(name, schema)| (name.clone(), parse_schema_node(schema)))
        .collect())
}

/// Converts one raw schema object into a [`SchemaNode`].
pub fn parse_schema_node(value: &JsonValue) -> SchemaNode {
    match value {
        JsonValue::Bool(true) => SchemaNode::of_kind(Kind::Any),
        JsonValue::Bool(false) => SchemaNode {
            not: Some(Box::new(SchemaNode::of_kind(Kind::Any))),
            ..SchemaNode::default()
        },
        JsonValue::Object(map) => parse_schema_object(map),
        _ => SchemaNode::default(),
    }
}

fn parse_schema_object(map: &JsonMap<String, JsonValue>) -> SchemaNode {
    let mut node = SchemaNode {
        reference: map
            .get("$ref")
            .and_then(JsonValue::as_str)
            .map(reference_name),
        all_of: parse_node_list(map.get("allOf")),
        one_of: parse_node_list(map.get("oneOf")),
        any_of: parse_node_list(map.get("anyOf")),
        not: map.get("not").map(|v| Box::new(parse_schema_node(v))),
        properties: map.get("properties").and_then(JsonValue::as_object).map(|props| {
            props
                .iter()
                .map(|(name, schema)| (name.clone(), parse_schema_node(schema)))
                .collect()
        }),
        required: map
            .get("required")
            .and_then(JsonValue::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(JsonValue::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        items: map.get("items").map(|v| Box::new(parse_schema_node(v))),
        enum_values: map
            .get("enum")
            .and_then(JsonValue::as_array)
            .cloned()
            .or_else(|| map.get("const").map(|v| vec![v.clone()])),
        pattern: string_field(map, "pattern"),
        min_length: map.get("minLength").and_then(JsonValue::as_u64),
        max_length: map.get("maxLength").and_then(JsonValue::as_u64),
        minimum: number_field(map, "minimum"),
        maximum: number_field(map, "maximum"),
        exclusive_minimum: exclusive_bound(map.get("exclusiveMinimum")),
        exclusive_maximum: exclusive_bound(map.get("exclusiveMaximum")),
        min_items: map.get("minItems").and_then(JsonValue::as_u64),
        max_items: map.get("maxItems").and_then(JsonValue::as_u64),
        format: string_field(map, "format"),
        nullable: map
            .get("nullable")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false),
        default: map.get("default").cloned(),
        example: map.get("example").cloned().or_else(|| {
            map.get("examples")
                .and_then(JsonValue::as_array)
                .and_then(|examples| examples.first())
                .cloned()
        }),
        additional_properties: map.get("additionalProperties").and_then(|v| match v {
            JsonValue::Bool(allowed) => Some(AdditionalProperties::Allowed(*allowed)),
            JsonValue::Object(_) => {
                Some(AdditionalProperties::Schema(Box::new(parse_schema_node(v))))
            }
            _ => None,
        }),
        description: string_field(map, "description"),
        ..SchemaNode::default()
    };

    apply_type_keyword(&mut node, map.get("type"));
    node
}

/// Handles both `type: "string"` and the 3.1 form `type: ["string", "null"]`.
fn apply_type_keyword(node: &mut SchemaNode, value: Option<&JsonValue>) {
    match value {
        Some(JsonValue::String(keyword)) => node.kind = Kind::from_keyword(keyword),
        Some(JsonValue::Array(keywords)) => {
            let mut kinds = Vec::new();
            for keyword in keywords.iter().filter_map(JsonValue::as_str) {
                match Kind::from_keyword(keyword) {
                    Some(Kind::Null) => node.nullable = true,
                    Some(kind) => kinds.push(kind),
                    None => {}
                }
            }
            match kinds.as_slice() {
                [] if node.nullable => node.kind = Some(Kind::Null),
                [] => {}
                [single] => node.kind = Some(*single),
                _ if node.any_of.is_none() && node.one_of.is_none() => {
                    node.any_of = Some(kinds.into_iter().map(SchemaNode::of_kind).collect());
                }
                _ => {}
            }
        }
        _ => {}
    }
}

/// Strips pointer syntax from a `$ref`: `#/components/schemas/User` -> `User`.
pub fn reference_name(raw: &str) -> String {
    let last = raw.rsplit('/').next().unwrap_or(raw);
    last.replace("~1", "/").replace("~0", "~")
}

fn parse_node_list(value: Option<&JsonValue>) -> Option<Vec<SchemaNode>> {
    value
        .and_then(JsonValue::as_array)
        .map(|members| members.iter().map(parse_schema_node).collect())
}

fn string_field(map: &JsonMap<String, JsonValue>, key: &str) -> Option<String> {
    map.get(key).and_then(JsonValue::as_str).map(str::to_string)
}

fn number_field(map: &JsonMap<String, JsonValue>, key: &str) -> Option<serde_json::Number> {
    match map.get(key) {
        Some(JsonValue::Number(n)) => Some(n.clone()),
        _ => None,
    }
}

fn exclusive_bound(value: Option<&JsonValue>) -> Option<ExclusiveBound> {
    match value {
        Some(JsonValue::Bool(flag)) => Some(ExclusiveBound::Flag(*flag)),
        Some(JsonValue::Number(n)) => Some(ExclusiveBound::Value(n.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{parse_schema_node, parse_schema_registry, reference_name};
    use crate::ast::{AdditionalProperties, ExclusiveBound, Kind};

    #[test]
    fn strips_reference_paths() {
        assert_eq!(reference_name("#/components/schemas/User"), "User");
        assert_eq!(reference_name("User"), "User");
        assert_eq!(reference_name("#/definitions/a~1b"), "a/b");
    }

    #[test]
    fn keeps_property_declaration_order() {
        let node = parse_schema_node(&json!({
            "type": "object",
            "properties": { "zeta": { "type": "string" }, "alpha": { "type": "integer" } },
            "required": ["alpha"]
        }));
        let names: Vec<&str> = node
            .properties
            .as_ref()
            .unwrap()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert!(node.is_required("alpha"));
        assert!(!node.is_required("zeta"));
    }

    #[test]
    fn reads_type_arrays_as_nullable_kinds() {
        let node = parse_schema_node(&json!({ "type": ["string", "null"] }));
        assert_eq!(node.kind, Some(Kind::String));
        assert!(node.nullable);

        let multi = parse_schema_node(&json!({ "type": ["string", "integer"] }));
        assert_eq!(multi.kind, None);
        assert_eq!(multi.any_of.unwrap().len(), 2);
    }

    #[test]
    fn reads_both_exclusive_bound_styles() {
        let legacy = parse_schema_node(&json!({ "minimum": 1, "exclusiveMinimum": true }));
        assert_eq!(legacy.exclusive_minimum, Some(ExclusiveBound::Flag(true)));

        let modern = parse_schema_node(&json!({ "exclusiveMaximum": 10 }));
        assert!(matches!(
            modern.exclusive_maximum,
            Some(ExclusiveBound::Value(ref n)) if n.as_u64() == Some(10)
        ));
    }

    #[test]
    fn drops_malformed_fields_instead_of_failing() {
        let node = parse_schema_node(&json!({
            "type": 42,
            "required": "id",
            "minLength": "three",
            "additionalProperties": { "type": "string" }
        }));
        assert_eq!(node.kind, None);
        assert!(node.required.is_empty());
        assert_eq!(node.min_length, None);
        assert!(matches!(
            node.additional_properties,
            Some(AdditionalProperties::Schema(_))
        ));
    }

    #[test]
    fn registry_requires_a_mapping() {
        assert!(parse_schema_registry(&json!([])).is_err());
        let registry = parse_schema_registry(&json!({ "B": {}, "A": {} })).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["B", "A"]);
    }
}
