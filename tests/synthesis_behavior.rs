use serde_json::json;

use openapi_zod::ast::{Kind, Registry, SchemaNode};
use openapi_zod::diagnostics::Diagnostics;
use openapi_zod::graph::resolve_order;
use openapi_zod::naming::NamingConvention;
use openapi_zod::refs::collect_references;
use openapi_zod::schema::{parse_schema_node, parse_schema_registry};
use openapi_zod::synth::{synthesize, SynthContext};

fn synth(value: serde_json::Value) -> (String, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let ctx = SynthContext::new(NamingConvention::TitleCase).at("Root");
    let expr = synthesize(&parse_schema_node(&value), &ctx, &mut diagnostics);
    (expr, diagnostics)
}

#[test]
fn extracts_references_from_nested_composites() {
    let node = parse_schema_node(&json!({
        "type": "object",
        "properties": {
            "owner": { "$ref": "#/components/schemas/User" },
            "pets": { "type": "array", "items": { "oneOf": [
                { "$ref": "#/components/schemas/Cat" },
                { "$ref": "#/components/schemas/Dog" }
            ] } },
            "backup": { "$ref": "#/components/schemas/User" }
        },
        "additionalProperties": { "$ref": "#/components/schemas/Extra" }
    }));
    assert_eq!(collect_references(&node), vec!["User", "Cat", "Dog", "Extra"]);
}

#[test]
fn orders_diamond_dependencies_once() {
    let registry = parse_schema_registry(&json!({
        "Root": { "allOf": [
            { "$ref": "#/components/schemas/Left" },
            { "$ref": "#/components/schemas/Right" }
        ] },
        "Left": { "type": "object", "properties": { "base": { "$ref": "#/components/schemas/Base" } } },
        "Right": { "type": "object", "properties": { "base": { "$ref": "#/components/schemas/Base" } } },
        "Base": { "type": "string" }
    }))
    .unwrap();
    assert_eq!(resolve_order(&registry), vec!["Base", "Left", "Right", "Root"]);
}

#[test]
fn three_way_intersection_folds_left() {
    let (expr, diagnostics) = synth(json!({ "allOf": [
        { "$ref": "#/components/schemas/A" },
        { "$ref": "#/components/schemas/B" },
        { "$ref": "#/components/schemas/C" }
    ] }));
    assert_eq!(expr, "z.intersection(z.intersection(ASchema, BSchema), CSchema)");
    assert!(diagnostics.is_empty());
}

#[test]
fn nullable_reference_via_all_of_marker() {
    let (expr, _) = synth(json!({ "allOf": [
        { "$ref": "#/components/schemas/Address" },
        { "nullable": true }
    ] }));
    assert_eq!(expr, "AddressSchema.nullable()");
}

#[test]
fn unions_of_inline_and_referenced_members() {
    let (expr, _) = synth(json!({ "anyOf": [
        { "type": "string", "format": "date-time" },
        { "$ref": "#/components/schemas/Epoch" }
    ] }));
    assert_eq!(expr, "z.union([z.string().datetime(), EpochSchema])");
}

#[test]
fn defaults_and_examples_follow_the_validator() {
    let (expr, _) = synth(json!({
        "type": "integer",
        "maximum": 100,
        "exclusiveMaximum": true,
        "default": 10,
        "example": 25
    }));
    assert_eq!(expr, "z.number().int().lt(100).default(10).openapi({ example: 25 })");
}

#[test]
fn record_objects_use_value_schema() {
    let (expr, _) = synth(json!({
        "type": "object",
        "additionalProperties": { "type": "integer" }
    }));
    assert_eq!(expr, "z.record(z.string(), z.number().int())");
}

#[test]
fn string_patterns_become_regex_literals() {
    let (expr, _) = synth(json!({ "type": "string", "pattern": "^[a-z]+/[0-9]+$", "maxLength": 32 }));
    assert_eq!(expr, "z.string().regex(/^[a-z]+\\/[0-9]+$/).max(32)");
}

#[test]
fn nested_diagnostics_carry_locations() {
    let (expr, diagnostics) = synth(json!({
        "type": "object",
        "required": ["tags"],
        "properties": { "tags": { "type": "array" } }
    }));
    assert_eq!(expr, "z.object({ tags: z.array(z.any()) })");
    assert_eq!(diagnostics.entries()[0].location, "Root.properties.tags");
}

#[test]
fn registry_nodes_can_be_built_directly() {
    let registry: Registry = [
        ("Id", SchemaNode::of_kind(Kind::String)),
        ("Ref", SchemaNode::reference("Id")),
    ]
    .into_iter()
    .collect();
    assert_eq!(resolve_order(&registry), vec!["Id", "Ref"]);
}
