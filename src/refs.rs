//! Collection of named-schema references inside a schema tree.

use crate::ast::{AdditionalProperties, SchemaNode};

/// Returns every schema name `node` references, deduplicated, in first-seen order.
///
/// Walks properties, items, schema-valued `additionalProperties` and the
/// composite members (`allOf`, `oneOf`, `anyOf`, `not`), since synthesis
/// resolves references in all of them.
pub fn collect_references(node: &SchemaNode) -> Vec<String> {
    let mut out = Vec::new();
    collect_into(node, &mut out);
    out
}

fn collect_into(node: &SchemaNode, out: &mut Vec<String>) {
    if let Some(name) = &node.reference {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }

    if let Some(properties) = &node.properties {
        for (_, child) in properties {
            collect_into(child, out);
        }
    }

    if let Some(items) = &node.items {
        collect_into(items, out);
    }

    if let Some(AdditionalProperties::Schema(values)) = &node.additional_properties {
        collect_into(values, out);
    }

    for members in [&node.all_of, &node.one_of, &node.any_of].into_iter().flatten() {
        for member in members {
            collect_into(member, out);
        }
    }

    if let Some(not) = &node.not {
        collect_into(not, out);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::collect_references;
    use crate::schema::parse_schema_node;

    #[test]
    fn collects_nested_property_and_item_references() {
        let node = parse_schema_node(&json!({
            "type": "object",
            "properties": {
                "owner": { "$ref": "#/components/schemas/User" },
                "members": { "type": "array", "items": { "$ref": "#/components/schemas/User" } },
                "tags": { "type": "array", "items": { "$ref": "#/components/schemas/Tag" } }
            }
        }));
        assert_eq!(collect_references(&node), vec!["User", "Tag"]);
    }

    #[test]
    fn recurses_into_composite_members() {
        let node = parse_schema_node(&json!({
            "allOf": [{ "$ref": "#/components/schemas/Base" }],
            "oneOf": [{ "$ref": "#/components/schemas/Cat" }, { "$ref": "#/components/schemas/Dog" }],
            "not": { "$ref": "#/components/schemas/Fish" },
            "additionalProperties": { "$ref": "#/components/schemas/Meta" }
        }));
        assert_eq!(
            collect_references(&node),
            vec!["Meta", "Base", "Cat", "Dog", "Fish"]
        );
    }

    #[test]
    fn empty_node_has_no_references() {
        assert!(collect_references(&parse_schema_node(&json!({}))).is_empty());
        assert!(collect_references(&parse_schema_node(&json!("junk"))).is_empty());
    }
}
