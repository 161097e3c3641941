//! Example synthesis - builds a representative payload from a schema.
//!
//! Generation is total and deterministic: the same node and options
//! always produce the same value, unrecognized shapes degrade to `null`,
//! and recursion is bounded by [`GenerateOptions::max_depth`] so cyclic
//! or very deep schemas terminate without external timeout machinery.

use serde_json::{Map, Value};

use crate::compiler::merge_all_of;
use crate::types::{
    ArrayFacets, GenerateOptions, NodeKind, NumberFacets, ObjectFacets, SchemaNode, StringFacets,
};

/// Placeholder emitted for strings with no recognizable constraints.
const PLACEHOLDER: &str = "string";

/// Filler for property-name characters outside `[A-Za-z0-9_$-]`.
const NAME_FILLER: char = '_';

/// Synthesize an example value for a schema node.
///
/// Never fails; one precedence rule applies per node, evaluated top to
/// bottom: unresolved reference, explicit `example`, `default`, first
/// `enum` value, first `oneOf`/`anyOf` branch, merged `allOf`, then
/// dispatch on the declared type.
pub fn generate(node: &SchemaNode, options: &GenerateOptions) -> Value {
    generate_at(node, options, 0)
}

/// Parse a raw schema fragment and synthesize an example from it.
///
/// Degrades to `null` when the fragment cannot be parsed at all.
pub fn generate_value(schema: &Value, options: &GenerateOptions) -> Value {
    match SchemaNode::from_value(schema) {
        Ok(node) => generate(&node, options),
        Err(_) => Value::Null,
    }
}

fn generate_at(node: &SchemaNode, options: &GenerateOptions, depth: usize) -> Value {
    if let Some(target) = &node.reference {
        // Never resolved, never recursed into.
        return Value::String(format!("[unresolved $ref: {}]", target));
    }
    if let Some(example) = &node.example {
        return example.clone();
    }
    if let Some(default_value) = &node.default_value {
        return default_value.clone();
    }
    if let Some(literals) = &node.enum_values {
        if let Some(first) = literals.first() {
            return first.clone();
        }
    }

    match &node.kind {
        NodeKind::OneOf(branches) | NodeKind::AnyOf(branches) => match branches.first() {
            Some(first) => generate_at(first, options, depth),
            None => Value::Null,
        },
        NodeKind::AllOf(branches) => {
            let merged = merge_all_of(branches);
            generate_object(&merged, options, depth)
        }
        NodeKind::Object(facets) => generate_object(facets, options, depth),
        NodeKind::Array(facets) => generate_array(facets, options, depth),
        NodeKind::String(facets) => generate_string(facets),
        NodeKind::Integer(facets) => numeric_example(facets, true),
        NodeKind::Number(facets) => numeric_example(facets, false),
        NodeKind::Boolean => Value::Bool(true),
        NodeKind::Null => Value::Null,
        NodeKind::Untyped => Value::Null,
    }
}

fn generate_object(facets: &ObjectFacets, options: &GenerateOptions, depth: usize) -> Value {
    // The depth bound replaces further nesting with an empty object and
    // is what keeps self-referential schemas terminating.
    if depth >= options.max_depth {
        return Value::Object(Map::new());
    }

    let mut result = Map::new();
    for (name, prop) in &facets.properties {
        if options.required_only && !facets.required.iter().any(|r| r == name) {
            continue;
        }
        let Some(clean) = sanitize_name(name) else {
            continue;
        };
        result.insert(clean, generate_at(prop, options, depth + 1));
    }
    Value::Object(result)
}

fn generate_array(facets: &ArrayFacets, options: &GenerateOptions, depth: usize) -> Value {
    let Some(items) = &facets.items else {
        return Value::Array(Vec::new());
    };

    // One element for visibility even when unconstrained, repeated up to
    // minItems and capped by maxItems.
    let mut count = facets.min_items.unwrap_or(1).max(1);
    if let Some(max) = facets.max_items {
        count = count.min(max);
    }

    let element = generate_at(items, options, depth + 1);
    Value::Array(vec![element; count])
}

fn generate_string(facets: &StringFacets) -> Value {
    if let Some(pattern) = &facets.pattern {
        if let Some(sample) = pattern_sample(pattern) {
            return Value::String(sample.to_string());
        }
        // Unrecognized pattern: a generic placeholder, not a guaranteed match.
        return Value::String(PLACEHOLDER.to_string());
    }

    if let Some(format) = &facets.format {
        if let Some(sample) = format_sample(format) {
            return Value::String(sample.to_string());
        }
    }

    let mut s = PLACEHOLDER.to_string();
    if let Some(min) = facets.min_length {
        while s.chars().count() < min {
            s.push('x');
        }
    }
    if let Some(max) = facets.max_length {
        s = s.chars().take(max).collect();
    }
    Value::String(s)
}

/// Recognized canonical pattern shapes with a literal that satisfies them.
fn pattern_sample(pattern: &str) -> Option<&'static str> {
    if pattern.contains(r"\d{3}-\d{2}-\d{4}") {
        return Some("123-45-6789");
    }
    if pattern.contains(r"\d{3}-\d{3}-\d{4}") {
        return Some("555-123-4567");
    }
    if pattern.contains(r"[A-Z]{2}\d{6}") {
        return Some("AB123456");
    }
    None
}

/// Canonical literal for a named format. Shared with the diagnostic
/// mapper's fix suggestions.
pub(crate) fn format_sample(format: &str) -> Option<&'static str> {
    match format {
        "email" => Some("user@example.com"),
        "date" => Some("2024-01-15"),
        "date-time" => Some("2024-01-15T10:30:00Z"),
        "uri" | "url" => Some("https://example.com/resource"),
        "uuid" => Some("123e4567-e89b-12d3-a456-426614174000"),
        "ssn" => Some("123-45-6789"),
        "phone" => Some("555-123-4567"),
        "ipv4" => Some("192.168.1.1"),
        "ipv6" => Some("2001:db8::1"),
        _ => None,
    }
}

fn numeric_example(facets: &NumberFacets, integer: bool) -> Value {
    let n = if let Some(min) = facets.minimum {
        min
    } else if let Some(xmin) = facets.exclusive_minimum {
        // The bound itself would fail validation; step just past it.
        if integer {
            xmin.floor() + 1.0
        } else {
            xmin + 1.0
        }
    } else if let Some(max) = facets.maximum {
        max
    } else if let Some(xmax) = facets.exclusive_maximum {
        if integer {
            xmax.ceil() - 1.0
        } else {
            xmax - 1.0
        }
    } else {
        0.0
    };

    if integer && n.fract() == 0.0 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// Replace characters outside `[A-Za-z0-9_$-]` with a filler; `None`
/// drops properties whose name ends up empty.
fn sanitize_name(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    let clean: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '-') {
                c
            } else {
                NAME_FILLER
            }
        })
        .collect();
    Some(clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(fragment: Value) -> SchemaNode {
        SchemaNode::from_value(&fragment).unwrap()
    }

    #[test]
    fn explicit_example_wins() {
        let n = node(json!({ "type": "string", "example": "as-given", "default": "ignored" }));
        assert_eq!(generate(&n, &GenerateOptions::default()), json!("as-given"));
    }

    #[test]
    fn default_beats_enum() {
        let n = node(json!({ "type": "string", "default": "fallback", "enum": ["a", "b"] }));
        assert_eq!(generate(&n, &GenerateOptions::default()), json!("fallback"));
    }

    #[test]
    fn enum_first_value_keeps_type() {
        let n = node(json!({ "type": "integer", "enum": [7, 8, 9] }));
        assert_eq!(generate(&n, &GenerateOptions::default()), json!(7));
    }

    #[test]
    fn reference_produces_stub() {
        let n = node(json!({ "$ref": "#/components/schemas/User" }));
        let value = generate(&n, &GenerateOptions::default());
        let s = value.as_str().unwrap();
        assert!(s.contains("#/components/schemas/User"));
    }

    #[test]
    fn one_of_uses_first_branch() {
        let n = node(json!({
            "oneOf": [
                { "type": "integer", "minimum": 5 },
                { "type": "string" }
            ]
        }));
        assert_eq!(generate(&n, &GenerateOptions::default()), json!(5));
    }

    #[test]
    fn all_of_merges_with_later_override() {
        let n = node(json!({
            "allOf": [
                {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": { "type": "string" },
                        "kind": { "type": "string" }
                    }
                },
                {
                    "type": "object",
                    "properties": { "kind": { "type": "integer", "minimum": 2 } }
                }
            ]
        }));
        let value = generate(&n, &GenerateOptions::default());
        assert_eq!(value["name"], json!(PLACEHOLDER));
        assert_eq!(value["kind"], json!(2));
    }

    #[test]
    fn object_respects_declaration_order() {
        let n = node(json!({
            "type": "object",
            "properties": {
                "zeta": { "type": "boolean" },
                "alpha": { "type": "boolean" }
            }
        }));
        let value = generate(&n, &GenerateOptions::default());
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn required_only_skips_optional() {
        let n = node(json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": { "type": "string" },
                "email": { "type": "string" }
            }
        }));
        let required = generate(&n, &GenerateOptions::new().required_only(true));
        let full = generate(&n, &GenerateOptions::default());

        let required_keys: Vec<&String> = required.as_object().unwrap().keys().collect();
        assert_eq!(required_keys, vec!["name"]);
        assert!(full.as_object().unwrap().contains_key("name"));
        assert!(full.as_object().unwrap().contains_key("email"));
    }

    #[test]
    fn required_name_without_property_is_skipped() {
        let n = node(json!({
            "type": "object",
            "required": ["ghost", "name"],
            "properties": { "name": { "type": "string" } }
        }));
        let value = generate(&n, &GenerateOptions::new().required_only(true));
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["name"]);
    }

    #[test]
    fn property_names_are_sanitized() {
        let n = node(json!({
            "type": "object",
            "properties": {
                "weird name!": { "type": "boolean" },
                "ok_name-1$": { "type": "boolean" }
            }
        }));
        let value = generate(&n, &GenerateOptions::default());
        let map = value.as_object().unwrap();
        assert!(map.contains_key("weird_name_"));
        assert!(map.contains_key("ok_name-1$"));
    }

    #[test]
    fn depth_bound_terminates_deep_schema() {
        // Build a 50-level nested schema; depth 3 must stop early.
        let mut fragment = json!({ "type": "string" });
        for _ in 0..50 {
            fragment = json!({
                "type": "object",
                "properties": { "child": fragment }
            });
        }
        let n = node(fragment);
        let value = generate(&n, &GenerateOptions::new().max_depth(3));
        // Depth 0..2 descend normally; depth 3 stops with an empty object.
        assert_eq!(value["child"]["child"]["child"], json!({}));
    }

    #[test]
    fn array_repeats_to_min_items() {
        let n = node(json!({
            "type": "array",
            "items": { "type": "integer" },
            "minItems": 3
        }));
        assert_eq!(generate(&n, &GenerateOptions::default()), json!([0, 0, 0]));
    }

    #[test]
    fn array_without_items_is_empty() {
        let n = node(json!({ "type": "array" }));
        assert_eq!(generate(&n, &GenerateOptions::default()), json!([]));
    }

    #[test]
    fn array_unconstrained_has_one_element() {
        let n = node(json!({ "type": "array", "items": { "type": "boolean" } }));
        assert_eq!(generate(&n, &GenerateOptions::default()), json!([true]));
    }

    #[test]
    fn recognized_pattern_shapes() {
        for (pattern, expected) in [
            (r"^\d{3}-\d{2}-\d{4}$", "123-45-6789"),
            (r"^\d{3}-\d{3}-\d{4}$", "555-123-4567"),
            (r"^[A-Z]{2}\d{6}$", "AB123456"),
        ] {
            let n = node(json!({ "type": "string", "pattern": pattern }));
            assert_eq!(generate(&n, &GenerateOptions::default()), json!(expected));
        }
    }

    #[test]
    fn unrecognized_pattern_falls_back() {
        let n = node(json!({ "type": "string", "pattern": "^[a-z]{40}$" }));
        assert_eq!(generate(&n, &GenerateOptions::default()), json!(PLACEHOLDER));
    }

    #[test]
    fn format_samples() {
        for (format, expected) in [
            ("email", "user@example.com"),
            ("date", "2024-01-15"),
            ("date-time", "2024-01-15T10:30:00Z"),
            ("uri", "https://example.com/resource"),
            ("uuid", "123e4567-e89b-12d3-a456-426614174000"),
            ("ssn", "123-45-6789"),
            ("phone", "555-123-4567"),
            ("ipv4", "192.168.1.1"),
            ("ipv6", "2001:db8::1"),
        ] {
            let n = node(json!({ "type": "string", "format": format }));
            assert_eq!(generate(&n, &GenerateOptions::default()), json!(expected));
        }
    }

    #[test]
    fn placeholder_respects_length_bounds() {
        let n = node(json!({ "type": "string", "minLength": 10 }));
        let value = generate(&n, &GenerateOptions::default());
        assert!(value.as_str().unwrap().chars().count() >= 10);

        let n = node(json!({ "type": "string", "maxLength": 3 }));
        let value = generate(&n, &GenerateOptions::default());
        assert!(value.as_str().unwrap().chars().count() <= 3);
    }

    #[test]
    fn integer_minimum_is_returned_exactly() {
        let n = node(json!({ "type": "integer", "minimum": 18 }));
        assert_eq!(generate(&n, &GenerateOptions::default()), json!(18));
    }

    #[test]
    fn minimum_takes_precedence_over_maximum() {
        let n = node(json!({ "type": "number", "minimum": 1.5, "maximum": 9.5 }));
        assert_eq!(generate(&n, &GenerateOptions::default()), json!(1.5));
    }

    #[test]
    fn unconstrained_numbers() {
        let n = node(json!({ "type": "integer" }));
        assert_eq!(generate(&n, &GenerateOptions::default()), json!(0));

        let n = node(json!({ "type": "number" }));
        assert_eq!(generate(&n, &GenerateOptions::default()), json!(0.0));
    }

    #[test]
    fn exclusive_bounds_step_inside() {
        let n = node(json!({ "type": "integer", "exclusiveMinimum": 0 }));
        assert_eq!(generate(&n, &GenerateOptions::default()), json!(1));

        let n = node(json!({ "type": "integer", "exclusiveMaximum": 10 }));
        assert_eq!(generate(&n, &GenerateOptions::default()), json!(9));
    }

    #[test]
    fn boolean_and_null_and_untyped() {
        assert_eq!(
            generate(&node(json!({ "type": "boolean" })), &GenerateOptions::default()),
            json!(true)
        );
        assert_eq!(
            generate(&node(json!({ "type": "null" })), &GenerateOptions::default()),
            json!(null)
        );
        assert_eq!(
            generate(&node(json!({ "description": "???" })), &GenerateOptions::default()),
            json!(null)
        );
    }

    #[test]
    fn generate_value_degrades_on_unparseable_fragment() {
        let value = generate_value(&json!({ "type": 42 }), &GenerateOptions::default());
        assert_eq!(value, json!(null));
    }

    #[test]
    fn generation_is_deterministic() {
        let fragment = json!({
            "type": "object",
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "tags": { "type": "array", "items": { "type": "string" }, "minItems": 2 }
            }
        });
        let n = node(fragment);
        let first = generate(&n, &GenerateOptions::default());
        let second = generate(&n, &GenerateOptions::default());
        assert_eq!(first, second);
    }
}
