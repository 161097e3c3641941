//! Core types: the schema node model and generation options.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::CompileError;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Schema type names accepted in a `type` keyword.
pub const VALID_TYPES: &[&str] = &[
    "null", "boolean", "integer", "number", "string", "array", "object",
];

/// An immutable, recursively nested description of an expected value shape.
///
/// Parsed once from a dynamically-shaped JSON fragment via
/// [`SchemaNode::from_value`], then consumed by the compiler and the
/// example generator. Attributes that apply regardless of type tag live
/// here; type-specific constraints live in the [`NodeKind`] variants.
#[derive(Debug, Clone, Default)]
pub struct SchemaNode {
    /// The type tag (or combinator) this node was recognized as.
    pub kind: NodeKind,
    /// Human-readable description, surfaced in warnings.
    pub description: Option<String>,
    /// Explicit example value, returned verbatim by generation.
    pub example: Option<Value>,
    /// Default value, returned by generation when no example exists.
    pub default_value: Option<Value>,
    /// Ordered literal values the payload must equal one of.
    pub enum_values: Option<Vec<Value>>,
    /// Unresolved `$ref` target. The engine never dereferences it.
    pub reference: Option<String>,
    /// Unrecognized keys, preserved opaquely and never interpreted.
    pub extra: serde_json::Map<String, Value>,
}

/// Tagged union over the recognized type set plus the three combinators.
#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    Null,
    Boolean,
    Integer(NumberFacets),
    Number(NumberFacets),
    String(StringFacets),
    Array(ArrayFacets),
    Object(ObjectFacets),
    AllOf(Vec<SchemaNode>),
    AnyOf(Vec<SchemaNode>),
    OneOf(Vec<SchemaNode>),
    /// No recognized type, properties or items.
    #[default]
    Untyped,
}

/// Constraints on string values. All present constraints apply conjunctively.
#[derive(Debug, Clone, Default)]
pub struct StringFacets {
    pub pattern: Option<String>,
    pub format: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

/// Constraints on numeric values.
///
/// Inclusive and exclusive bounds may both be present on the same node;
/// every present bound must hold.
#[derive(Debug, Clone, Default)]
pub struct NumberFacets {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub multiple_of: Option<f64>,
}

/// Constraints on array values.
#[derive(Debug, Clone, Default)]
pub struct ArrayFacets {
    pub items: Option<Box<SchemaNode>>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

/// Constraints on object values.
#[derive(Debug, Clone, Default)]
pub struct ObjectFacets {
    /// Declared properties. Insertion order is significant for generation.
    pub properties: IndexMap<String, SchemaNode>,
    /// Property names that must be present. Names without a matching
    /// `properties` entry are tolerated and skipped during generation.
    pub required: Vec<String>,
    pub additional: AdditionalProperties,
}

/// The `additionalProperties` keyword.
#[derive(Debug, Clone, Default)]
pub enum AdditionalProperties {
    /// Keyword absent: untyped extras are permitted.
    #[default]
    Unset,
    /// `true` permits extras, `false` rejects them.
    Bool(bool),
    /// Extras are permitted; their shape is not deep-validated.
    Schema(Box<SchemaNode>),
}

impl SchemaNode {
    /// Parse a dynamically-shaped schema fragment into a node.
    ///
    /// Tolerant by design: unrecognized keys are preserved opaquely, and
    /// wrongly-typed constraint values are ignored rather than rejected.
    /// Fails only on shapes with no representable interpretation: a
    /// non-object fragment, a non-string `type`, an unknown type name, a
    /// non-object `properties`, a non-array combinator list or `enum`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] for the unrepresentable shapes above.
    pub fn from_value(value: &Value) -> Result<SchemaNode, CompileError> {
        parse_node(value, "")
    }

    /// True if this node carries an unresolved `$ref` marker.
    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }
}

/// Options for example generation. Immutable during a generation call.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Generate only properties listed in `required`.
    pub required_only: bool,
    /// Nesting level at which object recursion stops. This bound is what
    /// keeps generation terminating on cyclic or very deep schemas.
    pub max_depth: usize,
}

/// Depth limit that normal schemas never reach.
pub const DEFAULT_MAX_DEPTH: usize = 16;

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            required_only: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl GenerateOptions {
    /// Create options with defaults (all properties, depth 16).
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate only required properties.
    pub fn required_only(mut self, required_only: bool) -> Self {
        self.required_only = required_only;
        self
    }

    /// Override the recursion depth bound.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

// --- Parsing internals ---

/// Keys interpreted by the parser; everything else lands in `extra`.
const KNOWN_KEYS: &[&str] = &[
    "type",
    "description",
    "example",
    "default",
    "enum",
    "$ref",
    "pattern",
    "format",
    "minLength",
    "maxLength",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "items",
    "minItems",
    "maxItems",
    "properties",
    "required",
    "additionalProperties",
    "allOf",
    "anyOf",
    "oneOf",
];

fn parse_node(value: &Value, path: &str) -> Result<SchemaNode, CompileError> {
    let Some(map) = value.as_object() else {
        return Err(CompileError::MalformedNode {
            path: display_path(path),
            expected: "object".to_string(),
            actual: json_type_name(value).to_string(),
        });
    };

    let mut node = SchemaNode {
        description: map
            .get("description")
            .and_then(Value::as_str)
            .map(String::from),
        example: map.get("example").cloned(),
        default_value: map.get("default").cloned(),
        reference: map.get("$ref").and_then(Value::as_str).map(String::from),
        ..SchemaNode::default()
    };

    if let Some(enum_value) = map.get("enum") {
        let Some(literals) = enum_value.as_array() else {
            return Err(CompileError::MalformedNode {
                path: format!("{}/enum", path),
                expected: "array".to_string(),
                actual: json_type_name(enum_value).to_string(),
            });
        };
        node.enum_values = Some(literals.clone());
    }

    for (key, val) in map {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            node.extra.insert(key.clone(), val.clone());
        }
    }

    node.kind = parse_kind(map, path)?;
    Ok(node)
}

fn parse_kind(
    map: &serde_json::Map<String, Value>,
    path: &str,
) -> Result<NodeKind, CompileError> {
    // Combinators take precedence over a (usually absent) type tag.
    for (key, make) in [
        ("allOf", NodeKind::AllOf as fn(Vec<SchemaNode>) -> NodeKind),
        ("anyOf", NodeKind::AnyOf as fn(Vec<SchemaNode>) -> NodeKind),
        ("oneOf", NodeKind::OneOf as fn(Vec<SchemaNode>) -> NodeKind),
    ] {
        if let Some(branches) = map.get(key) {
            let Some(list) = branches.as_array() else {
                return Err(CompileError::MalformedNode {
                    path: format!("{}/{}", path, key),
                    expected: "array".to_string(),
                    actual: json_type_name(branches).to_string(),
                });
            };
            let mut nodes = Vec::with_capacity(list.len());
            for (i, branch) in list.iter().enumerate() {
                nodes.push(parse_node(branch, &format!("{}/{}/{}", path, key, i))?);
            }
            return Ok(make(nodes));
        }
    }

    let type_name = match map.get("type") {
        None => {
            // Infer object/array from structure when the tag is missing.
            if map.contains_key("properties") {
                "object"
            } else if map.contains_key("items") {
                "array"
            } else {
                return Ok(NodeKind::Untyped);
            }
        }
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return Err(CompileError::MalformedNode {
                path: format!("{}/type", path),
                expected: "string".to_string(),
                actual: json_type_name(other).to_string(),
            });
        }
    };

    match type_name {
        "null" => Ok(NodeKind::Null),
        "boolean" => Ok(NodeKind::Boolean),
        "integer" => Ok(NodeKind::Integer(parse_number_facets(map))),
        "number" => Ok(NodeKind::Number(parse_number_facets(map))),
        "string" => Ok(NodeKind::String(parse_string_facets(map))),
        "array" => Ok(NodeKind::Array(parse_array_facets(map, path)?)),
        "object" => Ok(NodeKind::Object(parse_object_facets(map, path)?)),
        other => Err(CompileError::UnknownType {
            name: other.to_string(),
        }),
    }
}

fn parse_string_facets(map: &serde_json::Map<String, Value>) -> StringFacets {
    StringFacets {
        pattern: map.get("pattern").and_then(Value::as_str).map(String::from),
        format: map.get("format").and_then(Value::as_str).map(String::from),
        min_length: get_usize(map, "minLength"),
        max_length: get_usize(map, "maxLength"),
    }
}

fn parse_number_facets(map: &serde_json::Map<String, Value>) -> NumberFacets {
    NumberFacets {
        minimum: get_f64(map, "minimum"),
        maximum: get_f64(map, "maximum"),
        exclusive_minimum: get_f64(map, "exclusiveMinimum"),
        exclusive_maximum: get_f64(map, "exclusiveMaximum"),
        multiple_of: get_f64(map, "multipleOf"),
    }
}

fn parse_array_facets(
    map: &serde_json::Map<String, Value>,
    path: &str,
) -> Result<ArrayFacets, CompileError> {
    let items = match map.get("items") {
        Some(items) => Some(Box::new(parse_node(items, &format!("{}/items", path))?)),
        None => None,
    };
    Ok(ArrayFacets {
        items,
        min_items: get_usize(map, "minItems"),
        max_items: get_usize(map, "maxItems"),
    })
}

fn parse_object_facets(
    map: &serde_json::Map<String, Value>,
    path: &str,
) -> Result<ObjectFacets, CompileError> {
    let mut properties = IndexMap::new();
    if let Some(props) = map.get("properties") {
        let Some(props) = props.as_object() else {
            return Err(CompileError::MalformedNode {
                path: format!("{}/properties", path),
                expected: "object".to_string(),
                actual: json_type_name(props).to_string(),
            });
        };
        for (name, prop) in props {
            let child = parse_node(prop, &format!("{}/properties/{}", path, name))?;
            properties.insert(name.clone(), child);
        }
    }

    let required = map
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    let additional = match map.get("additionalProperties") {
        None => AdditionalProperties::Unset,
        Some(Value::Bool(b)) => AdditionalProperties::Bool(*b),
        Some(schema @ Value::Object(_)) => AdditionalProperties::Schema(Box::new(parse_node(
            schema,
            &format!("{}/additionalProperties", path),
        )?)),
        // Anything else is ignored, same as other wrongly-typed facets.
        Some(_) => AdditionalProperties::Unset,
    };

    Ok(ObjectFacets {
        properties,
        required,
        additional,
    })
}

fn get_f64(map: &serde_json::Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

fn get_usize(map: &serde_json::Map<String, Value>, key: &str) -> Option<usize> {
    map.get(key).and_then(Value::as_u64).map(|n| n as usize)
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
