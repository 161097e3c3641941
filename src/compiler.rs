//! Schema compilation - turns a schema node into an executable validator.
//!
//! A compiled [`Validator`] is side-effect-free and reusable across many
//! payloads; callers may cache one per schema and evaluate it from
//! concurrent threads. The raw issues it produces are crate-internal and
//! only reach callers after the diagnostic mapper has classified them.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::CompileError;
use crate::types::{
    json_type_name, AdditionalProperties, NodeKind, NumberFacets, ObjectFacets, SchemaNode,
};

/// Absolute tolerance for `multipleOf` under floating-point division.
const MULTIPLE_OF_EPSILON: f64 = 1e-9;

/// Compile a schema node into a reusable validator.
///
/// Every recognized shape compiles, including always-true (untyped,
/// unresolved reference) and always-false ones. Compilation fails only
/// when a constraint cannot be represented, e.g. an invalid regular
/// expression in `pattern`.
///
/// # Errors
///
/// Returns [`CompileError`] for unrepresentable constraints.
pub fn compile(node: &SchemaNode) -> Result<Validator, CompileError> {
    Ok(Validator {
        root: compile_node(node)?,
    })
}

/// An executable validator compiled from a schema node.
///
/// Owns no external state and never mutates shared data during
/// evaluation, so it is safe to share across threads.
#[derive(Debug)]
pub struct Validator {
    root: Check,
}

impl Validator {
    /// True when the payload satisfies the schema.
    pub fn is_valid(&self, payload: &Value) -> bool {
        self.check(payload).is_empty()
    }

    /// Run the validator, collecting every raw issue.
    pub(crate) fn check(&self, payload: &Value) -> Vec<Issue> {
        let mut issues = Vec::new();
        self.root.run(payload, "", &mut issues);
        issues
    }
}

/// A raw validation issue. Crate-internal: the diagnostic mapper owns the
/// caller-facing shape.
#[derive(Debug, Clone)]
pub(crate) struct Issue {
    pub kind: IssueKind,
    /// JSON Pointer to the offending value; empty at the payload root.
    pub path: String,
    pub message: String,
    pub expected: Option<Value>,
    pub received: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IssueKind {
    Required,
    Type,
    Format,
    Pattern,
    MinLength,
    MaxLength,
    Minimum,
    Maximum,
    Enum,
    /// A property the schema does not allow.
    Unexpected,
    /// No combinator branch accepted the value.
    NoMatch,
}

// --- Compiled check tree ---

#[derive(Debug)]
struct Check {
    /// Literal values the payload must equal one of, checked before the
    /// shape regardless of type tag.
    enum_values: Option<Vec<Value>>,
    shape: Shape,
}

#[derive(Debug)]
enum Shape {
    /// Accepts anything: untyped nodes and unresolved references.
    Any,
    Null,
    Boolean,
    Number {
        facets: NumberFacets,
        integer: bool,
    },
    String(StringCheck),
    Array {
        items: Option<Box<Check>>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
    Object(ObjectCheck),
    AnyOf(Vec<Check>),
}

#[derive(Debug)]
struct StringCheck {
    pattern: Option<(String, Regex)>,
    format: Option<String>,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

#[derive(Debug)]
struct ObjectCheck {
    properties: IndexMap<String, Check>,
    required: Vec<String>,
    reject_extras: bool,
}

fn compile_node(node: &SchemaNode) -> Result<Check, CompileError> {
    // An unresolved reference degrades to accept-everything; the engine
    // never dereferences it.
    let shape = if node.is_reference() {
        Shape::Any
    } else {
        compile_shape(&node.kind)?
    };

    Ok(Check {
        enum_values: node.enum_values.clone(),
        shape,
    })
}

fn compile_shape(kind: &NodeKind) -> Result<Shape, CompileError> {
    match kind {
        NodeKind::Null => Ok(Shape::Null),
        NodeKind::Boolean => Ok(Shape::Boolean),
        NodeKind::Integer(facets) => Ok(Shape::Number {
            facets: facets.clone(),
            integer: true,
        }),
        NodeKind::Number(facets) => Ok(Shape::Number {
            facets: facets.clone(),
            integer: false,
        }),
        NodeKind::String(facets) => {
            let pattern = match &facets.pattern {
                Some(source) => {
                    let regex =
                        Regex::new(source).map_err(|e| CompileError::InvalidPattern {
                            pattern: source.clone(),
                            source: Box::new(e),
                        })?;
                    Some((source.clone(), regex))
                }
                None => None,
            };
            Ok(Shape::String(StringCheck {
                pattern,
                format: facets.format.clone(),
                min_length: facets.min_length,
                max_length: facets.max_length,
            }))
        }
        NodeKind::Array(facets) => {
            let items = match &facets.items {
                Some(items) => Some(Box::new(compile_node(items)?)),
                None => None,
            };
            Ok(Shape::Array {
                items,
                min_items: facets.min_items,
                max_items: facets.max_items,
            })
        }
        NodeKind::Object(facets) => Ok(Shape::Object(compile_object(facets)?)),
        NodeKind::AllOf(branches) => {
            // The effective schema is the union of the branches'
            // properties and required sets.
            let merged = merge_all_of(branches);
            Ok(Shape::Object(compile_object(&merged)?))
        }
        NodeKind::AnyOf(branches) | NodeKind::OneOf(branches) => {
            let compiled: Result<Vec<Check>, CompileError> =
                branches.iter().map(compile_node).collect();
            Ok(Shape::AnyOf(compiled?))
        }
        NodeKind::Untyped => Ok(Shape::Any),
    }
}

fn compile_object(facets: &ObjectFacets) -> Result<ObjectCheck, CompileError> {
    let mut properties = IndexMap::new();
    for (name, prop) in &facets.properties {
        properties.insert(name.clone(), compile_node(prop)?);
    }
    let reject_extras = matches!(facets.additional, AdditionalProperties::Bool(false));
    Ok(ObjectCheck {
        properties,
        required: facets.required.clone(),
        reject_extras,
    })
}

/// Merge `allOf` branches into one effective object schema: the union of
/// all branches' properties (later branches win on name collision) and
/// the union of all required sets. Shared with the example generator.
pub(crate) fn merge_all_of(branches: &[SchemaNode]) -> ObjectFacets {
    let mut merged = ObjectFacets::default();
    for branch in branches {
        match &branch.kind {
            NodeKind::Object(facets) => merge_object_into(&mut merged, facets),
            NodeKind::AllOf(nested) => {
                let inner = merge_all_of(nested);
                merge_object_into(&mut merged, &inner);
            }
            // Branches without declared properties contribute nothing.
            _ => {}
        }
    }
    merged
}

fn merge_object_into(merged: &mut ObjectFacets, facets: &ObjectFacets) {
    for (name, prop) in &facets.properties {
        merged.properties.insert(name.clone(), prop.clone());
    }
    for name in &facets.required {
        if !merged.required.contains(name) {
            merged.required.push(name.clone());
        }
    }
}

// --- Evaluation ---

impl Check {
    fn run(&self, value: &Value, path: &str, issues: &mut Vec<Issue>) {
        if let Some(literals) = &self.enum_values {
            if !literals.iter().any(|lit| literal_eq(lit, value)) {
                issues.push(Issue {
                    kind: IssueKind::Enum,
                    path: path.to_string(),
                    message: format!(
                        "value is not one of the {} allowed value(s)",
                        literals.len()
                    ),
                    expected: Some(Value::Array(literals.clone())),
                    received: Some(value.clone()),
                });
                return;
            }
        }
        self.shape.run(value, path, issues);
    }

    /// True when the value produces no issues. Used for combinator branches.
    fn accepts(&self, value: &Value) -> bool {
        let mut issues = Vec::new();
        self.run(value, "", &mut issues);
        issues.is_empty()
    }
}

impl Shape {
    fn run(&self, value: &Value, path: &str, issues: &mut Vec<Issue>) {
        match self {
            Shape::Any => {}
            Shape::Null => {
                if !value.is_null() {
                    issues.push(type_issue(path, "null", value));
                }
            }
            Shape::Boolean => {
                if !value.is_boolean() {
                    issues.push(type_issue(path, "boolean", value));
                }
            }
            Shape::Number { facets, integer } => {
                run_number(facets, *integer, value, path, issues);
            }
            Shape::String(check) => run_string(check, value, path, issues),
            Shape::Array {
                items,
                min_items,
                max_items,
            } => run_array(items.as_deref(), *min_items, *max_items, value, path, issues),
            Shape::Object(check) => run_object(check, value, path, issues),
            Shape::AnyOf(branches) => {
                if !branches.iter().any(|b| b.accepts(value)) {
                    issues.push(Issue {
                        kind: IssueKind::NoMatch,
                        path: path.to_string(),
                        message: format!(
                            "value does not match any of the {} expected variant(s)",
                            branches.len()
                        ),
                        expected: None,
                        received: Some(value.clone()),
                    });
                }
            }
        }
    }
}

fn run_number(
    facets: &NumberFacets,
    integer: bool,
    value: &Value,
    path: &str,
    issues: &mut Vec<Issue>,
) {
    let Some(n) = value.as_f64() else {
        let expected = if integer { "integer" } else { "number" };
        issues.push(type_issue(path, expected, value));
        return;
    };

    if integer && n.fract() != 0.0 {
        // Declared integer, weakly-typed number: still a type mismatch.
        issues.push(type_issue(path, "integer", value));
        return;
    }

    if let Some(min) = facets.minimum {
        if n < min {
            issues.push(bound_issue(IssueKind::Minimum, path, n, min, ">="));
        }
    }
    if let Some(min) = facets.exclusive_minimum {
        if n <= min {
            issues.push(bound_issue(IssueKind::Minimum, path, n, min, ">"));
        }
    }
    if let Some(max) = facets.maximum {
        if n > max {
            issues.push(bound_issue(IssueKind::Maximum, path, n, max, "<="));
        }
    }
    if let Some(max) = facets.exclusive_maximum {
        if n >= max {
            issues.push(bound_issue(IssueKind::Maximum, path, n, max, "<"));
        }
    }
    if let Some(multiple) = facets.multiple_of {
        if multiple != 0.0 {
            let ratio = n / multiple;
            if (ratio - ratio.round()).abs() > MULTIPLE_OF_EPSILON {
                issues.push(Issue {
                    kind: IssueKind::NoMatch,
                    path: path.to_string(),
                    message: format!("{} is not a multiple of {}", n, multiple),
                    expected: Some(serde_json::json!({ "multipleOf": multiple })),
                    received: Some(value.clone()),
                });
            }
        }
    }
}

fn run_string(check: &StringCheck, value: &Value, path: &str, issues: &mut Vec<Issue>) {
    let Some(s) = value.as_str() else {
        issues.push(type_issue(path, "string", value));
        return;
    };

    let length = s.chars().count();
    if let Some(min) = check.min_length {
        if length < min {
            issues.push(Issue {
                kind: IssueKind::MinLength,
                path: path.to_string(),
                message: format!("string is {} character(s), expected at least {}", length, min),
                expected: Some(serde_json::json!({ "minLength": min })),
                received: Some(value.clone()),
            });
        }
    }
    if let Some(max) = check.max_length {
        if length > max {
            issues.push(Issue {
                kind: IssueKind::MaxLength,
                path: path.to_string(),
                message: format!("string is {} character(s), expected at most {}", length, max),
                expected: Some(serde_json::json!({ "maxLength": max })),
                received: Some(value.clone()),
            });
        }
    }
    if let Some((source, regex)) = &check.pattern {
        if !regex.is_match(s) {
            issues.push(Issue {
                kind: IssueKind::Pattern,
                path: path.to_string(),
                message: format!("string does not match pattern \"{}\"", source),
                expected: Some(Value::String(source.clone())),
                received: Some(value.clone()),
            });
        }
    }
    if let Some(format) = &check.format {
        // Unrecognized format names are advisory only.
        if let Some(false) = check_format(format, s) {
            issues.push(Issue {
                kind: IssueKind::Format,
                path: path.to_string(),
                message: format!("string is not a valid {}", format),
                expected: Some(Value::String(format.clone())),
                received: Some(value.clone()),
            });
        }
    }
}

fn run_array(
    items: Option<&Check>,
    min_items: Option<usize>,
    max_items: Option<usize>,
    value: &Value,
    path: &str,
    issues: &mut Vec<Issue>,
) {
    let Some(elements) = value.as_array() else {
        issues.push(type_issue(path, "array", value));
        return;
    };

    if let Some(min) = min_items {
        if elements.len() < min {
            issues.push(Issue {
                kind: IssueKind::MinLength,
                path: path.to_string(),
                message: format!("array has {} item(s), expected at least {}", elements.len(), min),
                expected: Some(serde_json::json!({ "minItems": min })),
                received: Some(Value::from(elements.len())),
            });
        }
    }
    if let Some(max) = max_items {
        if elements.len() > max {
            issues.push(Issue {
                kind: IssueKind::MaxLength,
                path: path.to_string(),
                message: format!("array has {} item(s), expected at most {}", elements.len(), max),
                expected: Some(serde_json::json!({ "maxItems": max })),
                received: Some(Value::from(elements.len())),
            });
        }
    }
    if let Some(items) = items {
        for (i, element) in elements.iter().enumerate() {
            items.run(element, &format!("{}/{}", path, i), issues);
        }
    }
}

fn run_object(check: &ObjectCheck, value: &Value, path: &str, issues: &mut Vec<Issue>) {
    let Some(map) = value.as_object() else {
        issues.push(type_issue(path, "object", value));
        return;
    };

    for name in &check.required {
        if !map.contains_key(name) {
            issues.push(Issue {
                kind: IssueKind::Required,
                path: format!("{}/{}", path, name),
                message: format!("missing required property \"{}\"", name),
                expected: None,
                received: None,
            });
        }
    }

    for (name, prop_check) in &check.properties {
        if let Some(prop_value) = map.get(name) {
            prop_check.run(prop_value, &format!("{}/{}", path, name), issues);
        }
    }

    if check.reject_extras {
        for key in map.keys() {
            if !check.properties.contains_key(key) {
                issues.push(Issue {
                    kind: IssueKind::Unexpected,
                    path: format!("{}/{}", path, key),
                    message: format!("unexpected property \"{}\"", key),
                    expected: None,
                    received: None,
                });
            }
        }
    }
}

fn type_issue(path: &str, expected: &str, received: &Value) -> Issue {
    Issue {
        kind: IssueKind::Type,
        path: path.to_string(),
        message: format!("expected {}, got {}", expected, json_type_name(received)),
        expected: Some(Value::String(expected.to_string())),
        received: Some(received.clone()),
    }
}

fn bound_issue(kind: IssueKind, path: &str, actual: f64, bound: f64, relation: &str) -> Issue {
    Issue {
        kind,
        path: path.to_string(),
        message: format!("{} must be {} {}", actual, relation, bound),
        expected: Some(serde_json::json!({ "bound": bound, "relation": relation })),
        received: Some(serde_json::json!(actual)),
    }
}

/// Value equality for `enum` literals. Numbers compare numerically so
/// `18` and `18.0` are the same literal; everything else compares
/// structurally.
pub(crate) fn literal_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

// --- Format checks ---

macro_rules! format_regex {
    ($name:ident, $pattern:expr) => {
        static $name: Lazy<Regex> =
            Lazy::new(|| Regex::new($pattern).expect("static format regex is valid"));
    };
}

format_regex!(EMAIL_RE, r"^[^@\s]+@[^@\s]+\.[^@\s]+$");
format_regex!(DATE_RE, r"^\d{4}-\d{2}-\d{2}$");
format_regex!(
    DATE_TIME_RE,
    r"^\d{4}-\d{2}-\d{2}[Tt ]\d{2}:\d{2}:\d{2}(\.\d+)?([Zz]|[+-]\d{2}:\d{2})?$"
);
format_regex!(URI_RE, r"^[a-zA-Z][a-zA-Z0-9+.-]*://\S+$");
format_regex!(
    UUID_RE,
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$"
);
format_regex!(SSN_RE, r"^\d{3}-\d{2}-\d{4}$");
format_regex!(PHONE_RE, r"^\+?[0-9][0-9 ().-]{6,}$");
format_regex!(
    IPV4_RE,
    r"^((25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)$"
);
format_regex!(IPV6_RE, r"^([0-9a-fA-F]{0,4}:){1,7}[0-9a-fA-F]{0,4}$");

/// Check a string against a named format. `None` means the format name is
/// not recognized and carries no check of its own.
fn check_format(format: &str, s: &str) -> Option<bool> {
    let regex: &Regex = match format {
        "email" => &EMAIL_RE,
        "date" => &DATE_RE,
        "date-time" => &DATE_TIME_RE,
        "uri" | "url" => &URI_RE,
        "uuid" => &UUID_RE,
        "ssn" => &SSN_RE,
        "phone" => &PHONE_RE,
        "ipv4" => &IPV4_RE,
        "ipv6" => &IPV6_RE,
        _ => return None,
    };
    Some(regex.is_match(s))
}
