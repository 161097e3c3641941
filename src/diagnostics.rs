//! Diagnostic mapping - classifies raw validator issues into a
//! field-addressable report.
//!
//! Nothing here returns `Err` to the caller: schema compile failures and
//! payload parse failures are recovered locally and reported as entries
//! in the [`ValidationReport`], so a validation call is always a total
//! function over its inputs.

use serde::Serialize;
use serde_json::Value;

use crate::compiler::{compile, merge_all_of, Issue, IssueKind};
use crate::error::CompileError;
use crate::generator::format_sample;
use crate::types::{NodeKind, ObjectFacets, SchemaNode};

/// Classification of a single validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// A required property is absent from the payload.
    Required,
    /// Runtime type does not match the declared type.
    Type,
    /// A string fails a named format check.
    Format,
    /// A string fails a declared regular-expression pattern.
    Pattern,
    /// String or sequence shorter than allowed.
    MinLength,
    /// String or sequence longer than allowed.
    MaxLength,
    /// Numeric lower bound violated.
    Minimum,
    /// Numeric upper bound violated.
    Maximum,
    /// Value not among the declared literal values.
    Enum,
    /// Schema-level failure or anything not otherwise classified.
    Custom,
}

/// A single classified validation error.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    /// Dotted field address, e.g. `items.0.id`; `payload` at the root.
    pub field: String,
    /// JSON Pointer to the offending value; empty at the root.
    pub path: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<Value>,
    /// Best-effort remediation text; absent when no template applies.
    #[serde(rename = "fixSuggestion", skip_serializing_if = "Option::is_none")]
    pub fix_suggestion: Option<String>,
}

/// Kind tag for warnings. Only one kind exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningKind {
    Optional,
}

/// A non-fatal observation about a valid payload.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: WarningKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Outcome of validating one payload against one schema.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValidationWarning>,
    pub summary: String,
}

/// Validate a payload value against a raw schema fragment.
///
/// Compiles the schema, runs the validator and classifies every raw
/// issue. A schema that fails to compile yields a report with a single
/// schema-level [`ErrorKind::Custom`] error embedding the cause.
pub fn validate(payload: &Value, schema: &Value) -> ValidationReport {
    let node = match SchemaNode::from_value(schema) {
        Ok(node) => node,
        Err(e) => return compile_failure_report(&e),
    };
    validate_node(payload, &node)
}

/// Validate a payload against an already-parsed schema node.
pub fn validate_node(payload: &Value, node: &SchemaNode) -> ValidationReport {
    let validator = match compile(node) {
        Ok(validator) => validator,
        Err(e) => return compile_failure_report(&e),
    };

    let issues = validator.check(payload);
    if issues.is_empty() {
        return ValidationReport {
            valid: true,
            errors: Vec::new(),
            warnings: collect_warnings(node, payload),
            summary: "Payload is valid".to_string(),
        };
    }

    let errors: Vec<ValidationError> = issues.into_iter().map(map_issue).collect();
    let summary = failure_summary(errors.len());
    ValidationReport {
        valid: false,
        errors,
        warnings: Vec::new(),
        summary,
    }
}

/// Validate a payload that arrives as unparsed text.
///
/// Text that is not valid JSON is reported distinctly from schema
/// validation failures, with a message naming the syntax problem.
pub fn validate_str(payload: &str, schema: &Value) -> ValidationReport {
    match serde_json::from_str::<Value>(payload) {
        Ok(value) => validate(&value, schema),
        Err(e) => ValidationReport {
            valid: false,
            errors: vec![ValidationError {
                field: "payload".to_string(),
                path: String::new(),
                message: format!("payload is not valid JSON: {}", e),
                kind: ErrorKind::Custom,
                expected: None,
                received: None,
                fix_suggestion: Some("Provide the payload as well-formed JSON".to_string()),
            }],
            warnings: Vec::new(),
            summary: failure_summary(1),
        },
    }
}

fn compile_failure_report(error: &CompileError) -> ValidationReport {
    ValidationReport {
        valid: false,
        errors: vec![ValidationError {
            field: "schema".to_string(),
            path: String::new(),
            message: format!("schema could not be compiled: {}", error),
            kind: ErrorKind::Custom,
            expected: None,
            received: None,
            fix_suggestion: None,
        }],
        warnings: Vec::new(),
        summary: failure_summary(1),
    }
}

fn failure_summary(count: usize) -> String {
    if count == 1 {
        "Validation failed with 1 error".to_string()
    } else {
        format!("Validation failed with {} errors", count)
    }
}

// --- Issue classification ---

fn map_issue(issue: Issue) -> ValidationError {
    let kind = match issue.kind {
        IssueKind::Required => ErrorKind::Required,
        IssueKind::Type => ErrorKind::Type,
        IssueKind::Format => ErrorKind::Format,
        IssueKind::Pattern => ErrorKind::Pattern,
        IssueKind::MinLength => ErrorKind::MinLength,
        IssueKind::MaxLength => ErrorKind::MaxLength,
        IssueKind::Minimum => ErrorKind::Minimum,
        IssueKind::Maximum => ErrorKind::Maximum,
        IssueKind::Enum => ErrorKind::Enum,
        IssueKind::Unexpected | IssueKind::NoMatch => ErrorKind::Custom,
    };

    let fix_suggestion = suggest_fix(&issue, kind);
    ValidationError {
        field: pointer_to_field(&issue.path),
        path: issue.path,
        message: issue.message,
        kind,
        expected: issue.expected,
        received: issue.received,
        fix_suggestion,
    }
}

/// Dotted field address from a JSON Pointer: `/items/0/id` -> `items.0.id`.
fn pointer_to_field(path: &str) -> String {
    if path.is_empty() {
        return "payload".to_string();
    }
    path.trim_start_matches('/').replace('/', ".")
}

/// Best-effort remediation text. Returns `None` when no template fits.
fn suggest_fix(issue: &Issue, kind: ErrorKind) -> Option<String> {
    match kind {
        ErrorKind::Required => {
            let name = issue.path.rsplit('/').next().unwrap_or_default();
            Some(format!("Add the required property \"{}\"", name))
        }
        ErrorKind::Type => {
            let expected = issue.expected.as_ref()?.as_str()?;
            Some(format!("Provide a value of type {}", expected))
        }
        ErrorKind::Pattern => {
            let pattern = issue.expected.as_ref()?.as_str()?;
            Some(format!("Use a value matching the pattern {}", pattern))
        }
        ErrorKind::Format => {
            let format = issue.expected.as_ref()?.as_str()?;
            match format_sample(format) {
                Some(sample) => Some(format!("Use a valid {}, e.g. \"{}\"", format, sample)),
                None => Some(format!("Use a valid {} value", format)),
            }
        }
        ErrorKind::Enum => {
            let allowed = issue.expected.as_ref()?.as_array()?;
            let rendered: Vec<String> = allowed.iter().map(render_literal).collect();
            Some(format!("Use one of: {}", rendered.join(", ")))
        }
        ErrorKind::Minimum | ErrorKind::Maximum => {
            let expected = issue.expected.as_ref()?;
            let bound = expected.get("bound")?;
            let relation = expected.get("relation")?.as_str()?;
            Some(format!("Use a number {} {}", relation, bound))
        }
        ErrorKind::MinLength | ErrorKind::MaxLength => {
            length_suggestion(issue.expected.as_ref()?)
        }
        ErrorKind::Custom => match issue.kind {
            IssueKind::Unexpected => {
                let name = issue.path.rsplit('/').next().unwrap_or_default();
                Some(format!(
                    "Remove the property \"{}\" or allow additional properties",
                    name
                ))
            }
            _ => None,
        },
    }
}

fn length_suggestion(expected: &Value) -> Option<String> {
    for (key, text) in [
        ("minLength", "at least"),
        ("maxLength", "at most"),
        ("minItems", "at least"),
        ("maxItems", "at most"),
    ] {
        if let Some(bound) = expected.get(key) {
            let unit = if key.ends_with("Items") {
                "item(s)"
            } else {
                "character(s)"
            };
            return Some(format!("Use {} {} {}", text, bound, unit));
        }
    }
    None
}

fn render_literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}

// --- Warnings on valid payloads ---

/// Words in a property description that mark it as recommended.
const RECOMMENDATION_CUES: &[&str] = &["recommended", "should"];

fn collect_warnings(node: &SchemaNode, payload: &Value) -> Vec<ValidationWarning> {
    let Some(map) = payload.as_object() else {
        return Vec::new();
    };

    let facets: ObjectFacets = match &node.kind {
        NodeKind::Object(facets) => facets.clone(),
        NodeKind::AllOf(branches) => merge_all_of(branches),
        _ => return Vec::new(),
    };

    let mut warnings = Vec::new();
    for (name, prop) in &facets.properties {
        if facets.required.iter().any(|r| r == name) || map.contains_key(name) {
            continue;
        }
        let Some(description) = &prop.description else {
            continue;
        };
        let lowered = description.to_lowercase();
        if RECOMMENDATION_CUES.iter().any(|cue| lowered.contains(cue)) {
            warnings.push(ValidationWarning {
                field: name.clone(),
                message: format!("optional property \"{}\" is not set", name),
                kind: WarningKind::Optional,
                suggestion: Some(description.clone()),
            });
        }
    }
    warnings
}
