//! Report rendering - turns a validation report into operator-readable
//! text. Pure formatting, no validation logic.

use std::fmt::Write;

use serde_json::Value;

use crate::diagnostics::{ValidationError, ValidationReport, ValidationWarning};

/// Render a full report with a leading success or failure indicator.
///
/// A valid result is followed by a warnings block only when warnings are
/// present; an invalid result enumerates every error.
pub fn format_report(report: &ValidationReport) -> String {
    if report.valid {
        let mut out = format!("✓ {}", report.summary);
        if !report.warnings.is_empty() {
            out.push_str("\n\n");
            out.push_str(&format_warnings(&report.warnings));
        }
        return out;
    }

    let mut out = format!("✗ {}\n\n", report.summary);
    out.push_str(&enumerate_errors(&report.errors));
    out
}

/// Render a bare error list with a correctly pluralized heading.
pub fn format_errors(errors: &[ValidationError]) -> String {
    match errors.len() {
        0 => "No validation errors".to_string(),
        1 => format!("1 validation error\n\n{}", enumerate_errors(errors)),
        n => format!("{} validation errors\n\n{}", n, enumerate_errors(errors)),
    }
}

fn enumerate_errors(errors: &[ValidationError]) -> String {
    let mut out = String::new();
    for (i, error) in errors.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}: {}", i + 1, error.field, error.message);
        if let Some(expected) = &error.expected {
            let _ = writeln!(out, "     expected: {}", render_value(expected));
        }
        if let Some(received) = &error.received {
            let _ = writeln!(out, "     received: {}", render_value(received));
        }
        if let Some(fix) = &error.fix_suggestion {
            let _ = writeln!(out, "     fix: {}", fix);
        }
    }
    out
}

fn format_warnings(warnings: &[ValidationWarning]) -> String {
    let mut out = String::from("Warnings:\n");
    for warning in warnings {
        let _ = writeln!(out, "  - {}: {}", warning.field, warning.message);
        if let Some(suggestion) = &warning.suggestion {
            let _ = writeln!(out, "    suggestion: {}", suggestion);
        }
    }
    out
}

/// Compact rendering for arbitrary value shapes: strings, numbers,
/// sequences, objects.
fn render_value(value: &Value) -> String {
    value.to_string()
}
