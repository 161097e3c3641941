//! API Documentation Schema Engine
//!
//! Compiles untrusted, dynamically-shaped schema fragments into
//! executable validators, synthesizes structurally valid example
//! payloads, and maps validation failures into field-addressable
//! reports with remediation text.
//!
//! The engine accepts locally dereferenced schema fragments only: an
//! unresolved `$ref` is tolerated gracefully (validation accepts any
//! value, generation emits a stub naming the reference) rather than
//! resolved. All operations are synchronous, pure and stateless; a
//! compiled [`Validator`] may be cached and shared across threads.
//!
//! # Example
//!
//! ```
//! use apidoc_schema::{generate_value, validate, GenerateOptions};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "required": ["name"],
//!     "properties": {
//!         "name": { "type": "string" },
//!         "age": { "type": "integer", "minimum": 18 }
//!     }
//! });
//!
//! // Synthesize a representative payload...
//! let example = generate_value(&schema, &GenerateOptions::default());
//! assert_eq!(example, json!({ "name": "string", "age": 18 }));
//!
//! // ...and the round trip validates.
//! let report = validate(&example, &schema);
//! assert!(report.valid);
//!
//! // A broken payload yields a classified, non-throwing report.
//! let report = validate(&json!({ "age": 17 }), &schema);
//! assert!(!report.valid);
//! assert_eq!(report.summary, "Validation failed with 2 errors");
//! ```

mod compiler;
mod diagnostics;
mod error;
mod generator;
mod loader;
mod render;
mod types;

pub use compiler::{compile, Validator};
pub use diagnostics::{
    validate, validate_node, validate_str, ErrorKind, ValidationError, ValidationReport,
    ValidationWarning, WarningKind,
};
pub use error::{CompileError, LoadError};
pub use generator::{generate, generate_value};
pub use loader::{load_json, load_json_str};
pub use render::{format_errors, format_report};
pub use types::{
    json_type_name, AdditionalProperties, ArrayFacets, GenerateOptions, NodeKind, NumberFacets,
    ObjectFacets, SchemaNode, StringFacets, DEFAULT_MAX_DEPTH, VALID_TYPES,
};
