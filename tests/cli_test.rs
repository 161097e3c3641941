//! CLI integration tests for the apidoc-schema binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("apidoc-schema"))
}

// Helper to create a temp JSON file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const PERSON_SCHEMA: &str = r#"{
    "type": "object",
    "required": ["name"],
    "properties": {
        "name": { "type": "string" },
        "age": { "type": "integer", "minimum": 18 }
    }
}"#;

mod validate_command {
    use super::*;

    #[test]
    fn valid_payload() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let payload = write_temp_file(&dir, "payload.json", r#"{"name": "Ada", "age": 36}"#);

        cmd()
            .args([
                "validate",
                payload.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Payload is valid"));
    }

    #[test]
    fn invalid_payload_exits_one() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let payload = write_temp_file(&dir, "payload.json", r#"{"age": 17}"#);

        cmd()
            .args([
                "validate",
                payload.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Validation failed with 2 errors"))
            .stdout(predicate::str::contains("missing required property \"name\""));
    }

    #[test]
    fn json_output() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let payload = write_temp_file(&dir, "payload.json", r#"{}"#);

        cmd()
            .args([
                "validate",
                payload.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
                "--json",
            ])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#""valid": false"#))
            .stdout(predicate::str::contains(r#""type": "required""#))
            .stdout(predicate::str::contains(r#""fixSuggestion""#));
    }

    #[test]
    fn missing_payload_file_exits_three() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);

        cmd()
            .args([
                "validate",
                dir.path().join("absent.json").to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn unparseable_payload_exits_two() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let payload = write_temp_file(&dir, "payload.json", "{ nope");

        cmd()
            .args([
                "validate",
                payload.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid JSON"));
    }

    #[test]
    fn uncompilable_schema_reported_in_band() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", r#"{"type": "wibble"}"#);
        let payload = write_temp_file(&dir, "payload.json", r#"{}"#);

        cmd()
            .args([
                "validate",
                payload.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("schema could not be compiled"));
    }
}

mod generate_command {
    use super::*;

    #[test]
    fn basic_generate() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);

        cmd()
            .args(["generate", schema.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""name":"string""#))
            .stdout(predicate::str::contains(r#""age":18"#));
    }

    #[test]
    fn required_only() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);

        cmd()
            .args(["generate", schema.to_str().unwrap(), "--required-only"])
            .assert()
            .success()
            .stdout(predicate::str::contains("name"))
            .stdout(predicate::str::contains("age").not());
    }

    #[test]
    fn pretty_output() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);

        cmd()
            .args(["generate", schema.to_str().unwrap(), "--pretty"])
            .assert()
            .success()
            // Pretty output has newlines and indentation
            .stdout(predicate::str::contains("{\n"));
    }

    #[test]
    fn output_file() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let output = dir.path().join("example.json");

        cmd()
            .args([
                "generate",
                schema.to_str().unwrap(),
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains(r#""name":"string""#));
    }

    #[test]
    fn max_depth_flag() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(
            &dir,
            "schema.json",
            r#"{
                "type": "object",
                "properties": {
                    "a": {
                        "type": "object",
                        "properties": {
                            "b": {
                                "type": "object",
                                "properties": { "c": { "type": "string" } }
                            }
                        }
                    }
                }
            }"#,
        );

        cmd()
            .args(["generate", schema.to_str().unwrap(), "--max-depth", "2"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"a":{"b":{}}}"#));
    }

    #[test]
    fn malformed_schema_exits_two() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", r#"{"type": "wibble"}"#);

        cmd()
            .args(["generate", schema.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("unknown type"));
    }
}

mod check_command {
    use super::*;

    #[test]
    fn compiling_schema() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);

        cmd()
            .args(["check", schema.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Schema compiles"));
    }

    #[test]
    fn invalid_regex_exits_two() {
        let dir = TempDir::new().unwrap();
        let schema =
            write_temp_file(&dir, "schema.json", r#"{"type": "string", "pattern": "["}"#);

        cmd()
            .args(["check", schema.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid pattern"));
    }

    #[test]
    fn missing_file_exits_three() {
        let dir = TempDir::new().unwrap();

        cmd()
            .args(["check", dir.path().join("absent.json").to_str().unwrap()])
            .assert()
            .code(3);
    }
}
