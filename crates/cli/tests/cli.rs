//! End-to-end runs of the `fetchgen` binary.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const SPEC: &str = r##"{
  "openapi": "3.0.0",
  "info": { "title": "Petstore", "version": "1.0.0" },
  "paths": {
    "/pets": {
      "get": {
        "operationId": "listPets",
        "tags": ["pets"],
        "parameters": [{ "name": "status", "in": "query", "schema": { "type": "string", "enum": ["available", "sold"] } }],
        "responses": { "200": { "description": "OK", "content": { "application/json": { "schema": { "type": "array", "items": { "type": "string" } } } } } }
      }
    },
    "/users": {
      "get": {
        "operationId": "listUsers",
        "tags": ["users"],
        "responses": { "200": { "description": "OK" } }
      }
    }
  }
}"##;

fn fetchgen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fetchgen"))
        .args(args)
        .env_remove("FETCHGEN_LOG")
        .output()
        .unwrap()
}

fn write_spec(dir: &Path) -> String {
    let path = dir.join("openapi.json");
    fs::write(&path, SPEC).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn prints_module_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path());

    let output = fetchgen(&[&spec]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("/**\n * Petstore\n * 1.0.0\n"));
    assert!(stdout.contains("export function listPets("));
    assert!(stdout.contains("export function listUsers("));
}

#[test]
fn writes_output_file_and_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path());
    let out = dir.path().join("generated/api.ts");
    let runtime = dir.path().join("generated/runtime");

    let output = fetchgen(&[
        &spec,
        out.to_str().unwrap(),
        "--include",
        "pets",
        "--useEnumType",
        "--optimistic",
        "--emitRuntime",
        runtime.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());

    let module = fs::read_to_string(&out).unwrap();
    assert!(module.contains("export enum Status {"));
    assert!(module.contains("return runtime.ok(runtime.fetchJson<"));
    assert!(!module.contains("listUsers"));

    assert!(runtime.join("index.ts").is_file());
    assert!(runtime.join("query.ts").is_file());
}

#[test]
fn reads_options_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path());
    let config = dir.path().join("fetchgen.toml");
    fs::write(&config, "[generate]\nexclude = [\"pets\"]\nruntime-module = \"@acme/runtime\"\n").unwrap();

    let output = fetchgen(&[&spec, "--config", config.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("import * as Runtime from \"@acme/runtime\";"));
    assert!(!stdout.contains("listPets"));
}

#[test]
fn missing_spec_path_is_a_usage_error() {
    let output = fetchgen(&[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("SPEC_PATH"));
}

#[test]
fn generation_errors_exit_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let spec = dir.path().join("broken.json");
    fs::write(
        &spec,
        r##"{ "openapi": "3.0.0", "paths": { "/a": { "get": { "responses": { "200": {
            "description": "OK", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Missing" } } } } } } } } }"##,
    )
    .unwrap();

    let output = fetchgen(&[spec.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Can't find components.schemas.Missing"));
}

#[test]
fn unreadable_spec_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    let output = fetchgen(&[missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Failed to read"));
}
