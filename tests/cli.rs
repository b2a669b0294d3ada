//! CLI end-to-end tests.
//!
//! These tests spawn the actual `declgraph` binary and validate stdout/exit codes.
//!
//! Exit code expectations:
//! - 0: Success
//! - 2: Invalid arguments (missing path, malformed query, bad config)
//! - 3: Symbol not found

use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run declgraph in `dir` and return (stdout, stderr, exit_code).
fn run_declgraph(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_declgraph"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("DECLGRAPH_THREADS")
        .env_remove("DECLGRAPH_DIALECT")
        .env_remove("DECLGRAPH_MAX_FILE_BYTES")
        .output()
        .expect("failed to execute declgraph");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

/// A temp project with a small C++ hierarchy under `src/`.
fn shapes_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    fs::write(
        src.join("shape.hpp"),
        "namespace graphics {\nclass Shape {\npublic:\n    virtual double area() const = 0;\n};\n}\n",
    )
    .unwrap();
    fs::write(
        src.join("circle.hpp"),
        "namespace graphics {\nclass Circle : public Shape {\npublic:\n    Circle(double r);\n    double area() const override;\n};\n}\n",
    )
    .unwrap();
    fs::write(src.join("notes.txt"), "class Ignored {};").unwrap();
    dir
}

fn parse(stdout: &str) -> Value {
    serde_json::from_str(stdout).expect("stdout should be valid JSON")
}

fn result_names(json: &Value) -> Vec<String> {
    json["symbols"]
        .as_array()
        .expect("symbols array")
        .iter()
        .map(|s| s["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

// ============================================================================
// Successful commands
// ============================================================================

#[test]
fn index_prints_graph() {
    let project = shapes_project();
    let (stdout, _stderr, exit_code) = run_declgraph(project.path(), &["index", "src"]);
    assert_eq!(exit_code, 0);

    let json = parse(&stdout);
    assert_eq!(json["status"], "ok");
    let symbols = json["symbols"].as_array().unwrap();
    assert!(symbols.iter().any(|s| s["name"] == "graphics.Circle"));
    assert!(!symbols.iter().any(|s| s["name"] == "Ignored"));
    assert_eq!(json["files"].as_array().unwrap().len(), 2);
}

#[test]
fn lookup_accepts_either_separator() {
    let project = shapes_project();
    for name in ["graphics.Circle", "graphics::Circle"] {
        let (stdout, _stderr, exit_code) =
            run_declgraph(project.path(), &["lookup", "src", "--name", name]);
        assert_eq!(exit_code, 0);
        assert_eq!(result_names(&parse(&stdout)), vec!["graphics.Circle"]);
    }
}

#[test]
fn children_of_global_scope() {
    let project = shapes_project();
    let (stdout, _stderr, exit_code) = run_declgraph(project.path(), &["children", "src"]);
    assert_eq!(exit_code, 0);
    assert_eq!(result_names(&parse(&stdout)), vec!["graphics"]);
}

#[test]
fn implementors_and_overrides() {
    let project = shapes_project();
    let (stdout, _stderr, exit_code) =
        run_declgraph(project.path(), &["implementors", "src", "--type", "graphics.Shape"]);
    assert_eq!(exit_code, 0);
    assert_eq!(result_names(&parse(&stdout)), vec!["graphics.Circle"]);

    let (stdout, _stderr, exit_code) = run_declgraph(
        project.path(),
        &["overrides", "src", "--method", "graphics.Circle.area"],
    );
    assert_eq!(exit_code, 0);
    assert_eq!(
        result_names(&parse(&stdout)),
        vec!["graphics.Circle.area", "graphics.Shape.area"]
    );
}

#[test]
fn find_with_no_match_is_empty_success() {
    let project = shapes_project();
    let (stdout, _stderr, exit_code) =
        run_declgraph(project.path(), &["find", "src", "--spec", "Circle(int)"]);
    assert_eq!(exit_code, 0);
    assert!(result_names(&parse(&stdout)).is_empty());
}

#[test]
fn explicit_file_is_indexed_with_dialect_flag() {
    let project = shapes_project();
    fs::write(project.path().join("Extra.txt"), "class Extra {}").unwrap();
    let (stdout, _stderr, exit_code) = run_declgraph(
        project.path(),
        &["lookup", "Extra.txt", "--name", "Extra", "--dialect", "java"],
    );
    assert_eq!(exit_code, 0);
    assert_eq!(result_names(&parse(&stdout)), vec!["Extra"]);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn unknown_symbol_returns_exit_3() {
    let project = shapes_project();
    let (stdout, _stderr, exit_code) =
        run_declgraph(project.path(), &["lookup", "src", "--name", "graphics.Square"]);
    assert_eq!(exit_code, 3);
    let json = parse(&stdout);
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 3);
}

#[test]
fn missing_path_returns_exit_2() {
    let project = shapes_project();
    let (stdout, _stderr, exit_code) = run_declgraph(project.path(), &["index", "nope"]);
    assert_eq!(exit_code, 2);
    assert_eq!(parse(&stdout)["status"], "error");
}

#[test]
fn malformed_find_spec_returns_exit_2() {
    let project = shapes_project();
    let (stdout, _stderr, exit_code) =
        run_declgraph(project.path(), &["find", "src", "--spec", "area(int"]);
    assert_eq!(exit_code, 2);
    assert_eq!(parse(&stdout)["status"], "error");
}

#[test]
fn invalid_config_file_returns_exit_2() {
    let project = shapes_project();
    fs::write(project.path().join("declgraph.json"), r#"{"threads": 0}"#).unwrap();
    let (stdout, _stderr, exit_code) = run_declgraph(project.path(), &["index", "src"]);
    assert_eq!(exit_code, 2);
    assert_eq!(parse(&stdout)["status"], "error");
}
