//! End-to-end tests for the csvjson binary
//!
//! These run the built executable against temporary files and check the
//! output file, status stream, and exit status.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::tempdir;

// ============================================================================
// Test Infrastructure
// ============================================================================

fn run_csvjson(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_csvjson"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute csvjson")
}

fn create_test_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// Successful conversions
// ============================================================================

mod conversion {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn converts_to_derived_path() {
        let dir = tempdir().unwrap();
        let input = create_test_file(&dir, "people.csv", "a,b\n1,2\n3,4\n");

        let output = run_csvjson(&[input.to_str().unwrap()]);
        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

        let json = fs::read_to_string(dir.path().join("people.json")).unwrap();
        assert_eq!(json, r#"[{"a":"1","b":"2"},{"a":"3","b":"4"}]"#);

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Writing JSON file..."));
        assert!(stdout.contains("Completed!"));
    }

    #[test]
    fn semicolon_separator_flag() {
        let dir = tempdir().unwrap();
        let input = create_test_file(&dir, "semi.csv", "a;b\n1;2\n");

        let output = run_csvjson(&[input.to_str().unwrap(), "--separator", "semicolon"]);
        assert!(output.status.success());

        let json = fs::read_to_string(dir.path().join("semi.json")).unwrap();
        assert_eq!(json, r#"[{"a":"1","b":"2"}]"#);
    }

    #[test]
    fn pretty_output() {
        let dir = tempdir().unwrap();
        let input = create_test_file(&dir, "pretty.csv", "a,b\n1,2\n");

        let output = run_csvjson(&[input.to_str().unwrap(), "--pretty"]);
        assert!(output.status.success());

        let json = fs::read_to_string(dir.path().join("pretty.json")).unwrap();
        assert_eq!(json, "[\n   {\n      \"a\": \"1\",\n      \"b\": \"2\"\n   }\n]");
    }

    #[test]
    fn skipped_row_reported_on_stderr() {
        let dir = tempdir().unwrap();
        let input = create_test_file(&dir, "ragged.csv", "a,b\n1,2\n3\n");

        let output = run_csvjson(&[input.to_str().unwrap()]);
        assert!(output.status.success());

        let json = fs::read_to_string(dir.path().join("ragged.json")).unwrap();
        assert_eq!(json, r#"[{"a":"1","b":"2"}]"#);

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("skipping"), "stderr: {}", stderr);
        assert!(stderr.contains("1 rows skipped"), "stderr: {}", stderr);
    }

    #[test]
    fn explicit_output_path_creates_directories() {
        let dir = tempdir().unwrap();
        let input = create_test_file(&dir, "data.csv", "x\n1\n");
        let target = dir.path().join("nested/out/result.json");

        let output = run_csvjson(&[
            input.to_str().unwrap(),
            "--output",
            target.to_str().unwrap(),
            "--quiet",
        ]);
        assert!(output.status.success());
        assert!(output.stdout.is_empty());
        assert_eq!(fs::read_to_string(target).unwrap(), r#"[{"x":"1"}]"#);
    }

    #[test]
    fn stats_json_is_machine_readable() {
        let dir = tempdir().unwrap();
        let input = create_test_file(&dir, "stats.csv", "a\n1\n2\n");

        let output = run_csvjson(&[input.to_str().unwrap(), "--stats-json"]);
        assert!(output.status.success());

        let stdout = String::from_utf8_lossy(&output.stdout);
        let start = stdout.find('{').expect("stats JSON in stdout");
        let stats: serde_json::Value = serde_json::from_str(&stdout[start..]).unwrap();
        assert_eq!(stats["records_written"], 2);
        assert_eq!(stats["rows_skipped"], 0);
    }

    #[test]
    fn validate_only_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = create_test_file(&dir, "check.csv", "a,b\n1,2\n3\n");

        let output = run_csvjson(&[input.to_str().unwrap(), "--validate-only"]);
        assert!(output.status.success());
        assert!(!dir.path().join("check.json").exists());

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("1 rows match the header"), "stdout: {}", stdout);
    }
}

// ============================================================================
// Failures exit non-zero before writing output
// ============================================================================

mod failures {
    use super::*;

    #[test]
    fn nonexistent_input() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.csv");

        let output = run_csvjson(&[missing.to_str().unwrap()]);
        assert!(!output.status.success());
        assert!(!dir.path().join("missing.json").exists());

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("does not exist"), "stderr: {}", stderr);
        assert_eq!(stderr.trim().lines().count(), 1);
    }

    #[test]
    fn non_csv_extension() {
        let dir = tempdir().unwrap();
        let input = create_test_file(&dir, "data.txt", "a,b\n1,2\n");

        let output = run_csvjson(&[input.to_str().unwrap()]);
        assert!(!output.status.success());
        assert!(!dir.path().join("data.json").exists());
        assert!(String::from_utf8_lossy(&output.stderr).contains("is not CSV"));
    }

    #[test]
    fn unsupported_delimiter() {
        let dir = tempdir().unwrap();
        let input = create_test_file(&dir, "tabs.csv", "a\tb\n1\t2\n");

        let output = run_csvjson(&[input.to_str().unwrap(), "--delimiter", "tab"]);
        assert!(!output.status.success());
        assert!(!dir.path().join("tabs.json").exists());
    }

    #[test]
    fn missing_input_argument() {
        let output = run_csvjson(&[]);
        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.to_lowercase().contains("usage"), "stderr: {}", stderr);
    }

    #[test]
    fn corrupt_input_leaves_no_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("corrupt.csv");
        fs::write(&input, b"a,b\n1,2\n\xff\xfe,3\n").unwrap();

        let output = run_csvjson(&[input.to_str().unwrap()]);
        assert!(!output.status.success());
        assert!(!dir.path().join("corrupt.json").exists());
        assert!(String::from_utf8_lossy(&output.stderr).contains("CSV parse error"));
    }
}
