use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn vispi(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vispi"))
        .args(args)
        .output()
        .expect("failed to run vispi")
}

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// The JSON body of a fixture, without its front matter.
fn workspace_of(relative: &str) -> String {
    let content = std::fs::read_to_string(fixtures().join(relative)).unwrap();
    let body_start = content.match_indices("\n---\n").next().unwrap().0 + 5;
    content[body_start..].to_string()
}

fn write_workspace(dir: &Path, relative: &str) -> String {
    let path = dir.join("workspace.json");
    std::fs::write(&path, workspace_of(relative)).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn fixture_suite_passes() {
    let output = vispi(&["test", &fixtures().to_string_lossy(), "--no-color"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "{}", stderr);
    assert!(stderr.contains("test result: ok."), "{}", stderr);
}

#[test]
fn single_category() {
    let output = vispi(&["test", &fixtures().to_string_lossy(), "-c", "forks", "--no-color"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "{}", stderr);
    assert!(stderr.contains("3 passed, 0 failed"), "{}", stderr);
    assert!(!stderr.contains("scoping"), "{}", stderr);
}

#[test]
fn generate_prints_canonical_text() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_workspace(dir.path(), "processes/definitions_first.test.vispi");

    let output = vispi(&["generate", &file, "--no-color"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Echo(x) = x'<x>\n\n$a. Echo(a)\n"
    );

    // A bare file argument means `generate`.
    let output = vispi(&[&file, "--raw"]);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "$a. Echo(a)\nEcho(x) = x'<x>\n"
    );
}

#[test]
fn queries() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_workspace(dir.path(), "processes/arity_mismatch.test.vispi");

    let output = vispi(&["generate", &file, "--list-processes"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Pair(l, r)\n");

    let output = vispi(&["generate", &file, "--names", "msg"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "a\nl\nr\n");

    let output = vispi(&["generate", &file, "--names", "missing"]);
    assert!(!output.status.success());
}

#[test]
fn check_fails_on_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_workspace(dir.path(), "processes/arity_mismatch.test.vispi");

    let output = vispi(&["generate", &file, "--check", "--quiet", "--no-color"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("expected 2 arguments, but got 1"), "{}", stderr);
}

#[test]
fn save_writes_state() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_workspace(dir.path(), "scoping/restrict_send.test.vispi");
    let saved = dir.path().join("saved.vispi");

    let output = vispi(&["generate", &file, "--save", &saved.to_string_lossy()]);
    assert!(output.status.success());

    let text = std::fs::read_to_string(&saved).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["state"]["declaredMain"], true);
    assert_eq!(value["workspace"]["blocks"]["blocks"][0]["id"], "main");

    // The combined save loads back and generates the same text.
    let output = vispi(&[&saved.to_string_lossy(), "--snapshot"]);
    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snapshot["scopeStack"], serde_json::json!(["global"]));
    let output = vispi(&[&saved.to_string_lossy()]);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "$x. x'<x>. 0\n");
}

#[test]
fn config_file_turns_off_reordering() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_workspace(dir.path(), "processes/definitions_first.test.vispi");
    let config = dir.path().join("vispi.toml");
    std::fs::write(&config, "canonicalize = false\ndebounce_ms = 50\n").unwrap();

    let output = vispi(&["--config", &config.to_string_lossy(), &file]);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "$a. Echo(a)\nEcho(x) = x'<x>\n"
    );
}

#[test]
fn load_errors_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"blocks\": {\"blocks\": [ {\"type\": 3} ]}}").unwrap();

    let output = vispi(&["generate", &path.to_string_lossy(), "--no-color"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid workspace"));
}

#[test]
fn help_explains_config_keys() {
    let output = vispi(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("debounce_ms only affects sessions"), "{}", stdout);
}
