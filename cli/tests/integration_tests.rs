use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

use tempfile::TempDir;

/// Application definition shared by the resolve tests.
const TOOL_YAML: &str = r#"name: tool
version: "0.3.0"
flags:
  - names: [v, value, val]
    kind: int
    default: "1"
  - names: [s, shell]
    kind: bool
commands:
  - name: deploy
    aliases: [d]
    flags:
      - names: [f]
        kind: bool
        required: true
      - names: [g, group]
        kind: string
        required: true
      - names: [t, token]
        kind: string
        env_vars: [FLAGSCOPE_TEST_TOKEN]
    subcommands:
      - name: status
        flags:
          - names: [w, watch]
            kind: duration
            default: 5s
"#;

fn write_definition(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("failed to write definition");
    path
}

fn flagscope(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_flagscope"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("FLAGSCOPE_TEST_TOKEN")
        .output()
        .expect("failed to run flagscope")
}

fn resolve_json(def: &Path, argv: &[&str]) -> Output {
    let mut args = vec!["resolve", "--def", def.to_str().unwrap(), "--format", "json", "--"];
    args.extend_from_slice(argv);
    flagscope(&args)
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ----------------------------------------------------------------------------
// validate
// ----------------------------------------------------------------------------

#[test]
fn test_validate_accepts_yaml_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = write_definition(&dir, "tool.yaml", TOOL_YAML);
    let json = write_definition(
        &dir,
        "mini.json",
        r#"{"name": "mini", "flags": [{"names": ["q", "quiet"], "kind": "bool"}]}"#,
    );

    let output = flagscope(&["validate", yaml.to_str().unwrap(), json.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Validated 2 definition file(s) with 2 command(s)."));
}

#[test]
fn test_validate_rejects_duplicate_flag_in_scope() {
    let dir = tempfile::tempdir().unwrap();
    let def = write_definition(
        &dir,
        "bad.yaml",
        "name: tool\nflags:\n  - names: [v, verbose]\n    kind: bool\n  - names: [v, version]\n",
    );

    let output = flagscope(&["validate", def.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("duplicate flag in scope: v"));
}

#[test]
fn test_validate_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let def = write_definition(&dir, "tool.toml", "name = \"tool\"\n");

    let output = flagscope(&["validate", def.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).starts_with("error: Failed to load"));
}

// ----------------------------------------------------------------------------
// resolve
// ----------------------------------------------------------------------------

#[test]
fn test_resolve_normalizes_aliases_at_root() {
    let dir = tempfile::tempdir().unwrap();
    let def = write_definition(&dir, "tool.yaml", TOOL_YAML);

    let output = resolve_json(&def, &["--val=5"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report = stdout_json(&output);
    let root = &report["lineage"][0];
    assert_eq!(root["command"], "tool");
    assert_eq!(root["values"]["v"], "5");
    assert_eq!(root["values"]["value"], "5");
    assert_eq!(root["values"]["val"], "5");
    let set_flags = root["set_flags"].as_array().unwrap();
    assert_eq!(set_flags.len(), 3);
    for alias in ["v", "value", "val"] {
        assert!(set_flags.contains(&serde_json::json!(alias)), "missing {alias}");
    }
}

#[test]
fn test_resolve_descends_into_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    let def = write_definition(&dir, "tool.yaml", TOOL_YAML);

    let output = resolve_json(
        &def,
        &["-s", "d", "-f", "--group=ops", "status", "--watch", "1m30s", "extra"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report = stdout_json(&output);
    let lineage = report["lineage"].as_array().unwrap();
    assert_eq!(lineage.len(), 3);
    assert_eq!(lineage[0]["command"], "status");
    assert_eq!(lineage[0]["values"]["w"], "1m 30s");
    assert_eq!(lineage[0]["args"], serde_json::json!(["extra"]));
    assert_eq!(lineage[1]["command"], "deploy");
    assert_eq!(lineage[1]["values"]["g"], "ops");
    assert_eq!(lineage[2]["command"], "tool");
    assert_eq!(lineage[2]["values"]["shell"], "true");
}

#[test]
fn test_resolve_reports_all_missing_required_flags() {
    let dir = tempfile::tempdir().unwrap();
    let def = write_definition(&dir, "tool.yaml", TOOL_YAML);

    let output = resolve_json(&def, &["deploy"]);
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains(r#"Required flags "f, group" not set"#),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn test_resolve_no_required_check_skips_validation() {
    let dir = tempfile::tempdir().unwrap();
    let def = write_definition(&dir, "tool.yaml", TOOL_YAML);

    let output = flagscope(&[
        "resolve",
        "--def",
        def.to_str().unwrap(),
        "--no-required-check",
        "--",
        "deploy",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[0] deploy"));
    assert!(stdout.contains("[1] tool"));
}

#[test]
fn test_resolve_rejects_two_forms_of_one_flag() {
    let dir = tempfile::tempdir().unwrap();
    let def = write_definition(&dir, "tool.yaml", TOOL_YAML);

    let output = resolve_json(&def, &["-v", "2", "--value", "3"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Cannot use two forms of the same flag"));
}

#[test]
fn test_resolve_rejects_undefined_flag() {
    let dir = tempfile::tempdir().unwrap();
    let def = write_definition(&dir, "tool.yaml", TOOL_YAML);

    let output = resolve_json(&def, &["--nope"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("flag provided but not defined: nope"));
}

#[test]
fn test_resolve_env_var_satisfies_required_check() {
    let dir = tempfile::tempdir().unwrap();
    let def = write_definition(
        &dir,
        "env.yaml",
        "name: tool\nflags:\n  - names: [k, key]\n    kind: string\n    required: true\n    env_vars: [FLAGSCOPE_TEST_KEY]\n",
    );

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_flagscope"))
        .args(["resolve", "--def", def.to_str().unwrap(), "--format", "json"])
        .env("FLAGSCOPE_TEST_KEY", "secret")
        .output()
        .expect("failed to run flagscope");
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report = stdout_json(&output);
    assert_eq!(report["lineage"][0]["values"]["key"], "secret");
    assert_eq!(report["lineage"][0]["set_flags"], serde_json::json!([]));
}

#[test]
fn test_resolve_shell_complete_is_inherited() {
    let dir = tempfile::tempdir().unwrap();
    let def = write_definition(&dir, "tool.yaml", TOOL_YAML);

    let output = flagscope(&[
        "resolve",
        "--def",
        def.to_str().unwrap(),
        "--format",
        "yaml",
        "--shell-complete",
        "--no-required-check",
        "--",
        "deploy",
        "status",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(report["shell_complete"], true);
    assert_eq!(report["lineage"][0]["command"], "status");
}

// ----------------------------------------------------------------------------
// describe
// ----------------------------------------------------------------------------

#[test]
fn test_describe_lists_command_flags() {
    let dir = tempfile::tempdir().unwrap();
    let def = write_definition(&dir, "tool.yaml", TOOL_YAML);

    let output = flagscope(&["describe", "--def", def.to_str().unwrap(), "d"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("tool deploy\n"));
    assert!(stdout.contains("-g, --group <string> [required]"));
    assert!(stdout.contains("-t, --token <string> [env: FLAGSCOPE_TEST_TOKEN]"));
}

#[test]
fn test_describe_unknown_command_fails() {
    let dir = tempfile::tempdir().unwrap();
    let def = write_definition(&dir, "tool.yaml", TOOL_YAML);

    let output = flagscope(&["describe", "--def", def.to_str().unwrap(), "deploy", "nope"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown command 'nope' under 'tool deploy'"));
}
