//! Compile-flow integration tests driving a scripted stand-in for the
//! external compiler. The scripts write artifacts relative to their
//! working directory, which also exercises the cwd-equals-artifact-dir
//! invocation contract.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zkpipe_compiler::{CircuitCompiler, CircuitSource, CompileError, CompileOptions};
use zkpipe_core::{CircuitName, ToolchainConfig, WorkspaceConfig};

const MULTIPLIER2: &str = r#"
pragma circom 2.1.6;

template Multiplier2() {
    signal input a;
    signal input b;
    signal output c;
    c <== a * b;
}

component main = Multiplier2();
"#;

fn write_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn compiler_with(tool: PathBuf, tmp: &TempDir) -> CircuitCompiler {
    let workspace = WorkspaceConfig::new(tmp.path().join("ws"));
    let toolchain = ToolchainConfig {
        circom_bin: tool,
        ..ToolchainConfig::default()
    };
    CircuitCompiler::new(workspace, toolchain)
}

fn source(name: &str) -> CircuitSource {
    CircuitSource {
        name: CircuitName::new(name).unwrap(),
        source: MULTIPLIER2.to_string(),
        options: CompileOptions::default(),
    }
}

const HAPPY_TOOL: &str = r#"
base=$(basename "$1" .circom)
echo "template instances: 1"
echo "non-linear constraints: 1"
echo "linear constraints: 0"
echo "public inputs: 0"
echo "private inputs: 2"
echo "public outputs: 1"
echo "wires: 4"
printf '1,1,0,main.c\n2,2,0,main.a\n3,3,0,main.b\n' > "$base.sym"
mkdir -p "${base}_js"
: > "${base}_js/${base}.wasm"
: > "$base.r1cs"
"#;

#[tokio::test]
async fn compile_discovers_artifacts_and_stats() {
    let tmp = TempDir::new().unwrap();
    let tool = write_tool(tmp.path(), "circom", HAPPY_TOOL);
    let compiler = compiler_with(tool, &tmp);

    let set = compiler.compile(&source("Multiplier2")).await.unwrap();
    assert!(set.r1cs.exists());
    assert!(set.wasm.exists());
    assert!(set.sym.exists());
    assert_eq!(set.stats.non_linear_constraints, 1);
    assert_eq!(set.stats.wires, 4);
    assert_eq!(set.stats.private_inputs, 2);
    assert_eq!(set.stats.main_signals, vec!["c", "a", "b"]);
}

#[tokio::test]
async fn identical_compiles_yield_identical_stats() {
    let tmp = TempDir::new().unwrap();
    let tool = write_tool(tmp.path(), "circom", HAPPY_TOOL);
    let compiler = compiler_with(tool, &tmp);

    let first = compiler.compile(&source("Multiplier2")).await.unwrap();
    let second = compiler.compile(&source("Multiplier2")).await.unwrap();
    assert_eq!(first.stats, second.stats);
}

#[tokio::test]
async fn artifact_set_round_trips_persisted_stats() {
    let tmp = TempDir::new().unwrap();
    let tool = write_tool(tmp.path(), "circom", HAPPY_TOOL);
    let compiler = compiler_with(tool, &tmp);

    let compiled = compiler.compile(&source("Multiplier2")).await.unwrap();
    let fetched = compiler
        .artifact_set(&CircuitName::new("Multiplier2").unwrap())
        .await
        .unwrap();
    assert_eq!(fetched.stats, compiled.stats);
    assert_eq!(fetched.r1cs, compiled.r1cs);
}

#[tokio::test]
async fn classified_errors_fail_despite_clean_exit() {
    let tmp = TempDir::new().unwrap();
    let tool = write_tool(
        tmp.path(),
        "circom",
        r#"
echo "error[P1001]: something broke"
echo "  --> line 4"
exit 0
"#,
    );
    let compiler = compiler_with(tool, &tmp);

    let err = compiler.compile(&source("Broken")).await.unwrap_err();
    match err {
        CompileError::Diagnostics { errors, formatted } => {
            assert_eq!(errors, vec!["error[P1001]: something broke"]);
            assert_eq!(formatted, "error[P1001]: something broke\n  --> line 4");
        }
        other => panic!("expected diagnostics error, got {other:?}"),
    }
}

#[tokio::test]
async fn clean_exit_without_artifacts_is_missing_artifact() {
    let tmp = TempDir::new().unwrap();
    let tool = write_tool(tmp.path(), "circom", "exit 0\n");
    let compiler = compiler_with(tool, &tmp);

    let err = compiler.compile(&source("Silent")).await.unwrap_err();
    assert!(matches!(err, CompileError::ArtifactMissing { .. }), "{err}");
}

#[tokio::test]
async fn precheck_failure_never_spawns_the_tool() {
    let tmp = TempDir::new().unwrap();
    let marker = tmp.path().join("tool-was-invoked");
    let tool = write_tool(
        tmp.path(),
        "circom",
        &format!(": > {}\nexit 0\n", marker.display()),
    );
    let compiler = compiler_with(tool, &tmp);

    let src = CircuitSource {
        name: CircuitName::new("NoTemplate").unwrap(),
        source: "pragma circom 2.1.6;\ncomponent main = Missing();\n".to_string(),
        options: CompileOptions::default(),
    };
    let err = compiler.compile(&src).await.unwrap_err();
    match err {
        CompileError::Precheck(msg) => assert_eq!(msg, "no template declaration found"),
        other => panic!("expected precheck error, got {other:?}"),
    }
    assert!(!marker.exists(), "tool must not have been invoked");
}

#[tokio::test]
async fn missing_tool_reports_spawn_error() {
    let tmp = TempDir::new().unwrap();
    let compiler = compiler_with(PathBuf::from("/nonexistent/circom"), &tmp);

    let err = compiler.compile(&source("Multiplier2")).await.unwrap_err();
    match err {
        CompileError::Spawn { tool, .. } => assert!(tool.contains("/nonexistent/circom")),
        other => panic!("expected spawn error, got {other:?}"),
    }
}

#[tokio::test]
async fn recompile_replaces_previous_artifact_directory() {
    let tmp = TempDir::new().unwrap();
    let tool = write_tool(tmp.path(), "circom", HAPPY_TOOL);
    let compiler = compiler_with(tool, &tmp);

    let set = compiler.compile(&source("Multiplier2")).await.unwrap();
    let leftover = set.dir.join("leftover.txt");
    std::fs::write(&leftover, b"stale").unwrap();

    compiler.compile(&source("Multiplier2")).await.unwrap();
    assert!(!leftover.exists(), "artifact dir must be recreated");
}
