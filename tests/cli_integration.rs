// CLI integration tests for repackage/inspect flows and exit codes.
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use zip::write::SimpleFileOptions;

const CONTAINER_MARK: &str = "com/alipay/sofa/ark/container/mark";
const PLUGIN_MARK: &str = "com/alipay/sofa/ark/plugin/mark";

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_arkpack");
    Command::new(exe)
}

fn parse_json(output: &[u8]) -> Value {
    let text = std::str::from_utf8(output).expect("utf8");
    serde_json::from_str(text.trim()).expect("valid json")
}

fn write_jar(dir: &Path, name: &str, entries: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut zip = zip::ZipWriter::new(File::create(&path).expect("create"));
    for entry in entries {
        zip.start_file(*entry, SimpleFileOptions::default())
            .expect("start");
        zip.write_all(entry.as_bytes()).expect("write");
    }
    zip.finish().expect("finish");
    path
}

fn library_flag(name: &str, path: &Path, scope: &str) -> String {
    format!("{name}={}:{scope}", path.display())
}

#[test]
fn repackage_flow_writes_output_and_reports_json() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    let source = write_jar(
        root,
        "app.jar",
        &["META-INF/MANIFEST.MF", "com/alipay/sofa/ark/bootstrap/Launcher.class"],
    );
    let container = write_jar(root, "container.jar", &[CONTAINER_MARK]);
    let plugin = write_jar(root, "plugin.jar", &[PLUGIN_MARK]);
    let out_dir = root.join("target");

    let output = cmd()
        .args(["repackage", "--source", source.to_str().unwrap()])
        .args(["--library", &library_flag("container.jar", &container, "runtime")])
        .args(["--library", &library_flag("plugin.jar", &plugin, "compile")])
        .args(["--output-dir", out_dir.to_str().unwrap(), "--final-name", "app-exec"])
        .output()
        .expect("repackage");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report = parse_json(&output.stdout);
    let expected_output = out_dir.join("app-exec.jar");
    assert_eq!(report["output"].as_str().unwrap(), expected_output.display().to_string());
    assert_eq!(report["bootstrap_entries"], 2);
    assert_eq!(report["nested"][0]["entry"], "SOFA-ARK/container/container.jar");
    assert_eq!(report["nested"][1]["entry"], "SOFA-ARK/plugin/plugin.jar");
    assert_eq!(report["nested"][1]["sha256"].as_str().unwrap().len(), 64);
    assert_eq!(report["classification"]["container"]["name"], "container.jar");
    assert!(report["written_at"].is_string());
    assert!(expected_output.is_file());
}

#[test]
fn inspect_reports_outcomes_in_input_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    let container = write_jar(root, "container.jar", &[CONTAINER_MARK]);
    write_jar(root, "plain.jar", &["a/B.class"]);
    let native = root.join("libnative.so");
    std::fs::write(&native, b"\x7fELF").expect("write");
    let manifest = root.join("libraries.json");
    std::fs::write(
        &manifest,
        r#"[
            {"name": "container.jar", "file": "container.jar"},
            {"name": "plain.jar", "file": "plain.jar", "scope": "compile"},
            {"name": "libnative.so", "file": "libnative.so"},
            {"name": "servlet.jar", "file": "missing.jar", "scope": "provided"}
        ]"#,
    )
    .expect("manifest");

    let output = cmd()
        .args(["inspect", "--libraries", manifest.to_str().unwrap()])
        .output()
        .expect("inspect");
    assert!(output.status.success());
    let value = parse_json(&output.stdout);
    let outcomes = value["libraries"]
        .as_array()
        .expect("libraries")
        .iter()
        .map(|lib| lib["outcome"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(outcomes, ["container", "library", "not_archive", "excluded"]);
    assert_eq!(value["container"]["file"], container.display().to_string());
    assert_eq!(value["plugins"].as_array().unwrap().len(), 0);
}

#[test]
fn missing_container_exit_code_and_no_output() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    let source = write_jar(root, "app.jar", &["META-INF/MANIFEST.MF"]);
    let plugin = write_jar(root, "plugin.jar", &[PLUGIN_MARK]);
    let out_dir = root.join("target");

    let output = cmd()
        .args(["repackage", "--source", source.to_str().unwrap()])
        .args(["--library", &library_flag("plugin.jar", &plugin, "runtime")])
        .args(["--output-dir", out_dir.to_str().unwrap(), "--final-name", "app"])
        .output()
        .expect("repackage");
    assert_eq!(output.status.code().unwrap(), 5);
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "Configuration");
    assert!(!out_dir.join("app.jar").exists());
}

#[test]
fn duplicate_container_exit_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    let source = write_jar(root, "app.jar", &["META-INF/MANIFEST.MF"]);
    let a = write_jar(root, "a.jar", &[CONTAINER_MARK]);
    let b = write_jar(root, "b.jar", &[CONTAINER_MARK]);

    let output = cmd()
        .args(["repackage", "--source", source.to_str().unwrap()])
        .args(["--library", &library_flag("a.jar", &a, "runtime")])
        .args(["--library", &library_flag("b.jar", &b, "runtime")])
        .args(["--output-dir", root.to_str().unwrap(), "--final-name", "out"])
        .output()
        .expect("repackage");
    assert_eq!(output.status.code().unwrap(), 4);
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "ClassificationConflict");
    assert_eq!(err["error"]["library"], "b.jar");
}

#[test]
fn pom_packaging_is_skipped() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    let output = cmd()
        .args(["repackage", "--source", root.join("absent.jar").to_str().unwrap()])
        .args(["--output-dir", root.to_str().unwrap(), "--final-name", "x"])
        .args(["--packaging", "pom"])
        .output()
        .expect("repackage");
    assert!(output.status.success());
    let value = parse_json(&output.stdout);
    assert_eq!(value["skipped"], true);
    assert_eq!(value["packaging"], "pom");
}

#[test]
fn usage_exit_code() {
    let output = cmd()
        .args(["inspect", "--library", "no-equals-sign"])
        .output()
        .expect("inspect");
    assert_eq!(output.status.code().unwrap(), 2);

    let output = cmd()
        .args(["repackage", "--bogus"])
        .output()
        .expect("repackage");
    assert_eq!(output.status.code().unwrap(), 2);
    assert_eq!(parse_json(&output.stderr)["error"]["kind"], "Usage");
}

#[test]
fn missing_source_exit_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    let output = cmd()
        .args(["repackage", "--source", root.join("absent.jar").to_str().unwrap()])
        .args(["--output-dir", root.to_str().unwrap(), "--final-name", "x"])
        .output()
        .expect("repackage");
    assert_eq!(output.status.code().unwrap(), 3);
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "Input");
    assert!(err["error"]["hint"].is_string());
}

#[test]
fn output_colliding_with_source_is_rejected() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    let source = write_jar(root, "app.jar", &["META-INF/MANIFEST.MF", "app/Main.class"]);
    let container = write_jar(root, "container.jar", &[CONTAINER_MARK]);
    let before = std::fs::read(&source).expect("read source");

    let output = cmd()
        .args(["repackage", "--source", source.to_str().unwrap()])
        .args(["--library", &library_flag("container.jar", &container, "runtime")])
        .args(["--output-dir", root.to_str().unwrap(), "--final-name", "app"])
        .output()
        .expect("repackage");
    assert_eq!(output.status.code().unwrap(), 2);
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "Usage");
    assert_eq!(std::fs::read(&source).expect("read source"), before);
}

#[test]
fn duplicate_nested_path_exit_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    let source = write_jar(root, "app.jar", &["META-INF/MANIFEST.MF"]);
    let container = write_jar(root, "container.jar", &[CONTAINER_MARK]);
    let first = write_jar(root, "first.jar", &[PLUGIN_MARK]);
    let second = write_jar(root, "second.jar", &[PLUGIN_MARK, "extra/A.class"]);

    let output = cmd()
        .args(["repackage", "--source", source.to_str().unwrap()])
        .args(["--library", &library_flag("container.jar", &container, "runtime")])
        .args(["--library", &library_flag("plugin.jar", &first, "runtime")])
        .args(["--library", &library_flag("plugin.jar", &second, "runtime")])
        .args(["--output-dir", root.join("target").to_str().unwrap(), "--final-name", "out"])
        .output()
        .expect("repackage");
    assert_eq!(output.status.code().unwrap(), 6);
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "LayoutConflict");
    assert_eq!(err["error"]["library"], "plugin.jar");
    assert_eq!(err["error"]["destination"], "SOFA-ARK/plugin/plugin.jar");
}

#[test]
fn unwritable_output_exit_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    let source = write_jar(root, "app.jar", &["META-INF/MANIFEST.MF"]);
    let container = write_jar(root, "container.jar", &[CONTAINER_MARK]);
    let blocker = root.join("target");
    std::fs::write(&blocker, b"not a directory").expect("write");

    let output = cmd()
        .args(["repackage", "--source", source.to_str().unwrap()])
        .args(["--library", &library_flag("container.jar", &container, "runtime")])
        .args(["--output-dir", blocker.to_str().unwrap(), "--final-name", "app"])
        .output()
        .expect("repackage");
    assert_eq!(output.status.code().unwrap(), 7);
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "Write");
    assert_eq!(err["error"]["path"], blocker.display().to_string());
    assert!(err["error"]["hint"].is_string());
}
