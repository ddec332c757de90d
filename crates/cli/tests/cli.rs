use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

#[allow(deprecated)]
fn codedoc() -> Command {
    let mut cmd = Command::cargo_bin("codedoc").expect("binary");
    cmd.env_remove("CODEDOC_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn setup_project() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("pkg")).unwrap();
    fs::create_dir_all(root.join("node_modules/dep")).unwrap();
    fs::write(
        root.join("pkg/shapes.py"),
        "class Shape:\n    def area(self) -> float:\n        return 0.0\n",
    )
    .unwrap();
    fs::write(root.join("pkg/app.ts"), "function main() {}\n").unwrap();
    fs::write(root.join("node_modules/dep/index.js"), "function hidden() {}\n").unwrap();
    fs::write(root.join("notes.proto"), "syntax = \"proto3\";\n").unwrap();
    temp
}

fn ingest_json(workdir: &std::path::Path, args: &[&str]) -> Value {
    let output = codedoc()
        .current_dir(workdir)
        .arg("--quiet")
        .arg("ingest")
        .args(args)
        .output()
        .expect("command run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn render_reads_stdin() {
    codedoc()
        .arg("render")
        .write_stdin("### Title\nbody")
        .assert()
        .success()
        .stdout("<h3>Title</h3>\n<p>\nbody\n</p>\n");
}

#[test]
fn render_reads_file() {
    let temp = tempdir().unwrap();
    let input = temp.path().join("answer.md");
    fs::write(&input, "- one\n- two\n").unwrap();

    codedoc()
        .arg("render")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("<ul>\n<li>one</li>\n<li>two</li>\n</ul>"));
}

#[test]
fn ingest_directory_outlines_files() {
    let temp = setup_project();
    let body = ingest_json(temp.path(), &["."]);

    let files = body["files"].as_array().expect("files array");
    let paths: Vec<&str> = files.iter().filter_map(|f| f["path"].as_str()).collect();
    assert_eq!(paths, vec!["pkg/app.ts", "pkg/shapes.py"]);

    let shapes = &files[1];
    assert_eq!(shapes["analysis"]["language"], "python");
    assert_eq!(shapes["analysis"]["classes"][0]["name"], "Shape");
    assert_eq!(
        shapes["analysis"]["classes"][0]["methods"][0]["enclosing_class"],
        "Shape"
    );

    assert_eq!(body["metrics"]["files_processed"], 2);
    assert_eq!(body["metrics"]["total_functions"], 2);
    assert_eq!(body["metrics"]["total_classes"], 1);
    assert_eq!(body["stats"]["filtered"], 1);
}

#[test]
fn ingest_files_without_analysis() {
    let temp = setup_project();
    let body = ingest_json(temp.path(), &["--no-analysis", "pkg/shapes.py", "pkg/app.ts"]);

    let files = body["files"].as_array().expect("files array");
    assert_eq!(files[0]["path"], "pkg/shapes.py");
    assert_eq!(files[0]["extension"], "py");
    assert!(files.iter().all(|f| f.get("analysis").is_none()));
    assert_eq!(body["metrics"]["total_lines"], 4);
}

#[test]
fn config_file_extends_extensions() {
    let temp = setup_project();
    fs::write(temp.path().join("codedoc.toml"), "extra_extensions = [\"proto\"]\n").unwrap();

    let body = ingest_json(temp.path(), &["--config", "codedoc.toml", "."]);
    let paths: Vec<&str> = body["files"]
        .as_array()
        .expect("files array")
        .iter()
        .filter_map(|f| f["path"].as_str())
        .collect();
    assert!(paths.contains(&"notes.proto"), "{paths:?}");
}

#[test]
fn invalid_repository_url_fails_fast() {
    codedoc()
        .arg("ingest")
        .arg("https://example.com/user/repo")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid repository URL"));
}

#[test]
fn undecodable_upload_fails() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("bad.py"), [0xffu8, 0xfe, 0x00]).unwrap();

    codedoc()
        .current_dir(temp.path())
        .arg("ingest")
        .arg("bad.py")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid UTF-8"));
}

#[test]
fn unsupported_only_inputs_report_no_files() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("image.png"), [0x89u8, 0x50]).unwrap();

    codedoc()
        .current_dir(temp.path())
        .arg("ingest")
        .arg("image.png")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No supported files found"));
}
