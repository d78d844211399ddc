//! Runs the `unbundle` binary against bundles written to a temp directory.

#![allow(clippy::disallowed_methods)]

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Minified webpack bundle: module 0 requires module 1.
const BUNDLE: &str = "!function(e){var t={};function n(r){if(t[r])return t[r].exports;\
var o=t[r]={i:r,l:!1,exports:{}};return e[r].call(o.exports,o,o.exports,n),o.l=!0,o.exports}\
n.p=\"/assets/\";n(n.s=0)}({0:function(e,t,n){var a=n(1);t.answer=a.value},\
1:function(e,t,n){t.value=42}});\n";

fn unbundle(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("unbundle").unwrap();
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn project(source: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("app.js"), source).unwrap();
    temp
}

#[test]
fn writes_modules_into_dist() {
    let temp = project(BUNDLE);

    unbundle(temp.path()).arg("app.js").assert().success();

    let index = std::fs::read_to_string(temp.path().join("dist/index.js")).unwrap();
    assert!(index.contains(r#"var a=require("./1");"#));
    assert!(index.contains("exports.answer=a.value"));
    assert!(temp.path().join("dist/1.js").exists());
    assert!(temp.path().join("app.js.info.json").exists());
}

#[test]
fn dry_run_prints_the_path_table() {
    let temp = project(BUNDLE);

    unbundle(temp.path())
        .args(["app.js", "--dry-run"])
        .assert()
        .success()
        .stdout("0\tindex.js\n1\t1.js\n");

    assert!(!temp.path().join("dist").exists());
}

#[test]
fn known_paths_from_flags() {
    let temp = project(BUNDLE);

    unbundle(temp.path())
        .args(["app.js", "--known-path", "1=./lib/answer", "--dist", "out"])
        .assert()
        .success();

    let index = std::fs::read_to_string(temp.path().join("out/index.js")).unwrap();
    assert!(index.contains(r#"require("./lib/answer")"#));
    assert!(temp.path().join("out/lib/answer.js").exists());
}

#[test]
fn known_paths_from_config_file() {
    let temp = project(BUNDLE);
    std::fs::write(
        temp.path().join("unbundle.config.json"),
        r#"{ "knownPaths": { "1": "./answer/index" } }"#,
    )
    .unwrap();

    unbundle(temp.path())
        .args(["app.js", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1\tanswer/index.js"));
}

#[test]
fn packages_move_under_node_modules() {
    let temp = project(BUNDLE);

    unbundle(temp.path())
        .args(["app.js", "--package", "1=answer", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1\tnode_modules/answer/index.js"));
}

#[test]
fn missing_bundle_fails() {
    let temp = TempDir::new().unwrap();

    unbundle(temp.path())
        .arg("nope.js")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Bundle not found"));
}

#[test]
fn unrecognised_bundle_points_at_the_override() {
    let temp = project("console.log('hello');\n");

    unbundle(temp.path())
        .arg("app.js")
        .assert()
        .failure()
        .stderr(predicate::str::contains("bootstrapOffset"));
}

#[test]
fn invalid_package_name_is_rejected() {
    let temp = project(BUNDLE);

    unbundle(temp.path())
        .args(["app.js", "--package", "1=../up"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an npm package name"));
}

#[test]
fn quiet_run_prints_nothing_on_success() {
    let temp = project(BUNDLE);

    unbundle(temp.path())
        .args(["app.js", "--quiet"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}
