use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn zetri_run_demo_prints_plotted_points() {
    let mut cmd = Command::cargo_bin("zetri").expect("binary exists");
    cmd.arg("run").arg("demos/edge.zs");
    cmd.assert()
        .success()
        .stdout("[0:0:0]\n[1:0:0]\n[2:0:0]\n");
}

#[test]
fn zetri_eval_snippet() {
    let mut cmd = Command::cargo_bin("zetri").expect("binary exists");
    cmd.arg("eval")
        .arg("ZetriScript! [0:0:0]: drawPixel([1:2:3])! ZetriScript");
    cmd.assert().success().stdout("[1:2:3]\n");
}

#[test]
fn zetri_check_counts_statements() {
    let dir = tempdir().expect("create temp dir");
    let script = dir.path().join("loop.zs");
    fs::write(
        &script,
        "ZetriScript! [0:0:0]: goto [0:0:1]!\n[0:0:1]: goto [0:0:0]!\nZetriScript\n",
    )
    .expect("write script");

    let mut cmd = Command::cargo_bin("zetri").expect("binary exists");
    cmd.arg("check").arg(&script);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("ok: 2 statement(s)"));
}

#[test]
fn zetri_renders_syntax_errors_with_carets() {
    let dir = tempdir().expect("create temp dir");
    let script = dir.path().join("broken.zs");
    fs::write(&script, "ZetriScript!\n[0:0:0 goto\n").expect("write script");

    let mut cmd = Command::cargo_bin("zetri").expect("binary exists");
    cmd.arg("run").arg(&script);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Parser error at line 2, column 8"))
        .stderr(predicate::str::contains("[0:0:0 goto\n       ^^^^"));
}

#[test]
fn zetri_max_steps_cancels_loops() {
    let mut cmd = Command::cargo_bin("zetri").expect("binary exists");
    cmd.arg("eval")
        .arg("ZetriScript! [0:0:0]: goto [0:0:0]! ZetriScript")
        .arg("--max-steps")
        .arg("50");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("execution cancelled after 50 steps"));
}

#[test]
fn zetri_reports_missing_script() {
    let dir = tempdir().expect("create temp dir");
    let mut cmd = Command::cargo_bin("zetri").expect("binary exists");
    cmd.arg("run").arg(dir.path().join("absent.zs"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::starts_with("error: I/O error"));
}
