use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn setup(root: &Path, difficulty: u32) -> PathBuf {
    write_file(
        &root.join("bank/arith.yaml"),
        r#"difficulty: 1
text: "((COUNTER)). What is ((VAR,a,INT,2,9)) + 1?"
solution: "((COUNTER)). ((CALC,a,1,+,INT))"
---
difficulty: 1
text: "((COUNTER)). Name a prime."
solution: "((COUNTER)). 2"
---
difficulty: 2
text: "((COUNTER)). Factor 91."
solution: "((COUNTER)). 7 * 13"
"#,
    );
    let index = root.join("midterm.yaml");
    write_file(
        &index,
        &format!(
            r##"difficulty: {difficulty}
bank: bank
files: [text.md, solution.md]
course: Arithmetic
begin_text: "# ((course))\n"
parts:
  - arith: 2
"##
        ),
    );
    index
}

fn randexam(xdg: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("randexam"));
    cmd.env("XDG_CONFIG_HOME", xdg);
    cmd
}

#[test]
fn generate_writes_every_channel() {
    let tmp = tempdir().unwrap();
    let index = setup(tmp.path(), 2);

    randexam(tmp.path())
        .args(["generate", index.to_str().unwrap(), "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK   randexam generate"))
        .stdout(predicate::str::contains("edition:    0"))
        .stdout(predicate::str::contains("seed:       7"))
        .stdout(predicate::str::contains("questions:  2"))
        .stdout(predicate::str::contains("midterm_text.md"));

    let text = fs::read_to_string(tmp.path().join("midterm_text.md")).unwrap();
    assert!(text.starts_with("# Arithmetic\n"), "{text}");
    assert!(text.contains("1. ") && text.contains("2. "), "{text}");
    assert!(tmp.path().join("midterm_solution.md").exists());
}

#[test]
fn second_run_takes_the_next_edition() {
    let tmp = tempdir().unwrap();
    let index = setup(tmp.path(), 2);

    for _ in 0..2 {
        randexam(tmp.path()).args(["generate", index.to_str().unwrap()]).assert().success();
    }

    assert!(tmp.path().join("midterm_text.md").exists());
    assert!(tmp.path().join("midterm_text_1.md").exists());
    assert!(tmp.path().join("midterm_solution_1.md").exists());
}

#[test]
fn same_seed_and_edition_give_the_same_exam() {
    let tmp = tempdir().unwrap();
    let index = setup(tmp.path(), 3);
    let idx = index.to_str().unwrap();

    randexam(tmp.path())
        .args(["generate", idx, "--seed", "11", "--edition", "4", "--tolerance", "5"])
        .assert()
        .success();
    let first = fs::read_to_string(tmp.path().join("midterm_text_4.md")).unwrap();

    randexam(tmp.path())
        .args(["generate", idx, "--seed", "11", "--edition", "4", "--tolerance", "5"])
        .assert()
        .success();
    let second = fs::read_to_string(tmp.path().join("midterm_text_4.md")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn unreachable_target_exits_with_code_two() {
    let tmp = tempdir().unwrap();
    let index = setup(tmp.path(), 20);

    randexam(tmp.path())
        .args(["generate", index.to_str().unwrap(), "--tries", "5"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("FAIL randexam generate"))
        .stdout(predicate::str::contains("after 5 tries"))
        .stdout(predicate::str::contains("closest attempt"));

    assert!(!tmp.path().join("midterm_text.md").exists());
}

#[test]
fn accept_best_writes_the_closest_attempt() {
    let tmp = tempdir().unwrap();
    let index = setup(tmp.path(), 20);

    randexam(tmp.path())
        .args(["generate", index.to_str().unwrap(), "--tries", "5", "--accept-best"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK   randexam generate"))
        .stdout(predicate::str::contains("warning: no attempt within"));

    assert!(tmp.path().join("midterm_text.md").exists());
}

#[test]
fn missing_bank_fails() {
    let tmp = tempdir().unwrap();
    let index = tmp.path().join("exam.yaml");
    write_file(&index, "difficulty: 1\nbank: nowhere\nfiles: [a.md]\nparts: x\n");

    randexam(tmp.path())
        .args(["generate", index.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("FAIL randexam generate"));
}

#[test]
fn bank_flag_overrides_the_index() {
    let tmp = tempdir().unwrap();
    let index = setup(tmp.path(), 2);
    fs::rename(tmp.path().join("bank"), tmp.path().join("elsewhere")).unwrap();

    randexam(tmp.path())
        .args(["generate", index.to_str().unwrap()])
        .assert()
        .code(1);

    randexam(tmp.path())
        .args(["generate", index.to_str().unwrap(), "--bank"])
        .arg(tmp.path().join("elsewhere"))
        .assert()
        .success();
}
