use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

const PROGRAM: &str = "let x = 2;\nprint(\"x=\", x);\n";

fn make_temp_dir(name: &str) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();

    let dir = std::env::temp_dir()
        .join("bbc_cli_tests")
        .join(format!("{}_{}_{}", name, std::process::id(), now));

    fs::create_dir_all(&dir).unwrap();
    dir
}

fn run(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bbc"))
        .args(args)
        .current_dir(cwd)
        .output()
        .unwrap()
}

#[test]
fn writes_default_output_file() {
    let dir = make_temp_dir("default_output");
    fs::write(dir.join("prog.bb"), PROGRAM).unwrap();

    let output = run(&["prog.bb", "--compact"], &dir);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let translated = fs::read_to_string(dir.join("out.c")).unwrap();
    assert_eq!(
        translated,
        "#include <stdio.h>\nint main(void){int x;x=2;printf(\"x=%d\",x);}\n"
    );
}

#[test]
fn writes_named_output_file() {
    let dir = make_temp_dir("named_output");
    fs::write(dir.join("prog.bb"), PROGRAM).unwrap();

    let output = run(&["prog.bb", "-o", "prog.c", "--pretty"], &dir);
    assert!(output.status.success());

    let translated = fs::read_to_string(dir.join("prog.c")).unwrap();
    assert!(translated.starts_with("#include <stdio.h>\n\nint main(void) {\n    int x;\n"));
    assert!(!dir.join("out.c").exists());
}

#[test]
fn writes_to_stdout() {
    let dir = make_temp_dir("stdout");
    fs::write(dir.join("prog.bb"), PROGRAM).unwrap();

    let output = run(&["prog.bb", "-o", "-", "--pretty"], &dir);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("    printf(\"x=%d\", x);\n"));
    assert!(!dir.join("out.c").exists());
}

#[test]
fn failed_translation_leaves_no_output() {
    let dir = make_temp_dir("failure");
    fs::write(dir.join("bad.bb"), "let x = 1;\ny = x;\n").unwrap();

    let output = run(&["bad.bb"], &dir);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Semantic error: Cannot assign to `y` before it is declared"));
    assert!(stderr.contains(" --> bad.bb:2:1"));
    assert!(!dir.join("out.c").exists());
}

#[test]
fn missing_input_argument() {
    let dir = make_temp_dir("missing_argument");

    let output = run(&[], &dir);
    assert!(!output.status.success());
    assert!(!dir.join("out.c").exists());
}

#[test]
fn unreadable_input_file() {
    let dir = make_temp_dir("unreadable");

    let output = run(&["nowhere.bb"], &dir);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cannot access the input file: nowhere.bb"));
}

#[test]
fn formats_are_exclusive() {
    let dir = make_temp_dir("exclusive");
    fs::write(dir.join("prog.bb"), PROGRAM).unwrap();

    let output = run(&["prog.bb", "--pretty", "--compact"], &dir);
    assert!(!output.status.success());
    assert!(!dir.join("out.c").exists());
}

#[test]
fn traces_go_to_stderr() {
    let dir = make_temp_dir("trace");
    fs::write(dir.join("prog.bb"), PROGRAM).unwrap();

    let output = run(
        &["prog.bb", "-o", "-", "--trace-tokens", "--trace-productions"],
        &dir,
    );
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[lex] keyword `let` at prog.bb:[1:1-1:3]"));
    assert!(stderr.contains("[parse] <declaration> at prog.bb:[1:1-1:3]"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("#include <stdio.h>"));
}
