use std::{
    fs,
    io::Write,
    process::{Command, Output, Stdio},
};

fn knot(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_knot"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn knot");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn text_square_default_template() {
    let output = knot(&["text"], "1R1R1R1\n");
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 13);
    assert_eq!(lines[0], "0 0.0 0.0 0.0");
    assert_eq!(lines[12], "12 0.0 0.0 0.0");
}

#[test]
fn text_square_custom_format() {
    let output = knot(&["text", "--format", "{0} {1:.6f} {2:.6f}"], "1R1R1R1");
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[1], "1 0.250000 0.250000");
    assert_eq!(lines[3], "3 1.000000 0.000000");
}

#[test]
fn text_reads_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("square.moves");
    fs::write(&input, "1R1R1R1\n").unwrap();

    let output = knot(&["text", "-i", input.to_str().unwrap()], "");
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output).lines().count(), 13);
}

#[test]
fn binary_square_layout() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("square.bin");

    let output = knot(&["binary", "-o", dest.to_str().unwrap()], "1R1R1R1");
    assert!(output.status.success(), "{output:?}");
    assert!(output.stdout.is_empty());

    let blob = fs::read(&dest).unwrap();
    assert_eq!(blob.len(), 420);
    assert_eq!(i32::from_be_bytes(blob[..4].try_into().unwrap()), 52);
    // Every record ends with w = 1.0.
    for record in blob[4..].chunks(32) {
        assert_eq!(f64::from_be_bytes(record[24..].try_into().unwrap()), 1.0);
    }
}

#[test]
fn rejects_trailing_move() {
    let output = knot(&["text"], "1R1U1L1D");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must end with a magnitude"), "{stderr}");

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("never.bin");
    let output = knot(&["binary", "-o", dest.to_str().unwrap()], "1R1U1L1D");
    assert!(!output.status.success());
    assert!(!dest.exists());
}

#[test]
fn rejects_whitespace_inside_a_line() {
    let output = knot(&["text"], "1 2R3\n");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unexpected character ' ' at line 1, column 2"), "{stderr}");

    // Whitespace around each line is trimmed.
    let output = knot(&["text"], "  1R1\t\n R1R1 \n");
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output).lines().count(), 13);
}

#[test]
fn rejects_invalid_format() {
    let output = knot(&["text", "--format", "{0} {4}"], "1R1R1R1");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn template_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("knot.toml");
    fs::write(&config, "[text]\ntemplate = \"v {1:.1f} {2:.1f} {3:.1f}\"\n").unwrap();

    let output = knot(&["--config", config.to_str().unwrap(), "text"], "1R1R1R1");
    assert!(output.status.success(), "{output:?}");
    let text = stdout(&output);
    assert_eq!(text.lines().next(), Some("v 0.0 0.0 0.0"));
    assert_eq!(text.lines().nth(3), Some("v 1.0 0.0 0.0"));
}

#[test]
fn output_is_deterministic() {
    let first = knot(&["text"], "2R1U1R2R1D1");
    let second = knot(&["text"], "2R1U1R2R1D1");
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn binary_output_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.bin");
    let second = dir.path().join("second.bin");

    for dest in [&first, &second] {
        let output = knot(&["binary", "-o", dest.to_str().unwrap()], "2R1U1R2R1D1");
        assert!(output.status.success(), "{output:?}");
    }

    let first = fs::read(&first).unwrap();
    assert_eq!(first.len(), 4 + 13 * 32);
    assert_eq!(first, fs::read(&second).unwrap());
}
