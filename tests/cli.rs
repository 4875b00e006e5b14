//! End-to-end tests of the `tlvq` binary: file and stdin input, output framing, exit codes.

use std::io::Write;
use std::process::{Command, Output, Stdio};

const HELLO_HEX: &str = "300a020105160548656c6c6f";

fn hello_bytes() -> Vec<u8> {
    vec![0x30, 0x0a, 0x02, 0x01, 0x05, 0x16, 0x05, b'H', b'e', b'l', b'l', b'o']
}

fn tlvq(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_tlvq"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn tlvq");
    // The child may exit before reading stdin (bad query, file input); a broken pipe is fine.
    let _ = child.stdin.take().expect("stdin").write_all(stdin);
    child.wait_with_output().expect("wait tlvq")
}

fn der_file() -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    f.write_all(&hello_bytes()).expect("write");
    f.flush().expect("flush");
    f
}

#[test]
fn text_output_from_file() {
    let f = der_file();
    let path = f.path().to_str().expect("utf8 path");
    let out = tlvq(&[".index(0).index(1)@utf8", path], b"");
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(out.stdout, b"Hello\n");
}

#[test]
fn binary_output_is_raw() {
    let out = tlvq(&[".index(0)@tlv"], &hello_bytes());
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(out.stdout, hello_bytes());
}

#[test]
fn hex_input_from_stdin() {
    let out = tlvq(&["--hex", ".index(0)@count", "-"], format!("{}\n", HELLO_HEX).as_bytes());
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(out.stdout, b"2\n");
}

#[test]
fn pretty_output() {
    let out = tlvq(&["--hex", ".index(0)@pretty"], HELLO_HEX.as_bytes());
    assert_eq!(out.status.code(), Some(0));
    let text = String::from_utf8(out.stdout).expect("utf8");
    assert_eq!(
        text,
        "SEQUENCE (constructed), length=10\n  INTEGER, length=1\n    5\n  IA5String, length=5\n    \"Hello\"\n"
    );
}

#[test]
fn exit_code_for_selection_failure() {
    let out = tlvq(&[".index(5)"], &hello_bytes());
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("out of bounds"), "{}", err);
}

#[test]
fn exit_code_for_bad_query() {
    let out = tlvq(&[".index("], &hello_bytes());
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn exit_code_for_malformed_input() {
    let out = tlvq(&[".index(0)"], &[0x30, 0x0b, 0x02]);
    assert_eq!(out.status.code(), Some(3));
    let out = tlvq(&["--hex", ".index(0)"], b"30 0");
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn max_depth_flag() {
    let out = tlvq(&["--max-depth", "0", ".index(0)@count"], &hello_bytes());
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn exit_code_for_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("missing.der");
    let out = tlvq(&[".index(0)", missing.to_str().expect("utf8 path")], b"");
    assert_eq!(out.status.code(), Some(4));
}
