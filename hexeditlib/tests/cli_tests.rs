#![cfg(feature = "cli")]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tempfile::TempDir;

const HEXEDIT_EXE: &str = env!("CARGO_BIN_EXE_hexedit");

fn fixture(content: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("fixture.bin");
    std::fs::write(&path, content).expect("Failed to write fixture");
    (dir, path)
}

#[test]
fn test_hexedit_shows_help() {
    // Act
    let output = Command::new(HEXEDIT_EXE)
        .arg("--help")
        .output()
        .expect("Failed to run hexedit");

    // Assert
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Usage") && stdout.contains("inspect"),
        "stdout did not look like help text:\n{stdout}"
    );
}

#[test]
fn test_hexedit_shows_info() {
    // Arrange
    let (_dir, path) = fixture(&[0u8; 1234]);

    // Act
    let output = Command::new(HEXEDIT_EXE)
        .arg("info")
        .arg(&path)
        .output()
        .expect("Failed to run hexedit");

    // Assert
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("1,234 bytes"),
        "stdout did not look like info text:\n{stdout}"
    );
}

#[test]
fn test_hexedit_info_missing_file() {
    // Arrange
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    // Act
    let output = Command::new(HEXEDIT_EXE)
        .arg("info")
        .arg(dir.path().join("missing.bin"))
        .output()
        .expect("Failed to run hexedit");

    // Assert
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Error"),
        "stderr did not contain expected error text:\n{stderr}"
    );
}

#[test]
fn test_hexedit_read_dump() {
    // Arrange
    let (_dir, path) = fixture(b"Hello, hexedit!\x00\x01");

    // Act
    let output = Command::new(HEXEDIT_EXE)
        .arg("read")
        .arg(&path)
        .args(["--offset", "0x0", "--length", "32"])
        .output()
        .expect("Failed to run hexedit");

    // Assert
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("0x0000_0000  48 65 6C 6C 6F")
            && stdout.contains("|Hello, hexedit!.|")
            && stdout.contains("0x0000_0010  01"),
        "stdout did not look like a dump:\n{stdout}"
    );
}

#[test]
fn test_hexedit_rejects_oversized_bytes_per_row() {
    // Arrange
    let (_dir, path) = fixture(b"ABCD");

    // Act
    let output = Command::new(HEXEDIT_EXE)
        .arg("read")
        .arg(&path)
        .args(["--bytes-per-row", "18446744073709551615"])
        .output()
        .expect("Failed to run hexedit");

    // Assert
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("--bytes-per-row") && !stderr.contains("panicked"),
        "stderr did not contain expected error text:\n{stderr}"
    );
}

#[test]
fn test_hexedit_read_wide_rows() {
    // Arrange
    let (_dir, path) = fixture(&[0xAB; 300]);

    // Act
    let output = Command::new(HEXEDIT_EXE)
        .arg("read")
        .arg(&path)
        .args(["--bytes-per-row", "256", "--length", "300"])
        .output()
        .expect("Failed to run hexedit");

    // Assert
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("0x0000_0100  AB"),
        "stdout did not wrap at 256 bytes:\n{stdout}"
    );
}

#[test]
fn test_hexedit_search_hex() {
    // Arrange
    let (_dir, path) = fixture(b"xxDEADxxDEAD");

    // Act
    let output = Command::new(HEXEDIT_EXE)
        .arg("search")
        .arg(&path)
        .args(["44 45 41 44", "--hex"])
        .output()
        .expect("Failed to run hexedit");

    // Assert
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Hits: 2")
            && stdout.contains("0x0000_0002")
            && stdout.contains("0x0000_0008"),
        "stdout did not list the hits:\n{stdout}"
    );
}

#[test]
fn test_hexedit_search_invalid_hex() {
    // Arrange
    let (_dir, path) = fixture(b"ABCD");

    // Act
    let output = Command::new(HEXEDIT_EXE)
        .arg("search")
        .arg(&path)
        .args(["4", "--hex"])
        .output()
        .expect("Failed to run hexedit");

    // Assert
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid search pattern"),
        "stderr did not contain expected error text:\n{stderr}"
    );
}

#[test]
fn test_hexedit_inspect_big_endian() {
    // Arrange
    let (_dir, path) = fixture(&[0x01, 0x02, 0x03, 0x04]);

    // Act
    let output = Command::new(HEXEDIT_EXE)
        .arg("inspect")
        .arg(&path)
        .args(["0", "--big-endian"])
        .output()
        .expect("Failed to run hexedit");

    // Assert
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Big Endian") && stdout.contains("16,909,060"),
        "stdout did not contain the big endian u32:\n{stdout}"
    );
}

#[test]
fn test_hexedit_patch_commits() {
    // Arrange
    let (_dir, path) = fixture(b"ABCD");

    // Act
    let output = Command::new(HEXEDIT_EXE)
        .arg("patch")
        .arg(&path)
        .args(["0x0=0x5A", "3=33"])
        .output()
        .expect("Failed to run hexedit");

    // Assert
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(std::fs::read(&path).ok(), Some(b"ZBC!".to_vec()));
}

#[test]
fn test_hexedit_patch_out_of_range_leaves_file() {
    // Arrange
    let (_dir, path) = fixture(b"ABCD");

    // Act
    let output = Command::new(HEXEDIT_EXE)
        .arg("patch")
        .arg(&path)
        .args(["0=0x00", "0x10=0x00"])
        .output()
        .expect("Failed to run hexedit");

    // Assert
    assert!(!output.status.success());
    assert_eq!(std::fs::read(&path).ok(), Some(b"ABCD".to_vec()));
}

#[test]
fn test_hexedit_export_c_to_file() {
    // Arrange
    let (dir, path) = fixture(&[0xDE, 0xAD]);
    let out_path = dir.path().join("out.h");

    // Act
    let output = Command::new(HEXEDIT_EXE)
        .arg("export")
        .arg(&path)
        .args(["--format", "c", "--output"])
        .arg(&out_path)
        .output()
        .expect("Failed to run hexedit");

    // Assert
    assert!(output.status.success());
    let text = std::fs::read_to_string(&out_path).expect("Export file missing");
    assert!(
        text.contains("unsigned char data[2]") && text.contains("0xDE, 0xAD"),
        "export did not look like C:\n{text}"
    );
}

#[test]
fn test_hexedit_serve_session() {
    // Arrange
    let (_dir, path) = fixture(b"ABCD");
    let requests = [
        r#"{"op":"apply_edit","offset":0,"value":90}"#,
        r#"{"op":"search","query":"BC"}"#,
        r#"{"op":"select_offset","offset":0}"#,
        r#"{"op":"apply_edit","offset":0,"value":300}"#,
        "not json",
        r#"{"op":"commit"}"#,
        r#"{"op":"undo"}"#,
    ];

    // Act
    let mut child = Command::new(HEXEDIT_EXE)
        .arg("serve")
        .arg(&path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to run hexedit");
    {
        let mut stdin = child.stdin.take().expect("No stdin");
        for req in requests {
            writeln!(stdin, "{req}").expect("Failed to write request");
        }
    }
    let output = child.wait_with_output().expect("Failed to wait for hexedit");

    // Assert
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let responses: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("Response is not JSON"))
        .collect();
    assert_eq!(responses.len(), requests.len());
    assert_eq!(responses[0]["kind"], "edited");
    assert_eq!(responses[1]["offsets"], serde_json::json!([1]));
    assert_eq!(responses[2]["result"]["uint8"], 90);
    assert_eq!(responses[3]["kind"], "error");
    assert_eq!(responses[4]["kind"], "error");
    assert_eq!(responses[5]["kind"], "committed");
    assert_eq!(responses[6]["kind"], "nothing_to_undo");
    assert_eq!(std::fs::read(&path).ok(), Some(b"ZBCD".to_vec()));
}
