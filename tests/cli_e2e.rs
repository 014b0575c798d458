//! End-to-end CLI tests for chatstitch.
//!
//! These tests run the actual binary against a small export in a tempdir and
//! check the files it writes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::{TempDir, tempdir};

// ============================================================================
// Test Fixtures
// ============================================================================

const EXPORT: &str = r#"{
  "name": "Test Chat",
  "type": "personal_chat",
  "id": 42,
  "messages": [
    {"id": 1, "type": "message", "date": "2024-01-15T10:30:00", "date_unixtime": "1705314600",
     "from": "Alice", "from_id": "user1", "text": "Album part one", "photo": "photos/a.jpg",
     "reactions": [{"type": "emoji", "count": 2, "emoji": "👍"}]},
    {"id": 2, "type": "message", "date": "2024-01-15T10:30:00", "date_unixtime": "1705314600",
     "from": "Alice", "from_id": "user1", "text": "Album part two", "photo": "photos/b.jpg",
     "reactions": [{"type": "emoji", "count": 3, "emoji": "👍"}]},
    {"id": 3, "type": "service", "date": "2024-01-15T10:31:00", "date_unixtime": "1705314660",
     "actor": "Bob", "actor_id": "user2", "action": "pin_message", "text": ""},
    {"id": 4, "type": "message", "date": "2024-01-15T10:32:00", "date_unixtime": "1705314720",
     "from": "Bob", "from_id": "user2", "text": ["Nice ", {"type": "bold", "text": "album"}],
     "reply_to_message_id": 2},
    {"id": 5, "type": "message", "date": "2024-01-15T10:33:00", "date_unixtime": "1705314780",
     "from": "Bob", "from_id": "user2", "text": "escape", "file": "../../etc/passwd"}
  ]
}"#;

/// Creates `<tmp>/export/result.json` with two photos next to it.
fn setup_export() -> TempDir {
    let dir = tempdir().expect("Failed to create temp dir");
    let export = dir.path().join("export");
    fs::create_dir_all(export.join("photos")).unwrap();
    fs::write(export.join("photos/a.jpg"), b"a").unwrap();
    fs::write(export.join("photos/b.jpg"), b"b").unwrap();
    fs::write(export.join("result.json"), EXPORT).unwrap();
    dir
}

fn chatstitch() -> Command {
    let mut cmd = Command::cargo_bin("chatstitch").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// Basic functionality
// ============================================================================

#[test]
fn test_default_output_next_to_export() {
    let dir = setup_export();
    let export = dir.path().join("export");

    chatstitch()
        .arg(export.join("result.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Done!"))
        .stdout(predicate::str::contains("Absorbed:  1"))
        .stdout(predicate::str::contains("Replies:   1 redirected"));

    let doc = read_json(&export.join("chatstitch_output.json"));
    let messages = doc["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["content"]["text"], "Album part one\n\nAlbum part two");
    assert_eq!(messages[0]["content"]["media"]["source_file"], "photos/a.jpg");
    assert_eq!(messages[0]["reactions"][0]["count"], 5);
    assert_eq!(messages[1]["content"]["text"], "Nice **album**");
    assert_eq!(messages[1]["reply_to_message_id"], 1);
    assert!(messages[2]["content"].get("media").is_none());

    assert_eq!(doc["author_map"]["U1"]["name"], "Alice");
    assert_eq!(doc["author_map"]["U2"]["id"], "user2");

    // only the first photo of the album is collected
    assert!(export.join("media/a.jpg").exists());
    assert!(!export.join("media/b.jpg").exists());
}

#[test]
fn test_explicit_output_and_media_dir() {
    let dir = setup_export();
    let out = dir.path().join("out/archive.json");
    let media = dir.path().join("collected");
    fs::create_dir_all(out.parent().unwrap()).unwrap();

    chatstitch()
        .arg(dir.path().join("export/result.json"))
        .arg("-o")
        .arg(&out)
        .arg("--media-dir")
        .arg(&media)
        .assert()
        .success();

    assert!(out.exists());
    assert!(media.join("a.jpg").exists());
}

// ============================================================================
// Output formats
// ============================================================================

#[test]
fn test_jsonl_format() {
    let dir = setup_export();

    chatstitch()
        .arg(dir.path().join("export/result.json"))
        .args(["--format", "jsonl"])
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join("export/chatstitch_output.jsonl")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    let first: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["author_id"], "U1");
}

#[test]
fn test_csv_format() {
    let dir = setup_export();

    chatstitch()
        .arg(dir.path().join("export/result.json"))
        .args(["-f", "csv"])
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join("export/chatstitch_output.csv")).unwrap();
    assert!(content.starts_with("MessageId;AuthorId;Timestamp;ReplyTo;Text;Media;Transcript"));
    assert!(content.contains("photos/a.jpg"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_init_writes_config_once() {
    let dir = tempdir().unwrap();

    chatstitch()
        .current_dir(dir.path())
        .arg("--init")
        .assert()
        .success()
        .stdout(predicate::str::contains("chatstitch_config.json"));

    let config = read_json(&dir.path().join("chatstitch_config.json"));
    assert_eq!(config["mark_media"], false);
    assert_eq!(config["transcription_model"], "small");

    chatstitch()
        .current_dir(dir.path())
        .arg("--init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = setup_export();
    let config = dir.path().join("bad.json");
    fs::write(&config, "{not json").unwrap();

    chatstitch()
        .arg(dir.path().join("export/result.json"))
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_marking_without_engine_falls_back_to_copy() {
    let dir = setup_export();

    chatstitch()
        .arg(dir.path().join("export/result.json"))
        .args(["--mark-media", "--transcribe"])
        .assert()
        .success()
        .stderr(predicate::str::contains("no marking service"));

    assert_eq!(
        fs::read(dir.path().join("export/media/a.jpg")).unwrap(),
        b"a"
    );
}

// ============================================================================
// Error handling
// ============================================================================

#[test]
fn test_missing_input_argument() {
    chatstitch().assert().failure();
}

#[test]
fn test_nonexistent_export() {
    let dir = tempdir().unwrap();

    chatstitch()
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_malformed_export() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("result.json");
    fs::write(&path, r#"{"messages": "#).unwrap();

    chatstitch()
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Telegram JSON"));
}
