//! Integration tests for the odtmark CLI
//!
//! These tests build small `.odt` packages on disk and drive the binary and
//! the worker loop over them.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use odtmark_cli::run_worker;
use odtmark_odf::test_utils::{content_xml, OdtBuilder};
use tempfile::TempDir;

const BODY: &str = r#"<text:h text:outline-level="1">Report</text:h><text:p>See <text:a xlink:href="https://example.com/guide">the site</text:a>.</text:p><text:p><draw:frame draw:name="Logo"><draw:image xlink:href="Pictures/logo.png"/></draw:frame></text:p>"#;

fn write_odt(dir: &Path, name: &str) -> PathBuf {
    let bytes = OdtBuilder::new()
        .content(content_xml("", BODY))
        .file("Pictures/logo.png", b"\x89PNG logo bytes")
        .build()
        .unwrap();
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn odtmark() -> Command {
    Command::new(env!("CARGO_BIN_EXE_odtmark"))
}

#[test]
fn test_convert_to_file_extracts_assets() {
    let dir = TempDir::new().unwrap();
    let input = write_odt(dir.path(), "report.odt");
    let output = dir.path().join("report.md");

    let status = odtmark()
        .arg("convert")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let markdown = fs::read_to_string(&output).unwrap();
    assert_eq!(
        markdown,
        "# Report\n\nSee [the site](https://example.com/guide).\n\n![Logo](assets/logo.png)\n"
    );
    assert!(dir.path().join("assets/logo.png").exists());
}

#[test]
fn test_convert_json_reports_links() {
    let dir = TempDir::new().unwrap();
    let input = write_odt(dir.path(), "report.odt");

    let out = odtmark()
        .args(["convert", "--format", "json"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(out.status.success());

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["links"][0], "https://example.com/guide");
    assert!(json["markdown"].as_str().unwrap().starts_with("# Report"));
}

#[test]
fn test_sibling_config_is_used() {
    let dir = TempDir::new().unwrap();
    let input = write_odt(dir.path(), "report.odt");
    fs::write(
        dir.path().join("odtmark.toml"),
        "[[rewrite_rules]]\ntag = \"a\"\nmatch = \"^https://example\\\\.com/\"\nreplace = \"{{< ext \\\"$basename\\\" >}}\"\n",
    )
    .unwrap();

    let out = odtmark().arg("convert").arg(&input).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("See {{< ext \"guide\" >}}."), "{stdout}");
}

#[test]
fn test_corrupted_source_is_removed() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.odt");
    fs::write(&input, b"this is not a zip archive").unwrap();

    let out = odtmark().arg("convert").arg(&input).output().unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("corrupted archive"), "{stderr}");
    assert!(!input.exists());
}

#[test]
fn test_worker_round() {
    let dir = TempDir::new().unwrap();
    let input = write_odt(dir.path(), "report.odt");
    let output = dir.path().join("out").join("report.md");
    fs::create_dir_all(output.parent().unwrap()).unwrap();

    let request = serde_json::json!({
        "type": "convert",
        "payload": {
            "input": input,
            "output": output,
            "options": { "content_addressable_assets": true }
        }
    });
    let broken = serde_json::json!({
        "type": "convert",
        "payload": { "input": dir.path().join("missing.odt") }
    });
    let lines = format!("{request}\n{broken}\n");

    let mut replies = Vec::new();
    run_worker(lines.as_bytes(), &mut replies).unwrap();
    let replies: Vec<serde_json::Value> = String::from_utf8(replies)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(replies.len(), 2);
    let markdown = replies[0]["result"]["markdown"].as_str().unwrap();
    assert!(markdown.contains("![Logo](assets/"));
    assert!(!markdown.contains("logo.png"));
    assert_eq!(fs::read_to_string(&output).unwrap(), markdown);
    assert!(replies[1]["err"].as_str().unwrap().contains("not found"));
}
