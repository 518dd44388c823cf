// Command line behaviour of the multiresize binary.

use std::path::Path;

use assert_cmd::Command;
use image::{ImageBuffer, Rgb, RgbImage};
use predicates::prelude::*;
use tempfile::TempDir;

fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) {
    let img: RgbImage = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 64])
    });
    img.save(dir.join(name)).unwrap();
}

fn multiresize() -> Command {
    let mut cmd = Command::cargo_bin("multiresize").unwrap();
    cmd.env_remove("MULTIRESIZE_WORKERS").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_resizes_directory_with_default_variants() {
    let dir = TempDir::new().unwrap();
    write_jpeg(dir.path(), "a.jpg", 120, 80);
    write_jpeg(dir.path(), "b.jpg", 80, 120);

    multiresize()
        .arg("--quiet")
        .arg("--workers")
        .arg("2")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Elapsed time: \d+ms / file count: 2").unwrap());

    for stem in ["a", "b"] {
        for suffix in ["HIGH", "MEDIUM", "SMALL"] {
            assert!(dir.path().join(format!("Resize/{stem}-{suffix}.jpg")).is_file());
        }
    }
}

#[test]
fn test_sequential_with_custom_variant() {
    let dir = TempDir::new().unwrap();
    write_jpeg(dir.path(), "photo.jpg", 100, 50);

    multiresize()
        .args(["--sequential", "--quiet", "--variant", "THUMB:40x40:80"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("file count: 1"));

    let resize = dir.path().join("Resize");
    assert_eq!(image::image_dimensions(resize.join("photo-THUMB.jpg")).unwrap(), (40, 20));
    assert!(!resize.join("photo-HIGH.jpg").exists());
}

#[test]
fn test_json_report() {
    let dir = TempDir::new().unwrap();
    write_jpeg(dir.path(), "photo.jpg", 64, 48);

    let output = multiresize()
        .args(["--json", "-w", "1"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["processed_files"], 1);
    assert_eq!(report["variants_written"], 3);
    assert_eq!(report["workers"], 1);
    assert!(report["failures"].as_array().unwrap().is_empty());
    assert!(report["elapsed_ms"].is_u64());
}

#[test]
fn test_partial_failure_exit_code() {
    let dir = TempDir::new().unwrap();
    write_jpeg(dir.path(), "good.jpg", 64, 48);
    std::fs::write(dir.path().join("bad.jpg"), "garbage").unwrap();

    multiresize()
        .arg(dir.path())
        .arg("-Q")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("file count: 1"));
}

#[test]
fn test_missing_directory_fails() {
    let dir = TempDir::new().unwrap();

    multiresize()
        .arg(dir.path().join("missing"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_rejects_duplicate_variants() {
    let dir = TempDir::new().unwrap();

    multiresize()
        .args(["--variant", "A:10x10:50", "--variant", "A:20x20:60"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Suffix 'A' is already registered"));
}

#[test]
fn test_rejects_malformed_variant() {
    multiresize()
        .args(["--variant", "HIGH:900:95", "."])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("WIDTHxHEIGHT"));
}

#[test]
fn test_invalid_variant_quality_is_config_error() {
    let dir = TempDir::new().unwrap();

    multiresize()
        .args(["--variant", "HIGH:900x600:101"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("quality"));
}

#[test]
fn test_sequential_overrides_worker_environment() {
    let dir = TempDir::new().unwrap();
    write_jpeg(dir.path(), "photo.jpg", 64, 48);

    let output = multiresize()
        .env("MULTIRESIZE_WORKERS", "2")
        .args(["-s", "--json"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["workers"], 1);
    assert_eq!(report["processed_files"], 1);
}

#[test]
fn test_help_and_version_succeed() {
    multiresize()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--sequential"));
    multiresize().arg("--version").assert().success();
}

#[test]
fn test_rejects_zero_workers() {
    let dir = TempDir::new().unwrap();

    multiresize()
        .args(["--workers", "0"])
        .arg(dir.path())
        .assert()
        .code(1);
}

#[test]
fn test_example_config_round_trip() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("multiresize.yaml");

    multiresize()
        .arg("example-config")
        .arg("-o")
        .arg(&config)
        .assert()
        .success();
    assert!(config.is_file());

    multiresize()
        .arg("config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("HIGH 900x600 q95"));
}

#[test]
fn test_requires_directory() {
    multiresize().assert().code(1);
}
