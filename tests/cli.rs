//! Smoke tests for the `trisplit` binary.

use image::{ImageEncoder, Rgba, RgbaImage};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn trisplit(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trisplit"))
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_png(path: &Path, width: u32, height: u32) {
    let pixels = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255])
    });
    let file = std::fs::File::create(path).unwrap();
    image::codecs::png::PngEncoder::new(std::io::BufWriter::new(file))
        .write_image(pixels.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
}

#[test]
fn gen_config_prints_stock_file() {
    let tmp = TempDir::new().unwrap();
    let out = trisplit(tmp.path(), &["gen-config"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("[output]"));
    assert!(text.contains("archive_prefix = \"FarGonE_3split\""));
}

#[test]
fn split_writes_archive_and_report() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("wide.png"), 300, 120);

    let out = trisplit(tmp.path(), &["split", "wide.png", "--mode", "square", "--png", "--report"]);
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let text = stdout(&out);
    assert!(text.starts_with("Square \u{2022} PNG (100% Lossless)"));
    assert!(text.contains("3/3 segments ready"));
    assert!(tmp.path().join("split/FarGonE_3split_square_PNG.zip").exists());

    let report = std::fs::read_to_string(tmp.path().join("split/FarGonE_3split_square_PNG.json")).unwrap();
    let report: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(report["segments"][0]["output_size"]["width"], 100);
    assert_eq!(report["archive"], "FarGonE_3split_square_PNG.zip");
}

#[test]
fn all_writes_one_archive_per_mode() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("wide.png"), 90, 60);

    let out = trisplit(tmp.path(), &["--output", "out", "all", "wide.png"]);
    assert!(out.status.success());
    for mode in ["free", "grid", "square"] {
        let archive = tmp.path().join(format!("out/FarGonE_3split_{mode}.zip"));
        assert!(archive.exists(), "missing {}", archive.display());
    }
}

#[test]
fn config_file_changes_prefix() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("wide.png"), 60, 30);
    std::fs::write(
        tmp.path().join("trisplit.toml"),
        "[output]\narchive_prefix = \"banner\"\n",
    )
    .unwrap();

    let out = trisplit(tmp.path(), &["split", "wide.png"]);
    assert!(out.status.success());
    assert!(tmp.path().join("split/banner_free.zip").exists());
}

#[test]
fn jpeg_flag_overrides_png_config() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("wide.png"), 60, 30);
    std::fs::write(tmp.path().join("trisplit.toml"), "[output]\npng = true\n").unwrap();

    let out = trisplit(tmp.path(), &["split", "wide.png"]);
    assert!(out.status.success());
    assert!(tmp.path().join("split/FarGonE_3split_free_PNG.zip").exists());

    let out = trisplit(tmp.path(), &["split", "wide.png", "--jpeg"]);
    assert!(out.status.success());
    assert!(stdout(&out).starts_with("Free Split \u{2022} JPG (High Quality)"));
    assert!(tmp.path().join("split/FarGonE_3split_free.zip").exists());
}

#[test]
fn png_and_jpeg_flags_conflict() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("wide.png"), 60, 30);

    let out = trisplit(tmp.path(), &["split", "wide.png", "--png", "--jpeg"]);
    assert!(!out.status.success());
    assert!(!tmp.path().join("split").exists());
}

#[test]
fn plan_prints_geometry() {
    let tmp = TempDir::new().unwrap();
    write_png(&tmp.path().join("wide.png"), 1500, 900);

    let out = trisplit(tmp.path(), &["plan", "wide.png", "--mode", "grid"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("    Source: 1500\u{d7}900"));
    assert!(text.contains("    003 column 1000..1500"));
    assert!(!tmp.path().join("split").exists());
}

#[test]
fn non_image_fails_with_message() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("notes.txt"), "hello").unwrap();

    let out = trisplit(tmp.path(), &["split", "notes.txt"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Please select a valid image file"));
}
