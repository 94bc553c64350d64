//! End-to-end tests through the public library API.
//!
//! A 1500×900 PNG is written to a temp directory, decoded with the real
//! backend, split in every mode, encoded, and packaged. Each source column is
//! painted with its own red level so the tests can tell which column a
//! segment was cut from after JPEG round trips.

use image::{ImageEncoder, Rgba, RgbaImage};
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use trisplit::archive::{ArchiveError, Compression, Delivery, Packager, ZipArchiveWriter};
use trisplit::imaging::{Encoding, GRID_CANVAS, ImageBackend, RustBackend};
use trisplit::session::{Session, SessionSettings, SplitRun};
use trisplit::types::Mode;

const WIDTH: u32 = 1500;
const HEIGHT: u32 = 900;

fn write_source(path: &Path) {
    let pixels = RgbaImage::from_fn(WIDTH, HEIGHT, |x, _| {
        let column = (x / (WIDTH / 3)) as u8;
        Rgba([column * 100, 80, 160, 255])
    });
    let file = std::fs::File::create(path).unwrap();
    image::codecs::png::PngEncoder::new(std::io::BufWriter::new(file))
        .write_image(pixels.as_raw(), WIDTH, HEIGHT, image::ExtendedColorType::Rgba8)
        .unwrap();
}

fn column_in(blob: &[u8]) -> u8 {
    let frame = image::load_from_memory(blob).unwrap().into_rgba8();
    let centre = frame.get_pixel(frame.width() / 2, frame.height() / 2);
    (centre[0] as f32 / 100.0).round() as u8
}

fn decoded_sizes(run: &SplitRun) -> Vec<(u32, u32)> {
    run.segments
        .iter()
        .map(|s| {
            let frame = image::load_from_memory(&s.blob).unwrap();
            (frame.width(), frame.height())
        })
        .collect()
}

fn split(mode: Mode, png: bool) -> SplitRun {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("source.png");
    write_source(&path);

    let backend = Arc::new(RustBackend::new());
    let source = backend.load(&path).unwrap();
    let settings = SessionSettings {
        mode,
        png,
        ..SessionSettings::default()
    };
    let mut session = Session::new(backend, settings);
    session.load(source).unwrap();
    session.wait().unwrap().clone()
}

#[test]
fn grid_produces_three_portrait_frames() {
    let run = split(Mode::Grid, false);
    let expected = (GRID_CANVAS.width, GRID_CANVAS.height);
    assert_eq!(decoded_sizes(&run), vec![expected, expected, expected]);
}

#[test]
fn square_produces_three_500_squares() {
    let run = split(Mode::Square, false);
    assert_eq!(decoded_sizes(&run), vec![(500, 500), (500, 500), (500, 500)]);
}

#[test]
fn free_keeps_columns_as_is() {
    let run = split(Mode::Free, false);
    assert_eq!(decoded_sizes(&run), vec![(500, 900), (500, 900), (500, 900)]);
}

#[test]
fn segments_come_from_their_own_columns() {
    for mode in Mode::ALL {
        let run = split(mode, false);
        let names: Vec<&str> = run.segments.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["1.jpg", "2.jpg", "3.jpg"], "{mode}");
        for segment in &run.segments {
            assert_eq!(column_in(&segment.blob), segment.index as u8, "{mode}");
        }
    }
}

#[test]
fn png_run_is_lossless() {
    let run = split(Mode::Free, true);
    assert_eq!(run.format.encoding, Encoding::Png);
    let frame = image::load_from_memory(&run.segments[2].blob)
        .unwrap()
        .into_rgba8();
    assert_eq!(frame.get_pixel(10, 10), &Rgba([200, 80, 160, 255]));
}

#[test]
fn archive_bundles_the_run() {
    let run = split(Mode::Square, true);
    let packager = Packager::zip("FarGonE_3split", Compression::Deflated);

    let Delivery::Archive { name, bytes } = packager.package(&run) else {
        panic!("expected an archive");
    };
    assert_eq!(name, "FarGonE_3split_square_PNG.zip");

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 3);
    for (i, segment) in run.segments.iter().enumerate() {
        let mut entry = archive.by_index(i).unwrap();
        assert_eq!(entry.name(), segment.name);
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert_eq!(content, segment.blob);
    }
}

#[test]
fn unavailable_archiver_still_delivers_three_files() {
    let run = split(Mode::Grid, false);
    let packager: Packager<ZipArchiveWriter> = Packager::new("FarGonE_3split", || {
        Err(ArchiveError::Unavailable("no archiver".to_string()))
    });

    let delivery = packager.package(&run);
    assert!(delivery.is_fallback());

    let out = TempDir::new().unwrap();
    let paths = delivery.write_to(out.path()).unwrap();
    assert_eq!(paths.len(), 3);
    for (path, segment) in paths.iter().zip(&run.segments) {
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), segment.name);
        assert_eq!(std::fs::read(path).unwrap(), segment.blob);
    }
}

#[test]
fn non_image_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("notes.txt");
    std::fs::write(&path, "not an image").unwrap();

    let err = RustBackend::new().load(&path).unwrap_err();
    assert!(err.to_string().starts_with("Please select a valid image file"));
}
