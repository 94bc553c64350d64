//! Archive packaging with per-file fallback.
//!
//! A finalized [`SplitRun`] is bundled into one zip named after its mode and
//! format. The archive writer is resolved lazily on the first packaging
//! request and cached for the life of the [`Packager`]; a writer that fails
//! to load stays failed (no retry loop).
//!
//! Packaging never fails outright. If the writer can't be loaded or the
//! archive can't be serialized, the run is delivered as its three individual
//! files together with a notice for the user.

use crate::naming::archive_filename;
use crate::session::SplitRun;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Archive writer unavailable: {0}")]
    Unavailable(String),
}

/// A named blob to place in an archive.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveEntry<'a> {
    pub name: &'a str,
    pub bytes: &'a [u8],
}

/// Serializes named blobs into a single archive blob.
pub trait ArchiveWriter: Send + Sync {
    fn write(&self, entries: &[ArchiveEntry<'_>]) -> Result<Vec<u8>, ArchiveError>;
}

/// How zip entries are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Stored,
    #[default]
    Deflated,
}

/// [`ArchiveWriter`] producing zip files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveWriter {
    compression: Compression,
}

impl ZipArchiveWriter {
    pub fn new(compression: Compression) -> Self {
        Self { compression }
    }
}

impl ArchiveWriter for ZipArchiveWriter {
    fn write(&self, entries: &[ArchiveEntry<'_>]) -> Result<Vec<u8>, ArchiveError> {
        let method = match self.compression {
            Compression::Stored => zip::CompressionMethod::Stored,
            Compression::Deflated => zip::CompressionMethod::Deflated,
        };
        let options = zip::write::SimpleFileOptions::default().compression_method(method);

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for entry in entries {
            zip.start_file(entry.name, options)?;
            zip.write_all(entry.bytes)?;
        }
        Ok(zip.finish()?.into_inner())
    }
}

/// A file handed to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// What the user receives for a finalized run.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// One archive holding all three segments.
    Archive { name: String, bytes: Vec<u8> },
    /// The segments one by one, after packaging failed.
    Individual {
        files: Vec<DeliveredFile>,
        notice: String,
    },
}

impl Delivery {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Delivery::Individual { .. })
    }

    /// Write the delivery into `dir`, creating it if needed.
    ///
    /// Returns the written paths in delivery order.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
        std::fs::create_dir_all(dir)?;
        match self {
            Delivery::Archive { name, bytes } => {
                let path = dir.join(name);
                std::fs::write(&path, bytes)?;
                Ok(vec![path])
            }
            Delivery::Individual { files, .. } => files
                .iter()
                .map(|file| {
                    let path = dir.join(&file.name);
                    std::fs::write(&path, &file.bytes)?;
                    Ok(path)
                })
                .collect(),
        }
    }
}

type WriterLoader<W> = Box<dyn Fn() -> Result<W, ArchiveError> + Send + Sync>;

/// Packages finalized runs, resolving its writer on first use.
pub struct Packager<W> {
    prefix: String,
    loader: WriterLoader<W>,
    writer: OnceLock<Result<W, String>>,
}

impl Packager<ZipArchiveWriter> {
    /// Zip packager; the writer needs no setup, so loading always succeeds.
    pub fn zip(prefix: impl Into<String>, compression: Compression) -> Self {
        Self::new(prefix, move || Ok(ZipArchiveWriter::new(compression)))
    }
}

impl<W: ArchiveWriter> Packager<W> {
    pub fn new(
        prefix: impl Into<String>,
        loader: impl Fn() -> Result<W, ArchiveError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            loader: Box::new(loader),
            writer: OnceLock::new(),
        }
    }

    /// Archive file name for `run`.
    pub fn archive_name(&self, run: &SplitRun) -> String {
        archive_filename(&self.prefix, run.mode, run.format.encoding)
    }

    /// The writer, loading it on first call.
    pub fn writer(&self) -> Result<&W, ArchiveError> {
        let loaded = self.writer.get_or_init(|| {
            log::debug!("loading archive writer");
            (self.loader)().map_err(|e| e.to_string())
        });
        match loaded {
            Ok(writer) => Ok(writer),
            Err(reason) => Err(ArchiveError::Unavailable(reason.clone())),
        }
    }

    /// Bundle `run` into an archive, or fall back to its individual files.
    pub fn package(&self, run: &SplitRun) -> Delivery {
        let name = self.archive_name(run);
        match self.build(run) {
            Ok(bytes) => {
                log::info!("packaged run {} as {} ({} bytes)", run.id, name, bytes.len());
                Delivery::Archive { name, bytes }
            }
            Err(e) => {
                log::warn!("packaging {} failed: {}", name, e);
                Delivery::Individual {
                    files: run
                        .segments
                        .iter()
                        .map(|s| DeliveredFile {
                            name: s.name.clone(),
                            bytes: s.blob.clone(),
                        })
                        .collect(),
                    notice: format!("Archive failed ({e}), saving files individually"),
                }
            }
        }
    }

    fn build(&self, run: &SplitRun) -> Result<Vec<u8>, ArchiveError> {
        let entries: Vec<ArchiveEntry<'_>> = run
            .segments
            .iter()
            .map(|s| ArchiveEntry {
                name: &s.name,
                bytes: &s.blob,
            })
            .collect();
        self.writer()?.write(&entries)
    }
}
