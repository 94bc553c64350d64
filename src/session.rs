//! Split orchestration.
//!
//! A [`Session`] owns everything one user works with: the loaded image, the
//! selected [`Mode`], the PNG toggle and the current run. Changing any of them
//! starts a new run that supersedes the previous one.
//!
//! ## Run lifecycle
//!
//! ```text
//! start()  ─ render 0 → spawn encode 0
//!          ─ render 1 → spawn encode 1        (sequential, calling thread)
//!          ─ render 2 → spawn encode 2
//!
//! rayon pool: encode i … send Completion { run, spec, outcome }   (any order)
//!
//! wait()/poll() ─ RunCollector for the *current* run id
//!                 ├ other run id  → dropped (superseded)
//!                 ├ slot filled   → Pending(n)
//!                 └ third slot    → Complete → SplitRun (armed)
//! ```
//!
//! Frames are rendered one at a time on the calling thread and moved into
//! their encode job, so an encode owns its frame exclusively and never sees
//! another segment's pixels.
//!
//! Completions travel over one long-lived channel, so results of a superseded
//! run can still arrive after a new run started. Every completion is tagged
//! with its [`RunId`] and the collector of the current run only counts its own.
//! The segment name comes from the segment's index, never from arrival order.

use crate::imaging::{
    BackendError, Dimensions, GeometryError, ImageBackend, OutputFormat, SEGMENT_COUNT,
    SegmentSpec, ShortSourcePolicy, SourceImage, calculate_segments, render_frame,
};
use crate::naming::segment_filename;
use crate::types::Mode;
use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("No image loaded")]
    NoSource,
    #[error("Invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("Rendering failed: {0}")]
    Render(#[source] BackendError),
    #[error("Segment {} failed to encode: {source}", .index + 1)]
    Encode { index: usize, source: BackendError },
    #[error("No split run is in progress")]
    Idle,
}

/// Identity of one split run within a session. Strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct RunId(u64);

impl RunId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One encoded segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentResult {
    pub index: usize,
    /// `1.jpg` … `3.png`, derived from `index`.
    pub name: String,
    pub spec: SegmentSpec,
    pub blob: Vec<u8>,
}

/// The three encoded segments of one (image, mode, format) combination.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRun {
    pub id: RunId,
    pub mode: Mode,
    pub format: OutputFormat,
    pub source: Dimensions,
    /// Ordered by index.
    pub segments: [SegmentResult; SEGMENT_COUNT],
}

/// Result of one encode job, as posted back to the session.
#[derive(Debug)]
pub struct Completion {
    pub run: RunId,
    pub spec: SegmentSpec,
    pub outcome: Result<Vec<u8>, BackendError>,
}

/// What a [`RunCollector`] did with an offered segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Belongs to another run; ignored.
    Stale,
    /// Slot already filled; ignored.
    Duplicate,
    /// Recorded; this many of three are in.
    Pending(usize),
    /// Recorded; all three are in.
    Complete,
}

/// Completion gate of a single run.
///
/// Holds one slot per segment index. Only segments tagged with this
/// collector's run id are accepted, and only a full set of slots finishes.
#[derive(Debug)]
pub struct RunCollector {
    run: RunId,
    mode: Mode,
    format: OutputFormat,
    source: Dimensions,
    slots: [Option<SegmentResult>; SEGMENT_COUNT],
    completed: usize,
}

impl RunCollector {
    pub fn new(run: RunId, mode: Mode, format: OutputFormat, source: Dimensions) -> Self {
        Self {
            run,
            mode,
            format,
            source,
            slots: [None, None, None],
            completed: 0,
        }
    }

    pub fn run(&self) -> RunId {
        self.run
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Offer an encoded segment to the gate.
    pub fn offer(&mut self, run: RunId, spec: SegmentSpec, blob: Vec<u8>) -> Gate {
        if run != self.run {
            return Gate::Stale;
        }
        let Some(slot) = self.slots.get_mut(spec.index) else {
            return Gate::Stale;
        };
        if slot.is_some() {
            return Gate::Duplicate;
        }
        *slot = Some(SegmentResult {
            index: spec.index,
            name: segment_filename(spec.index, self.format.encoding),
            spec,
            blob,
        });
        self.completed += 1;
        if self.completed == SEGMENT_COUNT {
            Gate::Complete
        } else {
            Gate::Pending(self.completed)
        }
    }

    /// The finished run, or `None` while any slot is empty.
    pub fn finish(self) -> Option<SplitRun> {
        let [first, second, third] = self.slots;
        Some(SplitRun {
            id: self.run,
            mode: self.mode,
            format: self.format,
            source: self.source,
            segments: [first?, second?, third?],
        })
    }
}

/// Progress published while a run is being produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitEvent {
    RunStarted {
        run: RunId,
        mode: Mode,
        format: OutputFormat,
        source: Dimensions,
    },
    SegmentEncoded {
        run: RunId,
        index: usize,
        name: String,
        size: Dimensions,
        bytes: usize,
    },
    RunFinalized {
        run: RunId,
        mode: Mode,
    },
}

/// Initial selections of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSettings {
    /// Mode selected whenever a new image is loaded.
    pub mode: Mode,
    pub png: bool,
    pub short_source: ShortSourcePolicy,
}

/// Session context: image, selections, and the current run.
pub struct Session<B: ImageBackend + 'static> {
    backend: Arc<B>,
    settings: SessionSettings,
    source: Option<Arc<SourceImage>>,
    mode: Mode,
    format: OutputFormat,
    last_run: u64,
    pending: Option<RunCollector>,
    current: Option<SplitRun>,
    completions_tx: Sender<Completion>,
    completions_rx: Receiver<Completion>,
    events: Option<Sender<SplitEvent>>,
}

impl<B: ImageBackend + 'static> Session<B> {
    pub fn new(backend: Arc<B>, settings: SessionSettings) -> Self {
        let (completions_tx, completions_rx) = mpsc::channel();
        Self {
            backend,
            settings,
            source: None,
            mode: settings.mode,
            format: OutputFormat::from_png_flag(settings.png),
            last_run: 0,
            pending: None,
            current: None,
            completions_tx,
            completions_rx,
            events: None,
        }
    }

    /// Publish progress events on `events`.
    pub fn with_events(mut self, events: Sender<SplitEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn source_dimensions(&self) -> Option<Dimensions> {
        self.source.as_ref().map(|s| s.dimensions())
    }

    /// The finalized run, if the current run has completed.
    pub fn current_run(&self) -> Option<&SplitRun> {
        self.current.as_ref()
    }

    /// Whether a finalized run is available for packaging.
    pub fn is_armed(&self) -> bool {
        self.current.is_some()
    }

    /// Replace the image, reset the mode to the session default, and start a run.
    pub fn load(&mut self, source: SourceImage) -> Result<RunId, SplitError> {
        log::info!("loaded {} source", source.dimensions());
        self.source = Some(Arc::new(source));
        self.mode = self.settings.mode;
        self.start()
    }

    /// Select a mode; starts a run when an image is loaded.
    pub fn select_mode(&mut self, mode: Mode) -> Result<Option<RunId>, SplitError> {
        self.mode = mode;
        self.restart_if_loaded()
    }

    /// Flip the PNG toggle; starts a run when an image is loaded.
    pub fn set_png(&mut self, png: bool) -> Result<Option<RunId>, SplitError> {
        self.format = OutputFormat::from_png_flag(png);
        self.restart_if_loaded()
    }

    fn restart_if_loaded(&mut self) -> Result<Option<RunId>, SplitError> {
        if self.source.is_none() {
            return Ok(None);
        }
        self.start().map(Some)
    }

    /// Start a new run for the current image, mode and format.
    ///
    /// Any run in flight and any finalized run are discarded first, even if
    /// the new run cannot start.
    pub fn start(&mut self) -> Result<RunId, SplitError> {
        self.supersede();

        let source = self.source.clone().ok_or(SplitError::NoSource)?;
        let dims = source.dimensions();
        let specs = calculate_segments(dims, self.mode, self.settings.short_source)?;

        self.last_run += 1;
        let run = RunId(self.last_run);
        let format = self.format;
        self.pending = Some(RunCollector::new(run, self.mode, format, dims));
        self.emit(SplitEvent::RunStarted {
            run,
            mode: self.mode,
            format,
            source: dims,
        });

        for spec in specs {
            let frame = match render_frame(&source, &spec) {
                Ok(frame) => frame,
                Err(e) => {
                    self.pending = None;
                    return Err(SplitError::Render(e));
                }
            };
            let backend = Arc::clone(&self.backend);
            let tx = self.completions_tx.clone();
            rayon::spawn(move || {
                let outcome = backend.encode(&frame, format);
                // Receiver gone means the session was dropped; nobody wants the result.
                let _ = tx.send(Completion { run, spec, outcome });
            });
        }

        log::debug!("run {} started: {} {}", run, self.mode, format.label());
        Ok(run)
    }

    fn supersede(&mut self) {
        if let Some(old) = self.pending.take() {
            log::debug!(
                "run {} superseded with {}/{} segments",
                old.run(),
                old.completed(),
                SEGMENT_COUNT
            );
        }
        self.current = None;
    }

    /// Block until the current run is finalized.
    ///
    /// Fails with [`SplitError::Encode`] if one of its segments cannot be
    /// encoded; that run is then dropped and never armed.
    pub fn wait(&mut self) -> Result<&SplitRun, SplitError> {
        while self.pending.is_some() {
            let completion = self
                .completions_rx
                .recv()
                .map_err(|_| SplitError::Idle)?;
            self.accept(completion)?;
        }
        self.current.as_ref().ok_or(SplitError::Idle)
    }

    /// Take whatever completions have arrived without blocking.
    pub fn poll(&mut self) -> Result<Option<&SplitRun>, SplitError> {
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.accept(completion)?;
        }
        Ok(self.current.as_ref())
    }

    fn accept(&mut self, completion: Completion) -> Result<(), SplitError> {
        let Completion { run, spec, outcome } = completion;

        if !self.pending.as_ref().is_some_and(|c| c.run() == run) {
            log::debug!(
                "dropping segment {} of superseded run {}",
                spec.index + 1,
                run
            );
            return Ok(());
        }

        let blob = match outcome {
            Ok(blob) => blob,
            Err(source) => {
                self.pending = None;
                log::warn!("run {} failed at segment {}: {}", run, spec.index + 1, source);
                return Err(SplitError::Encode {
                    index: spec.index,
                    source,
                });
            }
        };

        let Some(collector) = self.pending.as_mut() else {
            return Ok(());
        };
        let name = segment_filename(spec.index, collector.format().encoding);
        let bytes = blob.len();
        let gate = collector.offer(run, spec, blob);

        match gate {
            Gate::Stale => return Ok(()),
            Gate::Duplicate => {
                log::warn!("segment {} of run {} arrived twice", spec.index + 1, run);
                return Ok(());
            }
            Gate::Pending(_) | Gate::Complete => self.emit(SplitEvent::SegmentEncoded {
                run,
                index: spec.index,
                name,
                size: spec.output_size,
                bytes,
            }),
        }

        if gate == Gate::Complete {
            self.current = self.pending.take().and_then(RunCollector::finish);
            if let Some(finished) = &self.current {
                self.emit(SplitEvent::RunFinalized {
                    run,
                    mode: finished.mode,
                });
            }
        }
        Ok(())
    }

    fn emit(&self, event: SplitEvent) {
        if let Some(tx) = &self.events {
            // Printer thread gone is not a reason to fail a split.
            let _ = tx.send(event);
        }
    }
}
