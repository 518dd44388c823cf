//! Parallel batch engine: a fixed pool of workers draining a shared work queue

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossbeam::channel::Receiver;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::config::{ResizeSpec, SpecSet};
use crate::error::{Result, ResizeError};
use crate::processing::{self, Codec, EncodeHints, JpegCodec, RESIZE_DIRECTORY};

pub mod progress;
pub mod scheduler;

pub use progress::*;
pub use scheduler::*;

/// Lifecycle of a [`ResizeEngine`]. There is no way back from `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Unconfigured,
    Configured,
    Running,
    Completed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unconfigured => "unconfigured",
            Self::Configured => "configured",
            Self::Running => "running",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// One-shot batch resizer over the `*.jpg` files of a directory.
///
/// The file list is snapshotted and the `Resize` output directory created at
/// construction. Specs are registered with [`add_spec`](Self::add_spec) or
/// [`configure`](Self::configure), then [`run`](Self::run) processes every
/// file exactly once across the requested number of workers.
///
/// ```rust,no_run
/// use multiresize::{BoxSize, ResizeEngine, ResizeSpec};
///
/// let mut engine = ResizeEngine::new("/srv/pictures")?;
/// engine.add_spec(ResizeSpec::new(BoxSize::new(900, 600), 95, "HIGH"))?;
/// engine.add_spec(ResizeSpec::new(BoxSize::new(120, 80), 85, "SMALL"))?;
///
/// let report = engine.run(4)?;
/// println!("{} files processed", report.processed_files);
/// # Ok::<(), multiresize::ResizeError>(())
/// ```
pub struct ResizeEngine<C: Codec = JpegCodec> {
    output_dir: PathBuf,
    sources: Vec<PathBuf>,
    queue: WorkQueue,
    specs: SpecSet,
    codec: C,
    hints: EncodeHints,
    tracker: ProgressTracker,
    state: EngineState,
}

impl ResizeEngine<JpegCodec> {
    /// Create an engine over `directory` using the production JPEG codec
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        Self::with_codec(directory, JpegCodec::new())
    }
}

impl<C: Codec> ResizeEngine<C> {
    /// Create an engine over `directory` with a custom codec
    pub fn with_codec<P: AsRef<Path>>(directory: P, codec: C) -> Result<Self> {
        let directory = directory.as_ref();

        if directory.as_os_str().is_empty() {
            return Err(ResizeError::config("Pictures directory must not be empty"));
        }

        if !directory.is_dir() {
            return Err(ResizeError::config(format!(
                "Pictures directory does not exist: {}",
                directory.display()
            )));
        }

        let sources = processing::discover_sources(directory)?;

        let output_dir = directory.join(RESIZE_DIRECTORY);
        std::fs::create_dir_all(&output_dir).map_err(|e| {
            ResizeError::config(format!(
                "Failed to create output directory {}: {}",
                output_dir.display(),
                e
            ))
        })?;

        info!(
            "Found {} JPEG file(s) in {}",
            sources.len(),
            directory.display()
        );

        Ok(Self {
            output_dir,
            queue: sources.iter().cloned().collect(),
            sources,
            specs: SpecSet::new(),
            codec,
            hints: EncodeHints::default(),
            tracker: ProgressTracker::new(),
            state: EngineState::Unconfigured,
        })
    }

    /// Set the encoder hints used for every variant
    pub fn with_hints(mut self, hints: EncodeHints) -> Self {
        self.hints = hints;
        self
    }

    /// Register one spec. Invalid or duplicate specs leave the engine unchanged.
    pub fn add_spec(&mut self, spec: ResizeSpec) -> Result<()> {
        self.ensure_configurable("add a resize spec")?;
        self.specs.add(spec)?;
        self.state = EngineState::Configured;
        Ok(())
    }

    /// Replace the registered specs with `specs`, all or nothing
    pub fn configure<I>(&mut self, specs: I) -> Result<()>
    where
        I: IntoIterator<Item = ResizeSpec>,
    {
        self.ensure_configurable("configure")?;

        let specs = SpecSet::try_from_specs(specs)?;
        if specs.is_empty() {
            return Err(ResizeError::config("At least one resize spec is required"));
        }

        self.specs = specs;
        self.state = EngineState::Configured;
        Ok(())
    }

    /// Process every source file with `workers` parallel workers and wait for all of them.
    ///
    /// Only valid once, from the `Configured` state.
    pub fn run(&mut self, workers: usize) -> Result<RunReport> {
        if self.state != EngineState::Configured {
            return Err(ResizeError::invalid_state("run", self.state));
        }

        if workers == 0 {
            return Err(ResizeError::config("Worker count must be at least 1"));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("multiresize-worker-{}", index))
            .build()
            .map_err(|e| ResizeError::config(format!("Failed to start worker pool: {}", e)))?;

        self.state = EngineState::Running;
        let start_time = Instant::now();

        info!(
            "Resizing {} file(s) into {} variant(s) with {} worker(s)",
            self.sources.len(),
            self.specs.len(),
            workers
        );
        self.tracker.start(self.sources.len(), workers);

        let this = &*self;
        pool.scope(|scope| {
            for worker in 0..workers {
                scope.spawn(move |_| this.worker_loop(worker));
            }
        });

        self.tracker.finish();
        self.state = EngineState::Completed;

        let report = RunReport {
            workers,
            source_files: self.sources.len(),
            processed_files: self.tracker.processed_files(),
            failed_files: self.tracker.failed_files(),
            variants_written: self.tracker.variants_written(),
            failures: self.tracker.failures(),
            elapsed: start_time.elapsed(),
        };

        info!(
            "Processed {} of {} file(s) in {:.2}s ({} failure(s))",
            report.processed_files,
            report.source_files,
            report.elapsed.as_secs_f64(),
            report.failures.len()
        );

        Ok(report)
    }

    /// Claim-process loop run by each worker until the queue is drained
    fn worker_loop(&self, worker: usize) {
        debug!("Worker {} started", worker);
        let mut handled = 0usize;

        while let Some(source) = self.queue.try_claim() {
            debug!("Worker {} claimed {:?}", worker, source);
            handled += 1;

            match processing::process_source(
                &self.codec,
                &source,
                &self.specs,
                &self.output_dir,
                &self.hints,
            ) {
                Ok(outcome) => {
                    debug!(
                        "File resized: {} ({}, {} variant(s) in {:?}) [worker {}]",
                        outcome.source.display(),
                        outcome.source_size,
                        outcome.written.len(),
                        outcome.processing_time,
                        worker
                    );
                    self.tracker.record_outcome(worker, &outcome);
                }
                Err(e) => {
                    warn!("{} [worker {}]", e.user_message(), worker);
                    self.tracker.record_failure(worker, &source, &e);
                }
            }
        }

        debug!("Worker {} finished after {} file(s)", worker, handled);
    }

    fn ensure_configurable(&self, operation: &'static str) -> Result<()> {
        match self.state {
            EngineState::Unconfigured | EngineState::Configured => Ok(()),
            EngineState::Running | EngineState::Completed => {
                Err(ResizeError::invalid_state(operation, self.state))
            }
        }
    }

    /// Files whose specs were all attempted; read once `run` has returned
    pub fn processed_file_count(&self) -> usize {
        self.tracker.processed_files()
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Source files found at construction, sorted
    pub fn source_files(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn specs(&self) -> &SpecSet {
        &self.specs
    }

    pub fn hints(&self) -> &EncodeHints {
        &self.hints
    }

    /// Progress events for the upcoming run; the channel closes when the run ends
    pub fn subscribe(&self) -> Receiver<ProgressUpdate> {
        self.tracker.subscribe()
    }
}

/// Result of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub workers: usize,
    pub source_files: usize,
    /// Files whose specs were all attempted (decode succeeded)
    pub processed_files: usize,
    /// Files skipped after a decode failure
    pub failed_files: usize,
    pub variants_written: usize,
    pub failures: Vec<FailureRecord>,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.is_zero() {
            return 0.0;
        }
        self.processed_files as f64 / self.elapsed.as_secs_f64()
    }
}
