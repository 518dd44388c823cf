//! Core image processing: one source file in, one output file per spec out

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::{ResizeSpec, SpecSet};
use crate::error::{Result, ResizeError};

pub mod codec;
pub mod formats;
pub mod resize;

pub use codec::*;
pub use formats::*;
pub use resize::*;

/// Result of writing one variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantOutput {
    pub suffix: String,
    pub path: PathBuf,
    pub size: Dimensions,
    pub bytes: u64,
}

/// Result of processing every spec for one source file
#[derive(Debug)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub source_size: Dimensions,
    pub written: Vec<VariantOutput>,
    /// Encode failures; the remaining specs were still attempted
    pub failures: Vec<ResizeError>,
    pub processing_time: Duration,
}

impl FileOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Decode `source` once and produce every variant in `specs` into `output_dir`.
///
/// A decode failure aborts the file and is returned as `Err`. Failures for a
/// single variant are collected in [`FileOutcome::failures`] and do not stop
/// the remaining specs.
pub fn process_source<C: Codec>(
    codec: &C,
    source: &Path,
    specs: &SpecSet,
    output_dir: &Path,
    hints: &EncodeHints,
) -> Result<FileOutcome> {
    let start_time = Instant::now();

    let image = codec
        .decode(source)
        .map_err(|e| ResizeError::decode(source.to_path_buf(), e.to_string()))?;
    let source_size = codec.dimensions(&image);

    let mut written = Vec::with_capacity(specs.len());
    let mut failures = Vec::new();

    for spec in specs {
        match write_variant(codec, &image, source_size, source, spec, output_dir, hints) {
            Ok(output) => {
                debug!(
                    "File resized: {} ({} -> {})",
                    output.path.display(),
                    source_size,
                    output.size
                );
                written.push(output);
            }
            Err(e) => {
                warn!("{}", e.user_message());
                failures.push(e);
            }
        }
    }

    Ok(FileOutcome {
        source: source.to_path_buf(),
        source_size,
        written,
        failures,
        processing_time: start_time.elapsed(),
    })
}

fn write_variant<C: Codec>(
    codec: &C,
    image: &C::Image,
    source_size: Dimensions,
    source: &Path,
    spec: &ResizeSpec,
    output_dir: &Path,
    hints: &EncodeHints,
) -> Result<VariantOutput> {
    let fail = |message: String| ResizeError::encode(source.to_path_buf(), spec.suffix(), message);

    let size = compute_target_size(source_size, spec.target_box());
    let resized = codec.resample(image, size).map_err(|e| fail(e.to_string()))?;
    let bytes = codec
        .encode(&resized, spec.quality(), hints)
        .map_err(|e| fail(e.to_string()))?;

    let path = variant_output_path(output_dir, source, spec.suffix());
    std::fs::write(&path, &bytes)
        .map_err(|e| fail(format!("cannot write {}: {}", path.display(), e)))?;

    Ok(VariantOutput {
        suffix: spec.suffix().to_string(),
        path,
        size,
        bytes: bytes.len() as u64,
    })
}
