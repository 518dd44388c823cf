//! MultiResize - Parallel multi-variant JPEG resizer
//!
//! Scans one directory for `*.jpg` files and writes several resized variants
//! of each into a `Resize` subdirectory. Every variant is described by a
//! [`ResizeSpec`]: a bounding box, a JPEG quality and a filename suffix.
//! Landscape sources take the box width and portrait or square sources take
//! the box height; the other side follows the source aspect ratio.
//!
//! # Features
//!
//! - **Parallel**: a fixed pool of workers claims files from a shared queue
//! - **Single decode**: each source is decoded once for all of its variants
//! - **Progressive JPEG**: interlaced output through mozjpeg by default
//! - **Fault tolerant**: a corrupt file or a failed variant never stops the batch
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use multiresize::{BoxSize, ResizeEngine, ResizeSpec};
//!
//! let mut engine = ResizeEngine::new("/srv/pictures")?;
//! engine.configure(vec![
//!     ResizeSpec::new(BoxSize::new(900, 600), 95, "HIGH"),
//!     ResizeSpec::new(BoxSize::new(450, 300), 90, "MEDIUM"),
//!     ResizeSpec::new(BoxSize::new(120, 80), 85, "SMALL"),
//! ])?;
//!
//! let report = engine.run(4)?;
//! println!(
//!     "{} files, {} variants in {:?}",
//!     report.processed_files, report.variants_written, report.elapsed
//! );
//! # Ok::<(), multiresize::ResizeError>(())
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

pub mod config;
pub mod error;
pub mod parallel;
pub mod processing;

// Re-export commonly used types
pub use config::{BoxSize, Config, LoggingConfig, ResizeSpec, SpecSet};
pub use error::{ResizeError, Result};
pub use parallel::{EngineState, ProgressUpdate, ResizeEngine, RunReport};
pub use processing::{compute_target_size, Codec, Dimensions, EncodeHints, JpegCodec};

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging from `RUST_LOG`.
///
/// Does nothing if a global subscriber is already installed, so calling it
/// more than once is harmless.
pub fn init() {
    if tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .is_ok()
    {
        info!("MultiResize v{} initialized", VERSION);
    }
}

/// Initialize logging from a [`LoggingConfig`]
pub fn init_with_config(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.level).map_err(|e| {
        ResizeError::config(format!("Invalid log level '{}': {}", config.level, e))
    })?;

    let installed = if config.json_format {
        tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_thread_names(true)
                .with_writer(std::io::stderr)
                .finish(),
        )
    } else {
        tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish(),
        )
    };

    if installed.is_ok() {
        info!("MultiResize v{} initialized with level {}", VERSION, config.level);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_init() {
        // Should not fail on multiple calls
        init();
        init();
        assert!(init_with_config(&LoggingConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_level() {
        let config = LoggingConfig {
            level: "multiresize=loudest".to_string(),
            json_format: false,
        };
        assert!(init_with_config(&config).is_err());
    }
}
