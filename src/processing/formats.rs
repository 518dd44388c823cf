//! Source discovery and output naming

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, ResizeError};

/// Extension matched by source discovery. Case-sensitive: `photo.JPG` is ignored.
pub const SOURCE_EXTENSION: &str = "jpg";

/// Name of the subdirectory receiving every variant
pub const RESIZE_DIRECTORY: &str = "Resize";

/// Check whether `path` names a source JPEG (`*.jpg`, exact case)
pub fn is_source_jpeg<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .map_or(false, |ext| ext == SOURCE_EXTENSION)
}

/// List the `*.jpg` files directly inside `directory`, sorted.
///
/// Subdirectories are not descended into.
pub fn discover_sources<P: AsRef<Path>>(directory: P) -> Result<Vec<PathBuf>> {
    let directory = directory.as_ref();
    let mut files = Vec::new();

    for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            ResizeError::config(format!("Failed to list {}: {}", directory.display(), e))
        })?;
        let path = entry.path();

        if path.is_file() && is_source_jpeg(path) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Output filename for one variant: `<stem>-<suffix><ext>`.
///
/// ```
/// use multiresize::processing::variant_file_name;
/// use std::path::Path;
///
/// assert_eq!(variant_file_name(Path::new("/pics/photo.jpg"), "HIGH"), "photo-HIGH.jpg");
/// ```
pub fn variant_file_name(source: &Path, suffix: &str) -> OsString {
    let mut name = source.file_stem().map(OsString::from).unwrap_or_default();
    name.push("-");
    name.push(suffix);
    if let Some(ext) = source.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}

/// Full output path for one variant inside `output_dir`
pub fn variant_output_path(output_dir: &Path, source: &Path, suffix: &str) -> PathBuf {
    output_dir.join(variant_file_name(source, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_source_extension_is_case_sensitive() {
        assert!(is_source_jpeg("photo.jpg"));
        assert!(!is_source_jpeg("photo.JPG"));
        assert!(!is_source_jpeg("photo.jpeg"));
        assert!(!is_source_jpeg("photo.png"));
        assert!(!is_source_jpeg("jpg"));
    }

    #[test]
    fn test_variant_naming() {
        assert_eq!(variant_file_name(Path::new("a.jpg"), "MEDIUM"), "a-MEDIUM.jpg");
        assert_eq!(
            variant_file_name(Path::new("/x/holiday.2019.jpg"), "SMALL"),
            "holiday.2019-SMALL.jpg"
        );

        let out = variant_output_path(Path::new("/pics/Resize"), Path::new("/pics/b.jpg"), "HIGH");
        assert_eq!(out, PathBuf::from("/pics/Resize/b-HIGH.jpg"));
    }

    #[test]
    fn test_discover_sources_top_level_only() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::write(root.join("b.jpg"), b"b").unwrap();
        std::fs::write(root.join("a.jpg"), b"a").unwrap();
        std::fs::write(root.join("upper.JPG"), b"u").unwrap();
        std::fs::write(root.join("notes.txt"), b"n").unwrap();
        std::fs::create_dir(root.join("nested")).unwrap();
        std::fs::write(root.join("nested").join("deep.jpg"), b"d").unwrap();
        std::fs::create_dir(root.join("folder.jpg")).unwrap();

        let files = discover_sources(root).unwrap();
        assert_eq!(files, vec![root.join("a.jpg"), root.join("b.jpg")]);
    }
}
