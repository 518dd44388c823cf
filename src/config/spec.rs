//! Resize specs: the named output variants produced for every source image

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ResizeError};

/// Characters that would let a suffix escape the output directory or break a filename
const FORBIDDEN_SUFFIX_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Maximum width/height an output variant may occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: u32,
    pub height: u32,
}

impl BoxSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for BoxSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One output variant: target box, JPEG quality and filename suffix.
///
/// Immutable once built. Validity is checked by [`ResizeSpec::is_valid`] and
/// enforced when the spec is registered into a [`SpecSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeSpec {
    target_box: BoxSize,
    quality: u8,
    suffix: String,
}

impl ResizeSpec {
    /// Create a new spec. Nothing is validated here.
    pub fn new<S: Into<String>>(target_box: BoxSize, quality: u8, suffix: S) -> Self {
        Self {
            target_box,
            quality,
            suffix: suffix.into(),
        }
    }

    pub fn target_box(&self) -> BoxSize {
        self.target_box
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// True iff width > 0, height > 0, quality <= 100 and the suffix is a usable non-empty name
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Same checks as [`is_valid`](Self::is_valid), with the reason on failure
    pub fn validate(&self) -> Result<()> {
        if self.target_box.width == 0 || self.target_box.height == 0 {
            return Err(ResizeError::invalid_spec(format!(
                "box size must be positive, got {}",
                self.target_box
            )));
        }

        if self.quality > 100 {
            return Err(ResizeError::invalid_spec(format!(
                "quality must be between 0-100, got {}",
                self.quality
            )));
        }

        if self.suffix.is_empty() {
            return Err(ResizeError::invalid_spec("suffix must not be empty"));
        }

        if self.suffix.contains(FORBIDDEN_SUFFIX_CHARS) {
            return Err(ResizeError::invalid_spec(format!(
                "suffix '{}' contains invalid filename characters",
                self.suffix
            )));
        }

        Ok(())
    }
}

impl fmt::Display for ResizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} q{}", self.suffix, self.target_box, self.quality)
    }
}

/// Ordered collection of valid specs with pairwise distinct suffixes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecSet {
    specs: Vec<ResizeSpec>,
}

impl SpecSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spec. On failure the set is left unchanged.
    pub fn add(&mut self, spec: ResizeSpec) -> Result<()> {
        spec.validate()?;

        if self.specs.iter().any(|s| s.suffix == spec.suffix) {
            return Err(ResizeError::duplicate_suffix(spec.suffix));
        }

        self.specs.push(spec);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Specs in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, ResizeSpec> {
        self.specs.iter()
    }

    pub fn suffixes(&self) -> Vec<&str> {
        self.specs.iter().map(ResizeSpec::suffix).collect()
    }

    /// Build a set from specs, failing on the first rejected one
    pub fn try_from_specs<I>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = ResizeSpec>,
    {
        let mut set = Self::new();
        for spec in specs {
            set.add(spec)?;
        }
        Ok(set)
    }
}

impl<'a> IntoIterator for &'a SpecSet {
    type Item = &'a ResizeSpec;
    type IntoIter = std::slice::Iter<'a, ResizeSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
