//! Target size derivation and resample filters

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::BoxSize;

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<BoxSize> for Dimensions {
    fn from(size: BoxSize) -> Self {
        Self::new(size.width, size.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Derive the output size for `source` from a bounding box, preserving the source aspect ratio.
///
/// - Equal ratios return the box unchanged.
/// - Landscape sources (`width > height`) keep the box width.
/// - Portrait and square sources keep the box height.
///
/// The derived dimension is rounded half away from zero. Both `source` and
/// `target_box` must have positive dimensions.
///
/// ```
/// use multiresize::config::BoxSize;
/// use multiresize::processing::{compute_target_size, Dimensions};
///
/// let out = compute_target_size(Dimensions::new(1200, 1600), BoxSize::new(900, 600));
/// assert_eq!(out, Dimensions::new(450, 600));
/// ```
#[allow(clippy::float_cmp)]
pub fn compute_target_size(source: Dimensions, target_box: BoxSize) -> Dimensions {
    let source_ratio = f64::from(source.width) / f64::from(source.height);
    let target_ratio = f64::from(target_box.width) / f64::from(target_box.height);

    if source_ratio == target_ratio {
        return target_box.into();
    }

    if source.width > source.height {
        // landscape
        let height = (f64::from(target_box.width) / source_ratio).round() as u32;
        Dimensions::new(target_box.width, height)
    } else {
        // portrait or square
        let width = (f64::from(target_box.height) * source_ratio).round() as u32;
        Dimensions::new(width, target_box.height)
    }
}

/// Available resample filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Nearest neighbor (fastest, lowest quality)
    Nearest,
    /// Triangle (linear interpolation)
    Triangle,
    /// Catmull-Rom cubic spline
    CatmullRom,
    /// Gaussian blur
    Gaussian,
    /// Lanczos with radius 3 (high quality, recommended)
    #[default]
    Lanczos3,
}

impl From<FilterType> for image::imageops::FilterType {
    fn from(filter: FilterType) -> Self {
        match filter {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Triangle => image::imageops::FilterType::Triangle,
            FilterType::CatmullRom => image::imageops::FilterType::CatmullRom,
            FilterType::Gaussian => image::imageops::FilterType::Gaussian,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}
