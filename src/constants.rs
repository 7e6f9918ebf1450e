//! Reference values and default tuning for color detection
//!
//! Compile-time defaults used by [`crate::config`]. Distances are CIE Lab
//! ΔE units unless noted otherwise.

/// Scan request limits and defaults
pub mod scan {
    /// Smallest number of dominant colors a scan may request
    pub const MIN_COLORS: usize = 1;

    /// Largest number of dominant colors a scan may request
    pub const MAX_COLORS: usize = 12;

    /// Default color count for miniature scans
    pub const MINIATURE_COLORS: usize = 6;

    /// Default color count for inspiration scans
    pub const INSPIRATION_COLORS: usize = 5;

    /// Default paint matches returned per brand
    pub const PAINT_MATCHES_PER_BRAND: usize = 5;

    /// Prefix of identifiers stamped on offline results
    pub const ID_PREFIX: &str = "offline";
}

/// Pixel sampling parameters
pub mod sampling {
    /// Longer edge of the analysis grid after downsampling
    pub const MAX_EDGE: u32 = 200;

    /// Source pixels with alpha below this are treated as absent
    pub const ALPHA_THRESHOLD: u8 = 128;

    /// Mean channel value below which a sample counts as near-black noise
    pub const EXTREME_MIN_BRIGHTNESS: u16 = 20;

    /// Mean channel value above which a sample counts as near-white noise
    pub const EXTREME_MAX_BRIGHTNESS: u16 = 235;
}

/// Background removal parameters (miniature mode)
pub mod foreground {
    /// Width of the border ring sampled for the background color, in grid pixels
    pub const BORDER_WIDTH: u32 = 2;

    /// Base ΔE76 distance from the border centroid still counted as background
    pub const TOLERANCE: f32 = 12.0;

    /// Foreground share below which segmentation is considered failed
    pub const MIN_FOREGROUND_FRACTION: f32 = 0.05;
}

/// Clustering parameters
pub mod quantizer {
    /// Hard cap on k-means refinement passes
    pub const MAX_ITERATIONS: usize = 40;

    /// Iteration stops once no centroid moves further than this (ΔE76)
    pub const CONVERGENCE_THRESHOLD: f32 = 0.5;

    /// Clusters closer than this (ΔE76) are merged into one color
    pub const MERGE_THRESHOLD: f32 = 10.0;

    /// Clusters covering less than this percentage are dropped as noise
    pub const MIN_PERCENTAGE: f32 = 1.0;
}

/// Paint recipe lightness offsets (L*)
pub mod recipe {
    /// L* added to the detected color when picking a highlight paint
    pub const HIGHLIGHT_LIGHTNESS_DELTA: f32 = 15.0;

    /// L* added to the detected color when picking a shade paint
    pub const SHADE_LIGHTNESS_DELTA: f32 = -20.0;
}
