//! Configuration structures for the scan pipeline.
//!
//! This module defines all tunable parameters of a scan, organized into
//! groups for sampling, background removal and clustering.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use paint_scan::{ScanConfig, ScanMode};
//! use std::path::Path;
//!
//! // Load from file
//! let config = ScanConfig::from_json_file(Path::new("scan.json"))?;
//!
//! // Or use the defaults for a mode
//! let config = ScanConfig::for_mode(ScanMode::Inspiration);
//! # Ok::<(), paint_scan::ScanError>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`SamplerConfig`]: analysis grid size and transparency cutoff
//! - [`ForegroundConfig`]: border-ring background removal (miniature mode)
//! - [`QuantizerConfig`]: k-means limits, merging and noise thresholds

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{foreground, quantizer, sampling, scan};
use crate::error::{Result, ScanError};

/// What kind of picture is being scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Photographed painted model; the background is removed before clustering
    Miniature,
    /// Arbitrary image; the whole frame is the subject
    Inspiration,
}

impl ScanMode {
    /// Whether this mode runs background removal
    pub fn removes_background(self) -> bool {
        matches!(self, ScanMode::Miniature)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScanMode::Miniature => "miniature",
            ScanMode::Inspiration => "inspiration",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete configuration for one scan.
///
/// Serialized with camelCase keys (`numColors`, `numPaintMatches`, ...) to
/// match the options accepted by the remote scanning service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanConfig {
    /// Scan mode; selects whether background removal runs
    pub mode: ScanMode,

    /// Number of dominant colors requested (1..=12)
    pub num_colors: usize,

    /// Paint matches returned per brand (at least 1)
    pub num_paint_matches: usize,

    /// Restrict matching to these brands; all database brands when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brands: Option<Vec<String>>,

    /// Attach a base/shade/highlight/wash recipe per brand to every color
    #[serde(default)]
    pub include_recipes: bool,

    #[serde(default)]
    pub sampler: SamplerConfig,

    #[serde(default)]
    pub foreground: ForegroundConfig,

    #[serde(default)]
    pub quantizer: QuantizerConfig,
}

/// Pixel sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SamplerConfig {
    /// Longer edge of the analysis grid, in pixels
    pub max_edge: u32,

    /// Source pixels with alpha below this are treated as absent
    pub alpha_threshold: u8,

    /// Drop near-black and near-white samples before clustering
    pub filter_extremes: bool,
}

/// Background removal parameters.
///
/// The background is presumed near-uniform and touching the image border.
/// A ring of `border_width` pixels is averaged and everything within
/// `tolerance` (widened by the ring's own spread, at most doubling it) of
/// that average is discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForegroundConfig {
    /// Width of the sampled border ring, in grid pixels
    pub border_width: u32,

    /// ΔE76 distance from the ring centroid still counted as background
    pub tolerance: f32,

    /// Minimum share of present pixels that must remain (0.0-1.0)
    pub min_foreground_fraction: f32,
}

/// Color clustering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuantizerConfig {
    /// Hard cap on refinement passes
    pub max_iterations: usize,

    /// Stop once no centroid moves further than this (ΔE76)
    pub convergence_threshold: f32,

    /// Merge clusters whose centroids are closer than this (ΔE76)
    pub merge_threshold: f32,

    /// Drop clusters covering less than this percentage
    pub min_percentage: f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_edge: sampling::MAX_EDGE,
            alpha_threshold: sampling::ALPHA_THRESHOLD,
            filter_extremes: false,
        }
    }
}

impl Default for ForegroundConfig {
    fn default() -> Self {
        Self {
            border_width: foreground::BORDER_WIDTH,
            tolerance: foreground::TOLERANCE,
            min_foreground_fraction: foreground::MIN_FOREGROUND_FRACTION,
        }
    }
}

impl Default for QuantizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: quantizer::MAX_ITERATIONS,
            convergence_threshold: quantizer::CONVERGENCE_THRESHOLD,
            merge_threshold: quantizer::MERGE_THRESHOLD,
            min_percentage: quantizer::MIN_PERCENTAGE,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::for_mode(ScanMode::Miniature)
    }
}

impl ScanConfig {
    /// Default configuration for a mode (6 colors for miniatures, 5 for inspiration)
    pub fn for_mode(mode: ScanMode) -> Self {
        let num_colors = match mode {
            ScanMode::Miniature => scan::MINIATURE_COLORS,
            ScanMode::Inspiration => scan::INSPIRATION_COLORS,
        };
        Self {
            mode,
            num_colors,
            num_paint_matches: scan::PAINT_MATCHES_PER_BRAND,
            brands: None,
            include_recipes: false,
            sampler: SamplerConfig::default(),
            foreground: ForegroundConfig::default(),
            quantizer: QuantizerConfig::default(),
        }
    }

    pub fn with_num_colors(mut self, num_colors: usize) -> Self {
        self.num_colors = num_colors;
        self
    }

    pub fn with_num_paint_matches(mut self, num_paint_matches: usize) -> Self {
        self.num_paint_matches = num_paint_matches;
        self
    }

    pub fn with_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.brands = Some(brands.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_recipes(mut self, include_recipes: bool) -> Self {
        self.include_recipes = include_recipes;
        self
    }

    /// Check every value against its allowed range
    ///
    /// # Errors
    ///
    /// Returns `ScanError::InvalidParameter` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        if !(scan::MIN_COLORS..=scan::MAX_COLORS).contains(&self.num_colors) {
            return Err(ScanError::invalid_parameter("numColors", self.num_colors));
        }
        if self.num_paint_matches == 0 {
            return Err(ScanError::invalid_parameter("numPaintMatches", self.num_paint_matches));
        }
        if self.sampler.max_edge == 0 {
            return Err(ScanError::invalid_parameter("sampler.maxEdge", self.sampler.max_edge));
        }
        if self.foreground.border_width == 0 {
            return Err(ScanError::invalid_parameter(
                "foreground.borderWidth",
                self.foreground.border_width,
            ));
        }
        if !(self.foreground.tolerance >= 0.0) {
            return Err(ScanError::invalid_parameter("foreground.tolerance", self.foreground.tolerance));
        }
        if !(0.0..=1.0).contains(&self.foreground.min_foreground_fraction) {
            return Err(ScanError::invalid_parameter(
                "foreground.minForegroundFraction",
                self.foreground.min_foreground_fraction,
            ));
        }
        if self.quantizer.max_iterations == 0 {
            return Err(ScanError::invalid_parameter(
                "quantizer.maxIterations",
                self.quantizer.max_iterations,
            ));
        }
        if !(self.quantizer.convergence_threshold > 0.0) {
            return Err(ScanError::invalid_parameter(
                "quantizer.convergenceThreshold",
                self.quantizer.convergence_threshold,
            ));
        }
        if !(self.quantizer.merge_threshold >= 0.0) {
            return Err(ScanError::invalid_parameter(
                "quantizer.mergeThreshold",
                self.quantizer.merge_threshold,
            ));
        }
        if !(0.0..100.0).contains(&self.quantizer.min_percentage) {
            return Err(ScanError::invalid_parameter(
                "quantizer.minPercentage",
                self.quantizer.min_percentage,
            ));
        }
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ScanError::config(format!("cannot read {}", path.display()), e))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string
    ///
    /// Omitted tuning sections fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ScanError::config("invalid scan configuration", e))
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ScanError::config("cannot serialize scan configuration", e))?;
        std::fs::write(path, json)
            .map_err(|e| ScanError::config(format!("cannot write {}", path.display()), e))
    }
}
