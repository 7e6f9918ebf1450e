//! Offline scan pipeline
//!
//! Runs the full chain for one image:
//! 1. Sample and downsample the decoded image
//! 2. Remove the background (miniature mode)
//! 3. Cluster the remaining pixels into dominant colors
//! 4. Label each color with a family
//! 5. Rank paints per brand (and optionally build recipes)
//! 6. Assemble the result

use std::sync::Arc;
use std::time::Instant;

use crate::cancel::CancelToken;
use crate::color::{ColorCluster, ColorConverter, ColorQuantizer, FamilyClassifier};
use crate::color::conversion::lab_to_array;
use crate::config::ScanConfig;
use crate::detection::ForegroundSelector;
use crate::error::{Result, ScanError};
use crate::paints::{PaintDatabase, PaintMatcher, RecipeBuilder};
use crate::result::{ColorMatches, DetectedColor, ResultAssembler, ScanResult};
use crate::sampler::{filter_extremes, sample_image};

/// Everything needed to run one scan
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Encoded image bytes (any format the `image` crate decodes)
    pub image: Vec<u8>,
    /// Caller reference echoed into the result
    pub source_image: String,
    pub config: ScanConfig,
}

impl ScanRequest {
    pub fn new(image: Vec<u8>, source_image: impl Into<String>) -> Self {
        Self {
            image,
            source_image: source_image.into(),
            config: ScanConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }
}

/// Anything that turns a scan request into a result
///
/// The offline engine and the remote service produce the same
/// [`ScanResult`] shape, so callers can swap providers freely.
pub trait ScanProvider: Send + Sync {
    fn scan(&self, request: &ScanRequest, cancel: &CancelToken) -> Result<ScanResult>;
}

/// Clusters plus the outcome of background removal
#[derive(Debug, Clone)]
pub struct ColorDetection {
    pub clusters: Vec<ColorCluster>,
    pub background_removed: bool,
    /// Background removal fell back to the full image
    pub low_foreground: bool,
}

/// On-device implementation of [`ScanProvider`]
#[derive(Debug, Clone)]
pub struct OfflineEngine {
    database: Arc<PaintDatabase>,
    converter: ColorConverter,
    classifier: FamilyClassifier,
}

impl Default for OfflineEngine {
    fn default() -> Self {
        Self::new(PaintDatabase::builtin())
    }
}

impl OfflineEngine {
    pub fn new(database: Arc<PaintDatabase>) -> Self {
        Self {
            database,
            converter: ColorConverter::new(),
            classifier: FamilyClassifier::new(),
        }
    }

    pub fn database(&self) -> &Arc<PaintDatabase> {
        &self.database
    }

    /// Dominant colors only, without paint matching
    pub fn detect_colors(&self, image: &[u8], config: &ScanConfig, cancel: &CancelToken) -> Result<ColorDetection> {
        let start = Instant::now();
        let grid = sample_image(image, &config.sampler)?;

        let (grid, background_removed, low_foreground) = if config.mode.removes_background() {
            let selection = ForegroundSelector::from_config(&config.foreground).select(&grid);
            let low = selection.warning.is_some();
            (selection.grid, selection.background_removed, low)
        } else {
            (grid, false, false)
        };

        let mut samples = grid.to_samples();
        if config.sampler.filter_extremes {
            samples = filter_extremes(samples);
        }
        tracing::debug!(
            samples = samples.len(),
            background_removed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "pixels sampled"
        );

        let clusters = ColorQuantizer::from_config(&config.quantizer).quantize(&samples, config.num_colors, cancel)?;
        tracing::debug!(
            clusters = clusters.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "colors quantized"
        );

        Ok(ColorDetection {
            clusters,
            background_removed,
            low_foreground,
        })
    }

    fn describe(&self, cluster: &ColorCluster, config: &ScanConfig, brands: &[String]) -> DetectedColor {
        let rgb = self.converter.lab_to_rgb(cluster.lab);
        let family = self.classifier.classify(cluster.lab);

        let paint_recipe = config
            .include_recipes
            .then(|| RecipeBuilder::new(Arc::clone(&self.database)).build(cluster.lab, family.group, brands));

        DetectedColor {
            hex: self.converter.rgb_to_hex(rgb),
            rgb,
            lab: lab_to_array(cluster.lab),
            percentage: cluster.percentage,
            family: family.name.to_string(),
            paint_recipe,
        }
    }
}

impl ScanProvider for OfflineEngine {
    fn scan(&self, request: &ScanRequest, cancel: &CancelToken) -> Result<ScanResult> {
        let config = &request.config;
        config.validate()?;

        if self.database.is_empty() {
            return Err(ScanError::EmptyDatabase);
        }

        let start = Instant::now();
        let ColorDetection {
            clusters,
            background_removed,
            low_foreground,
        } = self.detect_colors(&request.image, config, cancel)?;

        cancel.check()?;
        let matcher = PaintMatcher::new(Arc::clone(&self.database));
        let brands: Vec<String> = match &config.brands {
            Some(filter) => filter.clone(),
            None => self.database.brands().into_iter().map(str::to_string).collect(),
        };

        let mut entries = Vec::with_capacity(clusters.len());
        for cluster in &clusters {
            let color = self.describe(cluster, config, &brands);
            let by_brand = matcher.match_brands(cluster.lab, Some(&brands), config.num_paint_matches, cancel)?;
            let matches = ColorMatches {
                color_hex: color.hex.clone(),
                brands: by_brand,
            };
            entries.push((color, matches));
        }

        let result = ResultAssembler::new(config.mode)
            .with_foreground(background_removed, low_foreground)
            .assemble(&request.source_image, entries);

        tracing::info!(
            id = %result.id,
            mode = %config.mode,
            colors = result.metadata.color_count,
            paints = result.metadata.paint_count,
            low_foreground,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scan complete"
        );

        Ok(result)
    }
}
