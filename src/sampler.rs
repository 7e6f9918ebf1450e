//! Image decoding and bounded pixel sampling
//!
//! Decodes raw image bytes with the `image` crate and reduces them to a small
//! analysis grid. Downsampling averages every source pixel that falls inside a
//! destination cell (a box filter), so thin details still contribute to the
//! color distribution instead of being skipped.
//!
//! Alpha is not carried forward: transparent source pixels are left out of
//! the averages and a cell with no opaque pixel is marked absent.

use std::collections::BTreeMap;

use crate::config::SamplerConfig;
use crate::constants::sampling::{EXTREME_MAX_BRIGHTNESS, EXTREME_MIN_BRIGHTNESS};
use crate::error::{Result, ScanError};

/// One distinct display color and how many grid pixels carried it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSample {
    pub rgb: [u8; 3],
    pub weight: u32,
}

/// Downsampled image, row-major; `None` marks an absent (transparent) pixel
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<Option<[u8; 3]>>,
}

impl PixelGrid {
    /// Build a grid from row-major pixels
    ///
    /// # Errors
    ///
    /// Returns `ScanError::InvalidParameter` if the buffer length does not
    /// match the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<Option<[u8; 3]>>) -> Result<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(ScanError::invalid_parameter(
                "pixels",
                format!("{} for {}x{} grid", pixels.len(), width, height),
            ));
        }
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn pixels(&self) -> &[Option<[u8; 3]>] {
        &self.pixels
    }

    /// Number of present (opaque) pixels
    pub fn present_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_some()).count()
    }

    /// Copy of this grid with the pixels at the given indices marked absent
    pub(crate) fn without(&self, excluded: &[bool]) -> Self {
        let pixels = self
            .pixels
            .iter()
            .zip(excluded)
            .map(|(pixel, &drop)| if drop { None } else { *pixel })
            .collect();
        Self {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    /// Collapse present pixels into distinct colors with occurrence weights
    ///
    /// Output is ordered by color value so it is identical for identical grids.
    pub fn to_samples(&self) -> Vec<PixelSample> {
        let mut counts: BTreeMap<[u8; 3], u32> = BTreeMap::new();
        for rgb in self.pixels.iter().flatten() {
            *counts.entry(*rgb).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .map(|(rgb, weight)| PixelSample { rgb, weight })
            .collect()
    }
}

/// Decode image bytes and downsample them to the analysis grid
///
/// # Errors
///
/// Returns `ScanError::Decode` if:
/// - The byte buffer is empty
/// - The format is not recognised or decoding fails
/// - No pixel of the image is opaque
pub fn sample_image(bytes: &[u8], config: &SamplerConfig) -> Result<PixelGrid> {
    if bytes.is_empty() {
        return Err(ScanError::decode_msg("image data is empty"));
    }

    let image = image::load_from_memory(bytes)
        .map_err(|e| ScanError::decode("unsupported or corrupt image data", e))?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(ScanError::decode_msg("image has no pixels"));
    }

    let grid = downsample(rgba.as_raw(), width, height, config.max_edge, config.alpha_threshold);
    if grid.present_count() == 0 {
        return Err(ScanError::decode_msg("image contains no opaque pixels"));
    }

    tracing::debug!(
        source_width = width,
        source_height = height,
        grid_width = grid.width,
        grid_height = grid.height,
        "sampled image"
    );
    Ok(grid)
}

/// Target dimensions keeping aspect ratio with the longer edge at most `max_edge`
fn target_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longer = width.max(height);
    if longer <= max_edge {
        return (width, height);
    }
    let scale = max_edge as f64 / longer as f64;
    let w = ((width as f64 * scale).round() as u32).clamp(1, max_edge);
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_edge);
    (w, h)
}

/// Area-average an RGBA8 buffer into a grid of at most `max_edge` on the longer side
fn downsample(rgba: &[u8], width: u32, height: u32, max_edge: u32, alpha_threshold: u8) -> PixelGrid {
    let (out_w, out_h) = target_dimensions(width, height, max_edge.max(1));
    let mut pixels = Vec::with_capacity(out_w as usize * out_h as usize);

    for ty in 0..out_h {
        let y0 = (ty as u64 * height as u64 / out_h as u64) as u32;
        let y1 = (((ty as u64 + 1) * height as u64 / out_h as u64) as u32).max(y0 + 1);

        for tx in 0..out_w {
            let x0 = (tx as u64 * width as u64 / out_w as u64) as u32;
            let x1 = (((tx as u64 + 1) * width as u64 / out_w as u64) as u32).max(x0 + 1);

            let mut sum = [0u64; 3];
            let mut count = 0u64;
            for y in y0..y1.min(height) {
                for x in x0..x1.min(width) {
                    let idx = ((y * width + x) * 4) as usize;
                    if rgba[idx + 3] < alpha_threshold {
                        continue;
                    }
                    sum[0] += rgba[idx] as u64;
                    sum[1] += rgba[idx + 1] as u64;
                    sum[2] += rgba[idx + 2] as u64;
                    count += 1;
                }
            }

            if count == 0 {
                pixels.push(None);
            } else {
                // Rounded integer mean
                let mean = |s: u64| ((s + count / 2) / count) as u8;
                pixels.push(Some([mean(sum[0]), mean(sum[1]), mean(sum[2])]));
            }
        }
    }

    PixelGrid {
        width: out_w,
        height: out_h,
        pixels,
    }
}

/// Drop near-black and near-white samples
///
/// When every sample is extreme the input is returned untouched, so a dark
/// or washed-out photo still yields colors.
pub fn filter_extremes(samples: Vec<PixelSample>) -> Vec<PixelSample> {
    let is_moderate = |s: &PixelSample| {
        let brightness = (s.rgb[0] as u16 + s.rgb[1] as u16 + s.rgb[2] as u16) / 3;
        (EXTREME_MIN_BRIGHTNESS..=EXTREME_MAX_BRIGHTNESS).contains(&brightness)
    };
    if samples.iter().any(is_moderate) {
        samples.into_iter().filter(|s| is_moderate(s)).collect()
    } else {
        samples
    }
}
