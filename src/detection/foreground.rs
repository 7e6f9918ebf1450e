//! Background removal for miniature photos
//!
//! Implements a border-ring heuristic that:
//! - Samples a ring of pixels along the image border
//! - Estimates the background color as the ring's Lab centroid
//! - Discards every pixel within a ΔE tolerance of that centroid
//! - Falls back to the full frame when almost nothing survives
//!
//! Miniatures are usually shot against a plain backdrop that fills the
//! frame edges, so the ring is a cheap and stable background estimate.

use palette::Lab;

use crate::color::ColorConverter;
use crate::config::ForegroundConfig;
use crate::error::ScanWarning;
use crate::sampler::PixelGrid;

/// Outcome of background removal
#[derive(Debug, Clone)]
pub struct ForegroundSelection {
    /// Grid with background pixels marked absent (or the full grid on fallback)
    pub grid: PixelGrid,
    /// False when segmentation failed and the full frame is used
    pub background_removed: bool,
    /// Share of present pixels classified as foreground (0.0-1.0)
    pub foreground_fraction: f32,
    /// Set when the foreground was too small and the selector fell back
    pub warning: Option<ScanWarning>,
}

/// Border-ring background estimate
#[derive(Debug, Clone, Copy)]
struct BackgroundModel {
    centroid: Lab,
    /// RMS ΔE76 of the ring pixels around the centroid
    spread: f32,
}

/// Foreground selector implementing border-ring background removal
pub struct ForegroundSelector {
    converter: ColorConverter,
    border_width: u32,
    tolerance: f32,
    min_foreground_fraction: f32,
}

impl Default for ForegroundSelector {
    fn default() -> Self {
        Self::from_config(&ForegroundConfig::default())
    }
}

impl ForegroundSelector {
    pub fn from_config(config: &ForegroundConfig) -> Self {
        Self::with_params(config.border_width, config.tolerance, config.min_foreground_fraction)
    }

    /// Create a selector with custom parameters
    pub fn with_params(border_width: u32, tolerance: f32, min_foreground_fraction: f32) -> Self {
        Self {
            converter: ColorConverter::new(),
            border_width: border_width.max(1),
            tolerance,
            min_foreground_fraction,
        }
    }

    /// Remove the background from a sampled grid
    ///
    /// Never fails. A grid whose border ring is entirely transparent is
    /// treated as already cut out and returned unchanged.
    pub fn select(&self, grid: &PixelGrid) -> ForegroundSelection {
        let present = grid.present_count();

        let model = match self.estimate_background(grid) {
            Some(model) if present > 0 => model,
            _ => {
                tracing::debug!("border ring empty, keeping grid as foreground");
                return ForegroundSelection {
                    grid: grid.clone(),
                    background_removed: true,
                    foreground_fraction: 1.0,
                    warning: None,
                };
            }
        };

        let threshold = self.tolerance + model.spread.min(self.tolerance);
        let background = self.classify_background(grid, model.centroid, threshold);
        let background_count = background.iter().filter(|&&b| b).count();
        let foreground_fraction = (present - background_count) as f32 / present as f32;

        tracing::debug!(
            spread = model.spread,
            threshold,
            foreground_fraction,
            "background estimated from border ring"
        );

        // An empty foreground is a failed segmentation whatever the minimum
        if background_count == present || foreground_fraction < self.min_foreground_fraction {
            let warning = ScanWarning::LowForeground {
                foreground_percent: foreground_fraction * 100.0,
                minimum_percent: self.min_foreground_fraction * 100.0,
            };
            tracing::warn!("{}", warning);
            return ForegroundSelection {
                grid: grid.clone(),
                background_removed: false,
                foreground_fraction,
                warning: Some(warning),
            };
        }

        ForegroundSelection {
            grid: grid.without(&background),
            background_removed: true,
            foreground_fraction,
            warning: None,
        }
    }

    /// Centroid and spread of the present pixels in the border ring
    fn estimate_background(&self, grid: &PixelGrid) -> Option<BackgroundModel> {
        let ring: Vec<Lab> = self
            .ring_coordinates(grid.width(), grid.height())
            .filter_map(|(x, y)| grid.get(x, y))
            .map(|rgb| self.converter.rgb_to_lab(rgb))
            .collect();

        if ring.is_empty() {
            return None;
        }

        let n = ring.len() as f64;
        let (sum_l, sum_a, sum_b) = ring.iter().fold((0.0f64, 0.0f64, 0.0f64), |acc, lab| {
            (acc.0 + lab.l as f64, acc.1 + lab.a as f64, acc.2 + lab.b as f64)
        });
        let centroid = Lab::new((sum_l / n) as f32, (sum_a / n) as f32, (sum_b / n) as f32);

        let sum_squared: f64 = ring
            .iter()
            .map(|lab| {
                let d = self.converter.delta_e(*lab, centroid) as f64;
                d * d
            })
            .sum();

        Some(BackgroundModel {
            centroid,
            spread: (sum_squared / n).sqrt() as f32,
        })
    }

    /// Coordinates within `border_width` of any edge, row-major
    fn ring_coordinates(&self, width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
        let bw = self.border_width;
        (0..height).flat_map(move |y| {
            (0..width).filter_map(move |x| {
                let on_ring = x < bw || y < bw || x + bw >= width || y + bw >= height;
                on_ring.then_some((x, y))
            })
        })
    }

    /// Per-pixel background flags (absent pixels are never background)
    fn classify_background(&self, grid: &PixelGrid, centroid: Lab, threshold: f32) -> Vec<bool> {
        grid.pixels()
            .iter()
            .map(|pixel| match pixel {
                Some(rgb) => self.converter.delta_e(self.converter.rgb_to_lab(*rgb), centroid) <= threshold,
                None => false,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 3] = [255, 255, 255];
    const RED: [u8; 3] = [200, 20, 30];

    fn grid_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> Option<[u8; 3]>) -> PixelGrid {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        PixelGrid::new(width, height, pixels).unwrap()
    }

    fn blob_on_white() -> PixelGrid {
        grid_from_fn(40, 40, |x, y| {
            if (12..28).contains(&x) && (12..28).contains(&y) {
                Some(RED)
            } else {
                Some(WHITE)
            }
        })
    }

    #[test]
    fn test_selector_creation() {
        let selector = ForegroundSelector::default();
        assert_eq!(selector.border_width, 2);
        assert_eq!(selector.tolerance, 12.0);
        assert_eq!(selector.min_foreground_fraction, 0.05);
    }

    #[test]
    fn test_white_border_keeps_only_blob() {
        let selection = ForegroundSelector::default().select(&blob_on_white());
        assert!(selection.background_removed);
        assert!(selection.warning.is_none());
        assert_eq!(selection.grid.present_count(), 16 * 16);
        assert!(selection.grid.pixels().iter().flatten().all(|&rgb| rgb == RED));
    }

    #[test]
    fn test_slightly_noisy_background_is_removed() {
        let grid = grid_from_fn(30, 30, |x, y| {
            if (10..20).contains(&x) && (10..20).contains(&y) {
                Some([30, 60, 200])
            } else if (x + y) % 2 == 0 {
                Some([245, 245, 240])
            } else {
                Some([235, 238, 242])
            }
        });
        let selection = ForegroundSelector::default().select(&grid);
        assert_eq!(selection.grid.present_count(), 100);
    }

    #[test]
    fn test_uniform_image_falls_back_with_warning() {
        let grid = grid_from_fn(20, 20, |_, _| Some([90, 110, 70]));
        let selection = ForegroundSelector::default().select(&grid);
        assert!(!selection.background_removed);
        assert_eq!(selection.grid, grid);
        assert!(matches!(
            selection.warning,
            Some(ScanWarning::LowForeground { .. })
        ));
        assert_eq!(selection.foreground_fraction, 0.0);
    }

    #[test]
    fn test_zero_minimum_still_falls_back_on_empty_foreground() {
        let grid = grid_from_fn(16, 16, |_, _| Some([90, 110, 70]));
        let selection = ForegroundSelector::with_params(2, 12.0, 0.0).select(&grid);
        assert!(!selection.background_removed);
        assert_eq!(selection.grid, grid);
        assert!(selection.warning.is_some());
    }

    #[test]
    fn test_transparent_border_is_left_alone() {
        let grid = grid_from_fn(10, 10, |x, y| {
            if (3..7).contains(&x) && (3..7).contains(&y) {
                Some(RED)
            } else {
                None
            }
        });
        let selection = ForegroundSelector::default().select(&grid);
        assert_eq!(selection.grid, grid);
        assert!(selection.warning.is_none());
    }

    #[test]
    fn test_ring_coordinates_cover_border_only() {
        let selector = ForegroundSelector::with_params(1, 12.0, 0.05);
        let ring: Vec<(u32, u32)> = selector.ring_coordinates(4, 3).collect();
        assert_eq!(ring.len(), 4 * 3 - 2);
        assert!(!ring.contains(&(1, 1)));
        assert!(!ring.contains(&(2, 1)));
    }

    #[test]
    fn test_wider_tolerance_eats_similar_subject() {
        let grid = grid_from_fn(20, 20, |x, y| {
            if (5..15).contains(&x) && (5..15).contains(&y) {
                Some([235, 235, 235])
            } else {
                Some(WHITE)
            }
        });
        let strict = ForegroundSelector::with_params(2, 2.0, 0.05).select(&grid);
        assert_eq!(strict.grid.present_count(), 100);

        let loose = ForegroundSelector::with_params(2, 12.0, 0.05).select(&grid);
        assert!(loose.warning.is_some());
    }
}
