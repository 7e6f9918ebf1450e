//! Dominant color extraction by weighted k-means in Lab
//!
//! Clusters deduplicated pixel samples with:
//! - Deterministic maximin seeding (heaviest sample first, then farthest)
//! - Bounded Lloyd refinement with a movement threshold
//! - Merging of near-duplicate clusters
//! - Noise removal and renormalization of coverage percentages
//!
//! Identical samples and K always give bit-identical clusters: there is no
//! randomness and every tie is broken by index.

use palette::Lab;

use crate::cancel::CancelToken;
use crate::color::ColorConverter;
use crate::config::QuantizerConfig;
use crate::error::Result;
use crate::sampler::PixelSample;

/// One dominant color after clustering
#[derive(Debug, Clone, PartialEq)]
pub struct ColorCluster {
    /// Weighted mean of the member samples
    pub lab: Lab,
    /// Total sample weight (pixel count) of the cluster
    pub weight: f64,
    /// Share of all retained clusters, rounded to two decimals
    pub percentage: f32,
}

#[derive(Debug, Clone, Copy)]
struct WeightedLab {
    lab: Lab,
    weight: f64,
}

/// Color quantizer implementing weighted k-means clustering
pub struct ColorQuantizer {
    converter: ColorConverter,
    max_iterations: usize,
    convergence_threshold: f32,
    merge_threshold: f32,
    min_percentage: f32,
}

impl Default for ColorQuantizer {
    fn default() -> Self {
        Self::from_config(&QuantizerConfig::default())
    }
}

impl ColorQuantizer {
    pub fn from_config(config: &QuantizerConfig) -> Self {
        Self {
            converter: ColorConverter::new(),
            max_iterations: config.max_iterations.max(1),
            convergence_threshold: config.convergence_threshold,
            merge_threshold: config.merge_threshold,
            min_percentage: config.min_percentage,
        }
    }

    /// Merge threshold (ΔE76) below which two output colors never coexist
    pub fn merge_threshold(&self) -> f32 {
        self.merge_threshold
    }

    /// Cluster samples into at most `k` dominant colors
    ///
    /// # Arguments
    ///
    /// * `samples` - Distinct display colors with occurrence weights
    /// * `k` - Requested number of colors
    /// * `cancel` - Checked before every refinement pass
    ///
    /// # Returns
    ///
    /// Clusters sorted by descending percentage. Never more than `k` and never
    /// more than the number of distinct samples; empty only for empty input.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::Cancelled` if the token is cancelled mid-run
    pub fn quantize(
        &self,
        samples: &[PixelSample],
        k: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<ColorCluster>> {
        if samples.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let points: Vec<WeightedLab> = samples
            .iter()
            .map(|s| WeightedLab {
                lab: self.converter.rgb_to_lab(s.rgb),
                weight: s.weight as f64,
            })
            .collect();

        let k_eff = k.min(points.len());
        let mut centroids = self.seed_centroids(&points, k_eff);
        let mut assignments = vec![0usize; points.len()];

        for iteration in 0..self.max_iterations {
            cancel.check()?;

            self.assign(&points, &centroids, &mut assignments);
            let updated = self.update_centroids(&points, &assignments, &centroids);
            let movement = centroids
                .iter()
                .zip(&updated)
                .map(|(old, new)| self.converter.delta_e(*old, *new))
                .fold(0.0f32, f32::max);
            centroids = updated;

            if movement < self.convergence_threshold {
                tracing::debug!(iterations = iteration + 1, k = centroids.len(), "k-means converged");
                break;
            }
        }

        cancel.check()?;
        self.assign(&points, &centroids, &mut assignments);

        let clusters = self.collect_clusters(&points, &assignments, &centroids);
        let merged = self.merge_close(clusters);
        Ok(self.finalize(merged, k))
    }

    /// Heaviest sample first, then repeatedly the sample farthest from all seeds
    fn seed_centroids(&self, points: &[WeightedLab], k: usize) -> Vec<Lab> {
        let mut first = 0;
        for (i, point) in points.iter().enumerate() {
            if point.weight > points[first].weight {
                first = i;
            }
        }

        let mut seeds = vec![points[first].lab];
        let mut nearest: Vec<f32> = points
            .iter()
            .map(|p| self.converter.delta_e(p.lab, seeds[0]))
            .collect();

        while seeds.len() < k {
            let mut farthest = 0;
            for (i, &d) in nearest.iter().enumerate() {
                if d > nearest[farthest] {
                    farthest = i;
                }
            }
            if nearest[farthest] <= 0.0 {
                break;
            }

            let seed = points[farthest].lab;
            seeds.push(seed);
            for (d, point) in nearest.iter_mut().zip(points) {
                *d = d.min(self.converter.delta_e(point.lab, seed));
            }
        }

        seeds
    }

    /// Index of the nearest centroid for every point (ties go to the lower index)
    fn assign(&self, points: &[WeightedLab], centroids: &[Lab], assignments: &mut [usize]) {
        for (slot, point) in assignments.iter_mut().zip(points) {
            let mut best = 0;
            let mut best_distance = f32::INFINITY;
            for (i, centroid) in centroids.iter().enumerate() {
                let d = self.converter.delta_e(point.lab, *centroid);
                if d < best_distance {
                    best_distance = d;
                    best = i;
                }
            }
            *slot = best;
        }
    }

    /// Weighted means of the assigned points; empty clusters keep their centroid
    fn update_centroids(&self, points: &[WeightedLab], assignments: &[usize], centroids: &[Lab]) -> Vec<Lab> {
        let mut sums = vec![[0.0f64; 4]; centroids.len()];
        for (point, &cluster) in points.iter().zip(assignments) {
            let sum = &mut sums[cluster];
            sum[0] += point.lab.l as f64 * point.weight;
            sum[1] += point.lab.a as f64 * point.weight;
            sum[2] += point.lab.b as f64 * point.weight;
            sum[3] += point.weight;
        }

        sums.iter()
            .zip(centroids)
            .map(|(sum, old)| {
                if sum[3] > 0.0 {
                    Lab::new(
                        (sum[0] / sum[3]) as f32,
                        (sum[1] / sum[3]) as f32,
                        (sum[2] / sum[3]) as f32,
                    )
                } else {
                    *old
                }
            })
            .collect()
    }

    /// Non-empty clusters with their total weights
    fn collect_clusters(&self, points: &[WeightedLab], assignments: &[usize], centroids: &[Lab]) -> Vec<WeightedLab> {
        let mut weights = vec![0.0f64; centroids.len()];
        for (point, &cluster) in points.iter().zip(assignments) {
            weights[cluster] += point.weight;
        }

        centroids
            .iter()
            .zip(weights)
            .filter(|(_, weight)| *weight > 0.0)
            .map(|(lab, weight)| WeightedLab { lab: *lab, weight })
            .collect()
    }

    /// Repeatedly fold the closest pair under the merge threshold into its weighted mean
    fn merge_close(&self, mut clusters: Vec<WeightedLab>) -> Vec<WeightedLab> {
        loop {
            let mut closest: Option<(usize, usize, f32)> = None;
            for i in 0..clusters.len() {
                for j in (i + 1)..clusters.len() {
                    let d = self.converter.delta_e(clusters[i].lab, clusters[j].lab);
                    if d < self.merge_threshold && closest.map_or(true, |(_, _, best)| d < best) {
                        closest = Some((i, j, d));
                    }
                }
            }

            let Some((i, j, distance)) = closest else {
                return clusters;
            };

            let (a, b) = (clusters[i], clusters[j]);
            let total = a.weight + b.weight;
            let mix = |x: f32, y: f32| ((x as f64 * a.weight + y as f64 * b.weight) / total) as f32;
            clusters[i] = WeightedLab {
                lab: Lab::new(mix(a.lab.l, b.lab.l), mix(a.lab.a, b.lab.a), mix(a.lab.b, b.lab.b)),
                weight: total,
            };
            clusters.remove(j);
            tracing::trace!(distance, "merged near-duplicate clusters");
        }
    }

    /// Drop noise, sort by coverage, keep `k` and renormalize to 100%
    fn finalize(&self, clusters: Vec<WeightedLab>, k: usize) -> Vec<ColorCluster> {
        let total: f64 = clusters.iter().map(|c| c.weight).sum();
        if total <= 0.0 {
            return Vec::new();
        }

        let min_weight = total * self.min_percentage as f64 / 100.0;
        let mut kept: Vec<WeightedLab> = clusters.iter().copied().filter(|c| c.weight >= min_weight).collect();
        if kept.is_empty() {
            // Every cluster below the noise floor: keep the heaviest
            if let Some(heaviest) = clusters.iter().copied().reduce(|a, b| if b.weight > a.weight { b } else { a }) {
                kept.push(heaviest);
            }
        }

        // Stable sort keeps index order among equal weights
        kept.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        kept.truncate(k);

        let kept_total: f64 = kept.iter().map(|c| c.weight).sum();
        kept.into_iter()
            .map(|c| ColorCluster {
                lab: c.lab,
                weight: c.weight,
                percentage: round_percentage(c.weight / kept_total * 100.0),
            })
            .collect()
    }
}

/// Round to two decimals
fn round_percentage(value: f64) -> f32 {
    ((value * 100.0).round() / 100.0) as f32
}
