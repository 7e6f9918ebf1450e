//! Scan result schema and assembly
//!
//! These types define the JSON contract shared with the remote scanning
//! service: camelCase keys, epoch-millisecond timestamps, and matches grouped
//! per detected color and then per brand.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ScanMode;
use crate::constants::scan::ID_PREFIX;
use crate::error::{Result, ScanError};
use crate::paints::{PaintMatch, PaintRecipe};

/// One dominant color of the scanned image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedColor {
    /// Uppercase `#RRGGBB`
    pub hex: String,
    pub rgb: [u8; 3],
    /// `[L, a, b]`
    pub lab: [f32; 3],
    /// Coverage in percent, two decimals
    pub percentage: f32,
    pub family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paint_recipe: Option<PaintRecipe>,
}

/// Paint matches for one detected color, keyed by brand
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorMatches {
    pub color_hex: String,
    pub brands: BTreeMap<String, Vec<PaintMatch>>,
}

impl ColorMatches {
    pub fn paint_count(&self) -> usize {
        self.brands.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanMetadata {
    pub color_count: usize,
    pub paint_count: usize,
    /// True when background pixels were excluded from clustering
    pub background_removed: bool,
    /// True when background removal failed and the full image was used
    pub low_foreground: bool,
}

/// Complete output of one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub id: String,
    pub mode: ScanMode,
    /// Epoch milliseconds
    pub timestamp: u64,
    /// Caller-supplied image reference, passed through untouched
    pub source_image: String,
    pub detected_colors: Vec<DetectedColor>,
    /// `recommended_paints[i]` belongs to `detected_colors[i]`
    pub recommended_paints: Vec<ColorMatches>,
    pub metadata: ScanMetadata,
}

impl ScanResult {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ScanError::config("Failed to serialize scan result", e))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ScanError::config("Failed to serialize scan result", e))
    }
}

/// Packages detected colors and their matches into a [`ScanResult`]
#[derive(Debug, Clone, Copy)]
pub struct ResultAssembler {
    mode: ScanMode,
    background_removed: bool,
    low_foreground: bool,
}

impl ResultAssembler {
    pub fn new(mode: ScanMode) -> Self {
        Self {
            mode,
            background_removed: false,
            low_foreground: false,
        }
    }

    pub fn with_foreground(mut self, background_removed: bool, low_foreground: bool) -> Self {
        self.background_removed = background_removed;
        self.low_foreground = low_foreground;
        self
    }

    /// Assemble a result stamped with the current time
    pub fn assemble(&self, source_image: &str, entries: Vec<(DetectedColor, ColorMatches)>) -> ScanResult {
        self.assemble_at(source_image, entries, now_millis())
    }

    pub fn assemble_at(
        &self,
        source_image: &str,
        entries: Vec<(DetectedColor, ColorMatches)>,
        timestamp: u64,
    ) -> ScanResult {
        let (detected_colors, recommended_paints): (Vec<_>, Vec<_>) = entries.into_iter().unzip();

        let metadata = ScanMetadata {
            color_count: detected_colors.len(),
            paint_count: recommended_paints.iter().map(ColorMatches::paint_count).sum(),
            background_removed: self.background_removed,
            low_foreground: self.low_foreground,
        };

        ScanResult {
            id: generate_scan_id(timestamp),
            mode: self.mode,
            timestamp,
            source_image: source_image.to_string(),
            detected_colors,
            recommended_paints,
            metadata,
        }
    }
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `offline-<timestamp>-<9 random base-36 chars>`
pub fn generate_scan_id(timestamp: u64) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}-{}", ID_PREFIX, timestamp, suffix)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
