//! Color conversion, clustering and naming
//!
//! This module handles Lab conversions and perceptual distances,
//! extraction of dominant colors, and family labels for them.

pub mod conversion;
pub mod family;
pub mod quantizer;

pub use conversion::ColorConverter;
pub use family::{ColorFamily, FamilyClassifier, FamilyGroup};
pub use quantizer::{ColorCluster, ColorQuantizer};
