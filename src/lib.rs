//! # Paint Scan
//!
//! An offline engine that finds the dominant colors of a photograph and
//! matches them against commercial hobby paints.
//!
//! A scan proceeds by:
//! - Decoding and area-averaging the image down to a small analysis grid
//! - Removing a plain backdrop around a painted miniature
//! - Clustering the remaining pixels into perceptually distinct colors
//! - Ranking each brand's paints by CIEDE2000 distance to every color
//!
//! The [`ScanResult`] it produces has the same JSON shape as the remote
//! scanning service, so callers can use either provider.
//!
//! ## Example
//!
//! ```rust,no_run
//! use paint_scan::{scan_file, ScanConfig, ScanMode};
//! use std::path::Path;
//!
//! let config = ScanConfig::for_mode(ScanMode::Miniature);
//! let result = scan_file(Path::new("miniature.jpg"), config)?;
//! for color in &result.detected_colors {
//!     println!("{} {:>6.2}% {}", color.hex, color.percentage, color.family);
//! }
//! # Ok::<(), paint_scan::ScanError>(())
//! ```

use std::path::Path;

pub mod cancel;
pub mod color;
pub mod config;
pub mod constants;
pub mod detection;
pub mod engine;
pub mod error;
pub mod paints;
pub mod result;
pub mod sampler;
pub mod session;

pub use cancel::CancelToken;
pub use config::{ForegroundConfig, QuantizerConfig, SamplerConfig, ScanConfig, ScanMode};
pub use engine::{OfflineEngine, ScanProvider, ScanRequest};
pub use error::{Result, ScanError, ScanWarning};
pub use paints::{PaintDatabase, PaintMatch, PaintRecord, PaintType};
pub use result::{ColorMatches, DetectedColor, ScanMetadata, ScanResult};
pub use session::ScanSession;

/// Scan an image file with the builtin paint database
///
/// Blocks the calling thread; use [`ScanSession`] to run scans in the
/// background.
///
/// # Errors
///
/// Returns `ScanError` if:
/// - The configuration is out of range
/// - The file cannot be read or decoded
pub fn scan_file(image_path: &Path, config: ScanConfig) -> Result<ScanResult> {
    let image = std::fs::read(image_path)
        .map_err(|e| ScanError::decode(format!("cannot read {}", image_path.display()), e))?;
    let request = ScanRequest::new(image, image_path.display().to_string()).with_config(config);
    OfflineEngine::default().scan(&request, &CancelToken::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_decode_error() {
        let result = scan_file(Path::new("/nonexistent/paint_scan.png"), ScanConfig::default());
        let err = result.unwrap_err();
        assert!(matches!(err, ScanError::Decode { .. }));
        assert!(err.is_recoverable());
    }
}
